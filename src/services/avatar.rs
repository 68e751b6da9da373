//! Avatar uploads: multipart parsing, file checks and PNG transcoding.

use std::io::Cursor;

use actix_multipart::Multipart;
use actix_web::web;
use futures::TryStreamExt;
use image::imageops::FilterType;
use image::ImageFormat;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Multipart field the image must be sent in.
pub const AVATAR_FIELD: &str = "avatar";
/// Largest accepted upload, in bytes.
pub const MAX_AVATAR_BYTES: usize = 1_000_000;
/// Stored avatars are square PNGs of this edge length.
pub const AVATAR_SIZE: u32 = 250;

lazy_static! {
    static ref IMAGE_FILENAME: Regex = Regex::new(r"(?i)\.(jpg|png|jpeg)$").unwrap();
}

fn not_an_image() -> AppError {
    AppError::BadRequest("Please upload an image file".into())
}

fn multipart_error(e: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid upload: {}", e))
}

pub fn is_allowed_filename(filename: &str) -> bool {
    IMAGE_FILENAME.is_match(filename)
}

/// Reads the single `avatar` file out of a multipart body.
///
/// Text fields are skipped. Any other file field, a second avatar, a file name
/// without a jpg/jpeg/png extension, or more than `MAX_AVATAR_BYTES` of data is
/// rejected.
pub async fn read_upload(mut payload: Multipart) -> Result<Vec<u8>, AppError> {
    let mut avatar: Option<Vec<u8>> = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        let filename = match filename {
            Some(filename) => filename,
            None => {
                while field.try_next().await.map_err(multipart_error)?.is_some() {}
                continue;
            }
        };
        if name != AVATAR_FIELD || avatar.is_some() {
            return Err(AppError::BadRequest("Unexpected field".into()));
        }
        if !is_allowed_filename(&filename) {
            return Err(not_an_image());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > MAX_AVATAR_BYTES {
                return Err(AppError::BadRequest("File too large".into()));
            }
            bytes.extend_from_slice(&chunk);
        }
        avatar = Some(bytes);
    }

    avatar.ok_or_else(not_an_image)
}

/// Decodes a jpeg/png upload, crops it to fill `AVATAR_SIZE`², and re-encodes it as PNG.
pub fn transcode(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        log::debug!("Undecodable avatar upload: {}", e);
        not_an_image()
    })?;
    let resized = decoded.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3);

    let mut png = Cursor::new(Vec::new());
    resized
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| AppError::InternalServerError(format!("Failed to encode avatar: {}", e)))?;
    Ok(png.into_inner())
}

/// Transcodes the upload on the blocking pool and stores it on the user.
pub async fn save(state: &AppState, user_id: Uuid, upload: Vec<u8>) -> Result<(), AppError> {
    let png = web::block(move || transcode(&upload)).await??;
    state.store.set_avatar(user_id, Some(png)).await?;
    log::info!("Stored avatar for user {}", user_id);
    Ok(())
}

pub async fn remove(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    state.store.set_avatar(user_id, None).await
}

/// Returns the stored PNG, or `NotFound` if the user or their avatar is missing.
pub async fn fetch(state: &AppState, user_id: Uuid) -> Result<Vec<u8>, AppError> {
    state
        .store
        .find_user(user_id)
        .await?
        .and_then(|user| user.avatar)
        .ok_or_else(|| AppError::NotFound("Unable to find avatar".into()))
}
