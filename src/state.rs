use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::store::Store;

/// Shared handler state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::new(
            store,
            TokenKeys::new(&config.jwt_secret, config.jwt_expiration_hours),
            config.bcrypt_cost,
        )
    }
}
