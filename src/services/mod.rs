//! Operations behind the HTTP handlers. Each one validates its typed input and
//! performs a single store operation (or one transcode plus one write).

pub mod avatar;
pub mod tasks;
pub mod users;
