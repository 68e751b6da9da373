#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, persistence backends, services and routing"]
#![doc = "for the TaskHub REST backend. The binary (`main.rs`) reads the config, picks a"]
#![doc = "store and serves `routes::config`; the integration tests build the same app"]
#![doc = "around the in-memory store."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
