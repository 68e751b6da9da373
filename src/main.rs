use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use taskhub::config::Config;
use taskhub::routes;
use taskhub::state::AppState;
use taskhub::store::{MemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let store = PgStore::connect(database_url)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            store
                .migrate()
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set; data is kept in memory and lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = web::Data::new(AppState::from_config(store, &config));

    log::info!("Starting TaskHub server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
