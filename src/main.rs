use std::io;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use log::info;

use gogomanager_api::app::AppState;
use gogomanager_api::config::AppConfig;
use gogomanager_api::db::{self, Repositories};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let pool = db::create_pool(&config)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("failed to connect to the database: {}", err)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("failed to run migrations: {}", err)))?;

    let (host, port) = config.bind_address();
    let state = AppState::new(config, Repositories::postgres(pool));

    info!("Starting server at {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind((host, port))?
    .run()
    .await
}
