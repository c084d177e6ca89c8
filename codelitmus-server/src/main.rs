#![deny(missing_docs)]
//! CodeLitmus server executable.
//!
//! Hosts the upload page and the Python analysis endpoint.

mod config;
mod openapi;
mod routes;

#[cfg(not(test))]
use actix_web::{App, HttpServer, web};
#[cfg(not(test))]
use dotenvy::dotenv;

#[cfg(not(test))]
use crate::config::ServerConfig;
#[cfg(not(test))]
use crate::routes::{AppState, analyze, index, openapi_json};

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err));
        }
    };

    let state = web::Data::new(AppState {
        scorer: config.scorer.clone(),
        max_upload_bytes: config.max_upload_bytes,
    });
    let listen = (config.host.clone(), config.port);
    log::info!("listening on {}:{}", listen.0, listen.1);

    // Manually start the Actix system
    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(config.cors())
                .app_data(state.clone())
                .service(index)
                .service(analyze)
                .service(openapi_json)
        })
        .bind(listen)?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
