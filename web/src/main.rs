#![deny(missing_docs)]

//! # OAVK Web Binary
//!
//! Serves the petstore demo with request and response validation.

use actix_web::{web, App, HttpServer};
use oavk_web::health_check;
use oavk_web::petstore::{configure, Petstore};
use std::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn build_server(
    listener: TcpListener,
    state: web::Data<Petstore>,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(health_check)
            .configure(configure)
    })
    .listen(listener)?
    .run())
}

fn resolve_bind_addr() -> String {
    std::env::var("OAVK_WEB_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("OAVK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // A second initialisation (tests) is harmless.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let state = Petstore::new()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    let bind_addr = resolve_bind_addr();
    let listener = TcpListener::bind(&bind_addr)?;
    tracing::info!(%bind_addr, "serving petstore");
    let server = build_server(listener, web::Data::new(state))?;

    if std::env::var("OAVK_WEB_ONESHOT").is_ok() {
        server.handle().stop(true).await;
    }

    server.await
}
