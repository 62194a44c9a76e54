mod blocks;
mod catalog;
mod config;
mod docx;
mod error;
mod images;
mod mapping;
mod pptx;
mod services;
mod xmlutil;

use crate::catalog::{template_dir_from_env, TemplateCatalog};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let host = "127.0.0.1";
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080u16);

    let template_dir = template_dir_from_env();
    info!("slide templates served from {}", template_dir.display());
    let catalog = web::Data::new(TemplateCatalog::new(template_dir));
    catalog.warm_up();

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(catalog.clone())
            .service(services::mappings::configure_routes())
            .service(services::blocks::configure_routes())
            .service(services::documents::configure_routes())
            .service(services::images::configure_routes())
            .service(services::slides::configure_routes())
    })
    .bind((host, port))?
    .run()
    .await
}
