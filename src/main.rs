use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, http::header, web};
use dotenv::dotenv;
use env_logger::Env;
use log::info;

mod database;
mod graphql;
mod middleware;
mod post;
mod router;
mod uploader;
mod user;
mod utils;

use graphql::index::build_schema;
use middleware::auth::AuthGate;
use middleware::not_found::not_found;
use post::post_service::PostService;
use router::index::routes;
use serde_json::json;
use uploader::controller::IMAGES_DIR;
use user::service::UserService;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the blog backend",
        "status": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "blog-backend".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger with environment variable support
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting server on http://localhost:8080");

    let mongo_client = database::connect_to_mongo()
        .await
        .expect("Failed to connect to MongoDB");

    std::fs::create_dir_all(IMAGES_DIR)?;

    let schema = web::Data::new(build_schema(
        UserService::new(&mongo_client),
        PostService::new(&mongo_client),
    ));

    // Start the HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION]);

        App::new()
            .wrap(Logger::default())
            .wrap(AuthGate)
            .wrap(cors)
            .app_data(schema.clone())
            .configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
            .service(actix_files::Files::new(&format!("/{IMAGES_DIR}"), IMAGES_DIR))
    })
    .bind(("localhost", 8080))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
