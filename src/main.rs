use actix_cors::Cors;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use serde_json::json;
use std::io;
use std::sync::Arc;

mod middleware;
mod otp;
mod router;
mod utils;
use middleware::error_handler::{form_error_handler, json_error_handler};
use middleware::not_found::not_found;
use otp::service::OtpService;
use otp::store::{InMemoryOtpStore, OtpStore, spawn_expiry_sweep};
use router::index::routes;
use utils::config::AppConfig;
use utils::email::EmailService;
use utils::email_validation::EmailValidator;
use utils::helpers::service_name;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "OTP service is running",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

fn startup_error(context: &str, e: String) -> io::Error {
    error!("{}: {}", context, e);
    io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    let validator = EmailValidator::new(&config.allowed_email_domain)
        .map_err(|e| startup_error("Invalid configuration", e))?;
    let email_service =
        EmailService::new().map_err(|e| startup_error("Email service error", e))?;

    let store: Arc<dyn OtpStore> = Arc::new(InMemoryOtpStore::new());
    if let Some(every) = config.sweep_interval {
        spawn_expiry_sweep(store.clone(), every);
    }

    let otp_service = web::Data::new(OtpService::new(
        store,
        Arc::new(email_service),
        validator,
        config.delivery_timeout,
    ));

    info!(
        "Starting server on http://{}:{} for @{}",
        config.host, config.port, config.allowed_email_domain
    );

    let allowed_origin = config.allowed_origin.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allowed_origin(&allowed_origin)
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_header(header::CONTENT_TYPE),
            )
            .app_data(otp_service.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::FormConfig::default().error_handler(form_error_handler))
            .configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
