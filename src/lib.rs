use actix_web::web;

pub mod auth;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;

use errors::ApiError;

/// Route tree and shared extractor config. Kept in the library so the
/// integration tests assemble the exact app the binary serves.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(err.to_string()).into()
    }));

    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/tours")
                    .route("", web::get().to(handlers::tours::list_tours))
                    .route("/{id}", web::get().to(handlers::tours::get_tour)),
            )
            .service(
                web::scope("/bookings")
                    .route("", web::post().to(handlers::bookings::create_booking))
                    .route("", web::get().to(handlers::bookings::list_bookings))
                    .route("/{id}", web::get().to(handlers::bookings::get_booking))
                    .route("/{id}", web::put().to(handlers::bookings::update_booking))
                    .route("/{id}/pay", web::post().to(handlers::bookings::pay_booking)),
            )
            .service(
                web::scope("/reports").route("", web::get().to(handlers::reports::get_reports)),
            ),
    );
}
