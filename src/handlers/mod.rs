use actix_web::HttpResponse;

pub mod bookings;
pub mod reports;
pub mod tours;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Tour Booking API is running!",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
