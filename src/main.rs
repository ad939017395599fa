use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use tour_booking_api::auth::JwtConfig;
use tour_booking_api::{configure, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    log::info!("Connecting to database...");
    let pool = db::get_db_pool().await;

    // Run migrations
    log::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let jwt = JwtConfig::from_env();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server at http://localhost:{port}/api");

    let pool_data = web::Data::new(pool);
    let jwt_data = web::Data::new(jwt);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(jwt_data.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
