use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::report::{MonthBucket, Overview, ReportSnapshot, StatusBucket, TopTour};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<i64>,
}

/// Full recompute over the ledger on every call; only `recentBookings` is
/// narrowed by the trailing period.
pub async fn get_reports(
    pool: web::Data<SqlitePool>,
    auth: AuthUser,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden(format!(
            "Access denied. Role '{}' is not authorized for this action.",
            auth.role
        )));
    }

    let period_days = query.period.unwrap_or(30).max(0);
    let cutoff = Utc::now().naive_utc() - Duration::days(period_days);
    let pool = pool.get_ref();

    let total_bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool)
        .await?;

    let confirmed_bookings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'Confirmed'")
            .fetch_one(pool)
            .await?;

    let total_revenue: f64 = sqlx::query_scalar(
        "SELECT CAST(COALESCE(SUM(total_amount), 0) AS REAL) FROM bookings \
         WHERE payment_status = 'Paid'",
    )
    .fetch_one(pool)
    .await?;

    let recent_bookings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE created_at >= ?")
            .bind(cutoff)
            .fetch_one(pool)
            .await?;

    let bookings_by_status: Vec<StatusBucket> = sqlx::query_as(
        "SELECT status, COUNT(*) AS count, \
                CAST(COALESCE(SUM(total_amount), 0) AS REAL) AS revenue \
         FROM bookings GROUP BY status",
    )
    .fetch_all(pool)
    .await?;

    // Most recent 12 calendar months, returned in ascending order.
    let mut revenue_by_month: Vec<MonthBucket> = sqlx::query_as(
        "SELECT CAST(strftime('%Y', created_at) AS INTEGER) AS year, \
                CAST(strftime('%m', created_at) AS INTEGER) AS month, \
                COUNT(*) AS bookings, \
                CAST(COALESCE(SUM(total_amount), 0) AS REAL) AS revenue \
         FROM bookings \
         GROUP BY year, month \
         ORDER BY year DESC, month DESC \
         LIMIT 12",
    )
    .fetch_all(pool)
    .await?;
    revenue_by_month.reverse();

    let top_tours: Vec<TopTour> = sqlx::query_as(
        "SELECT b.tour_id AS tour_id, t.title AS title, t.destination AS destination, \
                COUNT(*) AS count, \
                CAST(COALESCE(SUM(b.total_amount), 0) AS REAL) AS revenue \
         FROM bookings b \
         JOIN tours t ON t.id = b.tour_id \
         GROUP BY b.tour_id, t.title, t.destination \
         ORDER BY count DESC \
         LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    let total_tours: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tours WHERE status = 'Active'")
            .fetch_one(pool)
            .await?;

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'user'")
        .fetch_one(pool)
        .await?;

    let snapshot = ReportSnapshot {
        overview: Overview {
            total_bookings,
            confirmed_bookings,
            total_revenue,
            recent_bookings,
            total_tours,
            total_users,
        },
        bookings_by_status,
        revenue_by_month,
        top_tours,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": snapshot,
    })))
}
