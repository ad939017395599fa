use serde::Serialize;
use sqlx::FromRow;

/// Ephemeral aggregate over the booking ledger. Recomputed fresh on every
/// request; nothing here is persisted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub overview: Overview,
    pub bookings_by_status: Vec<StatusBucket>,
    pub revenue_by_month: Vec<MonthBucket>,
    pub top_tours: Vec<TopTour>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    /// Sum of `totalAmount` over Paid bookings in the whole ledger; the
    /// report period only narrows `recent_bookings`.
    pub total_revenue: f64,
    pub recent_bookings: i64,
    pub total_tours: i64,
    pub total_users: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StatusBucket {
    pub status: String,
    pub count: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthBucket {
    pub year: i64,
    pub month: i64,
    pub bookings: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopTour {
    pub tour_id: i64,
    pub title: String,
    pub destination: String,
    pub count: i64,
    pub revenue: f64,
}
