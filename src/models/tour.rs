use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TOUR_INACTIVE: &str = "Inactive";
pub const TOUR_SOLD_OUT: &str = "Sold Out";
pub const TOUR_ACTIVE: &str = "Active";

#[derive(Debug, Clone, FromRow)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub country: String,
    pub duration_days: i64,
    pub duration_nights: i64,
    pub price_adult: f64,
    pub price_child: f64,
    pub currency: String,
    pub max_group_size: i64,
    pub category: String,
    pub cover_image: Option<String>,
    pub available_slots: i64,
    pub rating: f64,
    pub featured: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Tour {
    /// Inactive and sold-out tours reject new bookings; everything else
    /// (including Coming Soon) is bookable, matching catalog behavior.
    pub fn is_bookable(&self) -> bool {
        self.status != TOUR_INACTIVE && self.status != TOUR_SOLD_OUT
    }

    /// Price snapshot at booking time. Never recomputed if the tour price
    /// changes later.
    pub fn total_for(&self, adults: i64, children: i64) -> f64 {
        self.price_adult * adults as f64 + self.price_child * children as f64
    }
}

#[derive(Debug, Serialize)]
pub struct TourDuration {
    pub days: i64,
    pub nights: i64,
}

#[derive(Debug, Serialize)]
pub struct TourPrice {
    pub adult: f64,
    pub child: f64,
    pub currency: String,
}

/// Catalog wire shape: duration and price are nested objects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub country: String,
    pub duration: TourDuration,
    pub price: TourPrice,
    pub max_group_size: i64,
    pub category: String,
    pub cover_image: Option<String>,
    pub available_slots: i64,
    pub rating: f64,
    pub featured: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        TourResponse {
            id: tour.id,
            title: tour.title,
            description: tour.description,
            destination: tour.destination,
            country: tour.country,
            duration: TourDuration {
                days: tour.duration_days,
                nights: tour.duration_nights,
            },
            price: TourPrice {
                adult: tour.price_adult,
                child: tour.price_child,
                currency: tour.currency,
            },
            max_group_size: tour.max_group_size,
            category: tour.category,
            cover_image: tour.cover_image,
            available_slots: tour.available_slots,
            rating: tour.rating,
            featured: tour.featured,
            status: tour.status,
            created_at: tour.created_at,
            updated_at: tour.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSearch {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour(status: &str, adult: f64, child: f64) -> Tour {
        Tour {
            id: 1,
            title: "Island Hopper".into(),
            description: String::new(),
            destination: "Palawan".into(),
            country: "Philippines".into(),
            duration_days: 5,
            duration_nights: 4,
            price_adult: adult,
            price_child: child,
            currency: "USD".into(),
            max_group_size: 12,
            category: "Beach".into(),
            cover_image: None,
            available_slots: 10,
            rating: 4.5,
            featured: false,
            status: status.into(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn total_is_adult_price_times_adults_plus_child_price_times_children() {
        let t = tour(TOUR_ACTIVE, 1000.0, 500.0);
        assert_eq!(t.total_for(2, 1), 2500.0);
        assert_eq!(t.total_for(1, 0), 1000.0);
        assert_eq!(t.total_for(3, 4), 5000.0);
    }

    #[test]
    fn only_inactive_and_sold_out_block_booking() {
        assert!(tour(TOUR_ACTIVE, 1.0, 0.0).is_bookable());
        assert!(tour("Coming Soon", 1.0, 0.0).is_bookable());
        assert!(!tour(TOUR_INACTIVE, 1.0, 0.0).is_bookable());
        assert!(!tour(TOUR_SOLD_OUT, 1.0, 0.0).is_bookable());
    }
}
