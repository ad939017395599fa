use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::auth::AuthUser;

/// Fulfillment state of a booking. Admin updates must follow the transition
/// table; re-applying the current value is always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            "Completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn can_transition(self, to: BookingStatus) -> bool {
        use BookingStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Financial settlement state, independent of `BookingStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Unpaid" => Some(PaymentStatus::Unpaid),
            "Partial" => Some(PaymentStatus::Partial),
            "Paid" => Some(PaymentStatus::Paid),
            "Refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    pub fn can_transition(self, to: PaymentStatus) -> bool {
        use PaymentStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Unpaid, Partial) | (Unpaid, Paid) | (Partial, Paid) | (Paid, Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    Cash,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Online => "Online",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Credit Card" => Some(PaymentMethod::CreditCard),
            "Bank Transfer" => Some(PaymentMethod::BankTransfer),
            "Cash" => Some(PaymentMethod::Cash),
            "Online" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}

/// Non-admin requesters are implicitly scoped to their own bookings; admins
/// see everything. Kept separate from business filters so it can be composed
/// into any booking query.
pub fn owner_scope(user: &AuthUser) -> Option<i64> {
    if user.is_admin() {
        None
    } else {
        Some(user.id)
    }
}

/// `"BK"` + unix millis in base36 + 4 random alphanumerics, uppercased.
/// Global uniqueness is backed by the UNIQUE column, not the generator.
pub fn generate_booking_ref() -> String {
    let millis = chrono::Utc::now().timestamp_millis() as u64;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!("BK{}{}", base36(millis), suffix.to_uppercase())
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub tour_id: i64,
    pub user_id: i64,
    pub travel_date: NaiveDate,
    pub adults: i64,
    pub children: i64,
    pub total_amount: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub special_requests: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub booking_ref: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Contact details captured at booking time, independent of later profile
/// edits.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContactInfo {
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
}

/// Booking wire shape. `tour` and `user` carry the referenced ids;
/// `bookingDate` mirrors `createdAt` as in the stored documents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub tour: i64,
    pub user: i64,
    pub booking_date: NaiveDateTime,
    pub travel_date: NaiveDate,
    pub adults: i64,
    pub children: i64,
    pub total_amount: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub special_requests: Option<String>,
    pub contact_info: ContactInfo,
    pub booking_ref: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<BookingRow> for BookingResponse {
    fn from(row: BookingRow) -> Self {
        BookingResponse {
            id: row.id,
            tour: row.tour_id,
            user: row.user_id,
            booking_date: row.created_at,
            travel_date: row.travel_date,
            adults: row.adults,
            children: row.children,
            total_amount: row.total_amount,
            status: row.status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            special_requests: row.special_requests,
            contact_info: ContactInfo {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            booking_ref: row.booking_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub tour_id: i64,
    pub travel_date: NaiveDate,
    #[validate(range(min = 1))]
    pub adults: i64,
    #[validate(range(min = 0))]
    pub children: Option<i64>,
    pub payment_method: Option<String>,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
    #[validate]
    pub contact_info: Option<ContactInfo>,
}

/// Admin patch. Applied field-by-field onto the stored record; the total is
/// not recomputed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBooking {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub travel_date: Option<NaiveDate>,
    pub adults: Option<i64>,
    pub children: Option<i64>,
    pub special_requests: Option<String>,
}

/// Payment simulation payload. `payment_data` is opaque and never inspected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub method: Option<String>,
    pub payment_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilters {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn booking_refs_are_unique_and_well_formed() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let r = generate_booking_ref();
            assert!(r.starts_with("BK"));
            assert!(r.len() > 6);
            assert!(r
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(seen.insert(r), "duplicate booking ref generated");
        }
    }

    #[test]
    fn consecutive_refs_differ() {
        assert_ne!(generate_booking_ref(), generate_booking_ref());
    }

    #[test]
    fn status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition(Confirmed));
        assert!(Pending.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Completed));
        assert!(Confirmed.can_transition(Cancelled));
        // terminal states only re-apply themselves
        assert!(Cancelled.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Pending));
        assert!(!Completed.can_transition(Pending));
        assert!(!Completed.can_transition(Confirmed));
        assert!(!Pending.can_transition(Completed));
    }

    #[test]
    fn payment_transitions() {
        use PaymentStatus::*;
        assert!(Unpaid.can_transition(Partial));
        assert!(Unpaid.can_transition(Paid));
        assert!(Partial.can_transition(Paid));
        assert!(Paid.can_transition(Refunded));
        assert!(Paid.can_transition(Paid));
        assert!(!Refunded.can_transition(Unpaid));
        assert!(!Paid.can_transition(Unpaid));
        assert!(!Partial.can_transition(Refunded));
    }

    #[test]
    fn owner_scope_limits_non_admins() {
        let admin = AuthUser {
            id: 1,
            role: "admin".into(),
            name: "A".into(),
            email: "a@example.com".into(),
        };
        let user = AuthUser {
            id: 2,
            role: "user".into(),
            name: "B".into(),
            email: "b@example.com".into(),
        };
        assert_eq!(owner_scope(&admin), None);
        assert_eq!(owner_scope(&user), Some(2));
    }

    #[test]
    fn enum_round_trips_match_stored_strings() {
        for s in ["Pending", "Confirmed", "Cancelled", "Completed"] {
            assert_eq!(BookingStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["Unpaid", "Partial", "Paid", "Refunded"] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["Credit Card", "Bank Transfer", "Cash", "Online"] {
            assert_eq!(PaymentMethod::parse(s).unwrap().as_str(), s);
        }
        assert!(BookingStatus::parse("pending").is_none());
        assert!(PaymentMethod::parse("Crypto").is_none());
    }
}
