use actix_web::{web, HttpResponse};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::booking::{
    generate_booking_ref, owner_scope, BookingFilters, BookingResponse, BookingRow,
    BookingStatus, CreateBooking, PayRequest, PaymentMethod, PaymentStatus, UpdateBooking,
};
use crate::models::tour::Tour;

pub async fn create_booking(
    pool: web::Data<SqlitePool>,
    auth: AuthUser,
    body: web::Json<CreateBooking>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let payment_method = match &body.payment_method {
        Some(value) => PaymentMethod::parse(value)
            .ok_or_else(|| ApiError::Validation(format!("Unknown payment method '{value}'.")))?,
        None => PaymentMethod::Online,
    };

    let tour = sqlx::query_as::<_, Tour>("SELECT * FROM tours WHERE id = ?")
        .bind(body.tour_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Tour not found.".into()))?;

    if !tour.is_bookable() {
        return Err(ApiError::InvalidState(
            "Tour is not available for booking.".into(),
        ));
    }

    let children = body.children.unwrap_or(0);
    let total_amount = tour.total_for(body.adults, children);

    // Contact snapshot falls back to the requester's own details.
    let (contact_name, contact_email, contact_phone) = match &body.contact_info {
        Some(info) => (info.name.clone(), info.email.clone(), info.phone.clone()),
        None => (auth.name.clone(), auth.email.clone(), None),
    };

    let booking_ref = generate_booking_ref();
    let now = Utc::now().naive_utc();

    let row = sqlx::query_as::<_, BookingRow>(
        r#"
        INSERT INTO bookings (tour_id, user_id, travel_date, adults, children, total_amount,
                              status, payment_status, payment_method, special_requests,
                              contact_name, contact_email, contact_phone, booking_ref,
                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 'Pending', 'Unpaid', ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(body.tour_id)
    .bind(auth.id)
    .bind(body.travel_date)
    .bind(body.adults)
    .bind(children)
    .bind(total_amount)
    .bind(payment_method.as_str())
    .bind(&body.special_requests)
    .bind(&contact_name)
    .bind(&contact_email)
    .bind(&contact_phone)
    .bind(&booking_ref)
    .bind(now)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Validation("Booking reference already exists.".into())
        }
        _ => ApiError::Database(e),
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Booking created successfully!",
        "data": BookingResponse::from(row),
    })))
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    owner: Option<i64>,
    status: Option<BookingStatus>,
    payment_status: Option<PaymentStatus>,
) {
    if let Some(user_id) = owner {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(payment) = payment_status {
        qb.push(" AND payment_status = ").push_bind(payment.as_str());
    }
}

pub async fn list_bookings(
    pool: web::Data<SqlitePool>,
    auth: AuthUser,
    filters: web::Query<BookingFilters>,
) -> Result<HttpResponse, ApiError> {
    let page = filters.page.unwrap_or(1).max(1);
    let limit = filters.limit.unwrap_or(10).max(1);
    let offset = (page - 1) * limit;

    let status = match &filters.status {
        Some(value) => Some(
            BookingStatus::parse(value)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status '{value}'.")))?,
        ),
        None => None,
    };
    let payment_status = match &filters.payment_status {
        Some(value) => Some(
            PaymentStatus::parse(value).ok_or_else(|| {
                ApiError::Validation(format!("Unknown payment status '{value}'."))
            })?,
        ),
        None => None,
    };

    let owner = owner_scope(&auth);

    let mut count_query =
        QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bookings WHERE 1 = 1");
    push_filters(&mut count_query, owner, status, payment_status);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(pool.get_ref())
        .await?;

    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM bookings WHERE 1 = 1");
    push_filters(&mut query, owner, status, payment_status);
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let rows: Vec<BookingRow> = query
        .build_query_as()
        .fetch_all(pool.get_ref())
        .await?;

    let data: Vec<BookingResponse> = rows.into_iter().map(BookingResponse::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
        "pagination": {
            "total": total,
            "page": page,
            "limit": limit,
            "pages": (total + limit - 1) / limit,
        },
    })))
}

async fn load_booking(pool: &SqlitePool, id: i64) -> Result<BookingRow, ApiError> {
    sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found.".into()))
}

pub async fn get_booking(
    pool: web::Data<SqlitePool>,
    auth: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let row = load_booking(pool.get_ref(), path.into_inner()).await?;

    if !auth.is_admin() && row.user_id != auth.id {
        return Err(ApiError::Forbidden(
            "Not authorized to view this booking.".into(),
        ));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": BookingResponse::from(row),
    })))
}

pub async fn update_booking(
    pool: web::Data<SqlitePool>,
    auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UpdateBooking>,
) -> Result<HttpResponse, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden(format!(
            "Access denied. Role '{}' is not authorized for this action.",
            auth.role
        )));
    }

    let mut row = load_booking(pool.get_ref(), path.into_inner()).await?;

    if let Some(value) = &body.status {
        let from = BookingStatus::parse(&row.status)
            .ok_or_else(|| ApiError::Validation("Stored booking status is unknown.".into()))?;
        let to = BookingStatus::parse(value)
            .ok_or_else(|| ApiError::Validation(format!("Unknown status '{value}'.")))?;
        if !from.can_transition(to) {
            return Err(ApiError::InvalidState(format!(
                "Cannot change booking status from {from} to {to}."
            )));
        }
        row.status = to.as_str().to_string();
    }

    if let Some(value) = &body.payment_status {
        let from = PaymentStatus::parse(&row.payment_status)
            .ok_or_else(|| ApiError::Validation("Stored payment status is unknown.".into()))?;
        let to = PaymentStatus::parse(value)
            .ok_or_else(|| ApiError::Validation(format!("Unknown payment status '{value}'.")))?;
        if !from.can_transition(to) {
            return Err(ApiError::InvalidState(format!(
                "Cannot change payment status from {from} to {to}."
            )));
        }
        row.payment_status = to.as_str().to_string();
    }

    if let Some(value) = &body.payment_method {
        let method = PaymentMethod::parse(value)
            .ok_or_else(|| ApiError::Validation(format!("Unknown payment method '{value}'.")))?;
        row.payment_method = method.as_str().to_string();
    }

    if let Some(date) = body.travel_date {
        row.travel_date = date;
    }
    if let Some(adults) = body.adults {
        if adults < 1 {
            return Err(ApiError::Validation("At least one adult is required.".into()));
        }
        row.adults = adults;
    }
    if let Some(children) = body.children {
        if children < 0 {
            return Err(ApiError::Validation("Children count cannot be negative.".into()));
        }
        row.children = children;
    }
    if let Some(requests) = &body.special_requests {
        if requests.len() > 500 {
            return Err(ApiError::Validation(
                "Special requests cannot exceed 500 characters.".into(),
            ));
        }
        row.special_requests = Some(requests.clone());
    }

    // Whole-record replace of the mutable columns; last write wins.
    let updated = sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET travel_date = ?, adults = ?, children = ?, status = ?, payment_status = ?,
            payment_method = ?, special_requests = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(row.travel_date)
    .bind(row.adults)
    .bind(row.children)
    .bind(&row.status)
    .bind(&row.payment_status)
    .bind(&row.payment_method)
    .bind(&row.special_requests)
    .bind(Utc::now().naive_utc())
    .bind(row.id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Booking updated!",
        "data": BookingResponse::from(updated),
    })))
}

pub async fn pay_booking(
    pool: web::Data<SqlitePool>,
    auth: AuthUser,
    path: web::Path<i64>,
    body: Option<web::Json<PayRequest>>,
) -> Result<HttpResponse, ApiError> {
    let row = load_booking(pool.get_ref(), path.into_inner()).await?;

    if !auth.is_admin() && row.user_id != auth.id {
        return Err(ApiError::Forbidden(
            "Not authorized to pay for this booking.".into(),
        ));
    }

    // Simulated payment: any paymentData is accepted untouched. A recognized
    // method overrides the one chosen at creation.
    let payment_method = body
        .as_ref()
        .and_then(|b| b.method.as_deref())
        .and_then(PaymentMethod::parse)
        .map(|m| m.as_str().to_string())
        .unwrap_or(row.payment_method);

    // Single UPDATE so Paid and Confirmed land together; repeating the call
    // re-applies the same state.
    let updated = sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET payment_status = 'Paid', status = 'Confirmed', payment_method = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&payment_method)
    .bind(Utc::now().naive_utc())
    .bind(row.id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Payment successful!",
        "data": BookingResponse::from(updated),
    })))
}
