use actix_web::{web, HttpResponse};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::errors::ApiError;
use crate::models::tour::{Tour, TourResponse, TourSearch};

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &TourSearch) {
    if let Some(search) = &params.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (title LIKE ").push_bind(pattern.clone());
        qb.push(" OR destination LIKE ").push_bind(pattern.clone());
        qb.push(" OR country LIKE ").push_bind(pattern);
        qb.push(")");
    }
    if let Some(category) = &params.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(status) = &params.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if params.featured == Some(true) {
        qb.push(" AND featured = 1");
    }
    if let Some(min) = params.min_price {
        qb.push(" AND price_adult >= ").push_bind(min);
    }
    if let Some(max) = params.max_price {
        qb.push(" AND price_adult <= ").push_bind(max);
    }
}

pub async fn list_tours(
    pool: web::Data<SqlitePool>,
    params: web::Query<TourSearch>,
) -> Result<HttpResponse, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);
    let offset = (page - 1) * limit;

    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tours WHERE 1 = 1");
    push_filters(&mut count_query, &params);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(pool.get_ref())
        .await?;

    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM tours WHERE 1 = 1");
    push_filters(&mut query, &params);
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let tours: Vec<Tour> = query.build_query_as().fetch_all(pool.get_ref()).await?;

    let data: Vec<TourResponse> = tours.into_iter().map(TourResponse::from).collect();

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

pub async fn get_tour(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let tour = sqlx::query_as::<_, Tour>("SELECT * FROM tours WHERE id = ?")
        .bind(path.into_inner())
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Tour not found.".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": TourResponse::from(tour),
    })))
}
