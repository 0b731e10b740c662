//! Reference data endpoints.
//!
//! `GET /reference/breeds` — seeded dog breed catalogue
//! `GET /reference/consultation-reasons` — presenting-complaint options
//!
//! Both feed frontend dropdowns; the rows are seeded at startup and
//! read-only afterwards.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::{ConsultationReason, DogBreed};

/// `GET /reference/breeds` — breed names, alphabetical.
pub async fn breeds(State(ctx): State<ApiContext>) -> Result<Json<Vec<DogBreed>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(repository::list_dog_breeds(&conn)?))
}

/// `GET /reference/consultation-reasons` — complaint options in display order.
pub async fn consultation_reasons(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<ConsultationReason>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(repository::list_consultation_reasons(&conn)?))
}
