use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Medicine, NewMedicine},
    schema::medicines,
    state::AppState,
    validate::FieldErrors,
};

#[derive(Deserialize)]
pub struct MedicineRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct MedicineResponse {
    pub id: Uuid,
    pub name: String,
}

pub(super) fn find_medicine(conn: &mut PgConnection, medicine_id: Uuid) -> ApiResult<Medicine> {
    medicines::table
        .find(medicine_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Medicine not found"))
}

pub async fn create_medicine(
    State(state): State<AppState>,
    Json(payload): Json<MedicineRequest>,
) -> ApiResult<(StatusCode, Json<MedicineResponse>)> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.finish()?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;

    let duplicate: Option<Medicine> = medicines::table
        .filter(medicines::name.eq(&name))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::conflict("Medicine already exists with this name"));
    }

    let new_medicine = NewMedicine {
        id: Uuid::new_v4(),
        name,
    };

    diesel::insert_into(medicines::table)
        .values(&new_medicine)
        .execute(&mut conn)?;

    let row: Medicine = medicines::table.find(new_medicine.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn get_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
) -> ApiResult<Json<MedicineResponse>> {
    let mut conn = state.db()?;
    let row = find_medicine(&mut conn, medicine_id)?;
    Ok(Json(to_response(row)))
}

pub async fn list_medicines(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MedicineResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<Medicine> = medicines::table
        .order(medicines::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn update_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
    Json(payload): Json<MedicineRequest>,
) -> ApiResult<Json<MedicineResponse>> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.finish()?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;
    let existing = find_medicine(&mut conn, medicine_id)?;

    let duplicate: Option<Medicine> = medicines::table
        .filter(medicines::name.eq(&name))
        .filter(medicines::id.ne(existing.id))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::conflict("Medicine already exists with this name"));
    }

    let now = Utc::now().naive_utc();
    diesel::update(medicines::table.find(existing.id))
        .set((medicines::name.eq(&name), medicines::updated_at.eq(now)))
        .execute(&mut conn)?;

    let updated: Medicine = medicines::table.find(existing.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn delete_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(medicines::table.find(medicine_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Medicine not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(row: Medicine) -> MedicineResponse {
    MedicineResponse {
        id: row.id,
        name: row.name,
    }
}
