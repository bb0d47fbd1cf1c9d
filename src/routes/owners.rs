use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{NewOwner, Owner},
    schema::owners,
    state::AppState,
    validate::FieldErrors,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRequest {
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub direction: String,
    pub phone: String,
    pub dni: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub direction: String,
    pub phone: String,
    pub dni: Option<String>,
    pub email: Option<String>,
}

fn validate_payload(payload: &OwnerRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.require_non_empty("lastname", &payload.lastname);
    fields.require_non_empty("direction", &payload.direction);
    fields.require_non_empty("phone", &payload.phone);
    fields.optional_email("email", payload.email.as_deref());
    fields.finish()
}

fn find_owner(conn: &mut PgConnection, owner_id: Uuid) -> ApiResult<Owner> {
    owners::table
        .find(owner_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Owner not found"))
}

pub async fn create_owner(
    State(state): State<AppState>,
    Json(payload): Json<OwnerRequest>,
) -> ApiResult<(StatusCode, Json<OwnerResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;
    let new_owner = NewOwner {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        lastname: payload.lastname.trim().to_string(),
        birthday: payload.birthday,
        direction: payload.direction.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        dni: payload.dni,
        email: payload.email,
    };

    diesel::insert_into(owners::table)
        .values(&new_owner)
        .execute(&mut conn)?;

    let owner: Owner = owners::table.find(new_owner.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(owner))))
}

pub async fn get_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> ApiResult<Json<OwnerResponse>> {
    let mut conn = state.db()?;
    let owner = find_owner(&mut conn, owner_id)?;
    Ok(Json(to_response(owner)))
}

pub async fn list_owners(State(state): State<AppState>) -> ApiResult<Json<Vec<OwnerResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<Owner> = owners::table.order(owners::lastname.asc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn update_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<OwnerRequest>,
) -> ApiResult<Json<OwnerResponse>> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;
    let owner = find_owner(&mut conn, owner_id)?;

    // Full replace: dni and email are overwritten with whatever the client
    // sent, absent meaning null.
    let now = Utc::now().naive_utc();
    diesel::update(owners::table.find(owner.id))
        .set((
            owners::name.eq(payload.name.trim()),
            owners::lastname.eq(payload.lastname.trim()),
            owners::birthday.eq(payload.birthday),
            owners::direction.eq(payload.direction.trim()),
            owners::phone.eq(payload.phone.trim()),
            owners::dni.eq(payload.dni),
            owners::email.eq(payload.email),
            owners::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: Owner = owners::table.find(owner.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn delete_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(owners::table.find(owner_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Owner not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(owner: Owner) -> OwnerResponse {
    OwnerResponse {
        id: owner.id,
        name: owner.name,
        lastname: owner.lastname,
        birthday: owner.birthday,
        direction: owner.direction,
        phone: owner.phone,
        dni: owner.dni,
        email: owner.email,
    }
}
