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
    models::{EventType, NewEventType},
    schema::event_types,
    state::AppState,
    validate::FieldErrors,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeRequest {
    pub name: String,
    pub type_color: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub type_color: String,
}

fn validate_payload(payload: &EventTypeRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.require_non_empty("typeColor", &payload.type_color);
    fields.finish()
}

pub async fn create_event_type(
    State(state): State<AppState>,
    Json(payload): Json<EventTypeRequest>,
) -> ApiResult<(StatusCode, Json<EventTypeResponse>)> {
    validate_payload(&payload)?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;

    let duplicate: Option<EventType> = event_types::table
        .filter(event_types::name.eq(&name))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "Event type already exists with this name",
        ));
    }

    let new_event_type = NewEventType {
        id: Uuid::new_v4(),
        name,
        type_color: payload.type_color.trim().to_string(),
    };

    diesel::insert_into(event_types::table)
        .values(&new_event_type)
        .execute(&mut conn)?;

    let row: EventType = event_types::table.find(new_event_type.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn get_event_type(
    State(state): State<AppState>,
    Path(event_type_id): Path<Uuid>,
) -> ApiResult<Json<EventTypeResponse>> {
    let mut conn = state.db()?;
    let row: EventType = event_types::table
        .find(event_type_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Event type not found"))?;
    Ok(Json(to_response(row)))
}

pub async fn list_event_types(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EventTypeResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<EventType> = event_types::table
        .order(event_types::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn update_event_type(
    State(state): State<AppState>,
    Path(event_type_id): Path<Uuid>,
    Json(payload): Json<EventTypeRequest>,
) -> ApiResult<Json<EventTypeResponse>> {
    validate_payload(&payload)?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;

    let existing: EventType = event_types::table
        .find(event_type_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Event type not found"))?;

    let duplicate: Option<EventType> = event_types::table
        .filter(event_types::name.eq(&name))
        .filter(event_types::id.ne(existing.id))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "Event type already exists with this name",
        ));
    }

    let now = Utc::now().naive_utc();
    diesel::update(event_types::table.find(existing.id))
        .set((
            event_types::name.eq(&name),
            event_types::type_color.eq(payload.type_color.trim()),
            event_types::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: EventType = event_types::table.find(existing.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn delete_event_type(
    State(state): State<AppState>,
    Path(event_type_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(event_types::table.find(event_type_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Event type not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(row: EventType) -> EventTypeResponse {
    EventTypeResponse {
        id: row.id,
        name: row.name,
        type_color: row.type_color,
    }
}
