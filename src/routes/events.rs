use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedAccount,
    error::{ApiError, ApiResult},
    models::{Event, EventType, NewEvent},
    schema::{event_types, events},
    state::AppState,
    validate::FieldErrors,
};

use super::{patients::find_patient, profiles::profile_for_account};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub event_type_id: Uuid,
    pub patient_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub event_type_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub profile_id: Uuid,
}

fn validate_payload(payload: &EventRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("title", &payload.title);
    fields.require_non_empty("description", &payload.description);
    fields.finish()
}

fn find_event_type(conn: &mut PgConnection, event_type_id: Uuid) -> ApiResult<EventType> {
    event_types::table
        .find(event_type_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Event type not found"))
}

pub async fn create_event(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(payload): Json<EventRequest>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    // Check order: profile, then patient when supplied, then event type.
    let profile = profile_for_account(&mut conn, account.account_id)?;
    if let Some(patient_id) = payload.patient_id {
        find_patient(&mut conn, patient_id)?;
    }
    let event_type = find_event_type(&mut conn, payload.event_type_id)?;

    let new_event = NewEvent {
        id: Uuid::new_v4(),
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        start_time: payload.start_time,
        end_time: payload.end_time,
        event_type_id: event_type.id,
        patient_id: payload.patient_id,
        profile_id: profile.id,
    };

    diesel::insert_into(events::table)
        .values(&new_event)
        .execute(&mut conn)?;

    let event: Event = events::table.find(new_event.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(event))))
}

pub async fn update_event(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<EventRequest>,
) -> ApiResult<Json<EventResponse>> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    let event: Event = events::table
        .find(event_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    // Relations re-validated in full on update.
    profile_for_account(&mut conn, account.account_id)?;
    if let Some(patient_id) = payload.patient_id {
        find_patient(&mut conn, patient_id)?;
    }
    let event_type = find_event_type(&mut conn, payload.event_type_id)?;

    let now = Utc::now().naive_utc();
    diesel::update(events::table.find(event.id))
        .set((
            events::title.eq(payload.title.trim()),
            events::description.eq(payload.description.trim()),
            events::start_time.eq(payload.start_time),
            events::end_time.eq(payload.end_time),
            events::event_type_id.eq(event_type.id),
            events::patient_id.eq(payload.patient_id),
            events::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: Event = events::table.find(event.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<EventResponse>> {
    let mut conn = state.db()?;
    let event: Event = events::table
        .find(event_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok(Json(to_response(event)))
}

pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Vec<EventResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<Event> = events::table
        .order(events::start_time.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(events::table.find(event_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Event not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(event: Event) -> EventResponse {
    EventResponse {
        id: event.id,
        title: event.title,
        description: event.description,
        start_time: event.start_time,
        end_time: event.end_time,
        event_type_id: event.event_type_id,
        patient_id: event.patient_id,
        profile_id: event.profile_id,
    }
}
