use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedAccount,
    error::{ApiError, ApiResult},
    models::{MedicalAttention, NewMedicalAttention},
    schema::{medical_attentions, profiles},
    state::AppState,
    validate::FieldErrors,
};

use super::{patients::find_patient, profiles::profile_for_account};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalAttentionRequest {
    pub weight: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub result_notes: String,
    pub patient_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalAttentionResponse {
    pub id: Uuid,
    pub weight: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub result_notes: String,
    pub patient_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

fn validate_payload(payload: &MedicalAttentionRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_positive("weight", payload.weight);
    fields.require_non_empty("description", &payload.description);
    fields.require_non_empty("resultNotes", &payload.result_notes);
    fields.finish()
}

pub(super) fn find_attention(
    conn: &mut PgConnection,
    attention_id: Uuid,
) -> ApiResult<MedicalAttention> {
    medical_attentions::table
        .find(attention_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Medical attention not found"))
}

pub async fn create_attention(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(payload): Json<MedicalAttentionRequest>,
) -> ApiResult<(StatusCode, Json<MedicalAttentionResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    let profile = profile_for_account(&mut conn, account.account_id)?;
    let patient = find_patient(&mut conn, payload.patient_id)?;

    let new_attention = NewMedicalAttention {
        id: Uuid::new_v4(),
        weight: payload.weight,
        description: payload.description.trim().to_string(),
        date: payload.date,
        result_notes: payload.result_notes.trim().to_string(),
        patient_id: patient.id,
        profile_id: profile.id,
    };

    diesel::insert_into(medical_attentions::table)
        .values(&new_attention)
        .execute(&mut conn)?;

    let attention: MedicalAttention = medical_attentions::table
        .find(new_attention.id)
        .first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(attention))))
}

pub async fn update_attention(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Path(attention_id): Path<Uuid>,
    Json(payload): Json<MedicalAttentionRequest>,
) -> ApiResult<Json<MedicalAttentionResponse>> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    let attention = find_attention(&mut conn, attention_id)?;
    profile_for_account(&mut conn, account.account_id)?;
    let patient = find_patient(&mut conn, payload.patient_id)?;

    let now = Utc::now().naive_utc();
    diesel::update(medical_attentions::table.find(attention.id))
        .set((
            medical_attentions::weight.eq(payload.weight),
            medical_attentions::description.eq(payload.description.trim()),
            medical_attentions::date.eq(payload.date),
            medical_attentions::result_notes.eq(payload.result_notes.trim()),
            medical_attentions::patient_id.eq(patient.id),
            medical_attentions::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: MedicalAttention = medical_attentions::table
        .find(attention.id)
        .first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn get_attention(
    State(state): State<AppState>,
    Path(attention_id): Path<Uuid>,
) -> ApiResult<Json<MedicalAttentionResponse>> {
    let mut conn = state.db()?;
    let attention = find_attention(&mut conn, attention_id)?;
    Ok(Json(to_response(attention)))
}

pub async fn list_attentions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MedicalAttentionResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<MedicalAttention> = medical_attentions::table
        .order(medical_attentions::date.desc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn list_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MedicalAttentionResponse>>> {
    let mut conn = state.db()?;

    find_patient(&mut conn, patient_id)?;

    let rows: Vec<MedicalAttention> = medical_attentions::table
        .filter(medical_attentions::patient_id.eq(patient_id))
        .order(medical_attentions::date.desc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn list_by_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MedicalAttentionResponse>>> {
    let mut conn = state.db()?;

    let exists: Option<Uuid> = profiles::table
        .find(profile_id)
        .select(profiles::id)
        .first(&mut conn)
        .optional()?;
    if exists.is_none() {
        return Err(ApiError::not_found("Profile not found"));
    }

    let rows: Vec<MedicalAttention> = medical_attentions::table
        .filter(medical_attentions::profile_id.eq(profile_id))
        .order(medical_attentions::date.desc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn list_by_date(
    State(state): State<AppState>,
    Path(day): Path<NaiveDate>,
) -> ApiResult<Json<Vec<MedicalAttentionResponse>>> {
    let mut conn = state.db()?;

    let start = day.and_time(chrono::NaiveTime::MIN);
    let end = start + chrono::Duration::days(1);

    let rows: Vec<MedicalAttention> = medical_attentions::table
        .filter(medical_attentions::date.ge(start))
        .filter(medical_attentions::date.lt(end))
        .order(medical_attentions::date.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

// Best-effort range query: plain inclusive day bounds on the timestamp
// column, no timezone handling beyond what the column provides.
pub async fn list_between_dates(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<MedicalAttentionResponse>>> {
    if range.to < range.from {
        return Err(ApiError::bad_request("to must not be before from"));
    }

    let mut conn = state.db()?;

    let start = range.from.and_time(chrono::NaiveTime::MIN);
    let end = range.to.and_time(chrono::NaiveTime::MIN) + chrono::Duration::days(1);

    let rows: Vec<MedicalAttention> = medical_attentions::table
        .filter(medical_attentions::date.ge(start))
        .filter(medical_attentions::date.lt(end))
        .order(medical_attentions::date.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn delete_attention(
    State(state): State<AppState>,
    Path(attention_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted =
        diesel::delete(medical_attentions::table.find(attention_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Medical attention not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(attention: MedicalAttention) -> MedicalAttentionResponse {
    MedicalAttentionResponse {
        id: attention.id,
        weight: attention.weight,
        description: attention.description,
        date: attention.date,
        result_notes: attention.result_notes,
        patient_id: attention.patient_id,
        profile_id: attention.profile_id,
    }
}
