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
    models::{MedicalAttentionMedicine, Medicine, NewMedicalAttentionMedicine},
    schema::{medical_attention_medicines, medicines},
    state::AppState,
    validate::FieldErrors,
};

use super::{medical_attentions::find_attention, medicines::find_medicine};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMedicineRequest {
    pub medicine_id: Uuid,
    pub details: String,
}

#[derive(Deserialize)]
pub struct UpdateAssignmentRequest {
    pub details: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub medical_attention_id: Uuid,
    pub medicine_id: Uuid,
    pub details: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedMedicine {
    pub id: Uuid,
    pub name: String,
    pub details: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionMedicinesResponse {
    pub medical_attention_id: Uuid,
    pub medicines: Vec<AssignedMedicine>,
}

fn find_assignment(
    conn: &mut PgConnection,
    attention_id: Uuid,
    medicine_id: Uuid,
) -> ApiResult<Option<MedicalAttentionMedicine>> {
    Ok(medical_attention_medicines::table
        .find((attention_id, medicine_id))
        .first(conn)
        .optional()?)
}

pub async fn assign_medicine(
    State(state): State<AppState>,
    Path(attention_id): Path<Uuid>,
    Json(payload): Json<AssignMedicineRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("details", &payload.details);
    fields.finish()?;

    let mut conn = state.db()?;

    find_attention(&mut conn, attention_id)?;
    find_medicine(&mut conn, payload.medicine_id)?;

    // The pair is the row's identity: assigning the same medicine twice is
    // a conflict, not a second row.
    if find_assignment(&mut conn, attention_id, payload.medicine_id)?.is_some() {
        return Err(ApiError::conflict(
            "Medicine is already assigned to this medical attention",
        ));
    }

    let new_assignment = NewMedicalAttentionMedicine {
        medical_attention_id: attention_id,
        medicine_id: payload.medicine_id,
        details: payload.details.trim().to_string(),
    };

    diesel::insert_into(medical_attention_medicines::table)
        .values(&new_assignment)
        .execute(&mut conn)?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            medical_attention_id: attention_id,
            medicine_id: new_assignment.medicine_id,
            details: new_assignment.details,
        }),
    ))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    Path((attention_id, medicine_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("details", &payload.details);
    fields.finish()?;

    let mut conn = state.db()?;

    find_attention(&mut conn, attention_id)?;
    find_medicine(&mut conn, medicine_id)?;

    if find_assignment(&mut conn, attention_id, medicine_id)?.is_none() {
        return Err(ApiError::not_found(
            "Medicine is not assigned with medical attention",
        ));
    }

    let now = Utc::now().naive_utc();
    diesel::update(medical_attention_medicines::table.find((attention_id, medicine_id)))
        .set((
            medical_attention_medicines::details.eq(payload.details.trim()),
            medical_attention_medicines::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: MedicalAttentionMedicine = medical_attention_medicines::table
        .find((attention_id, medicine_id))
        .first(&mut conn)?;

    Ok(Json(AssignmentResponse {
        medical_attention_id: updated.medical_attention_id,
        medicine_id: updated.medicine_id,
        details: updated.details,
    }))
}

pub async fn remove_assignment(
    State(state): State<AppState>,
    Path((attention_id, medicine_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    find_attention(&mut conn, attention_id)?;
    find_medicine(&mut conn, medicine_id)?;

    let deleted =
        diesel::delete(medical_attention_medicines::table.find((attention_id, medicine_id)))
            .execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found(
            "Medicine is not assigned with medical attention",
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_assigned_medicines(
    State(state): State<AppState>,
    Path(attention_id): Path<Uuid>,
) -> ApiResult<Json<AttentionMedicinesResponse>> {
    let mut conn = state.db()?;

    find_attention(&mut conn, attention_id)?;

    let rows: Vec<(MedicalAttentionMedicine, Medicine)> = medical_attention_medicines::table
        .inner_join(medicines::table)
        .filter(medical_attention_medicines::medical_attention_id.eq(attention_id))
        .order(medicines::name.asc())
        .load(&mut conn)?;

    let assigned = rows
        .into_iter()
        .map(|(assignment, medicine)| AssignedMedicine {
            id: medicine.id,
            name: medicine.name,
            details: assignment.details,
        })
        .collect();

    Ok(Json(AttentionMedicinesResponse {
        medical_attention_id: attention_id,
        medicines: assigned,
    }))
}
