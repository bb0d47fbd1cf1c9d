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
    models::{DocumentFile, NewDocumentFile},
    schema::document_files,
    state::AppState,
    validate::FieldErrors,
};

use super::{medical_attentions::find_attention, patients::find_patient};

const DOCUMENT_TYPES: &[&str] = &["image", "pdf", "analysis", "other"];

#[derive(Deserialize)]
pub struct DocumentFileRequest {
    pub name: String,
    pub link: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFileResponse {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub patient_id: Option<Uuid>,
    pub medical_attention_id: Option<Uuid>,
}

fn validate_payload(payload: &DocumentFileRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.require_url("link", &payload.link);
    if !DOCUMENT_TYPES.contains(&payload.doc_type.trim()) {
        fields.push(
            "type",
            format!("type must be one of: {}", DOCUMENT_TYPES.join(", ")),
        );
    }
    fields.finish()
}

fn find_document(conn: &mut PgConnection, document_id: Uuid) -> ApiResult<DocumentFile> {
    document_files::table
        .find(document_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Document not found"))
}

/// Name uniqueness is scoped to the owning entity, whichever of the two it
/// is.
fn name_conflict(
    conn: &mut PgConnection,
    patient_id: Option<Uuid>,
    attention_id: Option<Uuid>,
    name: &str,
    exclude: Option<Uuid>,
) -> ApiResult<bool> {
    let mut query = document_files::table.into_boxed();
    if let Some(patient_id) = patient_id {
        query = query.filter(document_files::patient_id.eq(patient_id));
    }
    if let Some(attention_id) = attention_id {
        query = query.filter(document_files::medical_attention_id.eq(attention_id));
    }
    query = query.filter(document_files::name.eq(name));
    if let Some(exclude) = exclude {
        query = query.filter(document_files::id.ne(exclude));
    }

    let existing: Option<DocumentFile> = query.first(conn).optional()?;
    Ok(existing.is_some())
}

pub async fn create_for_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
    Json(payload): Json<DocumentFileRequest>,
) -> ApiResult<(StatusCode, Json<DocumentFileResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    find_patient(&mut conn, patient_id)?;

    let name = payload.name.trim().to_string();
    if name_conflict(&mut conn, Some(patient_id), None, &name, None)? {
        return Err(ApiError::conflict("Document already exists with this name"));
    }

    let new_document = NewDocumentFile {
        id: Uuid::new_v4(),
        name,
        link: payload.link.trim().to_string(),
        doc_type: payload.doc_type.trim().to_string(),
        patient_id: Some(patient_id),
        medical_attention_id: None,
    };

    diesel::insert_into(document_files::table)
        .values(&new_document)
        .execute(&mut conn)?;

    let document: DocumentFile = document_files::table.find(new_document.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(document))))
}

pub async fn create_for_attention(
    State(state): State<AppState>,
    Path(attention_id): Path<Uuid>,
    Json(payload): Json<DocumentFileRequest>,
) -> ApiResult<(StatusCode, Json<DocumentFileResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    find_attention(&mut conn, attention_id)?;

    let name = payload.name.trim().to_string();
    if name_conflict(&mut conn, None, Some(attention_id), &name, None)? {
        return Err(ApiError::conflict("Document already exists with this name"));
    }

    let new_document = NewDocumentFile {
        id: Uuid::new_v4(),
        name,
        link: payload.link.trim().to_string(),
        doc_type: payload.doc_type.trim().to_string(),
        patient_id: None,
        medical_attention_id: Some(attention_id),
    };

    diesel::insert_into(document_files::table)
        .values(&new_document)
        .execute(&mut conn)?;

    let document: DocumentFile = document_files::table.find(new_document.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(document))))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<DocumentFileResponse>> {
    let mut conn = state.db()?;
    let document = find_document(&mut conn, document_id)?;
    Ok(Json(to_response(document)))
}

pub async fn list_for_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DocumentFileResponse>>> {
    let mut conn = state.db()?;

    find_patient(&mut conn, patient_id)?;

    let rows: Vec<DocumentFile> = document_files::table
        .filter(document_files::patient_id.eq(patient_id))
        .order(document_files::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn list_for_attention(
    State(state): State<AppState>,
    Path(attention_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DocumentFileResponse>>> {
    let mut conn = state.db()?;

    find_attention(&mut conn, attention_id)?;

    let rows: Vec<DocumentFile> = document_files::table
        .filter(document_files::medical_attention_id.eq(attention_id))
        .order(document_files::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<DocumentFileRequest>,
) -> ApiResult<Json<DocumentFileResponse>> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;
    let document = find_document(&mut conn, document_id)?;

    let name = payload.name.trim().to_string();
    if name_conflict(
        &mut conn,
        document.patient_id,
        document.medical_attention_id,
        &name,
        Some(document.id),
    )? {
        return Err(ApiError::conflict("Document already exists with this name"));
    }

    let now = Utc::now().naive_utc();
    diesel::update(document_files::table.find(document.id))
        .set((
            document_files::name.eq(&name),
            document_files::link.eq(payload.link.trim()),
            document_files::doc_type.eq(payload.doc_type.trim()),
            document_files::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: DocumentFile = document_files::table.find(document.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(document_files::table.find(document_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Document not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(document: DocumentFile) -> DocumentFileResponse {
    DocumentFileResponse {
        id: document.id,
        name: document.name,
        link: document.link,
        doc_type: document.doc_type,
        patient_id: document.patient_id,
        medical_attention_id: document.medical_attention_id,
    }
}
