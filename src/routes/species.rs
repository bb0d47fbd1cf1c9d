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
    models::{NewSpecies, Species},
    schema::species,
    state::AppState,
    validate::FieldErrors,
};

#[derive(Deserialize)]
pub struct SpeciesRequest {
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_species_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesTreeEntry {
    pub id: Uuid,
    pub name: String,
    pub subspecies: Vec<SpeciesResponse>,
}

fn validate_name(name: &str) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", name);
    fields.finish()
}

/// Patients may only reference a subspecies, a species row whose parent is
/// non-null. A top-level id resolves to "Subspecies not found".
pub(super) fn leaf_species(conn: &mut PgConnection, subspecies_id: Uuid) -> ApiResult<Species> {
    let row: Option<Species> = species::table
        .find(subspecies_id)
        .first(conn)
        .optional()?;
    match row {
        Some(row) if row.parent_species_id.is_some() => Ok(row),
        _ => Err(ApiError::not_found("Subspecies not found")),
    }
}

pub async fn create_species(
    State(state): State<AppState>,
    Json(payload): Json<SpeciesRequest>,
) -> ApiResult<(StatusCode, Json<SpeciesResponse>)> {
    validate_name(&payload.name)?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;

    let duplicate: Option<Species> = species::table
        .filter(species::parent_species_id.is_null())
        .filter(species::name.eq(&name))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::conflict("Species already exists with this name"));
    }

    let new_species = NewSpecies {
        id: Uuid::new_v4(),
        name,
        parent_species_id: None,
    };

    diesel::insert_into(species::table)
        .values(&new_species)
        .execute(&mut conn)?;

    let row: Species = species::table.find(new_species.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn create_subspecies(
    State(state): State<AppState>,
    Path(species_id): Path<Uuid>,
    Json(payload): Json<SpeciesRequest>,
) -> ApiResult<(StatusCode, Json<SpeciesResponse>)> {
    validate_name(&payload.name)?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;

    let parent: Option<Species> = species::table
        .find(species_id)
        .first(&mut conn)
        .optional()?;
    let parent = match parent {
        Some(row) if row.parent_species_id.is_none() => row,
        _ => return Err(ApiError::not_found("Species not found")),
    };

    let duplicate: Option<Species> = species::table
        .filter(species::parent_species_id.eq(Some(parent.id)))
        .filter(species::name.eq(&name))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(ApiError::conflict("Subspecies already exists"));
    }

    let new_species = NewSpecies {
        id: Uuid::new_v4(),
        name,
        parent_species_id: Some(parent.id),
    };

    diesel::insert_into(species::table)
        .values(&new_species)
        .execute(&mut conn)?;

    let row: Species = species::table.find(new_species.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update_species(
    State(state): State<AppState>,
    Path(species_id): Path<Uuid>,
    Json(payload): Json<SpeciesRequest>,
) -> ApiResult<Json<SpeciesResponse>> {
    validate_name(&payload.name)?;
    let name = payload.name.trim().to_string();

    let mut conn = state.db()?;

    let existing: Species = species::table
        .find(species_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Species not found"))?;

    // Uniqueness stays scoped to the row's sibling level.
    let conflict: Option<Species> = if let Some(parent_id) = existing.parent_species_id {
        species::table
            .filter(species::parent_species_id.eq(Some(parent_id)))
            .filter(species::name.eq(&name))
            .filter(species::id.ne(species_id))
            .first(&mut conn)
            .optional()?
    } else {
        species::table
            .filter(species::parent_species_id.is_null())
            .filter(species::name.eq(&name))
            .filter(species::id.ne(species_id))
            .first(&mut conn)
            .optional()?
    };
    if conflict.is_some() {
        let message = if existing.parent_species_id.is_some() {
            "Subspecies already exists"
        } else {
            "Species already exists with this name"
        };
        return Err(ApiError::conflict(message));
    }

    let now = Utc::now().naive_utc();
    diesel::update(species::table.find(species_id))
        .set((species::name.eq(&name), species::updated_at.eq(now)))
        .execute(&mut conn)?;

    let updated: Species = species::table.find(species_id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn delete_species(
    State(state): State<AppState>,
    Path(species_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(species::table.find(species_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Species not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_all_species(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SpeciesTreeEntry>>> {
    let mut conn = state.db()?;

    let top_level: Vec<Species> = species::table
        .filter(species::parent_species_id.is_null())
        .order(species::name.asc())
        .load(&mut conn)?;

    let children: Vec<Species> = species::table
        .filter(species::parent_species_id.is_not_null())
        .order(species::name.asc())
        .load(&mut conn)?;

    let response = top_level
        .into_iter()
        .map(|parent| {
            let subspecies = children
                .iter()
                .filter(|child| child.parent_species_id == Some(parent.id))
                .cloned()
                .map(to_response)
                .collect();
            SpeciesTreeEntry {
                id: parent.id,
                name: parent.name,
                subspecies,
            }
        })
        .collect();

    Ok(Json(response))
}

fn to_response(row: Species) -> SpeciesResponse {
    SpeciesResponse {
        id: row.id,
        name: row.name,
        parent_species_id: row.parent_species_id,
    }
}
