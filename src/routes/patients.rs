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
    auth::AuthenticatedAccount,
    error::{ApiError, ApiResult},
    models::{NewPatient, Owner, Patient, Species},
    schema::{owners, patients, profiles, species},
    state::AppState,
    validate::FieldErrors,
};

use super::{profiles::profile_for_account, species::leaf_species};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    pub name: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub day_of_death: Option<NaiveDate>,
    pub main_picture: Option<String>,
    pub subspecies_id: Uuid,
    pub owner_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub day_of_death: Option<NaiveDate>,
    pub main_picture: Option<String>,
    pub subspecies_id: Uuid,
    pub owner_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubspeciesRef {
    pub id: Uuid,
    pub name: String,
    pub species: SpeciesRef,
}

/// Joined projection for get-by-id: related rows embedded, raw foreign-key
/// columns left out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub day_of_death: Option<NaiveDate>,
    pub main_picture: Option<String>,
    pub owner: PersonRef,
    pub subspecies: SubspeciesRef,
    pub profile: PersonRef,
}

fn validate_payload(payload: &PatientRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.require_positive("weight", payload.weight);
    fields.finish()
}

pub(super) fn find_patient(conn: &mut PgConnection, patient_id: Uuid) -> ApiResult<Patient> {
    patients::table
        .find(patient_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Patient not found"))
}

pub async fn create_patient(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(payload): Json<PatientRequest>,
) -> ApiResult<(StatusCode, Json<PatientResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    // Relation checks run profile, subspecies, owner, short-circuiting on
    // the first missing row.
    let profile = profile_for_account(&mut conn, account.account_id)?;
    let subspecies = leaf_species(&mut conn, payload.subspecies_id)?;
    let owner: Option<Owner> = owners::table
        .find(payload.owner_id)
        .first(&mut conn)
        .optional()?;
    let owner = owner.ok_or_else(|| ApiError::not_found("Owner not found"))?;

    let new_patient = NewPatient {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        weight: payload.weight,
        birthday: payload.birthday,
        day_of_death: payload.day_of_death,
        main_picture: payload.main_picture,
        subspecies_id: subspecies.id,
        owner_id: owner.id,
        profile_id: profile.id,
    };

    diesel::insert_into(patients::table)
        .values(&new_patient)
        .execute(&mut conn)?;

    let patient: Patient = patients::table.find(new_patient.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(patient))))
}

pub async fn update_patient(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Path(patient_id): Path<Uuid>,
    Json(payload): Json<PatientRequest>,
) -> ApiResult<Json<PatientResponse>> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    // Every relation is re-validated on update, the caller's profile
    // included.
    let patient = find_patient(&mut conn, patient_id)?;
    profile_for_account(&mut conn, account.account_id)?;
    let subspecies = leaf_species(&mut conn, payload.subspecies_id)?;
    let owner: Option<Owner> = owners::table
        .find(payload.owner_id)
        .first(&mut conn)
        .optional()?;
    let owner = owner.ok_or_else(|| ApiError::not_found("Owner not found"))?;

    let now = Utc::now().naive_utc();
    diesel::update(patients::table.find(patient.id))
        .set((
            patients::name.eq(payload.name.trim()),
            patients::weight.eq(payload.weight),
            patients::birthday.eq(payload.birthday),
            patients::day_of_death.eq(payload.day_of_death),
            patients::main_picture.eq(payload.main_picture),
            patients::subspecies_id.eq(subspecies.id),
            patients::owner_id.eq(owner.id),
            patients::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: Patient = patients::table.find(patient.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<Json<PatientDetail>> {
    let mut conn = state.db()?;

    let patient = find_patient(&mut conn, patient_id)?;

    let owner: Owner = owners::table.find(patient.owner_id).first(&mut conn)?;
    let subspecies: Species = species::table
        .find(patient.subspecies_id)
        .first(&mut conn)?;
    let parent_id = subspecies
        .parent_species_id
        .ok_or_else(|| ApiError::internal("subspecies row lost its parent"))?;
    let parent: Species = species::table.find(parent_id).first(&mut conn)?;
    let (profile_id, profile_name, profile_lastname): (Uuid, String, String) = profiles::table
        .find(patient.profile_id)
        .select((profiles::id, profiles::name, profiles::lastname))
        .first(&mut conn)?;

    Ok(Json(PatientDetail {
        id: patient.id,
        name: patient.name,
        weight: patient.weight,
        birthday: patient.birthday,
        day_of_death: patient.day_of_death,
        main_picture: patient.main_picture,
        owner: PersonRef {
            id: owner.id,
            name: owner.name,
            lastname: owner.lastname,
        },
        subspecies: SubspeciesRef {
            id: subspecies.id,
            name: subspecies.name,
            species: SpeciesRef {
                id: parent.id,
                name: parent.name,
            },
        },
        profile: PersonRef {
            id: profile_id,
            name: profile_name,
            lastname: profile_lastname,
        },
    }))
}

pub async fn list_patients(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PatientResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<Patient> = patients::table.order(patients::name.asc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = diesel::delete(patients::table.find(patient_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Patient not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(patient: Patient) -> PatientResponse {
    PatientResponse {
        id: patient.id,
        name: patient.name,
        weight: patient.weight,
        birthday: patient.birthday,
        day_of_death: patient.day_of_death,
        main_picture: patient.main_picture,
        subspecies_id: patient.subspecies_id,
        owner_id: patient.owner_id,
        profile_id: patient.profile_id,
    }
}
