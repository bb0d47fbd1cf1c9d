use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedAccount,
    error::{ApiError, ApiResult},
    models::{NewProfile, Profile},
    schema::{accounts, profiles},
    state::AppState,
    validate::FieldErrors,
};

use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub picture: Option<String>,
    pub college: String,
    pub review: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub picture: Option<String>,
    pub admin: bool,
    pub college: String,
    pub review: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWithEmail {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub email: String,
}

fn validate_payload(payload: &ProfileRequest) -> ApiResult<()> {
    let mut fields = FieldErrors::new();
    fields.require_non_empty("name", &payload.name);
    fields.require_non_empty("lastname", &payload.lastname);
    fields.require_non_empty("college", &payload.college);
    fields.require_non_empty("review", &payload.review);
    fields.finish()
}

/// Shared by every route that must resolve the caller's profile before
/// touching patient or clinical data.
pub(super) fn profile_for_account(
    conn: &mut PgConnection,
    account_id: Uuid,
) -> ApiResult<Profile> {
    profiles::table
        .filter(profiles::account_id.eq(account_id))
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Profile not found for this user"))
}

pub async fn create_profile(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(payload): Json<ProfileRequest>,
) -> ApiResult<(StatusCode, Json<ProfileResponse>)> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;

    let account_exists: Option<Uuid> = accounts::table
        .filter(accounts::id.eq(account.account_id))
        .select(accounts::id)
        .first(&mut conn)
        .optional()?;
    if account_exists.is_none() {
        return Err(ApiError::not_found("Invalid user"));
    }

    let existing: Option<Profile> = profiles::table
        .filter(profiles::account_id.eq(account.account_id))
        .first(&mut conn)
        .optional()?;
    if existing.is_some() {
        return Err(ApiError::conflict("Profile already exists for this user"));
    }

    // New profiles are never admin, whatever the client claims.
    let new_profile = NewProfile {
        id: Uuid::new_v4(),
        account_id: account.account_id,
        name: payload.name.trim().to_string(),
        lastname: payload.lastname.trim().to_string(),
        birthday: payload.birthday,
        picture: payload.picture,
        admin: false,
        college: payload.college.trim().to_string(),
        review: payload.review.trim().to_string(),
    };

    diesel::insert_into(profiles::table)
        .values(&new_profile)
        .execute(&mut conn)?;

    let profile: Profile = profiles::table.find(new_profile.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(to_response(profile))))
}

pub async fn get_profile(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> ApiResult<Json<ProfileResponse>> {
    let mut conn = state.db()?;
    let profile = profile_for_account(&mut conn, account.account_id)?;
    Ok(Json(to_response(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
    Json(payload): Json<ProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_payload(&payload)?;

    let mut conn = state.db()?;
    let profile = profile_for_account(&mut conn, account.account_id)?;

    // Full-replace semantics: picture is overwritten with whatever the
    // client sent, absent meaning null.
    let now = Utc::now().naive_utc();
    diesel::update(profiles::table.find(profile.id))
        .set((
            profiles::name.eq(payload.name.trim()),
            profiles::lastname.eq(payload.lastname.trim()),
            profiles::birthday.eq(payload.birthday),
            profiles::picture.eq(payload.picture),
            profiles::college.eq(payload.college.trim()),
            profiles::review.eq(payload.review.trim()),
            profiles::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: Profile = profiles::table.find(profile.id).first(&mut conn)?;
    Ok(Json(to_response(updated)))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> ApiResult<StatusCode> {
    let mut conn = state.db()?;
    let profile = profile_for_account(&mut conn, account.account_id)?;

    diesel::delete(profiles::table.find(profile.id)).execute(&mut conn)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_all_profiles(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> ApiResult<Json<Vec<ProfileWithEmail>>> {
    let mut conn = state.db()?;

    let caller = profile_for_account(&mut conn, account.account_id)?;
    if !caller.admin {
        return Err(ApiError::forbidden("Admin permission required"));
    }

    let rows: Vec<(Profile, String)> = profiles::table
        .inner_join(accounts::table)
        .select((profiles::all_columns, accounts::email))
        .order(profiles::lastname.asc())
        .load(&mut conn)?;

    let response = rows
        .into_iter()
        .map(|(profile, email)| ProfileWithEmail {
            profile: to_response(profile),
            email,
        })
        .collect();

    Ok(Json(response))
}

fn to_response(profile: Profile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id,
        name: profile.name,
        lastname: profile.lastname,
        birthday: profile.birthday,
        picture: profile.picture,
        admin: profile.admin,
        college: profile.college,
        review: profile.review,
    }
}
