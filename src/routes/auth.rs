use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use axum_extra::{headers::Cookie, typed_header::TypedHeader};
use chrono::{Duration as ChronoDuration, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{password, AuthenticatedAccount},
    error::{ApiError, ApiResult},
    models::{Account, NewAccount},
    schema::accounts::dsl,
    state::AppState,
    validate::FieldErrors,
};

const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<TokenResponse>)> {
    let mut fields = FieldErrors::new();
    fields.require_email("email", &payload.email);
    fields.require_min_len("password", &payload.password, 6);
    fields.finish()?;

    let email = payload.email.trim().to_lowercase();
    let mut conn = state.db()?;

    let existing: Option<Account> = dsl::accounts
        .filter(dsl::email.eq(&email))
        .first(&mut conn)
        .optional()?;
    if existing.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let new_account = NewAccount {
        id: Uuid::new_v4(),
        email: email.clone(),
        password_hash: password::hash_password(&payload.password)?,
    };

    diesel::insert_into(dsl::accounts)
        .values(&new_account)
        .execute(&mut conn)?;

    let (headers, body) = issue_token_pair(&state, new_account.id, &email)?;
    Ok((StatusCode::CREATED, headers, Json(body)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<(HeaderMap, Json<TokenResponse>)> {
    let email = payload.email.trim().to_lowercase();
    let mut conn = state.db()?;

    // Missing account and bad password share one message so the endpoint
    // cannot be used to enumerate registered emails.
    let account: Account = dsl::accounts
        .filter(dsl::email.eq(&email))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Invalid email or password"))?;

    let valid = password::verify_password(&payload.password, &account.password_hash)
        .map_err(|_| ApiError::not_found("Invalid email or password"))?;
    if !valid {
        return Err(ApiError::not_found("Invalid email or password"));
    }

    let (headers, body) = issue_token_pair(&state, account.id, &account.email)?;
    Ok((headers, Json(body)))
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: Option<TypedHeader<Cookie>>,
) -> ApiResult<Json<TokenResponse>> {
    let cookies = jar.ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;
    let refresh_value = cookies
        .get(REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;

    // The verifier's own message ("ExpiredSignature", "InvalidToken", ...)
    // is surfaced verbatim so expired and malformed tokens stay
    // distinguishable to the client.
    let claims = state
        .jwt
        .verify_refresh_token(refresh_value)
        .map_err(|err| ApiError::unauthorized(err.to_string()))?;

    let access_token = state.jwt.generate_access_token(claims.sub, &claims.email)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_expiry_seconds(),
    }))
}

pub async fn logout(State(state): State<AppState>) -> ApiResult<(HeaderMap, StatusCode)> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, build_clear_refresh_cookie(&state));
    Ok((headers, StatusCode::NO_CONTENT))
}

pub async fn delete_account(
    State(state): State<AppState>,
    account: AuthenticatedAccount,
) -> ApiResult<(HeaderMap, StatusCode)> {
    let mut conn = state.db()?;

    let deleted =
        diesel::delete(dsl::accounts.filter(dsl::id.eq(account.account_id))).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Invalid user"));
    }

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, build_clear_refresh_cookie(&state));
    Ok((headers, StatusCode::NO_CONTENT))
}

fn issue_token_pair(
    state: &AppState,
    account_id: Uuid,
    email: &str,
) -> ApiResult<(HeaderMap, TokenResponse)> {
    let access_token = state.jwt.generate_access_token(account_id, email)?;
    let refresh_token = state.jwt.generate_refresh_token(account_id, email)?;
    let refresh_expires = Utc::now() + ChronoDuration::days(state.config.refresh_token_expiry_days);

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        build_refresh_cookie(state, &refresh_token, refresh_expires),
    );

    Ok((
        headers,
        TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.jwt.access_expiry_seconds(),
        },
    ))
}

fn build_refresh_cookie(
    state: &AppState,
    token: &str,
    expires_at: chrono::DateTime<Utc>,
) -> HeaderValue {
    let max_age = ChronoDuration::days(state.config.refresh_token_expiry_days).num_seconds();

    let mut parts = vec![format!("{}={}", REFRESH_COOKIE_NAME, token)];
    parts.push("Path=/".into());
    parts.push("HttpOnly".into());
    parts.push("SameSite=Strict".into());
    parts.push(format!("Max-Age={}", max_age));
    parts.push(format!("Expires={}", expires_at.to_rfc2822()));
    if state.config.refresh_cookie_secure {
        parts.push("Secure".into());
    }
    if let Some(domain) = &state.config.refresh_cookie_domain {
        parts.push(format!("Domain={}", domain));
    }

    HeaderValue::from_str(&parts.join("; ")).expect("valid refresh cookie")
}

fn build_clear_refresh_cookie(state: &AppState) -> HeaderValue {
    let mut parts = vec![format!("{}=", REFRESH_COOKIE_NAME)];
    parts.push("Path=/".into());
    parts.push("HttpOnly".into());
    parts.push("SameSite=Strict".into());
    parts.push("Max-Age=0".into());
    parts.push("Expires=Thu, 01 Jan 1970 00:00:00 GMT".into());
    if state.config.refresh_cookie_secure {
        parts.push("Secure".into());
    }
    if let Some(domain) = &state.config.refresh_cookie_domain {
        parts.push(format!("Domain={}", domain));
    }

    HeaderValue::from_str(&parts.join("; ")).expect("valid refresh cookie")
}
