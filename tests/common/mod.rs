#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceExt;

use vetclinic::auth::jwt::JwtService;
use vetclinic::config::AppConfig;
use vetclinic::db::{self, PgPool};
use vetclinic::routes::create_router;
use vetclinic::schema::{accounts, event_types, medicines, owners, species};
use vetclinic::state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Tests share one database; serialize them.
pub async fn acquire_db_lock() -> MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
}

/// Config shared by the router harness and tests that call services
/// directly.
pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        database_max_pool_size: 2,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_issuer: "vetclinic".to_string(),
        jwt_audience: "vetclinic-clients".to_string(),
        access_token_expiry_minutes: 15,
        refresh_token_audience: "vetclinic-refresh".to_string(),
        refresh_token_expiry_days: 30,
        refresh_cookie_secure: false,
        refresh_cookie_domain: None,
        cors_allowed_origin: None,
        seed_on_start: false,
        admin_email: "admin@vetclinic.local".to_string(),
        admin_password: "admin".to_string(),
    }
}

impl TestApp {
    /// Returns `None` when `TEST_DATABASE_URL` is not set, letting suites
    /// skip rather than fail on machines without Postgres.
    pub fn try_new() -> Result<Option<Self>> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("skipping: TEST_DATABASE_URL not set");
            return Ok(None);
        };

        let config = test_config(&database_url);

        let pool = db::init_pool(&database_url)?;
        {
            let mut conn = pool.get().context("failed to get test connection")?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|err| anyhow::anyhow!("failed to run migrations: {err}"))?;
        }

        let jwt = JwtService::from_config(&config)?;
        let state = AppState::new(pool.clone(), config, jwt);
        let app = Self {
            router: create_router(state),
            pool,
        };
        app.truncate_all()?;
        Ok(Some(app))
    }

    /// Root tables only; cascades clear the rest.
    pub fn truncate_all(&self) -> Result<()> {
        let mut conn = self.pool.get()?;
        diesel::delete(accounts::table).execute(&mut conn)?;
        diesel::delete(owners::table).execute(&mut conn)?;
        diesel::delete(species::table).execute(&mut conn)?;
        diesel::delete(event_types::table).execute(&mut conn)?;
        diesel::delete(medicines::table).execute(&mut conn)?;
        Ok(())
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Vec<u8>>,
        token: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<Response<Body>> {
        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        })?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<Response<Body>> {
        self.request("POST", path, Some(serde_json::to_vec(payload)?), token, None)
            .await
    }

    pub async fn put_json<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<Response<Body>> {
        self.request("PUT", path, Some(serde_json::to_vec(payload)?), token, None)
            .await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response<Body>> {
        self.request("GET", path, None, token, None).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Response<Body>> {
        self.request("DELETE", path, None, token, None).await
    }

    /// Registers a fresh account and returns its access token.
    pub async fn register_token(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .post_json(
                "/api/v1/auth/register",
                &serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await?;
        anyhow::ensure!(
            response.status() == StatusCode::CREATED,
            "register failed: {}",
            response.status()
        );
        let body = body_to_json(response.into_body()).await?;
        body["accessToken"]
            .as_str()
            .map(|token| token.to_string())
            .context("missing accessToken")
    }

    /// Registers, creates a profile, and returns the access token.
    pub async fn register_with_profile(&self, email: &str, password: &str) -> Result<String> {
        let token = self.register_token(email, password).await?;
        let response = self
            .post_json(
                "/api/v1/profile",
                &serde_json::json!({
                    "name": "Maria",
                    "lastname": "Vega",
                    "birthday": "1990-04-12",
                    "college": "UNMSM",
                    "review": "Small-animal practice"
                }),
                Some(&token),
            )
            .await?;
        anyhow::ensure!(
            response.status() == StatusCode::CREATED,
            "profile creation failed: {}",
            response.status()
        );
        Ok(token)
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    Ok(body.collect().await?.to_bytes().to_vec())
}

pub async fn body_to_json(body: Body) -> Result<serde_json::Value> {
    let bytes = body_to_vec(body).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
