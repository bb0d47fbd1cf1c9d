use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth::AuthenticatedAccount, state::AppState};

pub mod attention_medicines;
pub mod auth;
pub mod document_files;
pub mod event_types;
pub mod events;
pub mod health;
pub mod medical_attentions;
pub mod medicines;
pub mod owners;
pub mod patients;
pub mod profiles;
pub mod species;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout));

    let profile_routes = Router::new().route(
        "/",
        post(profiles::create_profile)
            .get(profiles::get_profile)
            .put(profiles::update_profile)
            .delete(profiles::delete_profile),
    );

    let species_routes = Router::new()
        .route(
            "/",
            get(species::list_all_species).post(species::create_species),
        )
        .route(
            "/:id",
            put(species::update_species).delete(species::delete_species),
        )
        .route("/:id/subspecies", post(species::create_subspecies));

    let owners_routes = Router::new()
        .route("/", get(owners::list_owners).post(owners::create_owner))
        .route(
            "/:id",
            get(owners::get_owner)
                .put(owners::update_owner)
                .delete(owners::delete_owner),
        );

    let patients_routes = Router::new()
        .route(
            "/",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/:id/documents",
            get(document_files::list_for_patient).post(document_files::create_for_patient),
        );

    let event_types_routes = Router::new()
        .route(
            "/",
            get(event_types::list_event_types).post(event_types::create_event_type),
        )
        .route(
            "/:id",
            get(event_types::get_event_type)
                .put(event_types::update_event_type)
                .delete(event_types::delete_event_type),
        );

    let events_routes = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        );

    let attentions_routes = Router::new()
        .route(
            "/",
            get(medical_attentions::list_attentions).post(medical_attentions::create_attention),
        )
        .route("/patient/:id", get(medical_attentions::list_by_patient))
        .route("/profile/:id", get(medical_attentions::list_by_profile))
        .route("/date/:day", get(medical_attentions::list_by_date))
        .route("/range", get(medical_attentions::list_between_dates))
        .route(
            "/:id",
            get(medical_attentions::get_attention)
                .put(medical_attentions::update_attention)
                .delete(medical_attentions::delete_attention),
        )
        .route(
            "/:id/medicines",
            get(attention_medicines::list_assigned_medicines)
                .post(attention_medicines::assign_medicine),
        )
        .route(
            "/:id/medicines/:medicine_id",
            put(attention_medicines::update_assignment)
                .delete(attention_medicines::remove_assignment),
        )
        .route(
            "/:id/documents",
            get(document_files::list_for_attention).post(document_files::create_for_attention),
        );

    let medicines_routes = Router::new()
        .route(
            "/",
            get(medicines::list_medicines).post(medicines::create_medicine),
        )
        .route(
            "/:id",
            get(medicines::get_medicine)
                .put(medicines::update_medicine)
                .delete(medicines::delete_medicine),
        );

    let documents_routes = Router::new().route(
        "/:id",
        get(document_files::get_document)
            .put(document_files::update_document)
            .delete(document_files::delete_document),
    );

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .route("/account", delete(auth::delete_account))
        .nest("/profile", profile_routes)
        .route("/profiles", get(profiles::list_all_profiles))
        .nest("/species", species_routes)
        .nest("/owners", owners_routes)
        .nest("/patients", patients_routes)
        .nest("/event-types", event_types_routes)
        .nest("/events", events_routes)
        .nest("/medical-attentions", attentions_routes)
        .nest("/medicines", medicines_routes)
        .nest("/documents", documents_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedAccount, _>(protected_state));

    let api = Router::new()
        .merge(protected_routes)
        .nest("/auth", auth_routes)
        .route("/health", get(health::health_check));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
