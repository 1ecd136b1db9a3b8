//! # Server Configuration
//!
//! This module contains the server setup and configuration for the
//! Formapilot API.

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use uuid::Uuid;
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{self, TraceContext};

/// Propagate the inbound `x-trace-id` header (or mint one) into task-local
/// storage so error responses and logs can correlate.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get("x-trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    telemetry::with_trace_context(TraceContext { trace_id }, next.run(request)).await
}

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/rendezvous",
            get(handlers::rendezvous::list_rendezvous).post(handlers::rendezvous::create_rendezvous),
        )
        .route(
            "/rendezvous/{id}",
            get(handlers::rendezvous::get_rendezvous)
                .put(handlers::rendezvous::update_rendezvous)
                .delete(handlers::rendezvous::delete_rendezvous),
        )
        .route(
            "/rendezvous/{id}/statut",
            put(handlers::rendezvous::change_statut),
        )
        .route(
            "/rendezvous/{id}/valider",
            put(handlers::rendezvous::valider_rendezvous),
        )
        .route(
            "/rendezvous/{id}/annuler",
            post(handlers::rendezvous::annuler_rendezvous),
        )
        .route(
            "/rendezvous/{id}/reprogrammer",
            post(handlers::rendezvous::reprogrammer_rendezvous),
        )
        .route(
            "/rendezvous/{id}/impact/planifier",
            post(handlers::rendezvous::planifier_impact),
        )
        .route(
            "/rendezvous/{id}/impact/evaluation",
            put(handlers::rendezvous::evaluation_impact).post(handlers::rendezvous::evaluation_impact),
        )
        .route(
            "/rendezvous/{id}/impact/terminer",
            put(handlers::rendezvous::terminer_impact),
        )
        .route(
            "/rendezvous/{id}/impact/rapport",
            get(handlers::rendezvous::rapport_impact),
        )
        .route(
            "/rendezvous/{id}/compte-rendu",
            put(handlers::rendezvous::compte_rendu),
        )
        .route(
            "/rendezvous/{id}/generer-programme",
            post(handlers::rendezvous::generer_programme),
        )
        .route(
            "/programmes",
            get(handlers::programmes::list_programmes).post(handlers::programmes::create_programme),
        )
        .route(
            "/programmes/{id}",
            get(handlers::programmes::get_programme)
                .put(handlers::programmes::update_programme)
                .delete(handlers::programmes::delete_programme),
        )
        .route(
            "/programmes/{id}/visibilite",
            put(handlers::programmes::toggle_visibilite),
        )
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/veille",
            get(handlers::veille::list_veille).post(handlers::veille::create_veille),
        )
        .route(
            "/veille/{id}",
            get(handlers::veille::get_veille)
                .put(handlers::veille::update_veille)
                .delete(handlers::veille::delete_veille),
        )
        .route(
            "/veille/{id}/statut",
            put(handlers::veille::change_veille_statut),
        )
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::health))
        .nest("/api", api_router())
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let profile = config.profile.clone();
    let state = AppState { db, config };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health::health,
        crate::handlers::rendezvous::list_rendezvous,
        crate::handlers::rendezvous::create_rendezvous,
        crate::handlers::rendezvous::get_rendezvous,
        crate::handlers::rendezvous::update_rendezvous,
        crate::handlers::rendezvous::delete_rendezvous,
        crate::handlers::rendezvous::change_statut,
        crate::handlers::rendezvous::valider_rendezvous,
        crate::handlers::rendezvous::annuler_rendezvous,
        crate::handlers::rendezvous::reprogrammer_rendezvous,
        crate::handlers::rendezvous::planifier_impact,
        crate::handlers::rendezvous::evaluation_impact,
        crate::handlers::rendezvous::terminer_impact,
        crate::handlers::rendezvous::rapport_impact,
        crate::handlers::rendezvous::compte_rendu,
        crate::handlers::rendezvous::generer_programme,
        crate::handlers::programmes::list_programmes,
        crate::handlers::programmes::create_programme,
        crate::handlers::programmes::get_programme,
        crate::handlers::programmes::update_programme,
        crate::handlers::programmes::toggle_visibilite,
        crate::handlers::programmes::delete_programme,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::veille::list_veille,
        crate::handlers::veille::create_veille,
        crate::handlers::veille::get_veille,
        crate::handlers::veille::update_veille,
        crate::handlers::veille::change_veille_statut,
        crate::handlers::veille::delete_veille,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::health::HealthResponse,
            crate::handlers::rendezvous::RendezvousDto,
            crate::handlers::rendezvous::ChangeStatutDto,
            crate::handlers::rendezvous::ValiderDto,
            crate::handlers::rendezvous::AnnulerDto,
            crate::handlers::rendezvous::ReprogrammerDto,
            crate::handlers::rendezvous::PlanifierImpactDto,
            crate::handlers::rendezvous::ImpactEvaluationDto,
            crate::handlers::rendezvous::ExpectedVersionDto,
            crate::handlers::rendezvous::CompteRenduDto,
            crate::handlers::programmes::ProgrammeDto,
            crate::handlers::programmes::CreateProgrammeDto,
            crate::handlers::programmes::UpdateProgrammeDto,
            crate::handlers::programmes::VisibiliteDto,
            crate::handlers::users::UserDto,
            crate::handlers::users::CreateUserDto,
            crate::handlers::users::UpdateUserDto,
            crate::handlers::veille::VeilleDto,
            crate::handlers::veille::CreateVeilleDto,
            crate::handlers::veille::UpdateVeilleDto,
            crate::handlers::veille::VeilleStatutDto,
        )
    ),
    info(
        title = "Formapilot API",
        description = "Administration backend for vocational-training rendez-vous",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
