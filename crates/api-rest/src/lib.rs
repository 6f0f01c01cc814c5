//! # API REST
//!
//! REST API for the DDX ranking engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON rejections, CORS, request tracing)
//!
//! Uses `api-shared` for wire types and `ddx-core` for everything else. The server binary lives
//! in the workspace root (`ddx-run`); this crate only builds the [`Router`].

#![warn(rust_2018_idioms)]

pub mod error;

use api_shared::{
    DiagnoseOptions, DiagnoseReq, DiagnoseRes, DiagnoseSummaryRes, Disease, DiseaseRes,
    DiseaseSummary, ErrorRes, HealthRes, HealthService, ListDiseasesRes, ListSymptomsRes,
    SymptomRes,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use ddx_core::DiagnosisService;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};

/// Shared state for every handler: the loaded, immutable query service.
pub type AppState = Arc<DiagnosisService>;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_symptoms,
        search_symptoms,
        get_symptom,
        list_diseases,
        get_disease,
        diagnose,
        diagnose_query,
        diagnose_summary,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::FollowUpQuestionRes,
        api_shared::Symptom,
        api_shared::ListSymptomsRes,
        api_shared::SymptomRes,
        api_shared::DiseaseSummary,
        api_shared::ListDiseasesRes,
        api_shared::ExpectedAnswer,
        api_shared::AssociationRes,
        api_shared::Disease,
        api_shared::DiseaseRes,
        api_shared::DiagnoseOptions,
        api_shared::DiagnoseReq,
        api_shared::MatchedSymptomRes,
        api_shared::MissingSymptomRes,
        api_shared::NegativeMatchRes,
        api_shared::DiagnosisRes,
        api_shared::DiagnoseRes,
        api_shared::DiagnosisSummaryRes,
        api_shared::DiagnoseSummaryRes,
        api_shared::ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router over a loaded service.
pub fn router(service: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/symptoms", get(list_symptoms))
        .route("/api/symptoms/search", get(search_symptoms))
        .route("/api/symptom/:id", get(get_symptom))
        .route("/api/diseases", get(list_diseases))
        .route("/api/disease/:id", get(get_disease))
        .route("/api/diagnose", get(diagnose_query).post(diagnose))
        .route("/api/diagnose/summary", post(diagnose_summary))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// CORS policy from a comma-separated origin list.
///
/// `None` (or a blank list) gives the permissive development policy.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if an origin is not a valid header value.
pub fn cors_layer(allow_origins: Option<&str>) -> ApiResult<CorsLayer> {
    let origins = allow_origins
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|e| {
                        ApiError::BadRequest(format!("invalid CORS origin {o:?}: {e}"))
                    })
                })
                .collect::<ApiResult<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text to match against symptom display names.
    #[serde(default)]
    pub q: String,
    /// Maximum number of suggestions (1-50).
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiseaseFilter {
    /// Only list diseases in this category (case-insensitive).
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiagnoseParams {
    /// Comma-separated symptom identifiers, all reported present.
    pub symptoms: Option<String>,
    /// Maximum number of diagnoses (1-50).
    pub top_n: Option<String>,
    /// Minimum confidence (0-100).
    pub min_confidence: Option<String>,
}

impl DiagnoseParams {
    /// Evidence map with every listed symptom present. Blank entries are skipped.
    fn evidence(&self) -> Map<String, Value> {
        self.symptoms
            .iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| (s.to_string(), Value::Bool(true)))
            .collect()
    }

    fn options(&self) -> DiagnoseOptions {
        DiagnoseOptions::from_text(self.top_n.as_deref(), self.min_confidence.as_deref())
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint.
///
/// Reports the size of the loaded dataset and when it was loaded.
#[axum::debug_handler]
async fn health(State(service): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(&service))
}

#[utoipa::path(
    get,
    path = "/api/symptoms",
    responses(
        (status = 200, description = "Every recognised symptom", body = ListSymptomsRes)
    )
)]
#[axum::debug_handler]
async fn list_symptoms(State(service): State<AppState>) -> Json<ListSymptomsRes> {
    Json(ListSymptomsRes::from(service.catalog()))
}

#[utoipa::path(
    get,
    path = "/api/symptoms/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Autocomplete suggestions", body = ListSymptomsRes),
        (status = 400, description = "Bad query string", body = ErrorRes)
    )
)]
/// Autocomplete over symptom display names. A blank query returns no suggestions.
#[axum::debug_handler]
async fn search_symptoms(
    State(service): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<ListSymptomsRes>> {
    let Query(params) = params?;
    Ok(Json(ListSymptomsRes::new(
        service.search_symptoms(&params.q, params.limit),
    )))
}

#[utoipa::path(
    get,
    path = "/api/symptom/{id}",
    params(("id" = String, Path, description = "Symptom identifier or display name")),
    responses(
        (status = 200, description = "Symptom definition", body = SymptomRes),
        (status = 404, description = "Unknown symptom", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_symptom(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SymptomRes>> {
    let symptom = service
        .symptom(&id)
        .ok_or_else(|| ApiError::NotFound(format!("no such symptom: {id}")))?;
    Ok(Json(SymptomRes {
        success: true,
        symptom: symptom.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/diseases",
    params(DiseaseFilter),
    responses(
        (status = 200, description = "Diseases ordered by common name", body = ListDiseasesRes),
        (status = 400, description = "Bad query string", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_diseases(
    State(service): State<AppState>,
    filter: Result<Query<DiseaseFilter>, QueryRejection>,
) -> ApiResult<Json<ListDiseasesRes>> {
    let Query(filter) = filter?;
    let diseases: Vec<DiseaseSummary> = service
        .diseases(filter.category.as_deref())
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(ListDiseasesRes {
        success: true,
        count: diseases.len(),
        categories: service.categories().into_iter().map(String::from).collect(),
        diseases,
    }))
}

#[utoipa::path(
    get,
    path = "/api/disease/{id}",
    params(("id" = String, Path, description = "Disease identifier")),
    responses(
        (status = 200, description = "Disease profile", body = DiseaseRes),
        (status = 404, description = "Unknown disease", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_disease(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DiseaseRes>> {
    let disease = service
        .disease(&id)
        .ok_or_else(|| ApiError::NotFound(format!("no such disease: {id}")))?;
    Ok(Json(DiseaseRes {
        success: true,
        disease: Disease::from(disease),
    }))
}

#[utoipa::path(
    post,
    path = "/api/diagnose",
    request_body = DiagnoseReq,
    responses(
        (status = 200, description = "Ranked diagnoses", body = DiagnoseRes),
        (status = 400, description = "Malformed request body", body = ErrorRes),
        (status = 422, description = "Unknown symptoms", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Rank candidate diagnoses for the submitted evidence.
///
/// Unknown symptom keys reject the whole request. Invalid follow-up answers are dropped and
/// reported in `warnings`.
#[axum::debug_handler]
async fn diagnose(
    State(service): State<AppState>,
    payload: Result<Json<DiagnoseReq>, JsonRejection>,
) -> ApiResult<Json<DiagnoseRes>> {
    let Json(req) = payload?;
    let outcome = service.diagnose(&req.symptoms, req.query_options())?;
    Ok(Json(DiagnoseRes::from(&outcome)))
}

#[utoipa::path(
    get,
    path = "/api/diagnose",
    params(DiagnoseParams),
    responses(
        (status = 200, description = "Ranked diagnoses", body = DiagnoseRes),
        (status = 400, description = "Missing symptom list", body = ErrorRes),
        (status = 422, description = "Unknown symptoms", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Query-string form of `POST /api/diagnose` for quick manual checks, without follow-up answers.
#[axum::debug_handler]
async fn diagnose_query(
    State(service): State<AppState>,
    params: Result<Query<DiagnoseParams>, QueryRejection>,
) -> ApiResult<Json<DiagnoseRes>> {
    let Query(params) = params?;
    let evidence = params.evidence();
    if evidence.is_empty() {
        return Err(ApiError::BadRequest(
            "symptoms query parameter is required (comma-separated)".into(),
        ));
    }
    let outcome = service.diagnose(&evidence, params.options().into())?;
    Ok(Json(DiagnoseRes::from(&outcome)))
}

#[utoipa::path(
    post,
    path = "/api/diagnose/summary",
    request_body = DiagnoseReq,
    responses(
        (
            status = 200,
            description = "Score and match-count projection",
            body = DiagnoseSummaryRes
        ),
        (status = 400, description = "Malformed request body", body = ErrorRes),
        (status = 422, description = "Unknown symptoms", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn diagnose_summary(
    State(service): State<AppState>,
    payload: Result<Json<DiagnoseReq>, JsonRejection>,
) -> ApiResult<Json<DiagnoseSummaryRes>> {
    let Json(req) = payload?;
    let outcome = service.diagnose(&req.symptoms, req.query_options())?;
    Ok(Json(DiagnoseSummaryRes::from(&outcome)))
}
