//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::RecordView;
use crate::query::{CityListing, CityMatches, QueryError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/states", get(states))
        .route("/states/:state/cities", get(state_cities))
        .route("/states/:state/counties", get(state_counties))
        .route("/zip/:code", get(zip))
        .route("/zips", get(zips))
        .route("/zips/cities", get(zip_cities))
        .route("/city", get(city))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn states(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.engine.states().await?))
}

async fn zip(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<KeysParams>,
) -> Result<Json<RecordView>, AppError> {
    state
        .engine
        .lookup_by_code(&code, &params.into())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No location for {code}"),
        })
}

async fn zips(
    State(state): State<AppState>,
    Query(params): Query<ZipSearchParams>,
) -> Result<Json<Vec<RecordView>>, AppError> {
    Ok(Json(state.engine.lookup_by_filters(&params.into()).await?))
}

async fn city(
    State(state): State<AppState>,
    Query(params): Query<CityParams>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound {
        message: format!("No city matches {:?}", params.q),
    };

    if params.zips_only {
        let codes = state.engine.city_codes(&params.q).await?.ok_or_else(not_found)?;
        let codes: Vec<String> = codes.iter().map(ToString::to_string).collect();
        return Ok(Json(codes).into_response());
    }

    let info = state
        .engine
        .city_info(&params.q, &(&params).into())
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(info).into_response())
}

async fn state_cities(
    State(state): State<AppState>,
    Path(st): Path<String>,
    Query(params): Query<StateCitiesParams>,
) -> Result<Json<CityListing>, AppError> {
    Ok(Json(state.engine.cities_in_state(&st, &params.into()).await?))
}

async fn state_counties(
    State(state): State<AppState>,
    Path(st): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.engine.counties_in_state(&st).await?))
}

async fn zip_cities(
    State(state): State<AppState>,
    Query(params): Query<MultiCodeParams>,
) -> Result<Json<CityMatches>, AppError> {
    let options = (&params).into();
    Ok(Json(
        state
            .engine
            .codes_for_multi_code_query(&params.codes, &options)
            .await?,
    ))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        let message = e.to_string();
        match e {
            QueryError::MalformedQuery(_) | QueryError::InvalidCode(_) => {
                AppError::BadRequest { message }
            }
            QueryError::Store(ref store) if store.is_unavailable() => {
                AppError::Unavailable { message }
            }
            QueryError::Store(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::*;
    use crate::builder::CacheBuilder;
    use crate::domain::{Code, LocationRecord};
    use crate::store::{HttpStore, HttpStoreConfig, MemoryStore};

    fn rec(code: &str, city: &str, county: &str, lat: f64, long: f64) -> LocationRecord {
        LocationRecord {
            code: Code::parse(code).unwrap(),
            city: city.to_string(),
            county: vec![county.to_string()],
            state: "TX".to_string(),
            lat,
            long,
            primary: true,
        }
    }

    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn server() -> String {
        let store = Arc::new(MemoryStore::new());
        let records = vec![
            rec("78701", "Austin", "Travis", 30.1, -97.7),
            rec("78702", "Austin", "Travis", 30.3, -97.6),
            rec("78613", "Cedar Park", "Williamson", 30.51, -97.83),
        ];
        CacheBuilder::new(store.clone()).load(&records).await.unwrap();
        serve(AppState::new(store)).await
    }

    async fn get(url: String) -> (StatusCode, Value) {
        let resp = reqwest::get(url).await.unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let base = server().await;
        let body = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn zip_lookup_with_keys() {
        let base = server().await;
        let (status, body) = get(format!("{base}/zip/78613?keys=city,state")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"city": "Cedar Park", "state": "TX"}));
    }

    #[tokio::test]
    async fn zip_lookup_errors() {
        let base = server().await;

        let (status, _) = get(format!("{base}/zip/78799")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(format!("{base}/zip/787")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("787"));
    }

    #[tokio::test]
    async fn city_lookup() {
        let base = server().await;
        let (status, body) = get(format!("{base}/city?q=austin,%20tx")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code_range"], "78701-78702");
        assert_eq!(body["lat"], 30.2);
        assert_eq!(body["long"], -97.65);

        let (status, _) = get(format!("{base}/city?q=Austin")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn city_lookup_filter_and_codes() {
        let base = server().await;

        let (status, body) = get(format!(
            "{base}/city?q=Austin,TX&filter=78613-78701&keys=city,specified_code_range"
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"city": "Austin", "specified_code_range": "78701"}));

        let (status, body) = get(format!("{base}/city?q=Austin,TX&zips_only=true")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["78701", "78702"]));

        let (status, _) = get(format!("{base}/city?q=Aus,TX&zips_only=true")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_code_spec_is_rejected() {
        let base = server().await;
        let (status, body) = get(format!("{base}/zips/cities?codes=00000-99999")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at most"));
    }

    #[tokio::test]
    async fn state_listings() {
        let base = server().await;

        let (_, body) = get(format!("{base}/states")).await;
        assert_eq!(body, json!(["TX"]));

        let (_, body) = get(format!("{base}/states/tx/cities?names_only=true")).await;
        assert_eq!(body, json!(["Austin", "Cedar Park"]));

        let (_, body) = get(format!("{base}/states/TX/counties")).await;
        assert_eq!(body, json!(["Travis", "Williamson"]));
    }

    #[tokio::test]
    async fn zips_filter() {
        let base = server().await;
        let (_, body) = get(format!("{base}/zips?city=Austin&keys=code")).await;
        let mut codes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["code"].as_str().unwrap())
            .collect();
        codes.sort();
        assert_eq!(codes, ["78701", "78702"]);
    }

    #[tokio::test]
    async fn multi_code_grouped_names() {
        let base = server().await;
        let (status, body) = get(format!(
            "{base}/zips/cities?codes=78613,78700-78799&grouped=true&names_only=true"
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"78613": ["Cedar Park, TX"], "78701-78702": ["Austin, TX"]})
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_503() {
        // Nothing listens on port 1
        let store = HttpStore::new(HttpStoreConfig::new("http://127.0.0.1:1").with_timeout(1))
            .unwrap();
        let base = serve(AppState::new(Arc::new(store))).await;

        let (status, body) = get(format!("{base}/zip/78701")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }
}
