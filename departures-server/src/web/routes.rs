//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::board::{FilterSpecError, select_bus_departures, select_train_departures};
use crate::domain::{ApiCredentials, AtcoCode, Crs, Settings};
use crate::store::StoreError;
use crate::transport_api::{BusTimetable, TrainBoard, demo_now};
use crate::trmnl::TrmnlError;

use super::auth::authenticate;
use super::dto::*;
use super::state::AppState;
use super::templates::{ManageTemplate, SettingsView};

const INSTALL_SUCCESS_MESSAGE: &str =
    "Installation successful! Please wait for the webhook to finalize the installation.";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/install", get(install))
        .route("/callback", get(callback))
        .route(
            "/webhook/installation_success",
            post(webhook_installation_success),
        )
        .route("/webhook/uninstall", post(webhook_uninstall))
        .route("/manage", get(manage_page).post(manage_submit))
        .route("/api/data", get(api_data))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Absolute URL for `path` on this server.
fn external_url(state: &AppState, headers: &HeaderMap, path: &str) -> String {
    let base = state.public_base_url.clone().unwrap_or_else(|| {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        format!("http://{host}")
    });
    format!("{base}{path}")
}

/// Start an install: record a pending installation and send the user to
/// the platform's consent page.
async fn install(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let install_state = uuid::Uuid::new_v4().to_string();
    state.store.create_pending(&install_state).await?;

    let redirect_uri = external_url(&state, &headers, "/callback");
    let url = state.trmnl.authorize_url(&redirect_uri, &install_state)?;

    info!(state = %install_state, "install started");
    Ok(Redirect::to(url.as_str()))
}

/// OAuth redirect target: exchange the code and attach the account.
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<&'static str, AppError> {
    let install_state = non_blank(query.state).ok_or_else(|| AppError::BadRequest {
        message: "state is missing".to_string(),
    })?;

    // Reject unknown states before spending a code exchange on them
    if state.store.find_by_state(&install_state).await?.is_none() {
        return Err(not_found());
    }

    let code = non_blank(query.code).ok_or_else(|| AppError::BadRequest {
        message: "code is missing".to_string(),
    })?;

    let redirect_uri = external_url(&state, &headers, "/callback");
    let token = state.trmnl.exchange_code(&code, &redirect_uri).await?;
    let account = state.trmnl.account(&token.access_token).await?;

    state
        .store
        .attach_user(&install_state, &account.id.to_string(), &token.access_token)
        .await?
        .ok_or_else(not_found)?;

    info!(user = %account.id, "install authorized");
    Ok(INSTALL_SUCCESS_MESSAGE)
}

/// Platform webhook: the installation is live.
async fn webhook_installation_success(
    State(state): State<AppState>,
    Json(body): Json<InstallationSuccessWebhook>,
) -> Result<Json<StatusResponse>, AppError> {
    let install_state = non_blank(body.state).ok_or_else(|| AppError::BadRequest {
        message: "state is missing".to_string(),
    })?;
    let id = body
        .id
        .and_then(|id| id.to_key())
        .ok_or_else(|| AppError::BadRequest {
            message: "installation id is missing".to_string(),
        })?;

    if !state.store.complete_install(&install_state, &id).await? {
        return Err(not_found());
    }

    info!(installation = %id, "install completed");
    Ok(Json(StatusResponse::success()))
}

/// Platform webhook: the installation was removed.
async fn webhook_uninstall(
    State(state): State<AppState>,
    Json(body): Json<UninstallWebhook>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = body
        .id
        .and_then(|id| id.to_key())
        .ok_or_else(|| AppError::BadRequest {
            message: "installation id is missing".to_string(),
        })?;

    if !state.store.delete_by_installation_id(&id).await? {
        return Err(not_found());
    }

    info!(installation = %id, "uninstalled");
    Ok(Json(StatusResponse::success()))
}

/// Settings page.
async fn manage_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ManageQuery>,
) -> Result<Response, AppError> {
    let installation = authenticate(&state, &headers).await?;
    let settings = installation.settings();

    let template = ManageTemplate {
        form: SettingsView::from_settings(&settings),
        message: query
            .saved
            .map(|_| "Settings saved successfully!".to_string()),
        error: None,
        demo_mode: settings.credentials().is_none(),
    };

    Ok(askama_axum::into_response(&template))
}

/// Save settings, or redisplay the form with the reason it was rejected.
async fn manage_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Result<Response, AppError> {
    let installation = authenticate(&state, &headers).await?;

    match parse_settings(&form) {
        Ok(settings) => {
            state
                .store
                .update_settings(installation.id, &settings)
                .await?;
            info!(installation = installation.id, "settings saved");
            Ok(Redirect::to("/manage?saved=1").into_response())
        }
        Err(reason) => {
            let template = ManageTemplate {
                form: SettingsView::from_form(&form),
                message: None,
                error: Some(reason),
                demo_mode: installation.settings().credentials().is_none(),
            };
            let html = askama::Template::render(&template).map_err(|e| AppError::Internal {
                message: format!("Template error: {}", e),
            })?;
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
    }
}

/// Validate and normalize a submitted settings form.
fn parse_settings(form: &SettingsForm) -> Result<Settings, String> {
    let text = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

    let bus_stop = text(&form.bus_stop)
        .map(|s| AtcoCode::parse(&s).map(|c| c.as_str().to_string()))
        .transpose()
        .map_err(|e| format!("Invalid bus stop: {e}"))?;

    let train_station = text(&form.train_station)
        .map(|s| Crs::parse_normalized(&s).map(|c| c.as_str().to_string()))
        .transpose()
        .map_err(|e| format!("Invalid train station: {e}"))?;

    let min_train_time = text(&form.min_train_time)
        .map(|s| s.parse::<i64>())
        .transpose()
        .map_err(|_| "Minimum train time must be a whole number of minutes".to_string())?;
    if min_train_time.is_some_and(|m| m < 0) {
        return Err("Minimum train time cannot be negative".to_string());
    }

    Ok(Settings {
        bus_stop,
        bus_direction: text(&form.bus_direction),
        train_station,
        train_destination: text(&form.train_destination),
        min_train_time,
        app_id: text(&form.app_id),
        app_key: text(&form.app_key),
    })
}

/// The departures the device should display.
async fn api_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DataResponse>, AppError> {
    let installation = authenticate(&state, &headers).await?;
    let settings = installation.settings();
    let min_lead = settings.min_train_minutes(state.policy.default_min_lead_minutes);

    // One clock reading per request
    let now = Utc::now().with_timezone(&state.timezone);

    let (buses, trains) = match settings.credentials() {
        None => {
            let now = demo_now(&now);
            let buses = select_bus_departures(
                Some(&state.demo.bus),
                settings.bus_direction(),
                &state.policy,
                now,
            )?;
            let trains = select_train_departures(
                Some(&state.demo.train),
                settings.train_destination(),
                min_lead,
                &state.policy,
                now,
            )?;
            (buses, trains)
        }
        Some(credentials) => {
            let (bus, train) = futures::join!(
                fetch_bus(&state, &credentials, settings.bus_stop()),
                fetch_train(&state, &credentials, settings.train_station()),
            );
            let buses = select_bus_departures(
                bus.as_deref(),
                settings.bus_direction(),
                &state.policy,
                now,
            )?;
            let trains = select_train_departures(
                train.as_deref(),
                settings.train_destination(),
                min_lead,
                &state.policy,
                now,
            )?;
            (buses, trains)
        }
    };

    Ok(Json(DataResponse {
        buses: buses.into_iter().map(Into::into).collect(),
        trains: trains.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch the configured stop's timetable; any failure means no bus data.
async fn fetch_bus(
    state: &AppState,
    credentials: &ApiCredentials,
    stop: Option<&str>,
) -> Option<Arc<BusTimetable>> {
    let stop = stop?;
    let code = match AtcoCode::parse(stop) {
        Ok(code) => code,
        Err(e) => {
            warn!(stop, error = %e, "skipping bus board");
            return None;
        }
    };

    match state.transport.bus_timetable(credentials, &code).await {
        Ok(timetable) => Some(timetable),
        Err(e) => {
            warn!(stop, error = %e, "bus timetable fetch failed");
            None
        }
    }
}

/// Fetch the configured station's board; any failure means no train data.
async fn fetch_train(
    state: &AppState,
    credentials: &ApiCredentials,
    station: Option<&str>,
) -> Option<Arc<TrainBoard>> {
    let station = station?;
    let crs = match Crs::parse_normalized(station) {
        Ok(crs) => crs,
        Err(e) => {
            warn!(station, error = %e, "skipping train board");
            return None;
        }
    };

    match state.transport.train_board(credentials, &crs).await {
        Ok(board) => Some(board),
        Err(e) => {
            warn!(station, error = %e, "train board fetch failed");
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found() -> AppError {
    AppError::NotFound {
        message: "installation not found".to_string(),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<TrmnlError> for AppError {
    fn from(e: TrmnlError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<FilterSpecError> for AppError {
    fn from(e: FilterSpecError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardPolicy;
    use crate::cache::{CacheConfig, CachedTransportApi};
    use crate::store::Store;
    use crate::transport_api::{DemoBoards, TransportApiClient, TransportApiConfig};
    use crate::trmnl::{TrmnlClient, TrmnlConfig};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TOKEN: &str = "tok-123";

    async fn test_state() -> AppState {
        let store = Store::in_memory().await.unwrap();
        let transport = TransportApiClient::new(
            TransportApiConfig::default()
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(2),
        )
        .unwrap();
        let trmnl = TrmnlClient::new(
            TrmnlConfig::new("cid", "secret")
                .with_host("http://127.0.0.1:9")
                .with_timeout(2),
        )
        .unwrap();

        AppState::new(
            store,
            CachedTransportApi::new(transport, &CacheConfig::default()),
            trmnl,
            BoardPolicy::default(),
            DemoBoards::embedded().unwrap(),
            chrono_tz::Europe::London,
        )
    }

    /// Run an installation through the full handshake and save `settings`.
    async fn install_with(state: &AppState, settings: &Settings) {
        let store = &state.store;
        let inst = store.create_pending("state-1").await.unwrap();
        store.attach_user("state-1", "user-1", TOKEN).await.unwrap();
        store.complete_install("state-1", "inst-1").await.unwrap();
        store.update_settings(inst.id, settings).await.unwrap();
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state.clone(), "static")
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_authed(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {TOKEN}"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn times(list: &Value) -> Vec<&str> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|d| d["time"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn health_check() {
        let state = test_state().await;
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn data_requires_token() {
        let state = test_state().await;
        let request = Request::builder()
            .uri("/api/data")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({"error": "token is missing"}));
    }

    #[tokio::test]
    async fn data_rejects_unknown_token() {
        let state = test_state().await;
        let (status, body) = send(&state, get_authed("/api/data")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "token is invalid");
    }

    #[tokio::test]
    async fn malformed_authorization_header() {
        let state = test_state().await;
        install_with(&state, &Settings::default()).await;
        let request = Request::builder()
            .uri("/api/data")
            .header("authorization", "Bearer")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("token is missing"));
    }

    #[tokio::test]
    async fn demo_mode_data() {
        let state = test_state().await;
        install_with(&state, &Settings::default()).await;

        let (status, body) = send(&state, get_authed("/api/data")).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            body["buses"],
            json!([
                {"line": "19", "destination": "East Garforth", "time": "12:00"},
                {"line": "40", "destination": "Seacroft", "time": "12:15"},
                {"line": "19", "destination": "East Garforth", "time": "12:30"}
            ])
        );
        assert_eq!(times(&body["trains"]), vec!["12:15", "12:45"]);
        assert_eq!(body["trains"][0]["destination"], "Norwich");
        assert_eq!(body["trains"][0]["status"], "LATE");
        assert_eq!(body["trains"][0]["platform"], Value::Null);
    }

    #[tokio::test]
    async fn zero_min_train_time_is_honoured() {
        let state = test_state().await;
        let settings = Settings {
            min_train_time: Some(0),
            ..Default::default()
        };
        install_with(&state, &settings).await;

        let (_, body) = send(&state, get_authed("/api/data")).await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(times(&body["trains"]), vec!["12:00", "12:15", "12:45"]);
    }

    #[tokio::test]
    async fn destination_filter() {
        let state = test_state().await;
        let settings = Settings {
            train_destination: Some("cambridge".into()),
            ..Default::default()
        };
        install_with(&state, &settings).await;

        let (_, body) = send(&state, get_authed("/api/data")).await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(times(&body["trains"]), vec!["12:45"]);
        assert_eq!(body["buses"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upstream_failure_gives_empty_lists() {
        let state = test_state().await;
        let settings = Settings {
            bus_stop: Some("450010441".into()),
            train_station: Some("LST".into()),
            app_id: Some("id".into()),
            app_key: Some("key".into()),
            ..Default::default()
        };
        install_with(&state, &settings).await;

        let (status, body) = send(&state, get_authed("/api/data")).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({"buses": [], "trains": []}));
    }

    #[tokio::test]
    async fn negative_stored_lead_is_bad_request() {
        let state = test_state().await;
        let settings = Settings {
            min_train_time: Some(-5),
            ..Default::default()
        };
        install_with(&state, &settings).await;

        let (status, _) = send(&state, get_authed("/api/data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn install_redirects_to_consent() {
        let state = test_state()
            .await
            .with_public_base_url(Some("https://boards.example.org".into()));
        let request = Request::builder()
            .uri("/install")
            .body(Body::empty())
            .unwrap();

        let response = create_router(state.clone(), "static")
            .oneshot(request)
            .await
            .unwrap();
        assert!(response.status().is_redirection());

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        let url = reqwest::Url::parse(location).unwrap();
        assert_eq!(url.path(), "/api/oauth/authorize");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(
            params["redirect_uri"],
            "https://boards.example.org/callback"
        );
        let pending = state.store.find_by_state(&params["state"]).await.unwrap();
        assert!(pending.is_some());
    }

    #[tokio::test]
    async fn callback_checks_state() {
        let state = test_state().await;

        let request = Request::builder()
            .uri("/callback?code=abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .uri("/callback?state=unknown&code=abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn installation_success_webhook() {
        let state = test_state().await;
        state.store.create_pending("s-1").await.unwrap();

        let (status, _) = send(
            &state,
            post_json(
                "/webhook/installation_success",
                json!({"state": "other", "id": 5}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &state,
            post_json(
                "/webhook/installation_success",
                json!({"state": "s-1", "id": 5}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({"status": "success"})
        );
        assert!(state.store.find_by_state("s-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn uninstall_webhook() {
        let state = test_state().await;
        install_with(&state, &Settings::default()).await;

        let (status, _) = send(&state, post_json("/webhook/uninstall", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            post_json("/webhook/uninstall", json!({"id": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &state,
            post_json("/webhook/uninstall", json!({"id": "inst-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&state, get_authed("/api/data")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn manage_shows_settings() {
        let state = test_state().await;
        let settings = Settings {
            bus_stop: Some("450010441".into()),
            ..Default::default()
        };
        install_with(&state, &settings).await;

        let (status, body) = send(&state, get_authed("/manage?saved=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"value="450010441""#));
        assert!(body.contains("Settings saved successfully!"));
    }

    #[tokio::test]
    async fn manage_saves_normalized_settings() {
        let state = test_state().await;
        install_with(&state, &Settings::default()).await;

        let response = create_router(state.clone(), "static")
            .oneshot(post_form(
                "/manage",
                "bus_stop=450010441&train_station=+lst+&min_train_time=0&train_destination=",
            ))
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            "/manage?saved=1"
        );

        let saved = state.store.find_by_access_token(TOKEN).await.unwrap().unwrap();
        assert_eq!(saved.train_station.as_deref(), Some("LST"));
        assert_eq!(saved.min_train_time, Some(0));
        assert_eq!(saved.train_destination, None);
    }

    #[tokio::test]
    async fn manage_rejects_negative_min_train_time() {
        let state = test_state().await;
        install_with(&state, &Settings::default()).await;

        let (status, body) = send(&state, post_form("/manage", "min_train_time=-10")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Minimum train time cannot be negative"));

        let saved = state.store.find_by_access_token(TOKEN).await.unwrap().unwrap();
        assert_eq!(saved.min_train_time, None);
    }

    #[test]
    fn parse_settings_validation() {
        let form = SettingsForm {
            train_station: "LONDON".into(),
            ..Default::default()
        };
        assert!(parse_settings(&form).unwrap_err().starts_with("Invalid train station"));

        let form = SettingsForm {
            min_train_time: "soon".into(),
            ..Default::default()
        };
        assert!(parse_settings(&form).is_err());

        let form = SettingsForm {
            bus_direction: "  Seacroft ".into(),
            app_id: " ".into(),
            ..Default::default()
        };
        let settings = parse_settings(&form).unwrap();
        assert_eq!(settings.bus_direction.as_deref(), Some("Seacroft"));
        assert_eq!(settings.app_id, None);
        assert_eq!(settings.min_train_time, None);
    }
}
