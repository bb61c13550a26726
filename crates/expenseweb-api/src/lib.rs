//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::entries: Dashboard page, HTMX fragments and JSON API

pub mod error;
pub mod routes;

use anyhow::Context;
use axum::{
    http::HeaderMap,
    routing::{delete, get, post},
    Router,
};
use expenseweb_config::Config;
use expenseweb_core::LedgerStore;
use expenseweb_utils::escape_html;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<LedgerStore>>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: LedgerStore, config: Config) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::entries::{
        api_entries, api_entry_create, api_entry_delete, api_entry_detail, api_summary,
        htmx_dashboard_view, htmx_entry_delete, htmx_entry_store, page_dashboard,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/entries", get(api_entries).post(api_entry_create))
        .route("/api/entries/:id", get(api_entry_detail).delete(api_entry_delete))
        .route("/api/summary", get(api_summary))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        // HTMX partial routes
        .route("/dashboard/view", get(htmx_dashboard_view))
        .route("/entries", post(htmx_entry_store))
        .route("/entries/:id", delete(htmx_entry_delete))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        return inner_content.to_string();
    }

    base_html(
        title,
        &format!(
            r#"<main class='max-w-5xl mx-auto p-6'>
    <h1 class='text-2xl font-bold text-indigo-600 mb-6'>{}</h1>
    {}
</main>"#,
            escape_html(title),
            inner_content
        ),
    )
}

/// Start the HTTP server and serve until Ctrl-C
pub async fn start_server(config: Config, store: Arc<RwLock<LedgerStore>>) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let state = AppState { store, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Starting expenseweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use expenseweb_core::{Category, EntryDraft, EntryType, MemoryStorage, SlotStorage};
    use tower::ServiceExt;

    const KEY: &str = "expense-items";

    fn test_state() -> (Arc<MemoryStorage>, AppState) {
        let storage = Arc::new(MemoryStorage::new());
        let store = LedgerStore::open(storage.clone(), KEY);
        (storage, AppState::new(store, Config::default()))
    }

    async fn seed(state: &AppState, title: &str, entry_type: EntryType, amount: &str) -> String {
        let mut draft = EntryDraft {
            title: title.to_string(),
            date: "2024-02-15".to_string(),
            entry_type,
            category: Category::Food,
            amount: amount.to_string(),
        };
        let mut store = state.store.write().await;
        store.create(&mut draft).unwrap().unwrap().id
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete_request(uri: &str) -> Request<Body> {
        Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_health() {
        let (_, state) = test_state();
        let (status, body) = send(&state, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dashboard_renders() {
        let (_, state) = test_state();
        seed(&state, "Groceries", EntryType::Expense, "40").await;

        let (status, body) = send(&state, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("Expense Dashboard"));
        assert!(body.contains("id='filter-panel'"));
        assert!(body.contains("id='entry-form'"));
        assert!(body.contains("Groceries"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_form_create_prepends_entry() {
        let (storage, state) = test_state();
        seed(&state, "First", EntryType::Income, "100").await;

        let (status, body) = send(
            &state,
            form_post(
                "/entries",
                "title=Bus+ticket&date=2024-02-20&entry_type=expense&category=transport&amount=2.5",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<div id='dashboard'"));
        assert!(body.contains("Bus ticket"));
        assert!(body.contains("name='title' value=''"));

        let store = state.store.read().await;
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].title, "Bus ticket");
        assert_eq!(store.entries()[0].category, Category::Transport);
        assert!(storage.get(KEY).unwrap().unwrap().contains("Bus ticket"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_form_create_with_empty_title_is_ignored() {
        let (storage, state) = test_state();

        let (status, body) = send(
            &state,
            form_post("/entries", "title=&date=2024-02-20&entry_type=expense&category=food&amount=15"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name='amount' value='15'"));
        assert!(state.store.read().await.is_empty());
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_form_create_unknown_category_is_bad_request() {
        let (_, state) = test_state();
        let (status, body) = send(
            &state,
            form_post("/entries", "title=Rent&entry_type=expense&category=rent&amount=900"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("bad_request"));
        assert!(state.store.read().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fragment_delete_removes_entry() {
        let (_, state) = test_state();
        let keep = seed(&state, "Keep", EntryType::Income, "10").await;
        let drop = seed(&state, "Drop", EntryType::Expense, "5").await;

        let (status, body) = send(&state, delete_request(&format!("/entries/{}", drop))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("Drop"));
        assert!(body.contains("Keep"));

        let store = state.store.read().await;
        assert_eq!(store.len(), 1);
        assert!(store.entry(&keep).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fragment_delete_keeps_filter_and_draft() {
        let (_, state) = test_state();
        let salary = seed(&state, "Salary", EntryType::Income, "100").await;
        seed(&state, "Bonus", EntryType::Income, "50").await;
        seed(&state, "Lunch", EntryType::Expense, "40").await;

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/entries/{}", salary))
            .header("content-type", "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(Body::from(
                "from=&to=&filter_category=all&filter_type=income\
                 &title=half+typed&date=2024-03-01&entry_type=expense&category=bill&amount=12",
            ))
            .unwrap();
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);

        assert!(body.contains("Bonus"));
        assert!(!body.contains("Salary"));
        assert!(!body.contains("Lunch"));
        assert!(body.contains("<option value='income' selected>Income</option>"));
        assert!(body.contains("name='title' value='half typed'"));
        assert!(body.contains("name='amount' value='12'"));
        assert!(body.contains("<option value='bill' selected>Bill</option>"));
        assert_eq!(state.store.read().await.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dashboard_view_applies_filter() {
        let (_, state) = test_state();
        seed(&state, "Salary", EntryType::Income, "100").await;
        seed(&state, "Lunch", EntryType::Expense, "40").await;

        let (status, body) = send(&state, get("/dashboard/view?filter_type=income")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Salary"));
        assert!(!body.contains("Lunch"));

        let (status, _) = send(&state, get("/dashboard/view?filter_category=rent")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_api_entries_and_summary() {
        let (_, state) = test_state();
        seed(&state, "Salary", EntryType::Income, "100").await;
        seed(&state, "Lunch", EntryType::Expense, "40").await;

        let (status, body) = send(&state, get("/api/entries")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["entries"][0]["title"], "Lunch");
        assert_eq!(json["entries"][0]["type"], "expense");
        assert_eq!(json["totals"]["balance"], 60.0);

        let (_, body) = send(&state, get("/api/summary?type=expense")).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total_income"], 0.0);
        assert_eq!(json["total_expense"], 40.0);

        let (status, body) = send(&state, get("/api/entries?from=2024-13-01")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "bad_request");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_api_entry_detail() {
        let (_, state) = test_state();
        let id = seed(&state, "Salary", EntryType::Income, "100").await;

        let (status, body) = send(&state, get(&format!("/api/entries/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["id"], id.as_str());

        let (status, _) = send(&state, get("/api/entries/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_api_create_and_delete() {
        let (_, state) = test_state();

        let (status, body) = send(
            &state,
            json_post(
                "/api/entries",
                serde_json::json!({"title": "Coffee", "date": "2024-04-01", "type": "expense", "category": "food", "amount": 3.5}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["created"], true);
        assert_eq!(json["entry"]["amount"], 3.5);
        let id = json["entry"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            &state,
            json_post("/api/entries", serde_json::json!({"title": "", "amount": "5"})),
        )
        .await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["created"], false);
        assert!(json.get("entry").is_none());

        let (status, _) = send(
            &state,
            json_post("/api/entries", serde_json::json!({"title": "Rent", "category": "rent", "amount": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&state, delete_request(&format!("/api/entries/{}", id))).await;
        assert_eq!(body, r#"{"deleted":true}"#);
        let (_, body) = send(&state, delete_request(&format!("/api/entries/{}", id))).await;
        assert_eq!(body, r#"{"deleted":false}"#);
        assert!(state.store.read().await.is_empty());
    }

    #[test]
    fn test_page_response_partial() {
        let mut headers = HeaderMap::new();
        assert!(page_response(&headers, "T", "<p>x</p>").contains("<!DOCTYPE html>"));

        headers.insert("hx-request", "true".parse().unwrap());
        assert_eq!(page_response(&headers, "T", "<p>x</p>"), "<p>x</p>");
    }
}
