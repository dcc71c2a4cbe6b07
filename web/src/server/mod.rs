//! Server-only helpers shared by the server functions.

use axum::Router;
use leptos::*;
use leptos_axum::{generate_route_list, LeptosRoutes};
use tokio::sync::watch;
use tower_http::services::ServeDir;

use oeks_client::{ApiError, RealtimeChannel};
use oeks_common::config::Config;
use oeks_common::protocol::ConnectionStatus;

use crate::app::{App, AppState};

pub fn app_state() -> Result<AppState, ServerFnError> {
    use_context::<AppState>().ok_or_else(|| ServerFnError::new("Missing AppState"))
}

pub fn api_error(e: ApiError) -> ServerFnError {
    tracing::error!("Backend request failed: {e}");
    ServerFnError::new(format!("Backend error: {e}"))
}

/// Run the realtime channel for the lifetime of the server and expose its
/// status.
pub fn spawn_realtime(config: &Config) -> watch::Receiver<ConnectionStatus> {
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
    let (_stop_tx, stop_rx) = watch::channel(false);
    let channel = RealtimeChannel::from_config(config);
    tracing::info!("Realtime channel target: {}", channel.url());
    tokio::spawn(async move { channel.run(status_tx, stop_rx).await });
    status_rx
}

/// Pages and server functions, plus the WASM/CSS bundle under `/pkg`.
/// Every other GET is answered by the app's catch-all route.
pub fn router(state: AppState) -> Router {
    let options = state.leptos_options.clone();
    let pkg_dir = format!("{}/pkg", options.site_root);
    let routes = generate_route_list(App);

    Router::new()
        .leptos_routes_with_context(
            &options,
            routes,
            move || provide_context(state.clone()),
            App,
        )
        .nest_service("/pkg", ServeDir::new(pkg_dir))
        .with_state(options)
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use oeks_client::ApiClient;
    use tower::ServiceExt;

    fn state(site_root: &str) -> AppState {
        let config = Config::default();
        let (_status_tx, realtime_status) = watch::channel(ConnectionStatus::Connecting);
        AppState {
            api: ApiClient::new(&config).unwrap(),
            config: Arc::new(config),
            realtime_status,
            leptos_options: LeptosOptions::builder()
                .output_name("oeks-web")
                .site_root(site_root)
                .build(),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_pkg_serves_bundle_but_not_parent_files() {
        let root = std::env::temp_dir().join("oeks_web_site");
        std::fs::create_dir_all(root.join("pkg")).unwrap();
        std::fs::write(root.join("pkg").join("oeks-web.css"), "body {}").unwrap();
        std::fs::write(root.join("tracker.conf"), "API_KEY=secret\n").unwrap();
        let app = router(state(&root.to_string_lossy()));

        let css = app.clone().oneshot(get("/pkg/oeks-web.css")).await.unwrap();
        assert_eq!(css.status(), StatusCode::OK);

        let escaped = app.oneshot(get("/pkg/../tracker.conf")).await.unwrap();
        assert_eq!(escaped.status(), StatusCode::NOT_FOUND);
    }
}
