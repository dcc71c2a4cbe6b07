//! Server entry-point – Axum + Leptos SSR.

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use leptos::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use oeks_client::ApiClient;
    use oeks_common::config::{self, Config};
    use oeks_web::app::AppState;

    // ── Tracing ──────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oeks_web=info,oeks_client=info,tower_http=info".into()),
        )
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let conf = match get_configuration(None).await {
        Ok(conf) => conf,
        Err(e) => {
            tracing::error!("Cannot read Leptos configuration: {e}");
            std::process::exit(1);
        }
    };
    let leptos_options = conf.leptos_options.clone();
    let addr = leptos_options.site_addr;

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OEKS_CONFIG").ok())
        .unwrap_or_else(|| Config::default_path().to_string());
    let config = match config::load_or_default(&PathBuf::from(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Config load failed: {e:#}");
            std::process::exit(1);
        }
    };

    let api = match ApiClient::new(&config) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Cannot build API client: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Tracker API at {}", api.base_url());

    let realtime_status = oeks_web::server::spawn_realtime(&config);

    let state = AppState {
        api,
        config: Arc::new(config),
        realtime_status,
        leptos_options,
    };

    // ── Routes ───────────────────────────────────────────────────────────
    let app = oeks_web::server::router(state);

    tracing::info!("OEKS Web listening on http://{addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Cannot bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {e}");
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {
    // This binary is only built with the `ssr` feature.
    // The WASM entry point is `lib::hydrate()`.
}
