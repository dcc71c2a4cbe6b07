//! Root Leptos application component with routing.

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::pages::dashboard::Dashboard;

/// Server-side application state, provided as Leptos context for server functions.
#[derive(Clone, Debug)]
#[cfg(feature = "ssr")]
pub struct AppState {
    pub api: oeks_client::ApiClient,
    pub config: std::sync::Arc<oeks_common::config::Config>,
    pub realtime_status: tokio::sync::watch::Receiver<oeks_common::protocol::ConnectionStatus>,
    pub leptos_options: leptos::LeptosOptions,
}

/// Dummy state for the client – never actually constructed on WASM, but the
/// type must exist so server functions can reference it in their signatures.
#[derive(Clone, Debug)]
#[cfg(not(feature = "ssr"))]
pub struct AppState;

/// The root `<App/>` component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/oeks-web.css"/>
        <Title text="OEKS Team Tracker"/>
        <Meta name="viewport" content="width=device-width, initial-scale=1"/>
        <Meta name="description" content="Live staff workstation monitoring dashboard"/>

        <Router>
            <main class="main-content">
                <Routes>
                    <Route path="/" view=Dashboard/>
                    <Route path="/*any" view=NotFound/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="not-found">
            <h1>"Page not found"</h1>
            <a href="/" class="back-link">"← Dashboard"</a>
        </div>
    }
}
