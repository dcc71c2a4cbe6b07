//! Top header with the connection status indicator.

use leptos::*;

use oeks_common::protocol::ConnectionStatus;

/// Site-wide header bar.
#[component]
pub fn Nav(#[prop(into)] status: Signal<ConnectionStatus>) -> impl IntoView {
    view! {
        <nav class="nav-bar">
            <div class="nav-brand">
                <a href="/" class="nav-logo">"OEKS Team Tracker"</a>
            </div>
            <div class="connection-status">
                <span class=move || format!("status-dot {}", status.get().css_class())></span>
                <span class="status-text">{move || status.get().label()}</span>
            </div>
        </nav>
    }
}
