//! Dashboard page – staff grid with filters, auto-refresh and live view.

use std::time::Duration;

use chrono::Utc;
use leptos::*;
use leptos::leptos_dom::helpers::{IntervalHandle, TimeoutHandle};

use oeks_common::config::DashboardSettings;
use oeks_common::filter::{self, FilterState};
use oeks_common::protocol::ConnectionStatus;
use oeks_common::roster::StaffRecord;

use crate::components::filter_bar::FilterBar;
use crate::components::nav::Nav;
use crate::components::staff_card::StaffCard;
use crate::components::stats_bar::StatsBar;
use crate::model::RosterView;
use crate::pages::live_view::LiveViewModal;

/// Refresh interval choices in seconds; 0 turns auto-refresh off.
const REFRESH_CHOICES: [u64; 5] = [0, 5, 10, 30, 60];
const SPIN_DURATION: Duration = Duration::from_secs(1);

// ─── Server functions ────────────────────────────────────────────────────────

/// Current roster.  Backend failures are reported in-band so the page can
/// show its empty state and flip the status indicator.
#[server(GetRoster, "/api")]
pub async fn get_roster() -> Result<RosterView, ServerFnError> {
    use oeks_common::roster::Roster;
    let state = crate::server::app_state()?;
    match state.api.staff_list().await {
        Ok(resp) => {
            let roster = Roster::from_response(resp, chrono::Utc::now());
            tracing::debug!("Roster served: {} staff", roster.len());
            Ok(RosterView {
                roster,
                status: ConnectionStatus::Connected,
            })
        }
        Err(e) => {
            tracing::error!("Error fetching staff list: {e}");
            Ok(RosterView::failed())
        }
    }
}

#[server(GetDashboardSettings, "/api")]
pub async fn get_dashboard_settings() -> Result<DashboardSettings, ServerFnError> {
    let state = crate::server::app_state()?;
    Ok(state.config.dashboard_settings())
}

/// Status of the server's realtime channel.
#[server(GetConnectionStatus, "/api")]
pub async fn get_connection_status() -> Result<ConnectionStatus, ServerFnError> {
    let state = crate::server::app_state()?;
    let status = *state.realtime_status.borrow();
    Ok(status)
}

// ─── Page component ──────────────────────────────────────────────────────────

#[component]
pub fn Dashboard() -> impl IntoView {
    let settings = create_resource(|| (), |_| async { get_dashboard_settings().await });
    let settings = Signal::derive(move || {
        settings
            .get()
            .and_then(Result::ok)
            .unwrap_or_default()
    });

    // Every bump of `generation` refetches the roster and realtime status.
    let (generation, set_generation) = create_signal(0u64);
    let roster = create_resource(move || generation.get(), |_| async { get_roster().await });
    let realtime = create_resource(move || generation.get(), |_| async { get_connection_status().await });

    let view_data = Signal::derive(move || {
        roster
            .get()
            .map(|r| r.unwrap_or_else(|_| RosterView::failed()))
            .unwrap_or_default()
    });
    let status = Signal::derive(move || {
        if view_data.with(RosterView::is_error) {
            return ConnectionStatus::Error;
        }
        realtime
            .get()
            .and_then(Result::ok)
            .unwrap_or(ConnectionStatus::Connecting)
    });

    let filter = create_rw_signal(FilterState::default());
    let divisions = Signal::derive(move || view_data.with(|v| v.roster.divisions()));
    let names = Signal::derive(move || view_data.with(|v| v.roster.names()));

    // Keep dropdown selections that still exist after a refresh.
    create_effect(move |_| {
        let (divisions, names) = (divisions.get(), names.get());
        filter.update(|f| f.retain_options(&divisions, &names));
    });
    create_effect(move |_| {
        let window = Duration::from_secs(settings.with(|s| s.active_window_secs));
        filter.update(|f| f.window = window);
    });

    // ── refresh: interval + manual, both debounced ──────────────────────
    let (refresh_secs, set_refresh_secs) = create_signal::<Option<u64>>(None);
    let interval_secs = Signal::derive(move || {
        refresh_secs
            .get()
            .unwrap_or_else(|| settings.with(|s| s.refresh_interval_secs))
    });
    let (spinning, set_spinning) = create_signal(false);
    let debounce = store_value(None::<TimeoutHandle>);

    let request_refresh = move || {
        if let Some(handle) = debounce.get_value() {
            handle.clear();
        }
        let delay = Duration::from_millis(settings.with_untracked(|s| s.debounce_ms));
        let handle = set_timeout_with_handle(move || set_generation.update(|g| *g += 1), delay).ok();
        debounce.set_value(handle);
    };

    let ticker = store_value(None::<IntervalHandle>);
    #[cfg(feature = "hydrate")]
    create_effect(move |_| {
        if let Some(handle) = ticker.get_value() {
            handle.clear();
        }
        let secs = interval_secs.get();
        let handle = (secs > 0)
            .then(|| set_interval_with_handle(request_refresh, Duration::from_secs(secs)).ok())
            .flatten();
        ticker.set_value(handle);
    });
    on_cleanup(move || {
        if let Some(Some(handle)) = ticker.try_get_value() {
            handle.clear();
        }
        if let Some(Some(handle)) = debounce.try_get_value() {
            handle.clear();
        }
    });

    let on_manual_refresh = move |_| {
        set_spinning.set(true);
        set_timeout(move || set_spinning.set(false), SPIN_DURATION);
        request_refresh();
    };

    // ── grid ─────────────────────────────────────────────────────────────
    let visible = move || -> Vec<StaffRecord> {
        view_data.with(|v| {
            filter.with(|f| {
                filter::apply(&v.roster, f, Utc::now())
                    .visible
                    .iter()
                    .filter_map(|id| v.roster.get(id).cloned())
                    .collect()
            })
        })
    };
    let show_filter_empty = move || {
        view_data.with(|v| filter.with(|f| filter::apply(&v.roster, f, Utc::now()).show_empty_state))
    };

    let (selected, set_selected) = create_signal::<Option<String>>(None);
    let open_live_view = Callback::new(move |id: String| set_selected.set(Some(id)));

    view! {
        <Nav status=status/>
        <div class="dashboard">
            <StatsBar
                stats=Signal::derive(move || view_data.with(|v| v.roster.stats()))
                last_update=Signal::derive(move || view_data.with(|v| v.roster.fetched_at()))
            />

            <div class="toolbar">
                <FilterBar filter=filter divisions=divisions names=names/>
                <div class="refresh-controls">
                    <select
                        class="refresh-select"
                        prop:value=move || interval_secs.get().to_string()
                        on:change=move |ev| {
                            let secs = event_target_value(&ev).parse().unwrap_or(0);
                            set_refresh_secs.set(Some(secs));
                        }
                    >
                        {REFRESH_CHOICES
                            .into_iter()
                            .map(|secs| {
                                let label = if secs == 0 { "Off".to_string() } else { format!("{secs}s") };
                                view! { <option value=secs.to_string()>{label}</option> }
                            })
                            .collect_view()}
                    </select>
                    <button
                        class=move || if spinning.get() { "btn btn-refresh spinning" } else { "btn btn-refresh" }
                        on:click=on_manual_refresh
                        title="Refresh now"
                    >
                        "⟳ Refresh"
                    </button>
                </div>
            </div>

            <Transition fallback=move || view! { <p class="loading">"Loading staff…"</p> }>
                {move || {
                    if view_data.with(|v| v.roster.is_empty()) {
                        let message = if view_data.with(RosterView::is_error) {
                            "Could not reach the tracker. Retrying on the next refresh."
                        } else {
                            "No staff members found"
                        };
                        view! { <div class="empty-state"><p>{message}</p></div> }.into_view()
                    } else if show_filter_empty() {
                        view! {
                            <div class="empty-state filter-empty">
                                <p>"No staff match the current filters"</p>
                                <button class="btn" on:click=move |_| filter.update(FilterState::reset)>
                                    "Reset filters"
                                </button>
                            </div>
                        }.into_view()
                    } else {
                        view! {
                            <div class="staff-grid">
                                <For
                                    each=visible
                                    key=|r| (r.id.clone(), r.timestamp.clone(), r.screenshot_path.clone())
                                    children=move |record: StaffRecord| {
                                        let s = settings.get_untracked();
                                        view! {
                                            <StaffCard
                                                record=record
                                                media_base=s.media_base_url
                                                retry_attempts=s.media_retry_attempts
                                                on_open=open_live_view
                                            />
                                        }
                                    }
                                />
                            </div>
                        }.into_view()
                    }
                }}
            </Transition>

            {move || selected.get().map(|id| view! {
                <LiveViewModal
                    staff_id=id
                    settings=settings.get_untracked()
                    on_close=move |_| set_selected.set(None)
                />
            })}
        </div>
    }
}
