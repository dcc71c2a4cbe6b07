//! Header counters above the staff grid.

use chrono::{DateTime, Utc};
use leptos::*;

use oeks_common::roster::RosterStats;
use oeks_common::timefmt::{format_clock, NO_CLOCK};

#[component]
pub fn StatsBar(
    #[prop(into)] stats: Signal<RosterStats>,
    #[prop(into)] last_update: Signal<Option<DateTime<Utc>>>,
) -> impl IntoView {
    let last = move || last_update.get().map(format_clock).unwrap_or_else(|| NO_CLOCK.into());

    view! {
        <div class="stats-bar">
            <div class="stat">
                <span class="stat-value">{move || stats.get().total}</span>
                <span class="stat-label">"Total Staff"</span>
            </div>
            <div class="stat">
                <span class="stat-value">{move || stats.get().active}</span>
                <span class="stat-label">"Recording"</span>
            </div>
            <div class="stat">
                <span class="stat-value">{last}</span>
                <span class="stat-label">"Last Update"</span>
            </div>
            <div class="stat">
                <span class="stat-value">{move || stats.get().with_screenshot}</span>
                <span class="stat-label">"Screenshots Available"</span>
            </div>
        </div>
    }
}
