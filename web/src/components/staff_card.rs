//! Card for one staff member in the dashboard grid.

use chrono::Utc;
use leptos::*;

use oeks_common::media;
use oeks_common::roster::StaffRecord;
use oeks_common::timefmt::format_time_ago;

use crate::components::retry_image::RetryImage;
use crate::model::now_ms;

/// Status dot, latest screenshot (or a placeholder), "last seen" footer and
/// a button opening the live view.
#[component]
pub fn StaffCard(
    record: StaffRecord,
    #[prop(into)] media_base: String,
    #[prop(default = 3)] retry_attempts: u32,
    #[prop(into)] on_open: Callback<String>,
) -> impl IntoView {
    let status = record.recording_status;
    let last_seen = format_time_ago(Some(&record.timestamp), Utc::now());
    let id = record.id.clone();

    let screenshot = match record.screenshot_path.as_deref() {
        Some(path) if record.has_screenshot() => {
            let src = media::cache_busted(&media::resolve(&media_base, path), now_ms());
            view! {
                <RetryImage
                    src=src
                    alt=format!("Screenshot of {}", record.name)
                    class="staff-screenshot"
                    max_attempts=retry_attempts
                />
            }
            .into_view()
        }
        _ => view! {
            <div class="screenshot-placeholder">
                <span class=format!("status-dot {}", status.css_class())></span>
                <span class="placeholder-status">{status.label()}</span>
                <span class="placeholder-time">{last_seen.clone()}</span>
            </div>
        }
        .into_view(),
    };

    view! {
        <div class="staff-card" data-staff-id=record.id.clone()>
            <div class="staff-card-header">
                <span class=format!("status-dot {}", status.css_class()) title=status.label()></span>
                <div class="staff-identity">
                    <span class="staff-name">{record.name.clone()}</span>
                    <span class="staff-division">{record.division.clone()}</span>
                </div>
            </div>
            <div class="staff-media">{screenshot}</div>
            <div class="staff-card-footer">
                <span class="last-seen">"Last seen: " {last_seen}</span>
                <button class="btn btn-primary" on:click=move |_| on_open.call(id.clone())>
                    "Live View"
                </button>
            </div>
        </div>
    }
}
