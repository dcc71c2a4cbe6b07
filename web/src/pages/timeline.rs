//! Timeline tab – one day of recordings on a 24-hour bar.

use leptos::*;

use oeks_common::history::DateFilter;
use oeks_common::media;
use oeks_common::timefmt::date_key_label;
use oeks_common::timeline::{TimelineResponse, TimelineSegment};

use crate::components::timeline_bar::TimelineBar;
use crate::components::video_overlay::VideoOverlay;
use crate::pages::videos::get_staff_videos;

// ─── Server functions ────────────────────────────────────────────────────────

/// Segments for one day; an empty `date` lets the backend pick today.
#[server(GetVideoTimeline, "/api")]
pub async fn get_video_timeline(
    staff_id: String,
    date: String,
) -> Result<TimelineResponse, ServerFnError> {
    let state = crate::server::app_state()?;
    state
        .api
        .video_timeline(&staff_id, &DateFilter::parse(&date))
        .await
        .map_err(crate::server::api_error)
}

// ─── Tab component ───────────────────────────────────────────────────────────

#[component]
pub fn VideoTimeline(staff_id: String, media_base: String) -> impl IntoView {
    let id = store_value(staff_id);

    // Day choices come from the video history listing.
    let dates = create_resource(
        || (),
        move |_| async move {
            get_staff_videos(id.get_value(), DateFilter::All.to_string(), None)
                .await
                .map(|v| v.available_dates)
        },
    );
    let (date, set_date) = create_signal(DateFilter::All);
    let timeline = create_resource(
        move || date.get(),
        move |date| async move { get_video_timeline(id.get_value(), date.to_string()).await },
    );

    let (playing, set_playing) = create_signal::<Option<TimelineSegment>>(None);
    let base = store_value(media_base);
    let overlay_url = Signal::derive(move || {
        playing.with(|s| s.as_ref().map(|s| media::resolve(&base.get_value(), s.playback_path())))
    });
    let overlay_title = Signal::derive(move || {
        playing.with(|s| s.as_ref().map(|s| s.display_label()).unwrap_or_default())
    });

    view! {
        <div class="timeline-tab">
            <select
                class="date-select"
                prop:value=move || date.get().to_string()
                on:change=move |ev| set_date.set(DateFilter::parse(&event_target_value(&ev)))
            >
                <option value="all">"Today"</option>
                {move || dates.get()
                    .and_then(Result::ok)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|d| {
                        let label = date_key_label(&d).unwrap_or_else(|| d.clone());
                        view! { <option value=d>{label}</option> }
                    })
                    .collect_view()}
            </select>

            <Suspense fallback=move || view! { <p class="loading">"Loading timeline…"</p> }>
                {move || timeline.get().map(|res| match res {
                    Ok(resp) => {
                        let heading = date_key_label(&resp.date).unwrap_or(resp.date.clone());
                        view! {
                            <h3 class="timeline-date">{heading}</h3>
                            <TimelineBar
                                segments=resp.segments
                                on_select=move |segment| set_playing.set(Some(segment))
                            />
                        }.into_view()
                    }
                    Err(e) => view! {
                        <p class="error">"Error: " {e.to_string()}</p>
                    }.into_view(),
                })}
            </Suspense>

            <VideoOverlay url=overlay_url title=overlay_title on_close=move |_| set_playing.set(None)/>
        </div>
    }
}
