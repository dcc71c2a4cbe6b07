//! Video history tab – 5-minute, hourly and daily clips.

use leptos::*;

use oeks_common::history::DateFilter;
use oeks_common::media;
use oeks_common::timefmt::date_key_label;
use oeks_common::video::{VideoHistoryResponse, VideoItem, VideoKind};

use crate::components::video_overlay::VideoOverlay;

// ─── Server functions ────────────────────────────────────────────────────────

/// All clip kinds for a staff member; `kind` narrows the request when set.
#[server(GetStaffVideos, "/api")]
pub async fn get_staff_videos(
    staff_id: String,
    date: String,
    kind: Option<String>,
) -> Result<VideoHistoryResponse, ServerFnError> {
    let state = crate::server::app_state()?;
    let kind = kind.as_deref().and_then(VideoKind::parse);
    state
        .api
        .staff_videos(&staff_id, &DateFilter::parse(&date), kind)
        .await
        .map_err(crate::server::api_error)
}

// ─── Tab component ───────────────────────────────────────────────────────────

#[component]
pub fn VideoHistory(staff_id: String, media_base: String) -> impl IntoView {
    let (date, set_date) = create_signal(DateFilter::All);
    let (kind, set_kind) = create_signal(VideoKind::default());
    let videos = create_resource(
        move || date.get(),
        move |date| {
            let staff_id = staff_id.clone();
            async move { get_staff_videos(staff_id, date.to_string(), None).await }
        },
    );

    let (dates, set_dates) = create_signal::<Vec<String>>(Vec::new());
    create_effect(move |_| {
        if let Some(Ok(resp)) = videos.get() {
            if !resp.available_dates.is_empty() {
                set_dates.set(resp.available_dates);
            }
        }
    });

    let (playing, set_playing) = create_signal::<Option<VideoItem>>(None);
    let base = store_value(media_base);
    let overlay_url = Signal::derive(move || {
        playing.with(|v| v.as_ref().map(|v| media::resolve(&base.get_value(), v.playback_path())))
    });
    let overlay_title = Signal::derive(move || {
        playing.with(|v| {
            v.as_ref()
                .map(|v| format!("{} – {}", v.kind.label(), v.display_label()))
                .unwrap_or_default()
        })
    });

    let clip_list = move |items: Vec<VideoItem>| {
        if items.is_empty() {
            return view! { <p class="empty-state">"No videos for this period"</p> }.into_view();
        }
        view! {
            <ul class="video-list">
                {items
                    .into_iter()
                    .map(|item| {
                        let label = item.display_label();
                        let duration = item.duration.clone();
                        view! {
                            <li class="video-item">
                                <span class="video-label">{label}</span>
                                <span class="video-duration">{duration}</span>
                                <button class="btn btn-primary" on:click=move |_| set_playing.set(Some(item.clone()))>
                                    "▶ Play"
                                </button>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        }
        .into_view()
    };

    view! {
        <div class="videos-tab">
            <div class="videos-toolbar">
                <div class="kind-tabs">
                    {VideoKind::ALL
                        .into_iter()
                        .map(|k| view! {
                            <button
                                class=move || if kind.get() == k { "tab active" } else { "tab" }
                                on:click=move |_| set_kind.set(k)
                            >
                                {k.label()}
                            </button>
                        })
                        .collect_view()}
                </div>
                <select
                    class="date-select"
                    prop:value=move || date.get().to_string()
                    on:change=move |ev| set_date.set(DateFilter::parse(&event_target_value(&ev)))
                >
                    <option value="all">"All dates"</option>
                    {move || dates.get()
                        .into_iter()
                        .map(|d| {
                            let label = date_key_label(&d).unwrap_or_else(|| d.clone());
                            view! { <option value=d>{label}</option> }
                        })
                        .collect_view()}
                </select>
            </div>

            <Suspense fallback=move || view! { <p class="loading">"Loading videos…"</p> }>
                {move || videos.get().map(|res| match res {
                    Ok(resp) => clip_list(resp.items(kind.get()).to_vec()),
                    Err(e) => view! {
                        <p class="error">"Error: " {e.to_string()}</p>
                    }.into_view(),
                })}
            </Suspense>

            <VideoOverlay url=overlay_url title=overlay_title on_close=move |_| set_playing.set(None)/>
        </div>
    }
}
