//! Live-view modal – detail panel, live media and history tabs for one
//! staff member.

use std::time::Duration;

use chrono::Utc;
use leptos::*;
use leptos::leptos_dom::helpers::IntervalHandle;

use oeks_common::config::DashboardSettings;
use oeks_common::live_view::{self, Cadence, LiveMedia, LiveViewSession, VideoRetry};
use oeks_common::media::RetryPolicy;
use oeks_common::roster::StaffRecord;

use crate::components::retry_image::RetryImage;
use crate::model::{now_ms, DetailTab};
use crate::pages::history::ScreenshotHistory;
use crate::pages::timeline::VideoTimeline;
use crate::pages::videos::VideoHistory;

/// Refresh-rate selector choices, seconds.
const RATE_CHOICES: [u64; 3] = [3, 5, 10];

// ─── Server functions ────────────────────────────────────────────────────────

#[server(GetStaffDetail, "/api")]
pub async fn get_staff_detail(staff_id: String) -> Result<StaffRecord, ServerFnError> {
    let state = crate::server::app_state()?;
    state
        .api
        .staff(&staff_id)
        .await
        .map_err(crate::server::api_error)
}

// ─── Modal component ─────────────────────────────────────────────────────────

#[component]
pub fn LiveViewModal(
    staff_id: String,
    settings: DashboardSettings,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let session = store_value(
        LiveViewSession::open(staff_id.clone(), settings.live_view_refresh_secs)
            .with_inactive_refresh(Duration::from_secs(settings.inactive_refresh_secs))
            .with_retry_policy(RetryPolicy::video().with_max_attempts(settings.media_retry_attempts)),
    );
    let id = store_value(staff_id);
    let media_base = store_value(settings.media_base_url.clone());

    let (record, set_record) = create_signal::<Option<StaffRecord>>(None);
    let (media, set_media) = create_signal::<Option<LiveMedia>>(None);
    let (loading, set_loading) = create_signal(true);
    let (error, set_error) = create_signal::<Option<String>>(None);
    let (rate, set_rate) = create_signal(session.with_value(|s| s.refresh_rate().as_secs()));
    let (tab, set_tab) = create_signal(DetailTab::default());

    // Fetch the record; `with_media` also swaps the media source.
    #[allow(unused_variables)] // called only in the hydrate (WASM) build
    let load = move |with_media: bool| {
        spawn_local(async move {
            match get_staff_detail(id.get_value()).await {
                Ok(r) => {
                    if with_media {
                        let base = media_base.get_value();
                        let mut next = None;
                        session.update_value(|s| next = Some(s.refresh_media(&r, &base, now_ms())));
                        if !matches!(next, Some(LiveMedia::Video { .. })) {
                            set_loading.set(false);
                        }
                        set_media.set(next);
                    }
                    set_record.set(Some(r));
                    set_error.set(None);
                }
                Err(e) => {
                    set_loading.set(false);
                    set_error.set(Some(format!("Failed to load staff details: {e}")));
                }
            }
        });
    };

    // ── refresh cadence ──────────────────────────────────────────────────
    #[allow(unused_variables)]
    let cadence = create_memo(move |_| {
        rate.track();
        record.with(|r| r.as_ref().map(|r| session.with_value(|s| s.cadence(r))))
    });
    let timer = store_value(None::<IntervalHandle>);

    #[cfg(feature = "hydrate")]
    {
        load(true);
        create_effect(move |_| {
            if let Some(handle) = timer.get_value() {
                handle.clear();
            }
            let handle = cadence.get().and_then(|c: Cadence| {
                set_interval_with_handle(move || load(c.refreshes_media()), c.period()).ok()
            });
            timer.set_value(handle);
        });
    }
    on_cleanup(move || {
        if let Some(Some(handle)) = timer.try_get_value() {
            handle.clear();
        }
    });

    let on_rate_change = move |ev| {
        let secs = event_target_value(&ev).parse().unwrap_or(3);
        session.update_value(|s| s.set_refresh_rate(secs));
        set_rate.set(session.with_value(|s| s.refresh_rate().as_secs()));
    };

    let on_video_error = move |_| {
        let mut outcome = None;
        let base = media_base.get_value();
        session.update_value(|s| outcome = Some(s.on_video_error(&base, now_ms())));
        match outcome {
            Some(VideoRetry::Retry { delay, url, generation }) => {
                set_loading.set(true);
                set_timeout(
                    move || {
                        // A refresh may have swapped the source meanwhile.
                        if session.try_with_value(|s| s.is_current(generation)) == Some(true) {
                            set_media.set(Some(LiveMedia::Video { url }));
                        }
                    },
                    delay,
                );
            }
            Some(VideoRetry::GiveUp { message }) => {
                set_loading.set(false);
                set_media.set(Some(LiveMedia::Unavailable { reason: message }));
            }
            None => {}
        }
    };
    let on_video_loaded = move |_| {
        session.update_value(|s| s.media_loaded());
        set_loading.set(false);
    };

    let close = move |_| on_close.call(());

    // ── views ────────────────────────────────────────────────────────────
    let detail_panel = move || {
        record.get().map(|r| {
            let d = live_view::detail(&r, Utc::now());
            view! {
                <dl class="staff-detail">
                    <dt>"Name"</dt><dd>{d.name}</dd>
                    <dt>"Division"</dt><dd>{d.division}</dd>
                    <dt>"ID"</dt><dd>{d.id}</dd>
                    <dt>"Status"</dt>
                    <dd>
                        <span class=format!("status-dot {}", d.status.css_class())></span>
                        {d.status_label}
                    </dd>
                    <dt>"Last seen"</dt><dd>{d.last_seen}</dd>
                </dl>
            }
        })
    };

    let media_view = move || match media.get() {
        None => view! { <div class="media-placeholder"></div> }.into_view(),
        Some(LiveMedia::Video { url }) => view! {
            <video
                class="live-video"
                src=url
                autoplay
                muted
                controls
                on:loadeddata=on_video_loaded
                on:error=on_video_error
            ></video>
        }
        .into_view(),
        Some(LiveMedia::Screenshot { url }) => view! {
            <RetryImage
                src=url
                alt="Latest screenshot"
                class="live-screenshot"
                max_attempts=settings.media_retry_attempts
            />
        }
        .into_view(),
        Some(LiveMedia::Unavailable { reason }) => view! {
            <div class="no-media"><p>{reason}</p></div>
        }
        .into_view(),
    };

    let tab_body = move || {
        let staff_id = id.get_value();
        let base = media_base.get_value();
        match tab.get() {
            DetailTab::Screenshots => view! {
                <ScreenshotHistory
                    staff_id=staff_id
                    media_base=base
                    limit=settings.history_limit
                    playback=Duration::from_millis(settings.playback_interval_ms)
                />
            }
            .into_view(),
            DetailTab::Videos => view! { <VideoHistory staff_id=staff_id media_base=base/> }.into_view(),
            DetailTab::Timeline => view! { <VideoTimeline staff_id=staff_id media_base=base/> }.into_view(),
        }
    };

    view! {
        <div class="modal-backdrop" on:click=close>
            <div class="modal" on:click=|ev| ev.stop_propagation()>
                <div class="modal-header">
                    <span class=move || {
                        let class = record
                            .with(|r| r.as_ref().map(|r| r.recording_status.css_class()))
                            .unwrap_or("status-inactive");
                        format!("status-dot {class}")
                    }></span>
                    <h2>{move || record.with(|r| r.as_ref().map(|r| r.name.clone())).unwrap_or_else(|| id.get_value())}</h2>
                    <label class="rate-select">
                        "Refresh "
                        <select prop:value=move || rate.get().to_string() on:change=on_rate_change>
                            {RATE_CHOICES
                                .into_iter()
                                .map(|s| view! { <option value=s.to_string()>{format!("{s}s")}</option> })
                                .collect_view()}
                        </select>
                    </label>
                    <button class="btn btn-close" on:click=close>"×"</button>
                </div>

                {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}

                <div class="modal-body">
                    <div class="live-media">
                        {media_view}
                        <Show when=move || loading.get()>
                            <div class="loading-indicator">"Loading…"</div>
                        </Show>
                    </div>
                    {detail_panel}
                </div>

                <div class="tabs">
                    {DetailTab::ALL
                        .into_iter()
                        .map(|t| view! {
                            <button
                                class=move || if tab.get() == t { "tab active" } else { "tab" }
                                on:click=move |_| set_tab.set(t)
                            >
                                {t.label()}
                            </button>
                        })
                        .collect_view()}
                </div>
                <div class="tab-body">{tab_body}</div>
            </div>
        </div>
    }
}
