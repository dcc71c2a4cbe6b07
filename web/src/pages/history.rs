//! Screenshot history tab – date filter, thumbnail grid and 3 fps playback.

use std::time::Duration;

use leptos::*;
use leptos::leptos_dom::helpers::IntervalHandle;

use oeks_common::history::{self, DateFilter, HistoryPlayback, HistoryResponse};
use oeks_common::media;
use oeks_common::timefmt::date_key_label;

use crate::components::retry_image::RetryImage;

// ─── Server functions ────────────────────────────────────────────────────────

#[server(GetStaffHistory, "/api")]
pub async fn get_staff_history(
    staff_id: String,
    date: String,
    limit: u32,
) -> Result<HistoryResponse, ServerFnError> {
    let state = crate::server::app_state()?;
    state
        .api
        .staff_history(&staff_id, &DateFilter::parse(&date), limit)
        .await
        .map_err(crate::server::api_error)
}

// ─── Tab component ───────────────────────────────────────────────────────────

#[component]
pub fn ScreenshotHistory(
    staff_id: String,
    media_base: String,
    limit: u32,
    playback: Duration,
) -> impl IntoView {
    let (date, set_date) = create_signal(DateFilter::All);
    let history = create_resource(
        move || date.get(),
        move |date| {
            let staff_id = staff_id.clone();
            async move { get_staff_history(staff_id, date.to_string(), limit).await }
        },
    );

    let player = create_rw_signal(HistoryPlayback::default());
    let (dates, set_dates) = create_signal::<Vec<String>>(Vec::new());
    create_effect(move |_| {
        if let Some(Ok(resp)) = history.get() {
            player.set(HistoryPlayback::new(resp.history));
            if !resp.available_dates.is_empty() {
                set_dates.set(resp.available_dates);
            }
        }
    });

    // ── playback timer ───────────────────────────────────────────────────
    let playing = create_memo(move |_| player.with(HistoryPlayback::is_playing));
    let timer = store_value(None::<IntervalHandle>);
    create_effect(move |_| {
        if let Some(handle) = timer.get_value() {
            handle.clear();
        }
        let handle = playing
            .get()
            .then(|| set_interval_with_handle(move || player.update(HistoryPlayback::tick), playback).ok())
            .flatten();
        timer.set_value(handle);
    });
    on_cleanup(move || {
        if let Some(Some(handle)) = timer.try_get_value() {
            handle.clear();
        }
    });

    let base = store_value(media_base);
    let src_for = move |path: &str| media::resolve(&base.get_value(), path);

    let current_frame = move || {
        player.with(|p| {
            p.current().map(|item| {
                let src = src_for(&item.path);
                view! { <RetryImage src=src alt=item.filename.clone() class="history-frame"/> }
            })
        })
    };

    let thumbnails = move || {
        player.with(|p| {
            let selected = p.index();
            p.items()
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let class = if i == selected { "history-thumb selected" } else { "history-thumb" };
                    view! {
                        <button class=class on:click=move |_| player.update(|p| p.select(i))>
                            <RetryImage src=src_for(&item.path) alt=item.filename.clone()/>
                            <span class="thumb-time">{history::time_label(item)}</span>
                        </button>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <div class="history-tab">
            <div class="history-toolbar">
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

            <Suspense fallback=move || view! { <p class="loading">"Loading history…"</p> }>
                {move || history.get().map(|res| match res {
                    Err(e) => view! {
                        <p class="error">"Error: " {e.to_string()}</p>
                    }.into_view(),
                    Ok(resp) if resp.history.is_empty() => view! {
                        <p class="empty-state">"No screenshots for this period"</p>
                    }.into_view(),
                    Ok(_) => view! {
                        <div class="history-player">
                            <div class="history-frame-wrap">{current_frame}</div>
                            <div class="playback-controls">
                                <button class="btn" on:click=move |_| player.update(HistoryPlayback::previous)>"⏮"</button>
                                <button class="btn" on:click=move |_| player.update(|p| { p.toggle(); })>
                                    {move || if playing.get() { "⏸" } else { "▶" }}
                                </button>
                                <button class="btn" on:click=move |_| player.update(HistoryPlayback::next)>"⏭"</button>
                                <span class="playback-counter">{move || player.with(HistoryPlayback::counter_label)}</span>
                                <span class="playback-time">{move || player.with(HistoryPlayback::current_time_label)}</span>
                            </div>
                            <div class="progress">
                                <div
                                    class="progress-bar"
                                    style=move || format!("width: {:.1}%", player.with(HistoryPlayback::progress_percent))
                                ></div>
                            </div>
                            <div class="history-grid">{thumbnails}</div>
                        </div>
                    }.into_view(),
                })}
            </Suspense>
        </div>
    }
}
