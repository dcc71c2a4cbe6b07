//! 24-hour bar with positioned clip segments.

use leptos::*;

use oeks_common::timeline::{self, PlacedSegment, TimelineSegment};
use oeks_common::video::VideoKind;

/// Segments are drawn earliest first and ignore pointer events, so a click
/// always lands on the bar and is resolved with [`timeline::segment_at`].
#[component]
pub fn TimelineBar(
    segments: Vec<TimelineSegment>,
    #[prop(into)] on_select: Callback<TimelineSegment>,
) -> impl IntoView {
    let placed = store_value(timeline::layout(&segments));

    let segment_class = |kind: VideoKind| match kind {
        VideoKind::FiveMinute => "timeline-segment segment-5min",
        VideoKind::Hourly => "timeline-segment segment-hourly",
        VideoKind::Daily => "timeline-segment segment-daily",
    };

    let on_click = move |ev: ev::MouseEvent| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen::JsCast;
            let width = ev
                .current_target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                .map(|el| el.offset_width())
                .unwrap_or(0);
            if width > 0 {
                let percent = ev.offset_x() as f64 / width as f64 * 100.0;
                let hit = placed.with_value(|p| timeline::segment_at(p, percent).map(|s| s.segment.clone()));
                if let Some(segment) = hit {
                    on_select.call(segment);
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (ev, on_select);
    };

    let markers = timeline::hour_markers(3)
        .into_iter()
        .map(|(hour, left)| {
            view! {
                <span class="timeline-marker" style=format!("left: {left:.3}%")>
                    {format!("{hour:02}:00")}
                </span>
            }
        })
        .collect_view();

    let bars = placed.with_value(|p| {
        p.iter()
            .map(|PlacedSegment { left, width, segment }| {
                view! {
                    <div
                        class=segment_class(segment.kind)
                        style=format!("left: {left:.3}%; width: {width:.3}%; pointer-events: none")
                        title=format!("{} ({})", segment.display_label(), segment.kind.label())
                    ></div>
                }
            })
            .collect_view()
    });

    view! {
        <div class="timeline">
            <div class="timeline-markers">{markers}</div>
            <div class="timeline-bar" on:click=on_click>{bars}</div>
            {segments.is_empty().then(|| view! {
                <p class="timeline-empty">"No recordings for this day"</p>
            })}
        </div>
    }
}
