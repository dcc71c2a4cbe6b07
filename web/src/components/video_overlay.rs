//! Full-screen player for a recorded clip.

use leptos::*;

#[component]
pub fn VideoOverlay(
    #[prop(into)] url: Signal<Option<String>>,
    #[prop(into)] title: Signal<String>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || url.with(Option::is_some)>
            <div class="video-overlay" on:click=move |_| on_close.call(())>
                <div class="video-overlay-content" on:click=|ev| ev.stop_propagation()>
                    <div class="video-overlay-header">
                        <span class="video-overlay-title">{move || title.get()}</span>
                        <button class="btn btn-close" on:click=move |_| on_close.call(())>"×"</button>
                    </div>
                    <video
                        class="video-overlay-player"
                        src=move || url.get().unwrap_or_default()
                        controls
                        autoplay
                    ></video>
                </div>
            </div>
        </Show>
    }
}
