//! `<img>` that retries a failed load a few times before showing a
//! placeholder.

use leptos::*;

use oeks_common::media::{self, MediaAttempts, RetryDecision, RetryPolicy, PLACEHOLDER_IMAGE};

use crate::model::now_ms;

#[component]
pub fn RetryImage(
    #[prop(into)] src: String,
    #[prop(into)] alt: String,
    #[prop(optional, into)] class: Option<String>,
    #[prop(default = 3)] max_attempts: u32,
) -> impl IntoView {
    let attempts = store_value(MediaAttempts::new(
        RetryPolicy::image().with_max_attempts(max_attempts),
    ));
    let original = store_value(src.clone());
    let (current, set_current) = create_signal(src);

    let on_error = move |_| {
        let mut decision = RetryDecision::GiveUp;
        attempts.update_value(|a| decision = a.on_failure());
        match decision {
            RetryDecision::Retry { delay, .. } => {
                let url = media::with_retry_marker(&original.get_value(), now_ms());
                set_timeout(move || set_current.set(url), delay);
            }
            RetryDecision::GiveUp => set_current.set(PLACEHOLDER_IMAGE.to_string()),
        }
    };

    view! {
        <img
            src=move || current.get()
            alt=alt
            class=class.unwrap_or_default()
            loading="lazy"
            on:load=move |_| attempts.update_value(|a| a.reset())
            on:error=on_error
        />
    }
}
