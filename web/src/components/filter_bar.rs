//! Division / name / status / search controls.

use leptos::*;

use oeks_common::filter::{FilterState, StatusFilter, ALL};

/// Dropdown options are rebuilt from the roster on every refresh; the
/// caller keeps `filter` consistent with them via `retain_options`.
#[component]
pub fn FilterBar(
    filter: RwSignal<FilterState>,
    #[prop(into)] divisions: Signal<Vec<String>>,
    #[prop(into)] names: Signal<Vec<String>>,
) -> impl IntoView {
    let options = move |values: Vec<String>, all_label: &'static str| {
        let mut opts = vec![view! { <option value=ALL>{all_label}</option> }];
        opts.extend(
            values
                .into_iter()
                .map(|v| view! { <option value=v.clone()>{v}</option> }),
        );
        opts
    };

    view! {
        <div class="filter-bar">
            <select
                class="filter-select"
                prop:value=move || filter.with(|f| f.division.clone())
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    filter.update(|f| f.division = value);
                }
            >
                {move || options(divisions.get(), "All Divisions")}
            </select>

            <select
                class="filter-select"
                prop:value=move || filter.with(|f| f.name.clone())
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    filter.update(|f| f.name = value);
                }
            >
                {move || options(names.get(), "All Staff")}
            </select>

            <select
                class="filter-select"
                prop:value=move || filter.with(|f| f.status.as_str())
                on:change=move |ev| {
                    let status = event_target_value(&ev)
                        .parse()
                        .unwrap_or(StatusFilter::All);
                    filter.update(|f| f.status = status);
                }
            >
                <option value="all">"All Statuses"</option>
                <option value="active">"Active"</option>
                <option value="inactive">"Inactive"</option>
            </select>

            <input
                type="search"
                class="filter-search"
                placeholder="Search name, division or ID…"
                prop:value=move || filter.with(|f| f.search.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    filter.update(|f| f.search = value);
                }
            />
        </div>
    }
}
