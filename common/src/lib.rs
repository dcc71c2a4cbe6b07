//! Shared model and pure dashboard logic for the OEKS Team Tracker.
//!
//! Compiled natively (client, SSR server) and to WASM (hydrated dashboard),
//! so nothing in here touches the network or spawns tasks.

pub mod config;
pub mod filter;
pub mod history;
pub mod live_view;
pub mod media;
pub mod protocol;
pub mod roster;
pub mod timefmt;
pub mod timeline;
pub mod video;
