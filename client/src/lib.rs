//! Native side of the OEKS Team Tracker: REST client, roster poller and
//! the authenticated realtime channel.  Used by the `oeks-watch` console
//! and by the dashboard's server.

pub mod api;
pub mod poller;
pub mod realtime;

pub use api::{ApiClient, ApiError};
pub use poller::{Poller, PollerHandle, PollerOptions, RosterSnapshot, RosterSource};
pub use realtime::RealtimeChannel;
