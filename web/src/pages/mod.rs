pub mod dashboard;
pub mod history;
pub mod live_view;
pub mod timeline;
pub mod videos;
