pub mod filter_bar;
pub mod nav;
pub mod retry_image;
pub mod staff_card;
pub mod stats_bar;
pub mod timeline_bar;
pub mod video_overlay;
