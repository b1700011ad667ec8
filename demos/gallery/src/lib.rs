//! Demo screens for the tether runtime, rendered as plain text.

pub mod app;
pub mod ui;
pub mod view;
pub mod pages {
    pub mod animation;
    pub mod binding;
    pub mod environment;
    pub mod observable;
    pub mod paging;
}
