//! Browser controllers for the crop recommendation and disease detection pages.
//!
//! Everything outside [`web`] is target-independent: the controllers talk to
//! their page, network and notifier through traits, so the workflows can be
//! exercised natively with fakes. The `web` module binds those traits to the
//! DOM and `fetch` when compiled for `wasm32`.

pub mod config;
pub mod detect;
pub mod error;
pub mod ids;
pub mod markup;
pub mod models;
pub mod notify;
pub mod recommend;
pub mod render;
pub mod sensor;
pub mod services;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::ClientConfig;
pub use error::WorkflowError;
