//! Event catalog, channel template store and placeholder rendering.
//!
//! The configuration space is a three-dimensional matrix: business event ×
//! recipient role × delivery channel. [`event::NotificationEvent`] is the
//! switchboard row (which roles, which channels, master switch),
//! [`template::NotificationTemplate`] holds the per-role per-channel message
//! content, and [`render`] fills `{{name}}` placeholders at send time.
//!
//! State lives in an explicitly owned [`store::CatalogStore`], seeded once by
//! [`defaults::load_defaults`] and replaced wholesale by whatever the backing
//! API returns.

pub mod defaults;
pub mod error;
pub mod event;
pub mod render;
pub mod store;
pub mod template;

#[cfg(test)]
mod tests;

pub use error::{CatalogError, Result};
