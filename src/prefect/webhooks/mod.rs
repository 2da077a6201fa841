//! Webhook module

mod api;
mod models;

pub use api::WebhooksClient;
pub use models::{Webhook, WebhookRequest};
