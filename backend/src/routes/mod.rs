mod docs;
mod health;
pub mod v1;

use aide::axum::{routing::get, ApiRouter};

use crate::ui;

/// Creates the router with all handler routes
#[must_use]
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .merge(ui::handler())
        .api_route("/health", get(health::handler))
        .nest("/v1", v1::handler())
}
