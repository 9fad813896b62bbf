//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::IntakeConfig;
use crate::services::OrderIntake;
use crate::shopify::{AdminRestClient, ShopifyError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Nothing in it changes after
/// startup; no request state survives between requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: IntakeConfig,
    intake: OrderIntake,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client cannot be built from the
    /// configured access token.
    pub fn new(config: IntakeConfig) -> Result<Self, ShopifyError> {
        let client = AdminRestClient::new(&config.shopify)?;
        let intake = OrderIntake::new(client, config.shopify.clone(), config.checkout);

        Ok(Self {
            inner: Arc::new(AppStateInner { config, intake }),
        })
    }

    /// Get a reference to the intake configuration.
    #[must_use]
    pub fn config(&self) -> &IntakeConfig {
        &self.inner.config
    }

    /// Get a reference to the order intake service.
    #[must_use]
    pub fn intake(&self) -> &OrderIntake {
        &self.inner.intake
    }
}
