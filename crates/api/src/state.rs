use std::sync::Arc;
use stockradar_core::QuoteProvider;
use stockradar_screener::Pool;

/// Shared application state accessible by all route handlers.
///
/// Resolved once at startup; the indicator/scoring core never consults it.
pub struct AppState {
    pub provider: Arc<dyn QuoteProvider>,
    /// Built-in pools plus any loaded from a pool file.
    pub pools: Vec<Pool>,
}

impl AppState {
    pub fn new(provider: Arc<dyn QuoteProvider>, pools: Vec<Pool>) -> Self {
        Self { provider, pools }
    }
}
