use crate::errors::DataError;
use crate::models::*;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Quote Provider Trait
// ---------------------------------------------------------------------------

/// External market-data collaborator.
///
/// Implementations are expected to try a prioritized list of listing-suffix
/// candidates for ambiguous symbols (e.g. a bare numeric Taiwan code) and
/// return the first non-empty series.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch daily adjusted price history, oldest bar first.
    ///
    /// Returns `DataError::NoData` when no listing candidate yields bars.
    async fn price_history(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<Vec<PriceBar>, DataError>;

    /// Fetch fundamental metadata. Fields the provider has no figure for
    /// come back as `None`, never as an error.
    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, DataError>;

    /// Resolve a human-readable display name, falling back to the raw
    /// symbol when none is resolvable.
    async fn display_name(&self, symbol: &str) -> String;
}
