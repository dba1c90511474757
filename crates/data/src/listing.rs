/// Ordered listing-suffix candidates for a symbol.
///
/// Bare numeric codes are Taiwan listings: try the main board (`.TW`) first
/// and the over-the-counter board (`.TWO`) second. Anything else (US tickers,
/// already-suffixed codes) is queried verbatim. Callers try each candidate in
/// order and stop at the first non-empty result.
pub fn listing_candidates(symbol: &str) -> Vec<String> {
    if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit()) {
        vec![format!("{symbol}.TW"), format!("{symbol}.TWO")]
    } else {
        vec![symbol.to_string()]
    }
}
