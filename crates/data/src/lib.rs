pub mod csv_loader;
pub mod listing;
pub mod yahoo;

pub use listing::listing_candidates;
pub use yahoo::YahooProvider;
