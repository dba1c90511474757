pub mod diagnose;
pub mod enrich;
pub mod pools;
pub mod scan;
pub mod signals;

pub use diagnose::{diagnose, DiagnosticReport};
pub use enrich::{enrich, EnrichedSeries, SeriesTail, MIN_BARS};
pub use pools::{builtin_pools, find_pool, load_pools, parse_symbol_list, Pool, PoolError};
pub use scan::{scan, ScanConfig};
pub use signals::*;
