use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A named pool of candidate symbols for the radar scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    pub description: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("IO error reading pool file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid pool file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize)]
struct PoolFile {
    #[serde(default)]
    pools: Vec<Pool>,
}

/// Load additional pools from a TOML file:
///
/// ```toml
/// [[pools]]
/// name = "my-watchlist"
/// description = "Personal watchlist"
/// symbols = ["2330", "NVDA"]
/// ```
pub fn load_pools(path: &Path) -> Result<Vec<Pool>, PoolError> {
    let raw = std::fs::read_to_string(path)?;
    let file: PoolFile = toml::from_str(&raw)?;
    Ok(file.pools)
}

/// Split a free-form symbol list on commas and whitespace, dropping empty
/// entries and uppercasing (bare Taiwan codes are unaffected).
pub fn parse_symbol_list(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_uppercase())
        .collect()
}

fn pool(name: &str, description: &str, symbols: &[&str]) -> Pool {
    Pool {
        name: name.to_string(),
        description: description.to_string(),
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
    }
}

/// Built-in candidate pools.
pub fn builtin_pools() -> Vec<Pool> {
    vec![
        pool(
            "tw-top50",
            "Taiwan large caps (0050 constituents)",
            &[
                "2330", "2317", "2454", "2308", "2303", "2881", "2882", "2603", "1301", "2002",
                "2382", "2357", "3231", "6669", "2891", "1216", "2886", "2884", "2002", "1303",
                "2412", "3008", "3045", "2892", "5880", "2327", "2880", "2345", "2885", "2207",
                "1101", "2395", "4938", "2883", "2887", "2609", "2615", "5871", "2379", "3034",
            ],
        ),
        pool(
            "tw-ai-server",
            "Taiwan AI server and thermal supply chain",
            &[
                "2330", "2317", "2382", "3231", "2356", "2376", "6669", "3443", "3661", "3035",
                "2454", "2308", "3017", "3324", "2421", "2059", "3013", "3533", "5269", "8210",
            ],
        ),
        pool(
            "tw-shipping-power",
            "Taiwan shipping, heavy electric, and green energy",
            &[
                "2603", "2609", "2615", "2618", "2610", "2637", "5608", "2606", "2605", "1513",
                "1519", "1503", "1504", "1609", "6806", "3708",
            ],
        ),
        pool(
            "tw-etf",
            "Popular Taiwan ETFs",
            &[
                "0050", "0056", "00878", "00929", "00919", "00940", "00713", "00939", "006208",
                "00881", "00830", "00679B", "00687B",
            ],
        ),
        pool(
            "us-tech",
            "US mega-cap tech and semiconductors",
            &[
                "AAPL", "NVDA", "MSFT", "GOOG", "AMZN", "META", "TSLA", "TSM", "AMD", "AVGO",
                "QCOM", "TXN", "INTC", "MU", "AMAT", "LRCX", "SMCI", "ARM",
            ],
        ),
    ]
}

/// Look up a pool by name across built-ins and any user-supplied extras.
pub fn find_pool<'a>(pools: &'a [Pool], name: &str) -> Option<&'a Pool> {
    pools.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_named_and_populated() {
        let pools = builtin_pools();
        assert_eq!(pools.len(), 5);
        assert!(pools.iter().all(|p| !p.symbols.is_empty()));
        assert!(find_pool(&pools, "us-tech").is_some());
        assert!(find_pool(&pools, "nope").is_none());
    }

    #[test]
    fn parse_mixed_separators() {
        let symbols = parse_symbol_list("2330, 2603  nvda\ntsla,");
        assert_eq!(symbols, vec!["2330", "2603", "NVDA", "TSLA"]);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_symbol_list("  , \n ").is_empty());
    }

    #[test]
    fn load_pools_from_toml() {
        let dir = std::env::temp_dir().join("stockradar-pools-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pools.toml");
        std::fs::write(
            &path,
            r#"
[[pools]]
name = "watchlist"
description = "Test pool"
symbols = ["2330", "NVDA"]
"#,
        )
        .unwrap();

        let pools = load_pools(&path).unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].name, "watchlist");
        assert_eq!(pools[0].symbols, vec!["2330", "NVDA"]);
    }
}
