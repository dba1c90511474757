use chrono::NaiveDate;
use std::path::Path;
use stockradar_core::{DataError, PriceBar};

/// Load daily OHLCV bars from a CSV file.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `date`, `open`, `high`, `low`, `close`, `volume`
///
/// Rows are sorted ascending by date. Supports common date formats.
pub fn load_price_bars(path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::ParseError(format!("Failed to open CSV: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {e}")))?
        .clone();

    let cols = resolve_columns(&headers)?;

    let mut bars = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| DataError::ParseError(format!("CSV record error: {e}")))?;

        bars.push(PriceBar {
            date: parse_date(&record[cols.date])?,
            open: parse_f64(&record[cols.open], "open")?,
            high: parse_f64(&record[cols.high], "high")?,
            low: parse_f64(&record[cols.low], "low")?,
            close: parse_f64(&record[cols.close], "close")?,
            volume: parse_volume(&record[cols.volume])?,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap, DataError> {
    let find = |names: &[&str]| find_column(headers, names);
    Ok(ColumnMap {
        date: find(&["date", "timestamp", "datetime"])
            .ok_or_else(|| DataError::ParseError("No date column found".into()))?,
        open: find(&["open", "o"])
            .ok_or_else(|| DataError::ParseError("No open column found".into()))?,
        high: find(&["high", "h"])
            .ok_or_else(|| DataError::ParseError("No high column found".into()))?,
        low: find(&["low", "l"])
            .ok_or_else(|| DataError::ParseError("No low column found".into()))?,
        close: find(&["close", "c", "adj close", "adj_close"])
            .ok_or_else(|| DataError::ParseError("No close column found".into()))?,
        volume: find(&["volume", "vol", "v"])
            .ok_or_else(|| DataError::ParseError("No volume column found".into()))?,
    })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let h = header.trim().to_lowercase();
        names.iter().any(|name| h == *name)
    })
}

fn parse_f64(s: &str, field: &str) -> Result<f64, DataError> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| DataError::ParseError(format!("Failed to parse {field} '{s}': {e}")))
}

fn parse_volume(s: &str) -> Result<u64, DataError> {
    // Some exports write volume as a float ("12000.0").
    let value = parse_f64(s, "volume")?;
    if value < 0.0 {
        return Err(DataError::ParseError(format!("Negative volume '{s}'")));
    }
    Ok(value as u64)
}

fn parse_date(s: &str) -> Result<NaiveDate, DataError> {
    let s = s.trim();
    let formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];
    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    // Datetime-stamped exports: take the date part.
    if let Some((date_part, _)) = s.split_once(|c| c == ' ' || c == 'T') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Ok(date);
        }
    }
    Err(DataError::ParseError(format!("Unable to parse date: '{s}'")))
}
