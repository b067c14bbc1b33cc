//! CSV export for aggregated records.

use std::io::Write;

use dirscout_core::BusinessRecord;
use dirscout_scraper::column_order;

/// Writes `records` as CSV: the header is the union of populated columns in
/// preferred order, unset fields become empty cells.
///
/// # Errors
///
/// Propagates any underlying I/O or CSV serialization error.
pub fn write_csv<W: Write>(writer: W, records: &[BusinessRecord]) -> anyhow::Result<()> {
    let columns = column_order(records);
    if columns.is_empty() {
        return Ok(());
    }
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| record.field(column).unwrap_or_default())
            .collect();
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}
