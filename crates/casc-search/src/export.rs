//! Result export

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Append one result per line, creating the file if needed
pub fn append_results(path: &Path, results: &[String]) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for result in results {
        writeln!(writer, "{}", result)?;
    }
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        count = results.len(),
        "Exported results"
    );
    Ok(())
}

/// Console summary: `Found N:` then one indented line per result
pub fn render_summary(results: &[String]) -> String {
    let mut out = format!("Found {}:\n", results.len());
    for result in results {
        out.push_str("  ");
        out.push_str(result);
        out.push('\n');
    }
    out
}
