//! JSON出力

use crate::compare::ComparisonReport;
use crate::error::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub fn generate_json(report: &ComparisonReport, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// 保存済みのレポートを読み込む
pub fn read_json(path: &Path) -> Result<ComparisonReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
