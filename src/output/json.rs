//! Structured findings document

use crate::model::FindingsReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const JSON_FILE_NAME: &str = "findings.json";

/// Writes `<out_dir>/findings.json` (pretty-printed), creating `out_dir` if needed
///
/// # Returns
///
/// The path of the written file
pub fn write_json(report: &FindingsReport, out_dir: &Path) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(JSON_FILE_NAME);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(path)
}
