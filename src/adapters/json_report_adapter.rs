//! JSON results writer: `<output_dir>/<strategy>_results.json`.

use crate::domain::batch::BatchReport;
use crate::domain::error::FractalTraderError;
use crate::ports::report_port::ReportPort;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_path(output_dir: &Path, strategy: &str) -> PathBuf {
        output_dir.join(format!("{strategy}_results.json"))
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        report: &BatchReport,
        output_dir: &Path,
    ) -> Result<PathBuf, FractalTraderError> {
        fs::create_dir_all(output_dir)?;
        let path = Self::report_path(output_dir, &report.strategy);

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &report.results)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(path = %path.display(), "results written");
        Ok(path)
    }
}
