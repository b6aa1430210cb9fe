//! Result sink port trait.

use crate::domain::batch::BatchReport;
use crate::domain::error::FractalTraderError;
use std::path::{Path, PathBuf};

pub trait ReportPort {
    /// Writes `report` under `output_dir`, returning the path of the file written.
    fn write(
        &self,
        report: &BatchReport,
        output_dir: &Path,
    ) -> Result<PathBuf, FractalTraderError>;
}
