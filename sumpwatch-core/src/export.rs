//! Trend export for completed pump cycles.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes the most recent cycle average to a file.
///
/// The file is overwritten on every cycle so an external reader always finds
/// a single number in it.
#[derive(Debug, Clone)]
pub struct TrendExport {
    path: PathBuf,
}

impl TrendExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents with `average`, six decimals.
    pub fn write(&self, average: f64) -> io::Result<()> {
        fs::write(&self.path, format!("{average:.6}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_six_decimals_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let export = TrendExport::new(dir.path().join("avgflow.txt"));

        export.write(12.5).unwrap();
        assert_eq!(fs::read_to_string(export.path()).unwrap(), "12.500000");

        export.write(3.1234567).unwrap();
        assert_eq!(fs::read_to_string(export.path()).unwrap(), "3.123457");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let export = TrendExport::new(dir.path().join("nope").join("avgflow.txt"));
        assert!(export.write(1.0).is_err());
    }
}
