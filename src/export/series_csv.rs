//! CSV export of learning curves
//!
//! One row per snapshot index with the columns
//! `index,mean,variance,half_width`.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use serde::Serialize;

use crate::{Error, Result, analysis::SeriesPoint};

/// Exporter for learning-curve CSV files
pub struct SeriesCsvExporter;

impl SeriesCsvExporter {
    /// Write `series` to a new CSV file at `path`
    ///
    /// # Returns
    /// Number of rows written
    pub fn export(series: &[SeriesPoint], path: &Path) -> Result<usize> {
        let file = create_file(path)?;
        Self::write(series, file)
    }

    /// Write `series` as CSV, header first
    pub fn write<W: Write>(series: &[SeriesPoint], writer: W) -> Result<usize> {
        let mut writer = csv::Writer::from_writer(writer);
        for point in series {
            writer.serialize(point)?;
        }
        writer.flush()?;
        Ok(series.len())
    }
}

/// Write any serializable record as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = create_file(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Create `path`, along with any missing parent directories
fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            operation: format!("create directory {}", parent.display()),
            source,
        })?;
    }
    File::create(path).map_err(|source| Error::Io {
        operation: format!("create {}", path.display()),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<SeriesPoint> {
        vec![
            SeriesPoint {
                index: 0,
                mean: -40.5,
                variance: 12.25,
                half_width: 3.5,
            },
            SeriesPoint {
                index: 1,
                mean: 15.0,
                variance: 0.0,
                half_width: 0.0,
            },
        ]
    }

    #[test]
    fn test_header_and_rows() {
        let mut buffer = Vec::new();
        let rows = SeriesCsvExporter::write(&series(), &mut buffer).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,mean,variance,half_width");
        assert_eq!(lines[1], "0,-40.5,12.25,3.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.csv");
        SeriesCsvExporter::export(&series(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<SeriesPoint> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, series());
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("series.json");
        write_json(&series(), &path).unwrap();
        let back: Vec<SeriesPoint> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, series());
    }
}
