use super::{Record, Recorder};
use anyhow::Result;
use log::info;
use std::{fs::File, path::Path};

/// Writes records as rows of a CSV file.
///
/// The columns are fixed at construction and written as the header row.
/// Keys missing in a record produce empty fields; keys not listed as a
/// column are ignored.
pub struct CsvRecorder {
    columns: Vec<String>,
    wtr: csv::Writer<File>,
}

impl CsvRecorder {
    /// Creates the file at `path` and writes the header.
    pub fn new(path: impl AsRef<Path>, columns: &[&str]) -> Result<Self> {
        let mut wtr = csv::Writer::from_path(path.as_ref())?;
        wtr.write_record(columns)?;
        info!("Write records to {}", path.as_ref().display());

        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            wtr,
        })
    }
}

impl Recorder for CsvRecorder {
    fn write(&mut self, record: Record) -> Result<()> {
        let row = self
            .columns
            .iter()
            .map(|c| record.get(c).map(|v| v.to_field()).unwrap_or_default())
            .collect::<Vec<_>>();
        self.wtr.write_record(&row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordValue;
    use tempdir::TempDir;

    #[test]
    fn test_csv_recorder() -> Result<()> {
        let dir = TempDir::new("csv_recorder")?;
        let path = dir.path().join("curve.csv");

        let mut recorder = CsvRecorder::new(&path, &["episode", "score", "epsilon"])?;
        let mut record = Record::from_scalar("episode", 0.0);
        record.insert("score", RecordValue::Scalar(-21.0));
        record.insert("ignored", RecordValue::Scalar(1.0));
        recorder.write(record)?;
        recorder.flush()?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text, "episode,score,epsilon\n0,-21,\n");
        Ok(())
    }
}
