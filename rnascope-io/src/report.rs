//! CSV report emission.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rnascope_core::AnalysisResult;

use crate::Result;

/// Writes quantification results as delimited text with a fixed header.
///
/// Rows are emitted in the order given, which the acquisition session
/// guarantees to be stage order, then capture order, then GOB before GOA.
pub struct ReportWriter {
    writer: BufWriter<File>,
    include_density: bool,
}

impl ReportWriter {
    /// Creates a report writer that includes the density column.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            include_density: true,
        })
    }

    /// Omits the `SpotsPerSquareMicron` column from header and rows.
    #[must_use]
    pub fn without_density(mut self) -> Self {
        self.include_density = false;
        self
    }

    /// Writes the header and one row per result, then flushes.
    ///
    /// # Errors
    /// Returns an error on any write failure; no partial-report recovery
    /// is attempted.
    pub fn write_results(&mut self, results: &[AnalysisResult]) -> Result<()> {
        if self.include_density {
            writeln!(
                self.writer,
                "Region,Channel,SpotCount,TotalIntensity,AverageIntensity,SpotsPerSquareMicron"
            )?;
        } else {
            writeln!(
                self.writer,
                "Region,Channel,SpotCount,TotalIntensity,AverageIntensity"
            )?;
        }

        for result in results {
            write!(
                self.writer,
                "{},{},{},{},{}",
                result.region,
                result.channel.name(),
                result.spot_count,
                result.total_intensity,
                result.average_intensity
            )?;
            if self.include_density {
                write!(self.writer, ",{}", result.density)?;
            }
            writeln!(self.writer)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rnascope_core::SignalChannel;
    use tempfile::NamedTempFile;

    fn sample_results() -> Vec<AnalysisResult> {
        vec![
            AnalysisResult {
                region: "CA1".to_string(),
                channel: SignalChannel::Gob,
                spot_count: 12,
                total_intensity: 1800.0,
                average_intensity: 150.0,
                density: 0.025,
            },
            AnalysisResult {
                region: "CA1".to_string(),
                channel: SignalChannel::Goa,
                spot_count: 0,
                total_intensity: 0.0,
                average_intensity: 0.0,
                density: 0.0,
            },
        ]
    }

    #[test]
    fn test_write_results_with_density() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ReportWriter::create(file.path()).unwrap();
        writer.write_results(&sample_results()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Region,Channel,SpotCount,TotalIntensity,AverageIntensity,SpotsPerSquareMicron"
        );
        assert_eq!(lines[1], "CA1,GOB,12,1800,150,0.025");
        assert_eq!(lines[2], "CA1,GOA,0,0,0,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_results_without_density() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ReportWriter::create(file.path()).unwrap().without_density();
        writer.write_results(&sample_results()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Region,Channel,SpotCount,TotalIntensity,AverageIntensity"
        );
        assert_eq!(lines[1], "CA1,GOB,12,1800,150");
    }

    #[test]
    fn test_empty_result_set_writes_header_only() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ReportWriter::create(file.path()).unwrap();
        writer.write_results(&[]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
