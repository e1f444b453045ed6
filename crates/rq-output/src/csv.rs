//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `route_segments.csv`
//! - `allocations.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AllocationRow, OutputResult, RouteSegmentRow};

/// Writes routes and allocations to two CSV files.
pub struct CsvWriter {
    segments:    Writer<File>,
    allocations: Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut segments = Writer::from_path(dir.join("route_segments.csv"))?;
        segments.write_record([
            "route_id",
            "seq",
            "from_node",
            "to_node",
            "street",
            "length_m",
            "traffic",
            "estimated_time_s",
        ])?;

        let mut allocations = Writer::from_path(dir.join("allocations.csv"))?;
        allocations.write_record(["source_street", "dest_street", "quantity"])?;

        Ok(Self {
            segments,
            allocations,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_route(&mut self, rows: &[RouteSegmentRow]) -> OutputResult<()> {
        for row in rows {
            self.segments.write_record(&[
                row.route_id.to_string(),
                row.seq.to_string(),
                row.from_node.clone(),
                row.to_node.clone(),
                row.street.clone(),
                format!("{:.3}", row.length_m),
                row.traffic.as_str().to_owned(),
                format!("{:.3}", row.estimated_time_s),
            ])?;
        }
        Ok(())
    }

    fn write_allocations(&mut self, rows: &[AllocationRow]) -> OutputResult<()> {
        for row in rows {
            let quantity = if row.integral {
                format!("{}", row.quantity as u64)
            } else {
                format!("{:.4}", row.quantity)
            };
            self.allocations.write_record(&[row.source_street.clone(), row.dest_street.clone(), quantity])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.segments.flush()?;
        self.allocations.flush()?;
        Ok(())
    }
}
