//! `rq-output` — persisted routes and allocations.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                              |
//! |-----------|---------|--------------------------------------------|
//! | *(none)*  | CSV     | `route_segments.csv`, `allocations.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                                |
//!
//! Both implement [`OutputWriter`] and are usually driven by a
//! [`ResultRecorder`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use rq_output::{CsvWriter, ResultRecorder};
//!
//! let mut rec = ResultRecorder::new(CsvWriter::new(Path::new("./output"))?);
//! let route = planner.find_route("Main St", "Oak Rd")?;
//! rec.record_route(planner.network(), &route);
//! rec.finish();
//! rec.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod recorder;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use recorder::ResultRecorder;
pub use row::{AllocationRow, RouteSegmentRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
