//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AllocationRow, OutputResult, RouteSegmentRow};

/// Trait implemented by the CSV and SQLite writers.
pub trait OutputWriter {
    /// Write every segment of one route.
    fn write_route(&mut self, rows: &[RouteSegmentRow]) -> OutputResult<()>;

    /// Write a batch of allocation cells.
    fn write_allocations(&mut self, rows: &[AllocationRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
