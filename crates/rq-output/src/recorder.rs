//! `ResultRecorder<W>` — feeds planner and allocator results to an
//! `OutputWriter`.

use rq_logistics::TransportAllocation;
use rq_network::StreetNetwork;
use rq_planner::RouteResult;

use crate::row::{AllocationRow, RouteSegmentRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Numbers routes as they arrive and writes them, with allocations, to any
/// [`OutputWriter`] backend.
///
/// Recording never fails: the first write error is kept and can be
/// collected with [`take_error`][Self::take_error] once the run is over, so
/// a broken output directory does not abort planning.
pub struct ResultRecorder<W: OutputWriter> {
    writer:        W,
    next_route_id: u32,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> ResultRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, next_route_id: 0, last_error: None }
    }

    /// Write every segment of `route` under a fresh route id and return
    /// that id.  Failed routes get an id but no rows.
    pub fn record_route(&mut self, network: &StreetNetwork, route: &RouteResult) -> u32 {
        let id = self.next_route_id;
        self.next_route_id += 1;
        let rows = RouteSegmentRow::from_route(id, route, network);
        if !rows.is_empty() {
            let result = self.writer.write_route(&rows);
            self.store_err(result);
        }
        id
    }

    pub fn record_allocations(&mut self, allocations: &[TransportAllocation]) {
        let rows: Vec<AllocationRow> = allocations.iter().map(AllocationRow::from).collect();
        if !rows.is_empty() {
            let result = self.writer.write_allocations(&rows);
            self.store_err(result);
        }
    }

    /// Flush the writer.
    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    /// Number of routes recorded so far.
    pub fn routes_recorded(&self) -> u32 {
        self.next_route_id
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}
