//! Integration tests for rq-output.

use rq_core::TrafficState;
use rq_logistics::{Quantity, TransportAllocation};
use rq_network::{StreetNetwork, StreetNetworkBuilder};
use rq_planner::RouteResult;

use crate::row::{AllocationRow, RouteSegmentRow};

/// A→B→C on streets "Main" then "Oak", 100 m and 50 m at 10 m/s.
fn line() -> StreetNetwork {
    let mut b = StreetNetworkBuilder::new();
    b.add_edge("m1", "A", "B", "Main", 100.0, 10.0).unwrap();
    b.add_edge("o1", "B", "C", "Oak", 50.0, 10.0).unwrap();
    b.build().unwrap()
}

fn route(net: &StreetNetwork) -> RouteResult {
    let path: Vec<_> = ["A", "B", "C"].iter().map(|l| net.node_by_label(l).unwrap()).collect();
    RouteResult::from_path(net, &path)
}

fn allocation(source: &str, dest: &str, quantity: Quantity) -> TransportAllocation {
    TransportAllocation { source_street: source.to_owned(), dest_street: dest.to_owned(), quantity }
}

#[cfg(test)]
mod rows {
    use super::*;

    #[test]
    fn segment_rows_follow_route() {
        let net = line();
        let rows = RouteSegmentRow::from_route(7, &route(&net), &net);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].route_id, 7);
        assert_eq!((rows[0].seq, rows[1].seq), (0, 1));
        assert_eq!((rows[0].from_node.as_str(), rows[0].to_node.as_str()), ("A", "B"));
        assert_eq!(rows[1].street, "Oak");
        assert_eq!(rows[1].length_m, 50.0);
        assert_eq!(rows[1].estimated_time_s, 5.0);
        assert_eq!(rows[0].traffic, TrafficState::Light);
    }

    #[test]
    fn allocation_rows_keep_integrality() {
        let row = AllocationRow::from(&allocation("S", "D", Quantity::Units(30)));
        assert_eq!(row.quantity, 30.0);
        assert!(row.integral);
        let row = AllocationRow::from(&allocation("S", "D", Quantity::Fraction(2.5)));
        assert!(!row.integral);
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::recorder::ResultRecorder;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(
            headers(dir.path().join("route_segments.csv")),
            ["route_id", "seq", "from_node", "to_node", "street", "length_m", "traffic", "estimated_time_s"]
        );
        assert_eq!(headers(dir.path().join("allocations.csv")), ["source_street", "dest_street", "quantity"]);
    }

    #[test]
    fn csv_route_round_trip() {
        let dir = tmp();
        let net = line();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_route(&RouteSegmentRow::from_route(3, &route(&net), &net)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("route_segments.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][4], "Main");
        assert_eq!(&rows[1][5], "50.000");
        assert_eq!(&rows[1][6], "LIGHT");
        assert_eq!(&rows[1][7], "5.000");
    }

    #[test]
    fn csv_allocation_quantities() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows: Vec<AllocationRow> = [
            allocation("Depot", "North", Quantity::Units(40)),
            allocation("Depot", "South", Quantity::Fraction(100.0 / 3.0)),
        ]
        .iter()
        .map(AllocationRow::from)
        .collect();
        w.write_allocations(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("allocations.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "40");
        assert_eq!(&rows[1][2], "33.3333");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn recorder_numbers_routes() {
        let dir = tmp();
        let net = line();
        let mut rec = ResultRecorder::new(CsvWriter::new(dir.path()).unwrap());
        assert_eq!(rec.record_route(&net, &route(&net)), 0);
        assert_eq!(rec.record_route(&net, &RouteResult::failed(vec![])), 1);
        assert_eq!(rec.record_route(&net, &route(&net)), 2);
        rec.record_allocations(&[allocation("S", "D", Quantity::Units(1))]);
        rec.finish();
        assert!(rec.take_error().is_none(), "no write errors expected");
        assert_eq!(rec.routes_recorded(), 3);

        let mut rdr = csv::Reader::from_path(dir.path().join("route_segments.csv")).unwrap();
        let ids: Vec<String> = rdr.records().map(|r| r.unwrap()[0].to_owned()).collect();
        assert_eq!(ids, ["0", "0", "2", "2"]);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_route_rows() {
        let dir = tmp();
        let net = line();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_route(&RouteSegmentRow::from_route(0, &route(&net), &net)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM route_segments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
        let (street, time): (String, f64) = conn
            .query_row(
                "SELECT street, estimated_time_s FROM route_segments WHERE seq = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(street, "Oak");
        assert_eq!(time, 5.0);
    }

    #[test]
    fn sqlite_allocation_integral_flag() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_allocations(&[
            AllocationRow::from(&allocation("S", "D1", Quantity::Units(4))),
            AllocationRow::from(&allocation("S", "D2", Quantity::Fraction(0.5))),
        ])
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let integral: i64 = conn
            .query_row("SELECT integral FROM allocations WHERE dest_street = 'D1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(integral, 1);
        let qty: f64 = conn
            .query_row("SELECT quantity FROM allocations WHERE dest_street = 'D2'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(qty, 0.5);
    }
}
