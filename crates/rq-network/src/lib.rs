//! `rq-network` — street graph, street index, traffic state, and searches.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `StreetNetwork` (CSR, in + out), `StreetNetworkBuilder`      |
//! | [`street`]  | `StreetIndex`: street name → node pairs, suggestions         |
//! | [`traffic`] | `SensorReading`, `TrafficClassifier`                         |
//! | [`overlay`] | `PenaltyOverlay`, `GraphView` (edge-weight overrides)        |
//! | [`search`]  | BFS hop paths, Dijkstra distances, reachability              |
//! | [`loader`]  | CSV edge-list and traffic-feed loaders                       |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                           |

pub mod error;
pub mod loader;
pub mod network;
pub mod overlay;
pub mod search;
pub mod street;
pub mod traffic;


pub use error::{NetworkError, NetworkResult};
pub use loader::{load_network_csv, load_network_reader, load_readings_csv, load_readings_reader};
pub use network::{StreetNetwork, StreetNetworkBuilder};
pub use overlay::{GraphView, PenaltyOverlay};
pub use street::{StreetId, StreetIndex};
pub use traffic::{SensorReading, TrafficClassifier};
