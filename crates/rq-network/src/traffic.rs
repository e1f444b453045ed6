//! Sensor readings → ordinal traffic state.
//!
//! ```text
//! speed_factor     = 1 / (mean_speed + 1)          (1.0 when missing)
//! occupancy_factor = occupancy / 100               (0.0 when missing)
//! count_factor     = min(1, vehicle_count / 10)    (0.0 when missing)
//!
//! score = 0.4·speed + 0.4·occupancy + 0.2·count
//!
//! score ≤ 0.3 → LIGHT, ≤ 0.6 → MODERATE, ≤ 0.8 → HEAVY, else SEVERE
//! ```

use rq_core::TrafficState;

/// One row of the traffic feed, keyed by the external edge identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorReading {
    pub edge_id:       String,
    /// Mean measured speed (m/s).
    pub mean_speed:    Option<f64>,
    /// Lane occupancy in percent.
    pub occupancy:     Option<f64>,
    pub vehicle_count: Option<f64>,
}

/// Weighted-score traffic classifier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficClassifier {
    /// Weights of the (speed, occupancy, count) factors.
    pub weights:    [f64; 3],
    /// Upper score bounds of LIGHT, MODERATE, HEAVY.
    pub thresholds: [f64; 3],
}

impl Default for TrafficClassifier {
    fn default() -> Self {
        Self {
            weights:    [0.4, 0.4, 0.2],
            thresholds: [0.3, 0.6, 0.8],
        }
    }
}

impl TrafficClassifier {
    /// Congestion score in roughly `[0, 1]`.  Non-finite inputs count as
    /// missing; negative speeds are treated as standstill.
    pub fn score(&self, reading: &SensorReading) -> f64 {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

        let speed_factor = finite(reading.mean_speed).map_or(1.0, |s| 1.0 / (s.max(0.0) + 1.0));
        let occupancy_factor = finite(reading.occupancy).map_or(0.0, |o| o / 100.0);
        let count_factor = finite(reading.vehicle_count).map_or(0.0, |c| (c / 10.0).min(1.0));

        let [ws, wo, wc] = self.weights;
        ws * speed_factor + wo * occupancy_factor + wc * count_factor
    }

    pub fn classify(&self, reading: &SensorReading) -> TrafficState {
        self.state_for_score(self.score(reading))
    }

    pub fn state_for_score(&self, score: f64) -> TrafficState {
        let [light, moderate, heavy] = self.thresholds;
        if score <= light {
            TrafficState::Light
        } else if score <= moderate {
            TrafficState::Moderate
        } else if score <= heavy {
            TrafficState::Heavy
        } else {
            TrafficState::Severe
        }
    }
}
