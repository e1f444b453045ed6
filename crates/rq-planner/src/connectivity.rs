//! Street-to-street reachability probe.
//!
//! Streets with many nodes are first probed through a random sample of at
//! most [`SAMPLE_SIZE`] nodes per side.  If the sample finds nothing, a
//! bounded bidirectional frontier expansion over the full node sets gives
//! the final answer.  The expansion stops after [`MAX_EXPANSION_STEPS`]
//! rounds, so very distant streets can be reported unreachable.

use rq_core::{NodeId, SeededRng};
use rq_network::StreetNetwork;
use rq_network::search::reaches_any;

pub const SAMPLE_SIZE: usize = 20;
pub const MAX_EXPANSION_STEPS: usize = 10;

/// `true` if some node of `start` reaches some node of `end`.
pub fn streets_connected(
    network: &StreetNetwork,
    start:   &[NodeId],
    end:     &[NodeId],
    rng:     &mut SeededRng,
) -> bool {
    let sampled = start.len() > SAMPLE_SIZE || end.len() > SAMPLE_SIZE;
    if !sampled {
        return reaches_any(network, start, end);
    }
    let start_sample = rng.sample(start, SAMPLE_SIZE);
    let end_sample = rng.sample(end, SAMPLE_SIZE);
    if reaches_any(network, &start_sample, &end_sample) {
        return true;
    }
    frontiers_meet(network, start, end, MAX_EXPANSION_STEPS)
}

/// Grow a forward frontier from `start` and a backward frontier from `end`
/// one layer at a time until they touch or `max_steps` rounds pass.
pub fn frontiers_meet(network: &StreetNetwork, start: &[NodeId], end: &[NodeId], max_steps: usize) -> bool {
    let n = network.node_count();
    let mut seen_fwd = vec![false; n];
    let mut seen_bwd = vec![false; n];
    for s in start {
        seen_fwd[s.index()] = true;
    }
    for e in end {
        if seen_fwd[e.index()] {
            return true;
        }
        seen_bwd[e.index()] = true;
    }

    let mut fwd: Vec<NodeId> = start.to_vec();
    let mut bwd: Vec<NodeId> = end.to_vec();
    for _ in 0..max_steps {
        let mut next = Vec::new();
        for &node in &fwd {
            for succ in network.successors(node) {
                if seen_fwd[succ.index()] {
                    continue;
                }
                if seen_bwd[succ.index()] {
                    return true;
                }
                seen_fwd[succ.index()] = true;
                next.push(succ);
            }
        }
        fwd = next;

        let mut next = Vec::new();
        for &node in &bwd {
            for pred in network.predecessors(node) {
                if seen_bwd[pred.index()] {
                    continue;
                }
                if seen_fwd[pred.index()] {
                    return true;
                }
                seen_bwd[pred.index()] = true;
                next.push(pred);
            }
        }
        bwd = next;

        if fwd.is_empty() || bwd.is_empty() {
            break;
        }
    }
    false
}
