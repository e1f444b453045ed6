//! Unit tests for rq-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::default(), EdgeId::INVALID);
        assert!(!EdgeId::INVALID.is_valid());
        assert!(EdgeId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod traffic {
    use crate::TrafficState;

    #[test]
    fn ordinals_are_ascending() {
        for (i, s) in TrafficState::ALL.iter().enumerate() {
            assert_eq!(s.ordinal() as usize, i);
            assert_eq!(TrafficState::from_ordinal(i as u8), Some(*s));
        }
        assert_eq!(TrafficState::from_ordinal(4), None);
        assert!(TrafficState::Light < TrafficState::Severe);
    }

    #[test]
    fn multipliers() {
        assert_eq!(TrafficState::Light.time_multiplier(), 1.0);
        assert_eq!(TrafficState::Moderate.time_multiplier(), 1.25);
        assert_eq!(TrafficState::Heavy.time_multiplier(), 1.5);
        assert_eq!(TrafficState::Severe.time_multiplier(), 1.75);
    }

    #[test]
    fn labels() {
        assert_eq!(TrafficState::Heavy.to_string(), "HEAVY");
        assert_eq!(TrafficState::default(), TrafficState::Light);
    }
}

#[cfg(test)]
mod rng {
    use crate::SeededRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::new(7);
        let mut b = SeededRng::new(7);
        let xs: Vec<f64> = (0..16).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.unit()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1_000_000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn sample_is_distinct_and_bounded() {
        let mut rng = SeededRng::new(3);
        let pool: Vec<u32> = (0..10).collect();
        let picked = rng.sample(&pool, 4);
        assert_eq!(picked.len(), 4);
        let mut dedup = picked.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 4);

        assert_eq!(rng.sample(&pool, 50).len(), 10);
    }

    #[test]
    fn gen_bool_clamps() {
        let mut rng = SeededRng::new(4);
        assert!(rng.gen_bool(2.0));
        assert!(!rng.gen_bool(-1.0));
    }

    #[test]
    fn child_is_deterministic() {
        let mut a = SeededRng::new(9);
        let mut b = SeededRng::new(9);
        let mut ca = a.child(1);
        let mut cb = b.child(1);
        assert_eq!(ca.unit(), cb.unit());
    }
}
