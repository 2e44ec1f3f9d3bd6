//! Unit tests for the energy model.

use ev_core::{BatteryParams, GeoPoint, NodeId};
use ev_graph::{EdgeSpec, RoadGraph, RoadGraphBuilder};

/// 3-node line, 10 km per hop, explicit lengths.
fn line_graph() -> (RoadGraph, [NodeId; 3]) {
    let mut b = RoadGraphBuilder::new();
    let n0 = b.add_node(0, GeoPoint::new(49.0, -123.0));
    let n1 = b.add_node(1, GeoPoint::new(49.1, -123.0));
    let n2 = b.add_node(2, GeoPoint::new(49.2, -123.0));
    let road = EdgeSpec {
        length_m: Some(10_000.0),
        travel_time_s: Some(720.0),
        ..EdgeSpec::default()
    };
    b.add_road(n0, n1, road.clone());
    b.add_road(n1, n2, road);
    (b.build(), [n0, n1, n2])
}

fn battery() -> BatteryParams {
    BatteryParams::new(100.0, 20.0, 10.0)
}

#[cfg(test)]
mod distance {
    use super::*;
    use crate::{hop_distance_m, path_distance_m};

    #[test]
    fn sums_edge_lengths() {
        let (g, [n0, n1, n2]) = line_graph();
        assert_eq!(path_distance_m(&g, &[n0, n1, n2]), 20_000.0);
    }

    #[test]
    fn single_node_path_is_zero() {
        let (g, [n0, ..]) = line_graph();
        assert_eq!(path_distance_m(&g, &[n0]), 0.0);
    }

    #[test]
    fn falls_back_to_haversine_without_length() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(0, GeoPoint::new(49.0, -123.0));
        let c = b.add_node(1, GeoPoint::new(49.1, -123.0));
        b.add_road(a, c, EdgeSpec { travel_time_s: Some(60.0), ..EdgeSpec::default() });
        let g = b.build();

        let expected = GeoPoint::new(49.0, -123.0).distance_m(GeoPoint::new(49.1, -123.0));
        assert!((hop_distance_m(&g, a, c) - expected).abs() < 1e-6);
    }

    #[test]
    fn hop_without_edge_uses_straight_line() {
        let (g, [n0, _, n2]) = line_graph();
        // No direct edge n0->n2; positions are 0.2 degrees of latitude apart.
        let expected = g.pos(n0).distance_m(g.pos(n2));
        assert!((hop_distance_m(&g, n0, n2) - expected).abs() < 1e-6);
    }
}

#[cfg(test)]
mod soc {
    use super::*;
    use crate::{is_feasible, remaining_soc};

    #[test]
    fn linear_drain() {
        // 20 km at 10 %/km drains 200... clamped; 2 km drains 20.
        let b = battery();
        assert_eq!(remaining_soc(&b, 2_000.0), 80.0);
        assert_eq!(remaining_soc(&b, 0.0), 100.0);
    }

    #[test]
    fn clamped_at_zero() {
        assert_eq!(remaining_soc(&battery(), 50_000.0), 0.0);
    }

    #[test]
    fn energy_law_exact() {
        let (g, [n0, n1, n2]) = line_graph();
        let b = battery();
        let d = crate::path_distance_m(&g, &[n0, n1, n2]);
        let soc = remaining_soc(&b, d);
        assert_eq!(soc, b.initial_soc - d / 1_000.0 * b.consumption_pct_per_km);
        assert_eq!(soc, 80.0);
    }

    #[test]
    fn feasibility_threshold() {
        let b = battery(); // 8 km of range above threshold
        assert!(is_feasible(&b, 8_000.0));
        assert!(!is_feasible(&b, 8_001.0));
    }

    #[test]
    fn equal_initial_and_threshold() {
        let b = BatteryParams::new(25.0, 25.0, 10.0);
        assert!(is_feasible(&b, 0.0));
        assert!(!is_feasible(&b, 1.0));
    }
}

#[cfg(test)]
mod charging {
    use crate::charging_time_s;

    #[test]
    fn charge_to_full() {
        // 40 → 100 at 3 %/min = 20 min = 1200 s.
        assert_eq!(charging_time_s(40.0, 100.0, 3.0), 1_200.0);
    }

    #[test]
    fn already_full() {
        assert_eq!(charging_time_s(100.0, 100.0, 3.0), 0.0);
        assert_eq!(charging_time_s(101.0, 100.0, 3.0), 0.0);
    }
}

#[cfg(test)]
mod budget {
    use super::*;
    use crate::{detour_budget_m, last_reachable_index};

    #[test]
    fn budget_formula() {
        // 0.85 · (100 − 20) / 10 = 6.8 km.
        assert!((detour_budget_m(&battery(), 0.85) - 6_800.0).abs() < 1e-9);
    }

    #[test]
    fn last_reachable_walks_hops() {
        let (g, [n0, n1, n2]) = line_graph();
        let path = [n0, n1, n2];
        // 6.8 km budget: not even the first 10 km hop fits.
        assert_eq!(last_reachable_index(&g, &path, 6_800.0), 0);
        // 15 km: first hop fits, second does not.
        assert_eq!(last_reachable_index(&g, &path, 15_000.0), 1);
        // 25 km: whole path fits.
        assert_eq!(last_reachable_index(&g, &path, 25_000.0), 2);
    }
}
