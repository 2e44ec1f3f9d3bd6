//! Unit tests for the Pareto search.
//!
//! All tests run on hand-crafted graphs; station data is injected directly
//! rather than loaded from files.

#[cfg(test)]
mod helpers {
    use ev_core::{BatteryParams, GeoPoint, NodeId, PlannerConfig};
    use ev_graph::{
        ChargingStation, EdgeSpec, NearestStation, RoadGraph, RoadGraphBuilder, StationCatalog,
        StationIndex, StationLocation,
    };

    use crate::SearchContext;

    /// Owned search inputs; borrow a [`SearchContext`] via [`Fixture::ctx`].
    pub struct Fixture {
        pub graph: RoadGraph,
        pub stations: StationIndex,
        pub catalog: StationCatalog,
        pub config: PlannerConfig,
    }

    impl Fixture {
        pub fn ctx(&self) -> SearchContext<'_> {
            SearchContext {
                graph: &self.graph,
                stations: &self.stations,
                catalog: &self.catalog,
                config: &self.config,
            }
        }
    }

    pub fn station(name: &str, lat: f64, lon: f64) -> ChargingStation {
        ChargingStation {
            name: name.to_string(),
            location: StationLocation { latitude: lat, longitude: lon },
            tags: None,
            region: None,
        }
    }

    fn indexed(node: NodeId, distance_m: f64) -> (NodeId, NearestStation) {
        (
            node,
            NearestStation {
                distance_m,
                name: format!("S{}", node.0),
                location: GeoPoint::new(0.0, 0.0),
            },
        )
    }

    /// 4-node line A-B-C-D, 10 km / 720 s per hop, both directions.
    /// Every node is indexed at station distance 0; the catalog holds one
    /// station at A's position for infeasibility reports.
    pub fn line_fixture() -> (Fixture, [NodeId; 4]) {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(1000, GeoPoint::new(49.0, -123.0));
        let b1 = b.add_node(1001, GeoPoint::new(49.1, -123.0));
        let c = b.add_node(1002, GeoPoint::new(49.2, -123.0));
        let d = b.add_node(1003, GeoPoint::new(49.3, -123.0));
        let road = EdgeSpec {
            length_m: Some(10_000.0),
            travel_time_s: Some(720.0),
            ..EdgeSpec::default()
        };
        b.add_road(a, b1, road.clone());
        b.add_road(b1, c, road.clone());
        b.add_road(c, d, road);
        let graph = b.build();

        let stations = StationIndex::from_entries([
            indexed(a, 0.0),
            indexed(b1, 0.0),
            indexed(c, 0.0),
            indexed(d, 0.0),
        ]);
        let catalog = StationCatalog::new(vec![station("Rescue", 49.0, -123.0)]);

        let fixture = Fixture { graph, stations, catalog, config: PlannerConfig::default() };
        (fixture, [a, b1, c, d])
    }

    /// Two parallel routes A→X→D (fast, X far from chargers) and A→Y→D
    /// (10 % slower, Y well covered).
    pub fn parallel_fixture() -> (Fixture, [NodeId; 4]) {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(1, GeoPoint::new(0.0, 0.0));
        let x = b.add_node(2, GeoPoint::new(0.0, 0.5));
        let y = b.add_node(3, GeoPoint::new(0.1, 0.5));
        let d = b.add_node(4, GeoPoint::new(0.0, 1.0));
        let hop = |time: f64| EdgeSpec {
            length_m: Some(1_000.0),
            travel_time_s: Some(time),
            ..EdgeSpec::default()
        };
        b.add_road(a, x, hop(450.0));
        b.add_road(x, d, hop(450.0));
        b.add_road(a, y, hop(495.0));
        b.add_road(y, d, hop(495.0));
        let graph = b.build();

        let stations = StationIndex::from_entries([
            indexed(a, 0.0),
            indexed(x, 50_000.0),
            indexed(y, 2_000.0),
            indexed(d, 0.0),
        ]);

        let fixture = Fixture {
            graph,
            stations,
            catalog: StationCatalog::default(),
            config: PlannerConfig::default(),
        };
        (fixture, [a, x, y, d])
    }

    /// Assert the structural route invariants: endpoints, loop-freeness,
    /// edge connectivity, maxdist consistency, SOC floor, ordering and the
    /// 2 % similarity gap.
    pub fn assert_route_invariants(
        fixture: &Fixture,
        routes: &[crate::ParetoRoute],
        start: NodeId,
        end: NodeId,
        battery: &BatteryParams,
    ) {
        for route in routes {
            assert_eq!(*route.path.first().unwrap(), start);
            assert_eq!(*route.path.last().unwrap(), end);

            let mut seen = std::collections::HashSet::new();
            assert!(route.path.iter().all(|n| seen.insert(*n)), "path repeats a node");

            for w in route.path.windows(2) {
                assert!(
                    fixture.graph.edge_between(w[0], w[1]).is_some(),
                    "consecutive pair without edge"
                );
            }

            let max_over_entered = route.path[1..]
                .iter()
                .map(|&n| fixture.stations.distance_to_nearest(n))
                .fold(0.0_f64, f64::max);
            assert_eq!(route.max_station_dist_m, max_over_entered);

            assert!(route.remaining_soc >= battery.threshold_soc);
        }

        for pair in routes.windows(2) {
            assert!(pair[0].time_s <= pair[1].time_s, "routes not sorted by time");
            let gap = (pair[1].time_s - pair[0].time_s) / pair[0].time_s;
            assert!(gap >= 0.02, "similarity filter let through a {gap:.4} gap");
        }
    }
}

// ── Direct search scenarios ───────────────────────────────────────────────────

#[cfg(test)]
mod direct {
    use ev_core::BatteryParams;
    use crate::{SearchLimits, find_pareto_paths};

    #[test]
    fn line_graph_single_pareto_path() {
        let (fixture, [a, b, c, d]) = super::helpers::line_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let outcome =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();

        assert_eq!(outcome.routes.len(), 1);
        assert!(outcome.infeasible.is_empty());
        let route = &outcome.routes[0];
        assert_eq!(route.path, vec![a, b, c, d]);
        assert_eq!(route.time_s, 2_160.0);
        assert_eq!(route.remaining_soc, 70.0);
        super::helpers::assert_route_invariants(&fixture, &outcome.routes, a, d, &battery);
    }

    #[test]
    fn line_graph_infeasible_reports_hand_off() {
        let (fixture, [a, _, _, d]) = super::helpers::line_fixture();
        // 25 % - 30 km · 10 %/km clamps to 0, far below the 20 % threshold.
        let battery = BatteryParams::new(25.0, 20.0, 10.0);

        let outcome =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();

        assert!(outcome.routes.is_empty());
        assert_eq!(outcome.infeasible.len(), 1);
        let report = &outcome.infeasible[0];
        assert_eq!(report.path_index, 1);
        assert_eq!(report.remaining_soc, 0.0);
        assert_eq!(report.total_nodes, 4);
        // Budget 0.85·(25−20)/10 = 0.425 km: not even the first hop fits.
        assert_eq!(report.last_reachable_index, 0);
        assert_eq!(report.last_node_ext_id, 1000);
        let station = report.nearest_station.as_ref().unwrap();
        assert_eq!(station.name, "Rescue");
        assert_eq!(report.station_key().unwrap(), "Rescue|49|-123");
    }

    #[test]
    fn safe_and_fast_routes_are_both_pareto() {
        let (fixture, [a, x, y, d]) = super::helpers::parallel_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let outcome =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();

        assert_eq!(outcome.routes.len(), 2);
        // Time order puts the fast-but-remote route first.
        assert_eq!(outcome.routes[0].path, vec![a, x, d]);
        assert_eq!(outcome.routes[0].time_s, 900.0);
        assert_eq!(outcome.routes[0].max_station_dist_m, 50_000.0);
        assert_eq!(outcome.routes[1].path, vec![a, y, d]);
        assert_eq!(outcome.routes[1].time_s, 990.0);
        assert_eq!(outcome.routes[1].max_station_dist_m, 2_000.0);
        super::helpers::assert_route_invariants(&fixture, &outcome.routes, a, d, &battery);
    }

    #[test]
    fn max_paths_caps_accepted_set() {
        let (fixture, [a, _, _, d]) = super::helpers::parallel_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let outcome =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 1, &SearchLimits::none()).unwrap();
        assert_eq!(outcome.routes.len(), 1);
    }

    #[test]
    fn zero_length_request_yields_single_node_path() {
        let (fixture, [a, ..]) = super::helpers::line_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 10.0);

        let outcome =
            find_pareto_paths(&fixture.ctx(), a, a, &battery, 10, &SearchLimits::none()).unwrap();

        assert_eq!(outcome.routes.len(), 1);
        let route = &outcome.routes[0];
        assert_eq!(route.path, vec![a]);
        assert_eq!(route.time_s, 0.0);
        assert_eq!(route.max_station_dist_m, 0.0);
        assert_eq!(route.remaining_soc, 100.0);
    }

    #[test]
    fn equal_initial_and_threshold_soc() {
        let (fixture, [a, _, _, d]) = super::helpers::line_fixture();
        let battery = BatteryParams::new(20.0, 20.0, 10.0);

        // Any positive-length path drains below the threshold.
        let outcome =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();
        assert!(outcome.routes.is_empty());
        assert!(!outcome.infeasible.is_empty());

        // ... but the zero-length path is fine.
        let outcome =
            find_pareto_paths(&fixture.ctx(), a, a, &battery, 10, &SearchLimits::none()).unwrap();
        assert_eq!(outcome.routes.len(), 1);
    }

    #[test]
    fn unindexed_nodes_count_as_infinitely_far() {
        let (mut fixture, [a, _, _, d]) = super::helpers::line_fixture();
        fixture.stations = ev_graph::StationIndex::default();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let outcome =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();
        assert_eq!(outcome.routes.len(), 1);
        assert!(outcome.routes[0].max_station_dist_m.is_infinite());
    }

    #[test]
    fn parallel_edges_resolve_to_fastest() {
        use ev_core::{GeoPoint, PlannerConfig};
        use ev_graph::{EdgeSpec, RoadGraphBuilder, StationCatalog, StationIndex};

        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(1, GeoPoint::new(0.0, 0.0));
        let m = b.add_node(2, GeoPoint::new(0.0, 0.5));
        let d = b.add_node(3, GeoPoint::new(0.0, 1.0));
        // Two parallel edges a→m; the lower-keyed one is slower, so the
        // search must consider both rather than just key 0.
        b.add_edge(a, m, EdgeSpec { length_m: Some(1_000.0), travel_time_s: Some(200.0), ..EdgeSpec::default() });
        b.add_edge(a, m, EdgeSpec { length_m: Some(1_000.0), travel_time_s: Some(100.0), ..EdgeSpec::default() });
        b.add_edge(m, d, EdgeSpec { length_m: Some(1_000.0), travel_time_s: Some(100.0), ..EdgeSpec::default() });
        let fixture = super::helpers::Fixture {
            graph: b.build(),
            stations: StationIndex::default(),
            catalog: StationCatalog::default(),
            config: PlannerConfig::default(),
        };
        let battery = ev_core::BatteryParams::new(100.0, 20.0, 1.0);

        let outcome =
            crate::find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &crate::SearchLimits::none())
                .unwrap();
        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.routes[0].time_s, 200.0);
    }

    #[test]
    fn repeated_searches_are_idempotent() {
        let (fixture, [a, _, _, d]) = super::helpers::parallel_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let key = |outcome: &crate::SearchOutcome| -> Vec<(Vec<u32>, u64)> {
            outcome
                .routes
                .iter()
                .map(|r| {
                    (
                        r.path.iter().map(|n| n.0).collect(),
                        (r.time_s * 1_000.0).round() as u64,
                    )
                })
                .collect()
        };

        let first =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();
        let second =
            find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &SearchLimits::none()).unwrap();
        assert_eq!(key(&first), key(&second));
    }
}

// ── Lifecycle limits ──────────────────────────────────────────────────────────

#[cfg(test)]
mod limits {
    use std::time::Instant;

    use ev_core::BatteryParams;
    use crate::{CancelToken, SearchError, SearchLimits, find_pareto_paths};

    #[test]
    fn cancelled_token_aborts() {
        let (fixture, [a, _, _, d]) = super::helpers::line_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let token = CancelToken::new();
        token.cancel();
        let limits = SearchLimits::with_cancel(token);

        let err = find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &limits).unwrap_err();
        assert_eq!(err, SearchError::Cancelled);
    }

    #[test]
    fn expired_deadline_aborts() {
        let (fixture, [a, _, _, d]) = super::helpers::line_fixture();
        let battery = BatteryParams::new(100.0, 20.0, 1.0);

        let limits = SearchLimits::with_deadline(Instant::now());
        let err = find_pareto_paths(&fixture.ctx(), a, d, &battery, 10, &limits).unwrap_err();
        assert_eq!(err, SearchError::DeadlineExceeded);
    }

    #[test]
    fn unset_limits_pass() {
        assert!(SearchLimits::none().check().is_ok());
    }
}

// ── Dominance table ───────────────────────────────────────────────────────────

#[cfg(test)]
mod dominance {
    use ev_core::NodeId;
    use crate::DominanceTable;

    #[test]
    fn weak_dominance_prunes() {
        let mut table = DominanceTable::new(64);
        let n = NodeId(0);
        table.insert(n, 100.0, 500.0);

        assert!(table.is_dominated(n, 100.0, 500.0)); // equal counts as dominated
        assert!(table.is_dominated(n, 150.0, 600.0));
        assert!(!table.is_dominated(n, 90.0, 600.0)); // better on time
        assert!(!table.is_dominated(n, 150.0, 400.0)); // better on distance
    }

    #[test]
    fn insert_strips_dominated_entries() {
        let mut table = DominanceTable::new(64);
        let n = NodeId(0);
        table.insert(n, 100.0, 500.0);
        table.insert(n, 120.0, 400.0);
        assert_eq!(table.entries_at(n), 2);

        // Dominates both.
        table.insert(n, 90.0, 300.0);
        assert_eq!(table.entries_at(n), 1);
        assert!(table.is_dominated(n, 95.0, 350.0));
    }

    #[test]
    fn cap_drops_lexicographically_worst() {
        let mut table = DominanceTable::new(4);
        let n = NodeId(7);
        // An anti-chain: decreasing distance as time grows, nothing dominated.
        for i in 0..10 {
            table.insert(n, 100.0 + i as f64, 1_000.0 - 10.0 * i as f64);
        }
        assert_eq!(table.entries_at(n), 4);
        // The smallest times survive; the largest were evicted.
        assert!(table.is_dominated(n, 100.0, 1_000.0));
        assert!(!table.is_dominated(n, 109.0, 910.0));
    }

    #[test]
    fn adversarial_graph_stays_bounded() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        // Dense random states at a handful of nodes; the per-node frontier
        // must never exceed the cap no matter the insertion order.
        let mut rng = SmallRng::seed_from_u64(42);
        let mut table = DominanceTable::new(64);
        for _ in 0..10_000 {
            let node = NodeId(rng.gen_range(0..8));
            let time = rng.gen_range(0.0..10_000.0);
            let dist = rng.gen_range(0.0..50_000.0);
            if !table.is_dominated(node, time, dist) {
                table.insert(node, time, dist);
            }
        }
        assert!(table.max_entries() <= 64);
    }
}

// ── Similarity filter ─────────────────────────────────────────────────────────

#[cfg(test)]
mod filter {
    use ev_core::NodeId;
    use crate::{ParetoRoute, filter_similar_routes};

    fn route(time_s: f64, dist: f64) -> ParetoRoute {
        ParetoRoute {
            path: vec![NodeId(0)],
            time_s,
            max_station_dist_m: dist,
            remaining_soc: 50.0,
        }
    }

    #[test]
    fn two_percent_gap_required() {
        // Times 1000 / 1010 / 1050, mutually non-dominated via distance.
        let routes = vec![route(1_000.0, 3_000.0), route(1_010.0, 2_000.0), route(1_050.0, 1_000.0)];
        let kept = filter_similar_routes(routes, 0.02);
        let times: Vec<f64> = kept.iter().map(|r| r.time_s).collect();
        assert_eq!(times, vec![1_000.0, 1_050.0]);
    }

    #[test]
    fn sorts_before_filtering() {
        let routes = vec![route(1_050.0, 1_000.0), route(1_000.0, 3_000.0)];
        let kept = filter_similar_routes(routes, 0.02);
        let times: Vec<f64> = kept.iter().map(|r| r.time_s).collect();
        assert_eq!(times, vec![1_000.0, 1_050.0]);
    }

    #[test]
    fn single_route_untouched() {
        let kept = filter_similar_routes(vec![route(1_000.0, 0.0)], 0.02);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(filter_similar_routes(vec![], 0.02).is_empty());
    }
}

// ── Randomized sweep ──────────────────────────────────────────────────────────

#[cfg(test)]
mod randomized {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use ev_core::{BatteryParams, GeoPoint, NodeId, PlannerConfig};
    use ev_graph::{EdgeSpec, NearestStation, RoadGraphBuilder, StationCatalog, StationIndex};

    use crate::{SearchLimits, find_pareto_paths};

    #[test]
    fn random_dense_graph_upholds_invariants() {
        let mut rng = SmallRng::seed_from_u64(7);

        let mut b = RoadGraphBuilder::new();
        let nodes: Vec<NodeId> = (0..10)
            .map(|i| b.add_node(i, GeoPoint::new(0.01 * i as f64, 0.02 * (i % 4) as f64)))
            .collect();
        for _ in 0..40 {
            let u = nodes[rng.gen_range(0..nodes.len())];
            let v = nodes[rng.gen_range(0..nodes.len())];
            if u == v {
                continue;
            }
            b.add_edge(
                u,
                v,
                EdgeSpec {
                    length_m: Some(rng.gen_range(100.0..1_000.0)),
                    travel_time_s: Some(rng.gen_range(10.0..100.0)),
                    ..EdgeSpec::default()
                },
            );
        }
        let graph = b.build();

        let stations = StationIndex::from_entries(nodes.iter().map(|&n| {
            (
                n,
                NearestStation {
                    distance_m: rng.gen_range(0.0..50_000.0),
                    name: "S".to_string(),
                    location: GeoPoint::new(0.0, 0.0),
                },
            )
        }));

        let fixture = super::helpers::Fixture {
            graph,
            stations,
            catalog: StationCatalog::default(),
            config: PlannerConfig::default(),
        };
        let battery = BatteryParams::new(100.0, 0.0, 0.001);

        let outcome = find_pareto_paths(
            &fixture.ctx(),
            nodes[0],
            nodes[9],
            &battery,
            10,
            &SearchLimits::none(),
        )
        .unwrap();

        super::helpers::assert_route_invariants(
            &fixture,
            &outcome.routes,
            nodes[0],
            nodes[9],
            &battery,
        );

        // No returned pair may dominate another beyond the 5 % tolerance.
        for (i, a) in outcome.routes.iter().enumerate() {
            for (j, b) in outcome.routes.iter().enumerate() {
                if i != j {
                    assert!(
                        !(a.time_s * 1.05 <= b.time_s
                            && a.max_station_dist_m * 1.05 <= b.max_station_dist_m),
                        "route {j} is tolerance-dominated by route {i}"
                    );
                }
            }
        }
    }
}
