//! Similarity filter over the final route list.
//!
//! Pareto acceptance still lets through clusters of near-identical routes
//! that differ only in minor edge choices.  The filter walks the routes in
//! travel-time order and keeps one only when its time exceeds the last kept
//! route's by at least the relative threshold (2 % by default).

use crate::pareto::ParetoRoute;

/// Drop routes whose travel time is within `threshold` (relative) of the
/// previously kept one.  Input order does not matter; output is sorted by
/// travel time ascending.
pub fn filter_similar_routes(routes: Vec<ParetoRoute>, threshold: f64) -> Vec<ParetoRoute> {
    if routes.len() <= 1 {
        return routes;
    }

    let mut sorted = routes;
    sorted.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));

    let before = sorted.len();
    let mut kept: Vec<ParetoRoute> = Vec::with_capacity(before);
    let mut last_kept_time = f64::NAN;

    for route in sorted {
        if kept.is_empty() {
            last_kept_time = route.time_s;
            kept.push(route);
            continue;
        }
        let gap = (route.time_s - last_kept_time) / last_kept_time;
        if gap >= threshold {
            last_kept_time = route.time_s;
            kept.push(route);
        }
    }

    if kept.len() < before {
        log::debug!("similarity filter kept {} of {} routes", kept.len(), before);
    }
    kept
}
