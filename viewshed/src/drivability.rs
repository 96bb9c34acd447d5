use crate::{RoadNetwork, VisibilityRequest};
use geo::Coord;

/// Fixed multiplier approximating road distance from the straight line.
/// Callers wanting real routing must layer it on top of the core.
pub const ROAD_SINUOSITY: f64 = 1.35;

/// Nearest drivable access for a candidate, with derived travel times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessPoint {
    /// Projected coordinates of the nearest point on the road network.
    pub x: f64,
    pub y: f64,

    /// Straight-line distance from the candidate, meters.
    pub distance_m: f64,

    pub walk_minutes: f64,
    pub drive_minutes_estimate: f64,
}

/// Scores a candidate's road access, rejecting it over the configured
/// walking and driving limits. `None` also covers an empty road network.
pub fn evaluate_access(
    candidate_xy: Coord<f64>,
    roads: &RoadNetwork,
    request: &VisibilityRequest,
) -> Option<AccessPoint> {
    let nearest = roads.nearest_point(candidate_xy)?;

    let walk_minutes = (nearest.distance_m / 1000.0) / request.walking_speed_kmh * 60.0;
    let drive_minutes_estimate =
        (nearest.distance_m * ROAD_SINUOSITY / 1000.0) / request.driving_speed_kmh * 60.0;

    if walk_minutes > request.max_walk_minutes {
        return None;
    }
    if let Some(limit) = request.max_drive_minutes {
        if drive_minutes_estimate > limit {
            return None;
        }
    }

    Some(AccessPoint {
        x: nearest.point.x,
        y: nearest.point.y,
        distance_m: nearest.distance_m,
        walk_minutes,
        drive_minutes_estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::evaluate_access;
    use crate::{RoadNetwork, VisibilityRequest};
    use approx::assert_relative_eq;
    use geo::Coord;

    fn straight_road(offset_m: f64) -> RoadNetwork {
        RoadNetwork::from_polylines([vec![
            Coord { x: -1_000.0, y: offset_m },
            Coord { x: 1_000.0, y: offset_m },
        ]])
        .unwrap()
    }

    #[test]
    fn test_walk_and_drive_minutes() {
        let roads = straight_road(1_000.0);
        let request = VisibilityRequest::builder()
            .walking_speed(4.8)
            .driving_speed(60.0)
            .max_walk_minutes(30.0)
            .build()
            .unwrap();
        let access = evaluate_access(Coord { x: 0.0, y: 0.0 }, &roads, &request).unwrap();

        assert_relative_eq!(access.distance_m, 1_000.0);
        assert_relative_eq!(access.walk_minutes, 12.5);
        // 1 km * 1.35 at 60 km/h.
        assert_relative_eq!(access.drive_minutes_estimate, 1.35);
    }

    #[test]
    fn test_walk_over_limit_rejected() {
        let roads = straight_road(2_000.0);
        let request = VisibilityRequest::builder()
            .walking_speed(4.8)
            .max_walk_minutes(15.0)
            .build()
            .unwrap();
        // 2 km at 4.8 km/h is 25 minutes.
        assert!(evaluate_access(Coord { x: 0.0, y: 0.0 }, &roads, &request).is_none());
    }

    #[test]
    fn test_drive_over_limit_rejected() {
        let roads = straight_road(1_000.0);
        let request = VisibilityRequest::builder()
            .max_walk_minutes(60.0)
            .max_drive_minutes(Some(1.0))
            .build()
            .unwrap();
        assert!(evaluate_access(Coord { x: 0.0, y: 0.0 }, &roads, &request).is_none());
    }

    #[test]
    fn test_empty_network_rejects() {
        let request = VisibilityRequest::default();
        assert!(
            evaluate_access(Coord { x: 0.0, y: 0.0 }, &RoadNetwork::default(), &request).is_none()
        );
    }
}
