use crate::ViewshedError;
use geo::{Coord, LineString};

/// One drivable polyline in the projected CRS.
///
/// Consecutive points form straight drivable segments. Surface and class
/// filtering happens upstream; everything present here is drivable.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    line: LineString<f64>,
}

impl RoadSegment {
    /// Returns Self after checking the polyline has at least two points.
    pub fn new(line: LineString<f64>) -> Result<Self, ViewshedError> {
        if line.0.len() < 2 {
            return Err(ViewshedError::InvalidInput(
                "road segment needs at least two points",
            ));
        }
        Ok(Self { line })
    }

    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }
}

/// The point on the road network closest to a query location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestRoadPoint {
    pub point: Coord<f64>,
    pub distance_m: f64,
}

/// An immutable collection of drivable polylines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadNetwork {
    segments: Vec<RoadSegment>,
}

impl RoadNetwork {
    pub fn new(segments: Vec<RoadSegment>) -> Self {
        Self { segments }
    }

    /// Builds a network from raw coordinate polylines.
    pub fn from_polylines<I>(polylines: I) -> Result<Self, ViewshedError>
    where
        I: IntoIterator<Item = Vec<Coord<f64>>>,
    {
        let segments = polylines
            .into_iter()
            .map(|points| RoadSegment::new(LineString::from(points)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(segments))
    }

    /// A small synthetic road grid for demos and tests.
    pub fn synthetic() -> Self {
        let (base_x, base_y) = (500_000.0, 5_200_000.0);
        Self::from_polylines([
            vec![
                Coord { x: base_x, y: base_y },
                Coord { x: base_x + 1_200.0, y: base_y },
            ],
            vec![
                Coord { x: base_x + 600.0, y: base_y - 1_200.0 },
                Coord { x: base_x + 600.0, y: base_y + 1_200.0 },
            ],
            vec![
                Coord { x: base_x - 400.0, y: base_y + 800.0 },
                Coord { x: base_x + 1_600.0, y: base_y + 800.0 },
            ],
        ])
        .expect("synthetic road grid is well-formed")
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    /// Nearest point on any segment to `target`, by linear scan.
    ///
    /// The perpendicular projection onto each segment is clamped to its
    /// endpoints; the first segment in input order wins exact-distance ties.
    /// Returns `None` for an empty network.
    pub fn nearest_point(&self, target: Coord<f64>) -> Option<NearestRoadPoint> {
        let mut best_distance_sq = f64::INFINITY;
        let mut best: Option<Coord<f64>> = None;

        for segment in &self.segments {
            for line in segment.line.lines() {
                let dx = line.end.x - line.start.x;
                let dy = line.end.y - line.start.y;
                let length_sq = dx * dx + dy * dy;
                let nearest = if length_sq == 0.0 {
                    line.start
                } else {
                    let t = ((target.x - line.start.x) * dx + (target.y - line.start.y) * dy)
                        / length_sq;
                    let t = t.clamp(0.0, 1.0);
                    Coord {
                        x: line.start.x + t * dx,
                        y: line.start.y + t * dy,
                    }
                };
                let diff_x = nearest.x - target.x;
                let diff_y = nearest.y - target.y;
                let distance_sq = diff_x * diff_x + diff_y * diff_y;
                if distance_sq < best_distance_sq {
                    best_distance_sq = distance_sq;
                    best = Some(nearest);
                }
            }
        }

        best.map(|point| NearestRoadPoint {
            point,
            distance_m: best_distance_sq.sqrt(),
        })
    }
}
