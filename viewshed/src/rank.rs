use crate::ScoredCandidate;

/// Composite score weights: sight distance, field of view, walking cost,
/// elevation.
const WEIGHT_DISTANCE: f64 = 0.40;
const WEIGHT_FOV: f64 = 0.30;
const WEIGHT_WALK: f64 = 0.20;
const WEIGHT_ELEVATION: f64 = 0.10;

/// The composite 0..1 score.
///
/// Distance saturates at 1.5x the required sight distance, field of view at
/// the requested minimum, walking decays linearly to the configured cap, and
/// elevation contributes a `tanh(elevation / 500)` bonus.
pub(crate) fn composite_score(
    elevation_m: f64,
    max_distance_m: f64,
    fov_deg: f64,
    walk_minutes: f64,
    min_visibility_m: f64,
    min_fov_deg: f64,
    max_walk_minutes: f64,
) -> f64 {
    let dist_score = (max_distance_m / (min_visibility_m * 1.5)).min(1.0);
    let fov_score = (fov_deg / min_fov_deg.max(1.0)).min(1.0);
    let walk_penalty = (1.0 - walk_minutes / max_walk_minutes).max(0.0);
    let elev_bonus = (elevation_m / 500.0).tanh();
    WEIGHT_DISTANCE * dist_score
        + WEIGHT_FOV * fov_score
        + WEIGHT_WALK * walk_penalty
        + WEIGHT_ELEVATION * elev_bonus
}

/// Sorts scored candidates best-first and keeps the top `limit`.
///
/// Descending by score; ties go to the greater visible distance, then the
/// greater elevation, then the lower (row, col), which makes the order total.
pub(crate) fn rank(mut scored: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| {
                b.visibility
                    .max_distance_m
                    .total_cmp(&a.visibility.max_distance_m)
            })
            .then_with(|| b.candidate.elevation_m.total_cmp(&a.candidate.elevation_m))
            .then_with(|| {
                (a.candidate.row, a.candidate.col).cmp(&(b.candidate.row, b.candidate.col))
            })
    });
    scored.truncate(limit);
    scored
}
