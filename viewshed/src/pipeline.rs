use crate::{
    candidates::identify_candidates,
    cluster::reduce_clusters,
    drivability::{evaluate_access, AccessPoint},
    rank::{composite_score, rank},
    trace::{RayTracer, VisibleCandidate},
    RoadNetwork, TerrainCandidate, ViewshedError, VisibilityMetrics, VisibilityRequest,
};
use demgrid::TerrainGrid;
use geo::Coord;
use log::{debug, info};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Candidates,
    Visibility,
    Cluster,
    Drivability,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Candidates => "candidates",
            Stage::Visibility => "visibility",
            Stage::Cluster => "cluster",
            Stage::Drivability => "drivability",
        };
        f.write_str(name)
    }
}

/// Survivor counts after each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageStats {
    /// Raw local maxima detected.
    pub candidates: usize,

    /// Candidates with at least one cleared ray.
    pub visible: usize,

    /// Survivors of grid-bin clustering.
    pub clustered: usize,

    /// Survivors of the road-access limits.
    pub drivable: usize,
}

/// A fully evaluated viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: TerrainCandidate,
    pub visibility: VisibilityMetrics,
    pub access: AccessPoint,

    /// Composite rank score in [0, 1].
    pub score: f64,
}

/// Everything a pipeline run produces.
///
/// An empty `results` with `emptied` set is a success: it names the stage
/// that left nothing to rank, so callers can render a friendly message.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub results: Vec<ScoredCandidate>,
    pub stats: StageStats,
    pub emptied: Option<Stage>,
}

impl PipelineOutput {
    fn emptied_at(stats: StageStats, stage: Stage) -> Self {
        Self {
            results: Vec::new(),
            stats,
            emptied: Some(stage),
        }
    }
}

/// Cooperative cancellation handle.
///
/// Cloning shares the flag; any clone can cancel a run in flight on another
/// thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs the full pipeline without external cancellation.
pub fn run_pipeline(
    grid: &TerrainGrid,
    roads: &RoadNetwork,
    request: &VisibilityRequest,
) -> Result<PipelineOutput, ViewshedError> {
    run_pipeline_cancellable(grid, roads, request, &CancelToken::new())
}

/// Runs candidate detection, visibility tracing, clustering, drivability
/// scoring, and ranking, in that order.
///
/// Cancellation is honored between stages and after each candidate during
/// tracing. A stage that leaves no survivors short-circuits into an empty,
/// successful output naming that stage.
pub fn run_pipeline_cancellable(
    grid: &TerrainGrid,
    roads: &RoadNetwork,
    request: &VisibilityRequest,
    cancel: &CancelToken,
) -> Result<PipelineOutput, ViewshedError> {
    request.validate()?;
    let mut stats = StageStats::default();

    let resampled;
    let working = if (request.resolution_scale - 1.0).abs() > f64::EPSILON {
        resampled = grid.resample(request.resolution_scale);
        &resampled
    } else {
        grid
    };
    info!(
        "analyzing {}x{} grid at {} m cells",
        working.rows(),
        working.cols(),
        working.cell_size_m()
    );

    if cancel.is_cancelled() {
        return Err(ViewshedError::Cancelled);
    }
    let candidates = identify_candidates(working, request);
    stats.candidates = candidates.len();
    info!("candidate detection: {} local maxima", stats.candidates);
    if candidates.is_empty() {
        return Ok(PipelineOutput::emptied_at(stats, Stage::Candidates));
    }

    if cancel.is_cancelled() {
        return Err(ViewshedError::Cancelled);
    }
    let mut tracer = RayTracer::new(working, request);
    let mut visible = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if cancel.is_cancelled() {
            return Err(ViewshedError::Cancelled);
        }
        let visibility = tracer.trace_candidate(&candidate);
        if visibility.cleared_ray_count == 0 {
            continue;
        }
        visible.push(VisibleCandidate {
            candidate,
            visibility,
        });
    }
    stats.visible = visible.len();
    info!("visibility tracing: {} candidates cleared", stats.visible);
    if visible.is_empty() {
        return Ok(PipelineOutput::emptied_at(stats, Stage::Visibility));
    }

    if cancel.is_cancelled() {
        return Err(ViewshedError::Cancelled);
    }
    let clustered = reduce_clusters(visible, request.cluster_grid_m);
    stats.clustered = clustered.len();
    info!("clustering: {} survivors", stats.clustered);
    if clustered.is_empty() {
        return Ok(PipelineOutput::emptied_at(stats, Stage::Cluster));
    }

    if cancel.is_cancelled() {
        return Err(ViewshedError::Cancelled);
    }
    let mut scored = Vec::with_capacity(clustered.len());
    for entry in clustered {
        let candidate_xy = Coord {
            x: entry.candidate.x,
            y: entry.candidate.y,
        };
        let Some(access) = evaluate_access(candidate_xy, roads, request) else {
            debug!(
                "candidate ({}, {}) rejected by road access",
                entry.candidate.row, entry.candidate.col
            );
            continue;
        };
        let score = composite_score(
            entry.candidate.elevation_m,
            entry.visibility.max_distance_m,
            entry.visibility.fov_deg,
            access.walk_minutes,
            request.min_visibility_m,
            request.min_fov_deg,
            request.max_walk_minutes,
        );
        if !score.is_finite() {
            return Err(ViewshedError::Internal(format!(
                "non-finite score for candidate at ({}, {})",
                entry.candidate.row, entry.candidate.col
            )));
        }
        scored.push(ScoredCandidate {
            candidate: entry.candidate,
            visibility: entry.visibility,
            access,
            score,
        });
    }
    stats.drivable = scored.len();
    info!("drivability: {} reachable candidates", stats.drivable);
    if scored.is_empty() {
        return Ok(PipelineOutput::emptied_at(stats, Stage::Drivability));
    }

    let results = rank(scored, request.results_limit);
    info!("ranking: returning {} viewpoints", results.len());
    Ok(PipelineOutput {
        results,
        stats,
        emptied: None,
    })
}

#[cfg(test)]
mod tests {
    use super::{run_pipeline_cancellable, CancelToken, Stage};
    use crate::{RoadNetwork, ViewshedError, VisibilityRequest};
    use demgrid::synthetic;

    #[test]
    fn test_cancel_before_start() {
        let grid = synthetic::conical_hill(101, 101, 10.0, 100.0, 200.0);
        let roads = RoadNetwork::synthetic();
        let request = VisibilityRequest::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = run_pipeline_cancellable(&grid, &roads, &request, &cancel);
        assert!(matches!(result, Err(ViewshedError::Cancelled)));
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(Stage::Candidates.to_string(), "candidates");
        assert_eq!(Stage::Visibility.to_string(), "visibility");
        assert_eq!(Stage::Cluster.to_string(), "cluster");
        assert_eq!(Stage::Drivability.to_string(), "drivability");
    }

    #[test]
    fn test_invalid_request_rejected_up_front() {
        let grid = synthetic::flat_plain(10, 10, 10.0, 100.0);
        let roads = RoadNetwork::synthetic();
        let mut request = VisibilityRequest::default();
        request.rays_full_circle = 2;
        let result = run_pipeline_cancellable(&grid, &roads, &request, &CancelToken::new());
        assert!(matches!(result, Err(ViewshedError::InvalidInput(_))));
    }
}
