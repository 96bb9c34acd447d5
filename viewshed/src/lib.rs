//! Drivable scenic-viewpoint ranking over projected DEM rasters.
//!
//! The engine consumes a fully materialized [`demgrid::TerrainGrid`], a
//! [`RoadNetwork`] in the same projected CRS, and a frozen
//! [`VisibilityRequest`], and runs a strict linear pipeline: candidate
//! detection, radial visibility tracing with a synthetic canopy model,
//! grid-bin clustering, road-access scoring, and composite ranking. Outputs
//! are deterministic for identical inputs.

mod candidates;
mod cluster;
mod drivability;
mod error;
mod pipeline;
mod rank;
pub mod report;
mod request;
mod roads;
mod trace;
pub mod units;

pub use crate::{
    candidates::{identify_candidates, TerrainCandidate},
    drivability::{evaluate_access, AccessPoint, ROAD_SINUOSITY},
    error::ViewshedError,
    pipeline::{
        run_pipeline, run_pipeline_cancellable, CancelToken, PipelineOutput, ScoredCandidate,
        Stage, StageStats,
    },
    request::{VisibilityRequest, VisibilityRequestBuilder},
    roads::{NearestRoadPoint, RoadNetwork, RoadSegment},
    trace::{RayResult, RayTracer, VisibilityMetrics, VisibleCandidate},
};

pub use {demgrid, geo};
