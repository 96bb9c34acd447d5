use crate::{units::miles_to_meters, ViewshedError};

/// Frozen per-run configuration snapshot.
///
/// Construct through [`VisibilityRequest::builder`], which validates every
/// field; the pipeline re-validates on entry so a hand-assembled request
/// cannot smuggle bad values in.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityRequest {
    /// Observer eye height above the candidate cell, meters.
    pub observer_eye_height_m: f64,

    /// Radius of the clear moat around each candidate, meters.
    pub obstruction_start_m: f64,

    /// Synthetic canopy height beyond the moat, meters.
    pub obstruction_height_m: f64,

    /// Required sight distance, meters.
    pub min_visibility_m: f64,

    /// Required cleared field of view, degrees.
    pub min_fov_deg: f64,

    /// Desired viewing direction, degrees clockwise from north.
    pub azimuth_deg: f64,

    /// Half-width of the azimuth sector, degrees.
    pub azimuth_tolerance_deg: f64,

    /// Rays cast over the full circle.
    pub rays_full_circle: usize,

    /// Ray length cap, meters.
    pub max_visibility_m: f64,

    /// Square bin spacing for candidate clustering, meters.
    pub cluster_grid_m: f64,

    /// DEM resample factor: below 1 sharpens, above 1 coarsens.
    pub resolution_scale: f64,

    /// Candidates below this elevation are not considered, meters.
    pub min_candidate_elevation_m: f64,

    /// Candidates below this prominence are not considered, meters.
    pub min_prominence_m: f64,

    pub walking_speed_kmh: f64,
    pub driving_speed_kmh: f64,

    /// Maximum walking time from a road, minutes.
    pub max_walk_minutes: f64,

    /// Optional cap on the driving estimate, minutes.
    pub max_drive_minutes: Option<f64>,

    /// Number of ranked results to return.
    pub results_limit: usize,
}

impl Default for VisibilityRequest {
    fn default() -> Self {
        Self {
            observer_eye_height_m: 1.8,
            obstruction_start_m: 10.0,
            obstruction_height_m: 15.0,
            min_visibility_m: miles_to_meters(3.0),
            min_fov_deg: 30.0,
            azimuth_deg: 0.0,
            azimuth_tolerance_deg: 45.0,
            rays_full_circle: 72,
            max_visibility_m: 100_000.0,
            cluster_grid_m: 250.0,
            resolution_scale: 1.0,
            min_candidate_elevation_m: 0.0,
            min_prominence_m: 0.0,
            walking_speed_kmh: 4.8,
            driving_speed_kmh: 60.0,
            max_walk_minutes: 15.0,
            max_drive_minutes: None,
            results_limit: 10,
        }
    }
}

impl VisibilityRequest {
    /// Returns a request builder seeded with the defaults.
    pub fn builder() -> VisibilityRequestBuilder {
        VisibilityRequestBuilder {
            request: Self::default(),
        }
    }

    /// Validates every field; rejected values surface as `InvalidInput`.
    pub fn validate(&self) -> Result<(), ViewshedError> {
        use ViewshedError::InvalidInput;

        let finite = |value: f64, what: &'static str| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(InvalidInput(what))
            }
        };

        finite(self.observer_eye_height_m, "observer_eye_height_m is not finite")?;
        finite(self.obstruction_start_m, "obstruction_start_m is not finite")?;
        finite(self.obstruction_height_m, "obstruction_height_m is not finite")?;
        finite(self.min_visibility_m, "min_visibility_m is not finite")?;
        finite(self.min_fov_deg, "min_fov_deg is not finite")?;
        finite(self.azimuth_deg, "azimuth_deg is not finite")?;
        finite(self.azimuth_tolerance_deg, "azimuth_tolerance_deg is not finite")?;
        finite(self.max_visibility_m, "max_visibility_m is not finite")?;
        finite(self.cluster_grid_m, "cluster_grid_m is not finite")?;
        finite(self.resolution_scale, "resolution_scale is not finite")?;
        finite(
            self.min_candidate_elevation_m,
            "min_candidate_elevation_m is not finite",
        )?;
        finite(self.min_prominence_m, "min_prominence_m is not finite")?;
        finite(self.walking_speed_kmh, "walking_speed_kmh is not finite")?;
        finite(self.driving_speed_kmh, "driving_speed_kmh is not finite")?;
        finite(self.max_walk_minutes, "max_walk_minutes is not finite")?;

        if self.rays_full_circle < 4 {
            return Err(InvalidInput("rays_full_circle must be at least 4"));
        }
        if self.min_fov_deg < 0.0 {
            return Err(InvalidInput("min_fov_deg must not be negative"));
        }
        if self.min_visibility_m < 0.0 {
            return Err(InvalidInput("min_visibility_m must not be negative"));
        }
        if self.observer_eye_height_m < 0.0 {
            return Err(InvalidInput("observer_eye_height_m must not be negative"));
        }
        if self.obstruction_start_m < 0.0 {
            return Err(InvalidInput("obstruction_start_m must not be negative"));
        }
        if self.obstruction_height_m < 0.0 {
            return Err(InvalidInput("obstruction_height_m must not be negative"));
        }
        if !(0.0..=180.0).contains(&self.azimuth_tolerance_deg) {
            return Err(InvalidInput("azimuth_tolerance_deg must be within [0, 180]"));
        }
        if self.max_visibility_m <= 0.0 {
            return Err(InvalidInput("max_visibility_m must be positive"));
        }
        if self.cluster_grid_m <= 0.0 {
            return Err(InvalidInput("cluster_grid_m must be positive"));
        }
        if self.resolution_scale <= 0.0 {
            return Err(InvalidInput("resolution_scale must be positive"));
        }
        if self.walking_speed_kmh <= 0.0 {
            return Err(InvalidInput("walking_speed_kmh must be positive"));
        }
        if self.driving_speed_kmh <= 0.0 {
            return Err(InvalidInput("driving_speed_kmh must be positive"));
        }
        if self.max_walk_minutes <= 0.0 {
            return Err(InvalidInput("max_walk_minutes must be positive"));
        }
        if let Some(limit) = self.max_drive_minutes {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(InvalidInput("max_drive_minutes must be positive and finite"));
            }
        }
        if self.results_limit == 0 {
            return Err(InvalidInput("results_limit must be at least 1"));
        }
        Ok(())
    }
}

pub struct VisibilityRequestBuilder {
    request: VisibilityRequest,
}

impl VisibilityRequestBuilder {
    /// Observer eye height above the candidate cell (meters).
    #[must_use]
    pub fn observer_eye_height(mut self, meters: f64) -> Self {
        self.request.observer_eye_height_m = meters;
        self
    }

    /// Clear-moat radius around each candidate (meters).
    #[must_use]
    pub fn obstruction_start(mut self, meters: f64) -> Self {
        self.request.obstruction_start_m = meters;
        self
    }

    /// Synthetic canopy height beyond the moat (meters).
    #[must_use]
    pub fn obstruction_height(mut self, meters: f64) -> Self {
        self.request.obstruction_height_m = meters;
        self
    }

    /// Required sight distance (meters).
    #[must_use]
    pub fn min_visibility(mut self, meters: f64) -> Self {
        self.request.min_visibility_m = meters;
        self
    }

    /// Required cleared field of view (degrees).
    #[must_use]
    pub fn min_fov(mut self, degrees: f64) -> Self {
        self.request.min_fov_deg = degrees;
        self
    }

    /// Desired viewing direction (degrees clockwise from north).
    #[must_use]
    pub fn azimuth(mut self, degrees: f64) -> Self {
        self.request.azimuth_deg = degrees;
        self
    }

    /// Half-width of the azimuth sector (degrees).
    #[must_use]
    pub fn azimuth_tolerance(mut self, degrees: f64) -> Self {
        self.request.azimuth_tolerance_deg = degrees;
        self
    }

    /// Rays cast over the full circle.
    #[must_use]
    pub fn rays_full_circle(mut self, rays: usize) -> Self {
        self.request.rays_full_circle = rays;
        self
    }

    /// Ray length cap (meters).
    #[must_use]
    pub fn max_visibility(mut self, meters: f64) -> Self {
        self.request.max_visibility_m = meters;
        self
    }

    /// Square bin spacing for candidate clustering (meters).
    #[must_use]
    pub fn cluster_grid(mut self, meters: f64) -> Self {
        self.request.cluster_grid_m = meters;
        self
    }

    /// DEM resample factor.
    #[must_use]
    pub fn resolution_scale(mut self, scale: f64) -> Self {
        self.request.resolution_scale = scale;
        self
    }

    /// Elevation floor for candidate detection (meters).
    #[must_use]
    pub fn min_candidate_elevation(mut self, meters: f64) -> Self {
        self.request.min_candidate_elevation_m = meters;
        self
    }

    /// Prominence floor for candidate detection (meters).
    #[must_use]
    pub fn min_prominence(mut self, meters: f64) -> Self {
        self.request.min_prominence_m = meters;
        self
    }

    /// Walking speed (km/h).
    #[must_use]
    pub fn walking_speed(mut self, kmh: f64) -> Self {
        self.request.walking_speed_kmh = kmh;
        self
    }

    /// Driving speed (km/h).
    #[must_use]
    pub fn driving_speed(mut self, kmh: f64) -> Self {
        self.request.driving_speed_kmh = kmh;
        self
    }

    /// Maximum walking time from a road (minutes).
    #[must_use]
    pub fn max_walk_minutes(mut self, minutes: f64) -> Self {
        self.request.max_walk_minutes = minutes;
        self
    }

    /// Optional cap on the driving estimate (minutes).
    #[must_use]
    pub fn max_drive_minutes(mut self, minutes: Option<f64>) -> Self {
        self.request.max_drive_minutes = minutes;
        self
    }

    /// Number of ranked results to return.
    #[must_use]
    pub fn results_limit(mut self, limit: usize) -> Self {
        self.request.results_limit = limit;
        self
    }

    /// Validates and freezes the request. The azimuth is normalized into
    /// [0, 360).
    pub fn build(mut self) -> Result<VisibilityRequest, ViewshedError> {
        if self.request.azimuth_deg.is_finite() {
            self.request.azimuth_deg = self.request.azimuth_deg.rem_euclid(360.0);
        }
        self.request.validate()?;
        Ok(self.request)
    }
}
