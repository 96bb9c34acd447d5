use clap::{Parser, Subcommand, ValueEnum};

/// Rank drivable scenic viewpoints on a synthetic terrain scene.
#[derive(Parser, Debug)]
pub struct Cli {
    /// Scene terrain shape.
    #[arg(long, value_enum, default_value = "cone")]
    pub scene: Scene,

    /// Scene side length, in cells.
    #[arg(long, default_value_t = 201)]
    pub size: usize,

    /// Cell size, in meters.
    #[arg(long, default_value_t = 10.0)]
    pub cell_size: f64,

    /// Base elevation of the scene, meters.
    #[arg(long, default_value_t = 100.0)]
    pub base_elevation: f32,

    /// Rise of the terrain feature above the base, meters.
    #[arg(long, default_value_t = 200.0)]
    pub peak_rise: f32,

    /// Desired viewing azimuth, degrees clockwise from north.
    #[arg(short, long, default_value_t = 0.0)]
    pub azimuth: f64,

    /// Half-width of the azimuth sector, degrees.
    #[arg(long, default_value_t = 180.0)]
    pub azimuth_tolerance: f64,

    /// Required sight distance, miles.
    #[arg(long, default_value_t = 0.5)]
    pub min_visibility_miles: f64,

    /// Required cleared field of view, degrees.
    #[arg(long, default_value_t = 30.0)]
    pub min_fov: f64,

    /// Rays cast over the full circle.
    #[arg(long, default_value_t = 72)]
    pub rays: usize,

    /// Synthetic canopy height, meters; 0 disables the tree belt.
    #[arg(long, default_value_t = 0.0)]
    pub obstruction_height: f64,

    /// Clear-moat radius around each candidate, meters.
    #[arg(long, default_value_t = 10.0)]
    pub obstruction_start: f64,

    /// Maximum walking time from a road, minutes.
    #[arg(long, default_value_t = 15.0)]
    pub max_walk_minutes: f64,

    /// Maximum estimated driving time, minutes.
    #[arg(long)]
    pub max_drive_minutes: Option<f64>,

    /// Number of ranked viewpoints to keep.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Scene {
    /// A conical hill centered on the grid.
    Cone,
    /// A gentle ramp with an off-center bump.
    Bump,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print ranked viewpoints as a text table.
    Table,

    /// Print ranked viewpoints as CSV to stdout.
    Csv,

    /// Print ranked viewpoints as GeoJSON to stdout.
    Json,
}
