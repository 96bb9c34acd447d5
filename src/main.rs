mod options;

use anyhow::Error as AnyError;
use clap::Parser;
use demgrid::synthetic;
use log::info;
use options::{Cli, Command, Scene};
use viewshed::{report, run_pipeline, units, PipelineOutput, RoadNetwork, VisibilityRequest};

fn main() -> Result<(), AnyError> {
    env_logger::init();
    let cli = Cli::parse();

    let grid = match cli.scene {
        Scene::Cone => synthetic::conical_hill(
            cli.size,
            cli.size,
            cli.cell_size,
            cli.base_elevation,
            cli.peak_rise,
        ),
        Scene::Bump => synthetic::sloped_bump(
            cli.size,
            cli.size,
            cli.cell_size,
            cli.base_elevation,
            cli.base_elevation + cli.peak_rise,
        ),
    };
    let roads = RoadNetwork::synthetic();
    info!(
        "scene: {}x{} cells at {} m, {} road polylines",
        grid.rows(),
        grid.cols(),
        grid.cell_size_m(),
        roads.len()
    );

    let request = VisibilityRequest::builder()
        .azimuth(cli.azimuth)
        .azimuth_tolerance(cli.azimuth_tolerance)
        .min_visibility(units::miles_to_meters(cli.min_visibility_miles))
        .min_fov(cli.min_fov)
        .rays_full_circle(cli.rays)
        .obstruction_height(cli.obstruction_height)
        .obstruction_start(cli.obstruction_start)
        .max_walk_minutes(cli.max_walk_minutes)
        .max_drive_minutes(cli.max_drive_minutes)
        .results_limit(cli.limit)
        .build()?;

    let output = run_pipeline(&grid, &roads, &request)?;
    if let Some(stage) = output.emptied {
        println!("no viewpoints: the {stage} stage left nothing to rank");
        return Ok(());
    }

    match cli.cmd {
        Command::Table => print_table(&output),
        Command::Csv => {
            let mut stdout = std::io::stdout().lock();
            report::write_csv(&mut stdout, &output.results, passthrough_latlon)?;
        }
        Command::Json => {
            let mut stdout = std::io::stdout().lock();
            report::write_geojson(&mut stdout, &output.results, passthrough_latlon)?;
            println!();
        }
    }
    Ok(())
}

/// The synthetic scene has no real geographic frame; exports carry the
/// projected coordinates through the lat/lon columns unchanged.
fn passthrough_latlon(x: f64, y: f64) -> (f64, f64) {
    (y, x)
}

fn print_table(output: &PipelineOutput) {
    println!(
        "{:>4}  {:>5} {:>5}  {:>9}  {:>9}  {:>7}  {:>6}  {:>6}  {:>6}",
        "rank", "row", "col", "elev (m)", "max (mi)", "fov", "walk", "drive", "score"
    );
    for (rank, entry) in output.results.iter().enumerate() {
        println!(
            "{:>4}  {:>5} {:>5}  {:>9.1}  {:>9.2}  {:>7.1}  {:>6.1}  {:>6.1}  {:>6.3}",
            rank + 1,
            entry.candidate.row,
            entry.candidate.col,
            entry.candidate.elevation_m,
            units::meters_to_miles(entry.visibility.max_distance_m),
            entry.visibility.fov_deg,
            entry.access.walk_minutes,
            entry.access.drive_minutes_estimate,
            entry.score,
        );
    }
    let stats = output.stats;
    println!(
        "\n{} candidates -> {} visible -> {} clustered -> {} drivable",
        stats.candidates, stats.visible, stats.clustered, stats.drivable
    );
}
