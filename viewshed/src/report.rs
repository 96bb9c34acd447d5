//! CSV and GeoJSON writers over scored candidates.
//!
//! The engine works purely in projected coordinates; callers supply a
//! back-projection closure mapping projected (x, y) to (lat, lon) for the
//! geographic columns.

use crate::ScoredCandidate;
use serde::Serialize;
use std::io::{self, Write};

/// Writes the stable CSV form, one row per scored candidate.
pub fn write_csv<W, F>(out: &mut W, results: &[ScoredCandidate], to_latlon: F) -> io::Result<()>
where
    W: Write,
    F: Fn(f64, f64) -> (f64, f64),
{
    writeln!(
        out,
        "row,col,x,y,lat,lon,elevation_m,max_distance_m,mean_distance_m,median_distance_m,\
         fov_deg,cleared_ray_count,access_x,access_y,distance_m,walk_minutes,\
         drive_minutes_estimate,score"
    )?;
    for entry in results {
        let (lat, lon) = to_latlon(entry.candidate.x, entry.candidate.y);
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            entry.candidate.row,
            entry.candidate.col,
            entry.candidate.x,
            entry.candidate.y,
            lat,
            lon,
            entry.candidate.elevation_m,
            entry.visibility.max_distance_m,
            entry.visibility.mean_distance_m,
            entry.visibility.median_distance_m,
            entry.visibility.fov_deg,
            entry.visibility.cleared_ray_count,
            entry.access.x,
            entry.access.y,
            entry.access.distance_m,
            entry.access.walk_minutes,
            entry.access.drive_minutes_estimate,
            entry.score,
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: Properties,
}

#[derive(Serialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// GeoJSON order: [lon, lat].
    coordinates: [f64; 2],
}

#[derive(Serialize)]
struct Properties {
    row: usize,
    col: usize,
    x: f64,
    y: f64,
    lat: f64,
    lon: f64,
    elevation_m: f64,
    max_distance_m: f64,
    mean_distance_m: f64,
    median_distance_m: f64,
    fov_deg: f64,
    cleared_ray_count: usize,
    access_x: f64,
    access_y: f64,
    distance_m: f64,
    walk_minutes: f64,
    drive_minutes_estimate: f64,
    score: f64,
}

/// Writes a GeoJSON FeatureCollection of Point features, one per candidate.
pub fn write_geojson<W, F>(
    out: &mut W,
    results: &[ScoredCandidate],
    to_latlon: F,
) -> Result<(), serde_json::Error>
where
    W: Write,
    F: Fn(f64, f64) -> (f64, f64),
{
    let features = results
        .iter()
        .map(|entry| {
            let (lat, lon) = to_latlon(entry.candidate.x, entry.candidate.y);
            Feature {
                kind: "Feature",
                geometry: Geometry {
                    kind: "Point",
                    coordinates: [lon, lat],
                },
                properties: Properties {
                    row: entry.candidate.row,
                    col: entry.candidate.col,
                    x: entry.candidate.x,
                    y: entry.candidate.y,
                    lat,
                    lon,
                    elevation_m: entry.candidate.elevation_m,
                    max_distance_m: entry.visibility.max_distance_m,
                    mean_distance_m: entry.visibility.mean_distance_m,
                    median_distance_m: entry.visibility.median_distance_m,
                    fov_deg: entry.visibility.fov_deg,
                    cleared_ray_count: entry.visibility.cleared_ray_count,
                    access_x: entry.access.x,
                    access_y: entry.access.y,
                    distance_m: entry.access.distance_m,
                    walk_minutes: entry.access.walk_minutes,
                    drive_minutes_estimate: entry.access.drive_minutes_estimate,
                    score: entry.score,
                },
            }
        })
        .collect();
    let collection = FeatureCollection {
        kind: "FeatureCollection",
        features,
    };
    serde_json::to_writer(out, &collection)
}
