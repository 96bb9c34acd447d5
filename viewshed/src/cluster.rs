use crate::VisibleCandidate;
use std::collections::{hash_map::Entry, HashMap};

/// Reduces candidates to one survivor per square grid bin.
///
/// The survivor is the highest-elevation candidate in its bin; ties go to
/// the greater visible distance, then the lower (row, col). Output order is
/// (row, col) so downstream stages see a deterministic sequence.
pub fn reduce_clusters(
    candidates: Vec<VisibleCandidate>,
    cluster_grid_m: f64,
) -> Vec<VisibleCandidate> {
    let mut bins: HashMap<(i64, i64), VisibleCandidate> = HashMap::new();
    for entry in candidates {
        let key = (
            (entry.candidate.x / cluster_grid_m).floor() as i64,
            (entry.candidate.y / cluster_grid_m).floor() as i64,
        );
        match bins.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                if beats(&entry, slot.get()) {
                    slot.insert(entry);
                }
            }
        }
    }

    let mut survivors: Vec<VisibleCandidate> = bins.into_values().collect();
    survivors.sort_by_key(|entry| (entry.candidate.row, entry.candidate.col));
    survivors
}

fn beats(challenger: &VisibleCandidate, survivor: &VisibleCandidate) -> bool {
    let elevation = challenger
        .candidate
        .elevation_m
        .total_cmp(&survivor.candidate.elevation_m);
    let distance = challenger
        .visibility
        .max_distance_m
        .total_cmp(&survivor.visibility.max_distance_m);
    let index = (challenger.candidate.row, challenger.candidate.col)
        .cmp(&(survivor.candidate.row, survivor.candidate.col));
    elevation
        .then(distance)
        .then(index.reverse())
        .is_gt()
}

#[cfg(test)]
mod tests {
    use super::reduce_clusters;
    use crate::{TerrainCandidate, VisibilityMetrics, VisibleCandidate};

    fn entry(row: usize, col: usize, x: f64, y: f64, elevation: f64, distance: f64) -> VisibleCandidate {
        VisibleCandidate {
            candidate: TerrainCandidate {
                row,
                col,
                x,
                y,
                elevation_m: elevation,
                prominence_m: 0.0,
            },
            visibility: VisibilityMetrics {
                rays: Vec::new(),
                max_distance_m: distance,
                mean_distance_m: 0.0,
                median_distance_m: 0.0,
                cleared_ray_count: 1,
                fov_deg: 0.0,
            },
        }
    }

    #[test]
    fn test_highest_elevation_survives_per_bin() {
        let survivors = reduce_clusters(
            vec![
                entry(0, 0, 10.0, 10.0, 100.0, 500.0),
                entry(0, 1, 20.0, 10.0, 150.0, 400.0),
                entry(9, 9, 900.0, 900.0, 50.0, 100.0),
            ],
            250.0,
        );
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].candidate.elevation_m, 150.0);
        assert_eq!(survivors[1].candidate.elevation_m, 50.0);
    }

    #[test]
    fn test_elevation_tie_goes_to_greater_distance() {
        let survivors = reduce_clusters(
            vec![
                entry(0, 0, 10.0, 10.0, 100.0, 400.0),
                entry(0, 1, 20.0, 10.0, 100.0, 600.0),
            ],
            250.0,
        );
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].visibility.max_distance_m, 600.0);
    }

    #[test]
    fn test_full_tie_goes_to_lowest_index() {
        let survivors = reduce_clusters(
            vec![
                entry(2, 5, 10.0, 10.0, 100.0, 400.0),
                entry(1, 9, 20.0, 10.0, 100.0, 400.0),
            ],
            250.0,
        );
        assert_eq!(survivors.len(), 1);
        assert_eq!((survivors[0].candidate.row, survivors[0].candidate.col), (1, 9));
    }

    #[test]
    fn test_negative_coordinates_bin_by_floor() {
        let survivors = reduce_clusters(
            vec![
                entry(0, 0, -10.0, -10.0, 100.0, 400.0),
                entry(0, 1, 10.0, 10.0, 90.0, 400.0),
            ],
            250.0,
        );
        // floor(-10/250) = -1, floor(10/250) = 0: distinct bins.
        assert_eq!(survivors.len(), 2);
    }
}
