//! Nearest-neighbour data association with a distance gate
//!
//! Each observation is compared with every tracked landmark (O(L)). The
//! closest landmark wins; if two are equally close within [`TIE_TOLERANCE`]
//! the lower index wins. The winner is accepted only if its distance is
//! strictly below the gate, otherwise the observation is a new landmark.

use crate::common::Point2D;

/// Distances closer than this are treated as equal
pub const TIE_TOLERANCE: f64 = 1e-12;

/// Pick the gated nearest neighbour from `(index, distance)` pairs.
///
/// Pairs must arrive in increasing index order. Non-finite distances never
/// match.
pub fn nearest_within_gate<I>(distances: I, gate: f64) -> Option<usize>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, dist) in distances {
        if !dist.is_finite() {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist - TIE_TOLERANCE => {}
            _ => best = Some((index, dist)),
        }
    }

    best.filter(|&(_, dist)| dist < gate).map(|(index, _)| index)
}

/// Euclidean association of a globally resolved candidate position
pub fn associate_euclidean<I>(candidate: &Point2D, landmarks: I, gate: f64) -> Option<usize>
where
    I: IntoIterator<Item = Point2D>,
{
    nearest_within_gate(
        landmarks
            .into_iter()
            .enumerate()
            .map(|(i, lm)| (i, candidate.distance(&lm))),
        gate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_within_gate() {
        let landmarks = vec![Point2D::new(5.0, 5.0)];
        assert_eq!(
            associate_euclidean(&Point2D::new(5.1, 5.1), landmarks.clone(), 0.5),
            Some(0)
        );
        assert_eq!(
            associate_euclidean(&Point2D::new(10.0, 10.0), landmarks, 0.5),
            None
        );
    }

    #[test]
    fn test_no_landmarks_no_match() {
        assert_eq!(
            associate_euclidean(&Point2D::origin(), Vec::new(), 1.0),
            None
        );
    }

    #[test]
    fn test_nearest_wins() {
        let landmarks = vec![
            Point2D::new(0.0, 0.4),
            Point2D::new(0.1, 0.0),
            Point2D::new(-0.3, 0.0),
        ];
        assert_eq!(
            associate_euclidean(&Point2D::origin(), landmarks, 0.5),
            Some(1)
        );
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let landmarks = vec![
            Point2D::new(2.0, 0.0),
            Point2D::new(0.0, 0.2),
            Point2D::new(0.2, 0.0),
            Point2D::new(-0.2, 0.0),
        ];
        assert_eq!(
            associate_euclidean(&Point2D::origin(), landmarks, 0.5),
            Some(1)
        );
    }

    #[test]
    fn test_gate_is_strict() {
        assert_eq!(nearest_within_gate(vec![(0, 0.5)], 0.5), None);
        assert_eq!(nearest_within_gate(vec![(0, 0.49)], 0.5), Some(0));
    }

    #[test]
    fn test_non_finite_distances_skipped() {
        assert_eq!(
            nearest_within_gate(vec![(0, f64::NAN), (1, 0.3)], 0.5),
            Some(1)
        );
    }
}
