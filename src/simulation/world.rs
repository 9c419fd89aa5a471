//! Ground-truth landmark map

use rand::Rng;

use crate::common::Point2D;

/// True landmark positions, visible only to the simulator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkMap {
    landmarks: Vec<Point2D>,
}

impl LandmarkMap {
    pub fn new(landmarks: Vec<Point2D>) -> Self {
        Self { landmarks }
    }

    /// `count` landmarks drawn uniformly from the box spanned by `min` and `max`
    pub fn random<R: Rng + ?Sized>(count: usize, min: Point2D, max: Point2D, rng: &mut R) -> Self {
        let landmarks = (0..count)
            .map(|_| Point2D::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.y..=max.y)))
            .collect();
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Point2D] {
        &self.landmarks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2D> {
        self.landmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Distance from `p` to the closest true landmark
    pub fn nearest_distance(&self, p: &Point2D) -> Option<f64> {
        self.landmarks
            .iter()
            .map(|lm| lm.distance(p))
            .fold(None, |best, d| match best {
                Some(b) if b <= d => Some(b),
                _ => Some(d),
            })
    }
}

impl From<Vec<[f64; 2]>> for LandmarkMap {
    fn from(points: Vec<[f64; 2]>) -> Self {
        Self::new(points.into_iter().map(Point2D::from).collect())
    }
}
