//! State augmentation for newly discovered landmarks
//!
//! A landmark initialized as `l = g(pose, z)` gets
//! `P_ll = Gr P_rr Gr^T + Gz R Gz^T` and cross-covariance `P_lx = Gr P_rx`
//! with every existing state component, so it is correlated with older
//! landmarks only through the shared pose block.

use nalgebra::{DMatrix, DVector, Matrix2, Matrix2x3};

use crate::common::Point2D;

use super::ekf_slam::{LM_SIZE, STATE_SIZE};

/// Inverse observation linearization at the landmark being added
#[derive(Debug, Clone, Copy)]
pub struct LandmarkInit {
    /// Initial global position estimate
    pub position: Point2D,
    /// d(position) / d(pose)
    pub g_pose: Matrix2x3<f64>,
    /// d(position) / d(observation)
    pub g_obs: Matrix2<f64>,
}

/// Grown copies of `x` and `p` with the landmark appended as the last block
pub fn augmented(
    x: &DVector<f64>,
    p: &DMatrix<f64>,
    init: &LandmarkInit,
    r: &Matrix2<f64>,
) -> (DVector<f64>, DMatrix<f64>) {
    let n = x.len();
    let new_n = n + LM_SIZE;

    let mut new_x = DVector::zeros(new_n);
    new_x.rows_mut(0, n).copy_from(x);
    new_x[n] = init.position.x;
    new_x[n + 1] = init.position.y;

    let p_rr = p.fixed_view::<STATE_SIZE, STATE_SIZE>(0, 0);
    let p_ll = init.g_pose * p_rr * init.g_pose.transpose()
        + init.g_obs * r * init.g_obs.transpose();
    let p_ll = (p_ll + p_ll.transpose()) * 0.5;
    // 2 x n, covers the pose block and every older landmark at once
    let p_lx = init.g_pose * p.rows(0, STATE_SIZE);

    let mut new_p = DMatrix::zeros(new_n, new_n);
    new_p.view_mut((0, 0), (n, n)).copy_from(p);
    new_p.view_mut((n, 0), (LM_SIZE, n)).copy_from(&p_lx);
    new_p.view_mut((0, n), (n, LM_SIZE)).copy_from(&p_lx.transpose());
    new_p.fixed_view_mut::<LM_SIZE, LM_SIZE>(n, n).copy_from(&p_ll);

    (new_x, new_p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Observation, ObservationModel, Pose2D};
    use crate::slam::RangeBearingModel;
    use approx::assert_relative_eq;

    fn init_for(pose: &Pose2D, z: &Observation) -> LandmarkInit {
        let model = RangeBearingModel::new();
        let (g_pose, g_obs) = model.inverse_jacobian(pose, z);
        LandmarkInit {
            position: model.inverse(pose, z),
            g_pose,
            g_obs,
        }
    }

    #[test]
    fn test_augment_grows_by_two() {
        let pose = Pose2D::origin();
        let x = DVector::from_column_slice(pose.to_vector().as_slice());
        let p = DMatrix::identity(3, 3) * 0.1;
        let z = Observation::new(5.0, 0.0);
        let r = Matrix2::new(0.1, 0.0, 0.0, 0.01);

        let (x1, p1) = augmented(&x, &p, &init_for(&pose, &z), &r);
        assert_eq!(x1.len(), 5);
        assert_eq!(p1.shape(), (5, 5));
        assert_relative_eq!(x1[3], 5.0);
        assert_relative_eq!(x1[4], 0.0);
        // old block untouched
        assert_eq!(p1.view((0, 0), (3, 3)).clone_owned(), p);
        assert_relative_eq!(p1.clone(), p1.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_covariance_only_through_pose() {
        let pose = Pose2D::origin();
        let x = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        // no pose uncertainty: new landmarks must be uncorrelated with everything
        let p = DMatrix::zeros(3, 3);
        let r = Matrix2::new(0.1, 0.0, 0.0, 0.01);

        let (x1, p1) = augmented(&x, &p, &init_for(&pose, &Observation::new(2.0, 0.5)), &r);
        let (_, p2) = augmented(&x1, &p1, &init_for(&pose, &Observation::new(3.0, -0.5)), &r);

        for i in 0..5 {
            for j in 5..7 {
                assert_eq!(p2[(i, j)], 0.0);
                assert_eq!(p2[(j, i)], 0.0);
            }
        }
        assert!(p2[(5, 5)] > 0.0);
        assert!(p2[(6, 6)] > 0.0);
    }
}
