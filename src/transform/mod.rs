//! Local-to-world transform composition
//!
//! The target stores component and bone transforms relative to a parent
//! frame (the owning component's `ComponentToWorld`), so a world position
//! is always the product of two matrices.

use crate::engine::Transform;
use crate::math::{Matrix4, Vector3};

/// Full world matrix of `local` expressed in `parent_frame`
#[inline]
pub fn resolve_world_matrix(local: &Transform, parent_frame: &Transform) -> Matrix4 {
    local.to_matrix_with_scale() * parent_frame.to_matrix_with_scale()
}

/// Absolute world position of `local` expressed in `parent_frame`
pub fn resolve_world_position(local: &Transform, parent_frame: &Transform) -> Vector3 {
    resolve_world_matrix(local, parent_frame).translation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    #[test]
    fn test_identity_frames_add_translations() {
        let cases = [
            (Vector3::new(1.0, 2.0, 3.0), Vector3::new(10.0, 20.0, 30.0)),
            (Vector3::new(-5.5, 0.0, 12.25), Vector3::new(1000.0, -2000.0, 0.5)),
            (Vector3::ZERO, Vector3::new(7.0, 8.0, 9.0)),
        ];

        for (local, parent) in cases {
            let world = resolve_world_position(
                &Transform::from_translation(local),
                &Transform::from_translation(parent),
            );
            assert_eq!(world, local + parent);
        }
    }

    #[test]
    fn test_parent_rotation_applies_to_local_offset() {
        let bone = Transform::from_translation(Vector3::new(10.0, 0.0, 0.0));
        let parent = Transform::new(
            Quat::from_yaw(90.0),
            Vector3::new(100.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        );

        let world = resolve_world_position(&bone, &parent);
        assert!((world.x - 100.0).abs() < 1e-9);
        assert!((world.y - 10.0).abs() < 1e-9);
        assert!(world.z.abs() < 1e-9);
    }

    #[test]
    fn test_parent_scale_applies_to_local_offset() {
        let bone = Transform::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let parent = Transform::new(
            Quat::IDENTITY,
            Vector3::new(0.0, 0.0, 100.0),
            Vector3::new(2.0, 2.0, 2.0),
        );

        assert_eq!(
            resolve_world_position(&bone, &parent),
            Vector3::new(2.0, 4.0, 106.0)
        );
    }

    #[test]
    fn test_world_matrix_matches_point_transform() {
        let bone = Transform::new(
            Quat::from_yaw(30.0),
            Vector3::new(4.0, -2.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
        );
        let parent = Transform::new(
            Quat::from_yaw(-45.0),
            Vector3::new(50.0, 60.0, 70.0),
            Vector3::new(1.0, 1.0, 1.0),
        );

        let direct = parent
            .to_matrix_with_scale()
            .transform_point(bone.translation);
        let composed = resolve_world_position(&bone, &parent);

        assert!(direct.distance(composed) < 1e-9);
    }
}
