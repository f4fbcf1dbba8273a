//! World-to-screen projection
//!
//! Pinhole camera model in the target's convention: the camera's forward
//! axis (X) is depth, its right axis (Y) maps to screen x and its up axis
//! (Z) to screen y. Screen origin is the top-left corner.
//!
//! Nothing here culls. Points behind the camera have their depth clamped to
//! 1 and come out somewhere on (or far off) the screen; callers that care
//! use [`camera_space`] or [`is_on_screen`].

use crate::engine::{Camera, Transform};
use crate::math::{Matrix4, Vector2, Vector3};
use crate::transform::resolve_world_position;

/// Depth below which points are clamped
pub const MIN_DEPTH: f64 = 1.0;

/// Size of the render surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Construct from components
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel at the middle of the surface
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// Which viewport dimension scales the vertical screen offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScaleBasis {
    /// Half height, matching [`project`]
    #[default]
    Height,
    /// Half width, as the bone path historically did
    Width,
}

/// Knobs for [`project_bone`]
///
/// Older overlay builds drew bones with a fixed 100° field of view and
/// scaled the vertical offset by half the width. Both quirks are opt-in
/// here; the default behaves exactly like [`project`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneProjection {
    /// Replaces the camera's field of view when set
    pub field_of_view: Option<f32>,
    /// Dimension scaling the vertical offset
    pub vertical_basis: ScaleBasis,
}

impl BoneProjection {
    /// Fixed 100° field of view with width-based vertical scaling
    pub const fn legacy() -> Self {
        Self {
            field_of_view: Some(100.0),
            vertical_basis: ScaleBasis::Width,
        }
    }
}

/// `world` in camera space as `(right, up, depth)`, before depth clamping
pub fn camera_space(world: Vector3, camera: &Camera) -> Vector3 {
    let axes = Matrix4::from_rotation(camera.rotation, Vector3::ZERO);
    let delta = world - camera.location;

    Vector3::new(
        delta.dot(axes.axis(1)),
        delta.dot(axes.axis(2)),
        delta.dot(axes.axis(0)),
    )
}

/// Project a world position onto the viewport
pub fn project(world: Vector3, camera: &Camera, viewport: Viewport) -> Vector2 {
    perspective(
        camera_space(world, camera),
        camera.field_of_view,
        viewport,
        ScaleBasis::Height,
    )
}

/// Project a bone given in its mesh's component-to-world frame
pub fn project_bone(
    bone: &Transform,
    parent_frame: &Transform,
    camera: &Camera,
    viewport: Viewport,
    options: &BoneProjection,
) -> Vector2 {
    let world = resolve_world_position(bone, parent_frame);
    let fov = options.field_of_view.unwrap_or(camera.field_of_view);

    perspective(camera_space(world, camera), fov, viewport, options.vertical_basis)
}

/// Whether `point` lies inside `[0, width) x [0, height)`
pub fn is_on_screen(point: Vector2, viewport: Viewport) -> bool {
    point.x >= 0.0
        && point.y >= 0.0
        && point.x < viewport.width as f32
        && point.y < viewport.height as f32
}

fn perspective(
    mut transformed: Vector3,
    field_of_view: f32,
    viewport: Viewport,
    vertical_basis: ScaleBasis,
) -> Vector2 {
    if transformed.z < MIN_DEPTH {
        transformed.z = MIN_DEPTH;
    }

    let half_width = f64::from(viewport.width) / 2.0;
    let half_height = f64::from(viewport.height) / 2.0;
    let tan_half_fov = (f64::from(field_of_view) / 2.0).to_radians().tan();

    let vertical = match vertical_basis {
        ScaleBasis::Height => half_height,
        ScaleBasis::Width => half_width,
    };

    let x = half_width + transformed.x * (half_width / tan_half_fov) / transformed.z;
    let y = half_height - transformed.y * (vertical / tan_half_fov) / transformed.z;

    Vector2::new(x as f32, y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    const FULL_HD: Viewport = Viewport::new(1920, 1080);

    fn origin_camera(fov: f32) -> Camera {
        Camera::new(Vector3::ZERO, Vector3::ZERO, fov)
    }

    fn assert_near(actual: Vector2, expected: Vector2) {
        assert!(
            actual.distance(expected) < 1e-2,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_point_ahead_hits_center() {
        let camera = origin_camera(90.0);
        let screen = project(Vector3::new(10.0, 0.0, 0.0), &camera, FULL_HD);
        assert_near(screen, Vector2::new(960.0, 540.0));
    }

    #[test]
    fn test_axis_permutation() {
        let camera = origin_camera(90.0);

        // Camera Y is screen-right; depth clamps to 1
        let right = project(Vector3::new(0.0, 10.0, 0.0), &camera, FULL_HD);
        assert_near(right, Vector2::new(10560.0, 540.0));

        // Camera Z is screen-up, so y decreases
        let up = project(Vector3::new(100.0, 0.0, 10.0), &camera, FULL_HD);
        assert_near(up, Vector2::new(960.0, 540.0 - 10.0 * 540.0 / 100.0));
    }

    #[test]
    fn test_depth_clamp() {
        let camera = origin_camera(90.0);

        for depth in [0.999, 0.5, 0.0, -3.0, -500.0] {
            let clamped = project(Vector3::new(depth, 3.0, -2.0), &camera, FULL_HD);
            let at_one = project(Vector3::new(1.0, 3.0, -2.0), &camera, FULL_HD);
            assert_eq!(clamped, at_one, "depth {}", depth);
        }
    }

    #[test]
    fn test_camera_space_follows_camera() {
        let camera = Camera::new(
            Vector3::new(100.0, 200.0, 50.0),
            Vector3::new(0.0, 90.0, 0.0),
            90.0,
        );

        // Yawed 90°, the camera looks down +Y
        let local = camera_space(Vector3::new(100.0, 260.0, 50.0), &camera);
        assert!(local.x.abs() < 1e-9);
        assert!(local.y.abs() < 1e-9);
        assert!((local.z - 60.0).abs() < 1e-9);

        assert_near(
            project(Vector3::new(100.0, 260.0, 50.0), &camera, FULL_HD),
            Vector2::new(960.0, 540.0),
        );
    }

    #[test]
    fn test_field_of_view_scales_offset() {
        let point = Vector3::new(100.0, 10.0, 0.0);

        let wide = project(point, &origin_camera(120.0), FULL_HD);
        let narrow = project(point, &origin_camera(60.0), FULL_HD);

        assert!(narrow.x - 960.0 > wide.x - 960.0);
    }

    #[test]
    fn test_bone_default_matches_position_projection() {
        let camera = Camera::new(Vector3::new(-300.0, 20.0, 90.0), Vector3::new(-5.0, 10.0, 0.0), 80.0);
        let bone = Transform::from_translation(Vector3::new(0.0, 0.0, 88.0));
        let frame = Transform::new(
            Quat::from_yaw(45.0),
            Vector3::new(200.0, 50.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        );

        let via_bone = project_bone(&bone, &frame, &camera, FULL_HD, &BoneProjection::default());
        let via_world = project(resolve_world_position(&bone, &frame), &camera, FULL_HD);

        assert_eq!(via_bone, via_world);
    }

    #[test]
    fn test_bone_legacy_overrides() {
        let camera = origin_camera(70.0);
        let bone = Transform::from_translation(Vector3::new(0.0, 5.0, 8.0));
        let frame = Transform::from_translation(Vector3::new(100.0, 0.0, 0.0));

        let screen = project_bone(&bone, &frame, &camera, FULL_HD, &BoneProjection::legacy());

        let scale = 960.0 / 50f64.to_radians().tan();
        let expected = Vector2::new(
            (960.0 + 5.0 * scale / 100.0) as f32,
            (540.0 - 8.0 * scale / 100.0) as f32,
        );
        assert_near(screen, expected);
    }

    #[test]
    fn test_on_screen() {
        assert!(is_on_screen(Vector2::new(0.0, 0.0), FULL_HD));
        assert!(is_on_screen(Vector2::new(1919.5, 1079.5), FULL_HD));
        assert!(!is_on_screen(Vector2::new(1920.0, 10.0), FULL_HD));
        assert!(!is_on_screen(Vector2::new(10.0, -0.1), FULL_HD));
        assert_eq!(FULL_HD.center(), Vector2::new(960.0, 540.0));
    }
}
