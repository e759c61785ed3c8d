use glam::{Mat4, Vec2, Vec3, Vec4};

const UNITS_TO_METERS: f32 = 0.0254;

/// Projects a world position to screen space, snapped to whole pixels.
///
/// `view_matrix` is the world-to-screen matrix as laid out in game memory,
/// row major, so `x_axis` holds the first row and `w_axis` the last.
/// Returns `None` when the point is behind (or on) the camera plane.
pub fn world_to_screen(position: Vec3, view_matrix: &Mat4, screen_size: Vec2) -> Option<Vec2> {
    world_to_screen_exact(position, view_matrix, screen_size).map(Vec2::floor)
}

/// Same as [`world_to_screen`], without snapping to whole pixels.
pub fn world_to_screen_exact(
    position: Vec3,
    view_matrix: &Mat4,
    screen_size: Vec2,
) -> Option<Vec2> {
    let vm = view_matrix;
    let w = vm.w_axis.x * position.x
        + vm.w_axis.y * position.y
        + vm.w_axis.z * position.z
        + vm.w_axis.w;

    if w < 0.001 {
        return None;
    }

    let x = vm.x_axis.x * position.x
        + vm.x_axis.y * position.y
        + vm.x_axis.z * position.z
        + vm.x_axis.w;
    let y = vm.y_axis.x * position.x
        + vm.y_axis.y * position.y
        + vm.y_axis.z * position.z
        + vm.y_axis.w;

    let half_size = screen_size * 0.5;
    Some(Vec2::new(
        half_size.x * (1.0 + x / w),
        half_size.y * (1.0 - y / w),
    ))
}

/// Returns true when the box lies entirely outside one of the view frustum planes.
pub fn cull_box(mins: Vec3, maxs: Vec3, view_matrix: &Mat4) -> bool {
    let rows = [
        view_matrix.x_axis,
        view_matrix.y_axis,
        view_matrix.z_axis,
        view_matrix.w_axis,
    ];

    let corners: [Vec4; 8] = std::array::from_fn(|i| {
        let point = Vec3::new(
            if i & 1 != 0 { maxs.x } else { mins.x },
            if i & 2 != 0 { maxs.y } else { mins.y },
            if i & 4 != 0 { maxs.z } else { mins.z },
        )
        .extend(1.0);
        Vec4::new(
            rows[0].dot(point),
            rows[1].dot(point),
            rows[2].dot(point),
            rows[3].dot(point),
        )
    });

    // clip space planes: -w <= x <= w, -w <= y <= w, 0 < w
    let outside = |test: fn(&Vec4) -> bool| corners.iter().all(test);
    outside(|c| c.w < 0.001)
        || outside(|c| c.x > c.w)
        || outside(|c| c.x < -c.w)
        || outside(|c| c.y > c.w)
        || outside(|c| c.y < -c.w)
}

/// Forward vector for pitch/yaw angles given in degrees (x = pitch, y = yaw).
pub fn vector_from_angle(angles: Vec3) -> Vec3 {
    let pitch = angles.x.to_radians();
    let yaw = angles.y.to_radians();
    Vec3::new(
        pitch.cos() * yaw.cos(),
        pitch.cos() * yaw.sin(),
        -pitch.sin(),
    )
}

pub fn units_to_meters(units: f32) -> f32 {
    units * UNITS_TO_METERS
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Camera at the origin looking down +x, +z up, 90 degree fov.
    pub fn forward_camera() -> Mat4 {
        Mat4::from_cols(
            Vec4::new(0.0, -1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 0.0),
            Vec4::new(1.0, 0.0, 0.0, 0.0),
        )
    }

    const SCREEN: Vec2 = Vec2::new(1920.0, 1080.0);

    #[test]
    fn point_ahead_projects_to_center() {
        let pos = world_to_screen(Vec3::new(100.0, 0.0, 0.0), &forward_camera(), SCREEN).unwrap();
        assert_eq!(pos, Vec2::new(960.0, 540.0));
    }

    #[test]
    fn point_left_and_up_moves_left_and_up() {
        let pos = world_to_screen(Vec3::new(100.0, 50.0, 50.0), &forward_camera(), SCREEN).unwrap();
        assert!(pos.x < 960.0);
        assert!(pos.y < 540.0);
    }

    #[test]
    fn point_behind_camera_is_unprojectable() {
        assert!(world_to_screen(Vec3::new(-10.0, 0.0, 0.0), &forward_camera(), SCREEN).is_none());
        assert!(world_to_screen(Vec3::ZERO, &forward_camera(), SCREEN).is_none());
    }

    #[test]
    fn cull_box_outside_and_inside() {
        let vm = forward_camera();
        assert!(!cull_box(Vec3::new(90.0, -5.0, -5.0), Vec3::new(110.0, 5.0, 5.0), &vm));
        assert!(cull_box(Vec3::new(-110.0, -5.0, -5.0), Vec3::new(-90.0, 5.0, 5.0), &vm));
        // far to the right of the view cone
        assert!(cull_box(Vec3::new(10.0, -500.0, -5.0), Vec3::new(20.0, -400.0, 5.0), &vm));
    }

    #[test]
    fn angle_to_vector() {
        let forward = vector_from_angle(Vec3::new(0.0, 90.0, 0.0));
        assert_relative_eq!(forward.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.y, 1.0, epsilon = 1e-6);

        let down = vector_from_angle(Vec3::new(90.0, 0.0, 0.0));
        assert_relative_eq!(down.z, -1.0, epsilon = 1e-6);
    }
}
