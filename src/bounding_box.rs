use std::cmp::Ordering;

use glam::{Affine3A, Mat4, Vec2, Vec3};

use crate::{game_data::BaseData, math::world_to_screen};

/// Screen space projection of an entity's oriented bounding box.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    valid: bool,
    pub min: Vec2,
    pub max: Vec2,
    /// Corner `i` takes max x if bit 0 is set, max y for bit 1, max z for bit 2.
    pub vertices: [Vec2; 8],
}

impl BoundingBox {
    /// Projects the box spanned by `mins`/`maxs`. A per-axis `scale` of 0.25 keeps
    /// the box as is, lower values shrink it about its center, higher values grow it.
    pub fn new(
        mins: Vec3,
        maxs: Vec3,
        scale: [f32; 3],
        transform: Option<&Affine3A>,
        view_matrix: &Mat4,
        screen_size: Vec2,
    ) -> Self {
        let mut bbox = Self {
            valid: false,
            min: Vec2::splat(f32::MAX),
            max: Vec2::splat(-f32::MAX),
            vertices: [Vec2::ZERO; 8],
        };

        let factor = 2.0 * (0.25 - Vec3::from_array(scale));
        let scaled_mins = mins + (maxs - mins) * factor;
        let scaled_maxs = maxs - (maxs - mins) * factor;

        for i in 0..8 {
            let point = Vec3::new(
                if i & 1 != 0 { scaled_maxs.x } else { scaled_mins.x },
                if i & 2 != 0 { scaled_maxs.y } else { scaled_mins.y },
                if i & 4 != 0 { scaled_maxs.z } else { scaled_mins.z },
            );
            let point = match transform {
                Some(transform) => transform.transform_point3(point),
                None => point,
            };

            let Some(vertex) = world_to_screen(point, view_matrix, screen_size) else {
                return bbox;
            };

            bbox.vertices[i] = vertex;
            bbox.min = bbox.min.min(vertex);
            bbox.max = bbox.max.max(vertex);
        }

        bbox.valid = true;
        bbox
    }

    /// Box around a record's cached object space bounds, in its coordinate frame.
    pub fn from_base(
        data: &BaseData,
        scale: [f32; 3],
        view_matrix: &Mat4,
        screen_size: Vec2,
    ) -> Self {
        Self::new(
            data.obb_mins,
            data.obb_maxs,
            scale,
            Some(&data.coordinate_frame),
            view_matrix,
            screen_size,
        )
    }

    /// Small fixed size marker around a world point.
    pub fn around_point(center: Vec3, view_matrix: &Mat4, screen_size: Vec2) -> Self {
        Self::new(
            center - 2.0,
            center + 2.0,
            [0.25; 3],
            None,
            view_matrix,
            screen_size,
        )
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Index pairs of the 12 box edges.
    pub fn edges() -> impl Iterator<Item = (usize, usize)> {
        (0..8).flat_map(|i| {
            [1, 2, 4]
                .into_iter()
                .filter(move |j| i & j == 0)
                .map(move |j| (i, i + j))
        })
    }
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Graham scan over projected box corners. The hull is returned clockwise on
/// screen (y pointing down), which is the winding the anti-aliased polygon fill expects.
/// Degenerate input yields fewer than three points.
pub fn convex_hull(mut points: [Vec2; 8]) -> Vec<Vec2> {
    let pivot = (0..points.len())
        .min_by(|&a, &b| {
            let (a, b) = (points[a], points[b]);
            a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
        })
        .unwrap_or(0);
    points.swap(0, pivot);

    let pivot = points[0];
    points[1..].sort_by(|&a, &b| {
        let o = orientation(pivot, a, b);
        if o == 0.0 {
            pivot
                .distance_squared(a)
                .total_cmp(&pivot.distance_squared(b))
        } else if o < 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    });

    let mut hull: Vec<Vec2> = Vec::with_capacity(points.len());
    for p in points {
        while hull.len() >= 2 && orientation(hull[hull.len() - 2], hull[hull.len() - 1], p) >= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.reverse();
    hull
}
