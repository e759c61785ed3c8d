use glam::Vec3;

const MAX_LEAF_COUNT: usize = 8;

/// Axis aligned box, used both for object space entity bounds and BVH nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any `expand` call will overwrite.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Aabb::empty();
        for &p in points {
            aabb.expand(p);
        }
        aabb
    }

    pub fn expand(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn ray_intersect(&self, origin: Vec3, inv_dir: Vec3, max_t: f32) -> bool {
        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;

        let tmin = t1.min(t2);
        let tmax = t1.max(t2);

        let t_min = tmin.x.max(tmin.y).max(tmin.z);
        let t_max = tmax.x.min(tmax.y).min(tmax.z);

        t_min <= t_max && t_min <= max_t && t_max >= 0.0
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&[self.v0, self.v1, self.v2])
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) * (1.0 / 3.0)
    }

    /// Möller-Trumbore, returns the distance along `dir`.
    pub fn ray_intersect(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1e-6;
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = dir.cross(edge2);
        let a = edge1.dot(h);

        if a > -EPSILON && a < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * dir.dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t > EPSILON { Some(t) } else { None }
    }
}

#[derive(Debug)]
enum BvhNode {
    Branch {
        left: usize,
        right: usize,
        aabb: Aabb,
    },
    Leaf {
        primitives: Vec<usize>,
        aabb: Aabb,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb {
        match self {
            BvhNode::Branch { aabb, .. } => aabb,
            BvhNode::Leaf { aabb, .. } => aabb,
        }
    }
}

/// Static world geometry, used to answer visibility and trace queries
/// when the game does not provide its own.
#[derive(Debug, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<Triangle>,
    root: Option<usize>,
}

impl Bvh {
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let mut bvh = Self {
            nodes: Vec::new(),
            triangles,
            root: None,
        };
        bvh.build();
        bvh
    }

    fn build(&mut self) {
        if self.triangles.is_empty() {
            self.root = None;
            return;
        }

        let mut primitives: Vec<usize> = (0..self.triangles.len()).collect();
        self.nodes.clear();
        self.root = Some(self.build_recursive(&mut primitives));
    }

    fn build_recursive(&mut self, primitives: &mut [usize]) -> usize {
        if primitives.len() <= MAX_LEAF_COUNT {
            let aabb = primitives.iter().fold(Aabb::empty(), |acc, &idx| {
                acc.merge(&self.triangles[idx].aabb())
            });
            return self.create_leaf(primitives, aabb);
        }

        let centroid_bounds = primitives.iter().fold(Aabb::empty(), |mut acc, &idx| {
            acc.expand(self.triangles[idx].centroid());
            acc
        });

        let extent = centroid_bounds.max - centroid_bounds.min;
        let axis = if extent.x > extent.y && extent.x > extent.z {
            0
        } else if extent.y > extent.z {
            1
        } else {
            2
        };

        primitives.sort_by(|&a_idx, &b_idx| {
            let a_cent = self.triangles[a_idx].centroid();
            let b_cent = self.triangles[b_idx].centroid();
            a_cent[axis].total_cmp(&b_cent[axis])
        });

        let mid = primitives.len() / 2;
        let (left_prims, right_prims) = primitives.split_at_mut(mid);

        let left = self.build_recursive(left_prims);
        let right = self.build_recursive(right_prims);

        let aabb = self.nodes[left].aabb().merge(self.nodes[right].aabb());
        self.nodes.push(BvhNode::Branch { left, right, aabb });
        self.nodes.len() - 1
    }

    fn create_leaf(&mut self, primitives: &[usize], aabb: Aabb) -> usize {
        self.nodes.push(BvhNode::Leaf {
            primitives: primitives.to_vec(),
            aabb,
        });
        self.nodes.len() - 1
    }

    pub fn has_line_of_sight(&self, start: Vec3, end: Vec3) -> bool {
        self.first_hit(start, end).is_none()
    }

    /// Traces from `start` to `end`, returning where the segment first hits geometry,
    /// or `end` if nothing is in the way.
    pub fn trace(&self, start: Vec3, end: Vec3) -> Vec3 {
        match self.first_hit(start, end) {
            Some(t) => start + (end - start).normalize() * t,
            None => end,
        }
    }

    fn first_hit(&self, start: Vec3, end: Vec3) -> Option<f32> {
        let dir = end - start;
        let distance = dir.length();
        if distance <= f32::EPSILON {
            return None;
        }

        let dir_norm = dir / distance;
        let inv_dir = 1.0 / dir_norm;

        let root = self.root?;
        self.segment_intersect_node(root, start, dir_norm, inv_dir, distance)
    }

    fn segment_intersect_node(
        &self,
        node_idx: usize,
        origin: Vec3,
        direction: Vec3,
        inv_dir: Vec3,
        max_t: f32,
    ) -> Option<f32> {
        let node = &self.nodes[node_idx];

        if !node.aabb().ray_intersect(origin, inv_dir, max_t) {
            return None;
        }

        match node {
            BvhNode::Leaf { primitives, .. } => primitives
                .iter()
                .filter_map(|&idx| self.triangles[idx].ray_intersect(origin, direction))
                .filter(|t| *t <= max_t)
                .min_by(f32::total_cmp),
            BvhNode::Branch { left, right, .. } => {
                let left = self.segment_intersect_node(*left, origin, direction, inv_dir, max_t);
                let right = self.segment_intersect_node(*right, origin, direction, inv_dir, max_t);
                match (left, right) {
                    (Some(l), Some(r)) => Some(l.min(r)),
                    (l, r) => l.or(r),
                }
            }
        }
    }
}
