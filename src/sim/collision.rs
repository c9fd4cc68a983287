//! Collision detection for the continuous games
//!
//! Every moving body is tested against obstacles over the whole displacement
//! of a step (swept tests), never only at its post-move position, so fast
//! bodies cannot tunnel through thin paddles or targets between steps.

use glam::Vec2;
use serde::{Deserialize, Serialize};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Axis-aligned bounding box (screen coordinates, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its top-left corner and size (canvas `fillRect` convention)
    pub fn from_corner(corner: Vec2, size: Vec2) -> Self {
        Self {
            min: corner,
            max: corner + size,
        }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_size(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Box grown by `half` on every side (Minkowski sum with a box)
    pub fn expanded(&self, half: Vec2) -> Self {
        Self {
            min: self.min - half,
            max: self.max + half,
        }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Strict overlap; touching edges do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Strict containment of a point
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }
}

/// Earliest contact found by a swept test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the displacement travelled before contact, in [0, 1]
    pub time: f32,
    /// Surface normal of the face that was hit (zero when already overlapping)
    pub normal: Vec2,
}

/// Cast a point along `delta` against a box (slab method)
pub fn ray_aabb(origin: Vec2, delta: Vec2, target: &Aabb) -> Option<SweepHit> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], delta[axis], target.min[axis], target.max[axis]);
        if d.abs() < PARALLEL_EPSILON {
            if o <= lo || o >= hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (mut t1, mut t2) = ((lo - o) * inv, (hi - o) * inv);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_enter {
            t_enter = t1;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit <= 0.0 || t_enter > 1.0 {
        return None;
    }
    if t_enter < 0.0 {
        // Started inside
        return Some(SweepHit {
            time: 0.0,
            normal: Vec2::ZERO,
        });
    }
    Some(SweepHit {
        time: t_enter,
        normal,
    })
}

/// Sweep a moving box along `delta` against a static box
///
/// For two moving boxes pass the relative displacement.
pub fn sweep_aabb(moving: &Aabb, delta: Vec2, target: &Aabb) -> Option<SweepHit> {
    if moving.overlaps(target) {
        return Some(SweepHit {
            time: 0.0,
            normal: Vec2::ZERO,
        });
    }
    ray_aabb(moving.center(), delta, &target.expanded(moving.half_size()))
}

/// First fraction of the segment `from -> to` that comes within `radius` of `center`
///
/// Returns `Some(0.0)` when the segment starts inside the circle.
pub fn segment_hits_circle(from: Vec2, to: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = to - from;
    let f = from - center;
    let c = f.length_squared() - radius * radius;
    if c < 0.0 {
        return Some(0.0);
    }

    let a = d.length_squared();
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let t = (-b - disc.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Center-distance test (strict)
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) < radius * radius
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    point_in_circle(a, b, ra + rb)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
