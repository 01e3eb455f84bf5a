// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides geometric primitives for bounding volumes.

use super::vector::Vec3;
use serde::{Deserialize, Serialize};

/// An Axis-Aligned Bounding Box (AABB).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new `Aabb` from two corner points.
    ///
    /// The corners may be passed in any order; `min` receives the component-wise
    /// minimum and `max` the component-wise maximum.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Size of the box along each axis.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns `true` if `point` lies inside the box, borders included.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.z >= self.min.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_min_max_orders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(4.0, -1.0, 2.0), Vec3::new(-4.0, 1.0, 0.0));
        assert_eq!(aabb.min, Vec3::new(-4.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 1.0, 2.0));
        assert_eq!(aabb.extent(), Vec3::new(8.0, 2.0, 2.0));
        assert!(aabb.contains(Vec3::ZERO));
        assert!(!aabb.contains(Vec3::new(0.0, 2.0, 0.0)));
    }
}
