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

//! Provides the small set of math primitives the renderer needs.
//!
//! Vectors are `f32`, grid coordinates are `i32` and projection matrices are
//! built in `f64` so that an infinite far plane keeps its precision before the
//! values are narrowed for upload.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f64::consts::PI;

pub mod dimension;
pub mod geometry;
pub mod matrix;
pub mod vector;

pub use self::dimension::{Extent2D, Extent3D};
pub use self::geometry::Aabb;
pub use self::matrix::DMat4;
pub use self::vector::{Point3, Vec2, Vec3, Vec4};
