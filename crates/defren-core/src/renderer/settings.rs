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

//! Global settings for the deferred renderer.

use crate::math::{Extent2D, Point3};
use serde::{Deserialize, Serialize};

/// Smallest value a non-zero size limit is raised to.
pub const MIN_SIZE_LIMIT: u32 = 256;

/// The texture layout used by the depth min/max pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthMinMaxStrategy {
    /// One two-channel float texture, minimum in red and maximum in green.
    PackedTwoChannel,
    /// One single-channel float texture each for minimum and maximum.
    SeparateTextures,
    /// One single-channel float texture of doubled width, minimum on the left half.
    DoubledWidth,
}

/// Tuning of the ray-trace probe field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayTraceFieldSettings {
    /// Target distance between two probes in world units.
    pub probe_spacing: f32,
    /// Upper bound for the number of usable cells along each axis.
    pub max_cells: Point3,
    /// Number of rays traced per probe.
    pub rays_per_probe: u32,
    /// Number of probes stored on one line of the ray sample image.
    pub probes_per_line: u32,
    /// Size in texels of the square atlas tile of one probe, gutter excluded.
    pub tile_size: u32,
}

impl Default for RayTraceFieldSettings {
    fn default() -> Self {
        Self {
            probe_spacing: 1.0,
            max_cells: Point3::new(29, 13, 29),
            rays_per_probe: 64,
            probes_per_line: 4,
            tile_size: 8,
        }
    }
}

/// A collection of global settings that affect the deferred renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Prefer reversed depth (near = 1, far = 0) when the device supports it.
    pub use_inverse_depth: bool,
    /// Encode depth into color targets. Not supported; enabling it only turns
    /// inverse depth off.
    pub use_encoded_depth: bool,
    /// Round render target sizes up to powers of two.
    pub use_pot_sizes: bool,
    /// Clamp the longest side of the render size to this value, 0 for no limit.
    pub size_limit: u32,
    /// Integer factor the render size is divided by.
    pub render_down_scale: u32,
    /// Layout of the depth min/max pyramid, `None` disables it.
    ///
    /// Experimental: the layouts have not been validated on a broad range of
    /// hardware, keep this off in production.
    pub depth_min_max: Option<DepthMinMaxStrategy>,
    /// Maximum number of GPU objects deleted per frame, `None` deletes all.
    pub delete_objects_per_frame: Option<usize>,
    /// Probe field tuning.
    pub ray_trace_field: RayTraceFieldSettings,
    /// Free debug switch settable from the console.
    pub quick_debug: i32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            use_inverse_depth: true,
            use_encoded_depth: false,
            use_pot_sizes: false,
            size_limit: 0,
            render_down_scale: 1,
            depth_min_max: None,
            delete_objects_per_frame: None,
            ray_trace_field: RayTraceFieldSettings::default(),
            quick_debug: 0,
        }
    }
}

impl RenderSettings {
    /// Applies the down-scale factor and the size limit to a requested render size.
    ///
    /// The longest side is clamped to the limit and the other side is scaled by
    /// the same ratio. Sides never drop below one pixel.
    pub fn limit_render_size(&self, width: u32, height: u32) -> Extent2D {
        let scale = self.render_down_scale.max(1);
        let mut width = (width / scale).max(1);
        let mut height = (height / scale).max(1);

        if self.size_limit > 0 {
            let limit = self.size_limit.max(MIN_SIZE_LIMIT);
            if width > limit || height > limit {
                if width >= height {
                    height = ((height as u64 * limit as u64) / width as u64).max(1) as u32;
                    width = limit;
                } else {
                    width = ((width as u64 * limit as u64) / height as u64).max(1) as u32;
                    height = limit;
                }
            }
        }

        Extent2D::new(width, height)
    }
}
