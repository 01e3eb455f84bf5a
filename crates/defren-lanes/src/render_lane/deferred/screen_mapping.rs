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

//! Mapping between the used render area and the allocated texture area.
//!
//! Textures are often larger than the area rendered to because they only grow.
//! Shaders receive the ratios below to sample the used area only.

use defren_core::math::{Vec2, Vec4};

/// Texture coordinate parameters for a render area inside larger textures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    width: u32,
    height: u32,
    real_width: u32,
    real_height: u32,
    pixel_size: Vec2,
    fs_quad_offset: Vec2,
    scaling: Vec2,
    clamp: Vec2,
}

impl Default for ScreenMapping {
    fn default() -> Self {
        Self::new(1, 1, 1, 1)
    }
}

impl ScreenMapping {
    /// Computes the mapping of a `width` x `height` area in `real_width` x
    /// `real_height` textures. Zero sizes count as one.
    pub fn new(width: u32, height: u32, real_width: u32, real_height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let (real_width, real_height) = (real_width.max(1), real_height.max(1));
        let (rw, rh) = (real_width as f32, real_height as f32);
        Self {
            width,
            height,
            real_width,
            real_height,
            pixel_size: Vec2::new(1.0 / rw, 1.0 / rh),
            fs_quad_offset: Vec2::new(0.5 / rw, 0.5 / rh),
            scaling: Vec2::new(width as f32 / rw, height as f32 / rh),
            clamp: Vec2::new((width - 1) as f32 / rw, (height - 1) as f32 / rh),
        }
    }

    /// Width of the used area.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the used area.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width of the textures.
    pub fn real_width(&self) -> u32 {
        self.real_width
    }

    /// Height of the textures.
    pub fn real_height(&self) -> u32 {
        self.real_height
    }

    /// Size of one texel in texture coordinates.
    pub fn pixel_size(&self) -> Vec2 {
        self.pixel_size
    }

    /// Half a texel in texture coordinates.
    pub fn fs_quad_offset(&self) -> Vec2 {
        self.fs_quad_offset
    }

    /// The used area over the texture area.
    pub fn scaling(&self) -> Vec2 {
        self.scaling
    }

    /// Texture coordinate of the last used texel.
    pub fn clamp(&self) -> Vec2 {
        self.clamp
    }

    /// Scale and offset turning full screen quad positions into texture coordinates.
    pub fn fs_quad(&self) -> Vec4 {
        let hsu = self.scaling.x * 0.5;
        let hsv = self.scaling.y * 0.5;
        Vec4::new(hsu, hsv, hsu, hsv)
    }

    /// Like [`fs_quad`](Self::fs_quad) for an area of `width` x `height` texels.
    pub fn fs_quad_for_size(&self, width: u32, height: u32) -> Vec4 {
        let hsu = self.pixel_size.x * width as f32 * 0.5;
        let hsv = self.pixel_size.y * height as f32 * 0.5;
        Vec4::new(hsu, hsv, hsu, hsv)
    }

    /// Like [`fs_quad`](Self::fs_quad) for the texel rectangle `(x1, y1)..(x2, y2)`.
    pub fn fs_quad_rect(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> Vec4 {
        let (px, py) = (self.pixel_size.x, self.pixel_size.y);
        Vec4::new(
            px * (x2 as f32 - x1 as f32) * 0.5,
            py * (y2 as f32 - y1 as f32) * 0.5,
            px * (x1 + x2) as f32 * 0.5,
            py * (y1 + y2) as f32 * 0.5,
        )
    }

    /// Like [`fs_quad`](Self::fs_quad) with the vertical axis flipped.
    pub fn fs_quad_upside_down(&self) -> Vec4 {
        let hsu = self.scaling.x * 0.5;
        let hsv = self.scaling.y * 0.5;
        Vec4::new(hsu, -hsv, hsu, hsv)
    }

    /// Factors turning screen coordinates into texture coordinates.
    pub fn sc_to_tc(&self) -> Vec4 {
        Vec4::new(
            self.scaling.x / self.width as f32,
            self.scaling.y / self.height as f32,
            0.0,
            0.0,
        )
    }

    /// Factors turning screen coordinates into full screen texture coordinates.
    pub fn sc_to_fstc(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Scale and offset turning screen coordinates into clip space positions.
    pub fn sc_to_csp(&self) -> Vec4 {
        let (w, h) = (self.width as f32, self.height as f32);
        Vec4::new(2.0 / w, 2.0 / h, 0.5 / w - 1.0, 0.5 / h - 1.0)
    }

    /// The used area as `(min_x, min_y, max_x, max_y)`, either in texture
    /// coordinates or in texels.
    pub fn viewport(&self, normalized: bool) -> Vec4 {
        if normalized {
            Vec4::new(0.0, 0.0, self.clamp.x, self.clamp.y)
        } else {
            Vec4::new(0.0, 0.0, (self.width - 1) as f32, (self.height - 1) as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mapping_of_partially_used_textures() {
        let mapping = ScreenMapping::new(100, 50, 200, 100);

        assert_relative_eq!(mapping.pixel_size().x, 0.005);
        assert_relative_eq!(mapping.fs_quad_offset().y, 0.005);
        assert_relative_eq!(mapping.scaling().x, 0.5);
        assert_relative_eq!(mapping.clamp().x, 99.0 / 200.0);

        let quad = mapping.fs_quad();
        assert_relative_eq!(quad.x, 0.25);
        assert_relative_eq!(quad.w, 0.25);
        assert_relative_eq!(mapping.fs_quad_upside_down().y, -0.25);
    }

    #[test]
    fn quad_helpers_for_sub_areas() {
        let mapping = ScreenMapping::new(100, 100, 100, 100);

        let sized = mapping.fs_quad_for_size(50, 20);
        assert_relative_eq!(sized.x, 0.25);
        assert_relative_eq!(sized.y, 0.1);

        let rect = mapping.fs_quad_rect(10, 20, 30, 60);
        assert_relative_eq!(rect.x, 0.1);
        assert_relative_eq!(rect.y, 0.2);
        assert_relative_eq!(rect.z, 0.2);
        assert_relative_eq!(rect.w, 0.4);
    }

    #[test]
    fn screen_coordinate_factors() {
        let mapping = ScreenMapping::new(64, 32, 128, 64);

        let tc = mapping.sc_to_tc();
        assert_relative_eq!(tc.x, 0.5 / 64.0);
        assert_relative_eq!(mapping.sc_to_fstc().y, 1.0 / 32.0);

        let csp = mapping.sc_to_csp();
        assert_relative_eq!(csp.x, 2.0 / 64.0);
        assert_relative_eq!(csp.w, 0.5 / 32.0 - 1.0);

        assert_eq!(mapping.viewport(false), Vec4::new(0.0, 0.0, 63.0, 31.0));
        assert_relative_eq!(mapping.viewport(true).z, 63.0 / 128.0);
    }
}
