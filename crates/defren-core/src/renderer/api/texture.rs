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

use crate::math::{Extent2D, Extent3D};
use std::borrow::Cow;

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// Specifies the memory format of the texels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Two 8-bit unsigned normalized components.
    Rg8Unorm,
    /// Four 8-bit unsigned normalized components.
    Rgba8Unorm,
    /// One 16-bit float component.
    R16Float,
    /// Two 16-bit float components.
    Rg16Float,
    /// Four 16-bit float components.
    Rgba16Float,
    /// One 32-bit float component.
    R32Float,
    /// Two 32-bit float components.
    Rg32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// A 16-bit unsigned normalized depth format.
    Depth16Unorm,
    /// A depth format with at least 24 bits of precision.
    Depth24Plus,
    /// A depth format with at least 24 bits plus an 8-bit stencil.
    Depth24PlusStencil8,
    /// A 32-bit float depth format.
    Depth32Float,
    /// A 32-bit float depth format with an 8-bit stencil.
    Depth32FloatStencil8,
}

impl TextureFormat {
    /// Returns the size in bytes of a single texel.
    pub const fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rg8Unorm => 2,
            TextureFormat::Rgba8Unorm => 4,
            TextureFormat::R16Float => 2,
            TextureFormat::Rg16Float => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::R32Float => 4,
            TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Depth16Unorm => 2,
            TextureFormat::Depth24Plus => 4,
            TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Depth32Float => 4,
            TextureFormat::Depth32FloatStencil8 => 5,
        }
    }

    /// Returns `true` for formats that can only be attached as depth.
    pub const fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16Unorm
                | TextureFormat::Depth24Plus
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32Float
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` for depth formats carrying a stencil aspect.
    pub const fn has_stencil(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth24PlusStencil8 | TextureFormat::Depth32FloatStencil8
        )
    }
}

/// The shape of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureKind {
    /// A single 2D image.
    #[default]
    D2,
    /// Six square 2D faces.
    CubeMap,
    /// A stack of 2D layers.
    D2Array,
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    /// An optional debug label.
    pub label: Option<Cow<'static, str>>,
    /// The dimensions of level 0. The third component is the layer count
    /// (six for cube maps).
    pub size: Extent3D,
    /// The number of mip levels, at least 1.
    pub mip_level_count: u32,
    /// The shape of the texture.
    pub kind: TextureKind,
    /// The texel format.
    pub format: TextureFormat,
}

impl TextureDescriptor {
    /// Describes a single level 2D texture.
    pub fn new_2d(
        label: impl Into<Cow<'static, str>>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: Some(label.into()),
            size: Extent3D::new(width, height, 1),
            mip_level_count: 1,
            kind: TextureKind::D2,
            format,
        }
    }

    /// Describes a single level array texture.
    pub fn new_array(
        label: impl Into<Cow<'static, str>>,
        width: u32,
        height: u32,
        layers: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            size: Extent3D::new(width, height, layers),
            kind: TextureKind::D2Array,
            ..Self::new_2d(label, width, height, format)
        }
    }

    /// Describes a single level cube map with square faces.
    pub fn new_cube(label: impl Into<Cow<'static, str>>, size: u32, format: TextureFormat) -> Self {
        Self {
            size: Extent3D::new(size, size, 6),
            kind: TextureKind::CubeMap,
            ..Self::new_2d(label, size, size, format)
        }
    }

    /// Replaces the mip level count.
    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.mip_level_count = count.max(1);
        self
    }

    /// Number of layers (cube faces count as layers).
    pub fn layer_count(&self) -> u32 {
        self.size.depth_or_array_layers
    }

    /// Returns the extent of mip `level`.
    pub fn level_size(&self, level: u32) -> Extent2D {
        self.size.to_2d().mip_level(level)
    }

    /// Number of bytes the texture occupies across every level and layer.
    pub fn memory_size(&self) -> u64 {
        let bpp = self.format.bytes_per_pixel() as u64;
        let layers = self.layer_count() as u64;
        (0..self.mip_level_count)
            .map(|level| {
                let size = self.level_size(level);
                bpp * size.width as u64 * size.height as u64 * layers
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_formats() {
        assert!(TextureFormat::Depth32FloatStencil8.is_depth());
        assert!(TextureFormat::Depth32FloatStencil8.has_stencil());
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(!TextureFormat::Depth32Float.has_stencil());
        assert!(!TextureFormat::Rgba16Float.is_depth());
    }

    #[test]
    fn memory_size_sums_levels() {
        let desc = TextureDescriptor::new_2d("t", 4, 2, TextureFormat::Rgba8Unorm).with_mip_levels(3);
        // 4x2 + 2x1 + 1x1 texels, 4 bytes each
        assert_eq!(desc.memory_size(), (8 + 2 + 1) * 4);
    }

    #[test]
    fn cube_maps_count_six_layers() {
        let desc = TextureDescriptor::new_cube("env", 16, TextureFormat::R8Unorm);
        assert_eq!(desc.layer_count(), 6);
        assert_eq!(desc.memory_size(), 16 * 16 * 6);
    }
}
