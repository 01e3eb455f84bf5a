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

//! Hierarchical minimum/maximum depth.
//!
//! Every level stores, per texel, the minimum and maximum depth over the 2x2
//! texels of the level below. Level 0 covers the depth buffer at half its size.
//! The layout of the two values depends on the [`DepthMinMaxStrategy`].

use super::framebuffer::Framebuffer;
use super::framebuffer_manager::FramebufferManager;
use super::texture::{level_count, RenderTexture};
use crate::delayed::DelayedOperations;
use defren_core::math::{Extent2D, Vec2};
use defren_core::renderer::{
    DepthMinMaxStrategy, GraphicsDevice, RenderError, TextureDescriptor, TextureFormat,
};
use std::sync::Arc;

#[derive(Debug)]
enum Textures {
    Packed(RenderTexture),
    Separate { min: RenderTexture, max: RenderTexture },
    Doubled(RenderTexture),
}

/// The depth min/max pyramid.
#[derive(Debug)]
pub struct DepthMinMax {
    device: Arc<dyn GraphicsDevice>,
    delayed: Arc<DelayedOperations>,
    strategy: DepthMinMaxStrategy,
    width: u32,
    height: u32,
    level_count: u32,
    textures: Textures,
    // One framebuffer per level, created on first activation.
    framebuffers: Vec<Option<Framebuffer>>,
}

impl DepthMinMax {
    /// Allocates the pyramid for a level 0 of `width` x `height`, limited to
    /// `max_levels` levels.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        delayed: Arc<DelayedOperations>,
        strategy: DepthMinMaxStrategy,
        width: u32,
        height: u32,
        max_levels: u32,
    ) -> Result<Self, RenderError> {
        if width < 1 || height < 1 {
            return Err(RenderError::invalid_parameter(format!(
                "depth min/max size {width}x{height} must be at least 1x1"
            )));
        }
        if max_levels < 1 {
            return Err(RenderError::invalid_parameter("depth min/max needs at least one level"));
        }

        let mut levels = level_count(width, height).min(max_levels);
        if strategy == DepthMinMaxStrategy::DoubledWidth {
            // The max half needs its own texel on every level.
            levels = levels.min(level_count(width, 1));
        }
        let make = |label: &'static str, w: u32, format: TextureFormat| {
            RenderTexture::new(
                device.as_ref(),
                &delayed,
                TextureDescriptor::new_2d(label, w, height, format).with_mip_levels(levels),
            )
        };
        let textures = match strategy {
            DepthMinMaxStrategy::PackedTwoChannel => {
                Textures::Packed(make("DepthMinMax", width, TextureFormat::Rg32Float)?)
            }
            DepthMinMaxStrategy::SeparateTextures => Textures::Separate {
                min: make("DepthMinMax.Min", width, TextureFormat::R32Float)?,
                max: make("DepthMinMax.Max", width, TextureFormat::R32Float)?,
            },
            DepthMinMaxStrategy::DoubledWidth => {
                Textures::Doubled(make("DepthMinMax", width * 2, TextureFormat::R32Float)?)
            }
        };

        log::debug!("DefRen: Depth min/max {strategy:?} {width}x{height} with {levels} levels");

        Ok(Self {
            device,
            delayed,
            strategy,
            width,
            height,
            level_count: levels,
            textures,
            framebuffers: (0..levels).map(|_| None).collect(),
        })
    }

    /// The texture layout.
    pub fn strategy(&self) -> DepthMinMaxStrategy {
        self.strategy
    }

    /// Width of level 0.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of level 0.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of levels.
    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    fn check_level(&self, level: u32) -> Result<(), RenderError> {
        if level >= self.level_count {
            return Err(RenderError::invalid_parameter(format!(
                "depth min/max level {level} out of range (level count {})",
                self.level_count
            )));
        }
        Ok(())
    }

    /// The size of `level` as seen by shaders, excluding the doubled width.
    pub fn level_size(&self, level: u32) -> Result<Extent2D, RenderError> {
        self.check_level(level)?;
        Ok(Extent2D::new(self.width, self.height).mip_level(level))
    }

    /// The x offset of the maximum values inside `level`.
    ///
    /// Only the doubled width layout stores both values side by side; the
    /// other layouts return 0.
    pub fn texel_offset_for_max(&self, level: u32) -> Result<u32, RenderError> {
        let size = self.level_size(level)?;
        Ok(match self.strategy {
            DepthMinMaxStrategy::DoubledWidth => size.width,
            _ => 0,
        })
    }

    /// The single texture of the packed and doubled layouts.
    pub fn texture(&self) -> Option<&RenderTexture> {
        match &self.textures {
            Textures::Packed(texture) | Textures::Doubled(texture) => Some(texture),
            Textures::Separate { .. } => None,
        }
    }

    /// The minimum texture of the separate layout.
    pub fn texture_min(&self) -> Option<&RenderTexture> {
        match &self.textures {
            Textures::Separate { min, .. } => Some(min),
            _ => None,
        }
    }

    /// The maximum texture of the separate layout.
    pub fn texture_max(&self) -> Option<&RenderTexture> {
        match &self.textures {
            Textures::Separate { max, .. } => Some(max),
            _ => None,
        }
    }

    /// Binds the framebuffer writing `level`.
    ///
    /// With separate textures the minimum goes to color 0 and the maximum to
    /// color 1.
    pub fn activate_level(
        &mut self,
        manager: &mut FramebufferManager,
        level: u32,
    ) -> Result<(), RenderError> {
        self.check_level(level)?;
        let index = level as usize;

        if self.framebuffers[index].is_none() {
            let size = Extent2D::new(self.width, self.height).mip_level(level);
            let mut framebuffer = Framebuffer::new(
                Arc::clone(&self.device),
                Arc::clone(&self.delayed),
                format!("DepthMinMax.Level{level}"),
            )?;
            framebuffer.set_usage_resolution(size.width, size.height)?;
            match &self.textures {
                Textures::Packed(texture) | Textures::Doubled(texture) => {
                    framebuffer.attach_color_texture_level(0, texture, level)?;
                }
                Textures::Separate { min, max } => {
                    framebuffer.attach_color_texture_level(0, min, level)?;
                    framebuffer.attach_color_texture_level(1, max, level)?;
                }
            }
            framebuffer.update_read_write_buffers()?;
            framebuffer.verify()?;
            self.framebuffers[index] = Some(framebuffer);
        }

        match &self.framebuffers[index] {
            Some(framebuffer) => manager.activate(framebuffer),
            None => Err(RenderError::Internal(format!("depth min/max level {level} has no framebuffer"))),
        }
    }

    /// GPU memory used by the textures in bytes.
    pub fn memory_usage(&self) -> u64 {
        match &self.textures {
            Textures::Packed(texture) | Textures::Doubled(texture) => texture.memory_usage(),
            Textures::Separate { min, max } => min.memory_usage() + max.memory_usage(),
        }
    }

    /// Factors turning render texture coordinates into pyramid coordinates for
    /// render textures of `real_width` x `real_height`.
    pub fn tc_factor(&self, real_width: u32, real_height: u32) -> Vec2 {
        Vec2::new(
            0.5 * real_width as f32 / self.width as f32,
            0.5 * real_height as f32 / self.height as f32,
        )
    }
}
