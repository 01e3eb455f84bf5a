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

//! The deferred rendering target composer.
//!
//! [`DeferredRendering`] owns the screen sized buffers every deferred pass
//! renders into and hands out framebuffers for the attachment combinations of
//! the [`RenderTarget`] catalog. Framebuffers are built on first use, verified
//! once and kept until the buffers are reallocated.
//!
//! Buffers only ever grow. A smaller request just changes the used area and the
//! [`ScreenMapping`] shaders use to stay inside it.

mod double_buffer;
mod projection;
mod screen_mapping;
mod targets;

pub use double_buffer::DoubleBuffer;
pub use projection::{create_frustum_matrix, create_projection_matrix, DepthCompare, DepthConvention};
pub use screen_mapping::ScreenMapping;
pub use targets::{DepthSlot, GBuffer, RenderTarget, TargetSet};

use super::depth_min_max::DepthMinMax;
use super::framebuffer::Framebuffer;
use super::framebuffer_manager::FramebufferManager;
use super::texture::{level_count, RenderTexture};
use crate::delayed::DelayedOperations;
use ahash::AHashMap;
use defren_core::math::{DMat4, Extent2D};
use defren_core::renderer::{
    BlitMask, DepthMinMaxStrategy, FramebufferId, GraphicsDevice, RenderError, RenderSettings,
    TextureDescriptor, TextureFormat,
};
use std::sync::Arc;

/// The size of the luminance buffers.
pub const LUMINANCE_SIZE: Extent2D = Extent2D::new(128, 64);

/// The size buffers are allocated with before the first resize.
pub const INITIAL_SIZE: Extent2D = Extent2D::new(64, 64);

/// The maximum number of levels of the depth min/max pyramid.
pub const DEPTH_MIN_MAX_MAX_LEVELS: u32 = 11;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32FloatStencil8;

/// Owns the deferred rendering buffers and their framebuffers.
#[derive(Debug)]
pub struct DeferredRendering {
    device: Arc<dyn GraphicsDevice>,
    delayed: Arc<DelayedOperations>,
    max_draw_buffers: u32,
    use_pot_sizes: bool,
    depth_min_max_strategy: Option<DepthMinMaxStrategy>,
    convention: DepthConvention,

    // Framebuffers go first so they are queued for deletion before the textures.
    targets: AHashMap<TargetSet, Framebuffer>,
    depth_level_targets: AHashMap<(DepthSlot, u32), Framebuffer>,
    colors: AHashMap<GBuffer, RenderTexture>,
    depths: AHashMap<DepthSlot, RenderTexture>,
    depth_min_max: Option<DepthMinMax>,

    depth: DoubleBuffer<DepthSlot>,
    post_process: DoubleBuffer<GBuffer>,

    width: u32,
    height: u32,
    layer_count: u32,
    real_width: u32,
    real_height: u32,
    real_layer_count: u32,
    mapping: ScreenMapping,
    memory_usage: u64,
}

impl DeferredRendering {
    /// Creates the composer and allocates the buffers at [`INITIAL_SIZE`].
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        delayed: Arc<DelayedOperations>,
        settings: &RenderSettings,
    ) -> Result<Self, RenderError> {
        let caps = device.capabilities();
        if settings.use_encoded_depth {
            log::warn!("DefRen: Encoded depth is not supported, using float depth");
        }
        let convention = DepthConvention::select(
            settings.use_inverse_depth,
            caps.supports_inverse_depth,
            settings.use_encoded_depth,
        );
        log::info!(
            "DefRen: Use Inverse Depth = {}",
            if convention.inverse { "on" } else { "off" }
        );

        let mut deferred = Self {
            device,
            delayed,
            max_draw_buffers: caps.max_draw_buffers,
            use_pot_sizes: settings.use_pot_sizes,
            depth_min_max_strategy: settings.depth_min_max,
            convention,
            targets: AHashMap::new(),
            depth_level_targets: AHashMap::new(),
            colors: AHashMap::new(),
            depths: AHashMap::new(),
            depth_min_max: None,
            depth: DoubleBuffer::new(DepthSlot::Depth1, DepthSlot::Depth2),
            post_process: DoubleBuffer::new(GBuffer::Color, GBuffer::Temporary2),
            width: 0,
            height: 0,
            layer_count: 0,
            real_width: 0,
            real_height: 0,
            real_layer_count: 0,
            mapping: ScreenMapping::default(),
            memory_usage: 0,
        };
        deferred.allocate(INITIAL_SIZE.width, INITIAL_SIZE.height, 1)?;
        deferred.set_used_size(INITIAL_SIZE.width, INITIAL_SIZE.height, 1);
        Ok(deferred)
    }

    // --- size ---

    /// Width of the used area.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the used area.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of used layers.
    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Width of the allocated buffers.
    pub fn real_width(&self) -> u32 {
        self.real_width
    }

    /// Height of the allocated buffers.
    pub fn real_height(&self) -> u32 {
        self.real_height
    }

    /// Number of allocated layers.
    pub fn real_layer_count(&self) -> u32 {
        self.real_layer_count
    }

    /// Texture coordinate parameters of the used area.
    pub fn screen_mapping(&self) -> &ScreenMapping {
        &self.mapping
    }

    /// Sets the used area, reallocating the buffers if they are too small.
    ///
    /// Buffers never shrink. When they are reallocated every framebuffer built
    /// so far is dropped and the primary framebuffer is bound.
    pub fn resize(
        &mut self,
        manager: &mut FramebufferManager,
        width: u32,
        height: u32,
        layer_count: u32,
    ) -> Result<(), RenderError> {
        if width < 1 || height < 1 || layer_count < 1 {
            return Err(RenderError::invalid_parameter(format!(
                "render size {width}x{height}x{layer_count} must be at least 1x1x1"
            )));
        }

        if width > self.real_width || height > self.real_height || layer_count > self.real_layer_count {
            let mut needed_width = width.max(self.width);
            let mut needed_height = height.max(self.height);
            let needed_layers = layer_count.max(self.layer_count);
            if self.use_pot_sizes {
                needed_width = pot_size(needed_width)?;
                needed_height = pot_size(needed_height)?;
            }

            if !self.targets.is_empty() || !self.depth_level_targets.is_empty() {
                manager.activate_primary()?;
            }
            self.targets.clear();
            self.depth_level_targets.clear();

            self.allocate(needed_width, needed_height, needed_layers)?;
        }

        self.set_used_size(width, height, layer_count);
        Ok(())
    }

    /// Reallocates the buffers for the current used area even if they are
    /// large enough.
    pub fn force_resize(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        let (width, height, layers) = (self.width, self.height, self.layer_count);
        self.width = 0;
        self.height = 0;
        self.layer_count = 0;
        self.real_width = 0;
        self.real_height = 0;
        self.real_layer_count = 0;
        self.resize(manager, width, height, layers)
    }

    fn set_used_size(&mut self, width: u32, height: u32, layer_count: u32) {
        self.width = width;
        self.height = height;
        self.layer_count = layer_count;
        self.mapping = ScreenMapping::new(width, height, self.real_width, self.real_height);
    }

    fn allocate(&mut self, width: u32, height: u32, layers: u32) -> Result<(), RenderError> {
        log::info!("DefRen: Resizing buffers to {width}x{height}");

        // Built aside so a failure keeps the previous buffers and real size intact.
        let mut colors = AHashMap::new();
        let mut depths = AHashMap::new();
        let device = self.device.as_ref();
        for buffer in GBuffer::ALL {
            let descriptor = if buffer.is_fixed_size() {
                TextureDescriptor::new_2d(
                    format!("DefRen.{}", buffer.name()),
                    LUMINANCE_SIZE.width,
                    LUMINANCE_SIZE.height,
                    buffer.format(),
                )
            } else {
                TextureDescriptor::new_array(
                    format!("DefRen.{}", buffer.name()),
                    width,
                    height,
                    layers,
                    buffer.format(),
                )
            };
            colors.insert(buffer, RenderTexture::new(device, &self.delayed, descriptor)?);
        }

        let depth_levels = level_count(width, height);
        for slot in DepthSlot::ALL {
            let descriptor = match slot {
                DepthSlot::Luminance => TextureDescriptor::new_2d(
                    format!("DefRen.{}", slot.name()),
                    LUMINANCE_SIZE.width,
                    LUMINANCE_SIZE.height,
                    DEPTH_FORMAT,
                ),
                _ => TextureDescriptor::new_array(
                    format!("DefRen.{}", slot.name()),
                    width,
                    height,
                    layers,
                    DEPTH_FORMAT,
                )
                .with_mip_levels(depth_levels),
            };
            depths.insert(slot, RenderTexture::new(device, &self.delayed, descriptor)?);
        }

        let depth_min_max = match self.depth_min_max_strategy {
            Some(strategy) => Some(DepthMinMax::new(
                Arc::clone(&self.device),
                Arc::clone(&self.delayed),
                strategy,
                half_pot_size(width),
                half_pot_size(height),
                DEPTH_MIN_MAX_MAX_LEVELS,
            )?),
            None => None,
        };

        self.colors = colors;
        self.depths = depths;
        self.depth_min_max = depth_min_max;
        self.real_width = width;
        self.real_height = height;
        self.real_layer_count = layers;
        self.update_memory_usage();
        Ok(())
    }

    fn update_memory_usage(&mut self) {
        let texture: u64 = self.colors.values().map(RenderTexture::memory_usage).sum::<u64>()
            + self.depths.values().map(RenderTexture::memory_usage).sum::<u64>()
            + self.depth_min_max.as_ref().map_or(0, DepthMinMax::memory_usage);
        self.memory_usage = texture;

        log::info!(
            "DefRen: Memory Consumption ({} x {})",
            self.real_width,
            self.real_height
        );
        log::info!("- Texture: {texture}");
        log::info!("- Total: {}", self.memory_usage);
    }

    /// GPU memory used by every owned texture in bytes.
    pub fn memory_usage(&self) -> u64 {
        self.memory_usage
    }

    // --- textures ---

    /// The texture backing a color buffer.
    pub fn texture(&self, buffer: GBuffer) -> Option<&RenderTexture> {
        self.colors.get(&buffer)
    }

    /// The texture backing a depth buffer.
    pub fn depth_texture(&self, slot: DepthSlot) -> Option<&RenderTexture> {
        self.depths.get(&slot)
    }

    /// The current depth buffer.
    pub fn depth_texture1(&self) -> Option<&RenderTexture> {
        self.depth_texture(self.depth.current())
    }

    /// The previous depth buffer.
    pub fn depth_texture2(&self) -> Option<&RenderTexture> {
        self.depth_texture(self.depth.previous())
    }

    /// The depth buffer outside the ping-pong.
    pub fn depth_texture3(&self) -> Option<&RenderTexture> {
        self.depth_texture(DepthSlot::Depth3)
    }

    /// Which physical depth buffers are current and previous.
    pub fn depth_slots(&self) -> DoubleBuffer<DepthSlot> {
        self.depth
    }

    /// Makes the previous depth buffer current and vice versa.
    pub fn swap_depth_textures(&mut self) {
        self.depth.swap();
    }

    /// Makes depth buffer 1 current again.
    pub fn reset_depth_textures(&mut self) {
        self.depth.reset();
    }

    /// The depth min/max pyramid, if one is configured.
    pub fn depth_min_max(&self) -> Option<&DepthMinMax> {
        self.depth_min_max.as_ref()
    }

    /// The depth min/max pyramid for activating its levels.
    pub fn depth_min_max_mut(&mut self) -> Option<&mut DepthMinMax> {
        self.depth_min_max.as_mut()
    }

    /// Number of framebuffers built so far.
    pub fn target_count(&self) -> usize {
        self.targets.len() + self.depth_level_targets.len()
    }

    // --- post processing ---

    /// Starts a post-processing chain reading color and writing temporary 2.
    pub fn init_post_process_target(&mut self) {
        self.post_process.reset();
    }

    /// Exchanges the texture post-processing reads and the one it writes.
    pub fn swap_post_process_target(&mut self) {
        self.post_process.swap();
    }

    /// The buffer post-processing reads from.
    pub fn post_process_buffer(&self) -> GBuffer {
        self.post_process.current()
    }

    /// The texture post-processing reads from.
    pub fn post_process_texture(&self) -> Option<&RenderTexture> {
        self.texture(self.post_process.current())
    }

    // --- depth convention ---

    /// The depth test functions and clear values in use.
    pub fn depth_convention(&self) -> &DepthConvention {
        &self.convention
    }

    /// Returns `true` if depth is stored inverted.
    pub fn use_inverse_depth(&self) -> bool {
        self.convention.inverse
    }

    /// Creates an infinite projection matching the depth convention.
    pub fn create_projection_matrix(
        &self,
        width: u32,
        height: u32,
        fov: f64,
        fov_ratio: f64,
        znear: f64,
        zfar: f64,
    ) -> Result<DMat4, RenderError> {
        create_projection_matrix(width, height, fov, fov_ratio, znear, zfar, self.convention.inverse)
    }

    /// Creates a projection with a finite far plane.
    pub fn create_frustum_matrix(
        &self,
        width: u32,
        height: u32,
        fov: f64,
        fov_ratio: f64,
        znear: f64,
        zfar: f64,
    ) -> Result<DMat4, RenderError> {
        create_frustum_matrix(width, height, fov, fov_ratio, znear, zfar)
    }

    // --- framebuffers ---

    fn build_target(&self, set: &TargetSet) -> Result<Framebuffer, RenderError> {
        let mut framebuffer = Framebuffer::new(
            Arc::clone(&self.device),
            Arc::clone(&self.delayed),
            set.label(),
        )?;

        let fixed = set.depth == Some(DepthSlot::Luminance);
        if fixed {
            framebuffer.set_usage_resolution(LUMINANCE_SIZE.width, LUMINANCE_SIZE.height)?;
        } else {
            framebuffer.set_usage_resolution(self.real_width, self.real_height)?;
        }

        for (index, buffer) in set.colors.iter().enumerate() {
            let texture = self.colors.get(buffer).ok_or(RenderError::NotInitialized)?;
            if buffer.is_fixed_size() {
                framebuffer.attach_color_texture(index, texture)?;
            } else {
                framebuffer.attach_color_array_texture(index, texture)?;
            }
        }
        if let Some(slot) = set.depth {
            let texture = self.depths.get(&slot).ok_or(RenderError::NotInitialized)?;
            if slot == DepthSlot::Luminance {
                framebuffer.attach_depth_texture(texture)?;
                framebuffer.attach_stencil_texture(texture)?;
            } else {
                framebuffer.attach_depth_array_texture(texture)?;
                framebuffer.attach_stencil_array_texture(texture)?;
            }
        }

        framebuffer.update_read_write_buffers()?;
        framebuffer.verify()?;
        Ok(framebuffer)
    }

    fn target(&mut self, set: TargetSet) -> Result<&Framebuffer, RenderError> {
        if !self.targets.contains_key(&set) {
            let framebuffer = self.build_target(&set)?;
            log::debug!("DefRen: Created framebuffer {}", framebuffer.label());
            self.targets.insert(set.clone(), framebuffer);
        }
        self.targets
            .get(&set)
            .ok_or_else(|| RenderError::Internal(format!("missing framebuffer {}", set.label())))
    }

    fn target_id(&mut self, set: TargetSet) -> Result<FramebufferId, RenderError> {
        let framebuffer = self.target(set)?;
        framebuffer
            .id()
            .ok_or_else(|| RenderError::Internal(format!("{} has no device handle", framebuffer.label())))
    }

    /// Binds the framebuffer of a catalog entry.
    pub fn activate(
        &mut self,
        manager: &mut FramebufferManager,
        target: RenderTarget,
    ) -> Result<(), RenderError> {
        let set = target.target_set(self.max_draw_buffers).ok_or_else(|| {
            RenderError::invalid_parameter(format!("render target {target:?} requires encoded depth"))
        })?;
        let framebuffer = self.target(set)?;
        manager.activate(framebuffer)
    }

    fn with_depth(&self, with_depth: bool, none: RenderTarget, d1: RenderTarget, d2: RenderTarget) -> RenderTarget {
        match (with_depth, self.depth.current()) {
            (false, _) => none,
            (true, DepthSlot::Depth2) => d2,
            (true, _) => d1,
        }
    }

    /// Binds the current depth buffer alone.
    pub fn activate_depth(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        let target = self.with_depth(true, RenderTarget::D1, RenderTarget::D1, RenderTarget::D2);
        self.activate(manager, target)
    }

    /// Binds one mip level of the current depth buffer alone.
    pub fn activate_depth_level(
        &mut self,
        manager: &mut FramebufferManager,
        level: u32,
    ) -> Result<(), RenderError> {
        if level == 0 {
            return self.activate_depth(manager);
        }

        let slot = self.depth.current();
        let texture = self.depths.get(&slot).ok_or(RenderError::NotInitialized)?;
        if level >= texture.mip_level_count() {
            return Err(RenderError::invalid_parameter(format!(
                "depth level {level} out of range (level count {})",
                texture.mip_level_count()
            )));
        }

        if !self.depth_level_targets.contains_key(&(slot, level)) {
            let size = texture.descriptor().level_size(level);
            let mut framebuffer = Framebuffer::new(
                Arc::clone(&self.device),
                Arc::clone(&self.delayed),
                format!("DefRen.{}.Level{level}", slot.name()),
            )?;
            framebuffer.set_usage_resolution(size.width, size.height)?;
            framebuffer.attach_depth_array_texture_level(texture, level)?;
            framebuffer.attach_stencil_array_texture_level(texture, level)?;
            framebuffer.update_read_write_buffers()?;
            framebuffer.verify()?;
            self.depth_level_targets.insert((slot, level), framebuffer);
        }

        match self.depth_level_targets.get(&(slot, level)) {
            Some(framebuffer) => manager.activate(framebuffer),
            None => Err(RenderError::Internal(format!("missing depth level {level} framebuffer"))),
        }
    }

    /// Binds the third depth buffer alone.
    pub fn activate_depth3(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        self.activate(manager, RenderTarget::D3)
    }

    /// Binds the diffuse buffer.
    pub fn activate_diffuse(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(with_depth, RenderTarget::Diff, RenderTarget::DiffD1, RenderTarget::DiffD2);
        self.activate(manager, target)
    }

    /// Binds the reflectivity buffer.
    pub fn activate_reflectivity(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(with_depth, RenderTarget::Refl, RenderTarget::ReflD1, RenderTarget::ReflD2);
        self.activate(manager, target)
    }

    /// Binds the roughness buffer.
    pub fn activate_roughness(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(with_depth, RenderTarget::Rough, RenderTarget::RoughD1, RenderTarget::RoughD2);
        self.activate(manager, target)
    }

    /// Binds the ambient occlusion and solidity buffer.
    pub fn activate_ao_solidity(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(
            with_depth,
            RenderTarget::AoSolidity,
            RenderTarget::AoSolidityD1,
            RenderTarget::AoSolidityD2,
        );
        self.activate(manager, target)
    }

    /// Binds temporary buffer 1.
    pub fn activate_temporary1(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(with_depth, RenderTarget::Temp1, RenderTarget::Temp1D1, RenderTarget::Temp1D2);
        self.activate(manager, target)
    }

    /// Binds temporary buffer 2.
    pub fn activate_temporary2(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(with_depth, RenderTarget::Temp2, RenderTarget::Temp2D1, RenderTarget::Temp2D2);
        self.activate(manager, target)
    }

    /// Binds a mip level of temporary buffer 1. Only level 0 exists.
    pub fn activate_temporary1_level(&mut self, manager: &mut FramebufferManager, level: u32) -> Result<(), RenderError> {
        check_temporary_level(level)?;
        self.activate_temporary1(manager, false)
    }

    /// Binds a mip level of temporary buffer 2. Only level 0 exists.
    pub fn activate_temporary2_level(&mut self, manager: &mut FramebufferManager, level: u32) -> Result<(), RenderError> {
        check_temporary_level(level)?;
        self.activate_temporary2(manager, false)
    }

    /// Binds temporary buffer 3.
    pub fn activate_temporary3(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        self.activate(manager, RenderTarget::Temp3)
    }

    /// Binds the color buffer.
    pub fn activate_color(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        let target = self.with_depth(with_depth, RenderTarget::Color, RenderTarget::ColorD1, RenderTarget::ColorD2);
        self.activate(manager, target)
    }

    /// Binds the color buffer and temporary buffer 2 together.
    pub fn activate_color_temporary2(
        &mut self,
        manager: &mut FramebufferManager,
        with_depth: bool,
    ) -> Result<(), RenderError> {
        let target = self.with_depth(
            with_depth,
            RenderTarget::ColorTemp2,
            RenderTarget::ColorTemp2D1,
            RenderTarget::ColorTemp2D2,
        );
        self.activate(manager, target)
    }

    /// Binds the material buffers with the color buffer and the current depth.
    pub fn activate_material_color(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        let target = self.with_depth(
            true,
            RenderTarget::MaterialColorD1,
            RenderTarget::MaterialColorD1,
            RenderTarget::MaterialColorD2,
        );
        self.activate(manager, target)
    }

    /// Binds the luminance buffer with its depth.
    pub fn activate_luminance(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        self.activate(manager, RenderTarget::Luminance)
    }

    /// Binds the luminance and luminance normal buffers with their depth.
    pub fn activate_luminance_normal(&mut self, manager: &mut FramebufferManager) -> Result<(), RenderError> {
        self.activate(manager, RenderTarget::LuminanceNormal)
    }

    /// Binds the buffer post-processing writes to, the one not returned by
    /// [`post_process_texture`](Self::post_process_texture).
    pub fn activate_post_process(&mut self, manager: &mut FramebufferManager, with_depth: bool) -> Result<(), RenderError> {
        match self.post_process.previous() {
            GBuffer::Temporary2 => self.activate_temporary2(manager, with_depth),
            _ => self.activate_color(manager, with_depth),
        }
    }

    // --- depth copies ---

    fn copy_depth(&mut self, dst: DepthSlot, copy_depth: bool, copy_stencil: bool) -> Result<(), RenderError> {
        if !copy_depth && !copy_stencil {
            return Ok(());
        }
        let src = self.target_id(TargetSet::depth_only(self.depth.current()))?;
        let dst = self.target_id(TargetSet::depth_only(dst))?;
        self.device
            .blit(src, dst, self.width, self.height, BlitMask::depth_stencil(copy_depth, copy_stencil))?;
        Ok(())
    }

    /// Copies the used area of the current depth buffer into the previous one.
    ///
    /// Does nothing if neither depth nor stencil is requested. The bound
    /// framebuffer is left unchanged.
    pub fn copy_first_depth_to_second(&mut self, copy_depth: bool, copy_stencil: bool) -> Result<(), RenderError> {
        let dst = self.depth.previous();
        self.copy_depth(dst, copy_depth, copy_stencil)
    }

    /// Copies the used area of the current depth buffer into the third one.
    pub fn copy_first_depth_to_third(&mut self, copy_depth: bool, copy_stencil: bool) -> Result<(), RenderError> {
        self.copy_depth(DepthSlot::Depth3, copy_depth, copy_stencil)
    }
}

fn check_temporary_level(level: u32) -> Result<(), RenderError> {
    if level != 0 {
        return Err(RenderError::invalid_parameter(format!(
            "temporary buffers have no mip level {level}"
        )));
    }
    Ok(())
}

/// Rounds up to a power of two, at least 8.
fn pot_size(size: u32) -> Result<u32, RenderError> {
    size.max(8).checked_next_power_of_two().ok_or_else(|| {
        RenderError::invalid_parameter(format!("render size {size} has no power of two size"))
    })
}

/// The smallest power of two covering half of `size`.
fn half_pot_size(size: u32) -> u32 {
    let mut pot = 1;
    while pot < (size >> 1) {
        pot <<= 1;
    }
    pot
}
