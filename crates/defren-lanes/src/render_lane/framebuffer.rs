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

//! A framebuffer that remembers what is attached to it.
//!
//! Every attachment change is compared against the recorded slot first so a
//! render pass re-attaching the same images costs no device call at all.

use super::texture::RenderTexture;
use crate::delayed::{DelayedOperations, GpuObject};
use defren_core::renderer::{
    AttachmentKind, AttachmentPoint, AttachmentSlot, CubeFace, FramebufferId, GraphicsDevice,
    RenderError, MAX_COLOR_ATTACHMENTS,
};
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Color(usize),
    Depth,
    Stencil,
}

impl Target {
    fn point(self) -> AttachmentPoint {
        match self {
            Target::Color(index) => AttachmentPoint::Color(index as u8),
            Target::Depth => AttachmentPoint::Depth,
            Target::Stencil => AttachmentPoint::Stencil,
        }
    }
}

fn kind_name(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::None => "none",
        AttachmentKind::Texture => "texture",
        AttachmentKind::CubeMap => "cubeMap",
        AttachmentKind::CubeMapFace(CubeFace::PosX) => "cubeMapPosX",
        AttachmentKind::CubeMapFace(CubeFace::NegX) => "cubeMapNegX",
        AttachmentKind::CubeMapFace(CubeFace::PosY) => "cubeMapPosY",
        AttachmentKind::CubeMapFace(CubeFace::NegY) => "cubeMapNegY",
        AttachmentKind::CubeMapFace(CubeFace::PosZ) => "cubeMapPosZ",
        AttachmentKind::CubeMapFace(CubeFace::NegZ) => "cubeMapNegZ",
        AttachmentKind::ArrayTexture => "arrayTexture",
        AttachmentKind::ArrayTextureLayer => "arrayTextureLayer",
    }
}

fn describe_slot(out: &mut String, name: &str, slot: &AttachmentSlot) {
    let image = slot.image.map_or(0, |id| id.0);
    let _ = writeln!(
        out,
        "- {name}: type={} image={image} layer={} level={}",
        kind_name(slot.kind),
        slot.layer,
        slot.level
    );
}

/// A render target: either the primary surface or an off-screen framebuffer
/// with up to eight color attachments plus depth and stencil.
#[derive(Debug)]
pub struct Framebuffer {
    device: Arc<dyn GraphicsDevice>,
    delayed: Arc<DelayedOperations>,
    // `None` for the primary surface.
    id: Option<FramebufferId>,
    label: String,
    supports_invalidate: bool,

    colors: [AttachmentSlot; MAX_COLOR_ATTACHMENTS],
    depth: AttachmentSlot,
    stencil: AttachmentSlot,

    usage_width: u32,
    usage_height: u32,
    usage_count: u32,
}

impl Framebuffer {
    fn with_id(
        device: Arc<dyn GraphicsDevice>,
        delayed: Arc<DelayedOperations>,
        id: Option<FramebufferId>,
        label: String,
    ) -> Self {
        let supports_invalidate = device.capabilities().supports_invalidate;
        Self {
            device,
            delayed,
            id,
            label,
            supports_invalidate,
            colors: [AttachmentSlot::NONE; MAX_COLOR_ATTACHMENTS],
            depth: AttachmentSlot::NONE,
            stencil: AttachmentSlot::NONE,
            usage_width: 1,
            usage_height: 1,
            usage_count: 0,
        }
    }

    /// Wraps the primary surface. It cannot take attachments and always verifies.
    pub fn new_primary(device: Arc<dyn GraphicsDevice>, delayed: Arc<DelayedOperations>) -> Self {
        Self::with_id(device, delayed, None, "Primary".to_string())
    }

    /// Creates an empty off-screen framebuffer.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        delayed: Arc<DelayedOperations>,
        label: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let label = label.into();
        let id = device.create_framebuffer(Some(&label))?;
        Ok(Self::with_id(device, delayed, Some(id), label))
    }

    /// The device handle, `None` for the primary surface.
    pub fn id(&self) -> Option<FramebufferId> {
        self.id
    }

    /// Returns `true` for the primary surface.
    pub fn is_primary(&self) -> bool {
        self.id.is_none()
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    // --- Usage tracking ---

    /// Width the framebuffer is used with.
    pub fn usage_width(&self) -> u32 {
        self.usage_width
    }

    /// Height the framebuffer is used with.
    pub fn usage_height(&self) -> u32 {
        self.usage_height
    }

    /// Sets the resolution the framebuffer is used with. Both sides must be at least 1.
    pub fn set_usage_resolution(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width < 1 || height < 1 {
            return Err(RenderError::invalid_parameter(format!(
                "usage resolution {width}x{height}"
            )));
        }
        self.usage_width = width;
        self.usage_height = height;
        Ok(())
    }

    /// Number of users currently holding the framebuffer.
    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    /// Registers one more user.
    pub fn increase_usage_count(&mut self) {
        self.usage_count += 1;
    }

    /// Releases one user.
    pub fn decrease_usage_count(&mut self) {
        if self.usage_count == 0 {
            log::warn!("Framebuffer '{}': usage count decreased below zero", self.label);
            return;
        }
        self.usage_count -= 1;
    }

    // --- Slot inspection ---

    /// The recorded slot of color attachment `index`.
    pub fn color_slot(&self, index: usize) -> Option<&AttachmentSlot> {
        self.colors.get(index)
    }

    /// The recorded depth slot.
    pub fn depth_slot(&self) -> &AttachmentSlot {
        &self.depth
    }

    /// The recorded stencil slot.
    pub fn stencil_slot(&self) -> &AttachmentSlot {
        &self.stencil
    }

    /// Returns `true` if color attachment `index` holds an image.
    pub fn is_color_attached(&self, index: usize) -> bool {
        self.colors.get(index).is_some_and(AttachmentSlot::is_attached)
    }

    /// Returns `true` if a depth image is attached.
    pub fn is_depth_attached(&self) -> bool {
        self.depth.is_attached()
    }

    /// Returns `true` if a stencil image is attached.
    pub fn is_stencil_attached(&self) -> bool {
        self.stencil.is_attached()
    }

    fn slot(&self, target: Target) -> &AttachmentSlot {
        match target {
            Target::Color(index) => &self.colors[index],
            Target::Depth => &self.depth,
            Target::Stencil => &self.stencil,
        }
    }

    fn slot_mut(&mut self, target: Target) -> &mut AttachmentSlot {
        match target {
            Target::Color(index) => &mut self.colors[index],
            Target::Depth => &mut self.depth,
            Target::Stencil => &mut self.stencil,
        }
    }

    fn offscreen_id(&self, action: &str) -> Result<FramebufferId, RenderError> {
        self.id.ok_or_else(|| {
            RenderError::invalid_parameter(format!("{action} on the primary framebuffer"))
        })
    }

    fn color_target(index: usize) -> Result<Target, RenderError> {
        if index >= MAX_COLOR_ATTACHMENTS {
            return Err(RenderError::invalid_parameter(format!(
                "color attachment index {index}"
            )));
        }
        Ok(Target::Color(index))
    }

    // --- Attaching ---

    fn attach(
        &mut self,
        target: Target,
        texture: &RenderTexture,
        kind: AttachmentKind,
        level: u32,
        layer: u32,
    ) -> Result<(), RenderError> {
        let id = self.offscreen_id("attach")?;
        if level >= texture.mip_level_count() {
            return Err(RenderError::invalid_parameter(format!(
                "level {level} of a texture with {} levels",
                texture.mip_level_count()
            )));
        }
        if layer >= texture.layer_count() {
            return Err(RenderError::invalid_parameter(format!(
                "layer {layer} of a texture with {} layers",
                texture.layer_count()
            )));
        }

        let slot = AttachmentSlot::new(texture.id(), kind, level, layer);
        if *self.slot(target) == slot {
            return Ok(());
        }

        self.detach(target)?;
        self.device.attach(id, target.point(), &slot)?;
        *self.slot_mut(target) = slot;
        Ok(())
    }

    fn attach_array(
        &mut self,
        target: Target,
        texture: &RenderTexture,
        level: u32,
    ) -> Result<(), RenderError> {
        // A single layer array is bound as that layer, layered rendering is pointless.
        if texture.layer_count() == 1 {
            self.attach(target, texture, AttachmentKind::ArrayTextureLayer, level, 0)
        } else {
            self.attach(target, texture, AttachmentKind::ArrayTexture, level, 0)
        }
    }

    fn detach(&mut self, target: Target) -> Result<(), RenderError> {
        if !self.slot(target).is_attached() {
            return Ok(());
        }
        let id = self.offscreen_id("detach")?;
        self.device.attach(id, target.point(), &AttachmentSlot::NONE)?;
        *self.slot_mut(target) = AttachmentSlot::NONE;
        Ok(())
    }

    /// Attaches level 0 of a 2D texture as color `index`.
    pub fn attach_color_texture(&mut self, index: usize, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_color_texture_level(index, texture, 0)
    }

    /// Attaches one level of a 2D texture as color `index`.
    pub fn attach_color_texture_level(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(Self::color_target(index)?, texture, AttachmentKind::Texture, level, 0)
    }

    /// Attaches all faces of a cube map as color `index`.
    pub fn attach_color_cube_map(&mut self, index: usize, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_color_cube_map_level(index, texture, 0)
    }

    /// Attaches all faces of one cube map level as color `index`.
    pub fn attach_color_cube_map_level(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(Self::color_target(index)?, texture, AttachmentKind::CubeMap, level, 0)
    }

    /// Attaches one cube map face as color `index`.
    pub fn attach_color_cube_map_face(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        face: CubeFace,
    ) -> Result<(), RenderError> {
        self.attach_color_cube_map_face_level(index, texture, face, 0)
    }

    /// Attaches one level of one cube map face as color `index`.
    pub fn attach_color_cube_map_face_level(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        face: CubeFace,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(
            Self::color_target(index)?,
            texture,
            AttachmentKind::CubeMapFace(face),
            level,
            face.index(),
        )
    }

    /// Attaches every layer of an array texture as color `index`.
    pub fn attach_color_array_texture(&mut self, index: usize, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_color_array_texture_level(index, texture, 0)
    }

    /// Attaches every layer of one array texture level as color `index`.
    pub fn attach_color_array_texture_level(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach_array(Self::color_target(index)?, texture, level)
    }

    /// Attaches one layer of an array texture as color `index`.
    pub fn attach_color_array_texture_layer(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        layer: u32,
    ) -> Result<(), RenderError> {
        self.attach_color_array_texture_layer_level(index, texture, layer, 0)
    }

    /// Attaches one level of one array texture layer as color `index`.
    pub fn attach_color_array_texture_layer_level(
        &mut self,
        index: usize,
        texture: &RenderTexture,
        layer: u32,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(
            Self::color_target(index)?,
            texture,
            AttachmentKind::ArrayTextureLayer,
            level,
            layer,
        )
    }

    /// Attaches level 0 of a 2D texture as depth.
    pub fn attach_depth_texture(&mut self, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_depth_texture_level(texture, 0)
    }

    /// Attaches one level of a 2D texture as depth.
    pub fn attach_depth_texture_level(&mut self, texture: &RenderTexture, level: u32) -> Result<(), RenderError> {
        self.attach(Target::Depth, texture, AttachmentKind::Texture, level, 0)
    }

    /// Attaches all faces of a cube map as depth.
    pub fn attach_depth_cube_map(&mut self, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_depth_cube_map_level(texture, 0)
    }

    /// Attaches all faces of one cube map level as depth.
    pub fn attach_depth_cube_map_level(&mut self, texture: &RenderTexture, level: u32) -> Result<(), RenderError> {
        self.attach(Target::Depth, texture, AttachmentKind::CubeMap, level, 0)
    }

    /// Attaches one cube map face as depth.
    pub fn attach_depth_cube_map_face(&mut self, texture: &RenderTexture, face: CubeFace) -> Result<(), RenderError> {
        self.attach_depth_cube_map_face_level(texture, face, 0)
    }

    /// Attaches one level of one cube map face as depth.
    pub fn attach_depth_cube_map_face_level(
        &mut self,
        texture: &RenderTexture,
        face: CubeFace,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(
            Target::Depth,
            texture,
            AttachmentKind::CubeMapFace(face),
            level,
            face.index(),
        )
    }

    /// Attaches every layer of an array texture as depth.
    pub fn attach_depth_array_texture(&mut self, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_depth_array_texture_level(texture, 0)
    }

    /// Attaches every layer of one array texture level as depth.
    pub fn attach_depth_array_texture_level(
        &mut self,
        texture: &RenderTexture,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach_array(Target::Depth, texture, level)
    }

    /// Attaches one layer of an array texture as depth.
    pub fn attach_depth_array_texture_layer(
        &mut self,
        texture: &RenderTexture,
        layer: u32,
    ) -> Result<(), RenderError> {
        self.attach_depth_array_texture_layer_level(texture, layer, 0)
    }

    /// Attaches one level of one array texture layer as depth.
    pub fn attach_depth_array_texture_layer_level(
        &mut self,
        texture: &RenderTexture,
        layer: u32,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(Target::Depth, texture, AttachmentKind::ArrayTextureLayer, level, layer)
    }

    /// Attaches level 0 of a 2D texture as stencil.
    pub fn attach_stencil_texture(&mut self, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_stencil_texture_level(texture, 0)
    }

    /// Attaches one level of a 2D texture as stencil.
    pub fn attach_stencil_texture_level(&mut self, texture: &RenderTexture, level: u32) -> Result<(), RenderError> {
        self.attach(Target::Stencil, texture, AttachmentKind::Texture, level, 0)
    }

    /// Attaches every layer of an array texture as stencil.
    pub fn attach_stencil_array_texture(&mut self, texture: &RenderTexture) -> Result<(), RenderError> {
        self.attach_stencil_array_texture_level(texture, 0)
    }

    /// Attaches every layer of one array texture level as stencil.
    pub fn attach_stencil_array_texture_level(
        &mut self,
        texture: &RenderTexture,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach_array(Target::Stencil, texture, level)
    }

    /// Attaches one layer of an array texture as stencil.
    pub fn attach_stencil_array_texture_layer(
        &mut self,
        texture: &RenderTexture,
        layer: u32,
    ) -> Result<(), RenderError> {
        self.attach_stencil_array_texture_layer_level(texture, layer, 0)
    }

    /// Attaches one level of one array texture layer as stencil.
    pub fn attach_stencil_array_texture_layer_level(
        &mut self,
        texture: &RenderTexture,
        layer: u32,
        level: u32,
    ) -> Result<(), RenderError> {
        self.attach(Target::Stencil, texture, AttachmentKind::ArrayTextureLayer, level, layer)
    }

    // --- Detaching ---

    /// Detaches color attachment `index`.
    pub fn detach_color(&mut self, index: usize) -> Result<(), RenderError> {
        self.detach(Self::color_target(index)?)
    }

    /// Detaches every color attachment from `start` on.
    pub fn detach_color_images(&mut self, start: usize) -> Result<(), RenderError> {
        for index in start..MAX_COLOR_ATTACHMENTS {
            self.detach(Target::Color(index))?;
        }
        Ok(())
    }

    /// Detaches the depth attachment.
    pub fn detach_depth(&mut self) -> Result<(), RenderError> {
        self.detach(Target::Depth)
    }

    /// Detaches the stencil attachment.
    pub fn detach_stencil(&mut self) -> Result<(), RenderError> {
        self.detach(Target::Stencil)
    }

    /// Detaches every attachment.
    pub fn detach_all_images(&mut self) -> Result<(), RenderError> {
        self.detach_color_images(0)?;
        self.detach_depth()?;
        self.detach_stencil()
    }

    // --- Invalidation ---

    fn invalidate(&self, points: &[AttachmentPoint]) -> Result<(), RenderError> {
        let Some(id) = self.id else {
            return Ok(());
        };
        if !self.supports_invalidate || points.is_empty() {
            return Ok(());
        }
        self.device.invalidate(id, points)?;
        Ok(())
    }

    fn depth_stencil_point(&self) -> Option<AttachmentPoint> {
        match (self.depth.is_attached(), self.stencil.is_attached()) {
            (true, true) => Some(AttachmentPoint::DepthStencil),
            (true, false) => Some(AttachmentPoint::Depth),
            (false, true) => Some(AttachmentPoint::Stencil),
            (false, false) => None,
        }
    }

    /// Discards the contents of color attachment `index` if attached.
    pub fn invalidate_color(&self, index: usize) -> Result<(), RenderError> {
        if !self.is_color_attached(index) {
            return Ok(());
        }
        self.invalidate(&[AttachmentPoint::Color(index as u8)])
    }

    /// Discards the depth contents if attached.
    pub fn invalidate_depth(&self) -> Result<(), RenderError> {
        if !self.depth.is_attached() {
            return Ok(());
        }
        self.invalidate(&[AttachmentPoint::Depth])
    }

    /// Discards the stencil contents if attached.
    pub fn invalidate_stencil(&self) -> Result<(), RenderError> {
        if !self.stencil.is_attached() {
            return Ok(());
        }
        self.invalidate(&[AttachmentPoint::Stencil])
    }

    /// Discards depth and stencil, whichever are attached.
    pub fn invalidate_depth_stencil(&self) -> Result<(), RenderError> {
        match self.depth_stencil_point() {
            Some(point) => self.invalidate(&[point]),
            None => Ok(()),
        }
    }

    /// Discards every attached image.
    pub fn invalidate_all_images(&self) -> Result<(), RenderError> {
        let mut points: Vec<AttachmentPoint> = (0..MAX_COLOR_ATTACHMENTS)
            .filter(|&index| self.is_color_attached(index))
            .map(|index| AttachmentPoint::Color(index as u8))
            .collect();
        points.extend(self.depth_stencil_point());
        self.invalidate(&points)
    }

    // --- Buffers and verification ---

    /// Number of color attachments bound without a gap, starting at slot 0.
    pub fn contiguous_color_count(&self) -> u32 {
        self.colors.iter().take_while(|slot| slot.is_attached()).count() as u32
    }

    /// Makes every contiguously attached color a draw buffer and color 0 the
    /// read buffer, or disables both when no color is attached.
    pub fn update_read_write_buffers(&self) -> Result<(), RenderError> {
        let id = self.offscreen_id("update read/write buffers")?;
        self.device.set_draw_buffers(id, self.contiguous_color_count())?;
        Ok(())
    }

    /// Checks that the framebuffer is complete.
    ///
    /// Must be called after changing attachments. The primary framebuffer always
    /// passes. On failure the status is logged together with the configuration.
    pub fn verify(&self) -> Result<(), RenderError> {
        let Some(id) = self.id else {
            return Ok(());
        };

        let status = self.device.check_status(id)?;
        if status.is_complete() {
            return Ok(());
        }

        log::error!("FBO: {status}");
        self.debug_print("FBO Configuration:");
        Err(RenderError::IncompleteFramebuffer {
            label: self.label.clone(),
            status,
        })
    }

    /// Renders the configuration as text, one line per attachment.
    pub fn debug_info(&self, prefix: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{prefix} primary={} size={}x{} usage={}",
            if self.is_primary() { "yes" } else { "no" },
            self.usage_width,
            self.usage_height,
            self.usage_count
        );
        for (index, slot) in self.colors.iter().enumerate() {
            describe_slot(&mut out, &format!("AttachmentColor{}", index + 1), slot);
        }
        describe_slot(&mut out, "AttachmentDepth", &self.depth);
        describe_slot(&mut out, "AttachmentStencil", &self.stencil);
        out
    }

    /// Logs [`Framebuffer::debug_info`].
    pub fn debug_print(&self, prefix: &str) {
        for line in self.debug_info(prefix).lines() {
            log::info!("{line}");
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        if self.usage_count > 0 {
            log::warn!(
                "Framebuffer ({} x {}) has {} usage count on deletion!",
                self.usage_width,
                self.usage_height,
                self.usage_count
            );
        }
        if let Some(id) = self.id {
            self.delayed.delete_gpu_object(GpuObject::Framebuffer(id));
        }
    }
}
