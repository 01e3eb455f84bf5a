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

//! A [`GraphicsDevice`] backed by a headless `wgpu` device.

use super::conversions::{copy_aspect, feature_names, texture_format, wanted_features, IntoWgpu};
use super::framebuffer::{FramebufferRecord, TextureInfo};
use defren_core::math::Extent2D;
use defren_core::renderer::{
    AttachmentKind, AttachmentPoint, AttachmentSlot, BlitMask, DeviceCapabilities, FramebufferId,
    FramebufferStatus, GraphicsDevice, RenderError, ResourceError, TextureDescriptor, TextureId,
    TextureKind, MAX_COLOR_ATTACHMENTS,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct WgpuTextureEntry {
    texture: wgpu::Texture,
    format: wgpu::TextureFormat,
    info: TextureInfo,
    size: u64,
}

// One texture-to-texture copy of a blit.
struct CopyRegion {
    src: wgpu::Texture,
    src_level: u32,
    src_layer: u32,
    dst: wgpu::Texture,
    dst_level: u32,
    dst_layer: u32,
    aspect: wgpu::TextureAspect,
    size: wgpu::Extent3d,
}

/// A thread-safe handle to a `wgpu` device without a surface.
///
/// Textures are real `wgpu` textures. Framebuffers are records of what is
/// attached where, checked by [`check_status`](GraphicsDevice::check_status)
/// and resolved into render pass attachments by whoever encodes the passes.
#[derive(Debug)]
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    capabilities: DeviceCapabilities,
    textures: Mutex<HashMap<TextureId, WgpuTextureEntry>>,
    framebuffers: Mutex<HashMap<FramebufferId, FramebufferRecord>>,
    bound: Mutex<Option<FramebufferId>>,
    next_texture_id: AtomicUsize,
    next_framebuffer_id: AtomicUsize,
    // Bytes held by live textures.
    allocated_bytes: AtomicU64,
}

impl WgpuDevice {
    /// Opens the preferred adapter and creates a device on it, blocking until done.
    ///
    /// ## Errors
    /// * `RenderError::InitializationFailed` - If no adapter is available or the
    ///   device cannot be created.
    pub fn new_headless() -> Result<Self, RenderError> {
        pollster::block_on(Self::request())
    }

    async fn request() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::InitializationFailed(format!("no suitable adapter: {e}")))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "WgpuDevice: using adapter \"{}\" (Backend: {:?}, Type: {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let required_features = adapter.features() & wanted_features();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("DefRen Device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .map_err(|e| RenderError::InitializationFailed(format!("failed to create device: {e}")))?;

        let limits = device.limits();
        let capabilities = DeviceCapabilities {
            max_draw_buffers: limits.max_color_attachments.min(MAX_COLOR_ATTACHMENTS as u32),
            max_texture_size: limits.max_texture_dimension_2d,
            // Depth is always [0, 1] and float depth can back 2D and cube textures.
            supports_inverse_depth: true,
            // Load operations decide what survives a pass.
            supports_invalidate: false,
            extensions: feature_names(device.features()),
        };
        log::info!(
            "WgpuDevice: {} draw buffers, max texture size {}, features {:?}",
            capabilities.max_draw_buffers,
            capabilities.max_texture_size,
            capabilities.extensions
        );

        Ok(Self {
            device,
            queue,
            adapter_info,
            capabilities,
            textures: Mutex::new(HashMap::new()),
            framebuffers: Mutex::new(HashMap::new()),
            bound: Mutex::new(None),
            next_texture_id: AtomicUsize::new(1),
            next_framebuffer_id: AtomicUsize::new(1),
            allocated_bytes: AtomicU64::new(0),
        })
    }

    /// Information about the adapter the device runs on.
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// The underlying `wgpu` device.
    pub fn wgpu_device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Bytes held by live textures.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes.load(Ordering::Relaxed)
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        lock(&self.textures).len()
    }

    /// Number of live framebuffer records.
    pub fn framebuffer_count(&self) -> usize {
        lock(&self.framebuffers).len()
    }

    /// The bound framebuffer, `None` for the primary.
    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        *lock(&self.bound)
    }

    /// A copy of the attachments of `id`, for encoding a render pass.
    pub fn framebuffer_attachments(&self, id: FramebufferId) -> Option<Vec<(AttachmentPoint, AttachmentSlot)>> {
        let framebuffers = lock(&self.framebuffers);
        let record = framebuffers.get(&id)?;
        let mut attachments: Vec<_> = record
            .colors
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_attached())
            .map(|(index, slot)| (AttachmentPoint::Color(index as u8), *slot))
            .collect();
        if record.depth.is_attached() {
            attachments.push((AttachmentPoint::Depth, record.depth));
        }
        if record.stencil.is_attached() {
            attachments.push((AttachmentPoint::Stencil, record.stencil));
        }
        Some(attachments)
    }

    fn validate_descriptor(&self, descriptor: &TextureDescriptor) -> Result<(), ResourceError> {
        let size = descriptor.size;
        let max = self.capabilities.max_texture_size;
        if size.width < 1 || size.height < 1 || size.depth_or_array_layers < 1 {
            return Err(ResourceError::InvalidParameter(format!(
                "texture size {}x{}x{} must be at least 1x1x1",
                size.width, size.height, size.depth_or_array_layers
            )));
        }
        if size.width > max || size.height > max {
            return Err(ResourceError::InvalidParameter(format!(
                "texture size {}x{} exceeds the device limit of {max}",
                size.width, size.height
            )));
        }
        if descriptor.kind == TextureKind::CubeMap
            && (size.width != size.height || size.depth_or_array_layers != 6)
        {
            return Err(ResourceError::InvalidParameter(
                "cube maps need square faces and six layers".to_string(),
            ));
        }
        let max_levels = u32::BITS - size.width.max(size.height).leading_zeros();
        if descriptor.mip_level_count < 1 || descriptor.mip_level_count > max_levels {
            return Err(ResourceError::InvalidParameter(format!(
                "{} mip levels requested, {max_levels} possible",
                descriptor.mip_level_count
            )));
        }
        Ok(())
    }

    // Resolves one attachment of a blit into a copy source or destination.
    fn copy_end(
        textures: &HashMap<TextureId, WgpuTextureEntry>,
        slot: &AttachmentSlot,
        what: &str,
    ) -> Result<(wgpu::Texture, wgpu::TextureFormat, TextureInfo, u32, u32), ResourceError> {
        let entry = slot
            .image
            .filter(|_| slot.is_attached())
            .and_then(|id| textures.get(&id))
            .ok_or_else(|| ResourceError::InvalidAction(format!("blit needs a {what} attachment on both ends")))?;
        let layer = match slot.kind {
            AttachmentKind::CubeMapFace(face) => face.index(),
            AttachmentKind::ArrayTextureLayer => slot.layer,
            _ => 0,
        };
        Ok((entry.texture.clone(), entry.format, entry.info, slot.level, layer))
    }
}

impl GraphicsDevice for WgpuDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities.clone()
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        self.validate_descriptor(descriptor)?;

        let format = texture_format(descriptor.format, self.device.features());
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: descriptor.size.into_wgpu(),
            mip_level_count: descriptor.mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let size = descriptor.memory_size();
        let id = TextureId(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        let entry = WgpuTextureEntry {
            texture,
            format,
            info: TextureInfo {
                format: descriptor.format,
                size: descriptor.size,
                mip_level_count: descriptor.mip_level_count,
                kind: descriptor.kind,
            },
            size,
        };
        lock(&self.textures).insert(id, entry);
        self.allocated_bytes.fetch_add(size, Ordering::Relaxed);
        log::trace!("WgpuDevice: created texture {id:?} {:?} ({size} bytes)", descriptor.label);
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let entry = lock(&self.textures).remove(&id).ok_or(ResourceError::NotFound)?;
        entry.texture.destroy();
        self.allocated_bytes.fetch_sub(entry.size, Ordering::Relaxed);
        Ok(())
    }

    fn create_framebuffer(&self, label: Option<&str>) -> Result<FramebufferId, ResourceError> {
        let id = FramebufferId(self.next_framebuffer_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.framebuffers).insert(id, FramebufferRecord::new(label));
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        lock(&self.framebuffers).remove(&id).ok_or(ResourceError::NotFound)?;
        let mut bound = lock(&self.bound);
        if *bound == Some(id) {
            *bound = None;
        }
        Ok(())
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !lock(&self.framebuffers).contains_key(&id) {
                return Err(ResourceError::InvalidHandle);
            }
        }
        *lock(&self.bound) = id;
        Ok(())
    }

    fn attach(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        slot: &AttachmentSlot,
    ) -> Result<(), ResourceError> {
        let mut framebuffers = lock(&self.framebuffers);
        let record = framebuffers.get_mut(&framebuffer).ok_or(ResourceError::InvalidHandle)?;
        if let (true, Some(image)) = (slot.is_attached(), slot.image) {
            let textures = lock(&self.textures);
            let entry = textures.get(&image).ok_or(ResourceError::NotFound)?;
            if slot.level >= entry.info.mip_level_count {
                return Err(ResourceError::InvalidParameter(format!(
                    "level {} of a texture with {} levels",
                    slot.level, entry.info.mip_level_count
                )));
            }
        }
        record.set(point, *slot)
    }

    fn set_draw_buffers(&self, framebuffer: FramebufferId, count: u32) -> Result<(), ResourceError> {
        if count as usize > MAX_COLOR_ATTACHMENTS {
            return Err(ResourceError::InvalidParameter(format!("{count} draw buffers")));
        }
        let mut framebuffers = lock(&self.framebuffers);
        let record = framebuffers.get_mut(&framebuffer).ok_or(ResourceError::InvalidHandle)?;
        record.draw_buffers = count;
        Ok(())
    }

    fn invalidate(
        &self,
        framebuffer: FramebufferId,
        _points: &[AttachmentPoint],
    ) -> Result<(), ResourceError> {
        if lock(&self.framebuffers).contains_key(&framebuffer) {
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn check_status(&self, framebuffer: FramebufferId) -> Result<FramebufferStatus, ResourceError> {
        let framebuffers = lock(&self.framebuffers);
        let record = framebuffers.get(&framebuffer).ok_or(ResourceError::InvalidHandle)?;
        let textures = lock(&self.textures);
        Ok(record.status(|id| textures.get(&id).map(|entry| entry.info)))
    }

    /// Copies color attachment 0 and/or the depth-stencil attachment.
    ///
    /// Color copies cover `width` x `height` clamped to both images. Depth and
    /// stencil always cover the whole level with both aspects, as `wgpu`
    /// requires, so both levels must have the same extent.
    fn blit(
        &self,
        src: FramebufferId,
        dst: FramebufferId,
        width: u32,
        height: u32,
        mask: BlitMask,
    ) -> Result<(), ResourceError> {
        if mask.is_empty() {
            return Ok(());
        }

        let mut copies = Vec::new();
        {
            let framebuffers = lock(&self.framebuffers);
            let from = framebuffers.get(&src).ok_or(ResourceError::InvalidHandle)?;
            let to = framebuffers.get(&dst).ok_or(ResourceError::InvalidHandle)?;
            let textures = lock(&self.textures);

            if mask.color {
                let (s, s_format, s_info, s_level, s_layer) = Self::copy_end(&textures, &from.colors[0], "color")?;
                let (d, d_format, d_info, d_level, d_layer) = Self::copy_end(&textures, &to.colors[0], "color")?;
                if s_format != d_format {
                    return Err(ResourceError::InvalidAction(format!(
                        "color blit between {s_format:?} and {d_format:?}"
                    )));
                }
                let s_size = s_info.size.to_2d().mip_level(s_level);
                let d_size = d_info.size.to_2d().mip_level(d_level);
                copies.push(CopyRegion {
                    src: s,
                    src_level: s_level,
                    src_layer: s_layer,
                    dst: d,
                    dst_level: d_level,
                    dst_layer: d_layer,
                    aspect: wgpu::TextureAspect::All,
                    size: wgpu::Extent3d {
                        width: width.min(s_size.width).min(d_size.width),
                        height: height.min(s_size.height).min(d_size.height),
                        depth_or_array_layers: 1,
                    },
                });
            }

            if mask.depth || mask.stencil {
                let (s, s_format, s_info, s_level, s_layer) = Self::copy_end(&textures, &from.depth, "depth")?;
                let (d, d_format, d_info, d_level, d_layer) = Self::copy_end(&textures, &to.depth, "depth")?;
                if s_format != d_format {
                    return Err(ResourceError::InvalidAction(format!(
                        "depth blit between {s_format:?} and {d_format:?}"
                    )));
                }
                let s_size: Extent2D = s_info.size.to_2d().mip_level(s_level);
                if s_size != d_info.size.to_2d().mip_level(d_level) {
                    return Err(ResourceError::InvalidAction(
                        "depth blits need levels of the same size".to_string(),
                    ));
                }
                if let Some(aspect) = copy_aspect(s_info.format, mask.depth, mask.stencil) {
                    copies.push(CopyRegion {
                        src: s,
                        src_level: s_level,
                        src_layer: s_layer,
                        dst: d,
                        dst_level: d_level,
                        dst_layer: d_layer,
                        aspect,
                        size: wgpu::Extent3d {
                            width: s_size.width,
                            height: s_size.height,
                            depth_or_array_layers: 1,
                        },
                    });
                }
            }
        }

        if copies.is_empty() {
            return Ok(());
        }
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("DefRen Blit"),
        });
        for copy in &copies {
            encoder.copy_texture_to_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &copy.src,
                    mip_level: copy.src_level,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: copy.src_layer,
                    },
                    aspect: copy.aspect,
                },
                wgpu::TexelCopyTextureInfo {
                    texture: &copy.dst,
                    mip_level: copy.dst_level,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: copy.dst_layer,
                    },
                    aspect: copy.aspect,
                },
                copy.size,
            );
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

impl Drop for WgpuDevice {
    fn drop(&mut self) {
        let textures = lock(&self.textures).len();
        let framebuffers = lock(&self.framebuffers).len();
        if textures > 0 || framebuffers > 0 {
            log::warn!(
                "WgpuDevice: dropped with {textures} textures and {framebuffers} framebuffers still alive"
            );
        }
    }
}
