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

//! A graphics device that only counts what it is asked to do.

#![allow(dead_code)]

use defren_core::renderer::{
    AttachmentPoint, AttachmentSlot, BlitMask, DeviceCapabilities, FramebufferId,
    FramebufferStatus, GraphicsDevice, ResourceError, TextureDescriptor, TextureId,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct CountingDevice {
    next_id: AtomicUsize,
    live_textures: Mutex<HashSet<TextureId>>,
    live_framebuffers: Mutex<HashSet<FramebufferId>>,
    destroyed: AtomicUsize,
    binds: Mutex<Vec<Option<FramebufferId>>>,
}

impl CountingDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicUsize::new(1),
            ..Default::default()
        })
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.lock().unwrap().len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.live_framebuffers.lock().unwrap().len()
    }

    /// Every destroy call, including ones for handles the device never made.
    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn last_bind(&self) -> Option<Option<FramebufferId>> {
        self.binds.lock().unwrap().last().copied()
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl GraphicsDevice for CountingDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            extensions: vec!["mock-extension".to_string()],
            ..Default::default()
        }
    }

    fn create_texture(&self, _descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let id = TextureId(self.next());
        self.live_textures.lock().unwrap().insert(id);
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.live_textures.lock().unwrap().remove(&id);
        Ok(())
    }

    fn create_framebuffer(&self, _label: Option<&str>) -> Result<FramebufferId, ResourceError> {
        let id = FramebufferId(self.next());
        self.live_framebuffers.lock().unwrap().insert(id);
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.live_framebuffers.lock().unwrap().remove(&id);
        Ok(())
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError> {
        self.binds.lock().unwrap().push(id);
        Ok(())
    }

    fn attach(
        &self,
        _framebuffer: FramebufferId,
        _point: AttachmentPoint,
        _slot: &AttachmentSlot,
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn set_draw_buffers(&self, _framebuffer: FramebufferId, _count: u32) -> Result<(), ResourceError> {
        Ok(())
    }

    fn invalidate(
        &self,
        _framebuffer: FramebufferId,
        _points: &[AttachmentPoint],
    ) -> Result<(), ResourceError> {
        Ok(())
    }

    fn check_status(&self, _framebuffer: FramebufferId) -> Result<FramebufferStatus, ResourceError> {
        Ok(FramebufferStatus::Complete)
    }

    fn blit(
        &self,
        _src: FramebufferId,
        _dst: FramebufferId,
        _width: u32,
        _height: u32,
        _mask: BlitMask,
    ) -> Result<(), ResourceError> {
        Ok(())
    }
}
