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

//! A graphics device that records every call instead of talking to a GPU.

#![allow(dead_code)]

use defren_core::renderer::{
    AttachmentPoint, AttachmentSlot, BlitMask, DeviceCapabilities, FramebufferId,
    FramebufferStatus, GraphicsDevice, ResourceError, TextureDescriptor, TextureId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture(TextureId, TextureDescriptor),
    DestroyTexture(TextureId),
    CreateFramebuffer(FramebufferId, Option<String>),
    DestroyFramebuffer(FramebufferId),
    Bind(Option<FramebufferId>),
    Attach(FramebufferId, AttachmentPoint, AttachmentSlot),
    DrawBuffers(FramebufferId, u32),
    Invalidate(FramebufferId, Vec<AttachmentPoint>),
    CheckStatus(FramebufferId),
    Blit(FramebufferId, FramebufferId, u32, u32, BlitMask),
}

#[derive(Debug)]
pub struct MockGraphicsDevice {
    capabilities: DeviceCapabilities,
    next_id: AtomicUsize,
    calls: Mutex<Vec<Call>>,
    status: Mutex<FramebufferStatus>,
    fail_textures: Mutex<bool>,
}

impl MockGraphicsDevice {
    pub fn new() -> Arc<Self> {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Arc<Self> {
        Arc::new(Self {
            capabilities,
            next_id: AtomicUsize::new(1),
            calls: Mutex::new(Vec::new()),
            status: Mutex::new(FramebufferStatus::Complete),
            fail_textures: Mutex::new(false),
        })
    }

    /// Makes every later status check report `status`.
    pub fn set_status(&self, status: FramebufferStatus) {
        *self.status.lock().unwrap() = status;
    }

    /// Makes texture creation fail with out of memory.
    pub fn set_fail_textures(&self, fail: bool) {
        *self.fail_textures.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn attach_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Attach(..)))
    }

    pub fn bind_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Bind(_)))
    }

    pub fn texture_count(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateTexture(..)))
    }

    pub fn framebuffer_count(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateFramebuffer(..)))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities.clone()
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if *self.fail_textures.lock().unwrap() {
            return Err(ResourceError::OutOfMemory("mock".to_string()));
        }
        let id = TextureId(self.next());
        self.record(Call::CreateTexture(id, descriptor.clone()));
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.record(Call::DestroyTexture(id));
        Ok(())
    }

    fn create_framebuffer(&self, label: Option<&str>) -> Result<FramebufferId, ResourceError> {
        let id = FramebufferId(self.next());
        self.record(Call::CreateFramebuffer(id, label.map(str::to_string)));
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        self.record(Call::DestroyFramebuffer(id));
        Ok(())
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError> {
        self.record(Call::Bind(id));
        Ok(())
    }

    fn attach(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        slot: &AttachmentSlot,
    ) -> Result<(), ResourceError> {
        self.record(Call::Attach(framebuffer, point, *slot));
        Ok(())
    }

    fn set_draw_buffers(&self, framebuffer: FramebufferId, count: u32) -> Result<(), ResourceError> {
        self.record(Call::DrawBuffers(framebuffer, count));
        Ok(())
    }

    fn invalidate(
        &self,
        framebuffer: FramebufferId,
        points: &[AttachmentPoint],
    ) -> Result<(), ResourceError> {
        self.record(Call::Invalidate(framebuffer, points.to_vec()));
        Ok(())
    }

    fn check_status(&self, framebuffer: FramebufferId) -> Result<FramebufferStatus, ResourceError> {
        self.record(Call::CheckStatus(framebuffer));
        Ok(*self.status.lock().unwrap())
    }

    fn blit(
        &self,
        src: FramebufferId,
        dst: FramebufferId,
        width: u32,
        height: u32,
        mask: BlitMask,
    ) -> Result<(), ResourceError> {
        self.record(Call::Blit(src, dst, width, height, mask));
        Ok(())
    }
}
