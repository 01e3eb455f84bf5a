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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The contract every graphics backend fulfils for the deferred renderer.
///
/// Calls are only ever made from the render thread. The trait is `Send + Sync`
/// so the device can be shared behind an `Arc` between the lanes, but the lanes
/// never issue calls concurrently.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Returns the capabilities of the device.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Creates a texture.
    /// ## Arguments
    /// * `descriptor` - The size, format and shape of the texture.
    /// ## Returns
    /// A `Result` containing the ID of the created texture.
    /// ## Errors
    /// * `ResourceError` - If the texture cannot be allocated.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys the texture associated with the given ID.
    /// ## Errors
    /// * `ResourceError` - If the ID is unknown.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates an empty framebuffer.
    /// ## Arguments
    /// * `label` - An optional debug label.
    /// ## Returns
    /// A `Result` containing the ID of the created framebuffer.
    /// ## Errors
    /// * `ResourceError` - If the backend cannot allocate a framebuffer handle.
    fn create_framebuffer(&self, label: Option<&str>) -> Result<FramebufferId, ResourceError>;

    /// Destroys the framebuffer associated with the given ID.
    /// ## Errors
    /// * `ResourceError` - If the ID is unknown.
    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError>;

    /// Makes a framebuffer the active render target.
    /// ## Arguments
    /// * `id` - The framebuffer to bind, `None` for the primary surface.
    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError>;

    /// Binds an image to an attachment point, or clears the point when the slot is empty.
    /// ## Arguments
    /// * `framebuffer` - The framebuffer to modify.
    /// * `point` - The attachment point.
    /// * `slot` - The image, kind, level and layer to bind.
    /// ## Errors
    /// * `ResourceError` - If the framebuffer or texture is unknown, or the level/layer is out of range.
    fn attach(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        slot: &AttachmentSlot,
    ) -> Result<(), ResourceError>;

    /// Selects how many color attachments (from slot 0) are written. The read
    /// buffer follows: color 0 if `count > 0`, none otherwise.
    fn set_draw_buffers(&self, framebuffer: FramebufferId, count: u32)
        -> Result<(), ResourceError>;

    /// Hints that the contents of the given attachments are no longer needed.
    fn invalidate(
        &self,
        framebuffer: FramebufferId,
        points: &[AttachmentPoint],
    ) -> Result<(), ResourceError>;

    /// Checks the completeness of a framebuffer.
    /// ## Returns
    /// The status of the framebuffer, [`FramebufferStatus::Complete`] if it can be rendered to.
    fn check_status(&self, framebuffer: FramebufferId) -> Result<FramebufferStatus, ResourceError>;

    /// Copies a `width` x `height` region starting at the origin from one
    /// framebuffer to another.
    /// ## Arguments
    /// * `src` - The framebuffer read from.
    /// * `dst` - The framebuffer written to.
    /// * `mask` - The aspects to copy.
    fn blit(
        &self,
        src: FramebufferId,
        dst: FramebufferId,
        width: u32,
        height: u32,
        mask: BlitMask,
    ) -> Result<(), ResourceError>;
}
