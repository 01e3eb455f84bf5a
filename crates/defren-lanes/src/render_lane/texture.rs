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

//! Owned GPU textures with delayed deletion.

use crate::delayed::{DelayedOperations, GpuObject};
use defren_core::math::Extent2D;
use defren_core::renderer::{GraphicsDevice, RenderError, TextureDescriptor, TextureFormat, TextureId};
use std::sync::Arc;

/// Returns the number of mip levels of a full chain for `width` x `height`.
pub fn level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// A texture owned by a render lane.
///
/// Dropping it does not destroy the GPU texture right away; the handle is queued
/// on the delayed operations and destroyed at the next free point of the frame.
#[derive(Debug)]
pub struct RenderTexture {
    id: TextureId,
    descriptor: TextureDescriptor,
    delayed: Arc<DelayedOperations>,
}

impl RenderTexture {
    /// Creates the texture on the device.
    pub fn new(
        device: &dyn GraphicsDevice,
        delayed: &Arc<DelayedOperations>,
        descriptor: TextureDescriptor,
    ) -> Result<Self, RenderError> {
        let id = device.create_texture(&descriptor)?;
        Ok(Self {
            id,
            descriptor,
            delayed: Arc::clone(delayed),
        })
    }

    /// The device handle.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// The descriptor the texture was created with.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// The texel format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// The size of level 0.
    pub fn size(&self) -> Extent2D {
        self.descriptor.size.to_2d()
    }

    /// The number of layers.
    pub fn layer_count(&self) -> u32 {
        self.descriptor.layer_count()
    }

    /// The number of mip levels.
    pub fn mip_level_count(&self) -> u32 {
        self.descriptor.mip_level_count
    }

    /// GPU memory used by the texture in bytes.
    pub fn memory_usage(&self) -> u64 {
        self.descriptor.memory_size()
    }
}

impl Drop for RenderTexture {
    fn drop(&mut self) {
        self.delayed.delete_gpu_object(GpuObject::Texture(self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_count_of_common_sizes() {
        assert_eq!(level_count(1, 1), 1);
        assert_eq!(level_count(2, 1), 2);
        assert_eq!(level_count(1920, 1080), 11);
        assert_eq!(level_count(1024, 1024), 11);
        assert_eq!(level_count(1023, 7), 10);
        assert_eq!(level_count(0, 0), 1);
    }
}
