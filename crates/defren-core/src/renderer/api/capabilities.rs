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

/// Describes what the active graphics device can do.
///
/// Filled in once by the backend when the device is created. The lanes query it
/// to pick targets (for example the material color set needs eight draw buffers)
/// and to decide whether inverse depth can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Maximum number of simultaneously written color attachments.
    pub max_draw_buffers: u32,
    /// Largest supported width or height of a 2D texture.
    pub max_texture_size: u32,
    /// Float depth can be attached as 2D and cube texture and clip control is available.
    pub supports_inverse_depth: bool,
    /// Attachments can be invalidated to skip storing their contents.
    pub supports_invalidate: bool,
    /// Human readable names of the device extensions or features.
    pub extensions: Vec<String>,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_draw_buffers: 8,
            max_texture_size: 8192,
            supports_inverse_depth: true,
            supports_invalidate: true,
            extensions: Vec::new(),
        }
    }
}
