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

//! Render targets and the GPU resources behind them.

pub mod deferred;
pub mod depth_min_max;
pub mod framebuffer;
pub mod framebuffer_manager;
pub mod ray_trace_field;
pub mod texture;

pub use deferred::{
    create_frustum_matrix, create_projection_matrix, DeferredRendering, DepthCompare,
    DepthConvention, DepthSlot, DoubleBuffer, GBuffer, RenderTarget, ScreenMapping, TargetSet,
};
pub use depth_min_max::DepthMinMax;
pub use framebuffer::Framebuffer;
pub use framebuffer_manager::{FramebufferManager, PooledFramebufferId};
pub use ray_trace_field::{spherical_fibonacci, RayTraceField};
pub use texture::{level_count, RenderTexture};
