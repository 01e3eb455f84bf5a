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

//! # DefRen Lanes
//!
//! The render-thread hot paths of the deferred renderer: the framebuffer wrapper
//! and its pool, the deferred-rendering target composer, the depth min/max
//! pyramid, the ray-trace probe field, the delayed-operations mailbox and the
//! debug console.
//!
//! Everything in here talks to the GPU exclusively through
//! [`defren_core::renderer::GraphicsDevice`].

#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod delayed;
pub mod render_lane;

pub use config::{load_settings, ConfigError};
pub use console::{ConsoleContext, ConsoleError, DebugConsole};
pub use delayed::{DelayedOperations, GpuObject, InitKind};
pub use render_lane::*;
