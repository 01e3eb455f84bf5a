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

//! Acts as the **[A]gent** of the render thread.
//!
//! [`RenderThreadAgent`] owns the device handle, the framebuffer pool, the
//! deferred composer and the delayed-operations mailbox. Nothing else touches
//! GPU objects. Other threads either queue work on the mailbox or talk to the
//! agent through a [`ConsoleClient`].

mod agent;
mod console_bridge;

pub use agent::{FrameContext, RenderThreadAgent};
pub use console_bridge::{ConsoleClient, ConsoleClientError, ConsoleRequest};
