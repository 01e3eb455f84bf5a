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

//! # DefRen Agents
//!
//! Agents own the lanes and decide when each of them runs. The render thread
//! agent drives one frame at a time: it realizes the work other threads
//! queued, sizes the deferred targets, hands them to the caller's passes and
//! answers debug console requests.

#![warn(missing_docs)]

pub mod render_agent;

pub use render_agent::{ConsoleClient, ConsoleClientError, ConsoleRequest, FrameContext, RenderThreadAgent};
