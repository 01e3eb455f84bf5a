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

//! The render-thread mailbox.
//!
//! Other threads never touch GPU objects. They describe the work and queue it
//! here; the render thread realizes it at fixed points of its frame.

mod operations;

pub use operations::{
    AsyncResInit, CameraCleanUp, DelayedInit, DelayedOperations, GpuObject, InitKind,
    RecreateRes, SynchronizeOp,
};
