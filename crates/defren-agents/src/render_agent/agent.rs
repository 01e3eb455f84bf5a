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

//! Defines the RenderThreadAgent, the owner of every GPU-facing lane.

use super::console_bridge::{ConsoleClient, ConsoleRequest};
use defren_core::{
    math::Extent2D,
    renderer::{DeviceCapabilities, GraphicsDevice, RenderError, RenderSettings},
    EventBus,
};
use defren_lanes::{ConsoleContext, DebugConsole, DeferredRendering, DelayedOperations, FramebufferManager};
use std::sync::Arc;

/// What a frame's passes get to work with.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// The device the frame renders on.
    pub device: &'a Arc<dyn GraphicsDevice>,
    /// The mailbox for work the passes want to defer.
    pub delayed: &'a Arc<DelayedOperations>,
    /// The framebuffer pool and binding tracker.
    pub framebuffers: &'a mut FramebufferManager,
    /// The deferred targets, already sized for this frame.
    pub deferred: &'a mut DeferredRendering,
    /// The size the frame renders at after down-scaling and limiting.
    pub render_size: Extent2D,
    /// The free debug switch.
    pub quick_debug: i32,
    /// Index of the frame, starting at 0.
    pub frame: u64,
}

/// The agent running on the render thread.
pub struct RenderThreadAgent {
    device: Arc<dyn GraphicsDevice>,
    capabilities: DeviceCapabilities,
    delayed: Arc<DelayedOperations>,
    settings: RenderSettings,
    framebuffers: FramebufferManager,
    deferred: DeferredRendering,
    console: DebugConsole,
    console_bus: EventBus<ConsoleRequest>,
    // Number of frames started, aborted ones included.
    frame_count: u64,
}

impl std::fmt::Debug for RenderThreadAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderThreadAgent")
            .field("frame_count", &self.frame_count)
            .field("render_size", &(self.deferred.width(), self.deferred.height()))
            .field("delayed", &self.delayed)
            .finish_non_exhaustive()
    }
}

impl RenderThreadAgent {
    /// Creates the agent and the lanes it owns.
    ///
    /// Must be called on the render thread. The deferred targets start at
    /// their initial size and grow on the first frame.
    pub fn new(device: Arc<dyn GraphicsDevice>, settings: RenderSettings) -> Result<Self, RenderError> {
        let capabilities = device.capabilities();
        let delayed = Arc::new(DelayedOperations::new(settings.delete_objects_per_frame));
        let framebuffers = FramebufferManager::new(Arc::clone(&device), Arc::clone(&delayed));
        let deferred = DeferredRendering::new(Arc::clone(&device), Arc::clone(&delayed), &settings)?;

        log::info!(
            "RenderThreadAgent: started (max draw buffers {}, max texture size {})",
            capabilities.max_draw_buffers,
            capabilities.max_texture_size
        );

        Ok(Self {
            device,
            capabilities,
            delayed,
            settings,
            framebuffers,
            deferred,
            console: DebugConsole::new(),
            console_bus: EventBus::new(),
            frame_count: 0,
        })
    }

    /// The device the agent renders on.
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// The mailbox other threads queue GPU work on. Clone the `Arc` to hand it out.
    pub fn delayed(&self) -> &Arc<DelayedOperations> {
        &self.delayed
    }

    /// The settings the agent was created with, with the console's changes applied.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// The framebuffer pool.
    pub fn framebuffers(&self) -> &FramebufferManager {
        &self.framebuffers
    }

    /// The deferred targets.
    pub fn deferred(&self) -> &DeferredRendering {
        &self.deferred
    }

    /// Number of frames started so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns a handle other threads use to run console commands.
    pub fn console_client(&self) -> ConsoleClient {
        ConsoleClient::new(self.console_bus.sender())
    }

    /// Renders one frame of `width` x `height` window pixels.
    ///
    /// Queued deletions and initializations run first, then the deferred
    /// targets are sized and `pass` renders. Afterwards the depth buffers swap
    /// and queued synchronizations run. Console requests are answered last.
    ///
    /// An error aborts the rest of the frame. It is logged and returned; the
    /// primary framebuffer is bound again and console requests are still
    /// answered.
    pub fn render_frame<F>(&mut self, width: u32, height: u32, pass: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut FrameContext<'_>) -> Result<(), RenderError>,
    {
        let frame = self.frame_count;
        self.frame_count += 1;

        let result = self.run_frame(frame, width, height, pass);
        if let Err(err) = &result {
            log::error!("RenderThreadAgent: frame {frame} aborted: {err}");
            if let Err(err) = self.framebuffers.activate_primary() {
                log::warn!("RenderThreadAgent: failed to bind the primary framebuffer after frame {frame}: {err}");
            }
        }
        // Aborted frames answer the console too.
        self.process_console_requests();
        result
    }

    fn run_frame<F>(&mut self, frame: u64, width: u32, height: u32, pass: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut FrameContext<'_>) -> Result<(), RenderError>,
    {
        let deleted = self.delayed.process_free_operations(self.device.as_ref(), false);
        if deleted > 0 {
            log::trace!("RenderThreadAgent: destroyed {deleted} GPU objects");
        }

        self.delayed.process_async_res_init_operations()?;
        self.delayed.process_recreate_res_operations()?;
        self.delayed.process_init_operations(self.device.as_ref())?;

        let render_size = self.settings.limit_render_size(width, height);
        self.deferred
            .resize(&mut self.framebuffers, render_size.width, render_size.height, 1)?;
        self.deferred.reset_depth_textures();
        self.deferred.init_post_process_target();

        let mut ctx = FrameContext {
            device: &self.device,
            delayed: &self.delayed,
            framebuffers: &mut self.framebuffers,
            deferred: &mut self.deferred,
            render_size,
            quick_debug: self.settings.quick_debug,
            frame,
        };
        pass(&mut ctx)?;

        self.deferred.swap_depth_textures();
        self.framebuffers.activate_primary()?;
        self.delayed.process_synchronize_operations()?;
        Ok(())
    }

    /// Answers every console request queued so far. Returns how many there were.
    ///
    /// [`render_frame`](Self::render_frame) calls this once per frame.
    pub fn process_console_requests(&mut self) -> usize {
        let requests = self.console_bus.drain();
        for request in &requests {
            let ctx = ConsoleContext {
                capabilities: &self.capabilities,
                framebuffers: &self.framebuffers,
                quick_debug: &mut self.settings.quick_debug,
            };
            let reply = match self.console.execute(&request.line, ctx) {
                Ok(reply) => reply,
                Err(err) => err.to_string(),
            };
            if request.reply.send(reply).is_err() {
                log::warn!("RenderThreadAgent: console client left before '{}' was answered", request.line);
            }
        }
        requests.len()
    }

    /// Drops every pooled framebuffer no pass holds on to, for example after
    /// the window was resized many times.
    pub fn remove_unused_framebuffers(&mut self) -> Result<usize, RenderError> {
        self.framebuffers.remove_unused()
    }

    /// Stops the agent: answers the last console requests, drops the lanes and
    /// runs every queued operation to completion, their GPU objects included.
    pub fn shutdown(mut self) {
        if let Err(err) = self.framebuffers.activate_primary() {
            log::warn!("RenderThreadAgent: failed to bind the primary framebuffer on shutdown: {err}");
        }
        self.process_console_requests();

        let Self {
            device,
            delayed,
            framebuffers,
            deferred,
            frame_count,
            ..
        } = self;
        drop(deferred);
        drop(framebuffers);
        delayed.clear(device.as_ref());
        log::info!("RenderThreadAgent: shut down after {frame_count} frames");
    }
}
