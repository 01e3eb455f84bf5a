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

//! Pool of off-screen framebuffers keyed by resolution, plus tracking of the
//! currently bound render target.

use super::framebuffer::Framebuffer;
use crate::delayed::DelayedOperations;
use defren_core::renderer::{FramebufferId, GraphicsDevice, RenderError};
use std::fmt::Write as _;
use std::sync::Arc;

/// Identifies a framebuffer held by a [`FramebufferManager`].
///
/// An id outlives its framebuffer: once the entry is removed the id stops
/// resolving, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PooledFramebufferId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Default)]
struct PoolSlot {
    // Bumped every time the slot is emptied.
    generation: u32,
    framebuffer: Option<Framebuffer>,
}

/// Hands out framebuffers sized exactly to a requested resolution.
///
/// The pool is scanned linearly: it holds a handful of entries at most, so
/// hashing would cost more than it saves. Entries with a usage count above zero
/// are never handed out again until released.
#[derive(Debug)]
pub struct FramebufferManager {
    device: Arc<dyn GraphicsDevice>,
    delayed: Arc<DelayedOperations>,
    primary: Framebuffer,
    pool: Vec<PoolSlot>,
    // `None` while the primary framebuffer is bound.
    active: Option<FramebufferId>,
}

impl FramebufferManager {
    /// Creates an empty pool. The primary framebuffer starts out bound.
    pub fn new(device: Arc<dyn GraphicsDevice>, delayed: Arc<DelayedOperations>) -> Self {
        let primary = Framebuffer::new_primary(Arc::clone(&device), Arc::clone(&delayed));
        Self {
            device,
            delayed,
            primary,
            pool: Vec::new(),
            active: None,
        }
    }

    /// The primary framebuffer.
    pub fn primary(&self) -> &Framebuffer {
        &self.primary
    }

    /// The device the pool creates framebuffers on.
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// The delayed operations framebuffers queue their deletion on.
    pub fn delayed(&self) -> &Arc<DelayedOperations> {
        &self.delayed
    }

    /// Number of pooled framebuffers.
    pub fn len(&self) -> usize {
        self.pool.iter().filter(|slot| slot.framebuffer.is_some()).count()
    }

    /// Returns `true` if nothing is pooled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an unused framebuffer with the given usage resolution, creating
    /// one if none is free.
    pub fn get_framebuffer_for(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<PooledFramebufferId, RenderError> {
        let hit = self.pool.iter().position(|slot| {
            slot.framebuffer.as_ref().is_some_and(|fb| {
                fb.usage_count() == 0 && fb.usage_width() == width && fb.usage_height() == height
            })
        });
        if let Some(index) = hit {
            return Ok(PooledFramebufferId {
                index,
                generation: self.pool[index].generation,
            });
        }

        let label = format!("Pool.{width}x{height}.{}", self.pool.len());
        let mut framebuffer = Framebuffer::new(
            Arc::clone(&self.device),
            Arc::clone(&self.delayed),
            label,
        )?;
        framebuffer.set_usage_resolution(width, height)?;

        let index = match self.pool.iter().position(|slot| slot.framebuffer.is_none()) {
            Some(index) => index,
            None => {
                self.pool.push(PoolSlot::default());
                self.pool.len() - 1
            }
        };
        let slot = &mut self.pool[index];
        slot.framebuffer = Some(framebuffer);
        let id = PooledFramebufferId {
            index,
            generation: slot.generation,
        };
        log::debug!("FramebufferManager: created framebuffer {width}x{height} (pool size {})", self.len());
        Ok(id)
    }

    /// Like [`get_framebuffer_for`](Self::get_framebuffer_for) but also marks the
    /// framebuffer used until [`release`](Self::release) is called.
    pub fn acquire(&mut self, width: u32, height: u32) -> Result<PooledFramebufferId, RenderError> {
        let id = self.get_framebuffer_for(width, height)?;
        if let Some(fb) = self.get_mut(id) {
            fb.increase_usage_count();
        }
        Ok(id)
    }

    /// Releases a framebuffer obtained from [`acquire`](Self::acquire).
    pub fn release(&mut self, id: PooledFramebufferId) {
        if let Some(fb) = self.get_mut(id) {
            fb.decrease_usage_count();
        }
    }

    /// Returns a pooled framebuffer, `None` if it has been removed.
    pub fn get(&self, id: PooledFramebufferId) -> Option<&Framebuffer> {
        self.pool
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.framebuffer.as_ref())
    }

    /// Returns a pooled framebuffer for attaching images.
    pub fn get_mut(&mut self, id: PooledFramebufferId) -> Option<&mut Framebuffer> {
        self.pool
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.framebuffer.as_mut())
    }

    /// The device handle of the bound framebuffer, `None` when the primary is bound.
    pub fn active(&self) -> Option<FramebufferId> {
        self.active
    }

    fn bind(&mut self, target: Option<FramebufferId>) -> Result<(), RenderError> {
        if self.active == target {
            return Ok(());
        }
        self.device.bind_framebuffer(target)?;
        self.active = target;
        Ok(())
    }

    /// Binds `framebuffer` unless it is already bound.
    pub fn activate(&mut self, framebuffer: &Framebuffer) -> Result<(), RenderError> {
        self.bind(framebuffer.id())
    }

    /// Binds a pooled framebuffer unless it is already bound.
    pub fn activate_pooled(&mut self, id: PooledFramebufferId) -> Result<(), RenderError> {
        let target = self
            .get(id)
            .ok_or_else(|| RenderError::invalid_parameter(format!("unknown pooled framebuffer {id:?}")))?
            .id();
        self.bind(target)
    }

    /// Binds the primary framebuffer unless it is already bound.
    pub fn activate_primary(&mut self) -> Result<(), RenderError> {
        self.bind(None)
    }

    /// Drops every pooled framebuffer nobody uses. Returns how many were dropped.
    ///
    /// If the bound framebuffer is among them the primary is bound first.
    pub fn remove_unused(&mut self) -> Result<usize, RenderError> {
        let active_unused = self.pool.iter().filter_map(|slot| slot.framebuffer.as_ref()).any(|fb| {
            fb.usage_count() == 0 && self.active.is_some() && fb.id() == self.active
        });
        if active_unused {
            self.activate_primary()?;
        }

        let mut removed = 0;
        for slot in &mut self.pool {
            if slot.framebuffer.as_ref().is_some_and(|fb| fb.usage_count() == 0) {
                slot.framebuffer = None;
                slot.generation = slot.generation.wrapping_add(1);
                removed += 1;
            }
        }
        if removed > 0 {
            log::debug!("FramebufferManager: removed {removed} unused framebuffers");
        }
        Ok(removed)
    }

    /// Lists every pooled framebuffer.
    pub fn debug_info(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Framebuffers: {}", self.len());
        for (index, slot) in self.pool.iter().enumerate() {
            if let Some(fb) = &slot.framebuffer {
                let _ = writeln!(
                    out,
                    "{index}: {} size={}x{} usage={} colors={} depth={} stencil={}",
                    fb.label(),
                    fb.usage_width(),
                    fb.usage_height(),
                    fb.usage_count(),
                    fb.contiguous_color_count(),
                    if fb.is_depth_attached() { "yes" } else { "no" },
                    if fb.is_stencil_attached() { "yes" } else { "no" },
                );
            }
        }
        out
    }
}
