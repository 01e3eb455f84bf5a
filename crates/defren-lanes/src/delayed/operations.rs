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

use defren_core::renderer::{FramebufferId, GraphicsDevice, RenderError, ResourceError, TextureId};
use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A resource loaded asynchronously whose last step must run on the render thread.
pub trait AsyncResInit: Send + Sync {
    /// Finishes loading. Called once from the render thread.
    fn finalize_async_res_loading(&self) -> Result<(), RenderError>;
}

/// A resource whose GPU side failed and has to be rebuilt.
pub trait RecreateRes: Send + Sync {
    /// Returns `false` once the owner of the resource is gone, the entry is
    /// then dropped without recreating anything.
    fn has_owner(&self) -> bool {
        true
    }

    /// Rebuilds the resource.
    fn recreate(&self) -> Result<(), RenderError>;

    /// A name for logging.
    fn name(&self) -> String;
}

/// A resource whose GPU objects are created on the render thread.
pub trait DelayedInit: Send + Sync {
    /// Creates the GPU side of the resource.
    fn initialize(&self, device: &dyn GraphicsDevice) -> Result<(), RenderError>;

    /// Drops whatever [`DelayedInit::initialize`] managed to create before it failed.
    fn release(&self, device: &dyn GraphicsDevice);
}

/// A camera whose links into its world must be cut on the render thread.
pub trait CameraCleanUp: Send + Sync {
    /// Detaches the camera from its parent world.
    fn clean_up(&self);
}

/// Work that must run on the render thread but touches main-thread state,
/// such as writing a captured image to disk.
pub trait SynchronizeOp: Send + Sync {
    /// Runs the operation.
    fn synchronize(&self) -> Result<(), RenderError>;
}

/// The category of a delayed initialization. Categories are processed in
/// declaration order: images before the skins using them, skins before models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitKind {
    /// An image.
    Image,
    /// A skin (material set).
    Skin,
    /// A model.
    Model,
}

/// A GPU object waiting to be destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuObject {
    /// A texture.
    Texture(TextureId),
    /// An off-screen framebuffer.
    Framebuffer(FramebufferId),
}

impl GpuObject {
    fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        match self {
            GpuObject::Texture(id) => device.destroy_texture(id),
            GpuObject::Framebuffer(id) => device.destroy_framebuffer(id),
        }
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A list of pending resources compared by identity, with a lock-free
/// "has work" flag so idle frames never touch the mutex.
struct PendingList<T: ?Sized> {
    items: Mutex<Vec<Arc<T>>>,
    pending: AtomicBool,
}

impl<T: ?Sized> PendingList<T> {
    fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            pending: AtomicBool::new(false),
        }
    }

    fn add(&self, item: &Arc<T>) -> bool {
        let mut items = lock(&self.items);
        if items.iter().any(|i| same(i, item)) {
            return false;
        }
        items.push(Arc::clone(item));
        self.pending.store(true, Ordering::Release);
        true
    }

    fn remove(&self, item: &Arc<T>) -> bool {
        let mut items = lock(&self.items);
        let Some(index) = items.iter().position(|i| same(i, item)) else {
            return false;
        };
        items.remove(index);
        self.pending.store(!items.is_empty(), Ordering::Release);
        true
    }

    fn take(&self) -> Vec<Arc<T>> {
        if !self.pending.load(Ordering::Acquire) {
            return Vec::new();
        }
        let mut items = lock(&self.items);
        self.pending.store(false, Ordering::Release);
        std::mem::take(&mut *items)
    }

    /// Puts unprocessed items back in front of anything queued meanwhile.
    fn restore(&self, mut rest: Vec<Arc<T>>) {
        let mut items = lock(&self.items);
        for queued in items.drain(..) {
            if !rest.iter().any(|i| same(i, &queued)) {
                rest.push(queued);
            }
        }
        *items = rest;
        self.pending.store(!items.is_empty(), Ordering::Release);
    }

    fn len(&self) -> usize {
        lock(&self.items).len()
    }

    fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Drains `list` outside its lock and runs `f` on every item. On the first
/// failure the items not yet processed are queued again and the error returned.
fn run_queued<T: ?Sized>(
    list: &PendingList<T>,
    mut f: impl FnMut(&Arc<T>) -> Result<(), RenderError>,
) -> Result<usize, RenderError> {
    let mut items = list.take().into_iter();
    let mut processed = 0;
    while let Some(item) = items.next() {
        if let Err(err) = f(&item) {
            list.restore(items.collect());
            return Err(err);
        }
        processed += 1;
    }
    Ok(processed)
}

/// Queues work for the render thread.
///
/// Shared through an `Arc` between every thread creating or dropping GPU
/// resources. Each list has its own mutex held only while the list is being
/// changed or drained; resource callbacks and device calls always run after the
/// lock is released. Adding a resource already queued is a no-op.
pub struct DelayedOperations {
    async_res_init: PendingList<dyn AsyncResInit>,
    recreate_res: PendingList<dyn RecreateRes>,
    init_images: PendingList<dyn DelayedInit>,
    init_skins: PendingList<dyn DelayedInit>,
    init_models: PendingList<dyn DelayedInit>,
    clean_up_cameras: PendingList<dyn CameraCleanUp>,
    synchronize: PendingList<dyn SynchronizeOp>,
    release_objects: Mutex<Vec<Box<dyn Any + Send>>>,
    gpu_objects: Mutex<VecDeque<GpuObject>>,
    // 0 means unlimited
    delete_per_frame: AtomicUsize,
}

impl std::fmt::Debug for DelayedOperations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedOperations")
            .field("async_res_init", &self.async_res_init.len())
            .field("init", &self.init_count())
            .field("gpu_objects", &self.pending_gpu_deletions())
            .finish_non_exhaustive()
    }
}

impl Default for DelayedOperations {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DelayedOperations {
    /// Creates an empty mailbox.
    ///
    /// # Arguments
    ///
    /// * `delete_objects_per_frame` - Upper bound of GPU objects destroyed by one
    ///   [`process_free_operations`](Self::process_free_operations) call, `None` for no bound.
    pub fn new(delete_objects_per_frame: Option<usize>) -> Self {
        Self {
            async_res_init: PendingList::new(),
            recreate_res: PendingList::new(),
            init_images: PendingList::new(),
            init_skins: PendingList::new(),
            init_models: PendingList::new(),
            clean_up_cameras: PendingList::new(),
            synchronize: PendingList::new(),
            release_objects: Mutex::new(Vec::new()),
            gpu_objects: Mutex::new(VecDeque::new()),
            delete_per_frame: AtomicUsize::new(delete_objects_per_frame.unwrap_or(0)),
        }
    }

    /// Changes the per-frame deletion bound.
    pub fn set_delete_objects_per_frame(&self, limit: Option<usize>) {
        self.delete_per_frame
            .store(limit.unwrap_or(0), Ordering::Relaxed);
    }

    /// Returns the per-frame deletion bound.
    pub fn delete_objects_per_frame(&self) -> Option<usize> {
        match self.delete_per_frame.load(Ordering::Relaxed) {
            0 => None,
            limit => Some(limit),
        }
    }

    // --- Asynchronous resource finalization ---

    /// Queues a resource whose loading finishes on the render thread.
    /// Returns `false` if it was already queued.
    pub fn add_async_res_init(&self, res: &Arc<dyn AsyncResInit>) -> bool {
        self.async_res_init.add(res)
    }

    /// Removes a queued resource. Returns `false` if it was not queued.
    pub fn remove_async_res_init(&self, res: &Arc<dyn AsyncResInit>) -> bool {
        self.async_res_init.remove(res)
    }

    /// Finalizes every queued asynchronously loaded resource.
    pub fn process_async_res_init_operations(&self) -> Result<usize, RenderError> {
        run_queued(&self.async_res_init, |res| res.finalize_async_res_loading())
    }

    // --- Recreation ---

    /// Queues a resource to be rebuilt.
    pub fn add_recreate_res(&self, res: &Arc<dyn RecreateRes>) -> bool {
        self.recreate_res.add(res)
    }

    /// Rebuilds every queued resource whose owner still exists.
    pub fn process_recreate_res_operations(&self) -> Result<usize, RenderError> {
        run_queued(&self.recreate_res, |res| {
            if res.has_owner() {
                log::info!("DelayedOperations: Recreate resource: {}", res.name());
                res.recreate()?;
            }
            Ok(())
        })
    }

    // --- Initialization ---

    fn init_list(&self, kind: InitKind) -> &PendingList<dyn DelayedInit> {
        match kind {
            InitKind::Image => &self.init_images,
            InitKind::Skin => &self.init_skins,
            InitKind::Model => &self.init_models,
        }
    }

    /// Queues a resource whose GPU objects are created on the render thread.
    pub fn add_init(&self, kind: InitKind, res: &Arc<dyn DelayedInit>) -> bool {
        self.init_list(kind).add(res)
    }

    /// Removes a queued resource, for example because it was dropped before
    /// the render thread got to it.
    pub fn remove_init(&self, kind: InitKind, res: &Arc<dyn DelayedInit>) -> bool {
        self.init_list(kind).remove(res)
    }

    /// Returns `true` if any initialization is queued.
    pub fn has_init_operations(&self) -> bool {
        self.init_images.is_pending() || self.init_skins.is_pending() || self.init_models.is_pending()
    }

    fn init_count(&self) -> usize {
        self.init_images.len() + self.init_skins.len() + self.init_models.len()
    }

    /// Initializes queued images, then skins, then models.
    ///
    /// If a resource fails, it is released, the resources not reached yet stay
    /// queued and the error is returned.
    pub fn process_init_operations(&self, device: &dyn GraphicsDevice) -> Result<usize, RenderError> {
        let mut processed = 0;
        for kind in [InitKind::Image, InitKind::Skin, InitKind::Model] {
            processed += run_queued(self.init_list(kind), |res| {
                if let Err(err) = res.initialize(device) {
                    log::error!("DelayedOperations: {kind:?} initialization failed: {err}");
                    res.release(device);
                    return Err(err);
                }
                Ok(())
            })?;
        }
        Ok(processed)
    }

    // --- Freeing ---

    /// Queues a camera for cleanup.
    pub fn add_clean_up_camera(&self, camera: &Arc<dyn CameraCleanUp>) -> bool {
        self.clean_up_cameras.add(camera)
    }

    /// Hands over an object that must be dropped on the render thread.
    pub fn add_release_object(&self, object: Box<dyn Any + Send>) {
        lock(&self.release_objects).push(object);
    }

    /// Queues a GPU object for destruction.
    pub fn delete_gpu_object(&self, object: GpuObject) {
        lock(&self.gpu_objects).push_back(object);
    }

    /// Number of GPU objects waiting for destruction.
    pub fn pending_gpu_deletions(&self) -> usize {
        lock(&self.gpu_objects).len()
    }

    /// Cleans up cameras, drops released objects and destroys queued GPU objects.
    ///
    /// Cameras go first since cutting their links can release further objects.
    /// Unless `delete_all` is set, at most the configured number of GPU objects
    /// is destroyed; the rest waits for the next frame.
    ///
    /// # Returns
    ///
    /// The number of GPU objects destroyed.
    pub fn process_free_operations(&self, device: &dyn GraphicsDevice, delete_all: bool) -> usize {
        for camera in self.clean_up_cameras.take() {
            camera.clean_up();
        }

        // Dropping an object may release others.
        loop {
            let objects = std::mem::take(&mut *lock(&self.release_objects));
            if objects.is_empty() {
                break;
            }
            drop(objects);
        }

        let batch: Vec<GpuObject> = {
            let mut queue = lock(&self.gpu_objects);
            let count = match self.delete_objects_per_frame() {
                Some(limit) if !delete_all => limit.min(queue.len()),
                _ => queue.len(),
            };
            queue.drain(..count).collect()
        };

        for object in &batch {
            if let Err(err) = object.destroy(device) {
                log::warn!("DelayedOperations: Failed to destroy {object:?}: {err}");
            }
        }
        batch.len()
    }

    // --- Synchronization ---

    /// Queues a synchronization operation.
    pub fn add_synchronize(&self, op: &Arc<dyn SynchronizeOp>) -> bool {
        self.synchronize.add(op)
    }

    /// Runs every queued synchronization operation.
    pub fn process_synchronize_operations(&self) -> Result<usize, RenderError> {
        run_queued(&self.synchronize, |op| op.synchronize())
    }

    /// Empties every list. Used when the render thread shuts down.
    ///
    /// Pending initializations are dropped without running, outstanding
    /// deletions and synchronizations are carried out.
    pub fn clear(&self, device: &dyn GraphicsDevice) {
        self.process_free_operations(device, true);

        drop(self.init_images.take());
        drop(self.init_skins.take());
        drop(self.init_models.take());
        drop(self.async_res_init.take());
        drop(self.recreate_res.take());
        drop(self.clean_up_cameras.take());

        while self.pending_gpu_deletions() > 0 || !lock(&self.release_objects).is_empty() {
            self.process_free_operations(device, true);
        }

        if let Err(err) = self.process_synchronize_operations() {
            log::error!("DelayedOperations: Synchronization failed during clear: {err}");
        }
    }
}
