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

//! The device façade.
//!
//! Creation, destruction and binding for each resource kind live in their own
//! submodule; this file holds the device itself, the frame lifecycle and the
//! loss and shutdown paths.

mod buffer;
mod framebuffer;
mod pipeline;
mod recording;
mod sampler;
mod shader;
mod texture;

pub use self::buffer::BufferResource;
pub use self::framebuffer::FramebufferResource;
pub use self::pipeline::PipelineResource;
pub use self::sampler::SamplerResource;
pub use self::shader::ShaderProgramResource;
pub use self::texture::TextureResource;

use self::recording::Recorder;
use crate::capabilities::CapabilityTable;
use crate::error::{DeviceError, DeviceResult};
use crate::frame::FrameState;
use crate::settings::DeviceSettings;
use crate::stats::{CacheReport, DeviceStats, LiveCounts};
use std::fmt;
use std::sync::Arc;
use strata_core::api::{
    BlendStateKey, DepthStencilStateKey, GraphicsBackendType, PipelineKey, RasterizerStateKey,
    ShaderModuleKey,
};
use strata_core::error::BackendError;
use strata_core::handle::{kind, Handle, ResourceKind, ResourceKindId};
use strata_core::native::*;
use strata_core::traits::GpuBackend;
use strata_data::{
    CompletionSource, DestructionError, DestructionQueue, HandleAllocator, ResourcePool,
    StateCache, TokenStatus,
};

/// Native objects waiting for the GPU, one FIFO per kind.
///
/// Pipelines have no queue: their natives belong to the pipeline cache.
struct DestructionQueues {
    buffers: DestructionQueue<NativeBuffer>,
    textures: DestructionQueue<NativeTexture>,
    framebuffers: DestructionQueue<NativeFramebuffer>,
    samplers: DestructionQueue<NativeSampler>,
    programs: DestructionQueue<NativeProgram>,
}

impl DestructionQueues {
    fn new() -> Self {
        Self {
            buffers: DestructionQueue::new("buffer"),
            textures: DestructionQueue::new("texture"),
            framebuffers: DestructionQueue::new("framebuffer"),
            samplers: DestructionQueue::new("sampler"),
            programs: DestructionQueue::new("shader program"),
        }
    }

    fn assign_pending(&mut self, token: CompletionToken) -> usize {
        self.buffers.assign_pending(token)
            + self.textures.assign_pending(token)
            + self.framebuffers.assign_pending(token)
            + self.samplers.assign_pending(token)
            + self.programs.assign_pending(token)
    }

    /// Processes every queue, even after one fails. Returns the first failure.
    fn process_completed(
        &mut self,
        source: &impl CompletionSource,
    ) -> Result<usize, DestructionError> {
        let results = [
            self.buffers.process_completed(source),
            self.textures.process_completed(source),
            self.framebuffers.process_completed(source),
            self.samplers.process_completed(source),
            self.programs.process_completed(source),
        ];
        let mut total = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(count) => total += count,
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(total),
        }
    }

    fn force_drain(&mut self) -> usize {
        let results = [
            self.buffers.force_drain(),
            self.textures.force_drain(),
            self.framebuffers.force_drain(),
            self.samplers.force_drain(),
            self.programs.force_drain(),
        ];
        results
            .into_iter()
            .map(|result| match result {
                Ok(count) => count,
                Err(error) => {
                    log::warn!("{error}");
                    0
                }
            })
            .sum()
    }

    fn len(&self) -> usize {
        self.buffers.len()
            + self.textures.len()
            + self.framebuffers.len()
            + self.samplers.len()
            + self.programs.len()
    }

    fn torn_down(&self) -> u64 {
        self.buffers.torn_down_total()
            + self.textures.torn_down_total()
            + self.framebuffers.torn_down_total()
            + self.samplers.torn_down_total()
            + self.programs.torn_down_total()
    }
}

/// Permanent caches of immutable native objects.
struct StateCaches {
    shader_modules: StateCache<ShaderModuleKey, NativeShaderModule>,
    blend: StateCache<BlendStateKey, NativeBlendState>,
    depth_stencil: StateCache<DepthStencilStateKey, NativeDepthStencilState>,
    rasterizer: StateCache<RasterizerStateKey, NativeRasterizerState>,
    pipelines: StateCache<PipelineKey, NativePipeline>,
}

impl StateCaches {
    fn new() -> Self {
        Self {
            shader_modules: StateCache::new("shader module"),
            blend: StateCache::new("blend state"),
            depth_stencil: StateCache::new("depth/stencil state"),
            rasterizer: StateCache::new("rasterizer state"),
            pipelines: StateCache::new("pipeline"),
        }
    }

    fn report(&self) -> CacheReport {
        CacheReport {
            shader_modules: self.shader_modules.stats(),
            blend_states: self.blend.stats(),
            depth_stencil_states: self.depth_stencil.stats(),
            rasterizer_states: self.rasterizer.stats(),
            pipelines: self.pipelines.stats(),
        }
    }

    /// Empties every cache and destroys what it held, pipelines first.
    fn release(&self, backend: &dyn GpuBackend) -> usize {
        let mut released = 0;
        let mut count = |result: Result<(), BackendError>| match result {
            Ok(()) => released += 1,
            Err(error) => log::warn!("Failed to release a cached state object: {error}"),
        };
        for (_, native) in self.pipelines.invalidate() {
            count(backend.destroy_pipeline(native));
        }
        for (_, native) in self.blend.invalidate() {
            count(backend.destroy_blend_state(native));
        }
        for (_, native) in self.depth_stencil.invalidate() {
            count(backend.destroy_depth_stencil_state(native));
        }
        for (_, native) in self.rasterizer.invalidate() {
            count(backend.destroy_rasterizer_state(native));
        }
        for (_, native) in self.shader_modules.invalidate() {
            count(backend.destroy_shader_module(native));
        }
        released
    }
}

fn release_pool<K: ResourceKind, T>(
    pool: &mut ResourcePool<K, T>,
    mut destroy: impl FnMut(T) -> Result<(), BackendError>,
) -> usize {
    let mut released = 0;
    for (handle, resource) in pool.drain() {
        match destroy(resource) {
            Ok(()) => released += 1,
            Err(error) => log::warn!("Failed to release {handle:?}: {error}"),
        }
    }
    released
}

/// The façade every rendering call goes through.
///
/// A device owns a backend, the handle allocator shared by every resource
/// kind, one pool and one destruction queue per kind, and the permanent state
/// caches. It is driven by a single thread: `begin_frame`, then any number of
/// create, destroy, bind and draw calls, then `end_frame`.
///
/// Destroying a resource invalidates its handle at once, but its native object
/// is only released at the first `begin_frame` that observes the GPU past the
/// frame in which it was destroyed.
///
/// # Errors
///
/// Every call returns a [`DeviceError`]. Once a call reports
/// [`DeviceError::DeviceLost`], every later call does too.
pub struct Device {
    label: String,
    backend: Arc<dyn GpuBackend>,
    capabilities: CapabilityTable,
    validate: bool,

    frame: FrameState,
    frame_index: u64,
    lost: bool,
    last_submitted: CompletionToken,
    last_frame_commands: usize,
    last_frame_draw_calls: u32,

    handles: HandleAllocator,
    buffers: ResourcePool<kind::Buffer, BufferResource>,
    textures: ResourcePool<kind::Texture, TextureResource>,
    framebuffers: ResourcePool<kind::Framebuffer, FramebufferResource>,
    samplers: ResourcePool<kind::Sampler, SamplerResource>,
    programs: ResourcePool<kind::ShaderProgram, ShaderProgramResource>,
    pipelines: ResourcePool<kind::Pipeline, PipelineResource>,

    queues: DestructionQueues,
    caches: StateCaches,
    recorder: Recorder,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("label", &self.label)
            .field("backend", &self.backend.backend_type())
            .field("frame", &self.frame)
            .field("frame_index", &self.frame_index)
            .field("lost", &self.lost)
            .field("live_handles", &self.handles.live_count())
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Builds a device over `backend`.
    ///
    /// The backend's capability report is read once here and checked whatever
    /// the validation mode.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Validation`] if the capability report is inconsistent.
    pub fn new(backend: Arc<dyn GpuBackend>, settings: DeviceSettings) -> DeviceResult<Self> {
        let capabilities = CapabilityTable::from_report(backend.capabilities())?;
        let validate = settings.validation.is_enabled();

        log::info!(
            "Device '{}' created on {} ({:?}, {} formats, validation {})",
            settings.label,
            capabilities.adapter().name,
            backend.backend_type(),
            capabilities.format_count(),
            if validate { "on" } else { "off" }
        );

        Ok(Self {
            label: settings.label,
            backend,
            capabilities,
            validate,
            frame: FrameState::Idle,
            frame_index: 0,
            lost: false,
            last_submitted: CompletionToken::NONE,
            last_frame_commands: 0,
            last_frame_draw_calls: 0,
            handles: HandleAllocator::with_capacity(settings.initial_handle_capacity),
            buffers: ResourcePool::new(),
            textures: ResourcePool::new(),
            framebuffers: ResourcePool::new(),
            samplers: ResourcePool::new(),
            programs: ResourcePool::new(),
            pipelines: ResourcePool::new(),
            queues: DestructionQueues::new(),
            caches: StateCaches::new(),
            recorder: Recorder::with_capacity(settings.command_capacity),
        })
    }

    // --- Frame lifecycle ---

    /// Starts recording a frame.
    ///
    /// Releases every deferred native object whose frame the GPU has finished,
    /// then enters [`FrameState::Recording`].
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidFrameState`] unless the device is idle, and
    /// [`DeviceError::DeviceLost`] if the backend reports loss while deferred
    /// objects are released.
    pub fn begin_frame(&mut self) -> DeviceResult<()> {
        self.ensure_alive()?;
        if !self.frame.can_begin() {
            return Err(DeviceError::InvalidFrameState {
                operation: "begin_frame",
                state: self.frame,
            });
        }

        let released = self.reclaim_completed()?;
        self.frame_index += 1;
        self.recorder.reset();
        self.frame = FrameState::Recording;
        log::trace!(
            "Frame {} begun, {released} deferred objects released",
            self.frame_index
        );
        Ok(())
    }

    /// Submits the recorded frame and returns its completion token.
    ///
    /// Every object destroyed during the frame is tagged with the token. The
    /// call does not wait for the GPU.
    ///
    /// # Errors
    ///
    /// [`DeviceError::SubmissionFailed`] if the backend refuses the frame; the
    /// device is idle again and the frame's destructions wait for the previous
    /// submission instead. [`DeviceError::DeviceLost`] on loss.
    pub fn end_frame(&mut self) -> DeviceResult<CompletionToken> {
        self.ensure_recording("end_frame")?;
        self.frame = FrameState::Submitted;

        let result = self.backend.submit(self.recorder.commands());
        self.last_frame_commands = self.recorder.commands().len();
        self.last_frame_draw_calls = self.recorder.commands().draw_calls();
        self.recorder.reset();

        match result {
            Ok(token) => {
                self.last_submitted = token;
                let stamped = self.queues.assign_pending(token);
                self.frame = FrameState::Idle;
                log::trace!(
                    "Frame {} submitted as {token} ({} commands, {stamped} deferred objects)",
                    self.frame_index,
                    self.last_frame_commands
                );
                Ok(token)
            }
            Err(error) if error.is_device_lost() => {
                self.enter_lost();
                Err(DeviceError::DeviceLost)
            }
            Err(error) => {
                log::error!("Frame {} submission failed: {error}", self.frame_index);
                // The frame never reached the GPU.
                self.queues.assign_pending(self.last_submitted);
                self.frame = FrameState::Idle;
                Err(DeviceError::SubmissionFailed(error))
            }
        }
    }

    /// Blocks until the GPU has finished every submission, then releases every
    /// deferred native object. Meant for shutdown and tests, not for frames.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidFrameState`] unless the device is idle.
    pub fn wait_idle(&mut self) -> DeviceResult<()> {
        self.ensure_alive()?;
        if !self.frame.can_begin() {
            return Err(DeviceError::InvalidFrameState {
                operation: "wait_idle",
                state: self.frame,
            });
        }
        if let Err(error) = self.backend.wait_idle() {
            log::error!("Waiting for the GPU failed: {error}");
            self.enter_lost();
            return Err(DeviceError::DeviceLost);
        }
        self.reclaim_completed()?;
        Ok(())
    }

    fn reclaim_completed(&mut self) -> DeviceResult<usize> {
        let completed = match self.backend.completed_token() {
            Ok(token) => token,
            Err(error) => {
                log::error!("Querying GPU progress failed: {error}");
                self.enter_lost();
                return Err(DeviceError::DeviceLost);
            }
        };
        let source = |token: CompletionToken| {
            if token.is_reached_by(completed) {
                TokenStatus::Complete
            } else {
                TokenStatus::Pending
            }
        };
        match self.queues.process_completed(&source) {
            Ok(released) => Ok(released),
            Err(error) => {
                log::error!("{error}");
                self.enter_lost();
                Err(DeviceError::DeviceLost)
            }
        }
    }

    // --- Guards and failure routing ---

    fn ensure_alive(&self) -> DeviceResult<()> {
        if self.lost {
            Err(DeviceError::DeviceLost)
        } else {
            Ok(())
        }
    }

    fn ensure_recording(&self, operation: &'static str) -> DeviceResult<()> {
        self.ensure_alive()?;
        if self.frame.is_recording() {
            Ok(())
        } else {
            Err(DeviceError::InvalidFrameState {
                operation,
                state: self.frame,
            })
        }
    }

    fn creation_failed(&mut self, kind: ResourceKindId, error: BackendError) -> DeviceError {
        if error.is_device_lost() {
            self.enter_lost();
            return DeviceError::DeviceLost;
        }
        log::warn!("Backend refused to create a {kind}: {error}");
        DeviceError::ResourceCreation {
            kind,
            source: error,
        }
    }

    fn upload_failed(&mut self, kind: ResourceKindId, error: BackendError) -> DeviceError {
        if error.is_device_lost() {
            self.enter_lost();
            return DeviceError::DeviceLost;
        }
        log::warn!("Backend refused an upload into a {kind}: {error}");
        DeviceError::UploadFailed {
            kind,
            source: error,
        }
    }

    /// Enters the lost state: every handle dies and every native object is
    /// released without waiting.
    fn enter_lost(&mut self) {
        if self.lost {
            return;
        }
        self.lost = true;
        self.frame = FrameState::Idle;
        self.recorder.reset();
        let invalidated = self.handles.invalidate_all();
        let released = self.release_all();
        log::error!(
            "Device '{}' lost during frame {}: {invalidated} handles invalidated, {released} native objects released",
            self.label,
            self.frame_index
        );
    }

    /// Releases deferred objects, live resources and cached state objects, in
    /// that order. Returns how many native objects were released.
    fn release_all(&mut self) -> usize {
        let mut released = self.queues.force_drain();
        let backend = &*self.backend;

        // Pipeline natives belong to the cache.
        released += release_pool(&mut self.pipelines, |_| Ok(()));
        released += release_pool(&mut self.framebuffers, |resource| {
            backend.destroy_framebuffer(resource.native)
        });
        released += release_pool(&mut self.textures, |resource| backend.destroy_texture(resource.native));
        released += release_pool(&mut self.buffers, |resource| backend.destroy_buffer(resource.native));
        released += release_pool(&mut self.samplers, |resource| backend.destroy_sampler(resource.native));
        released += release_pool(&mut self.programs, |resource| backend.destroy_program(resource.native));

        released + self.caches.release(backend)
    }

    // --- Queries ---

    /// The label from the settings.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The capability table, fixed since construction.
    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// The native API family of the backend.
    pub fn backend_type(&self) -> GraphicsBackendType {
        self.backend.backend_type()
    }

    /// Where the device is in its frame lifecycle.
    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    /// Frames begun so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns `true` once the device is lost.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Returns `true` if descriptions and commands are validated.
    pub fn validation_enabled(&self) -> bool {
        self.validate
    }

    /// The token of the last successful submission.
    pub fn last_submitted(&self) -> CompletionToken {
        self.last_submitted
    }

    /// Returns `true` if `handle` names a live resource. Never fails.
    pub fn is_valid<K: ResourceKind>(&self, handle: Handle<K>) -> bool {
        self.handles.is_valid(handle)
    }

    /// A snapshot of the device's contents and counters.
    pub fn stats(&self) -> DeviceStats {
        DeviceStats {
            frame_index: self.frame_index,
            last_submitted: self.last_submitted,
            live: LiveCounts {
                buffers: self.buffers.len(),
                textures: self.textures.len(),
                framebuffers: self.framebuffers.len(),
                samplers: self.samplers.len(),
                shader_programs: self.programs.len(),
                pipelines: self.pipelines.len(),
            },
            pending_destructions: self.queues.len(),
            torn_down: self.queues.torn_down(),
            caches: self.caches.report(),
            last_frame_commands: self.last_frame_commands,
            last_frame_draw_calls: self.last_frame_draw_calls,
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if !self.lost {
            if let Err(error) = self.backend.wait_idle() {
                log::error!("Waiting for the GPU at shutdown failed: {error}");
            }
        }
        let stats = self.stats();
        let released = self.release_all();
        log::info!(
            "Device '{}' shut down after {} frames ({} live resources, {released} native objects released)",
            self.label,
            self.frame_index,
            stats.live.total()
        );
    }
}
