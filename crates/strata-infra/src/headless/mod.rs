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

//! A software-simulated GPU.
//!
//! [`HeadlessBackend`] keeps a table of live native objects and a fence
//! timeline, and enforces the rules a real driver would crash on: an object
//! referenced by a submission the GPU has not finished cannot be destroyed,
//! and a submission cannot reference a destroyed object. It also exposes
//! counters and fault injection for tests.

mod profiles;

pub use self::profiles::BackendProfile;

use ahash::AHashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use strata_core::api::*;
use strata_core::error::BackendError;
use strata_core::native::*;
use strata_core::traits::GpuBackend;

/// How the simulated GPU advances its completion token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceMode {
    /// Every submission completes as soon as it is submitted.
    #[default]
    Immediate,
    /// Submissions complete only when [`HeadlessBackend::signal`] or
    /// [`HeadlessBackend::signal_all`] says so.
    Manual,
    /// The GPU runs this many submissions behind the CPU.
    Lagged(u64),
}

/// The kinds of native object the simulated GPU tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// A buffer.
    Buffer,
    /// A texture.
    Texture,
    /// A framebuffer.
    Framebuffer,
    /// A sampler.
    Sampler,
    /// A compiled shader stage.
    ShaderModule,
    /// A linked program.
    Program,
    /// A blend state object.
    BlendState,
    /// A depth/stencil state object.
    DepthStencilState,
    /// A rasterizer state object.
    RasterizerState,
    /// A pipeline state object.
    Pipeline,
}

impl NativeKind {
    /// Every kind.
    pub const ALL: [NativeKind; 10] = [
        NativeKind::Buffer,
        NativeKind::Texture,
        NativeKind::Framebuffer,
        NativeKind::Sampler,
        NativeKind::ShaderModule,
        NativeKind::Program,
        NativeKind::BlendState,
        NativeKind::DepthStencilState,
        NativeKind::RasterizerState,
        NativeKind::Pipeline,
    ];

    /// A lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            NativeKind::Buffer => "buffer",
            NativeKind::Texture => "texture",
            NativeKind::Framebuffer => "framebuffer",
            NativeKind::Sampler => "sampler",
            NativeKind::ShaderModule => "shader module",
            NativeKind::Program => "program",
            NativeKind::BlendState => "blend state",
            NativeKind::DepthStencilState => "depth/stencil state",
            NativeKind::RasterizerState => "rasterizer state",
            NativeKind::Pipeline => "pipeline",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug)]
enum Detail {
    None,
    Buffer {
        data: Vec<u8>,
    },
    Texture {
        format: TextureFormat,
        size: Extent3D,
        dimension: TextureDimension,
        mip_level_count: u32,
    },
}

#[derive(Debug)]
struct LiveObject {
    kind: NativeKind,
    bytes: u64,
    /// The newest submission that referenced this object.
    last_use: CompletionToken,
    /// Objects used whenever this one is used.
    refs: Vec<u64>,
    detail: Detail,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    created: u64,
    destroyed: u64,
}

#[derive(Debug, Default)]
struct State {
    objects: AHashMap<u64, LiveObject>,
    next_id: u64,
    counters: [Counters; 10],
    memory_used: u64,
    fail_next_creation: Option<BackendError>,
    fail_next_submission: Option<BackendError>,
    lost: bool,
    submitted: CompletionToken,
    completed: CompletionToken,
    submissions: u64,
    draw_calls: u64,
}

impl State {
    fn check_alive(&self) -> Result<(), BackendError> {
        if self.lost {
            Err(BackendError::DeviceLost)
        } else {
            Ok(())
        }
    }

    fn object(&self, id: u64, kind: NativeKind) -> Result<&LiveObject, BackendError> {
        match self.objects.get(&id) {
            Some(object) if object.kind == kind => Ok(object),
            Some(object) => Err(BackendError::Rejected(format!(
                "object {id:#x} is a {}, not a {}",
                object.kind.name(),
                kind.name()
            ))),
            None => Err(BackendError::Rejected(format!(
                "{} {id:#x} does not exist",
                kind.name()
            ))),
        }
    }

    fn object_mut(&mut self, id: u64, kind: NativeKind) -> Result<&mut LiveObject, BackendError> {
        self.object(id, kind)?;
        self.objects
            .get_mut(&id)
            .ok_or_else(|| BackendError::Internal(format!("object {id:#x} vanished")))
    }

    fn destroy(&mut self, id: u64, kind: NativeKind) -> Result<(), BackendError> {
        if self.lost {
            // Releasing objects of a lost device always succeeds.
            if let Some(object) = self.objects.remove(&id) {
                self.release(&object);
            }
            return Ok(());
        }

        let object = self.object(id, kind)?;
        if !object.last_use.is_reached_by(self.completed) {
            return Err(BackendError::Rejected(format!(
                "{} {id:#x} destroyed while submission {} may still use it (completed {})",
                kind.name(),
                object.last_use,
                self.completed
            )));
        }

        if let Some(object) = self.objects.remove(&id) {
            self.release(&object);
        }
        log::trace!("Destroyed native {} {id:#x}", kind.name());
        Ok(())
    }

    fn release(&mut self, object: &LiveObject) {
        self.memory_used = self.memory_used.saturating_sub(object.bytes);
        self.counters[object.kind.slot()].destroyed += 1;
    }

    fn mark_used(&mut self, id: u64, token: CompletionToken) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(object) = self.objects.get_mut(&id) {
                object.last_use = object.last_use.max(token);
                stack.extend_from_slice(&object.refs);
            }
        }
    }
}

/// A [`GpuBackend`] that simulates a GPU in memory.
///
/// Object ids are unique for the backend's lifetime and never reused.
pub struct HeadlessBackend {
    profile: Option<BackendProfile>,
    capabilities: BackendCapabilities,
    fence_mode: FenceMode,
    memory_budget: Option<u64>,
    state: Mutex<State>,
}

impl fmt::Debug for HeadlessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("HeadlessBackend")
            .field("profile", &self.profile)
            .field("fence_mode", &self.fence_mode)
            .field("live_objects", &state.objects.len())
            .field("submitted", &state.submitted)
            .field("completed", &state.completed)
            .field("lost", &state.lost)
            .finish()
    }
}

impl HeadlessBackend {
    /// A backend impersonating `profile`, with immediate fences and no memory budget.
    pub fn new(profile: BackendProfile) -> Self {
        let mut backend = Self::from_capabilities(profile.capabilities());
        backend.profile = Some(profile);
        backend
    }

    /// A backend reporting arbitrary capabilities. Accepts every shader language.
    pub fn from_capabilities(capabilities: BackendCapabilities) -> Self {
        Self {
            profile: None,
            capabilities,
            fence_mode: FenceMode::default(),
            memory_budget: None,
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Sets how the fence timeline advances.
    pub fn with_fence_mode(mut self, mode: FenceMode) -> Self {
        self.fence_mode = mode;
        self
    }

    /// Caps the bytes of buffer and texture memory that may be live at once.
    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget = Some(bytes);
        self
    }

    /// The impersonated profile, if any.
    pub fn profile(&self) -> Option<BackendProfile> {
        self.profile
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create(
        &self,
        kind: NativeKind,
        bytes: u64,
        refs: &[(u64, NativeKind)],
        detail: Detail,
    ) -> Result<u64, BackendError> {
        self.create_with(kind, bytes, refs, || Ok(detail))
    }

    /// Like [`create`](Self::create), but the host-side detail is only built
    /// once the memory budget has accepted `bytes`.
    fn create_with(
        &self,
        kind: NativeKind,
        bytes: u64,
        refs: &[(u64, NativeKind)],
        detail: impl FnOnce() -> Result<Detail, BackendError>,
    ) -> Result<u64, BackendError> {
        let mut state = self.lock();
        state.check_alive()?;
        if let Some(error) = state.fail_next_creation.take() {
            return Err(error);
        }
        for &(id, ref_kind) in refs {
            state.object(id, ref_kind)?;
        }
        if let Some(budget) = self.memory_budget {
            if state.memory_used.saturating_add(bytes) > budget {
                return Err(BackendError::OutOfMemory { requested: bytes });
            }
        }
        let detail = detail()?;

        let id = state.next_id;
        state.next_id += 1;
        state.memory_used = state.memory_used.saturating_add(bytes);
        state.counters[kind.slot()].created += 1;
        state.objects.insert(
            id,
            LiveObject {
                kind,
                bytes,
                last_use: CompletionToken::NONE,
                refs: refs.iter().map(|&(id, _)| id).collect(),
                detail,
            },
        );
        log::trace!("Created native {} {id:#x} ({bytes} bytes)", kind.name());
        Ok(id)
    }

    fn destroy(&self, id: u64, kind: NativeKind) -> Result<(), BackendError> {
        self.lock().destroy(id, kind)
    }

    // --- Fence control ---

    /// Marks every submission up to `token` as complete.
    ///
    /// Tokens beyond the last submission are clamped to it.
    pub fn signal(&self, token: CompletionToken) {
        let mut state = self.lock();
        let target = token.min(state.submitted);
        state.completed = state.completed.max(target);
    }

    /// Marks every submission as complete.
    pub fn signal_all(&self) {
        let mut state = self.lock();
        state.completed = state.submitted;
    }

    // --- Fault injection ---

    /// Simulates device loss. Every later call reports `DeviceLost`, except
    /// destruction, which releases objects without checks.
    pub fn lose_device(&self) {
        log::warn!("Simulating device loss");
        self.lock().lost = true;
    }

    /// Makes the next object creation fail with `error`.
    pub fn fail_next_creation(&self, error: BackendError) {
        self.lock().fail_next_creation = Some(error);
    }

    /// Makes the next submission fail with `error`.
    pub fn fail_next_submission(&self, error: BackendError) {
        self.lock().fail_next_submission = Some(error);
    }

    // --- Inspection ---

    /// Live objects of `kind`.
    pub fn live_count(&self, kind: NativeKind) -> usize {
        self.lock()
            .objects
            .values()
            .filter(|object| object.kind == kind)
            .count()
    }

    /// Live objects of every kind.
    pub fn total_live(&self) -> usize {
        self.lock().objects.len()
    }

    /// Objects of `kind` created over the backend's lifetime.
    pub fn created_count(&self, kind: NativeKind) -> u64 {
        self.lock().counters[kind.slot()].created
    }

    /// Objects of `kind` destroyed over the backend's lifetime.
    pub fn destroyed_count(&self, kind: NativeKind) -> u64 {
        self.lock().counters[kind.slot()].destroyed
    }

    /// Returns `true` if the object with this raw id is alive.
    pub fn is_live(&self, raw_id: u64) -> bool {
        self.lock().objects.contains_key(&raw_id)
    }

    /// Bytes of buffer and texture memory currently live.
    pub fn memory_used(&self) -> u64 {
        self.lock().memory_used
    }

    /// The token of the last successful submission.
    pub fn submitted_token(&self) -> CompletionToken {
        self.lock().submitted
    }

    /// The newest completed token, even after device loss.
    pub fn last_completed(&self) -> CompletionToken {
        self.lock().completed
    }

    /// Successful submissions.
    pub fn submission_count(&self) -> u64 {
        self.lock().submissions
    }

    /// Draw calls across every successful submission.
    pub fn draw_call_count(&self) -> u64 {
        self.lock().draw_calls
    }

    /// The contents of a live buffer.
    pub fn buffer_contents(&self, buffer: NativeBuffer) -> Option<Vec<u8>> {
        match &self.lock().objects.get(&buffer.0)?.detail {
            Detail::Buffer { data } => Some(data.clone()),
            _ => None,
        }
    }

    fn native_format_of(&self, format: TextureFormat) -> Option<NativeFormat> {
        self.capabilities
            .formats
            .iter()
            .find(|support| support.format == format)
            .map(|support| support.native)
    }
}

/// Host memory for a buffer's contents. A request the host cannot hold is
/// reported as device memory exhaustion.
fn zeroed(bytes: u64) -> Result<Vec<u8>, BackendError> {
    let out_of_memory = || BackendError::OutOfMemory { requested: bytes };
    let len = usize::try_from(bytes).map_err(|_| out_of_memory())?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| out_of_memory())?;
    data.resize(len, 0);
    Ok(data)
}

fn texture_bytes(descriptor: &TextureDescriptor) -> u64 {
    let levels: u64 = (0..descriptor.mip_level_count)
        .map(|level| {
            let extent = descriptor.size.mip_level(level, descriptor.dimension);
            descriptor.format.level_size_in_bytes(
                extent.width,
                extent.height,
                extent.depth_or_array_layers,
            )
        })
        .sum();
    levels * descriptor.sample_count.count() as u64
}

impl GpuBackend for HeadlessBackend {
    fn backend_type(&self) -> GraphicsBackendType {
        self.profile
            .map_or(GraphicsBackendType::Headless, BackendProfile::backend_type)
    }

    fn adapter_info(&self) -> GraphicsAdapterInfo {
        self.capabilities.adapter.clone()
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities.clone()
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<NativeBuffer, BackendError> {
        let size = descriptor.size;
        self.create_with(NativeKind::Buffer, size, &[], || {
            Ok(Detail::Buffer {
                data: zeroed(size)?,
            })
        })
        .map(NativeBuffer)
    }

    fn destroy_buffer(&self, buffer: NativeBuffer) -> Result<(), BackendError> {
        self.destroy(buffer.0, NativeKind::Buffer)
    }

    fn write_buffer(
        &self,
        buffer: NativeBuffer,
        offset: u64,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_alive()?;
        let object = state.object_mut(buffer.0, NativeKind::Buffer)?;
        let Detail::Buffer { data: contents } = &mut object.detail else {
            return Err(BackendError::Internal("buffer without contents".into()));
        };
        let start = offset as usize;
        let end = start.saturating_add(data.len());
        if end > contents.len() {
            return Err(BackendError::Rejected(format!(
                "write of {}..{} overflows a buffer of {} bytes",
                start,
                end,
                contents.len()
            )));
        }
        contents[start..end].copy_from_slice(data);
        Ok(())
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        format: NativeFormat,
    ) -> Result<NativeTexture, BackendError> {
        if self.native_format_of(descriptor.format) != Some(format) {
            return Err(BackendError::Rejected(format!(
                "native format {format:#x} does not encode {:?}",
                descriptor.format
            )));
        }
        let detail = Detail::Texture {
            format: descriptor.format,
            size: descriptor.size,
            dimension: descriptor.dimension,
            mip_level_count: descriptor.mip_level_count,
        };
        self.create(NativeKind::Texture, texture_bytes(descriptor), &[], detail)
            .map(NativeTexture)
    }

    fn destroy_texture(&self, texture: NativeTexture) -> Result<(), BackendError> {
        self.destroy(texture.0, NativeKind::Texture)
    }

    fn write_texture(
        &self,
        texture: NativeTexture,
        mip_level: u32,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let state = self.lock();
        state.check_alive()?;
        let object = state.object(texture.0, NativeKind::Texture)?;
        let Detail::Texture {
            format,
            size,
            dimension,
            mip_level_count,
        } = object.detail
        else {
            return Err(BackendError::Internal("texture without metadata".into()));
        };
        if mip_level >= mip_level_count {
            return Err(BackendError::Rejected(format!(
                "mip level {mip_level} of a texture with {mip_level_count} levels"
            )));
        }
        let extent = size.mip_level(mip_level, dimension);
        let expected =
            format.level_size_in_bytes(extent.width, extent.height, extent.depth_or_array_layers);
        if data.len() as u64 != expected {
            return Err(BackendError::Rejected(format!(
                "expected {expected} bytes for mip level {mip_level}, got {}",
                data.len()
            )));
        }
        Ok(())
    }

    fn create_framebuffer(
        &self,
        descriptor: &NativeFramebufferDescriptor,
    ) -> Result<NativeFramebuffer, BackendError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(BackendError::Rejected("framebuffer with a zero extent".into()));
        }
        let refs: Vec<_> = descriptor
            .color_attachments
            .iter()
            .chain(descriptor.depth_stencil_attachment.iter())
            .map(|attachment| (attachment.texture.0, NativeKind::Texture))
            .collect();
        self.create(NativeKind::Framebuffer, 0, &refs, Detail::None)
            .map(NativeFramebuffer)
    }

    fn destroy_framebuffer(&self, framebuffer: NativeFramebuffer) -> Result<(), BackendError> {
        self.destroy(framebuffer.0, NativeKind::Framebuffer)
    }

    fn create_sampler(&self, _descriptor: &SamplerDescriptor) -> Result<NativeSampler, BackendError> {
        self.create(NativeKind::Sampler, 0, &[], Detail::None)
            .map(NativeSampler)
    }

    fn destroy_sampler(&self, sampler: NativeSampler) -> Result<(), BackendError> {
        self.destroy(sampler.0, NativeKind::Sampler)
    }

    fn compile_shader_module(
        &self,
        source: &ShaderStageSource,
    ) -> Result<NativeShaderModule, BackendError> {
        if let Some(profile) = self.profile {
            if !profile.accepts_language(source.language) {
                return Err(BackendError::Rejected(format!(
                    "{:?} does not accept {:?} shaders",
                    profile, source.language
                )));
            }
        }
        if source.code.is_empty() || source.entry_point.is_empty() {
            return Err(BackendError::Rejected(
                "shader stage without code or entry point".into(),
            ));
        }
        self.create(NativeKind::ShaderModule, 0, &[], Detail::None)
            .map(NativeShaderModule)
    }

    fn destroy_shader_module(&self, module: NativeShaderModule) -> Result<(), BackendError> {
        self.destroy(module.0, NativeKind::ShaderModule)
    }

    fn create_program(
        &self,
        _label: Option<&str>,
        vertex: NativeShaderModule,
        fragment: Option<NativeShaderModule>,
    ) -> Result<NativeProgram, BackendError> {
        let mut refs = vec![(vertex.0, NativeKind::ShaderModule)];
        refs.extend(fragment.map(|module| (module.0, NativeKind::ShaderModule)));
        self.create(NativeKind::Program, 0, &refs, Detail::None)
            .map(NativeProgram)
    }

    fn destroy_program(&self, program: NativeProgram) -> Result<(), BackendError> {
        self.destroy(program.0, NativeKind::Program)
    }

    fn create_blend_state(&self, _key: &BlendStateKey) -> Result<NativeBlendState, BackendError> {
        self.create(NativeKind::BlendState, 0, &[], Detail::None)
            .map(NativeBlendState)
    }

    fn destroy_blend_state(&self, state: NativeBlendState) -> Result<(), BackendError> {
        self.destroy(state.0, NativeKind::BlendState)
    }

    fn create_depth_stencil_state(
        &self,
        _key: &DepthStencilStateKey,
    ) -> Result<NativeDepthStencilState, BackendError> {
        self.create(NativeKind::DepthStencilState, 0, &[], Detail::None)
            .map(NativeDepthStencilState)
    }

    fn destroy_depth_stencil_state(
        &self,
        state: NativeDepthStencilState,
    ) -> Result<(), BackendError> {
        self.destroy(state.0, NativeKind::DepthStencilState)
    }

    fn create_rasterizer_state(
        &self,
        _key: &RasterizerStateKey,
    ) -> Result<NativeRasterizerState, BackendError> {
        self.create(NativeKind::RasterizerState, 0, &[], Detail::None)
            .map(NativeRasterizerState)
    }

    fn destroy_rasterizer_state(&self, state: NativeRasterizerState) -> Result<(), BackendError> {
        self.destroy(state.0, NativeKind::RasterizerState)
    }

    fn create_pipeline(
        &self,
        descriptor: &NativePipelineDescriptor,
    ) -> Result<NativePipeline, BackendError> {
        let refs = [
            (descriptor.program.0, NativeKind::Program),
            (descriptor.blend.0, NativeKind::BlendState),
            (descriptor.depth_stencil.0, NativeKind::DepthStencilState),
            (descriptor.rasterizer.0, NativeKind::RasterizerState),
        ];
        self.create(NativeKind::Pipeline, 0, &refs, Detail::None)
            .map(NativePipeline)
    }

    fn destroy_pipeline(&self, pipeline: NativePipeline) -> Result<(), BackendError> {
        self.destroy(pipeline.0, NativeKind::Pipeline)
    }

    fn submit(&self, commands: &CommandList) -> Result<CompletionToken, BackendError> {
        let mut state = self.lock();
        state.check_alive()?;
        if let Some(error) = state.fail_next_submission.take() {
            return Err(error);
        }

        let mut used = Vec::new();
        for command in commands.commands() {
            let reference = match command {
                Command::BindFramebuffer(Some(framebuffer)) => {
                    (framebuffer.0, NativeKind::Framebuffer)
                }
                Command::BindPipeline(pipeline) => (pipeline.0, NativeKind::Pipeline),
                Command::BindVertexBuffer { buffer, .. }
                | Command::BindIndexBuffer { buffer, .. }
                | Command::BindUniformBuffer { buffer, .. } => (buffer.0, NativeKind::Buffer),
                Command::BindTexture { texture, .. } => (texture.0, NativeKind::Texture),
                Command::BindSampler { sampler, .. } => (sampler.0, NativeKind::Sampler),
                _ => continue,
            };
            used.push(reference);
        }
        for &(id, kind) in &used {
            state.object(id, kind)?;
        }

        let token = state.submitted.next();
        state.submitted = token;
        for (id, _) in used {
            state.mark_used(id, token);
        }
        state.submissions += 1;
        state.draw_calls += u64::from(commands.draw_calls());

        match self.fence_mode {
            FenceMode::Immediate => state.completed = token,
            FenceMode::Lagged(behind) => {
                let target = CompletionToken(token.0.saturating_sub(behind));
                state.completed = state.completed.max(target);
            }
            FenceMode::Manual => {}
        }
        log::trace!(
            "Submitted {} commands as {token} (completed {})",
            commands.len(),
            state.completed
        );
        Ok(token)
    }

    fn completed_token(&self) -> Result<CompletionToken, BackendError> {
        let state = self.lock();
        state.check_alive()?;
        Ok(state.completed)
    }

    fn wait_idle(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_alive()?;
        state.completed = state.submitted;
        Ok(())
    }
}
