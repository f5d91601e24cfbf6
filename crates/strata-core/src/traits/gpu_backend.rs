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

use crate::api::*;
use crate::error::BackendError;
use crate::native::*;
use std::fmt::Debug;

/// A native graphics API as seen by the resource layer.
///
/// The device resolves a backend once, at construction, and holds it as an
/// `Arc<dyn GpuBackend>`. Implementations own their native objects; the ids
/// they return are opaque to every caller and only ever handed back to the
/// backend that issued them.
///
/// Every method takes `&self`. Backends whose native API needs exclusive
/// access serialize internally.
pub trait GpuBackend: Send + Sync + Debug + 'static {
    /// The native API family this backend drives.
    fn backend_type(&self) -> GraphicsBackendType;

    /// Information about the adapter this backend runs on.
    fn adapter_info(&self) -> GraphicsAdapterInfo;

    /// Reports supported formats, limits and features.
    ///
    /// Called once when a device is constructed. The report describes the live
    /// adapter and may differ between machines running the same backend.
    fn capabilities(&self) -> BackendCapabilities;

    /// Creates a buffer.
    /// ## Errors
    /// * `BackendError::OutOfMemory` - If the allocation cannot be satisfied.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<NativeBuffer, BackendError>;

    /// Destroys a buffer. The GPU must have finished every use of it.
    fn destroy_buffer(&self, buffer: NativeBuffer) -> Result<(), BackendError>;

    /// Copies `data` into a buffer at `offset`.
    fn write_buffer(&self, buffer: NativeBuffer, offset: u64, data: &[u8])
        -> Result<(), BackendError>;

    /// Creates a texture. `format` is the native code of `descriptor.format`.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        format: NativeFormat,
    ) -> Result<NativeTexture, BackendError>;

    /// Destroys a texture. The GPU must have finished every use of it.
    fn destroy_texture(&self, texture: NativeTexture) -> Result<(), BackendError>;

    /// Uploads the texels of one mip level.
    fn write_texture(
        &self,
        texture: NativeTexture,
        mip_level: u32,
        data: &[u8],
    ) -> Result<(), BackendError>;

    /// Creates a framebuffer from resolved attachments.
    fn create_framebuffer(
        &self,
        descriptor: &NativeFramebufferDescriptor,
    ) -> Result<NativeFramebuffer, BackendError>;

    /// Destroys a framebuffer.
    fn destroy_framebuffer(&self, framebuffer: NativeFramebuffer) -> Result<(), BackendError>;

    /// Creates a sampler.
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<NativeSampler, BackendError>;

    /// Destroys a sampler.
    fn destroy_sampler(&self, sampler: NativeSampler) -> Result<(), BackendError>;

    /// Compiles one shader stage.
    fn compile_shader_module(
        &self,
        source: &ShaderStageSource,
    ) -> Result<NativeShaderModule, BackendError>;

    /// Destroys a compiled shader stage.
    fn destroy_shader_module(&self, module: NativeShaderModule) -> Result<(), BackendError>;

    /// Links compiled stages into a program.
    fn create_program(
        &self,
        label: Option<&str>,
        vertex: NativeShaderModule,
        fragment: Option<NativeShaderModule>,
    ) -> Result<NativeProgram, BackendError>;

    /// Destroys a program. Its modules stay alive.
    fn destroy_program(&self, program: NativeProgram) -> Result<(), BackendError>;

    /// Builds a blend state object.
    fn create_blend_state(&self, key: &BlendStateKey) -> Result<NativeBlendState, BackendError>;

    /// Destroys a blend state object.
    fn destroy_blend_state(&self, state: NativeBlendState) -> Result<(), BackendError>;

    /// Builds a depth/stencil state object.
    fn create_depth_stencil_state(
        &self,
        key: &DepthStencilStateKey,
    ) -> Result<NativeDepthStencilState, BackendError>;

    /// Destroys a depth/stencil state object.
    fn destroy_depth_stencil_state(
        &self,
        state: NativeDepthStencilState,
    ) -> Result<(), BackendError>;

    /// Builds a rasterizer state object.
    fn create_rasterizer_state(
        &self,
        key: &RasterizerStateKey,
    ) -> Result<NativeRasterizerState, BackendError>;

    /// Destroys a rasterizer state object.
    fn destroy_rasterizer_state(&self, state: NativeRasterizerState) -> Result<(), BackendError>;

    /// Builds a complete pipeline state object.
    fn create_pipeline(
        &self,
        descriptor: &NativePipelineDescriptor,
    ) -> Result<NativePipeline, BackendError>;

    /// Destroys a pipeline state object.
    fn destroy_pipeline(&self, pipeline: NativePipeline) -> Result<(), BackendError>;

    /// Submits recorded commands and returns the token that completes with them.
    ///
    /// Submission does not wait for the GPU. Tokens increase strictly with every
    /// successful submission.
    fn submit(&self, commands: &CommandList) -> Result<CompletionToken, BackendError>;

    /// The newest token the GPU has finished. Never blocks.
    /// ## Errors
    /// * `BackendError::DeviceLost` - If the device is gone.
    fn completed_token(&self) -> Result<CompletionToken, BackendError>;

    /// Blocks until every submission has completed.
    ///
    /// Only for shutdown; never called during steady-state frames.
    fn wait_idle(&self) -> Result<(), BackendError>;
}
