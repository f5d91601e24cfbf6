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

//! Backend-agnostic resource API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`adapter`]** and **[`capabilities`]**: what a backend reports about itself.
//! - **[`format`]**: the abstract texture format set.
//! - **[`buffer`]**, **[`texture`]**, **[`sampler`]**, **[`framebuffer`]**,
//!   **[`shader`]**: resource descriptors.
//! - **[`state`]** and **[`pipeline`]**: immutable fixed-function state keys and
//!   full pipeline descriptions.
//! - **[`command`]**: the recorded command stream handed to the backend.

pub mod adapter;
pub mod buffer;
pub mod capabilities;
pub mod command;
pub mod format;
pub mod framebuffer;
pub mod pipeline;
pub mod resource_set;
pub mod sampler;
pub mod shader;
pub mod state;
pub mod texture;

pub use self::adapter::*;
pub use self::buffer::*;
pub use self::capabilities::*;
pub use self::command::*;
pub use self::format::*;
pub use self::framebuffer::*;
pub use self::pipeline::*;
pub use self::sampler::*;
pub use self::shader::*;
pub use self::state::*;
pub use self::texture::*;
