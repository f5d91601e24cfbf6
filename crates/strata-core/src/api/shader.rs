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

//! Shader stages, their sources, and the structural key compiled modules are
//! cached under.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment stage.
    Fragment,
}

/// The language a shader stage is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderLanguage {
    /// WGSL source text.
    Wgsl,
    /// GLSL source text.
    Glsl,
    /// HLSL source text.
    Hlsl,
    /// Metal Shading Language source text.
    Msl,
    /// A SPIR-V binary.
    SpirV,
}

impl ShaderLanguage {
    /// Returns `true` for binary intermediate representations.
    pub const fn is_binary(self) -> bool {
        matches!(self, ShaderLanguage::SpirV)
    }
}

/// The code of one shader stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageSource<'a> {
    /// The stage this code runs in.
    pub stage: ShaderStage,
    /// The language of `code`.
    pub language: ShaderLanguage,
    /// The entry point function name.
    pub entry_point: Cow<'a, str>,
    /// Source text as UTF-8 bytes, or a binary module.
    pub code: Cow<'a, [u8]>,
}

impl<'a> ShaderStageSource<'a> {
    /// A stage written as source text.
    pub fn text(
        stage: ShaderStage,
        language: ShaderLanguage,
        entry_point: &'a str,
        source: &'a str,
    ) -> Self {
        Self {
            stage,
            language,
            entry_point: Cow::Borrowed(entry_point),
            code: Cow::Borrowed(source.as_bytes()),
        }
    }

    /// The cache key of the compiled module for this stage.
    pub fn module_key(&self) -> ShaderModuleKey {
        ShaderModuleKey {
            stage: self.stage,
            language: self.language,
            entry_point: self.entry_point.to_string(),
            digest: ShaderDigest(*blake3::hash(&self.code).as_bytes()),
        }
    }
}

/// A descriptor used to create a shader program.
#[derive(Debug, Clone)]
pub struct ShaderProgramDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The vertex stage.
    pub vertex: ShaderStageSource<'a>,
    /// The fragment stage. Depth-only programs have none.
    pub fragment: Option<ShaderStageSource<'a>>,
}

/// A BLAKE3 digest of shader code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderDigest(pub [u8; 32]);

impl fmt::Debug for ShaderDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Identifies a compiled shader module by what it was compiled from.
///
/// Two stages with the same code, language, stage and entry point share one
/// compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderModuleKey {
    /// The stage.
    pub stage: ShaderStage,
    /// The code language.
    pub language: ShaderLanguage,
    /// The entry point.
    pub entry_point: String,
    /// Digest of the code bytes.
    pub digest: ShaderDigest,
}
