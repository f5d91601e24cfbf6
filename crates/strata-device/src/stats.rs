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

//! A snapshot of what a device holds and how its caches perform.

use std::fmt;
use strata_core::native::CompletionToken;
use strata_data::CacheStats;

/// Live resources per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Buffers.
    pub buffers: usize,
    /// Textures.
    pub textures: usize,
    /// Framebuffers.
    pub framebuffers: usize,
    /// Samplers.
    pub samplers: usize,
    /// Shader programs.
    pub shader_programs: usize,
    /// Pipelines.
    pub pipelines: usize,
}

impl LiveCounts {
    /// Live resources of every kind.
    pub fn total(&self) -> usize {
        self.buffers
            + self.textures
            + self.framebuffers
            + self.samplers
            + self.shader_programs
            + self.pipelines
    }
}

/// Counters of every state cache a device owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Compiled shader stages.
    pub shader_modules: CacheStats,
    /// Blend states.
    pub blend_states: CacheStats,
    /// Depth/stencil states.
    pub depth_stencil_states: CacheStats,
    /// Rasterizer states.
    pub rasterizer_states: CacheStats,
    /// Full pipelines.
    pub pipelines: CacheStats,
}

impl CacheReport {
    /// Native objects built across every cache.
    pub fn total_misses(&self) -> u64 {
        [
            self.shader_modules,
            self.blend_states,
            self.depth_stencil_states,
            self.rasterizer_states,
            self.pipelines,
        ]
        .iter()
        .map(|stats| stats.misses)
        .sum()
    }
}

/// A snapshot of a device, from [`Device::stats`](crate::Device::stats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Frames begun so far.
    pub frame_index: u64,
    /// Token of the last successful submission.
    pub last_submitted: CompletionToken,
    /// Live resources.
    pub live: LiveCounts,
    /// Native objects waiting in destruction queues.
    pub pending_destructions: usize,
    /// Native objects released by destruction queues so far.
    pub torn_down: u64,
    /// State cache counters.
    pub caches: CacheReport,
    /// Commands recorded in the last submitted frame.
    pub last_frame_commands: usize,
    /// Draw calls recorded in the last submitted frame.
    pub last_frame_draw_calls: u32,
}

impl fmt::Display for DeviceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} ({}): {} live resources, {} awaiting destruction, {} released, \
             {} commands / {} draws last frame, {} cached pipelines",
            self.frame_index,
            self.last_submitted,
            self.live.total(),
            self.pending_destructions,
            self.torn_down,
            self.last_frame_commands,
            self.last_frame_draw_calls,
            self.caches.pipelines.entries,
        )
    }
}
