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

//! The buffers of the deferred renderer and the attachment combinations built from them.

use defren_core::renderer::TextureFormat;

/// A color buffer owned by the deferred renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GBuffer {
    /// Albedo.
    Diffuse,
    /// View space normal.
    Normal,
    /// Specular reflectivity.
    Reflectivity,
    /// Surface roughness.
    Roughness,
    /// Ambient occlusion and solidity.
    AoSolidity,
    /// Sub-surface scattering parameters.
    SubSurface,
    /// First general purpose buffer.
    Temporary1,
    /// Second general purpose buffer, also a post-process ping-pong target.
    Temporary2,
    /// Single channel scratch buffer.
    Temporary3,
    /// Lit color, also a post-process ping-pong target.
    Color,
    /// Fixed size luminance buffer used for tone mapping.
    Luminance,
    /// Fixed size normal buffer rendered with the luminance.
    LuminanceNormal,
}

impl GBuffer {
    /// Every buffer, in allocation order.
    pub const ALL: [GBuffer; 12] = [
        GBuffer::Diffuse,
        GBuffer::Normal,
        GBuffer::Reflectivity,
        GBuffer::Roughness,
        GBuffer::AoSolidity,
        GBuffer::SubSurface,
        GBuffer::Temporary1,
        GBuffer::Temporary2,
        GBuffer::Temporary3,
        GBuffer::Color,
        GBuffer::Luminance,
        GBuffer::LuminanceNormal,
    ];

    /// The texel format of the buffer.
    pub const fn format(&self) -> TextureFormat {
        match self {
            GBuffer::Diffuse
            | GBuffer::Reflectivity
            | GBuffer::Roughness
            | GBuffer::AoSolidity => TextureFormat::Rgba8Unorm,
            GBuffer::Normal
            | GBuffer::SubSurface
            | GBuffer::Temporary1
            | GBuffer::Temporary2
            | GBuffer::Color
            | GBuffer::Luminance
            | GBuffer::LuminanceNormal => TextureFormat::Rgba16Float,
            GBuffer::Temporary3 => TextureFormat::R8Unorm,
        }
    }

    /// Returns `true` for buffers whose size does not follow the render size.
    pub const fn is_fixed_size(&self) -> bool {
        matches!(self, GBuffer::Luminance | GBuffer::LuminanceNormal)
    }

    /// A short name used in labels.
    pub const fn name(&self) -> &'static str {
        match self {
            GBuffer::Diffuse => "Diffuse",
            GBuffer::Normal => "Normal",
            GBuffer::Reflectivity => "Reflectivity",
            GBuffer::Roughness => "Roughness",
            GBuffer::AoSolidity => "AOSolidity",
            GBuffer::SubSurface => "SubSurface",
            GBuffer::Temporary1 => "Temporary1",
            GBuffer::Temporary2 => "Temporary2",
            GBuffer::Temporary3 => "Temporary3",
            GBuffer::Color => "Color",
            GBuffer::Luminance => "Luminance",
            GBuffer::LuminanceNormal => "LuminanceNormal",
        }
    }
}

/// A depth/stencil buffer owned by the deferred renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DepthSlot {
    /// First ping-pong depth.
    Depth1,
    /// Second ping-pong depth.
    Depth2,
    /// Third depth, a copy target outside the ping-pong.
    Depth3,
    /// Fixed size depth of the luminance pass.
    Luminance,
}

impl DepthSlot {
    /// Every depth buffer, in allocation order.
    pub const ALL: [DepthSlot; 4] = [
        DepthSlot::Depth1,
        DepthSlot::Depth2,
        DepthSlot::Depth3,
        DepthSlot::Luminance,
    ];

    /// A short name used in labels.
    pub const fn name(&self) -> &'static str {
        match self {
            DepthSlot::Depth1 => "Depth1",
            DepthSlot::Depth2 => "Depth2",
            DepthSlot::Depth3 => "Depth3",
            DepthSlot::Luminance => "LuminanceDepth",
        }
    }
}

/// An attachment combination: color buffers bound from slot 0 on, plus an
/// optional depth buffer bound as depth and stencil.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetSet {
    /// Color buffers in attachment order.
    pub colors: Vec<GBuffer>,
    /// Depth buffer, if any.
    pub depth: Option<DepthSlot>,
}

impl TargetSet {
    /// Creates a target set.
    pub fn new(colors: &[GBuffer], depth: Option<DepthSlot>) -> Self {
        Self {
            colors: colors.to_vec(),
            depth,
        }
    }

    /// A depth only target.
    pub fn depth_only(depth: DepthSlot) -> Self {
        Self::new(&[], Some(depth))
    }

    /// A label naming every attached buffer.
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = self.colors.iter().map(GBuffer::name).collect();
        if let Some(depth) = self.depth {
            parts.push(depth.name());
        }
        format!("DefRen.{}", parts.join("+"))
    }
}

/// The named attachment combinations of the deferred renderer.
///
/// `D1`/`D2` pick the physical depth buffer. Callers normally go through the
/// `activate_*` helpers of the renderer which pick the current ping-pong depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RenderTarget {
    D1,
    D2,
    D3,
    Diff,
    DiffD1,
    DiffD2,
    Refl,
    ReflD1,
    ReflD2,
    Rough,
    RoughD1,
    RoughD2,
    AoSolidity,
    AoSolidityD1,
    AoSolidityD2,
    Temp1,
    Temp1D1,
    Temp1D2,
    Temp2,
    Temp2D1,
    Temp2D2,
    Temp3,
    Color,
    ColorD1,
    ColorD2,
    ColorTemp2,
    ColorTemp2D1,
    ColorTemp2D2,
    MaterialColorD1,
    MaterialColorD2,
    Luminance,
    LuminanceNormal,
    /// Encoded depth only: depth written as color next to diffuse.
    DepthDiffuse,
    /// Encoded depth only: depth written as color next to temporary 1.
    DepthTemp1,
    /// Encoded depth only: color next to depth written as color.
    ColorDepth,
}

impl RenderTarget {
    /// Every catalog entry.
    pub const ALL: [RenderTarget; 35] = [
        RenderTarget::D1,
        RenderTarget::D2,
        RenderTarget::D3,
        RenderTarget::Diff,
        RenderTarget::DiffD1,
        RenderTarget::DiffD2,
        RenderTarget::Refl,
        RenderTarget::ReflD1,
        RenderTarget::ReflD2,
        RenderTarget::Rough,
        RenderTarget::RoughD1,
        RenderTarget::RoughD2,
        RenderTarget::AoSolidity,
        RenderTarget::AoSolidityD1,
        RenderTarget::AoSolidityD2,
        RenderTarget::Temp1,
        RenderTarget::Temp1D1,
        RenderTarget::Temp1D2,
        RenderTarget::Temp2,
        RenderTarget::Temp2D1,
        RenderTarget::Temp2D2,
        RenderTarget::Temp3,
        RenderTarget::Color,
        RenderTarget::ColorD1,
        RenderTarget::ColorD2,
        RenderTarget::ColorTemp2,
        RenderTarget::ColorTemp2D1,
        RenderTarget::ColorTemp2D2,
        RenderTarget::MaterialColorD1,
        RenderTarget::MaterialColorD2,
        RenderTarget::Luminance,
        RenderTarget::LuminanceNormal,
        RenderTarget::DepthDiffuse,
        RenderTarget::DepthTemp1,
        RenderTarget::ColorDepth,
    ];

    /// Resolves the entry to its attachments.
    ///
    /// Returns `None` for entries that only exist with encoded depth, which is
    /// not supported.
    pub fn target_set(self, max_draw_buffers: u32) -> Option<TargetSet> {
        use DepthSlot::{Depth1, Depth2, Depth3};
        use GBuffer::*;

        let set = match self {
            RenderTarget::D1 => TargetSet::depth_only(Depth1),
            RenderTarget::D2 => TargetSet::depth_only(Depth2),
            RenderTarget::D3 => TargetSet::depth_only(Depth3),
            RenderTarget::Diff => TargetSet::new(&[Diffuse], None),
            RenderTarget::DiffD1 => TargetSet::new(&[Diffuse], Some(Depth1)),
            RenderTarget::DiffD2 => TargetSet::new(&[Diffuse], Some(Depth2)),
            RenderTarget::Refl => TargetSet::new(&[Reflectivity], None),
            RenderTarget::ReflD1 => TargetSet::new(&[Reflectivity], Some(Depth1)),
            RenderTarget::ReflD2 => TargetSet::new(&[Reflectivity], Some(Depth2)),
            RenderTarget::Rough => TargetSet::new(&[Roughness], None),
            RenderTarget::RoughD1 => TargetSet::new(&[Roughness], Some(Depth1)),
            RenderTarget::RoughD2 => TargetSet::new(&[Roughness], Some(Depth2)),
            RenderTarget::AoSolidity => TargetSet::new(&[AoSolidity], None),
            RenderTarget::AoSolidityD1 => TargetSet::new(&[AoSolidity], Some(Depth1)),
            RenderTarget::AoSolidityD2 => TargetSet::new(&[AoSolidity], Some(Depth2)),
            RenderTarget::Temp1 => TargetSet::new(&[Temporary1], None),
            RenderTarget::Temp1D1 => TargetSet::new(&[Temporary1], Some(Depth1)),
            RenderTarget::Temp1D2 => TargetSet::new(&[Temporary1], Some(Depth2)),
            RenderTarget::Temp2 => TargetSet::new(&[Temporary2], None),
            RenderTarget::Temp2D1 => TargetSet::new(&[Temporary2], Some(Depth1)),
            RenderTarget::Temp2D2 => TargetSet::new(&[Temporary2], Some(Depth2)),
            RenderTarget::Temp3 => TargetSet::new(&[Temporary3], None),
            RenderTarget::Color => TargetSet::new(&[Color], None),
            RenderTarget::ColorD1 => TargetSet::new(&[Color], Some(Depth1)),
            RenderTarget::ColorD2 => TargetSet::new(&[Color], Some(Depth2)),
            RenderTarget::ColorTemp2 => TargetSet::new(&[Color, Temporary2], None),
            RenderTarget::ColorTemp2D1 => TargetSet::new(&[Color, Temporary2], Some(Depth1)),
            RenderTarget::ColorTemp2D2 => TargetSet::new(&[Color, Temporary2], Some(Depth2)),
            RenderTarget::MaterialColorD1 => material_color(max_draw_buffers, Depth1),
            RenderTarget::MaterialColorD2 => material_color(max_draw_buffers, Depth2),
            RenderTarget::Luminance => TargetSet::new(&[Luminance], Some(DepthSlot::Luminance)),
            RenderTarget::LuminanceNormal => TargetSet::new(
                &[Luminance, LuminanceNormal],
                Some(DepthSlot::Luminance),
            ),
            RenderTarget::DepthDiffuse | RenderTarget::DepthTemp1 | RenderTarget::ColorDepth => {
                return None
            }
        };
        Some(set)
    }
}

fn material_color(max_draw_buffers: u32, depth: DepthSlot) -> TargetSet {
    use GBuffer::*;
    if max_draw_buffers >= 8 {
        TargetSet::new(
            &[Diffuse, Normal, Reflectivity, Roughness, AoSolidity, SubSurface, Color],
            Some(depth),
        )
    } else {
        TargetSet::new(&[Diffuse, Normal, Reflectivity, Color], Some(depth))
    }
}
