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

//! Conversions between the renderer API types and `wgpu` types.

use defren_core::math::Extent3D;
use defren_core::renderer::TextureFormat;

/// A local extension trait to convert our types into `wgpu` types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a `wgpu` type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::Extent3d> for Extent3D {
    fn into_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: self.depth_or_array_layers,
        }
    }
}

impl IntoWgpu<wgpu::TextureFormat> for TextureFormat {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::R8Unorm => wgpu::TextureFormat::R8Unorm,
            TextureFormat::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::R16Float => wgpu::TextureFormat::R16Float,
            TextureFormat::Rg16Float => wgpu::TextureFormat::Rg16Float,
            TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::R32Float => wgpu::TextureFormat::R32Float,
            TextureFormat::Rg32Float => wgpu::TextureFormat::Rg32Float,
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TextureFormat::Depth16Unorm => wgpu::TextureFormat::Depth16Unorm,
            TextureFormat::Depth24Plus => wgpu::TextureFormat::Depth24Plus,
            TextureFormat::Depth24PlusStencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
            TextureFormat::Depth32FloatStencil8 => wgpu::TextureFormat::Depth32FloatStencil8,
        }
    }
}

/// The `wgpu` format a texture of `format` is created with.
///
/// 32-bit float depth with stencil is optional in `wgpu`. Without the feature
/// such textures fall back to 24-bit depth with stencil.
pub fn texture_format(format: TextureFormat, features: wgpu::Features) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Depth32FloatStencil8
            if !features.contains(wgpu::Features::DEPTH32FLOAT_STENCIL8) =>
        {
            wgpu::TextureFormat::Depth24PlusStencil8
        }
        other => other.into_wgpu(),
    }
}

/// The aspect a texture-to-texture copy of `format` uses, `None` if none of
/// the requested aspects exist in the format.
///
/// `wgpu` copies depth-stencil textures whole, so asking for either aspect
/// copies both.
pub fn copy_aspect(format: TextureFormat, depth: bool, stencil: bool) -> Option<wgpu::TextureAspect> {
    let wanted = depth || (stencil && format.has_stencil());
    (format.is_depth() && wanted).then_some(wgpu::TextureAspect::All)
}

/// Device features worth reporting, with the names the debug console prints.
fn reported_features() -> [(wgpu::Features, &'static str); 8] {
    [
        (wgpu::Features::DEPTH32FLOAT_STENCIL8, "depth32float-stencil8"),
        (wgpu::Features::DEPTH_CLIP_CONTROL, "depth-clip-control"),
        (wgpu::Features::FLOAT32_FILTERABLE, "float32-filterable"),
        (wgpu::Features::RG11B10UFLOAT_RENDERABLE, "rg11b10ufloat-renderable"),
        (wgpu::Features::TEXTURE_COMPRESSION_BC, "texture-compression-bc"),
        (wgpu::Features::TIMESTAMP_QUERY, "timestamp-query"),
        (wgpu::Features::SHADER_F16, "shader-f16"),
        (wgpu::Features::POLYGON_MODE_LINE, "polygon-mode-line"),
    ]
}

/// Names of the reported features contained in `features`.
pub fn feature_names(features: wgpu::Features) -> Vec<String> {
    reported_features()
        .into_iter()
        .filter(|(flag, _)| features.contains(*flag))
        .map(|(_, name)| name.to_string())
        .collect()
}

/// The optional features the device asks for when the adapter has them.
pub fn wanted_features() -> wgpu::Features {
    wgpu::Features::DEPTH32FLOAT_STENCIL8 | wgpu::Features::DEPTH_CLIP_CONTROL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_take_every_aspect() {
        let all = Some(wgpu::TextureAspect::All);
        assert_eq!(copy_aspect(TextureFormat::Depth32FloatStencil8, false, true), all);
        assert_eq!(copy_aspect(TextureFormat::Depth32FloatStencil8, true, false), all);
        assert_eq!(copy_aspect(TextureFormat::Depth32Float, true, true), all);
    }

    #[test]
    fn missing_aspects_copy_nothing() {
        assert_eq!(copy_aspect(TextureFormat::Depth32Float, false, true), None);
        assert_eq!(copy_aspect(TextureFormat::Depth24PlusStencil8, false, false), None);
        assert_eq!(copy_aspect(TextureFormat::Rgba8Unorm, true, true), None);
    }

    #[test]
    fn float_depth_stencil_falls_back_without_the_feature() {
        assert_eq!(
            texture_format(TextureFormat::Depth32FloatStencil8, wgpu::Features::empty()),
            wgpu::TextureFormat::Depth24PlusStencil8
        );
        assert_eq!(
            texture_format(
                TextureFormat::Depth32FloatStencil8,
                wgpu::Features::DEPTH32FLOAT_STENCIL8
            ),
            wgpu::TextureFormat::Depth32FloatStencil8
        );
    }

    #[test]
    fn feature_names_only_lists_present_features() {
        let names = feature_names(wgpu::Features::DEPTH_CLIP_CONTROL | wgpu::Features::TIMESTAMP_QUERY);
        assert_eq!(names, vec!["depth-clip-control".to_string(), "timestamp-query".to_string()]);
        assert!(feature_names(wgpu::Features::empty()).is_empty());
    }
}
