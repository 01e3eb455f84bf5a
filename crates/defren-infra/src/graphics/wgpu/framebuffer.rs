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

//! CPU-side framebuffer records and their completeness check.

use defren_core::math::Extent3D;
use defren_core::renderer::{
    AttachmentKind, AttachmentPoint, AttachmentSlot, FramebufferStatus, ResourceError,
    TextureFormat, TextureId, TextureKind, MAX_COLOR_ATTACHMENTS,
};

/// What the completeness check needs to know about a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub format: TextureFormat,
    pub size: Extent3D,
    pub mip_level_count: u32,
    pub kind: TextureKind,
}

impl TextureInfo {
    // Whether `slot` names an existing level and layer with a matching shape.
    fn fits(&self, slot: &AttachmentSlot) -> bool {
        if slot.level >= self.mip_level_count {
            return false;
        }
        let layers = self.size.depth_or_array_layers;
        match slot.kind {
            AttachmentKind::None => false,
            AttachmentKind::Texture => self.kind == TextureKind::D2,
            AttachmentKind::CubeMap => self.kind == TextureKind::CubeMap,
            AttachmentKind::CubeMapFace(_) => self.kind == TextureKind::CubeMap,
            AttachmentKind::ArrayTexture => self.kind == TextureKind::D2Array,
            AttachmentKind::ArrayTextureLayer => {
                self.kind == TextureKind::D2Array && slot.layer < layers
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Color,
    Depth,
    Stencil,
}

/// The attachments of one framebuffer handle.
#[derive(Debug, Clone, PartialEq)]
pub struct FramebufferRecord {
    pub label: Option<String>,
    pub colors: [AttachmentSlot; MAX_COLOR_ATTACHMENTS],
    pub depth: AttachmentSlot,
    pub stencil: AttachmentSlot,
    pub draw_buffers: u32,
}

impl FramebufferRecord {
    pub fn new(label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            colors: [AttachmentSlot::NONE; MAX_COLOR_ATTACHMENTS],
            depth: AttachmentSlot::NONE,
            stencil: AttachmentSlot::NONE,
            draw_buffers: 0,
        }
    }

    /// Stores `slot` at `point`. An empty slot clears the point.
    pub fn set(&mut self, point: AttachmentPoint, slot: AttachmentSlot) -> Result<(), ResourceError> {
        match point {
            AttachmentPoint::Color(index) => {
                let color = self.colors.get_mut(index as usize).ok_or_else(|| {
                    ResourceError::InvalidParameter(format!("color attachment {index} out of range"))
                })?;
                *color = slot;
            }
            AttachmentPoint::Depth => self.depth = slot,
            AttachmentPoint::Stencil => self.stencil = slot,
            AttachmentPoint::DepthStencil => {
                self.depth = slot;
                self.stencil = slot;
            }
        }
        Ok(())
    }

    /// Every texture the record references.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.colors
            .iter()
            .chain([&self.depth, &self.stencil])
            .filter(|slot| slot.is_attached())
            .filter_map(|slot| slot.image)
    }

    /// Checks the record the way a driver checks a framebuffer object.
    ///
    /// `lookup` resolves texture handles. A handle it does not know counts as
    /// an incomplete attachment.
    pub fn status(&self, lookup: impl Fn(TextureId) -> Option<TextureInfo>) -> FramebufferStatus {
        let attached: Vec<(Role, &AttachmentSlot)> = self
            .colors
            .iter()
            .map(|slot| (Role::Color, slot))
            .chain([(Role::Depth, &self.depth), (Role::Stencil, &self.stencil)])
            .filter(|(_, slot)| slot.is_attached())
            .collect();
        if attached.is_empty() {
            return FramebufferStatus::MissingAttachment;
        }

        let mut resolved = Vec::with_capacity(attached.len());
        for (role, slot) in attached {
            let Some(info) = slot.image.and_then(&lookup) else {
                return FramebufferStatus::IncompleteAttachment;
            };
            let format_fits = match role {
                Role::Color => !info.format.is_depth(),
                Role::Depth => info.format.is_depth(),
                Role::Stencil => info.format.has_stencil(),
            };
            if !format_fits || !info.fits(slot) {
                return FramebufferStatus::IncompleteAttachment;
            }
            resolved.push((slot, info));
        }

        let (first_slot, first_info) = resolved[0];
        let extent = first_info.size.to_2d().mip_level(first_slot.level);
        if resolved
            .iter()
            .any(|(slot, info)| info.size.to_2d().mip_level(slot.level) != extent)
        {
            return FramebufferStatus::IncompleteDimensions;
        }

        let layers = |slot: &AttachmentSlot, info: &TextureInfo| {
            slot.kind.is_layered().then_some(info.size.depth_or_array_layers)
        };
        let first_layers = layers(first_slot, &first_info);
        for (slot, info) in &resolved[1..] {
            let these = layers(*slot, info);
            if these.is_some() != first_layers.is_some() {
                return FramebufferStatus::IncompleteLayerTargets;
            }
            if these != first_layers {
                return FramebufferStatus::IncompleteLayerCount;
            }
        }

        let draw_buffers = (self.draw_buffers as usize).min(MAX_COLOR_ATTACHMENTS);
        if self.colors[..draw_buffers].iter().any(|slot| !slot.is_attached()) {
            return FramebufferStatus::IncompleteDrawBuffer;
        }

        FramebufferStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn textures() -> HashMap<TextureId, TextureInfo> {
        let info = |format, width, height, layers, kind| TextureInfo {
            format,
            size: Extent3D::new(width, height, layers),
            mip_level_count: 3,
            kind,
        };
        HashMap::from([
            (TextureId(1), info(TextureFormat::Rgba16Float, 64, 32, 1, TextureKind::D2)),
            (TextureId(2), info(TextureFormat::Depth32FloatStencil8, 64, 32, 1, TextureKind::D2)),
            (TextureId(3), info(TextureFormat::Rgba8Unorm, 32, 32, 1, TextureKind::D2)),
            (TextureId(4), info(TextureFormat::Rgba8Unorm, 64, 32, 4, TextureKind::D2Array)),
            (TextureId(5), info(TextureFormat::Rgba8Unorm, 64, 32, 2, TextureKind::D2Array)),
            (TextureId(6), info(TextureFormat::Depth32Float, 64, 32, 1, TextureKind::D2)),
        ])
    }

    fn status(record: &FramebufferRecord) -> FramebufferStatus {
        let textures = textures();
        record.status(|id| textures.get(&id).copied())
    }

    fn texture(id: usize) -> AttachmentSlot {
        AttachmentSlot::new(TextureId(id), AttachmentKind::Texture, 0, 0)
    }

    #[test]
    fn empty_record_is_missing_attachments() {
        assert_eq!(status(&FramebufferRecord::new(None)), FramebufferStatus::MissingAttachment);
    }

    #[test]
    fn gbuffer_layout_is_complete() {
        let mut record = FramebufferRecord::new(Some("gbuffer"));
        record.set(AttachmentPoint::Color(0), texture(1)).unwrap();
        record.set(AttachmentPoint::DepthStencil, texture(2)).unwrap();
        record.draw_buffers = 1;

        assert_eq!(status(&record), FramebufferStatus::Complete);
        assert_eq!(record.textures().collect::<Vec<_>>(), vec![TextureId(1), TextureId(2), TextureId(2)]);
    }

    #[test]
    fn formats_must_match_the_point() {
        let mut depth_as_color = FramebufferRecord::new(None);
        depth_as_color.set(AttachmentPoint::Color(0), texture(2)).unwrap();
        assert_eq!(status(&depth_as_color), FramebufferStatus::IncompleteAttachment);

        let mut color_as_depth = FramebufferRecord::new(None);
        color_as_depth.set(AttachmentPoint::Depth, texture(1)).unwrap();
        assert_eq!(status(&color_as_depth), FramebufferStatus::IncompleteAttachment);

        let mut stencil_without_stencil = FramebufferRecord::new(None);
        stencil_without_stencil.set(AttachmentPoint::Stencil, texture(6)).unwrap();
        assert_eq!(status(&stencil_without_stencil), FramebufferStatus::IncompleteAttachment);
    }

    #[test]
    fn unknown_textures_and_levels_are_incomplete() {
        let mut unknown = FramebufferRecord::new(None);
        unknown.set(AttachmentPoint::Color(0), texture(99)).unwrap();
        assert_eq!(status(&unknown), FramebufferStatus::IncompleteAttachment);

        let mut bad_level = FramebufferRecord::new(None);
        bad_level
            .set(AttachmentPoint::Color(0), AttachmentSlot::new(TextureId(1), AttachmentKind::Texture, 3, 0))
            .unwrap();
        assert_eq!(status(&bad_level), FramebufferStatus::IncompleteAttachment);
    }

    #[test]
    fn level_extents_must_agree() {
        let mut record = FramebufferRecord::new(None);
        record.set(AttachmentPoint::Color(0), texture(1)).unwrap();
        record.set(AttachmentPoint::Color(1), texture(3)).unwrap();
        assert_eq!(status(&record), FramebufferStatus::IncompleteDimensions);

        // level 1 of 64x32 is 32x16, level 0 of 32x32 is not
        record
            .set(AttachmentPoint::Color(0), AttachmentSlot::new(TextureId(1), AttachmentKind::Texture, 1, 0))
            .unwrap();
        assert_eq!(status(&record), FramebufferStatus::IncompleteDimensions);
    }

    #[test]
    fn layered_and_flat_images_do_not_mix() {
        let layered = |id| AttachmentSlot::new(TextureId(id), AttachmentKind::ArrayTexture, 0, 0);

        let mut mixed = FramebufferRecord::new(None);
        mixed.set(AttachmentPoint::Color(0), layered(4)).unwrap();
        mixed.set(AttachmentPoint::Color(1), texture(1)).unwrap();
        assert_eq!(status(&mixed), FramebufferStatus::IncompleteLayerTargets);

        let mut counts = FramebufferRecord::new(None);
        counts.set(AttachmentPoint::Color(0), layered(4)).unwrap();
        counts.set(AttachmentPoint::Color(1), layered(5)).unwrap();
        assert_eq!(status(&counts), FramebufferStatus::IncompleteLayerCount);

        let mut one_layer = FramebufferRecord::new(None);
        one_layer
            .set(AttachmentPoint::Color(0), AttachmentSlot::new(TextureId(4), AttachmentKind::ArrayTextureLayer, 0, 3))
            .unwrap();
        one_layer.set(AttachmentPoint::Color(1), texture(1)).unwrap();
        assert_eq!(status(&one_layer), FramebufferStatus::Complete);
    }

    #[test]
    fn draw_buffers_need_attached_colors() {
        let mut record = FramebufferRecord::new(None);
        record.set(AttachmentPoint::Color(0), texture(1)).unwrap();
        record.set(AttachmentPoint::Color(2), texture(1)).unwrap();
        record.draw_buffers = 3;
        assert_eq!(status(&record), FramebufferStatus::IncompleteDrawBuffer);

        record.draw_buffers = 1;
        assert_eq!(status(&record), FramebufferStatus::Complete);
    }

    #[test]
    fn color_index_is_range_checked() {
        let mut record = FramebufferRecord::new(None);
        assert!(matches!(
            record.set(AttachmentPoint::Color(8), texture(1)),
            Err(ResourceError::InvalidParameter(_))
        ));
        record.set(AttachmentPoint::Color(0), texture(1)).unwrap();
        record.set(AttachmentPoint::Color(0), AttachmentSlot::NONE).unwrap();
        assert_eq!(status(&record), FramebufferStatus::MissingAttachment);
    }
}
