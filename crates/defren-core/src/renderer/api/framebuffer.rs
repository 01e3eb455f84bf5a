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

//! Framebuffer attachment vocabulary shared by the lanes and the backends.

use super::texture::TextureId;
use std::fmt;

/// The number of color attachment slots a framebuffer tracks.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// An opaque handle to an off-screen framebuffer owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub usize);

/// A binding point on a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// The color attachment with the given index.
    Color(u8),
    /// The depth attachment.
    Depth,
    /// The stencil attachment.
    Stencil,
    /// Depth and stencil together.
    DepthStencil,
}

/// One face of a cube map, in the conventional layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// The face looking along +X.
    PosX,
    /// The face looking along -X.
    NegX,
    /// The face looking along +Y.
    PosY,
    /// The face looking along -Y.
    NegY,
    /// The face looking along +Z.
    PosZ,
    /// The face looking along -Z.
    NegZ,
}

impl CubeFace {
    /// All faces in layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// The array layer backing this face.
    pub const fn index(&self) -> u32 {
        match self {
            CubeFace::PosX => 0,
            CubeFace::NegX => 1,
            CubeFace::PosY => 2,
            CubeFace::NegY => 3,
            CubeFace::PosZ => 4,
            CubeFace::NegZ => 5,
        }
    }

    /// Returns the face stored in array layer `index`, if any.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// How an image is bound to an attachment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentKind {
    /// Nothing is attached.
    #[default]
    None,
    /// A whole 2D texture.
    Texture,
    /// All six faces of a cube map (layered rendering).
    CubeMap,
    /// A single face of a cube map.
    CubeMapFace(CubeFace),
    /// All layers of an array texture (layered rendering).
    ArrayTexture,
    /// A single layer of an array texture.
    ArrayTextureLayer,
}

impl AttachmentKind {
    /// Returns `true` when every layer of the image is bound at once.
    pub const fn is_layered(&self) -> bool {
        matches!(self, AttachmentKind::CubeMap | AttachmentKind::ArrayTexture)
    }
}

/// Records what is bound to one attachment point of a framebuffer.
///
/// Two slots are equal only if image, kind, level and layer all match. The
/// framebuffer wrapper relies on this to skip rebinding an identical image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttachmentSlot {
    /// The bound texture, `None` when the slot is empty.
    pub image: Option<TextureId>,
    /// How the texture is bound.
    pub kind: AttachmentKind,
    /// The mip level rendered to.
    pub level: u32,
    /// The array layer rendered to (the face index for cube faces).
    pub layer: u32,
}

impl AttachmentSlot {
    /// An empty slot.
    pub const NONE: Self = Self {
        image: None,
        kind: AttachmentKind::None,
        level: 0,
        layer: 0,
    };

    /// Creates a slot binding `image` as `kind`.
    pub const fn new(image: TextureId, kind: AttachmentKind, level: u32, layer: u32) -> Self {
        Self {
            image: Some(image),
            kind,
            level,
            layer,
        }
    }

    /// Returns `true` if an image is bound.
    pub const fn is_attached(&self) -> bool {
        self.image.is_some() && !matches!(self.kind, AttachmentKind::None)
    }
}

/// The completeness state of a framebuffer as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    /// The framebuffer can be rendered to.
    Complete,
    /// An attachment is bound to an image the point cannot accept.
    IncompleteAttachment,
    /// No image is attached at all.
    MissingAttachment,
    /// Attached images do not share the same size.
    IncompleteDimensions,
    /// Attached images use incompatible formats.
    IncompleteFormats,
    /// A draw buffer refers to an empty slot.
    IncompleteDrawBuffer,
    /// The read buffer refers to an empty slot.
    IncompleteReadBuffer,
    /// Attached images disagree on their sample count.
    IncompleteMultisample,
    /// Layered and non-layered images are mixed.
    IncompleteLayerTargets,
    /// Layered images disagree on their layer count.
    IncompleteLayerCount,
    /// The combination is valid but not supported by the backend.
    Unsupported,
    /// A backend specific status code.
    Unknown(u32),
}

impl FramebufferStatus {
    /// Returns `true` if the status is [`FramebufferStatus::Complete`].
    pub const fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferStatus::Complete => write!(f, "COMPLETE"),
            FramebufferStatus::IncompleteAttachment => write!(f, "INCOMPLETE_ATTACHMENT"),
            FramebufferStatus::MissingAttachment => write!(f, "INCOMPLETE_MISSING_ATTACHMENT"),
            FramebufferStatus::IncompleteDimensions => write!(f, "INCOMPLETE_DIMENSIONS"),
            FramebufferStatus::IncompleteFormats => write!(f, "INCOMPLETE_FORMATS"),
            FramebufferStatus::IncompleteDrawBuffer => write!(f, "INCOMPLETE_DRAW_BUFFER"),
            FramebufferStatus::IncompleteReadBuffer => write!(f, "INCOMPLETE_READ_BUFFER"),
            FramebufferStatus::IncompleteMultisample => write!(f, "INCOMPLETE_MULTISAMPLE"),
            FramebufferStatus::IncompleteLayerTargets => write!(f, "INCOMPLETE_LAYER_TARGETS"),
            FramebufferStatus::IncompleteLayerCount => write!(f, "INCOMPLETE_LAYER_COUNT"),
            FramebufferStatus::Unsupported => write!(f, "UNSUPPORTED"),
            FramebufferStatus::Unknown(code) => write!(f, "UNKNOWN({code:#x})"),
        }
    }
}

/// Selects which aspects a blit copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlitMask {
    /// Copy color attachment 0.
    pub color: bool,
    /// Copy the depth aspect.
    pub depth: bool,
    /// Copy the stencil aspect.
    pub stencil: bool,
}

impl BlitMask {
    /// Builds a depth/stencil mask.
    pub const fn depth_stencil(depth: bool, stencil: bool) -> Self {
        Self {
            color: false,
            depth,
            stencil,
        }
    }

    /// Returns `true` if nothing would be copied.
    pub const fn is_empty(&self) -> bool {
        !(self.color || self.depth || self.stencil)
    }
}
