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

//! A grid of light probes covering a bounding box and the atlas their traced
//! rays are stored in.
//!
//! The grid gets one border probe on every side so lookups at the edge of the
//! box still find neighbours. Positions outside the padded grid are clamped to
//! the nearest border probe.

use super::framebuffer::Framebuffer;
use super::framebuffer_manager::FramebufferManager;
use super::texture::RenderTexture;
use defren_core::math::{Aabb, Extent2D, Point3, Vec2, Vec3};
use defren_core::renderer::{RayTraceFieldSettings, RenderError, TextureDescriptor, TextureFormat};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Texel format of the probe atlas.
pub const ATLAS_FORMAT: TextureFormat = TextureFormat::Rgba16Float;

/// Returns `count` directions evenly spread over the unit sphere.
pub fn spherical_fibonacci(count: u32) -> Vec<Vec3> {
    let phi_fraction = 5.0_f32.sqrt() * 0.5 - 0.5;
    let n = count as f32;
    (0..count)
        .map(|i| {
            let i = i as f32;
            let phi = TAU * (i * phi_fraction).fract();
            let cos_theta = 1.0 - (2.0 * i + 1.0) / n;
            let sin_theta = (1.0 - cos_theta * cos_theta).clamp(0.0, 1.0).sqrt();
            Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
        })
        .collect()
}

/// A probe grid fitted to a bounding box.
#[derive(Debug)]
pub struct RayTraceField {
    settings: RayTraceFieldSettings,
    bounds: Aabb,
    cells: Point3,
    spacing: Vec3,
    probe_count: Point3,
    origin: Vec3,
    coord_clamp: Point3,
    ray_directions: Vec<Vec3>,
    atlas: Option<RenderTexture>,
}

impl RayTraceField {
    /// Creates a field covering a unit box at the origin. Call
    /// [`init`](Self::init) to fit it to the actual volume.
    pub fn new(settings: RayTraceFieldSettings) -> Self {
        let ray_directions = spherical_fibonacci(settings.rays_per_probe);
        let mut field = Self {
            settings,
            bounds: Aabb::default(),
            cells: Point3::splat(1),
            spacing: Vec3::ONE,
            probe_count: Point3::splat(3),
            origin: Vec3::ZERO,
            coord_clamp: Point3::splat(2),
            ray_directions,
            atlas: None,
        };
        field.init(Aabb::from_min_max(Vec3::ZERO, Vec3::ONE));
        field
    }

    /// Fits the grid to `bounds`.
    ///
    /// Each axis gets `round(extent / spacing)` cells, at least one and at most
    /// the configured maximum. The spacing is then stretched so the cells cover
    /// the extent exactly. A flat axis keeps the configured spacing. The atlas
    /// is dropped if its size changes.
    pub fn init(&mut self, bounds: Aabb) {
        let extent = bounds.extent();
        let target = self.settings.probe_spacing;
        let max_cells = self.settings.max_cells.max(Point3::splat(1));

        let axis = |extent: f32, max: i32| -> (i32, f32) {
            let cells = ((extent / target).round() as i32).clamp(1, max);
            let spacing = if extent > 0.0 { extent / cells as f32 } else { target };
            (cells, spacing)
        };
        let (cx, sx) = axis(extent.x, max_cells.x);
        let (cy, sy) = axis(extent.y, max_cells.y);
        let (cz, sz) = axis(extent.z, max_cells.z);

        let previous_atlas = self.atlas_size();

        self.bounds = bounds;
        self.cells = Point3::new(cx, cy, cz);
        self.spacing = Vec3::new(sx, sy, sz);
        self.probe_count = self.cells + Point3::splat(2);
        self.origin = bounds.min - self.spacing;
        self.coord_clamp = self.probe_count - Point3::splat(1);

        if self.atlas_size() != previous_atlas {
            self.drop_atlas();
        }

        log::debug!(
            "RayTraceField: {}x{}x{} cells, spacing ({:.3}, {:.3}, {:.3})",
            cx,
            cy,
            cz,
            sx,
            sy,
            sz
        );
    }

    /// The tuning the field was created with.
    pub fn settings(&self) -> &RayTraceFieldSettings {
        &self.settings
    }

    /// The box the grid was fitted to.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Usable cells per axis, border excluded.
    pub fn cells(&self) -> Point3 {
        self.cells
    }

    /// Distance between neighbouring probes per axis.
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Probes per axis, border included.
    pub fn probe_count(&self) -> Point3 {
        self.probe_count
    }

    /// Total number of probes.
    pub fn total_probe_count(&self) -> u32 {
        self.probe_count.volume() as u32
    }

    /// The lower corner of the padded grid.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// The largest valid grid coordinate.
    pub fn coord_clamp(&self) -> Point3 {
        self.coord_clamp
    }

    /// The centre of the probe at `coord`.
    pub fn coord_to_position(&self, coord: Point3) -> Vec3 {
        self.origin + self.spacing.mul_elem(Vec3::from(coord) + Vec3::splat(0.5))
    }

    /// The grid coordinate of the probe nearest to `position`, clamped to the grid.
    pub fn position_to_coord(&self, position: Vec3) -> Point3 {
        let grid = (position - self.origin).div_elem(self.spacing) - Vec3::splat(0.5);
        grid.clamp(Vec3::ZERO, Vec3::from(self.coord_clamp)).round()
    }

    /// The grid coordinate of the probe with linear `index`.
    ///
    /// Probes are laid out in y-major order with x varying fastest. Indices
    /// past the last probe map to the last probe.
    pub fn probe_index_to_coord(&self, index: u32) -> Point3 {
        let index = index.min(self.total_probe_count() - 1) as i32;
        let stride = self.probe_count.x * self.probe_count.z;
        let y = index / stride;
        let rest = index - stride * y;
        let z = rest / self.probe_count.x;
        Point3::new(rest - self.probe_count.x * z, y, z)
    }

    /// The linear index of the probe at `coord`, clamped to the grid.
    pub fn coord_to_probe_index(&self, coord: Point3) -> u32 {
        let coord = coord.max(Point3::splat(0)).min(self.coord_clamp);
        let stride = self.probe_count.x * self.probe_count.z;
        (stride * coord.y + self.probe_count.x * coord.z + coord.x) as u32
    }

    /// The ray directions traced for every probe.
    pub fn ray_directions(&self) -> &[Vec3] {
        &self.ray_directions
    }

    /// Size of the image holding one texel per traced ray.
    pub fn sample_image_size(&self) -> Extent2D {
        let per_line = self.settings.probes_per_line.max(1);
        Extent2D::new(
            per_line * self.settings.rays_per_probe,
            self.total_probe_count().div_ceil(per_line),
        )
    }

    /// Size of the probe atlas.
    ///
    /// Tiles of probes sharing a z coordinate form one row. Every tile has a
    /// one texel gutter and the atlas a one texel border.
    pub fn atlas_size(&self) -> Extent2D {
        let tile = self.settings.tile_size + 2;
        let c = self.probe_count;
        Extent2D::new(
            tile * (c.x * c.y) as u32 + 2,
            tile * c.z as u32 + 2,
        )
    }

    /// The first texel inside the gutter of the tile of the probe at `coord`.
    pub fn tile_origin(&self, coord: Point3) -> (u32, u32) {
        let tile = self.settings.tile_size + 2;
        let column = (coord.y * self.probe_count.x + coord.x) as u32;
        let row = coord.z as u32;
        (column * tile + 2, row * tile + 2)
    }

    /// The size of one atlas texel in texture coordinates.
    pub fn map_scale(&self) -> Vec2 {
        let size = self.atlas_size();
        Vec2::new(1.0 / size.width as f32, 1.0 / size.height as f32)
    }

    /// The atlas texture, once traced.
    pub fn atlas(&self) -> Option<&RenderTexture> {
        self.atlas.as_ref()
    }

    /// Releases the atlas texture. The next trace allocates it again.
    pub fn drop_atlas(&mut self) {
        if self.atlas.take().is_some() {
            log::debug!("RayTraceField: dropped atlas");
        }
    }

    /// Renders into the atlas.
    ///
    /// The atlas is allocated on first use. A transient framebuffer targeting it
    /// is bound while `render` runs. The primary framebuffer is bound again
    /// afterwards, even if `render` fails.
    pub fn trace<F>(&mut self, manager: &mut FramebufferManager, render: F) -> Result<(), RenderError>
    where
        F: FnOnce(&RayTraceField, &Framebuffer) -> Result<(), RenderError>,
    {
        let size = self.atlas_size();
        if self.atlas.is_none() {
            let descriptor =
                TextureDescriptor::new_2d("RayTraceField.Atlas", size.width, size.height, ATLAS_FORMAT);
            self.atlas = Some(RenderTexture::new(
                manager.device().as_ref(),
                manager.delayed(),
                descriptor,
            )?);
            log::debug!("RayTraceField: allocated atlas {}x{}", size.width, size.height);
        }
        let atlas = self
            .atlas
            .as_ref()
            .ok_or(RenderError::NotInitialized)?;

        let mut framebuffer = Framebuffer::new(
            Arc::clone(manager.device()),
            Arc::clone(manager.delayed()),
            "RayTraceField",
        )?;
        framebuffer.set_usage_resolution(size.width, size.height)?;
        framebuffer.attach_color_texture(0, atlas)?;
        framebuffer.update_read_write_buffers()?;
        framebuffer.verify()?;
        manager.activate(&framebuffer)?;

        let result = render(self, &framebuffer);
        let restored = manager.activate_primary();
        result?;
        restored
    }
}
