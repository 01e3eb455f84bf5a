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

mod common;

use common::{Call, MockGraphicsDevice};
use defren_core::math::{Aabb, Point3, Vec3};
use defren_core::renderer::{
    FramebufferStatus, GraphicsDevice, RayTraceFieldSettings, RenderError,
};
use defren_lanes::{DelayedOperations, FramebufferManager, RayTraceField};
use std::sync::Arc;

fn manager() -> (Arc<MockGraphicsDevice>, FramebufferManager) {
    let mock = MockGraphicsDevice::new();
    let device: Arc<dyn GraphicsDevice> = mock.clone();
    (mock, FramebufferManager::new(device, Arc::new(DelayedOperations::default())))
}

#[test]
fn spacing_reproduces_the_extent() {
    let boxes = [
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(7.3, 2.2, 11.9)),
        (Vec3::new(-40.0, -3.0, -12.5), Vec3::new(40.0, 3.0, 12.5)),
        (Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.4, 9.6, 5.5)),
    ];
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());

    for (min, max) in boxes {
        let bounds = Aabb::from_min_max(min, max);
        field.init(bounds);

        let cells = field.cells();
        let spacing = field.spacing();
        let extent = bounds.extent();
        assert!(cells.x >= 1 && cells.x <= 29);
        assert!(cells.y >= 1 && cells.y <= 13);
        assert!(cells.z >= 1 && cells.z <= 29);
        assert!((spacing.x * cells.x as f32 - extent.x).abs() < 1e-3);
        assert!((spacing.y * cells.y as f32 - extent.y).abs() < 1e-3);
        assert!((spacing.z * cells.z as f32 - extent.z).abs() < 1e-3);
    }
}

#[test]
fn positions_round_trip_within_half_a_cell() {
    // --- ARRANGE ---
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());
    let bounds = Aabb::from_min_max(Vec3::new(-3.0, 0.0, -2.0), Vec3::new(4.0, 2.5, 6.0));
    field.init(bounds);
    let spacing = field.spacing();
    let lower = field.origin();
    let upper = lower + spacing.mul_elem(Vec3::from(field.probe_count()));

    // --- ACT & ASSERT ---
    let steps = 23;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let p = lower + (upper - lower) * t;
        let q = field.coord_to_position(field.position_to_coord(p));
        let d = (q - p).div_elem(spacing);
        assert!(d.x.abs() <= 0.5 + 1e-4, "{p:?} -> {q:?}");
        assert!(d.y.abs() <= 0.5 + 1e-4, "{p:?} -> {q:?}");
        assert!(d.z.abs() <= 0.5 + 1e-4, "{p:?} -> {q:?}");
    }
}

#[test]
fn positions_outside_clamp_instead_of_wrapping() {
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());
    field.init(Aabb::from_min_max(Vec3::ZERO, Vec3::new(3.0, 3.0, 3.0)));
    let last = field.coord_clamp();

    assert_eq!(field.position_to_coord(Vec3::new(-1.0e6, 1.5, 1.0e6)), Point3::new(0, 2, last.z));
    assert_eq!(field.position_to_coord(Vec3::splat(1.0e6)), last);
}

#[test]
fn trace_renders_into_the_atlas_and_restores_primary() {
    // --- ARRANGE ---
    let (mock, mut manager) = manager();
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());
    field.init(Aabb::from_min_max(Vec3::ZERO, Vec3::new(2.0, 1.0, 3.0)));
    let mut rendered_to = None;

    // --- ACT ---
    field
        .trace(&mut manager, |field, framebuffer| {
            rendered_to = framebuffer.id();
            assert_eq!(framebuffer.usage_width(), field.atlas_size().width);
            Ok(())
        })
        .unwrap();

    // --- ASSERT ---
    let atlas = field.atlas().expect("atlas allocated by the trace");
    assert_eq!(atlas.size(), field.atlas_size());
    assert!(mock.calls().contains(&Call::Bind(rendered_to)));
    assert_eq!(manager.active(), None);
    assert_eq!(manager.delayed().pending_gpu_deletions(), 1, "the transient framebuffer is queued");
}

#[test]
fn trace_reuses_the_atlas_until_dropped() {
    let (mock, mut manager) = manager();
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());

    field.trace(&mut manager, |_, _| Ok(())).unwrap();
    field.trace(&mut manager, |_, _| Ok(())).unwrap();
    assert_eq!(mock.texture_count(), 1);

    field.drop_atlas();
    field.trace(&mut manager, |_, _| Ok(())).unwrap();
    assert_eq!(mock.texture_count(), 2);
}

#[test]
fn failing_render_still_restores_primary() {
    let (_mock, mut manager) = manager();
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());

    let result = field.trace(&mut manager, |_, _| Err(RenderError::Internal("boom".into())));

    assert!(matches!(result, Err(RenderError::Internal(_))));
    assert_eq!(manager.active(), None);
}

#[test]
fn incomplete_atlas_framebuffer_aborts_before_rendering() {
    let (mock, mut manager) = manager();
    mock.set_status(FramebufferStatus::Unsupported);
    let mut field = RayTraceField::new(RayTraceFieldSettings::default());
    let mut called = false;

    let result = field.trace(&mut manager, |_, _| {
        called = true;
        Ok(())
    });

    assert!(matches!(result, Err(RenderError::IncompleteFramebuffer { .. })));
    assert!(!called);
}
