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
use approx::assert_relative_eq;
use defren_core::renderer::{
    AttachmentPoint, BlitMask, DepthMinMaxStrategy, DeviceCapabilities, GraphicsDevice,
    RenderError, RenderSettings, TextureId,
};
use defren_lanes::{
    DeferredRendering, DelayedOperations, DepthSlot, FramebufferManager, GBuffer, RenderTarget,
};
use std::sync::Arc;

struct Fixture {
    mock: Arc<MockGraphicsDevice>,
    manager: FramebufferManager,
    deferred: DeferredRendering,
}

fn fixture_with(capabilities: DeviceCapabilities, settings: RenderSettings) -> Fixture {
    let mock = MockGraphicsDevice::with_capabilities(capabilities);
    let device: Arc<dyn GraphicsDevice> = mock.clone();
    let delayed = Arc::new(DelayedOperations::default());
    let manager = FramebufferManager::new(Arc::clone(&device), Arc::clone(&delayed));
    let deferred = DeferredRendering::new(device, delayed, &settings).unwrap();
    Fixture {
        mock,
        manager,
        deferred,
    }
}

fn fixture() -> Fixture {
    fixture_with(DeviceCapabilities::default(), RenderSettings::default())
}

fn attached_images(mock: &MockGraphicsDevice, point: AttachmentPoint) -> Vec<TextureId> {
    mock.calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Attach(_, p, slot) if p == point => slot.image,
            _ => None,
        })
        .collect()
}

#[test]
fn buffers_start_at_the_minimum_size() {
    let f = fixture();

    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (64, 64));
    assert_eq!(f.mock.texture_count(), GBuffer::ALL.len() + DepthSlot::ALL.len());
    assert_eq!(f.deferred.target_count(), 0, "framebuffers are built on demand");
    assert_eq!(
        f.deferred.depth_texture(DepthSlot::Depth1).unwrap().mip_level_count(),
        7
    );
    assert_eq!(f.deferred.texture(GBuffer::Luminance).unwrap().size().width, 128);
}

#[test]
fn memory_usage_counts_every_texture() {
    let f = fixture();

    // 57 bytes of colors per texel, 128x64 luminance pair, three mip mapped
    // depths of 5 bytes per texel and the luminance depth.
    let expected = 57 * 64 * 64 + 2 * 8 * 128 * 64 + 3 * 5 * 5461 + 5 * 128 * 64;
    assert_eq!(f.deferred.memory_usage(), expected);
}

#[test]
fn shrinking_never_reallocates() {
    // --- ARRANGE ---
    let mut f = fixture();
    f.deferred.resize(&mut f.manager, 200, 100, 1).unwrap();
    let textures = f.mock.texture_count();

    // --- ACT ---
    f.deferred.resize(&mut f.manager, 100, 50, 1).unwrap();

    // --- ASSERT ---
    assert_eq!(f.mock.texture_count(), textures);
    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (200, 100));
    assert_eq!((f.deferred.width(), f.deferred.height()), (100, 50));
    assert_relative_eq!(f.deferred.screen_mapping().scaling().x, 0.5);
}

#[test]
fn growing_any_dimension_reallocates() {
    let mut f = fixture();
    f.deferred.resize(&mut f.manager, 200, 100, 1).unwrap();
    let textures = f.mock.texture_count();

    f.deferred.resize(&mut f.manager, 100, 150, 1).unwrap();
    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (200, 150));
    assert!(f.mock.texture_count() > textures);

    let textures = f.mock.texture_count();
    f.deferred.resize(&mut f.manager, 100, 150, 2).unwrap();
    assert_eq!(f.deferred.real_layer_count(), 2);
    assert!(f.mock.texture_count() > textures);
}

#[test]
fn power_of_two_sizes_round_up() {
    let settings = RenderSettings {
        use_pot_sizes: true,
        ..Default::default()
    };
    let mut f = fixture_with(DeviceCapabilities::default(), settings);

    f.deferred.resize(&mut f.manager, 300, 70, 1).unwrap();

    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (512, 128));
}

#[test]
fn invalid_sizes_are_rejected() {
    let mut f = fixture();

    assert!(matches!(
        f.deferred.resize(&mut f.manager, 0, 10, 1),
        Err(RenderError::InvalidParameter(_))
    ));
    assert!(f.deferred.resize(&mut f.manager, 10, 10, 0).is_err());
}

#[test]
fn failed_reallocation_keeps_the_previous_buffers() {
    // --- ARRANGE ---
    let mut f = fixture();
    f.mock.set_fail_textures(true);

    // --- ACT ---
    let failed = f.deferred.resize(&mut f.manager, 200, 100, 1);
    f.mock.set_fail_textures(false);
    let smaller = f.deferred.resize(&mut f.manager, 64, 64, 1);

    // --- ASSERT ---
    assert!(failed.is_err());
    assert!(smaller.is_ok());
    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (64, 64));
    assert!(f.deferred.texture(GBuffer::Color).is_some());
    assert!(f.deferred.activate_color(&mut f.manager, true).is_ok());

    f.deferred.resize(&mut f.manager, 200, 100, 1).unwrap();
    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (200, 100));
}

#[test]
fn reallocation_drops_framebuffers_and_binds_primary() {
    // --- ARRANGE ---
    let mut f = fixture();
    f.deferred.activate_color(&mut f.manager, true).unwrap();
    assert!(f.manager.active().is_some());

    // --- ACT ---
    f.deferred.resize(&mut f.manager, 1024, 768, 1).unwrap();

    // --- ASSERT ---
    assert_eq!(f.manager.active(), None);
    assert_eq!(f.deferred.target_count(), 0);
    assert!(f.manager.delayed().pending_gpu_deletions() > 0);
}

#[test]
fn force_resize_reallocates_same_size() {
    let mut f = fixture();
    f.deferred.resize(&mut f.manager, 320, 240, 1).unwrap();
    let textures = f.mock.texture_count();

    f.deferred.force_resize(&mut f.manager).unwrap();

    assert_eq!(f.mock.texture_count(), textures + GBuffer::ALL.len() + DepthSlot::ALL.len());
    assert_eq!((f.deferred.width(), f.deferred.height()), (320, 240));
    assert_eq!((f.deferred.real_width(), f.deferred.real_height()), (320, 240));
}

#[test]
fn targets_are_built_once() {
    // --- ARRANGE ---
    let mut f = fixture();

    // --- ACT ---
    f.deferred.activate_color(&mut f.manager, true).unwrap();
    f.deferred.activate_diffuse(&mut f.manager, false).unwrap();
    f.deferred.activate_color(&mut f.manager, true).unwrap();

    // --- ASSERT ---
    assert_eq!(f.mock.framebuffer_count(), 2);
    assert_eq!(f.deferred.target_count(), 2);
    assert_eq!(f.mock.count(|c| matches!(c, Call::CheckStatus(_))), 2, "each target is verified once");
}

#[test]
fn depth_ping_pong_swaps_physical_buffers() {
    // --- ARRANGE ---
    let mut f = fixture();
    let depth1 = f.deferred.depth_texture(DepthSlot::Depth1).unwrap().id();
    let depth2 = f.deferred.depth_texture(DepthSlot::Depth2).unwrap().id();

    // --- ACT ---
    f.deferred.activate_depth(&mut f.manager).unwrap();
    f.deferred.swap_depth_textures();
    f.deferred.activate_depth(&mut f.manager).unwrap();

    // --- ASSERT ---
    assert_eq!(attached_images(&f.mock, AttachmentPoint::Depth), vec![depth1, depth2]);
    assert_eq!(f.deferred.depth_texture1().unwrap().id(), depth2);
    assert_eq!(f.deferred.depth_texture2().unwrap().id(), depth1);

    f.deferred.reset_depth_textures();
    assert_eq!(f.deferred.depth_texture1().unwrap().id(), depth1);
}

#[test]
fn post_process_alternates_between_color_and_temporary() {
    // --- ARRANGE ---
    let mut f = fixture();
    let color = f.deferred.texture(GBuffer::Color).unwrap().id();
    let temporary2 = f.deferred.texture(GBuffer::Temporary2).unwrap().id();

    // --- ACT ---
    f.deferred.init_post_process_target();
    let first_read = f.deferred.post_process_buffer();
    f.deferred.activate_post_process(&mut f.manager, false).unwrap();
    f.deferred.swap_post_process_target();
    let second_read = f.deferred.post_process_buffer();
    f.deferred.activate_post_process(&mut f.manager, false).unwrap();

    // --- ASSERT ---
    assert_eq!(first_read, GBuffer::Color);
    assert_eq!(second_read, GBuffer::Temporary2);
    assert_eq!(
        attached_images(&f.mock, AttachmentPoint::Color(0)),
        vec![temporary2, color]
    );
}

#[test]
fn encoded_depth_targets_are_unsupported() {
    let mut f = fixture();

    for target in [RenderTarget::DepthDiffuse, RenderTarget::DepthTemp1, RenderTarget::ColorDepth] {
        assert!(matches!(
            f.deferred.activate(&mut f.manager, target),
            Err(RenderError::InvalidParameter(_))
        ));
    }
}

#[test]
fn every_other_catalog_entry_verifies() {
    let mut f = fixture();

    for target in RenderTarget::ALL {
        if target.target_set(8).is_some() {
            f.deferred.activate(&mut f.manager, target).unwrap();
        }
    }

    assert_eq!(f.deferred.target_count(), RenderTarget::ALL.len() - 3);
}

#[test]
fn material_target_follows_draw_buffer_limit() {
    let caps = DeviceCapabilities {
        max_draw_buffers: 4,
        ..Default::default()
    };
    let mut f = fixture_with(caps, RenderSettings::default());

    f.deferred.activate_material_color(&mut f.manager).unwrap();

    assert_eq!(f.mock.count(|c| matches!(c, Call::DrawBuffers(_, 4))), 1);
}

#[test]
fn depth_levels_are_range_checked() {
    let mut f = fixture();

    f.deferred.activate_depth_level(&mut f.manager, 3).unwrap();
    assert!(matches!(
        f.deferred.activate_depth_level(&mut f.manager, 7),
        Err(RenderError::InvalidParameter(_))
    ));
    assert!(f.deferred.activate_temporary1_level(&mut f.manager, 0).is_ok());
    assert!(f.deferred.activate_temporary2_level(&mut f.manager, 1).is_err());
}

#[test]
fn depth_copies_blit_the_used_area() {
    // --- ARRANGE ---
    let mut f = fixture();
    f.deferred.resize(&mut f.manager, 40, 30, 1).unwrap();
    f.mock.clear_calls();

    // --- ACT ---
    f.deferred.copy_first_depth_to_second(false, false).unwrap();
    let nothing = f.mock.count(|c| matches!(c, Call::Blit(..)));
    f.deferred.copy_first_depth_to_second(true, false).unwrap();
    f.deferred.copy_first_depth_to_third(true, true).unwrap();

    // --- ASSERT ---
    assert_eq!(nothing, 0);
    let blits: Vec<_> = f
        .mock
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Blit(_, _, w, h, mask) => Some((w, h, mask)),
            _ => None,
        })
        .collect();
    assert_eq!(
        blits,
        vec![
            (40, 30, BlitMask::depth_stencil(true, false)),
            (40, 30, BlitMask::depth_stencil(true, true)),
        ]
    );
    assert_eq!(f.manager.active(), None, "copies leave the binding alone");
}

#[test]
fn inverse_depth_needs_device_support() {
    let caps = DeviceCapabilities {
        supports_inverse_depth: false,
        ..Default::default()
    };
    let f = fixture_with(caps, RenderSettings::default());
    assert!(!f.deferred.use_inverse_depth());

    let f = fixture();
    assert!(f.deferred.use_inverse_depth());
    assert_eq!(f.deferred.depth_convention().clear_regular, 0.0);
}

#[test]
fn depth_min_max_follows_settings() {
    let f = fixture();
    assert!(f.deferred.depth_min_max().is_none());

    let settings = RenderSettings {
        depth_min_max: Some(DepthMinMaxStrategy::SeparateTextures),
        ..Default::default()
    };
    let mut f = fixture_with(DeviceCapabilities::default(), settings);
    let pyramid = f.deferred.depth_min_max().unwrap();
    assert_eq!((pyramid.width(), pyramid.height()), (32, 32));
    let without_pyramid = f.deferred.memory_usage() - pyramid.memory_usage();
    assert_eq!(without_pyramid, 57 * 64 * 64 + 2 * 8 * 128 * 64 + 3 * 5 * 5461 + 5 * 128 * 64);

    f.deferred.resize(&mut f.manager, 300, 200, 1).unwrap();
    let pyramid = f.deferred.depth_min_max().unwrap();
    assert_eq!((pyramid.width(), pyramid.height()), (256, 128));
}
