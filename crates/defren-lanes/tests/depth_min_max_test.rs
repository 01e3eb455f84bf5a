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
use defren_core::math::Extent2D;
use defren_core::renderer::{
    AttachmentPoint, DepthMinMaxStrategy, GraphicsDevice, RenderError, TextureFormat,
};
use defren_lanes::{level_count, DelayedOperations, DepthMinMax, FramebufferManager};
use std::sync::Arc;

fn make_pyramid(strategy: DepthMinMaxStrategy, width: u32, height: u32) -> (Arc<MockGraphicsDevice>, FramebufferManager, DepthMinMax) {
    let mock = MockGraphicsDevice::new();
    let device: Arc<dyn GraphicsDevice> = mock.clone();
    let delayed = Arc::new(DelayedOperations::default());
    let manager = FramebufferManager::new(Arc::clone(&device), Arc::clone(&delayed));
    let pyramid = DepthMinMax::new(device, delayed, strategy, width, height, 11).unwrap();
    (mock, manager, pyramid)
}

fn created_formats(mock: &MockGraphicsDevice) -> Vec<(TextureFormat, u32)> {
    mock.calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateTexture(_, d) => Some((d.format, d.size.width)),
            _ => None,
        })
        .collect()
}

#[test]
fn level_count_matches_log2_of_longest_side() {
    for (w, h, expected) in [(1, 1, 1), (2, 2, 2), (512, 512, 10), (512, 64, 10), (3, 700, 10), (1024, 1, 11)] {
        assert_eq!(level_count(w, h), expected, "{w}x{h}");
    }
}

#[test]
fn level_count_is_bounded_by_maximum() {
    let (_mock, _manager, pyramid) = make_pyramid(DepthMinMaxStrategy::PackedTwoChannel, 4096, 2048);
    assert_eq!(pyramid.level_count(), 11);

    let (_mock, _manager, pyramid) = make_pyramid(DepthMinMaxStrategy::PackedTwoChannel, 4, 2);
    assert_eq!(pyramid.level_count(), 3);
}

#[test]
fn strategies_allocate_their_layouts() {
    let (mock, _manager, packed) = make_pyramid(DepthMinMaxStrategy::PackedTwoChannel, 64, 32);
    assert_eq!(created_formats(&mock), vec![(TextureFormat::Rg32Float, 64)]);
    assert!(packed.texture().is_some());

    let (mock, _manager, separate) = make_pyramid(DepthMinMaxStrategy::SeparateTextures, 64, 32);
    assert_eq!(
        created_formats(&mock),
        vec![(TextureFormat::R32Float, 64), (TextureFormat::R32Float, 64)]
    );
    assert!(separate.texture().is_none());
    assert!(separate.texture_min().is_some() && separate.texture_max().is_some());

    let (mock, _manager, doubled) = make_pyramid(DepthMinMaxStrategy::DoubledWidth, 64, 32);
    assert_eq!(created_formats(&mock), vec![(TextureFormat::R32Float, 128)]);
    assert_eq!(doubled.texel_offset_for_max(0).unwrap(), 64);
    assert_eq!(doubled.texel_offset_for_max(2).unwrap(), 16);
    assert_eq!(packed.texel_offset_for_max(2).unwrap(), 0);
}

#[test]
fn doubled_width_stops_while_the_max_half_fits() {
    // --- ARRANGE ---
    let (mock, _manager, pyramid) = make_pyramid(DepthMinMaxStrategy::DoubledWidth, 4, 512);
    let texture_width = created_formats(&mock)[0].1;

    // --- ACT ---
    let last = pyramid.level_count() - 1;
    let offset = pyramid.texel_offset_for_max(last).unwrap();

    // --- ASSERT ---
    assert_eq!(pyramid.level_count(), 3);
    assert_eq!(offset, 1);
    assert!(offset < (texture_width >> last).max(1));
    assert!(pyramid.texel_offset_for_max(last + 1).is_err());
}

#[test]
fn level_sizes_halve_and_are_range_checked() {
    let (_mock, _manager, pyramid) = make_pyramid(DepthMinMaxStrategy::PackedTwoChannel, 64, 16);

    assert_eq!(pyramid.level_size(0).unwrap(), Extent2D::new(64, 16));
    assert_eq!(pyramid.level_size(5).unwrap(), Extent2D::new(2, 1));
    assert!(matches!(pyramid.level_size(7), Err(RenderError::InvalidParameter(_))));
}

#[test]
fn level_framebuffers_are_created_lazily() {
    // --- ARRANGE ---
    let (mock, mut manager, mut pyramid) = make_pyramid(DepthMinMaxStrategy::SeparateTextures, 32, 32);
    assert_eq!(mock.framebuffer_count(), 0);

    // --- ACT ---
    pyramid.activate_level(&mut manager, 2).unwrap();
    pyramid.activate_level(&mut manager, 2).unwrap();

    // --- ASSERT ---
    assert_eq!(mock.framebuffer_count(), 1);
    let points: Vec<_> = mock
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Attach(_, point, slot) => Some((point, slot.level)),
            _ => None,
        })
        .collect();
    assert_eq!(points, vec![(AttachmentPoint::Color(0), 2), (AttachmentPoint::Color(1), 2)]);
    assert!(manager.active().is_some());
    assert!(pyramid.activate_level(&mut manager, 6).is_err());
}

#[test]
fn tc_factor_relates_render_and_pyramid_sizes() {
    let (_mock, _manager, pyramid) = make_pyramid(DepthMinMaxStrategy::DoubledWidth, 64, 32);

    let factor = pyramid.tc_factor(128, 64);
    assert_eq!((factor.x, factor.y), (1.0, 1.0));
}

#[test]
fn invalid_sizes_are_rejected() {
    let mock = MockGraphicsDevice::new();
    let device: Arc<dyn GraphicsDevice> = mock;
    let delayed = Arc::new(DelayedOperations::default());

    assert!(DepthMinMax::new(device.clone(), delayed.clone(), DepthMinMaxStrategy::DoubledWidth, 0, 8, 11).is_err());
    assert!(DepthMinMax::new(device, delayed, DepthMinMaxStrategy::DoubledWidth, 8, 8, 0).is_err());
}
