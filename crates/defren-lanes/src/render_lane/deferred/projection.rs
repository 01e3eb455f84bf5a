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

//! Depth conventions and projection matrices.

use defren_core::math::{DMat4, PI};
use defren_core::renderer::RenderError;

/// A depth test comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthCompare {
    /// Passes if the incoming depth is less than or equal to the stored one.
    LessEqual,
    /// Passes if the incoming depth is greater than or equal to the stored one.
    GreaterEqual,
}

/// Depth test functions and clear values derived from the inverse depth choice.
///
/// "Reversed" is the opposite direction of "regular", used by passes that
/// render back faces or test against the far side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConvention {
    /// Whether depth is stored inverted (near = 1, far = 0).
    pub inverse: bool,
    /// Comparison for regular rendering.
    pub compare_regular: DepthCompare,
    /// Comparison for reversed rendering.
    pub compare_reversed: DepthCompare,
    /// Clear value for regular rendering.
    pub clear_regular: f32,
    /// Clear value for reversed rendering.
    pub clear_reversed: f32,
}

impl DepthConvention {
    /// Builds the convention for the given inverse depth choice.
    pub const fn new(inverse: bool) -> Self {
        if inverse {
            Self {
                inverse,
                compare_regular: DepthCompare::GreaterEqual,
                compare_reversed: DepthCompare::LessEqual,
                clear_regular: 0.0,
                clear_reversed: 1.0,
            }
        } else {
            Self {
                inverse,
                compare_regular: DepthCompare::LessEqual,
                compare_reversed: DepthCompare::GreaterEqual,
                clear_regular: 1.0,
                clear_reversed: 0.0,
            }
        }
    }

    /// Decides whether inverse depth can be used.
    ///
    /// Requires the preference, device support and encoded depth being off.
    pub fn select(prefer_inverse: bool, device_supports: bool, use_encoded_depth: bool) -> Self {
        Self::new(prefer_inverse && device_supports && !use_encoded_depth)
    }

    /// Fade-out ranges are only usable with inverse depth precision.
    pub const fn use_fade_out_range(&self) -> bool {
        self.inverse
    }
}

impl Default for DepthConvention {
    fn default() -> Self {
        Self::new(false)
    }
}

#[derive(Debug, Clone, Copy)]
struct Perspective {
    a11: f64,
    a22: f64,
}

fn perspective(width: u32, height: u32, fov: f64, fov_ratio: f64, znear: f64) -> Result<Perspective, RenderError> {
    if width < 1 || height < 1 {
        return Err(RenderError::invalid_parameter(format!(
            "projection size {width}x{height} must be at least 1x1"
        )));
    }
    if !(fov > 0.0 && fov < PI) {
        return Err(RenderError::invalid_parameter(format!("field of view {fov} out of (0, PI)")));
    }
    if !(fov_ratio > 0.0) {
        return Err(RenderError::invalid_parameter(format!("field of view ratio {fov_ratio} must be positive")));
    }
    if !(znear > 0.0) {
        return Err(RenderError::invalid_parameter(format!("near plane {znear} must be positive")));
    }

    let aspect = width as f64 / height as f64;
    Ok(Perspective {
        a11: 1.0 / (fov * 0.5).tan(),
        a22: aspect / (fov * fov_ratio * 0.5).tan(),
    })
}

/// Creates an infinite perspective projection.
///
/// With inverse depth the near plane maps to depth 1 and infinity to 0, otherwise
/// the near plane maps to -1 and infinity to 1 in clip space. The far plane is
/// validated but does not enter the matrix.
pub fn create_projection_matrix(
    width: u32,
    height: u32,
    fov: f64,
    fov_ratio: f64,
    znear: f64,
    zfar: f64,
    inverse_depth: bool,
) -> Result<DMat4, RenderError> {
    let p = perspective(width, height, fov, fov_ratio, znear)?;
    if !(znear < zfar) {
        return Err(RenderError::invalid_parameter(format!("near plane {znear} must be before far plane {zfar}")));
    }

    let mut m = DMat4::ZERO;
    m.set(0, 0, p.a11);
    m.set(1, 1, p.a22);
    if inverse_depth {
        m.set(2, 2, 0.0);
        m.set(2, 3, znear);
    } else {
        m.set(2, 2, 1.0);
        m.set(2, 3, -2.0 * znear);
    }
    m.set(3, 2, 1.0);
    m.set(3, 3, 0.0);
    Ok(m)
}

/// Creates a perspective projection with a finite far plane.
///
/// Depth maps from -1 at the near plane to 1 at the far plane. Used where a
/// bounded depth range is required, such as shadow and culling volumes.
pub fn create_frustum_matrix(
    width: u32,
    height: u32,
    fov: f64,
    fov_ratio: f64,
    znear: f64,
    zfar: f64,
) -> Result<DMat4, RenderError> {
    let p = perspective(width, height, fov, fov_ratio, znear)?;
    if !(znear < zfar) {
        return Err(RenderError::invalid_parameter(format!("near plane {znear} must be before far plane {zfar}")));
    }

    let mut m = DMat4::ZERO;
    m.set(0, 0, p.a11);
    m.set(1, 1, p.a22);
    m.set(2, 2, (zfar + znear) / (zfar - znear));
    m.set(2, 3, -2.0 * zfar * znear / (zfar - znear));
    m.set(3, 2, 1.0);
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ndc_depth(m: &DMat4, z: f64) -> f64 {
        let clip = m.transform_point(0.0, 0.0, z);
        clip[2] / clip[3]
    }

    #[test]
    fn inverse_projection_maps_near_to_one() {
        let m = create_projection_matrix(1920, 1080, PI / 2.0, 1.0, 0.1, 100.0, true).unwrap();

        assert_relative_eq!(ndc_depth(&m, 0.1), 1.0, epsilon = 1e-12);
        assert_relative_eq!(ndc_depth(&m, 1.0), 0.1, epsilon = 1e-12);
        assert!(ndc_depth(&m, 1.0e9) < 1.0e-9);
    }

    #[test]
    fn regular_projection_maps_near_to_minus_one() {
        let m = create_projection_matrix(1920, 1080, PI / 2.0, 1.0, 0.1, 100.0, false).unwrap();

        assert_relative_eq!(ndc_depth(&m, 0.1), -1.0, epsilon = 1e-12);
        assert!(ndc_depth(&m, 1.0e9) > 0.999_999);
    }

    #[test]
    fn projection_scales_by_field_of_view_and_aspect() {
        let m = create_projection_matrix(200, 100, PI / 2.0, 0.5, 0.1, 10.0, false).unwrap();

        assert_relative_eq!(m.get(0, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.get(1, 1), 2.0 / (PI / 8.0).tan(), epsilon = 1e-12);
        assert_eq!(m.get(3, 2), 1.0);
        assert_eq!(m.get(3, 3), 0.0);
    }

    #[test]
    fn frustum_maps_planes_to_unit_range() {
        let m = create_frustum_matrix(800, 600, PI / 3.0, 1.0, 0.5, 50.0).unwrap();

        assert_relative_eq!(ndc_depth(&m, 0.5), -1.0, epsilon = 1e-12);
        assert_relative_eq!(ndc_depth(&m, 50.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(create_projection_matrix(0, 10, 1.0, 1.0, 0.1, 10.0, true).is_err());
        assert!(create_projection_matrix(10, 10, PI, 1.0, 0.1, 10.0, true).is_err());
        assert!(create_projection_matrix(10, 10, 1.0, 0.0, 0.1, 10.0, true).is_err());
        assert!(create_projection_matrix(10, 10, 1.0, 1.0, 0.0, 10.0, true).is_err());
        assert!(create_projection_matrix(10, 10, 1.0, 1.0, 10.0, 10.0, true).is_err());
        assert!(create_frustum_matrix(10, 10, 1.0, 1.0, 5.0, 1.0).is_err());
    }

    #[test]
    fn depth_convention_follows_capabilities() {
        assert!(DepthConvention::select(true, true, false).inverse);
        assert!(!DepthConvention::select(true, false, false).inverse);
        assert!(!DepthConvention::select(true, true, true).inverse);

        let inverse = DepthConvention::new(true);
        assert_eq!(inverse.compare_regular, DepthCompare::GreaterEqual);
        assert_eq!(inverse.clear_regular, 0.0);
        assert!(inverse.use_fade_out_range());

        let regular = DepthConvention::default();
        assert_eq!(regular.compare_regular, DepthCompare::LessEqual);
        assert_eq!(regular.clear_regular, 1.0);
        assert_eq!(regular.clear_reversed, 0.0);
    }
}
