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

//! Loading [`RenderSettings`] from RON text.

use defren_core::renderer::RenderSettings;
use thiserror::Error;

/// Why settings could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The text is not valid RON for the settings.
    #[error("Failed to parse render settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A value is outside its valid range.
    #[error("Invalid render settings: {0}")]
    Invalid(String),
}

/// Parses and validates render settings. Missing fields take their defaults.
pub fn load_settings(text: &str) -> Result<RenderSettings, ConfigError> {
    let settings: RenderSettings = ron::from_str(text)?;
    validate(&settings)?;
    log::debug!("Config: loaded {settings:?}");
    Ok(settings)
}

fn validate(settings: &RenderSettings) -> Result<(), ConfigError> {
    let field = &settings.ray_trace_field;
    let checks = [
        (settings.render_down_scale >= 1, "render_down_scale must be at least 1"),
        (field.rays_per_probe >= 1, "ray_trace_field.rays_per_probe must be at least 1"),
        (field.probes_per_line >= 1, "ray_trace_field.probes_per_line must be at least 1"),
        (field.tile_size >= 1, "ray_trace_field.tile_size must be at least 1"),
        (field.probe_spacing > 0.0, "ray_trace_field.probe_spacing must be positive"),
    ];
    match checks.iter().find(|(ok, _)| !ok) {
        Some((_, message)) => Err(ConfigError::Invalid((*message).to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defren_core::renderer::DepthMinMaxStrategy;

    #[test]
    fn empty_struct_gives_defaults() {
        let settings = load_settings("()").unwrap();
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn fields_override_defaults() {
        let settings = load_settings(
            "(use_inverse_depth: false, size_limit: 1024, depth_min_max: Some(DoubledWidth), \
             ray_trace_field: (probe_spacing: 2.5))",
        )
        .unwrap();

        assert!(!settings.use_inverse_depth);
        assert_eq!(settings.size_limit, 1024);
        assert_eq!(settings.depth_min_max, Some(DepthMinMaxStrategy::DoubledWidth));
        assert_eq!(settings.ray_trace_field.probe_spacing, 2.5);
        assert_eq!(settings.ray_trace_field.rays_per_probe, 64);
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(load_settings("(size_limit: )"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load_settings("(render_down_scale: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("render_down_scale")));

        let err = load_settings("(ray_trace_field: (probe_spacing: 0.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
