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

//! Logger setup for binaries and integration tests.

use env_logger::{Builder, Env};

/// Installs `env_logger` as the `log` backend.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. `wgpu` internals
/// are limited to errors. Calling it again is harmless, later calls keep the
/// first logger.
pub fn init_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .format_timestamp_millis()
        .try_init();
}

/// Like [`init_logging`] but captured by the test harness and at `debug` by default.
pub fn init_test_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .is_test(true)
        .try_init();
}
