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

//! A text command channel into the render thread for debugging.
//!
//! Replies are free-form text meant for a developer console and may change at
//! any time.

use crate::render_lane::FramebufferManager;
use defren_core::renderer::DeviceCapabilities;
use std::fmt::Write as _;
use thiserror::Error;

/// Why a console command was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The line held no command.
    #[error("No command given. Type 'help' for a list of commands.")]
    Empty,
    /// The command is not known.
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    UnknownCommand(String),
    /// An argument that should be an integer is not.
    #[error("Invalid integer '{0}'. Type 'help' for usage.")]
    BadInteger(String),
}

/// The render thread state a command may read or change.
#[derive(Debug)]
pub struct ConsoleContext<'a> {
    /// Capabilities of the device.
    pub capabilities: &'a DeviceCapabilities,
    /// The framebuffer pool.
    pub framebuffers: &'a FramebufferManager,
    /// The free debug switch.
    pub quick_debug: &'a mut i32,
}

const COMMANDS: &[(&str, &str)] = &[
    ("help", "Displays this help screen."),
    ("extensions", "Lists the extensions supported by the device."),
    ("fboInfos", "Lists the pooled framebuffers."),
    ("quickDebug [value]", "Displays or sets the quick debug value."),
];

/// Parses and runs console commands.
#[derive(Debug, Default, Clone)]
pub struct DebugConsole;

impl DebugConsole {
    /// Creates a console.
    pub fn new() -> Self {
        Self
    }

    /// Runs one command line and returns its reply.
    pub fn execute(&self, line: &str, ctx: ConsoleContext<'_>) -> Result<String, ConsoleError> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().ok_or(ConsoleError::Empty)?;
        let args: Vec<&str> = tokens.collect();
        log::debug!("Console: {command} {args:?}");

        match command {
            "help" => Ok(Self::help()),
            "extensions" => Ok(Self::extensions(ctx.capabilities)),
            "fboInfos" => Ok(ctx.framebuffers.debug_info()),
            "quickDebug" => Self::quick_debug(&args, ctx.quick_debug),
            other => Err(ConsoleError::UnknownCommand(other.to_string())),
        }
    }

    fn help() -> String {
        let mut out = String::from("Commands:\n");
        for (usage, description) in COMMANDS {
            let _ = writeln!(out, "  {usage}: {description}");
        }
        out
    }

    fn extensions(capabilities: &DeviceCapabilities) -> String {
        let mut out = format!("Extensions ({}):\n", capabilities.extensions.len());
        for extension in &capabilities.extensions {
            let _ = writeln!(out, "- {extension}");
        }
        out
    }

    fn quick_debug(args: &[&str], value: &mut i32) -> Result<String, ConsoleError> {
        if let Some(arg) = args.first() {
            *value = arg
                .parse()
                .map_err(|_| ConsoleError::BadInteger((*arg).to_string()))?;
        }
        Ok(format!("Quick Debug = {value}\n"))
    }
}
