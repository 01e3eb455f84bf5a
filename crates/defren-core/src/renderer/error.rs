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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::FramebufferStatus;
use std::fmt;

/// A device call on a texture or framebuffer handle failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No live resource has the given handle.
    NotFound,
    /// The handle names a resource of the wrong kind or was never issued.
    InvalidHandle,
    /// A size, level, layer or index was outside its valid range.
    InvalidParameter(String),
    /// The resource is in a state that forbids the call.
    InvalidAction(String),
    /// The backend could not allocate the resource.
    OutOfMemory(String),
    /// The backend reported a failure of its own.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "No live resource with this handle."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle."),
            ResourceError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            ResourceError::InvalidAction(msg) => write!(f, "Invalid action: {msg}"),
            ResourceError::OutOfMemory(msg) => write!(f, "Out of GPU memory: {msg}"),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error raised by the render thread.
///
/// Every variant aborts the frame being rendered. Incomplete framebuffers and
/// invalid sizes point at programming errors, not at conditions to recover from.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A size, level or index was outside its valid range.
    InvalidParameter(String),
    /// A framebuffer failed the backend's completeness check.
    IncompleteFramebuffer {
        /// The debug label of the framebuffer.
        label: String,
        /// The status reported by the backend.
        status: FramebufferStatus,
    },
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// An operation was attempted before the rendering system was initialized.
    NotInitialized,
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl RenderError {
    /// Shorthand for [`RenderError::InvalidParameter`].
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        RenderError::InvalidParameter(msg.into())
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            RenderError::IncompleteFramebuffer { label, status } => {
                write!(f, "Framebuffer '{label}' is incomplete: {status}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::NotInitialized => {
                write!(f, "The rendering system is not initialized.")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}
