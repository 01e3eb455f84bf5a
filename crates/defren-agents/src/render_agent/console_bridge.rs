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

//! The main-thread side of the debug console.

use std::time::Duration;
use thiserror::Error;

/// A console line waiting for the render thread, with the channel its reply
/// goes back on.
#[derive(Debug)]
pub struct ConsoleRequest {
    /// The command line as typed.
    pub line: String,
    /// Where the render thread sends the reply text.
    pub reply: flume::Sender<String>,
}

/// Why a console request got no reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleClientError {
    /// The render thread agent is gone.
    #[error("the render thread is not running")]
    Disconnected,
    /// No frame answered the request in time.
    #[error("no reply from the render thread within {0:?}")]
    Timeout(Duration),
}

/// Sends console lines to a [`RenderThreadAgent`](super::RenderThreadAgent).
///
/// Requests are answered at the end of the next frame, so a client must never
/// wait for a reply on the render thread itself.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    sender: flume::Sender<ConsoleRequest>,
}

impl ConsoleClient {
    pub(crate) fn new(sender: flume::Sender<ConsoleRequest>) -> Self {
        Self { sender }
    }

    /// Queues `line` and returns the channel its reply will arrive on.
    pub fn send(&self, line: impl Into<String>) -> Result<flume::Receiver<String>, ConsoleClientError> {
        let (reply, receiver) = flume::bounded(1);
        self.sender
            .send(ConsoleRequest {
                line: line.into(),
                reply,
            })
            .map_err(|_| ConsoleClientError::Disconnected)?;
        Ok(receiver)
    }

    /// Queues `line` and blocks until the render thread answers or `timeout`
    /// elapses.
    pub fn execute(&self, line: impl Into<String>, timeout: Duration) -> Result<String, ConsoleClientError> {
        let receiver = self.send(line)?;
        receiver.recv_timeout(timeout).map_err(|err| match err {
            flume::RecvTimeoutError::Timeout => ConsoleClientError::Timeout(timeout),
            flume::RecvTimeoutError::Disconnected => ConsoleClientError::Disconnected,
        })
    }
}
