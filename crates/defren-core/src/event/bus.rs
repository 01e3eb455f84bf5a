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

/// Manages a generic, thread-safe channel between the main thread and the
/// render thread.
///
/// The bus is generic over the message type `T` so `defren-core` stays free of
/// the request types defined by higher-level crates.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a new EventBus with an unbounded channel.
    ///
    /// ## Returns
    /// A new instance of the EventBus struct.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus initialized.");
        Self { sender, receiver }
    }

    /// Attempts to send a message, logging an error if the receiver is disconnected.
    ///
    /// ## Arguments
    /// * `message` - The message to be sent over the channel.
    pub fn publish(&self, message: T) {
        log::trace!("Publishing a message.");

        if let Err(e) = self.sender.send(message) {
            log::error!("Failed to send message: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel.
    ///
    /// ## Returns
    /// A clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a reference to the receiver end of the channel.
    /// Intended for the owner of the bus to drain pending messages.
    ///
    /// ## Returns
    /// A reference to the receiver end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Removes every message currently queued without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;
    use std::{thread, time::Duration};

    #[derive(Debug, Clone, PartialEq)]
    enum TestMessage {
        Resize { width: u32, height: u32 },
        Command(String),
    }

    #[test]
    fn try_receive_empty() {
        let bus = EventBus::<TestMessage>::new();
        assert_eq!(bus.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn drain_keeps_order() {
        let bus = EventBus::<TestMessage>::new();
        bus.publish(TestMessage::Resize {
            width: 4,
            height: 2,
        });
        bus.publish(TestMessage::Command("help".to_string()));

        let drained = bus.drain();
        assert_eq!(
            drained,
            vec![
                TestMessage::Resize {
                    width: 4,
                    height: 2
                },
                TestMessage::Command("help".to_string()),
            ]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn send_from_thread() {
        let bus = EventBus::<TestMessage>::new();
        let sender = bus.sender();

        let handle = thread::spawn(move || {
            sender
                .send(TestMessage::Command("fboInfos".to_string()))
                .expect("Send from thread failed");
        });

        let received = bus
            .receiver()
            .recv_timeout(Duration::from_millis(500))
            .expect("Failed to receive message from thread");
        assert_eq!(received, TestMessage::Command("fboInfos".to_string()));
        handle.join().expect("Sender thread panicked");
    }
}
