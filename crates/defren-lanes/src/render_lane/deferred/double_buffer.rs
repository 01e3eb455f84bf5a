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

/// Two interchangeable slots with one of them designated "current".
///
/// Swapping only flips which slot is current; nothing is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleBuffer<T: Copy> {
    slots: [T; 2],
    swapped: bool,
}

impl<T: Copy> DoubleBuffer<T> {
    /// Creates a double buffer with `first` current.
    pub const fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            swapped: false,
        }
    }

    /// The current slot.
    pub fn current(&self) -> T {
        self.slots[self.swapped as usize]
    }

    /// The other slot.
    pub fn previous(&self) -> T {
        self.slots[!self.swapped as usize]
    }

    /// Exchanges the roles of the slots.
    pub fn swap(&mut self) {
        self.swapped = !self.swapped;
    }

    /// Makes the first slot current again.
    pub fn reset(&mut self) {
        self.swapped = false;
    }

    /// Returns `true` while the second slot is current.
    pub fn is_swapped(&self) -> bool {
        self.swapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_and_reset() {
        let mut buffer = DoubleBuffer::new('a', 'b');
        assert_eq!((buffer.current(), buffer.previous()), ('a', 'b'));

        buffer.swap();
        assert_eq!((buffer.current(), buffer.previous()), ('b', 'a'));
        assert!(buffer.is_swapped());

        buffer.swap();
        buffer.swap();
        buffer.reset();
        assert_eq!(buffer.current(), 'a');
    }
}
