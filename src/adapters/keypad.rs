//! Key queue between the key scanner and the foreground.
//!
//! The scanner (a matrix-scan task, or the console reader on boards
//! driven over serial) pushes debounced key legends; the machines pull
//! them through [`Keypad`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use crate::app::ports::{Key, Keypad};

/// Key presses buffered ahead of the foreground.
pub const KEY_QUEUE_DEPTH: usize = 8;

pub struct KeyQueue {
    channel: Channel<CriticalSectionRawMutex, Key, KEY_QUEUE_DEPTH>,
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Scanner side: queue the key with legend `c`.  Unknown legends and
    /// presses beyond the queue depth are dropped.
    pub fn on_char(&self, c: char) -> bool {
        let Some(key) = Key::from_char(c.to_ascii_uppercase()) else {
            debug!("KEYPAD: ignoring {:?}", c);
            return false;
        };
        if self.channel.try_send(key).is_err() {
            warn!("KEYPAD: queue full, dropped {:?}", key);
            return false;
        }
        true
    }
}

impl Keypad for &KeyQueue {
    fn poll_key(&mut self) -> Option<Key> {
        self.channel.try_receive().ok()
    }
}
