//! Keyboard input contract.
//!
//! The matrix scanner debounces and classifies presses on the board side and
//! hands the firmware one discrete token per poll.

use crate::config::KEY_WAIT_POLL_MS;

/// Debounced key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyToken {
    /// Short press.
    Short,
    /// Long press on the enter key.
    LongEnter,
    /// Enter held for five seconds or more.
    LongEnter5Sec,
}

impl KeyToken {
    /// Name used by the scripting runtime.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyToken::Short => "SHORT",
            KeyToken::LongEnter => "LONG_ENTER",
            KeyToken::LongEnter5Sec => "LONG_ENTER_5SEC",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SHORT" => Some(KeyToken::Short),
            "LONG_ENTER" => Some(KeyToken::LongEnter),
            "LONG_ENTER_5SEC" => Some(KeyToken::LongEnter5Sec),
            _ => None,
        }
    }
}

/// Source of key tokens.
pub trait InputSource {
    /// Next pending token, or `None`. Never blocks.
    fn poll(&mut self) -> Option<KeyToken>;
}

/// Busy-wait provider.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Block until a key arrives.
///
/// Only for synchronous contexts outside the main loop (boot prompts,
/// diagnostics). Calling this from an application's `update` stalls redraw
/// callbacks and transport liveness checks for as long as no key is pressed.
pub fn wait_for_key(input: &mut dyn InputSource, delay: &mut dyn Delay) -> KeyToken {
    loop {
        if let Some(key) = input.poll() {
            return key;
        }
        delay.delay_ms(KEY_WAIT_POLL_MS);
    }
}
