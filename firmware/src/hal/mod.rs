//! Hardware abstraction contracts.
//!
//! The board support package implements these traits over the real screen
//! driver, keyboard matrix scanner and SoC; the firmware core only sees the
//! trait objects bundled in [`Peripherals`].

pub mod display;
pub mod input;
pub mod system;

#[cfg(test)]
pub mod mock;

use alloc::boxed::Box;

use rosebox_network::Network;
use rosebox_storage::AssetStore;

pub use display::{Canvas, Display, DisplayFlags, DisplaySettings, RedrawFn};
pub use input::{wait_for_key, Delay, InputSource, KeyToken};
pub use system::SystemInfo;

/// Every external collaborator the session manager drives.
pub struct Peripherals {
    pub display: Box<dyn Display>,
    pub input: Box<dyn InputSource>,
    pub store: Box<dyn AssetStore>,
    pub network: Box<dyn Network>,
    pub system: Box<dyn SystemInfo>,
}
