//! Display surface contract.
//!
//! The panel is a monochrome SPI e-paper/LCD driven by the board. The
//! firmware draws through [`Canvas`] primitives and pushes a frame with
//! [`Display::flush`]. A single redraw callback may be registered; the
//! surface invokes it on every flush and on partial-refresh ticks so the
//! owner can repaint without being polled.

use alloc::boxed::Box;
use alloc::vec::Vec;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use rosebox_storage::{AssetStore, StorageError};

use crate::config::DISPLAY_SETTINGS_PATH;

/// Drawing primitives. Coordinates are pixels from the top-left corner.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Draw text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str);

    /// Draw subsequent text in background colour (for highlighted rows).
    fn set_text_inverted(&mut self, inverted: bool);

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, fill: bool);
    fn draw_circle(&mut self, x: i32, y: i32, r: u32, fill: bool);
    fn draw_triangle(&mut self, points: [(i32, i32); 3], fill: bool);
}

/// Repaint hook owned by the display once registered.
pub type RedrawFn = Box<dyn FnMut(&mut dyn Canvas) + Send>;

/// Stateful display surface.
pub trait Display: Canvas {
    /// Clear the back buffer.
    fn clear(&mut self);

    /// Run the redraw callback (if any) and push the back buffer to the panel.
    fn flush(&mut self);

    /// Install the redraw callback, replacing any previous one.
    fn register_redraw_callback(&mut self, f: RedrawFn);

    /// Drop the redraw callback. No-op when none is registered.
    fn unregister_redraw_callback(&mut self);

    fn has_redraw_callback(&self) -> bool;

    /// Partial-refresh tick driven by the board timer.
    fn refresh_tick(&mut self);

    fn settings(&self) -> DisplaySettings;
    fn apply_settings(&mut self, settings: DisplaySettings);
}

bitflags! {
    /// Panel behaviour toggles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DisplayFlags: u8 {
        /// White text on black.
        const INVERTED = 1 << 0;
        /// Use partial refresh between full refreshes.
        const PARTIAL_REFRESH = 1 << 1;
    }
}

/// Minimum and maximum full-refresh passes per frame.
pub const REFRESH_COUNT_RANGE: (u8, u8) = (1, 3);

/// User-adjustable panel settings, persisted across power cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub flags: DisplayFlags,
    /// Full-refresh passes per frame (1..=3).
    pub refresh_count: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            flags: DisplayFlags::empty(),
            refresh_count: 1,
        }
    }
}

/// On-flash record.
#[derive(Serialize, Deserialize)]
struct StoredSettings {
    flags: u8,
    refresh_count: u8,
}

impl DisplaySettings {
    pub fn inverted(&self) -> bool {
        self.flags.contains(DisplayFlags::INVERTED)
    }

    pub fn partial_refresh(&self) -> bool {
        self.flags.contains(DisplayFlags::PARTIAL_REFRESH)
    }

    /// Next refresh count in the 1 → 2 → 3 → 1 cycle.
    pub fn next_refresh_count(&self) -> u8 {
        let (min, max) = REFRESH_COUNT_RANGE;
        if self.refresh_count >= max || self.refresh_count < min {
            min
        } else {
            self.refresh_count + 1
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let stored = StoredSettings {
            flags: self.flags.bits(),
            refresh_count: self.refresh_count,
        };
        postcard::to_allocvec(&stored).unwrap_or_default()
    }

    /// Decode a stored record. Unknown flag bits are dropped and an
    /// out-of-range refresh count is clamped.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let stored: StoredSettings = postcard::from_bytes(bytes).ok()?;
        let (min, max) = REFRESH_COUNT_RANGE;
        Some(Self {
            flags: DisplayFlags::from_bits_truncate(stored.flags),
            refresh_count: stored.refresh_count.clamp(min, max),
        })
    }

    /// Load persisted settings. `None` on first boot or a corrupt record.
    pub fn load(store: &dyn AssetStore) -> Option<Self> {
        let bytes = store.read(DISPLAY_SETTINGS_PATH).ok()?;
        let settings = Self::decode(&bytes);
        if settings.is_none() {
            log::warn!("[RoseBox/Display] corrupt settings record, using defaults");
        }
        settings
    }

    pub fn save(&self, store: &mut dyn AssetStore) -> Result<(), StorageError> {
        store.write(DISPLAY_SETTINGS_PATH, &self.encode())
    }
}
