//! RoseBox Firmware Core
//!
//! Everything above the board support package: first-boot provisioning,
//! device configuration, the application registry and session manager, the
//! terminal, and the built-in applications.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  terminal   clock   settings   app browser   │  applications
//! ├──────────────────────────────────────────────┤
//! │  Session ── Registry ── ScriptHost           │  app
//! ├──────────────────────────────────────────────┤
//! │  provision   config   logger                 │
//! ├──────────────────────────────────────────────┤
//! │  display  input  system │ AssetStore │ Network│  contracts
//! └──────────────────────────────────────────────┘
//!                        │
//!              board support package
//! ```
//!
//! # Boot
//!
//! [`Firmware::boot`] provisions the store, reads the configuration, applies
//! persisted display settings, requests WiFi, builds the registry and draws
//! the home menu. The board then calls [`Firmware::tick`] from its main
//! loop and [`Firmware::refresh_tick`] from its partial-refresh timer.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app;
pub mod apps;
pub mod config;
pub mod hal;
pub mod logger;
pub mod provision;
pub mod terminal;

#[cfg(test)]
mod tests;

use alloc::boxed::Box;

use app::{Registry, ScriptHost, Session};
use config::DeviceConfig;
use hal::{DisplaySettings, Peripherals};

/// The running firmware.
pub struct Firmware {
    session: Session,
}

impl Firmware {
    /// Bring the device up and show the home menu.
    pub fn boot(mut periph: Peripherals, scripts: Box<dyn ScriptHost>) -> Self {
        log::info!("[RoseBox] booting");

        if provision::provision_defaults(&mut *periph.store) {
            log::info!("[RoseBox] first boot: default assets installed");
        }

        let config = DeviceConfig::load(&*periph.store);
        logger::set_level(config.log_level());

        if let Some(settings) = DisplaySettings::load(&*periph.store) {
            periph.display.apply_settings(settings);
        }

        config.ensure_wifi(&mut *periph.network);

        let mut session = Session::new(Registry::builtin(), config, periph, scripts);
        session.show_home();
        log::info!("[RoseBox] ready");

        Self { session }
    }

    /// One main-loop iteration.
    pub fn tick(&mut self) {
        self.session.tick();
    }

    /// Partial-refresh timer hook.
    pub fn refresh_tick(&mut self) {
        self.session.refresh_tick();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
