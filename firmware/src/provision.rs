//! First-boot provisioning.
//!
//! Seeds the asset store with the default configuration, bootstrap scripts,
//! HAL modules and application modules compiled into the image. Runs once
//! at boot before anything else touches the store. The presence of
//! [`SENTINEL_PATH`] marks a provisioned device, which is never written to.

use rosebox_storage::AssetStore;

use crate::config::SENTINEL_PATH;

/// A default file compiled into the firmware image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedAsset {
    pub path: &'static str,
    pub contents: &'static str,
}

macro_rules! asset {
    ($path:literal, $file:literal) => {
        ProvisionedAsset {
            path: $path,
            contents: include_str!(concat!("../assets/", $file)),
        }
    };
}

/// Default asset set. The sentinel comes first.
pub static DEFAULT_ASSETS: &[ProvisionedAsset] = &[
    // Configuration
    asset!("/config.lua", "config.lua"),
    // Bootstrap entry points
    asset!("/bootstrap.lua", "bootstrap.lua"),
    asset!("/bootstrap_core.lua", "bootstrap_core.lua"),
    asset!("/main.lua", "main.lua"),
    // Hardware abstraction modules
    asset!("/hal/screen.lua", "hal/screen.lua"),
    asset!("/hal/keyboard.lua", "hal/keyboard.lua"),
    asset!("/hal/gpio.lua", "hal/gpio.lua"),
    asset!("/hal/storage.lua", "hal/storage.lua"),
    asset!("/hal/wifi.lua", "hal/wifi.lua"),
    asset!("/hal/display.lua", "hal/display.lua"),
    // Application modules
    asset!("/apps/launcher.lua", "apps/launcher.lua"),
    asset!("/apps/clock.lua", "apps/clock.lua"),
    asset!("/apps/settings.lua", "apps/settings.lua"),
    asset!("/apps/apps.lua", "apps/apps.lua"),
    asset!("/apps/terminal.lua", "apps/terminal.lua"),
];

/// Provision [`DEFAULT_ASSETS`]. Returns whether anything was written.
pub fn provision_defaults(store: &mut dyn AssetStore) -> bool {
    provision(store, DEFAULT_ASSETS)
}

/// Write every asset in `assets` that does not exist yet, unless the
/// sentinel is already present. A failed write is logged and skipped.
pub fn provision(store: &mut dyn AssetStore, assets: &[ProvisionedAsset]) -> bool {
    if store.exists(SENTINEL_PATH) {
        log::debug!("[RoseBox/Provision] {} present, skipping", SENTINEL_PATH);
        return false;
    }

    let mut wrote_any = false;
    let mut written = 0usize;
    for asset in assets {
        if store.exists(asset.path) {
            continue;
        }
        match store.write(asset.path, asset.contents.as_bytes()) {
            Ok(()) => {
                log::debug!("[RoseBox/Provision] wrote {}", asset.path);
                wrote_any = true;
                written += 1;
            }
            Err(e) => {
                log::warn!("[RoseBox/Provision] {}: {}, skipped", asset.path, e);
            }
        }
    }

    log::info!("[RoseBox/Provision] {} of {} assets written", written, assets.len());
    wrote_any
}
