//! Scripting runtime bridge.
//!
//! Script modules are loaded by an external interpreter hosted by the board.
//! The firmware asks the host for a module, checks its capability set once,
//! and from then on drives it like any native application. Unloading the
//! module on teardown drops the interpreter's cached copy so the next launch
//! starts from a clean instance.

use alloc::boxed::Box;
use alloc::string::String;

use bitflags::bitflags;
use core::fmt;

use rosebox_storage::AssetStore;

use super::error::AppError;
use super::registry::ScriptRef;
use super::{AppContext, Application, Signal};
use crate::hal::KeyToken;

bitflags! {
    /// Lifecycle hooks a script module exports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const START = 1 << 0;
        const UPDATE = 1 << 1;
        const ON_EXIT = 1 << 2;
    }
}

impl Capabilities {
    /// Hooks every launchable module must export.
    pub const REQUIRED: Capabilities = Capabilities::START.union(Capabilities::UPDATE);

    /// Name of the first missing mandatory hook.
    pub fn first_missing(&self) -> Option<&'static str> {
        if !self.contains(Capabilities::START) {
            Some("start")
        } else if !self.contains(Capabilities::UPDATE) {
            Some("update")
        } else {
            None
        }
    }
}

/// Error raised by the scripting runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError(pub String);

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded script module.
pub trait ScriptModule {
    fn capabilities(&self) -> Capabilities;
    fn start(&mut self, ctx: &mut AppContext<'_>) -> Result<(), ScriptError>;
    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Result<Signal, ScriptError>;
    fn on_exit(&mut self, ctx: &mut AppContext<'_>) -> Result<(), ScriptError>;
}

/// The interpreter that hosts script modules.
pub trait ScriptHost {
    /// Compile `source` and return a fresh module instance.
    fn load(&mut self, name: &str, source: &[u8]) -> Result<Box<dyn ScriptModule>, ScriptError>;

    /// Forget any cached state for `name`.
    fn unload(&mut self, name: &str);
}

/// Host for boards built without an interpreter.
#[derive(Debug, Default)]
pub struct NoScriptHost;

impl ScriptHost for NoScriptHost {
    fn load(&mut self, name: &str, _source: &[u8]) -> Result<Box<dyn ScriptModule>, ScriptError> {
        Err(ScriptError(alloc::format!("no scripting runtime for '{}'", name)))
    }

    fn unload(&mut self, _name: &str) {}
}

/// A script module adapted to the [`Application`] contract.
pub struct ScriptInstance {
    name: String,
    module: Box<dyn ScriptModule>,
    caps: Capabilities,
    /// Set once a hook errors; the next update exits.
    failed: bool,
}

impl ScriptInstance {
    /// Read, load and capability-check the module behind `script`.
    pub fn load(
        host: &mut dyn ScriptHost,
        script: &ScriptRef,
        store: &dyn AssetStore,
    ) -> Result<Self, AppError> {
        let source = store
            .read(&script.path)
            .map_err(|e| AppError::ScriptFailed(alloc::format!("{}: {}", script.path, e)))?;

        let module = host
            .load(&script.name, &source)
            .map_err(|e| AppError::ScriptFailed(alloc::format!("{}: {}", script.name, e)))?;

        let caps = module.capabilities();
        if let Some(missing) = caps.first_missing() {
            host.unload(&script.name);
            return Err(AppError::MissingCapability {
                name: script.name.clone(),
                missing,
            });
        }

        Ok(Self {
            name: script.name.clone(),
            module,
            caps,
            failed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Application for ScriptInstance {
    fn start(&mut self, ctx: &mut AppContext<'_>) {
        if let Err(e) = self.module.start(ctx) {
            log::warn!("[RoseBox/Script] {}:start failed: {}", self.name, e);
            self.failed = true;
        }
    }

    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        if self.failed {
            return Signal::Exit;
        }
        match self.module.update(ctx, key) {
            Ok(signal) => signal,
            Err(e) => {
                log::warn!("[RoseBox/Script] {}:update failed: {}", self.name, e);
                self.failed = true;
                Signal::Exit
            }
        }
    }

    fn on_exit(&mut self, ctx: &mut AppContext<'_>) {
        if !self.caps.contains(Capabilities::ON_EXIT) {
            return;
        }
        if let Err(e) = self.module.on_exit(ctx) {
            log::warn!("[RoseBox/Script] {}:on_exit failed: {}", self.name, e);
        }
    }
}
