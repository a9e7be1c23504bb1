//! App Registry
//!
//! One ordered, fixed catalog keyed by stable names. Slot 0 is reserved for
//! the home menu and carries no descriptor; slots 1.. hold native apps in
//! menu order. Names that are not native resolve at launch time to a script
//! module stored under `/apps` (flash) or `/sd/apps` (SD card).

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use rosebox_storage::{path, AssetStore};

use super::error::AppError;
use super::Application;
use crate::apps::{browser::AppBrowser, clock::Clock, settings::Settings};
use crate::config::DeviceConfig;
use crate::terminal::Terminal;

/// Reserved slot meaning "no application".
pub const HOME_SLOT: usize = 0;

/// Script module directories, searched in order.
pub const SCRIPT_DIRS: [&str; 2] = ["/apps", "/sd/apps"];

/// File extension of script modules.
pub const SCRIPT_EXT: &str = ".lua";

/// Builds a fresh instance of a native app.
pub type AppFactory = fn(&DeviceConfig) -> Box<dyn Application>;

/// Native app compiled into the firmware.
#[derive(Clone, Copy)]
pub struct NativeApp {
    pub name: &'static str,
    pub factory: AppFactory,
}

impl fmt::Debug for NativeApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeApp").field("name", &self.name).finish()
    }
}

/// Script module located in the asset store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    pub name: String,
    pub path: String,
}

/// Result of resolving a name.
#[derive(Debug, Clone)]
pub enum ApplicationDescriptor {
    Native(NativeApp),
    Scripted(ScriptRef),
}

impl ApplicationDescriptor {
    pub fn name(&self) -> &str {
        match self {
            ApplicationDescriptor::Native(app) => app.name,
            ApplicationDescriptor::Scripted(script) => &script.name,
        }
    }
}

/// Catalog of launchable applications.
#[derive(Debug, Clone)]
pub struct Registry {
    /// `slots[HOME_SLOT]` is always `None`.
    slots: Vec<Option<NativeApp>>,
}

impl Registry {
    /// Registry holding only the home slot.
    pub fn empty() -> Self {
        Self { slots: vec![None] }
    }

    /// The stock catalog: home, terminal, clock, settings, apps.
    pub fn builtin() -> Self {
        Self {
            slots: vec![
                None,
                Some(NativeApp { name: "terminal", factory: make_terminal }),
                Some(NativeApp { name: "clock", factory: make_clock }),
                Some(NativeApp { name: "settings", factory: make_settings }),
                Some(NativeApp { name: "apps", factory: make_browser }),
            ],
        }
    }

    /// Append a native app to the next slot. Returns its slot index.
    pub fn register(&mut self, app: NativeApp) -> Result<usize, AppError> {
        if self.find_native(app.name).is_some() {
            return Err(AppError::AlreadyRegistered(String::from(app.name)));
        }
        self.slots.push(Some(app));
        Ok(self.slots.len() - 1)
    }

    /// Number of slots, home included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Native app at `index`. `None` for the home slot and out-of-range indices.
    pub fn slot(&self, index: usize) -> Option<&NativeApp> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Home menu entries, in slot order.
    pub fn menu(&self) -> Vec<&'static str> {
        self.slots.iter().flatten().map(|app| app.name).collect()
    }

    pub fn menu_len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn find_native(&self, name: &str) -> Option<&NativeApp> {
        self.slots.iter().flatten().find(|app| app.name == name)
    }

    /// Resolve a name to a descriptor: native apps first, then script
    /// modules on flash, then on SD. A full module path such as
    /// `/sd/apps/snake.lua` selects that copy directly.
    pub fn resolve(&self, name: &str, store: &dyn AssetStore) -> Result<ApplicationDescriptor, AppError> {
        if let Some(app) = self.find_native(name) {
            return Ok(ApplicationDescriptor::Native(*app));
        }

        if let Some(script) = script_at(name, store) {
            return Ok(ApplicationDescriptor::Scripted(script));
        }

        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            return Err(AppError::NotFound(String::from(name)));
        }

        let file = alloc::format!("{}{}", name, SCRIPT_EXT);
        SCRIPT_DIRS
            .iter()
            .map(|dir| path::join(dir, &file))
            .find(|p| store.exists(p))
            .map(|p| {
                ApplicationDescriptor::Scripted(ScriptRef {
                    name: String::from(name),
                    path: p,
                })
            })
            .ok_or_else(|| AppError::NotFound(String::from(name)))
    }
}

/// Script module addressed by its path inside one of [`SCRIPT_DIRS`].
fn script_at(module_path: &str, store: &dyn AssetStore) -> Option<ScriptRef> {
    let (dir, file) = module_path.rsplit_once('/')?;
    if !SCRIPT_DIRS.contains(&dir) {
        return None;
    }
    let stem = file
        .strip_suffix(SCRIPT_EXT)
        .filter(|stem| !stem.is_empty() && !stem.starts_with('.'))?;
    if !store.exists(module_path) {
        return None;
    }
    Some(ScriptRef {
        name: String::from(stem),
        path: String::from(module_path),
    })
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn make_terminal(config: &DeviceConfig) -> Box<dyn Application> {
    Box::new(Terminal::new(&config.terminal_host))
}

fn make_clock(_config: &DeviceConfig) -> Box<dyn Application> {
    Box::new(Clock::new())
}

fn make_settings(_config: &DeviceConfig) -> Box<dyn Application> {
    Box::new(Settings::new())
}

fn make_browser(_config: &DeviceConfig) -> Box<dyn Application> {
    Box::new(AppBrowser::new())
}
