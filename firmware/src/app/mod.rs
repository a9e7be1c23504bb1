//! Application Management
//!
//! - **Registry**: fixed catalog of native apps plus launch-time resolution of
//!   scripted modules.
//! - **Session**: which single application owns the foreground, and the
//!   start → update* → on_exit lifecycle around it.
//! - **Script**: bridge to the external scripting runtime.
//!
//! # Lifecycle
//!
//! ```text
//!            long press / Launch(name)
//!   Home ───────────────────────────────▶ Active
//!    ▲                                     │ update() → Continue
//!    │        Exit (on_exit, release)      │
//!    └─────────────────────────────────────┤
//!                                          │ Launch(other): on_exit, release,
//!                                          └──▶ start(other), no home frame
//! ```

pub mod error;
pub mod home;
pub mod registry;
pub mod script;
pub mod session;

use alloc::string::String;

use rosebox_network::Network;
use rosebox_storage::AssetStore;

use crate::hal::{Display, KeyToken, Peripherals, RedrawFn, SystemInfo};

pub use error::AppError;
pub use registry::{ApplicationDescriptor, NativeApp, Registry, ScriptRef};
pub use script::{Capabilities, NoScriptHost, ScriptError, ScriptHost, ScriptModule};
pub use session::{ApplicationHandle, Session, SessionState};

/// What an application asks the session manager to do after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Stay in the foreground.
    Continue,
    /// Tear down and return to the home menu.
    Exit,
    /// Tear down and start the named application without showing home.
    Launch(String),
}

/// A foreground application.
///
/// `start` and `update` are mandatory; `on_exit` defaults to nothing.
/// `update` runs once per main-loop iteration and must not block.
pub trait Application {
    fn start(&mut self, ctx: &mut AppContext<'_>);

    /// `key` is the token polled this tick, if any.
    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal;

    fn on_exit(&mut self, _ctx: &mut AppContext<'_>) {}
}

/// Resources an application acquired while active. Released by the session
/// manager on every exit path.
#[derive(Debug, Default)]
pub struct Resources {
    pub(crate) redraw_registered: bool,
    /// Scripting-runtime module to unload on teardown.
    pub(crate) script_module: Option<String>,
}

/// Collaborators lent to an application for one lifecycle call.
pub struct AppContext<'a> {
    pub display: &'a mut dyn Display,
    pub store: &'a mut dyn AssetStore,
    pub network: &'a mut dyn Network,
    pub system: &'a dyn SystemInfo,
    resources: &'a mut Resources,
}

impl<'a> AppContext<'a> {
    pub(crate) fn new(periph: &'a mut Peripherals, resources: &'a mut Resources) -> Self {
        Self {
            display: &mut *periph.display,
            store: &mut *periph.store,
            network: &mut *periph.network,
            system: &*periph.system,
            resources,
        }
    }

    /// Register a redraw callback owned by the running application.
    pub fn register_redraw(&mut self, f: RedrawFn) {
        self.display.register_redraw_callback(f);
        self.resources.redraw_registered = true;
    }

    pub fn unregister_redraw(&mut self) {
        self.display.unregister_redraw_callback();
        self.resources.redraw_registered = false;
    }
}
