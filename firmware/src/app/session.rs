//! Application Session Manager
//!
//! Owns the answer to "which application is in the foreground" and drives
//! its lifecycle from the cooperative main loop:
//!
//! ```text
//! Home ──long press──▶ Active ──Exit──▶ Home
//!                        │
//!                        └──Launch(name)──▶ Active(name)
//! ```
//!
//! Every exit path goes through [`Session::teardown`], which runs the app's
//! `on_exit`, releases its redraw callback and script module, and drops the
//! instance so the next launch starts clean. `on_exit` of a departing app
//! always completes before `start` of the arriving one.

use alloc::boxed::Box;
use alloc::string::String;

use super::error::AppError;
use super::home;
use super::registry::{ApplicationDescriptor, Registry, HOME_SLOT};
use super::script::{ScriptHost, ScriptInstance};
use super::{AppContext, Application, Resources, Signal};
use crate::config::DeviceConfig;
use crate::hal::{KeyToken, Peripherals};

/// The live instance of the foreground application.
pub struct ApplicationHandle {
    name: String,
    app: Box<dyn Application>,
    resources: Resources,
}

impl ApplicationHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the app currently owns the display's redraw callback.
    pub fn holds_redraw(&self) -> bool {
        self.resources.redraw_registered
    }
}

/// Which app is active, and the home menu cursor.
///
/// `active == None` means the home menu is the visible surface.
#[derive(Default)]
pub struct SessionState {
    active: Option<ApplicationHandle>,
    selected_index: usize,
}

impl SessionState {
    pub fn is_home(&self) -> bool {
        self.active.is_none()
    }

    pub fn active(&self) -> Option<&ApplicationHandle> {
        self.active.as_ref()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }
}

/// The session manager.
pub struct Session {
    registry: Registry,
    config: DeviceConfig,
    periph: Peripherals,
    scripts: Box<dyn ScriptHost>,
    state: SessionState,
}

impl Session {
    /// Create a session in `Home` with the cursor on the first entry.
    /// Nothing is drawn until [`Session::show_home`].
    pub fn new(
        registry: Registry,
        config: DeviceConfig,
        periph: Peripherals,
        scripts: Box<dyn ScriptHost>,
    ) -> Self {
        Self {
            registry,
            config,
            periph,
            scripts,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn peripherals(&self) -> &Peripherals {
        &self.periph
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals {
        &mut self.periph
    }

    pub fn is_home(&self) -> bool {
        self.state.is_home()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.state.active.as_ref().map(|h| h.name())
    }

    /// Move the home cursor. Wraps modulo the menu length.
    pub fn set_selected_index(&mut self, index: usize) {
        let len = self.registry.menu_len();
        self.state.selected_index = if len == 0 { 0 } else { index % len };
    }

    /// Redraw the home menu.
    pub fn show_home(&mut self) {
        let menu = self.registry.menu();
        home::render(&mut *self.periph.display, &menu, self.state.selected_index);
    }

    /// One main-loop iteration: poll at most one key and route it to the
    /// active app or the home menu.
    pub fn tick(&mut self) {
        let key = self.periph.input.poll();
        if self.state.active.is_some() {
            self.tick_active(key);
        } else {
            self.tick_home(key);
        }
    }

    /// Forward a partial-refresh tick to the display.
    pub fn refresh_tick(&mut self) {
        self.periph.display.refresh_tick();
    }

    fn tick_home(&mut self, key: Option<KeyToken>) {
        match key {
            Some(KeyToken::Short) => {
                let len = self.registry.menu_len();
                if len == 0 {
                    return;
                }
                self.state.selected_index = (self.state.selected_index + 1) % len;
                self.show_home();
            }
            Some(KeyToken::LongEnter) => {
                let target = self.registry.menu().get(self.state.selected_index).copied();
                if let Some(name) = target {
                    // Failure already logged and home redrawn.
                    let _ = self.launch(name);
                }
            }
            // Already home.
            Some(KeyToken::LongEnter5Sec) | None => {}
        }
    }

    fn tick_active(&mut self, key: Option<KeyToken>) {
        let signal = match self.state.active.as_mut() {
            Some(handle) => {
                let mut ctx = AppContext::new(&mut self.periph, &mut handle.resources);
                handle.app.update(&mut ctx, key)
            }
            None => return,
        };

        match signal {
            Signal::Continue => {}
            Signal::Exit => self.exit_to_home(),
            Signal::Launch(name) => {
                self.teardown();
                let _ = self.launch(&name);
            }
        }
    }

    /// Start the named application, preempting the active one if any.
    ///
    /// On failure the session is left in `Home` with the menu redrawn.
    pub fn launch(&mut self, name: &str) -> Result<(), AppError> {
        if self.state.active.is_some() {
            self.teardown();
        }

        let descriptor = match self.registry.resolve(name, &*self.periph.store) {
            Ok(d) => d,
            Err(e) => return self.launch_failed(e),
        };

        let mut resources = Resources::default();
        let app: Box<dyn Application> = match &descriptor {
            ApplicationDescriptor::Native(native) => (native.factory)(&self.config),
            ApplicationDescriptor::Scripted(script) => {
                match ScriptInstance::load(&mut *self.scripts, script, &*self.periph.store) {
                    Ok(instance) => {
                        resources.script_module = Some(script.name.clone());
                        Box::new(instance)
                    }
                    Err(e) => return self.launch_failed(e),
                }
            }
        };

        // Home no longer owns the surface.
        self.periph.display.unregister_redraw_callback();

        let mut handle = ApplicationHandle {
            name: String::from(descriptor.name()),
            app,
            resources,
        };
        {
            let mut ctx = AppContext::new(&mut self.periph, &mut handle.resources);
            handle.app.start(&mut ctx);
        }

        log::info!("[RoseBox/Session] launched '{}'", handle.name);
        self.state.active = Some(handle);
        Ok(())
    }

    /// Legacy slot launcher: `0` returns home, `1..` launches that slot.
    pub fn launch_slot(&mut self, index: usize) -> Result<(), AppError> {
        if index == HOME_SLOT {
            self.exit_to_home();
            return Ok(());
        }
        let name = self
            .registry
            .slot(index)
            .map(|app| app.name)
            .ok_or(AppError::InvalidSlot(index))?;
        self.launch(name)
    }

    /// Tear down the active app (if any) and show the home menu.
    pub fn exit_to_home(&mut self) {
        self.teardown();
        self.show_home();
    }

    fn launch_failed(&mut self, err: AppError) -> Result<(), AppError> {
        log::warn!("[RoseBox/Session] launch failed: {}", err);
        self.show_home();
        Err(err)
    }

    /// Run `on_exit`, release everything the handle acquired, drop it.
    fn teardown(&mut self) {
        let mut handle = match self.state.active.take() {
            Some(h) => h,
            None => return,
        };

        {
            let mut ctx = AppContext::new(&mut self.periph, &mut handle.resources);
            handle.app.on_exit(&mut ctx);
        }

        // Apps can also register straight on `ctx.display`.
        if handle.resources.redraw_registered || self.periph.display.has_redraw_callback() {
            self.periph.display.unregister_redraw_callback();
            handle.resources.redraw_registered = false;
        }
        if let Some(module) = handle.resources.script_module.take() {
            self.scripts.unload(&module);
        }

        log::info!("[RoseBox/Session] closed '{}'", handle.name);
    }
}
