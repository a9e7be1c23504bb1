//! Firmware Scenario Tests
//!
//! End-to-end behaviour of the session manager, terminal, provisioning and
//! boot path against the host doubles in `hal::mock`.


use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use std::collections::VecDeque;

use rosebox_storage::MemStore;

use crate::app::{AppContext, Application, NativeApp, Registry, Session, Signal};
use crate::config::DeviceConfig;
use crate::hal::mock::{self, MockScripts, Rig, ScriptProbe};
use crate::hal::{Canvas, KeyToken};

std::thread_local! {
    /// `name:hook` per lifecycle call of a probe app on this test thread.
    static EVENTS: RefCell<Vec<String>> = RefCell::new(Vec::new());
    /// Signals returned by successive probe `update` calls.
    static SIGNALS: RefCell<VecDeque<Signal>> = RefCell::new(VecDeque::new());
}

pub(crate) fn events() -> Vec<String> {
    EVENTS.with(|e| e.borrow().clone())
}

pub(crate) fn clear_events() {
    EVENTS.with(|e| e.borrow_mut().clear());
}

/// Queue the signal returned by the next probe `update`.
pub(crate) fn next_signal(signal: Signal) {
    SIGNALS.with(|s| s.borrow_mut().push_back(signal));
}

/// Native app that records its lifecycle and owns a redraw callback.
pub(crate) struct Probe {
    name: &'static str,
}

impl Application for Probe {
    fn start(&mut self, ctx: &mut AppContext<'_>) {
        EVENTS.with(|e| e.borrow_mut().push(alloc::format!("{}:start", self.name)));
        ctx.register_redraw(Box::new(|canvas: &mut dyn Canvas| {
            canvas.draw_text(0, 0, "probe");
        }));
    }

    fn update(&mut self, _ctx: &mut AppContext<'_>, _key: Option<KeyToken>) -> Signal {
        EVENTS.with(|e| e.borrow_mut().push(alloc::format!("{}:update", self.name)));
        SIGNALS
            .with(|s| s.borrow_mut().pop_front())
            .unwrap_or(Signal::Continue)
    }

    fn on_exit(&mut self, _ctx: &mut AppContext<'_>) {
        EVENTS.with(|e| e.borrow_mut().push(alloc::format!("{}:on_exit", self.name)));
    }
}

fn make_alpha(_: &DeviceConfig) -> Box<dyn Application> {
    Box::new(Probe { name: "alpha" })
}

fn make_beta(_: &DeviceConfig) -> Box<dyn Application> {
    Box::new(Probe { name: "beta" })
}

/// Registry with two probe apps, `alpha` (slot 1) and `beta` (slot 2).
pub(crate) fn probe_registry() -> Registry {
    let mut reg = Registry::empty();
    reg.register(NativeApp { name: "alpha", factory: make_alpha }).unwrap();
    reg.register(NativeApp { name: "beta", factory: make_beta }).unwrap();
    reg
}

pub(crate) struct Bench {
    pub session: Session,
    pub rig: Rig,
    pub scripts: ScriptProbe,
}

impl Bench {
    pub fn new(registry: Registry, config: DeviceConfig, store: MemStore) -> Self {
        clear_events();
        SIGNALS.with(|s| s.borrow_mut().clear());
        let (periph, rig) = mock::peripherals(store);
        let (scripts, probe) = MockScripts::new();
        let mut session = Session::new(registry, config, periph, Box::new(scripts));
        session.show_home();
        Self {
            session,
            rig,
            scripts: probe,
        }
    }

    pub fn builtin() -> Self {
        Self::new(Registry::builtin(), DeviceConfig::default(), MemStore::new())
    }

    pub fn probes() -> Self {
        Self::new(probe_registry(), DeviceConfig::default(), MemStore::new())
    }

    /// Queue `key` and run one tick.
    pub fn press(&mut self, key: KeyToken) {
        self.rig.keys.push(key);
        self.session.tick();
    }

    pub fn shorts(&mut self, n: usize) {
        for _ in 0..n {
            self.press(KeyToken::Short);
        }
    }

    /// Whether the last pushed frame is the home menu.
    pub fn home_visible(&self) -> bool {
        self.rig
            .display
            .last_texts()
            .first()
            .map(|t| t == "RoseBox")
            .unwrap_or(false)
    }
}
