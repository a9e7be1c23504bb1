//! Host doubles for the HAL, transport, storage and scripting contracts.
//!
//! Each double hands out a cloneable probe sharing its state, so a test can
//! move the double into [`Peripherals`] and still inspect or drive it.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use rosebox_network::{Connection, Endpoint, Ipv4Address, Network, NetworkError, WifiStatus};
use rosebox_storage::{AssetStore, MemStore, StorageError};

use super::{Canvas, Display, DisplaySettings, InputSource, KeyToken, Peripherals, RedrawFn, SystemInfo};
use crate::app::{
    AppContext, Application, Capabilities, Resources, ScriptError, ScriptHost, ScriptModule, Signal,
};

// ── Display ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Text { x: i32, y: i32, text: String, inverted: bool },
    Line(i32, i32, i32, i32),
    Rect { x: i32, y: i32, w: u32, h: u32, fill: bool },
    Circle { x: i32, y: i32, r: u32, fill: bool },
    Triangle([(i32, i32); 3], bool),
}

#[derive(Debug, Default)]
pub struct DisplayLog {
    /// Back buffer since the last clear.
    pub ops: Vec<DrawOp>,
    /// Every pushed frame.
    pub frames: Vec<Vec<DrawOp>>,
    pub clears: usize,
    pub refresh_ticks: usize,
    pub registers: usize,
    pub unregisters: usize,
    pub registered: bool,
    pub settings: DisplaySettings,
    /// Repaint through the callback when settings change, like a panel
    /// that redraws on invert.
    pub repaint_on_apply: bool,
}

pub struct MockDisplay {
    width: u32,
    height: u32,
    inverted_text: bool,
    callback: Option<RedrawFn>,
    log: Arc<Mutex<DisplayLog>>,
}

#[derive(Clone)]
pub struct DisplayProbe(Arc<Mutex<DisplayLog>>);

impl MockDisplay {
    /// 250x122 panel.
    pub fn new() -> (Self, DisplayProbe) {
        let log = Arc::new(Mutex::new(DisplayLog::default()));
        let display = Self {
            width: 250,
            height: 122,
            inverted_text: false,
            callback: None,
            log: log.clone(),
        };
        (display, DisplayProbe(log))
    }

    fn record(&mut self, op: DrawOp) {
        self.log.lock().ops.push(op);
    }

    /// Fresh frame painted only by the callback.
    fn repaint(&mut self) {
        self.log.lock().ops.clear();
        self.run_callback();
        let mut log = self.log.lock();
        let frame = log.ops.clone();
        log.frames.push(frame);
    }

    fn run_callback(&mut self) {
        if let Some(mut cb) = self.callback.take() {
            let canvas: &mut dyn Canvas = &mut *self;
            cb(canvas);
            // The callback may not replace itself; restore it.
            if self.callback.is_none() {
                self.callback = Some(cb);
            }
        }
    }
}

impl Canvas for MockDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let inverted = self.inverted_text;
        self.record(DrawOp::Text { x, y, text: String::from(text), inverted });
    }

    fn set_text_inverted(&mut self, inverted: bool) {
        self.inverted_text = inverted;
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.record(DrawOp::Line(x0, y0, x1, y1));
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, fill: bool) {
        self.record(DrawOp::Rect { x, y, w, h, fill });
    }

    fn draw_circle(&mut self, x: i32, y: i32, r: u32, fill: bool) {
        self.record(DrawOp::Circle { x, y, r, fill });
    }

    fn draw_triangle(&mut self, points: [(i32, i32); 3], fill: bool) {
        self.record(DrawOp::Triangle(points, fill));
    }
}

impl Display for MockDisplay {
    fn clear(&mut self) {
        let mut log = self.log.lock();
        log.ops.clear();
        log.clears += 1;
    }

    fn flush(&mut self) {
        self.run_callback();
        let mut log = self.log.lock();
        let frame = log.ops.clone();
        log.frames.push(frame);
    }

    fn register_redraw_callback(&mut self, f: RedrawFn) {
        self.callback = Some(f);
        let mut log = self.log.lock();
        log.registers += 1;
        log.registered = true;
    }

    fn unregister_redraw_callback(&mut self) {
        self.callback = None;
        let mut log = self.log.lock();
        log.unregisters += 1;
        log.registered = false;
    }

    fn has_redraw_callback(&self) -> bool {
        self.callback.is_some()
    }

    fn refresh_tick(&mut self) {
        self.log.lock().refresh_ticks += 1;
        if self.callback.is_some() {
            self.repaint();
        }
    }

    fn settings(&self) -> DisplaySettings {
        self.log.lock().settings
    }

    fn apply_settings(&mut self, settings: DisplaySettings) {
        let repaint = {
            let mut log = self.log.lock();
            log.settings = settings;
            log.repaint_on_apply
        };
        if repaint && self.callback.is_some() {
            self.repaint();
        }
    }
}

impl DisplayProbe {
    pub fn frame_count(&self) -> usize {
        self.0.lock().frames.len()
    }

    pub fn last_frame(&self) -> Vec<DrawOp> {
        self.0.lock().frames.last().cloned().unwrap_or_default()
    }

    /// Text drawn in the last pushed frame, in draw order.
    pub fn last_texts(&self) -> Vec<String> {
        texts(&self.last_frame())
    }

    /// Text drawn with inverted colours in the last pushed frame.
    pub fn last_highlighted(&self) -> Vec<String> {
        self.last_frame()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, inverted: true, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clears(&self) -> usize {
        self.0.lock().clears
    }

    pub fn refresh_ticks(&self) -> usize {
        self.0.lock().refresh_ticks
    }

    pub fn registered(&self) -> bool {
        self.0.lock().registered
    }

    pub fn registers(&self) -> usize {
        self.0.lock().registers
    }

    pub fn unregisters(&self) -> usize {
        self.0.lock().unregisters
    }

    pub fn settings(&self) -> DisplaySettings {
        self.0.lock().settings
    }

    pub fn set_repaint_on_apply(&self, on: bool) {
        self.0.lock().repaint_on_apply = on;
    }
}

pub fn texts(frame: &[DrawOp]) -> Vec<String> {
    frame
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

// ── Input ──

pub struct MockInput {
    queue: Arc<Mutex<VecDeque<KeyToken>>>,
}

#[derive(Clone)]
pub struct KeyQueue(Arc<Mutex<VecDeque<KeyToken>>>);

impl MockInput {
    pub fn new() -> (Self, KeyQueue) {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        (Self { queue: queue.clone() }, KeyQueue(queue))
    }
}

impl InputSource for MockInput {
    fn poll(&mut self) -> Option<KeyToken> {
        self.queue.lock().pop_front()
    }
}

impl KeyQueue {
    pub fn push(&self, key: KeyToken) {
        self.0.lock().push_back(key);
    }

    pub fn pending(&self) -> usize {
        self.0.lock().len()
    }
}

// ── Network ──

#[derive(Debug)]
pub struct ConnState {
    pub rx: VecDeque<u8>,
    pub sent: Vec<u8>,
    pub alive: bool,
    pub closes: usize,
    pub fail_reads: bool,
}

pub struct MockConnection {
    state: Arc<Mutex<ConnState>>,
}

#[derive(Clone)]
pub struct ConnProbe(Arc<Mutex<ConnState>>);

impl Connection for MockConnection {
    fn is_alive(&self) -> bool {
        let s = self.state.lock();
        s.alive && s.closes == 0
    }

    fn available(&self) -> usize {
        self.state.lock().rx.len()
    }

    fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, NetworkError> {
        let mut s = self.state.lock();
        if s.fail_reads {
            return Err(NetworkError::ConnectionReset);
        }
        let n = max.min(s.rx.len());
        Ok(s.rx.drain(..n).collect())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), NetworkError> {
        let mut s = self.state.lock();
        if !s.alive || s.closes > 0 {
            return Err(NetworkError::NotConnected);
        }
        s.sent.extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) {
        self.state.lock().closes += 1;
    }
}

impl ConnProbe {
    /// Bytes arriving from the peer.
    pub fn feed(&self, data: &[u8]) {
        self.0.lock().rx.extend(data.iter().copied());
    }

    /// Peer goes away without a close handshake.
    pub fn drop_link(&self) {
        self.0.lock().alive = false;
    }

    pub fn fail_reads(&self) {
        self.0.lock().fail_reads = true;
    }

    pub fn sent(&self) -> Vec<u8> {
        self.0.lock().sent.clone()
    }

    pub fn closes(&self) -> usize {
        self.0.lock().closes
    }

    pub fn buffered(&self) -> usize {
        self.0.lock().rx.len()
    }
}

#[derive(Debug)]
pub struct NetLog {
    pub accept: bool,
    pub status: WifiStatus,
    pub ip: Option<Ipv4Address>,
    pub joins: Vec<(String, String)>,
    pub opened: Vec<Endpoint>,
    pub connections: Vec<ConnProbe>,
}

impl core::fmt::Debug for ConnProbe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ConnProbe")
    }
}

pub struct MockNetwork {
    log: Arc<Mutex<NetLog>>,
}

#[derive(Clone)]
pub struct NetProbe(Arc<Mutex<NetLog>>);

impl MockNetwork {
    /// Accepts every connection by default.
    pub fn new() -> (Self, NetProbe) {
        let log = Arc::new(Mutex::new(NetLog {
            accept: true,
            status: WifiStatus::Idle,
            ip: None,
            joins: Vec::new(),
            opened: Vec::new(),
            connections: Vec::new(),
        }));
        (Self { log: log.clone() }, NetProbe(log))
    }
}

impl Network for MockNetwork {
    fn join(&mut self, ssid: &str, password: &str) {
        let mut log = self.log.lock();
        log.joins.push((String::from(ssid), String::from(password)));
        log.status = WifiStatus::Connected;
        log.ip = Some(Ipv4Address::new(192, 168, 1, 42));
    }

    fn status(&self) -> WifiStatus {
        self.log.lock().status
    }

    fn local_ip(&self) -> Option<Ipv4Address> {
        self.log.lock().ip
    }

    fn open(&mut self, endpoint: Endpoint) -> Result<Box<dyn Connection>, NetworkError> {
        let mut log = self.log.lock();
        log.opened.push(endpoint);
        if !log.accept {
            return Err(NetworkError::ConnectionRefused);
        }
        let state = Arc::new(Mutex::new(ConnState {
            rx: VecDeque::new(),
            sent: Vec::new(),
            alive: true,
            closes: 0,
            fail_reads: false,
        }));
        log.connections.push(ConnProbe(state.clone()));
        Ok(Box::new(MockConnection { state }))
    }
}

impl NetProbe {
    pub fn set_accept(&self, accept: bool) {
        self.0.lock().accept = accept;
    }

    pub fn joins(&self) -> Vec<(String, String)> {
        self.0.lock().joins.clone()
    }

    pub fn opened(&self) -> Vec<Endpoint> {
        self.0.lock().opened.clone()
    }

    pub fn connection(&self, index: usize) -> Option<ConnProbe> {
        self.0.lock().connections.get(index).cloned()
    }

    pub fn last_connection(&self) -> Option<ConnProbe> {
        self.0.lock().connections.last().cloned()
    }
}

// ── System ──

pub struct FixedSystem {
    state: Arc<Mutex<(usize, u64)>>,
}

#[derive(Clone)]
pub struct SystemProbe(Arc<Mutex<(usize, u64)>>);

impl FixedSystem {
    /// 123456 bytes free, zero uptime.
    pub fn new() -> (Self, SystemProbe) {
        let state = Arc::new(Mutex::new((123_456, 0)));
        (Self { state: state.clone() }, SystemProbe(state))
    }
}

impl SystemInfo for FixedSystem {
    fn free_memory(&self) -> usize {
        self.state.lock().0
    }

    fn uptime_millis(&self) -> u64 {
        self.state.lock().1
    }
}

impl SystemProbe {
    pub fn set_uptime(&self, ms: u64) {
        self.state().1 = ms;
    }

    pub fn set_free(&self, bytes: usize) {
        self.state().0 = bytes;
    }

    fn state(&self) -> spin::MutexGuard<'_, (usize, u64)> {
        self.0.lock()
    }
}

// ── Scripting runtime ──

#[derive(Debug)]
pub struct ScriptLog {
    pub caps: Capabilities,
    pub fail_load: bool,
    pub fail_update: bool,
    /// Signal returned by the next `update`.
    pub next_signal: Option<Signal>,
    pub loads: Vec<String>,
    /// Source handed to each `load`.
    pub sources: Vec<Vec<u8>>,
    pub unloads: Vec<String>,
    /// `name:hook` per lifecycle call.
    pub events: Vec<String>,
}

pub struct MockScripts {
    log: Arc<Mutex<ScriptLog>>,
}

#[derive(Clone)]
pub struct ScriptProbe(Arc<Mutex<ScriptLog>>);

impl MockScripts {
    pub fn new() -> (Self, ScriptProbe) {
        let log = Arc::new(Mutex::new(ScriptLog {
            caps: Capabilities::all(),
            fail_load: false,
            fail_update: false,
            next_signal: None,
            loads: Vec::new(),
            sources: Vec::new(),
            unloads: Vec::new(),
            events: Vec::new(),
        }));
        (Self { log: log.clone() }, ScriptProbe(log))
    }
}

struct MockModule {
    name: String,
    caps: Capabilities,
    log: Arc<Mutex<ScriptLog>>,
}

impl MockModule {
    fn event(&self, hook: &str) {
        self.log.lock().events.push(alloc::format!("{}:{}", self.name, hook));
    }
}

impl ScriptModule for MockModule {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn start(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), ScriptError> {
        self.event("start");
        Ok(())
    }

    fn update(&mut self, _ctx: &mut AppContext<'_>, _key: Option<KeyToken>) -> Result<Signal, ScriptError> {
        self.event("update");
        let mut log = self.log.lock();
        if log.fail_update {
            return Err(ScriptError(String::from("attempt to index a nil value")));
        }
        Ok(log.next_signal.take().unwrap_or(Signal::Continue))
    }

    fn on_exit(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), ScriptError> {
        self.event("on_exit");
        Ok(())
    }
}

impl ScriptHost for MockScripts {
    fn load(&mut self, name: &str, source: &[u8]) -> Result<Box<dyn ScriptModule>, ScriptError> {
        let mut log = self.log.lock();
        log.loads.push(String::from(name));
        log.sources.push(source.to_vec());
        if log.fail_load {
            return Err(ScriptError(String::from("syntax error near 'end'")));
        }
        Ok(Box::new(MockModule {
            name: String::from(name),
            caps: log.caps,
            log: self.log.clone(),
        }))
    }

    fn unload(&mut self, name: &str) {
        self.log.lock().unloads.push(String::from(name));
    }
}

impl ScriptProbe {
    pub fn set_caps(&self, caps: Capabilities) {
        self.0.lock().caps = caps;
    }

    pub fn fail_load(&self) {
        self.0.lock().fail_load = true;
    }

    pub fn fail_update(&self) {
        self.0.lock().fail_update = true;
    }

    pub fn next_signal(&self, signal: Signal) {
        self.0.lock().next_signal = Some(signal);
    }

    pub fn loads(&self) -> Vec<String> {
        self.0.lock().loads.clone()
    }

    pub fn sources(&self) -> Vec<Vec<u8>> {
        self.0.lock().sources.clone()
    }

    pub fn unloads(&self) -> Vec<String> {
        self.0.lock().unloads.clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().events.clone()
    }
}

// ── Storage ──

/// In-RAM store whose writes to selected paths fail.
pub struct FlakyStore {
    pub inner: MemStore,
    pub failing: Vec<String>,
    pub writes: Vec<String>,
}

impl FlakyStore {
    pub fn new(failing: &[&str]) -> Self {
        Self {
            inner: MemStore::new(),
            failing: failing.iter().map(|p| String::from(*p)).collect(),
            writes: Vec::new(),
        }
    }
}

impl AssetStore for FlakyStore {
    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.read(path)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.writes.push(String::from(path));
        if self.failing.iter().any(|p| p == path) {
            return Err(StorageError::IoError);
        }
        self.inner.write(path, data)
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list(dir)
    }
}

// ── Rig ──

/// Probes for a [`Peripherals`] bundle built from doubles.
#[derive(Clone)]
pub struct Rig {
    pub display: DisplayProbe,
    pub keys: KeyQueue,
    pub net: NetProbe,
    pub system: SystemProbe,
}

pub fn peripherals(store: MemStore) -> (Peripherals, Rig) {
    let (display, display_probe) = MockDisplay::new();
    let (input, keys) = MockInput::new();
    let (network, net) = MockNetwork::new();
    let (system, system_probe) = FixedSystem::new();
    let periph = Peripherals {
        display: Box::new(display),
        input: Box::new(input),
        store: Box::new(store),
        network: Box::new(network),
        system: Box::new(system),
    };
    let rig = Rig {
        display: display_probe,
        keys,
        net,
        system: system_probe,
    };
    (periph, rig)
}

// ── Application harness ──

/// Drives one application outside a session.
pub struct AppHarness<A> {
    pub periph: Peripherals,
    pub resources: Resources,
    pub rig: Rig,
    pub app: A,
}

impl<A: Application> AppHarness<A> {
    /// Build peripherals over `store` and call `start`.
    pub fn start(app: A, store: MemStore) -> Self {
        let (periph, rig) = peripherals(store);
        let mut h = Self {
            periph,
            resources: Resources::default(),
            rig,
            app,
        };
        let mut ctx = AppContext::new(&mut h.periph, &mut h.resources);
        h.app.start(&mut ctx);
        h
    }

    pub fn key(&mut self, key: Option<KeyToken>) -> Signal {
        let mut ctx = AppContext::new(&mut self.periph, &mut self.resources);
        self.app.update(&mut ctx, key)
    }

    pub fn exit(&mut self) {
        let mut ctx = AppContext::new(&mut self.periph, &mut self.resources);
        self.app.on_exit(&mut ctx);
    }

    pub fn holds_redraw(&self) -> bool {
        self.resources.redraw_registered
    }
}
