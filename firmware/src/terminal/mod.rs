//! Terminal application.
//!
//! Two modes nested inside one application:
//!
//! - **Local menu**: Short cycles through the command list, Long runs the
//!   selected command.
//! - **Remote session**: a TCP byte stream is open. Inbound bytes are
//!   appended to the scrollback every tick; Long closes the stream, any
//!   other key sends a newline.
//!
//! A five-second press exits from either mode. The open stream, if any, is
//! closed by `on_exit`.

pub mod buffer;
pub mod commands;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use rosebox_network::Connection;

use crate::app::{AppContext, Application, Signal};
use crate::config::{TERMINAL_LINE_HEIGHT, TERMINAL_MAX_LINES, TRANSPORT_READ_CHUNK};
use crate::hal::{Display, KeyToken};

pub use buffer::OutputBuffer;
pub use commands::{command_list, Command};

const BANNER: [&str; 2] = ["RoseBox Terminal", "Short=next  Long=run"];
const REMOTE_PROMPT: &str = "[TCP] ";
const LOCAL_PROMPT: &str = "> ";

/// Which half of the terminal is driving input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMode {
    LocalMenu,
    RemoteSession,
}

/// Transport ownership. A stream exists exactly while in remote mode.
pub enum Link {
    Local,
    Remote(Box<dyn Connection>),
}

impl Link {
    fn close(&mut self) {
        if let Link::Remote(conn) = self {
            conn.close();
        }
        *self = Link::Local;
    }
}

/// Per-instance terminal state, discarded on exit.
pub struct TerminalState {
    pub output: OutputBuffer,
    pub command_cursor: usize,
    pub link: Link,
}

impl TerminalState {
    fn new() -> Self {
        Self {
            output: OutputBuffer::new(TERMINAL_MAX_LINES),
            command_cursor: 0,
            link: Link::Local,
        }
    }

    pub fn mode(&self) -> TerminalMode {
        match self.link {
            Link::Local => TerminalMode::LocalMenu,
            Link::Remote(_) => TerminalMode::RemoteSession,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.mode() == TerminalMode::RemoteSession
    }
}

pub struct Terminal {
    commands: Vec<String>,
    state: TerminalState,
}

impl Terminal {
    /// `connect_target` is the argument of the `connect` entry.
    pub fn new(connect_target: &str) -> Self {
        Self {
            commands: command_list(connect_target),
            state: TerminalState::new(),
        }
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    pub fn mode(&self) -> TerminalMode {
        self.state.mode()
    }

    pub fn selected_command(&self) -> &str {
        self.commands
            .get(self.state.command_cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn render(&self, display: &mut dyn Display) {
        display.clear();
        let mut y = 0;
        for line in self.state.output.iter() {
            display.draw_text(0, y, line);
            y += TERMINAL_LINE_HEIGHT;
        }
        let prompt = if self.state.is_remote() { REMOTE_PROMPT } else { LOCAL_PROMPT };
        let status = alloc::format!("{}{}", prompt, self.selected_command());
        display.draw_text(0, y, &status);
        display.flush();
    }

    /// Run the selected command line. `Exit` for the `exit` command.
    fn run_selected(&mut self, ctx: &mut AppContext<'_>) -> Signal {
        let line = String::from(self.selected_command());
        let out = &mut self.state.output;

        match Command::parse(&line) {
            None => {}
            Some(Command::Exit) => return Signal::Exit,
            Some(Command::Info) => {
                out.push(commands::info_line(
                    ctx.system.free_memory(),
                    ctx.system.uptime_millis(),
                ));
            }
            Some(Command::Wifi) => {
                let ip = ctx.network.local_ip().map(|ip| alloc::format!("{}", ip));
                out.push(commands::wifi_line(ctx.network.status().as_str(), ip.as_deref()));
            }
            Some(Command::Clear) => out.clear(),
            Some(Command::Connect(endpoint)) => match ctx.network.open(endpoint) {
                Ok(conn) => {
                    log::info!("[RoseBox/Terminal] connected to {}", endpoint);
                    self.state.link = Link::Remote(conn);
                    out.push(commands::connected_line(&endpoint));
                }
                Err(e) => {
                    log::warn!("[RoseBox/Terminal] connect {} failed: {}", endpoint, e);
                    out.push(commands::connect_failed_line(&endpoint));
                }
            },
            Some(Command::Disconnect) => {
                self.state.link.close();
                out.push(commands::DISCONNECTED);
            }
            Some(Command::Help) => out.push(commands::HELP),
            Some(Command::Unknown(name)) => out.push(commands::unknown_line(name)),
        }
        Signal::Continue
    }

    fn update_local(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        match key {
            Some(KeyToken::Short) => {
                self.state.command_cursor = (self.state.command_cursor + 1) % self.commands.len();
            }
            Some(KeyToken::LongEnter) => {
                if let Signal::Exit = self.run_selected(ctx) {
                    return Signal::Exit;
                }
            }
            Some(KeyToken::LongEnter5Sec) => return Signal::Exit,
            None => return Signal::Continue,
        }
        self.render(ctx.display);
        Signal::Continue
    }

    fn update_remote(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        let conn = match &mut self.state.link {
            Link::Remote(conn) => conn,
            Link::Local => return Signal::Continue,
        };

        if !conn.is_alive() {
            self.drop_link();
            self.render(ctx.display);
            return Signal::Continue;
        }

        let mut dirty = false;
        match drain(conn.as_mut()) {
            Ok(bytes) if !bytes.is_empty() => {
                self.state.output.push_text(&String::from_utf8_lossy(&bytes));
                dirty = true;
            }
            Ok(_) => {}
            Err(()) => {
                self.drop_link();
                self.render(ctx.display);
                return Signal::Continue;
            }
        }

        match key {
            Some(KeyToken::LongEnter) => {
                log::info!("[RoseBox/Terminal] session closed");
                self.state.link.close();
                dirty = true;
            }
            Some(_) => {
                if let Link::Remote(conn) = &mut self.state.link {
                    if conn.send(b"\n").is_err() {
                        self.drop_link();
                    }
                }
                dirty = true;
            }
            None => {}
        }

        if dirty {
            self.render(ctx.display);
        }
        Signal::Continue
    }

    /// The peer went away: release the stream and say so.
    fn drop_link(&mut self) {
        log::warn!("[RoseBox/Terminal] connection dropped");
        self.state.link.close();
        self.state.output.push(commands::DISCONNECTED);
    }
}

/// Read everything currently buffered, in chunks.
fn drain(conn: &mut dyn Connection) -> Result<Vec<u8>, ()> {
    let mut bytes = Vec::new();
    while conn.available() > 0 {
        let chunk = conn.read_up_to(TRANSPORT_READ_CHUNK).map_err(|_| ())?;
        if chunk.is_empty() {
            break;
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

impl Application for Terminal {
    fn start(&mut self, ctx: &mut AppContext<'_>) {
        self.state.link.close();
        self.state.output.clear();
        self.state.command_cursor = 0;
        for line in BANNER {
            self.state.output.push(line);
        }
        self.render(ctx.display);
    }

    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        if key == Some(KeyToken::LongEnter5Sec) {
            return Signal::Exit;
        }
        match self.state.mode() {
            TerminalMode::LocalMenu => self.update_local(ctx, key),
            TerminalMode::RemoteSession => self.update_remote(ctx, key),
        }
    }

    fn on_exit(&mut self, _ctx: &mut AppContext<'_>) {
        self.state.link.close();
    }
}
