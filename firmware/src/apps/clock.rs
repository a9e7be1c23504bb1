//! Uptime clock.

use alloc::format;
use alloc::string::String;

use crate::app::{AppContext, Application, Signal};
use crate::hal::{Display, KeyToken};

pub struct Clock {
    /// Whole seconds shown in the last frame.
    shown: Option<u64>,
}

impl Clock {
    pub fn new() -> Self {
        Self { shown: None }
    }

    fn redraw(&mut self, display: &mut dyn Display, uptime_millis: u64) {
        let secs = uptime_millis / 1000;
        display.clear();
        display.draw_text(10, 20, "Clock");
        display.draw_text(10, 40, &format_uptime(secs));
        display.draw_text(10, 60, "Long=home");
        display.flush();
        self.shown = Some(secs);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// `hh:mm:ss`; hours keep counting past 99.
pub fn format_uptime(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

impl Application for Clock {
    fn start(&mut self, ctx: &mut AppContext<'_>) {
        let now = ctx.system.uptime_millis();
        self.redraw(ctx.display, now);
    }

    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        match key {
            Some(KeyToken::LongEnter) | Some(KeyToken::LongEnter5Sec) => return Signal::Exit,
            _ => {}
        }
        let now = ctx.system.uptime_millis();
        if key.is_some() || self.shown != Some(now / 1000) {
            self.redraw(ctx.display, now);
        }
        Signal::Continue
    }
}
