//! Display settings editor.
//!
//! Content is painted by a redraw callback registered on the display, so
//! partial-refresh ticks repaint it without an `update` call. The callback
//! and the app share a [`View`] behind a lock.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;

use spin::Mutex;

use crate::app::{AppContext, Application, Signal};
use crate::hal::{Canvas, DisplayFlags, DisplaySettings, KeyToken};

const ROWS: usize = 4;
const SAVE_ROW: usize = ROWS - 1;
const LINE_H: i32 = 12;
const FOOTER: &str = "Hold 5s = save + home";

/// What the redraw callback paints.
#[derive(Debug, Clone, Default)]
struct View {
    selected: usize,
    settings: DisplaySettings,
    ip: Option<String>,
}

pub struct Settings {
    view: Arc<Mutex<View>>,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            view: Arc::new(Mutex::new(View::default())),
        }
    }

    pub fn selected(&self) -> usize {
        self.view.lock().selected
    }

    fn save(ctx: &mut AppContext<'_>, settings: &DisplaySettings) {
        match settings.save(ctx.store) {
            Ok(()) => log::info!("[RoseBox/Settings] display settings saved"),
            Err(e) => log::warn!("[RoseBox/Settings] save failed: {}", e),
        }
    }

    fn repaint(ctx: &mut AppContext<'_>) {
        ctx.display.clear();
        ctx.display.flush();
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

fn draw_row(canvas: &mut dyn Canvas, y: i32, text: &str, selected: bool) {
    if selected {
        let w = canvas.width();
        canvas.draw_rect(0, y - 2, w, (LINE_H + 2) as u32, true);
        canvas.set_text_inverted(true);
        canvas.draw_text(5, y, text);
        canvas.set_text_inverted(false);
    } else {
        canvas.draw_text(5, y, text);
    }
}

fn draw_content(canvas: &mut dyn Canvas, view: &View) {
    let width = canvas.width() as i32;
    let s = &view.settings;
    let mut y = 6;

    draw_row(canvas, y, &format!("Invert: {}", on_off(s.inverted())), view.selected == 0);
    y += LINE_H;
    draw_row(canvas, y, &format!("Refresh: {}", s.refresh_count), view.selected == 1);
    y += LINE_H;
    draw_row(canvas, y, &format!("Partial: {}", on_off(s.partial_refresh())), view.selected == 2);
    y += LINE_H + 4;

    canvas.draw_line(0, y, width, y);
    y += 6;
    let ip = view.ip.as_deref().unwrap_or("(not connected)");
    canvas.draw_text(5, y, &format!("IP: {}", ip));
    y += LINE_H + 6;
    canvas.draw_line(0, y, width, y);
    y += 6;

    draw_row(canvas, y, ">>> Save and close <<<", view.selected == SAVE_ROW);
    y += LINE_H + 4;
    canvas.draw_text(5, y, FOOTER);
}

impl Application for Settings {
    fn start(&mut self, ctx: &mut AppContext<'_>) {
        {
            let mut view = self.view.lock();
            *view = View {
                selected: 0,
                settings: ctx.display.settings(),
                ip: ctx.network.local_ip().map(|ip| format!("{}", ip)),
            };
        }
        let view = self.view.clone();
        ctx.register_redraw(Box::new(move |canvas: &mut dyn Canvas| {
            draw_content(canvas, &view.lock());
        }));
        Self::repaint(ctx);
    }

    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        let Some(key) = key else {
            return Signal::Continue;
        };

        // The display may run the redraw callback, which takes the lock.
        let (row, settings) = {
            let mut view = self.view.lock();
            match key {
                KeyToken::Short => view.selected = (view.selected + 1) % ROWS,
                KeyToken::LongEnter => {
                    let row = view.selected;
                    let s = &mut view.settings;
                    match row {
                        0 => s.flags.toggle(DisplayFlags::INVERTED),
                        1 => s.refresh_count = s.next_refresh_count(),
                        2 => s.flags.toggle(DisplayFlags::PARTIAL_REFRESH),
                        _ => {}
                    }
                }
                KeyToken::LongEnter5Sec => {}
            }
            (view.selected, view.settings)
        };

        match key {
            KeyToken::LongEnter5Sec => {
                Self::save(ctx, &settings);
                return Signal::Exit;
            }
            KeyToken::LongEnter if row == SAVE_ROW => {
                Self::save(ctx, &settings);
                return Signal::Exit;
            }
            KeyToken::LongEnter => ctx.display.apply_settings(settings),
            KeyToken::Short => {}
        }

        Self::repaint(ctx);
        Signal::Continue
    }
}
