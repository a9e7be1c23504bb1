//! Script module browser.
//!
//! Two columns: modules on internal flash (`/apps`) on the left, modules on
//! the SD card (`/sd/apps`) on the right. Short walks through the flash
//! entries and then the SD entries; Long launches the selected module.

use alloc::string::String;
use alloc::vec::Vec;

use rosebox_storage::{path, AssetStore};

use crate::app::registry::{SCRIPT_DIRS, SCRIPT_EXT};
use crate::app::{AppContext, Application, Signal};
use crate::hal::{Display, KeyToken};

const LINE_H: i32 = 12;
const DIVIDER_X: i32 = 125;
const HEADER_Y: i32 = 14;
const EMPTY: &str = "  (none)";
const FOOTER: &str = "Short=select  Long=open";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Flash,
    Sd,
}

impl Column {
    pub fn dir(&self) -> &'static str {
        match self {
            Column::Flash => SCRIPT_DIRS[0],
            Column::Sd => SCRIPT_DIRS[1],
        }
    }
}

pub struct AppBrowser {
    flash: Vec<String>,
    sd: Vec<String>,
    column: Column,
    index: usize,
}

/// Module names (extension stripped) in `dir`. A missing directory is empty.
pub fn list_modules(store: &dyn AssetStore, dir: &str) -> Vec<String> {
    store
        .list(dir)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|name| name.strip_suffix(SCRIPT_EXT).map(String::from))
        .filter(|name| !name.is_empty())
        .collect()
}

impl AppBrowser {
    pub fn new() -> Self {
        Self {
            flash: Vec::new(),
            sd: Vec::new(),
            column: Column::Flash,
            index: 0,
        }
    }

    pub fn selection(&self) -> Option<(Column, &str)> {
        let list = match self.column {
            Column::Flash => &self.flash,
            Column::Sd => &self.sd,
        };
        list.get(self.index).map(|name| (self.column, name.as_str()))
    }

    fn advance(&mut self) {
        match self.column {
            Column::Flash if self.index + 1 < self.flash.len() => self.index += 1,
            Column::Flash if !self.sd.is_empty() => {
                self.column = Column::Sd;
                self.index = 0;
            }
            Column::Sd if self.index + 1 < self.sd.len() => self.index += 1,
            Column::Sd if !self.flash.is_empty() => {
                self.column = Column::Flash;
                self.index = 0;
            }
            _ => self.index = 0,
        }
    }

    fn draw_column(&self, display: &mut dyn Display, x: i32, column: Column) {
        let names = match column {
            Column::Flash => &self.flash,
            Column::Sd => &self.sd,
        };
        let mut y = HEADER_Y + 4;
        if names.is_empty() {
            display.draw_text(x, y, EMPTY);
            return;
        }
        for (i, name) in names.iter().enumerate() {
            let marker = if self.column == column && self.index == i { "> " } else { "  " };
            display.draw_text(x, y, &alloc::format!("{}{}", marker, name));
            y += LINE_H;
        }
    }

    fn redraw(&self, display: &mut dyn Display) {
        let width = display.width() as i32;
        let height = display.height() as i32;

        display.clear();
        display.draw_line(DIVIDER_X, 0, DIVIDER_X, height);
        display.draw_line(0, HEADER_Y, width, HEADER_Y);
        display.draw_text(5, 2, "Flash");
        display.draw_text(DIVIDER_X + 5, 2, "SD");
        self.draw_column(display, 5, Column::Flash);
        self.draw_column(display, DIVIDER_X + 5, Column::Sd);
        display.draw_text(5, height - 12, FOOTER);
        display.flush();
    }
}

impl Default for AppBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for AppBrowser {
    fn start(&mut self, ctx: &mut AppContext<'_>) {
        let [flash_dir, sd_dir] = SCRIPT_DIRS;
        self.flash = list_modules(&*ctx.store, flash_dir);
        self.sd = list_modules(&*ctx.store, sd_dir);
        self.column = if self.flash.is_empty() && !self.sd.is_empty() {
            Column::Sd
        } else {
            Column::Flash
        };
        self.index = 0;
        self.redraw(ctx.display);
    }

    fn update(&mut self, ctx: &mut AppContext<'_>, key: Option<KeyToken>) -> Signal {
        match key {
            None => Signal::Continue,
            Some(KeyToken::LongEnter5Sec) => Signal::Exit,
            Some(KeyToken::LongEnter) => match self.selection() {
                // Full path, so a name present in both columns launches
                // the copy that was selected.
                Some((column, name)) => {
                    let file = alloc::format!("{}{}", name, SCRIPT_EXT);
                    Signal::Launch(path::join(column.dir(), &file))
                }
                None => Signal::Continue,
            },
            Some(KeyToken::Short) => {
                self.advance();
                self.redraw(ctx.display);
                Signal::Continue
            }
        }
    }
}
