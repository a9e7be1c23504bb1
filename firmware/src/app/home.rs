//! Home menu rendering.

use crate::hal::Display;

const TITLE: &str = "RoseBox";
const ROW_H: i32 = 14;
const FIRST_ROW_Y: i32 = 24;
const FOOTER: &str = "Short=next  Long=open";

/// Draw the home menu with `selected` highlighted and push the frame.
pub fn render<D: Display + ?Sized>(display: &mut D, menu: &[&str], selected: usize) {
    let width = display.width();
    let height = display.height() as i32;

    display.clear();
    display.draw_text(5, 4, TITLE);
    display.draw_line(0, 16, width as i32, 16);

    let mut y = FIRST_ROW_Y;
    for (i, name) in menu.iter().enumerate() {
        if i == selected {
            display.draw_rect(0, y - 2, width, (ROW_H + 2) as u32, true);
            display.set_text_inverted(true);
            display.draw_text(5, y, name);
            display.set_text_inverted(false);
        } else {
            display.draw_text(5, y, name);
        }
        y += ROW_H;
    }

    display.draw_text(5, height - 12, FOOTER);
    display.flush();
}
