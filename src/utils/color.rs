use std::sync::atomic::{AtomicBool, Ordering};

// Off until the entry point decides the terminal can take escape codes
static COLORS_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_colors_enabled(enabled: bool) {
    COLORS_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

#[derive(PartialEq, Clone, Copy)]
enum Color {
    Red,
}

fn get_color_code(color: Color, bold: bool) -> &'static str {
    match (color, bold) {
        (Color::Red, true) => "9",
        (Color::Red, false) => "1",
    }
}

fn paint(value: &str, bold: bool, color: Color) -> String {
    let mut result = String::from("\u{1b}[");
    if bold {
        result.push_str("1;");
    }
    result.push_str("38;5;");
    result.push_str(get_color_code(color, bold));
    result.push('m');
    result.push_str(value);
    result.push_str("\u{1b}[0m");
    result
}

fn get_color(value: &str, bold: bool, color: Color) -> String {
    if colors_enabled() {
        paint(value, bold, color)
    } else {
        value.to_string()
    }
}

pub trait Coloralex {
    fn red(self, bold: bool) -> String;
}

impl Coloralex for &str {
    fn red(self, bold: bool) -> String {
        get_color(self, bold, Color::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_value_in_escape_codes() {
        assert_eq!(paint("boom", true, Color::Red), "\u{1b}[1;38;5;9mboom\u{1b}[0m");
        assert_eq!(paint("ok", false, Color::Red), "\u{1b}[38;5;1mok\u{1b}[0m");
    }

    #[test]
    fn plain_text_when_disabled() {
        assert!(!colors_enabled());
        assert_eq!("failed".red(true), "failed");
    }
}
