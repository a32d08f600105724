use ratatui::style::{Color, Modifier, Style};

// ── Color palette ──────────────────────────────────────────────────

pub const BG: Color = Color::Rgb(0x0b, 0x10, 0x0c);
pub const MOSS: Color = Color::Rgb(0x7c, 0xd9, 0x6b);
pub const MEADOW: Color = Color::Rgb(0x39, 0xff, 0x14);
pub const BIRCH: Color = Color::Rgb(0xf2, 0xe8, 0xcf);
pub const SEA: Color = Color::Rgb(0x00, 0xd4, 0xff);
pub const ROWAN: Color = Color::Rgb(0xff, 0x6e, 0x27);
pub const TEXT_DIM: Color = Color::Rgb(0xb0, 0xb0, 0xb0);
pub const TEXT_BRIGHT: Color = Color::Rgb(0xff, 0xff, 0xff);
pub const BORDER_DIM: Color = Color::Rgb(0x2f, 0x5f, 0x2a);
pub const BORDER_BRIGHT: Color = Color::Rgb(0x7c, 0xd9, 0x6b);

// ── Style presets ──────────────────────────────────────────────────

pub fn panel_border(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(BORDER_BRIGHT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_DIM)
    }
}

pub fn check_style(completed: bool) -> Style {
    if completed {
        Style::default()
            .fg(MEADOW)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(TEXT_BRIGHT)
    }
}

pub fn check_symbol(completed: bool) -> &'static str {
    if completed { "◉" } else { "○" }
}

pub fn progress_style(percent: u8) -> Style {
    match percent {
        0 => Style::default().fg(TEXT_DIM),
        100 => Style::default().fg(MEADOW).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(SEA),
    }
}

pub fn error_style() -> Style {
    Style::default().fg(ROWAN).add_modifier(Modifier::BOLD)
}

// ── Progress bar ───────────────────────────────────────────────────

pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width / 100).min(width);
    let empty = width - filled;
    "█".repeat(filled) + &"░".repeat(empty)
}

// ── ASCII art header ───────────────────────────────────────────────

pub const HEADER_ART: &str = "\
▐██▌ GRÄSÖS ▐██▌";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_empty() {
        assert_eq!(progress_bar(0, 10), "░░░░░░░░░░");
    }

    #[test]
    fn progress_bar_half() {
        assert_eq!(progress_bar(50, 10), "█████░░░░░");
    }

    #[test]
    fn progress_bar_full() {
        assert_eq!(progress_bar(100, 10), "██████████");
    }

    #[test]
    fn progress_bar_rounds_down() {
        assert_eq!(progress_bar(33, 10), "███░░░░░░░");
        assert_eq!(progress_bar(99, 4), "███░");
    }

    #[test]
    fn progress_style_by_band() {
        assert_eq!(progress_style(0).fg, Some(TEXT_DIM));
        assert_eq!(progress_style(40).fg, Some(SEA));
        assert_eq!(progress_style(100).fg, Some(MEADOW));
    }

    #[test]
    fn check_symbol_and_style() {
        assert_eq!(check_symbol(true), "◉");
        assert_eq!(check_symbol(false), "○");
        assert_eq!(check_style(false).fg, Some(TEXT_BRIGHT));
        assert!(check_style(true).add_modifier.contains(Modifier::CROSSED_OUT));
    }
}
