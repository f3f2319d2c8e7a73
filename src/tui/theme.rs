use ratatui::style::{Color, Modifier, Style};

// Night sky and lantern gold
pub const BG: Color = Color::Rgb(12, 16, 30);
pub const SURFACE: Color = Color::Rgb(20, 26, 46);
pub const BORDER: Color = Color::Rgb(48, 58, 92);
pub const TEXT: Color = Color::Rgb(226, 222, 206);
pub const TEXT_DIM: Color = Color::Rgb(112, 118, 140);
pub const GOLD: Color = Color::Rgb(214, 176, 84);
pub const GREEN: Color = Color::Rgb(96, 162, 120);
pub const AMBER: Color = Color::Rgb(222, 146, 68);
pub const BANNER_BG: Color = Color::Rgb(58, 46, 18);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    if focused {
        gold()
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn banner() -> Style {
    Style::default().fg(TEXT).bg(BANNER_BG)
}
