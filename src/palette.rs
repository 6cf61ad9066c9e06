//! Colors for types, stats, health bars and the two UI themes.

use ratatui::style::Color;

use crate::prefs::Theme;

const UNKNOWN_TYPE: &str = "#777777";

const TYPE_COLORS: [(&str, &str); 18] = [
    ("normal", "#A8A77A"),
    ("fire", "#EE8130"),
    ("water", "#6390F0"),
    ("electric", "#F7D02C"),
    ("grass", "#7AC74C"),
    ("ice", "#96D9D6"),
    ("fighting", "#C22E28"),
    ("poison", "#A33EA1"),
    ("ground", "#E2BF65"),
    ("flying", "#A98FF3"),
    ("psychic", "#F95587"),
    ("bug", "#A6B91A"),
    ("rock", "#B6A136"),
    ("ghost", "#735797"),
    ("dragon", "#6F35FC"),
    ("dark", "#705746"),
    ("steel", "#B7B7CE"),
    ("fairy", "#D685AD"),
];

pub fn type_hex(type_name: &str) -> &'static str {
    TYPE_COLORS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, hex)| *hex)
        .unwrap_or(UNKNOWN_TYPE)
}

pub fn type_color(type_name: &str) -> Color {
    hex_color(type_hex(type_name))
}

pub fn stat_hex(value: u16) -> &'static str {
    match value {
        0..=49 => "#ff5252",
        50..=79 => "#ffb74d",
        80..=99 => "#81c784",
        _ => "#4fc3f7",
    }
}

pub fn stat_color(value: u16) -> Color {
    hex_color(stat_hex(value))
}

pub fn hp_color(health: u16) -> Color {
    if health > 50 {
        Color::Rgb(76, 175, 80)
    } else if health > 20 {
        Color::Rgb(255, 152, 0)
    } else {
        Color::Rgb(244, 67, 54)
    }
}

pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

pub fn hex_color(hex: &str) -> Color {
    match parse_hex(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Gray,
    }
}

/// Subtracts `round(2.55 * percent)` from each channel, clamped at 0.
pub fn darken_hex(hex: &str, percent: u8) -> Option<String> {
    let (r, g, b) = parse_hex(hex)?;
    let amount = (2.55 * f64::from(percent)).round().min(255.0) as u8;
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        r.saturating_sub(amount),
        g.saturating_sub(amount),
        b.saturating_sub(amount)
    ))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub panel: Color,
    pub panel_alt: Color,
    pub header: Color,
    pub text: Color,
    pub text_dim: Color,
    pub accent: Color,
    pub gold: Color,
    pub highlight_bg: Color,
    pub highlight_text: Color,
    pub border: Color,
    pub bar_empty: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::Rgb(238, 240, 244),
                panel: Color::Rgb(250, 250, 252),
                panel_alt: Color::Rgb(228, 232, 238),
                header: Color::Rgb(204, 40, 52),
                text: Color::Rgb(34, 38, 46),
                text_dim: Color::Rgb(104, 112, 124),
                accent: Color::Rgb(204, 40, 52),
                gold: Color::Rgb(196, 146, 20),
                highlight_bg: Color::Rgb(52, 102, 196),
                highlight_text: Color::Rgb(248, 248, 252),
                border: Color::Rgb(176, 184, 196),
                bar_empty: Color::Rgb(214, 218, 224),
            },
            Theme::Dark => Self {
                bg: Color::Rgb(20, 22, 30),
                panel: Color::Rgb(32, 36, 48),
                panel_alt: Color::Rgb(26, 30, 40),
                header: Color::Rgb(150, 28, 40),
                text: Color::Rgb(226, 230, 238),
                text_dim: Color::Rgb(150, 158, 172),
                accent: Color::Rgb(240, 84, 92),
                gold: Color::Rgb(222, 196, 120),
                highlight_bg: Color::Rgb(86, 130, 220),
                highlight_text: Color::Rgb(14, 16, 22),
                border: Color::Rgb(72, 80, 100),
                bar_empty: Color::Rgb(44, 48, 60),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_colors_fall_back_to_grey() {
        assert_eq!(type_hex("fire"), "#EE8130");
        assert_eq!(type_hex("shadow"), "#777777");
        assert_eq!(type_color("water"), Color::Rgb(0x63, 0x90, 0xF0));
    }

    #[test]
    fn stat_thresholds() {
        assert_eq!(stat_hex(49), "#ff5252");
        assert_eq!(stat_hex(50), "#ffb74d");
        assert_eq!(stat_hex(79), "#ffb74d");
        assert_eq!(stat_hex(80), "#81c784");
        assert_eq!(stat_hex(99), "#81c784");
        assert_eq!(stat_hex(100), "#4fc3f7");
    }

    #[test]
    fn darken_subtracts_scaled_amount_and_clamps() {
        // round(2.55 * 20) = 51
        assert_eq!(darken_hex("#EE8130", 20).as_deref(), Some("#bb4e00"));
        assert_eq!(darken_hex("#102030", 100).as_deref(), Some("#000000"));
        assert_eq!(darken_hex("#777", 20), None);
    }

    #[test]
    fn hp_thresholds() {
        assert_eq!(hp_color(100), hp_color(51));
        assert_eq!(hp_color(50), hp_color(21));
        assert_eq!(hp_color(20), hp_color(0));
        assert_ne!(hp_color(51), hp_color(50));
        assert_ne!(hp_color(21), hp_color(20));
    }
}
