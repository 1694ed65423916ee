use anyhow::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::config::config_dir;

pub fn hex_to_color(hex: &str) -> Color {
    let h = hex.trim_start_matches('#');
    if h.len() != 6 || !h.is_ascii() { return Color::Reset; }
    let r = u8::from_str_radix(&h[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&h[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&h[4..6], 16).unwrap_or(0);
    Color::Rgb(r, g, b)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    // Backgrounds
    pub bg_primary: String, pub bg_secondary: String, pub bg_popup: String,
    /// Background of every other week row.
    pub bg_shaded: String,
    // Borders
    pub border_normal: String, pub border_focused: String,
    // Text
    pub text_primary: String, pub text_muted: String, pub text_accent: String,
    /// Days that belong to the neighbouring month.
    pub text_outside: String,
    // Highlights
    pub today_bg: String, pub today_fg: String,
    pub cursor_bg: String, pub cursor_fg: String,
    /// Recorded or selected period days.
    pub period_bg: String, pub period_fg: String,
    pub ovulation: String,
    // Status
    pub success: String, pub error: String,
}

impl ThemeConfig {
    // ── Color accessors ───────────────────────────────────────────────────────
    pub fn bg(&self)            -> Color { hex_to_color(&self.bg_primary) }
    pub fn bg2(&self)           -> Color { hex_to_color(&self.bg_secondary) }
    pub fn popup_bg(&self)      -> Color { hex_to_color(&self.bg_popup) }
    pub fn shaded(&self)        -> Color { hex_to_color(&self.bg_shaded) }
    pub fn border(&self)        -> Color { hex_to_color(&self.border_normal) }
    pub fn border_active(&self) -> Color { hex_to_color(&self.border_focused) }
    pub fn fg(&self)            -> Color { hex_to_color(&self.text_primary) }
    pub fn fg_dim(&self)        -> Color { hex_to_color(&self.text_muted) }
    pub fn accent(&self)        -> Color { hex_to_color(&self.text_accent) }
    pub fn outside(&self)       -> Color { hex_to_color(&self.text_outside) }
    pub fn ovulation(&self)     -> Color { hex_to_color(&self.ovulation) }
    pub fn success(&self)       -> Color { hex_to_color(&self.success) }
    pub fn error(&self)         -> Color { hex_to_color(&self.error) }

    pub fn today_highlight(&self)  -> (Color, Color) {
        (hex_to_color(&self.today_bg), hex_to_color(&self.today_fg))
    }
    pub fn cursor_highlight(&self) -> (Color, Color) {
        (hex_to_color(&self.cursor_bg), hex_to_color(&self.cursor_fg))
    }
    pub fn period_highlight(&self) -> (Color, Color) {
        (hex_to_color(&self.period_bg), hex_to_color(&self.period_fg))
    }

    // ── Persistence ───────────────────────────────────────────────────────────
    pub fn load() -> Result<Self> {
        let path = config_dir().join("theme.toml");
        if path.exists() {
            Ok(toml::from_str(&std::fs::read_to_string(&path)?)?)
        } else {
            let t = ThemeConfig::default();
            t.save()?;
            Ok(t)
        }
    }

    pub fn save(&self) -> Result<()> {
        let dir = config_dir();
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("theme.toml"), toml::to_string_pretty(self)?)?;
        Ok(())
    }

    // ── Theme catalogue ───────────────────────────────────────────────────────
    pub fn all_themes() -> Vec<ThemeConfig> {
        vec![
            ThemeConfig::default(),    // Catppuccin Mocha
            ThemeConfig::nord(),
            ThemeConfig::rose_pine_dawn(),
        ]
    }

    // ── Built-in themes ───────────────────────────────────────────────────────

    pub fn nord() -> Self { Self {
        name: "nord".into(),
        bg_primary: "#2e3440".into(), bg_secondary: "#3b4252".into(), bg_popup: "#434c5e".into(),
        bg_shaded: "#343a47".into(),
        border_normal: "#4c566a".into(), border_focused: "#88c0d0".into(),
        text_primary: "#eceff4".into(), text_muted: "#616e88".into(), text_accent: "#88c0d0".into(),
        text_outside: "#4c566a".into(),
        today_bg: "#88c0d0".into(), today_fg: "#2e3440".into(),
        cursor_bg: "#81a1c1".into(), cursor_fg: "#2e3440".into(),
        period_bg: "#bf616a".into(), period_fg: "#eceff4".into(),
        ovulation: "#b48ead".into(),
        success: "#a3be8c".into(), error: "#bf616a".into(),
    }}

    /// Light palette.
    pub fn rose_pine_dawn() -> Self { Self {
        name: "rose-pine-dawn".into(),
        bg_primary: "#faf4ed".into(), bg_secondary: "#fffaf3".into(), bg_popup: "#f2e9e1".into(),
        bg_shaded: "#f4ede8".into(),
        border_normal: "#dfdad9".into(), border_focused: "#907aa9".into(),
        text_primary: "#575279".into(), text_muted: "#9893a5".into(), text_accent: "#907aa9".into(),
        text_outside: "#cecacd".into(),
        today_bg: "#286983".into(), today_fg: "#faf4ed".into(),
        cursor_bg: "#56949f".into(), cursor_fg: "#faf4ed".into(),
        period_bg: "#b4637a".into(), period_fg: "#faf4ed".into(),
        ovulation: "#d7827e".into(),
        success: "#286983".into(), error: "#b4637a".into(),
    }}
}

impl Default for ThemeConfig {
    fn default() -> Self { Self {
        name: "catppuccin-mocha".into(),
        bg_primary: "#1e1e2e".into(), bg_secondary: "#181825".into(), bg_popup: "#313244".into(),
        bg_shaded: "#24243a".into(),
        border_normal: "#45475a".into(), border_focused: "#89b4fa".into(),
        text_primary: "#cdd6f4".into(), text_muted: "#6c7086".into(), text_accent: "#89b4fa".into(),
        text_outside: "#45475a".into(),
        today_bg: "#cba6f7".into(), today_fg: "#1e1e2e".into(),
        cursor_bg: "#89b4fa".into(), cursor_fg: "#1e1e2e".into(),
        period_bg: "#f38ba8".into(), period_fg: "#1e1e2e".into(),
        ovulation: "#fab387".into(),
        success: "#a6e3a1".into(), error: "#f38ba8".into(),
    }}
}
