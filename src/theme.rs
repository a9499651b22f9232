//! Dark theme for the bank window and the palette the view reads from.
//!
//! `apply_bank_theme` writes gpui-component's `Theme` global, then syncs
//! [`BankColors`] so render code can call `colors().accent_blue` without a
//! context.

use std::sync::RwLock;

use gpui::*;
use gpui_component::theme::{ActiveTheme, Theme, ThemeMode};

#[derive(Debug, Clone, Copy)]
pub struct BankColors {
    pub bg_page: Hsla,
    pub bg_card: Hsla,
    pub bg_input: Hsla,
    pub bg_disabled: Hsla,
    pub text_primary: Hsla,
    pub text_muted: Hsla,
    pub text_dim: Hsla,
    pub text_on_accent: Hsla,
    pub accent_blue: Hsla,
    pub accent_red: Hsla,
    pub border_subtle: Hsla,
}

static COLORS: RwLock<Option<BankColors>> = RwLock::new(None);

impl Default for BankColors {
    fn default() -> Self {
        Self {
            bg_page: hex_color("#121417"),
            bg_card: hex_color("#1c1f24"),
            bg_input: hex_color("#15171b"),
            bg_disabled: hex_color("#2a2e35"),
            text_primary: hex_color("#f5f5f5"),
            text_muted: hex_color("#a3a8b0"),
            text_dim: hex_color("#737880"),
            text_on_accent: hex_color("#ffffff"),
            accent_blue: hex_color("#0070f3"),
            accent_red: hex_color("#e63946"),
            border_subtle: hex_color("#2f333a"),
        }
    }
}

impl BankColors {
    pub fn sync(cx: &App) {
        let theme = cx.theme();
        let defaults = Self::default();
        let palette = Self {
            bg_page: theme.background,
            bg_card: theme.muted,
            bg_disabled: theme.secondary_active,
            text_primary: theme.foreground,
            text_muted: theme.muted_foreground,
            accent_blue: theme.primary,
            accent_red: theme.danger,
            border_subtle: theme.border,
            ..defaults
        };
        *COLORS.write().unwrap_or_else(|p| p.into_inner()) = Some(palette);
    }
}

pub fn colors() -> BankColors {
    COLORS
        .read()
        .unwrap_or_else(|p| p.into_inner())
        .unwrap_or_default()
}

pub fn apply_bank_theme(cx: &mut App) {
    Theme::change(ThemeMode::Dark, None, cx);

    let c = BankColors::default();
    let theme = Theme::global_mut(cx);

    theme.background = c.bg_page;
    theme.foreground = c.text_primary;
    theme.border = c.border_subtle;
    theme.muted = c.bg_card;
    theme.muted_foreground = c.text_muted;

    theme.primary = c.accent_blue;
    theme.primary_foreground = c.text_on_accent;
    theme.primary_hover = hex_color("#1a82f7");
    theme.primary_active = hex_color("#005fd0");

    theme.secondary = c.bg_card;
    theme.secondary_foreground = c.text_primary;
    theme.secondary_hover = hex_color("#24282e");
    theme.secondary_active = c.bg_disabled;

    theme.input = hex_color("#3a3f47");
    theme.ring = c.accent_blue;

    theme.popover = c.bg_card;
    theme.popover_foreground = c.text_primary;

    theme.danger = c.accent_red;
    theme.danger_foreground = c.text_on_accent;
    theme.danger_hover = hex_color("#ec5662");
    theme.danger_active = hex_color("#c92f3b");

    BankColors::sync(cx);
}

/// Parse `#rrggbb` or `#rrggbbaa`. Anything else is opaque black.
pub fn hex_color(hex: &str) -> Hsla {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>, fallback: u8| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(fallback)
    };

    let (r, g, b, a) = match hex.len() {
        6 => (channel(0..2, 0), channel(2..4, 0), channel(4..6, 0), 255u8),
        8 => (
            channel(0..2, 0),
            channel(2..4, 0),
            channel(4..6, 0),
            channel(6..8, 255),
        ),
        _ => (0, 0, 0, 255),
    };

    rgba((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::prelude::v1::test;

    #[test]
    fn parses_rgb_and_rgba() {
        let blue = hex_color("#0070f3");
        assert_eq!(blue.a, 1.0);
        assert_eq!(Hsla::from(rgba(0x0070f3ff)), blue);

        let translucent = hex_color("#00000080");
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-3);
    }

    #[test]
    fn malformed_hex_falls_back_to_black() {
        assert_eq!(hex_color("#zz"), Hsla::from(rgba(0x000000ff)));
        assert_eq!(hex_color("nothex"), Hsla::from(rgba(0x000000ff)));
    }
}
