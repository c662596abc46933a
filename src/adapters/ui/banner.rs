//! Gradient ASCII banner (FINBOT) shown when the console chat starts.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Banknote green (#2e8b57).
const NOTE_GREEN: (u8, u8, u8) = (0x2e, 0x8b, 0x57);
/// Coin gold (#ffd700).
const COIN_GOLD: (u8, u8, u8) = (0xff, 0xd7, 0x00);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Figlet rendering of `text`, or `text` itself when the font is unavailable.
fn render_title(text: &str) -> String {
    let font = FIGfont::standard().ok();
    font.as_ref()
        .and_then(|f| f.convert(text))
        .map(|figure| figure.to_string())
        .unwrap_or_else(|| text.to_string())
}

/// Prints "FINBOT" in the standard figlet font with a green-to-gold gradient, then the version.
/// Falls back to a plain title if the font cannot be rendered.
pub fn print_welcome() {
    let mut out = stdout();
    let art = render_title("FINBOT");
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(NOTE_GREEN, COIN_GOLD, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: COIN_GOLD.0,
        g: COIN_GOLD.1,
        b: COIN_GOLD.2,
    }));
    let _ = out.execute(Print(format!("v{} personal finance console\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_rgb(NOTE_GREEN, COIN_GOLD, 0.0), NOTE_GREEN);
        assert_eq!(lerp_rgb(NOTE_GREEN, COIN_GOLD, 1.0), COIN_GOLD);
        assert_eq!(lerp_rgb((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
    }

    #[test]
    fn test_render_title_is_multiline_art() {
        let art = render_title("FINBOT");
        assert!(art.lines().count() > 1);
        assert_ne!(art.trim(), "FINBOT");
    }
}
