//! Terminal rendering: indicator lines, band tables, JSON.
//!
//! The indicator line is the presentation layer for `watch` and `check`.
//! Strength bars and colors come from the band's rank within the table,
//! so user-defined band names render sensibly without extra settings.

use std::io::{self, IsTerminal, Write};

use chrono::Local;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use linkwatch_core::{BandTable, DisplayState, ERROR_BAND, NO_CONNECTION_BAND};

use crate::cli::ColorMode;

const BARS: [&str; 4] = ["▂   ", "▂▄  ", "▂▄▆ ", "▂▄▆█"];
const NO_LINK: &str = "  ✗ ";
const NO_ASSOC: &str = "  - ";

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Indicator ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Bad,
    Weak,
    Fair,
    Good,
}

/// Glyph and tone for a band name.
fn style_for(band: &str, bands: &BandTable) -> (&'static str, Tone) {
    match band {
        ERROR_BAND => (NO_LINK, Tone::Bad),
        NO_CONNECTION_BAND => (NO_ASSOC, Tone::Weak),
        _ => {
            let levels: Vec<&str> = bands
                .iter()
                .map(|b| b.name.as_str())
                .filter(|n| *n != ERROR_BAND && *n != NO_CONNECTION_BAND)
                .collect();
            let rank = levels.iter().position(|n| *n == band).unwrap_or(0);
            let bars = scale(rank, levels.len(), BARS.len());
            let tone = match bars {
                0 => Tone::Weak,
                b if b + 1 == BARS.len() => Tone::Good,
                _ => Tone::Fair,
            };
            (BARS.get(bars).copied().unwrap_or(BARS[0]), tone)
        }
    }
}

/// Map `rank` of `count` onto `0..slots`, lowest to 0 and highest to the
/// last slot.
fn scale(rank: usize, count: usize, slots: usize) -> usize {
    if count <= 1 || slots == 0 {
        return slots.saturating_sub(1);
    }
    (rank * (slots - 1) + (count - 1) / 2) / (count - 1)
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match tone {
        Tone::Bad => text.red().bold().to_string(),
        Tone::Weak => text.yellow().to_string(),
        Tone::Fair => text.cyan().to_string(),
        Tone::Good => text.green().bold().to_string(),
    }
}

/// One status line: local time, strength glyph, band, tooltip.
pub fn indicator_line(state: &DisplayState, bands: &BandTable, color: bool) -> String {
    let (glyph, tone) = style_for(&state.band, bands);
    let time = state.resolved_at.with_timezone(&Local).format("%H:%M:%S");
    let time = if color {
        time.to_string().dimmed().to_string()
    } else {
        time.to_string()
    };
    format!(
        "{time} {} {}  {}",
        paint(glyph, tone, color),
        paint(&format!("{:<8}", state.band), tone, color),
        state.tooltip
    )
}

// ── Band table ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BandRow {
    #[tabled(rename = "Threshold")]
    threshold: i64,
    #[tabled(rename = "Band")]
    name: String,
    #[tabled(rename = "Icon")]
    icon: String,
    #[tabled(rename = "Sound")]
    sound: String,
}

fn handle_or_dash(path: Option<&std::path::Path>) -> String {
    path.map_or_else(|| "-".into(), |p| p.display().to_string())
}

pub fn render_bands(bands: &BandTable) -> String {
    let rows: Vec<BandRow> = bands
        .iter()
        .map(|b| BandRow {
            threshold: b.threshold,
            name: b.name.clone(),
            icon: handle_or_dash(b.presentation.icon.as_deref()),
            sound: handle_or_dash(b.presentation.sound.as_deref()),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Structured ───────────────────────────────────────────────────────

/// Pretty-printed JSON.
pub fn render_json_pretty<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
    let _ = stdout.flush();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use linkwatch_core::{NoResources, Presentation};

    use super::*;

    fn table() -> BandTable {
        let spec = "-2:error, -1:nocon, 0:low, 16:medium, 35:high".parse().unwrap();
        BandTable::compile(&spec, &NoResources).unwrap()
    }

    fn state(band: &str, tooltip: &str) -> DisplayState {
        DisplayState {
            band: band.into(),
            tooltip: tooltip.into(),
            presentation: Presentation::default(),
            level: None,
            resolved_at: Utc::now(),
        }
    }

    #[test]
    fn scale_spreads_ranks_over_slots() {
        assert_eq!(scale(0, 3, 4), 0);
        assert_eq!(scale(1, 3, 4), 2);
        assert_eq!(scale(2, 3, 4), 3);
        assert_eq!(scale(0, 1, 4), 3);
    }

    #[test]
    fn level_bands_get_bars() {
        let bands = table();
        assert_eq!(style_for("low", &bands), (BARS[0], Tone::Weak));
        assert_eq!(style_for("medium", &bands), (BARS[2], Tone::Fair));
        assert_eq!(style_for("high", &bands), (BARS[3], Tone::Good));
        assert_eq!(style_for("error", &bands), (NO_LINK, Tone::Bad));
        assert_eq!(style_for("nocon", &bands), (NO_ASSOC, Tone::Weak));
    }

    #[test]
    fn plain_indicator_has_no_escape_codes() {
        let line = indicator_line(&state("high", "SNR: 22 / Q: 45%"), &table(), false);
        assert!(line.contains("high"));
        assert!(line.ends_with("SNR: 22 / Q: 45%"));
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn colored_indicator_has_escape_codes() {
        let line = indicator_line(&state("error", "ERR: url timed out"), &table(), true);
        assert!(line.contains('\u{1b}'));
        assert!(line.contains("ERR: url timed out"));
    }

    #[test]
    fn band_table_lists_every_band() {
        let out = render_bands(&table());
        for name in ["error", "nocon", "low", "medium", "high"] {
            assert!(out.contains(name), "{name} missing from:\n{out}");
        }
    }
}
