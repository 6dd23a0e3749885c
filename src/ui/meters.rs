//! Meter panel rendering.
//!
//! Draws a bordered, titled panel with one row per meter: label, bar and
//! percentage. The panel is sized to its content rather than the terminal.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Padding, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::registry::MeterSet;

/// Width of every bar in cells.
pub const BAR_WIDTH: u16 = 40;

/// Width of the percentage column (`100%`).
const PERCENT_WIDTH: u16 = 4;

const PADDING_X: u16 = 2;
const PADDING_Y: u16 = 1;

/// Visual level of a meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Normal,
    Peak,
    Overload,
}

impl Level {
    /// Classify a fraction against the peak threshold.
    pub fn of(fraction: f64, peak_level: f64) -> Self {
        if fraction > 1.0 {
            Level::Overload
        } else if fraction >= peak_level {
            Level::Peak
        } else {
            Level::Normal
        }
    }
}

/// Bar fill for a fraction: clamped to `[0, 1]`, NaN draws empty.
pub fn bar_ratio(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Percentage text for a fraction, e.g. `0.731` -> ` 73%`.
///
/// Clamped like the bar so the text always fits [`PERCENT_WIDTH`]; overload
/// is shown by the level color instead.
pub fn format_percent(fraction: f64) -> String {
    // abs() folds -0.0, which would print as "-0".
    format!("{:>3.0}%", (bar_ratio(fraction) * 100.0).abs())
}

fn label_width(set: &MeterSet) -> u16 {
    let widest = set
        .meters()
        .iter()
        .map(|m| Span::raw(m.label()).width())
        .max()
        .unwrap_or(0);
    u16::try_from(widest).unwrap_or(u16::MAX)
}

/// Outer size of the panel for a meter set, borders and padding included.
pub fn panel_size(set: &MeterSet) -> (u16, u16) {
    let row_width = label_width(set)
        .saturating_add(1 + BAR_WIDTH + 1 + PERCENT_WIDTH)
        .saturating_add(2 * PADDING_X + 2);
    // Title is drawn as " title " after the corner.
    let title_width = u16::try_from(Span::raw(set.title()).width())
        .unwrap_or(u16::MAX)
        .saturating_add(4);

    let rows = u16::try_from(set.len()).unwrap_or(u16::MAX);
    let height = rows.saturating_add(2 * PADDING_Y + 2);

    (row_width.max(title_width), height)
}

/// Render the meter panel into the top-left corner of `area`.
pub fn render(frame: &mut Frame, set: &MeterSet, theme: &Theme, peak_level: f64, area: Rect) {
    let (width, height) = panel_size(set);
    let panel = Rect::new(area.x, area.y, width.min(area.width), height.min(area.height));

    let mut block = Block::default()
        .title(Line::from(Span::styled(format!(" {} ", set.title()), theme.title)))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .padding(Padding::new(PADDING_X, PADDING_X, PADDING_Y, PADDING_Y));

    if let Some(ref err) = set.stats.last_error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} skipped: {} ", set.stats.skipped, err),
            theme.diagnostic,
        )));
    }

    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let label_width = label_width(set);
    for (row, meter) in set.meters().iter().enumerate() {
        let Ok(offset) = u16::try_from(row) else {
            break;
        };
        let y = inner.y.saturating_add(offset);
        if y >= inner.bottom() {
            break;
        }
        let row_area = Rect::new(inner.x, y, inner.width, 1);

        let columns = Layout::horizontal([
            Constraint::Length(label_width),
            Constraint::Length(1),
            Constraint::Length(BAR_WIDTH),
            Constraint::Length(1),
            Constraint::Length(PERCENT_WIDTH),
        ])
        .split(row_area);

        let level = Level::of(meter.fraction, peak_level);

        frame.render_widget(Paragraph::new(meter.label()).style(theme.label), columns[0]);

        let bar = LineGauge::default()
            .ratio(bar_ratio(meter.fraction))
            .label("")
            .line_set(symbols::line::THICK)
            .filled_style(theme.level_style(level))
            .unfilled_style(Style::default().fg(theme.track));
        frame.render_widget(bar, columns[2]);

        let percent = Paragraph::new(format_percent(meter.fraction))
            .alignment(Alignment::Right)
            .style(theme.level_style(level));
        frame.render_widget(percent, columns[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::meter_set;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(set: &MeterSet, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, set, &Theme::dark(), 0.9, area);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn draw_frame(frame: &mut Frame, set: &MeterSet, theme: &Theme) {
        let area = frame.area();
        render(frame, set, theme, 0.9, area);
    }

    #[test]
    fn test_level_classification() {
        assert_eq!(Level::of(0.5, 0.9), Level::Normal);
        assert_eq!(Level::of(0.9, 0.9), Level::Peak);
        assert_eq!(Level::of(1.0, 0.9), Level::Peak);
        assert_eq!(Level::of(1.01, 0.9), Level::Overload);
        assert_eq!(Level::of(f64::NAN, 0.9), Level::Normal);
    }

    #[test]
    fn test_bar_ratio_clamps() {
        assert_eq!(bar_ratio(0.25), 0.25);
        assert_eq!(bar_ratio(1.5), 1.0);
        assert_eq!(bar_ratio(-0.5), 0.0);
        assert_eq!(bar_ratio(f64::INFINITY), 1.0);
        assert_eq!(bar_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "  0%");
        assert_eq!(format_percent(0.731), " 73%");
        assert_eq!(format_percent(1.0), "100%");
    }

    #[test]
    fn test_format_percent_fits_column() {
        for fraction in [1.5, 10.0, 1e9, -0.2, -1.0, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let text = format_percent(fraction);
            assert_eq!(text.len(), usize::from(PERCENT_WIDTH), "{fraction} -> {text}");
        }
        assert_eq!(format_percent(10.0), "100%");
        assert_eq!(format_percent(-1.0), "  0%");
        assert_eq!(format_percent(f64::NAN), "  0%");
        assert_eq!(format_percent(-0.0), "  0%");
    }

    #[test]
    fn test_panel_size() {
        let set = meter_set(&[r#"["left","right"]"#]);
        // label 5 + gap + bar + gap + percent + padding + borders
        assert_eq!(panel_size(&set), (5 + 1 + 40 + 1 + 4 + 4 + 2, 2 + 2 + 2));
    }

    #[test]
    fn test_panel_size_fits_long_title() {
        let title = "a".repeat(80);
        let line = format!(r#"["{title}:x"]"#);
        let set = meter_set(&[line.as_str()]);
        assert_eq!(panel_size(&set).0, 84);
    }

    #[test]
    fn test_render_shows_title_labels_and_percentages() {
        let set = meter_set(&[r#"["dev1:ch1","dev1:ch2"]"#, "0.5 1.0"]);
        let text = buffer_text(&draw(&set, 80, 8));
        assert!(text.contains(" dev1 "));
        assert!(text.contains("ch1"));
        assert!(text.contains("ch2"));
        assert!(text.contains(" 50%"));
        assert!(text.contains("100%"));
        assert!(!text.contains("dev1:ch1"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let set = meter_set(&[r#"["a","b"]"#, "0.33 0.66"]);
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        let theme = Theme::dark();

        terminal.draw(|f| draw_frame(f, &set, &theme)).unwrap();
        let first = terminal.backend().buffer().clone();
        terminal.draw(|f| draw_frame(f, &set, &theme)).unwrap();
        let second = terminal.backend().buffer().clone();

        assert_eq!(first, second);
    }

    #[test]
    fn test_render_out_of_range_does_not_panic() {
        let set = meter_set(&[r#"["a","b","c","d"]"#, "1.5 -0.2 NaN inf"]);
        let text = buffer_text(&draw(&set, 80, 10));
        assert!(text.contains("100%"));
        assert!(!text.contains("150%"));
        assert!(!text.contains("-20%"));
        assert!(!text.contains("inf"));
    }

    #[test]
    fn test_render_shows_skipped_frame_diagnostic() {
        let set = meter_set(&[r#"["a"]"#, "0.5", "bogus"]);
        let text = buffer_text(&draw(&set, 80, 6));
        assert!(text.contains("1 skipped"));
    }

    #[test]
    fn test_skipped_frame_only_touches_bottom_border() {
        let clean = meter_set(&[r#"["a","b"]"#, "0.5 0.6"]);
        let skipped = meter_set(&[r#"["a","b"]"#, "0.5 0.6", "x y"]);
        let (_, height) = panel_size(&clean);

        let clean_text = buffer_text(&draw(&clean, 80, height + 2));
        let skipped_text = buffer_text(&draw(&skipped, 80, height + 2));
        let clean_rows: Vec<&str> = clean_text.lines().collect();
        let skipped_rows: Vec<&str> = skipped_text.lines().collect();

        let bottom = usize::from(height) - 1;
        for row in (0..clean_rows.len()).filter(|&row| row != bottom) {
            assert_eq!(clean_rows[row], skipped_rows[row], "row {row} changed");
        }
        assert!(skipped_rows[bottom].contains("1 skipped"));
        assert!(!clean_rows[bottom].contains("skipped"));
    }

    #[test]
    fn test_render_in_small_area() {
        let set = meter_set(&[r#"["a","b","c","d","e","f"]"#, "0.1 0.2 0.3 0.4 0.5 0.6"]);
        let text = buffer_text(&draw(&set, 20, 4));
        assert!(text.contains("VU"));
    }
}
