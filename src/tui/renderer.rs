//! TUI rendering logic using ratatui.
//!
//! Draws the ring gauge with its center readout, the metric tiles, the
//! start/stop button and the theme switch.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Block, Borders, Gauge, Paragraph,
    },
    Frame,
};

use super::state::TuiState;
use super::theme::Theme;
use crate::measurements::Measurements;
use crate::speedtest::phase::TestPhase;

/// Minimal mode threshold in columns.
const MINIMAL_MODE_THRESHOLD: u16 = 60;

/// Format a readout with 2 decimal places and no unit.
pub fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format speed value with 2 decimal places.
pub fn format_speed(speed_mbps: f64) -> String {
    format!("{} Mbps", format_value(speed_mbps))
}

/// Format latency value with 2 decimal places.
pub fn format_latency(latency_ms: f64) -> String {
    format!("{} ms", format_value(latency_ms))
}

/// The big number in the middle of the ring and its unit.
///
/// Shows the metric owned by the current phase, or `0.00 Mbps` when no
/// phase is active.
pub fn center_readout(
    phase: TestPhase,
    measurements: &Measurements,
) -> (String, &'static str) {
    match phase {
        TestPhase::Download => (format_value(measurements.download_mbps), "Mbps"),
        TestPhase::Upload => (format_value(measurements.upload_mbps), "Mbps"),
        TestPhase::Ping => (format_value(measurements.ping_ms), "ms"),
        TestPhase::Idle | TestPhase::Done => (format_value(0.0), "Mbps"),
    }
}

/// Caption shown above the progress bar while a phase is active.
pub fn phase_caption(phase: TestPhase) -> Option<&'static str> {
    match phase {
        TestPhase::Download => Some("Testing download speed..."),
        TestPhase::Upload => Some("Testing upload speed..."),
        TestPhase::Ping => Some("Measuring latency..."),
        TestPhase::Idle | TestPhase::Done => None,
    }
}

/// Label of the start/stop button.
pub fn button_label(running: bool) -> &'static str {
    if running {
        "Stop Test"
    } else {
        "Start Test"
    }
}

/// Check if minimal mode should be used based on terminal width.
pub fn is_minimal_mode(width: u16) -> bool {
    width < MINIMAL_MODE_THRESHOLD
}

/// Render the TUI to the terminal.
pub fn render_frame(frame: &mut Frame, state: &TuiState) {
    let theme = Theme::for_mode(state.preferences.dark_mode);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        frame.area(),
    );

    if is_minimal_mode(frame.area().width) {
        render_minimal_frame(frame, state, &theme);
    } else {
        render_normal_frame(frame, state, &theme);
    }
}

fn render_normal_frame(frame: &mut Frame, state: &TuiState, theme: &Theme) {
    let card = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.track))
        .style(Style::default().bg(theme.panel).fg(theme.text));
    let inner = card.inner(frame.area());
    frame.render_widget(card, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title + theme switch
            Constraint::Min(8),    // Ring gauge
            Constraint::Length(6), // Metric tiles
            Constraint::Length(2), // IP type
            Constraint::Length(3), // Button
            Constraint::Length(2), // Phase caption + progress bar
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

    render_header(frame, chunks[0], state, theme);
    render_ring(frame, chunks[1], state, theme);
    render_tiles(frame, chunks[2], state, theme);
    render_ip_type(frame, chunks[3], state, theme);
    render_button(frame, chunks[4], state, theme);
    render_phase_progress(frame, chunks[5], state, theme);
    render_key_hints(frame, chunks[6], theme);
}

/// Render the compact layout for narrow terminals.
pub fn render_minimal_frame(frame: &mut Frame, state: &TuiState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Readout
            Constraint::Length(1), // Progress bar
            Constraint::Length(4), // Metrics
            Constraint::Min(1),    // Button
        ])
        .split(frame.area());

    let (value, unit) = center_readout(state.phase, &state.measurements);
    let readout = Line::from(vec![
        Span::styled(
            format!("{} {}", value, unit),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            phase_caption(state.phase)
                .map(|caption| format!("  {}", caption))
                .unwrap_or_default(),
            Style::default().fg(theme.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(readout), chunks[0]);

    if state.phase.is_active() {
        frame.render_widget(progress_gauge(state, theme), chunks[1]);
    }

    let m = &state.measurements;
    let lines = vec![
        Line::from(format!("Down {}", format_speed(m.download_mbps))),
        Line::from(format!("Up   {}", format_speed(m.upload_mbps))),
        Line::from(format!(
            "Ping {}  Idle {}",
            format_latency(m.ping_ms),
            format_latency(m.idle_latency_ms)
        )),
        Line::from(format!("IP   {}", m.ip_type)),
    ];
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme.text)),
        chunks[2],
    );

    let button = Paragraph::new(format!("[{}]", button_label(state.running)))
        .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    frame.render_widget(button, chunks[3]);
}

/// Render the title and the dark mode switch.
pub fn render_header(frame: &mut Frame, area: Rect, state: &TuiState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(16)])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "Internet Speed Test",
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, chunks[0]);

    let (knob_off, knob_on) = if state.preferences.dark_mode {
        (Style::default().fg(theme.track), Style::default().fg(theme.accent))
    } else {
        (Style::default().fg(theme.accent), Style::default().fg(theme.track))
    };
    let switch = Paragraph::new(Line::from(vec![
        Span::styled("☀ ", Style::default().fg(theme.muted)),
        Span::styled("●", knob_off),
        Span::styled("━", Style::default().fg(theme.track)),
        Span::styled("●", knob_on),
        Span::styled(" ☾", Style::default().fg(theme.muted)),
        Span::styled(
            if state.preferences.dark_mode { " dark" } else { " light" },
            Style::default().fg(theme.muted),
        ),
    ]))
    .alignment(Alignment::Right);
    frame.render_widget(switch, chunks[1]);
}

/// A ring, or the first `fraction` of one, drawn clockwise from 12 o'clock.
struct Ring {
    radius: f64,
    thickness: f64,
    fraction: f64,
    color: Color,
}

impl Shape for Ring {
    fn draw(&self, painter: &mut Painter) {
        const SEGMENTS: usize = 720;
        let filled =
            (SEGMENTS as f64 * self.fraction.clamp(0.0, 1.0)).round() as usize;
        let inner = (self.radius - self.thickness).max(0.0);

        for segment in 0..filled {
            let angle = FRAC_PI_2 - TAU * segment as f64 / SEGMENTS as f64;
            let (sin, cos) = angle.sin_cos();
            let mut r = inner;
            while r <= self.radius {
                if let Some((x, y)) = painter.get_point(r * cos, r * sin) {
                    painter.paint(x, y, self.color);
                }
                r += 0.5;
            }
        }
    }
}

/// Render the ring gauge with the current readout in its center.
pub fn render_ring(frame: &mut Frame, area: Rect, state: &TuiState, theme: &Theme) {
    // Braille dots are square when one unit is one dot: 2 per column, 4 per row.
    let half_width = area.width as f64;
    let half_height = area.height as f64 * 2.0;
    let radius = (half_width.min(half_height) - 1.0).max(1.0);
    let thickness = (radius / 5.0).max(1.0);

    let (value, unit) = center_readout(state.phase, &state.measurements);
    let fraction = state.ring_fraction();

    let canvas = Canvas::default()
        .background_color(theme.panel)
        .marker(Marker::Braille)
        .x_bounds([-half_width, half_width])
        .y_bounds([-half_height, half_height])
        .paint(move |ctx| {
            ctx.draw(&Ring { radius, thickness, fraction: 1.0, color: theme.track });
            ctx.layer();
            ctx.draw(&Ring { radius, thickness, fraction, color: theme.accent });
            ctx.print(
                -(value.chars().count() as f64),
                2.0,
                Line::styled(
                    value.clone(),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ),
            );
            ctx.print(
                -(unit.chars().count() as f64),
                -2.0,
                Line::styled(unit, Style::default().fg(theme.muted)),
            );
        });

    frame.render_widget(canvas, area);
}

fn tile(label: &str, value: String, icon: &str, theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(icon.to_string(), Style::default().fg(theme.accent))),
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(theme.muted).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            value,
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
}

/// Render the four metric tiles in a 2x2 grid.
pub fn render_tiles(frame: &mut Frame, area: Rect, state: &TuiState, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(area);
    let halves = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row)
    };
    let top = halves(rows[0]);
    let bottom = halves(rows[1]);

    let m = &state.measurements;
    frame.render_widget(tile("Download", format_speed(m.download_mbps), "↓", theme), top[0]);
    frame.render_widget(tile("Upload", format_speed(m.upload_mbps), "↑", theme), top[1]);
    frame.render_widget(tile("Ping", format_latency(m.ping_ms), "≋", theme), bottom[0]);
    frame.render_widget(
        tile("Idle Latency", format_latency(m.idle_latency_ms), "≋", theme),
        bottom[1],
    );
}

/// Render the IP type tile.
pub fn render_ip_type(frame: &mut Frame, area: Rect, state: &TuiState, theme: &Theme) {
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            "IP Type",
            Style::default().fg(theme.muted).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            state.measurements.ip_type.to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the start/stop button.
pub fn render_button(frame: &mut Frame, area: Rect, state: &TuiState, theme: &Theme) {
    let icon = if state.running { "■" } else { "▶" };
    let button = Paragraph::new(format!("{} {}", icon, button_label(state.running)))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.panel)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.accent)));
    frame.render_widget(button, area);
}

fn progress_gauge(state: &TuiState, theme: &Theme) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(Style::default().fg(theme.accent).bg(theme.track))
        .ratio(state.ring_fraction())
        .label(format!("{:.0}%", state.progress))
}

/// Render the phase caption and a linear progress bar while a phase is
/// active; nothing otherwise.
pub fn render_phase_progress(frame: &mut Frame, area: Rect, state: &TuiState, theme: &Theme) {
    let Some(caption) = phase_caption(state.phase) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let caption = Paragraph::new(caption)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.muted));
    frame.render_widget(caption, chunks[0]);
    frame.render_widget(progress_gauge(state, theme), chunks[1]);
}

fn render_key_hints(frame: &mut Frame, area: Rect, theme: &Theme) {
    let hints = Paragraph::new("enter start/stop · d theme · q quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.muted));
    frame.render_widget(hints, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::IpType;
    use proptest::prelude::*;
    use proptest::test_runner::Config as ProptestConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render_to_string(state: &TuiState, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| render_frame(frame, state)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.cell((x, y)).unwrap().symbol());
            }
            text.push('\n');
        }
        text
    }

    fn sample_measurements() -> Measurements {
        Measurements {
            download_mbps: 87.254,
            upload_mbps: 31.5,
            ping_ms: 12.0,
            idle_latency_ms: 9.6,
            ip_type: IpType::IPv4,
        }
    }

    #[test]
    fn test_center_readout_per_phase() {
        let m = sample_measurements();
        assert_eq!(center_readout(TestPhase::Download, &m), ("87.25".to_string(), "Mbps"));
        assert_eq!(center_readout(TestPhase::Upload, &m), ("31.50".to_string(), "Mbps"));
        assert_eq!(center_readout(TestPhase::Ping, &m), ("12.00".to_string(), "ms"));
        assert_eq!(center_readout(TestPhase::Idle, &m), ("0.00".to_string(), "Mbps"));
        assert_eq!(center_readout(TestPhase::Done, &m), ("0.00".to_string(), "Mbps"));
    }

    #[test]
    fn test_phase_captions() {
        assert_eq!(phase_caption(TestPhase::Download), Some("Testing download speed..."));
        assert_eq!(phase_caption(TestPhase::Upload), Some("Testing upload speed..."));
        assert_eq!(phase_caption(TestPhase::Ping), Some("Measuring latency..."));
        assert_eq!(phase_caption(TestPhase::Idle), None);
        assert_eq!(phase_caption(TestPhase::Done), None);
    }

    #[test]
    fn test_button_label() {
        assert_eq!(button_label(false), "Start Test");
        assert_eq!(button_label(true), "Stop Test");
    }

    #[test]
    fn test_idle_frame() {
        let rendered = render_to_string(&TuiState::default(), 80, 40);

        assert!(rendered.contains("Internet Speed Test"));
        assert!(rendered.contains("Start Test"));
        assert!(rendered.contains("0.00 Mbps"));
        assert!(rendered.contains("0.00 ms"));
        assert!(rendered.contains("Idle Latency"));
        assert!(rendered.contains("N/A"));
        assert!(!rendered.contains("Testing download speed..."));
    }

    #[test]
    fn test_running_frame() {
        let mut state = TuiState::default();
        state.running = true;
        state.phase = TestPhase::Download;
        state.progress = 42.0;
        state.measurements = sample_measurements();

        let rendered = render_to_string(&state, 80, 40);

        assert!(rendered.contains("Stop Test"));
        assert!(rendered.contains("87.25 Mbps"));
        assert!(rendered.contains("31.50 Mbps"));
        assert!(rendered.contains("12.00 ms"));
        assert!(rendered.contains("9.60 ms"));
        assert!(rendered.contains("IPv4"));
        assert!(rendered.contains("Testing download speed..."));
        assert!(rendered.contains("42%"));
    }

    #[test]
    fn test_dark_mode_uses_dark_background() {
        let mut state = TuiState::default();
        state.preferences.dark_mode = true;

        let backend = TestBackend::new(80, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.cell((1, 1)).unwrap().bg, super::super::theme::DARK.panel);
        let text: String = (0..buffer.area.width)
            .map(|x| buffer.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert!(text.contains("dark"));
    }

    #[test]
    fn test_minimal_frame() {
        let mut state = TuiState::default();
        state.running = true;
        state.phase = TestPhase::Ping;
        state.measurements = sample_measurements();

        let rendered = render_to_string(&state, 40, 10);

        assert!(rendered.contains("12.00 ms"));
        assert!(rendered.contains("Measuring latency..."));
        assert!(rendered.contains("[Stop Test]"));
        assert!(rendered.contains("IPv4"));
    }

    #[test]
    fn test_ring_fill_grows_with_progress() {
        fn accent_cells(progress: f64) -> usize {
            let mut state = TuiState::default();
            state.progress = progress;
            let theme = Theme::for_mode(false);

            let backend = TestBackend::new(40, 20);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|frame| render_ring(frame, frame.area(), &state, &theme))
                .unwrap();

            let buffer = terminal.backend().buffer();
            buffer.content().iter().filter(|cell| cell.fg == theme.accent).count()
        }

        let empty = accent_cells(0.0);
        let half = accent_cells(50.0);
        let full = accent_cells(100.0);

        assert_eq!(empty, 0);
        assert!(half > 0);
        assert!(full > half);
    }

    #[test]
    fn test_minimal_mode_boundary() {
        assert!(!is_minimal_mode(60));
        assert!(is_minimal_mode(59));
        assert!(is_minimal_mode(40));
        assert!(!is_minimal_mode(80));
    }

    proptest! {
        #[test]
        fn prop_speed_formatting_precision(speed in proptest::num::f64::NORMAL) {
            let formatted = format_speed(speed);
            prop_assert!(formatted.ends_with(" Mbps"));
            let numeric_part = formatted.trim_end_matches(" Mbps");
            match numeric_part.find('.') {
                Some(dot_pos) => prop_assert_eq!(numeric_part.len() - dot_pos - 1, 2),
                None => prop_assert!(false, "No decimal point found in formatted speed"),
            }
        }

        #[test]
        fn prop_latency_formatting_precision(latency in proptest::num::f64::NORMAL) {
            let formatted = format_latency(latency);
            prop_assert!(formatted.ends_with(" ms"));
            let numeric_part = formatted.trim_end_matches(" ms");
            match numeric_part.find('.') {
                Some(dot_pos) => prop_assert_eq!(numeric_part.len() - dot_pos - 1, 2),
                None => prop_assert!(false, "No decimal point found in formatted latency"),
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: any state renders without panicking at any size, and
        /// the button label always matches the running flag.
        #[test]
        fn prop_render_any_state(
            running in any::<bool>(),
            progress in 0.0f64..=100.0,
            width in 20u16..120,
            height in 10u16..50,
            dark_mode in any::<bool>(),
        ) {
            let mut state = TuiState::default();
            state.running = running;
            state.phase = if running { TestPhase::Upload } else { TestPhase::Idle };
            state.progress = progress;
            state.preferences.dark_mode = dark_mode;

            let rendered = render_to_string(&state, width, height);
            let label = button_label(running);
            if height >= 40 || is_minimal_mode(width) {
                prop_assert!(rendered.contains(label));
            }
        }
    }
}
