pub mod app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame, Terminal,
};
use tracing::info;

use crate::error::{AppError, Result};
use crate::types::{DomainStats, TraderClass};
use app::{format_share, format_usd, truncate, AppState, Dataset};

/// Browse per-domain stats until the user quits.
pub fn show_domains(stats: &[DomainStats]) -> Result<()> {
    run(AppState::new(
        "Market Census · domains",
        Dataset::Domains(stats.to_vec()),
    ))
}

/// Browse the trader class histogram until the user quits.
pub fn show_traders(counts: &[(TraderClass, u64)]) -> Result<()> {
    run(AppState::new(
        "Market Census · traders",
        Dataset::Traders(counts.to_vec()),
    ))
}

// ---------------------------------------------------------------------------
// Terminal lifecycle
// ---------------------------------------------------------------------------

fn run(mut app: AppState) -> Result<()> {
    info!("[VIEW] Opening interactive view ([q] quit, [Tab] switch panel)");

    enable_raw_mode().map_err(terminal_err)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(terminal_err)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(terminal_err)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal regardless of result
    disable_raw_mode().map_err(terminal_err)?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(terminal_err)?;
    terminal.show_cursor().map_err(terminal_err)?;

    result.map_err(terminal_err)
}

fn terminal_err(e: io::Error) -> AppError {
    AppError::Terminal(e.to_string())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab | KeyCode::Right => app.next_tab(),
                KeyCode::BackTab | KeyCode::Left => app.prev_tab(),
                _ => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    match &app.dataset {
        Dataset::Domains(stats) => {
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);
            render_bars(f, app, halves[0]);
            render_domain_table(f, stats, halves[1]);
        }
        Dataset::Traders(_) => render_bars(f, app, chunks[1]),
    }
    render_footer(f, chunks[2]);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_tabs(f: &mut Frame, app: &AppState, area: Rect) {
    let tabs = Tabs::new(app.tabs().iter().map(|t| Line::from(*t)))
        .select(app.tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(panel(&app.title));
    f.render_widget(tabs, area);
}

fn render_bars(f: &mut Frame, app: &AppState, area: Rect) {
    let specs = app.bars();
    let bars: Vec<Bar> = specs
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.value)
                .text_value(b.text.clone())
                .label(Line::from(truncate(&b.label, 16)))
                .style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        })
        .collect();

    let title = app.tabs().get(app.tab).copied().unwrap_or_default();
    let chart = BarChart::default()
        .block(panel(title))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn render_domain_table(f: &mut Frame, stats: &[DomainStats], area: Rect) {
    let header_cells = ["Domain", "Markets", "Reward/day", "Volume", "Spread/day"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let reward_total: f64 = stats.iter().map(|s| s.daily_reward).sum();
    let rows: Vec<Row> = stats
        .iter()
        .map(|s| {
            let share = if reward_total > 0.0 {
                s.daily_reward / reward_total
            } else {
                0.0
            };
            Row::new(vec![
                Cell::from(s.domain.label()),
                Cell::from(s.market_count.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(format!("{} ({})", format_usd(s.daily_reward), format_share(share)))
                    .style(Style::default().fg(Color::Green)),
                Cell::from(format_usd(s.total_volume)),
                Cell::from(format_usd(s.est_spread_revenue)).style(Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(22),
            Constraint::Length(18),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(panel("DOMAINS"));
    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[Tab / ←→] ", Style::default().fg(Color::Yellow)),
        Span::raw("switch panel"),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
