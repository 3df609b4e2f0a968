mod app;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use stockout_insights::types::StockStatus;

use app::{format_date, series_fields, truncate, AppState, ConnectionStatus, InputMode};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let Some(path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RESULTS_PATH").ok())
        .map(PathBuf::from)
    else {
        eprintln!("usage: tui <results.json>  (or set RESULTS_PATH)");
        std::process::exit(2);
    };
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let (rows, summary) = app::load_results(&path)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build HTTP client");

    let mut app = AppState::new(rows, summary, base_url);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut table_state = TableState::default();

    let result = run_loop(&mut terminal, &mut app, &client, &mut table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    table_state: &mut TableState,
) -> io::Result<()> {
    loop {
        table_state.select(app.selected);
        terminal.draw(|f| render(f, app, table_state))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            InputMode::Search => match key.code {
                KeyCode::Esc | KeyCode::Enter => app.mode = InputMode::Browse,
                KeyCode::Backspace => app.pop_query_char(),
                KeyCode::Char(c) => app.push_query_char(c),
                _ => {}
            },
            InputMode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                KeyCode::Char('/') => app.mode = InputMode::Search,
                KeyCode::Char('s') | KeyCode::Char('S') => app.toggle_sort(),
                KeyCode::Char('c') | KeyCode::Esc => app.clear_query(),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                KeyCode::Enter => app.fetch_selected(client).await,
                _ => {}
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, table_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | search | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // search
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_search(f, app, chunks[1]);
    render_body(f, app, table_state, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Idle => ("○ idle".to_string(), Color::DarkGray),
        ConnectionStatus::Loaded => ("● insights loaded".to_string(), Color::Green),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let visible = app.visible_rows().len();
    let sort_label = match app.sort.arrow() {
        "" => "unsorted".to_string(),
        arrow => format!("days left {arrow}"),
    };

    let spans = vec![
        Span::styled(
            " Stockout Insights  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("{visible}/{} rows", app.rows.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(sort_label, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(
            truncate(app.summary.as_deref().unwrap_or("—"), 40),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_search(f: &mut Frame, app: &AppState, area: Rect) {
    let searching = app.mode == InputMode::Search;
    let border_color = if searching { Color::Yellow } else { Color::DarkGray };
    let cursor = if searching { "▏" } else { "" };

    let line = Line::from(vec![
        Span::styled(" / ", Style::default().fg(Color::Yellow)),
        Span::raw(format!("{}{cursor}", app.query)),
    ]);
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(" SEARCH ", Style::default().fg(Color::Cyan))),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, table_state: &mut TableState, area: Rect) {
    // Horizontal split: results (60%) | insights (40%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_results_table(f, app, table_state, halves[0]);
    render_insights(f, app, halves[1]);
}

fn status_color(status: StockStatus) -> Color {
    match status {
        StockStatus::Understock => Color::Red,
        StockStatus::Fine => Color::Green,
        StockStatus::Overstock => Color::Yellow,
    }
}

fn render_results_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let days_header = format!("Days {}", app.sort.arrow());
    let header_cells = ["ID", "Product", "Category", days_header.as_str(), "Stockout"]
        .into_iter()
        .map(|h| {
            Cell::from(h.to_string())
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        });
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .visible_rows()
        .into_iter()
        .map(|r| {
            let id = r.product_id.as_ref().map_or("—".to_string(), |p| p.to_string());
            let status = StockStatus::from_days_left(r.days_left);
            Row::new(vec![
                Cell::from(id).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(r.product_name.as_deref().unwrap_or("—"), 28)),
                Cell::from(truncate(r.category.as_deref().unwrap_or("—"), 14)),
                Cell::from(r.days_left.to_string()).style(Style::default().fg(status_color(status))),
                Cell::from(format_date(r.stockout_date)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(14),
            Constraint::Length(7),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " FORECAST RESULTS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, state);
}

fn render_insights(f: &mut Frame, app: &AppState, area: Rect) {
    let label = |s: &str| Span::styled(format!("{s:<16}"), Style::default().fg(Color::DarkGray));

    let lines: Vec<Line> = match &app.detail {
        None => vec![Line::from(Span::styled(
            " Select a row and press Enter",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(d) => {
            let avg_sales = d.avg_daily_sales.map_or("—".to_string(), |v| format!("{v:.2}"));

            let mut lines = vec![
                Line::from(Span::styled(
                    truncate(d.product_name.as_deref().unwrap_or("—"), 36),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![label("Category"), Span::raw(d.category.clone().unwrap_or_default())]),
                Line::from(vec![
                    label("Status"),
                    Span::styled(d.stock_status.to_string(), Style::default().fg(status_color(d.stock_status))),
                ]),
                Line::from(vec![label("Days left"), Span::raw(d.days_left.to_string())]),
                Line::from(vec![label("Stockout date"), Span::raw(format_date(d.predicted_stockout_date))]),
                Line::from(vec![label("Avg daily sales"), Span::raw(avg_sales)]),
                Line::from(""),
            ];
            lines.extend(
                series_fields(&d.insights)
                    .into_iter()
                    .map(|(name, value)| Line::from(vec![label(name), Span::styled(value, Style::default().fg(Color::Cyan))])),
            );
            lines
        }
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " INSIGHTS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let line = match app.mode {
        InputMode::Search => Line::from(vec![
            Span::styled(" [type] ", Style::default().fg(Color::Yellow)),
            Span::raw("filter  "),
            Span::styled("[Enter / Esc] ", Style::default().fg(Color::Yellow)),
            Span::raw("done"),
        ]),
        InputMode::Browse => Line::from(vec![
            Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
            Span::raw("quit  "),
            Span::styled("[/] ", Style::default().fg(Color::Yellow)),
            Span::raw("search  "),
            Span::styled("[s] ", Style::default().fg(Color::Yellow)),
            Span::raw("sort days left  "),
            Span::styled("[c] ", Style::default().fg(Color::Yellow)),
            Span::raw("clear  "),
            Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
            Span::raw("scroll  "),
            Span::styled("[Enter] ", Style::default().fg(Color::Yellow)),
            Span::raw("insights"),
        ]),
    };
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
