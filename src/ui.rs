use anyhow::Result;
use cert_tracker::{
    apply_view, expiration_badge, import_text, renewal_note, summarize, write_export,
    BadgeSeverity, BlobStorage, Field, FilterCriteria, ImportFormat, Record, RecordFields,
    RecordStore, SortKey, Status, LEVEL_CHOICES,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Filters,
    Dialog,
    ConfirmDelete(String),
    ConfirmReset,
    ImportPrompt,
}

/// Add/edit form: one text value per schema field
#[derive(Debug, Clone)]
pub struct Draft {
    pub title: &'static str,
    pub values: Vec<String>,
    pub focus: usize,
}

impl Draft {
    fn from_fields(title: &'static str, fields: &RecordFields) -> Self {
        Draft {
            title,
            values: Field::ALL.iter().map(|f| fields.get(*f)).collect(),
            focus: 0,
        }
    }

    fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    fn to_fields(&self) -> RecordFields {
        let mut fields = RecordFields::default();
        for (field, value) in Field::ALL.iter().zip(&self.values) {
            fields.set(*field, value);
        }
        fields.trimmed()
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.values.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + self.values.len() - 1) % self.values.len();
    }

    /// Level and status cycle through their picker choices
    fn cycle_choice(&mut self, forward: bool) {
        let statuses: Vec<&str> = Status::ALL.iter().map(|s| s.label()).collect();
        let choices: &[&str] = match self.focused_field() {
            Field::Level => &LEVEL_CHOICES,
            Field::Status => &statuses,
            _ => return,
        };

        let current = &self.values[self.focus];
        let next = match choices.iter().position(|c| c == current) {
            Some(i) if forward => (i + 1) % choices.len(),
            Some(i) => (i + choices.len() - 1) % choices.len(),
            None => 0,
        };
        self.values[self.focus] = choices[next].to_string();
    }
}

enum FilterItem {
    Level(&'static str),
    Status(Status),
}

fn filter_items() -> Vec<FilterItem> {
    LEVEL_CHOICES
        .iter()
        .map(|l| FilterItem::Level(*l))
        .chain(Status::ALL.iter().map(|s| FilterItem::Status(*s)))
        .collect()
}

pub struct App<S: BlobStorage> {
    pub store: RecordStore<S>,
    pub criteria: FilterCriteria,
    pub sort: Option<SortKey>,
    pub visible: Vec<Record>,
    pub state: TableState,
    pub mode: Mode,
    pub show_detail: bool,
    pub draft: Option<Draft>,
    pub filter_cursor: usize,
    pub input: String,
    pub message: Option<String>,
    pub export_dir: PathBuf,
}

impl<S: BlobStorage> App<S> {
    pub fn new(store: RecordStore<S>, export_dir: PathBuf) -> Self {
        let mut app = Self {
            store,
            criteria: FilterCriteria::default(),
            sort: None,
            visible: Vec::new(),
            state: TableState::default(),
            mode: Mode::Browse,
            show_detail: false,
            draft: None,
            filter_cursor: 0,
            input: String::new(),
            message: None,
            export_dir,
        };
        app.refresh();
        app
    }

    /// Recompute the table from the store: sort(filter(list()))
    pub fn refresh(&mut self) {
        let selected_id = self.selected_record().map(|r| r.id.clone());
        self.visible = apply_view(self.store.list(), &self.criteria, self.sort);

        let index = selected_id
            .and_then(|id| self.visible.iter().position(|r| r.id == id))
            .or(if self.visible.is_empty() { None } else { Some(0) });
        self.state.select(index);
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.state.selected().and_then(|i| self.visible.get(i))
    }

    pub fn cycle_sort(&mut self) {
        self.sort = match self.sort {
            None => Some(SortKey::Name),
            Some(SortKey::Name) => Some(SortKey::Code),
            Some(SortKey::Code) => Some(SortKey::DatePassed),
            Some(SortKey::DatePassed) => Some(SortKey::Expiration),
            Some(SortKey::Expiration) => None,
        };
        self.refresh();
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    pub fn open_add_dialog(&mut self) {
        let fields = self.store.begin_create();
        self.draft = Some(Draft::from_fields("Add Certification/Exam", &fields));
        self.mode = Mode::Dialog;
    }

    pub fn open_edit_dialog(&mut self) {
        let Some(id) = self.selected_record().map(|r| r.id.clone()) else {
            return;
        };
        match self.store.begin_edit(&id) {
            Ok(fields) => {
                self.draft = Some(Draft::from_fields("Edit Item", &fields));
                self.mode = Mode::Dialog;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn save_dialog(&mut self) {
        let Some(fields) = self.draft.as_ref().map(Draft::to_fields) else {
            return;
        };
        match self.store.save_draft(fields) {
            Ok(record) => {
                self.message = Some(format!("Saved {}", record.name));
                self.draft = None;
                self.mode = Mode::Browse;
                self.refresh();
                if let Some(i) = self.visible.iter().position(|r| r.id == record.id) {
                    self.state.select(Some(i));
                }
            }
            // dialog stays open
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn cancel_dialog(&mut self) {
        self.store.cancel_edit();
        self.draft = None;
        self.mode = Mode::Browse;
    }

    pub fn delete(&mut self, id: &str) {
        match self.store.delete(id) {
            Ok(_) => self.message = Some("Deleted".to_string()),
            Err(e) => self.message = Some(e.to_string()),
        }
        self.refresh();
    }

    pub fn reset(&mut self) {
        match self.store.clear() {
            Ok(()) => self.message = Some("All data cleared".to_string()),
            Err(e) => self.message = Some(e.to_string()),
        }
        self.refresh();
    }

    pub fn export(&mut self) {
        self.message = Some(match write_export(self.store.list(), &self.export_dir) {
            Ok(path) => format!("Exported {} records to {}", self.store.len(), path.display()),
            Err(e) => format!("Export failed: {:#}", e),
        });
    }

    /// Import from the prompt: pasted JSON (starts with `[` or `{`) or a file path
    pub fn import_from_input(&mut self) {
        let input = std::mem::take(&mut self.input);
        let input = input.trim();
        self.mode = Mode::Browse;

        if input.is_empty() {
            return;
        }

        let (text, format, origin) = if input.starts_with('[') || input.starts_with('{') {
            (input.to_string(), ImportFormat::Json, "pasted text".to_string())
        } else {
            let path = PathBuf::from(input);
            match std::fs::read_to_string(&path) {
                Ok(text) => (text, ImportFormat::from_path(&path), path.display().to_string()),
                Err(e) => {
                    self.message = Some(format!("Import failed: {}", e));
                    return;
                }
            }
        };

        self.message = Some(match import_text(&mut self.store, &text, format) {
            Ok(summary) if summary.skipped > 0 => format!(
                "Imported {} records ({} without a name skipped)",
                summary.imported, summary.skipped
            ),
            Ok(summary) => format!("Imported {} records", summary.imported),
            Err(e) => {
                warn!(error = %e, origin = %origin, "import failed");
                format!("Import failed: {}", e)
            }
        });
        self.refresh();
    }

    fn toggle_filter_item(&mut self) {
        match filter_items().get(self.filter_cursor) {
            Some(FilterItem::Level(level)) => self.criteria.toggle_level(level),
            Some(FilterItem::Status(status)) => self.criteria.toggle_status(status.label()),
            None => {}
        }
        self.refresh();
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode.clone() {
            Mode::Browse => return self.handle_browse_key(key),
            Mode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Backspace => {
                    self.criteria.query.pop();
                    self.refresh();
                }
                KeyCode::Char(c) => {
                    self.criteria.query.push(c);
                    self.refresh();
                }
                _ => {}
            },
            Mode::Filters => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('f') => self.mode = Mode::Browse,
                KeyCode::Down | KeyCode::Char('j') => {
                    self.filter_cursor = (self.filter_cursor + 1) % filter_items().len();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    let len = filter_items().len();
                    self.filter_cursor = (self.filter_cursor + len - 1) % len;
                }
                KeyCode::Char(' ') => self.toggle_filter_item(),
                _ => {}
            },
            Mode::Dialog => self.handle_dialog_key(key),
            Mode::ConfirmDelete(id) => {
                if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
                    self.delete(&id);
                }
                self.mode = Mode::Browse;
            }
            Mode::ConfirmReset => {
                if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
                    self.reset();
                }
                self.mode = Mode::Browse;
            }
            Mode::ImportPrompt => match key.code {
                KeyCode::Esc => {
                    self.input.clear();
                    self.mode = Mode::Browse;
                }
                KeyCode::Enter => self.import_from_input(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
        }
        false
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Enter => self.show_detail = !self.show_detail,
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('f') => self.mode = Mode::Filters,
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('c') => {
                self.criteria = FilterCriteria::default();
                self.refresh();
            }
            KeyCode::Char('a') => self.open_add_dialog(),
            KeyCode::Char('e') => self.open_edit_dialog(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_record().map(|r| r.id.clone()) {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('i') => self.mode = Mode::ImportPrompt,
            KeyCode::Char('R') => self.mode = Mode::ConfirmReset,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => {
                if !self.visible.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.visible.is_empty() {
                    self.state.select(Some(self.visible.len() - 1));
                }
            }
            _ => {}
        }
        false
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.cancel_dialog();
            return;
        }
        if key.code == KeyCode::Enter {
            self.save_dialog();
            return;
        }

        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => draft.next_field(),
            KeyCode::BackTab | KeyCode::Up => draft.previous_field(),
            KeyCode::Right => draft.cycle_choice(true),
            KeyCode::Left => draft.cycle_choice(false),
            KeyCode::Backspace => {
                draft.values[draft.focus].pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                draft.values[draft.focus].push(c);
            }
            _ => {}
        }
    }
}

pub fn run_ui<S: BlobStorage>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: BlobStorage>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui<S: BlobStorage>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary cards
            Constraint::Length(3), // Search + filters
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_search(f, chunks[1], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[2]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[2], app);
    }

    render_status_bar(f, chunks[3], app);

    match app.mode.clone() {
        Mode::Filters => render_filters(f, app),
        Mode::Dialog => render_dialog(f, app),
        Mode::ConfirmDelete(id) => {
            let name = app.store.get(&id).map(|r| r.name.clone()).unwrap_or_default();
            render_confirm(f, " Delete ", &format!("Delete \"{}\"? (y/n)", name));
        }
        Mode::ConfirmReset => {
            render_confirm(f, " Reset ", "Clear all data in this tracker? (y/n)")
        }
        Mode::ImportPrompt => render_import_prompt(f, app),
        Mode::Browse | Mode::Search => {}
    }
}

fn render_header<S: BlobStorage>(f: &mut Frame, area: Rect, app: &App<S>) {
    let summary = summarize(app.store.list());

    let cards = [
        ("Total", summary.total, Color::White),
        ("Active", summary.active, Color::Green),
        ("Scheduled", summary.scheduled, Color::Cyan),
        ("Expired", summary.expired, Color::Red),
        ("Retired", summary.retired, Color::DarkGray),
    ];

    let mut spans = vec![];
    for (i, (label, count, color)) in cards.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  │  "));
        }
        spans.push(Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            count.to_string(),
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        ));
    }

    if app.store.is_seeded() {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            "example data (not saved yet)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Certification & Exam Tracker "),
    );

    f.render_widget(header, area);
}

fn render_search<S: BlobStorage>(f: &mut Frame, area: Rect, app: &App<S>) {
    let searching = app.mode == Mode::Search;

    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(Color::Cyan)),
        Span::raw(app.criteria.query.clone()),
    ];
    if searching {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    spans.push(Span::raw("   "));
    spans.push(Span::styled("Sort: ", Style::default().fg(Color::Cyan)));
    spans.push(Span::raw(app.sort.map_or("Stored order", |k| k.title())));

    let restrictions: Vec<&str> = app
        .criteria
        .levels
        .iter()
        .chain(app.criteria.statuses.iter())
        .map(String::as_str)
        .collect();
    if !restrictions.is_empty() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled("Filters: ", Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(restrictions.join(", "), Style::default().fg(Color::Green)));
    }

    let border = if searching { Color::Yellow } else { Color::White };
    let search = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border)));

    f.render_widget(search, area);
}

fn status_color(status: &str) -> Color {
    match Status::from_label(status) {
        Some(Status::Planned) => Color::White,
        Some(Status::Scheduled) => Color::Cyan,
        Some(Status::PassedActive) => Color::Green,
        Some(Status::PassedExpired) => Color::Red,
        Some(Status::Retired) => Color::DarkGray,
        None => Color::Magenta,
    }
}

fn severity_color(severity: BadgeSeverity) -> Color {
    match severity {
        BadgeSeverity::Danger => Color::Red,
        BadgeSeverity::Warn => Color::Yellow,
        BadgeSeverity::Ok => Color::Green,
    }
}

fn render_table<S: BlobStorage>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let header_cells = [
        "Level", "Name", "Code(s)", "Status", "Passed", "Expires", "Left", "Domain", "Src",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible.iter().map(|record| {
        let badge = match expiration_badge(record) {
            Some(badge) => Cell::from(badge.label.clone())
                .style(Style::default().fg(severity_color(badge.severity))),
            None => Cell::from(""),
        };

        let cells = vec![
            Cell::from(record.level.clone()),
            Cell::from(truncate(&record.name, 40)),
            Cell::from(record.codes.clone()),
            Cell::from(record.status.clone()).style(Style::default().fg(status_color(&record.status))),
            Cell::from(record.date_passed.clone()),
            Cell::from(record.expiration.clone()),
            badge,
            Cell::from(truncate(&record.domain, 22)),
            Cell::from(if record.source.is_empty() { "" } else { "link" }),
        ];

        Row::new(cells).height(1)
    });

    let title = format!(" Certifications ({} of {}) ", app.visible.len(), app.store.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Min(24),
            Constraint::Length(14),
            Constraint::Length(17),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(14),
            Constraint::Length(24),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar<S: BlobStorage>(f: &mut Frame, area: Rect, app: &App<S>) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.visible.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.message {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
        spans.push(Span::raw(" "));
    }

    let hints: &[(&str, &str)] = match app.mode {
        Mode::Search => &[("Enter/Esc", "Done")],
        Mode::Dialog => &[("Tab", "Next"), ("←/→", "Choice"), ("Enter", "Save"), ("Esc", "Cancel")],
        _ => &[
            ("a", "Add"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("/", "Search"),
            ("f", "Filter"),
            ("s", "Sort"),
            ("i", "Import"),
            ("x", "Export"),
            ("R", "Reset"),
            ("q", "Quit"),
        ],
    };
    for (key, action) in hints {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {} ", action)));
    }

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel<S: BlobStorage>(f: &mut Frame, area: Rect, app: &App<S>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Details ");

    let Some(record) = app.selected_record() else {
        f.render_widget(Paragraph::new("No record selected").block(block), area);
        return;
    };

    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("  Name: "), Span::raw(record.name.as_str())]),
        Line::from(vec![label("  Code(s): "), Span::raw(record.codes.as_str())]),
        Line::from(vec![label("  Level: "), Span::raw(record.level.as_str())]),
        Line::from(vec![
            label("  Status: "),
            Span::styled(record.status.as_str(), Style::default().fg(status_color(&record.status))),
        ]),
        Line::from(""),
        Line::from(vec![label("  Date passed: "), Span::raw(record.date_passed.as_str())]),
        Line::from(vec![label("  Expiration: "), Span::raw(record.expiration.as_str())]),
        Line::from(vec![
            label("  Renewal: "),
            Span::raw(format!("{} (every {} months)", renewal_note(record), record.renewal)),
        ]),
        Line::from(""),
        Line::from(vec![label("  Domain: "), Span::raw(record.domain.as_str())]),
        Line::from(vec![
            label("  Source: "),
            Span::styled(record.source.as_str(), Style::default().fg(Color::Blue)),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![Span::styled(
            "  NOTES",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    let width = area.width.saturating_sub(6).max(10) as usize;
    for line in wrap_text(&record.notes, width) {
        content.push(Line::from(Span::styled(
            format!("  {}", line),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_filters<S: BlobStorage>(f: &mut Frame, app: &App<S>) {
    let area = centered_rect(40, 60, f.size());

    let mut content = vec![Line::from(Span::styled(
        "  Levels",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];

    for (i, item) in filter_items().iter().enumerate() {
        let (name, checked) = match item {
            FilterItem::Level(level) => (*level, app.criteria.levels.iter().any(|l| l == level)),
            FilterItem::Status(status) => {
                (status.label(), app.criteria.statuses.iter().any(|s| s == status.label()))
            }
        };

        if i == LEVEL_CHOICES.len() {
            content.push(Line::from(""));
            content.push(Line::from(Span::styled(
                "  Statuses",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
        }

        let cursor = if i == app.filter_cursor { "→ " } else { "  " };
        let mark = if checked { "[x] " } else { "[ ] " };
        let style = if i == app.filter_cursor {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        content.push(Line::from(Span::styled(format!("  {}{}{}", cursor, mark, name), style)));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Space toggle, Esc close (none checked = no restriction)",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Filters "),
        ),
        area,
    );
}

fn render_dialog<S: BlobStorage>(f: &mut Frame, app: &App<S>) {
    let Some(draft) = &app.draft else {
        return;
    };
    let area = centered_rect(60, 70, f.size());

    let mut content = vec![Line::from("")];
    for (i, (field, value)) in Field::ALL.iter().zip(&draft.values).enumerate() {
        let focused = i == draft.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut spans = vec![
            Span::styled(format!("  {:<26}", field.label()), label_style),
            Span::raw(value.clone()),
        ];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
            if matches!(field, Field::Level | Field::Status) {
                spans.push(Span::styled(
                    "  ←/→ choose",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ));
            }
        }
        content.push(Line::from(spans));
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" {} ", draft.title)),
        ),
        area,
    );
}

fn render_confirm(f: &mut Frame, title: &str, question: &str) {
    let area = centered_rect(50, 20, f.size());

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(vec![Line::from(""), Line::from(format!("  {}", question))]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(title.to_string()),
        ),
        area,
    );
}

fn render_import_prompt<S: BlobStorage>(f: &mut Frame, app: &App<S>) {
    let area = centered_rect(60, 20, f.size());

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  File: ", Style::default().fg(Color::Cyan)),
            Span::raw(app.input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Path to a .csv or JSON file, or paste a JSON array",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Import "),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}
