//! Ratatui-based terminal UI.
//!
//! The TUI provides a parameter panel (fees, ratios, pool, diagnosis and
//! procedure), renders the last calculation as cards, charts and a detail
//! table, and shows the three catalogs. Calculations only run on `c`; editing
//! the form never changes the displayed result.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Tabs},
};

use crate::app::pipeline::{CalcRequest, effective_base_weight};
use crate::app::session::Session;
use crate::catalog::{ImportOutcome, Selection, diagnosis_options, procedure_category, procedure_options};
use crate::cli::TuiArgs;
use crate::cli::picker::{discover_csv_files, pretty_path};
use crate::config::Config;
use crate::domain::{CatalogKind, InputField};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::report::{ChartBar, comparison, cost_structure, detail_rows, display_width, fmt_currency, fmt_rate, summary_cards};

mod plotters_chart;

use plotters_chart::{BarPlottersChart, bar_bounds, legend_color};

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Load config and catalogs before touching the terminal so errors print normally.
    let config = Config::load(&args.catalogs)?;
    let session = Session::from_config(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(session, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// One row of the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormRow {
    Input(InputField),
    Pool,
    Diagnosis,
    Procedure,
}

const FORM_ROWS: [FormRow; 13] = [
    FormRow::Input(InputField::TreatmentFee),
    FormRow::Input(InputField::ExamFee),
    FormRow::Input(InputField::DrugFee),
    FormRow::Input(InputField::MaterialFee),
    FormRow::Input(InputField::MedicalIncomeCostRatio),
    FormRow::Input(InputField::DrugMaterialCostRatio),
    FormRow::Input(InputField::PayerContribution),
    FormRow::Input(InputField::TierCoefficient),
    FormRow::Pool,
    FormRow::Input(InputField::PointValue),
    FormRow::Diagnosis,
    FormRow::Procedure,
    FormRow::Input(InputField::BaseWeight),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Results,
    Catalog(CatalogKind),
}

impl View {
    const ALL: [View; 4] = [
        View::Results,
        View::Catalog(CatalogKind::Dip),
        View::Catalog(CatalogKind::Procedure),
        View::Catalog(CatalogKind::Diagnosis),
    ];

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn shifted(self, delta: isize) -> Self {
        let n = View::ALL.len() as isize;
        let idx = (self.index() as isize + delta).rem_euclid(n) as usize;
        View::ALL[idx]
    }

    fn title(self) -> &'static str {
        match self {
            View::Results => "分析结果",
            View::Catalog(CatalogKind::Dip) => "DIP目录",
            View::Catalog(CatalogKind::Procedure) => "手术操作目录",
            View::Catalog(CatalogKind::Diagnosis) => "诊断目录",
        }
    }
}

/// Catalog import prompt: a path buffer plus discovered CSV candidates.
#[derive(Debug, Clone)]
struct ImportDialog {
    kind: CatalogKind,
    path: String,
    candidates: Vec<PathBuf>,
    cursor: Option<usize>,
}

impl ImportDialog {
    fn new(kind: CatalogKind, candidates: Vec<PathBuf>) -> Self {
        Self {
            kind,
            path: String::new(),
            candidates,
            cursor: None,
        }
    }

    fn next_candidate(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let next = self.cursor.map_or(0, |c| (c + 1) % self.candidates.len());
        self.cursor = Some(next);
        self.path = pretty_path(&self.candidates[next]);
    }
}

struct App {
    session: Session,
    config: Config,
    form: CalcRequest,
    selected_row: usize,
    editing: Option<String>,
    view: View,
    catalog_offset: usize,
    import: Option<ImportDialog>,
    status: String,
}

impl App {
    fn new(session: Session, config: Config) -> Self {
        let form = config.default_request();
        Self {
            session,
            config,
            form,
            selected_row: 0,
            editing: None,
            view: View::Results,
            catalog_offset: 0,
            import: None,
            status: "Set parameters and press c to calculate.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.import.is_some() {
            self.handle_import_key(code);
            return Ok(false);
        }
        if self.editing.is_some() {
            self.handle_edit_key(code);
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_row + 1 < FORM_ROWS.len() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Left => self.adjust_row(-1),
            KeyCode::Right => self.adjust_row(1),
            KeyCode::Enter => self.start_edit(),
            KeyCode::Backspace | KeyCode::Delete => {
                if self.current_row() == FormRow::Input(InputField::BaseWeight) {
                    self.form.base_weight_override = None;
                    self.status = "Base weight follows the catalog again.".to_string();
                }
            }
            KeyCode::Char('c') => self.calculate(),
            KeyCode::Tab => self.switch_view(1),
            KeyCode::BackTab => self.switch_view(-1),
            KeyCode::PageDown => self.catalog_offset = self.catalog_offset.saturating_add(10),
            KeyCode::PageUp => self.catalog_offset = self.catalog_offset.saturating_sub(10),
            KeyCode::Char('i') => self.open_import(),
            KeyCode::Char('d') => match crate::debug::write_debug_bundle(&self.session, &self.form) {
                Ok(path) => {
                    self.status = format!("Wrote debug bundle: {}", path.display());
                }
                Err(err) => {
                    self.status = format!("Debug write failed: {err}");
                }
            },
            _ => {}
        }

        Ok(false)
    }

    fn current_row(&self) -> FormRow {
        FORM_ROWS[self.selected_row.min(FORM_ROWS.len() - 1)]
    }

    fn switch_view(&mut self, delta: isize) {
        self.view = self.view.shifted(delta);
        self.catalog_offset = 0;
    }

    fn adjust_row(&mut self, delta: i32) {
        match self.current_row() {
            FormRow::Input(field) => self.nudge(field, delta),
            FormRow::Pool => {
                self.form.pool = self.form.pool.toggle();
                self.form.point_value = self.config.point_values.for_pool(self.form.pool);
                self.status = format!(
                    "pool: {} (point value {:.4})",
                    self.form.pool.display_name(),
                    self.form.point_value
                );
            }
            FormRow::Diagnosis => {
                let mut options = vec![Selection::Unchosen];
                options.extend(diagnosis_options(&self.session.catalogs().dip).into_iter().map(Selection::Named));
                self.form.diagnosis = cycle(&options, &self.form.diagnosis, delta);
                self.reconcile_procedure();
            }
            FormRow::Procedure => {
                let options = self.procedure_choices();
                self.form.procedure = cycle(&options, &self.form.procedure, delta);
            }
        }
    }

    /// Step a numeric field, clamped to its domain.
    fn nudge(&mut self, field: InputField, delta: i32) {
        let current = match self.form.value(field) {
            Some(v) => v,
            None => effective_base_weight(self.session.catalogs(), &self.form).1,
        };
        let (min, max) = field.bounds();
        let next = round_to(current + f64::from(delta) * field.step(), field.decimals())
            .clamp(min, max.unwrap_or(f64::INFINITY));
        self.form.set_value(field, next);
    }

    /// Placeholder plus the procedures listed for the current diagnosis.
    fn procedure_choices(&self) -> Vec<Selection> {
        let mut options = vec![Selection::Unchosen];
        options.extend(procedure_options(&self.session.catalogs().dip, &self.form.diagnosis));
        options
    }

    /// Drop a procedure choice the newly selected diagnosis does not offer.
    fn reconcile_procedure(&mut self) {
        if !self.procedure_choices().contains(&self.form.procedure) {
            self.form.procedure = Selection::Unchosen;
        }
    }

    fn start_edit(&mut self) {
        let text = match self.current_row() {
            FormRow::Input(field) => self
                .form
                .value(field)
                .map(|v| format!("{v:.*}", field.decimals()))
                .unwrap_or_default(),
            FormRow::Pool => {
                self.adjust_row(1);
                return;
            }
            FormRow::Diagnosis => named_text(&self.form.diagnosis),
            FormRow::Procedure => match &self.form.procedure {
                Selection::NoProcedure => "无".to_string(),
                other => named_text(other),
            },
        };
        self.editing = Some(text);
        self.status = "Editing. Enter to apply, Esc to cancel.".to_string();
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = std::mem::take(buffer);
                self.editing = None;
                self.apply_edit(&text);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
    }

    fn apply_edit(&mut self, text: &str) {
        let trimmed = text.trim();
        match self.current_row() {
            FormRow::Input(InputField::BaseWeight) if trimmed.is_empty() => {
                self.form.base_weight_override = None;
                self.status = "Base weight follows the catalog again.".to_string();
            }
            FormRow::Input(field) => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    self.form.set_value(field, v);
                    self.status = format!("{}: {v:.*}", field.label(), field.decimals());
                }
                _ => {
                    self.status = format!("Invalid number for {}: '{trimmed}'", field.label());
                }
            },
            FormRow::Diagnosis => {
                self.form.diagnosis = Selection::parse_diagnosis(trimmed);
                self.reconcile_procedure();
            }
            FormRow::Procedure => {
                self.form.procedure = Selection::parse_procedure(trimmed);
            }
            FormRow::Pool => {}
        }
    }

    fn calculate(&mut self) {
        match self.session.calculate(&self.form) {
            Ok(output) => {
                self.status = format!(
                    "Calculated: {} | DIP盈亏金额 {}",
                    output.resolution.describe(),
                    fmt_currency(output.metrics.net_profit_loss)
                );
            }
            Err(err) => {
                self.status = format!("Calculation failed: {err}");
            }
        }
    }

    fn open_import(&mut self) {
        let kind = match self.view {
            View::Results => CatalogKind::Dip,
            View::Catalog(kind) => kind,
        };
        self.import = Some(ImportDialog::new(kind, discover_csv_files()));
        self.status = format!(
            "Import {}: type a CSV path, Tab cycles files found here, Enter imports, Esc cancels.",
            kind.display_name()
        );
    }

    fn handle_import_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.import = None;
                self.status = "Import canceled.".to_string();
                return;
            }
            KeyCode::Enter => {
                if let Some(dialog) = self.import.take() {
                    self.import_catalog(dialog.kind, &dialog.path);
                }
                return;
            }
            _ => {}
        }

        let Some(dialog) = self.import.as_mut() else {
            return;
        };
        match code {
            KeyCode::Tab => dialog.next_candidate(),
            KeyCode::Backspace => {
                dialog.path.pop();
            }
            KeyCode::Char(c) => dialog.path.push(c),
            _ => {}
        }
    }

    /// Replace one catalog from a file; failures leave the session untouched.
    fn import_catalog(&mut self, kind: CatalogKind, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            self.status = "Import canceled: no file given.".to_string();
            return;
        }
        self.status = match self.session.import_file(kind, Path::new(path)) {
            Ok(ImportOutcome::Replaced { rows }) => {
                format!("Imported {rows} rows into {}.", kind.display_name())
            }
            Ok(ImportOutcome::Unchanged { rows }) => {
                format!("{} unchanged (same content, {rows} rows).", kind.display_name())
            }
            Err(err) => format!("Import failed: {err}"),
        };
        if kind == CatalogKind::Dip {
            self.reconcile_procedure();
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let catalogs = self.session.catalogs();
        let summary: Vec<String> = CatalogKind::ALL
            .iter()
            .map(|&kind| {
                format!(
                    "{} {} rows (rev {})",
                    View::Catalog(kind).title(),
                    catalogs.len(kind),
                    catalogs.version(kind).revision
                )
            })
            .collect();

        let lines = vec![
            Line::from(vec![
                Span::styled("dip", Style::default().fg(Color::Cyan)),
                Span::raw(" - DIP病种及费用分析"),
            ]),
            Line::from(Span::styled(summary.join(" | "), Style::default().fg(Color::Gray))),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(46), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, chunks[0]);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(chunks[1]);

        let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, main[0]);

        match self.view {
            View::Results => self.draw_results(frame, main[1]),
            View::Catalog(kind) => self.draw_catalog(frame, main[1], kind),
        }
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);

        let items: Vec<ListItem> = FORM_ROWS
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let label = row_label(*row);
                let value = match &self.editing {
                    Some(buffer) if i == self.selected_row => format!("{buffer}_"),
                    _ => self.row_value(*row),
                };
                ListItem::new(format!("{label}: {value}"))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("计算参数").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_row));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        // Live preview of the weight the next calculation would use.
        let (resolution, base_weight) = effective_base_weight(self.session.catalogs(), &self.form);
        let category = procedure_category(&self.session.catalogs().procedures, &self.form.procedure).unwrap_or("-");
        let preview = vec![
            Line::from(format!(
                "计算DIP分值: {:.4}",
                crate::engine::effective_weight(base_weight, self.form.tier_coefficient)
            )),
            Line::from(Span::styled(resolution.describe(), Style::default().fg(Color::Gray))),
            Line::from(Span::styled(format!("操作类别: {category}"), Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(preview)).block(Block::default().title("DIP分值").borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);

        if self.editing.is_some() {
            let hint = Paragraph::new("Editing…").style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: chunks[0].x + 2,
                y: chunks[0].y + chunks[0].height.saturating_sub(2),
                width: chunks[0].width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn row_value(&self, row: FormRow) -> String {
        match row {
            FormRow::Input(InputField::BaseWeight) => match self.form.base_weight_override {
                Some(v) => format!("{v:.4} (manual)"),
                None => {
                    let (resolution, weight) = effective_base_weight(self.session.catalogs(), &self.form);
                    let source = if resolution.is_match() { "catalog" } else { "default" };
                    format!("{weight:.4} ({source})")
                }
            },
            FormRow::Input(field) => self
                .form
                .value(field)
                .map(|v| format!("{v:.*}", field.decimals()))
                .unwrap_or_default(),
            FormRow::Pool => self.form.pool.display_name().to_string(),
            FormRow::Diagnosis => self.form.diagnosis.label().to_string(),
            FormRow::Procedure => self.form.procedure.label().to_string(),
        }
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("分析结果").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(output) = self.session.last() else {
            let msg = Paragraph::new("Set parameters on the left and press c to calculate.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(13)])
            .split(inner);

        let card_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(rows[0]);
        for (card, rect) in summary_cards(&output.metrics).iter().zip(card_areas.iter()) {
            let color = if card.positive { Color::Green } else { Color::Red };
            let text = vec![
                Line::from(Span::styled(card.value.clone(), Style::default().add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(card.delta.clone(), Style::default().fg(color))),
            ];
            let p = Paragraph::new(Text::from(text))
                .alignment(Alignment::Center)
                .block(Block::default().title(card.title).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }

        let chart_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(rows[1]);
        draw_bar_chart(frame, chart_areas[0], "费用结构分布", &cost_structure(&output.inputs));
        draw_bar_chart(
            frame,
            chart_areas[1],
            "费用对比分析",
            &comparison(&output.inputs, &output.metrics),
        );

        let detail: Vec<Row> = detail_rows(&output.metrics)
            .into_iter()
            .map(|r| Row::new(vec![Cell::from(r.label), Cell::from(r.value)]))
            .collect();
        let table = Table::new(detail, [Constraint::Length(18), Constraint::Min(14)])
            .header(Row::new(vec!["项目", "金额/比率"]).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().title("详细计算结果").borders(Borders::ALL));
        frame.render_widget(table, rows[2]);
    }

    fn draw_catalog(&self, frame: &mut ratatui::Frame<'_>, area: Rect, kind: CatalogKind) {
        let (headers, rows) = self.session.catalogs().table(kind);
        let offset = self.catalog_offset.min(rows.len().saturating_sub(1));

        let widths: Vec<Constraint> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let widest = rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| display_width(c))
                    .chain(std::iter::once(display_width(h)))
                    .max()
                    .unwrap_or(4);
                Constraint::Length(widest.min(24) as u16)
            })
            .collect();

        let body: Vec<Row> = rows
            .iter()
            .skip(offset)
            .map(|r| Row::new(r.iter().map(|c| Cell::from(c.clone())).collect::<Vec<_>>()))
            .collect();

        let title = format!(
            "{} ({} rows, from row {})",
            kind.display_name(),
            rows.len(),
            if rows.is_empty() { 0 } else { offset + 1 }
        );
        let table = Table::new(body, widths)
            .header(
                Row::new(headers.iter().map(|h| Cell::from(h.clone())).collect::<Vec<_>>())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .column_spacing(2)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = match &self.import {
            Some(dialog) => Line::from(vec![
                Span::styled(
                    format!("Import {} from: ", View::Catalog(dialog.kind).title()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(format!("{}_", dialog.path), Style::default().fg(Color::White)),
                Span::raw(" | "),
                Span::styled(
                    format!("{} CSV files found (Tab)", dialog.candidates.len()),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            None => {
                let help = "↑/↓ select  ←/→ adjust  Enter edit  c calculate  Tab view  i import  d debug  q quit";
                Line::from(vec![
                    Span::styled(help, Style::default().fg(Color::Gray)),
                    Span::raw(" | "),
                    Span::styled(&self.status, Style::default().fg(Color::Yellow)),
                ])
            }
        };
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart on top, colour-keyed legend underneath.
fn draw_bar_chart(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, bars: &[ChartBar]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(bars.len() as u16)])
        .split(inner);

    let widget = BarPlottersChart {
        bars,
        y_bounds: bar_bounds(bars),
        y_label: "金额(元)",
        fmt_y: fmt_axis_money,
    };
    frame.render_widget(widget, parts[0]);

    let legend: Vec<Line> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let tag = char::from(b'A' + (i as u8 % 26));
            let mut text = format!("{tag} {} {}", bar.label, fmt_currency(bar.value));
            if let Some(share) = bar.share {
                text.push_str(&format!(" ({})", fmt_rate(share)));
            }
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(legend_color(i))),
                Span::raw(text),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(legend)), parts[1]);
}

fn row_label(row: FormRow) -> &'static str {
    match row {
        FormRow::Input(field) => field.label(),
        FormRow::Pool => "点值类型",
        FormRow::Diagnosis => "选择诊断",
        FormRow::Procedure => "选择操作",
    }
}

fn named_text(selection: &Selection) -> String {
    match selection {
        Selection::Named(name) => name.clone(),
        _ => String::new(),
    }
}

/// Next (or previous) option after `current`; unknown values restart at the first option.
fn cycle<T: PartialEq + Clone>(options: &[T], current: &T, delta: i32) -> T {
    let Some(first) = options.first() else {
        return current.clone();
    };
    let Some(pos) = options.iter().position(|o| o == current) else {
        return first.clone();
    };
    let n = options.len() as i64;
    let idx = (pos as i64 + i64::from(delta)).rem_euclid(n) as usize;
    options[idx].clone()
}

fn round_to(v: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (v * scale).round() / scale
}

fn fmt_axis_money(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format!("{v:.0}")
    }
}
