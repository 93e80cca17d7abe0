use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::api::Employee;
use crate::domain::HELP_TEXT;
use crate::model::Model;
use crate::pages::{DetailPage, FormPage, LoadState};
use crate::router::Route;
use crate::table::{EMPTY_TABLE_TEXT, PageView};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAME: Duration = Duration::from_millis(80);
const ACTIONS_WIDTH: u16 = 18;
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
const PAGE_PROMPT: &str = "Go to page: ";

const NAV_ROUTES: [Route; 3] = [Route::Home, Route::Departments, Route::Employees];

#[derive(Debug, Default)]
pub struct AppUI {
    table_state: TableState,
}

impl AppUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let [nav, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        render_nav(model, frame, nav);

        let block = Block::bordered()
            .title(Line::from(format!(" {} ", model.route().title())).bold().centered())
            .border_set(border::ROUNDED);
        let inner = block.inner(body);
        frame.render_widget(block, body);

        match model.route() {
            Route::Home => render_home(model, frame, inner),
            Route::Departments => {
                let text = Paragraph::new("Departments are not available yet.").centered();
                frame.render_widget(text, inner);
            }
            Route::Employees => self.render_employees(model, frame, inner),
            Route::EditEmployee(_) => match model.detail() {
                Some(detail) => render_detail(detail, frame, inner),
                None => render_loading(Instant::now(), frame, inner),
            },
            Route::CreateEmployee => {
                if let Some(form) = model.form() {
                    render_form(form, frame, inner);
                }
            }
        }

        render_status_line(model, frame, status);

        if model.show_help() {
            render_help(frame);
        } else if let Some(employee) = model.employees().pending_delete()
            && *model.route() == Route::Employees
        {
            render_confirm_delete(employee, frame);
        }
    }

    fn render_employees(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let page = model.employees();
        match page.state() {
            LoadState::Loading { started } => render_loading(*started, frame, area),
            LoadState::Failed(message) => render_failed(message, frame, area),
            LoadState::Ready(employees) => {
                let view = page.table().view(employees);
                self.render_table(&view, frame, area);
            }
        }
    }

    fn render_table(&mut self, view: &PageView<'_, Employee>, frame: &mut Frame, area: Rect) {
        let [table_area, footer] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        let mut widths: Vec<Constraint> = view
            .headers
            .iter()
            .map(|h| h.width.unwrap_or(Constraint::Fill(1)))
            .collect();
        let mut header_cells: Vec<Cell> = view
            .headers
            .iter()
            .map(|h| {
                let mut spans = vec![Span::from(h.label.clone())];
                if let Some(indicator) = h.indicator {
                    spans.push(Span::from(format!(" {indicator}")).dark_gray());
                }
                let style = if h.focused {
                    Style::new().add_modifier(Modifier::REVERSED | Modifier::BOLD)
                } else {
                    Style::new().bold()
                };
                Cell::from(Line::from(spans)).style(style)
            })
            .collect();
        if view.has_actions {
            widths.push(Constraint::Length(ACTIONS_WIDTH));
            header_cells.push(Cell::from("Actions").bold());
        }

        let rows: Vec<Row> = if view.rows.is_empty() {
            vec![Row::new(vec![Cell::from(EMPTY_TABLE_TEXT).italic().dark_gray()])]
        } else {
            view.rows
                .iter()
                .map(|row| {
                    let mut cells: Vec<Cell> = row.cells.iter().cloned().map(Cell::from).collect();
                    if view.has_actions {
                        cells.push(Cell::from(Line::from(vec![
                            "e".blue().bold(),
                            " edit  ".into(),
                            "d".red().bold(),
                            " delete".into(),
                        ])));
                    }
                    Row::new(cells)
                })
                .collect()
        };

        let table = Table::new(rows, widths)
            .header(Row::new(header_cells).bottom_margin(1))
            .column_spacing(2)
            .row_highlight_style(Style::new().bg(Color::DarkGray))
            .highlight_symbol("▶ ");
        self.table_state.select(view.selected_row);
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        let count = Span::from(format!("{} records", view.total_records)).dark_gray();
        let line = if view.show_pagination() {
            let mut line = pagination_line(view);
            line.push_span(Span::from("   "));
            line.push_span(count);
            line
        } else {
            Line::from(count)
        };
        frame.render_widget(Paragraph::new(line).centered(), footer);
    }
}

/// `‹ 1 [2] 3 ›`, arrows dimmed on the first and last page.
pub fn pagination_line<R>(view: &PageView<'_, R>) -> Line<'static> {
    let arrow = |symbol: &'static str, enabled: bool| {
        if enabled {
            Span::from(symbol).bold()
        } else {
            Span::from(symbol).dark_gray()
        }
    };
    let mut spans = vec![arrow("‹", view.has_prev())];
    for page in 1..=view.total_pages {
        spans.push(" ".into());
        if page == view.page {
            spans.push(Span::from(format!("[{page}]")).yellow().bold());
        } else {
            spans.push(Span::from(page.to_string()));
        }
    }
    spans.push(" ".into());
    spans.push(arrow("›", view.has_next()));
    Line::from(spans)
}

fn render_nav(model: &Model, frame: &mut Frame, area: Rect) {
    let titles = NAV_ROUTES
        .iter()
        .enumerate()
        .map(|(idx, route)| Line::from(format!("{} {}", idx + 1, route.title())));
    let selected = match model.route() {
        Route::Home => 0,
        Route::Departments => 1,
        Route::Employees | Route::EditEmployee(_) | Route::CreateEmployee => 2,
    };
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::new().yellow().bold())
        .divider("|");
    frame.render_widget(tabs, area);
}

fn render_home(model: &Model, frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from("staffview".bold()),
        Line::from(""),
        Line::from(vec!["Backend: ".into(), model.base_url().to_string().yellow()]),
        Line::from(""),
        Line::from(vec![
            "Press ".into(),
            "3".blue().bold(),
            " for employees, ".into(),
            "?".blue().bold(),
            " for help.".into(),
        ]),
    ]);
    frame.render_widget(Paragraph::new(text).centered(), area);
}

fn render_loading(started: Instant, frame: &mut Frame, area: Rect) {
    let frame_idx = (started.elapsed().as_millis() / SPINNER_FRAME.as_millis()) as usize;
    let line = Line::from(vec![
        Span::from(SPINNER[frame_idx % SPINNER.len()]).yellow(),
        " Loading ...".into(),
    ]);
    let [center] = Layout::vertical([Constraint::Length(1)])
        .flex(Flex::Center)
        .areas(area);
    frame.render_widget(Paragraph::new(line).centered(), center);
}

fn render_failed(message: &str, frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(message.to_string()).red().bold(),
        Line::from(vec!["Press ".into(), "r".blue().bold(), " to retry".into()]),
    ]);
    let [center] = Layout::vertical([Constraint::Length(2)])
        .flex(Flex::Center)
        .areas(area);
    frame.render_widget(Paragraph::new(text).centered(), center);
}

fn render_detail(detail: &DetailPage, frame: &mut Frame, area: Rect) {
    match detail.state() {
        LoadState::Loading { started } => return render_loading(*started, frame, area),
        LoadState::Failed(message) => return render_failed(message, frame, area),
        LoadState::Ready(_) => {}
    }
    let rows: Vec<Row> = detail
        .fields()
        .into_iter()
        .map(|(field, value)| Row::new(vec![Cell::from(field), Cell::from(value)]))
        .collect();
    let table = Table::new(rows, [Constraint::Length(14), Constraint::Fill(1)])
        .header(Row::new(vec!["Field", "Value"]).bold().bottom_margin(1))
        .column_spacing(2);
    frame.render_widget(table, area);
}

fn render_form(form: &FormPage, frame: &mut Frame, area: Rect) {
    let mut constraints = vec![Constraint::Length(1); form.fields().len()];
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));
    let areas = Layout::vertical(constraints).spacing(1).split(area);

    for (idx, field) in form.fields().iter().enumerate() {
        let focused = idx == form.focus();
        let marker = if field.is_required() { "*" } else { " " };
        let label = format!("{:>12}{marker} ", field.label);
        let label_style = if focused {
            Style::new().yellow().bold()
        } else {
            Style::new()
        };
        let line = Line::from(vec![
            Span::styled(label.clone(), label_style),
            Span::from(field.value.clone()).underlined(),
        ]);
        frame.render_widget(Paragraph::new(line), areas[idx]);

        if focused && !form.is_submitting() {
            let x = areas[idx].x + label.chars().count() as u16 + form.cursor() as u16;
            frame.set_cursor_position(Position::new(x, areas[idx].y));
        }
    }

    let feedback = if form.is_submitting() {
        Line::from("Saving ...").yellow()
    } else if let Some(error) = form.error() {
        Line::from(error.to_string()).red()
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(feedback), areas[form.fields().len()]);

    let hints = Line::from(vec![
        "Tab".blue().bold(),
        " next field  ".into(),
        "Enter".blue().bold(),
        " save  ".into(),
        "Esc".blue().bold(),
        " cancel".into(),
    ]);
    frame.render_widget(Paragraph::new(hints), areas[form.fields().len() + 1]);
}

fn render_status_line(model: &Model, frame: &mut Frame, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(30)]).areas(area);
    if let Some(prompt) = model.page_prompt() {
        let label = PAGE_PROMPT;
        let line = Line::from(vec![label.yellow().bold(), prompt.value().to_string().into()]);
        frame.render_widget(Paragraph::new(line), left);
        let x = left.x + label.chars().count() as u16 + prompt.cursor() as u16;
        frame.set_cursor_position(Position::new(x, left.y));
    } else {
        let message = if model.last_status_message_update().elapsed() < STATUS_MESSAGE_TIMEOUT {
            model.status_message().to_string()
        } else {
            String::new()
        };
        frame.render_widget(Paragraph::new(message), left);
    }
    let hint = Line::from(vec![
        model.route().path().dark_gray(),
        "  ".into(),
        "?".blue().bold(),
        " help ".into(),
        "q".blue().bold(),
        " quit".into(),
    ]);
    frame.render_widget(Paragraph::new(hint).right_aligned(), right);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn render_help(frame: &mut Frame) {
    let height = HELP_TEXT.lines().count() as u16 + 2;
    let area = popup_area(frame.area(), 60, height);
    let block = Block::bordered()
        .title(Line::from(" Help ").bold().centered())
        .border_set(border::THICK);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(HELP_TEXT).block(block), area);
}

fn render_confirm_delete(employee: &Employee, frame: &mut Frame) {
    let area = popup_area(frame.area(), 50, 6);
    let block = Block::bordered()
        .title(Line::from(" Confirm ").bold().centered())
        .border_set(border::THICK)
        .border_style(Style::new().red());
    let text = Text::from(vec![
        Line::from(format!("Delete employee {}?", employee.short_name())),
        Line::from(""),
        Line::from(vec![
            "y".blue().bold(),
            " / ".into(),
            "Enter".blue().bold(),
            " confirm   ".into(),
            "n".blue().bold(),
            " / ".into(),
            "Esc".blue().bold(),
            " cancel".into(),
        ]),
    ]);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).centered().wrap(Wrap { trim: true }).block(block),
        area,
    );
}
