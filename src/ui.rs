use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::domain::{CMDMode, InvConfig};
use crate::model::{FormView, UIData};
use crate::record::COLUMN_HEADERS;

pub const CMDLINE_HEIGH: u16 = 1;
pub const PAGINATION_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const TABLE_HEADER_HEIGHT: u16 = 1;
pub const COLUMN_WIDTH_ID: u16 = 10;

pub struct TableUI {
    table_state: TableState,
    page_size: usize,
}

impl TableUI {
    pub fn new(cfg: &InvConfig) -> Self {
        Self {
            table_state: TableState::default(),
            page_size: cfg.page_size,
        }
    }

    pub fn draw(&mut self, uidata: &UIData, frame: &mut Frame) {
        let [table_area, pages_area, status_area, cmd_area] = Layout::vertical([
            Constraint::Min(TABLE_HEADER_HEIGHT + 2),
            Constraint::Length(PAGINATION_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
            Constraint::Length(CMDLINE_HEIGH),
        ])
        .areas(frame.area());

        self.draw_table(uidata, frame, table_area);
        frame.render_widget(Paragraph::new(page_controls_line(uidata)).centered(), pages_area);
        frame.render_widget(Paragraph::new(status_line(uidata)), status_area);
        self.draw_cmdline(uidata, frame, cmd_area);

        if let Some(form) = &uidata.form {
            draw_form(form, frame);
        } else if uidata.show_popup {
            draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut title = format!(" {} ", uidata.name);
        if let Some(query) = &uidata.query {
            title = format!(" {} [search: {}] ", uidata.name, query);
        }
        let block = Block::bordered()
            .title(Line::from(title.bold()).centered())
            .title_bottom(Line::from(" ? help ").right_aligned())
            .border_set(border::THICK);

        let header = Row::new(COLUMN_HEADERS.map(|h| Cell::from(h.bold())))
            .height(TABLE_HEADER_HEIGHT);
        let rows: Vec<Row> = uidata.rows.iter().map(|r| Row::new(r.fields())).collect();
        let widths = [
            Constraint::Length(COLUMN_WIDTH_ID),
            Constraint::Fill(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::new().reversed());

        self.table_state.select(uidata.selected_row);
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_cmdline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if !uidata.active_cmdinput {
            let hint = format!(
                " {} per page · / search · : page · r request · q quit",
                self.page_size
            );
            frame.render_widget(Paragraph::new(hint.dark_gray()), area);
            return;
        }
        let prompt = match uidata.cmd_mode {
            Some(CMDMode::Search) => "/",
            Some(CMDMode::GotoPage) => ":",
            None => ">",
        };
        let line = Line::from(vec![prompt.yellow().bold(), uidata.cmdinput.input.clone().into()]);
        frame.render_widget(Paragraph::new(line), area);
        frame.set_cursor_position((
            area.x + 1 + uidata.cmdinput.cursor_pos as u16,
            area.y,
        ));
    }
}

/// ` 1 [2] 3 ` with the current page highlighted.
pub fn page_controls_line(uidata: &UIData) -> Line<'static> {
    let spans: Vec<Span> = uidata
        .controls
        .iter()
        .map(|control| {
            if control.active {
                format!("[{}]", control.number).yellow().bold().reversed()
            } else {
                format!(" {} ", control.number).into()
            }
        })
        .collect();
    Line::from(spans)
}

fn status_line(uidata: &UIData) -> Line<'static> {
    let position = if uidata.total_pages == 0 {
        "no records".to_string()
    } else {
        format!(
            "page {}/{} · {} of {} records",
            uidata.current_page, uidata.total_pages, uidata.nrecords, uidata.nloaded
        )
    };
    let mut spans = vec![
        format!(" {position} ").blue().bold(),
        " ".into(),
        uidata.status_message.clone().into(),
    ];
    if !uidata.status_message.is_empty() {
        let age = uidata.last_status_message_update.elapsed().as_secs();
        spans.push(format!(" ({age}s ago)").dark_gray());
    }
    Line::from(spans)
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn draw_popup(message: &str, frame: &mut Frame) {
    let area = popup_area(frame.area(), 60, 80);
    let block = Block::bordered()
        .title(Line::from(" Help ".bold()).centered())
        .title_bottom(Line::from(" <Esc> close ").centered())
        .border_set(border::THICK);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Text::from(message.to_string()))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_form(form: &FormView, frame: &mut Frame) {
    let area = popup_area(frame.area(), 70, 60);
    let block = Block::bordered()
        .title(Line::from(" Instrument request ".bold()).centered())
        .title_bottom(
            Line::from(" <Tab> next · <Enter> confirm · <Esc> cancel ").centered(),
        )
        .border_set(border::THICK);

    let label_width = form
        .fields
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(idx, (label, value))| {
            let label = format!(" {label:>label_width$}: ");
            if idx == form.focus {
                Line::from(vec![
                    label.yellow().bold(),
                    form.input.input.clone().underlined(),
                ])
            } else {
                Line::from(vec![label.into(), value.clone().into()])
            }
        })
        .collect();

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);

    let cursor_x = inner.x + label_width as u16 + 3 + form.input.cursor_pos as u16;
    let cursor_y = inner.y + form.focus as u16;
    if cursor_x < inner.right() && cursor_y < inner.bottom() {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginator::page_controls;
    use crate::record::Record;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::{Duration, Instant};

    fn render(uidata: &UIData) -> String {
        let mut ui = TableUI::new(&InvConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        terminal.draw(|frame| ui.draw(uidata, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample() -> UIData {
        let mut uidata = UIData::empty();
        uidata.name = "inventory.csv".to_string();
        uidata.rows = vec![
            Record::new("1", "Violin", "4/4", "Excellent"),
            Record::new("2", "Viola", "15.5", "Good"),
        ];
        uidata.controls = page_controls(3, 2);
        uidata.current_page = 2;
        uidata.total_pages = 3;
        uidata.nrecords = 12;
        uidata.nloaded = 12;
        uidata.selected_row = Some(0);
        uidata
    }

    #[test]
    fn shows_headers_rows_and_page_controls() {
        let screen = render(&sample());
        for header in COLUMN_HEADERS {
            assert!(screen.contains(header), "missing header {header}");
        }
        assert!(screen.contains("Violin"));
        assert!(screen.contains("Excellent"));
        assert!(screen.contains(" 1 [2] 3 "));
        assert!(screen.contains("page 2/3"));
    }

    #[test]
    fn empty_view_has_no_controls() {
        let screen = render(&UIData::empty());
        assert!(screen.contains("Instrument Name"));
        assert!(screen.contains("no records"));
        assert!(!screen.contains("[1]"));
    }

    #[test]
    fn status_message_shows_its_age() {
        let mut uidata = sample();
        uidata.status_message = "Copied record 4".to_string();
        uidata.last_status_message_update = Instant::now()
            .checked_sub(Duration::from_secs(5))
            .unwrap();
        let screen = render(&uidata);
        assert!(screen.contains("Copied record 4 (5s ago)"));
    }

    #[test]
    fn form_popup_lists_fields() {
        let mut uidata = sample();
        uidata.form = Some(FormView {
            fields: vec![
                ("Name".to_string(), String::new()),
                ("Instrument".to_string(), "Viola".to_string()),
            ],
            focus: 0,
            input: Default::default(),
        });
        let screen = render(&uidata);
        assert!(screen.contains("Instrument request"));
        assert!(screen.contains("Instrument: Viola"));
    }

    #[test]
    fn active_search_is_shown_in_title_and_cmdline() {
        let mut uidata = sample();
        uidata.query = Some("vio".to_string());
        uidata.active_cmdinput = true;
        uidata.cmd_mode = Some(CMDMode::Search);
        uidata.cmdinput.input = "cel".to_string();
        let screen = render(&uidata);
        assert!(screen.contains("[search: vio]"));
        assert!(screen.contains("/cel"));
    }
}
