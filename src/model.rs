use ratatui::crossterm::event::{KeyCode, KeyEvent};
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::clipboard::{SystemClipboard, TextSink};
use crate::domain::{CMDMode, HELP_TEXT, InvConfig, InvError, Message};
use crate::filter::filter;
use crate::inputter::{InputResult, Inputter};
use crate::mail::{ClipboardComposer, MailComposer, RequestForm};
use crate::paginator::{PageControl, page_controls, paginate};
use crate::parser::parse;
use crate::record::{Dataset, Record};

pub const THANK_YOU_MESSAGE: &str =
    "Thank You for your interest in NoteWorthy! Your request has been sent.";

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    FAILED,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
    FORM,
}

/// The page being looked at and the records it is taken from.
///
/// Always replaced as a whole, so a page number can never refer to a
/// different dataset than the one it was chosen for.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    current_page: NonZeroUsize,
    active: Dataset,
}

impl ViewState {
    pub fn new(current_page: NonZeroUsize, active: Dataset) -> Self {
        Self {
            current_page,
            active,
        }
    }

    pub fn empty() -> Self {
        Self::new(NonZeroUsize::MIN, Dataset::empty())
    }

    pub fn first_page(active: Dataset) -> Self {
        Self::new(NonZeroUsize::MIN, active)
    }

    pub fn current_page(&self) -> usize {
        self.current_page.get()
    }

    pub fn active(&self) -> &Dataset {
        &self.active
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub fields: Vec<(String, String)>,
    pub focus: usize,
    pub input: InputResult,
}

/// Everything the ui needs to draw one frame.
#[derive(Debug, Clone)]
pub struct UIData {
    pub name: String,
    pub rows: Vec<Record>,
    pub controls: Vec<PageControl>,
    pub current_page: usize,
    pub total_pages: usize,
    pub nrecords: usize,  // Records in the active dataset
    pub nloaded: usize,   // Records in the full dataset
    pub selected_row: Option<usize>,
    pub query: Option<String>,
    pub show_popup: bool,
    pub popup_message: String,
    pub form: Option<FormView>,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            rows: Vec::new(),
            controls: Vec::new(),
            current_page: 1,
            total_pages: 0,
            nrecords: 0,
            nloaded: 0,
            selected_row: None,
            query: None,
            show_popup: false,
            popup_message: String::new(),
            form: None,
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: InvConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    name: String,
    full: Dataset,
    view: ViewState,
    query: Option<String>,
    curser_row: usize,
    uidata: UIData,
    clipboard: Box<dyn TextSink>,
    composer: Box<dyn MailComposer>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    form: Option<RequestForm>,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &InvConfig, name: &str) -> Self {
        Self::with_collaborators(
            config,
            name,
            Box::new(SystemClipboard::default()),
            Box::new(ClipboardComposer::new(SystemClipboard::default())),
        )
    }

    pub fn with_collaborators(
        config: &InvConfig,
        name: &str,
        clipboard: Box<dyn TextSink>,
        composer: Box<dyn MailComposer>,
    ) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::EMPTY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            name: name.to_string(),
            full: Dataset::empty(),
            view: ViewState::empty(),
            query: None,
            curser_row: 0,
            uidata: UIData::empty(),
            clipboard,
            composer,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            form: None,
            status_message: "Loading ...".to_string(),
            last_status_message_update: Instant::now(),
        };
        model.render();
        model
    }

    // -------------------- Events ---------------------- //

    #[instrument(skip(self, raw_text), fields(bytes = raw_text.len()))]
    pub fn on_load(&mut self, raw_text: &str) {
        let start_time = Instant::now();
        let full = parse(raw_text);
        let loading_duration = start_time.elapsed().as_millis();
        info!("Loaded {} records in {loading_duration}ms", full.len());

        self.full = full.clone();
        self.query = None;
        self.status = Status::READY;
        self.set_status_message(format!(
            "Loaded {} instruments in {}ms ...",
            full.len(),
            loading_duration
        ));
        self.replace_view(ViewState::first_page(full));
    }

    /// The inventory could not be read. The view keeps whatever it showed before.
    pub fn on_load_failed(&mut self, err: &InvError) {
        error!(
            source_unavailable = err.is_source_unavailable(),
            "Loading inventory failed: {err}"
        );
        if self.full.is_empty() {
            self.status = Status::FAILED;
        }
        self.set_status_message("Could not load the inventory.");
        self.render();
    }

    /// Filters the full dataset, never the currently shown one.
    pub fn on_search(&mut self, query: &str) {
        let filtered = filter(&self.full, query);
        debug!("Search '{query}' matched {} records", filtered.len());
        self.query = if query.is_empty() {
            None
        } else {
            Some(query.to_string())
        };
        let message = match (&self.query, filtered.len()) {
            (None, _) => "Search cleared".to_string(),
            (Some(_), 0) => "Found no matches!".to_string(),
            (Some(q), n) => format!("Found {n} results for '{q}'"),
        };
        self.set_status_message(message);
        self.replace_view(ViewState::first_page(filtered));
    }

    pub fn on_page_select(&mut self, page: usize) {
        let Some(page) = NonZeroUsize::new(page) else {
            warn!("Ignoring selection of page 0");
            return;
        };
        trace!("Select page {page}");
        let active = self.view.active.clone();
        self.replace_view(ViewState::new(page, active));
    }

    // -------------------- Accessors ---------------------- //

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn page_controls(&self) -> &[PageControl] {
        &self.uidata.controls
    }

    /// True while every key press goes to a text input.
    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::CMDINPUT | Modus::FORM)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    // -------------------- Rendering ---------------------- //

    fn replace_view(&mut self, view: ViewState) {
        self.view = view;
        self.curser_row = 0;
        self.render();
    }

    /// Recomputes the visible page and all page controls from the view state.
    fn render(&mut self) {
        let current_page = self.view.current_page();
        let page = paginate(
            self.view.active.records(),
            current_page,
            self.config.page_size,
        );
        trace!(
            "Render page {}/{} with {} rows",
            current_page,
            page.total_pages,
            page.items.len()
        );

        let rows = page.items.to_vec();
        self.curser_row = std::cmp::min(self.curser_row, rows.len().saturating_sub(1));
        let selected_row = if rows.is_empty() {
            None
        } else {
            Some(self.curser_row)
        };

        self.uidata = UIData {
            name: self.name.clone(),
            controls: page_controls(page.total_pages, current_page),
            current_page,
            total_pages: page.total_pages,
            nrecords: self.view.active.len(),
            nloaded: self.full.len(),
            rows,
            selected_row,
            query: self.query.clone(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.uidata.popup_message.clone(),
            form: self.form_view(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }

    fn form_view(&self) -> Option<FormView> {
        if self.modus != Modus::FORM {
            return None;
        }
        self.form.as_ref().map(|form| FormView {
            fields: form
                .fields()
                .iter()
                .map(|(f, v)| (f.label().to_string(), v.clone()))
                .collect(),
            focus: form.focus(),
            input: self.last_input.clone(),
        })
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
    }

    // -------------------- Message dispatch ---------------------- //

    pub fn update(&mut self, message: Option<Message>) -> Result<(), InvError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(),
                Message::MoveDown => self.move_selection_down(),
                Message::NextPage => self.select_relative_page(true),
                Message::PrevPage => self.select_relative_page(false),
                Message::FirstPage => self.select_edge_page(false),
                Message::LastPage => self.select_edge_page(true),
                Message::SelectPage(page) => self.select_page_control(page),
                Message::GotoPage => self.enter_cmd_mode(CMDMode::GotoPage),
                Message::Search => self.enter_cmd_mode(CMDMode::Search),
                Message::ClearSearch => self.on_search(""),
                Message::CopyRecord => self.copy_record(),
                Message::Request | Message::Enter => self.open_form(true),
                Message::NewRequest => self.open_form(false),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CMDINPUT => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::FORM => match msg {
                Message::RawKey(key) => self.form_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized! w:{width}, h:{height}");
        self.render();
    }

    fn move_selection_up(&mut self) {
        self.curser_row = self.curser_row.saturating_sub(1);
        self.render();
    }

    fn move_selection_down(&mut self) {
        if self.curser_row + 1 < self.uidata.rows.len() {
            self.curser_row += 1;
        }
        self.render();
    }

    // Page changes only ever use numbers taken from the generated controls.
    fn select_relative_page(&mut self, forward: bool) {
        let controls = &self.uidata.controls;
        let target = controls.iter().position(|c| c.active).and_then(|idx| {
            if forward {
                controls.get(idx + 1)
            } else {
                idx.checked_sub(1).and_then(|i| controls.get(i))
            }
        });
        if let Some(control) = target.copied() {
            self.on_page_select(control.number);
        }
    }

    fn select_edge_page(&mut self, last: bool) {
        let control = if last {
            self.uidata.controls.last()
        } else {
            self.uidata.controls.first()
        };
        if let Some(control) = control.copied() {
            self.on_page_select(control.number);
        }
    }

    fn select_page_control(&mut self, page: usize) {
        if self.uidata.controls.iter().any(|c| c.number == page) {
            self.on_page_select(page);
        } else if self.uidata.total_pages == 0 {
            self.set_status_message("No pages");
        } else {
            self.set_status_message(format!(
                "No page {page} (1-{})",
                self.uidata.total_pages
            ));
        }
    }

    fn copy_record(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        let line = record.to_csv_line();
        trace!("Record content: {}", line);
        match self.clipboard.set_text(line) {
            Ok(_) => self.set_status_message(format!("Copied record {}", record.id)),
            Err(e) => {
                error!("Error copying to clipboard: {e}");
                self.set_status_message("Could not copy to clipboard!");
            }
        }
    }

    fn selected_record(&self) -> Option<Record> {
        self.uidata
            .selected_row
            .and_then(|idx| self.uidata.rows.get(idx))
            .cloned()
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.uidata.show_popup = false;
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;

        self.input.clear();
        if mode == CMDMode::Search
            && let Some(q) = &self.query
        {
            self.input.set(q);
        }
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.cmd_mode = self.cmd_mode;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.handle_cmd_input();
        } else {
            self.uidata.cmdinput = self.last_input.clone();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        let mode = self.cmd_mode.take();
        let canceled = self.last_input.canceled;
        let cmd_input = std::mem::take(&mut self.last_input).input;

        if canceled {
            self.render();
            return;
        }
        match mode {
            Some(CMDMode::Search) => self.on_search(cmd_input.trim()),
            Some(CMDMode::GotoPage) => match cmd_input.trim().parse::<usize>() {
                Ok(page) => self.select_page_control(page),
                Err(_) => self.set_status_message(format!("Not a page number: '{cmd_input}'")),
            },
            None => info!("Cmd mode is none!"),
        }
        self.render();
    }

    fn open_form(&mut self, from_selection: bool) {
        let form = match self.selected_record() {
            Some(record) if from_selection => RequestForm::for_record(&record),
            _ => RequestForm::default(),
        };
        trace!("Open request form ...");
        self.input.clear();
        self.input.set(form.focused_value());
        self.last_input = self.input.get();
        self.form = Some(form);
        self.previous_modus = self.modus;
        self.modus = Modus::FORM;
        self.render();
    }

    fn close_form(&mut self) {
        self.form = None;
        self.input.clear();
        self.last_input = InputResult::default();
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::FORM;
        self.render();
    }

    fn form_input(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.close_form();
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                form.set_focused_value(&self.input.get().input);
                form.next_field();
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.set_focused_value(&self.input.get().input);
                form.previous_field();
            }
            _ => {
                let result = self.input.read(key);
                if result.canceled {
                    debug!("Request form canceled");
                    self.close_form();
                    return;
                }
                if result.finished {
                    form.set_focused_value(&result.input);
                    if form.is_last_field() {
                        self.submit_form();
                        return;
                    }
                    form.next_field();
                } else {
                    self.last_input = result;
                    self.render();
                    return;
                }
            }
        }
        let value = form.focused_value().to_string();
        self.input.clear();
        self.input.set(&value);
        self.last_input = self.input.get();
        self.render();
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let draft = form.to_draft();
        let focused_value = form.focused_value().to_string();
        match self.composer.compose(&draft) {
            Ok(()) => {
                info!("Request submitted:\n{}", draft.body);
                self.set_status_message(THANK_YOU_MESSAGE);
                self.close_form();
            }
            Err(e) => {
                error!("Composing request mail failed: {e}");
                self.set_status_message(format!("Could not compose mail: {e}"));
                // Stay on the form, focus back on the last field.
                self.input.clear();
                self.input.set(&focused_value);
                self.last_input = self.input.get();
                self.render();
            }
        }
    }
}
