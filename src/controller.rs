use std::time::Duration;
use tracing::trace;

use crate::domain::{InvConfig, InvError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &InvConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, InvError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            let event = event::read()?;
            return Ok(self.map_event(event, model));
        }
        Ok(None)
    }

    pub fn map_event(&self, event: Event, model: &Model) -> Option<Message> {
        match event {
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            // crossterm also emits key release and repeat events on Windows.
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Some(Message::RawKey(key))
                } else {
                    self.handle_key(key, model)
                }
            }
            _ => None,
        }
    }

    fn handle_key(&self, key: event::KeyEvent, model: &Model) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::MoveUp),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => Some(Message::NextPage),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => Some(Message::PrevPage),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::FirstPage),
            KeyCode::Char('G') | KeyCode::End => Some(Message::LastPage),
            KeyCode::Char(c @ '1'..='9') => {
                let page = c.to_digit(10).map(|d| d as usize)?;
                // Only pages that have a control can be selected.
                model
                    .page_controls()
                    .iter()
                    .any(|control| control.number == page)
                    .then_some(Message::SelectPage(page))
            }
            KeyCode::Char(':') => Some(Message::GotoPage),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Char('c') => Some(Message::ClearSearch),
            KeyCode::Char('y') => Some(Message::CopyRecord),
            KeyCode::Char('r') => Some(Message::Request),
            KeyCode::Char('R') => Some(Message::NewRequest),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::TextSink;
    use crate::mail::{MailComposer, MailDraft};
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    struct NoSink;

    impl TextSink for NoSink {
        fn set_text(&mut self, _text: String) -> Result<(), InvError> {
            Ok(())
        }
    }

    impl MailComposer for NoSink {
        fn compose(&mut self, _draft: &MailDraft) -> Result<(), InvError> {
            Ok(())
        }
    }

    fn setup() -> (Controller, Model) {
        let cfg = InvConfig::default();
        let model = Model::with_collaborators(&cfg, "inventory.csv", Box::new(NoSink), Box::new(NoSink));
        (Controller::new(&cfg), model)
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn maps_navigation_keys() {
        let (controller, model) = setup();
        assert_eq!(
            controller.map_event(press(KeyCode::Char('q')), &model),
            Some(Message::Quit)
        );
        assert_eq!(
            controller.map_event(press(KeyCode::Right), &model),
            Some(Message::NextPage)
        );
        assert_eq!(
            controller.map_event(press(KeyCode::Char('/')), &model),
            Some(Message::Search)
        );
        assert_eq!(
            controller.map_event(Event::Resize(80, 24), &model),
            Some(Message::Resize(80, 24))
        );
    }

    #[test]
    fn digits_only_select_existing_pages() {
        let (controller, mut model) = setup();
        model.on_load("h\n1,a,b,c\n2,a,b,c\n3,a,b,c\n4,a,b,c\n5,a,b,c\n6,a,b,c\n");
        assert_eq!(
            controller.map_event(press(KeyCode::Char('2')), &model),
            Some(Message::SelectPage(2))
        );
        assert_eq!(controller.map_event(press(KeyCode::Char('3')), &model), None);
    }

    #[test]
    fn text_input_receives_raw_keys() {
        let (controller, mut model) = setup();
        model.update(Some(Message::Search)).unwrap();
        let event = press(KeyCode::Char('q'));
        assert!(matches!(
            controller.map_event(event, &model),
            Some(Message::RawKey(_))
        ));
    }

    #[test]
    fn key_release_is_ignored() {
        let (controller, model) = setup();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(controller.map_event(Event::Key(key), &model), None);
    }
}
