use arboard::Clipboard;
use tracing::trace;

use crate::domain::InvError;

/// Somewhere text can be handed to the user outside of the terminal.
pub trait TextSink {
    fn set_text(&mut self, text: String) -> Result<(), InvError>;
}

/// The system clipboard. Opened on first use, so a missing display server
/// only fails the copy, not the whole program.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl TextSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), InvError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text)?;
            trace!("Copied text to clipboard.");
        }
        Ok(())
    }
}
