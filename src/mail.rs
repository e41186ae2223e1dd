//! Instrument request form and the mail draft it turns into.
//!
//! Submitting the form does not send anything by itself. The fields are
//! serialized as `key: value` lines into a draft for the administrator and
//! handed to a [`MailComposer`], which makes the draft available to a mail
//! client.

use tracing::info;

use crate::clipboard::TextSink;
use crate::domain::InvError;
use crate::record::Record;

pub const ADMIN_EMAIL: &str = "noteworthy_admin@gmail.com";
pub const MAIL_SUBJECT: &str = "NoteWorthy Instrument Application Submission";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Instrument,
    Size,
    Message,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::Instrument,
        FormField::Size,
        FormField::Message,
    ];

    /// Key used in the serialized body.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Instrument => "instrument",
            FormField::Size => "size",
            FormField::Message => "message",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Instrument => "Instrument",
            FormField::Size => "Size",
            FormField::Message => "Message",
        }
    }
}

pub struct RequestForm {
    values: Vec<(FormField, String)>,
    focus: usize,
}

impl Default for RequestForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestForm {
    pub fn new() -> Self {
        Self {
            values: FormField::ALL.iter().map(|f| (*f, String::new())).collect(),
            focus: 0,
        }
    }

    /// A form asking for the given instrument.
    pub fn for_record(record: &Record) -> Self {
        let mut form = Self::new();
        form.set(FormField::Instrument, &record.name);
        form.set(FormField::Size, &record.size);
        form
    }

    pub fn fields(&self) -> &[(FormField, String)] {
        &self.values
    }

    pub fn set(&mut self, field: FormField, value: &str) {
        if let Some((_, v)) = self.values.iter_mut().find(|(f, _)| *f == field) {
            *v = value.to_string();
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_value(&self) -> &str {
        &self.values[self.focus].1
    }

    pub fn set_focused_value(&mut self, value: &str) {
        self.values[self.focus].1 = value.to_string();
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 == self.values.len()
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.values.len();
    }

    pub fn previous_field(&mut self) {
        self.focus = self.focus.checked_sub(1).unwrap_or(self.values.len() - 1);
    }

    /// All fields, empty ones included, as `key: value` lines.
    pub fn serialize(&self) -> String {
        self.values
            .iter()
            .map(|(field, value)| format!("{}: {}", field.key(), value))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_draft(&self) -> MailDraft {
        MailDraft {
            to: ADMIN_EMAIL.to_string(),
            subject: MAIL_SUBJECT.to_string(),
            body: self.serialize(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn mailto_uri(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to,
            encode_component(&self.subject),
            encode_component(&self.body)
        )
    }
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Opens a draft in whatever mail client the user has.
pub trait MailComposer {
    fn compose(&mut self, draft: &MailDraft) -> Result<(), InvError>;
}

/// Puts the `mailto:` link of the draft on a text sink, by default the
/// system clipboard, so it can be pasted into a browser or mail client.
pub struct ClipboardComposer<S: TextSink> {
    sink: S,
}

impl<S: TextSink> ClipboardComposer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: TextSink> MailComposer for ClipboardComposer<S> {
    fn compose(&mut self, draft: &MailDraft) -> Result<(), InvError> {
        let uri = draft.mailto_uri();
        info!("Composed request mail to {} ({} bytes)", draft.to, uri.len());
        self.sink.set_text(uri)
    }
}
