use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use clap::Parser;
use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const DEFAULT_DATA_FILE: &str = "inventory.csv";
pub const DEFAULT_LOG_FILE: &str = "noteworthy.log";
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_EVENT_POLL_TIME: u64 = 100;

pub const HELP_TEXT: &str = "\
 NoteWorthy inventory

 Pages
   l, →, PgDn    next page
   h, ←, PgUp    previous page
   g, Home       first page
   G, End        last page
   1-9           jump to page
   :             go to page ...

 Records
   j, ↓          move down
   k, ↑          move up
   y             copy record
   r, Enter      request selected instrument
   R             new request form

 Search
   /             search name, size and quality
   c             clear search

 Other
   ?             this help
   Esc           close popup / form
   q             quit
";

/// Messages the controller sends to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    SelectPage(usize),
    GotoPage,
    Search,
    ClearSearch,
    CopyRecord,
    Request,
    NewRequest,
    Help,
    Enter,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

/// What the command line is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
    GotoPage,
}

#[derive(Debug)]
pub enum InvError {
    IoError(Error),
    FileNotFound(PathBuf),
    PermissionDenied(PathBuf),
    NotAFile(PathBuf),
    InvalidConfig(String),
    Clipboard(String),
    Logging(String),
}

impl InvError {
    /// True for failures that mean the inventory source could not be read at all.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            InvError::FileNotFound(_) | InvError::PermissionDenied(_) | InvError::NotAFile(_)
        )
    }
}

impl fmt::Display for InvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvError::IoError(e) => write!(f, "io error: {e}"),
            InvError::FileNotFound(p) => write!(f, "file not found: {}", p.display()),
            InvError::PermissionDenied(p) => write!(f, "permission denied: {}", p.display()),
            InvError::NotAFile(p) => write!(f, "not a file: {}", p.display()),
            InvError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            InvError::Clipboard(msg) => write!(f, "clipboard error: {msg}"),
            InvError::Logging(msg) => write!(f, "logging setup failed: {msg}"),
        }
    }
}

impl std::error::Error for InvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for InvError {
    fn from(err: Error) -> Self {
        InvError::IoError(err)
    }
}

impl From<arboard::Error> for InvError {
    fn from(err: arboard::Error) -> Self {
        InvError::Clipboard(err.to_string())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "noteworthy",
    version,
    about = "A tui based instrument inventory browser."
)]
pub struct Args {
    /// Inventory file (csv with header: id,name,size,quality)
    #[arg(default_value = DEFAULT_DATA_FILE)]
    pub data_file: String,

    /// Number of records shown per page
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Event poll time in milliseconds
    #[arg(long, default_value_t = DEFAULT_EVENT_POLL_TIME)]
    pub poll_ms: u64,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: String,

    /// Disable logging
    #[arg(long)]
    pub no_log: bool,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct InvConfig {
    pub data_path: PathBuf,
    pub page_size: usize,
    pub event_poll_time: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for InvConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            page_size: DEFAULT_PAGE_SIZE,
            event_poll_time: DEFAULT_EVENT_POLL_TIME,
            log_file: None,
        }
    }
}

impl TryFrom<Args> for InvConfig {
    type Error = InvError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.page_size == 0 {
            return Err(InvError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        let log_file = if args.no_log {
            None
        } else {
            Some(expand_path(&args.log_file)?)
        };
        Ok(InvConfig {
            data_path: expand_path(&args.data_file)?,
            page_size: args.page_size,
            event_poll_time: args.poll_ms,
            log_file,
        })
    }
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, InvError> {
    shellexpand::full(raw)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| InvError::InvalidConfig(format!("cannot expand '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["noteworthy"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_inventory_page() {
        let cfg = InvConfig::try_from(args(&[])).unwrap();
        assert_eq!(cfg.page_size, 5);
        assert_eq!(cfg.data_path, PathBuf::from("inventory.csv"));
        assert_eq!(cfg.log_file, Some(PathBuf::from("noteworthy.log")));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = InvConfig::try_from(args(&["-p", "0"])).unwrap_err();
        assert!(matches!(err, InvError::InvalidConfig(_)));
    }

    #[test]
    fn no_log_disables_log_file() {
        let cfg = InvConfig::try_from(args(&["--no-log", "stock.csv"])).unwrap();
        assert!(cfg.log_file.is_none());
        assert_eq!(cfg.data_path, PathBuf::from("stock.csv"));
    }

    #[test]
    fn plain_paths_are_kept() {
        let path = expand_path("data/inventory.csv").unwrap();
        assert_eq!(path, PathBuf::from("data/inventory.csv"));
    }

    #[test]
    fn unknown_variables_are_config_errors() {
        let err = expand_path("$NOTEWORTHY_SURELY_UNSET_VAR/inv.csv").unwrap_err();
        assert!(matches!(err, InvError::InvalidConfig(_)));
    }

    #[test]
    fn setters_override_defaults() {
        let cfg = InvConfig::default().with_page_size(3).with_event_poll_time(10);
        assert_eq!(cfg.page_size, 3);
        assert_eq!(cfg.event_poll_time, 10);
    }

    #[test]
    fn source_errors_are_classified() {
        assert!(InvError::FileNotFound(PathBuf::from("x")).is_source_unavailable());
        assert!(!InvError::InvalidConfig("x".into()).is_source_unavailable());
    }
}
