use std::process::ExitCode;

use clap::Parser;
use tracing::info;

mod clipboard;
mod controller;
mod domain;
mod filter;
mod inputter;
mod logging;
mod mail;
mod model;
mod paginator;
mod parser;
mod record;
mod source;
mod ui;

use controller::Controller;
use domain::{Args, InvConfig, InvError, Message};
use model::{Model, Status};
use source::DataSource;
use ui::TableUI;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run(args: Args) -> Result<(), InvError> {
    let cfg = InvConfig::try_from(args)?;
    logging::init_logging(cfg.log_file.as_deref())?;
    info!("Starting noteworthy with {:?}", cfg);

    // Loaded once, before the first frame is drawn.
    let source = DataSource::new(cfg.data_path.clone());
    info!("Inventory source: {}", source.path().display());
    let mut model = Model::init(&cfg, &source.name());
    match source.read_text() {
        Ok(text) => model.on_load(&text),
        Err(e) => model.on_load_failed(&e),
    }

    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    model.update(Some(Message::Resize(
        size.width as usize,
        size.height as usize,
    )))?;

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye!");
    Ok(())
}
