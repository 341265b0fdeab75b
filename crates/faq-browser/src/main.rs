mod app;
mod command;
mod config;
mod error;
mod filter;
mod model;
mod normalize;
mod pagination;
mod selection;
mod state;
mod surface;
mod view;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use faq_common::clipboard::Clipboard;

use app::App;
use command::{parse_command, Command, HELP};
use config::Config;
use selection::Selection;
use state::BrowserState;
use surface::{HtmlSurface, Surface, TextSurface};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting faq browser");

    let config = Config::from_env()?;
    info!(
        kb = ?config.kb_path,
        page_url = %config.page_url,
        html_out = ?config.html_out,
        "configuration loaded"
    );

    let items = normalize::load_or_empty(config.kb_path.as_deref());
    let selection = if config.categories.is_empty() {
        Selection::from_categories(&normalize::categories(&items))
    } else {
        Selection::new(config.categories.iter().cloned())
    };
    info!(items = items.len(), chips = selection.chips().len(), "knowledge base loaded");

    let mut surfaces: Vec<Box<dyn Surface>> = vec![Box::new(TextSurface::new(std::io::stdout()))];
    if let Some(path) = &config.html_out {
        surfaces.push(Box::new(HtmlSurface::new(config.html_template.clone(), path.clone())));
    }

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let clipboard = Clipboard::new(config.clipboard_cmd.as_deref());
    info!(command = clipboard.has_command(), "clipboard configured");
    let mut app = App::new(
        items,
        BrowserState::new(selection, config.page_url.clone()),
        surfaces,
        clipboard,
        notice_tx,
    );
    app.start();

    info!("ready, reading commands on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = app.notification_deadline();
        let expiry = tokio::time::sleep_until(
            deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std),
        );
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => run(&mut app, command)?,
                    Err(e) => println!("error: {e}"),
                }
            }
            Some(notice) = notice_rx.recv() => app.notify(notice),
            () = expiry, if deadline.is_some() => app.expire_notification(),
        }
    }

    info!("faq browser shut down");
    Ok(())
}

fn run(app: &mut App, command: Command) -> anyhow::Result<()> {
    let events = match command {
        Command::Event(event) => vec![event],
        Command::Events(events) => events,
        Command::Url => {
            println!("{}", app.state().page_url);
            return Ok(());
        }
        Command::View => {
            if let Some(view) = app.view() {
                println!("{}", serde_json::to_string_pretty(view)?);
            }
            return Ok(());
        }
        Command::Inspect => {
            println!("{}", serde_json::to_string_pretty(&app.handle_info())?);
            return Ok(());
        }
        Command::Help => {
            print!("{HELP}");
            return Ok(());
        }
        Command::Quit | Command::Nothing => return Ok(()),
    };

    for event in events {
        if let Err(e) = app.dispatch(event) {
            warn!(error = %e, "event rejected");
            println!("error: {e}");
        }
    }
    Ok(())
}
