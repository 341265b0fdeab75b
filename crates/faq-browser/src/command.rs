use crate::app::Event;
use crate::error::AppError;
use crate::view::CardRef;

pub const HELP: &str = "\
commands:
  chip <label>      select a category chip
  type <text>       put text in the search box
  search [text]     submit the search box (optionally typing first)
  enter             press Enter in the search box
  more              load more results
  show <n|id>       show or hide an answer
  copy <n|id>       copy an answer to the clipboard
  render            redraw with the current state
  url               print the page url
  view              print the current view-model as JSON
  inspect           print the loaded collection as JSON
  help              this text
  quit              exit
";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(Event),
    /// `search <text>` types, then submits
    Events(Vec<Event>),
    Url,
    View,
    Inspect,
    Help,
    Quit,
    Nothing,
}

pub fn parse_command(line: &str) -> Result<Command, AppError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(Command::Nothing);
    }
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (trimmed, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "chip" | "category" => Command::Event(Event::SelectCategory(required(verb, rest)?.to_string())),
        "type" => Command::Event(Event::TypeSearch(rest.to_string())),
        "search" if rest.trim().is_empty() => Command::Event(Event::SubmitSearch),
        "search" => Command::Events(vec![Event::TypeSearch(rest.to_string()), Event::SubmitSearch]),
        "enter" => Command::Event(Event::SubmitSearch),
        "more" => Command::Event(Event::LoadMore),
        "show" | "hide" => Command::Event(Event::ToggleAnswer(CardRef::parse(required(verb, rest)?))),
        "copy" => Command::Event(Event::CopyAnswer(CardRef::parse(required(verb, rest)?))),
        "render" => Command::Event(Event::Render),
        "url" => Command::Url,
        "view" => Command::View,
        "inspect" => Command::Inspect,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(AppError::UnknownCommand(trimmed.to_string())),
    };
    Ok(command)
}

fn required<'a>(verb: &str, rest: &'a str) -> Result<&'a str, AppError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(AppError::UnknownCommand(format!("{verb} needs an argument")));
    }
    Ok(rest)
}
