use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use image_editor::logging::init_tracing;
use image_editor::{EditSession, EditorConfig, FilterDispatcher, PluginRegistry};

const HELP: &str =
    "commands: open <path>, save <path>, filter <name>, prev, next, filters, info, clear, quit";

/// Main application state
struct ImageEditor {
    /// The editing session (current image, filters, navigation)
    session: EditSession,
    /// Status message to display to the user
    status: String,
}

/// User intents read from the command line
#[derive(Debug, Clone, PartialEq)]
enum Message {
    Open(PathBuf),
    SaveAs(PathBuf),
    Filter(String),
    PreviousImage,
    NextImage,
    ListFilters,
    Info,
    Clear,
    Help,
    Quit,
}

impl Message {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let require = |what: &str| {
            if arg.is_empty() {
                Err(format!("usage: {command} <{what}>"))
            } else {
                Ok(arg.to_string())
            }
        };

        match command {
            "open" => require("path").map(|p| Message::Open(PathBuf::from(p))),
            "save" => require("path").map(|p| Message::SaveAs(PathBuf::from(p))),
            "filter" => require("name").map(Message::Filter),
            "prev" | "previous" => Ok(Message::PreviousImage),
            "next" => Ok(Message::NextImage),
            "filters" => Ok(Message::ListFilters),
            "info" => Ok(Message::Info),
            "clear" => Ok(Message::Clear),
            "help" => Ok(Message::Help),
            "quit" | "exit" => Ok(Message::Quit),
            other => Err(format!("unknown command \"{other}\" (try \"help\")")),
        }
    }
}

impl ImageEditor {
    /// Create a new instance of the application
    fn new(config: &EditorConfig) -> Self {
        // Discovery finishes before the session accepts any request.
        let (registry, report) = PluginRegistry::load(config);
        let session = EditSession::new(FilterDispatcher::new(registry), config.limits);
        let status = format!("Ready. {}.", report.summary());
        ImageEditor { session, status }
    }

    /// Handle one message and update the status line
    fn update(&mut self, message: Message) {
        // `Some(text)` overrides the status; `None` shows the current image info.
        let result = match message {
            Message::Open(path) => self.session.open(&path).map(|_| None),
            Message::SaveAs(path) => self
                .session
                .save(&path)
                .map(|()| Some(format!("Saved {}", path.display()))),
            Message::Filter(name) => self.session.apply_filter(&name).map(|_| None),
            Message::PreviousImage => self.session.go_previous().map(|_| None),
            Message::NextImage => self.session.go_next().map(|_| None),
            Message::ListFilters => Ok(Some(self.session.filter_names().join(", "))),
            Message::Info | Message::Quit => Ok(None),
            Message::Clear => {
                self.session.clear();
                Ok(None)
            }
            Message::Help => Ok(Some(HELP.to_string())),
        };

        self.status = match result {
            Ok(Some(text)) => text,
            Ok(None) => self
                .session
                .info()
                .map_or_else(|| "No image loaded.".to_string(), |info| info.to_string()),
            Err(err) => format!("Error: {err}"),
        };
    }
}

fn main() -> io::Result<()> {
    let config = EditorConfig::load();
    init_tracing(&config.log_level);

    let mut app = ImageEditor::new(&config);
    println!("{}", app.status);

    if let Some(path) = std::env::args_os().nth(1) {
        app.update(Message::Open(PathBuf::from(path)));
        println!("{}", app.status);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match Message::parse(&line) {
            Ok(Message::Quit) => break,
            Ok(message) => {
                app.update(message);
                println!("{}", app.status);
            }
            Err(usage) => println!("{usage}"),
        }
    }

    Ok(())
}
