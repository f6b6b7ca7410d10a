use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use landtext::app::infrastructure::file_io::LocalFileIo;
use landtext::app::infrastructure::host::{CloseDecision, RenderFrame, WindowHost};
use landtext::app::infrastructure::logging;
use landtext::app::infrastructure::persistence::JsonFileBackend;
use landtext::app::{AppError, Color, ColorSet, Direction, EditorEvent, ThemeKind, WindowId, Workspace};

const HELP: &str = "\
Lines not starting with ':' are typed into the active window.
  :open PATH        open a file            :w [PATH]      save / save as
  :new              new document           :q / :qa       close window / all
  :undo  :redo      undo / redo            :bs  :del      delete back / forward
  :goto N           move cursor            :select A B    select characters A..B
  :find T  :rfind T find next / previous   :findall T     highlight all
  :clear            clear highlights       :p             print the document
  :theme NAME       apply light|dark|custom
  :preview-theme NAME   :preview-font N   :cancel   preview, then cancel
  :font N           apply font size (8-32)
  :custom BG FG SELBG SELFG BARBG BARFG   save custom colours
  :new-window  :win N  :windows            manage windows";

/// What a console window last showed.
#[derive(Default)]
struct ConsoleView {
    title: String,
    status: String,
    frame: Option<RenderFrame>,
}

type Views = Rc<RefCell<BTreeMap<WindowId, ConsoleView>>>;

/// A window drawn as lines on stdout, with dialogs answered on stdin.
struct ConsoleHost {
    id: WindowId,
    views: Views,
}

impl ConsoleHost {
    fn with_view(&self, f: impl FnOnce(&mut ConsoleView)) {
        f(self.views.borrow_mut().entry(self.id).or_default());
    }
}

impl WindowHost for ConsoleHost {
    fn render(&mut self, frame: &RenderFrame) {
        self.with_view(|view| view.frame = Some(frame.clone()));
    }

    fn set_title(&mut self, title: &str) {
        self.with_view(|view| view.title = title.to_string());
    }

    fn set_status(&mut self, status: &str) {
        self.with_view(|view| view.status = status.to_string());
    }

    fn show_message(&mut self, message: &str) {
        println!("[{}] {}", self.id, message);
    }

    fn confirm_unsaved(&mut self, document_name: &str) -> CloseDecision {
        let answer = prompt(&format!(
            "[{}] \"{}\" has unsaved changes. [s]ave, [d]on't save, [c]ancel? ",
            self.id, document_name
        ));
        match answer.as_deref().map(str::trim) {
            Some("s") | Some("save") => CloseDecision::Save,
            Some("d") | Some("discard") => CloseDecision::Discard,
            _ => CloseDecision::Cancel,
        }
    }

    fn choose_save_path(&mut self) -> Option<PathBuf> {
        prompt(&format!("[{}] Save as: ", self.id))
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
    }
}

fn prompt(question: &str) -> Option<String> {
    print!("{}", question);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

/// One parsed console line.
#[derive(Debug, PartialEq)]
enum Command {
    Event(EditorEvent),
    ApplyTheme(ThemeKind),
    PreviewTheme(ThemeKind),
    CloseAll,
    SwitchWindow(u64),
    ListWindows,
    Print,
    Help,
}

fn parse_theme(name: &str) -> Result<ThemeKind, String> {
    ThemeKind::all()
        .iter()
        .copied()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("unknown theme '{}'", name))
}

fn parse_number<T: std::str::FromStr>(arg: &str) -> Result<T, String> {
    arg.trim().parse().map_err(|_| format!("expected a number, got '{}'", arg))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Command::Event(EditorEvent::Insert(format!("{}\n", line))));
    };
    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };
    let needs_arg = || {
        if arg.is_empty() {
            Err(format!(":{} needs an argument", name))
        } else {
            Ok(arg)
        }
    };

    let event = match name {
        "open" => EditorEvent::FileOpen(PathBuf::from(needs_arg()?)),
        "w" if arg.is_empty() => EditorEvent::FileSave,
        "w" => EditorEvent::FileSaveAs(PathBuf::from(arg)),
        "new" => EditorEvent::FileNew,
        "q" => EditorEvent::WindowClose,
        "qa" => return Ok(Command::CloseAll),
        "undo" => EditorEvent::Undo,
        "redo" => EditorEvent::Redo,
        "bs" => EditorEvent::DeleteBackward,
        "del" => EditorEvent::DeleteForward,
        "goto" => EditorEvent::MoveCursor(parse_number(needs_arg()?)?),
        "select" => {
            let (start, end) = needs_arg()?
                .split_once(' ')
                .ok_or_else(|| ":select needs two positions".to_string())?;
            EditorEvent::Select {
                start: parse_number(start)?,
                end: parse_number(end)?,
            }
        }
        "find" => EditorEvent::Find {
            query: needs_arg()?.to_string(),
            direction: Direction::Forward,
        },
        "rfind" => EditorEvent::Find {
            query: needs_arg()?.to_string(),
            direction: Direction::Backward,
        },
        "findall" => EditorEvent::FindAll(needs_arg()?.to_string()),
        "clear" => EditorEvent::ClearHighlights,
        "theme" => return parse_theme(needs_arg()?).map(Command::ApplyTheme),
        "preview-theme" => return parse_theme(needs_arg()?).map(Command::PreviewTheme),
        "font" => EditorEvent::ApplyFontSize(parse_number(needs_arg()?)?),
        "preview-font" => EditorEvent::PreviewFontSize(parse_number(needs_arg()?)?),
        "cancel" => EditorEvent::CancelPreview,
        "custom" => {
            let colors = needs_arg()?
                .split_whitespace()
                .map(|c| c.parse::<Color>())
                .collect::<Result<Vec<_>, _>>()?;
            let [background, text, selection_background, selection_text, status_bar_background, status_bar_text] =
                colors[..]
            else {
                return Err(":custom needs six colours".to_string());
            };
            EditorEvent::SaveCustomColors(ColorSet {
                background,
                text,
                selection_background,
                selection_text,
                status_bar_background,
                status_bar_text,
            })
        }
        "new-window" => EditorEvent::OpenNewWindow,
        "win" => return parse_number(needs_arg()?).map(Command::SwitchWindow),
        "windows" => return Ok(Command::ListWindows),
        "p" => return Ok(Command::Print),
        "help" | "h" => return Ok(Command::Help),
        other => return Err(format!("unknown command ':{}' (try :help)", other)),
    };
    Ok(Command::Event(event))
}

fn print_document(views: &Views, id: WindowId) {
    let views = views.borrow();
    let Some(frame) = views.get(&id).and_then(|v| v.frame.as_ref()) else {
        return;
    };
    println!(
        "--- {} | theme bg {} | {}pt ---",
        views[&id].title, frame.colors.background, frame.font_size
    );
    for (number, line) in frame.text.split('\n').enumerate() {
        println!("{:>4} {}", number + 1, line);
    }
    println!("---");
}

fn print_status(views: &Views, id: WindowId) {
    if let Some(view) = views.borrow().get(&id) {
        println!("[{}] {} | {}", id, view.title, view.status);
    }
}

fn report(error: &AppError) {
    match error {
        AppError::NothingToUndo | AppError::NothingToRedo => tracing::debug!("{}", error),
        _ => println!("! {}", error),
    }
}

fn main() {
    logging::init();

    let views: Views = Rc::new(RefCell::new(BTreeMap::new()));
    let host_views = views.clone();
    let backend = JsonFileBackend::at_default_location();
    tracing::info!(path = %backend.path().display(), "using settings file");

    let mut workspace = Workspace::new(Box::new(backend), Rc::new(LocalFileIo), move |id| {
        Box::new(ConsoleHost {
            id,
            views: host_views.clone(),
        }) as Box<dyn WindowHost>
    });
    if let Some(warning) = workspace.take_startup_warning() {
        println!("! {}. Using default settings.", warning);
    }

    for arg in std::env::args().skip(1) {
        if let Err(e) = workspace.open_window_with_file(&PathBuf::from(&arg)) {
            println!("! {}: {}", arg, e);
        }
    }
    if workspace.is_empty() {
        workspace.open_window();
    }

    let mut active = workspace.window_ids()[0];
    print_status(&views, active);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        }
        let input = line.trim_end_matches(['\n', '\r']);

        let command = match parse_command(input) {
            Ok(command) => command,
            Err(message) => {
                println!("! {}", message);
                continue;
            }
        };

        let opened_before = workspace.window_ids();
        let result = match command {
            Command::Event(event) => workspace.dispatch(active, event),
            Command::ApplyTheme(kind) => {
                let theme = workspace.theme_for(kind);
                workspace.dispatch(active, EditorEvent::ApplyTheme(theme))
            }
            Command::PreviewTheme(kind) => {
                let theme = workspace.theme_for(kind);
                workspace.dispatch(active, EditorEvent::PreviewTheme(theme))
            }
            Command::CloseAll => workspace.close_all().map(|_| ()),
            Command::SwitchWindow(n) => {
                if workspace.contains(WindowId(n)) {
                    active = WindowId(n);
                    Ok(())
                } else {
                    Err(AppError::UnknownWindow(WindowId(n)))
                }
            }
            Command::ListWindows => {
                for id in workspace.window_ids() {
                    let marker = if id == active { '*' } else { ' ' };
                    if let Some(view) = views.borrow().get(&id) {
                        println!("{} {} {}", marker, id, view.title);
                    }
                }
                Ok(())
            }
            Command::Print => {
                print_document(&views, active);
                Ok(())
            }
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
        };
        if let Err(e) = result {
            report(&e);
        }

        if workspace.is_empty() {
            break;
        }
        let opened_now = workspace.window_ids();
        if let Some(new) = opened_now.iter().find(|id| !opened_before.contains(id)) {
            active = *new;
        } else if !workspace.contains(active) {
            if let Some(last) = opened_now.last() {
                active = *last;
            }
        }
        views.borrow_mut().retain(|id, _| opened_now.contains(id));
        print_status(&views, active);
    }

    tracing::info!("exiting");
}
