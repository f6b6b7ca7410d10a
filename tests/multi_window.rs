use std::cell::RefCell;
use std::rc::Rc;

use landtext::app::infrastructure::file_io::LocalFileIo;
use landtext::app::infrastructure::host::{CloseDecision, HeadlessHost, WindowHost};
use landtext::app::infrastructure::persistence::{JsonFileBackend, MemoryBackend, SettingsBackend};
use landtext::app::{AppError, Direction, EditorEvent, Theme, ThemeKind, WindowId, Workspace};

fn workspace_with(backend: Box<dyn SettingsBackend>) -> (Workspace, Rc<RefCell<Vec<HeadlessHost>>>) {
    let hosts = Rc::new(RefCell::new(Vec::new()));
    let created = hosts.clone();
    let workspace = Workspace::new(backend, Rc::new(LocalFileIo), move |_id| {
        let host = HeadlessHost::new();
        created.borrow_mut().push(host.clone());
        Box::new(host) as Box<dyn WindowHost>
    });
    (workspace, hosts)
}

fn host(hosts: &Rc<RefCell<Vec<HeadlessHost>>>, id: WindowId) -> HeadlessHost {
    hosts.borrow()[(id.0 - 1) as usize].clone()
}

#[test]
fn edit_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letter.txt");
    let (mut workspace, hosts) = workspace_with(Box::new(MemoryBackend::new()));
    let id = workspace.open_window();

    workspace.dispatch(id, EditorEvent::Insert("Dear reader,\nhello".to_string())).unwrap();
    workspace.dispatch(id, EditorEvent::FileSaveAs(path.clone())).unwrap();
    assert_eq!(host(&hosts, id).title(), "LandText - letter.txt");
    assert_eq!(host(&hosts, id).status(), "Line: 2, Column: 5");

    let second = workspace.open_window_with_file(&path).unwrap();
    let text = workspace.with_window(second, |w| w.document().text().to_string()).unwrap();
    assert_eq!(text, "Dear reader,\nhello");

    workspace.dispatch(second, EditorEvent::Find {
        query: "hello".to_string(),
        direction: Direction::Forward,
    })
    .unwrap();
    assert_eq!(workspace.with_window(second, |w| w.selection()).unwrap(), Some(13..18));
}

#[test]
fn settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");

    {
        let (mut workspace, _hosts) = workspace_with(Box::new(JsonFileBackend::new(&settings_path)));
        let id = workspace.open_window();
        workspace.dispatch(id, EditorEvent::ApplyTheme(Theme::Dark)).unwrap();
        workspace.dispatch(id, EditorEvent::ApplyFontSize(22)).unwrap();
    }

    let (mut workspace, hosts) = workspace_with(Box::new(JsonFileBackend::new(&settings_path)));
    assert!(workspace.take_startup_warning().is_none());
    let id = workspace.open_window();
    let frame = host(&hosts, id).last_frame().unwrap();
    assert_eq!(frame.colors, Theme::Dark.colors());
    assert_eq!(frame.font_size.get(), 22);
}

#[test]
fn custom_theme_applies_everywhere() {
    let backend = MemoryBackend::new();
    let (mut workspace, hosts) = workspace_with(Box::new(backend.clone()));
    let a = workspace.open_window();
    let b = workspace.open_window();

    let mut palette = Theme::Dark.colors();
    palette.background = "#102030".parse().unwrap();
    workspace.dispatch(a, EditorEvent::SaveCustomColors(palette)).unwrap();
    assert_eq!(workspace.settings().theme, Theme::Light);

    let custom = workspace.theme_for(ThemeKind::Custom);
    workspace.dispatch(b, EditorEvent::ApplyTheme(custom)).unwrap();

    for id in [a, b] {
        assert_eq!(host(&hosts, id).last_frame().unwrap().colors, palette);
    }
    assert_eq!(backend.get("theme").as_deref(), Some("Custom"));
    assert_eq!(backend.get("custom.background").as_deref(), Some("#102030"));
}

#[test]
fn unwritable_settings_still_apply_for_the_session() {
    let backend = MemoryBackend::new();
    backend.set_fail_writes(true);
    let (mut workspace, hosts) = workspace_with(Box::new(backend.clone()));
    let a = workspace.open_window();
    let b = workspace.open_window();

    workspace.dispatch(a, EditorEvent::ApplyFontSize(30)).unwrap();
    assert_eq!(host(&hosts, b).last_frame().unwrap().font_size.get(), 30);
    assert!(!host(&hosts, a).messages().is_empty());
    assert!(backend.entries().is_empty());
}

#[test]
fn quitting_with_unsaved_work() {
    let dir = tempfile::tempdir().unwrap();
    let (mut workspace, hosts) = workspace_with(Box::new(MemoryBackend::new()));
    let a = workspace.open_window();
    workspace.dispatch(a, EditorEvent::OpenNewWindow).unwrap();
    let b = workspace.window_ids()[1];

    workspace.dispatch(a, EditorEvent::Insert("first".to_string())).unwrap();
    workspace.dispatch(b, EditorEvent::Insert("second".to_string())).unwrap();

    host(&hosts, a).queue_decision(CloseDecision::Save);
    host(&hosts, a).queue_save_path(dir.path().join("first.txt"));
    host(&hosts, b).queue_decision(CloseDecision::Discard);

    assert!(workspace.close_all().unwrap());
    assert!(workspace.is_empty());
    assert_eq!(std::fs::read_to_string(dir.path().join("first.txt")).unwrap(), "first");
    assert!(matches!(
        workspace.dispatch(a, EditorEvent::Undo),
        Err(AppError::UnknownWindow(_))
    ));
}
