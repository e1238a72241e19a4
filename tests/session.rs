use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ecsync::config::{ConfigStore, ALREADY_EXISTS_MESSAGE};
use ecsync::host::{EditorHost, HostMessage};
use ecsync::properties::RawProperties;
use ecsync::save::SaveOutcome;
use ecsync::{
    BufferDocument, EditorConfigParser, EditorOptions, HostEvent, MemoryHost, Result, Session,
};

/// Parser double with per-path answers that tests rewrite between events.
#[derive(Default)]
struct ScriptedParser {
    answers: Mutex<HashMap<PathBuf, RawProperties>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedParser {
    fn answer(&self, path: &str, pairs: &[(&str, &str)]) {
        let raw = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.answers.lock().unwrap().insert(PathBuf::from(path), raw);
    }

    fn take_calls(&self) -> Vec<PathBuf> {
        let mut calls = std::mem::take(&mut *self.calls.lock().unwrap());
        calls.sort();
        calls
    }
}

#[async_trait]
impl EditorConfigParser for ScriptedParser {
    async fn parse(&self, path: &Path) -> Result<RawProperties> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}

fn opts(insert_spaces: bool, tab_size: u32) -> EditorOptions {
    EditorOptions::new(insert_spaces, NonZeroU32::new(tab_size).unwrap())
}

fn open(host: &MemoryHost, path: &str, text: &str) -> Arc<BufferDocument> {
    let document = host.open_document(BufferDocument::new(path, text));
    host.open_editor(path, opts(false, 8));
    document
}

fn statuses(host: &MemoryHost) -> Vec<String> {
    host.messages()
        .into_iter()
        .filter_map(|message| match message {
            HostMessage::Status { text, .. } => Some(text),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_open_resolves_and_syncs_active_editor() {
    let host = Arc::new(MemoryHost::new());
    let parser = ScriptedParser::default();
    parser.answer("/w/src/main.rs", &[("indent_style", "space"), ("indent_size", "2")]);
    let session = Session::new(parser, host.clone());

    let document = open(&host, "/w/src/main.rs", "fn main() {}\n");
    let editor = host.visible_editor_for(Path::new("/w/src/main.rs")).unwrap();
    host.focus(Some(editor));

    session
        .dispatch(HostEvent::DocumentOpened(document))
        .await
        .unwrap();

    assert_eq!(host.editor_options(editor), Some(opts(true, 2)));
    assert_eq!(statuses(&host), vec!["EditorConfig: Spaces: 2"]);
}

#[tokio::test]
async fn test_open_with_invalid_width_keeps_previous_entry() {
    let host = Arc::new(MemoryHost::new());
    let parser = ScriptedParser::default();
    parser.answer("/w/lib.rs", &[("indent_size", "2")]);
    let session = Session::new(parser, host.clone());
    let document = open(&host, "/w/lib.rs", "");
    let editor = host.visible_editor_for(Path::new("/w/lib.rs")).unwrap();
    host.focus(Some(editor));
    session.start().await;

    session
        .resolver()
        .parser()
        .answer("/w/lib.rs", &[("indent_size", "0")]);
    session
        .dispatch(HostEvent::DocumentOpened(document))
        .await
        .unwrap();

    let cached = session
        .resolver()
        .get_cached(Path::new("/w/lib.rs"))
        .unwrap();
    assert_eq!(cached.indent_size, NonZeroU32::new(2));
    assert_eq!(host.editor_options(editor), Some(opts(false, 2)));
}

#[tokio::test]
async fn test_untitled_documents_are_never_resolved() {
    let host = Arc::new(MemoryHost::new());
    let session = Session::new(ScriptedParser::default(), host.clone());

    let document = host.open_document(BufferDocument::untitled("Untitled-1", "draft"));
    session
        .dispatch(HostEvent::DocumentOpened(document))
        .await
        .unwrap();
    session.start().await;

    assert!(session.resolver().is_empty());
    assert!(session.resolver().parser().take_calls().is_empty());
}

#[tokio::test]
async fn test_saving_editorconfig_reresolves_every_open_path() {
    let host = Arc::new(MemoryHost::new());
    let session = Session::new(ScriptedParser::default(), host.clone());
    open(&host, "/w/a/one.rs", "");
    open(&host, "/elsewhere/two.go", "");
    session.start().await;
    session.resolver().parser().take_calls();

    session
        .resolver()
        .parser()
        .answer("/elsewhere/two.go", &[("indent_style", "tab")]);
    let config = host.open_document(BufferDocument::new("/w/.editorconfig", "root = true\n"));

    let outcome = session.on_document_saved(&*config).await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(
        session.resolver().parser().take_calls(),
        vec![
            PathBuf::from("/elsewhere/two.go"),
            PathBuf::from("/w/.editorconfig"),
            PathBuf::from("/w/a/one.rs"),
        ]
    );
    assert!(session
        .resolver()
        .get_cached(Path::new("/elsewhere/two.go"))
        .unwrap()
        .indent_style
        .is_some());
}

#[tokio::test]
async fn test_rebuild_syncs_active_editor() {
    let host = Arc::new(MemoryHost::new());
    let session = Session::new(ScriptedParser::default(), host.clone());
    open(&host, "/w/main.py", "");
    let editor = host.visible_editor_for(Path::new("/w/main.py")).unwrap();
    host.focus(Some(editor));
    session.start().await;

    session
        .resolver()
        .parser()
        .answer("/w/main.py", &[("indent_style", "space"), ("indent_size", "4")]);
    session.rebuild().await;

    assert_eq!(host.editor_options(editor), Some(opts(true, 4)));
}

#[tokio::test]
async fn test_focus_changes_are_idempotent() {
    let host = Arc::new(MemoryHost::new());
    let parser = ScriptedParser::default();
    parser.answer("/w/lib.rs", &[("indent_size", "3")]);
    let session = Session::new(parser, host.clone());
    open(&host, "/w/lib.rs", "");
    let editor = host.visible_editor_for(Path::new("/w/lib.rs")).unwrap();
    session.start().await;

    for _ in 0..3 {
        session
            .dispatch(HostEvent::ActiveEditorChanged(Some(editor)))
            .await
            .unwrap();
        assert_eq!(host.editor_options(editor), Some(opts(false, 3)));
    }
    assert_eq!(session.sync().snapshot(editor), Some(opts(false, 8)));

    session
        .dispatch(HostEvent::EditorClosed(editor))
        .await
        .unwrap();
    assert_eq!(session.sync().snapshot(editor), None);
}

#[tokio::test]
async fn test_save_inserts_final_newline() {
    let host = Arc::new(MemoryHost::new());
    let parser = ScriptedParser::default();
    parser.answer(
        "/w/notes.txt",
        &[("insert_final_newline", "true"), ("end_of_line", "crlf")],
    );
    let session = Session::new(parser, host.clone());
    let document = open(&host, "/w/notes.txt", "first\r\nlast");
    session.start().await;

    let outcome = session.on_document_saved(&*document).await.unwrap();

    assert_eq!(outcome, Some(SaveOutcome::Normalized));
    assert_eq!(
        host.document(Path::new("/w/notes.txt")).unwrap().text(),
        "first\r\nlast\r\n"
    );
    assert_eq!(host.saved_paths(), vec![PathBuf::from("/w/notes.txt")]);
}

#[tokio::test]
async fn test_save_without_visible_editor_is_skipped() {
    let host = Arc::new(MemoryHost::new());
    let parser = ScriptedParser::default();
    parser.answer("/w/notes.txt", &[("insert_final_newline", "true")]);
    let session = Session::new(parser, host.clone());
    let document = open(&host, "/w/notes.txt", "last");
    let editor = host.visible_editor_for(Path::new("/w/notes.txt")).unwrap();
    host.set_visible(editor, false);
    session.start().await;

    session
        .dispatch(HostEvent::DocumentSaved(document))
        .await
        .unwrap();

    assert!(host.edits().is_empty());
    assert_eq!(
        host.document(Path::new("/w/notes.txt")).unwrap().text(),
        "last"
    );
}

#[tokio::test]
async fn test_dispose_clears_state() {
    let host = Arc::new(MemoryHost::new());
    let parser = ScriptedParser::default();
    parser.answer("/w/a.rs", &[("indent_style", "tab")]);
    let session = Session::new(parser, host.clone());
    open(&host, "/w/a.rs", "");
    let editor = host.visible_editor_for(Path::new("/w/a.rs")).unwrap();
    host.focus(Some(editor));
    session.start().await;
    assert!(session.sync().snapshot(editor).is_some());

    session.dispose();

    assert!(session.resolver().is_empty());
    assert_eq!(session.sync().snapshot(editor), None);
}

#[derive(Default)]
struct CountingStore {
    existing: bool,
    writes: AtomicUsize,
}

impl ConfigStore for CountingStore {
    fn exists(&self, _path: &Path) -> bool {
        self.existing
    }

    fn create_new(&self, _path: &Path, _contents: &str) -> std::io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_generate_does_not_overwrite() {
    let host = Arc::new(MemoryHost::new().with_root("/w"));
    let session = Session::new(ScriptedParser::default(), host.clone());
    let store = CountingStore {
        existing: true,
        ..Default::default()
    };

    assert!(session.generate_config(&store).is_err());

    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    assert_eq!(
        host.messages(),
        vec![HostMessage::Info(ALREADY_EXISTS_MESSAGE.to_string())]
    );
}

#[tokio::test]
async fn test_generate_writes_once() {
    let host = Arc::new(MemoryHost::new().with_root("/w"));
    let session = Session::new(ScriptedParser::default(), host.clone());
    let store = CountingStore::default();

    let path = session.generate_config(&store).unwrap();

    assert_eq!(path, PathBuf::from("/w/.editorconfig"));
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}
