use crate::config::Config;
use crate::editor::{Editor, HELP_TEXT};
use crate::error::Result;
use crate::highlight::Highlight;
use crate::input::{InputSeq, KeySeq};
use crate::screen::StatusMessageKind;
use crate::syntax::{SyntaxFlags, SyntaxRegistry, SyntaxRule};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::{self, Write};

use KeySeq::*;

struct DummyInputs(Vec<InputSeq>);

impl Iterator for DummyInputs {
    type Item = Result<InputSeq>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            None
        } else {
            Some(Ok(self.0.remove(0)))
        }
    }
}

struct Discard;

impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn key(c: char) -> InputSeq {
    InputSeq::new(Key(c as u8))
}

fn ctrl(c: char) -> InputSeq {
    InputSeq::ctrl(Key(c as u8))
}

fn sp(k: KeySeq) -> InputSeq {
    if let Key(_) = k {
        panic!("{:?}", k);
    }
    InputSeq::new(k)
}

fn keys(s: &str) -> Vec<InputSeq> {
    s.chars().map(key).collect()
}

fn enter() -> InputSeq {
    ctrl('m')
}

fn editor_with(lines: &[&str], input: Vec<InputSeq>) -> Editor<DummyInputs, Discard> {
    Editor::with_lines(
        lines.iter().copied(),
        DummyInputs(input),
        Discard,
        (80, 24),
        Config::default(),
    )
    .unwrap()
}

fn run(lines: &[&str], input: Vec<InputSeq>) -> Editor<DummyInputs, Discard> {
    let mut editor = editor_with(lines, input);
    editor.edit().unwrap();
    editor
}

fn lines_of(editor: &Editor<DummyInputs, Discard>) -> Vec<&str> {
    editor.lines().collect()
}

#[test]
fn test_empty_buffer() {
    let input = DummyInputs(vec![ctrl('q')]);
    let mut editor = Editor::new(input, Discard, (80, 24), Config::default()).unwrap();
    editor.edit().unwrap();

    assert_eq!(editor.screen().rows(), 22);
    assert_eq!(editor.screen().cols(), 80);
    assert!(editor.lines().next().is_none());
    assert_eq!(editor.screen().message_text(), HELP_TEXT);
}

#[test]
fn test_too_small_window() {
    let res = Editor::new(DummyInputs(vec![]), Discard, (80, 2), Config::default());
    assert!(res.is_err());
}

#[test]
fn test_write_to_empty_buffer() {
    let mut input = keys("abc");
    input.push(ctrl('q'));
    let editor = run(&[], input);

    assert_eq!(lines_of(&editor), vec!["abc"]);
    assert!(editor.buf().dirty());
    let msg = editor.screen().message_text();
    assert_eq!(
        msg,
        "WARNING!!! File has unsaved changes. Press Ctrl-Q 2 more times to quit."
    );
    assert_eq!(editor.screen().message_kind(), Some(StatusMessageKind::Error));
}

#[test]
fn test_move_cursor_down() {
    let editor = run(
        &[],
        vec![key('a'), sp(DownKey), key('b'), sp(DownKey), key('c')],
    );
    assert_eq!(lines_of(&editor), vec!["a", "b", "c"]);
    assert_eq!(editor.buf().cursor(), (1, 2));
}

#[test]
fn test_open_file() {
    let this_file = file!();
    let input = DummyInputs(vec![ctrl('q')]);
    let mut editor = Editor::open(this_file, input, Discard, (80, 24), Config::default()).unwrap();
    editor.edit().unwrap();

    let content = fs::read_to_string(this_file).unwrap();
    let expected: Vec<_> = content.lines().collect();
    assert_eq!(lines_of(&editor), expected);
    assert_eq!(editor.buf().filetype(), Some("rust"));
    assert!(!editor.buf().dirty());
}

#[test]
fn test_quit_clean_buffer_at_once() {
    let mut editor = editor_with(&["abc"], vec![]);
    assert!(editor.process_keypress(ctrl('q')).unwrap());
}

#[test]
fn test_quit_dirty_buffer_needs_exact_count() {
    let mut editor = editor_with(&["abc"], vec![]);
    editor.process_keypress(key('x')).unwrap();
    assert!(!editor.process_keypress(ctrl('q')).unwrap());
    assert!(!editor.process_keypress(ctrl('q')).unwrap());
    assert!(editor.process_keypress(ctrl('q')).unwrap());
}

#[test]
fn test_quit_counter_reset_by_other_key() {
    let mut editor = editor_with(&["abc"], vec![]);
    editor.process_keypress(key('x')).unwrap();
    assert!(!editor.process_keypress(ctrl('q')).unwrap());
    assert!(!editor.process_keypress(ctrl('q')).unwrap());
    editor.process_keypress(sp(LeftKey)).unwrap();
    assert!(!editor.process_keypress(ctrl('q')).unwrap());
    assert!(!editor.process_keypress(ctrl('q')).unwrap());
    // Timeout without key does not reset the counter
    assert!(!editor.process_keypress(sp(Unidentified)).unwrap());
    assert!(editor.process_keypress(ctrl('q')).unwrap());
}

#[test]
fn test_quit_times_config() {
    let mut editor = Editor::with_lines(
        ["abc"].iter().copied(),
        DummyInputs(vec![]),
        Discard,
        (80, 24),
        Config::default().quit_times(1),
    )
    .unwrap();
    editor.process_keypress(key('x')).unwrap();
    assert!(editor.process_keypress(ctrl('q')).unwrap());
}

#[test]
fn test_edit_stops_at_quit() {
    let editor = run(&[], vec![ctrl('q'), key('a')]);
    assert!(editor.lines().next().is_none());
}

#[test]
fn test_insert_newline_and_backspace() {
    let mut input = vec![sp(RightKey), sp(RightKey), enter()];
    input.push(enter());
    input.push(sp(BackspaceKey));
    input.push(sp(BackspaceKey));
    let editor = run(&["abcd"], input);
    assert_eq!(lines_of(&editor), vec!["abcd"]);
    assert_eq!(editor.buf().cursor(), (2, 0));
}

#[test]
fn test_newline_at_head_of_line() {
    let editor = run(&["abc"], vec![enter(), key('x')]);
    assert_eq!(lines_of(&editor), vec!["", "xabc"]);
}

#[test]
fn test_delete_keys() {
    let editor = run(
        &["abc", "def"],
        vec![
            sp(DeleteKey),
            sp(EndKey),
            sp(DeleteKey),
            ctrl('h'),
            sp(HomeKey),
            sp(BackspaceKey),
        ],
    );
    assert_eq!(lines_of(&editor), vec!["bdef"]);
    assert_eq!(editor.buf().cursor(), (0, 0));
}

#[test]
fn test_tab_key() {
    let editor = run(&["ab"], vec![sp(RightKey), ctrl('i'), key('x')]);
    assert_eq!(lines_of(&editor), vec!["a\txb"]);
    assert_eq!(editor.buf().rows()[0].render_text(), "a       xb");
    assert_eq!(editor.buf().rx(), 9);
}

#[test]
fn test_arrow_keys_wrap_lines() {
    let editor = run(
        &["ab", "cd"],
        vec![sp(EndKey), sp(RightKey), sp(RightKey), sp(LeftKey), sp(LeftKey)],
    );
    assert_eq!(editor.buf().cursor(), (2, 0));
}

#[test]
fn test_page_keys() {
    let text: Vec<String> = (0..100).map(|i| format!("line {}", i)).collect();
    let lines: Vec<&str> = text.iter().map(String::as_str).collect();
    let mut editor = Editor::with_lines(
        lines.into_iter(),
        DummyInputs(vec![sp(PageDownKey), sp(PageDownKey), sp(PageUpKey)]),
        Discard,
        (80, 12),
        Config::default(),
    )
    .unwrap();
    editor.edit().unwrap();
    // 10 rows on screen. First page down moves to 19 and scrolls to show it at bottom.
    // Second one moves from bottom of screen (19) by 10 lines.
    // Page up moves from top of screen (20) by 10 lines.
    assert_eq!(editor.buf().cy(), 10);
    assert_eq!(editor.screen().viewport().rowoff, 10);
}

#[test]
fn test_scroll_follows_cursor() {
    let text: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    let mut input = vec![sp(DownKey); 30];
    input.push(sp(EndKey));
    let mut editor = Editor::with_lines(
        text.iter().map(String::as_str),
        DummyInputs(input),
        Discard,
        (80, 12),
        Config::default(),
    )
    .unwrap();
    editor.edit().unwrap();
    assert_eq!(editor.buf().cursor(), (2, 30));
    assert_eq!(editor.screen().viewport().rowoff, 21);
}

#[test]
fn test_not_mapped_key() {
    let editor = run(&["abc"], vec![ctrl('x')]);
    assert_eq!(editor.screen().message_text(), "Key 'C-x' not mapped");
    assert_eq!(lines_of(&editor), vec!["abc"]);
}

#[test]
fn test_non_ascii_byte_is_not_inserted() {
    let editor = run(&["abc"], vec![sp(Key(0xc3)), sp(Key(0xa9))]);
    assert_eq!(editor.screen().message_text(), "Key '\\xa9' not mapped");
    assert_eq!(lines_of(&editor), vec!["abc"]);
    assert!(!editor.buf().dirty());
}

#[test]
fn test_escape_and_refresh_are_noop() {
    let editor = run(&["abc"], vec![sp(EscapeKey), ctrl('l'), sp(Unidentified)]);
    assert_eq!(lines_of(&editor), vec!["abc"]);
    assert!(!editor.buf().dirty());
    assert_eq!(editor.screen().message_text(), HELP_TEXT);
}

#[test]
fn test_find_and_confirm() {
    let mut input = vec![ctrl('f')];
    input.extend(keys("bar"));
    input.push(enter());
    let editor = run(&["foo", "bar baz", "qux bar"], input);

    assert_eq!(editor.buf().cursor(), (0, 1));
    assert_eq!(editor.screen().message_text(), "Found");
    for row in editor.buf().rows() {
        assert!(row.highlights().iter().all(|h| *h == Highlight::Normal));
    }
}

#[test]
fn test_find_next_match() {
    let mut input = vec![ctrl('f')];
    input.extend(keys("bar"));
    input.push(sp(DownKey));
    input.push(enter());
    let editor = run(&["foo", "bar baz", "qux bar"], input);
    assert_eq!(editor.buf().cursor(), (4, 2));
}

#[test]
fn test_find_not_found() {
    let mut input = vec![sp(DownKey), ctrl('f')];
    input.extend(keys("zzz"));
    input.push(enter());
    let editor = run(&["foo", "bar"], input);
    assert_eq!(editor.buf().cursor(), (0, 1));
    assert_eq!(editor.screen().message_text(), "Not found");
}

#[test]
fn test_find_canceled() {
    let mut input = vec![sp(DownKey), sp(RightKey), ctrl('f')];
    input.extend(keys("qux"));
    input.push(sp(EscapeKey));
    let editor = run(&["foo", "bar", "qux"], input);
    assert_eq!(editor.buf().cursor(), (1, 1));
    assert_eq!(editor.screen().message_text(), "Search canceled");
    assert_eq!(editor.screen().viewport().rowoff, 0);
    for row in editor.buf().rows() {
        assert!(row.highlights().iter().all(|h| *h == Highlight::Normal));
    }
}

#[test]
fn test_find_with_empty_query_ignores_enter() {
    let editor = run(
        &["foo", "bar"],
        vec![ctrl('f'), enter(), sp(BackspaceKey), key('b'), enter()],
    );
    assert_eq!(editor.buf().cursor(), (0, 1));
    assert_eq!(editor.screen().message_text(), "Found");
}

#[test]
fn test_set_registry() {
    const NUMS: SyntaxRule = SyntaxRule {
        filetype: "nums",
        filematch: &[".n"],
        flags: SyntaxFlags::NUMBERS,
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.n");
    let input = DummyInputs(keys("x 12"));
    let mut editor = Editor::open(&path, input, Discard, (80, 24), Config::default()).unwrap();
    editor.edit().unwrap();
    assert_eq!(editor.buf().filetype(), None);
    assert_eq!(editor.buf().rows()[0].highlights(), &[Highlight::Normal; 4][..]);

    let mut reg = SyntaxRegistry::empty();
    reg.register(NUMS);
    editor.set_registry(reg);
    assert_eq!(editor.buf().filetype(), Some("nums"));
    assert_eq!(
        editor.buf().rows()[0].highlights(),
        &[
            Highlight::Normal,
            Highlight::Normal,
            Highlight::Number,
            Highlight::Number
        ][..]
    );
}

#[test]
fn test_save_as_canceled() {
    let editor = run(&["abc"], vec![key('x'), ctrl('s'), key('f'), sp(EscapeKey)]);
    assert_eq!(editor.screen().message_text(), "Save aborted");
    assert!(editor.buf().dirty());
    assert!(!editor.buf().has_file());
}

#[test]
fn test_save_as_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.c");
    let path_str = path.to_str().unwrap().to_string();

    let mut input = vec![ctrl('s'), enter()]; // Empty name is ignored
    input.extend(keys(&path_str));
    input.push(enter());
    let editor = run(&["int x = 1;", "\treturn 0;"], input);

    assert_eq!(
        editor.screen().message_text(),
        "22 bytes written to disk"
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "int x = 1;\n\treturn 0;\n");
    assert!(!editor.buf().dirty());
    assert_eq!(editor.buf().filename(), path_str);
    assert_eq!(editor.buf().filetype(), Some("c"));
    assert_eq!(editor.buf().rows()[0].highlights()[8], Highlight::Number);
}

#[test]
fn test_save_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "hello\n").unwrap();

    let mut input = vec![sp(EndKey)];
    input.extend(keys(" world"));
    input.push(ctrl('s'));
    let mut editor =
        Editor::open(&path, DummyInputs(input), Discard, (80, 24), Config::default()).unwrap();
    editor.edit().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "hello world\n");
    assert_eq!(editor.screen().message_text(), "12 bytes written to disk");
    assert!(!editor.buf().dirty());
}

#[test]
fn test_save_failure_keeps_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("file.txt");

    let input = DummyInputs(vec![key('a'), ctrl('s')]);
    let mut editor = Editor::open(&path, input, Discard, (80, 24), Config::default()).unwrap();
    editor.edit().unwrap();

    let msg = editor.screen().message_text();
    assert!(msg.starts_with("Can't save! I/O error: "), "{}", msg);
    assert_eq!(editor.screen().message_kind(), Some(StatusMessageKind::Error));
    assert!(editor.buf().dirty());
    assert_eq!(lines_of(&editor), vec!["a"]);
}

#[test]
fn test_open_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.py");
    let input = DummyInputs(vec![]);
    let editor = Editor::open(&path, input, Discard, (80, 24), Config::default()).unwrap();
    assert!(editor.lines().next().is_none());
    assert!(editor.buf().has_file());
    assert_eq!(editor.buf().filetype(), Some("python"));
    assert!(!path.exists());
}

#[test]
fn test_tab_stop_config() {
    let editor = Editor::with_lines(
        ["\tx"].iter().copied(),
        DummyInputs(vec![sp(EndKey)]),
        Discard,
        (80, 24),
        Config::default().tab_stop(4),
    )
    .unwrap();
    assert_eq!(editor.buf().rows()[0].render_text(), "    x");
    assert_eq!(editor.config().tab_stop, 4);
}
