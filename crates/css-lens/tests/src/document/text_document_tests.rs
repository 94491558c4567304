use super::*;

fn test_doc(text: &str) -> Document {
    Document::new(Url::parse("file:///project/App.tsx").unwrap(), "typescriptreact", text.to_string(), 1)
}

#[test]
fn empty_document_starts_at_origin() {
    let doc = test_doc("");
    assert_eq!(doc.position_of(0), Position::new(0, 0));
    assert_eq!(doc.position_of(10), Position::new(0, 0));
}

#[test]
fn offset_roundtrip() {
    let doc = test_doc("const a = 1;\nstyles.card;\n");
    let pos = Position {
        line: 1,
        character: 0,
    };
    let off = doc.offset_of(pos).unwrap();
    assert_eq!(off, 13);
    assert_eq!(doc.position_of(off), pos);
}

#[test]
fn range_counts_utf16_units() {
    let doc = test_doc("const é = \"😀\"; styles.card");
    let start = doc.text.find("styles").unwrap();
    let range = doc.range_of(start..doc.text.len());

    assert_eq!(range.start.line, 0);
    // `é` is one UTF-16 unit, the emoji two.
    assert_eq!(range.start.character, 16);
    assert_eq!(range.end.character, 27);
}

#[test]
fn resolvable_by_language_or_extension() {
    assert!(test_doc("").is_resolvable());

    let by_ext = Document::new(Url::parse("file:///p/Card.jsx").unwrap(), "javascript", String::new(), 1);
    assert!(by_ext.is_resolvable());

    let plain = Document::new(Url::parse("file:///p/util.ts").unwrap(), "typescript", String::new(), 1);
    assert!(!plain.is_resolvable());

    let css = Document::new(Url::parse("file:///p/App.module.css").unwrap(), "css", String::new(), 1);
    assert!(css.is_stylesheet());
    assert!(!css.is_resolvable());
}

#[test]
fn full_change_rebuilds_lines() {
    let mut doc = test_doc("one\ntwo");
    assert_eq!(doc.position_of(4), Position::new(1, 0));

    let change = TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: "a\nb\nc\n".to_string(),
    };
    doc.apply_changes(vec![change], 2);

    assert_eq!(doc.position_of(4), Position::new(2, 0));
    assert_eq!(doc.offset_of(Position::new(3, 0)), Some(6));
    assert_eq!(doc.version, 2);
}

#[test]
fn incremental_change() {
    let mut doc = test_doc("styles.title");
    doc.apply_changes(
        vec![TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position {
                    line: 0,
                    character: 7,
                },
                end: Position {
                    line: 0,
                    character: 12,
                },
            }),
            range_length: None,
            text: "heading".to_string(),
        }],
        2,
    );
    assert_eq!(doc.text, "styles.heading");
    assert_eq!(doc.version, 2);
}

#[test]
fn full_content_change() {
    let mut doc = test_doc("old content");
    doc.apply_changes(
        vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "new content".to_string(),
        }],
        3,
    );
    assert_eq!(doc.text, "new content");
    assert_eq!(doc.version, 3);
}
