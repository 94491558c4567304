use super::*;

fn class_names(text: &str) -> Vec<String> {
    RegexUsageScanner::new().usages(text, 1).map(|u| u.class_name).collect()
}

#[test]
fn empty_when_no_styles_references() {
    assert!(class_names("").is_empty());
    assert!(class_names("const a = 1;\nexport default function App() { return <div />; }").is_empty());
}

#[test]
fn finds_usages_in_source_order() {
    let text = r#"import "./a.css"; <div className={styles.container}><p className={styles.foo} /></div>"#;
    let usages: Vec<UsageSite> = RegexUsageScanner::new().usages(text, 7).collect();

    assert_eq!(usages.len(), 2);
    assert_eq!(usages[0].class_name, "container");
    assert_eq!(usages[1].class_name, "foo");
    assert!(usages[0].start_offset < usages[1].start_offset);
    assert_eq!(&text[usages[0].range()], "styles.container");
    assert!(usages.iter().all(|u| u.document_version == 7));
}

#[test]
fn rejects_prefixed_binding() {
    assert!(class_names("const x = myStyles.button;").is_empty());
    assert!(class_names("const x = mystyles.button;").is_empty());
    assert!(class_names("const x = $styles.button;").is_empty());
    assert!(class_names("const x = _styles.button;").is_empty());
}

#[test]
fn rejects_suffixed_binding() {
    assert!(class_names("stylesFoo.bar").is_empty());
    assert!(class_names("styles_.bar").is_empty());
}

#[test]
fn class_token_allows_hyphen_digits_underscore() {
    assert_eq!(class_names("styles.btn-primary_2 + styles.h1"), vec!["btn-primary_2", "h1"]);
}

#[test]
fn binding_after_member_access_still_matches() {
    assert_eq!(class_names("props.styles.card"), vec!["card"]);
}

#[test]
fn comment_occurrences_are_reported() {
    assert_eq!(class_names("// styles.legacy\n<a className={styles.link} />"), vec!["legacy", "link"]);
}

#[test]
fn handles_multibyte_text_before_usage() {
    let text = "const título = \"é\"; styles.badge";
    let usages: Vec<UsageSite> = RegexUsageScanner::new().usages(text, 1).collect();
    assert_eq!(usages.len(), 1);
    assert_eq!(&text[usages[0].range()], "styles.badge");
}

#[test]
fn usages_iterator_is_restartable() {
    let scanner = RegexUsageScanner::new();
    let text = "styles.a styles.b styles.c";
    let mut first = scanner.usages(text, 1);
    assert_eq!(first.next().map(|u| u.class_name), Some("a".to_string()));

    let fork = first.clone();
    assert_eq!(first.count(), 2);
    assert_eq!(fork.count(), 2);
    assert_eq!(scanner.scan(text, 1).count(), 3);
}

#[test]
fn custom_bindings() {
    let scanner = RegexUsageScanner::with_bindings(["classes", "s"]);
    let names: Vec<String> = scanner.usages("classes.a xs.b s.c styles.d", 1).map(|u| u.class_name).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(scanner.bindings(), ["classes".to_string(), "s".to_string()]);
}

#[test]
fn invalid_bindings_fall_back_to_default() {
    let scanner = RegexUsageScanner::with_bindings(["", "1abc", "a-b"]);
    assert_eq!(scanner.bindings(), [DEFAULT_BINDING.to_string()]);
    assert_eq!(scanner.usages("styles.ok", 1).count(), 1);
}

#[test]
fn for_binding_extends_scanner() {
    let scanner = RegexUsageScanner::new();
    assert!(scanner.for_binding("styles").is_none());
    assert!(scanner.for_binding("not valid").is_none());

    let extended = scanner.for_binding("css").expect("new binding yields a scanner");
    let names: Vec<String> = extended.scan("css.a styles.b", 1).map(|u| u.class_name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn identifier_check() {
    assert!(is_identifier("styles"));
    assert!(is_identifier("$s"));
    assert!(is_identifier("_x1"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("9a"));
    assert!(!is_identifier("a.b"));
}
