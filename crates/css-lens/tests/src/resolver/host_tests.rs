use std::fs;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("css-lens-host-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn relative_specifier_joins_document_directory() {
    let resolved = resolve_import_path(Path::new("/project/src/App.tsx"), "./App.module.css", &[]);
    assert_eq!(resolved, Some(PathBuf::from("/project/src/App.module.css")));
}

#[test]
fn parent_specifier_is_normalized() {
    let resolved = resolve_import_path(Path::new("/project/src/components/Card.tsx"), "../styles/./card.css", &[]);
    assert_eq!(resolved, Some(PathBuf::from("/project/src/styles/card.css")));
}

#[test]
fn query_and_fragment_are_stripped() {
    let resolved = resolve_import_path(Path::new("/project/App.tsx"), "./a.css?inline", &[]);
    assert_eq!(resolved, Some(PathBuf::from("/project/a.css")));

    let resolved = resolve_import_path(Path::new("/project/App.tsx"), "./a.css#x", &[]);
    assert_eq!(resolved, Some(PathBuf::from("/project/a.css")));
}

#[test]
fn absolute_specifier_is_kept() {
    let resolved = resolve_import_path(Path::new("/project/App.tsx"), "/shared/theme.css", &[]);
    assert_eq!(resolved, Some(PathBuf::from("/shared/theme.css")));
}

#[test]
fn empty_specifier_is_unresolved() {
    assert_eq!(resolve_import_path(Path::new("/project/App.tsx"), "", &[]), None);
}

#[test]
fn bare_specifier_found_in_nearest_node_modules() {
    let root = temp_dir("bare");
    let package = root.join("node_modules").join("ui-kit");
    fs::create_dir_all(&package).expect("create package");
    fs::write(package.join("button.css"), ".btn {}").expect("write css");
    let src = root.join("src");
    fs::create_dir_all(&src).expect("create src");

    let resolved = resolve_import_path(&src.join("App.tsx"), "ui-kit/button.css", &[]);
    assert_eq!(resolved, Some(package.join("button.css")));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn bare_specifier_falls_back_to_search_roots() {
    let root = temp_dir("roots");
    let package = root.join("node_modules").join("theme");
    fs::create_dir_all(&package).expect("create package");
    fs::write(package.join("base.css"), ".base {}").expect("write css");

    let elsewhere = Path::new("/nonexistent-css-lens-dir/App.tsx");
    assert_eq!(resolve_import_path(elsewhere, "theme/base.css", &[]), None);
    assert_eq!(resolve_import_path(elsewhere, "theme/base.css", &[root.clone()]), Some(package.join("base.css")));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn event_uri() {
    let uri = Url::parse("file:///project/App.tsx").expect("valid uri");
    let changed = HostEvent::DocumentTextChanged {
        uri: uri.clone(),
        version: 2,
    };
    let switched = HostEvent::ActiveEditorChanged {
        uri: uri.clone(),
    };
    assert_eq!(changed.uri(), &uri);
    assert_eq!(switched.uri(), &uri);
}
