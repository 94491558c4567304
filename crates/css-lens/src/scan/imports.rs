use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CSS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\bimport",
        r"(?:",
        r"\s+(?P<default>[A-Za-z_$][\w$]*)",
        r"(?:\s*,\s*(?:\{[^}]*\}|\*\s*as\s+(?P<trailing_namespace>[A-Za-z_$][\w$]*)))?",
        r"\s+from",
        r"|\s*\*\s*as\s+(?P<namespace>[A-Za-z_$][\w$]*)\s+from",
        r"|\s*\{[^}]*\}\s*from",
        r")?",
        r#"\s*["'](?P<source>[^"'\r\n]+?\.css)["']"#,
    ))
    .expect("css import pattern is valid")
});

/// A stylesheet import statement found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssImport {
    /// Module source exactly as written, e.g. `./Button.module.css`.
    pub specifier: String,
    /// Local name the stylesheet is bound to (`import styles from ...` or
    /// `import * as styles from ...`). `None` for side-effect and named-only
    /// imports.
    pub binding: Option<String>,
    /// Byte offset of the `import` keyword.
    pub offset: usize,
}

/// First `.css` import in the document, by position.
///
/// Only the first import is used for resolution; later stylesheets are
/// ignored.
pub fn find_css_import(text: &str) -> Option<CssImport> {
    find_css_imports(text).next()
}

/// All `.css` imports in the document, in source order.
pub fn find_css_imports(text: &str) -> impl Iterator<Item = CssImport> + '_ {
    CSS_IMPORT_RE.captures_iter(text).filter_map(|captures| css_import_from(&captures))
}

fn css_import_from(captures: &Captures<'_>) -> Option<CssImport> {
    let whole = captures.get(0)?;
    let specifier = captures.name("source")?.as_str().to_string();
    let binding = captures
        .name("default")
        .or_else(|| captures.name("namespace"))
        .or_else(|| captures.name("trailing_namespace"))
        .map(|m| m.as_str().to_string());

    Some(CssImport {
        specifier,
        binding,
        offset: whole.start(),
    })
}

#[cfg(test)]
#[path = "../../tests/src/scan/imports_tests.rs"]
mod tests;
