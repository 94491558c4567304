use std::{ops::Range, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;

/// Binding name scanned when nothing else is configured.
pub const DEFAULT_BINDING: &str = "styles";

const CLASS_TOKEN_PATTERN: &str = r"(?P<class>[A-Za-z0-9_-]+)";

static DEFAULT_USAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<binding>styles)\.(?P<class>[A-Za-z0-9_-]+)").expect("usage pattern is valid"));

// ── UsageSite ───────────────────────────────────────────────────────────────

/// One `styles.className` reference found in a document.
///
/// Offsets are byte offsets into the scanned text and cover the whole
/// expression, binding included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageSite {
    pub class_name: String,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Host document version the text was scanned at.
    pub document_version: i32,
}

impl UsageSite {
    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }
}

// ── scanner trait ───────────────────────────────────────────────────────────

/// Produces the usage sites of a document, ordered by ascending start offset.
///
/// Callers only depend on this trait so the textual implementation can be
/// replaced by a JSX-aware tokenizer.
pub trait UsageScanner: Send + Sync {
    /// Lazily scan `text`. Calling `scan` again restarts from the beginning.
    fn scan<'t>(
        &'t self,
        text: &'t str,
        version: i32,
    ) -> Box<dyn Iterator<Item = UsageSite> + Send + 't>;

    /// A scanner that additionally recognises `binding`, or `None` when this
    /// scanner already covers it (or cannot be extended).
    fn for_binding(
        &self,
        _binding: &str,
    ) -> Option<Arc<dyn UsageScanner>> {
        None
    }
}

// ── regex implementation ────────────────────────────────────────────────────

/// Regex-backed scanner matching `<binding>.<class-token>`.
#[derive(Debug, Clone)]
pub struct RegexUsageScanner {
    bindings: Vec<String>,
    regex: Option<Regex>,
}

impl Default for RegexUsageScanner {
    fn default() -> Self {
        Self {
            bindings: vec![DEFAULT_BINDING.to_string()],
            regex: None,
        }
    }
}

impl RegexUsageScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scanner for the given binding identifiers.
    ///
    /// Entries that are not valid JS identifiers are dropped; if nothing is
    /// left the scanner falls back to [`DEFAULT_BINDING`].
    pub fn with_bindings<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for binding in bindings {
            let binding = binding.as_ref().trim();
            if is_identifier(binding) && !names.iter().any(|n| n == binding) {
                names.push(binding.to_string());
            }
        }

        if names.is_empty() || names == [DEFAULT_BINDING] {
            return Self::default();
        }

        let alternation = names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");
        let pattern = format!(r"(?P<binding>{alternation})\.{CLASS_TOKEN_PATTERN}");
        match Regex::new(&pattern) {
            Ok(regex) => Self {
                bindings: names,
                regex: Some(regex),
            },
            Err(_) => Self::default(),
        }
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    /// Concrete, `Clone`-able iterator over the usages in `text`.
    pub fn usages<'t>(
        &'t self,
        text: &'t str,
        version: i32,
    ) -> Usages<'t> {
        Usages {
            regex: self.regex.as_ref().unwrap_or(&DEFAULT_USAGE_RE),
            text,
            version,
            position: 0,
        }
    }
}

impl UsageScanner for RegexUsageScanner {
    fn scan<'t>(
        &'t self,
        text: &'t str,
        version: i32,
    ) -> Box<dyn Iterator<Item = UsageSite> + Send + 't> {
        Box::new(self.usages(text, version))
    }

    fn for_binding(
        &self,
        binding: &str,
    ) -> Option<Arc<dyn UsageScanner>> {
        if !is_identifier(binding) || self.bindings.iter().any(|b| b == binding) {
            return None;
        }
        let extended = self.bindings.iter().map(String::as_str).chain(std::iter::once(binding));
        Some(Arc::new(Self::with_bindings(extended)))
    }
}

/// Lazy iterator over usage sites. Cloning it forks the scan position.
#[derive(Debug, Clone)]
pub struct Usages<'t> {
    regex: &'t Regex,
    text: &'t str,
    version: i32,
    position: usize,
}

impl Iterator for Usages<'_> {
    type Item = UsageSite;

    fn next(&mut self) -> Option<UsageSite> {
        while self.position < self.text.len() {
            let captures = self.regex.captures_at(self.text, self.position)?;
            let whole = captures.get(0)?;
            let class = captures.name("class")?;

            if !has_left_boundary(self.text, whole.start()) {
                // `mystyles.x`: retry one character further so an overlapping
                // binding (e.g. `s` inside `xs.y`) is still found.
                self.position = next_char_boundary(self.text, whole.start());
                continue;
            }

            self.position = whole.end();
            return Some(UsageSite {
                class_name: class.as_str().to_string(),
                start_offset: whole.start(),
                end_offset: whole.end(),
                document_version: self.version,
            });
        }
        None
    }
}

// ── helpers ─────────────────────────────────────────────────────────────────

/// Whether `name` is a plain JavaScript identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {},
        _ => return false,
    }
    chars.all(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn has_left_boundary(
    text: &str,
    start: usize,
) -> bool {
    text[..start].chars().next_back().is_none_or(|c| !is_identifier_char(c))
}

fn next_char_boundary(
    text: &str,
    offset: usize,
) -> usize {
    text[offset..].chars().next().map_or(text.len(), |c| offset + c.len_utf8())
}

#[cfg(test)]
#[path = "../../tests/src/scan/usage_tests.rs"]
mod tests;
