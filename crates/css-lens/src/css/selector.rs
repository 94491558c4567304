//! Minimal selector tokenizing: just enough to find class components.

use std::{iter::Peekable, str::Chars};

/// Split a selector or selector list into compound selectors.
///
/// Splits on `,` and on the combinators (whitespace, `>`, `+`, `~`) at the
/// top level only; `(...)`, `[...]` and quoted strings are kept intact, so
/// `:is(.a, .b)` and `[data-x="a b"]` stay inside their compound.
pub fn compound_selectors(selector: &str) -> Vec<&str> {
    let mut compounds = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = selector.char_indices();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\\' => {
                start.get_or_insert(i);
                chars.next();
            },
            '"' | '\'' => {
                start.get_or_insert(i);
                quote = Some(c);
            },
            '(' | '[' => {
                start.get_or_insert(i);
                depth += 1;
            },
            ')' | ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_delimiter(c) => {
                if let Some(s) = start.take() {
                    compounds.push(&selector[s..i]);
                }
            },
            _ => {
                start.get_or_insert(i);
            },
        }
    }

    if let Some(s) = start {
        compounds.push(&selector[s..]);
    }
    compounds
}

/// Class names of a compound selector, e.g. `a.btn.primary:hover` gives
/// `btn` and `primary`.
///
/// Attribute selectors and pseudo-class arguments are skipped entirely.
/// Backslash escapes are unescaped (`.sm\:flex` yields `sm:flex`).
pub fn class_names(compound: &str) -> Vec<String> {
    let mut classes = Vec::new();
    let mut chars = compound.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            },
            '[' => skip_block(&mut chars, '[', ']'),
            '(' => skip_block(&mut chars, '(', ')'),
            '.' => {
                let name = read_ident(&mut chars);
                if !name.is_empty() {
                    classes.push(name);
                }
            },
            _ => {},
        }
    }
    classes
}

/// Whether any compound selector of `selector` has the class `class_name`.
pub fn selector_has_class(
    selector: &str,
    class_name: &str,
) -> bool {
    compound_selectors(selector).into_iter().any(|compound| class_names(compound).iter().any(|c| c == class_name))
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ',' | '>' | '+' | '~') || c.is_whitespace()
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            chars.next();
            if let Some(escaped) = chars.next() {
                name.push(escaped);
            }
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn skip_block(
    chars: &mut Peekable<Chars<'_>>,
    open: char,
    close: char,
) {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\\' => {
                chars.next();
            },
            '"' | '\'' => quote = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            },
            _ => {},
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/css/selector_tests.rs"]
mod tests;
