use tower_lsp::lsp_types::{CodeLens, Command};

use crate::{
    css::{Annotation, Rule},
    document::Document,
    server::settings::LensSettings,
};

/// One lens per annotation of the current document version.
///
/// Annotations scanned at another version are skipped since their offsets
/// no longer line up with the text.
pub(crate) fn code_lenses(
    document: &Document,
    annotations: &[Annotation],
    settings: &LensSettings,
) -> Vec<CodeLens> {
    annotations
        .iter()
        .filter(|annotation| annotation.usage.document_version == document.version)
        .filter_map(|annotation| {
            let title = lens_title(annotation, settings)?;
            Some(CodeLens {
                range: document.range_of(annotation.usage.range()),
                command: Some(Command {
                    title,
                    command: String::new(),
                    arguments: None,
                }),
                data: None,
            })
        })
        .collect()
}

pub(crate) fn lens_title(
    annotation: &Annotation,
    settings: &LensSettings,
) -> Option<String> {
    let Some((first, rest)) = annotation.rules.split_first() else {
        return settings.show_unmatched.then(|| format!("no rule for .{}", annotation.usage.class_name));
    };

    let mut title = rule_summary(first, settings.max_declarations);
    if !rest.is_empty() {
        title.push_str(&format!(" +{} more", rest.len()));
    }
    Some(title)
}

fn rule_summary(
    rule: &Rule,
    max_declarations: usize,
) -> String {
    let mut parts: Vec<String> = rule
        .declarations
        .iter()
        .take(max_declarations)
        .map(|declaration| format!("{}: {};", declaration.property, declaration.value))
        .collect();
    if rule.declarations.len() > max_declarations {
        parts.push("…".to_string());
    }

    if parts.is_empty() {
        format!("{} {{ }}", rule.selector_text())
    } else {
        format!("{} {{ {} }}", rule.selector_text(), parts.join(" "))
    }
}

#[cfg(test)]
#[path = "../../tests/src/server/lens_tests.rs"]
mod tests;
