//! CSS rule model, the extractor boundary and class-selector matching.

pub(crate) mod extractor;
pub(crate) mod matcher;
pub(crate) mod rules;
pub(crate) mod selector;

pub use extractor::{CommandExtractor, DEFAULT_EXTRACTOR_COMMAND, ExtractionError, RuleExtractor};
pub use matcher::{Annotation, ClassIndex, match_usages, rule_matches_class};
pub use rules::{Declaration, Rule, RuleSet};
pub use selector::{class_names, compound_selectors, selector_has_class};
