//! Textual scanning of JSX/TSX documents.
//!
//! Both scanners work on raw text rather than an AST, so matches inside
//! comments or string literals are reported as well.

pub(crate) mod imports;
pub(crate) mod usage;

pub use imports::{CssImport, find_css_import, find_css_imports};
pub use usage::{DEFAULT_BINDING, RegexUsageScanner, UsageScanner, UsageSite, Usages, is_identifier};
