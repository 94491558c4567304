use serde::{Deserialize, Deserializer, Serialize};

/// A single `property: value` pair of a rule, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// One style rule as produced by the extractor.
///
/// The extractor reports the selector list either as a single string
/// (`"selector": ".a, div > span"`) or as an array; both deserialize into
/// `selectors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(alias = "selector", deserialize_with = "one_or_many")]
    pub selectors: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Rule {
    pub fn new<S: Into<String>>(
        selectors: impl IntoIterator<Item = S>,
        declarations: Vec<Declaration>,
    ) -> Self {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            declarations,
        }
    }

    /// Selector list as it would appear in a stylesheet.
    pub fn selector_text(&self) -> String {
        self.selectors.join(", ")
    }
}

/// Ordered rules of one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
        }
    }

    /// Parse the extractor's JSON output (`{ "rules": [...] }`).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(selector) => vec![selector],
        OneOrMany::Many(selectors) => selectors,
    })
}

#[cfg(test)]
#[path = "../../tests/src/css/rules_tests.rs"]
mod tests;
