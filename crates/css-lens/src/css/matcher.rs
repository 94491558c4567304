use std::collections::HashMap;

use super::{
    rules::{Rule, RuleSet},
    selector::{class_names, compound_selectors, selector_has_class},
};
use crate::scan::UsageSite;

/// A usage site paired with every rule whose selectors name its class.
///
/// `rules` is empty when nothing matched; the usage is still carried so the
/// host can show that no rule was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub usage: UsageSite,
    pub rules: Vec<Rule>,
}

impl Annotation {
    pub fn is_matched(&self) -> bool {
        !self.rules.is_empty()
    }
}

/// Class name → rule positions for one [`RuleSet`].
///
/// Built once per extracted stylesheet so selectors are tokenized a single
/// time no matter how many usages are matched against them. Positions are
/// ascending, so matches come back in stylesheet order.
#[derive(Debug, Default)]
pub struct ClassIndex {
    rule_set: RuleSet,
    by_class: HashMap<String, Vec<usize>>,
}

impl ClassIndex {
    pub fn build(rule_set: RuleSet) -> Self {
        let mut by_class: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, rule) in rule_set.iter().enumerate() {
            for selector in &rule.selectors {
                for compound in compound_selectors(selector) {
                    for class in class_names(compound) {
                        let positions = by_class.entry(class).or_default();
                        if positions.last() != Some(&position) {
                            positions.push(position);
                        }
                    }
                }
            }
        }

        Self {
            rule_set,
            by_class,
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Number of distinct class names defined by the stylesheet.
    pub fn class_count(&self) -> usize {
        self.by_class.len()
    }

    pub fn rules_for<'a>(
        &'a self,
        class_name: &str,
    ) -> impl Iterator<Item = &'a Rule> + use<'a> {
        let positions = self.by_class.get(class_name).map(Vec::as_slice).unwrap_or_default();
        positions.iter().filter_map(move |&position| self.rule_set.rules.get(position))
    }

    pub fn annotate(
        &self,
        usage: UsageSite,
    ) -> Annotation {
        let rules = self.rules_for(&usage.class_name).cloned().collect();
        Annotation {
            usage,
            rules,
        }
    }
}

/// Pair every usage with its matching rules, preserving usage order.
pub fn match_usages<I>(
    index: &ClassIndex,
    usages: I,
) -> Vec<Annotation>
where
    I: IntoIterator<Item = UsageSite>,
{
    usages.into_iter().map(|usage| index.annotate(usage)).collect()
}

/// Direct check of a single rule, without an index.
pub fn rule_matches_class(
    rule: &Rule,
    class_name: &str,
) -> bool {
    rule.selectors.iter().any(|selector| selector_has_class(selector, class_name))
}

#[cfg(test)]
#[path = "../../tests/src/css/matcher_tests.rs"]
mod tests;
