use super::*;

#[test]
fn parses_extractor_output_with_single_selector_string() {
    let json = r#"{
        "rules": [
            {
                "selector": ".container, div > span",
                "declarations": [
                    { "property": "display", "value": "flex" },
                    { "property": "width", "value": "100%" }
                ]
            }
        ]
    }"#;

    let rule_set = RuleSet::from_json(json).expect("valid rule json");
    assert_eq!(rule_set.len(), 1);
    let rule = &rule_set.rules[0];
    assert_eq!(rule.selectors, vec![".container, div > span"]);
    assert_eq!(rule.declarations[0], Declaration::new("display", "flex"));
    assert_eq!(rule.declarations[1], Declaration::new("width", "100%"));
}

#[test]
fn parses_selector_arrays() {
    let json = r#"{ "rules": [ { "selectors": [".a", ".b:hover"], "declarations": [] } ] }"#;
    let rule_set = RuleSet::from_json(json).expect("valid rule json");
    assert_eq!(rule_set.rules[0].selectors, vec![".a", ".b:hover"]);
    assert_eq!(rule_set.rules[0].selector_text(), ".a, .b:hover");
}

#[test]
fn missing_fields_default_to_empty() {
    let rule_set = RuleSet::from_json("{}").expect("empty object is an empty rule set");
    assert!(rule_set.is_empty());

    let rule_set = RuleSet::from_json(r#"{ "rules": [ { "selector": ".x" } ] }"#).expect("declarations optional");
    assert!(rule_set.rules[0].declarations.is_empty());
}

#[test]
fn rejects_malformed_output() {
    assert!(RuleSet::from_json("not json").is_err());
    assert!(RuleSet::from_json(r#"{ "rules": [ { "selector": 4 } ] }"#).is_err());
}

#[test]
fn declarations_keep_source_order() {
    let rule = Rule::new(
        [".card"],
        vec![Declaration::new("margin", "0 auto"), Declaration::new("color", "red"), Declaration::new("margin", "0")],
    );
    let properties: Vec<&str> = rule.declarations.iter().map(|d| d.property.as_str()).collect();
    assert_eq!(properties, vec!["margin", "color", "margin"]);
}
