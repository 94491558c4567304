use super::*;

#[test]
fn splits_lists_and_combinators() {
    assert_eq!(compound_selectors(".container, div > span"), vec![".container", "div", "span"]);
    assert_eq!(compound_selectors("ul>li+li~a.b   .c"), vec!["ul", "li", "li", "a.b", ".c"]);
}

#[test]
fn keeps_nested_groups_together() {
    assert_eq!(compound_selectors(".a:is(.b, .c) > .d"), vec![".a:is(.b, .c)", ".d"]);
    assert_eq!(compound_selectors(r#"a[title="x > y"] .z"#), vec![r#"a[title="x > y"]"#, ".z"]);
    assert_eq!(compound_selectors("li:nth-child(2n + 1)"), vec!["li:nth-child(2n + 1)"]);
}

#[test]
fn extracts_class_components() {
    assert_eq!(class_names("a.btn.primary:hover"), vec!["btn", "primary"]);
    assert_eq!(class_names(".card::after"), vec!["card"]);
    assert_eq!(class_names("#main.layout"), vec!["layout"]);
    assert!(class_names("span").is_empty());
}

#[test]
fn ignores_attribute_and_pseudo_arguments() {
    assert_eq!(class_names(r#".a[data-x=".b"]"#), vec!["a"]);
    assert_eq!(class_names(".a:not(.b)"), vec!["a"]);
}

#[test]
fn unescapes_class_names() {
    assert_eq!(class_names(r".sm\:flex"), vec!["sm:flex"]);
    assert_eq!(compound_selectors(r".w-1\/2 .x"), vec![r".w-1\/2", ".x"]);
}

#[test]
fn class_lookup_requires_exact_name() {
    assert!(selector_has_class(".container, div > span", "container"));
    assert!(!selector_has_class(".container, div > span", "span"));
    assert!(!selector_has_class(".container-fluid", "container"));
    assert!(!selector_has_class("#container", "container"));
    assert!(selector_has_class(".nav .item.active", "active"));
}
