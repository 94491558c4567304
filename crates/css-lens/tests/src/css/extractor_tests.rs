use super::*;
use crate::css::rules::{Declaration, Rule};

#[tokio::test]
async fn closures_are_extractors() {
    let extractor = |css: &str| -> Result<RuleSet, ExtractionError> {
        if css.contains('{') {
            Ok(RuleSet::new(vec![Rule::new([".a"], vec![Declaration::new("color", "red")])]))
        } else {
            Err(ExtractionError::InvalidCss("expected a block".to_string()))
        }
    };

    let rules = extractor.extract(".a { color: red; }").await.expect("extracts");
    assert_eq!(rules.len(), 1);

    let error = extractor.extract(".a").await.expect_err("rejects");
    assert_eq!(error.to_string(), "invalid stylesheet: expected a block");
}

#[tokio::test]
async fn missing_command_is_reported() {
    let extractor = CommandExtractor::new("css-lens-extractor-that-does-not-exist", Vec::new());
    let error = extractor.extract(".a {}").await.expect_err("command is missing");
    assert_eq!(error, ExtractionError::CommandNotFound("css-lens-extractor-that-does-not-exist".to_string()));
}

#[test]
fn default_command() {
    let extractor = CommandExtractor::default();
    assert_eq!(extractor.command(), DEFAULT_EXTRACTOR_COMMAND);
    assert!(extractor.args().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn parses_process_output() {
    let script = r#"cat > /dev/null; printf '%s' '{"rules":[{"selector":".card","declarations":[{"property":"margin","value":"0 auto"}]}]}'"#;
    let extractor = CommandExtractor::new("sh", vec!["-c".to_string(), script.to_string()]);

    let rules = extractor.extract(".card { margin: 0 auto; }").await.expect("extracts");
    assert_eq!(rules.rules[0].selectors, vec![".card"]);
    assert_eq!(rules.rules[0].declarations, vec![Declaration::new("margin", "0 auto")]);
}

#[cfg(unix)]
#[tokio::test]
async fn failing_process_reports_stderr() {
    let extractor =
        CommandExtractor::new("sh", vec!["-c".to_string(), "cat > /dev/null; echo 'unexpected token' >&2; exit 3".to_string()]);

    let error = extractor.extract(".a {").await.expect_err("process fails");
    assert_eq!(
        error,
        ExtractionError::ExtractorFailed {
            command: "sh".to_string(),
            reason: "unexpected token".to_string(),
        }
    );
}

#[cfg(unix)]
#[tokio::test]
async fn malformed_output_is_rejected() {
    let extractor = CommandExtractor::new("sh", vec!["-c".to_string(), "cat > /dev/null; echo nope".to_string()]);
    let error = extractor.extract(".a {}").await.expect_err("output is not json");
    assert!(matches!(error, ExtractionError::MalformedOutput(_)));
}
