//! Tests for configuration text parsing and validation

use rstest::rstest;

use comptree::domain::grammar::validate_configuration_text;
use comptree::domain::{parse_configuration, DomainError};

#[test]
fn given_escaped_comma_and_url_when_parsing_then_values_are_kept_whole() {
    // Act
    let configuration = parse_configuration("url:https://x?a=b, text:Over\\,confidence").unwrap();

    // Assert
    let entries: Vec<_> = configuration.iter().collect();
    assert_eq!(
        entries,
        vec![("url", "https://x?a=b"), ("text", "Over,confidence")]
    );
}

#[test]
fn given_segment_without_delimiter_when_parsing_then_missing_key_value_delimiter() {
    let result = parse_configuration("url: something, color");

    assert_eq!(
        result,
        Err(DomainError::MissingKeyValueDelimiter(
            "url: something, color".to_string()
        ))
    );
}

#[rstest]
#[case("")]
#[case("   ")]
fn given_blank_text_when_parsing_then_invalid_configuration(#[case] text: &str) {
    assert_eq!(parse_configuration(text), Err(DomainError::InvalidConfiguration));
}

#[rstest]
#[case("title:\"Good title\"", "title", "Good title")]
#[case("link:/some/path:8080", "link", "/some/path:8080")]
#[case("bg:#fff", "bg", "#fff")]
fn given_single_entry_when_parsing_then_value_is_extracted(
    #[case] text: &str,
    #[case] key: &str,
    #[case] value: &str,
) {
    let configuration = parse_configuration(text).unwrap();

    assert_eq!(configuration.len(), 1);
    assert_eq!(configuration.get(key), Some(value));
}

#[rstest]
#[case("a:b, c:d", Ok(()))]
#[case("color", Err(DomainError::MissingKeyValueDelimiter("color".to_string())))]
#[case("a:b,  ", Err(DomainError::TrailingDelimiter("a:b,  ".to_string())))]
fn given_raw_text_when_validating_then_delimiters_are_checked(
    #[case] text: &str,
    #[case] expected: Result<(), DomainError>,
) {
    assert_eq!(validate_configuration_text(text), expected);
}
