//! Line protocol decoding.
//!
//! The input stream carries two kinds of lines:
//!
//! ```text
//! ["dev1:left", "dev1:right"]     <- declaration frame (first line only)
//! 0.25 0.60                       <- value frame
//! 0.31 0.58                       <- value frame
//! ...
//! ```
//!
//! This module only parses and classifies lines. Which kind a line is depends
//! on the registry state, see [`crate::registry::MeterRegistry::on_line`].

use crate::error::MeterError;

/// Delimiter between the device and metric parts of a qualified identifier.
pub const DEVICE_SEPARATOR: char = ':';

/// Resolved display names for a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// One label per declared channel, in declaration order.
    pub labels: Vec<String>,
    /// Shared device name, set only when every channel is `device:metric`
    /// with the same device.
    pub group_title: Option<String>,
}

/// Parse the declaration frame: a JSON array of channel identifiers.
pub fn parse_declaration(line: &str) -> Result<Vec<String>, MeterError> {
    let line = trim_line_ending(line);
    let identifiers: Vec<String> = serde_json::from_str(line)
        .map_err(|e| MeterError::MalformedDeclaration(format!("{} in {:?}", e, line)))?;

    if identifiers.is_empty() {
        return Err(MeterError::MalformedDeclaration(
            "no channels declared".to_string(),
        ));
    }

    Ok(identifiers)
}

/// Parse a value frame: whitespace-separated numbers, one per channel.
///
/// A blank line is a valid, empty frame.
pub fn parse_value_frame(line: &str) -> Result<Vec<f64>, MeterError> {
    line.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| MeterError::MalformedValueFrame {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Resolve meter labels and the container title for a declaration.
///
/// Grouping is all-or-nothing: either every identifier is `device:metric`
/// with one shared device, or all labels are the identifiers verbatim.
pub fn classify_declaration(identifiers: &[String]) -> Declaration {
    let plain = || Declaration {
        labels: identifiers.to_vec(),
        group_title: None,
    };

    let mut device: Option<&str> = None;
    let mut metrics = Vec::with_capacity(identifiers.len());

    for identifier in identifiers {
        let Some((prefix, suffix)) = identifier.split_once(DEVICE_SEPARATOR) else {
            return plain();
        };
        match device {
            Some(shared) if shared != prefix => return plain(),
            Some(_) => {}
            None => device = Some(prefix),
        }
        metrics.push(suffix.to_string());
    }

    match device {
        Some(device) => Declaration {
            labels: metrics,
            group_title: Some(device.to_string()),
        },
        None => plain(),
    }
}

fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_declaration_plain() {
        let parsed = parse_declaration(r#"["ch1", "ch2", "ch3"]"#).unwrap();
        assert_eq!(parsed, ids(&["ch1", "ch2", "ch3"]));
    }

    #[test]
    fn test_parse_declaration_strips_line_ending() {
        let parsed = parse_declaration("[\"a\",\"b\"]\r\n").unwrap();
        assert_eq!(parsed, ids(&["a", "b"]));
    }

    #[test]
    fn test_parse_declaration_rejects_non_json() {
        let err = parse_declaration("not json").unwrap_err();
        assert!(matches!(err, MeterError::MalformedDeclaration(_)));
    }

    #[test]
    fn test_parse_declaration_rejects_empty_list() {
        let err = parse_declaration("[]").unwrap_err();
        assert!(matches!(err, MeterError::MalformedDeclaration(_)));
    }

    #[test]
    fn test_parse_declaration_rejects_non_string_items() {
        assert!(parse_declaration("[1, 2]").is_err());
        assert!(parse_declaration(r#"{"a": "b"}"#).is_err());
        assert!(parse_declaration("").is_err());
    }

    #[test]
    fn test_parse_value_frame() {
        let values = parse_value_frame("0.25  0.60\t1.00\n").unwrap();
        assert_eq!(values, vec![0.25, 0.60, 1.00]);
    }

    #[test]
    fn test_parse_value_frame_accepts_integers_and_exponents() {
        let values = parse_value_frame("1 0 -2e-3 1.5").unwrap();
        assert_eq!(values, vec![1.0, 0.0, -0.002, 1.5]);
    }

    #[test]
    fn test_parse_value_frame_blank_line_is_empty() {
        assert!(parse_value_frame("").unwrap().is_empty());
        assert!(parse_value_frame("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_value_frame_reports_bad_token() {
        let err = parse_value_frame("0.5 loud 0.7").unwrap_err();
        match err {
            MeterError::MalformedValueFrame { position, token } => {
                assert_eq!(position, 1);
                assert_eq!(token, "loud");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_plain_identifiers() {
        let decl = classify_declaration(&ids(&["ch1", "ch2"]));
        assert_eq!(decl.labels, ids(&["ch1", "ch2"]));
        assert_eq!(decl.group_title, None);
    }

    #[test]
    fn test_classify_shared_device() {
        let decl = classify_declaration(&ids(&["dev1:ch1", "dev1:ch2"]));
        assert_eq!(decl.labels, ids(&["ch1", "ch2"]));
        assert_eq!(decl.group_title.as_deref(), Some("dev1"));
    }

    #[test]
    fn test_classify_mixed_devices_falls_back() {
        let decl = classify_declaration(&ids(&["dev1:ch1", "dev2:ch2"]));
        assert_eq!(decl.labels, ids(&["dev1:ch1", "dev2:ch2"]));
        assert_eq!(decl.group_title, None);
    }

    #[test]
    fn test_classify_missing_separator_falls_back() {
        let decl = classify_declaration(&ids(&["dev1:ch1", "ch2", "dev1:ch3"]));
        assert_eq!(decl.labels, ids(&["dev1:ch1", "ch2", "dev1:ch3"]));
        assert_eq!(decl.group_title, None);
    }

    #[test]
    fn test_classify_splits_on_first_separator() {
        let decl = classify_declaration(&ids(&["hw:0:left", "hw:0:right"]));
        assert_eq!(decl.labels, ids(&["0:left", "0:right"]));
        assert_eq!(decl.group_title.as_deref(), Some("hw"));
    }

    #[test]
    fn test_classify_single_qualified_channel() {
        let decl = classify_declaration(&ids(&["mixer:master"]));
        assert_eq!(decl.labels, ids(&["master"]));
        assert_eq!(decl.group_title.as_deref(), Some("mixer"));
    }
}
