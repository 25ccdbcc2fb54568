//! Value rules for constant declarations

use alloc::string::{String, ToString};

use crate::catalog::PrimitiveKind;
use crate::error::SchemaError;

/// Check one trimmed constant `text` against the group's original kind
///
/// `length` is the group's resolved length; it bounds FIXARRAY and STRING
/// values.
pub(crate) fn check_value(
    group: &str,
    value: &str,
    text: &str,
    kind: PrimitiveKind,
    length: u32,
) -> Result<(), SchemaError> {
    let invalid = || SchemaError::InvalidConstantValue {
        group: group.to_string(),
        value: value.to_string(),
        text: text.to_string(),
        primitive: kind.name(),
    };

    match kind {
        // Integer tokens are accepted as truthy in addition to the words.
        PrimitiveKind::Bool => {
            if text == "true" || text == "false" || parse_integer(text).is_some() {
                Ok(())
            } else {
                Err(invalid())
            }
        }
        PrimitiveKind::Char => {
            if text.len() == 1 {
                Ok(())
            } else {
                Err(invalid())
            }
        }
        PrimitiveKind::String | PrimitiveKind::FixArray => {
            if text.len() as u64 > u64::from(length) {
                Err(SchemaError::ConstantValueTooLong {
                    group: group.to_string(),
                    value: value.to_string(),
                    actual: text.len(),
                    limit: length,
                })
            } else {
                Ok(())
            }
        }
        _ => {
            let Some((min, max)) = kind.integer_range() else {
                return Err(invalid());
            };
            let number = parse_integer(text).ok_or_else(invalid)?;
            if number < min || number > max {
                return Err(SchemaError::ConstantValueOutOfRange {
                    group: group.to_string(),
                    value: value.to_string(),
                    text: String::from(text),
                    primitive: kind.name(),
                });
            }
            Ok(())
        }
    }
}

// Signed first, then unsigned so the full UINT64 range parses.
fn parse_integer(text: &str) -> Option<i128> {
    text.parse::<i64>()
        .map(i128::from)
        .ok()
        .or_else(|| text.parse::<u64>().ok().map(i128::from))
}
