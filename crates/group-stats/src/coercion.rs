//! Numeric coercion of loosely-typed values.
//!
//! Two entry points share one rule set:
//!
//! - [`to_number_strict`] returns `None` for anything that is not usable as a
//!   number, keeping "not numeric" distinct from zero.
//! - [`to_number`] always succeeds and maps unusable values to `0.0`.
//!
//! Rules, in order: native finite numbers as-is; strings by their longest
//! numeric token (thousands separators tolerated); wrappers through
//! `as_number`, then `primitive`, then a token scan of `as_text`.

use crate::utils::{
    contains_numeric_token, is_blank_marker, is_unusable_numeric_text, longest_numeric_token,
};
use crate::value::RawValue;

fn finite(n: f64) -> Option<f64> {
    n.is_finite().then_some(n)
}

/// Coerce a value to a finite number, or `None` when it is not usable.
pub fn to_number_strict(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Null | RawValue::Bool(_) => None,
        RawValue::Number(n) => finite(*n),
        RawValue::Text(s) => {
            if is_unusable_numeric_text(s) {
                return None;
            }
            longest_numeric_token(s.trim())
        }
        RawValue::List(_) => {
            let text = raw.display_text();
            if is_unusable_numeric_text(&text) {
                return None;
            }
            longest_numeric_token(&text)
        }
        RawValue::Wrapped(w) => w
            .as_number()
            .and_then(finite)
            .or_else(|| w.primitive().and_then(finite))
            .or_else(|| {
                w.as_text()
                    .filter(|t| !is_unusable_numeric_text(t))
                    .and_then(|t| longest_numeric_token(&t))
            }),
    }
}

/// Coerce a value to a number, mapping anything unusable to `0.0`.
pub fn to_number(raw: &RawValue) -> f64 {
    to_number_strict(raw).unwrap_or(0.0)
}

/// Whether a resolved value counts as missing.
///
/// Absent, null, blank strings (`""`, `null`, `nan`), empty lists and
/// wrappers reporting themselves empty are missing.
pub fn is_missing(value: Option<&RawValue>) -> bool {
    match value {
        None | Some(RawValue::Null) => true,
        Some(RawValue::Text(s)) => is_blank_marker(s),
        Some(RawValue::List(items)) => items.is_empty(),
        Some(RawValue::Wrapped(w)) => w.is_empty().unwrap_or(false),
        Some(_) => false,
    }
}

/// Whether a resolved value is "filled" for coverage purposes.
///
/// A filled value is present and numeric: a finite number, a non-blank string
/// containing a numeric token, or a wrapper convertible to a finite number or
/// whose text contains a numeric token.
pub fn is_filled(value: Option<&RawValue>) -> bool {
    match value {
        None | Some(RawValue::Null) | Some(RawValue::Bool(_)) => false,
        Some(RawValue::Number(n)) => n.is_finite(),
        Some(RawValue::Text(s)) => !is_blank_marker(s) && contains_numeric_token(s.trim()),
        Some(list @ RawValue::List(_)) => contains_numeric_token(&list.display_text()),
        Some(RawValue::Wrapped(w)) => {
            w.as_number().is_some_and(f64::is_finite)
                || w.primitive().is_some_and(f64::is_finite)
                || w.as_text().is_some_and(|t| contains_numeric_token(&t))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueLike;

    #[derive(Debug)]
    struct Wrapper {
        number: Option<f64>,
        primitive: Option<f64>,
        text: Option<&'static str>,
    }

    impl ValueLike for Wrapper {
        fn as_number(&self) -> Option<f64> {
            self.number
        }

        fn primitive(&self) -> Option<f64> {
            self.primitive
        }

        fn as_text(&self) -> Option<String> {
            self.text.map(str::to_string)
        }
    }

    fn wrapper(number: Option<f64>, primitive: Option<f64>, text: Option<&'static str>) -> RawValue {
        RawValue::wrapped(Wrapper {
            number,
            primitive,
            text,
        })
    }

    #[test]
    fn test_native_numbers() {
        assert_eq!(to_number_strict(&RawValue::from(300)), Some(300.0));
        assert_eq!(to_number_strict(&RawValue::Number(f64::INFINITY)), None);
        assert_eq!(to_number_strict(&RawValue::Number(f64::NAN)), None);
    }

    #[test]
    fn test_strings_use_longest_token() {
        assert_eq!(to_number_strict(&RawValue::from("1,200")), Some(1200.0));
        assert_eq!(to_number_strict(&RawValue::from(" 42 ")), Some(42.0));
        assert_eq!(to_number_strict(&RawValue::from("not a number")), None);
    }

    #[test]
    fn test_missing_markers_are_unusable_not_zero() {
        for text in ["", "  ", "null", "NaN", "undefined"] {
            assert_eq!(to_number_strict(&RawValue::from(text)), None, "{text:?}");
            assert_eq!(to_number(&RawValue::from(text)), 0.0);
        }
        assert_eq!(to_number_strict(&RawValue::from("0")), Some(0.0));
    }

    #[test]
    fn test_wrapper_fallback_order() {
        assert_eq!(to_number_strict(&wrapper(Some(7.0), Some(8.0), Some("9"))), Some(7.0));
        assert_eq!(to_number_strict(&wrapper(Some(f64::NAN), Some(8.0), None)), Some(8.0));
        assert_eq!(to_number_strict(&wrapper(None, None, Some("total: 1,500"))), Some(1500.0));
        assert_eq!(to_number_strict(&wrapper(None, None, Some("none"))), None);
        assert_eq!(to_number(&wrapper(None, None, None)), 0.0);
    }

    #[test]
    fn test_booleans_are_not_numeric() {
        assert_eq!(to_number_strict(&RawValue::from(true)), None);
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&RawValue::Null)));
        assert!(is_missing(Some(&RawValue::from(" nan "))));
        assert!(is_missing(Some(&RawValue::List(vec![]))));
        assert!(!is_missing(Some(&RawValue::from(0))));
        assert!(!is_missing(Some(&RawValue::from("open"))));
    }

    #[test]
    fn test_is_filled() {
        assert!(is_filled(Some(&RawValue::from("1,200"))));
        assert!(is_filled(Some(&RawValue::from(0))));
        assert!(is_filled(Some(&wrapper(None, Some(3.0), None))));
        assert!(!is_filled(Some(&RawValue::from("not a number"))));
        assert!(!is_filled(Some(&RawValue::from("null"))));
        assert!(!is_filled(Some(&RawValue::Null)));
        assert!(!is_filled(None));
    }
}
