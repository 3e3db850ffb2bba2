//! Pure string-matching error classification.
//!
//! No external crate dependency, in the same spirit as a closed mapping
//! function translating transport errors into a fixed taxonomy: this picks
//! an [`ErrorClass`] from the first substring in `TABLE` that matches the
//! error message, never the last.

use loadcore::{ErrorClass, Impact};

const TABLE: &[(&str, ErrorClass, Impact)] = &[
    ("connection", ErrorClass::Connection, Impact::High),
    ("connect", ErrorClass::Connection, Impact::High),
    ("refused", ErrorClass::Connection, Impact::High),
    ("broken pipe", ErrorClass::Connection, Impact::High),
    ("reset", ErrorClass::Connection, Impact::High),
    ("timeout", ErrorClass::Timeout, Impact::Medium),
    ("timed out", ErrorClass::Timeout, Impact::Medium),
    ("authentication", ErrorClass::Authentication, Impact::High),
    ("auth failed", ErrorClass::Authentication, Impact::High),
    ("unauthorized", ErrorClass::Authentication, Impact::High),
    ("permission", ErrorClass::Permission, Impact::Medium),
    ("forbidden", ErrorClass::Permission, Impact::Medium),
    ("protocol", ErrorClass::Protocol, Impact::Medium),
    ("bad operation", ErrorClass::Protocol, Impact::Medium),
    ("memory", ErrorClass::Memory, Impact::Low),
    ("oom", ErrorClass::Memory, Impact::Low),
];

/// Classify an error message into an [`ErrorClass`] and [`Impact`].
///
/// Deterministic: the same message always yields the same class, and the
/// match is first-substring-wins over an ordered table rather than a
/// `HashMap` whose iteration order would not be stable.
pub fn classify(message: &str) -> (ErrorClass, Impact) {
    let lower = message.to_ascii_lowercase();
    for (needle, class, impact) in TABLE {
        if lower.contains(needle) {
            return (*class, *impact);
        }
    }
    (ErrorClass::Unknown, Impact::Low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_refused_is_high_impact() {
        let (class, impact) = classify("connection refused");
        assert_eq!(class, ErrorClass::Connection);
        assert_eq!(impact, Impact::High);
    }

    #[test]
    fn timeout_beats_nothing_else() {
        let (class, _) = classify("operation timed out");
        assert_eq!(class, ErrorClass::Timeout);
    }

    #[test]
    fn first_match_in_table_order_wins() {
        let (class, _) = classify("connection timed out");
        assert_eq!(class, ErrorClass::Connection);
    }

    #[test]
    fn unmatched_message_is_unknown_low() {
        let (class, impact) = classify("something unexpected happened");
        assert_eq!(class, ErrorClass::Unknown);
        assert_eq!(impact, Impact::Low);
    }
}
