//! Cell name policy: validation and normalization shared between
//! [`crate::formula::Formula`] and [`crate::workbook::Workbook`].
//!
//! A name is accepted iff it matches the base regex `[A-Za-z_][A-Za-z0-9_]*`
//! *and* a workbook-supplied validator predicate returns true on its
//! normalized form. The base check is hand-rolled over `char`s rather than
//! pulled in via the `regex` crate - the character class is fixed and small
//! enough that a single scan is both faster and simpler than compiling a
//! pattern, the same tradeoff the formula tokenizer makes.

/// Returns `true` if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_well_formed(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A normalizer maps a raw user-supplied name to its canonical spelling.
/// Two names denote the same cell iff their normalized forms are
/// byte-equal. Implementations should be idempotent
/// (`normalize(normalize(x)) == normalize(x)`), though the engine's
/// correctness only requires that the function be pure.
pub trait Normalizer: Fn(&str) -> String {}
impl<F: Fn(&str) -> String> Normalizer for F {}

/// A validator decides whether an already-normalized name is acceptable,
/// beyond the base regex. Implementations should be pure.
pub trait Validator: Fn(&str) -> bool {}
impl<F: Fn(&str) -> bool> Validator for F {}

/// The identity normalizer: returns its input unchanged. This is the
/// default used by [`crate::workbook::Workbook::new`].
pub fn identity_normalizer(name: &str) -> String {
    name.to_string()
}

/// The always-accept validator: every syntactically well-formed name is
/// valid. This is the default used by [`crate::workbook::Workbook::new`].
pub fn always_valid(_name: &str) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_digits_and_underscore() {
        assert!(is_well_formed("A1"));
        assert!(is_well_formed("_private"));
        assert!(is_well_formed("row_12_col"));
    }

    #[test]
    fn rejects_leading_digit_and_empty() {
        assert!(!is_well_formed("1A"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("A-1"));
        assert!(!is_well_formed("A 1"));
    }

    #[test]
    fn identity_normalizer_is_noop() {
        assert_eq!(identity_normalizer("aB1"), "aB1");
    }

    #[test]
    fn always_valid_accepts_everything() {
        assert!(always_valid("anything"));
    }
}
