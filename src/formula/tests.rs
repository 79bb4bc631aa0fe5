use super::*;
use crate::name::{always_valid, identity_normalizer};

fn parse(source: &str) -> Result<Formula> {
    Formula::new(source, &identity_normalizer, &always_valid)
}

fn eval_no_vars(source: &str) -> f64 {
    parse(source).unwrap().evaluate(&|_| None).unwrap()
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(eval_no_vars("2+3*4"), 14.0);
    assert_eq!(eval_no_vars("2*3+4"), 10.0);
    assert_eq!(eval_no_vars("10-2-3"), 5.0);
    assert_eq!(eval_no_vars("20/2/5"), 2.0);
    assert_eq!(eval_no_vars("2*(3+4)"), 14.0);
    assert_eq!(eval_no_vars("(2+3)*(4-1)"), 15.0);
}

#[test]
fn scientific_notation_literal() {
    assert_eq!(eval_no_vars("6.6e-3"), 0.0066);
}

#[test]
fn division_by_literal_zero_is_formula_error() {
    let result = parse("5 / 0").unwrap().evaluate(&|_| None);
    assert!(result.is_err());
}

#[test]
fn division_by_variable_that_resolves_to_zero_is_formula_error() {
    let f = parse("5 / x").unwrap();
    let result = f.evaluate(&|name| if name == "x" { Some(0.0) } else { None });
    assert!(result.is_err());
}

#[test]
fn undefined_variable_is_formula_error() {
    let f = parse("x + 1").unwrap();
    assert!(f.evaluate(&|_| None).is_err());
}

#[test]
fn canonical_form_collapses_equivalent_number_spellings() {
    let a = parse("2.0 + x").unwrap();
    let b = parse("2.000+x").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.canonical_text(), b.canonical_text());
}

#[test]
fn formula_round_trips_through_its_own_text() {
    let f = parse("(a+b)*2-c/d").unwrap();
    let reparsed = parse(f.canonical_text()).unwrap();
    assert_eq!(f, reparsed);
}

#[test]
fn variable_list_is_first_occurrence_order_deduplicated() {
    let f = parse("b + a + b + c").unwrap();
    assert_eq!(f.variables(), &["b".to_string(), "a".to_string(), "c".to_string()]);
}

#[test]
fn variables_normalized_at_construction() {
    let f = Formula::new("a1 + B1", &|s| s.to_uppercase(), &always_valid).unwrap();
    assert_eq!(f.variables(), &["A1".to_string(), "B1".to_string()]);
    assert_eq!(f.canonical_text(), "A1+B1");
}

#[test]
fn rejects_variable_disallowed_by_validator() {
    let err = Formula::new("secret + 1", &identity_normalizer, &|s| s != "secret");
    assert!(err.is_err());
}

#[test]
fn rejects_empty_formula() {
    assert!(parse("").is_err());
    assert!(parse("   ").is_err());
}

#[test]
fn rejects_unbalanced_parentheses() {
    assert!(parse("(1+2").is_err());
    assert!(parse("1+2)").is_err());
    assert!(parse(")1+2(").is_err());
}

#[test]
fn rejects_adjacent_operands_and_adjacent_operators() {
    assert!(parse("1 2").is_err());
    assert!(parse("1 + + 2").is_err());
    assert!(parse("1 +").is_err());
    assert!(parse("+ 1").is_err());
}

#[test]
fn rejects_unrecognized_character() {
    assert!(parse("1 & 2").is_err());
}

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(100))]

    #[test]
    fn sums_of_nonnegative_literals_match_float_arithmetic(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
        let source = format!("{a}+{b}");
        let got = eval_no_vars(&source);
        proptest::prop_assert!((got - (a + b)).abs() < 1e-6);
    }

    #[test]
    fn canonical_text_always_reparses_to_an_equal_formula(a in 1.0f64..1000.0, b in 1.0f64..1000.0) {
        let source = format!("{a} * {b} - {a}");
        let f = parse(&source).unwrap();
        let reparsed = parse(f.canonical_text()).unwrap();
        proptest::prop_assert_eq!(f, reparsed);
    }
}
