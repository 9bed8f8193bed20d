use test_utils::body_lines;

#[test]
fn precedence_and_right_associative_power() {
    let source = include_str!("../demos/arithmetic.void");
    assert_eq!(body_lines(source), vec!["7", "512", "9"]);
}

#[test]
fn comparisons_coerce_to_number() {
    let source = r#"@VoidApp "H"; main(){ echo("3" < 10); echo(true == 1); }"#;
    assert_eq!(body_lines(source), vec!["true", "true"]);
}

#[test]
fn string_concatenation_via_plus() {
    let source = r#"@VoidApp "H"; main(){ echo("x=" + 5); }"#;
    assert_eq!(body_lines(source), vec!["x=5"]);
}
