use test_utils::body_lines;

#[test]
fn hello_prints_between_header_and_footer() {
    let source = include_str!("../demos/hello.void");
    assert_eq!(body_lines(source), vec!["Hello"]);
}

#[test]
fn echo_joins_multiple_expressions_with_a_single_space() {
    let source = r#"@VoidApp "H"; main(){ echo("a", 1, true); }"#;
    assert_eq!(body_lines(source), vec!["a 1 true"]);
}
