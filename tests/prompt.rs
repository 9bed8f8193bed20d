use test_utils::body_lines_with_input;

#[test]
fn write_reads_a_line_and_returns_it_without_the_newline() {
    let source = include_str!("../demos/greeting_prompt.void");
    let lines = body_lines_with_input(source, "Ada\n");
    assert_eq!(lines, vec!["What is your name? Hello, Ada"]);
}
