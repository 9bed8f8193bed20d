use test_utils::{check_program_fails, run_program};

#[test]
fn divide_by_zero_aborts_before_the_footer() {
    let source = include_str!("../demos/divide_by_zero.void");
    let stdout = match run_program(source, "") {
        Ok(_) => panic!("expected the program to fail"),
        Err(message) => {
            assert!(message.contains("RuntimeError"), "{message}");
            assert!(message.to_lowercase().contains("division"), "{message}");
            return;
        }
    };
    let _ = stdout;
}

#[test]
fn redefining_a_name_in_the_same_scope_is_fatal() {
    let source = r#"@VoidApp "H"; main(){
        create:int x = 1;
        create:int x = 2;
    }"#;
    let message = check_program_fails(source);
    assert!(message.contains("RuntimeError"), "{message}");
}

#[test]
fn indexing_past_the_end_of_a_list_is_fatal() {
    let source = r#"@VoidApp "H"; main(){
        create:list l = [1,2];
        echo(l[5]);
    }"#;
    let message = check_program_fails(source);
    assert!(message.contains("RuntimeError"), "{message}");
}

#[test]
fn unknown_directive_is_a_lexer_error() {
    let source = r#"@Nonsense "H"; main(){}"#;
    let message = check_program_fails(source);
    assert!(message.contains("LexerError"), "{message}");
}

#[test]
fn missing_main_is_a_parse_error() {
    let source = r#"@VoidApp "H";"#;
    let message = check_program_fails(source);
    assert!(message.contains("ParseError"), "{message}");
}
