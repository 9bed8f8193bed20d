use test_utils::{body_lines, check_program_fails};

#[test]
fn for_loop_sum() {
    let source = include_str!("../demos/for_loop_sum.void");
    assert_eq!(body_lines(source), vec!["15"]);
}

#[test]
fn while_loop_counts_down() {
    let source = r#"@VoidApp "H"; main(){
        create:int i = 3;
        while (i > 0) {
            echo(i);
            i = i - 1;
        }
    }"#;
    assert_eq!(body_lines(source), vec!["3", "2", "1"]);
}

#[test]
fn runaway_loop_hits_the_iteration_ceiling() {
    let source = r#"@VoidApp "H"; main(){ while (true) {} }"#;
    let message = check_program_fails(source);
    assert!(message.contains("iteration"), "unexpected message: {message}");
}
