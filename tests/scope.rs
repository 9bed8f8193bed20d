use test_utils::{body_lines, check_program_fails};

#[test]
fn a_name_defined_inside_a_block_is_unresolvable_after_it_ends() {
    let source = r#"@VoidApp "H"; main(){
        if (true) {
            create:int x = 1;
        }
        echo(x);
    }"#;
    let message = check_program_fails(source);
    assert!(message.contains("RuntimeError"), "{message}");
}

#[test]
fn inner_blocks_can_shadow_without_touching_the_outer_binding() {
    let source = r#"@VoidApp "H"; main(){
        create:int x = 1;
        if (true) {
            create:int x = 2;
            echo(x);
        }
        echo(x);
    }"#;
    assert_eq!(body_lines(source), vec!["2", "1"]);
}

#[test]
fn aliased_lists_observe_each_others_mutations() {
    let source = r#"@VoidApp "H"; main(){
        create:list a = [1];
        create:list b = a;
        b.add:list(2);
        echo(a);
    }"#;
    assert_eq!(body_lines(source), vec!["[1, 2]"]);
}

#[test]
fn rebinding_an_existing_alias_with_create_fails() {
    let source = r#"@VoidApp "H"; main(){
        create:list a = [1];
        create:list b = a;
        create:list b = [9];
    }"#;
    let message = check_program_fails(source);
    assert!(message.contains("RuntimeError"), "{message}");
}
