use test_utils::body_lines;

#[test]
fn list_and_dict_methods() {
    let source = include_str!("../demos/collections.void");
    assert_eq!(
        body_lines(source),
        vec!["[2, 3, 4]", "3", "{a:9, b:2}", "9"]
    );
}

#[test]
fn add_dict_replaces_an_existing_key_in_place() {
    let source = r#"@VoidApp "H"; main(){
        create:dict d = {"a":1, "b":2};
        d.add:dict("a":9);
        echo(d);
        echo(length(d));
    }"#;
    assert_eq!(body_lines(source), vec!["{a:9, b:2}", "2"]);
}

#[test]
fn clear_empties_a_list() {
    let source = r#"@VoidApp "H"; main(){
        create:list l = [1,2,3];
        l.clear:list();
        echo(length(l));
    }"#;
    assert_eq!(body_lines(source), vec!["0"]);
}
