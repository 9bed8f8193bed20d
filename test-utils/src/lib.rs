use std::io::Cursor;

/// Runs `source` against an in-memory stdin and returns everything written to
/// stdout, with ANSI color escapes stripped. Calls into the library directly
/// rather than shelling out to a built binary, so the test harness never
/// depends on `cargo build` having already produced one.
pub fn run_program(source: &str, stdin: &str) -> Result<String, String> {
    let mut stdout = Vec::new();
    let mut stdin = Cursor::new(stdin.as_bytes().to_vec());
    match void_lang::run_source(source, &mut stdout, &mut stdin) {
        Ok(()) => Ok(strip_ansi(
            &String::from_utf8(stdout).expect("program output is valid UTF-8"),
        )),
        Err(e) => Err(e.to_string()),
    }
}

/// Asserts that running `source` succeeds and that its stdout equals `expected`.
pub fn check_program(source: &str, expected: &str) {
    match run_program(source, "") {
        Ok(stdout) => assert_eq!(stdout, expected),
        Err(e) => panic!("program failed to run: {e}"),
    }
}

/// Runs `source`, asserting it fails, and returns the error message for
/// callers that want to check its content.
pub fn check_program_fails(source: &str) -> String {
    match run_program(source, "") {
        Ok(stdout) => panic!("expected program to fail, but it produced:\n{stdout}"),
        Err(e) => e,
    }
}

/// Runs `source` and returns just the lines between the header and footer
/// banners, so callers can assert on program output without hardcoding the
/// exact decoration.
pub fn body_lines(source: &str) -> Vec<String> {
    let stdout = run_program(source, "").expect("program should run to completion");
    let lines: Vec<String> = stdout.lines().map(str::to_string).collect();
    assert!(lines.len() >= 2, "expected a header and footer line, got {lines:?}");
    lines[1..lines.len() - 1].to_vec()
}

/// Same as [`body_lines`] but also feeds `stdin` to the program, for
/// scenarios involving `write(...)`.
pub fn body_lines_with_input(source: &str, stdin: &str) -> Vec<String> {
    let stdout = run_program(source, stdin).expect("program should run to completion");
    let lines: Vec<String> = stdout.lines().map(str::to_string).collect();
    assert!(lines.len() >= 2, "expected a header and footer line, got {lines:?}");
    lines[1..lines.len() - 1].to_vec()
}

/// Strips `ESC [ ... letter` CSI sequences, the only kind `colored` emits.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}
