use std::fmt::Display;

/// A fatal parse error: an unexpected token, missing punctuation, a missing
/// type name, or an ill-formed program header. Carries the position of the
/// offending token. The driver is responsible for red-tinting the final
/// printed line (see `src/main.rs`); this type stays plain so its `Display`
/// output is stable for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.line, self.column)
    }
}

impl std::error::Error for ParseError {}
