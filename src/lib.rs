pub mod interpreter;
pub mod lexer;
pub mod parser;

use std::io::{BufRead, Write};

use interpreter::{Interpreter, RuntimeError};
use lexer::{Lexer, LexerError};
use parser::{ParseError, Parser};

/// Any of the three fatal error kinds the pipeline can produce.
#[derive(Debug)]
pub enum VoidError {
    Lexer(LexerError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl std::fmt::Display for VoidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoidError::Lexer(e) => write!(f, "LexerError: {e}"),
            VoidError::Parse(e) => write!(f, "ParseError: {e}"),
            VoidError::Runtime(e) => write!(f, "RuntimeError: {e}"),
        }
    }
}

impl std::error::Error for VoidError {}

impl From<LexerError> for VoidError {
    fn from(value: LexerError) -> Self {
        VoidError::Lexer(value)
    }
}

impl From<ParseError> for VoidError {
    fn from(value: ParseError) -> Self {
        VoidError::Parse(value)
    }
}

impl From<RuntimeError> for VoidError {
    fn from(value: RuntimeError) -> Self {
        VoidError::Runtime(value)
    }
}

/// Run a Void program end to end against the given output sink and input source.
///
/// This is the single entry point shared by the CLI driver and the integration
/// tests, so the two never drift on how the pipeline is wired together.
pub fn run_source<W: Write, R: BufRead>(
    source: &str,
    stdout: &mut W,
    stdin: &mut R,
) -> Result<(), VoidError> {
    let tokens = Lexer::new(source).lex()?;
    let program = Parser::new(tokens).parse_program()?;
    Interpreter::new(stdout, stdin).run(&program)?;
    Ok(())
}
