use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Kind of a lexed token. Literal payloads (numbers, strings, identifiers) are
/// carried on the `Token` itself rather than here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // directives
    VoidApp,
    VoidEnd,
    // keywords
    Using,
    Style,
    Main,
    Echo,
    Write,
    If,
    Else,
    While,
    For,
    Rand,
    Add,
    Delete,
    Clear,
    // compound identifier+punct
    CreateColon,
    // type names
    TypeString,
    TypeInt,
    TypeFloat,
    TypeBool,
    TypeList,
    TypeDict,
    // literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,
    // identifier
    Identifier,
    // operators
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,
    Eof,
}

/// A single lexed token: `(kind, lexeme, line, column)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

/// Keywords and type names recognized by the lexer, keyed by their exact spelling.
/// `rand` lives in here too: it is a keyword, not a callable identifier, so user
/// code can never shadow it.
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("using", Using),
        ("style", Style),
        ("main", Main),
        ("echo", Echo),
        ("write", Write),
        ("if", If),
        ("else", Else),
        ("while", While),
        ("for", For),
        ("rand", Rand),
        ("add", Add),
        ("delete", Delete),
        ("clear", Clear),
        ("string", TypeString),
        ("int", TypeInt),
        ("float", TypeFloat),
        ("bool", TypeBool),
        ("list", TypeList),
        ("dict", TypeDict),
        ("true", BoolLiteral),
        ("false", BoolLiteral),
    ])
});
