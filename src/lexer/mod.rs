mod token;

pub use token::{Token, TokenKind, KEYWORDS};

use std::fmt::Display;
use std::iter::Peekable;
use std::str::Chars;

/// A fatal lexical error: an unexpected character, an unterminated string or
/// block comment, or an unrecognized `@` directive. Carries the 1-based
/// `(line, column)` of the offending character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.line, self.column)
    }
}

impl std::error::Error for LexerError {}

type LexResult<T> = Result<T, LexerError>;

/// Converts source text into a token stream. Tracks a 1-based `(line, column)`
/// cursor, advancing it manually rather than deriving it from byte offsets, so
/// tabs and multi-byte characters only ever cost one column each.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        loop {
            self.skip_whitespace_and_comments()?;
            let Some(&c) = self.chars.peek() else {
                break;
            };
            let (line, column) = (self.line, self.column);
            match c {
                '@' => self.lex_directive(line, column)?,
                '"' | '\'' => self.lex_string(c, line, column)?,
                '0'..='9' => self.lex_number(line, column),
                c if is_ident_start(c) => self.lex_identifier(line, column),
                _ => self.lex_operator_or_punct(line, column)?,
            }
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.line, self.column));
        Ok(self.tokens)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.clone().nth(offset)
    }

    fn skip_whitespace_and_comments(&mut self) -> LexResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('#') if self.peek_at(1) == Some('*') => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(LexerError {
                                    message: "unterminated block comment".into(),
                                    line,
                                    column,
                                })
                            }
                            Some('*') if self.peek_at(1) == Some('#') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn lex_directive(&mut self, line: usize, column: usize) -> LexResult<()> {
        self.advance(); // '@'
        let mut name = String::from("@");
        while let Some(c) = self.peek() {
            if is_ident_part(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match name.as_str() {
            "@VoidApp" => TokenKind::VoidApp,
            "@VoidEnd" => TokenKind::VoidEnd,
            _ => {
                return Err(LexerError {
                    message: format!("unknown directive '{name}'"),
                    line,
                    column,
                })
            }
        };
        self.tokens.push(Token::new(kind, name, line, column));
        Ok(())
    }

    fn lex_string(&mut self, quote: char, line: usize, column: usize) -> LexResult<()> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(LexerError {
                        message: "unterminated string literal".into(),
                        line,
                        column,
                    })
                }
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    None => {
                        return Err(LexerError {
                            message: "unterminated string literal".into(),
                            line,
                            column,
                        })
                    }
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('\'') => value.push('\''),
                    Some(other) => value.push(other),
                },
                Some(c) => value.push(c),
            }
        }
        self.tokens
            .push(Token::new(TokenKind::StringLiteral, value, line, column));
        Ok(())
    }

    fn lex_number(&mut self, line: usize, column: usize) {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let mut kind = TokenKind::IntLiteral;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            lexeme.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            kind = TokenKind::FloatLiteral;
        }
        self.tokens.push(Token::new(kind, lexeme, line, column));
    }

    fn lex_identifier(&mut self, line: usize, column: usize) {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if is_ident_part(c) {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if lexeme == "create" && self.peek() == Some(':') {
            self.advance();
            self.tokens
                .push(Token::new(TokenKind::CreateColon, "create:", line, column));
            return;
        }
        let kind = KEYWORDS
            .get(lexeme.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.tokens.push(Token::new(kind, lexeme, line, column));
    }

    fn lex_operator_or_punct(&mut self, line: usize, column: usize) -> LexResult<()> {
        let c = self.advance().expect("peeked before calling");
        let two = format!("{c}{}", self.peek().unwrap_or('\0'));
        let kind = match two.as_str() {
            "**" => Some(TokenKind::StarStar),
            "==" => Some(TokenKind::EqEq),
            "!=" => Some(TokenKind::NotEq),
            "<=" => Some(TokenKind::LtEq),
            ">=" => Some(TokenKind::GtEq),
            "&&" => Some(TokenKind::AndAnd),
            "||" => Some(TokenKind::OrOr),
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance();
            self.tokens.push(Token::new(kind, two, line, column));
            return Ok(());
        }
        let kind = match c {
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            other => {
                return Err(LexerError {
                    message: format!("unexpected character '{other}'"),
                    line,
                    column,
                })
            }
        };
        self.tokens.push(Token::new(kind, c.to_string(), line, column));
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_header() {
        let tokens = Lexer::new(r#"@VoidApp "Hi";"#).lex().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::VoidApp);
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].lexeme, "Hi");
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = Lexer::new("echo\n  (1);").lex().unwrap();
        let paren = tokens.iter().find(|t| t.kind == TokenKind::LParen).unwrap();
        assert_eq!((paren.line, paren.column), (2, 3));
    }

    #[test]
    fn create_colon_is_one_token() {
        let tokens = Lexer::new("create:int x = 1;").lex().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::CreateColon);
        assert_eq!(tokens[1].kind, TokenKind::TypeInt);
    }

    #[test]
    fn prefers_two_char_operators() {
        assert_eq!(
            kinds("a ** b == c"),
            vec![
                TokenKind::Identifier,
                TokenKind::StarStar,
                TokenKind::Identifier,
                TokenKind::EqEq,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            kinds("1 // trailing\n#* block *# 2"),
            vec![TokenKind::IntLiteral, TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = Lexer::new(r#""a\nb\t\"c\"""#).lex().unwrap();
        assert_eq!(tokens[0].lexeme, "a\nb\t\"c\"");
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert!(Lexer::new("\"abc").lex().is_err());
    }

    #[test]
    fn unknown_directive_is_fatal() {
        assert!(Lexer::new("@Bogus;").lex().is_err());
    }

    #[test]
    fn float_requires_digit_after_dot() {
        let tokens = Lexer::new("1.5 2.").lex().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FloatLiteral);
        // "2." — the '.' is not consumed as part of the number since no digit follows.
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[2].kind, TokenKind::Dot);
    }
}
