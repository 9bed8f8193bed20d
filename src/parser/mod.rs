pub mod ast;
mod error;

pub use error::ParseError;

use crate::lexer::{Token, TokenKind};
use ast::*;

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser with explicit precedence climbing for expressions,
/// consuming the token stream produced by the lexer.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn at_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.peek();
        ParseError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected {what}, found '{}'",
                self.peek().lexeme
            )))
        }
    }

    // ---- top level ----------------------------------------------------

    pub fn parse_program(mut self) -> ParseResult<Program> {
        self.expect(TokenKind::VoidApp, "'@VoidApp'")?;
        let app_name = self.expect_string("application name")?;
        self.expect(TokenKind::Semicolon, "';'")?;

        let style = if self.check(TokenKind::Using) {
            self.advance();
            self.expect(TokenKind::Style, "'style'")?;
            let style = self.expect_string("style name")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            Some(style)
        } else {
            None
        };

        let mut body = Vec::new();
        while !self.at_eof() && !self.check(TokenKind::VoidEnd) {
            body.push(self.parse_top_level()?);
        }

        if self.check(TokenKind::VoidEnd) {
            self.advance();
            self.expect(TokenKind::Semicolon, "';'")?;
        }

        Ok(Program {
            app_name,
            style,
            body,
        })
    }

    fn expect_string(&mut self, what: &str) -> ParseResult<String> {
        let token = self.expect(TokenKind::StringLiteral, what)?;
        Ok(token.lexeme)
    }

    fn parse_top_level(&mut self) -> ParseResult<TopLevel> {
        if self.check(TokenKind::Main) {
            self.advance();
            self.expect(TokenKind::LParen, "'('")?;
            self.expect(TokenKind::RParen, "')'")?;
            let body = self.parse_block()?;
            Ok(TopLevel::Main { body })
        } else {
            Err(self.error(format!(
                "expected top-level 'main' declaration, found '{}'",
                self.peek().lexeme
            )))
        }
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.error("unexpected end of input inside block"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.advance(); // '}'
        Ok(stmts)
    }

    // ---- statements -----------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Echo => self.parse_echo(),
            TokenKind::CreateColon => self.parse_create(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Identifier => self.parse_identifier_statement(),
            _ => Err(self.error(format!(
                "expected a statement, found '{}'",
                self.peek().lexeme
            ))),
        }
    }

    fn parse_echo(&mut self) -> ParseResult<Stmt> {
        self.advance(); // 'echo'
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = vec![self.parse_expr()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            args.push(self.parse_expr()?);
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Echo(args))
    }

    fn parse_declared_type(&mut self) -> ParseResult<DeclaredType> {
        let kind = match self.peek_kind() {
            TokenKind::TypeString => DeclaredType::String,
            TokenKind::TypeInt => DeclaredType::Int,
            TokenKind::TypeFloat => DeclaredType::Float,
            TokenKind::TypeBool => DeclaredType::Bool,
            TokenKind::TypeList => DeclaredType::List,
            TokenKind::TypeDict => DeclaredType::Dict,
            _ => return Err(self.error("expected a type name after 'create:'")),
        };
        self.advance();
        Ok(kind)
    }

    /// Parses `create:<type> <ident> = expr` without the trailing `;`, so it
    /// can be reused for both the statement form and a `for` loop's `init`.
    fn parse_create_header(&mut self) -> ParseResult<Stmt> {
        self.advance(); // 'create:'
        let declared_type = self.parse_declared_type()?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign, "'='")?;
        let init = self.parse_expr()?;
        Ok(Stmt::CreateVar {
            declared_type,
            name,
            init,
        })
    }

    fn parse_create(&mut self) -> ParseResult<Stmt> {
        let stmt = self.parse_create_header()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(stmt)
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        let token = self.expect(TokenKind::Identifier, "an identifier")?;
        Ok(token.lexeme)
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.advance(); // 'if'
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_block = self.parse_block()?;
        let else_branch = if self.check(TokenKind::Else) {
            self.advance();
            if self.check(TokenKind::If) {
                Some(ElseBranch::If(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.advance(); // 'while'
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        self.advance(); // 'for'
        self.expect(TokenKind::LParen, "'('")?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::CreateColon) {
            Some(Box::new(self.parse_create_header()?))
        } else {
            Some(Box::new(self.parse_assignment_header()?))
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_assignment_header()?))
        };
        self.expect(TokenKind::RParen, "')'")?;

        let body = self.parse_block()?;
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
        })
    }

    /// Parses `ident = expr` without the trailing `;`, shared by the plain
    /// assignment statement and the `for` header's init/update slots.
    fn parse_assignment_header(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expr()?;
        Ok(Stmt::AssignVar { name, value })
    }

    fn parse_identifier_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_ident()?;
        match self.peek_kind() {
            TokenKind::Assign => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::AssignVar { name, value })
            }
            TokenKind::LBracket => {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket, "']'")?;
                self.expect(TokenKind::Assign, "'='")?;
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::IndexAssign {
                    object: Expr::Identifier(name),
                    index,
                    value,
                })
            }
            TokenKind::Dot => {
                self.advance();
                let method = match self.peek_kind() {
                    TokenKind::Add => CollectionMethod::Add,
                    TokenKind::Delete => CollectionMethod::Delete,
                    TokenKind::Clear => CollectionMethod::Clear,
                    _ => return Err(self.error("expected 'add', 'delete', or 'clear'")),
                };
                self.advance();
                self.expect(TokenKind::Colon, "':'")?;
                let collection = match self.peek_kind() {
                    TokenKind::TypeList => CollectionKind::List,
                    TokenKind::TypeDict => CollectionKind::Dict,
                    _ => return Err(self.error("expected 'list' or 'dict'")),
                };
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;

                let mut args = Vec::new();
                if !self.check(TokenKind::RParen) {
                    if method == CollectionMethod::Add && collection == CollectionKind::Dict {
                        let key = self.parse_expr()?;
                        self.expect(TokenKind::Colon, "':'")?;
                        let value = self.parse_expr()?;
                        args.push(key);
                        args.push(value);
                    } else {
                        args.push(self.parse_expr()?);
                    }
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        args.push(self.parse_expr()?);
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::MethodCall {
                    object: name,
                    method,
                    collection,
                    args,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_args()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::ExprStmt(Expr::FunctionCall { name, args }))
            }
            _ => Err(self.error(format!(
                "expected '=', '[', '.', or '(' after identifier, found '{}'",
                self.peek().lexeme
            ))),
        }
    }

    /// Parses a call's comma-separated argument list, assuming the opening
    /// `(` was already consumed.
    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    // ---- expressions ------------------------------------------------------
    //
    // Precedence climbs from `||` (lowest) through unary/postfix to primary
    // (highest).

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// `**` is right-associative: parse the right-hand side by recursing back
    /// into `parse_power` rather than looping.
    fn parse_power(&mut self) -> ParseResult<Expr> {
        let left = self.parse_unary()?;
        if self.check(TokenKind::StarStar) {
            self.advance();
            let right = self.parse_power()?;
            return Ok(binary(BinaryOp::Pow, left, right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.check(TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket, "']'")?;
            expr = Expr::IndexAccess {
                object: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = token
                    .lexeme
                    .parse::<i64>()
                    .map_err(|_| self.error("malformed integer literal"))?;
                Ok(Expr::Int(value))
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let value = token
                    .lexeme
                    .parse::<f64>()
                    .map_err(|_| self.error("malformed float literal"))?;
                Ok(Expr::Float(value))
            }
            TokenKind::StringLiteral => {
                self.advance();
                Ok(Expr::Str(token.lexeme))
            }
            TokenKind::BoolLiteral => {
                self.advance();
                Ok(Expr::Bool(token.lexeme == "true"))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                if !self.check(TokenKind::RBracket) {
                    elems.push(self.parse_expr()?);
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        elems.push(self.parse_expr()?);
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expr::ListLiteral(elems))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if !self.check(TokenKind::RBrace) {
                    entries.push(self.parse_dict_entry()?);
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        entries.push(self.parse_dict_entry()?);
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Expr::DictLiteral(entries))
            }
            TokenKind::Write => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let prompt = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Write(Box::new(prompt)))
            }
            TokenKind::Rand => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let min = self.parse_expr()?;
                self.expect(TokenKind::Comma, "','")?;
                let max = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::RandCall {
                    min: Box::new(min),
                    max: Box::new(max),
                })
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    Ok(Expr::FunctionCall {
                        name: token.lexeme,
                        args,
                    })
                } else {
                    Ok(Expr::Identifier(token.lexeme))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.error(format!(
                "expected an expression, found '{}'",
                token.lexeme
            ))),
        }
    }

    fn parse_dict_entry(&mut self) -> ParseResult<(Expr, Expr)> {
        let key = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.parse_expr()?;
        Ok((key, value))
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> ParseResult<Program> {
        let tokens = Lexer::new(src).lex().unwrap();
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_minimal_program() {
        let program = parse(r#"@VoidApp "Hi"; main(){ echo("Hello"); }"#).unwrap();
        assert_eq!(program.app_name, "Hi");
        assert_eq!(program.body.len(), 1);
        let TopLevel::Main { body } = &program.body[0];
        assert_eq!(body.len(), 1);
        assert!(matches!(&body[0], Stmt::Echo(args) if args.len() == 1));
    }

    #[test]
    fn parses_style_directive() {
        let program = parse(r#"@VoidApp "Hi"; using style "Dark"; main(){}"#).unwrap();
        assert_eq!(program.style.as_deref(), Some("Dark"));
    }

    #[test]
    fn tolerates_trailing_void_end() {
        let program = parse(r#"@VoidApp "Hi"; main(){} @VoidEnd;"#).unwrap();
        assert_eq!(program.app_name, "Hi");
    }

    #[test]
    fn power_is_right_associative() {
        let program = parse(r#"@VoidApp "H"; main(){ echo(2 ** 3 ** 2); }"#).unwrap();
        let TopLevel::Main { body } = &program.body[0];
        let Stmt::Echo(args) = &body[0] else {
            panic!("expected echo")
        };
        match &args[0] {
            Expr::Binary {
                op: BinaryOp::Pow,
                left,
                right,
            } => {
                assert_eq!(**left, Expr::Int(2));
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("expected right-assoc pow, got {other:?}"),
        }
    }

    #[test]
    fn indexed_assignment_keeps_the_index() {
        let program = parse(r#"@VoidApp "H"; main(){ L[0] = 1; }"#).unwrap();
        let TopLevel::Main { body } = &program.body[0];
        assert!(matches!(&body[0], Stmt::IndexAssign { .. }));
    }

    #[test]
    fn missing_main_is_a_parse_error() {
        assert!(parse(r#"@VoidApp "H"; foo(){}"#).is_err());
    }

    #[test]
    fn for_loop_header_shape() {
        let src = r#"@VoidApp "H"; main(){ for(create:int i = 0; i < 5; i = i + 1){} }"#;
        let program = parse(src).unwrap();
        let TopLevel::Main { body } = &program.body[0];
        assert!(matches!(&body[0], Stmt::For { init: Some(_), cond: Some(_), update: Some(_), .. }));
    }
}
