use crate::error::{ErrorCode, ParseError};
use crate::syntax::ast::*;
use crate::syntax::token::{Builtin, Token, TokenKind};

/// Deepest nesting of blocks, parentheses and unary minus the parser will
/// build. Bounds recursion in the parser and the evaluator.
pub const MAX_NESTING: usize = 128;

/// Binary operators allowed in a single statement. Operator chains are
/// evaluated iteratively; this only bounds the depth of the tree's `Drop`.
pub const MAX_OPERATORS: usize = 2048;

/// Recursive-descent parser. Stops at the first syntax error.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    /// `tokens` must end with `Eof`, as produced by the lexer.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::Eof, line, column));
        }
        Self { tokens, pos: 0, depth: 0, operators: 0 }
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        self.enter()?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.leave();
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.operators = 0;
        match self.peek_kind() {
            TokenKind::While  => self.parse_while(),
            TokenKind::If     => self.parse_if(),
            TokenKind::LBrace => {
                let span = self.span();
                Ok(Stmt::Block(self.parse_block()?, span))
            }

            // ident `=` → assignment; anything else → expr stmt
            TokenKind::Ident(_) if self.peek_next_is(&TokenKind::Eq) => self.parse_assign(),

            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Assign(Assign { name, value, span }))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;
        let else_block = if self.matches(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If(IfStmt { condition, then_block, else_block, span }))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::While)?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::While(WhileStmt { condition, body, span }))
    }

    /// `( expr )`
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let expr = self.parse_equality()?;
        self.leave();
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq   => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            let span = left.span();
            self.advance();
            self.count_operator()?;
            let right = self.parse_comparison()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt   => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt   => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            let span = left.span();
            self.advance();
            self.count_operator()?;
            let right = self.parse_addition()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_addition(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = left.span();
            self.advance();
            self.count_operator()?;
            let right = self.parse_multiplication()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star  => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let span = left.span();
            self.advance();
            self.count_operator()?;
            let right = self.parse_unary()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let span = self.span();
        if self.matches(&TokenKind::Minus) {
            self.enter()?;
            let operand = self.parse_unary()?;
            self.leave();
            return Ok(Expr::UnOp { op: UnOp::Neg, operand: Box::new(operand), span });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        match tok.kind {
            TokenKind::Number(v) => { self.advance(); Ok(Expr::Number(v, span)) }

            TokenKind::Ident(name) => {
                if self.peek_next_is(&TokenKind::LParen) {
                    return Err(ParseError::new(
                        ErrorCode::P003, tok.line, tok.column,
                        format!("a builtin ({})", builtin_list()),
                        format!("unknown function `{name}`"),
                    ));
                }
                self.advance();
                Ok(Expr::Ident(name, span))
            }

            TokenKind::Builtin(builtin) => self.parse_call(builtin, span),

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_call(&mut self, builtin: Builtin, span: Span) -> Result<Expr, ParseError> {
        self.advance(); // builtin name
        self.expect(TokenKind::LParen)?;
        let args = self.parse_arg_list()?;
        self.expect(TokenKind::RParen)?;

        if !builtin.accepts(args.len()) {
            let counts: Vec<String> = builtin.arities().iter().map(|n| n.to_string()).collect();
            return Err(ParseError::new(
                ErrorCode::P004, span.line, span.column,
                format!("`{}` with {} argument(s)", builtin.name(), counts.join(" or ")),
                format!("{} argument(s)", args.len()),
            ));
        }
        Ok(Expr::Call { builtin, args, span })
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.matches(&TokenKind::Comma) { break; }
        }
        Ok(args)
    }

    // ─── Nesting guard ───────────────────────────────────────────────────────

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            let tok = self.peek();
            return Err(ParseError::new(
                ErrorCode::P005, tok.line, tok.column,
                format!("at most {MAX_NESTING} levels of nesting"),
                "deeper nesting",
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn count_operator(&mut self) -> Result<(), ParseError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            let tok = self.peek();
            return Err(ParseError::new(
                ErrorCode::P005, tok.line, tok.column,
                format!("at most {MAX_OPERATORS} operators in one statement"),
                "a longer expression",
            ));
        }
        Ok(())
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn peek_next_is(&self, kind: &TokenKind) -> bool {
        self.tokens.get(self.pos + 1).is_some_and(|t| t.kind == *kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(ParseError::new(ErrorCode::P002, tok.line, tok.column, kind.to_string(), tok.kind.to_string()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(s) => { self.advance(); Ok(s) }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.peek();
        ParseError::new(ErrorCode::P001, tok.line, tok.column, expected, tok.kind.to_string())
    }
}

fn builtin_list() -> String {
    Builtin::ALL.iter().map(|b| b.name()).collect::<Vec<_>>().join(", ")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
