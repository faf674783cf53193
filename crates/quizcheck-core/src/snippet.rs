//! Checker snippet compiler.
//!
//! Turns author-written checking logic into a [`Program`] and statically
//! checks that every name it mentions is inside the allowed surface: the
//! value-parser builtins, the `submitted`/`expected` bindings, and variables
//! the snippet itself assigned earlier. Anything else is rejected before
//! evaluation ever starts.

use std::collections::HashSet;

use crate::answer::BUILTIN_NAMES;
use crate::ast::{BinOp, Expr, Program, Stmt, UnaryOp};
use crate::error::SnippetError;
use crate::lexer::{tokenize, Spanned, Token};

/// Variables bound by the sandbox before a snippet runs.
pub const BOUND_NAMES: &[&str] = &["submitted", "expected"];

/// Nesting deeper than this is rejected; it bounds recursion in both the
/// parser and the evaluator so hostile snippets cannot blow the host stack.
const MAX_DEPTH: usize = 64;

/// Source longer than this is rejected. Together with `MAX_DEPTH` it bounds
/// the AST a snippet can produce (a long left-leaning operator chain costs
/// one evaluator stack frame per operator).
const MAX_SOURCE_LEN: usize = 4096;

/// Compile snippet source into a program.
pub fn compile(source: &str) -> Result<Program, SnippetError> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(SnippetError::Syntax {
            offset: MAX_SOURCE_LEN,
            message: format!("checker longer than {MAX_SOURCE_LEN} bytes"),
        });
    }
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
    };
    let stmts = parser.parse_stmts(0, false)?;
    if stmts.is_empty() {
        return Err(SnippetError::Syntax {
            offset: 0,
            message: "empty checker".into(),
        });
    }
    Ok(Program { stmts })
}

/// Statically verify that a program only references allowed names.
///
/// Walks statements in order, accumulating assigned variables; a reference
/// to anything that is not a builtin, a sandbox binding, or a previously
/// assigned variable is an [`SnippetError::UnknownName`].
pub fn validate_program(program: &Program) -> Result<(), SnippetError> {
    let mut known: HashSet<&str> = BOUND_NAMES.iter().copied().collect();
    check_stmts(&program.stmts, &mut known)
}

/// Compile and validate in one step.
pub fn compile_checked(source: &str) -> Result<Program, SnippetError> {
    let program = compile(source)?;
    validate_program(&program)?;
    Ok(program)
}

fn check_stmts<'a>(
    stmts: &'a [Stmt],
    known: &mut HashSet<&'a str>,
) -> Result<(), SnippetError> {
    for stmt in stmts {
        match stmt {
            Stmt::Assign { name, value } => {
                check_expr(value, known)?;
                known.insert(name.as_str());
            }
            Stmt::While { cond, body } => {
                check_expr(cond, known)?;
                check_stmts(body, known)?;
            }
            Stmt::Expr(expr) => check_expr(expr, known)?,
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, known: &HashSet<&str>) -> Result<(), SnippetError> {
    match expr {
        Expr::Int(_) | Expr::Str(_) | Expr::Bool(_) => Ok(()),
        Expr::Ident(name) => {
            if known.contains(name.as_str()) {
                Ok(())
            } else {
                Err(SnippetError::UnknownName { name: name.clone() })
            }
        }
        Expr::Call { name, args } => {
            if !BUILTIN_NAMES.contains(&name.as_str()) {
                return Err(SnippetError::UnknownName { name: name.clone() });
            }
            for arg in args {
                check_expr(arg, known)?;
            }
            Ok(())
        }
        Expr::Unary { operand, .. } => check_expr(operand, known),
        Expr::Binary { lhs, rhs, .. } => {
            check_expr(lhs, known)?;
            check_expr(rhs, known)
        }
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|s| s.offset).unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SnippetError {
        SnippetError::Syntax {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), SnippetError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn skip_seps(&mut self) {
        while self.peek() == Some(&Token::Sep) {
            self.pos += 1;
        }
    }

    /// Parse statements until end of input, or until `}` when `in_block`.
    fn parse_stmts(&mut self, depth: usize, in_block: bool) -> Result<Vec<Stmt>, SnippetError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_seps();
            match self.peek() {
                None => {
                    if in_block {
                        return Err(self.error("expected '}'"));
                    }
                    return Ok(stmts);
                }
                Some(Token::RBrace) if in_block => return Ok(stmts),
                Some(_) => {
                    stmts.push(self.parse_stmt(depth)?);
                    // A statement ends at a separator, a closing brace, or EOF.
                    match self.peek() {
                        None | Some(Token::Sep) => {}
                        Some(Token::RBrace) if in_block => {}
                        Some(_) => return Err(self.error("expected end of statement")),
                    }
                }
            }
        }
    }

    fn parse_stmt(&mut self, depth: usize) -> Result<Stmt, SnippetError> {
        if self.peek() == Some(&Token::While) {
            self.pos += 1;
            let cond = self.parse_expr(depth + 1)?;
            self.expect(&Token::LBrace, "'{' after while condition")?;
            let body = self.parse_stmts(depth + 1, true)?;
            self.expect(&Token::RBrace, "'}'")?;
            return Ok(Stmt::While { cond, body });
        }

        // Assignment: IDENT '=' ... (but not IDENT '==').
        if let Some(Token::Ident(name)) = self.peek() {
            if self.tokens.get(self.pos + 1).map(|s| &s.token) == Some(&Token::Assign) {
                let name = name.clone();
                self.pos += 2;
                let value = self.parse_expr(depth + 1)?;
                return Ok(Stmt::Assign { name, value });
            }
        }

        Ok(Stmt::Expr(self.parse_expr(depth + 1)?))
    }

    fn parse_expr(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        if depth > MAX_DEPTH {
            return Err(self.error("expression too deeply nested"));
        }
        self.parse_or(depth)
    }

    fn parse_or(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        let mut lhs = self.parse_and(depth)?;
        while self.peek() == Some(&Token::OrOr) {
            self.pos += 1;
            let rhs = self.parse_and(depth)?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        let mut lhs = self.parse_cmp(depth)?;
        while self.peek() == Some(&Token::AndAnd) {
            self.pos += 1;
            let rhs = self.parse_cmp(depth)?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        let lhs = self.parse_add(depth)?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinOp::Eq,
            Some(Token::NotEq) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_add(depth)?;
        Ok(binary(op, lhs, rhs))
    }

    fn parse_add(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        let mut lhs = self.parse_mul(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_mul(depth)?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_mul(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        let mut lhs = self.parse_unary(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary(depth)?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        if depth > MAX_DEPTH {
            return Err(self.error("expression too deeply nested"));
        }
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Bang) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.parse_unary(depth + 1)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary(depth)
    }

    fn parse_primary(&mut self, depth: usize) -> Result<Expr, SnippetError> {
        match self.advance() {
            Some(Token::Int(n)) => Ok(Expr::Int(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.parse_expr(depth + 1)?);
                            if self.peek() == Some(&Token::Comma) {
                                self.pos += 1;
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(&Token::RParen, "')' after arguments")?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expr(depth + 1)?;
                self.expect(&Token::RParen, "')'")?;
                Ok(expr)
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected an expression"))
            }
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
