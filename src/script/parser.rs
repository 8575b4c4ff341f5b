//! Script expression parser
//!
//! Parses expressions like:
//! - `lookup("status") == "done"`
//! - `lookup("a") + lookup("b") > 5`
//! - `lookup("order")["total"] != null and not lookup("draft")`

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::lexer::{tokenize, Spanned, Token};
use crate::error::EngineError;
use crate::value::Value;

/// The one function the language knows
const LOOKUP: &str = "lookup";

/// Deepest nesting of parentheses, brackets and unary operators, and the
/// tallest tree the parser will build
const MAX_DEPTH: usize = 128;

/// Parse an expression string into an AST
pub fn parse(input: &str) -> Result<Expr, EngineError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };

    let node = parser.parse_or()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(EngineError::Syntax {
            message: format!("unexpected {:?} after expression", extra.token),
            position: extra.position,
        });
    }
    Ok(node.expr)
}

/// Subtree with its height
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Position reported for errors at end of input
    end: usize,
    /// Open parentheses, brackets and unary operators
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|s| s.position)
            .unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), EngineError> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.syntax(format!("expected {}", what)))
        }
    }

    fn syntax(&self, message: String) -> EngineError {
        let message = match self.peek() {
            Some(token) => format!("{}, found {:?}", message, token),
            None => format!("{}, found end of input", message),
        };
        EngineError::Syntax {
            message,
            position: self.position(),
        }
    }

    fn enter(&mut self, position: usize) -> Result<(), EngineError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EngineError::TooDeep { position });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn grow(&self, height: usize, position: usize) -> Result<usize, EngineError> {
        let height = height + 1;
        if height > MAX_DEPTH {
            return Err(EngineError::TooDeep { position });
        }
        Ok(height)
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: Node,
        right: Node,
        position: usize,
    ) -> Result<Node, EngineError> {
        let height = self.grow(left.height.max(right.height), position)?;
        Ok(Node {
            expr: Expr::binary(op, left.expr, right.expr),
            height,
        })
    }

    fn parse_or(&mut self) -> Result<Node, EngineError> {
        let mut left = self.parse_and()?;
        loop {
            let position = self.position();
            if !self.eat(&Token::Or) {
                return Ok(left);
            }
            let right = self.parse_and()?;
            left = self.binary(BinaryOp::Or, left, right, position)?;
        }
    }

    fn parse_and(&mut self) -> Result<Node, EngineError> {
        let mut left = self.parse_equality()?;
        loop {
            let position = self.position();
            if !self.eat(&Token::And) {
                return Ok(left);
            }
            let right = self.parse_equality()?;
            left = self.binary(BinaryOp::And, left, right, position)?;
        }
    }

    fn parse_equality(&mut self) -> Result<Node, EngineError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                _ => return Ok(left),
            };
            let position = self.position();
            self.pos += 1;
            let right = self.parse_comparison()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_comparison(&mut self) -> Result<Node, EngineError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Lte) => BinaryOp::Lte,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Gte) => BinaryOp::Gte,
                Some(Token::Contains) => BinaryOp::Contains,
                _ => return Ok(left),
            };
            let position = self.position();
            self.pos += 1;
            let right = self.parse_additive()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_additive(&mut self) -> Result<Node, EngineError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            let position = self.position();
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Node, EngineError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(left),
            };
            let position = self.position();
            self.pos += 1;
            let right = self.parse_unary()?;
            left = self.binary(op, left, right, position)?;
        }
    }

    fn parse_unary(&mut self) -> Result<Node, EngineError> {
        let op = match self.peek() {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let position = self.position();
        self.pos += 1;

        self.enter(position)?;
        let operand = self.parse_unary()?;
        self.leave();

        let height = self.grow(operand.height, position)?;
        Ok(Node {
            expr: Expr::unary(op, operand.expr),
            height,
        })
    }

    fn parse_postfix(&mut self) -> Result<Node, EngineError> {
        let mut node = self.parse_primary()?;
        loop {
            let position = self.position();
            if !self.eat(&Token::LBracket) {
                return Ok(node);
            }

            self.enter(position)?;
            let key = self.parse_or()?;
            self.expect(Token::RBracket, "']'")?;
            self.leave();

            let height = self.grow(node.height.max(key.height), position)?;
            node = Node {
                expr: Expr::Index {
                    target: Box::new(node.expr),
                    key: Box::new(key.expr),
                },
                height,
            };
        }
    }

    fn parse_primary(&mut self) -> Result<Node, EngineError> {
        let Some(Spanned { token, position }) = self.advance() else {
            return Err(self.syntax("expected an expression".to_string()));
        };

        match token {
            Token::Int(i) => Ok(Node::leaf(Expr::Literal(Value::Int(i)))),
            Token::Float(f) => Ok(Node::leaf(Expr::Literal(Value::Float(f)))),
            Token::Str(s) => Ok(Node::leaf(Expr::Literal(Value::String(s)))),
            Token::True => Ok(Node::leaf(Expr::Literal(Value::Bool(true)))),
            Token::False => Ok(Node::leaf(Expr::Literal(Value::Bool(false)))),
            Token::Null => Ok(Node::leaf(Expr::Literal(Value::Undefined))),
            Token::LParen => {
                self.enter(position)?;
                let inner = self.parse_or()?;
                self.expect(Token::RParen, "')'")?;
                self.leave();
                Ok(inner)
            }
            Token::Ident(name) => self.parse_call(name, position).map(Node::leaf),
            other => Err(EngineError::Syntax {
                message: format!("expected an expression, found {:?}", other),
                position,
            }),
        }
    }

    fn parse_call(&mut self, name: String, position: usize) -> Result<Expr, EngineError> {
        if self.peek() != Some(&Token::LParen) {
            return Err(EngineError::Syntax {
                message: format!("unknown identifier '{}'", name),
                position,
            });
        }
        if name != LOOKUP {
            return Err(EngineError::UnknownFunction { name, position });
        }

        self.pos += 1;
        let attribute = match self.advance() {
            Some(Spanned {
                token: Token::Str(s),
                ..
            }) => s,
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.syntax("lookup expects a string literal".to_string()));
            }
        };
        self.expect(Token::RParen, "')'")?;
        Ok(Expr::Lookup(attribute))
    }
}
