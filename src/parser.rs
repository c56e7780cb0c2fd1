use std::mem;
use std::sync::LazyLock;

use thiserror::Error;

use crate::{
    ast::{Expr, OperatorTable, Token},
    lexer::{LexError, Lexer, Position},
};

static STANDARD_OPERATORS: LazyLock<OperatorTable> = LazyLock::new(OperatorTable::standard);

/// A query string that does not form a valid expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::new(e.to_string(), e.position())
    }
}

pub struct Parser<'t> {
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
    operators: &'t OperatorTable,
}

impl Parser<'static> {
    /// Parser over the standard operator table.
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        Parser::with_operators(lexer, &STANDARD_OPERATORS)
    }
}

impl<'t> Parser<'t> {
    pub fn with_operators(mut lexer: Lexer, operators: &'t OperatorTable) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_position();
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            operators,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_position();
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn unexpected(&self) -> ParseError {
        let message = match &self.current_token {
            Token::Eof => "Unexpected end of input".to_string(),
            token => format!("Unexpected token `{}`", token),
        };
        ParseError::new(message, self.current_position)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            let found = match &self.current_token {
                Token::Eof => "end of input".to_string(),
                token => format!("`{}`", token),
            };
            return Err(ParseError::new(
                format!("Expected `{}`, found {}", expected, found),
                self.current_position,
            ));
        }
        self.advance()
    }

    /// Tokens that end a run of juxtaposed expressions.
    fn at_boundary(&self) -> bool {
        matches!(
            self.current_token,
            Token::Eof | Token::RParen | Token::Comma
        )
    }

    /// Parse a complete query. Empty input yields an empty compound.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let mut parts = self.parse_juxtaposed()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected());
        }
        Ok(match parts.len() {
            1 => parts.remove(0),
            _ => Expr::Compound(parts),
        })
    }

    /// Expressions written one after another until a boundary token.
    fn parse_juxtaposed(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut parts = vec![];
        while !self.at_boundary() {
            parts.push(self.parse_expression()?);
        }
        Ok(parts)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(0)
    }

    /// The threshold is one wider than table precedences so that the level
    /// above `u8::MAX` exists.
    fn parse_binary(&mut self, min_precedence: u16) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = self.operators.binary_for(&self.current_token) {
            let precedence = u16::from(precedence);
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            // Left-associative: the right side only takes tighter operators.
            let right = self.parse_binary(precedence + 1)?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = self.operators.unary_for(&self.current_token) {
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    /// Parse primary expressions: literals, identifiers, calls, groups
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Integer(n) => {
                self.advance()?;
                Ok(Expr::Integer(n))
            }
            Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Float(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Boolean(b))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Null)
            }
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = match Expr::sequence(self.parse_list()?) {
                        Expr::Sequence(args) => args,
                        other => vec![other],
                    };
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            Token::LParen => {
                self.advance()?;
                let mut items = self.parse_list()?;
                if items.len() == 1 {
                    Ok(items.remove(0))
                } else {
                    Ok(Expr::sequence(items))
                }
            }
            token => {
                self.current_token = token;
                Err(self.unexpected())
            }
        }
    }

    /// Comma-separated items after an opening parenthesis, through the
    /// closing one.
    fn parse_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut items = vec![];
        if self.check(&Token::RParen) {
            self.advance()?;
            return Ok(items);
        }

        loop {
            let mut parts = self.parse_juxtaposed()?;
            match parts.len() {
                0 => return Err(self.unexpected()),
                1 => items.push(parts.remove(0)),
                _ => items.push(Expr::Compound(parts)),
            }

            if self.check(&Token::Comma) {
                self.advance()?;
            } else {
                self.expect(Token::RParen)?;
                return Ok(items);
            }
        }
    }
}

/// Parse a query string with the standard operators.
pub fn parse_query(input: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(input))?.parse()
}
