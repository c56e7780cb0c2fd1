use std::collections::HashMap;

use crate::ast::Token;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Comparison
    /// Equal (`=`, `==`)
    Equal,
    /// Not equal (`!=`, `<>`)
    NotEqual,
    /// Substring containment (`~`)
    Contains,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Membership
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,

    // Logical
    /// Logical AND (`AND`, `and`, `&&`)
    And,
    /// Logical OR (`OR`, `or`, `||`)
    Or,
}

impl BinOp {
    /// The operator a token spells, if any.
    pub fn from_token(token: &Token) -> Option<BinOp> {
        match token {
            Token::Eq | Token::EqEq => Some(BinOp::Equal),
            Token::NotEq | Token::LtGt => Some(BinOp::NotEqual),
            Token::Tilde => Some(BinOp::Contains),
            Token::Lt => Some(BinOp::LessThan),
            Token::Gt => Some(BinOp::GreaterThan),
            Token::LtEq => Some(BinOp::LessEqual),
            Token::GtEq => Some(BinOp::GreaterEqual),
            Token::In => Some(BinOp::In),
            Token::NotIn => Some(BinOp::NotIn),
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Subtract),
            Token::And => Some(BinOp::And),
            Token::Or => Some(BinOp::Or),
            _ => None,
        }
    }

    /// Operators whose right-hand bare identifier is read as a string.
    pub fn is_comparison(&self) -> bool {
        !matches!(self, BinOp::Add | BinOp::Subtract | BinOp::And | BinOp::Or)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Numeric negation (`-`)
    Negate,
    /// Numeric identity (`+`)
    Plus,
}

impl UnOp {
    pub fn from_token(token: &Token) -> Option<UnOp> {
        match token {
            Token::Minus => Some(UnOp::Negate),
            Token::Plus => Some(UnOp::Plus),
            _ => None,
        }
    }
}

/// Operators the parser recognizes, with their binding strength.
///
/// Built once and handed to the parser; never mutated afterwards. Higher
/// precedence binds tighter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    binary: HashMap<BinOp, u8>,
    unary: Vec<UnOp>,
}

impl OperatorTable {
    /// An empty table. Nothing parses as an operator.
    pub fn empty() -> Self {
        OperatorTable {
            binary: HashMap::new(),
            unary: Vec::new(),
        }
    }

    /// The query language's operators.
    ///
    /// | precedence | operators                               |
    /// |------------|-----------------------------------------|
    /// | 1          | `OR` `or` `\|\|`                        |
    /// | 2          | `AND` `and` `&&`                        |
    /// | 3          | `IN` `NOT IN`                           |
    /// | 4          | `=` `==` `!=` `<>` `~` `<` `<=` `>` `>=` |
    /// | 5          | `+` `-`                                 |
    pub fn standard() -> Self {
        OperatorTable::empty()
            .with_binary(BinOp::Or, 1)
            .with_binary(BinOp::And, 2)
            .with_binary(BinOp::In, 3)
            .with_binary(BinOp::NotIn, 3)
            .with_binary(BinOp::Equal, 4)
            .with_binary(BinOp::NotEqual, 4)
            .with_binary(BinOp::Contains, 4)
            .with_binary(BinOp::LessThan, 4)
            .with_binary(BinOp::LessEqual, 4)
            .with_binary(BinOp::GreaterThan, 4)
            .with_binary(BinOp::GreaterEqual, 4)
            .with_binary(BinOp::Add, 5)
            .with_binary(BinOp::Subtract, 5)
            .with_unary(UnOp::Negate)
            .with_unary(UnOp::Plus)
    }

    pub fn with_binary(mut self, op: BinOp, precedence: u8) -> Self {
        self.binary.insert(op, precedence);
        self
    }

    pub fn with_unary(mut self, op: UnOp) -> Self {
        if !self.unary.contains(&op) {
            self.unary.push(op);
        }
        self
    }

    pub fn precedence(&self, op: BinOp) -> Option<u8> {
        self.binary.get(&op).copied()
    }

    /// The binary operator `token` spells, if this table knows it.
    pub fn binary_for(&self, token: &Token) -> Option<(BinOp, u8)> {
        let op = BinOp::from_token(token)?;
        self.precedence(op).map(|prec| (op, prec))
    }

    pub fn unary_for(&self, token: &Token) -> Option<UnOp> {
        UnOp::from_token(token).filter(|op| self.unary.contains(op))
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        OperatorTable::standard()
    }
}
