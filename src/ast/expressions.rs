use crate::ast::{BinOp, UnOp};

/// Abstract Syntax Tree node representing a parsed query expression.
///
/// Produced once per query string and immutable afterwards; the same tree
/// is evaluated against every record.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal integer
    Integer(i64),

    /// Literal floating point number
    Float(f64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "my-label"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// Field reference, or a bare word when used as a comparison's right
    /// operand or as a sequence element
    ///
    /// # Examples
    /// ```text
    /// author
    /// state = OPEN      // OPEN is read as "OPEN"
    /// ```
    Identifier(String),

    /// Unary `-` / `+`
    UnaryOp { op: UnOp, operand: Box<Expr> },

    /// Binary operation (comparison, membership, arithmetic, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Comma-separated list, flattened and in source order
    ///
    /// # Example
    /// ```text
    /// ("my-label", "foo")
    /// ```
    Sequence(Vec<Expr>),

    /// Built-in function call
    ///
    /// # Example
    /// ```text
    /// getReviewDate("APPROVED")
    /// ```
    Call { name: String, args: Vec<Expr> },

    /// Juxtaposed expressions without a boolean operator between them,
    /// read as a conjunction
    ///
    /// # Example
    /// ```text
    /// author = @me state = OPEN
    /// ```
    Compound(Vec<Expr>),
}

impl Expr {
    /// Build a sequence, splicing in nested sequences.
    pub fn sequence(items: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Expr::Sequence(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Expr::Sequence(flat)
    }
}
