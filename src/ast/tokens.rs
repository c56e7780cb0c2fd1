use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 604800
    /// ```
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// String literal enclosed in double or single quotes
    ///
    /// # Examples
    /// ```text
    /// "my-label"
    /// 'OPEN'
    /// ```
    String(String),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    // Identifiers
    /// Field name, function name or bare word
    ///
    /// Starts with a letter, `_`, `$` or `@`, followed by letters, digits,
    /// `_` or `$`.
    ///
    /// # Examples
    /// ```text
    /// author
    /// reviewStatus
    /// coderabbitai
    /// ```
    Identifier(String),

    // Comparison
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<>`
    LtGt,
    /// `~` (substring containment)
    Tilde,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    // Membership
    /// `IN` / `in`
    In,
    /// `NOT IN` / `not in`
    NotIn,
    /// A `NOT` that is not followed by `IN`
    Not,

    // Logical
    /// `AND`, `and` or `&&`
    And,
    /// `OR`, `or` or `||`
    Or,

    // Arithmetic
    Plus,
    Minus,

    // Delimiters
    LParen,
    RParen,
    Comma,

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{}", n),
            Token::Float(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Null => f.write_str("null"),
            Token::Identifier(name) => f.write_str(name),
            Token::Eq => f.write_str("="),
            Token::EqEq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
            Token::LtGt => f.write_str("<>"),
            Token::Tilde => f.write_str("~"),
            Token::Lt => f.write_str("<"),
            Token::Gt => f.write_str(">"),
            Token::LtEq => f.write_str("<="),
            Token::GtEq => f.write_str(">="),
            Token::In => f.write_str("IN"),
            Token::NotIn => f.write_str("NOT IN"),
            Token::Not => f.write_str("NOT"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
