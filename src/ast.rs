//! # Pull-request query language - Abstract Syntax Tree
//!
//! The query language is a small expression grammar for selecting pull
//! requests:
//!
//! ```text
//! author = @me state = OPEN labels NOT IN ("wip") createdAt >= -7d
//! ```
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, fields, operations, calls)
//! - **[operators]** - Binary and unary operators and the precedence table
//!
//! ## Core Concepts
//!
//! ### Implicit AND
//!
//! Expressions written next to each other without `AND`/`OR` form a
//! [`Expr::Compound`], which holds when every part holds.
//!
//! ### Bare words
//!
//! An identifier on the right of a comparison, or inside a list, is the
//! string of its own name: `state = OPEN` and `state = "OPEN"` are the same.
//!
//! ### Relative time
//!
//! Numbers compared with timestamps are offsets in seconds from now. The
//! duration literals `-7d`, `2h`, `30min` are rewritten to seconds before
//! parsing, so they never appear in the AST.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, OperatorTable, UnOp};
pub use tokens::Token;
