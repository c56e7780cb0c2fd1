pub mod ast;
pub mod clause;
pub mod cli;
pub mod duration;
pub mod engine;
pub mod evaluator;
pub mod field;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod record;
pub mod value;
pub mod variables;

pub use ast::{BinOp, Expr, OperatorTable, Token, UnOp};
pub use clause::{ClauseValue, Comparator, FilterClause};
pub use engine::{CompiledQuery, FilterEngine, FilterError, Predicate, SavedFilter, filter_by, filter_by_query};
pub use evaluator::{EvalContext, EvalError, Evaluator};
pub use field::Field;
pub use lexer::{LexError, Lexer, Position};
pub use parser::{ParseError, Parser};
pub use record::PullRequest;
pub use value::Value;
pub use variables::Variables;
