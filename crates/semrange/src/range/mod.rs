//! Range expressions: boolean combinations of version comparisons
//!
//! A range such as `>=1.2.0 <2.0.0 || 3.*` is tokenized, parsed with an
//! operator-precedence parser into a flat expression tree and evaluated
//! against any number of versions.

mod expr;
mod operator;
mod parser;
mod tokenizer;

pub use expr::{Clause, Node, NodeId, RangeExpr};
pub use operator::{InvalidOperatorError, Op, Operator};
pub use parser::{RangeError, RangeParser, VersionRange};
pub use tokenizer::{Token, TokenKind, Tokenizer};
