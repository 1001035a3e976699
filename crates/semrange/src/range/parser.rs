//! Operator-precedence parser turning range strings into predicates

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::expr::{Clause, Node, NodeId, RangeExpr};
use super::operator::{Op, Operator};
use super::tokenizer::{TokenKind, Tokenizer};
use crate::comparator::{self, VersionComparer};
use crate::version::{Version, VersionError};

/// Error type for range parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("The range string must not be empty")]
    Empty,
    #[error("Encountered invalid character '{character}' at offset {offset}")]
    InvalidCharacter { character: char, offset: usize },
    #[error("Unmatched \"(\" at offset {offset}")]
    UnmatchedOpenParen { offset: usize },
    #[error("Unmatched \")\" at offset {offset}")]
    UnmatchedCloseParen { offset: usize },
    #[error("Operator \"{operator}\" is missing an operand")]
    MissingOperand { operator: &'static str },
    #[error("Operator \"{operator}\" must be followed by a version")]
    ExpectedVersion { operator: &'static str },
    #[error("The range contains no comparisons")]
    EmptyExpression,
    #[error("{count} operand(s) left over after parsing")]
    LeftoverOperands { count: usize },
    #[error("Invalid version \"{literal}\" in range: {source}")]
    InvalidVersion {
        literal: String,
        #[source]
        source: VersionError,
    },
}

/// Slot on the operand stack
#[derive(Debug)]
enum Operand {
    /// Placeholder for the version under test
    Subject,
    Literal(Version),
    Expr(NodeId),
}

/// Entry on the operator stack
#[derive(Debug, Clone, Copy)]
enum Symbol {
    Op(Op),
    /// Implicit conjunction between adjacent clauses, e.g. `>=1.0.0 <2.0.0`
    Juxtaposition,
    OpenParen(usize),
}

impl Symbol {
    fn precedence(&self) -> u8 {
        match self {
            Symbol::Op(op) => op.precedence(),
            Symbol::Juxtaposition => 1,
            Symbol::OpenParen(_) => 0,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Symbol::Op(op) => op.as_str(),
            Symbol::Juxtaposition => "&&",
            Symbol::OpenParen(_) => "(",
        }
    }
}

/// What the previous token left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Start,
    /// A version literal or `)`
    Clause,
    /// A relational operator still waiting for its literal
    Relation,
    Operator,
}

/// Parses range strings such as `>=1.2.0 <2.0.0 || 3.*`.
///
/// The parser keeps its operand and operator stacks between calls to avoid
/// reallocating; both are cleared at the start of every [`RangeParser::parse`].
/// `parse` takes `&mut self`, so concurrent parses need one parser each.
///
/// Grammar notes:
/// - relational operators and `!` are prefix operators;
/// - a bare version literal means `==literal`;
/// - adjacent clauses are joined by an implicit `&&` that binds tighter than
///   both `||` and `&&`;
/// - an explicit `||` binds tighter than an explicit `&&`.
#[derive(Debug, Default)]
pub struct RangeParser {
    operands: Vec<Operand>,
    operators: Vec<Symbol>,
    nodes: Vec<Node>,
}

impl RangeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a range string into a reusable predicate
    pub fn parse(&mut self, range: &str) -> Result<VersionRange, RangeError> {
        if range.trim().is_empty() {
            return Err(RangeError::Empty);
        }

        self.operands.clear();
        self.operators.clear();
        self.nodes.clear();

        let mut previous = Previous::Start;

        for token in Tokenizer::new(range) {
            let token = token?;
            log::trace!("Range token {:?} at offset {}", token.kind, token.offset);

            match token.kind {
                TokenKind::Version(literal) => {
                    if previous == Previous::Clause {
                        self.push_infix(Symbol::Juxtaposition)?;
                    }
                    let version = Version::parse(literal).map_err(|source| RangeError::InvalidVersion {
                        literal: literal.to_string(),
                        source,
                    })?;
                    self.operands.push(Operand::Subject);
                    self.operands.push(Operand::Literal(version));
                    previous = Previous::Clause;
                }
                TokenKind::Op(op) if op.is_prefix() => {
                    self.expect_literal(previous)?;
                    if previous == Previous::Clause {
                        self.push_infix(Symbol::Juxtaposition)?;
                    }
                    self.operators.push(Symbol::Op(op));
                    previous = match op {
                        Op::Compare(_) => Previous::Relation,
                        _ => Previous::Operator,
                    };
                }
                TokenKind::Op(op) => {
                    self.push_infix(Symbol::Op(op))?;
                    previous = Previous::Operator;
                }
                TokenKind::OpenParen => {
                    self.expect_literal(previous)?;
                    if previous == Previous::Clause {
                        self.push_infix(Symbol::Juxtaposition)?;
                    }
                    self.operators.push(Symbol::OpenParen(token.offset));
                    previous = Previous::Operator;
                }
                TokenKind::CloseParen => {
                    loop {
                        match self.operators.pop() {
                            Some(Symbol::OpenParen(_)) => break,
                            Some(symbol) => self.apply(symbol)?,
                            None => return Err(RangeError::UnmatchedCloseParen { offset: token.offset }),
                        }
                    }
                    previous = Previous::Clause;
                }
            }
        }

        while let Some(symbol) = self.operators.pop() {
            self.apply(symbol)?;
        }

        if self.operands.is_empty() {
            return Err(RangeError::EmptyExpression);
        }
        let root = self.pop_condition("end of range")?;
        if !self.operands.is_empty() {
            return Err(RangeError::LeftoverOperands {
                count: self.operands.len(),
            });
        }

        let expr = RangeExpr::new(std::mem::take(&mut self.nodes), root);
        log::debug!("Parsed range \"{}\" into {} nodes", range, expr.nodes().len());

        Ok(VersionRange { expr })
    }

    /// Parse `range` and test `version` against it
    pub fn evaluate(&mut self, range: &str, version: &Version) -> Result<bool, RangeError> {
        Ok(self.parse(range)?.matches(version))
    }

    /// A relational operator takes exactly one version literal, never a group
    /// or another operator
    fn expect_literal(&self, previous: Previous) -> Result<(), RangeError> {
        match self.operators.last() {
            Some(symbol) if previous == Previous::Relation => Err(RangeError::ExpectedVersion {
                operator: symbol.label(),
            }),
            _ => Ok(()),
        }
    }

    /// Reduce every stacked operator that the incoming infix operator does not
    /// bind tighter than, then stack it.
    fn push_infix(&mut self, incoming: Symbol) -> Result<(), RangeError> {
        while let Some(&top) = self.operators.last() {
            if matches!(top, Symbol::OpenParen(_)) || incoming.precedence() < top.precedence() {
                break;
            }
            self.operators.pop();
            self.apply(top)?;
        }
        self.operators.push(incoming);
        Ok(())
    }

    fn apply(&mut self, symbol: Symbol) -> Result<(), RangeError> {
        log::trace!("Reducing \"{}\" with {} operand(s) on the stack", symbol.label(), self.operands.len());

        let node = match symbol {
            Symbol::Op(Op::Compare(operator)) => self.pop_comparison(operator)?,
            Symbol::Op(Op::Not) => Node::Not(self.pop_condition("!")?),
            Symbol::Op(Op::And) | Symbol::Juxtaposition => {
                let right = self.pop_condition("&&")?;
                let left = self.pop_condition("&&")?;
                Node::And(left, right)
            }
            Symbol::Op(Op::Or) => {
                let right = self.pop_condition("||")?;
                let left = self.pop_condition("||")?;
                Node::Or(left, right)
            }
            Symbol::OpenParen(offset) => return Err(RangeError::UnmatchedOpenParen { offset }),
        };

        let id = self.push_node(node);
        self.operands.push(Operand::Expr(id));
        Ok(())
    }

    /// Pop the subject/literal pair a relational operator consumes
    fn pop_comparison(&mut self, operator: Operator) -> Result<Node, RangeError> {
        let operator_text = operator.as_str();
        match self.operands.pop() {
            Some(Operand::Literal(version)) => match self.operands.pop() {
                Some(Operand::Subject) => Ok(Node::Clause(Clause::new(operator, version))),
                _ => Err(RangeError::MissingOperand { operator: operator_text }),
            },
            Some(_) => Err(RangeError::ExpectedVersion { operator: operator_text }),
            None => Err(RangeError::MissingOperand { operator: operator_text }),
        }
    }

    /// Pop one boolean operand; a bare literal becomes an equality clause
    fn pop_condition(&mut self, operator: &'static str) -> Result<NodeId, RangeError> {
        match self.operands.pop() {
            Some(Operand::Expr(id)) => Ok(id),
            Some(Operand::Literal(version)) => match self.operands.pop() {
                Some(Operand::Subject) => Ok(self.push_node(Node::Clause(Clause::new(Operator::Equal, version)))),
                _ => Err(RangeError::MissingOperand { operator }),
            },
            Some(Operand::Subject) => Err(RangeError::ExpectedVersion { operator }),
            None => Err(RangeError::MissingOperand { operator }),
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// A parsed range: a predicate over versions that can be evaluated many times
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    expr: RangeExpr,
}

impl VersionRange {
    /// Parse a range with a fresh parser
    pub fn parse(range: &str) -> Result<Self, RangeError> {
        RangeParser::new().parse(range)
    }

    pub fn expr(&self) -> &RangeExpr {
        &self.expr
    }

    /// Test a version using the process-wide default comparer
    pub fn matches(&self, version: &Version) -> bool {
        let comparer = comparator::default_comparer();
        self.expr.evaluate(version, comparer.as_ref())
    }

    /// Test a version using an explicit comparer
    pub fn matches_with(&self, version: &Version, comparer: &dyn VersionComparer) -> bool {
        self.expr.evaluate(version, comparer)
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
