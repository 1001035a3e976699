//! Operator types for range expressions

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Relational operators comparing the version under test to a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid operator: {0}")]
pub struct InvalidOperatorError(pub String);

impl Operator {
    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Whether `tested <op> literal` holds, given `tested.cmp(literal)`
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl FromStr for Operator {
    type Err = InvalidOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Op>()? {
            Op::Compare(operator) => Ok(operator),
            _ => Err(InvalidOperatorError(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every operator a range expression may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Logical OR (||)
    Or,
    /// Logical AND (&&)
    And,
    /// Logical NOT (!)
    Not,
    /// Relational comparison against the following version literal
    Compare(Operator),
}

const OPERATORS: [(&str, Op); 9] = [
    ("||", Op::Or),
    ("&&", Op::And),
    ("!=", Op::Compare(Operator::NotEqual)),
    ("==", Op::Compare(Operator::Equal)),
    ("<=", Op::Compare(Operator::LessThanOrEqual)),
    (">=", Op::Compare(Operator::GreaterThanOrEqual)),
    ("<", Op::Compare(Operator::LessThan)),
    (">", Op::Compare(Operator::GreaterThan)),
    ("!", Op::Not),
];

impl Op {
    /// Precedence number. Parsing reduces a stacked operator whenever the
    /// incoming operator's number is greater than or equal to it, so lower
    /// numbers bind tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Op::Not | Op::Compare(_) => 1,
            Op::Or => 2,
            Op::And => 3,
        }
    }

    /// Number of operands consumed when the operator is applied
    pub fn arity(&self) -> usize {
        match self {
            Op::Not => 1,
            Op::Or | Op::And | Op::Compare(_) => 2,
        }
    }

    /// Prefix operators appear before all of their operands
    pub fn is_prefix(&self) -> bool {
        matches!(self, Op::Not | Op::Compare(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Or => "||",
            Op::And => "&&",
            Op::Not => "!",
            Op::Compare(operator) => operator.as_str(),
        }
    }

    /// Find the operator at the start of `input`, trying the two-character
    /// form before the one-character one. Returns the operator and its length.
    pub fn lookup(input: &str) -> Option<(Op, usize)> {
        [2, 1].into_iter().find_map(|len| {
            let head = input.get(..len)?;
            OPERATORS
                .iter()
                .find(|(text, _)| *text == head)
                .map(|&(_, op)| (op, len))
        })
    }

    /// Get all supported operators
    pub fn supported_operators() -> &'static [&'static str] {
        &["||", "&&", "!=", "==", "<", ">", "<=", ">=", "!"]
    }
}

impl FromStr for Op {
    type Err = InvalidOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS
            .iter()
            .find(|(text, _)| *text == s)
            .map(|&(_, op)| op)
            .ok_or_else(|| InvalidOperatorError(s.to_string()))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
