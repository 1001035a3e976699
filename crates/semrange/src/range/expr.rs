//! Expression tree for parsed ranges and its evaluator

use std::fmt;

use super::operator::Operator;
use crate::comparator::VersionComparer;
use crate::version::Version;

/// Index of a node inside a [`RangeExpr`]
pub type NodeId = usize;

/// A single comparison of the version under test against a literal
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    operator: Operator,
    version: Version,
}

impl Clause {
    pub fn new(operator: Operator, version: Version) -> Self {
        Clause { operator, version }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check `tested <operator> literal` with the given comparer
    pub fn matches_with(&self, tested: &Version, comparer: &dyn VersionComparer) -> bool {
        self.operator.holds(comparer.compare(tested, &self.version))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Clause(Clause),
    Not(NodeId),
    And(NodeId, NodeId),
    Or(NodeId, NodeId),
}

impl Node {
    fn is_binary(&self) -> bool {
        matches!(self, Node::And(..) | Node::Or(..))
    }
}

/// Boolean expression over comparisons with a single version variable.
///
/// Nodes live in a flat arena and children always precede their parent, so
/// neither evaluation nor drop recurse on deep trees.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeExpr {
    nodes: Vec<Node>,
    root: NodeId,
}

enum Step {
    Eval(NodeId),
    Invert,
    AndThen(NodeId),
    OrElse(NodeId),
}

enum Piece {
    Node(NodeId),
    Text(&'static str),
}

impl RangeExpr {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        RangeExpr { nodes, root }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All comparisons in the tree, in source order
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Clause(clause) => Some(clause),
            _ => None,
        })
    }

    /// Evaluate the expression for `version`, short-circuiting `&&` and `||`
    pub fn evaluate(&self, version: &Version, comparer: &dyn VersionComparer) -> bool {
        let mut steps = vec![Step::Eval(self.root)];
        let mut values: Vec<bool> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Eval(id) => match &self.nodes[id] {
                    Node::Clause(clause) => values.push(clause.matches_with(version, comparer)),
                    Node::Not(inner) => {
                        steps.push(Step::Invert);
                        steps.push(Step::Eval(*inner));
                    }
                    Node::And(left, right) => {
                        steps.push(Step::AndThen(*right));
                        steps.push(Step::Eval(*left));
                    }
                    Node::Or(left, right) => {
                        steps.push(Step::OrElse(*right));
                        steps.push(Step::Eval(*left));
                    }
                },
                Step::Invert => {
                    if let Some(value) = values.last_mut() {
                        *value = !*value;
                    }
                }
                // The left value stays as the result unless the right side decides
                Step::AndThen(right) => {
                    if values.last() == Some(&true) {
                        values.pop();
                        steps.push(Step::Eval(right));
                    }
                }
                Step::OrElse(right) => {
                    if values.last() == Some(&false) {
                        values.pop();
                        steps.push(Step::Eval(right));
                    }
                }
            }
        }

        values.pop().unwrap_or(false)
    }
}

impl fmt::Display for RangeExpr {
    /// Canonical form: explicit operators, binary operands parenthesised.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces = vec![Piece::Node(self.root)];

        while let Some(piece) = pieces.pop() {
            let id = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(id) => id,
            };

            match &self.nodes[id] {
                Node::Clause(clause) => write!(f, "{}", clause)?,
                // Always parenthesised: "!==1.0.0" would lex as "!=" "=1.0.0"
                Node::Not(inner) => {
                    pieces.push(Piece::Text(")"));
                    pieces.push(Piece::Node(*inner));
                    f.write_str("!(")?;
                }
                Node::And(left, right) | Node::Or(left, right) => {
                    let separator = if matches!(self.nodes[id], Node::And(..)) { " && " } else { " || " };
                    self.push_operand(&mut pieces, *right);
                    pieces.push(Piece::Text(separator));
                    self.push_operand(&mut pieces, *left);
                }
            }
        }

        Ok(())
    }
}

impl RangeExpr {
    fn push_operand(&self, pieces: &mut Vec<Piece>, id: NodeId) {
        if self.nodes[id].is_binary() {
            pieces.push(Piece::Text(")"));
            pieces.push(Piece::Node(id));
            pieces.push(Piece::Text("("));
        } else {
            pieces.push(Piece::Node(id));
        }
    }
}
