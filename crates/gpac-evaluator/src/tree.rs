//! Expression tree genome.
//!
//! An [`ExpressionTree`] owns a [`Node`] and, transitively, all of its
//! descendants. The node type makes the binary invariant structural: a node is
//! either a [`Node::Leaf`] with no children or a [`Node::Branch`] with exactly
//! two, so a one-child node cannot be represented.
//!
//! # Addressing
//!
//! Nodes are identified by position, not content: index `i` is the `i`-th
//! node of a breadth-first traversal starting at the root (index `0`). This is
//! the order [`ExpressionTree::node_list`] returns and the pool crossover and
//! mutation points are drawn from.
//!
//! # Growth
//!
//! [`Node::grow`] picks a target height and builds a tree level by level.
//! Branches below the target height get two function children; branches at
//! the target height get two leaves. Once one branch has reached the target
//! height, every later branch may stop early with the premature-end
//! probability, which yields irregular trees whose height is still exactly
//! the target.
//!
//! # Ownership
//!
//! Trees never share nodes. Copying a subtree into another tree
//! ([`ExpressionTree::subtree`] + [`ExpressionTree::replace_subtree`]) always
//! clones it, so later edits to either tree leave the other untouched.

use std::{collections::VecDeque, fmt};

use gpac_engine::{Coord, GameState};
use rand::Rng;

use crate::node::{FunctionKind, NO_TARGET, NodeCatalog, NodeValue, Operand, TerminalKind};

/// Malformed breadth-first node list.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TreeError {
    #[display("node list is empty")]
    Empty,
    #[display("node list ends before the children of node {parent} are listed")]
    MissingChildren { parent: usize },
    #[display("node {index} is not reachable from the root")]
    Unreachable { index: usize },
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Node {
    Leaf(Operand),
    Branch {
        function: FunctionKind,
        children: Box<[Node; 2]>,
    },
}

/// What a tree is evaluated against: a game state and the pac-man position
/// being considered.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub state: GameState<'a>,
    pub pacman: Coord,
}

impl EvalContext<'_> {
    #[expect(clippy::cast_precision_loss)]
    fn terminal(&self, kind: TerminalKind) -> f64 {
        let distance = |d: Option<u32>| d.map_or(NO_TARGET, f64::from);
        match kind {
            TerminalKind::GhostDistance => distance(self.state.nearest_ghost_distance(self.pacman)),
            TerminalKind::PillDistance => distance(self.state.nearest_pill_distance(self.pacman)),
            TerminalKind::FruitDistance => distance(self.state.nearest_fruit_distance(self.pacman)),
            TerminalKind::AdjacentWalls => self.state.adjacent_wall_count(self.pacman) as f64,
        }
    }
}

/// Height bounds and early-stop chance used when growing a subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowParams {
    pub min_height: u32,
    pub max_height: u32,
    pub premature_end_probability: f64,
}

/// Growth bookkeeping threaded through the recursion.
#[derive(Debug)]
struct GrowState {
    target_height: u32,
    full_height_reached: bool,
}

impl Node {
    /// Grows a random subtree whose height is drawn from
    /// `[min_height, max_height]`.
    ///
    /// A height of `1` produces a single leaf.
    pub fn grow<R>(params: &GrowParams, catalog: &NodeCatalog, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let target_height = rng.random_range(params.min_height..=params.max_height);
        Self::grow_to_height(
            target_height,
            params.premature_end_probability,
            catalog,
            rng,
        )
    }

    /// Grows a random subtree of exactly `target_height` levels.
    pub fn grow_to_height<R>(
        target_height: u32,
        premature_end_probability: f64,
        catalog: &NodeCatalog,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        if target_height <= 1 {
            return Self::Leaf(catalog.random_operand(rng));
        }
        let function = catalog.random_function(rng);
        let mut state = GrowState {
            target_height,
            full_height_reached: false,
        };
        let children = grow_children(2, &mut state, premature_end_probability, catalog, rng);
        Self::Branch { function, children }
    }

    #[must_use]
    pub fn value(&self) -> NodeValue {
        match self {
            Self::Leaf(operand) => (*operand).into(),
            Self::Branch { function, .. } => NodeValue::Function(*function),
        }
    }

    #[must_use]
    pub fn children(&self) -> Option<&[Self; 2]> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch { children, .. } => Some(children),
        }
    }

    /// Number of levels in this subtree; a leaf has height `1`.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch { children, .. } => 1 + children[0].height().max(children[1].height()),
        }
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch { children, .. } => 1 + children[0].size() + children[1].size(),
        }
    }

    /// Post-order evaluation: both operands first (left, then right), then the
    /// operator.
    pub fn evaluate<R>(&self, ctx: &EvalContext<'_>, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Leaf(Operand::Terminal(kind)) => ctx.terminal(*kind),
            Self::Leaf(Operand::Constant(value)) => *value,
            Self::Branch { function, children } => {
                let lhs = children[0].evaluate(ctx, rng);
                let rhs = children[1].evaluate(ctx, rng);
                function.apply(lhs, rhs, rng)
            }
        }
    }
}

fn grow_children<R>(
    depth: u32,
    state: &mut GrowState,
    premature_end_probability: f64,
    catalog: &NodeCatalog,
    rng: &mut R,
) -> Box<[Node; 2]>
where
    R: Rng + ?Sized,
{
    let leaves = |rng: &mut R| {
        Box::new([
            Node::Leaf(catalog.random_operand(rng)),
            Node::Leaf(catalog.random_operand(rng)),
        ])
    };

    if depth >= state.target_height {
        state.full_height_reached = true;
        return leaves(rng);
    }
    if state.full_height_reached && rng.random::<f64>() < premature_end_probability {
        return leaves(rng);
    }

    let functions = [catalog.random_function(rng), catalog.random_function(rng)];
    let left = grow_children(depth + 1, state, premature_end_probability, catalog, rng);
    let right = grow_children(depth + 1, state, premature_end_probability, catalog, rng);
    Box::new([
        Node::Branch {
            function: functions[0],
            children: left,
        },
        Node::Branch {
            function: functions[1],
            children: right,
        },
    ])
}

/// Step from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left = 0,
    Right = 1,
}

/// A state evaluator genome.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    root: Node,
}

impl ExpressionTree {
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Grows a fresh random tree.
    pub fn random<R>(params: &GrowParams, catalog: &NodeCatalog, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(Node::grow(params, catalog, rng))
    }

    /// Rebuilds a tree from its breadth-first value list.
    ///
    /// Every function value must be followed (in breadth-first order) by its
    /// two children, and every listed node must be reachable from the root.
    pub fn from_node_values(values: &[NodeValue]) -> Result<Self, TreeError> {
        if values.is_empty() {
            return Err(TreeError::Empty);
        }

        let mut children = vec![None; values.len()];
        let mut next = 1;
        for (index, value) in values.iter().enumerate() {
            if index >= next && index > 0 {
                return Err(TreeError::Unreachable { index });
            }
            if value.is_function() {
                if next + 2 > values.len() {
                    return Err(TreeError::MissingChildren { parent: index });
                }
                children[index] = Some((next, next + 1));
                next += 2;
            }
        }

        Ok(Self::new(build_node(0, values, &children)))
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.root.height()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// All nodes in breadth-first order.
    #[must_use]
    pub fn node_list(&self) -> Vec<&Node> {
        let mut nodes = Vec::with_capacity(self.size());
        let mut queue = VecDeque::from([&self.root]);
        while let Some(node) = queue.pop_front() {
            nodes.push(node);
            if let Some(children) = node.children() {
                queue.extend(children);
            }
        }
        nodes
    }

    /// Node values in breadth-first order.
    #[must_use]
    pub fn node_values(&self) -> Vec<NodeValue> {
        self.node_list().into_iter().map(Node::value).collect()
    }

    /// Depth of every node in breadth-first order (root depth is `1`).
    #[must_use]
    pub fn node_depths(&self) -> Vec<usize> {
        let mut depths = Vec::with_capacity(self.size());
        let mut queue = VecDeque::from([(&self.root, 1)]);
        while let Some((node, depth)) = queue.pop_front() {
            depths.push(depth);
            if let Some(children) = node.children() {
                queue.extend(children.iter().map(|c| (c, depth + 1)));
            }
        }
        depths
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.node_list().get(index).copied()
    }

    /// Deep copy of the subtree rooted at breadth-first `index`.
    #[must_use]
    pub fn subtree(&self, index: usize) -> Option<Node> {
        self.node(index).cloned()
    }

    /// Replaces the subtree at breadth-first `index`, returning the old one.
    ///
    /// Returns `None` (leaving the tree unchanged) if `index` is out of range.
    pub fn replace_subtree(&mut self, index: usize, subtree: Node) -> Option<Node> {
        let slot = self.node_mut(index)?;
        Some(std::mem::replace(slot, subtree))
    }

    /// Replaces the subtree at breadth-first `index` with a freshly grown one.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn grow<R>(
        &mut self,
        index: usize,
        params: &GrowParams,
        catalog: &NodeCatalog,
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        let Some(slot) = self.node_mut(index) else {
            return false;
        };
        *slot = Node::grow(params, catalog, rng);
        true
    }

    pub fn evaluate<R>(&self, ctx: &EvalContext<'_>, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        self.root.evaluate(ctx, rng)
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        let path = self.path_to(index)?;
        let mut node = &mut self.root;
        for side in path {
            let Node::Branch { children, .. } = node else {
                unreachable!("paths only pass through branches");
            };
            node = &mut children[side as usize];
        }
        Some(node)
    }

    /// Child steps from the root to breadth-first `index`.
    fn path_to(&self, index: usize) -> Option<Vec<Side>> {
        let mut queue = VecDeque::from([(&self.root, Vec::new())]);
        let mut current = 0;
        while let Some((node, path)) = queue.pop_front() {
            if current == index {
                return Some(path);
            }
            current += 1;
            if let Some([left, right]) = node.children() {
                let mut left_path = path.clone();
                left_path.push(Side::Left);
                let mut right_path = path;
                right_path.push(Side::Right);
                queue.push_back((left, left_path));
                queue.push_back((right, right_path));
            }
        }
        None
    }
}

fn build_node(index: usize, values: &[NodeValue], children: &[Option<(usize, usize)>]) -> Node {
    match (values[index], children[index]) {
        (NodeValue::Function(function), Some((left, right))) => Node::Branch {
            function,
            children: Box::new([
                build_node(left, values, children),
                build_node(right, values, children),
            ]),
        },
        (NodeValue::Terminal(kind), _) => Node::Leaf(Operand::Terminal(kind)),
        (NodeValue::Constant(value), _) => Node::Leaf(Operand::Constant(value)),
        (NodeValue::Function(_), None) => unreachable!("every listed function has children"),
    }
}

/// Fully parenthesized infix rendering, e.g. `( pill distance - 2.5 )`.
impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(Operand::Terminal(kind)) => f.write_str(kind.label()),
            Self::Leaf(Operand::Constant(value)) => write!(f, "{value}"),
            Self::Branch { function, children } => write!(
                f,
                "( {} {} {} )",
                children[0],
                function.symbol(),
                children[1]
            ),
        }
    }
}
