use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use gpac_evaluator::{node::NodeValue, tree::ExpressionTree};
use gpac_training::driver::RunOutcome;
use serde::{Deserialize, Serialize};

use crate::util;

/// Best state evaluator of a training session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Solution {
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub run: u32,
    pub fitness: f64,
    /// Tree nodes in breadth-first order.
    pub nodes: Vec<NodeValue>,
    /// Infix rendering of `nodes`.
    pub equation: String,
}

impl Solution {
    pub fn from_outcome(outcome: &RunOutcome, seed: u64, trained_at: DateTime<Utc>) -> Self {
        let controller = outcome.best.pacman_controller();
        Self {
            trained_at,
            seed,
            run: outcome.run,
            fitness: outcome.best_fitness,
            nodes: controller.state_evaluator().node_values(),
            equation: controller.visualize(),
        }
    }

    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("solution", path)
    }

    pub fn to_tree(&self) -> anyhow::Result<ExpressionTree> {
        ExpressionTree::from_node_values(&self.nodes).context("Solution holds a malformed tree")
    }
}

#[cfg(test)]
mod tests {
    use gpac_evaluator::node::{FunctionKind, TerminalKind};

    use super::*;

    #[test]
    fn test_solution_json_rebuilds_tree() {
        let json = r#"{
            "trained_at": "2024-05-01T12:00:00Z",
            "seed": 7,
            "run": 2,
            "fitness": 61.0,
            "nodes": ["subtract", "ghost-distance", "divide", "pill-distance", 2.5],
            "equation": "( ghost distance - ( pill distance / 2.5 ) )"
        }"#;
        let solution: Solution = serde_json::from_str(json).unwrap();
        assert_eq!(solution.nodes[0], NodeValue::Function(FunctionKind::Subtract));
        assert_eq!(
            solution.nodes[1],
            NodeValue::Terminal(TerminalKind::GhostDistance)
        );

        let tree = solution.to_tree().unwrap();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.to_string(), solution.equation);
        assert_eq!(tree.node_values(), solution.nodes);
    }

    #[test]
    fn test_malformed_solution_is_rejected() {
        let solution = Solution {
            trained_at: Utc::now(),
            seed: 0,
            run: 1,
            fitness: 0.0,
            nodes: vec![NodeValue::Function(FunctionKind::Add), NodeValue::Constant(1.0)],
            equation: String::new(),
        };
        let err = solution.to_tree().unwrap_err();
        assert!(format!("{err:#}").contains("malformed"));
    }
}
