//! Engine: bind operator descriptors to realized input blocks and run them.
//!
//! The engine owns the controller and the operator registry. Processors are
//! instantiated per call; nothing is cached between runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use stepql_core::prelude::{Block, EngineConfig, NodeId};
use stepql_operators::{BaseOp, Controller, OpError, Registry};

use crate::controller::ColumnController;
use crate::metrics::emit_span;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no realized block for input {0}")]
    MissingInput(NodeId),
    #[error("unknown operator type: {0}")]
    UnknownOperator(String),
    #[error("operator exec: {0}")]
    Operator(#[from] OpError),
}

pub struct Engine {
    controller: Arc<ColumnController>,
    registry: Registry,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self::with_registry(cfg, Registry::new())
    }

    pub fn with_registry(cfg: EngineConfig, registry: Registry) -> Self {
        Self {
            controller: Arc::new(ColumnController::new(cfg)),
            registry,
        }
    }

    /// Engine configured from `STEPQL_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    /// Evaluate `op` against the blocks produced by its two input nodes.
    pub fn execute(
        &self,
        op: &BaseOp,
        inputs: &HashMap<NodeId, Arc<dyn Block>>,
    ) -> Result<Arc<dyn Block>, ExecError> {
        let lhs = inputs
            .get(&op.l_node)
            .ok_or(ExecError::MissingInput(op.l_node))?;
        let rhs = inputs
            .get(&op.r_node)
            .ok_or(ExecError::MissingInput(op.r_node))?;

        let controller: Arc<dyn Controller> = self.controller.clone();
        let processor = self
            .registry
            .instantiate(op, controller)
            .ok_or_else(|| ExecError::UnknownOperator(op.operator_type.to_string()))?;

        let started = Instant::now();
        let result = processor.process(lhs.as_ref(), rhs.as_ref());
        emit_span(
            "process",
            &[
                ("op", op.operator_type.to_string()),
                ("lhs", op.l_node.to_string()),
                ("rhs", op.r_node.to_string()),
                ("ok", result.is_ok().to_string()),
                ("elapsed_us", started.elapsed().as_micros().to_string()),
            ],
        );

        result.map_err(ExecError::from)
    }
}
