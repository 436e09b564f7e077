//! Logical set operators over blocks (`unless`).
//!
//! Every logical operator shares the same descriptor shape: two upstream
//! nodes, a matching rule, and the constructor that binds it to a controller.

use std::fmt;
use std::sync::Arc;

use stepql_core::prelude::{NodeId, VectorMatching};

use crate::registry::ProcessorFn;
use crate::traits::{Controller, Processor};

pub mod unless;

pub use unless::{new_unless_node, new_unless_op, UnlessNode, UNLESS_TYPE};

/// Immutable description of a binary logical operator.
#[derive(Clone)]
pub struct BaseOp {
    pub operator_type: &'static str,
    pub l_node: NodeId,
    pub r_node: NodeId,
    pub matching: VectorMatching,
    pub processor_fn: ProcessorFn,
}

impl BaseOp {
    /// Bind this operator to a controller.
    pub fn processor(&self, controller: Arc<dyn Controller>) -> Box<dyn Processor> {
        (self.processor_fn)(self.clone(), controller)
    }
}

impl fmt::Debug for BaseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseOp")
            .field("operator_type", &self.operator_type)
            .field("l_node", &self.l_node)
            .field("r_node", &self.r_node)
            .field("matching", &self.matching)
            .finish_non_exhaustive()
    }
}
