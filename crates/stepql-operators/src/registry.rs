//! Operator registry: maps an operator type to its processor constructor.
//!
//! The hosting graph looks processors up here by `BaseOp::operator_type`, so
//! sibling operators plug in by registering a constructor rather than through
//! a shared base type.

use std::collections::HashMap;
use std::sync::Arc;

use crate::logical::{self, BaseOp};
use crate::traits::{Controller, Processor};

/// Binds an operator descriptor to a controller.
pub type ProcessorFn = fn(BaseOp, Arc<dyn Controller>) -> Box<dyn Processor>;

#[derive(Clone)]
pub struct Registry {
    ctors: HashMap<String, ProcessorFn>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with every built-in operator.
    pub fn new() -> Self {
        let mut r = Self::empty();
        r.register(logical::UNLESS_TYPE, logical::new_unless_node);
        r
    }

    pub fn empty() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    /// Add or replace the constructor for `op_type`.
    pub fn register(&mut self, op_type: impl Into<String>, ctor: ProcessorFn) {
        self.ctors.insert(op_type.into(), ctor);
    }

    pub fn get(&self, op_type: &str) -> Option<ProcessorFn> {
        self.ctors.get(op_type).copied()
    }

    pub fn contains(&self, op_type: &str) -> bool {
        self.ctors.contains_key(op_type)
    }

    /// Instantiate the processor registered for `op.operator_type`.
    pub fn instantiate(
        &self,
        op: &BaseOp,
        controller: Arc<dyn Controller>,
    ) -> Option<Box<dyn Processor>> {
        self.get(op.operator_type)
            .map(|ctor| ctor(op.clone(), controller))
    }
}
