//! Node type registry
//!
//! Node types are registered explicitly against an op code at startup. A
//! template describes the sockets, layout and default content of the type and
//! optionally carries an evaluation behaviour.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::debug;
use serde_json::Value;

use super::layout::{DefaultSocketLayout, SocketLayout};
use super::node::{Node, SocketSpec};
use crate::error::{GraphError, Result};

/// Per-type evaluation logic
pub trait NodeBehavior: fmt::Debug {
    /// Computes the values of the node's outputs from the values on its inputs
    fn evaluate(&self, node: &Node, inputs: &[f64]) -> std::result::Result<Vec<f64>, String>;
}

/// Everything needed to instantiate a node of one type
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    pub title: String,
    pub inputs: Vec<SocketSpec>,
    pub outputs: Vec<SocketSpec>,
    pub layout: Rc<dyn SocketLayout>,
    pub content: Value,
    pub behavior: Option<Rc<dyn NodeBehavior>>,
}

impl NodeTemplate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            inputs: vec![],
            outputs: vec![],
            layout: Rc::new(DefaultSocketLayout::default()),
            content: Value::Null,
            behavior: None,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<SocketSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<SocketSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_layout(mut self, layout: impl SocketLayout + 'static) -> Self {
        self.layout = Rc::new(layout);
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    pub fn with_behavior(mut self, behavior: impl NodeBehavior + 'static) -> Self {
        self.behavior = Some(Rc::new(behavior));
        self
    }
}

/// Registry mapping op codes to node templates
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    templates: BTreeMap<u32, NodeTemplate>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the calculator node types
    pub fn calculator() -> Self {
        Self {
            templates: super::calculator::calculator_templates().into_iter().collect(),
        }
    }

    /// Register a template under an op code. Each op code can be used once.
    pub fn register(&mut self, op_code: u32, template: NodeTemplate) -> Result<()> {
        if self.templates.contains_key(&op_code) {
            return Err(GraphError::DuplicateOpCode(op_code));
        }
        debug!("Registered node type {} as op code {}", template.title, op_code);
        self.templates.insert(op_code, template);
        Ok(())
    }

    pub fn get(&self, op_code: u32) -> Option<&NodeTemplate> {
        self.templates.get(&op_code)
    }

    /// Like [`get`](Self::get) but reports unknown op codes as an error
    pub fn template(&self, op_code: u32) -> Result<&NodeTemplate> {
        self.get(op_code).ok_or(GraphError::UnknownOpCode(op_code))
    }

    /// Registered op codes in ascending order
    pub fn op_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.templates.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
