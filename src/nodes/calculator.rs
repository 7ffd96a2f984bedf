//! Calculator node types
//!
//! A small arithmetic node set: an input holding a number, an output passing
//! its value through, and the four binary operations.

use serde_json::{json, Value};

use super::factory::{NodeBehavior, NodeRegistry, NodeTemplate};
use super::layout::DefaultSocketLayout;
use super::node::{Node, SocketSpec};
use super::socket::SocketPosition;
use crate::error::Result;

pub const OP_NODE_INPUT: u32 = 1;
pub const OP_NODE_OUTPUT: u32 = 2;
pub const OP_NODE_ADD: u32 = 3;
pub const OP_NODE_SUB: u32 = 4;
pub const OP_NODE_MUL: u32 = 5;
pub const OP_NODE_DIV: u32 = 6;

/// Socket type carried by every calculator connection
const NUMBER_SOCKET: u32 = 1;

/// Reads the number stored in an input node's `value` content field
#[derive(Debug, Clone, Copy)]
pub struct InputBehavior;

impl NodeBehavior for InputBehavior {
    fn evaluate(&self, node: &Node, _inputs: &[f64]) -> std::result::Result<Vec<f64>, String> {
        let value = match node.content.get("value") {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        value
            .map(|v| vec![v])
            .ok_or_else(|| format!("'{}' has no numeric value", node.title))
    }
}

/// Forwards its single input
#[derive(Debug, Clone, Copy)]
pub struct OutputBehavior;

impl NodeBehavior for OutputBehavior {
    fn evaluate(&self, _node: &Node, inputs: &[f64]) -> std::result::Result<Vec<f64>, String> {
        inputs
            .first()
            .map(|v| vec![*v])
            .ok_or_else(|| "output node has no input".to_string())
    }
}

/// Binary arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    fn apply(self, a: f64, b: f64) -> std::result::Result<f64, String> {
        match self {
            BinaryOp::Add => Ok(a + b),
            BinaryOp::Subtract => Ok(a - b),
            BinaryOp::Multiply => Ok(a * b),
            BinaryOp::Divide if b == 0.0 => Err("division by zero".to_string()),
            BinaryOp::Divide => Ok(a / b),
        }
    }
}

impl NodeBehavior for BinaryOp {
    fn evaluate(&self, _node: &Node, inputs: &[f64]) -> std::result::Result<Vec<f64>, String> {
        match inputs {
            [a, b, ..] => self.apply(*a, *b).map(|v| vec![v]),
            _ => Err(format!("{:?} needs two inputs, got {}", self, inputs.len())),
        }
    }
}

fn calc_layout() -> DefaultSocketLayout {
    DefaultSocketLayout {
        edge_roundness: 6.0,
        edge_padding: 0.0,
        title_vertical_padding: 10.0,
        ..DefaultSocketLayout::with_size(160.0, 74.0)
    }
}

fn calc_input() -> SocketSpec {
    SocketSpec::input(NUMBER_SOCKET).with_position(SocketPosition::LeftCenter)
}

fn calc_output() -> SocketSpec {
    SocketSpec::output(NUMBER_SOCKET).with_position(SocketPosition::RightCenter)
}

fn binary_template(title: &str, op: BinaryOp) -> NodeTemplate {
    NodeTemplate::new(title)
        .with_inputs(vec![calc_input(), calc_input()])
        .with_outputs(vec![calc_output()])
        .with_layout(calc_layout())
        .with_behavior(op)
}

/// Templates for every calculator op code
pub fn calculator_templates() -> Vec<(u32, NodeTemplate)> {
    vec![
        (
            OP_NODE_INPUT,
            NodeTemplate::new("Input")
                .with_outputs(vec![calc_output()])
                .with_layout(calc_layout())
                .with_content(json!({ "value": 1 }))
                .with_behavior(InputBehavior),
        ),
        (
            OP_NODE_OUTPUT,
            NodeTemplate::new("Output")
                .with_inputs(vec![calc_input()])
                .with_layout(calc_layout())
                .with_behavior(OutputBehavior),
        ),
        (OP_NODE_ADD, binary_template("Add", BinaryOp::Add)),
        (OP_NODE_SUB, binary_template("Subtract", BinaryOp::Subtract)),
        (OP_NODE_MUL, binary_template("Multiply", BinaryOp::Multiply)),
        (OP_NODE_DIV, binary_template("Divide", BinaryOp::Divide)),
    ]
}

/// Registers the calculator node types into an existing registry
pub fn register_calculator_nodes(registry: &mut NodeRegistry) -> Result<()> {
    for (op_code, template) in calculator_templates() {
        registry.register(op_code, template)?;
    }
    Ok(())
}
