use std::ops::Neg;

use num_traits::{NumCast, One, ToPrimitive, Zero};

use crate::node::{NodeRef, UnaryOp};
use crate::ops::{impl_arithmetic, unary};

/// User-facing handle around one node of the tape.
///
/// A `Var` built from a number is an independent input: it owns a fresh leaf
/// whose gradient accumulates during propagation. A `Var` built from an
/// existing node is dependent: it shares that node without copying or
/// re-evaluating it. Reassigning a `Var` only rebinds the handle.
#[derive(Clone, Debug)]
pub struct Var {
    node: NodeRef,
}

impl Var {
    pub fn new(value: f64) -> Var {
        Var {
            node: NodeRef::leaf(value),
        }
    }

    pub fn from_node(node: NodeRef) -> Var {
        log::trace!("wrapping node with value {}", node.value());
        Var { node }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn into_node_ref(self) -> NodeRef {
        self.node
    }

    pub fn value(&self) -> f64 {
        self.node.value()
    }

    /// True if the underlying node is a tracked leaf.
    pub fn is_independent(&self) -> bool {
        self.node.is_leaf()
    }

    /// Accumulated gradient of the underlying leaf, or 0 for any other node.
    pub fn grad(&self) -> f64 {
        self.node.grad().unwrap_or(0.0)
    }

    pub fn zero_grad(&self) {
        self.node.zero_grad();
    }

    pub fn propagate(&self, seed: f64) {
        self.node.propagate(seed);
    }

    /// Propagates a seed of 1.0 from this variable.
    pub fn backward(&self) {
        self.propagate(1.0);
    }

    pub fn sin(&self) -> Var {
        Var::from_node(unary(UnaryOp::Sin, self))
    }

    pub fn cos(&self) -> Var {
        Var::from_node(unary(UnaryOp::Cos, self))
    }

    pub fn tan(&self) -> Var {
        Var::from_node(unary(UnaryOp::Tan, self))
    }

    pub fn exp(&self) -> Var {
        Var::from_node(unary(UnaryOp::Exp, self))
    }

    /// Natural logarithm.
    pub fn log(&self) -> Var {
        Var::from_node(unary(UnaryOp::Log, self))
    }

    pub fn sqrt(&self) -> Var {
        Var::from_node(unary(UnaryOp::Sqrt, self))
    }

    pub fn abs(&self) -> Var {
        Var::from_node(unary(UnaryOp::Abs, self))
    }
}

impl Default for Var {
    fn default() -> Self {
        Var::new(0.0)
    }
}

impl From<f64> for Var {
    fn from(value: f64) -> Self {
        Var::new(value)
    }
}

impl From<NodeRef> for Var {
    fn from(node: NodeRef) -> Self {
        Var::from_node(node)
    }
}

impl From<Var> for NodeRef {
    fn from(var: Var) -> Self {
        var.node
    }
}

impl_arithmetic! {
    [] Var, Var => Var;
    ['a] Var, &'a Var => Var;
    ['a] &'a Var, Var => Var;
    ['a, 'b] &'a Var, &'b Var => Var;
    [] Var, f64 => Var;
    ['a] &'a Var, f64 => Var;
    [] f64, Var => Var;
    ['a] f64, &'a Var => Var;
    [] Var, NodeRef => Var;
    ['a] Var, &'a NodeRef => Var;
    ['a] &'a Var, NodeRef => Var;
    ['a, 'b] &'a Var, &'b NodeRef => Var;
    [] NodeRef, Var => Var;
    ['a] NodeRef, &'a Var => Var;
    ['a] &'a NodeRef, Var => Var;
    ['a, 'b] &'a NodeRef, &'b Var => Var;
}

impl Neg for Var {
    type Output = Var;

    fn neg(self) -> Var {
        Var::from_node(unary(UnaryOp::Neg, self))
    }
}

impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        Var::from_node(unary(UnaryOp::Neg, self))
    }
}

impl Zero for Var {
    fn zero() -> Self {
        Var::new(0.0)
    }

    fn is_zero(&self) -> bool {
        self.value() == 0.0
    }
}

impl One for Var {
    fn one() -> Self {
        Var::new(1.0)
    }
}

impl ToPrimitive for Var {
    fn to_i64(&self) -> Option<i64> {
        self.value().to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.value().to_u64()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.value())
    }
}

impl NumCast for Var {
    fn from<T: ToPrimitive>(n: T) -> Option<Self> {
        n.to_f64().map(Var::new)
    }
}
