//! Expression builder.
//!
//! Every operator or function call computes its forward value immediately and
//! allocates exactly one new node linked to its operands. A raw `f64` operand
//! is wrapped in a fresh [`NodeKind::Constant`](crate::node::NodeKind) node at
//! the point of combination.

use std::ops::Neg;

use crate::node::{BinaryOp, NodeRef, UnaryOp};
use crate::variable::Var;

/// Anything that can stand as an operand of a recorded operation.
pub(crate) trait IntoNode {
    fn into_node(self) -> NodeRef;
}

impl IntoNode for NodeRef {
    fn into_node(self) -> NodeRef {
        self
    }
}

impl IntoNode for &NodeRef {
    fn into_node(self) -> NodeRef {
        self.clone()
    }
}

impl IntoNode for Var {
    fn into_node(self) -> NodeRef {
        self.into_node_ref()
    }
}

impl IntoNode for &Var {
    fn into_node(self) -> NodeRef {
        self.node().clone()
    }
}

impl IntoNode for f64 {
    fn into_node(self) -> NodeRef {
        NodeRef::constant(self)
    }
}

pub(crate) fn binary(op: BinaryOp, lhs: impl IntoNode, rhs: impl IntoNode) -> NodeRef {
    NodeRef::binary(op, lhs.into_node(), rhs.into_node())
}

pub(crate) fn unary(op: UnaryOp, operand: impl IntoNode) -> NodeRef {
    NodeRef::unary(op, operand.into_node())
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr, [$($lt:lifetime),*] $lhs:ty, $rhs:ty => $out:ty) => {
        impl<$($lt),*> ::std::ops::$trait<$rhs> for $lhs {
            type Output = $out;

            fn $method(self, rhs: $rhs) -> $out {
                <$out as ::std::convert::From<$crate::node::NodeRef>>::from(
                    $crate::ops::binary($op, self, rhs),
                )
            }
        }
    };
}

/// Implements `+ - * /` for each listed operand pair.
macro_rules! impl_arithmetic {
    ($([$($lt:lifetime),*] $lhs:ty, $rhs:ty => $out:ty;)*) => {
        $(
            $crate::ops::impl_binary_op!(Add, add, $crate::node::BinaryOp::Add, [$($lt),*] $lhs, $rhs => $out);
            $crate::ops::impl_binary_op!(Sub, sub, $crate::node::BinaryOp::Sub, [$($lt),*] $lhs, $rhs => $out);
            $crate::ops::impl_binary_op!(Mul, mul, $crate::node::BinaryOp::Mul, [$($lt),*] $lhs, $rhs => $out);
            $crate::ops::impl_binary_op!(Div, div, $crate::node::BinaryOp::Div, [$($lt),*] $lhs, $rhs => $out);
        )*
    };
}

pub(crate) use impl_arithmetic;
pub(crate) use impl_binary_op;

impl_arithmetic! {
    [] NodeRef, NodeRef => NodeRef;
    ['a] NodeRef, &'a NodeRef => NodeRef;
    ['a] &'a NodeRef, NodeRef => NodeRef;
    ['a, 'b] &'a NodeRef, &'b NodeRef => NodeRef;
    [] NodeRef, f64 => NodeRef;
    ['a] &'a NodeRef, f64 => NodeRef;
    [] f64, NodeRef => NodeRef;
    ['a] f64, &'a NodeRef => NodeRef;
}

impl Neg for NodeRef {
    type Output = NodeRef;

    fn neg(self) -> NodeRef {
        unary(UnaryOp::Neg, self)
    }
}

impl Neg for &NodeRef {
    type Output = NodeRef;

    fn neg(self) -> NodeRef {
        unary(UnaryOp::Neg, self)
    }
}

impl NodeRef {
    pub fn sin(&self) -> NodeRef {
        unary(UnaryOp::Sin, self)
    }

    pub fn cos(&self) -> NodeRef {
        unary(UnaryOp::Cos, self)
    }

    pub fn tan(&self) -> NodeRef {
        unary(UnaryOp::Tan, self)
    }

    pub fn exp(&self) -> NodeRef {
        unary(UnaryOp::Exp, self)
    }

    /// Natural logarithm.
    pub fn log(&self) -> NodeRef {
        unary(UnaryOp::Log, self)
    }

    pub fn sqrt(&self) -> NodeRef {
        unary(UnaryOp::Sqrt, self)
    }

    pub fn abs(&self) -> NodeRef {
        unary(UnaryOp::Abs, self)
    }
}
