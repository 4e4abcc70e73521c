use std::{cell::Cell, fmt, ops::Deref, rc::Rc};

/// Single-operand operations recorded on the tape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Abs,
}

/// Two-operand operations recorded on the tape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug)]
pub enum NodeKind {
    /// Untracked literal. Absorbs any gradient it receives.
    Constant,
    /// Tracked independent input with its gradient accumulator.
    Leaf { grad: Cell<f64> },
    Unary { op: UnaryOp, operand: NodeRef },
    Binary { op: BinaryOp, left: NodeRef, right: NodeRef },
}

/// One point in the computation history.
///
/// The forward value is fixed when the node is built. Operand links only ever
/// point at nodes that existed before this one, so the graph is acyclic.
#[derive(Debug)]
pub struct Node {
    value: f64,
    kind: NodeKind,
}

impl Node {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant)
    }

    /// Accumulated gradient, or `None` if this node is not a leaf.
    pub fn grad(&self) -> Option<f64> {
        match &self.kind {
            NodeKind::Leaf { grad } => Some(grad.get()),
            _ => None,
        }
    }

    /// Overwrites the accumulator of a leaf. No-op on any other node.
    pub fn set_grad(&self, value: f64) {
        if let NodeKind::Leaf { grad } = &self.kind {
            grad.set(value);
        }
    }

    pub fn zero_grad(&self) {
        self.set_grad(0.0);
    }

    /// Direct operands of this node, left to right.
    pub fn operands(&self) -> Vec<&NodeRef> {
        match &self.kind {
            NodeKind::Constant | NodeKind::Leaf { .. } => Vec::new(),
            NodeKind::Unary { operand, .. } => vec![operand],
            NodeKind::Binary { left, right, .. } => vec![left, right],
        }
    }

    /// Distributes `output_grad`, the gradient of some root with respect to
    /// this node, down to every leaf reachable from here.
    ///
    /// Shared sub-graphs are walked once per incoming edge; each walk adds its
    /// contribution into the same leaf accumulators.
    pub fn propagate(&self, output_grad: f64) {
        match &self.kind {
            NodeKind::Constant => {}
            NodeKind::Leaf { grad } => {
                log::trace!("leaf {} += {}", self.value, output_grad);
                grad.set(grad.get() + output_grad);
            }
            NodeKind::Unary { op, operand } => {
                let m = operand.value;
                let local = match op {
                    UnaryOp::Neg => -output_grad,
                    UnaryOp::Sin => m.cos() * output_grad,
                    UnaryOp::Cos => -m.sin() * output_grad,
                    UnaryOp::Tan => {
                        let sec = 1.0 / m.cos();
                        sec * sec * output_grad
                    }
                    UnaryOp::Exp => m.exp() * output_grad,
                    UnaryOp::Log => output_grad / m,
                    UnaryOp::Sqrt => output_grad / (2.0 * m.sqrt()),
                    // subgradient at zero is taken to be 0
                    UnaryOp::Abs => {
                        if m > 0.0 {
                            output_grad
                        } else if m < 0.0 {
                            -output_grad
                        } else {
                            0.0
                        }
                    }
                };
                operand.propagate(local);
            }
            NodeKind::Binary { op, left, right } => {
                let (l, r) = (left.value, right.value);
                let (dl, dr) = match op {
                    BinaryOp::Add => (output_grad, output_grad),
                    BinaryOp::Sub => (output_grad, -output_grad),
                    BinaryOp::Mul => (r * output_grad, l * output_grad),
                    BinaryOp::Div => {
                        let rec = 1.0 / r;
                        (rec * output_grad, -l * rec * rec * output_grad)
                    }
                };
                left.propagate(dl);
                right.propagate(dr);
            }
        }
    }
}

/// Shared handle to a [`Node`]. Cloning is O(1) and never copies the node.
#[derive(Clone)]
pub struct NodeRef(Rc<Node>);

impl NodeRef {
    /// A fresh tracked input with a zeroed gradient.
    pub fn leaf(value: f64) -> NodeRef {
        NodeRef(Rc::new(Node {
            value,
            kind: NodeKind::Leaf {
                grad: Cell::new(0.0),
            },
        }))
    }

    pub fn constant(value: f64) -> NodeRef {
        NodeRef(Rc::new(Node {
            value,
            kind: NodeKind::Constant,
        }))
    }

    pub(crate) fn unary(op: UnaryOp, operand: NodeRef) -> NodeRef {
        let m = operand.value;
        let value = match op {
            UnaryOp::Neg => -m,
            UnaryOp::Sin => m.sin(),
            UnaryOp::Cos => m.cos(),
            UnaryOp::Tan => m.tan(),
            UnaryOp::Exp => m.exp(),
            UnaryOp::Log => m.ln(),
            UnaryOp::Sqrt => m.sqrt(),
            UnaryOp::Abs => m.abs(),
        };
        NodeRef(Rc::new(Node {
            value,
            kind: NodeKind::Unary { op, operand },
        }))
    }

    pub(crate) fn binary(op: BinaryOp, left: NodeRef, right: NodeRef) -> NodeRef {
        let (l, r) = (left.value, right.value);
        let value = match op {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
        };
        NodeRef(Rc::new(Node {
            value,
            kind: NodeKind::Binary { op, left, right },
        }))
    }

    /// True if both handles point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for NodeRef {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl NodeKind {
    /// Detaches the operand handles, leaving a `Constant` behind.
    fn take_operands(&mut self, stack: &mut Vec<NodeRef>) {
        match std::mem::replace(self, NodeKind::Constant) {
            NodeKind::Unary { operand, .. } => stack.push(operand),
            NodeKind::Binary { left, right, .. } => {
                stack.push(left);
                stack.push(right);
            }
            NodeKind::Constant | NodeKind::Leaf { .. } => {}
        }
    }
}

// Frees uniquely owned operands without recursion.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.kind.take_operands(&mut stack);
        while let Some(NodeRef(rc)) = stack.pop() {
            if let Ok(mut node) = Rc::try_unwrap(rc) {
                node.kind.take_operands(&mut stack);
            }
        }
    }
}
