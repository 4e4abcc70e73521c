//! Reverse-mode automatic differentiation over a dynamically built tape.
//!
//! Every arithmetic or transcendental operation computes its value eagerly and
//! records a node linking it to its operands. Propagating a seed gradient from
//! a result walks those links back down and accumulates partial derivatives
//! into the tracked inputs.
//!
//! ```
//! use tapegrad::Var;
//!
//! let x = Var::new(2.0);
//! let y = Var::new(3.0);
//! let z = &x * &y + x.sin();
//!
//! z.backward();
//! assert!((x.grad() - (3.0 + 2.0_f64.cos())).abs() < 1e-12);
//! assert!((y.grad() - 2.0).abs() < 1e-12);
//! ```
//!
//! Gradients accumulate across propagations; call `zero_grad` on the inputs
//! before reusing them for a fresh pass.
//!
//! [`Vector`] batches many independent scalar computations:
//!
//! ```
//! use tapegrad::Vector;
//!
//! let a = Vector::from_values(&[1.0, 2.0]);
//! let q = (&a * &a).unwrap() * 3.0;
//! q.backward();
//! assert_eq!(a.grad(), vec![6.0, 12.0]);
//! ```

pub mod error;
pub mod gradcheck;
pub mod node;
pub mod ops;
pub mod variable;
pub mod vector;

pub use error::{Error, Result};
pub use gradcheck::{finite_diff_grad, GradCheck, GradReport};
pub use node::{BinaryOp, Node, NodeKind, NodeRef, UnaryOp};
pub use variable::Var;
pub use vector::Vector;
