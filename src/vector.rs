use std::fmt::{self, Display, Formatter};
use std::ops::{Index, IndexMut, Neg};

use crate::error::{Error, Result};
use crate::variable::Var;

/// Fixed-length sequence of independently addressable [`Var`] slots.
///
/// Arithmetic is elementwise: every slot of the result is built from the
/// matching slot(s) of the operands. Vector-vector operators return a
/// [`Result`] since the lengths must agree; scalar broadcasts cannot fail.
#[derive(Debug, Clone, Default)]
pub struct Vector {
    data: Vec<Var>,
}

impl Vector {
    /// A vector of `len` independent leaves, all at 0.
    pub fn new(len: usize) -> Self {
        Self {
            data: (0..len).map(|_| Var::default()).collect(),
        }
    }

    /// One independent leaf per value, in order.
    pub fn from_values(values: &[f64]) -> Self {
        values.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Var> {
        self.data.iter()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    /// Forward value of the element at `index`.
    pub fn get(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.data[index].value())
    }

    /// Rebinds the slot at `index` to a fresh independent leaf.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        self.set_var(index, Var::new(value))
    }

    pub fn var(&self, index: usize) -> Result<&Var> {
        self.check_index(index)?;
        Ok(&self.data[index])
    }

    pub fn set_var(&mut self, index: usize, var: Var) -> Result<()> {
        self.check_index(index)?;
        self.data[index] = var;
        Ok(())
    }

    /// Forward values of every element, in index order.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(Var::value).collect()
    }

    /// Accumulated gradient of every element; 0 for slots that are not leaves.
    pub fn grad(&self) -> Vec<f64> {
        self.data.iter().map(Var::grad).collect()
    }

    /// Seeds every element with 1.0, one propagation per element.
    ///
    /// Leaves shared between elements receive the sum of each element's
    /// contribution.
    pub fn backward(&self) {
        log::debug!("backward over {} elements", self.len());
        for var in &self.data {
            var.backward();
        }
    }

    pub fn zero_grad(&self) {
        for var in &self.data {
            var.zero_grad();
        }
    }

    fn map(&self, f: impl Fn(&Var) -> Var) -> Vector {
        self.data.iter().map(f).collect()
    }

    fn zip_with(&self, rhs: &Vector, f: impl Fn(&Var, &Var) -> Var) -> Result<Vector> {
        if self.len() != rhs.len() {
            log::debug!(
                "rejecting elementwise op on lengths {} and {}",
                self.len(),
                rhs.len()
            );
            return Err(Error::SizeMismatch {
                left: self.len(),
                right: rhs.len(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(l, r)| f(l, r))
            .collect())
    }

    pub fn try_add(&self, rhs: &Vector) -> Result<Vector> {
        self.zip_with(rhs, |l, r| l + r)
    }

    pub fn try_sub(&self, rhs: &Vector) -> Result<Vector> {
        self.zip_with(rhs, |l, r| l - r)
    }

    pub fn try_mul(&self, rhs: &Vector) -> Result<Vector> {
        self.zip_with(rhs, |l, r| l * r)
    }

    pub fn try_div(&self, rhs: &Vector) -> Result<Vector> {
        self.zip_with(rhs, |l, r| l / r)
    }

    pub fn sin(&self) -> Vector {
        self.map(Var::sin)
    }

    pub fn cos(&self) -> Vector {
        self.map(Var::cos)
    }

    pub fn tan(&self) -> Vector {
        self.map(Var::tan)
    }

    pub fn exp(&self) -> Vector {
        self.map(Var::exp)
    }

    pub fn log(&self) -> Vector {
        self.map(Var::log)
    }

    pub fn sqrt(&self) -> Vector {
        self.map(Var::sqrt)
    }

    pub fn abs(&self) -> Vector {
        self.map(Var::abs)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        values.into_iter().collect()
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        iter.into_iter().map(Var::new).collect()
    }
}

impl FromIterator<Var> for Vector {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Var;
    type IntoIter = std::slice::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "[ ")?;
        for var in &self.data {
            write!(f, "{:.6} ", var.value())?;
        }
        write!(f, "]")
    }
}

// panics on out-of-range access, like slice indexing; use `var`/`set_var` for a Result
impl Index<usize> for Vector {
    type Output = Var;

    fn index(&self, index: usize) -> &Var {
        &self.data[index]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, index: usize) -> &mut Var {
        &mut self.data[index]
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.map(|v| -v)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        -&self
    }
}

macro_rules! impl_vector_op {
    ($trait:ident, $method:ident, $try_method:ident) => {
        impl ::std::ops::$trait<&Vector> for &Vector {
            type Output = Result<Vector>;

            fn $method(self, rhs: &Vector) -> Result<Vector> {
                self.$try_method(rhs)
            }
        }

        impl ::std::ops::$trait<Vector> for Vector {
            type Output = Result<Vector>;

            fn $method(self, rhs: Vector) -> Result<Vector> {
                self.$try_method(&rhs)
            }
        }

        impl ::std::ops::$trait<&Vector> for Vector {
            type Output = Result<Vector>;

            fn $method(self, rhs: &Vector) -> Result<Vector> {
                self.$try_method(rhs)
            }
        }

        impl ::std::ops::$trait<Vector> for &Vector {
            type Output = Result<Vector>;

            fn $method(self, rhs: Vector) -> Result<Vector> {
                self.$try_method(&rhs)
            }
        }

        impl ::std::ops::$trait<f64> for &Vector {
            type Output = Vector;

            fn $method(self, rhs: f64) -> Vector {
                self.map(|v| ::std::ops::$trait::$method(v, rhs))
            }
        }

        impl ::std::ops::$trait<f64> for Vector {
            type Output = Vector;

            fn $method(self, rhs: f64) -> Vector {
                ::std::ops::$trait::$method(&self, rhs)
            }
        }

        impl ::std::ops::$trait<&Vector> for f64 {
            type Output = Vector;

            fn $method(self, rhs: &Vector) -> Vector {
                rhs.map(|v| ::std::ops::$trait::$method(self, v))
            }
        }

        impl ::std::ops::$trait<Vector> for f64 {
            type Output = Vector;

            fn $method(self, rhs: Vector) -> Vector {
                ::std::ops::$trait::$method(self, &rhs)
            }
        }
    };
}

impl_vector_op!(Add, add, try_add);
impl_vector_op!(Sub, sub, try_sub);
impl_vector_op!(Mul, mul, try_mul);
impl_vector_op!(Div, div, try_div);
