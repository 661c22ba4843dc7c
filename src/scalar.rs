//! Numeric element types accepted by the kernels

use std::fmt::{Debug, Display};
use std::ops::AddAssign;

use ndarray::{Array2, ArrayView2};
use num_traits::Float;
use sprs::CsMat;

/// Element type of matrices and dense blocks.
///
/// Every kernel is generic over this trait; it is implemented for `f32` and
/// `f64`. The library baseline goes through [`Scalar::library_multiply`] so the
/// `sprs` product is instantiated on concrete types.
pub trait Scalar: Float + AddAssign + Default + Send + Sync + Debug + Display + 'static {
    /// Short precision tag used in reports (`fp32`, `fp64`)
    const NAME: &'static str;

    /// Computes `a * x` with `sprs`, returning a row-major block
    fn library_multiply(a: &CsMat<Self>, x: &ArrayView2<'_, Self>) -> Array2<Self>;
}

macro_rules! impl_scalar {
    ($t:ty, $name:expr) => {
        impl Scalar for $t {
            const NAME: &'static str = $name;

            fn library_multiply(a: &CsMat<Self>, x: &ArrayView2<'_, Self>) -> Array2<Self> {
                a * x
            }
        }
    };
}

impl_scalar!(f32, "fp32");
impl_scalar!(f64, "fp64");
