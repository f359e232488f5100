//! Activation functions available for neurons.
//!
//! Each variant provides a mathematical transformation applied to a neuron's
//! weighted input sum, together with its first derivative as required by
//! backpropagation. More functions can be added in the future by extending
//! this enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// Returns the input unchanged.
    #[default]
    Identity,
    /// Generalised logistic curve `L / (1 + e^{-k(x - x0)})`.
    Logistic {
        /// Midpoint of the curve.
        x0: f64,
        /// Supremum of the curve.
        l: f64,
        /// Steepness of the curve.
        k: f64,
    },
    /// Hyperbolic tangent function.
    Tanh,
    /// Rectified Linear Unit: `max(0, x)`.
    ReLU,
}

impl Activation {
    /// The standard logistic sigmoid: midpoint 0, supremum 1, steepness 1.
    pub fn logistic() -> Self {
        Self::Logistic { x0: 0.0, l: 1.0, k: 1.0 }
    }

    /// Applies the activation function to the provided value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Logistic { x0, l, k } => l / (1.0 + (-k * (x - x0)).exp()),
            Activation::Tanh => x.tanh(),
            Activation::ReLU => x.max(0.0),
        }
    }

    /// Returns the derivative of the activation function at the given
    /// pre-activation argument.
    ///
    /// Backpropagation evaluates the derivative at the neuron's weighted
    /// input sum, so the argument here is the raw input, not the activated
    /// output.
    #[must_use]
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Logistic { x0, l, k } => {
                let s = 1.0 / (1.0 + (-k * (x - x0)).exp());
                l * k * s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for Activation {
    /// Renders the wire literal: `identity`, `logistic(<x0>,<L>,<k>)`,
    /// `tanh` or `relu`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Identity => write!(f, "identity"),
            Activation::Logistic { x0, l, k } => write!(f, "logistic({x0},{l},{k})"),
            Activation::Tanh => write!(f, "tanh"),
            Activation::ReLU => write!(f, "relu"),
        }
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match literal.as_str() {
            "identity" => Ok(Activation::Identity),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::ReLU),
            other => {
                let args = other
                    .strip_prefix("logistic(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or(Error::Invariant("unknown activation literal"))?;
                let mut params = args.split(',').map(f64::from_str);
                match (params.next(), params.next(), params.next(), params.next()) {
                    (Some(Ok(x0)), Some(Ok(l)), Some(Ok(k)), None) => {
                        Ok(Activation::Logistic { x0, l, k })
                    }
                    _ => Err(Error::Invariant("malformed logistic parameters")),
                }
            }
        }
    }
}
