//! Graph-based neural networks: explicit topologies, cycle-safe memoised
//! evaluation and backpropagation training.
//!
//! A [`Network`] is a directed graph of neurons wired by weighted dendrites;
//! any topology is allowed, cycles included. Evaluation is demand driven and
//! memoised per neuron, with soft-fixed defaults breaking feedback edges so
//! that every evaluation terminates. On top of the graph sit a
//! backpropagation [`Trainer`] with on-line and batch modes, pluggable
//! learning-rate criteria, and a [`FeedForward`] factory for layered
//! networks with optional bias and lateral wiring.

pub mod activation;
pub mod backprop;
pub mod compute;
pub mod criterion;
pub mod error;
pub mod feedforward;
pub mod fixable;
pub mod format;
pub mod network;
pub mod neuron;

pub use activation::Activation;
pub use backprop::Trainer;
pub use compute::{BackwardPass, BackwardResult, ForwardMap, ForwardPass, ForwardResult, Grid};
pub use criterion::{AdaptiveCriterion, ConstantCriterion, Criterion};
pub use error::{Error, Result};
pub use feedforward::{FeedForward, Features, Function, UniformWeight};
pub use fixable::{Fixable, Fixation};
pub use network::Network;
pub use neuron::{Dendrite, Neuron, Role};
