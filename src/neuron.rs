//! Representation of neurons within a [`Network`](crate::Network).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Activation;
use crate::error::Error;

/// Role a neuron plays at the network boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Externally fed: its activation is pinned by the caller.
    Input,
    /// Hidden neuron.
    #[default]
    Inner,
    /// Externally read: its activation forms the network output.
    Output,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Input => write!(f, "INPUT"),
            Role::Inner => write!(f, "INNER"),
            Role::Output => write!(f, "OUTPUT"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INPUT" => Ok(Role::Input),
            "INNER" => Ok(Role::Inner),
            "OUTPUT" => Ok(Role::Output),
            _ => Err(Error::Invariant("unknown neuron role")),
        }
    }
}

/// An incoming weighted edge into a neuron.
///
/// A dendrite carries the activation of a source neuron to its consumer,
/// multiplying it by a weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dendrite {
    /// Index of the source neuron.
    pub source: usize,
    /// Weight applied during propagation.
    pub weight: f64,
}

/// A single neuron: a role, an activation function and a list of incoming
/// weighted edges.
///
/// Neurons are owned by a [`Network`](crate::Network) and identified by the
/// stable index of the slot holding them. All cross-references — dendrite
/// sources included — use indices, never addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    index: usize,
    role: Role,
    activation: Activation,
    dendrites: Vec<Dendrite>,
}

impl Neuron {
    pub(crate) fn new(index: usize, role: Role, activation: Activation) -> Self {
        Self {
            index,
            role,
            activation,
            dendrites: Vec::new(),
        }
    }

    /// Index of the slot holding this neuron.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Role of this neuron at the network boundary.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Activation function applied to the weighted input sum.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Incoming edges, in insertion order.
    pub fn dendrites(&self) -> &[Dendrite] {
        &self.dendrites
    }

    /// Mutable view of the incoming edges.
    pub fn dendrites_mut(&mut self) -> &mut [Dendrite] {
        &mut self.dendrites
    }

    /// Adds a dendrite from `source`, or updates its weight if one already
    /// exists. The relative order of existing dendrites never changes.
    pub fn set_dendrite(&mut self, source: usize, weight: f64) {
        match self.dendrites.iter_mut().find(|d| d.source == source) {
            Some(dendrite) => dendrite.weight = weight,
            None => self.dendrites.push(Dendrite { source, weight }),
        }
    }

    /// Removes the dendrite from `source`, if any. Returns whether one was
    /// removed.
    pub fn unset_dendrite(&mut self, source: usize) -> bool {
        let before = self.dendrites.len();
        self.dendrites.retain(|d| d.source != source);
        self.dendrites.len() != before
    }

    /// Returns the dendrite from `source`, if any.
    pub fn dendrite(&self, source: usize) -> Option<&Dendrite> {
        self.dendrites.iter().find(|d| d.source == source)
    }

    /// Drops every dendrite whose weight is exactly zero.
    pub fn minimise_dendrites(&mut self) {
        self.dendrites.retain(|d| d.weight != 0.0);
    }

    /// Rewrites the stored index and every dendrite source through the
    /// old-to-new index map produced by a compaction.
    pub(crate) fn remap(&mut self, map: &[usize]) {
        self.index = map[self.index];
        for dendrite in &mut self.dendrites {
            dendrite.source = map[dendrite.source];
        }
    }
}
