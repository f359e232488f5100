//! Backward evaluation: error signals propagated against the edges.

use crate::error::{Error, Result};
use crate::network::Network;
use crate::neuron::Role;

use super::forward::ForwardPass;
use super::Grid;

/// Result of evaluating one neuron backward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackwardResult {
    /// The backpropagated error signal δ.
    pub delta: f64,
}

/// Reverse adjacency of a network: for each neuron, the edges leaving it.
///
/// Each entry is a `(consumer index, dendrite position)` pair; the weight is
/// read back through the consumer's dendrite list, so the map stays valid as
/// long as the topology is structurally unchanged.
#[derive(Debug, Clone)]
pub struct ForwardMap {
    edges: Vec<Vec<(usize, usize)>>,
}

impl ForwardMap {
    /// Walks every dendrite of the network once and records it under its
    /// source.
    pub fn build(network: &Network) -> Self {
        let mut edges = vec![Vec::new(); network.slot_count()];
        for neuron in network.iter() {
            for (position, dendrite) in neuron.dendrites().iter().enumerate() {
                edges[dendrite.source].push((neuron.index(), position));
            }
        }
        Self { edges }
    }

    /// The `(consumer, dendrite position)` pairs of every edge leaving
    /// `index`.
    pub fn consumers(&self, index: usize) -> &[(usize, usize)] {
        self.edges.get(index).map_or(&[], Vec::as_slice)
    }
}

/// Demand-driven backward sweep over a network.
///
/// Deltas are memoised per neuron; the same soft-default mechanism that
/// terminates forward evaluation on cycles applies here, with the all-zero
/// default again acting as a one-step break of the feedback.
#[derive(Debug)]
pub struct BackwardPass<'a> {
    network: &'a Network,
    grid: &'a mut Grid<BackwardResult>,
    fmap: &'a ForwardMap,
}

impl<'a> BackwardPass<'a> {
    /// Wires a pass over the network, its memoisation grid and a prebuilt
    /// reverse adjacency map.
    pub fn new(
        network: &'a Network,
        grid: &'a mut Grid<BackwardResult>,
        fmap: &'a ForwardMap,
    ) -> Self {
        Self { network, grid, fmap }
    }

    /// Propagates an output error vector back through the network.
    ///
    /// The grid is reset (hard pins survive), each OUTPUT neuron's delta is
    /// seeded with `error_i × φ′(net)`, and the sweep is forced from every
    /// INPUT neuron. Deltas of neurons unreachable from the inputs stay
    /// unfixed. The forward pass is consulted for `net` values and forces
    /// them lazily where missing.
    pub fn run(&mut self, error: &[f64], forward: &mut ForwardPass<'_>) -> Result<()> {
        self.grid.reset();

        let network = self.network;
        let outputs = network.outputs();
        if error.len() != outputs.len() {
            return Err(Error::Shape { expected: outputs.len(), got: error.len() });
        }
        for (&index, &err) in outputs.iter().zip(error) {
            let net = forward.fx(index)?.net;
            let derivative = network.neuron(index)?.activation().derivative(net);
            self.grid.put(index, BackwardResult { delta: err * derivative })?;
        }

        let inputs = network.inputs();
        for &index in inputs {
            self.fx(index, forward)?;
        }
        Ok(())
    }

    /// Memoised delta of one neuron.
    ///
    /// An OUTPUT neuron must have been seeded by [`BackwardPass::run`];
    /// reaching one through evaluation is an invariant violation.
    pub fn fx(&mut self, index: usize, forward: &mut ForwardPass<'_>) -> Result<BackwardResult> {
        if let Some(cached) = self.grid.cached(index)? {
            return Ok(cached);
        }

        let network = self.network;
        let neuron = network.neuron(index)?;
        if neuron.role() == Role::Output {
            return Err(Error::Invariant("output delta must be seeded before the sweep"));
        }
        self.grid.begin(index)?;

        let fmap = self.fmap;
        let mut sum = 0.0;
        for &(consumer, position) in fmap.consumers(index) {
            let weight = network
                .neuron(consumer)?
                .dendrites()
                .get(position)
                .ok_or(Error::Invariant("reverse adjacency out of sync with topology"))?
                .weight;
            sum += self.fx(consumer, forward)?.delta * weight;
        }
        let net = forward.fx(index)?.net;
        let value = BackwardResult { delta: sum * neuron.activation().derivative(net) };

        self.grid.complete(index, value)?;
        Ok(value)
    }
}
