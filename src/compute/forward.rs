//! Forward evaluation: weighted input sums and activations.

use crate::error::{Error, Result};
use crate::network::Network;

use super::Grid;

/// Result of evaluating one neuron forward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForwardResult {
    /// The weighted input sum Σ wᵢ · φ(sourceᵢ).
    pub net: f64,
    /// The activation φ(net).
    pub phi_net: f64,
}

/// Demand-driven forward sweep over a network.
///
/// Values are memoised per neuron in the grid; a cycle reaching a neuron
/// that is currently being evaluated reads the all-zero default, which for
/// this result type is equivalent to breaking the feedback edge for one
/// step.
#[derive(Debug)]
pub struct ForwardPass<'a> {
    network: &'a Network,
    grid: &'a mut Grid<ForwardResult>,
}

impl<'a> ForwardPass<'a> {
    /// Wires a pass over the network and its memoisation grid. The grid must
    /// be sized to the network's slot count.
    pub fn new(network: &'a Network, grid: &'a mut Grid<ForwardResult>) -> Self {
        Self { network, grid }
    }

    /// Evaluates the whole network on one input vector.
    ///
    /// The grid is reset (hard pins survive), each INPUT neuron's cell is
    /// seeded with `(0, input_i)`, and the OUTPUT neurons are forced in
    /// order. Returns their activations.
    pub fn run(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.grid.reset();

        let network = self.network;
        let inputs = network.inputs();
        if input.len() != inputs.len() {
            return Err(Error::Shape { expected: inputs.len(), got: input.len() });
        }
        for (&index, &value) in inputs.iter().zip(input) {
            self.grid.put(index, ForwardResult { net: 0.0, phi_net: value })?;
        }

        let outputs = network.outputs();
        let mut result = Vec::with_capacity(outputs.len());
        for &index in outputs {
            result.push(self.fx(index)?.phi_net);
        }
        Ok(result)
    }

    /// Memoised forward value of one neuron.
    pub fn fx(&mut self, index: usize) -> Result<ForwardResult> {
        if let Some(cached) = self.grid.cached(index)? {
            return Ok(cached);
        }
        self.grid.begin(index)?;

        let network = self.network;
        let neuron = network.neuron(index)?;
        let mut net = 0.0;
        for dendrite in neuron.dendrites() {
            net += dendrite.weight * self.fx(dendrite.source)?.phi_net;
        }
        let value = ForwardResult { net, phi_net: neuron.activation().apply(net) };

        self.grid.complete(index, value)?;
        Ok(value)
    }

    /// Hard-fixes a neuron's activation to a constant `(0, phi)`; used for
    /// frozen neurons such as a bias source.
    pub fn pin(&mut self, index: usize, phi: f64) -> Result<()> {
        self.grid.pin(index, ForwardResult { net: 0.0, phi_net: phi })
    }

    /// The network this pass evaluates.
    pub fn network(&self) -> &'a Network {
        self.network
    }
}
