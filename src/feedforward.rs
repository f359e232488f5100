//! Layered feed-forward network factory.
//!
//! [`FeedForward`] wires an input layer, any number of hidden layers and an
//! output layer into a [`Network`], optionally prepending a bias source
//! neuron pinned to constant activation 1 and optionally adding lateral
//! edges within each non-input layer. It hands out pre-wired evaluation
//! ([`FeedForward::function`]) and training ([`FeedForward::training`])
//! objects.

use std::fmt;
use std::fs::File;
use std::io;
use std::ops::BitOr;
use std::path::Path;

use log::debug;
use rand::distributions::Distribution;
use rand::Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::backprop::Trainer;
use crate::compute::{ForwardPass, ForwardResult, Grid};
use crate::error::{Error, Result};
use crate::network::Network;
use crate::{Activation, Role};

/// Structural feature flags of a feed-forward topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features(u32);

impl Features {
    /// Plain layered wiring.
    pub const NONE: Features = Features(0);
    /// A single bias source neuron, hard-pinned to activation 1, feeding
    /// every INNER and OUTPUT neuron.
    pub const BIAS: Features = Features(1);
    /// Within each non-input layer, every neuron also receives dendrites
    /// from its previously created siblings (strictly lower-triangular, so
    /// the layer stays acyclic).
    pub const LATERAL_PREV: Features = Features(2);

    const ALL: u32 = 3;

    /// Reconstructs flags from their raw bits; unknown bits are rejected.
    pub fn from_bits(bits: u32) -> Option<Features> {
        (bits & !Self::ALL == 0).then_some(Features(bits))
    }

    /// Raw bit representation.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag of `other` is set in `self`.
    pub fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Uniform random weight initialiser over `[min, max]`, quantised to `gran`
/// equal steps.
#[derive(Debug, Clone, Copy)]
pub struct UniformWeight {
    min: f64,
    max: f64,
    steps: Uniform<u32>,
    gran: u32,
}

impl UniformWeight {
    /// Default initialisation interval and granularity: `[-1, 1]` in 1000
    /// steps.
    pub fn default_range() -> Self {
        Self { min: -1.0, max: 1.0, steps: Uniform::new_inclusive(0, 1000), gran: 1000 }
    }

    /// Creates an initialiser. Fails if `min > max` or `gran` is zero.
    pub fn new(min: f64, max: f64, gran: u32) -> Result<Self> {
        if min > max {
            return Err(Error::Config(format!(
                "weight range is inverted: min {min} > max {max}"
            )));
        }
        if gran == 0 {
            return Err(Error::Config("weight granularity must be positive".into()));
        }
        Ok(Self { min, max, steps: Uniform::new_inclusive(0, gran), gran })
    }
}

impl Distribution<f64> for UniformWeight {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let step = self.steps.sample(rng);
        self.min + (self.max - self.min) * f64::from(step) / f64::from(self.gran)
    }
}

/// Builder and owner of a layered feed-forward topology.
#[derive(Debug)]
pub struct FeedForward {
    network: Network,
    features: Features,
    bias: Option<usize>,
}

impl FeedForward {
    /// Creates an empty feed-forward wrapper with no features.
    pub fn new() -> Self {
        Self { network: Network::new(), features: Features::NONE, bias: None }
    }

    /// Builds an `input_d → output_d` network with default uniform random
    /// weights, identity inputs and logistic outputs.
    pub fn simple(input_d: usize, output_d: usize, features: Features) -> Result<Self> {
        Self::from_layers_default(&[input_d, output_d], features)
    }

    /// Builds an `input_d → hidden_d → output_d` network with default
    /// uniform random weights, identity inputs and logistic non-input
    /// layers.
    pub fn with_hidden(
        input_d: usize,
        hidden_d: usize,
        output_d: usize,
        features: Features,
    ) -> Result<Self> {
        Self::from_layers_default(&[input_d, hidden_d, output_d], features)
    }

    /// Builds a network from an explicit layer specification and weight
    /// initialiser.
    pub fn from_layers<W: FnMut() -> f64>(
        layers: &[usize],
        w_init: W,
        features: Features,
    ) -> Result<Self> {
        let mut ff = Self::new();
        ff.set_features(features)?;
        ff.build(layers, w_init)?;
        Ok(ff)
    }

    fn from_layers_default(layers: &[usize], features: Features) -> Result<Self> {
        let weights = UniformWeight::default_range();
        let mut rng = rand::thread_rng();
        Self::from_layers(layers, || weights.sample(&mut rng), features)
    }

    /// Replaces the feature flags.
    ///
    /// Features shape the wiring, so they can only change while the
    /// topology is still empty.
    pub fn set_features(&mut self, features: Features) -> Result<()> {
        if self.network.slot_count() != 0 {
            return Err(Error::Invariant("features are frozen once the topology exists"));
        }
        self.features = features;
        Ok(())
    }

    /// Wires the layered topology: `layers[0]` INPUT neurons, hidden INNER
    /// layers, and a final OUTPUT layer, fully connected layer to layer.
    ///
    /// With [`Features::BIAS`] a bias source is created first (index 0) and
    /// feeds every non-input neuron; with [`Features::LATERAL_PREV`] each
    /// non-input neuron also receives its earlier siblings. Every new
    /// weight is drawn from `w_init`.
    pub fn build<W: FnMut() -> f64>(&mut self, layers: &[usize], mut w_init: W) -> Result<()> {
        if self.network.slot_count() != 0 {
            return Err(Error::Invariant("feed-forward topology is already built"));
        }
        if layers.len() < 2 {
            return Err(Error::Config(format!(
                "a feed-forward network needs at least input and output layers, got {}",
                layers.len()
            )));
        }
        if let Some(position) = layers.iter().position(|&d| d == 0) {
            return Err(Error::Config(format!("layer {position} is empty")));
        }

        if self.features.contains(Features::BIAS) {
            self.bias = Some(self.network.add_neuron(Role::Inner, Activation::Identity));
        }

        let mut previous: Vec<usize> = (0..layers[0])
            .map(|_| self.network.add_neuron(Role::Input, Activation::Identity))
            .collect();

        for (depth, &width) in layers.iter().enumerate().skip(1) {
            let role = if depth == layers.len() - 1 { Role::Output } else { Role::Inner };
            let mut layer = Vec::with_capacity(width);
            for _ in 0..width {
                let index = self.network.add_neuron(role, Activation::logistic());
                if let Some(bias) = self.bias {
                    self.network.add_synapse(bias, index, w_init())?;
                }
                if self.features.contains(Features::LATERAL_PREV) {
                    for &sibling in &layer {
                        self.network.add_synapse(sibling, index, w_init())?;
                    }
                }
                for &source in &previous {
                    self.network.add_synapse(source, index, w_init())?;
                }
                layer.push(index);
            }
            previous = layer;
        }

        debug!(
            "built feed-forward network: {} layers, {} neurons, features {}",
            layers.len(),
            self.network.size(),
            self.features
        );
        Ok(())
    }

    /// The wired topology.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The active feature flags.
    pub fn features(&self) -> Features {
        self.features
    }

    /// Index of the bias source neuron, when [`Features::BIAS`] is set.
    pub fn bias(&self) -> Option<usize> {
        self.bias
    }

    /// A forward-only evaluator with the bias source (if any) pinned to
    /// constant activation 1.
    pub fn function(&self) -> Result<Function<'_>> {
        let mut grid = Grid::new(self.network.slot_count());
        if let Some(bias) = self.bias {
            grid.pin(bias, ForwardResult { net: 0.0, phi_net: 1.0 })?;
        }
        Ok(Function { network: &self.network, grid })
    }

    /// A backpropagation trainer with the bias source (if any) pinned to
    /// constant activation 1 in every computation slot.
    pub fn training(&mut self) -> Trainer<'_> {
        let pins = self.bias.map(|index| (index, 1.0)).into_iter().collect();
        Trainer::with_pins(&mut self.network, pins)
    }

    /// Saves the wrapper in the FFNN text format.
    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        use io::Write;
        let mut file = File::create(path)?;
        file.write_all(crate::format::write_ffnn(self).as_bytes())
    }

    /// Loads a wrapper from the FFNN text format.
    pub fn load_text<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        crate::format::parse_ffnn(&text).map_err(io::Error::other)
    }

    pub(crate) fn from_parts(network: Network, features: Features) -> Result<Self> {
        let bias = if features.contains(Features::BIAS) {
            let neuron = network.neuron(0).map_err(|_| {
                Error::Invariant("bias feature set but the topology has no neuron 0")
            })?;
            if neuron.role() != Role::Inner {
                return Err(Error::Invariant("bias source must be an INNER neuron"));
            }
            Some(0)
        } else {
            None
        };
        Ok(Self { network, features, bias })
    }
}

impl Default for FeedForward {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-wired forward evaluator handed out by [`FeedForward::function`].
#[derive(Debug)]
pub struct Function<'net> {
    network: &'net Network,
    grid: Grid<ForwardResult>,
}

impl Function<'_> {
    /// Evaluates the network on one input vector and returns the output
    /// activations in output-layer order.
    pub fn predict(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        ForwardPass::new(self.network, &mut self.grid).run(inputs)
    }
}
