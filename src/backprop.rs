//! Backpropagation training over an arbitrary neuron graph.

use log::{debug, trace};

use crate::compute::{BackwardPass, BackwardResult, ForwardMap, ForwardPass, ForwardResult, Grid};
use crate::criterion::Criterion;
use crate::error::{Error, Result};
use crate::network::Network;

/// One (forward, backward) pair of memoisation grids, enough to process a
/// single training sample.
#[derive(Debug)]
struct Slot {
    forward: Grid<ForwardResult>,
    backward: Grid<BackwardResult>,
}

/// Gradient-descent trainer owning the reverse adjacency of the network and
/// a pool of per-sample computation slots.
///
/// The trainer borrows the network mutably for its whole lifetime: the
/// adjacency map and the slot grids are sized at construction and assume a
/// structurally stable topology. Weight values are the only thing a
/// training call mutates.
///
/// # Examples
///
/// ```
/// use neurograph::{Activation, ConstantCriterion, Network, Role, Trainer};
///
/// let mut net = Network::new();
/// let i = net.add_neuron(Role::Input, Activation::Identity);
/// let o = net.add_neuron(Role::Output, Activation::Identity);
/// net.add_synapse(i, o, 0.1).unwrap();
///
/// let mut trainer = Trainer::new(&mut net);
/// let mut criterion = ConstantCriterion::new(0.0, 0.05);
/// let err = trainer.train_one(&[1.0], &[2.0], &mut criterion).unwrap();
/// assert!(err > 0.0);
/// ```
#[derive(Debug)]
pub struct Trainer<'net> {
    network: &'net mut Network,
    fmap: ForwardMap,
    pins: Vec<(usize, f64)>,
    slots: Vec<Slot>,
}

impl<'net> Trainer<'net> {
    /// Creates a trainer without pinned neurons.
    pub fn new(network: &'net mut Network) -> Self {
        Self::with_pins(network, Vec::new())
    }

    /// Creates a trainer with a list of `(index, phi)` hard pins.
    ///
    /// Pinned neurons participate as constants: every slot fixes their
    /// activation to `phi` and their delta to zero, so they absorb no
    /// gradient and survive every reset.
    pub fn with_pins(network: &'net mut Network, pins: Vec<(usize, f64)>) -> Self {
        let fmap = ForwardMap::build(network);
        Self { network, fmap, pins, slots: Vec::new() }
    }

    /// One stochastic gradient step on a single sample. Returns the squared
    /// error of the forward evaluation that preceded the update.
    pub fn train_one<C: Criterion>(
        &mut self,
        input: &[f64],
        target: &[f64],
        criterion: &mut C,
    ) -> Result<f64> {
        self.assert_slots(1)?;
        let err2 = self.compute(input, target, 0)?;
        let alpha = criterion.rate(err2);
        if alpha != 0.0 {
            self.update(alpha, 0)?;
        }
        Ok(err2)
    }

    /// One batch gradient step over a whole training set. Returns the
    /// average squared error.
    ///
    /// Every sample is computed into its own slot before any weight is
    /// touched; the criterion sees the average error, and the resulting
    /// rate is divided by the batch size and applied once per slot. The
    /// net weight delta equals a single application of the averaged
    /// gradient.
    pub fn train_batch<C: Criterion>(
        &mut self,
        set: &[(Vec<f64>, Vec<f64>)],
        criterion: &mut C,
    ) -> Result<f64> {
        if set.is_empty() {
            return Err(Error::Config("training set is empty".into()));
        }
        self.assert_slots(set.len())?;

        let mut sum = 0.0;
        for (slot, (input, target)) in set.iter().enumerate() {
            sum += self.compute(input, target, slot)?;
        }
        let avg = sum / set.len() as f64;

        let alpha = criterion.rate(avg);
        if alpha != 0.0 {
            let alpha = alpha / set.len() as f64;
            for slot in 0..set.len() {
                self.update(alpha, slot)?;
            }
        }
        Ok(avg)
    }

    /// Repeated batch training for at most `epochs` rounds, stopping early
    /// once the criterion stops requesting updates. Returns the last
    /// average squared error.
    pub fn train<C: Criterion>(
        &mut self,
        set: &[(Vec<f64>, Vec<f64>)],
        epochs: usize,
        criterion: &mut C,
    ) -> Result<f64> {
        let mut avg = 0.0;
        for epoch in 0..epochs {
            avg = self.train_batch(set, criterion)?;
            debug!("epoch {}/{} - avg squared error: {}", epoch + 1, epochs, avg);
            if !criterion.last_update() {
                break;
            }
        }
        Ok(avg)
    }

    /// The network being trained.
    pub fn network(&self) -> &Network {
        self.network
    }

    /// Grows the slot pool to at least `count` slots, pinning every
    /// configured constant into each new one.
    fn assert_slots(&mut self, count: usize) -> Result<()> {
        while self.slots.len() < count {
            let mut slot = Slot {
                forward: Grid::new(self.network.slot_count()),
                backward: Grid::new(self.network.slot_count()),
            };
            for &(index, phi) in &self.pins {
                slot.forward.pin(index, ForwardResult { net: 0.0, phi_net: phi })?;
                slot.backward.pin(index, BackwardResult { delta: 0.0 })?;
            }
            self.slots.push(slot);
        }
        Ok(())
    }

    /// Runs forward and backward for one sample in the given slot and
    /// returns the squared error norm Σ (actualᵢ − targetᵢ)².
    fn compute(&mut self, input: &[f64], target: &[f64], slot: usize) -> Result<f64> {
        let network = &*self.network;
        let Slot { forward, backward } = &mut self.slots[slot];

        let mut fw = ForwardPass::new(network, forward);
        let actual = fw.run(input)?;
        if target.len() != actual.len() {
            return Err(Error::Shape { expected: actual.len(), got: target.len() });
        }

        let error: Vec<f64> = actual.iter().zip(target).map(|(a, t)| a - t).collect();
        let err2 = error.iter().map(|e| e * e).sum();

        let mut bw = BackwardPass::new(network, backward, &self.fmap);
        bw.run(&error, &mut fw)?;
        Ok(err2)
    }

    /// Applies `w ← w − α · δ(consumer) · φ(source)` to every dendrite,
    /// using the slot's caches.
    ///
    /// Deltas and activations the caches never needed are forced first,
    /// while the network is still read-only; only then are weights touched.
    fn update(&mut self, alpha: f64, slot: usize) -> Result<()> {
        {
            let network = &*self.network;
            let Slot { forward, backward } = &mut self.slots[slot];
            let mut fw = ForwardPass::new(network, forward);
            let mut bw = BackwardPass::new(network, backward, &self.fmap);
            for neuron in network.iter() {
                if neuron.dendrites().is_empty() {
                    continue;
                }
                bw.fx(neuron.index(), &mut fw)?;
                for dendrite in neuron.dendrites() {
                    fw.fx(dendrite.source)?;
                }
            }
        }

        let Slot { forward, backward } = &self.slots[slot];
        for neuron in self.network.iter_mut() {
            if neuron.dendrites().is_empty() {
                continue;
            }
            let index = neuron.index();
            let delta = backward.value(index)?.delta;
            for dendrite in neuron.dendrites_mut() {
                let step = alpha * delta * forward.value(dendrite.source)?.phi_net;
                trace!("w[{} <- {}] -= {}", index, dendrite.source, step);
                dendrite.weight -= step;
            }
        }
        Ok(())
    }
}
