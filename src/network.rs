//! Neural network topology: an indexed collection of neurons and their
//! incoming weighted edges.
//!
//! A [`Network`] can be extended at runtime by adding neurons or synapses.
//! Wiring is unrestricted: self-edges and cycles are allowed; the evaluation
//! layer is responsible for terminating on them. Removing a neuron vacates
//! its slot without compaction, so indices stay stable until an explicit
//! [`Network::reindex`].

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{Activation, Neuron, Role};

/// Directed graph of neurons with ordered input and output index lists.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Network {
    /// Neuron slots; a slot is `None` after removal.
    slots: Vec<Option<Neuron>>,
    /// Indices of INPUT neurons, in insertion order.
    inputs: Vec<usize>,
    /// Indices of OUTPUT neurons, in insertion order.
    outputs: Vec<usize>,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new neuron and returns its index.
    ///
    /// INPUT and OUTPUT neurons are also recorded in the corresponding
    /// ordered role list.
    pub fn add_neuron(&mut self, role: Role, activation: Activation) -> usize {
        let index = self.slots.len();
        self.slots.push(Some(Neuron::new(index, role, activation)));
        self.enroll(index, role);
        index
    }

    /// Installs a neuron at the given index, growing the slot vector with
    /// vacancies as needed.
    ///
    /// If the slot already holds a neuron, that neuron is removed first:
    /// it leaves its role list and every dendrite referencing it as a source
    /// is erased from the other neurons.
    pub fn set_neuron(&mut self, index: usize, role: Role, activation: Activation) -> usize {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        if self.slots[index].is_some() {
            self.vacate(index);
        }
        self.slots[index] = Some(Neuron::new(index, role, activation));
        self.enroll(index, role);
        index
    }

    /// Removes the neuron at `index`: it leaves its role list, every
    /// dendrite referencing it is erased from the other neurons, and its
    /// slot becomes vacant. The slot vector is not compacted.
    pub fn remove_neuron(&mut self, index: usize) -> Result<()> {
        if !self.occupied(index) {
            return Err(Error::Index { index });
        }
        self.vacate(index);
        Ok(())
    }

    /// Returns the neuron at `index`.
    pub fn neuron(&self, index: usize) -> Result<&Neuron> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(Error::Index { index })
    }

    /// Returns the neuron at `index`, mutably.
    pub fn neuron_mut(&mut self, index: usize) -> Result<&mut Neuron> {
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(Error::Index { index })
    }

    /// Adds a directed synapse between two neuron indices, or updates its
    /// weight if the edge already exists.
    ///
    /// Returns an error if either index does not refer to an existing
    /// neuron.
    pub fn add_synapse(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        if !self.occupied(from) {
            return Err(Error::Index { index: from });
        }
        self.neuron_mut(to)?.set_dendrite(from, weight);
        Ok(())
    }

    /// Removes the synapse between two neuron indices, if any. Returns
    /// whether an edge was removed.
    pub fn remove_synapse(&mut self, from: usize, to: usize) -> Result<bool> {
        Ok(self.neuron_mut(to)?.unset_dendrite(from))
    }

    /// Number of non-vacant slots.
    pub fn size(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Total number of slots, vacant ones included. Defines the valid index
    /// range.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Indices of INPUT neurons, in insertion order.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Indices of OUTPUT neurons, in insertion order.
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    /// Visits every neuron in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Neuron> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Visits every neuron in slot order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Neuron> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Visits the INPUT neurons in insertion order.
    pub fn input_neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.inputs
            .iter()
            .filter_map(|&index| self.slots.get(index).and_then(Option::as_ref))
    }

    /// Visits the OUTPUT neurons in insertion order.
    pub fn output_neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.outputs
            .iter()
            .filter_map(|&index| self.slots.get(index).and_then(Option::as_ref))
    }

    /// Visits the INPUT neurons in slot order, mutably.
    pub fn input_neurons_mut(&mut self) -> impl Iterator<Item = &mut Neuron> {
        self.iter_mut().filter(|n| n.role() == Role::Input)
    }

    /// Visits the OUTPUT neurons in slot order, mutably.
    pub fn output_neurons_mut(&mut self) -> impl Iterator<Item = &mut Neuron> {
        self.iter_mut().filter(|n| n.role() == Role::Output)
    }

    /// Compacts the slot vector, dropping vacancies.
    ///
    /// Every surviving neuron's stored index and dendrite sources are
    /// rewritten to the new positions, and the role lists are rebuilt in
    /// ascending index order. Any cached adjacency map or evaluation state
    /// derived from the old indices is invalidated by this call.
    pub fn reindex(&mut self) {
        let mut map = vec![usize::MAX; self.slots.len()];
        let mut next = 0;
        for (old, slot) in self.slots.iter().enumerate() {
            if slot.is_some() {
                map[old] = next;
                next += 1;
            }
        }

        let mut compacted = Vec::with_capacity(next);
        for slot in self.slots.drain(..) {
            if let Some(mut neuron) = slot {
                neuron.remap(&map);
                compacted.push(Some(neuron));
            }
        }
        self.slots = compacted;

        self.inputs.clear();
        self.outputs.clear();
        for index in 0..self.slots.len() {
            if let Some(role) = self.slots[index].as_ref().map(Neuron::role) {
                self.enroll(index, role);
            }
        }
    }

    /// Drops every dendrite whose weight is exactly zero.
    pub fn prune(&mut self) {
        for neuron in self.iter_mut() {
            neuron.minimise_dendrites();
        }
    }

    /// Prunes zero-weight dendrites, repeatedly removes INNER neurons left
    /// without dendrites, then compacts via [`Network::reindex`].
    ///
    /// Removing a neuron erases its outgoing edges from the other neurons,
    /// which may strip further INNER neurons bare; the removal loop runs to
    /// a fixed point. Note that a dendrite-less neuron still emits φ(0), so
    /// for activations with φ(0) ≠ 0 this removal is not output-preserving.
    pub fn minimise(&mut self) {
        self.prune();
        loop {
            let dead: Vec<usize> = self
                .iter()
                .filter(|n| n.role() == Role::Inner && n.dendrites().is_empty())
                .map(Neuron::index)
                .collect();
            if dead.is_empty() {
                break;
            }
            for index in dead {
                self.vacate(index);
            }
        }
        self.reindex();
    }

    /// Saves the network as pretty JSON to the specified file path.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }

    /// Loads a network from a JSON file created by [`Network::save_json`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }

    fn occupied(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Option::is_some)
    }

    fn enroll(&mut self, index: usize, role: Role) {
        match role {
            Role::Input => self.inputs.push(index),
            Role::Output => self.outputs.push(index),
            Role::Inner => {}
        }
    }

    /// Removes the neuron at an index known to be occupied.
    fn vacate(&mut self, index: usize) {
        if let Some(neuron) = self.slots[index].take() {
            match neuron.role() {
                Role::Input => self.inputs.retain(|&i| i != index),
                Role::Output => self.outputs.retain(|&i| i != index),
                Role::Inner => {}
            }
        }
        for slot in &mut self.slots {
            if let Some(other) = slot.as_mut() {
                other.unset_dendrite(index);
            }
        }
    }
}
