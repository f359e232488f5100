//! Plain-text (de)serialisation of topologies and feed-forward wrappers.
//!
//! The format is line oriented. `#` starts a comment running to the end of
//! the line; blank lines and surrounding whitespace are ignored. A topology
//! block lists every neuron, then every synapse:
//!
//! ```text
//! NNTopology
//!     Neuron 0
//!         type = INPUT
//!         f    = identity
//!     NeuronEnd
//!     Synapsis 0 -> 1 weight = 0.5
//! NNTopologyEnd
//! ```
//!
//! A feed-forward wrapper adds its feature flags around a nested topology:
//!
//! ```text
//! FFNN
//!     features = 0x1
//!     <topology block>
//! FFNNEnd
//! ```

use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::feedforward::{FeedForward, Features};
use crate::network::Network;
use crate::{Activation, Role};

/// Renders a topology block.
///
/// Neurons are emitted in ascending index order, followed by every synapse
/// grouped by consumer. Weights use the shortest representation that parses
/// back to the same value, so rendering a parsed dump reproduces it byte
/// for byte.
pub fn write_topology(network: &Network) -> String {
    let mut out = String::from("NNTopology\n");
    for neuron in network.iter() {
        let _ = writeln!(out, "    Neuron {}", neuron.index());
        let _ = writeln!(out, "        type = {}", neuron.role());
        let _ = writeln!(out, "        f    = {}", neuron.activation());
        out.push_str("    NeuronEnd\n");
    }
    for neuron in network.iter() {
        for dendrite in neuron.dendrites() {
            let _ = writeln!(
                out,
                "    Synapsis {} -> {} weight = {}",
                dendrite.source,
                neuron.index(),
                dendrite.weight
            );
        }
    }
    out.push_str("NNTopologyEnd\n");
    out
}

/// Parses a topology block. The input must contain exactly one block and
/// nothing else but comments and blank lines.
pub fn parse_topology(text: &str) -> Result<Network> {
    let mut lines = Lines::new(text);
    let network = parse_topology_block(&mut lines)?;
    expect_end(&mut lines)?;
    Ok(network)
}

/// Renders a feed-forward wrapper: feature flags plus the nested topology.
pub fn write_ffnn(ff: &FeedForward) -> String {
    let mut out = String::from("FFNN\n");
    let _ = writeln!(out, "    features = {}", ff.features());
    for line in write_topology(ff.network()).lines() {
        let _ = writeln!(out, "    {line}");
    }
    out.push_str("FFNNEnd\n");
    out
}

/// Parses a feed-forward wrapper.
pub fn parse_ffnn(text: &str) -> Result<FeedForward> {
    let mut lines = Lines::new(text);

    let (line, content) = next_or_eof(&mut lines)?;
    if content != "FFNN" {
        return Err(parse_error(line, "expected FFNN"));
    }

    let (line, content) = next_or_eof(&mut lines)?;
    let mut tokens = content.split_whitespace();
    let features = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some("features"), Some("="), Some(value), None) => {
            let bits = value
                .strip_prefix("0x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .ok_or_else(|| parse_error(line, "malformed feature flags"))?;
            Features::from_bits(bits).ok_or_else(|| parse_error(line, "unknown feature flags"))?
        }
        _ => return Err(parse_error(line, "expected features = 0x<hex>")),
    };

    let network = parse_topology_block(&mut lines)?;

    let (line, content) = next_or_eof(&mut lines)?;
    if content != "FFNNEnd" {
        return Err(parse_error(line, "expected FFNNEnd"));
    }
    expect_end(&mut lines)?;

    FeedForward::from_parts(network, features)
        .map_err(|e| parse_error(line, &format!("inconsistent feed-forward dump: {e}")))
}

impl Network {
    /// Saves the topology in the text format.
    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        use io::Write;
        let mut file = File::create(path)?;
        file.write_all(write_topology(self).as_bytes())
    }

    /// Loads a topology from the text format.
    pub fn load_text<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        parse_topology(&text).map_err(io::Error::other)
    }
}

/// Iterator over significant lines: comments stripped, whitespace trimmed,
/// blank lines skipped. Tracks line numbers for diagnostics.
struct Lines<'a> {
    iter: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self { iter: text.lines().enumerate(), last_line: 0 }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        for (number, raw) in self.iter.by_ref() {
            self.last_line = number + 1;
            let line = match raw.find('#') {
                Some(comment) => &raw[..comment],
                None => raw,
            };
            let line = line.trim();
            if !line.is_empty() {
                return Some((number + 1, line));
            }
        }
        None
    }
}

fn parse_error(line: usize, message: &str) -> Error {
    Error::Parse { line, message: message.to_string() }
}

fn next_or_eof<'a>(lines: &mut Lines<'a>) -> Result<(usize, &'a str)> {
    lines
        .next()
        .ok_or_else(|| parse_error(lines.last_line, "unexpected end of input"))
}

fn expect_end(lines: &mut Lines<'_>) -> Result<()> {
    match lines.next() {
        Some((line, _)) => Err(parse_error(line, "trailing content after the block")),
        None => Ok(()),
    }
}

fn parse_index(token: Option<&str>, line: usize) -> Result<usize> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| parse_error(line, "expected a neuron index"))
}

fn parse_topology_block(lines: &mut Lines<'_>) -> Result<Network> {
    let (line, content) = next_or_eof(lines)?;
    if content != "NNTopology" {
        return Err(parse_error(line, "expected NNTopology"));
    }

    let mut network = Network::new();
    let mut synapses: Vec<(usize, usize, usize, f64)> = Vec::new();
    loop {
        let (line, content) = next_or_eof(lines)?;
        let mut tokens = content.split_whitespace();
        match tokens.next() {
            Some("NNTopologyEnd") => break,
            Some("Neuron") => {
                let index = parse_index(tokens.next(), line)?;
                if tokens.next().is_some() {
                    return Err(parse_error(line, "trailing tokens after the neuron index"));
                }
                let (role, activation) = parse_neuron_body(lines)?;
                network.set_neuron(index, role, activation);
            }
            Some("Synapsis") => {
                let from = parse_index(tokens.next(), line)?;
                if tokens.next() != Some("->") {
                    return Err(parse_error(line, "expected ->"));
                }
                let to = parse_index(tokens.next(), line)?;
                if tokens.next() != Some("weight") || tokens.next() != Some("=") {
                    return Err(parse_error(line, "expected weight = <number>"));
                }
                let weight = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| parse_error(line, "malformed synapse weight"))?;
                if tokens.next().is_some() {
                    return Err(parse_error(line, "trailing tokens after the synapse weight"));
                }
                synapses.push((line, from, to, weight));
            }
            _ => return Err(parse_error(line, "expected Neuron, Synapsis or NNTopologyEnd")),
        }
    }

    for (line, from, to, weight) in synapses {
        network
            .add_synapse(from, to, weight)
            .map_err(|_| parse_error(line, "synapse references an unknown neuron"))?;
    }
    Ok(network)
}

fn parse_neuron_body(lines: &mut Lines<'_>) -> Result<(Role, Activation)> {
    let mut role = None;
    let mut activation = None;
    loop {
        let (line, content) = next_or_eof(lines)?;
        if content == "NeuronEnd" {
            break;
        }
        let mut tokens = content.split_whitespace();
        let key = tokens.next();
        if tokens.next() != Some("=") {
            return Err(parse_error(line, "expected <key> = <value>"));
        }
        let value: String = tokens.collect::<Vec<_>>().join("");
        match key {
            Some("type") => {
                role = Some(
                    Role::from_str(&value)
                        .map_err(|_| parse_error(line, "unknown neuron type"))?,
                );
            }
            Some("f") => {
                activation = Some(
                    Activation::from_str(&value)
                        .map_err(|_| parse_error(line, "unknown activation literal"))?,
                );
            }
            _ => return Err(parse_error(line, "unknown neuron attribute")),
        }
    }
    match (role, activation) {
        (Some(role), Some(activation)) => Ok((role, activation)),
        (None, _) => Err(parse_error(lines.last_line, "neuron block is missing its type")),
        (_, None) => Err(parse_error(lines.last_line, "neuron block is missing its activation")),
    }
}
