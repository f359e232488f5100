use rand::distributions::Distribution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neurograph::{
    Activation, ConstantCriterion, Error, FeedForward, Features, Network, Role, UniformWeight,
};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Plain layered wiring: each non-input neuron receives exactly the
/// previous layer.
#[test]
fn plain_wiring_is_fully_connected_layer_to_layer() {
    let ff = FeedForward::from_layers(&[2, 3, 1], || 0.5, Features::NONE).unwrap();
    let net = ff.network();

    assert_eq!(net.size(), 6);
    assert_eq!(net.inputs().len(), 2);
    assert_eq!(net.outputs().len(), 1);
    assert_eq!(ff.bias(), None);

    for neuron in net.iter() {
        match neuron.role() {
            Role::Input => assert!(neuron.dendrites().is_empty()),
            Role::Inner => assert_eq!(neuron.dendrites().len(), 2),
            Role::Output => assert_eq!(neuron.dendrites().len(), 3),
        }
    }
}

/// The bias source sits at index 0, is INNER, and feeds every non-input
/// neuron.
#[test]
fn bias_feeds_every_non_input_neuron() {
    let ff = FeedForward::from_layers(&[2, 3, 1], || 0.5, Features::BIAS).unwrap();
    let net = ff.network();

    assert_eq!(ff.bias(), Some(0));
    assert_eq!(net.neuron(0).unwrap().role(), Role::Inner);
    assert_eq!(net.size(), 7);

    for neuron in net.iter() {
        if neuron.index() == 0 || neuron.role() == Role::Input {
            assert!(neuron.dendrite(0).is_none());
        } else {
            assert!(neuron.dendrite(0).is_some());
        }
    }
}

/// Lateral wiring adds strictly earlier siblings, keeping each layer
/// acyclic.
#[test]
fn lateral_wiring_is_lower_triangular() {
    let ff = FeedForward::from_layers(&[2, 3, 1], || 0.5, Features::LATERAL_PREV).unwrap();
    let net = ff.network();

    let hidden: Vec<_> = net.iter().filter(|n| n.role() == Role::Inner).collect();
    let mut dendrite_counts: Vec<usize> = hidden.iter().map(|n| n.dendrites().len()).collect();
    dendrite_counts.sort_unstable();
    // 2 previous-layer edges plus 0, 1, 2 lateral ones.
    assert_eq!(dendrite_counts, vec![2, 3, 4]);

    // Lateral edges only point at earlier siblings.
    for neuron in &hidden {
        for dendrite in neuron.dendrites() {
            assert!(dendrite.source < neuron.index());
        }
    }
}

/// S5: the bias pin survives any number of evaluations and resets.
#[test]
fn bias_pin_survives_resets() {
    let ff = FeedForward::from_layers(&[2, 2, 1], || 0.5, Features::BIAS).unwrap();
    let mut function = ff.function().unwrap();

    let h = sigmoid(0.5);
    let expected = sigmoid(0.5 + 0.5 * h + 0.5 * h);
    for _ in 0..4 {
        let out = function.predict(&[0.0, 0.0]).unwrap();
        assert!((out[0] - expected).abs() < 1e-12);
    }
}

/// Inputs feed through unactivated; the rest of the layer stack is
/// logistic.
#[test]
fn predict_matches_hand_computation() {
    let ff = FeedForward::from_layers(&[2, 1], || 0.25, Features::NONE).unwrap();
    let mut function = ff.function().unwrap();

    let out = function.predict(&[1.0, 3.0]).unwrap();
    assert!((out[0] - sigmoid(0.25 * 1.0 + 0.25 * 3.0)).abs() < 1e-12);
}

#[test]
fn features_are_frozen_once_built() {
    let mut ff = FeedForward::new();
    ff.set_features(Features::BIAS | Features::LATERAL_PREV).unwrap();
    ff.build(&[2, 1], || 0.5).unwrap();

    assert!(matches!(ff.set_features(Features::NONE), Err(Error::Invariant(_))));
    assert!(matches!(ff.build(&[2, 1], || 0.5), Err(Error::Invariant(_))));
}

#[test]
fn build_requires_two_nonempty_layers() {
    assert!(matches!(
        FeedForward::from_layers(&[3], || 0.5, Features::NONE),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        FeedForward::from_layers(&[3, 0, 1], || 0.5, Features::NONE),
        Err(Error::Config(_))
    ));
}

#[test]
fn shortcut_constructors_wire_the_requested_shape() {
    let simple = FeedForward::simple(2, 1, Features::NONE).unwrap();
    assert_eq!(simple.network().inputs().len(), 2);
    assert_eq!(simple.network().outputs().len(), 1);

    let hidden = FeedForward::with_hidden(2, 4, 1, Features::BIAS).unwrap();
    assert_eq!(hidden.network().size(), 8);
    assert_eq!(hidden.network().inputs().len(), 2);
    assert_eq!(hidden.network().outputs().len(), 1);
}

/// A biased perceptron learns the AND gate through the factory's trainer.
#[test]
fn factory_trainer_learns_and_gate() {
    let weights = UniformWeight::default_range();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut ff =
        FeedForward::from_layers(&[2, 1], || weights.sample(&mut rng), Features::BIAS).unwrap();

    let dataset = [
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![0.0]),
        (vec![1.0, 0.0], vec![0.0]),
        (vec![1.0, 1.0], vec![1.0]),
    ];

    let initial = {
        let mut function = ff.function().unwrap();
        dataset
            .iter()
            .map(|(i, t)| {
                let out = function.predict(i).unwrap();
                (out[0] - t[0]) * (out[0] - t[0])
            })
            .sum::<f64>()
            / dataset.len() as f64
    };

    let mut criterion = ConstantCriterion::new(0.0, 0.8);
    let mut trainer = ff.training();
    let final_avg = trainer.train(&dataset, 2000, &mut criterion).unwrap();

    assert!(final_avg < initial, "{final_avg} >= {initial}");
}

#[test]
fn uniform_weight_validates_its_range() {
    assert!(matches!(UniformWeight::new(1.0, -1.0, 10), Err(Error::Config(_))));
    assert!(matches!(UniformWeight::new(-1.0, 1.0, 0), Err(Error::Config(_))));
}

/// Samples stay inside the interval and on the quantisation grid.
#[test]
fn uniform_weight_is_quantised() {
    let weights = UniformWeight::new(0.0, 1.0, 4).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..100 {
        let w: f64 = weights.sample(&mut rng);
        assert!((0.0..=1.0).contains(&w));
        let steps = w * 4.0;
        assert!((steps - steps.round()).abs() < 1e-12);
    }
}

#[test]
fn feature_bits_round_trip() {
    let features = Features::BIAS | Features::LATERAL_PREV;
    assert_eq!(features.bits(), 3);
    assert_eq!(Features::from_bits(3), Some(features));
    assert_eq!(Features::from_bits(8), None);
    assert!(features.contains(Features::BIAS));
    assert!(!Features::NONE.contains(Features::BIAS));
    assert_eq!(format!("{features}"), "0x3");
}

/// Building through an explicit network is unnecessary; the factory's graph
/// is a normal Network usable with the standalone passes too.
#[test]
fn factory_network_is_a_plain_network() {
    let ff = FeedForward::from_layers(&[1, 1], || 1.0, Features::NONE).unwrap();
    let net: &Network = ff.network();
    assert_eq!(net.neuron(net.outputs()[0]).unwrap().activation(), Activation::logistic());
}
