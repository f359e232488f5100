use neurograph::{
    Activation, BackwardPass, ConstantCriterion, Error, ForwardMap, ForwardPass, Grid, Network,
    Role, Trainer,
};

/// The 4-2-3 identity network of the forward tests with every weight at
/// `w0`.
fn linear_net(w0: f64) -> Network {
    let mut net = Network::new();
    let ins: Vec<usize> = (0..4).map(|_| net.add_neuron(Role::Input, Activation::Identity)).collect();
    let x: Vec<usize> = (0..2).map(|_| net.add_neuron(Role::Inner, Activation::Identity)).collect();
    let outs: Vec<usize> = (0..3).map(|_| net.add_neuron(Role::Output, Activation::Identity)).collect();

    for &h in &x {
        for &i in &ins {
            net.add_synapse(i, h, w0).unwrap();
        }
    }
    for &o in &outs {
        for &h in &x {
            net.add_synapse(h, o, w0).unwrap();
        }
    }
    net
}

fn squared_error(net: &Network, input: &[f64], target: &[f64]) -> f64 {
    let mut grid = Grid::new(net.slot_count());
    let out = ForwardPass::new(net, &mut grid).run(input).unwrap();
    out.iter().zip(target).map(|(a, t)| (a - t) * (a - t)).sum()
}

/// Repeated on-line steps on one sample strictly reduce the squared error.
#[test]
fn online_training_reduces_error() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut net = linear_net(0.01);
    let input = [1.0, 2.0, 3.0, 4.0];
    let target = [4.0, 8.0, 12.0];

    let initial = squared_error(&net, &input, &target);
    let mut criterion = ConstantCriterion::new(0.0, 0.01);
    let mut trainer = Trainer::new(&mut net);
    let mut last = f64::INFINITY;
    for _ in 0..100 {
        last = trainer.train_one(&input, &target, &mut criterion).unwrap();
    }
    drop(trainer);
    let final_err = squared_error(&net, &input, &target);

    assert!(final_err < initial, "{final_err} >= {initial}");
    assert!(last < initial);
}

/// The squared error returned by a training step is exactly the one of the
/// forward evaluation that produced it.
#[test]
fn returned_error_matches_forward_evaluation() {
    let mut net = linear_net(0.25);
    let input = [1.0, 2.0, 3.0, 4.0];
    let target = [1.0, 1.0, 1.0];

    let expected = squared_error(&net, &input, &target);

    // A criterion that never fires leaves the weights untouched.
    let mut criterion = ConstantCriterion::new(f64::INFINITY, 1.0);
    let mut trainer = Trainer::new(&mut net);
    let err2 = trainer.train_one(&input, &target, &mut criterion).unwrap();

    assert_eq!(err2, expected);
}

/// A batch of one sample takes exactly the same step as an on-line call.
#[test]
fn batch_of_one_equals_online() {
    let mut online = linear_net(0.1);
    let mut batch = linear_net(0.1);
    let sample = (vec![1.0, 0.5, -1.0, 2.0], vec![0.5, 1.0, -0.5]);

    let mut c1 = ConstantCriterion::new(0.0, 0.2);
    let mut trainer = Trainer::new(&mut online);
    trainer.train_one(&sample.0, &sample.1, &mut c1).unwrap();
    drop(trainer);

    let mut c2 = ConstantCriterion::new(0.0, 0.2);
    let mut trainer = Trainer::new(&mut batch);
    trainer.train_batch(std::slice::from_ref(&sample), &mut c2).unwrap();
    drop(trainer);

    for (a, b) in online.iter().zip(batch.iter()) {
        for (da, db) in a.dendrites().iter().zip(b.dendrites().iter()) {
            assert_eq!(da.weight, db.weight);
        }
    }
}

/// All per-sample computations finish before any update; dividing the rate
/// by the batch size then applying per slot equals one averaged step.
#[test]
fn batch_training_reduces_error_on_a_set() {
    let mut net = linear_net(0.05);
    let set = vec![
        (vec![1.0, 0.0, 0.0, 0.0], vec![0.5, 0.0, 0.5]),
        (vec![0.0, 1.0, 0.0, 0.0], vec![0.0, 0.5, 0.5]),
        (vec![0.0, 0.0, 1.0, 1.0], vec![0.5, 0.5, 1.0]),
    ];

    let initial: f64 = set.iter().map(|(i, t)| squared_error(&net, i, t)).sum::<f64>() / 3.0;
    let mut criterion = ConstantCriterion::new(0.0, 0.05);
    let mut trainer = Trainer::new(&mut net);
    let mut avg = f64::INFINITY;
    for _ in 0..50 {
        avg = trainer.train_batch(&set, &mut criterion).unwrap();
    }
    drop(trainer);
    let final_avg: f64 = set.iter().map(|(i, t)| squared_error(&net, i, t)).sum::<f64>() / 3.0;

    assert!(final_avg < initial);
    assert!(avg < initial);
}

#[test]
fn target_length_is_checked() {
    let mut net = linear_net(0.1);
    let mut criterion = ConstantCriterion::new(0.0, 0.1);
    let mut trainer = Trainer::new(&mut net);

    assert_eq!(
        trainer.train_one(&[1.0, 2.0, 3.0, 4.0], &[1.0], &mut criterion).unwrap_err(),
        Error::Shape { expected: 3, got: 1 }
    );
}

#[test]
fn empty_batch_is_rejected() {
    let mut net = linear_net(0.1);
    let mut criterion = ConstantCriterion::new(0.0, 0.1);
    let mut trainer = Trainer::new(&mut net);

    assert!(matches!(trainer.train_batch(&[], &mut criterion), Err(Error::Config(_))));
}

/// Training a recurrent network terminates; the feedback edge contributes
/// the default zero during both sweeps.
#[test]
fn training_terminates_on_cycles() {
    let mut net = Network::new();
    let i = net.add_neuron(Role::Input, Activation::Identity);
    let a = net.add_neuron(Role::Inner, Activation::Identity);
    let b = net.add_neuron(Role::Inner, Activation::Identity);
    let o = net.add_neuron(Role::Output, Activation::Identity);
    net.add_synapse(i, a, 0.5).unwrap();
    net.add_synapse(b, a, 0.5).unwrap();
    net.add_synapse(a, b, 0.5).unwrap();
    net.add_synapse(a, o, 0.5).unwrap();

    let mut criterion = ConstantCriterion::new(0.0, 0.1);
    let mut trainer = Trainer::new(&mut net);
    for _ in 0..10 {
        trainer.train_one(&[1.0], &[1.0], &mut criterion).unwrap();
    }
}

/// Seeding the output deltas is the driver's job; evaluating an OUTPUT
/// neuron through the sweep itself is a contract violation.
#[test]
fn backward_refuses_to_evaluate_outputs() {
    let mut net = Network::new();
    let i = net.add_neuron(Role::Input, Activation::Identity);
    let o = net.add_neuron(Role::Output, Activation::Identity);
    net.add_synapse(i, o, 1.0).unwrap();

    let fmap = ForwardMap::build(&net);
    let mut fw_grid = Grid::new(net.slot_count());
    let mut bw_grid = Grid::new(net.slot_count());
    let mut fw = ForwardPass::new(&net, &mut fw_grid);
    fw.run(&[1.0]).unwrap();

    let mut bw = BackwardPass::new(&net, &mut bw_grid, &fmap);
    assert!(matches!(bw.fx(o, &mut fw), Err(Error::Invariant(_))));
}

/// Hard pins configured on the trainer keep their activation through every
/// sample and absorb no gradient.
#[test]
fn pinned_neurons_stay_constant() {
    let mut net = Network::new();
    let i = net.add_neuron(Role::Input, Activation::Identity);
    let pinned = net.add_neuron(Role::Inner, Activation::Identity);
    let o = net.add_neuron(Role::Output, Activation::Identity);
    net.add_synapse(i, o, 0.5).unwrap();
    net.add_synapse(pinned, o, 0.5).unwrap();

    let mut criterion = ConstantCriterion::new(0.0, 0.1);
    let mut trainer = Trainer::with_pins(&mut net, vec![(pinned, 1.0)]);
    for _ in 0..5 {
        trainer.train_one(&[1.0], &[2.0], &mut criterion).unwrap();
    }
    drop(trainer);

    // The pinned neuron has no dendrites, so the only observable effect is
    // that the edge it feeds keeps learning against a constant activation 1.
    let mut grid = Grid::new(net.slot_count());
    let mut fw = ForwardPass::new(&net, &mut grid);
    fw.pin(pinned, 1.0).unwrap();
    let out = fw.run(&[1.0]).unwrap();
    let err = (out[0] - 2.0).abs();
    assert!(err < 1.5, "pinned training made no progress: {err}");
}
