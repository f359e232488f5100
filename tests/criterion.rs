use neurograph::{AdaptiveCriterion, ConstantCriterion, Criterion};

#[test]
fn constant_criterion_fires_above_threshold() {
    let mut criterion = ConstantCriterion::new(0.5, 0.1);

    assert_eq!(criterion.rate(0.6), 0.1);
    assert!(criterion.last_update());

    assert_eq!(criterion.rate(0.5), 0.0);
    assert!(!criterion.last_update());

    assert_eq!(criterion.rate(2.0), 0.1);
    assert!(criterion.last_update());
}

#[test]
fn adaptive_criterion_grows_on_sustained_convergence() {
    let mut criterion = AdaptiveCriterion::with_coefficients(0.0, 1.0, 2, -2, 2.0, 0.5);

    // First call counts as convergence against the infinite initial error.
    assert_eq!(criterion.rate(10.0), 1.0);
    // Second consecutive improvement hits cmax and doubles the rate.
    assert_eq!(criterion.rate(5.0), 2.0);
    assert_eq!(criterion.alpha(), 2.0);
    assert!(criterion.last_update());
}

#[test]
fn adaptive_criterion_shrinks_on_sustained_divergence() {
    let mut criterion = AdaptiveCriterion::with_coefficients(0.0, 1.0, 2, -2, 2.0, 0.5);

    // The first call improves on the infinite initial error (counter 1);
    // stagnation then walks the counter down to cmin, halving the rate.
    assert_eq!(criterion.rate(10.0), 1.0);
    assert_eq!(criterion.rate(10.0), 1.0);
    assert_eq!(criterion.rate(11.0), 1.0);
    assert_eq!(criterion.rate(12.0), 0.5);
    assert_eq!(criterion.alpha(), 0.5);
}

/// Reaching a bound resets the counter, so the scaling does not repeat on
/// the very next step.
#[test]
fn adaptive_counter_resets_after_scaling() {
    let mut criterion = AdaptiveCriterion::with_coefficients(0.0, 1.0, 2, -2, 2.0, 0.5);

    assert_eq!(criterion.rate(10.0), 1.0);
    assert_eq!(criterion.rate(5.0), 2.0);
    // One more improvement only moves the counter to 1; no scaling yet.
    assert_eq!(criterion.rate(4.0), 2.0);
    // And the next one hits cmax again.
    assert_eq!(criterion.rate(3.0), 4.0);
}

#[test]
fn adaptive_criterion_stops_below_threshold() {
    let mut criterion = AdaptiveCriterion::new(0.1, 1.0);

    assert_eq!(criterion.rate(0.05), 0.0);
    assert!(!criterion.last_update());
    // The threshold itself counts as converged.
    assert_eq!(criterion.rate(0.1), 0.0);
}
