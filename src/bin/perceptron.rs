//! Perceptron training harness.
//!
//! Trains a biased 2-input perceptron on the AND function and exits with
//! status 0 iff the error converged to the requested threshold.
//!
//! Positional arguments (all optional):
//! `loops alpha sigma learn_rate verbose rng_seed`

use std::process::ExitCode;
use std::str::FromStr;

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

use neurograph::{AdaptiveCriterion, Criterion, FeedForward, Features, UniformWeight};

struct Args {
    loops: usize,
    alpha: f64,
    sigma: f64,
    learn_rate: f64,
    verbose: bool,
    rng_seed: u64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut next = |name: &str, default: f64| -> Result<f64, String> {
        match args.next() {
            Some(raw) => {
                f64::from_str(&raw).map_err(|_| format!("invalid value for {name}: {raw}"))
            }
            None => Ok(default),
        }
    };

    let loops = next("loops", 1000.0)? as usize;
    let alpha = next("alpha", 0.8)?;
    let sigma = next("sigma", 0.01)?;
    let learn_rate = next("learn_rate", 1.2)?;
    let verbose = next("verbose", 0.0)? != 0.0;
    let rng_seed = next("rng_seed", 1.0)? as u64;
    Ok(Args { loops, alpha, sigma, learn_rate, verbose, rng_seed })
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: perceptron [loops] [alpha] [sigma] [learn_rate] [verbose] [rng_seed]");
            return ExitCode::from(2);
        }
    };

    let weights = UniformWeight::default_range();
    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    let mut perceptron = match FeedForward::from_layers(
        &[2, 1],
        || weights.sample(&mut rng),
        Features::BIAS,
    ) {
        Ok(ff) => ff,
        Err(e) => {
            eprintln!("failed to build perceptron: {e}");
            return ExitCode::FAILURE;
        }
    };

    let dataset = [
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![0.0]),
        (vec![1.0, 0.0], vec![0.0]),
        (vec![1.0, 1.0], vec![1.0]),
    ];

    let mut criterion = AdaptiveCriterion::with_coefficients(
        args.sigma,
        args.alpha,
        3,
        -3,
        args.learn_rate,
        1.0 / args.learn_rate,
    );

    let mut trainer = perceptron.training();
    let mut err = f64::INFINITY;
    for epoch in 0..args.loops {
        err = match trainer.train_batch(&dataset, &mut criterion) {
            Ok(err) => err,
            Err(e) => {
                eprintln!("training failed: {e}");
                return ExitCode::FAILURE;
            }
        };
        if args.verbose {
            println!("epoch {:4}: avg squared error {err}", epoch + 1);
        }
        if !criterion.last_update() {
            break;
        }
    }

    if err <= args.sigma {
        if args.verbose {
            println!("converged: {err} <= {}", args.sigma);
        }
        ExitCode::SUCCESS
    } else {
        eprintln!("did not converge: {err} > {} after {} loops", args.sigma, args.loops);
        ExitCode::FAILURE
    }
}
