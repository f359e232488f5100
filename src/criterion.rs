//! Learning-rate criteria: small state machines deciding the step size of
//! each training round.

/// Decides the learning rate for the current step, given the current
/// squared-error metric. A returned rate of zero requests no update.
pub trait Criterion {
    /// Evaluates the error metric and returns the effective learning rate.
    fn rate(&mut self, err2: f64) -> f64;

    /// Whether the most recent [`Criterion::rate`] call requested an update.
    ///
    /// Once a constant criterion stops requesting updates for a training
    /// set, it never requests one again for that set, which makes this the
    /// natural termination witness of an epoch loop.
    fn last_update(&self) -> bool;
}

/// Fixed learning rate above an error threshold, zero below it.
#[derive(Debug, Clone)]
pub struct ConstantCriterion {
    sigma: f64,
    alpha: f64,
    updated: bool,
}

impl ConstantCriterion {
    /// Creates a criterion returning `alpha` while the squared error stays
    /// above `sigma`.
    pub fn new(sigma: f64, alpha: f64) -> Self {
        Self { sigma, alpha, updated: false }
    }
}

impl Criterion for ConstantCriterion {
    fn rate(&mut self, err2: f64) -> f64 {
        if err2 > self.sigma {
            self.updated = true;
            self.alpha
        } else {
            self.updated = false;
            0.0
        }
    }

    fn last_update(&self) -> bool {
        self.updated
    }
}

/// Learning rate that grows while the error keeps falling and shrinks when
/// it stagnates or diverges.
///
/// A convergence counter moves up on every improving step and down
/// otherwise; hitting `cmax` scales the rate by `inc_coef` and hitting
/// `cmin` scales it by `dec_coef`, resetting the counter either way.
#[derive(Debug, Clone)]
pub struct AdaptiveCriterion {
    sigma: f64,
    alpha: f64,
    cmax: i32,
    cmin: i32,
    inc_coef: f64,
    dec_coef: f64,
    counter: i32,
    last_err2: f64,
    updated: bool,
}

impl AdaptiveCriterion {
    /// Creates an adaptive criterion with the default coefficients:
    /// counter bounds ±3, increase factor 1.2, decrease factor 0.5.
    pub fn new(sigma: f64, alpha: f64) -> Self {
        Self::with_coefficients(sigma, alpha, 3, -3, 1.2, 0.5)
    }

    /// Creates an adaptive criterion with explicit counter bounds and rate
    /// coefficients.
    pub fn with_coefficients(
        sigma: f64,
        alpha: f64,
        cmax: i32,
        cmin: i32,
        inc_coef: f64,
        dec_coef: f64,
    ) -> Self {
        Self {
            sigma,
            alpha,
            cmax,
            cmin,
            inc_coef,
            dec_coef,
            counter: 0,
            last_err2: f64::INFINITY,
            updated: false,
        }
    }

    /// The current learning rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Criterion for AdaptiveCriterion {
    fn rate(&mut self, err2: f64) -> f64 {
        if err2 <= self.sigma {
            self.updated = false;
            return 0.0;
        }
        self.updated = true;

        if err2 < self.last_err2 {
            self.counter += 1;
            if self.counter >= self.cmax {
                self.counter = 0;
                self.alpha *= self.inc_coef;
            }
        } else {
            self.counter -= 1;
            if self.counter <= self.cmin {
                self.counter = 0;
                self.alpha *= self.dec_coef;
            }
        }
        self.last_err2 = err2;
        self.alpha
    }

    fn last_update(&self) -> bool {
        self.updated
    }
}
