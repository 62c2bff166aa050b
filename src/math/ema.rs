//! One-pole exponential smoothing stages.
//!
//! [`Ema`] owns only its previous output. [`SmoothedDerivative`] chains a
//! finite difference of its input into an [`Ema`], which is how the filter
//! chain builds velocity from angle and jerk from velocity.

/// One-pole exponential moving average.
///
/// `output = prior + alpha * (input - prior)`; the first input seeds the
/// state directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    /// Create an empty filter with coefficient `alpha` in `(0, 1]`.
    #[must_use]
    pub const fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    /// Feed one input, returning the new output.
    pub fn update(&mut self, input: f64) -> f64 {
        let next = match self.value {
            Some(prior) => prior + self.alpha * (input - prior),
            None => input,
        };
        self.value = Some(next);
        next
    }

    /// Current output, `None` until the first input.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    /// Smoothing coefficient.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forget the previous output.
    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Smoothed rate of change of a signal.
///
/// Remembers the previous input; each later input yields
/// `(input - previous) / dt`, which is then smoothed. The very first input
/// only primes the difference and produces no output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedDerivative {
    last_input: Option<f64>,
    ema: Ema,
}

impl SmoothedDerivative {
    /// Create an empty stage smoothing with coefficient `alpha`.
    #[must_use]
    pub const fn new(alpha: f64) -> Self {
        Self {
            last_input: None,
            ema: Ema::new(alpha),
        }
    }

    /// Feed one input sampled `dt` seconds after the previous one.
    ///
    /// Returns the smoothed derivative, or `None` while unprimed.
    pub fn update(&mut self, input: f64, dt: f64) -> Option<f64> {
        let out = self
            .last_input
            .map(|prev| self.ema.update((input - prev) / dt));
        self.last_input = Some(input);
        out
    }

    /// Current smoothed derivative.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.ema.value()
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.last_input = None;
        self.ema.reset();
    }
}
