use serde::{Deserialize, Serialize};

/// CDF of Normal(mean, stdev) at `x`.
///
/// Returns 0.0 when `stdev` is not strictly positive.
pub fn normal_cdf(mean: f64, stdev: f64, x: f64) -> f64 {
    if !(stdev > 0.0) {
        return 0.0;
    }
    let z = (x - mean) / (stdev * std::f64::consts::SQRT_2);
    0.5 * libm::erfc(-z)
}

/// Normal approximation of an observed duration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gaussian {
    pub mean: f64,
    pub stdev: f64,
    pub samples: usize,
}

impl Gaussian {
    /// Model returned for keys that were never observed.
    pub const EMPTY: Gaussian = Gaussian {
        mean: 0.0,
        stdev: 0.0,
        samples: 0,
    };

    pub fn new(mean: f64, stdev: f64, samples: usize) -> Self {
        Self { mean, stdev, samples }
    }

    /// Arithmetic mean and Bessel-corrected standard deviation.
    ///
    /// A single sample has a stdev of 0. Returns `None` for an empty slice.
    pub fn fit(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len();
        let mean = samples.iter().sum::<f64>() / n as f64;

        let stdev = if n == 1 || samples.iter().all(|&s| s == samples[0]) {
            0.0
        } else {
            let sum_sq = samples
                .iter()
                .map(|&s| {
                    let diff = s - mean;
                    diff * diff
                })
                .sum::<f64>();
            (sum_sq / (n - 1) as f64).sqrt()
        };

        Some(Self::new(mean, stdev, n))
    }

    pub fn variance(&self) -> f64 {
        self.stdev * self.stdev
    }

    pub fn worst_case(&self) -> f64 {
        self.mean + self.stdev
    }

    pub fn is_degenerate(&self) -> bool {
        self.mean == 0.0 || self.stdev == 0.0
    }

    /// Probability of finishing by `deadline`.
    ///
    /// A degenerate model (no data, or no spread) counts as certain.
    pub fn probability(&self, deadline: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        normal_cdf(self.mean, self.stdev, deadline)
    }

    /// Distribution of the sum of two independent durations.
    pub fn convolve(&self, other: &Gaussian) -> Gaussian {
        Gaussian {
            mean: self.mean + other.mean,
            stdev: (self.variance() + other.variance()).sqrt(),
            samples: self.samples.min(other.samples),
        }
    }

    /// `mean ± z·stdev/√n` band around the mean estimate.
    pub fn confidence_interval(&self, z: f64, n: usize) -> ConfidenceInterval {
        let half = if n == 0 {
            0.0
        } else {
            z * self.stdev / (n as f64).sqrt()
        };
        ConfidenceInterval {
            lower: self.mean - half,
            upper: self.mean + half,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn overlaps(&self, other: &ConfidenceInterval) -> bool {
        !(self.upper < other.lower || other.upper < self.lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_fit_mean_and_bessel_stdev() {
        let g = Gaussian::fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((g.mean - 5.0).abs() < EPS);
        // Sum of squared deviations is 32, n - 1 = 7.
        assert!((g.stdev - (32.0f64 / 7.0).sqrt()).abs() < EPS);
        assert_eq!(g.samples, 8);
    }

    #[test]
    fn test_fit_identical_samples() {
        let g = Gaussian::fit(&[3.5; 10]).unwrap();
        assert_eq!(g.mean, 3.5);
        assert_eq!(g.stdev, 0.0);
        assert_eq!(g.probability(3.5), 1.0);
        assert_eq!(g.probability(100.0), 1.0);
    }

    #[test]
    fn test_fit_single_and_empty() {
        let g = Gaussian::fit(&[8.0]).unwrap();
        assert_eq!(g.stdev, 0.0);
        assert!(Gaussian::fit(&[]).is_none());
    }

    #[test]
    fn test_probability_limits() {
        let g = Gaussian::new(10.0, 2.0, 30);
        assert!((g.probability(f64::INFINITY) - 1.0).abs() < EPS);
        assert!(g.probability(f64::NEG_INFINITY).abs() < EPS);
        assert!((g.probability(10.0) - 0.5).abs() < 1e-12);
        assert!((g.probability(1e6) - 1.0).abs() < EPS);
        assert!(g.probability(-1e6) < EPS);
    }

    #[test]
    fn test_probability_known_values() {
        let g = Gaussian::new(0.5, 1.0, 10);
        // Phi(1.0) ~ 0.841344746
        assert!((g.probability(1.5) - 0.841_344_746).abs() < 1e-6);
        assert!((g.probability(-0.5) - 0.158_655_254).abs() < 1e-6);
    }

    #[test]
    fn test_empty_model_is_certain() {
        assert_eq!(Gaussian::EMPTY.probability(-5.0), 1.0);
        assert_eq!(Gaussian::EMPTY.worst_case(), 0.0);
    }

    #[test]
    fn test_normal_cdf_guards_non_positive_stdev() {
        assert_eq!(normal_cdf(1.0, 0.0, 5.0), 0.0);
        assert_eq!(normal_cdf(1.0, -2.0, 5.0), 0.0);
        assert_eq!(normal_cdf(1.0, f64::NAN, 5.0), 0.0);
    }

    #[test]
    fn test_convolve_sums_means_and_variances() {
        let a = Gaussian::new(8.0, 2.0, 10);
        let b = Gaussian::new(1.5, 1.5, 4);
        let c = a.convolve(&b);

        assert_eq!(c.mean, 9.5);
        assert!((c.variance() - (4.0 + 2.25)).abs() < EPS);
        assert_eq!(c.samples, 4);
    }

    #[test]
    fn test_confidence_interval() {
        let g = Gaussian::new(10.0, 2.0, 0);
        let ci = g.confidence_interval(1.96, 16);
        assert!((ci.lower - 9.02).abs() < EPS);
        assert!((ci.upper - 10.98).abs() < EPS);

        let point = g.confidence_interval(1.96, 0);
        assert_eq!(point.lower, 10.0);
        assert_eq!(point.upper, 10.0);
    }

    #[test]
    fn test_interval_overlap() {
        let a = ConfidenceInterval { lower: 1.0, upper: 3.0 };
        let b = ConfidenceInterval { lower: 2.5, upper: 4.0 };
        let c = ConfidenceInterval { lower: 3.5, upper: 4.0 };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
        assert!(a.overlaps(&a));
    }
}
