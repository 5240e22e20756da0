//! Sample L-moments from unbiased probability-weighted moments.
//!
//! Only finite observations count. Fewer than four of them yields the
//! all-zero summary: small graphs do not support shape estimates, and the
//! table still needs a numeric cell.

use serde::{Deserialize, Serialize};

/// Minimum finite observations for a non-degenerate summary.
pub const MIN_OBSERVATIONS: usize = 4;

/// First two L-moments and the two L-moment ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LMomentSummary {
    /// Location (sample mean)
    pub l1: f64,
    /// Scale (half the Gini mean difference)
    pub l2: f64,
    /// L-skewness, L3 / L2
    pub t3: f64,
    /// L-kurtosis, L4 / L2
    pub t4: f64,
}

impl LMomentSummary {
    pub const DEGENERATE: LMomentSummary = LMomentSummary {
        l1: 0.0,
        l2: 0.0,
        t3: 0.0,
        t4: 0.0,
    };

    pub fn to_array(&self) -> [f64; 4] {
        [self.l1, self.l2, self.t3, self.t4]
    }
}

/// Estimate the summary for `values`, ignoring NaN and infinities.
pub fn lmoments(values: &[f64]) -> LMomentSummary {
    let mut x: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if x.len() < MIN_OBSERVATIONS {
        return LMomentSummary::DEGENERATE;
    }
    x.sort_by(|a, b| a.total_cmp(b));
    if x[0] == x[x.len() - 1] {
        // Constant sample: scale and both ratios are exactly zero.
        return LMomentSummary {
            l1: x[0],
            ..LMomentSummary::DEGENERATE
        };
    }

    let [b0, b1, b2, b3] = pwm(&x);
    let l1 = b0;
    let l2 = 2.0 * b1 - b0;
    let l3 = 6.0 * b2 - 6.0 * b1 + b0;
    let l4 = 20.0 * b3 - 30.0 * b2 + 12.0 * b1 - b0;

    let (t3, t4) = if l2 == 0.0 { (0.0, 0.0) } else { (l3 / l2, l4 / l2) };
    LMomentSummary { l1, l2, t3, t4 }
}

/// b0..b3 over ascending `x` (len >= 4): b_r = mean of C(i, r) / C(n-1, r) * x_(i).
fn pwm(x: &[f64]) -> [f64; 4] {
    let n = x.len() as f64;
    let mut b = [0.0f64; 4];
    for (i, &v) in x.iter().enumerate() {
        let i = i as f64;
        // Ratios of falling factorials; the binomial denominators cancel.
        let w1 = i / (n - 1.0);
        let w2 = w1 * (i - 1.0) / (n - 2.0);
        let w3 = w2 * (i - 2.0) / (n - 3.0);
        b[0] += v;
        b[1] += w1 * v;
        b[2] += w2 * v;
        b[3] += w3 * v;
    }
    b.map(|s| s / n)
}
