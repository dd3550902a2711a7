//! Small numerically-stable math utilities used across the distribution families.

use std::f64::consts::SQRT_2;

use rand::RngCore;
use rand_distr::{Distribution, Open01, StandardNormal};

/// `-0.5 * ln(2π)`
pub const LOG_INV_SQRT_2PI: f64 = -0.918_938_533_204_672_7;

/// Below this `z` the lower-tail Mills ratio switches to its asymptotic series.
const MILLS_ASYMPTOTIC_Z: f64 = -30.0;

/// Above this `ln p` the quantile is taken directly from `p`, which is still a normal float.
const LOG_QUANTILE_DIRECT: f64 = -700.0;

/// Stable `log(exp(a) + exp(b))`.
#[inline]
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    let m = a.max(b);
    if m == f64::NEG_INFINITY {
        return m;
    }
    m + ((a - m).exp() + (b - m).exp()).ln()
}

/// Log-PDF of the standard normal at `z`.
#[inline]
pub fn standard_normal_logpdf(z: f64) -> f64 {
    LOG_INV_SQRT_2PI - 0.5 * z * z
}

/// PDF of the standard normal at `z`.
#[inline]
pub fn standard_normal_pdf(z: f64) -> f64 {
    standard_normal_logpdf(z).exp()
}

/// Standard normal CDF `Φ(z)`, accurate deep into the lower tail.
#[inline]
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * statrs::function::erf::erfc(-z / SQRT_2)
}

/// Standard normal quantile `Φ⁻¹(p)`.
///
/// Returns `-inf` at `p = 0` and `+inf` at `p = 1`; `NaN` outside `[0, 1]`.
#[inline]
pub fn standard_normal_quantile(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    -SQRT_2 * statrs::function::erf::erfc_inv(2.0 * p)
}

/// Stable `log(exp(a) - exp(b))` for `a >= b`.
#[inline]
pub fn log_diff_exp(a: f64, b: f64) -> f64 {
    if b == f64::NEG_INFINITY {
        return a;
    }
    let d = b - a;
    // ln(1 - e^d), d <= 0
    let log1m = if d > -std::f64::consts::LN_2 { (-d.exp_m1()).ln() } else { (-d.exp()).ln_1p() };
    a + log1m
}

/// Lower-tail Mills ratio `Φ(z) / φ(z)`.
///
/// Deep in the lower tail both factors underflow, so the asymptotic series
/// `-(1/z) (1 - 1/z² + 3/z⁴ - 15/z⁶ + 105/z⁸)` is used instead.
pub fn standard_normal_mills(z: f64) -> f64 {
    if z < MILLS_ASYMPTOTIC_Z {
        let w = 1.0 / (z * z);
        -(1.0 / z) * (1.0 + w * (-1.0 + w * (3.0 + w * (-15.0 + w * 105.0))))
    } else {
        standard_normal_cdf(z) / standard_normal_pdf(z)
    }
}

/// `ln Φ(z)`, finite for every finite `z`.
pub fn log_standard_normal_cdf(z: f64) -> f64 {
    if z > 0.0 {
        (-standard_normal_cdf(-z)).ln_1p()
    } else if z < MILLS_ASYMPTOTIC_Z {
        standard_normal_logpdf(z) + standard_normal_mills(z).ln()
    } else {
        standard_normal_cdf(z).ln()
    }
}

/// Standard normal quantile from a log-probability, `Φ⁻¹(exp(log_p))`.
///
/// Once `exp(log_p)` would underflow, `ln Φ(z) = log_p` is solved by Newton's method.
/// `ln Φ` is increasing and concave, so the iterates approach the root from below.
pub fn standard_normal_log_quantile(log_p: f64) -> f64 {
    if log_p.is_nan() || log_p > 0.0 {
        return f64::NAN;
    }
    if log_p > LOG_QUANTILE_DIRECT {
        return standard_normal_quantile(log_p.exp());
    }
    if log_p == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    // ln Φ(z) ≈ -z²/2 - ln(-z) - ln(2π)/2
    let q = -2.0 * log_p;
    let mut z = -(q - (2.0 * std::f64::consts::PI).ln() - q.ln()).sqrt();
    for _ in 0..64 {
        let step = (log_standard_normal_cdf(z) - log_p) * standard_normal_mills(z);
        z -= step;
        if step.abs() <= 1e-14 * z.abs() {
            break;
        }
    }
    z
}

/// `Φ(b) - Φ(a)` for `a <= b`, evaluated on whichever tail keeps precision.
#[inline]
pub fn standard_normal_interval(a: f64, b: f64) -> f64 {
    if a > 0.0 {
        standard_normal_cdf(-a) - standard_normal_cdf(-b)
    } else {
        standard_normal_cdf(b) - standard_normal_cdf(a)
    }
}

/// `ln(Φ(b) - Φ(a))` for `a <= b`.
///
/// Intervals lying entirely in one tail are evaluated in log space, so the result stays
/// finite however far out the bounds are.
pub fn log_standard_normal_interval(a: f64, b: f64) -> f64 {
    if a > 0.0 {
        log_diff_exp(log_standard_normal_cdf(-a), log_standard_normal_cdf(-b))
    } else if b < 0.0 {
        log_diff_exp(log_standard_normal_cdf(b), log_standard_normal_cdf(a))
    } else {
        standard_normal_interval(a, b).ln()
    }
}

/// Exponentially scaled modified Bessel function of the first kind, order 0:
/// `i0e(x) = exp(-|x|) I0(x)`.
///
/// Polynomial approximations (Abramowitz & Stegun 9.8.1, 9.8.2), relative error
/// below `2e-7`, which is below the `f32` resolution of every consumer.
pub fn bessel_i0e(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let t = x / 3.75;
        let t2 = t * t;
        let i0 = 1.0
            + t2 * (3.515_622_9
                + t2 * (3.089_942_4
                    + t2 * (1.206_749_2 + t2 * (0.265_973_2 + t2 * (0.036_076_8 + t2 * 0.004_581_3)))));
        i0 * (-ax).exp()
    } else {
        let t = 3.75 / ax;
        let p = 0.398_942_28
            + t * (0.013_285_92
                + t * (0.002_253_19
                    + t * (-0.001_575_65
                        + t * (0.009_162_81
                            + t * (-0.020_577_06
                                + t * (0.026_355_37 + t * (-0.016_476_33 + t * 0.003_923_77)))))));
        p / ax.sqrt()
    }
}

/// Exponentially scaled modified Bessel function of the first kind, order 1:
/// `i1e(x) = exp(-|x|) I1(x)`.
///
/// Polynomial approximations (Abramowitz & Stegun 9.8.3, 9.8.4). Odd in `x`.
pub fn bessel_i1e(x: f64) -> f64 {
    let ax = x.abs();
    let value = if ax < 3.75 {
        let t = x / 3.75;
        let t2 = t * t;
        let i1_over_x = 0.5
            + t2 * (0.878_905_94
                + t2 * (0.514_988_69
                    + t2 * (0.150_849_34
                        + t2 * (0.026_587_33 + t2 * (0.003_015_32 + t2 * 0.000_324_11)))));
        ax * i1_over_x * (-ax).exp()
    } else {
        let t = 3.75 / ax;
        let p = 0.398_942_28
            + t * (-0.039_880_24
                + t * (-0.003_620_18
                    + t * (0.001_638_01
                        + t * (-0.010_315_55
                            + t * (0.022_829_67
                                + t * (-0.028_953_12 + t * (0.017_876_54 - t * 0.004_200_59)))))));
        p / ax.sqrt()
    };
    if x < 0.0 { -value } else { value }
}

/// Uniform variate on the open interval `(0, 1)`.
#[inline]
pub fn u01(rng: &mut dyn RngCore) -> f64 {
    Open01.sample(rng)
}

/// Standard normal variate.
#[inline]
pub fn standard_normal_draw(rng: &mut dyn RngCore) -> f64 {
    StandardNormal.sample(rng)
}
