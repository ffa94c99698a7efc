//! Normal and binomial distribution helpers used by the audit methods.

use rla_types::AuditError;

// ── Normal distribution ─────────────────────────────────────────────

/// Standard normal survival function P(Z > z).
///
/// Abramowitz & Stegun 26.2.17, absolute error below 7.5e-8. Negative `z`
/// is handled by symmetry.
pub fn normal_sf(z: f64) -> f64 {
    if z < 0.0 {
        return 1.0 - normal_sf(-z);
    }

    let t = 1.0 / (1.0 + 0.2316419 * z);
    let d = 0.3989422804014327; // 1/sqrt(2*pi)
    let p = d * (-z * z / 2.0).exp();

    let poly = t
        * (0.319381530
            + t * (-0.356563782 + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));

    p * poly
}

/// Standard normal CDF P(Z <= z).
pub fn normal_cdf(z: f64) -> f64 {
    1.0 - normal_sf(z)
}

/// Inverse of the standard normal CDF for `p` in (0, 1).
///
/// Acklam's rational approximation, relative error below 1.2e-9.
pub fn normal_quantile(p: f64) -> Result<f64, AuditError> {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if !(p > 0.0 && p < 1.0) {
        return Err(AuditError::ArithmeticDomain(format!(
            "normal quantile of p = {p}"
        )));
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    let z = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    };
    Ok(z)
}

// ── Binomial distribution ───────────────────────────────────────────

/// Log-gamma via the Lanczos approximation (g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    let coefficients = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = coefficients[0];
    let t = x + 7.5; // g + 0.5

    for (i, &coef) in coefficients.iter().enumerate().skip(1) {
        acc += coef / (x + i as f64);
    }

    0.5 * (2.0 * std::f64::consts::PI).ln() + (t.ln() * (x + 0.5)) - t + acc.ln()
}

/// ln C(n, k). Returns negative infinity when `k > n`.
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// P(X = k) for X ~ Binomial(n, p).
pub fn binomial_pmf(k: u64, n: u64, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    if p <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p >= 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }

    let log_prob = ln_choose(n, k) + (k as f64) * p.ln() + ((n - k) as f64) * (-p).ln_1p();
    log_prob.exp()
}

/// P(X >= k) for X ~ Binomial(n, p).
///
/// Sums whichever tail lies away from the mean with the pmf ratio
/// recurrence, so terms only shrink, and stops once they no longer move
/// the sum.
pub fn binomial_sf_ge(k: u64, n: u64, p: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n || p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    let odds = p / (1.0 - p);

    if (k as f64) <= n as f64 * p {
        // 1 - P(X <= k - 1), summed downward
        let mut term = binomial_pmf(k - 1, n, p);
        let mut sum = 0.0_f64;
        let mut j = k - 1;
        loop {
            sum += term;
            if j == 0 || term < sum * 1e-17 {
                break;
            }
            term *= j as f64 / (n - j + 1) as f64 / odds;
            j -= 1;
        }
        return (1.0 - sum).clamp(0.0, 1.0);
    }

    let mut term = binomial_pmf(k, n, p);
    let mut sum = 0.0_f64;
    let mut j = k;
    loop {
        sum += term;
        if j == n || term < sum * 1e-17 {
            break;
        }
        term *= (n - j) as f64 / (j + 1) as f64 * odds;
        j += 1;
    }
    sum.clamp(0.0, 1.0)
}
