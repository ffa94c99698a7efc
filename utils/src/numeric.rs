//! Checked floating-point helpers.
//!
//! Audit formulas take logarithms and ratios of quantities that can leave
//! their domain on unusual inputs (a zero margin, a taint of one). These
//! helpers turn such cases into [`AuditError::ArithmeticDomain`] instead of
//! letting NaN or infinity flow into a p-value.

use rla_types::AuditError;

/// Natural log of a strictly positive, finite value.
pub fn checked_ln(x: f64, what: &str) -> Result<f64, AuditError> {
    if x > 0.0 && x.is_finite() {
        Ok(x.ln())
    } else {
        Err(AuditError::ArithmeticDomain(format!("ln of {what} = {x}")))
    }
}

/// `num / den`, rejecting a zero denominator and non-finite results.
pub fn checked_div(num: f64, den: f64, what: &str) -> Result<f64, AuditError> {
    if den == 0.0 {
        return Err(AuditError::ArithmeticDomain(format!("{what}: division by zero")));
    }
    let q = num / den;
    if q.is_finite() {
        Ok(q)
    } else {
        Err(AuditError::ArithmeticDomain(format!("{what}: {num} / {den} is not finite")))
    }
}

/// Square root of a non-negative, finite value.
pub fn checked_sqrt(x: f64, what: &str) -> Result<f64, AuditError> {
    if x >= 0.0 && x.is_finite() {
        Ok(x.sqrt())
    } else {
        Err(AuditError::ArithmeticDomain(format!("sqrt of {what} = {x}")))
    }
}
