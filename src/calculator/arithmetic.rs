//! Basic arithmetic primitives

use crate::error::{Result, StatsError};
use crate::types::Metric;
use std::ops::Mul;

/// Sum of two counts; overflow is an error rather than a wrap or panic
pub fn add(a: i32, b: i32) -> Result<i32> {
    a.checked_add(b).ok_or_else(|| {
        StatsError::ArithmeticOverflow {
            operation: "+",
            a,
            b,
        }
        .into()
    })
}

pub fn subtract(a: i32, b: i32) -> Result<i32> {
    a.checked_sub(b).ok_or_else(|| {
        StatsError::ArithmeticOverflow {
            operation: "-",
            a,
            b,
        }
        .into()
    })
}

pub fn multiply<T: Mul<Output = T>>(a: T, b: T) -> T {
    a * b
}

/// Quotient of two numbers, or `Metric::Undefined` when the denominator is zero
pub fn divide(numerator: f64, denominator: f64) -> Metric {
    if denominator == 0.0 {
        Metric::Undefined
    } else {
        Metric::Defined(numerator / denominator)
    }
}
