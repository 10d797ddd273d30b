//! C5: the boxed numeric value. Arithmetic, comparison, conversion, and
//! string rendering all derive a result unit via `numerobis_units`'
//! constructors and, where needed, evaluate it via the three-mode
//! evaluator.

use std::cmp::Ordering;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use numerobis_units::{
    eval_unit, format_scalar, format_unit, one, power, product_of, reduce_to_scalar, scalar,
    simplify, EvalMode, Unit, UnitNode, UnitTables,
};

use crate::error::RuntimeError;

/// A boxed, immutable numeric value. The variant tag doubles as the
/// `kind` field of spec §3's data model; a struct with a separate `kind`
/// enum would only duplicate what the tag already encodes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Number {
    Int64 { value: i64, unit: Unit },
    Double { value: f64, unit: Unit },
}

fn is_one(unit: &Unit) -> bool {
    matches!(unit.as_ref(), UnitNode::One)
}

impl Number {
    #[must_use]
    pub fn int(value: i64, unit: Unit) -> Self {
        Number::Int64 { value, unit }
    }

    #[must_use]
    pub fn float(value: f64, unit: Unit) -> Self {
        Number::Double { value, unit }
    }

    #[must_use]
    pub fn unit(&self) -> &Unit {
        match self {
            Number::Int64 { unit, .. } | Number::Double { unit, .. } => unit,
        }
    }

    #[must_use]
    pub fn is_double(&self) -> bool {
        matches!(self, Number::Double { .. })
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int64 { value, .. } => *value as f64,
            Number::Double { value, .. } => *value,
        }
    }

    fn both_int(a: &Number, b: &Number) -> bool {
        matches!((a, b), (Number::Int64 { .. }, Number::Int64 { .. }))
    }
}

fn combine(
    a: &Number,
    b: &Number,
    unit: Unit,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> Number {
    if let (Number::Int64 { value: x, .. }, Number::Int64 { value: y, .. }) = (a, b) {
        Number::Int64 {
            value: int_op(*x, *y),
            unit,
        }
    } else {
        Number::Double {
            value: float_op(a.as_f64(), b.as_f64()),
            unit,
        }
    }
}

/// `a + b`: wrapping for `Int64`, left unit preserved.
#[must_use]
pub fn add(a: &Number, b: &Number) -> Number {
    combine(a, b, a.unit().clone(), i64::wrapping_add, |x, y| x + y)
}

/// `a - b`: wrapping for `Int64`, left unit preserved.
#[must_use]
pub fn sub(a: &Number, b: &Number) -> Number {
    combine(a, b, a.unit().clone(), i64::wrapping_sub, |x, y| x - y)
}

/// `a * b`: wrapping for `Int64`; unit is `One` iff both operands are
/// dimensionless, else `Product(ua, ub)` simplified.
#[must_use]
pub fn mul(a: &Number, b: &Number) -> Number {
    let unit = derived_unit_product(a.unit(), b.unit());
    combine(a, b, unit, i64::wrapping_mul, |x, y| x * y)
}

fn derived_unit_product(ua: &Unit, ub: &Unit) -> Unit {
    if is_one(ua) && is_one(ub) {
        one()
    } else {
        simplify(&product_of([ua.clone(), ub.clone()]))
    }
}

/// `a / b`: truncating for `Int64`; unit is `One` iff both operands are
/// dimensionless, else `Product(ua, Power(ub, Scalar(-1)))` simplified.
///
/// # Errors
///
/// Returns [`RuntimeError::IntegerDivisionByZero`] for `Int64 / Int64` with
/// a zero divisor; this is the one arithmetic operator that can fail under
/// the error taxonomy of spec §7 category (a) rather than wrap or panic.
pub fn div(a: &Number, b: &Number) -> Result<Number, RuntimeError> {
    let unit = if is_one(a.unit()) && is_one(b.unit()) {
        one()
    } else {
        simplify(&product_of([
            a.unit().clone(),
            power(b.unit().clone(), scalar(-1.0)),
        ]))
    };
    if Number::both_int(a, b) {
        let (x, y) = match (a, b) {
            (Number::Int64 { value: x, .. }, Number::Int64 { value: y, .. }) => (*x, *y),
            _ => unreachable!(),
        };
        if y == 0 {
            return Err(RuntimeError::IntegerDivisionByZero);
        }
        Ok(Number::Int64 {
            value: x.wrapping_div(y),
            unit,
        })
    } else {
        Ok(Number::Double {
            value: a.as_f64() / b.as_f64(),
            unit,
        })
    }
}

/// `a ^ b`: computed via `f64::powf` and cast back for `Int64`, per spec
/// §4.5 — this silently loses precision for large integer exponents; kept
/// as the source does it rather than implementing checked integer `pow`.
///
/// The result unit is always `Power(ua, exponent)` simplified: when `b` is
/// itself dimensionless (`ub == One`, the common case for a literal
/// exponent), `exponent` is `b`'s own numeric value as a `Scalar`, not `b`'s
/// unit — `int(2, m)^int(3, One)` must carry `Power(m, Scalar(3))`, per spec
/// §8, not bare `m`.
#[must_use]
pub fn pow(a: &Number, b: &Number) -> Number {
    let exponent = if is_one(b.unit()) {
        scalar(b.as_f64())
    } else {
        b.unit().clone()
    };
    let unit = simplify(&power(a.unit().clone(), exponent));
    let result = a.as_f64().powf(b.as_f64());
    if Number::both_int(a, b) {
        Number::Int64 {
            value: result as i64,
            unit,
        }
    } else {
        Number::Double {
            value: result,
            unit,
        }
    }
}

/// `a % b`: computed via `f64`'s `%` (equivalent to `fmod`) and cast back
/// for `Int64`, left unit preserved.
#[must_use]
pub fn rem(a: &Number, b: &Number) -> Number {
    let result = a.as_f64() % b.as_f64();
    if Number::both_int(a, b) {
        Number::Int64 {
            value: result as i64,
            unit: a.unit().clone(),
        }
    } else {
        Number::Double {
            value: result,
            unit: a.unit().clone(),
        }
    }
}

fn delta(a: &Number, b: &Number, tables: &dyn UnitTables, f: impl Fn(f64, f64) -> f64) -> Number {
    let left_unit = a.unit().clone();
    let xa = reduce_to_scalar(&left_unit, a.as_f64(), tables);
    let xb = reduce_to_scalar(&left_unit, b.as_f64(), tables);
    let combined = f(xa, xb);
    let value = eval_unit(&left_unit, combined, EvalMode::Normal, tables);
    if Number::both_int(a, b) {
        Number::Int64 {
            value: value as i64,
            unit: left_unit,
        }
    } else {
        Number::Double {
            value,
            unit: left_unit,
        }
    }
}

/// `a |+| b`: reduce both operands to the left unit's natural scalar, add,
/// re-apply the left unit's normal evaluation. For affine units (e.g.
/// Celsius/Fahrenheit) where ordinary `+` is ill-defined.
#[must_use]
pub fn dadd(a: &Number, b: &Number, tables: &dyn UnitTables) -> Number {
    delta(a, b, tables, |x, y| x + y)
}

/// `a |-| b`: the subtractive counterpart of [`dadd`].
#[must_use]
pub fn dsub(a: &Number, b: &Number, tables: &dyn UnitTables) -> Number {
    delta(a, b, tables, |x, y| x - y)
}

#[must_use]
pub fn neg(a: &Number) -> Number {
    match a {
        Number::Int64 { value, unit } => Number::Int64 {
            value: value.wrapping_neg(),
            unit: unit.clone(),
        },
        Number::Double { value, unit } => Number::Double {
            value: -value,
            unit: unit.clone(),
        },
    }
}

/// Three-way comparison. Same kind compares directly; mixed kinds cast the
/// `Int64` side to `f64`. NaN compares equal (`Ordering::Equal`), matching
/// the source's documented (and slightly surprising) choice — see the
/// design notes. Comparisons do **not** convert units between operands;
/// that is left to the compiler, per spec §9.
#[must_use]
pub fn cmp(a: &Number, b: &Number) -> Ordering {
    if let (Number::Int64 { value: x, .. }, Number::Int64 { value: y, .. }) = (a, b) {
        return x.cmp(y);
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    if x.is_nan() || y.is_nan() {
        return Ordering::Equal;
    }
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

#[must_use]
pub fn lt(a: &Number, b: &Number) -> bool {
    cmp(a, b) == Ordering::Less
}
#[must_use]
pub fn le(a: &Number, b: &Number) -> bool {
    cmp(a, b) != Ordering::Greater
}
#[must_use]
pub fn gt(a: &Number, b: &Number) -> bool {
    cmp(a, b) == Ordering::Greater
}
#[must_use]
pub fn ge(a: &Number, b: &Number) -> bool {
    cmp(a, b) != Ordering::Less
}
#[must_use]
pub fn eq(a: &Number, b: &Number) -> bool {
    cmp(a, b) == Ordering::Equal
}

/// Reduce `self` to the scalar it would have under `target_unit`, and
/// return a number carrying `target_unit`, preserving `self`'s kind.
///
/// Spec's §9 open question: the source gates the conversion branch on
/// `target_unit.kind == One`, which reads as inverted (you convert *to* a
/// unit, not away from one) and is never exercised for a real target. We
/// implement the general formula unconditionally — the ratio the source
/// computes from `self.unit` alone, independent of `target_unit` — and
/// carry `target_unit` purely as the result's label, exactly as the
/// source's inner computation does.
#[must_use]
pub fn convert(a: &Number, target_unit: Unit, tables: &dyn UnitTables) -> Number {
    let value = reduce_to_scalar(a.unit(), a.as_f64(), tables);
    match a {
        Number::Int64 { .. } => Number::Int64 {
            value: value as i64,
            unit: target_unit,
        },
        Number::Double { .. } => Number::Double {
            value,
            unit: target_unit,
        },
    }
}

/// Render `self` the way `echo` would: reduce to the natural scalar of its
/// own unit, format with `%g`-like rules, and append the unit's printed
/// form if non-empty.
#[must_use]
pub fn to_display_string(a: &Number, tables: &dyn UnitTables) -> String {
    let reduced = reduce_to_scalar(a.unit(), a.as_f64(), tables);
    let number_part = format_scalar(reduced);
    let unit_part = format_unit(a.unit());
    if unit_part.is_empty() {
        number_part
    } else {
        format!("{number_part} {unit_part}")
    }
}
