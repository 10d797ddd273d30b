//! C6: the boxed value union and its capability-table dispatch shim.
//!
//! `Value` is the tagged union over every runtime type the compiler can
//! produce (spec §3). Only `Number` is in core scope; the remaining variants
//! are carried to the depth needed to exercise the shared indexing/slicing
//! helpers and the truthiness/string-conversion dispatch the spec calls out
//! explicitly (§4.6) — not as a full standalone value system.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use numerobis_units::UnitTables;

use crate::error::RuntimeError;
use crate::number::{self, Number};
use crate::registry::ExternFn;

/// A distinguished sentinel for an omitted slice bound, per spec §4.6
/// (`None` sentinel).
pub type SliceBound = Option<i64>;

#[derive(Clone)]
pub enum Value {
    Number(Number),
    Bool(bool),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Range { start: i64, stop: i64, step: i64 },
    Closure(Rc<ClosureValue>),
    ExternFn(ExternFn),
    None,
}

/// Enough of a closure to carry a name for diagnostics and printing; the
/// actual captured environment and code pointer are compiler-owned and out
/// of scope here, mirroring the spec's "closures ... except where they
/// intersect the numeric core" carve-out.
pub struct ClosureValue {
    pub name: Rc<str>,
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n:?})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(l) => write!(f, "List(len={})", l.len()),
            Value::Range { start, stop, step } => write!(f, "Range({start}, {stop}, {step})"),
            Value::Closure(c) => write!(f, "Closure({})", c.name),
            Value::ExternFn(_) => write!(f, "ExternFn"),
            Value::None => write!(f, "None"),
        }
    }
}

/// Thread-local re-entrancy flag (spec §5): while set, the stringifier knows
/// it is rendering an element nested inside a list/collection, and quotes
/// `Str` values (`"x"`) rather than printing them bare (`x`).
thread_local! {
    static QUOTING_DEPTH: Cell<u32> = const { Cell::new(0) };
}

fn with_quoting<R>(f: impl FnOnce() -> R) -> R {
    QUOTING_DEPTH.with(|d| d.set(d.get() + 1));
    let result = f();
    QUOTING_DEPTH.with(|d| d.set(d.get() - 1));
    result
}

fn is_quoting() -> bool {
    QUOTING_DEPTH.with(|d| d.get() > 0)
}

impl Value {
    /// `__bool__`: every variant's truthiness, per the capability-table
    /// dispatch of spec §4.6.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => n.as_f64() != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Range { start, stop, step } => range_len(*start, *stop, *step) != 0,
            Value::Closure(_) | Value::ExternFn(_) => true,
            Value::None => false,
        }
    }

    /// `len`: defined for `Str`, `List`, `Range`; anything else is a
    /// compiler-side type error, category (b) of spec §7.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::Str(s) => s.chars().count(),
            Value::List(l) => l.len(),
            Value::Range { start, stop, step } => range_len(*start, *stop, *step),
            _ => unreachable!("len() called on a value with no length"),
        }
    }

    /// `__str__`, with the thread-local quoting flag applied to `Str`
    /// elements nested inside a `List`.
    #[must_use]
    pub fn to_display_string(&self, tables: &dyn UnitTables) -> String {
        match self {
            Value::Number(n) => number::to_display_string(n, tables),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => {
                if is_quoting() {
                    format!("{s:?}")
                } else {
                    s.to_string()
                }
            }
            Value::List(items) => {
                let rendered: Vec<String> =
                    with_quoting(|| items.iter().map(|v| v.to_display_string(tables)).collect());
                format!("[{}]", rendered.join(", "))
            }
            Value::Range { start, stop, step } => format!("{start}..{stop}..{step}"),
            Value::Closure(c) => format!("<closure {}>", c.name),
            Value::ExternFn(_) => "<extern fn>".to_string(),
            Value::None => "None".to_string(),
        }
    }

    /// `__int__`: coerce to an `i64`. Defined for `Number` (truncating) and
    /// `Str` (base-10 parse); anything else is a compiler-side type error,
    /// category (b) of spec §7.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::IntParseFailure`] (code 301) when a `Str`
    /// does not parse as a base-10 integer.
    pub fn to_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.as_f64() as i64),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| RuntimeError::IntParseFailure { text: s.to_string() }),
            _ => unreachable!("__int__ called on a value with no integer conversion"),
        }
    }

    /// `__float__`: coerce to an `f64`. Defined for `Number` and `Str`;
    /// anything else is a compiler-side type error, category (b) of spec §7.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::IntParseFailure`] when a `Str` does not parse
    /// as a float (the spec only names the integer-parse error code 301; a
    /// malformed float literal reuses it rather than inventing an unnamed
    /// one).
    pub fn to_float(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.as_f64()),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| RuntimeError::IntParseFailure { text: s.to_string() }),
            _ => unreachable!("__float__ called on a value with no float conversion"),
        }
    }

    /// `getitem(v, idx)`: the embedding ABI's indexing dispatcher (spec §6).
    /// Defined for `Str` and `List`; anything else is a compiler-side type
    /// error, category (b) of spec §7.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::StringIndexOutOfRange`] / `ListIndexOutOfRange`
    /// when `idx` resolves outside `[0, len)`.
    pub fn getitem(&self, idx: i64) -> Result<Value, RuntimeError> {
        match self {
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let resolved = normalize_index(idx, chars.len());
                if resolved < 0 {
                    return Err(RuntimeError::StringIndexOutOfRange {
                        index: idx,
                        len: chars.len(),
                    });
                }
                Ok(Value::Str(chars[resolved as usize].to_string().into()))
            }
            Value::List(items) => {
                let resolved = normalize_index(idx, items.len());
                if resolved < 0 {
                    return Err(RuntimeError::ListIndexOutOfRange {
                        index: idx,
                        len: items.len(),
                    });
                }
                Ok(items[resolved as usize].clone())
            }
            _ => unreachable!("getitem() called on a value that is not indexable"),
        }
    }

    /// `getslice(v, start, stop, step)`: the embedding ABI's slicing
    /// dispatcher. Defined for `Str` and `List`; out-of-range bounds clamp
    /// rather than error (spec §4.6), so this never fails.
    #[must_use]
    pub fn getslice(&self, start: SliceBound, stop: SliceBound, step: SliceBound) -> Value {
        match self {
            Value::Str(s) => {
                let slice = normalize_slice(s.chars().count(), start, stop, step);
                Value::Str(slice_str(s, slice).into())
            }
            Value::List(items) => {
                let slice = normalize_slice(items.len(), start, stop, step);
                Value::List(Rc::new(slice_list(items, slice)))
            }
            _ => unreachable!("getslice() called on a value that is not sliceable"),
        }
    }
}

fn range_len(start: i64, stop: i64, step: i64) -> usize {
    if step == 0 {
        return 0;
    }
    if (step > 0 && start >= stop) || (step < 0 && start <= stop) {
        return 0;
    }
    let span = (stop - start).unsigned_abs();
    let stride = step.unsigned_abs();
    ((span + stride - 1) / stride) as usize
}

/// Resolve a possibly-negative index against `len`, returning the in-range
/// `[0, len)` offset, or `-1` to signal "out of range" (spec §4.6: error 901
/// for lists, 902 for strings — the caller picks the code).
#[must_use]
pub fn normalize_index(i: i64, len: usize) -> i64 {
    let len = len as i64;
    let resolved = if i < 0 { i + len } else { i };
    if resolved < 0 || resolved >= len {
        -1
    } else {
        resolved
    }
}

/// A resolved, end-exclusive slice range plus its step, ready to drive a
/// `step`-strided walk from `start` towards (but not including) `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSlice {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

/// Fill in omitted slice bounds and clamp to `[0, len]` (forward step) or
/// `[-1, len-1]` (backward step), per spec §4.6. Step `0` yields an empty
/// slice (`start == stop`).
#[must_use]
pub fn normalize_slice(len: usize, start: SliceBound, stop: SliceBound, step: SliceBound) -> ResolvedSlice {
    let len = len as i64;
    let step = step.unwrap_or(1);
    if step == 0 {
        return ResolvedSlice { start: 0, stop: 0, step: 0 };
    }

    let resolve = |i: i64| -> i64 { if i < 0 { i + len } else { i } };

    if step > 0 {
        let lo = 0;
        let hi = len;
        let start = start.map(resolve).unwrap_or(0).clamp(lo, hi);
        let stop = stop.map(resolve).unwrap_or(len).clamp(lo, hi);
        ResolvedSlice { start, stop, step }
    } else {
        let lo = -1;
        let hi = len - 1;
        let start = start.map(resolve).unwrap_or(len - 1).clamp(lo, hi);
        let stop = stop.map(resolve).unwrap_or(-1).clamp(lo, hi);
        ResolvedSlice { start, stop, step }
    }
}

/// Materialize a string slice from a `ResolvedSlice`, walking by `step`
/// from `start` up to (not including) `stop`.
#[must_use]
pub fn slice_str(s: &str, slice: ResolvedSlice) -> String {
    let chars: Vec<char> = s.chars().collect();
    walk_slice(chars.len(), slice)
        .map(|i| chars[i as usize])
        .collect()
}

/// Materialize a list slice from a `ResolvedSlice`.
#[must_use]
pub fn slice_list(items: &[Value], slice: ResolvedSlice) -> Vec<Value> {
    walk_slice(items.len(), slice)
        .map(|i| items[i as usize].clone())
        .collect()
}

fn walk_slice(len: usize, slice: ResolvedSlice) -> impl Iterator<Item = i64> {
    let ResolvedSlice { mut start, stop, step } = slice;
    let len = len as i64;
    std::iter::from_fn(move || {
        if step == 0 {
            return None;
        }
        let in_range = if step > 0 { start < stop } else { start > stop };
        if !in_range || start < 0 || start >= len {
            return None;
        }
        let current = start;
        start += step;
        Some(current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_index_wraps() {
        assert_eq!(normalize_index(-1, 3), 2);
    }

    #[test]
    fn out_of_range_index_signals_error() {
        assert_eq!(normalize_index(5, 3), -1);
        assert_eq!(normalize_index(-4, 3), -1);
    }

    #[test]
    fn full_reverse_slice_reverses_string() {
        let slice = normalize_slice(6, None, None, Some(-1));
        assert_eq!(slice_str("abcdef", slice), "fedcba");
    }

    #[test]
    fn forward_slice_with_bounds() {
        let slice = normalize_slice(6, Some(1), Some(4), None);
        assert_eq!(slice_str("abcdef", slice), "bcd");
    }

    #[test]
    fn forward_slice_with_step() {
        let slice = normalize_slice(6, Some(1), Some(4), Some(2));
        assert_eq!(slice_str("abcdef", slice), "bd");
    }

    #[test]
    fn zero_step_is_empty() {
        let slice = normalize_slice(6, None, None, Some(0));
        assert_eq!(slice_str("abcdef", slice), "");
    }

    #[test]
    fn list_negative_index_wraps() {
        let items = vec![
            Value::Number(Number::int(1, numerobis_units::one())),
            Value::Number(Number::int(2, numerobis_units::one())),
            Value::Number(Number::int(3, numerobis_units::one())),
        ];
        let idx = normalize_index(-1, items.len());
        assert_eq!(idx, 2);
        assert!(matches!(&items[idx as usize], Value::Number(n) if n.as_f64() == 3.0));
    }

    #[test]
    fn empty_list_is_falsy() {
        assert!(!Value::List(Rc::new(Vec::new())).truthy());
    }

    #[test]
    fn none_is_falsy() {
        assert!(!Value::None.truthy());
    }

    #[test]
    fn string_negative_getitem_matches_spec_example() {
        let s = Value::Str("abc".into());
        let got = s.getitem(-1).unwrap();
        assert!(matches!(got, Value::Str(c) if &*c == "c"));
    }

    #[test]
    fn list_negative_getitem_matches_spec_example() {
        let one = numerobis_units::one();
        let list = Value::List(Rc::new(vec![
            Value::Number(Number::int(1, one.clone())),
            Value::Number(Number::int(2, one.clone())),
            Value::Number(Number::int(3, one)),
        ]));
        let got = list.getitem(-1).unwrap();
        assert!(matches!(got, Value::Number(n) if n.as_f64() == 3.0));
    }

    #[test]
    fn list_out_of_range_getitem_is_901() {
        let list = Value::List(Rc::new(vec![Value::None]));
        let err = list.getitem(5).unwrap_err();
        assert_eq!(err.code(), 901);
    }

    #[test]
    fn string_out_of_range_getitem_is_902() {
        let s = Value::Str("ab".into());
        let err = s.getitem(9).unwrap_err();
        assert_eq!(err.code(), 902);
    }

    #[test]
    fn string_to_int_parses_base_ten() {
        let s = Value::Str("42".into());
        assert_eq!(s.to_int().unwrap(), 42);
    }

    #[test]
    fn string_to_int_failure_is_301() {
        let s = Value::Str("not a number".into());
        let err = s.to_int().unwrap_err();
        assert_eq!(err.code(), 301);
    }

    #[test]
    fn number_to_int_truncates() {
        let n = Value::Number(Number::float(3.7, numerobis_units::one()));
        assert_eq!(n.to_int().unwrap(), 3);
    }

    #[test]
    fn string_to_float_parses() {
        let s = Value::Str("3.5".into());
        assert!((s.to_float().unwrap() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn getslice_dispatches_through_value() {
        let s = Value::Str("abcdef".into());
        let got = s.getslice(None, None, Some(-1));
        assert!(matches!(got, Value::Str(c) if &*c == "fedcba"));
    }
}
