//! C3: numeric evaluation in three modes, the logarithmicity predicate, and
//! the number-to-target-scalar reduction used by conversion and string
//! rendering.
//!
//! The compiler-supplied `base_unit`/`unit_id_eval`/`unit_id_eval_normal`/
//! `is_logarithmic` tables are modeled as a trait object, the seam the
//! teacher's `expr::Evaluator<V>` trait plays for `PureEvaluator` in tests.

use crate::tree::{Unit, UnitNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Normal,
    Base,
    Inverted,
}

/// Opaque, compiler-generated per-unit-id evaluator tables. The runtime
/// never inspects `id` beyond passing it through.
pub trait UnitTables {
    fn base_unit(&self, id: u16, x: f64) -> f64;
    fn unit_id_eval(&self, id: u16, x: f64) -> f64;
    fn unit_id_eval_normal(&self, id: u16, x: f64) -> f64;
    fn is_logarithmic(&self, id: u16) -> bool;
}

pub fn eval(node: &Unit, x: f64, mode: EvalMode, tables: &dyn UnitTables) -> f64 {
    match node.as_ref() {
        UnitNode::One => x,
        UnitNode::Scalar(v) => *v,
        UnitNode::Product(children) => children.iter().map(|c| eval(c, x, mode, tables)).product(),
        UnitNode::Sum(children) => children.iter().map(|c| eval(c, x, mode, tables)).sum(),
        UnitNode::Expression(c) => eval(c, x, mode, tables),
        UnitNode::Neg(c) => -eval(c, x, mode, tables),
        UnitNode::Power(b, e) => eval(b, x, mode, tables).powf(eval(e, x, mode, tables)),
        UnitNode::Identifier { id, .. } => {
            log::trace!("eval: identifier id={id} mode={mode:?}");
            match mode {
                EvalMode::Base => tables.base_unit(*id, x),
                EvalMode::Inverted => tables.unit_id_eval(*id, x),
                EvalMode::Normal => tables.unit_id_eval_normal(*id, x),
            }
        }
    }
}

/// True iff any identifier in the tree is logarithmic; leaves other than
/// identifiers are never logarithmic.
pub fn is_unit_log(node: &Unit, tables: &dyn UnitTables) -> bool {
    match node.as_ref() {
        UnitNode::One | UnitNode::Scalar(_) => false,
        UnitNode::Identifier { id, .. } => tables.is_logarithmic(*id),
        UnitNode::Product(children) | UnitNode::Sum(children) =>
            children.iter().any(|c| is_unit_log(c, tables)),
        UnitNode::Power(b, e) => is_unit_log(b, tables) || is_unit_log(e, tables),
        UnitNode::Neg(c) | UnitNode::Expression(c) => is_unit_log(c, tables),
    }
}

/// Reduce a value `v` carrying unit `unit` to its natural scalar, per
/// spec §4.3: logarithmic (affine-like) units use the base/inverted ratio
/// directly; purely multiplicative units scale `v` by that ratio.
pub fn reduce_to_scalar(unit: &Unit, v: f64, tables: &dyn UnitTables) -> f64 {
    if matches!(unit.as_ref(), UnitNode::One) {
        return v;
    }
    let base = eval(unit, v, EvalMode::Base, tables);
    let inverted = eval(unit, v, EvalMode::Inverted, tables);
    if base == 0.0 {
        log::warn!("reduce_to_scalar: base evaluation is zero, ratio will be non-finite");
    }
    let ratio = inverted / base;
    if is_unit_log(unit, tables) {
        ratio
    } else {
        v * ratio
    }
}

#[cfg(test)]
pub(crate) mod test_tables {
    use super::UnitTables;

    /// `°F`-style affine table: id 0 is Kelvin (identity), id 1 is Celsius
    /// (`K + 273.15`), id 2 is logarithmic dBm-style (`10*log10(x) + 30`
    /// base, `10^((x-30)/10)` inverted).
    pub struct FakeTables;

    impl UnitTables for FakeTables {
        fn base_unit(&self, id: u16, x: f64) -> f64 {
            match id {
                0 => x,
                1 => x + 273.15,
                2 => 10.0 * x.log10() + 30.0,
                _ => unreachable!("unknown unit id {id}"),
            }
        }

        fn unit_id_eval(&self, id: u16, x: f64) -> f64 {
            match id {
                0 => x,
                1 => x - 273.15,
                2 => 10f64.powf((x - 30.0) / 10.0),
                _ => unreachable!("unknown unit id {id}"),
            }
        }

        fn unit_id_eval_normal(&self, id: u16, x: f64) -> f64 {
            // For these sample units, normal == inverted; a real table may
            // differ, which is exactly why the modes are kept distinct.
            self.unit_id_eval(id, x)
        }

        fn is_logarithmic(&self, id: u16) -> bool {
            id == 2
        }
    }
}
