//! C4: pretty-printer. Simplifies first, then emits the fraction-form
//! grammar of spec §4.4.

use itertools::Itertools;

use crate::simplify::simplify;
use crate::tree::{Unit, UnitNode};

pub fn format_unit(node: &Unit) -> String {
    let simplified = simplify(node);
    let mut out = String::new();
    write_node(&simplified, &mut out);
    out
}

fn is_compound(n: &UnitNode) -> bool {
    matches!(
        n,
        UnitNode::Sum(_) | UnitNode::Product(_) | UnitNode::Neg(_) | UnitNode::Power(_, _)
    )
}

/// Approximates C's `%g`: integral values print without a fractional part,
/// everything else uses the shortest round-tripping decimal form. Exposed
/// so `Number`'s string rendering (spec §4.5) can reuse the same formatting
/// for the reduced scalar it prepends to the unit string.
pub fn format_scalar(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

fn rendered(n: &Unit) -> String {
    let mut s = String::new();
    write_node(n, &mut s);
    s
}

fn write_node(n: &Unit, out: &mut String) {
    match n.as_ref() {
        UnitNode::One => {}
        UnitNode::Scalar(v) => out.push_str(&format_scalar(*v)),
        UnitNode::Identifier { name, .. } => out.push_str(name),
        UnitNode::Sum(children) => {
            out.push_str(&children.iter().map(rendered).join("+"));
        }
        UnitNode::Neg(c) => {
            out.push('-');
            write_parenthesised_if_compound(c, out);
        }
        UnitNode::Product(children) => write_product(children, out),
        UnitNode::Power(b, e) => write_power(b, e, out),
        UnitNode::Expression(c) => {
            out.push('[');
            write_node(c, out);
            out.push(']');
        }
    }
}

fn write_parenthesised_if_compound(n: &Unit, out: &mut String) {
    if is_compound(n) {
        out.push('(');
        write_node(n, out);
        out.push(')');
    } else {
        write_node(n, out);
    }
}

fn is_exponent_one(e: &Unit) -> bool {
    matches!(e.as_ref(), UnitNode::Scalar(v) if *v == 1.0) || matches!(e.as_ref(), UnitNode::One)
}

fn write_power(base: &Unit, exponent: &Unit, out: &mut String) {
    if is_exponent_one(exponent) {
        write_node(base, out);
        return;
    }
    write_parenthesised_if_compound(base, out);
    out.push('^');
    let exponent_is_simple = matches!(
        exponent.as_ref(),
        UnitNode::Scalar(_) | UnitNode::Identifier { .. }
    );
    if exponent_is_simple {
        write_node(exponent, out);
    } else {
        out.push('(');
        write_node(exponent, out);
        out.push(')');
    }
}

/// A child is a denominator iff it's a `Power` whose exponent is
/// `Scalar(v)` with `v < 0`, or `Neg(...)`.
fn is_denominator(n: &Unit) -> bool {
    match n.as_ref() {
        UnitNode::Power(_, e) => match e.as_ref() {
            UnitNode::Scalar(v) => *v < 0.0,
            UnitNode::Neg(_) => true,
            _ => false,
        },
        _ => false,
    }
}

fn write_product(children: &[Unit], out: &mut String) {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for c in children {
        if matches!(c.as_ref(), UnitNode::One) {
            continue;
        }
        if is_denominator(c) {
            denominator.push(c);
        } else {
            numerator.push(c);
        }
    }

    if numerator.is_empty() {
        out.push('1');
    } else {
        out.push_str(&numerator.iter().map(|c| rendered(c)).join("*"));
    }

    if denominator.is_empty() {
        return;
    }
    out.push('/');
    let rendered_denominator = |c: &&Unit| {
        let mut s = String::new();
        write_denominator_factor(c, &mut s);
        s
    };
    if denominator.len() >= 2 {
        out.push('(');
        out.push_str(&denominator.iter().map(rendered_denominator).join("*"));
        out.push(')');
    } else {
        out.push_str(&rendered_denominator(&denominator[0]));
    }
}

fn write_denominator_factor(n: &Unit, out: &mut String) {
    if let UnitNode::Power(base, exponent) = n.as_ref() {
        match exponent.as_ref() {
            UnitNode::Scalar(v) if *v < 0.0 => {
                write_parenthesised_if_compound(base, out);
                let positive = -v;
                if positive != 1.0 {
                    out.push('^');
                    out.push_str(&format_scalar(positive));
                }
                return;
            }
            UnitNode::Neg(inner) => {
                write_node(base, out);
                out.push('^');
                write_node(inner, out);
                return;
            }
            _ => {}
        }
    }
    write_node(n, out);
}
