//! C2: normal-form rewrite of unit trees. `simplify` is a one-pass,
//! bottom-up fixed point (`simplify(simplify(n)) == simplify(n)`).

use crate::tree::{ident, neg as mk_neg, one, power as mk_power, product, scalar, sum, Unit, UnitNode};

pub fn simplify(node: &Unit) -> Unit {
    match node.as_ref() {
        UnitNode::One => one(),
        UnitNode::Scalar(v) => scalar(*v),
        UnitNode::Identifier { name, id } => ident(name.clone(), *id),
        UnitNode::Expression(x) => simplify(x),
        UnitNode::Neg(x) => simplify_neg(x),
        UnitNode::Power(b, e) => simplify_power(b, e),
        UnitNode::Product(children) => simplify_product(children),
        UnitNode::Sum(children) => simplify_sum(children),
    }
}

fn simplify_neg(x: &Unit) -> Unit {
    let sx = simplify(x);
    match sx.as_ref() {
        UnitNode::One => {
            log::trace!("simplify: Neg(One) -> Scalar(-1)");
            scalar(-1.0)
        }
        UnitNode::Scalar(v) => {
            log::trace!("simplify: Neg(Scalar({v})) -> Scalar({})", -v);
            scalar(-v)
        }
        _ => mk_neg(sx),
    }
}

fn is_exponent_one(e: &Unit) -> bool {
    matches!(e.as_ref(), UnitNode::Scalar(v) if *v == 1.0) || matches!(e.as_ref(), UnitNode::One)
}

fn simplify_power(b: &Unit, e: &Unit) -> Unit {
    let se = simplify(e);
    if let UnitNode::Scalar(v) = se.as_ref() {
        if *v == 0.0 {
            log::trace!("simplify: Power(_, Scalar(0)) -> Scalar(1)");
            return scalar(1.0);
        }
    }
    if is_exponent_one(&se) {
        return simplify(b);
    }
    let sb = simplify(b);
    if matches!(sb.as_ref(), UnitNode::One) {
        log::trace!("simplify: Power(One, _) -> Scalar(1)");
        return scalar(1.0);
    }
    if let (UnitNode::Scalar(bv), UnitNode::Scalar(ev)) = (sb.as_ref(), se.as_ref()) {
        return scalar(bv.powf(*ev));
    }
    if let UnitNode::Power(b2, e2) = sb.as_ref() {
        log::trace!("simplify: Power(Power(b, e2), e) -> Power(b, e2*e)");
        let combined_exp = simplify_product(&[e2.clone(), se.clone()]);
        return simplify_power(b2, &combined_exp);
    }
    if let UnitNode::Product(factors) = sb.as_ref() {
        log::trace!("simplify: Power(Product(..), e) distributes over {} factors", factors.len());
        let distributed: Vec<Unit> = factors
            .iter()
            .map(|f| mk_power(f.clone(), se.clone()))
            .collect();
        return simplify_product(&distributed);
    }
    mk_power(sb, se)
}

/// Flatten nested products (already-simplified children), dropping `One`.
fn flatten_product(children: &[Unit], out: &mut Vec<Unit>) {
    for c in children {
        let simplified = simplify(c);
        match simplified.as_ref() {
            UnitNode::One => {}
            UnitNode::Product(nested) => flatten_product(nested, out),
            _ => out.push(simplified),
        }
    }
}

fn simplify_product(children: &[Unit]) -> Unit {
    let mut flat = Vec::new();
    flatten_product(children, &mut flat);

    let mut s = 1.0f64;
    let mut rest = Vec::new();
    for c in flat {
        if let UnitNode::Scalar(v) = c.as_ref() {
            s *= v;
        } else {
            rest.push(c);
        }
    }

    // Decompose each remaining factor into (base, exponent) and group by
    // syntactic equality of base.
    let mut groups: Vec<(Unit, Vec<Unit>)> = Vec::new();
    for c in rest {
        let (base, exp) = match c.as_ref() {
            UnitNode::Power(b, e) => (b.clone(), e.clone()),
            _ => (c.clone(), scalar(1.0)),
        };
        match groups.iter_mut().find(|(b, _)| **b == *base) {
            Some((_, exps)) => exps.push(exp),
            None => groups.push((base, vec![exp])),
        }
    }

    let mut out = Vec::new();
    for (base, exps) in groups {
        let total = if exps.len() == 1 {
            exps.into_iter().next().unwrap()
        } else {
            simplify_sum(&exps)
        };
        match total.as_ref() {
            UnitNode::Scalar(v) if *v == 0.0 => {}
            UnitNode::Scalar(v) if *v == 1.0 => out.push(base),
            UnitNode::One => out.push(base),
            _ => out.push(mk_power(base, total)),
        }
    }

    if s != 1.0 {
        out.insert(0, scalar(s));
    }

    log::trace!("simplify_product: {} input children -> {} output children", children.len(), out.len());
    match out.len() {
        0 => scalar(1.0),
        1 => out.into_iter().next().unwrap(),
        _ => product(out),
    }
}

/// Flatten nested sums (already-simplified children). `One` is dropped here
/// as a placeholder, not as the numeric identity of addition — see the
/// open question in the top-level design notes; replicated deliberately.
fn flatten_sum(children: &[Unit], out: &mut Vec<Unit>) {
    for c in children {
        let simplified = simplify(c);
        match simplified.as_ref() {
            UnitNode::One => {}
            UnitNode::Sum(nested) => flatten_sum(nested, out),
            _ => out.push(simplified),
        }
    }
}

fn simplify_sum(children: &[Unit]) -> Unit {
    let mut flat = Vec::new();
    flatten_sum(children, &mut flat);

    let mut a = 0.0f64;
    let mut rest = Vec::new();
    for c in flat {
        if let UnitNode::Scalar(v) = c.as_ref() {
            a += v;
        } else {
            rest.push(c);
        }
    }

    let mut groups: Vec<(Unit, f64)> = Vec::new();
    for c in rest {
        let (coeff, base) = decompose_addend(&c);
        if matches!(base.as_ref(), UnitNode::One) {
            a += coeff;
            continue;
        }
        match groups.iter_mut().find(|(b, _)| **b == *base) {
            Some((_, total)) => *total += coeff,
            None => groups.push((base, coeff)),
        }
    }

    let mut out = Vec::new();
    for (base, c) in groups {
        if c == 0.0 {
            continue;
        }
        if c == 1.0 {
            out.push(base);
        } else if let UnitNode::Product(factors) = base.as_ref() {
            let mut spliced = Vec::with_capacity(factors.len() + 1);
            spliced.push(scalar(c));
            spliced.extend(factors.iter().cloned());
            out.push(product(spliced));
        } else {
            out.push(product(vec![scalar(c), base]));
        }
    }

    if a != 0.0 {
        out.insert(0, scalar(a));
    }

    log::trace!("simplify_sum: {} input children -> {} output children", children.len(), out.len());
    match out.len() {
        0 => scalar(0.0),
        1 => out.into_iter().next().unwrap(),
        _ => sum(out),
    }
}

/// `Product` containing scalar factors decomposes into `(coeff, rest)`;
/// anything else is `(1.0, addend)`.
fn decompose_addend(addend: &Unit) -> (f64, Unit) {
    if let UnitNode::Product(factors) = addend.as_ref() {
        let mut coeff = 1.0;
        let mut remaining = Vec::new();
        for f in factors {
            if let UnitNode::Scalar(v) = f.as_ref() {
                coeff *= v;
            } else {
                remaining.push(f.clone());
            }
        }
        let base = match remaining.len() {
            0 => one(),
            1 => remaining.into_iter().next().unwrap(),
            _ => product(remaining),
        };
        (coeff, base)
    } else {
        (1.0, addend.clone())
    }
}
