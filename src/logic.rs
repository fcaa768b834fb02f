use std::ops::Index;

use itertools::Itertools;
use varisat::Lit;

pub(crate) fn invert(lit: Lit) -> Lit {
    match lit.is_negative() {
        true => lit.var().positive(),
        false => lit.var().negative(),
    }
}

pub(crate) fn at_most_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    // no two are true; (!A + !B) * (!A + !C) * ...
    lits.iter()
        .combinations(2)
        .map(|pair| vec![invert(**pair.index(0)), invert(**pair.index(1))])
        .collect_vec()
}

pub(crate) fn exactly_one(lits: Vec<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    clauses.extend(at_most_one(&lits));
    // at least one var is true; A + B + C + ...
    clauses.push(lits);

    clauses
}
