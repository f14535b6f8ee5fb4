use itertools::Itertools;
use varisat::{Lit, Var};

/// At least `k` of `vars` are true: every choice of `n - k + 1` vars holds a true one.
pub(crate) fn at_least(vars: &[Var], k: usize) -> Vec<Vec<Lit>> {
    if k == 0 {
        return Vec::new();
    }
    if k > vars.len() {
        // unsatisfiable; the empty clause says so
        return vec![Vec::new()];
    }

    vars.iter()
        .combinations(vars.len() - k + 1)
        .map(|selection| selection.into_iter().map(|var| var.positive()).collect_vec())
        .collect_vec()
}

/// At most `k` of `vars` are true: every choice of `k + 1` vars holds a false one.
pub(crate) fn at_most(vars: &[Var], k: usize) -> Vec<Vec<Lit>> {
    if k >= vars.len() {
        return Vec::new();
    }

    vars.iter()
        .combinations(k + 1)
        .map(|selection| selection.into_iter().map(|var| var.negative()).collect_vec())
        .collect_vec()
}

pub(crate) fn exactly_one(vars: &[Var]) -> Vec<Vec<Lit>> {
    let mut clauses = at_most(vars, 1);
    clauses.extend(at_least(vars, 1));
    clauses
}
