use std::collections::{HashMap, HashSet};
use std::convert::identity;

use itertools::Itertools;
use log::debug;
use unordered_pair::UnorderedPair;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::location::Location;
use crate::logic::{at_least, at_most, exactly_one};
use crate::plan::{pair, Link, LinkPlan};

/// Reasons a connection plan may fail to complete.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GenerationFailure {
    /// The SAT solver detected a logical inconsistency, i.e. no assignment of links meets every degree limit
    /// while keeping the base path.
    #[error("no set of links meets every degree limit around this path")]
    Inconsistent,
    /// The SAT solver claimed a solution but did not produce a usable one.
    /// This should probably never happen.
    #[error("the solver produced no usable model")]
    NoModel,
}

/// Completes a [`LinkPlan`] from scratch, keeping only its fixed links.
///
/// One variable per link between adjacent cells, true when the link is joined.
pub(crate) struct LinkSolver<'a> {
    plan: &'a LinkPlan,
    vars: HashMap<UnorderedPair<Location>, Var>,
}

impl<'a> From<&'a LinkPlan> for LinkSolver<'a> {
    fn from(plan: &'a LinkPlan) -> Self {
        let vars = plan.links()
            .enumerate()
            .map(|(index, (a, b, _))| (pair(a, b), Var::from_index(index)))
            .collect();

        Self { plan, vars }
    }
}

impl LinkSolver<'_> {
    fn incident_vars(&self, location: Location) -> Vec<Var> {
        self.plan.incident(location).into_iter()
            .filter_map(|(other, _)| self.vars.get(&pair(location, other)).copied())
            .collect_vec()
    }

    /// Solve for every link, returning whether each is joined.
    ///
    /// # Logical setup
    /// Let X be the variable for some link.
    /// If the link is fixed, the solver assumes X or !X accordingly.
    ///
    /// For a cell V with incident link variables E:
    /// if V is an endpoint, exactly one of E is true;
    /// otherwise at most three of E are true, and at least as many as the floor of V.
    pub(crate) fn solve(&self) -> Result<HashMap<UnorderedPair<Location>, bool>, GenerationFailure> {
        let mut formula = CnfFormula::new();

        for location in self.plan.locations() {
            let incident = self.incident_vars(location);
            let clauses = match self.plan.is_endpoint(location) {
                true => exactly_one(&incident),
                false => {
                    let mut clauses = at_most(&incident, self.plan.cap(location));
                    clauses.extend(at_least(&incident, self.plan.floor(location)));
                    clauses
                }
            };
            clauses.iter().for_each(|clause| formula.add_clause(clause));
        }

        // walk links in plan order so the same plan always yields the same model
        let assumptions = self.plan.links()
            .filter_map(|(a, b, _)| {
                let link = pair(a, b);
                let state = self.plan.fixed().get(&link)?;
                self.vars.get(&link).map(|var| var.lit(*state == Link::Joined))
            })
            .collect_vec();

        let mut solver = Solver::new();
        solver.add_formula(&formula);
        solver.assume(&assumptions);
        if !solver.solve().is_ok_and(identity) {
            return Err(GenerationFailure::Inconsistent);
        }
        let Some(model) = solver.model() else {
            return Err(GenerationFailure::NoModel);
        };
        let model: HashSet<Lit> = model.into_iter().collect();
        debug!("solver completed {} links", self.vars.len());

        Ok(self.vars.iter()
            .map(|(link, var)| (*link, model.contains(&var.positive())))
            .collect())
    }
}
