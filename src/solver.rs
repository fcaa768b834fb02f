//! The solver seam, and a SAT-backed implementation of it.

use std::collections::{HashMap, HashSet};
use std::convert::identity;

use itertools::Itertools;
use tracing::debug;
use uuid::Uuid;
use varisat::{CnfFormula, ExtendFormula, Lit};

use crate::error::{Error, Result};
use crate::expr::{Formula, FormulaNode, Term, TermNode};
use crate::logic::{at_most_one, exactly_one, invert};

/// Handle to an integer variable declared on a [`Solver`].
///
/// A handle remembers which solver declared it; no other solver accepts it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    pub(crate) solver: Uuid,
    pub(crate) index: usize,
}

impl Var {
    /// Position of this variable in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// The satisfiability engine the rest of the crate is written against.
///
/// Variables are finite-domain integers; booleans are integers ranging over `0..=1`.
pub trait Solver {
    /// Declare an integer variable ranging over `min..=max`.
    ///
    /// Declaring a name twice hands back the variable declared first, so callers can rebuild terms by name.
    fn new_int(&mut self, name: &str, min: i64, max: i64) -> Result<Var>;
    /// Declare a boolean variable.
    fn new_bool(&mut self, name: &str) -> Result<Var> {
        self.new_int(name, 0, 1)
    }
    /// Declare an integer variable under a name no earlier call has used.
    fn fresh_int(&mut self, prefix: &str, min: i64, max: i64) -> Result<Var>;
    /// Assert `formula`. An invalid formula is dropped without a trace.
    fn add(&mut self, formula: Formula) -> Result<()>;
    /// Search for an assignment satisfying everything asserted so far.
    fn check(&mut self) -> Result<bool>;
    /// The assignment found by the most recent successful [`check`](Self::check).
    fn model(&self) -> Option<Model>;
    /// How many valid formulas have been asserted.
    fn constraint_count(&self) -> usize;
}

/// A satisfying assignment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    values: HashMap<Var, i64>,
}

impl Model {
    /// Value assigned to `var`, if it belongs to this model.
    pub fn value(&self, var: Var) -> Option<i64> {
        self.values.get(&var).copied()
    }

    /// Evaluate `term` under this model; `None` for invalid terms, unknown variables and overflow.
    pub fn eval(&self, term: &Term) -> Option<i64> {
        self.eval_node(term.0.as_ref()?)
    }

    /// Evaluate `formula` under this model; `None` for invalid formulas and unknown variables.
    pub fn holds(&self, formula: &Formula) -> Option<bool> {
        self.holds_node(formula.0.as_ref()?)
    }

    fn eval_node(&self, node: &TermNode) -> Option<i64> {
        Some(match node {
            TermNode::Const(value) => *value,
            TermNode::Var(var) => self.value(*var)?,
            TermNode::Add(a, b) => self.eval_node(a)?.checked_add(self.eval_node(b)?)?,
            TermNode::Sub(a, b) => self.eval_node(a)?.checked_sub(self.eval_node(b)?)?,
            TermNode::Mul(a, b) => self.eval_node(a)?.checked_mul(self.eval_node(b)?)?,
            TermNode::Neg(a) => self.eval_node(a)?.checked_neg()?,
            TermNode::Ite(cond, then, otherwise) => match self.holds_node(cond)? {
                true => self.eval_node(then)?,
                false => self.eval_node(otherwise)?,
            },
        })
    }

    fn holds_node(&self, node: &FormulaNode) -> Option<bool> {
        Some(match node {
            FormulaNode::Const(value) => *value,
            FormulaNode::Cmp(op, a, b) => op.holds(self.eval_node(a)?, self.eval_node(b)?),
            FormulaNode::Not(a) => !self.holds_node(a)?,
            FormulaNode::And(parts) => parts.iter().map(|part| self.holds_node(part)).collect::<Option<Vec<_>>>()?.into_iter().all(identity),
            FormulaNode::Or(parts) => parts.iter().map(|part| self.holds_node(part)).collect::<Option<Vec<_>>>()?.into_iter().any(identity),
            FormulaNode::Iff(a, b) => self.holds_node(a)? == self.holds_node(b)?,
        })
    }
}

impl FromIterator<(Var, i64)> for Model {
    fn from_iter<T: IntoIterator<Item = (Var, i64)>>(iter: T) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

// an integer-valued expression compiled to one literal per value it can take; exactly one of them holds
#[derive(Clone)]
struct Encoded {
    options: Vec<(i64, Lit)>,
}

struct Declared {
    name: String,
    encoded: Encoded,
}

/// A [`Solver`] backed by the `varisat` CDCL SAT solver.
///
/// # Encoding
/// Every integer variable V ranging over `min..=max` owns one literal per value, constrained so exactly one is true.
/// Compound terms are compiled the same way: for a term A op B, each pair of values (x, y) that A and B can take
/// implies the literal for the value x op y of the result, and no two result literals may hold at once.
/// Since exactly one (x, y) pair holds, exactly one result literal does too.
///
/// Formulas become single literals via Tseitin encoding.
/// A comparison A < B is a fresh literal G with one clause per value pair (x, y): (A = x) and (B = y) imply G or !G
/// depending on whether x < y. Conjunctions and disjunctions define G in the usual two-directional way.
///
/// Top-level conjunctions are split and top-level disjunctions go straight in as one clause, which keeps the
/// common "one of these must change" style of constraint free of auxiliary literals.
///
/// Clauses for a formula are collected first and reach varisat only once the whole formula has encoded,
/// so a failed [`add`](Solver::add) leaves nothing behind.
pub struct SatSolver {
    id: Uuid,
    sat: varisat::Solver<'static>,
    pending: Vec<Vec<Lit>>,
    truth: Lit,
    declared: Vec<Declared>,
    by_name: HashMap<String, Var>,
    fresh_counter: usize,
    constraint_count: usize,
    model: Option<Model>,
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver {
    /// A solver with no variables and no constraints.
    pub fn new() -> Self {
        let mut sat = varisat::Solver::new();
        // a literal fixed to true, standing in for constants
        let truth = sat.new_lit();
        sat.add_clause(&[truth]);

        Self {
            id: Uuid::new_v4(),
            sat,
            pending: Vec::new(),
            truth,
            declared: Vec::new(),
            by_name: HashMap::new(),
            fresh_counter: 0,
            constraint_count: 0,
            model: None,
        }
    }

    /// Name `var` was declared under.
    pub fn name_of(&self, var: Var) -> Option<&str> {
        self.lookup(var).ok().map(|declared| declared.name.as_str())
    }

    /// Number of declared variables.
    pub fn var_count(&self) -> usize {
        self.declared.len()
    }

    fn lookup(&self, var: Var) -> Result<&Declared> {
        if var.solver != self.id {
            return Err(Error::UnknownVariable(var.index));
        }
        self.declared.get(var.index).ok_or(Error::UnknownVariable(var.index))
    }

    // held back until the formula being added has encoded completely
    fn add_clauses(&mut self, clauses: Vec<Vec<Lit>>) {
        self.pending.extend(clauses);
    }

    fn constant(&self, value: i64) -> Encoded {
        Encoded { options: vec![(value, self.truth)] }
    }

    // one fresh literal per distinct value, plus clauses making sure at most one of them holds
    fn value_lits(&mut self, values: impl IntoIterator<Item = i64>) -> (HashMap<i64, Lit>, Encoded) {
        let values = values.into_iter().sorted().dedup().collect_vec();
        let lits = values.iter().map(|_| self.sat.new_lit()).collect_vec();
        self.add_clauses(at_most_one(&lits));

        let options = values.into_iter().zip(lits).collect_vec();
        (options.iter().copied().collect(), Encoded { options })
    }

    fn encode_binary(&mut self, a: Encoded, b: Encoded, op: impl Fn(i64, i64) -> Option<i64>) -> Result<Encoded> {
        let outcomes = a.options.iter()
            .cartesian_product(b.options.iter())
            .map(|((x, lx), (y, ly))| Ok((op(*x, *y).ok_or(Error::ArithmeticOverflow)?, *lx, *ly)))
            .collect::<Result<Vec<_>>>()?;
        let (lookup, result) = self.value_lits(outcomes.iter().map(|(z, _, _)| *z));

        // (A = x) and (B = y) imply (R = x op y); i.e. !(A = x) + !(B = y) + (R = x op y)
        let clauses = outcomes.iter()
            .map(|(z, lx, ly)| vec![invert(*lx), invert(*ly), lookup[z]])
            .collect_vec();
        self.add_clauses(clauses);

        Ok(result)
    }

    fn encode_term(&mut self, node: &TermNode) -> Result<Encoded> {
        Ok(match node {
            TermNode::Const(value) => self.constant(*value),
            TermNode::Var(var) => self.lookup(*var)?.encoded.clone(),
            TermNode::Add(a, b) => {
                let (a, b) = (self.encode_term(a)?, self.encode_term(b)?);
                self.encode_binary(a, b, i64::checked_add)?
            }
            TermNode::Sub(a, b) => {
                let (a, b) = (self.encode_term(a)?, self.encode_term(b)?);
                self.encode_binary(a, b, i64::checked_sub)?
            }
            TermNode::Mul(a, b) => {
                let (a, b) = (self.encode_term(a)?, self.encode_term(b)?);
                self.encode_binary(a, b, i64::checked_mul)?
            }
            // negation permutes values without touching literals
            TermNode::Neg(a) => Encoded {
                options: self.encode_term(a)?.options
                    .into_iter()
                    .map(|(x, lit)| Ok((x.checked_neg().ok_or(Error::ArithmeticOverflow)?, lit)))
                    .collect::<Result<Vec<_>>>()?,
            },
            TermNode::Ite(cond, then, otherwise) => {
                let cond = self.encode_formula(cond)?;
                let (then, otherwise) = (self.encode_term(then)?, self.encode_term(otherwise)?);
                let (lookup, result) = self.value_lits(then.options.iter().chain(otherwise.options.iter()).map(|(x, _)| *x));

                // C and (T = x) imply (R = x); !C and (E = y) imply (R = y)
                let clauses = then.options.iter()
                    .map(|(x, lit)| vec![invert(cond), invert(*lit), lookup[x]])
                    .chain(otherwise.options.iter().map(|(y, lit)| vec![cond, invert(*lit), lookup[y]]))
                    .collect_vec();
                self.add_clauses(clauses);

                result
            }
        })
    }

    fn encode_formula(&mut self, node: &FormulaNode) -> Result<Lit> {
        Ok(match node {
            FormulaNode::Const(true) => self.truth,
            FormulaNode::Const(false) => invert(self.truth),
            FormulaNode::Cmp(op, a, b) => {
                let (a, b) = (self.encode_term(a)?, self.encode_term(b)?);
                let g = self.sat.new_lit();

                // (A = x) and (B = y) imply G exactly when x op y holds, and !G otherwise
                let clauses = a.options.iter()
                    .cartesian_product(b.options.iter())
                    .map(|((x, lx), (y, ly))| vec![invert(*lx), invert(*ly), if op.holds(*x, *y) { g } else { invert(g) }])
                    .collect_vec();
                self.add_clauses(clauses);

                g
            }
            FormulaNode::Not(a) => invert(self.encode_formula(a)?),
            FormulaNode::And(parts) => {
                let lits = parts.iter().map(|part| self.encode_formula(part)).collect::<Result<Vec<_>>>()?;
                let g = self.sat.new_lit();

                // G => each part; all parts => G
                let mut clauses = lits.iter().map(|lit| vec![invert(g), *lit]).collect_vec();
                clauses.push(lits.iter().map(|lit| invert(*lit)).chain([g]).collect_vec());
                self.add_clauses(clauses);

                g
            }
            FormulaNode::Or(parts) => {
                let lits = parts.iter().map(|part| self.encode_formula(part)).collect::<Result<Vec<_>>>()?;
                let g = self.sat.new_lit();

                // G => some part; each part => G
                let mut clauses = lits.iter().map(|lit| vec![invert(*lit), g]).collect_vec();
                clauses.push(lits.iter().copied().chain([invert(g)]).collect_vec());
                self.add_clauses(clauses);

                g
            }
            FormulaNode::Iff(a, b) => {
                let (a, b) = (self.encode_formula(a)?, self.encode_formula(b)?);
                let g = self.sat.new_lit();

                // G <=> (A <=> B)
                self.add_clauses(vec![
                    vec![invert(g), invert(a), b],
                    vec![invert(g), a, invert(b)],
                    vec![g, a, b],
                    vec![g, invert(a), invert(b)],
                ]);

                g
            }
        })
    }

    fn assert_node(&mut self, node: &FormulaNode) -> Result<()> {
        match node {
            FormulaNode::And(parts) => {
                for part in parts {
                    self.assert_node(part)?;
                }
            }
            FormulaNode::Or(parts) => {
                let clause = parts.iter().map(|part| self.encode_formula(part)).collect::<Result<Vec<_>>>()?;
                self.pending.push(clause);
            }
            _ => {
                let lit = self.encode_formula(node)?;
                self.pending.push(vec![lit]);
            }
        }

        Ok(())
    }
}

impl Solver for SatSolver {
    fn new_int(&mut self, name: &str, min: i64, max: i64) -> Result<Var> {
        if let Some(var) = self.by_name.get(name) {
            return Ok(*var);
        }
        if min > max {
            return Err(Error::EmptyDomain { name: name.to_string(), min, max });
        }

        let options = (min..=max).map(|value| (value, self.sat.new_lit())).collect_vec();
        // V takes exactly one value
        self.sat.add_formula(&CnfFormula::from(exactly_one(options.iter().map(|(_, lit)| *lit).collect_vec())));

        let var = Var { solver: self.id, index: self.declared.len() };
        self.declared.push(Declared { name: name.to_string(), encoded: Encoded { options } });
        self.by_name.insert(name.to_string(), var);

        Ok(var)
    }

    fn fresh_int(&mut self, prefix: &str, min: i64, max: i64) -> Result<Var> {
        loop {
            let name = format!("{prefix}{}", self.fresh_counter);
            self.fresh_counter += 1;
            if !self.by_name.contains_key(&name) {
                return self.new_int(&name, min, max);
            }
        }
    }

    fn add(&mut self, formula: Formula) -> Result<()> {
        let Some(node) = formula.0 else {
            return Ok(());
        };

        let encoded = self.assert_node(&node);
        let clauses = std::mem::take(&mut self.pending);
        encoded?;

        self.sat.add_formula(&CnfFormula::from(clauses));
        self.constraint_count += 1;
        // anything found so far may violate the new constraint
        self.model = None;

        Ok(())
    }

    fn check(&mut self) -> Result<bool> {
        let satisfiable = self.sat.solve().map_err(|err| Error::Backend(format!("{err:?}")))?;
        debug!(vars = self.declared.len(), constraints = self.constraint_count, satisfiable, "SAT check finished");
        if !satisfiable {
            self.model = None;
            return Ok(false);
        }

        let Some(assignment) = self.sat.model() else {
            return Err(Error::Backend("solver reported SAT without a model".to_string()));
        };
        let true_lits: HashSet<Lit> = assignment.into_iter().filter(|lit| lit.is_positive()).collect();

        self.model = Some(self.declared.iter()
            .enumerate()
            .filter_map(|(index, declared)| declared.encoded.options.iter()
                .find(|(_, lit)| true_lits.contains(lit))
                .map(|(value, _)| (Var { solver: self.id, index }, *value)))
            .collect());

        Ok(true)
    }

    fn model(&self) -> Option<Model> {
        self.model.clone()
    }

    fn constraint_count(&self) -> usize {
        self.constraint_count
    }
}
