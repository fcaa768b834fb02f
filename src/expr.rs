//! Integer terms and boolean formulas which carry an explicit invalid state.
//!
//! Navigating past the edge of a board yields a ref with no entity behind it, and the term of such a ref is invalid.
//! Every operator here returns an invalid result as soon as one operand is invalid, so a rule written once for
//! interior cells quietly evaporates at the border instead of needing a bounds check at every call site.
//! [`Solver::add`](crate::solver::Solver::add) discards invalid formulas.
//!
//! The exceptions are [`Formula::all`] and [`Formula::any`], which read an invalid member as `false`.

use std::ops::{Add, BitAnd, BitOr, Mul, Neg, Not, Sub};

use itertools::Itertools;

use crate::solver::Var;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TermNode {
    Const(i64),
    Var(Var),
    Add(Box<TermNode>, Box<TermNode>),
    Sub(Box<TermNode>, Box<TermNode>),
    Mul(Box<TermNode>, Box<TermNode>),
    Neg(Box<TermNode>),
    Ite(Box<FormulaNode>, Box<TermNode>, Box<TermNode>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub(crate) fn holds(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FormulaNode {
    Const(bool),
    Cmp(CmpOp, TermNode, TermNode),
    Not(Box<FormulaNode>),
    And(Vec<FormulaNode>),
    Or(Vec<FormulaNode>),
    Iff(Box<FormulaNode>, Box<FormulaNode>),
}

/// An integer expression over solver variables, or the invalid term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Term(pub(crate) Option<TermNode>);

/// A boolean expression over solver variables, or the invalid formula.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Formula(pub(crate) Option<FormulaNode>);

impl Term {
    /// The term produced by anything that touched an off-board entity.
    pub fn invalid() -> Self {
        Self(None)
    }

    /// A constant.
    pub fn constant(value: i64) -> Self {
        Self(Some(TermNode::Const(value)))
    }

    /// Whether this term can be handed to a solver.
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    fn binary(self, rhs: Term, op: impl FnOnce(Box<TermNode>, Box<TermNode>) -> TermNode) -> Term {
        match (self.0, rhs.0) {
            (Some(lhs), Some(rhs)) => Term(Some(op(Box::new(lhs), Box::new(rhs)))),
            _ => Term::invalid(),
        }
    }

    fn compare(self, rhs: impl Into<Term>, op: CmpOp) -> Formula {
        match (self.0, rhs.into().0) {
            (Some(lhs), Some(rhs)) => Formula(Some(FormulaNode::Cmp(op, lhs, rhs))),
            _ => Formula::invalid(),
        }
    }

    /// `self == rhs`
    pub fn equals(self, rhs: impl Into<Term>) -> Formula {
        self.compare(rhs, CmpOp::Eq)
    }

    /// `self != rhs`
    pub fn differs(self, rhs: impl Into<Term>) -> Formula {
        self.compare(rhs, CmpOp::Ne)
    }

    /// `self < rhs`
    pub fn lt(self, rhs: impl Into<Term>) -> Formula {
        self.compare(rhs, CmpOp::Lt)
    }

    /// `self <= rhs`
    pub fn le(self, rhs: impl Into<Term>) -> Formula {
        self.compare(rhs, CmpOp::Le)
    }

    /// `self > rhs`
    pub fn gt(self, rhs: impl Into<Term>) -> Formula {
        self.compare(rhs, CmpOp::Gt)
    }

    /// `self >= rhs`
    pub fn ge(self, rhs: impl Into<Term>) -> Formula {
        self.compare(rhs, CmpOp::Ge)
    }

    /// Sum of `terms`; invalid if any of them is. The empty sum is `0`.
    pub fn sum<T: Into<Term>>(terms: impl IntoIterator<Item = T>) -> Term {
        let mut nodes = terms.into_iter().map(|term| term.into().0);
        let Some(first) = nodes.next() else {
            return Term::constant(0);
        };

        nodes.fold(Term(first), |acc, node| acc + Term(node))
    }

    /// `if cond { then } else { otherwise }`; invalid if any part is.
    pub fn ite(cond: Formula, then: impl Into<Term>, otherwise: impl Into<Term>) -> Term {
        match (cond.0, then.into().0, otherwise.into().0) {
            (Some(cond), Some(then), Some(otherwise)) => Term(Some(TermNode::Ite(Box::new(cond), Box::new(then), Box::new(otherwise)))),
            _ => Term::invalid(),
        }
    }

    /// Chained [`ite`](Self::ite): the first branch whose key equals `selector` wins, `otherwise` if none do.
    pub fn switch<T: Into<Term>>(selector: Term, branches: impl IntoIterator<Item = (i64, T)>, otherwise: impl Into<Term>) -> Term {
        let branches = branches.into_iter().collect_vec();
        branches.into_iter()
            .rev()
            .fold(otherwise.into(), |acc, (key, branch)| Term::ite(selector.clone().equals(key), branch, acc))
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Self::constant(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Self::constant(value.into())
    }
}

impl From<Var> for Term {
    fn from(value: Var) -> Self {
        Self(Some(TermNode::Var(value)))
    }
}

impl From<Option<Var>> for Term {
    fn from(value: Option<Var>) -> Self {
        value.map_or_else(Term::invalid, Term::from)
    }
}

impl From<&Term> for Term {
    fn from(value: &Term) -> Self {
        value.clone()
    }
}

impl<T: Into<Term>> Add<T> for Term {
    type Output = Term;

    fn add(self, rhs: T) -> Term {
        self.binary(rhs.into(), TermNode::Add)
    }
}

impl<T: Into<Term>> Sub<T> for Term {
    type Output = Term;

    fn sub(self, rhs: T) -> Term {
        self.binary(rhs.into(), TermNode::Sub)
    }
}

impl<T: Into<Term>> Mul<T> for Term {
    type Output = Term;

    fn mul(self, rhs: T) -> Term {
        self.binary(rhs.into(), TermNode::Mul)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term(self.0.map(|node| TermNode::Neg(Box::new(node))))
    }
}

impl Formula {
    /// The formula produced by anything that touched an off-board entity.
    pub fn invalid() -> Self {
        Self(None)
    }

    /// A constant.
    pub fn constant(value: bool) -> Self {
        Self(Some(FormulaNode::Const(value)))
    }

    /// Whether this formula can be handed to a solver.
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// `self => rhs`
    pub fn implies(self, rhs: Formula) -> Formula {
        !self | rhs
    }

    /// `self <=> rhs`
    pub fn iff(self, rhs: Formula) -> Formula {
        match (self.0, rhs.0) {
            (Some(lhs), Some(rhs)) => Formula(Some(FormulaNode::Iff(Box::new(lhs), Box::new(rhs)))),
            _ => Formula::invalid(),
        }
    }

    /// Conjunction of `formulas`, reading invalid members as `false`.
    pub fn all(formulas: impl IntoIterator<Item = Formula>) -> Formula {
        Formula(Some(FormulaNode::And(formulas.into_iter()
            .map(|formula| formula.0.unwrap_or(FormulaNode::Const(false)))
            .collect_vec())))
    }

    /// Disjunction of `formulas`, reading invalid members as `false`.
    pub fn any(formulas: impl IntoIterator<Item = Formula>) -> Formula {
        Formula(Some(FormulaNode::Or(formulas.into_iter()
            .filter_map(|formula| formula.0)
            .collect_vec())))
    }

    /// All of `terms` take pairwise different values; invalid if any term is.
    pub fn distinct<T: Into<Term>>(terms: impl IntoIterator<Item = T>) -> Formula {
        let Some(nodes) = terms.into_iter().map(|term| term.into().0).collect::<Option<Vec<_>>>() else {
            return Formula::invalid();
        };

        Formula(Some(FormulaNode::And(nodes.iter()
            .tuple_combinations()
            .map(|(a, b)| FormulaNode::Cmp(CmpOp::Ne, a.clone(), b.clone()))
            .collect_vec())))
    }
}

impl From<bool> for Formula {
    fn from(value: bool) -> Self {
        Self::constant(value)
    }
}

impl From<Var> for Formula {
    /// A boolean variable read as a formula: true when it holds 1.
    fn from(value: Var) -> Self {
        Term::from(value).equals(1)
    }
}

impl From<Option<Var>> for Formula {
    fn from(value: Option<Var>) -> Self {
        Term::from(value).equals(1)
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Formula) -> Formula {
        match (self.0, rhs.0) {
            (Some(lhs), Some(rhs)) => Formula(Some(FormulaNode::And(vec![lhs, rhs]))),
            _ => Formula::invalid(),
        }
    }
}

impl BitOr for Formula {
    type Output = Formula;

    fn bitor(self, rhs: Formula) -> Formula {
        match (self.0, rhs.0) {
            (Some(lhs), Some(rhs)) => Formula(Some(FormulaNode::Or(vec![lhs, rhs]))),
            _ => Formula::invalid(),
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        Formula(self.0.map(|node| FormulaNode::Not(Box::new(node))))
    }
}
