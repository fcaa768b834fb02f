//! Enforcing "everything is one piece" on top of a SAT solver.
//!
//! Connectivity is awkward to state as clauses, so instead the solver is asked for any assignment, the assignment is split
//! into connected components with a [`UnionFind`], and if there is more than one component each of them is banned:
//! some member of the component (or, by default, some cell bordering it) must change its value.
//! Then the solver is asked again. Every round removes at least the assignment just seen, so the loop ends.

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::num::NonZero;

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::expr::{Formula, Term};
use crate::grid::Grid;
use crate::hex::HexGrid;
use crate::solver::{Model, Solver, Var};
use crate::union_find::UnionFind;

/// Where connectivity in a candidate assignment comes from.
pub trait Adjacency {
    /// Every variable whose value connectivity depends on.
    fn keys(&self) -> Vec<Var>;
    /// Groups of variables that are connected to each other under `model`.
    ///
    /// A variable that belongs to the region but touches nothing else should be reported as a group of one.
    fn links(&self, model: &Model) -> Vec<Vec<Var>>;
    /// The variables adjacent to `key`, whether or not they are connected to it under the current model.
    fn neighbors(&self, _key: Var) -> Vec<Var> {
        Vec::new()
    }
}

/// How a disconnected component is ruled out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BanStrategy {
    /// Some member of the component must take a different value.
    ClassOnly,
    /// Some member of the component, or some neighbour outside it, must take a different value.
    /// Unlike [`ClassOnly`](Self::ClassOnly) this still allows the component to grow into a larger region.
    #[default]
    ClassAndBoundary,
}

/// A rejected candidate, as handed to [`RepairLoop::on_retry`] callbacks.
pub struct Retry<'m> {
    /// Which candidate this was, starting from 1.
    pub attempt: usize,
    /// The connected components found in it; empty when nothing was connected at all.
    pub classes: &'m [Vec<Var>],
    /// The candidate itself.
    pub model: &'m Model,
}

/// Configuration for repeatedly solving until the result is connected.
///
/// ```ignore
/// let model = RepairLoop::new()
///     .strategy(BanStrategy::ClassOnly)
///     .on_retry(|retry| println!("attempt {} had {} pieces", retry.attempt, retry.classes.len()))
///     .run(&mut solver, &adjacency)?;
/// ```
pub struct RepairLoop<'a> {
    strategy: BanStrategy,
    max_attempts: Option<NonZero<usize>>,
    on_retry: Option<Box<dyn FnMut(&Retry<'_>) + 'a>>,
}

impl Default for RepairLoop<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for RepairLoop<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepairLoop")
            .field("strategy", &self.strategy)
            .field("max_attempts", &self.max_attempts)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl<'a> RepairLoop<'a> {
    /// The default configuration: ban components together with their boundary, never give up.
    pub fn new() -> Self {
        Self {
            strategy: BanStrategy::default(),
            max_attempts: None,
            on_retry: None,
        }
    }

    /// Choose how disconnected components are banned.
    pub fn strategy(&mut self, strategy: BanStrategy) -> &mut Self {
        self.strategy = strategy;
        self
    }

    /// Give up with [`Error::AttemptLimit`] after `attempts` candidates.
    pub fn max_attempts(&mut self, attempts: NonZero<usize>) -> &mut Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Observe every rejected candidate.
    pub fn on_retry(&mut self, callback: impl FnMut(&Retry<'_>) + 'a) -> &mut Self {
        self.on_retry = Some(Box::new(callback));
        self
    }

    fn ban(&self, class: &[Var], adjacency: &impl Adjacency, model: &Model) -> Formula {
        let mut keys = class.to_vec();
        if self.strategy == BanStrategy::ClassAndBoundary {
            let members: HashSet<Var> = class.iter().copied().collect();
            keys.extend(class.iter()
                .flat_map(|key| adjacency.neighbors(*key))
                .filter(|neighbor| !members.contains(neighbor))
                .unique());
        }

        changes(&keys, model)
    }

    /// Solve, splitting each candidate into components until one comes back in a single piece.
    ///
    /// Fails with [`Error::Unsatisfiable`] once the bans leave no candidates.
    pub fn run(&mut self, solver: &mut impl Solver, adjacency: &impl Adjacency) -> Result<Model> {
        let mut attempt = 0;

        loop {
            if let Some(limit) = self.max_attempts {
                if attempt >= limit.get() {
                    return Err(Error::AttemptLimit(limit.get()));
                }
            }
            attempt += 1;

            if !solver.check()? {
                debug!(attempt, "no candidates left");
                return Err(Error::Unsatisfiable);
            }
            let Some(model) = solver.model() else {
                return Err(Error::Backend("satisfiable check produced no model".to_string()));
            };

            let mut components = UnionFind::new();
            for group in adjacency.links(&model) {
                let mut members = group.into_iter();
                let Some(first) = members.next() else {
                    continue;
                };
                components.add(first);
                for other in members {
                    components.union(first, other);
                }
            }
            let classes = components.classes();

            if classes.len() == 1 {
                info!(attempt, size = classes[0].len(), "found connected solution");
                return Ok(model);
            }

            info!(attempt, components = classes.len(), "found disconnected solution; attempting again");
            if let Some(callback) = self.on_retry.as_mut() {
                callback(&Retry { attempt, classes: &classes, model: &model });
            }

            if classes.is_empty() {
                // nothing connected at all; the whole candidate has to go
                let keys = adjacency.keys();
                if keys.is_empty() {
                    return Err(Error::Unsatisfiable);
                }
                solver.add(changes(&keys, &model))?;
                continue;
            }

            for class in &classes {
                trace!(attempt, size = class.len(), "banning component");
                solver.add(self.ban(class, adjacency, &model))?;
            }
        }
    }
}

// at least one of `keys` takes a value other than the one in `model`
fn changes(keys: &[Var], model: &Model) -> Formula {
    Formula::any(keys.iter().map(|key| match model.value(*key) {
        Some(value) => Term::from(*key).differs(value),
        None => Formula::invalid(),
    }))
}

/// Run a [`RepairLoop`] with the default configuration.
pub fn solve_connected(solver: &mut impl Solver, adjacency: &impl Adjacency) -> Result<Model> {
    RepairLoop::new().run(solver, adjacency)
}

/// Cells holding 1 must form one orthogonally (or, on hex boards, edge-) connected region.
#[derive(Clone, Debug)]
pub struct CellRegion {
    graph: UnGraphMap<Var, ()>,
}

impl CellRegion {
    fn from_pairs(keys: impl IntoIterator<Item = Var>, pairs: impl IntoIterator<Item = (Var, Var)>) -> Self {
        let mut graph = UnGraphMap::new();
        for key in keys {
            graph.add_node(key);
        }
        for (a, b) in pairs {
            graph.add_edge(a, b, ());
        }
        Self { graph }
    }
}

impl From<&Grid<Var>> for CellRegion {
    fn from(grid: &Grid<Var>) -> Self {
        let cells = grid.cells();
        Self::from_pairs(
            cells.iter().filter_map(|cell| cell.var().copied()),
            cells.iter().flat_map(|cell| [cell.right(), cell.below()]
                .into_iter()
                .filter_map(move |other| Some((*cell.var()?, *other.var()?)))),
        )
    }
}

impl From<&HexGrid<Var>> for CellRegion {
    fn from(grid: &HexGrid<Var>) -> Self {
        let cells = grid.cells();
        Self::from_pairs(
            cells.iter().filter_map(|cell| cell.var().copied()),
            cells.iter().flat_map(|cell| cell.neighbors()
                .into_iter()
                .filter_map(move |other| Some((*cell.var()?, *other.var()?)))),
        )
    }
}

impl Adjacency for CellRegion {
    fn keys(&self) -> Vec<Var> {
        self.graph.nodes().collect_vec()
    }

    fn links(&self, model: &Model) -> Vec<Vec<Var>> {
        let filled = |key: Var| model.value(key) == Some(1);

        self.graph.nodes()
            .filter(|key| filled(*key))
            .map(|key| vec![key])
            .chain(self.graph.all_edges()
                .filter(|(a, b, _)| filled(*a) && filled(*b))
                .map(|(a, b, _)| vec![a, b]))
            .collect_vec()
    }

    fn neighbors(&self, key: Var) -> Vec<Var> {
        if !self.graph.contains_node(key) {
            return Vec::new();
        }
        self.graph.neighbors(key).collect_vec()
    }
}

/// Edges holding 1 must form one connected figure, meeting each other at points.
#[derive(Clone, Debug)]
pub struct EdgeLoop {
    corners: Vec<Vec<Var>>,
    graph: UnGraphMap<Var, ()>,
}

impl EdgeLoop {
    fn from_corners(corners: Vec<Vec<Var>>) -> Self {
        let mut graph = UnGraphMap::new();
        for corner in &corners {
            for key in corner {
                graph.add_node(*key);
            }
            for (a, b) in corner.iter().tuple_combinations() {
                graph.add_edge(*a, *b, ());
            }
        }
        Self { corners, graph }
    }
}

impl From<&Grid<Var>> for EdgeLoop {
    fn from(grid: &Grid<Var>) -> Self {
        Self::from_corners(grid.points()
            .iter()
            .map(|point| point.edges().iter().filter_map(|edge| edge.var().copied()).collect_vec())
            .collect_vec())
    }
}

impl From<&HexGrid<Var>> for EdgeLoop {
    fn from(grid: &HexGrid<Var>) -> Self {
        Self::from_corners(grid.points()
            .iter()
            .map(|point| point.edges().iter().filter_map(|edge| edge.var().copied()).collect_vec())
            .collect_vec())
    }
}

impl Adjacency for EdgeLoop {
    fn keys(&self) -> Vec<Var> {
        self.graph.nodes().collect_vec()
    }

    fn links(&self, model: &Model) -> Vec<Vec<Var>> {
        self.corners.iter()
            .map(|corner| corner.iter()
                .copied()
                .filter(|key| model.value(*key) == Some(1))
                .collect_vec())
            .filter(|group| !group.is_empty())
            .collect_vec()
    }

    fn neighbors(&self, key: Var) -> Vec<Var> {
        if !self.graph.contains_node(key) {
            return Vec::new();
        }
        self.graph.neighbors(key).collect_vec()
    }
}

/// An [`Adjacency`] assembled from closures, for connectivity rules the built-in ones do not cover.
pub struct AdjacencyFn<'a> {
    keys: Vec<Var>,
    links: Box<dyn Fn(&Model) -> Vec<Vec<Var>> + 'a>,
    neighbors: Option<Box<dyn Fn(Var) -> Vec<Var> + 'a>>,
}

impl<'a> AdjacencyFn<'a> {
    /// Connectivity over `keys`, with groups produced by `links`.
    pub fn new(keys: Vec<Var>, links: impl Fn(&Model) -> Vec<Vec<Var>> + 'a) -> Self {
        Self {
            keys,
            links: Box::new(links),
            neighbors: None,
        }
    }

    /// Supply neighbours for boundary bans.
    pub fn with_neighbors(mut self, neighbors: impl Fn(Var) -> Vec<Var> + 'a) -> Self {
        self.neighbors = Some(Box::new(neighbors));
        self
    }
}

impl Adjacency for AdjacencyFn<'_> {
    fn keys(&self) -> Vec<Var> {
        self.keys.clone()
    }

    fn links(&self, model: &Model) -> Vec<Vec<Var>> {
        (self.links)(model)
    }

    fn neighbors(&self, key: Var) -> Vec<Var> {
        self.neighbors.as_ref().map_or_else(Vec::new, |neighbors| neighbors(key))
    }
}
