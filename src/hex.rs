//! Hexagonal boards of pointy-top cells laid out in rows.
//!
//! Places are named by [`HexLocation`] triples `(s, nw, ne)`, counting steps toward the S, NW and NE corners of a cell.
//! Cells sum to 0, southward points to 1 and northward points to -1; every accessor [regularizes](HexLocation::regularize) its input first.
//! An edge is keyed by its [`HexAxis`] and its southward end, i.e. the end from which it leaves S, NW or NE.
//!
//! The board is an oblong hexagon described by its row count, its widest row and the rows holding its west and east corners.
//! Cells are laid out row by row, then edges and points are collected as the sides and corners of those cells.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use strum::VariantArray;
use tracing::debug;
use unordered_pair::UnorderedPair;

use crate::error::{Error, Result};
use crate::expr::Term;
use crate::givens::Given;
use crate::location::{Coord, Dimension, HexLocation};
use crate::shape::{BoardShape, HexAxis, HexPointKind, HexStep, Step};
use crate::solver::{Solver, Var};

/// Identifies one edge of a hexagonal grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexEdgeKey {
    /// Which way the edge runs.
    pub axis: HexAxis,
    /// The southward end of the edge.
    pub at: HexLocation,
}

impl HexEdgeKey {
    /// The end of the edge other than [`at`](Self::at).
    pub fn far_end(&self) -> HexLocation {
        match self.axis {
            HexAxis::Vertical => self.at.offset_by((0, -1, -1)),
            HexAxis::NeSw => self.at.offset_by((-1, -1, 0)),
            HexAxis::NwSe => self.at.offset_by((-1, 0, -1)),
        }
    }

    // the cells on either side: W then E, NW then SE, NE then SW
    fn sides(&self) -> [HexLocation; 2] {
        match self.axis {
            HexAxis::Vertical => [self.at.offset_by((0, 0, -1)), self.at.offset_by((0, -1, 0))],
            HexAxis::NeSw => [self.at.offset_by((-1, 0, 0)), self.at.offset_by((0, -1, 0))],
            HexAxis::NwSe => [self.at.offset_by((-1, 0, 0)), self.at.offset_by((0, 0, -1))],
        }
    }
}

// the side of a cell facing each neighbour, indexed by HexStep
fn side_of(cell: HexLocation, dir: HexStep) -> HexEdgeKey {
    let (axis, offset) = match dir {
        HexStep::W => (HexAxis::Vertical, (0, 1, 0)),
        HexStep::NW => (HexAxis::NeSw, (0, 1, 0)),
        HexStep::NE => (HexAxis::NwSe, (0, 0, 1)),
        HexStep::E => (HexAxis::Vertical, (0, 0, 1)),
        HexStep::SE => (HexAxis::NeSw, (1, 0, 0)),
        HexStep::SW => (HexAxis::NwSe, (1, 0, 0)),
    };
    HexEdgeKey { axis, at: cell.offset_by(offset) }
}

// corners clockwise from N: N, upper right, lower right, S, lower left, upper left
fn corners_of(cell: HexLocation) -> [HexLocation; 6] {
    [(-1, 0, 0), (0, 0, 1), (0, -1, 0), (1, 0, 0), (0, 0, -1), (0, 1, 0)].map(|offset| cell.offset_by(offset))
}

fn kind_of(point: HexLocation) -> Option<HexPointKind> {
    match point.sum() {
        1 => Some(HexPointKind::Southward),
        -1 => Some(HexPointKind::Northward),
        _ => None,
    }
}

// southward points: S, NW, NE edges and N, SW, SE cells
// northward points: N, SE, SW edges and S, NW, NE cells
fn point_edges(point: HexLocation, kind: HexPointKind) -> [HexEdgeKey; 3] {
    match kind {
        HexPointKind::Southward => [
            HexEdgeKey { axis: HexAxis::Vertical, at: point },
            HexEdgeKey { axis: HexAxis::NwSe, at: point },
            HexEdgeKey { axis: HexAxis::NeSw, at: point },
        ],
        HexPointKind::Northward => [
            HexEdgeKey { axis: HexAxis::Vertical, at: point.offset_by((0, 1, 1)) },
            HexEdgeKey { axis: HexAxis::NwSe, at: point.offset_by((1, 0, 1)) },
            HexEdgeKey { axis: HexAxis::NeSw, at: point.offset_by((1, 1, 0)) },
        ],
    }
}

fn point_cells(point: HexLocation, kind: HexPointKind) -> [HexLocation; 3] {
    match kind {
        HexPointKind::Southward => [(-1, 0, 0), (0, 0, -1), (0, -1, 0)].map(|offset| point.offset_by(offset)),
        HexPointKind::Northward => [(1, 0, 0), (0, 1, 0), (0, 0, 1)].map(|offset| point.offset_by(offset)),
    }
}

/// A hexagonal cell.
#[derive(Clone, Debug)]
pub struct HexCell<V> {
    /// Where the cell sits; coordinates sum to 0.
    pub location: HexLocation,
    /// The variable attached to this cell, if any.
    pub var: Option<V>,
    /// The clue printed in this cell, if any.
    pub given: Option<Given>,
    // indexed by HexStep
    neighbors: [Option<HexLocation>; 6],
    edges: [HexEdgeKey; 6],
    points: [HexLocation; 6],
}

/// A side shared by up to two hexagonal cells.
#[derive(Clone, Debug)]
pub struct HexEdge<V> {
    /// Which way the edge runs and where its southward end is.
    pub key: HexEdgeKey,
    /// The variable attached to this edge, if any.
    pub var: Option<V>,
    cells: [Option<HexLocation>; 2],
    neighbors: Vec<HexEdgeKey>,
}

/// A corner where up to three edges meet.
#[derive(Clone, Debug)]
pub struct HexPoint<V> {
    /// Where the point sits; coordinates sum to 1 or -1.
    pub location: HexLocation,
    /// Which way the point's edges fan out.
    pub kind: HexPointKind,
    /// The variable attached to this point, if any.
    pub var: Option<V>,
    edges: [Option<HexEdgeKey>; 3],
    cells: [Option<HexLocation>; 3],
}

/// A hexagonal board whose cells, edges and points each carry an optional `V`.
#[derive(Clone)]
pub struct HexGrid<V> {
    rows: Dimension,
    row_width: Dimension,
    west_row: usize,
    east_row: usize,
    basename: String,
    cells: Vec<HexCell<V>>,
    edges: Vec<HexEdge<V>>,
    points: Vec<HexPoint<V>>,
    cell_index: HashMap<HexLocation, usize>,
    edge_index: HashMap<HexEdgeKey, usize>,
    point_index: HashMap<HexLocation, usize>,
}

fn row_bounds(row_width: usize, west_row: usize, east_row: usize, y: usize) -> (isize, HexLocation) {
    let (width, west, east, y) = (row_width as isize, west_row as isize, east_row as isize, y as isize);

    // above its corner, each side of the board steps outward by half a cell per row; below, inward
    let mut len = width + y - west.min(east);
    if y > west {
        len -= y - west;
    }
    if y > east {
        len -= y - east;
    }

    let start = if y <= west { HexLocation(y, 0, -y) } else { HexLocation(y, west - y, -west) };
    (len, start)
}

impl<V> HexGrid<V> {
    /// Build an oblong hexagonal board of `rows` rows, `row_width` cells across at its widest,
    /// with its west corner in row `west_row` and its east corner in row `east_row`.
    ///
    /// Fails with [`Error::DegenerateHexBoard`] if a corner row is off the board or some row would be empty.
    pub fn new(rows: Dimension, row_width: Dimension, west_row: usize, east_row: usize) -> Result<Self> {
        for corner in [west_row, east_row] {
            if corner >= rows.get() {
                return Err(Error::DegenerateHexBoard { row: corner as isize });
            }
        }

        let mut cells = Vec::new();
        for y in 0..rows.get() {
            let (len, start) = row_bounds(row_width.get(), west_row, east_row, y);
            if len <= 0 {
                return Err(Error::DegenerateHexBoard { row: y as isize });
            }
            cells.extend((0..len).map(|i| start.offset_by((0, -i, i))));
        }
        let cell_index: HashMap<HexLocation, usize> = cells.iter().enumerate().map(|(i, loc)| (*loc, i)).collect();

        let edge_keys = cells.iter()
            .flat_map(|cell| HexStep::VARIANTS.iter().map(move |dir| side_of(*cell, *dir)))
            .unique()
            .collect_vec();
        let edge_index: HashMap<HexEdgeKey, usize> = edge_keys.iter().enumerate().map(|(i, key)| (*key, i)).collect();

        let point_locs = cells.iter()
            .flat_map(|cell| corners_of(*cell))
            .unique()
            .collect_vec();
        let point_index: HashMap<HexLocation, usize> = point_locs.iter().enumerate().map(|(i, loc)| (*loc, i)).collect();

        let present_cell = |loc: HexLocation| cell_index.contains_key(&loc).then_some(loc);
        let present_edge = |key: HexEdgeKey| edge_index.contains_key(&key).then_some(key);

        let cells = cells.iter()
            .map(|location| HexCell {
                location: *location,
                var: None,
                given: None,
                neighbors: std::array::from_fn(|i| present_cell(HexStep::VARIANTS[i].attempt_from(*location))),
                edges: std::array::from_fn(|i| side_of(*location, HexStep::VARIANTS[i])),
                points: corners_of(*location),
            })
            .collect_vec();

        let points = point_locs.iter()
            .filter_map(|location| {
                let kind = kind_of(*location)?;
                Some(HexPoint {
                    location: *location,
                    kind,
                    var: None,
                    edges: point_edges(*location, kind).map(present_edge),
                    cells: point_cells(*location, kind).map(present_cell),
                })
            })
            .collect_vec();

        let edges = edge_keys.iter()
            .map(|key| {
                let neighbors = [key.at, key.far_end()].into_iter()
                    .filter_map(|end| Some(point_edges(end, kind_of(end)?)))
                    .flatten()
                    .filter(|other| other != key && edge_index.contains_key(other))
                    .collect_vec();
                HexEdge {
                    key: *key,
                    var: None,
                    cells: key.sides().map(present_cell),
                    neighbors,
                }
            })
            .collect_vec();

        debug!(rows = rows.get(), row_width = row_width.get(), west_row, east_row, cells = cells.len(), edges = edges.len(), points = points.len(), "built hexagonal grid");

        Ok(Self {
            rows,
            row_width,
            west_row,
            east_row,
            basename: String::new(),
            cells,
            edges,
            points,
            cell_index,
            edge_index,
            point_index,
        })
    }

    /// Set the prefix used when naming solver variables, so several boards can share one solver.
    pub fn named(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows.get()
    }

    /// Length of row `y` and its westernmost cell, or `None` for rows off the board.
    pub fn row_bounds(&self, y: usize) -> Option<(usize, HexLocation)> {
        if y >= self.rows.get() {
            return None;
        }
        let (len, start) = row_bounds(self.row_width.get(), self.west_row, self.east_row, y);
        Some((len as usize, start))
    }

    fn cell_ref(&self, location: Option<HexLocation>) -> HexCellRef<'_, V> {
        HexCellRef { grid: self, cell: location.and_then(|loc| self.cell_index.get(&loc)).map(|i| &self.cells[*i]) }
    }

    fn edge_ref(&self, key: Option<HexEdgeKey>) -> HexEdgeRef<'_, V> {
        HexEdgeRef { grid: self, edge: key.and_then(|key| self.edge_index.get(&key)).map(|i| &self.edges[*i]) }
    }

    fn point_ref(&self, location: Option<HexLocation>) -> HexPointRef<'_, V> {
        HexPointRef { grid: self, point: location.and_then(|loc| self.point_index.get(&loc)).map(|i| &self.points[*i]) }
    }

    /// The cell at `(s, nw, ne)`, or an empty ref if there is none.
    pub fn cell(&self, s: Coord, nw: Coord, ne: Coord) -> HexCellRef<'_, V> {
        self.cell_ref(Some(HexLocation(s, nw, ne).regularize()).filter(|loc| loc.sum() == 0))
    }

    /// The edge running along `axis` whose southward end is `(s, nw, ne)`, or an empty ref if there is none.
    pub fn edge(&self, axis: HexAxis, s: Coord, nw: Coord, ne: Coord) -> HexEdgeRef<'_, V> {
        self.edge_ref(Some(HexLocation(s, nw, ne).regularize())
            .filter(|loc| loc.sum() == 1)
            .map(|at| HexEdgeKey { axis, at }))
    }

    /// The vertical edge hanging from `(s, nw, ne)`.
    pub fn vert(&self, s: Coord, nw: Coord, ne: Coord) -> HexEdgeRef<'_, V> {
        self.edge(HexAxis::Vertical, s, nw, ne)
    }

    /// The edge leaving `(s, nw, ne)` toward the NE.
    pub fn ne_sw(&self, s: Coord, nw: Coord, ne: Coord) -> HexEdgeRef<'_, V> {
        self.edge(HexAxis::NeSw, s, nw, ne)
    }

    /// The edge leaving `(s, nw, ne)` toward the NW.
    pub fn nw_se(&self, s: Coord, nw: Coord, ne: Coord) -> HexEdgeRef<'_, V> {
        self.edge(HexAxis::NwSe, s, nw, ne)
    }

    /// The point at `(s, nw, ne)`, southward or northward depending on the regularized sum.
    pub fn point(&self, s: Coord, nw: Coord, ne: Coord) -> HexPointRef<'_, V> {
        self.point_ref(Some(HexLocation(s, nw, ne).regularize()).filter(|loc| loc.sum() != 0))
    }

    /// The edge separating two cells, or an empty ref when they are not adjacent.
    pub fn edge_between(&self, cells: UnorderedPair<HexLocation>) -> HexEdgeRef<'_, V> {
        let UnorderedPair(a, b) = cells;
        let (a, b) = (a.regularize(), b.regularize());
        match HexStep::direction_to(a, b) {
            Some(dir) => self.cell_ref(Some(a)).edge(dir),
            None => self.edge_ref(None),
        }
    }

    /// Every cell, row by row from the west.
    pub fn cells(&self) -> Vec<HexCellRef<'_, V>> {
        self.cells.iter().map(|cell| HexCellRef { grid: self, cell: Some(cell) }).collect_vec()
    }

    /// Every edge.
    pub fn edges(&self) -> Vec<HexEdgeRef<'_, V>> {
        self.edges.iter().map(|edge| HexEdgeRef { grid: self, edge: Some(edge) }).collect_vec()
    }

    /// Every point.
    pub fn points(&self) -> Vec<HexPointRef<'_, V>> {
        self.points.iter().map(|point| HexPointRef { grid: self, point: Some(point) }).collect_vec()
    }

    /// Attach a variable to every cell.
    pub fn attach_cells(&mut self, mut var_for: impl FnMut(&HexCell<V>) -> Result<V>) -> Result<()> {
        for cell in self.cells.iter_mut() {
            cell.var = Some(var_for(cell)?);
        }
        Ok(())
    }

    /// Attach a variable to every edge.
    pub fn attach_edges(&mut self, mut var_for: impl FnMut(&HexEdge<V>) -> Result<V>) -> Result<()> {
        for edge in self.edges.iter_mut() {
            edge.var = Some(var_for(edge)?);
        }
        Ok(())
    }

    /// Attach a variable to every point.
    pub fn attach_points(&mut self, mut var_for: impl FnMut(&HexPoint<V>) -> Result<V>) -> Result<()> {
        for point in self.points.iter_mut() {
            point.var = Some(var_for(point)?);
        }
        Ok(())
    }

    /// Record clues on cells, one list per row from the west, then attach whatever `init` makes of each cell.
    pub fn init_cells(&mut self, givens: &[Vec<Option<Given>>], init: impl FnMut(&HexCell<V>) -> Result<V>) -> Result<()> {
        if givens.len() != self.rows.get() {
            return Err(Error::ShapeMismatch {
                width: self.row_width.get(),
                height: self.rows.get(),
                reason: format!("expected {} rows, got {}", self.rows.get(), givens.len()),
            });
        }

        let mut at = 0;
        for (y, row) in givens.iter().enumerate() {
            let (len, _) = row_bounds(self.row_width.get(), self.west_row, self.east_row, y);
            if row.len() as isize != len {
                return Err(Error::ShapeMismatch {
                    width: self.row_width.get(),
                    height: self.rows.get(),
                    reason: format!("row {y} has {} entries, expected {len}", row.len()),
                });
            }
            for given in row {
                self.cells[at].given = *given;
                at += 1;
            }
        }

        self.attach_cells(init)
    }

    /// Cell adjacency as a graph over cell locations.
    pub fn cell_graph(&self) -> UnGraphMap<HexLocation, ()> {
        let mut graph = UnGraphMap::with_capacity(self.cells.len(), 3 * self.cells.len());
        for cell in &self.cells {
            graph.add_node(cell.location);
            for dir in HexStep::FORWARD_VARIANTS {
                if let Some(neighbor) = cell.neighbors[dir.index()] {
                    graph.add_edge(cell.location, neighbor, ());
                }
            }
        }
        graph
    }

    /// The point lattice as a graph, each graph edge weighted by the board edge it stands for.
    pub fn point_graph(&self) -> UnGraphMap<HexLocation, HexEdgeKey> {
        let mut graph = UnGraphMap::with_capacity(self.points.len(), self.edges.len());
        for point in &self.points {
            graph.add_node(point.location);
        }
        for edge in &self.edges {
            graph.add_edge(edge.key.at, edge.key.far_end(), edge.key);
        }
        graph
    }
}

impl HexGrid<Var> {
    /// Declare one integer variable per cell ranging over `min..=max`, named `{basename}cell_{s},{nw},{ne}`.
    pub fn declare_cells(&mut self, solver: &mut impl Solver, min: i64, max: i64) -> Result<()> {
        let basename = self.basename.clone();
        self.attach_cells(|cell| {
            let HexLocation(s, nw, ne) = cell.location;
            solver.new_int(&format!("{basename}cell_{s},{nw},{ne}"), min, max)
        })
    }

    /// Declare one integer variable per edge ranging over `min..=max`, named after its axis and southward end.
    pub fn declare_edges(&mut self, solver: &mut impl Solver, min: i64, max: i64) -> Result<()> {
        let basename = self.basename.clone();
        self.attach_edges(|edge| {
            let HexLocation(s, nw, ne) = edge.key.at;
            let kind = match edge.key.axis {
                HexAxis::Vertical => "vert",
                HexAxis::NeSw => "ne_sw",
                HexAxis::NwSe => "nw_se",
            };
            solver.new_int(&format!("{basename}{kind}_{s},{nw},{ne}"), min, max)
        })
    }

    /// Declare one integer variable per point ranging over `min..=max`, named `{basename}point_{s},{nw},{ne}`.
    pub fn declare_points(&mut self, solver: &mut impl Solver, min: i64, max: i64) -> Result<()> {
        let basename = self.basename.clone();
        self.attach_points(|point| {
            let HexLocation(s, nw, ne) = point.location;
            solver.new_int(&format!("{basename}point_{s},{nw},{ne}"), min, max)
        })
    }
}

/// A view of one cell of a [`HexGrid`], or of nothing when navigation left the board.
pub struct HexCellRef<'g, V> {
    grid: &'g HexGrid<V>,
    cell: Option<&'g HexCell<V>>,
}

/// A view of one edge of a [`HexGrid`], or of nothing when navigation left the board.
pub struct HexEdgeRef<'g, V> {
    grid: &'g HexGrid<V>,
    edge: Option<&'g HexEdge<V>>,
}

/// A view of one point of a [`HexGrid`], or of nothing when navigation left the board.
pub struct HexPointRef<'g, V> {
    grid: &'g HexGrid<V>,
    point: Option<&'g HexPoint<V>>,
}

impl<V> Clone for HexCellRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for HexCellRef<'_, V> {}

impl<V> Clone for HexEdgeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for HexEdgeRef<'_, V> {}

impl<V> Clone for HexPointRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for HexPointRef<'_, V> {}

impl<V> Debug for HexCellRef<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cell {
            Some(cell) => write!(f, "HexCellRef{:?}", cell.location),
            None => write!(f, "HexCellRef(invalid)"),
        }
    }
}

impl<V> Debug for HexEdgeRef<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.edge {
            Some(edge) => write!(f, "HexEdgeRef({:?}, {:?})", edge.key.axis, edge.key.at),
            None => write!(f, "HexEdgeRef(invalid)"),
        }
    }
}

impl<V> Debug for HexPointRef<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.point {
            Some(point) => write!(f, "HexPointRef{:?}", point.location),
            None => write!(f, "HexPointRef(invalid)"),
        }
    }
}

impl<V> PartialEq for HexCellRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.location() == other.location()
    }
}

impl<V> PartialEq for HexEdgeRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<V> PartialEq for HexPointRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.location() == other.location()
    }
}

impl<'g, V> HexCellRef<'g, V> {
    /// Whether this ref points at a cell.
    pub fn is_valid(&self) -> bool {
        self.cell.is_some()
    }

    /// The underlying cell.
    pub fn get(&self) -> Option<&'g HexCell<V>> {
        self.cell
    }

    /// Where the cell sits.
    pub fn location(&self) -> Option<HexLocation> {
        self.cell.map(|cell| cell.location)
    }

    /// The attached variable.
    pub fn var(&self) -> Option<&'g V> {
        self.cell.and_then(|cell| cell.var.as_ref())
    }

    /// The clue printed in this cell.
    pub fn given(&self) -> Option<Given> {
        self.cell.and_then(|cell| cell.given)
    }

    /// The neighbouring cell in direction `dir`.
    pub fn step(&self, dir: HexStep) -> HexCellRef<'g, V> {
        self.grid.cell_ref(self.cell.and_then(|cell| cell.neighbors[dir.index()]))
    }

    /// The side facing the neighbour in direction `dir`.
    pub fn edge(&self, dir: HexStep) -> HexEdgeRef<'g, V> {
        self.grid.edge_ref(self.cell.map(|cell| cell.edges[dir.index()]))
    }

    /// Every neighbouring cell on the board.
    pub fn neighbors(&self) -> Vec<HexCellRef<'g, V>> {
        HexStep::VARIANTS.iter()
            .map(|dir| self.step(*dir))
            .filter(HexCellRef::is_valid)
            .collect_vec()
    }

    /// All six sides.
    pub fn edges(&self) -> Vec<HexEdgeRef<'g, V>> {
        HexStep::VARIANTS.iter()
            .map(|dir| self.edge(*dir))
            .filter(HexEdgeRef::is_valid)
            .collect_vec()
    }

    /// All six corners, clockwise from the north.
    pub fn points(&self) -> Vec<HexPointRef<'g, V>> {
        self.cell.map_or_else(Vec::new, |cell| cell.points.iter()
            .map(|location| self.grid.point_ref(Some(*location)))
            .collect_vec())
    }
}

impl<'g, V: Copy + Into<Term>> HexCellRef<'g, V> {
    /// The attached variable as a term; invalid for empty refs and cells with nothing attached.
    pub fn term(&self) -> Term {
        self.var().map_or_else(Term::invalid, |var| (*var).into())
    }
}

impl<'g, V> HexEdgeRef<'g, V> {
    /// Whether this ref points at an edge.
    pub fn is_valid(&self) -> bool {
        self.edge.is_some()
    }

    /// The underlying edge.
    pub fn get(&self) -> Option<&'g HexEdge<V>> {
        self.edge
    }

    /// Identifies the edge.
    pub fn key(&self) -> Option<HexEdgeKey> {
        self.edge.map(|edge| edge.key)
    }

    /// Which way the edge runs.
    pub fn axis(&self) -> Option<HexAxis> {
        self.edge.map(|edge| edge.key.axis)
    }

    /// The attached variable.
    pub fn var(&self) -> Option<&'g V> {
        self.edge.and_then(|edge| edge.var.as_ref())
    }

    /// The one or two cells this edge separates.
    pub fn cells(&self) -> Vec<HexCellRef<'g, V>> {
        self.edge.map_or_else(Vec::new, |edge| edge.cells.iter()
            .map(|location| self.grid.cell_ref(*location))
            .filter(HexCellRef::is_valid)
            .collect_vec())
    }

    /// Both ends, southward end first.
    pub fn points(&self) -> Vec<HexPointRef<'g, V>> {
        self.edge.map_or_else(Vec::new, |edge| [edge.key.at, edge.key.far_end()].into_iter()
            .map(|location| self.grid.point_ref(Some(location)))
            .collect_vec())
    }

    /// Every other edge sharing an end with this one.
    pub fn neighbors(&self) -> Vec<HexEdgeRef<'g, V>> {
        self.edge.map_or_else(Vec::new, |edge| edge.neighbors.iter()
            .map(|key| self.grid.edge_ref(Some(*key)))
            .collect_vec())
    }

    /// Whether this edge lies on the rim of the board.
    pub fn is_outside(&self) -> bool {
        self.edge.is_some_and(|edge| edge.cells.iter().any(Option::is_none))
    }
}

impl<'g, V: Copy + Into<Term>> HexEdgeRef<'g, V> {
    /// The attached variable as a term; invalid for empty refs and edges with nothing attached.
    pub fn term(&self) -> Term {
        self.var().map_or_else(Term::invalid, |var| (*var).into())
    }
}

impl<'g, V> HexPointRef<'g, V> {
    /// Whether this ref points at a point.
    pub fn is_valid(&self) -> bool {
        self.point.is_some()
    }

    /// The underlying point.
    pub fn get(&self) -> Option<&'g HexPoint<V>> {
        self.point
    }

    /// Where the point sits.
    pub fn location(&self) -> Option<HexLocation> {
        self.point.map(|point| point.location)
    }

    /// Which way the point's edges fan out.
    pub fn kind(&self) -> Option<HexPointKind> {
        self.point.map(|point| point.kind)
    }

    /// The attached variable.
    pub fn var(&self) -> Option<&'g V> {
        self.point.and_then(|point| point.var.as_ref())
    }

    /// The edges meeting here: S, NW, NE for southward points and N, SE, SW for northward ones.
    pub fn edges(&self) -> Vec<HexEdgeRef<'g, V>> {
        self.point.map_or_else(Vec::new, |point| point.edges.iter()
            .map(|key| self.grid.edge_ref(*key))
            .filter(HexEdgeRef::is_valid)
            .collect_vec())
    }

    /// The cells this point is a corner of.
    pub fn cells(&self) -> Vec<HexCellRef<'g, V>> {
        self.point.map_or_else(Vec::new, |point| point.cells.iter()
            .map(|location| self.grid.cell_ref(*location))
            .filter(HexCellRef::is_valid)
            .collect_vec())
    }

    /// The points at the far ends of this point's edges.
    pub fn neighbors(&self) -> Vec<HexPointRef<'g, V>> {
        let this = self.location();
        self.edges()
            .into_iter()
            .flat_map(|edge| edge.points())
            .filter(|point| point.location() != this)
            .collect_vec()
    }

    /// Whether this point lies on the rim of the board.
    pub fn is_outside(&self) -> bool {
        self.point.is_some_and(|point| point.edges.iter().any(Option::is_none))
    }
}

impl<'g, V: Copy + Into<Term>> HexPointRef<'g, V> {
    /// The attached variable as a term; invalid for empty refs and points with nothing attached.
    pub fn term(&self) -> Term {
        self.var().map_or_else(Term::invalid, |var| (*var).into())
    }
}
