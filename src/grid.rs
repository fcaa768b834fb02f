//! Rectangular boards of square cells.
//!
//! A `width` x `height` board owns `width * height` cells, `width * (height + 1)` horizontal edges,
//! `(width + 1) * height` vertical edges and `(width + 1) * (height + 1)` points.
//! Horizontal edge `(x, y)` is the top side of cell `(x, y)`, vertical edge `(x, y)` is its left side and point `(x, y)` is its top-left corner.
//!
//! Entities live in [`Array2`]s and link to each other by [`Location`].
//! Navigation goes through the borrowed [`CellRef`], [`EdgeRef`] and [`PointRef`] views, which may be empty:
//! stepping off the board gives an empty ref rather than an error, and every further step from an empty ref stays empty.

use std::fmt::{Debug, Formatter};

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use strum::VariantArray;
use tracing::debug;
use unordered_pair::UnorderedPair;

use crate::error::{Error, Result};
use crate::expr::Term;
use crate::givens::{parse_givens, Given, Givens};
use crate::location::{Coord, Dimension, Location};
use crate::shape::{BoardShape, Orientation, SquareStep, Step};
use crate::solver::{Solver, Var};

/// Identifies one edge of a rectangular grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    /// Which array the edge lives in.
    pub orientation: Orientation,
    /// Coordinates within that array.
    pub location: Location,
}

/// A square cell.
#[derive(Clone, Debug)]
pub struct Cell<V> {
    /// Where the cell sits; `(0, 0)` is the top-left cell.
    pub location: Location,
    /// The variable attached to this cell, if any.
    pub var: Option<V>,
    /// The clue printed in this cell, if any.
    pub given: Option<Given>,
    // indexed by SquareStep
    neighbors: [Option<Location>; 4],
    edges: [EdgeKey; 4],
    // top-left, top-right, bottom-left, bottom-right
    points: [Location; 4],
}

/// A cell side, horizontal or vertical.
#[derive(Clone, Debug)]
pub struct Edge<V> {
    /// Where the edge sits within the array for its orientation.
    pub location: Location,
    /// Whether the edge runs horizontally or vertically.
    pub orientation: Orientation,
    /// The variable attached to this edge, if any.
    pub var: Option<V>,
    // above, below for horizontal edges; left, right for vertical ones
    cells: [Option<Location>; 2],
    // left, right for horizontal edges; above, below for vertical ones
    points: [Location; 2],
    // the next edge along the same line, in the same order as `points`
    colinear: [Option<Location>; 2],
}

/// A lattice point where up to four edges meet.
#[derive(Clone, Debug)]
pub struct Point<V> {
    /// Where the point sits; `(0, 0)` is the top-left corner of the board.
    pub location: Location,
    /// The variable attached to this point, if any.
    pub var: Option<V>,
    // indexed by SquareStep
    edges: [Option<EdgeKey>; 4],
    points: [Option<Location>; 4],
    // top-left, top-right, bottom-left, bottom-right
    cells: [Option<Location>; 4],
}

/// A rectangular board whose cells, edges and points each carry an optional `V`.
#[derive(Clone)]
pub struct Grid<V> {
    dims: (Dimension, Dimension),
    basename: String,
    cells: Array2<Cell<V>>,
    horizs: Array2<Edge<V>>,
    verts: Array2<Edge<V>>,
    points: Array2<Point<V>>,
}

fn within(location: Location, width: usize, height: usize) -> Option<Location> {
    let (row, col) = location.as_index()?;
    (col < width && row < height).then_some(location)
}

impl<V> Grid<V> {
    /// Build a board `dims.0` cells wide and `dims.1` cells tall, with nothing attached.
    pub fn new(dims: (Dimension, Dimension)) -> Self {
        let (width, height) = (dims.0.get(), dims.1.get());

        let cells = Array2::from_shape_fn((height, width), |index| {
            let location = Location::from(index);
            let Location(x, y) = location;
            Cell {
                location,
                var: None,
                given: None,
                neighbors: std::array::from_fn(|i| within(SquareStep::VARIANTS[i].attempt_from(location), width, height)),
                edges: [
                    EdgeKey { orientation: Orientation::Horizontal, location },
                    EdgeKey { orientation: Orientation::Horizontal, location: Location(x, y + 1) },
                    EdgeKey { orientation: Orientation::Vertical, location },
                    EdgeKey { orientation: Orientation::Vertical, location: Location(x + 1, y) },
                ],
                points: [location, Location(x + 1, y), Location(x, y + 1), Location(x + 1, y + 1)],
            }
        });

        let horizs = Array2::from_shape_fn((height + 1, width), |index| {
            let location = Location::from(index);
            let Location(x, y) = location;
            Edge {
                location,
                orientation: Orientation::Horizontal,
                var: None,
                cells: [within(Location(x, y - 1), width, height), within(location, width, height)],
                points: [location, Location(x + 1, y)],
                colinear: [within(Location(x - 1, y), width, height + 1), within(Location(x + 1, y), width, height + 1)],
            }
        });

        let verts = Array2::from_shape_fn((height, width + 1), |index| {
            let location = Location::from(index);
            let Location(x, y) = location;
            Edge {
                location,
                orientation: Orientation::Vertical,
                var: None,
                cells: [within(Location(x - 1, y), width, height), within(location, width, height)],
                points: [location, Location(x, y + 1)],
                colinear: [within(Location(x, y - 1), width + 1, height), within(Location(x, y + 1), width + 1, height)],
            }
        });

        let points = Array2::from_shape_fn((height + 1, width + 1), |index| {
            let location = Location::from(index);
            let Location(x, y) = location;
            let vert = |at: Location| within(at, width + 1, height).map(|location| EdgeKey { orientation: Orientation::Vertical, location });
            let horiz = |at: Location| within(at, width, height + 1).map(|location| EdgeKey { orientation: Orientation::Horizontal, location });
            Point {
                location,
                var: None,
                edges: [vert(Location(x, y - 1)), vert(location), horiz(Location(x - 1, y)), horiz(location)],
                points: std::array::from_fn(|i| within(SquareStep::VARIANTS[i].attempt_from(location), width + 1, height + 1)),
                cells: [
                    within(Location(x - 1, y - 1), width, height),
                    within(Location(x, y - 1), width, height),
                    within(Location(x - 1, y), width, height),
                    within(location, width, height),
                ],
            }
        });

        debug!(width, height, "built rectangular grid");

        Self {
            dims,
            basename: String::new(),
            cells,
            horizs,
            verts,
            points,
        }
    }

    /// Set the prefix used when naming solver variables, so several boards can share one solver.
    pub fn named(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }

    /// The variable-name prefix.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    fn cell_at(&self, location: Location) -> Option<&Cell<V>> {
        self.cells.get(location.as_index()?)
    }

    fn edge_at(&self, key: EdgeKey) -> Option<&Edge<V>> {
        let index = key.location.as_index()?;
        match key.orientation {
            Orientation::Horizontal => self.horizs.get(index),
            Orientation::Vertical => self.verts.get(index),
        }
    }

    fn point_at(&self, location: Location) -> Option<&Point<V>> {
        self.points.get(location.as_index()?)
    }

    fn cell_ref(&self, location: Option<Location>) -> CellRef<'_, V> {
        CellRef { grid: self, cell: location.and_then(|location| self.cell_at(location)) }
    }

    fn edge_ref(&self, key: Option<EdgeKey>) -> EdgeRef<'_, V> {
        EdgeRef { grid: self, edge: key.and_then(|key| self.edge_at(key)) }
    }

    fn point_ref(&self, location: Option<Location>) -> PointRef<'_, V> {
        PointRef { grid: self, point: location.and_then(|location| self.point_at(location)) }
    }

    /// The cell at `(x, y)`, or an empty ref off the board.
    pub fn cell(&self, x: Coord, y: Coord) -> CellRef<'_, V> {
        self.cell_ref(Some(Location(x, y)))
    }

    /// The horizontal edge at `(x, y)`, or an empty ref off the board.
    pub fn horiz(&self, x: Coord, y: Coord) -> EdgeRef<'_, V> {
        self.edge_ref(Some(EdgeKey { orientation: Orientation::Horizontal, location: Location(x, y) }))
    }

    /// The vertical edge at `(x, y)`, or an empty ref off the board.
    pub fn vert(&self, x: Coord, y: Coord) -> EdgeRef<'_, V> {
        self.edge_ref(Some(EdgeKey { orientation: Orientation::Vertical, location: Location(x, y) }))
    }

    /// The edge identified by `key`, or an empty ref off the board.
    pub fn edge(&self, key: EdgeKey) -> EdgeRef<'_, V> {
        self.edge_ref(Some(key))
    }

    /// The point at `(x, y)`, or an empty ref off the board.
    pub fn point(&self, x: Coord, y: Coord) -> PointRef<'_, V> {
        self.point_ref(Some(Location(x, y)))
    }

    /// The edge separating two cells, or an empty ref when they are not orthogonally adjacent.
    pub fn edge_between(&self, cells: UnorderedPair<Location>) -> EdgeRef<'_, V> {
        let UnorderedPair(a, b) = cells;
        match SquareStep::direction_to(a, b) {
            Some(dir) => self.cell_ref(Some(a)).edge(dir),
            None => self.edge_ref(None),
        }
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> Vec<CellRef<'_, V>> {
        self.cells.iter().map(|cell| CellRef { grid: self, cell: Some(cell) }).collect_vec()
    }

    /// Every horizontal edge, row by row.
    pub fn horizs(&self) -> Vec<EdgeRef<'_, V>> {
        self.horizs.iter().map(|edge| EdgeRef { grid: self, edge: Some(edge) }).collect_vec()
    }

    /// Every vertical edge, row by row.
    pub fn verts(&self) -> Vec<EdgeRef<'_, V>> {
        self.verts.iter().map(|edge| EdgeRef { grid: self, edge: Some(edge) }).collect_vec()
    }

    /// Every edge, horizontal ones first.
    pub fn edges(&self) -> Vec<EdgeRef<'_, V>> {
        self.horizs.iter()
            .chain(self.verts.iter())
            .map(|edge| EdgeRef { grid: self, edge: Some(edge) })
            .collect_vec()
    }

    /// Every point, row by row.
    pub fn points(&self) -> Vec<PointRef<'_, V>> {
        self.points.iter().map(|point| PointRef { grid: self, point: Some(point) }).collect_vec()
    }

    /// Cells grouped by row, top row first.
    pub fn cell_rows(&self) -> Vec<Vec<CellRef<'_, V>>> {
        self.cells.rows()
            .into_iter()
            .map(|row| row.into_iter().map(|cell| CellRef { grid: self, cell: Some(cell) }).collect_vec())
            .collect_vec()
    }

    /// Cells grouped by column, left column first.
    pub fn cell_cols(&self) -> Vec<Vec<CellRef<'_, V>>> {
        self.cells.columns()
            .into_iter()
            .map(|col| col.into_iter().map(|cell| CellRef { grid: self, cell: Some(cell) }).collect_vec())
            .collect_vec()
    }

    /// Cells grouped into `box_width` x `box_height` boxes, left to right then top to bottom.
    pub fn cell_boxes(&self, box_height: usize, box_width: usize) -> Result<Vec<Vec<CellRef<'_, V>>>> {
        let (width, height) = (self.width(), self.height());
        if box_width == 0 || box_height == 0 || width % box_width != 0 || height % box_height != 0 {
            return Err(Error::BoxMismatch { width, height, box_width, box_height });
        }

        Ok((0..height / box_height)
            .cartesian_product(0..width / box_width)
            .map(|(box_y, box_x)| {
                (0..box_height)
                    .cartesian_product(0..box_width)
                    .map(|(dy, dx)| self.cell_ref(Some(Location((box_x * box_width + dx) as Coord, (box_y * box_height + dy) as Coord))))
                    .collect_vec()
            })
            .collect_vec())
    }

    /// Attach a variable to every cell.
    pub fn attach_cells(&mut self, mut var_for: impl FnMut(&Cell<V>) -> Result<V>) -> Result<()> {
        for cell in self.cells.iter_mut() {
            cell.var = Some(var_for(cell)?);
        }
        Ok(())
    }

    /// Attach a variable to every edge, horizontal ones first.
    pub fn attach_edges(&mut self, mut var_for: impl FnMut(&Edge<V>) -> Result<V>) -> Result<()> {
        for edge in self.horizs.iter_mut().chain(self.verts.iter_mut()) {
            edge.var = Some(var_for(edge)?);
        }
        Ok(())
    }

    /// Attach a variable to every point.
    pub fn attach_points(&mut self, mut var_for: impl FnMut(&Point<V>) -> Result<V>) -> Result<()> {
        for point in self.points.iter_mut() {
            point.var = Some(var_for(point)?);
        }
        Ok(())
    }

    /// Record the clues in `givens` on each cell, then attach whatever `init` makes of the cell.
    pub fn init_cells(&mut self, givens: impl Into<Givens>, init: impl FnMut(&Cell<V>) -> Result<V>) -> Result<()> {
        let parsed = parse_givens(self.width(), self.height(), givens)?;
        for (cell, given) in self.cells.iter_mut().zip(parsed.iter()) {
            cell.given = *given;
        }

        self.attach_cells(init)
    }

    /// Cell adjacency as a graph over cell locations.
    pub fn cell_graph(&self) -> UnGraphMap<Location, ()> {
        let mut graph = UnGraphMap::with_capacity(self.cells.len(), 2 * self.cells.len());
        for cell in self.cells.iter() {
            graph.add_node(cell.location);
            for dir in SquareStep::FORWARD_VARIANTS {
                if let Some(neighbor) = cell.neighbors[dir.index()] {
                    graph.add_edge(cell.location, neighbor, ());
                }
            }
        }
        graph
    }

    /// The point lattice as a graph, each graph edge weighted by the board edge it stands for.
    pub fn point_graph(&self) -> UnGraphMap<Location, EdgeKey> {
        let mut graph = UnGraphMap::with_capacity(self.points.len(), self.horizs.len() + self.verts.len());
        for point in self.points.iter() {
            graph.add_node(point.location);
        }
        for edge in self.horizs.iter().chain(self.verts.iter()) {
            graph.add_edge(edge.points[0], edge.points[1], EdgeKey { orientation: edge.orientation, location: edge.location });
        }
        graph
    }
}

impl Grid<Var> {
    /// Declare one integer variable per cell ranging over `min..=max`, named `{basename}cell_{x},{y}`.
    pub fn declare_cells(&mut self, solver: &mut impl Solver, min: i64, max: i64) -> Result<()> {
        let basename = self.basename.clone();
        self.attach_cells(|cell| solver.new_int(&format!("{basename}cell_{},{}", cell.location.0, cell.location.1), min, max))
    }

    /// Declare one integer variable per edge ranging over `min..=max`, named `{basename}horiz_{x},{y}` or `{basename}vert_{x},{y}`.
    pub fn declare_edges(&mut self, solver: &mut impl Solver, min: i64, max: i64) -> Result<()> {
        let basename = self.basename.clone();
        self.attach_edges(|edge| {
            let kind = match edge.orientation {
                Orientation::Horizontal => "horiz",
                Orientation::Vertical => "vert",
            };
            solver.new_int(&format!("{basename}{kind}_{},{}", edge.location.0, edge.location.1), min, max)
        })
    }

    /// Declare one integer variable per point ranging over `min..=max`, named `{basename}point_{x},{y}`.
    pub fn declare_points(&mut self, solver: &mut impl Solver, min: i64, max: i64) -> Result<()> {
        let basename = self.basename.clone();
        self.attach_points(|point| solver.new_int(&format!("{basename}point_{},{}", point.location.0, point.location.1), min, max))
    }
}

/// A view of one cell of a [`Grid`], or of nothing at all when navigation left the board.
pub struct CellRef<'g, V> {
    grid: &'g Grid<V>,
    cell: Option<&'g Cell<V>>,
}

/// A view of one edge of a [`Grid`], or of nothing at all when navigation left the board.
pub struct EdgeRef<'g, V> {
    grid: &'g Grid<V>,
    edge: Option<&'g Edge<V>>,
}

/// A view of one point of a [`Grid`], or of nothing at all when navigation left the board.
pub struct PointRef<'g, V> {
    grid: &'g Grid<V>,
    point: Option<&'g Point<V>>,
}

// derived impls would demand V: Clone
impl<V> Clone for CellRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for CellRef<'_, V> {}

impl<V> Clone for EdgeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for EdgeRef<'_, V> {}

impl<V> Clone for PointRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for PointRef<'_, V> {}

impl<V> Debug for CellRef<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cell {
            Some(cell) => write!(f, "CellRef{:?}", cell.location),
            None => write!(f, "CellRef(invalid)"),
        }
    }
}

impl<V> Debug for EdgeRef<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.edge {
            Some(edge) => write!(f, "EdgeRef({:?}, {:?})", edge.orientation, edge.location),
            None => write!(f, "EdgeRef(invalid)"),
        }
    }
}

impl<V> Debug for PointRef<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.point {
            Some(point) => write!(f, "PointRef{:?}", point.location),
            None => write!(f, "PointRef(invalid)"),
        }
    }
}

impl<V> PartialEq for CellRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.location() == other.location()
    }
}

impl<V> PartialEq for EdgeRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<V> PartialEq for PointRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.location() == other.location()
    }
}

impl<'g, V> CellRef<'g, V> {
    /// Whether this ref points at a cell.
    pub fn is_valid(&self) -> bool {
        self.cell.is_some()
    }

    /// The underlying cell.
    pub fn get(&self) -> Option<&'g Cell<V>> {
        self.cell
    }

    /// Where the cell sits.
    pub fn location(&self) -> Option<Location> {
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
    pub fn step(&self, dir: SquareStep) -> CellRef<'g, V> {
        self.grid.cell_ref(self.cell.and_then(|cell| cell.neighbors[dir.index()]))
    }

    /// The cell above.
    pub fn above(&self) -> CellRef<'g, V> {
        self.step(SquareStep::Up)
    }

    /// The cell below.
    pub fn below(&self) -> CellRef<'g, V> {
        self.step(SquareStep::Down)
    }

    /// The cell to the left.
    pub fn left(&self) -> CellRef<'g, V> {
        self.step(SquareStep::Left)
    }

    /// The cell to the right.
    pub fn right(&self) -> CellRef<'g, V> {
        self.step(SquareStep::Right)
    }

    /// The side of this cell facing `dir`.
    pub fn edge(&self, dir: SquareStep) -> EdgeRef<'g, V> {
        self.grid.edge_ref(self.cell.map(|cell| cell.edges[dir.index()]))
    }

    /// The top side.
    pub fn edge_above(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Up)
    }

    /// The bottom side.
    pub fn edge_below(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Down)
    }

    /// The left side.
    pub fn edge_left(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Left)
    }

    /// The right side.
    pub fn edge_right(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Right)
    }

    fn corner(&self, which: usize) -> PointRef<'g, V> {
        self.grid.point_ref(self.cell.map(|cell| cell.points[which]))
    }

    /// The top-left corner.
    pub fn point_above_left(&self) -> PointRef<'g, V> {
        self.corner(0)
    }

    /// The top-right corner.
    pub fn point_above_right(&self) -> PointRef<'g, V> {
        self.corner(1)
    }

    /// The bottom-left corner.
    pub fn point_below_left(&self) -> PointRef<'g, V> {
        self.corner(2)
    }

    /// The bottom-right corner.
    pub fn point_below_right(&self) -> PointRef<'g, V> {
        self.corner(3)
    }

    /// Every neighbouring cell on the board.
    pub fn neighbors(&self) -> Vec<CellRef<'g, V>> {
        SquareStep::VARIANTS.iter()
            .map(|dir| self.step(*dir))
            .filter(CellRef::is_valid)
            .collect_vec()
    }

    /// All four sides.
    pub fn edges(&self) -> Vec<EdgeRef<'g, V>> {
        SquareStep::VARIANTS.iter()
            .map(|dir| self.edge(*dir))
            .filter(EdgeRef::is_valid)
            .collect_vec()
    }

    /// All four corners.
    pub fn points(&self) -> Vec<PointRef<'g, V>> {
        (0..4).map(|which| self.corner(which))
            .filter(PointRef::is_valid)
            .collect_vec()
    }
}

impl<'g, V: Copy + Into<Term>> CellRef<'g, V> {
    /// The attached variable as a term; invalid for empty refs and cells with nothing attached.
    pub fn term(&self) -> Term {
        self.var().map_or_else(Term::invalid, |var| (*var).into())
    }
}

impl<'g, V> EdgeRef<'g, V> {
    /// Whether this ref points at an edge.
    pub fn is_valid(&self) -> bool {
        self.edge.is_some()
    }

    /// The underlying edge.
    pub fn get(&self) -> Option<&'g Edge<V>> {
        self.edge
    }

    /// Identifies the edge.
    pub fn key(&self) -> Option<EdgeKey> {
        self.edge.map(|edge| EdgeKey { orientation: edge.orientation, location: edge.location })
    }

    /// Whether the edge runs horizontally or vertically.
    pub fn orientation(&self) -> Option<Orientation> {
        self.edge.map(|edge| edge.orientation)
    }

    /// The attached variable.
    pub fn var(&self) -> Option<&'g V> {
        self.edge.and_then(|edge| edge.var.as_ref())
    }

    fn cell_slot(&self, orientation: Orientation, which: usize) -> CellRef<'g, V> {
        self.grid.cell_ref(self.edge
            .filter(|edge| edge.orientation == orientation)
            .and_then(|edge| edge.cells[which]))
    }

    fn point_slot(&self, orientation: Orientation, which: usize) -> PointRef<'g, V> {
        self.grid.point_ref(self.edge
            .filter(|edge| edge.orientation == orientation)
            .map(|edge| edge.points[which]))
    }

    fn colinear_slot(&self, orientation: Orientation, which: usize) -> EdgeRef<'g, V> {
        self.grid.edge_ref(self.edge
            .filter(|edge| edge.orientation == orientation)
            .and_then(|edge| edge.colinear[which])
            .map(|location| EdgeKey { orientation, location }))
    }

    /// For a horizontal edge, the cell above it.
    pub fn cell_above(&self) -> CellRef<'g, V> {
        self.cell_slot(Orientation::Horizontal, 0)
    }

    /// For a horizontal edge, the cell below it.
    pub fn cell_below(&self) -> CellRef<'g, V> {
        self.cell_slot(Orientation::Horizontal, 1)
    }

    /// For a vertical edge, the cell to its left.
    pub fn cell_left(&self) -> CellRef<'g, V> {
        self.cell_slot(Orientation::Vertical, 0)
    }

    /// For a vertical edge, the cell to its right.
    pub fn cell_right(&self) -> CellRef<'g, V> {
        self.cell_slot(Orientation::Vertical, 1)
    }

    /// For a horizontal edge, its left end.
    pub fn point_left(&self) -> PointRef<'g, V> {
        self.point_slot(Orientation::Horizontal, 0)
    }

    /// For a horizontal edge, its right end.
    pub fn point_right(&self) -> PointRef<'g, V> {
        self.point_slot(Orientation::Horizontal, 1)
    }

    /// For a vertical edge, its top end.
    pub fn point_above(&self) -> PointRef<'g, V> {
        self.point_slot(Orientation::Vertical, 0)
    }

    /// For a vertical edge, its bottom end.
    pub fn point_below(&self) -> PointRef<'g, V> {
        self.point_slot(Orientation::Vertical, 1)
    }

    /// For a horizontal edge, the next horizontal edge to the left.
    pub fn edge_left(&self) -> EdgeRef<'g, V> {
        self.colinear_slot(Orientation::Horizontal, 0)
    }

    /// For a horizontal edge, the next horizontal edge to the right.
    pub fn edge_right(&self) -> EdgeRef<'g, V> {
        self.colinear_slot(Orientation::Horizontal, 1)
    }

    /// For a vertical edge, the next vertical edge above.
    pub fn edge_above(&self) -> EdgeRef<'g, V> {
        self.colinear_slot(Orientation::Vertical, 0)
    }

    /// For a vertical edge, the next vertical edge below.
    pub fn edge_below(&self) -> EdgeRef<'g, V> {
        self.colinear_slot(Orientation::Vertical, 1)
    }

    /// The one or two cells this edge separates.
    pub fn cells(&self) -> Vec<CellRef<'g, V>> {
        self.edge.map_or_else(Vec::new, |edge| edge.cells.iter()
            .map(|location| self.grid.cell_ref(*location))
            .filter(CellRef::is_valid)
            .collect_vec())
    }

    /// Both ends.
    pub fn points(&self) -> Vec<PointRef<'g, V>> {
        self.edge.map_or_else(Vec::new, |edge| edge.points.iter()
            .map(|location| self.grid.point_ref(Some(*location)))
            .collect_vec())
    }

    /// Every other edge sharing an end with this one.
    pub fn neighbors(&self) -> Vec<EdgeRef<'g, V>> {
        let this = self.key();
        self.points()
            .into_iter()
            .flat_map(|point| point.edges())
            .filter(|edge| edge.key() != this)
            .collect_vec()
    }

    /// Whether this edge lies on the rim of the board.
    pub fn is_outside(&self) -> bool {
        self.edge.is_some_and(|edge| edge.cells.iter().any(Option::is_none))
    }
}

impl<'g, V: Copy + Into<Term>> EdgeRef<'g, V> {
    /// The attached variable as a term; invalid for empty refs and edges with nothing attached.
    pub fn term(&self) -> Term {
        self.var().map_or_else(Term::invalid, |var| (*var).into())
    }
}

impl<'g, V> PointRef<'g, V> {
    /// Whether this ref points at a point.
    pub fn is_valid(&self) -> bool {
        self.point.is_some()
    }

    /// The underlying point.
    pub fn get(&self) -> Option<&'g Point<V>> {
        self.point
    }

    /// Where the point sits.
    pub fn location(&self) -> Option<Location> {
        self.point.map(|point| point.location)
    }

    /// The attached variable.
    pub fn var(&self) -> Option<&'g V> {
        self.point.and_then(|point| point.var.as_ref())
    }

    /// The edge leaving this point in direction `dir`.
    pub fn edge(&self, dir: SquareStep) -> EdgeRef<'g, V> {
        self.grid.edge_ref(self.point.and_then(|point| point.edges[dir.index()]))
    }

    /// The vertical edge leaving upward.
    pub fn edge_above(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Up)
    }

    /// The vertical edge leaving downward.
    pub fn edge_below(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Down)
    }

    /// The horizontal edge leaving leftward.
    pub fn edge_left(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Left)
    }

    /// The horizontal edge leaving rightward.
    pub fn edge_right(&self) -> EdgeRef<'g, V> {
        self.edge(SquareStep::Right)
    }

    /// The neighbouring point in direction `dir`.
    pub fn step(&self, dir: SquareStep) -> PointRef<'g, V> {
        self.grid.point_ref(self.point.and_then(|point| point.points[dir.index()]))
    }

    /// The point above.
    pub fn point_above(&self) -> PointRef<'g, V> {
        self.step(SquareStep::Up)
    }

    /// The point below.
    pub fn point_below(&self) -> PointRef<'g, V> {
        self.step(SquareStep::Down)
    }

    /// The point to the left.
    pub fn point_left(&self) -> PointRef<'g, V> {
        self.step(SquareStep::Left)
    }

    /// The point to the right.
    pub fn point_right(&self) -> PointRef<'g, V> {
        self.step(SquareStep::Right)
    }

    /// The edges meeting here: two at a board corner, three along the rim, four inside.
    pub fn edges(&self) -> Vec<EdgeRef<'g, V>> {
        SquareStep::VARIANTS.iter()
            .map(|dir| self.edge(*dir))
            .filter(EdgeRef::is_valid)
            .collect_vec()
    }

    /// The cells this point is a corner of.
    pub fn cells(&self) -> Vec<CellRef<'g, V>> {
        self.point.map_or_else(Vec::new, |point| point.cells.iter()
            .map(|location| self.grid.cell_ref(*location))
            .filter(CellRef::is_valid)
            .collect_vec())
    }

    /// The neighbouring points on the board.
    pub fn neighbors(&self) -> Vec<PointRef<'g, V>> {
        SquareStep::VARIANTS.iter()
            .map(|dir| self.step(*dir))
            .filter(PointRef::is_valid)
            .collect_vec()
    }

    /// Whether this point lies on the rim of the board.
    pub fn is_outside(&self) -> bool {
        self.point.is_some_and(|point| point.edges.iter().any(Option::is_none))
    }

    fn walk(&self, offset: isize, backward: SquareStep, forward: SquareStep) -> Result<EdgeRef<'g, V>> {
        if offset == 0 {
            return Err(Error::ZeroOffset);
        }

        let dir = if offset > 0 { forward } else { backward };
        let mut at = *self;
        for _ in 1..offset.unsigned_abs() {
            at = at.step(dir);
        }

        Ok(at.edge(dir))
    }

    /// The horizontal edge `offset` steps along the row: `1` is the edge to the right, `-1` the edge to the left,
    /// larger magnitudes continue past neighbouring points. Zero is an error.
    pub fn horiz_edge(&self, offset: isize) -> Result<EdgeRef<'g, V>> {
        self.walk(offset, SquareStep::Left, SquareStep::Right)
    }

    /// The vertical edge `offset` steps along the column: `1` is the edge below, `-1` the edge above,
    /// larger magnitudes continue past neighbouring points. Zero is an error.
    pub fn vert_edge(&self, offset: isize) -> Result<EdgeRef<'g, V>> {
        self.walk(offset, SquareStep::Up, SquareStep::Down)
    }
}

impl<'g, V: Copy + Into<Term>> PointRef<'g, V> {
    /// The attached variable as a term; invalid for empty refs and points with nothing attached.
    pub fn term(&self) -> Term {
        self.var().map_or_else(Term::invalid, |var| (*var).into())
    }
}
