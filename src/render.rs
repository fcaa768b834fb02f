//! Handing a solved board to something that draws it.
//!
//! Renderers walk every entity of a board and call back into a painter with the entity, the value the model gives its
//! variable and a [`Slot`] saying where on a common lattice the entity's centre sits.
//! Rectangular boards use a lattice at half-cell resolution: point `(x, y)` sits at `(2x, 2y)` and cell `(x, y)` at `(2x + 1, 2y + 1)`.
//! Hexagonal boards use columns half a cell's width apart and rows a quarter of a cell's height apart, doubled so that edge midpoints land on the lattice too.

use itertools::Itertools;
use ndarray::Array2;

use crate::givens::Given;
use crate::grid::{Cell, Edge, Grid, Point};
use crate::hex::{HexCell, HexEdge, HexGrid, HexPoint};
use crate::location::{HexLocation, Location};
use crate::shape::Orientation;
use crate::solver::{Model, Var};

/// Where an entity's centre is drawn, in lattice units; `column` grows rightward and `row` downward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Horizontal position.
    pub column: isize,
    /// Vertical position.
    pub row: isize,
}

/// Callbacks for drawing a rectangular board. Every method defaults to drawing nothing.
pub trait Painter {
    /// Draw a cell.
    fn cell(&mut self, _cell: &Cell<Var>, _value: Option<i64>, _slot: Slot) {}
    /// Draw an edge.
    fn edge(&mut self, _edge: &Edge<Var>, _value: Option<i64>, _slot: Slot) {}
    /// Draw a point.
    fn point(&mut self, _point: &Point<Var>, _value: Option<i64>, _slot: Slot) {}
}

/// Callbacks for drawing a hexagonal board. Every method defaults to drawing nothing.
pub trait HexPainter {
    /// Draw a cell.
    fn cell(&mut self, _cell: &HexCell<Var>, _value: Option<i64>, _slot: Slot) {}
    /// Draw an edge.
    fn edge(&mut self, _edge: &HexEdge<Var>, _value: Option<i64>, _slot: Slot) {}
    /// Draw a point.
    fn point(&mut self, _point: &HexPoint<Var>, _value: Option<i64>, _slot: Slot) {}
}

fn value_of(var: Option<&Var>, model: Option<&Model>) -> Option<i64> {
    model?.value(*var?)
}

fn square_slot(location: Location, offset: (isize, isize)) -> Slot {
    Slot { column: 2 * location.0 + offset.0, row: 2 * location.1 + offset.1 }
}

/// Walk `grid`, points first, then edges, then cells.
pub fn render_grid(grid: &Grid<Var>, model: Option<&Model>, painter: &mut impl Painter) {
    for point in grid.points().iter().filter_map(|point| point.get()) {
        painter.point(point, value_of(point.var.as_ref(), model), square_slot(point.location, (0, 0)));
    }
    for edge in grid.edges().iter().filter_map(|edge| edge.get()) {
        let offset = match edge.orientation {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        };
        painter.edge(edge, value_of(edge.var.as_ref(), model), square_slot(edge.location, offset));
    }
    for cell in grid.cells().iter().filter_map(|cell| cell.get()) {
        painter.cell(cell, value_of(cell.var.as_ref(), model), square_slot(cell.location, (1, 1)));
    }
}

// (column, row) of a hex place before doubling; unaffected by regularization
fn hex_position(location: HexLocation) -> (isize, isize) {
    let HexLocation(s, nw, ne) = location;
    (ne - nw, 2 * s - nw - ne)
}

fn hex_slot(location: HexLocation) -> Slot {
    let (column, row) = hex_position(location);
    Slot { column: 2 * column, row: 2 * row }
}

/// Walk `grid`, points first, then edges, then cells.
pub fn render_hex_grid(grid: &HexGrid<Var>, model: Option<&Model>, painter: &mut impl HexPainter) {
    for point in grid.points().iter().filter_map(|point| point.get()) {
        painter.point(point, value_of(point.var.as_ref(), model), hex_slot(point.location));
    }
    for edge in grid.edges().iter().filter_map(|edge| edge.get()) {
        let (a, b) = (hex_position(edge.key.at), hex_position(edge.key.far_end()));
        painter.edge(edge, value_of(edge.var.as_ref(), model), Slot { column: a.0 + b.0, row: a.1 + b.1 });
    }
    for cell in grid.cells().iter().filter_map(|cell| cell.get()) {
        painter.cell(cell, value_of(cell.var.as_ref(), model), hex_slot(cell.location));
    }
}

/// Draws a rectangular board as text: `+` at points, `-` and `|` for edges holding a nonzero value,
/// clues in cells, and `#` in clue-less cells holding a nonzero value.
pub struct TextRenderer {
    canvas: Array2<char>,
}

impl TextRenderer {
    /// A blank canvas sized for `grid`.
    pub fn new<V>(grid: &Grid<V>) -> Self {
        Self { canvas: Array2::from_elem((2 * grid.height() + 1, 2 * grid.width() + 1), ' ') }
    }

    /// Draw `grid` under `model` and return the text.
    pub fn render(grid: &Grid<Var>, model: Option<&Model>) -> String {
        let mut renderer = Self::new(grid);
        render_grid(grid, model, &mut renderer);
        renderer.print()
    }

    fn put(&mut self, slot: Slot, c: char) {
        if let (Ok(row), Ok(column)) = (usize::try_from(slot.row), usize::try_from(slot.column)) {
            if let Some(target) = self.canvas.get_mut((row, column)) {
                *target = c;
            }
        }
    }

    /// Dump the canvas, one line per row.
    pub fn print(&self) -> String {
        let mut out = String::with_capacity(self.canvas.nrows() * (self.canvas.ncols() + 1));

        for row in self.canvas.rows() {
            out.extend(row.iter());
            out.push('\n');
        }

        out
    }
}

impl Painter for TextRenderer {
    fn cell(&mut self, cell: &Cell<Var>, value: Option<i64>, slot: Slot) {
        let c = match (cell.given, value) {
            (Some(given), _) => given.as_char(),
            (None, Some(value)) if value != 0 => '#',
            _ => ' ',
        };
        self.put(slot, c);
    }

    fn edge(&mut self, edge: &Edge<Var>, value: Option<i64>, slot: Slot) {
        if value.is_some_and(|value| value != 0) {
            self.put(slot, match edge.orientation {
                Orientation::Horizontal => '-',
                Orientation::Vertical => '|',
            });
        }
    }

    fn point(&mut self, _point: &Point<Var>, _value: Option<i64>, slot: Slot) {
        self.put(slot, '+');
    }
}

/// Lay out the clues of a hexagonal board as text, one line per row, indented so that rows interleave.
pub fn hex_givens_text<V>(grid: &HexGrid<V>) -> String {
    let cells = grid.cells();
    let Some(min_column) = cells.iter().filter_map(|cell| cell.location()).map(|loc| hex_position(loc).0).min() else {
        return String::new();
    };

    (0..grid.rows())
        .map(|y| cells.iter()
            .filter(|cell| cell.location().is_some_and(|loc| loc.0 == y as isize))
            .fold(String::new(), |mut line, cell| {
                let column = cell.location().map_or(min_column, |loc| hex_position(loc).0);
                let pad = (column - min_column) as usize;
                while line.chars().count() < pad {
                    line.push(' ');
                }
                line.push(cell.given().as_ref().map_or('.', Given::as_char));
                line
            }))
        .join("\n")
}
