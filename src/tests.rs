#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use crate::location::Dimension;

    fn dims(width: usize, height: usize) -> (Dimension, Dimension) {
        (NonZero::new(width).unwrap(), NonZero::new(height).unwrap())
    }

    mod grid {
        use itertools::Itertools;
        use unordered_pair::UnorderedPair;

        use super::dims;
        use crate::error::Error;
        use crate::grid::Grid;
        use strum::VariantArray;

        use crate::location::Location;
        use crate::shape::{Orientation, SquareStep, Step};

        #[test]
        fn entity_counts() {
            for (width, height) in [(1, 1), (3, 2), (4, 4), (5, 1)] {
                let grid: Grid<()> = Grid::new(dims(width, height));
                assert_eq!(grid.cells().len(), width * height);
                assert_eq!(grid.verts().len(), (width + 1) * height);
                assert_eq!(grid.horizs().len(), width * (height + 1));
                assert_eq!(grid.edges().len(), (width + 1) * height + width * (height + 1));
                assert_eq!(grid.points().len(), (width + 1) * (height + 1));
            }
        }

        #[test]
        fn links_are_bidirectional() {
            for (width, height) in [(1, 1), (2, 3), (4, 4)] {
                let grid: Grid<()> = Grid::new(dims(width, height));

                for cell in grid.cells() {
                    for dir in SquareStep::VARIANTS {
                        let neighbor = cell.step(*dir);
                        if neighbor.is_valid() {
                            assert_eq!(neighbor.step(dir.invert()), cell);
                            assert_eq!(neighbor.edge(dir.invert()), cell.edge(*dir));
                        }
                    }
                    for edge in cell.edges() {
                        assert!(edge.cells().contains(&cell));
                    }
                    for point in cell.points() {
                        assert!(point.cells().contains(&cell));
                    }
                }

                for edge in grid.edges() {
                    for cell in edge.cells() {
                        assert!(cell.edges().contains(&edge));
                    }
                    for point in edge.points() {
                        assert!(point.edges().contains(&edge));
                    }
                }

                for point in grid.points() {
                    for edge in point.edges() {
                        assert!(edge.points().contains(&point));
                    }
                    for neighbor in point.neighbors() {
                        assert!(neighbor.neighbors().contains(&point));
                    }
                }
            }
        }

        #[test]
        fn cell_sides_and_edge_sides_agree() {
            let grid: Grid<()> = Grid::new(dims(3, 3));
            let cell = grid.cell(1, 1);

            assert_eq!(cell.edge_above().cell_below(), cell);
            assert_eq!(cell.edge_below().cell_above(), cell);
            assert_eq!(cell.edge_left().cell_right(), cell);
            assert_eq!(cell.edge_right().cell_left(), cell);
            assert_eq!(cell.edge_above(), grid.horiz(1, 1));
            assert_eq!(cell.edge_left(), grid.vert(1, 1));
            assert_eq!(cell.point_below_right(), grid.point(2, 2));

            // asking a horizontal edge for its left cell is meaningless
            assert!(!grid.horiz(1, 1).cell_left().is_valid());
            assert!(!grid.vert(1, 1).point_left().is_valid());

            assert_eq!(grid.horiz(1, 1).edge_right(), grid.horiz(2, 1));
            assert_eq!(grid.vert(1, 1).edge_below(), grid.vert(1, 2));
            assert_eq!(grid.horiz(1, 1).point_left(), grid.point(1, 1));
            assert_eq!(grid.vert(1, 1).point_below(), grid.point(1, 2));
        }

        #[test]
        fn point_degrees() {
            let grid: Grid<()> = Grid::new(dims(3, 2));

            assert_eq!(grid.point(0, 0).edges().len(), 2);
            assert_eq!(grid.point(3, 2).edges().len(), 2);
            assert_eq!(grid.point(1, 0).edges().len(), 3);
            assert_eq!(grid.point(0, 1).edges().len(), 3);
            assert_eq!(grid.point(1, 1).edges().len(), 4);
            assert!(grid.point(0, 1).is_outside());
            assert!(!grid.point(2, 1).is_outside());

            let degrees = grid.points().iter().map(|point| point.edges().len()).counts();
            assert_eq!(degrees[&2], 4);
            assert_eq!(degrees[&3], 2 * (3 - 1) + 2 * (2 - 1));
            assert_eq!(degrees[&4], (3 - 1) * (2 - 1));
        }

        #[test]
        fn boundary_refs_are_empty() {
            let grid: Grid<()> = Grid::new(dims(2, 2));

            assert!(!grid.cell(-1, 0).is_valid());
            assert!(!grid.cell(2, 0).is_valid());
            assert!(!grid.cell(0, 0).above().is_valid());
            assert!(!grid.cell(1, 1).right().is_valid());
            assert!(!grid.horiz(0, 3).is_valid());
            assert!(!grid.vert(3, 0).is_valid());
            assert!(!grid.point(3, 3).is_valid());

            // everything reachable from an empty ref stays empty
            let nowhere = grid.cell(0, 0).left();
            assert!(!nowhere.below().is_valid());
            assert!(!nowhere.edge_right().is_valid());
            assert!(!nowhere.edge_right().cell_right().is_valid());
            assert!(!nowhere.point_above_left().edge_right().is_valid());
            assert!(nowhere.neighbors().is_empty());
            assert!(nowhere.edges().is_empty());

            assert!(grid.horiz(0, 0).is_outside());
            assert!(!grid.horiz(0, 1).is_outside());
            assert_eq!(grid.horiz(0, 0).cells().len(), 1);
        }

        #[test]
        fn walking_along_points() {
            let grid: Grid<()> = Grid::new(dims(3, 3));
            let start = grid.point(1, 1);

            assert_eq!(start.horiz_edge(1).unwrap(), start.edge_right());
            assert_eq!(start.horiz_edge(-1).unwrap(), start.edge_left());
            assert_eq!(start.horiz_edge(2).unwrap(), grid.horiz(2, 1));
            assert_eq!(start.vert_edge(1).unwrap(), start.edge_below());
            assert_eq!(start.vert_edge(-1).unwrap(), grid.vert(1, 0));
            assert_eq!(start.vert_edge(2).unwrap(), grid.vert(1, 2));
            assert!(!start.horiz_edge(3).unwrap().is_valid());
            assert!(!start.vert_edge(-2).unwrap().is_valid());

            assert!(matches!(start.horiz_edge(0), Err(Error::ZeroOffset)));
            assert!(matches!(start.vert_edge(0), Err(Error::ZeroOffset)));
        }

        #[test]
        fn rows_columns_and_boxes() {
            let grid: Grid<()> = Grid::new(dims(4, 4));

            let rows = grid.cell_rows();
            assert_eq!(rows.len(), 4);
            assert_eq!(rows[2].iter().map(|cell| cell.location().unwrap()).collect_vec(),
                       (0..4).map(|x| Location(x, 2)).collect_vec());

            let cols = grid.cell_cols();
            assert_eq!(cols[3].iter().map(|cell| cell.location().unwrap()).collect_vec(),
                       (0..4).map(|y| Location(3, y)).collect_vec());

            let boxes = grid.cell_boxes(2, 2).unwrap();
            assert_eq!(boxes.len(), 4);
            assert_eq!(boxes[1].iter().map(|cell| cell.location().unwrap()).collect_vec(),
                       vec![Location(2, 0), Location(3, 0), Location(2, 1), Location(3, 1)]);

            assert!(matches!(grid.cell_boxes(3, 2), Err(Error::BoxMismatch { .. })));
        }

        #[test]
        fn edge_between_cells() {
            let grid: Grid<()> = Grid::new(dims(3, 3));

            let shared = grid.edge_between(UnorderedPair(Location(1, 1), Location(1, 2)));
            assert_eq!(shared.orientation(), Some(Orientation::Horizontal));
            assert_eq!(shared, grid.horiz(1, 2));
            assert_eq!(grid.edge_between(UnorderedPair(Location(2, 0), Location(1, 0))), grid.vert(2, 0));
            assert!(!grid.edge_between(UnorderedPair(Location(0, 0), Location(1, 1))).is_valid());
        }

        #[test]
        fn graph_exports() {
            let grid: Grid<()> = Grid::new(dims(3, 2));

            let cells = grid.cell_graph();
            assert_eq!(cells.node_count(), 6);
            assert_eq!(cells.edge_count(), 2 * 2 + 3);

            let points = grid.point_graph();
            assert_eq!(points.node_count(), 12);
            assert_eq!(points.edge_count(), grid.edges().len());
        }
    }

    mod givens {
        use ndarray::Array2;

        use super::dims;
        use crate::error::Error;
        use crate::givens::{parse_givens, Given, Givens};
        use crate::grid::Grid;

        #[test]
        fn equivalent_forms_agree() {
            let flat = parse_givens(3, 2, "1 AB 2").unwrap();
            let rows = parse_givens(3, 2, vec!["1 A", "B 2"]).unwrap();
            let nested = parse_givens(3, 2, vec![
                vec![Some(Given::Number(1)), None, Some(Given::Symbol('A'))],
                vec![Some(Given::Symbol('B')), None, Some(Given::Number(2))],
            ]).unwrap();
            let values = parse_givens(3, 2, Givens::Values(vec![
                Some(Given::Number(1)), None, Some(Given::Symbol('A')),
                Some(Given::Symbol('B')), None, Some(Given::Number(2)),
            ])).unwrap();

            assert_eq!(flat, rows);
            assert_eq!(flat, nested);
            assert_eq!(flat, values);
            assert_eq!(flat[[0, 0]], Some(Given::Number(1)));
            assert_eq!(flat[[1, 0]], Some(Given::Symbol('B')));
            assert_eq!(flat[[0, 1]], None);
        }

        #[test]
        fn shape_mismatch() {
            assert!(matches!(parse_givens(3, 2, "12345"), Err(Error::ShapeMismatch { .. })));
            assert!(matches!(parse_givens(3, 2, vec!["123", "45"]), Err(Error::ShapeMismatch { .. })));
            assert!(matches!(parse_givens(3, 2, vec!["123"]), Err(Error::ShapeMismatch { .. })));
            assert!(matches!(parse_givens(2, 2, vec![vec![None::<Given>, None], vec![None]]), Err(Error::ShapeMismatch { .. })));
        }

        #[test]
        fn init_cells_records_givens() {
            let mut grid: Grid<usize> = Grid::new(dims(2, 2));
            let mut seen = Vec::new();
            grid.init_cells(" 3x ", |cell| {
                seen.push(cell.given);
                Ok(seen.len())
            }).unwrap();

            assert_eq!(seen, vec![None, Some(Given::Number(3)), Some(Given::Symbol('x')), None]);
            assert_eq!(grid.cell(1, 0).given(), Some(Given::Number(3)));
            assert_eq!(grid.cell(0, 1).var(), Some(&3));
            assert_eq!(Array2::from_shape_vec((2, 2), seen).unwrap(), parse_givens(2, 2, " 3x ").unwrap());
        }
    }

    mod hex {
        use itertools::Itertools;
        use unordered_pair::UnorderedPair;

        use super::dims;
        use crate::error::Error;
        use crate::hex::HexGrid;
        use crate::location::{regularize, HexLocation};
        use crate::render::hex_givens_text;
        use strum::VariantArray;

        use crate::givens::Given;
        use crate::shape::{HexAxis, HexPointKind, HexStep, Step};

        // (rows, row width, west corner row, east corner row)
        const BOARDS: [(usize, usize, usize, usize); 7] =
            [(1, 1, 0, 0), (3, 3, 1, 1), (4, 3, 0, 3), (5, 4, 1, 3), (5, 4, 3, 1), (2, 5, 0, 0), (2, 5, 0, 1)];

        fn hexagon() -> HexGrid<()> {
            let (rows, width) = dims(3, 3);
            HexGrid::new(rows, width, 1, 1).unwrap()
        }

        #[test]
        fn regularize_lands_on_plane() {
            for s in -4..=4 {
                for nw in -4..=4 {
                    for ne in -4..=4 {
                        let r = regularize(s, nw, ne);
                        assert!((-1..=1).contains(&r.sum()));
                        // same place, shifted along (1, 1, 1)
                        let shift = s - r.0;
                        assert_eq!((nw - r.1, ne - r.2), (shift, shift));
                        assert_eq!(r.regularize(), r);
                    }
                }
            }
        }

        #[test]
        fn row_bounds() {
            let grid = hexagon();
            assert_eq!(grid.row_bounds(0), Some((2, HexLocation(0, 0, 0))));
            assert_eq!(grid.row_bounds(1), Some((3, HexLocation(1, 0, -1))));
            assert_eq!(grid.row_bounds(2), Some((2, HexLocation(2, -1, -1))));
            assert_eq!(grid.row_bounds(3), None);
        }

        #[test]
        fn euler_characteristic() {
            let single: HexGrid<()> = {
                let (rows, width) = dims(1, 1);
                HexGrid::new(rows, width, 0, 0).unwrap()
            };
            assert_eq!((single.cells().len(), single.edges().len(), single.points().len()), (1, 6, 6));

            let grid = hexagon();
            assert_eq!((grid.cells().len(), grid.edges().len(), grid.points().len()), (7, 30, 24));

            for (rows, width, west, east) in BOARDS {
                let (rows, width) = dims(rows, width);
                let grid: HexGrid<()> = HexGrid::new(rows, width, west, east).unwrap();
                let (v, e, f) = (grid.points().len() as isize, grid.edges().len() as isize, grid.cells().len() as isize);
                assert_eq!(v - e + f, 1);
            }
        }

        #[test]
        fn degenerate_boards_are_rejected() {
            // a one-cell-wide board pinched at both corners has nothing left in its middle row
            let (rows, width) = dims(3, 1);
            assert!(matches!(HexGrid::<()>::new(rows, width, 0, 0), Err(Error::DegenerateHexBoard { row: 1 })));
            assert!(matches!(HexGrid::<()>::new(rows, width, 3, 0), Err(Error::DegenerateHexBoard { row: 3 })));
        }

        #[test]
        fn links_are_bidirectional() {
            for (rows, width, west, east) in BOARDS {
                let (rows, width) = dims(rows, width);
                let grid: HexGrid<()> = HexGrid::new(rows, width, west, east).unwrap();

                for cell in grid.cells() {
                    for dir in HexStep::VARIANTS {
                        let neighbor = cell.step(*dir);
                        if neighbor.is_valid() {
                            assert_eq!(neighbor.step(dir.invert()), cell);
                            assert_eq!(cell.edge(*dir), neighbor.edge(dir.invert()));
                        }
                    }
                    for edge in cell.edges() {
                        assert!(edge.cells().contains(&cell));
                    }
                    for point in cell.points() {
                        assert!(point.cells().contains(&cell));
                    }
                    assert_eq!(cell.edges().len(), 6);
                    assert_eq!(cell.points().len(), 6);
                }

                for edge in grid.edges() {
                    for cell in edge.cells() {
                        assert!(cell.edges().contains(&edge));
                    }
                    for point in edge.points() {
                        assert!(point.edges().contains(&edge));
                    }
                    for other in edge.neighbors() {
                        assert!(other.neighbors().contains(&edge));
                    }
                }

                for point in grid.points() {
                    for edge in point.edges() {
                        assert!(edge.points().contains(&point));
                    }
                    for neighbor in point.neighbors() {
                        assert!(neighbor.neighbors().contains(&point));
                    }
                }
            }
        }

        #[test]
        fn centre_cell() {
            let grid = hexagon();
            let centre = grid.cell(1, 0, -1).step(HexStep::E);
            assert_eq!(centre.location(), Some(HexLocation(1, -1, 0)));
            assert_eq!(centre.neighbors().len(), 6);
            assert!(centre.edges().iter().all(|edge| !edge.is_outside()));
            assert!(centre.points().iter().all(|point| point.edges().len() == 3));

            // the same cell, written with a shifted triple
            assert_eq!(grid.cell(3, 1, 2), centre);

            let corner = grid.cell(0, 0, 0);
            assert_eq!(corner.neighbors().len(), 3);
            assert!(!corner.step(HexStep::NW).is_valid());
            assert!(corner.edge(HexStep::NW).is_outside());
        }

        #[test]
        fn accessors_respect_kinds() {
            let grid = hexagon();

            let top = grid.cell(0, 0, 0);
            assert_eq!(top.edge(HexStep::W), grid.vert(0, 1, 0));
            assert_eq!(top.edge(HexStep::NW), grid.ne_sw(0, 1, 0));
            assert_eq!(top.edge(HexStep::NE), grid.nw_se(0, 0, 1));
            assert_eq!(top.edge(HexStep::W).axis(), Some(HexAxis::Vertical));

            assert_eq!(grid.point(0, 1, 0).kind(), Some(HexPointKind::Southward));
            assert_eq!(grid.point(-1, 0, 0).kind(), Some(HexPointKind::Northward));
            assert!(!grid.point(0, 0, 0).is_valid());
            // a cell coordinate names no edge
            assert!(!grid.vert(0, 0, 0).is_valid());

            let shared = grid.edge_between(UnorderedPair(HexLocation(1, 0, -1), HexLocation(0, 0, 0)));
            assert_eq!(shared, top.edge(HexStep::SW));
            assert!(!grid.edge_between(UnorderedPair(HexLocation(0, 0, 0), HexLocation(2, -1, -1))).is_valid());
        }

        #[test]
        fn outside_counts() {
            let grid = hexagon();
            assert_eq!(grid.edges().iter().filter(|edge| edge.is_outside()).count(), 18);
            // rim points where a third edge still arrives from inside count as interior
            assert_eq!(grid.points().iter().filter(|point| point.is_outside()).count(), 12);

            let degrees = grid.points().iter().map(|point| point.edges().len()).counts();
            assert_eq!(degrees[&2], 12);
            assert_eq!(degrees[&3], 12);
        }

        #[test]
        fn graph_exports() {
            let grid = hexagon();
            assert_eq!(grid.cell_graph().edge_count(), 12);
            assert_eq!(grid.point_graph().edge_count(), 30);
        }

        #[test]
        fn givens_layout() {
            let mut grid = hexagon();
            grid.init_cells(&[
                vec![Some(Given::Number(1)), None],
                vec![None, Some(Given::Symbol('x')), None],
                vec![None, Some(Given::Number(2))],
            ], |_| Ok(())).unwrap();

            assert_eq!(hex_givens_text(&grid), " 1 .\n. x .\n . 2");
            assert!(matches!(grid.init_cells(&[vec![None]], |_| Ok(())), Err(Error::ShapeMismatch { .. })));
        }
    }

    mod union_find {
        use itertools::Itertools;

        use crate::union_find::UnionFind;

        fn sorted(mut classes: Vec<Vec<u32>>) -> Vec<Vec<u32>> {
            for class in classes.iter_mut() {
                class.sort();
            }
            classes.sort();
            classes
        }

        #[test]
        fn partition() {
            let mut uf = UnionFind::new();
            uf.union(1, 2);
            uf.union(3, 4);
            uf.union(2, 5);
            uf.add(6);

            assert_eq!(sorted(uf.classes()), vec![vec![1, 2, 5], vec![3, 4], vec![6]]);
            assert_eq!(uf.find(&1), uf.find(&5));
            assert_ne!(uf.find(&1), uf.find(&3));
            assert_eq!(uf.find(&7), None);
            assert_eq!(uf.len(), 6);
        }

        #[test]
        fn repeated_unions_change_nothing() {
            let mut uf = UnionFind::new();
            uf.union(1, 2);
            uf.union(2, 3);
            let before = sorted(uf.classes());

            uf.union(1, 3);
            uf.union(3, 1);
            uf.union(2, 2);
            assert_eq!(sorted(uf.classes()), before);
        }

        #[test]
        fn find_agrees_with_classes() {
            let mut uf = UnionFind::new();
            for (a, b) in (0..20u32).map(|i| (i, (i * 7) % 20)).collect_vec() {
                if a % 3 != 0 {
                    uf.union(a, b);
                } else {
                    uf.add(a);
                }
            }

            let classes = uf.classes();
            assert_eq!(classes.iter().map(Vec::len).sum::<usize>(), uf.len());
            for class in classes {
                let root = uf.find(&class[0]);
                assert!(class.iter().all(|key| uf.find(key) == root));
            }
        }

        #[test]
        fn union_points_first_root_at_second() {
            let mut uf = UnionFind::new();
            uf.union("a", "b");
            assert_eq!(uf.find(&"a"), Some("b"));
            uf.union("b", "c");
            assert_eq!(uf.find(&"a"), Some("c"));
        }
    }

    mod expr {
        use super::dims;
        use crate::expr::{Formula, Term};
        use crate::grid::Grid;
        use crate::solver::{Model, SatSolver, Solver, Var};

        #[test]
        fn invalid_propagates() {
            let mut solver = SatSolver::new();
            let x = solver.new_int("x", 0, 3).unwrap();

            assert!(!(Term::from(x) + Term::invalid()).is_valid());
            assert!(!(Term::invalid() * 2).is_valid());
            assert!(!(-Term::invalid()).is_valid());
            assert!(!Term::from(x).equals(Term::invalid()).is_valid());
            assert!(!Term::invalid().lt(x).is_valid());
            assert!(!(Term::from(x).equals(1) & Formula::invalid()).is_valid());
            assert!(!(Formula::invalid() | Term::from(x).equals(1)).is_valid());
            assert!(!(!Formula::invalid()).is_valid());
            assert!(!Formula::invalid().implies(Formula::constant(true)).is_valid());
            assert!(!Term::sum([Term::from(x), Term::invalid()]).is_valid());
            assert!(!Term::ite(Formula::constant(true), x, Term::invalid()).is_valid());
            assert!(!Formula::distinct([Term::from(x), Term::invalid()]).is_valid());
            assert!(!Term::from(None::<Var>).is_valid());

            assert!(Formula::all([Term::from(x).equals(1), Formula::invalid()]).is_valid());
            assert!(Formula::any([Formula::invalid()]).is_valid());
        }

        #[test]
        fn list_wrappers_read_invalid_as_false() {
            let model = Model::default();
            assert_eq!(model.holds(&Formula::all([Formula::constant(true), Formula::invalid()])), Some(false));
            assert_eq!(model.holds(&Formula::any([Formula::constant(true), Formula::invalid()])), Some(true));
            assert_eq!(model.holds(&Formula::any([Formula::invalid()])), Some(false));
        }

        #[test]
        fn off_board_rules_are_dropped() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(2, 2));
            grid.declare_cells(&mut solver, 0, 1).unwrap();

            let corner = grid.cell(0, 0);
            solver.add(corner.term().differs(corner.left().term())).unwrap();
            solver.add(corner.above().term().equals(1)).unwrap();
            assert_eq!(solver.constraint_count(), 0);

            solver.add(corner.term().differs(corner.right().term())).unwrap();
            assert_eq!(solver.constraint_count(), 1);
        }

        #[test]
        fn model_evaluation() {
            let mut solver = SatSolver::new();
            let (va, vb, unset) = (
                solver.new_int("a", 0, 9).unwrap(),
                solver.new_int("b", 0, 9).unwrap(),
                solver.new_int("unset", 0, 9).unwrap(),
            );
            let model: Model = [(va, 2), (vb, 5)].into_iter().collect();
            let (a, b) = (Term::from(va), Term::from(vb));

            assert_eq!(model.eval(&(a.clone() * 3 - b.clone())), Some(1));
            assert_eq!(model.eval(&Term::sum([a.clone(), b.clone(), Term::constant(1)])), Some(8));
            assert_eq!(model.eval(&Term::ite(a.clone().lt(b.clone()), 10, 20)), Some(10));
            assert_eq!(model.eval(&Term::switch(b.clone(), [(4, 40), (5, 50)], 0)), Some(50));
            assert_eq!(model.eval(&Term::switch(a.clone(), [(4, 40), (5, 50)], 0)), Some(0));
            assert_eq!(model.holds(&Formula::distinct([a.clone(), b.clone()])), Some(true));
            assert_eq!(model.holds(&a.clone().ge(2).iff(b.clone().le(4))), Some(false));
            assert_eq!(model.eval(&Term::from(unset)), None);
        }

        #[test]
        fn model_evaluation_overflow_is_none() {
            let mut solver = SatSolver::new();
            let x = solver.new_int("x", 0, 9).unwrap();
            let model: Model = [(x, 2)].into_iter().collect();

            assert_eq!(model.eval(&(Term::from(x) * i64::MAX)), None);
            assert_eq!(model.eval(&(Term::constant(i64::MAX) + x)), None);
            assert_eq!(model.eval(&(Term::constant(i64::MIN) - x)), None);
            assert_eq!(model.eval(&-Term::constant(i64::MIN)), None);
            assert_eq!(model.holds(&(Term::from(x) * i64::MAX).equals(0)), None);
            assert_eq!(model.eval(&(Term::from(x) * (i64::MAX / 2))), Some(i64::MAX - 1));
        }
    }

    mod solver {
        use crate::error::Error;
        use crate::expr::{Formula, Term};
        use crate::solver::{SatSolver, Solver};

        #[test]
        fn arithmetic_is_respected() {
            let mut solver = SatSolver::new();
            let x = solver.new_int("x", 0, 5).unwrap();
            let y = solver.new_int("y", -2, 2).unwrap();

            solver.add((Term::from(x) + y).equals(4)).unwrap();
            solver.add((Term::from(x) * y).equals(3)).unwrap();
            assert!(solver.check().unwrap());

            let model = solver.model().unwrap();
            let (x, y) = (model.value(x).unwrap(), model.value(y).unwrap());
            assert_eq!(x + y, 4);
            assert_eq!((x, y), (3, 1));
        }

        #[test]
        fn names_are_scoped() {
            let mut solver = SatSolver::new();
            let first = solver.new_int("a", 0, 3).unwrap();
            assert_eq!(solver.new_int("a", 0, 3).unwrap(), first);

            let fresh = solver.fresh_int("a", 0, 1).unwrap();
            let another = solver.fresh_int("a", 0, 1).unwrap();
            assert_ne!(fresh, another);
            assert_ne!(solver.name_of(fresh), solver.name_of(another));
            assert_eq!(solver.var_count(), 3);

            assert!(matches!(solver.new_int("empty", 2, 1), Err(Error::EmptyDomain { .. })));
        }

        #[test]
        fn incremental_checks() {
            let mut solver = SatSolver::new();
            let vars = (0..3).map(|i| solver.new_bool(&format!("b{i}")).unwrap()).collect::<Vec<_>>();

            solver.add(Formula::distinct(vars.iter().copied().map(Term::from))).unwrap();
            assert!(!solver.check().unwrap());

            let mut solver = SatSolver::new();
            let vars = (0..3).map(|i| solver.new_bool(&format!("b{i}")).unwrap()).collect::<Vec<_>>();
            solver.add(Term::sum(vars.iter().copied()).equals(1)).unwrap();
            assert!(solver.check().unwrap());

            let chosen = vars.iter().copied().find(|var| solver.model().unwrap().value(*var) == Some(1)).unwrap();
            solver.add(Formula::from(chosen).implies(Formula::constant(false))).unwrap();
            assert!(solver.check().unwrap());
            assert_eq!(solver.model().unwrap().value(chosen), Some(0));
        }

        #[test]
        fn switch_and_ite() {
            let mut solver = SatSolver::new();
            let x = solver.new_int("x", 0, 3).unwrap();
            let y = solver.new_int("y", 0, 100).unwrap();

            solver.add(Term::from(y).equals(Term::switch(Term::from(x), [(0, 10), (1, 20), (2, 30)], 99))).unwrap();
            solver.add(Term::from(x).equals(2)).unwrap();
            assert!(solver.check().unwrap());
            assert_eq!(solver.model().unwrap().value(y), Some(30));
        }

        #[test]
        fn variables_of_other_solvers_are_rejected() {
            let mut solver = SatSolver::new();
            let mine = solver.new_bool("mine").unwrap();
            let mut other = SatSolver::new();
            let foreign = other.new_bool("foreign").unwrap();
            assert_eq!(foreign.index(), mine.index());

            assert!(matches!(solver.add(Term::from(foreign).equals(1)), Err(Error::UnknownVariable(0))));
            assert_eq!(solver.name_of(foreign), None);
            assert_eq!(solver.constraint_count(), 0);

            solver.add(Term::from(mine).equals(0)).unwrap();
            assert!(solver.check().unwrap());
            let model = solver.model().unwrap();
            assert_eq!(model.value(mine), Some(0));
            assert_eq!(model.value(foreign), None);
        }

        #[test]
        fn failed_add_leaves_no_constraints() {
            let mut solver = SatSolver::new();
            let a = solver.new_bool("a").unwrap();
            let foreign = SatSolver::new().new_bool("foreign").unwrap();

            let conjunction = Formula::all([Term::from(a).equals(1), Term::from(foreign).equals(1)]);
            assert!(matches!(solver.add(conjunction), Err(Error::UnknownVariable(_))));
            let disjunction = Term::from(a).equals(1) | Term::from(foreign).equals(1);
            assert!(matches!(solver.add(disjunction), Err(Error::UnknownVariable(_))));
            assert_eq!(solver.constraint_count(), 0);

            solver.add(Term::from(a).equals(0)).unwrap();
            assert!(solver.check().unwrap());
            assert_eq!(solver.model().unwrap().value(a), Some(0));
        }

        #[test]
        fn overflowing_terms_are_rejected() {
            let mut solver = SatSolver::new();
            let x = solver.new_int("x", 0, 2).unwrap();

            assert!(matches!(solver.add((Term::from(x) * i64::MAX).equals(0)), Err(Error::ArithmeticOverflow)));
            assert!(matches!(solver.add((Term::constant(i64::MAX) + x).ge(0)), Err(Error::ArithmeticOverflow)));
            assert!(matches!(solver.add((-Term::constant(i64::MIN)).ge(x)), Err(Error::ArithmeticOverflow)));
            assert_eq!(solver.constraint_count(), 0);

            solver.add(Term::from(x).equals(2)).unwrap();
            assert!(solver.check().unwrap());
            assert_eq!(solver.model().unwrap().value(x), Some(2));
        }
    }

    mod connectivity {
        use std::cell::Cell;
        use std::num::NonZero;

        use itertools::Itertools;
        use petgraph::algo::connected_components;
        use petgraph::graphmap::UnGraphMap;

        use super::dims;
        use crate::connectivity::{solve_connected, AdjacencyFn, BanStrategy, CellRegion, EdgeLoop, RepairLoop};
        use crate::error::Error;
        use crate::expr::{Formula, Term};
        use crate::grid::Grid;
        use crate::render::TextRenderer;
        use crate::solver::{SatSolver, Solver, Var};

        // every point has zero or two lit edges around it
        fn loop_rules(grid: &Grid<Var>, solver: &mut SatSolver) {
            for point in grid.points() {
                let lit = Term::sum(point.edges().iter().map(|edge| edge.term()));
                solver.add(lit.clone().equals(0) | lit.equals(2)).unwrap();
            }
        }

        #[test]
        fn single_cell_loop() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(1, 1));
            grid.declare_edges(&mut solver, 0, 1).unwrap();
            loop_rules(&grid, &mut solver);

            let model = solve_connected(&mut solver, &EdgeLoop::from(&grid)).unwrap();
            assert!(grid.edges().iter().all(|edge| model.value(*edge.var().unwrap()) == Some(1)));

            assert_eq!(TextRenderer::render(&grid, Some(&model)), "+-+\n| |\n+-+\n");
        }

        #[test]
        fn region_grows_to_connect() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(3, 1));
            grid.declare_cells(&mut solver, 0, 1).unwrap();
            solver.add(grid.cell(0, 0).term().equals(1)).unwrap();
            solver.add(grid.cell(2, 0).term().equals(1)).unwrap();

            let retries = Cell::new(0);
            let model = RepairLoop::new()
                .on_retry(|retry| {
                    assert_eq!(retry.classes.len(), 2);
                    retries.set(retries.get() + 1);
                })
                .run(&mut solver, &CellRegion::from(&grid))
                .unwrap();

            assert_eq!(grid.cells().iter().map(|cell| model.value(*cell.var().unwrap())).collect_vec(), vec![Some(1); 3]);
            assert!(retries.get() <= 1);
            assert_eq!(TextRenderer::render(&grid, Some(&model)), "+ + + +\n # # # \n+ + + +\n");
        }

        #[test]
        fn forced_split_is_unsatisfiable() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(3, 3));
            grid.declare_edges(&mut solver, 0, 1).unwrap();
            loop_rules(&grid, &mut solver);

            // a 4 clue in a corner closes a square on its own, and 8 lit edges need a second square
            let corner = grid.cell(0, 0);
            solver.add(Term::sum(corner.edges().iter().map(|edge| edge.term())).equals(4)).unwrap();
            solver.add(Term::sum(grid.edges().iter().map(|edge| edge.term())).equals(8)).unwrap();

            let retries = Cell::new(0);
            let result = RepairLoop::new()
                .on_retry(|_| retries.set(retries.get() + 1))
                .run(&mut solver, &EdgeLoop::from(&grid));

            assert!(matches!(result, Err(Error::Unsatisfiable)));
            assert_eq!(retries.get(), 1);
        }

        #[test]
        fn loop_is_single_component() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(3, 3));
            grid.declare_edges(&mut solver, 0, 1).unwrap();
            loop_rules(&grid, &mut solver);

            let centre = grid.cell(1, 1);
            solver.add(Term::sum(centre.edges().iter().map(|edge| edge.term())).equals(0)).unwrap();
            solver.add(Term::sum(grid.edges().iter().map(|edge| edge.term())).ge(6)).unwrap();

            let model = RepairLoop::new()
                .max_attempts(NonZero::new(200).unwrap())
                .run(&mut solver, &EdgeLoop::from(&grid))
                .unwrap();

            let mut lit: UnGraphMap<_, ()> = UnGraphMap::new();
            for edge in grid.edges() {
                if model.value(*edge.var().unwrap()) == Some(1) {
                    let ends = edge.points().iter().map(|point| point.location().unwrap()).collect_vec();
                    lit.add_edge(ends[0], ends[1], ());
                }
            }

            assert!(lit.edge_count() >= 6);
            assert_eq!(connected_components(&lit), 1);
            assert!(lit.nodes().all(|point| lit.neighbors(point).count() == 2));
            assert!(centre.edges().iter().all(|edge| model.value(*edge.var().unwrap()) == Some(0)));
        }

        #[test]
        fn class_only_bans_the_component_outright() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(3, 1));
            grid.declare_cells(&mut solver, 0, 1).unwrap();
            solver.add(grid.cell(0, 0).term().equals(1)).unwrap();
            solver.add(grid.cell(1, 0).term().equals(0)).unwrap();
            solver.add(grid.cell(2, 0).term().equals(1)).unwrap();

            let result = RepairLoop::new()
                .strategy(BanStrategy::ClassOnly)
                .run(&mut solver, &CellRegion::from(&grid));
            assert!(matches!(result, Err(Error::Unsatisfiable)));
        }

        #[test]
        fn empty_candidates_are_rejected() {
            let mut solver = SatSolver::new();
            let a = solver.new_bool("a").unwrap();
            let b = solver.new_bool("b").unwrap();
            solver.add(Formula::from(b).implies(Formula::from(a))).unwrap();
            solver.add(Formula::from(b)).unwrap();

            let adjacency = AdjacencyFn::new(vec![a, b], |model| {
                [a, b].into_iter()
                    .filter(|var| model.value(*var) == Some(1))
                    .map(|var| vec![var])
                    .collect_vec()
            });
            let model = solve_connected(&mut solver, &adjacency);
            // a and b are both lit, which makes two components that can never merge
            assert!(matches!(model, Err(Error::Unsatisfiable)));

            let mut solver = SatSolver::new();
            let a = solver.new_bool("a").unwrap();
            let adjacency = AdjacencyFn::new(vec![a], |model| {
                (model.value(a) == Some(1)).then(|| vec![a]).into_iter().collect_vec()
            });
            let model = solve_connected(&mut solver, &adjacency).unwrap();
            assert_eq!(model.value(a), Some(1));
        }

        #[test]
        fn attempt_limit() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(3, 3));
            grid.declare_edges(&mut solver, 0, 1).unwrap();
            loop_rules(&grid, &mut solver);
            let corner = grid.cell(0, 0);
            solver.add(Term::sum(corner.edges().iter().map(|edge| edge.term())).equals(4)).unwrap();
            solver.add(Term::sum(grid.edges().iter().map(|edge| edge.term())).equals(8)).unwrap();

            let result = RepairLoop::new()
                .max_attempts(NonZero::new(1).unwrap())
                .run(&mut solver, &EdgeLoop::from(&grid));
            assert!(matches!(result, Err(Error::AttemptLimit(1))));
        }
    }

    mod render {
        use super::dims;
        use crate::grid::{Cell, Edge, Grid, Point};
        use crate::hex::{HexCell, HexEdge, HexGrid, HexPoint};
        use crate::render::{render_grid, render_hex_grid, HexPainter, Painter, Slot};
        use crate::solver::{Model, SatSolver, Var};

        #[derive(Default)]
        struct Slots {
            cells: Vec<Slot>,
            edges: Vec<Slot>,
            points: Vec<Slot>,
        }

        impl Painter for Slots {
            fn cell(&mut self, _cell: &Cell<Var>, _value: Option<i64>, slot: Slot) {
                self.cells.push(slot);
            }

            fn edge(&mut self, _edge: &Edge<Var>, _value: Option<i64>, slot: Slot) {
                self.edges.push(slot);
            }

            fn point(&mut self, _point: &Point<Var>, _value: Option<i64>, slot: Slot) {
                self.points.push(slot);
            }
        }

        impl HexPainter for Slots {
            fn cell(&mut self, _cell: &HexCell<Var>, _value: Option<i64>, slot: Slot) {
                self.cells.push(slot);
            }

            fn edge(&mut self, _edge: &HexEdge<Var>, _value: Option<i64>, slot: Slot) {
                self.edges.push(slot);
            }

            fn point(&mut self, _point: &HexPoint<Var>, _value: Option<i64>, slot: Slot) {
                self.points.push(slot);
            }
        }

        #[test]
        fn square_slots() {
            let mut solver = SatSolver::new();
            let mut grid: Grid<Var> = Grid::new(dims(2, 1));
            grid.declare_cells(&mut solver, 0, 1).unwrap();

            let mut slots = Slots::default();
            render_grid(&grid, None::<&Model>, &mut slots);
            assert_eq!(slots.cells, vec![Slot { column: 1, row: 1 }, Slot { column: 3, row: 1 }]);
            assert_eq!(slots.points.len(), 6);
            assert_eq!(slots.edges[0], Slot { column: 1, row: 0 });
        }

        #[test]
        fn hex_slots_are_distinct() {
            let (rows, width) = dims(3, 3);
            let grid: HexGrid<Var> = HexGrid::new(rows, width, 1, 1).unwrap();

            let mut slots = Slots::default();
            render_hex_grid(&grid, None, &mut slots);
            let all = slots.cells.iter().chain(&slots.edges).chain(&slots.points).collect::<std::collections::HashSet<_>>();
            assert_eq!(all.len(), 7 + 30 + 24);
        }
    }
}
