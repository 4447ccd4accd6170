//! How oil appears and spreads across the grid.
//!
//! Three growth rules feed the oil queue:
//!
//! - **Spill** -- a cell at a uniformly random position, used when the
//!   queue is empty.
//! - **Adjacency spread** -- a random 4-neighbour of the most recently
//!   added cell, one shade brighter than its parent.
//! - **Wind drift** -- for every line of cells perpendicular to the wind,
//!   one new cell just beyond the line's downwind edge.
//!
//! All produced positions are clamped onto the grid.

use std::collections::{BTreeMap, VecDeque};

use oilsim_types::{Axis, GridPos, MAX_GRID, Wind, clamp_to_grid};
use rand::Rng;
use tracing::trace;

use crate::oil::OilCell;

/// First-in-first-out queue of polluted cells.
///
/// The front is the oldest surviving cell and the next cleaning target;
/// the back is the newest cell and the origin of adjacency spread.
pub type OilQueue = VecDeque<OilCell>;

/// Unit offsets to the four orthogonal neighbours.
const NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A cell of fresh oil at a random position in `[0, MAX_GRID)`.
pub fn random_spill<R: Rng + ?Sized>(rng: &mut R) -> OilCell {
    let x = rng.random_range(0..MAX_GRID);
    let y = rng.random_range(0..MAX_GRID);
    OilCell::spill(GridPos::new(x, y))
}

/// A random neighbour of the newest cell in `queue`, or `None` if empty.
pub fn spread_from_newest<R: Rng + ?Sized>(queue: &OilQueue, rng: &mut R) -> Option<OilCell> {
    let parent = queue.back()?;
    let pick = rng.random_range(0..NEIGHBOURS.len());
    let (dx, dy) = NEIGHBOURS.get(pick).copied().unwrap_or((1, 0));
    Some(parent.spread_to(parent.pos().offset(dx, dy)))
}

/// Append one cell: a random spill if the queue is empty, otherwise an
/// adjacency spread from the newest cell. Returns the appended cell.
pub fn add_cell<R: Rng + ?Sized>(queue: &mut OilQueue, rng: &mut R) -> OilCell {
    let cell = spread_from_newest(queue, rng).unwrap_or_else(|| random_spill(rng));
    queue.push_back(cell);
    cell
}

/// Darken every cell in place. Returns the number of cells touched.
pub fn darken_all(queue: &mut OilQueue) -> usize {
    queue.iter_mut().for_each(OilCell::darker);
    queue.len()
}

/// Cells that `wind` pushes out beyond the slick's downwind boundary.
///
/// Cells are grouped by their coordinate on the axis perpendicular to the
/// wind. Within each group the extreme coordinate along the wind axis, in
/// the direction the wind blows, marks the boundary; one new cell is
/// placed a single step past it, derived (brightened) from the boundary
/// cell. Groups are returned in ascending key order. Calm wind yields
/// nothing, and existing cells are never touched.
pub fn wind_front(queue: &OilQueue, wind: Wind) -> Vec<OilCell> {
    let Some((axis, step)) = wind.drift() else {
        return Vec::new();
    };

    let split = |pos: GridPos| match axis {
        Axis::X => (pos.y, pos.x),
        Axis::Y => (pos.x, pos.y),
    };
    let join = |key: i32, along: i32| match axis {
        Axis::X => GridPos::new(along, key),
        Axis::Y => GridPos::new(key, along),
    };

    // group key -> boundary cell
    let mut edges: BTreeMap<i32, &OilCell> = BTreeMap::new();
    for cell in queue {
        let (key, along) = split(cell.pos());
        edges
            .entry(key)
            .and_modify(|edge| {
                let (_, current) = split(edge.pos());
                let further = if step > 0 {
                    along > current
                } else {
                    along < current
                };
                if further {
                    *edge = cell;
                }
            })
            .or_insert(cell);
    }

    let front: Vec<OilCell> = edges
        .into_iter()
        .map(|(key, edge)| {
            let (_, along) = split(edge.pos());
            edge.spread_to(join(key, clamp_to_grid(along.saturating_add(step))))
        })
        .collect();
    trace!(?wind, new_cells = front.len(), "Wind front computed");
    front
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::oil::OilColor;

    fn queue_of(cells: &[(i32, i32)]) -> OilQueue {
        cells
            .iter()
            .map(|&(x, y)| OilCell::spill(GridPos::new(x, y)))
            .collect()
    }

    fn positions(cells: &[OilCell]) -> Vec<(i32, i32)> {
        cells.iter().map(|c| (c.x(), c.y())).collect()
    }

    #[test]
    fn first_cell_is_random_spill_then_adjacent() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut queue = OilQueue::new();

        let first = add_cell(&mut queue, &mut rng);
        assert!(first.x() >= 0 && first.x() < MAX_GRID);
        assert!(first.y() >= 0 && first.y() < MAX_GRID);
        assert_eq!(first.color(), OilColor::ORIGIN);

        for _ in 0..200 {
            let parent = *queue.back().unwrap();
            let child = add_cell(&mut queue, &mut rng);
            let distance = (child.x() - parent.x()).abs() + (child.y() - parent.y()).abs();
            assert!(distance <= 1, "{parent:?} -> {child:?}");
            assert!(child.pos().is_on_grid());
        }
        assert_eq!(queue.len(), 201);
    }

    #[test]
    fn spread_at_corner_stays_on_grid() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let queue = queue_of(&[(0, 0)]);
            let child = spread_from_newest(&queue, &mut rng).unwrap();
            assert!(child.pos().is_on_grid());
            assert!(child.x() <= 1 && child.y() <= 1);
        }
    }

    #[test]
    fn calm_wind_adds_nothing() {
        let queue = queue_of(&[(1, 1), (2, 2)]);
        assert!(wind_front(&queue, Wind::None).is_empty());
    }

    #[test]
    fn west_wind_extends_each_row_east() {
        let queue = queue_of(&[(3, 1), (5, 1), (4, 2), (9, 7), (2, 7)]);
        let front = wind_front(&queue, Wind::West);
        assert_eq!(positions(&front), vec![(6, 1), (5, 2), (10, 7)]);
    }

    #[test]
    fn east_wind_extends_each_row_west() {
        let queue = queue_of(&[(3, 1), (5, 1), (0, 2)]);
        let front = wind_front(&queue, Wind::East);
        assert_eq!(positions(&front), vec![(2, 1), (0, 2)]);
    }

    #[test]
    fn north_and_south_wind_extend_columns() {
        let queue = queue_of(&[(1, 3), (1, 8), (4, 100)]);
        assert_eq!(positions(&wind_front(&queue, Wind::North)), vec![(1, 9), (4, 100)]);
        assert_eq!(positions(&wind_front(&queue, Wind::South)), vec![(1, 2), (4, 99)]);
    }

    #[test]
    fn drift_brightens_boundary_colour() {
        let mut edge = OilCell::spill(GridPos::new(5, 5));
        edge.darker();
        edge.darker();
        let queue: OilQueue = [OilCell::spill(GridPos::new(4, 5)), edge].into_iter().collect();
        let front = wind_front(&queue, Wind::West);
        assert_eq!(front.len(), 1);
        assert_eq!(front[0].color(), edge.color().brighter());
    }

    #[test]
    fn darken_touches_every_cell() {
        let mut queue = queue_of(&[(1, 1), (2, 2), (3, 3)]);
        assert_eq!(darken_all(&mut queue), 3);
        assert!(queue.iter().all(|c| c.color() == OilColor::ORIGIN.darker()));
    }
}
