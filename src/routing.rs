// src/routing.rs

use crate::layout::snap_to_grid;
use glam::DVec2;

const EPSILON: f64 = 1e-6;

/// Axis-aligned rectangle in sheet coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// True if an axis-aligned segment passes through the open interior.
    /// Running along an edge does not count.
    pub fn blocks(&self, a: DVec2, b: DVec2) -> bool {
        let lo = a.min(b);
        let hi = a.max(b);
        let overlaps = |lo: f64, hi: f64, min: f64, max: f64| {
            hi > min + EPSILON && lo < max - EPSILON
        };
        if (a.y - b.y).abs() < EPSILON {
            a.y > self.min.y + EPSILON
                && a.y < self.max.y - EPSILON
                && overlaps(lo.x, hi.x, self.min.x, self.max.x)
        } else if (a.x - b.x).abs() < EPSILON {
            a.x > self.min.x + EPSILON
                && a.x < self.max.x - EPSILON
                && overlaps(lo.y, hi.y, self.min.y, self.max.y)
        } else {
            // Diagonal: conservative bounding-box test.
            overlaps(lo.x, hi.x, self.min.x, self.max.x)
                && overlaps(lo.y, hi.y, self.min.y, self.max.y)
        }
    }
}

/// Candidate polylines from `start` to `end`, most preferred first.
fn candidates(start: DVec2, end: DVec2) -> Vec<Vec<DVec2>> {
    if (start.y - end.y).abs() < EPSILON || (start.x - end.x).abs() < EPSILON {
        return vec![vec![start, end]];
    }
    let mid_x = snap_to_grid((start.x + end.x) / 2.0);
    let mid_y = snap_to_grid((start.y + end.y) / 2.0);
    vec![
        vec![start, DVec2::new(end.x, start.y), end],
        vec![start, DVec2::new(start.x, end.y), end],
        vec![start, DVec2::new(mid_x, start.y), DVec2::new(mid_x, end.y), end],
        vec![start, DVec2::new(start.x, mid_y), DVec2::new(end.x, mid_y), end],
    ]
}

fn is_clear(path: &[DVec2], obstacles: &[Rect]) -> bool {
    path.windows(2)
        .all(|seg| obstacles.iter().all(|r| !r.blocks(seg[0], seg[1])))
}

/// Routes an orthogonal path between two pin tips. Candidates are tried
/// straight, L (horizontal first), L (vertical first), then Z-routes
/// jogging at the midpoint. Returns `None` only when avoidance is on and
/// every candidate crosses an obstacle.
pub fn manhattan_route(
    start: DVec2,
    end: DVec2,
    obstacles: &[Rect],
    avoid_obstacles: bool,
) -> Option<Vec<DVec2>> {
    let mut paths = candidates(start, end).into_iter();
    let path = if avoid_obstacles {
        paths.find(|p| is_clear(p, obstacles))?
    } else {
        paths.next()?
    };
    Some(dedup_points(path))
}

/// Drops zero-length segments.
fn dedup_points(mut path: Vec<DVec2>) -> Vec<DVec2> {
    path.dedup_by(|b, a| a.distance(*b) < EPSILON);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_horizontal() {
        let pts = manhattan_route(DVec2::new(0.0, 10.0), DVec2::new(20.0, 10.0), &[], true).unwrap();
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn l_route_horizontal_first() {
        let pts = manhattan_route(DVec2::new(0.0, 0.0), DVec2::new(20.32, 10.16), &[], true).unwrap();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[1], DVec2::new(20.32, 0.0));
    }

    #[test]
    fn detours_around_body() {
        // Box straddling the horizontal leg of the first L.
        let body = Rect::new(DVec2::new(5.0, -5.0), DVec2::new(15.0, 5.0));
        let pts = manhattan_route(DVec2::new(0.0, 0.0), DVec2::new(20.32, 10.16), &[body], true).unwrap();
        assert_eq!(pts[1], DVec2::new(0.0, 10.16));
    }

    #[test]
    fn gives_up_when_boxed_in() {
        let body = Rect::new(DVec2::new(-1.0, -1.0), DVec2::new(30.0, 30.0));
        assert!(manhattan_route(DVec2::new(0.0, 0.0), DVec2::new(20.32, 10.16), &[body], true).is_none());
        // Without avoidance the first candidate is used regardless.
        assert!(manhattan_route(DVec2::new(0.0, 0.0), DVec2::new(20.32, 10.16), &[body], false).is_some());
    }

    #[test]
    fn edges_do_not_block() {
        let body = Rect::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 10.0));
        assert!(!body.blocks(DVec2::new(-5.0, 0.0), DVec2::new(15.0, 0.0)));
        assert!(body.blocks(DVec2::new(-5.0, 5.0), DVec2::new(15.0, 5.0)));
    }
}
