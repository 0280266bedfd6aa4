use std::f64::consts::{PI, TAU};

use serde::Serialize;

use crate::error::LayoutError;

/// Residue position in layout units (one unit = one backbone step).
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Length of a loop edge that spans a strand break, in backbone steps.
pub const NICK_WEIGHT: f64 = 1.38;

/// Planar layout capability: partner table in, one position per residue out.
///
/// `nicks` holds the first residue of every strand and always starts with 0.
/// Positions use a y-down frame, the same orientation as SVG user space.
pub trait LayoutEngine {
    fn compute_layout(
        &self,
        pairs: &[Option<usize>],
        nicks: &[usize],
    ) -> Result<Vec<Point>, LayoutError>;
}

/// Draws every loop as a polygon inscribed in a circle.
///
/// Backbone steps and pair bonds are unit edges, so helices become ladders
/// of unit squares. An edge across a strand break is [`NICK_WEIGHT`] long.
/// Top-level helices and unpaired residues of the exterior loop are placed
/// left to right on the y = 0 baseline, each helix shifted right until it
/// clears its left neighbour.
#[derive(Debug, Clone)]
pub struct PolygonLayout {
    /// Horizontal gap between neighbouring top-level helices.
    pub helix_gap: f64,
}

impl Default for PolygonLayout {
    fn default() -> Self {
        Self { helix_gap: 1.0 }
    }
}

impl LayoutEngine for PolygonLayout {
    fn compute_layout(
        &self,
        pairs: &[Option<usize>],
        nicks: &[usize],
    ) -> Result<Vec<Point>, LayoutError> {
        check_pairs(pairs)?;
        let breaks = Breaks(nicks);

        let n = pairs.len();
        let mut pos = vec![Point::default(); n];
        let mut cursor = 0.0;
        let mut i = 0;
        while i < n {
            if breaks.before(i) {
                cursor += NICK_WEIGHT - 1.0;
            }
            match pairs[i] {
                Some(j) if j > i => {
                    pos[i] = Point::new(0.0, 0.0);
                    pos[j] = Point::new(1.0, 0.0);
                    place_helix(pairs, breaks, &mut pos, i, j)?;

                    let (min_x, max_x) = pos[i..=j]
                        .iter()
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                            (lo.min(p.x), hi.max(p.x))
                        });
                    let dx = cursor - min_x;
                    for p in &mut pos[i..=j] {
                        p.x += dx;
                    }
                    cursor = max_x + dx + self.helix_gap;
                    i = j + 1;
                }
                Some(j) => return Err(LayoutError::Crossing(j, i)),
                None => {
                    pos[i] = Point::new(cursor, 0.0);
                    cursor += 1.0;
                    i += 1;
                }
            }
        }

        Ok(pos)
    }
}

#[derive(Clone, Copy)]
struct Breaks<'a>(&'a [usize]);

impl Breaks<'_> {
    /// True when a strand starts at residue `k > 0`.
    fn before(self, k: usize) -> bool {
        k > 0 && self.0.contains(&k)
    }
}

fn check_pairs(pairs: &[Option<usize>]) -> Result<(), LayoutError> {
    for (i, &p) in pairs.iter().enumerate() {
        if let Some(j) = p {
            if j == i || pairs.get(j) != Some(&Some(i)) {
                return Err(LayoutError::InvalidPair(i, j));
            }
        }
    }
    Ok(())
}

/// Lay out everything enclosed by the pair `(i, j)`, whose ends are placed.
fn place_helix(
    pairs: &[Option<usize>],
    breaks: Breaks<'_>,
    pos: &mut [Point],
    i: usize,
    j: usize,
) -> Result<(), LayoutError> {
    // (opening, closing, centre of the enclosing loop)
    let mut work = vec![(i, j, Point::new(0.5, 1.0))];

    while let Some((i, j, parent)) = work.pop() {
        let verts = loop_vertices(pairs, i, j)?;
        let k = verts.len();
        if k < 3 {
            continue;
        }

        // chords[m] joins verts[m - 1] and verts[m]; chords[0] is the closing pair
        let chords: Vec<f64> = (0..k)
            .map(|m| match m {
                0 => 1.0,
                _ if pairs[verts[m - 1]] == Some(verts[m]) => 1.0,
                _ if breaks.before(verts[m]) => NICK_WEIGHT,
                _ => 1.0,
            })
            .collect();
        let radius = circumradius(&chords);

        let (pi, pj) = (pos[i], pos[j]);
        let mid = pi.midpoint(pj);
        let (dx, dy) = (pj.x - pi.x, pj.y - pi.y);
        let len = dx.hypot(dy).max(f64::EPSILON);
        let (mut nx, mut ny) = (-dy / len, dx / len);
        // grow away from the enclosing loop
        if nx * (mid.x - parent.x) + ny * (mid.y - parent.y) < 0.0 {
            nx = -nx;
            ny = -ny;
        }

        let apothem = (radius * radius - 0.25).max(0.0).sqrt();
        let center = Point::new(mid.x + nx * apothem, mid.y + ny * apothem);

        let cross = (pi.x - center.x) * (pj.y - center.y) - (pi.y - center.y) * (pj.x - center.x);
        let dir = if cross < 0.0 { 1.0 } else { -1.0 };
        let mut theta = (pi.y - center.y).atan2(pi.x - center.x);

        for m in 1..k - 1 {
            theta += dir * central_angle(chords[m], radius);
            pos[verts[m]] = Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            );
        }

        for w in verts[1..k - 1].windows(2) {
            if pairs[w[0]] == Some(w[1]) {
                work.push((w[0], w[1], center));
            }
        }
    }

    Ok(())
}

fn central_angle(chord: f64, radius: f64) -> f64 {
    2.0 * (chord / (2.0 * radius)).min(1.0).asin()
}

/// Radius of the circle on which `chords`, laid end to end, close up.
fn circumradius(chords: &[f64]) -> f64 {
    let k = chords.len() as f64;
    if chords.iter().all(|&c| c == 1.0) {
        return 0.5 / (PI / k).sin();
    }
    // the total central angle falls as the radius grows
    let longest = chords.iter().cloned().fold(0.0, f64::max);
    let (mut lo, mut hi) = (longest / 2.0, chords.iter().sum::<f64>());
    for _ in 0..100 {
        let mid = (lo + hi) / 2.0;
        let total: f64 = chords.iter().map(|&c| central_angle(c, mid)).sum();
        if total > TAU {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Residues on the loop closed by `(i, j)`, in backbone order.
///
/// A child pair contributes both of its residues; whatever it encloses
/// belongs to deeper loops.
fn loop_vertices(pairs: &[Option<usize>], i: usize, j: usize) -> Result<Vec<usize>, LayoutError> {
    let mut verts = vec![i];
    let mut k = i + 1;
    while k < j {
        match pairs[k] {
            Some(q) if q > k && q < j => {
                verts.push(k);
                verts.push(q);
                k = q + 1;
            }
            Some(q) => return Err(LayoutError::Crossing(k.min(q), k.max(q))),
            None => {
                verts.push(k);
                k += 1;
            }
        }
    }
    verts.push(j);
    Ok(verts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::parse_pairs;

    fn layout(db: &str) -> Vec<Point> {
        let pt = parse_pairs(db).unwrap();
        PolygonLayout::default()
            .compute_layout(&pt.pairs, &pt.nicks)
            .unwrap()
    }

    fn dist(a: Point, b: Point) -> f64 {
        (a.x - b.x).hypot(a.y - b.y)
    }

    fn assert_close(a: Point, x: f64, y: f64) {
        assert!(
            (a.x - x).abs() < 1e-9 && (a.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got ({}, {})",
            a.x,
            a.y
        );
    }

    #[test]
    fn hairpin_is_a_ladder() {
        let pos = layout("((..))");
        assert_close(pos[0], 0.0, 0.0);
        assert_close(pos[5], 1.0, 0.0);
        assert_close(pos[1], 0.0, -1.0);
        assert_close(pos[4], 1.0, -1.0);
        assert_close(pos[2], 0.0, -2.0);
        assert_close(pos[3], 1.0, -2.0);
    }

    #[test]
    fn loops_have_unit_edges() {
        let db = "(((..((...))..((..))...)))";
        let pt = parse_pairs(db).unwrap();
        let pos = layout(db);
        for i in 1..pos.len() {
            assert!((dist(pos[i - 1], pos[i]) - 1.0).abs() < 1e-9, "step {i}");
        }
        for (i, &p) in pt.pairs.iter().enumerate() {
            if let Some(j) = p {
                assert!((dist(pos[i], pos[j]) - 1.0).abs() < 1e-9, "pair {i}-{j}");
            }
        }
    }

    #[test]
    fn exterior_runs_left_to_right() {
        let pos = layout("..((...))..((...))");
        assert_close(pos[0], 0.0, 0.0);
        assert_close(pos[1], 1.0, 0.0);
        assert!(pos[2].x > pos[1].x);
        // second helix starts to the right of everything in the first
        let first_max = pos[2..=8].iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let second_min = pos[11..].iter().map(|p| p.x).fold(f64::MAX, f64::min);
        assert!(second_min > first_max);
        // helices grow upwards
        assert!(pos[5].y < 0.0 && pos[14].y < 0.0);
    }

    #[test]
    fn unpaired_only() {
        let pos = layout("....");
        assert_eq!(pos.len(), 4);
        assert_close(pos[3], 3.0, 0.0);
    }

    #[test]
    fn empty_pair_table() {
        assert!(layout("").is_empty());
        assert_eq!(layout("()").len(), 2);
    }

    #[test]
    fn rejects_crossing_and_asymmetric_pairs() {
        let engine = PolygonLayout::default();
        let crossing = [Some(2), Some(3), Some(0), Some(1)];
        assert!(matches!(
            engine.compute_layout(&crossing, &[0]),
            Err(LayoutError::Crossing(..))
        ));
        let asymmetric = [Some(1), None];
        assert_eq!(
            engine.compute_layout(&asymmetric, &[0]),
            Err(LayoutError::InvalidPair(0, 1))
        );
    }

    #[test]
    fn strand_break_widens_its_loop_edge() {
        let pos = layout("((.+.))");
        assert!((dist(pos[2], pos[3]) - NICK_WEIGHT).abs() < 1e-9);
        for (a, b) in [(1, 2), (3, 4), (1, 4), (0, 5), (0, 1), (4, 5)] {
            assert!((dist(pos[a], pos[b]) - 1.0).abs() < 1e-9, "{a}-{b}");
        }

        let joined = layout("((..))");
        assert!((dist(joined[2], joined[3]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn strand_break_on_the_baseline() {
        let pos = layout("..+..");
        assert_close(pos[1], 1.0, 0.0);
        assert_close(pos[2], 1.0 + NICK_WEIGHT, 0.0);
        assert_close(pos[3], 2.0 + NICK_WEIGHT, 0.0);
    }
}
