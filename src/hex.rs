//! Cube-coordinate hex grid primitives.
//!
//! All positions in the engine are exchanged as [`Hex`] cube coordinates.
//! See spec.md §4.1.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The six fixed neighbor offsets, in the engine's canonical stable order:
/// E, NE, NW, W, SW, SE.
pub const NEIGHBOR_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, -1),  // E
    (1, -1, 0),  // NE
    (0, -1, 1),  // NW
    (-1, 0, 1),  // W
    (-1, 1, 0),  // SW
    (0, 1, -1),  // SE
];

/// A cube coordinate `(q, r, s)` with invariant `q + r + s = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl Hex {
    /// Constructs a hex, rejecting any triple that violates `q + r + s = 0`.
    pub fn new(q: i32, r: i32, s: i32) -> Option<Self> {
        if q + r + s != 0 {
            return None;
        }
        Some(Hex { q, r, s })
    }

    /// Constructs a hex from the two independent axes, deriving `s`.
    /// Always satisfies the cube constraint by construction.
    pub fn from_axial(q: i32, r: i32) -> Self {
        Hex { q, r, s: -q - r }
    }

    /// A canonical string key for occupancy maps: `"q,r,s"`.
    pub fn key(&self) -> String {
        format!("{},{},{}", self.q, self.r, self.s)
    }

    pub fn distance(&self, other: &Hex) -> i32 {
        ((self.q - other.q).abs())
            .max((self.r - other.r).abs())
            .max((self.s - other.s).abs())
    }

    /// The six neighbors in stable order (E, NE, NW, W, SW, SE).
    pub fn neighbors(&self) -> [Hex; 6] {
        let mut out = [*self; 6];
        for (i, (dq, dr, ds)) in NEIGHBOR_OFFSETS.iter().enumerate() {
            out[i] = Hex {
                q: self.q + dq,
                r: self.r + dr,
                s: self.s + ds,
            };
        }
        out
    }

    /// All hexes within distance `r` of `self`, including `self` (r == 0).
    /// Ordered by increasing ring, then by q, then by r — deterministic.
    pub fn in_range(&self, radius: i32) -> Vec<Hex> {
        let mut out = Vec::new();
        for ring_radius in 0..=radius.max(0) {
            out.extend(self.ring(ring_radius));
        }
        out
    }

    /// Exactly the hexes at distance `radius` from `self`. `radius == 0`
    /// returns `[self]`. Ordered deterministically starting east and
    /// walking clockwise through the six spokes.
    pub fn ring(&self, radius: i32) -> Vec<Hex> {
        if radius <= 0 {
            return vec![*self];
        }
        let mut results = Vec::with_capacity((6 * radius) as usize);
        // Start at the hex `radius` steps in the SW direction, matching
        // the canonical neighbor order's wrap point.
        let (dq, dr, ds) = NEIGHBOR_OFFSETS[4]; // SW
        let mut hex = Hex {
            q: self.q + dq * radius,
            r: self.r + dr * radius,
            s: self.s + ds * radius,
        };
        for (odq, odr, ods) in NEIGHBOR_OFFSETS.iter() {
            for _ in 0..radius {
                results.push(hex);
                hex = Hex {
                    q: hex.q + odq,
                    r: hex.r + odr,
                    s: hex.s + ods,
                };
            }
        }
        results
    }

    /// Returns the single neighbor of `self` that most reduces distance to
    /// `toward`, using cube-sign stepping rebalanced onto an actual
    /// neighbor. If `self == toward`, returns `self`.
    ///
    /// Re-derived per spec.md §9 ("Hex step heuristic"): rather than
    /// trusting `(sign(dq), sign(dr), -(sign(dq)+sign(dr)))` blindly (which
    /// can pick a non-neighbor direction when one axis dominates), this
    /// selects the neighbor that literally minimizes `distance(_, toward)`,
    /// breaking ties by the canonical neighbor order (E, NE, NW, W, SW, SE).
    pub fn step(&self, toward: &Hex) -> Hex {
        if self == toward {
            return *self;
        }
        let mut best = self.neighbors()[0];
        let mut best_dist = best.distance(toward);
        for n in self.neighbors().iter().skip(1) {
            let d = n.distance(toward);
            if d < best_dist {
                best = *n;
                best_dist = d;
            }
        }
        best
    }
}

/// Deterministic ordering used for stable-tie-break target selection when
/// "random" is not enabled: lowest q, then r, then s.
pub fn deterministic_cmp(a: &Hex, b: &Hex) -> Ordering {
    (a.q, a.r, a.s).cmp(&(b.q, b.r, b.s))
}
