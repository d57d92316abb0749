//! Deterministic scenes shared by the unit tests.

use crate::aabb::Aabb3;
use crate::primitive::Primitive;

/// Tiny LCG so scenes are reproducible without pulling in an RNG crate.
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    /// Uniform value in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    pub(crate) fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    pub(crate) fn aabb(&mut self, world: f64, max_size: f64) -> Aabb3 {
        let min = [
            self.range(0.0, world),
            self.range(0.0, world),
            self.range(0.0, world),
        ];
        let max = [
            min[0] + self.range(0.0, max_size),
            min[1] + self.range(0.0, max_size),
            min[2] + self.range(0.0, max_size),
        ];
        Aabb3::from_arrays(min, max)
    }
}

/// `n` boxes of size up to 3 scattered through a 100 mm cube, tagged by index.
pub(crate) fn scatter(n: usize, seed: u64) -> Vec<Primitive<usize>> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|i| Primitive::new(i, rng.aabb(100.0, 3.0))).collect()
}

/// `n` boxes packed into a 30 mm cube so that many of them overlap.
pub(crate) fn dense(n: usize, seed: u64) -> Vec<Primitive<usize>> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|i| Primitive::new(i, rng.aabb(30.0, 3.0))).collect()
}

/// The four-box smoke-test scene, tagged `1..=4`.
pub(crate) fn four_boxes() -> Vec<Primitive<usize>> {
    vec![
        Primitive::new(1, Aabb3::from_arrays([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])),
        Primitive::new(2, Aabb3::from_arrays([2.0, 2.0, 2.0], [3.0, 3.0, 3.0])),
        Primitive::new(3, Aabb3::from_arrays([1.0, 0.0, 0.0], [2.0, 1.0, 1.0])),
        Primitive::new(4, Aabb3::from_arrays([0.0, 2.0, 0.0], [1.0, 3.0, 1.0])),
    ]
}
