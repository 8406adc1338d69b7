//! Progressive problem-size sweep.
use scenegen_core::Dimensions;

use crate::BenchError;

/// Yields box dimensions with `height ≤ width ≤ depth`, growing the smallest
/// dimension one step at a time: `2x2x2, 2x2x3, 2x3x3, 3x3x3, 3x3x4, …`.
#[derive(Debug, Clone)]
pub struct ProgressiveTriples {
    next: Option<(u32, u32, u32)>,
    max_dim: u32,
    remaining: Option<usize>,
}

impl ProgressiveTriples {
    pub fn new(max_dim: u32, steps: Option<usize>, start_dim: u32) -> Result<Self, BenchError> {
        if start_dim == 0 {
            return Err(BenchError::Config("start dimension must be at least 1".into()));
        }
        Ok(Self {
            next: Some((start_dim, start_dim, start_dim)),
            max_dim,
            remaining: steps,
        })
    }
}

impl Iterator for ProgressiveTriples {
    type Item = Dimensions;

    fn next(&mut self) -> Option<Self::Item> {
        let (h, w, d) = self.next?;
        if h > self.max_dim || w > self.max_dim || d > self.max_dim || self.remaining == Some(0) {
            self.next = None;
            return None;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }

        self.next = if h == w && w == d {
            Some((h, w, d + 1))
        } else if w == d && h < w {
            Some((h + 1, w, d))
        } else if h == w && w < d {
            Some((h, w + 1, d))
        } else {
            None
        };

        Dimensions::new(h, w, d).ok()
    }
}
