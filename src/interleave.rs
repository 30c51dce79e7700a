//! Weighted random merge of two ranked lists.
//!
//! Each output slot is filled from the primary list with probability
//! `primary / (primary + secondary)`, falling back to whichever list still
//! has elements. Order within each source list is preserved; only the
//! interleaving across sources is random.

use rand::Rng;

/// Weights used to bias the merge toward one source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedInterleaver {
    primary_weight: f64,
    secondary_weight: f64,
}

impl Default for WeightedInterleaver {
    fn default() -> Self {
        Self::new(0.7, 0.3)
    }
}

impl WeightedInterleaver {
    pub fn new(primary_weight: f64, secondary_weight: f64) -> Self {
        Self {
            primary_weight,
            secondary_weight,
        }
    }

    /// Probability of drawing from the primary list at each step.
    ///
    /// Weights that sum to zero (or are not usable numbers) split evenly.
    pub fn primary_probability(&self) -> f64 {
        let total = self.primary_weight + self.secondary_weight;
        if total > 0.0 && total.is_finite() {
            (self.primary_weight / total).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    /// Merge `primary` and `secondary` into at most `limit` elements.
    pub fn interleave<T, R>(
        &self,
        primary: Vec<T>,
        secondary: Vec<T>,
        limit: usize,
        rng: &mut R,
    ) -> Vec<T>
    where
        R: Rng + ?Sized,
    {
        let p_primary = self.primary_probability();
        let target = limit.min(primary.len() + secondary.len());
        let mut merged = Vec::with_capacity(target);

        let mut primary = primary.into_iter().peekable();
        let mut secondary = secondary.into_iter().peekable();

        while merged.len() < target {
            let r: f64 = rng.gen();
            let next = if r < p_primary && primary.peek().is_some() {
                primary.next()
            } else if secondary.peek().is_some() {
                secondary.next()
            } else {
                primary.next()
            };

            match next {
                Some(item) => merged.push(item),
                None => break,
            }
        }

        merged
    }
}
