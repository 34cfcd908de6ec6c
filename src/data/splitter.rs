// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// Randomly assigns every student index to exactly one of three
// disjoint sets:
//
//   train  floor(N * train_ratio)
//   val    floor(N * val_ratio)
//   test   everything left over
//
// Assignment is a Fisher-Yates shuffle of 0..N followed by
// three consecutive cuts. With a seed the shuffle comes from
// StdRng::seed_from_u64 and the split is reproducible; without
// one it comes from thread_rng().
//
// Splitting happens on indices, not on samples, because the
// Transition graph must know which students were used for
// training.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PrepError, PrepResult};

/// Student indices of each split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub val:   Vec<usize>,
    pub test:  Vec<usize>,
}

impl SplitIndices {
    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Split sizes for `total` items: floor for train and val,
/// remainder for test.
pub fn split_sizes(total: usize, train_ratio: f64, val_ratio: f64) -> PrepResult<(usize, usize, usize)> {
    let valid = |r: f64| r.is_finite() && (0.0..=1.0).contains(&r);
    if !valid(train_ratio) || !valid(val_ratio) || train_ratio + val_ratio > 1.0 + 1e-9 {
        return Err(PrepError::InvalidConfig(format!(
            "train_ratio ({train_ratio}) and val_ratio ({val_ratio}) must lie in [0, 1] and sum to at most 1"
        )));
    }

    let train = ((total as f64) * train_ratio).floor() as usize;
    let val   = ((total as f64) * val_ratio).floor() as usize;
    // float rounding must never push train + val past total
    let train = train.min(total);
    let val   = val.min(total - train);

    Ok((train, val, total - train - val))
}

/// Randomly partition `0..total` into train/val/test indices.
pub fn split_train_val_test(
    total:       usize,
    train_ratio: f64,
    val_ratio:   f64,
    seed:        Option<u64>,
) -> PrepResult<SplitIndices> {
    let (train_size, val_size, test_size) = split_sizes(total, train_ratio, val_ratio)?;

    let mut order: Vec<usize> = (0..total).collect();
    match seed {
        Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
        None       => order.shuffle(&mut rand::thread_rng()),
    }

    let test = order.split_off(train_size + val_size);
    let val  = order.split_off(train_size);

    tracing::info!("train_size: {} val_size: {} test_size: {}", train_size, val_size, test_size);

    Ok(SplitIndices { train: order, val, test })
}
