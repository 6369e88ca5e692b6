//! Multiple-choice option synthesis.

use rand::Rng;
use rand::seq::{SliceRandom, index};

use crate::model::{CHOICE_COUNT, ChoiceSet};

const DISTRACTORS: usize = CHOICE_COUNT - 1;

/// Build four distinct options containing `answer` exactly once, in random order.
///
/// Distractors are sampled without replacement from `0..range`. When that
/// range cannot supply three values other than `answer`, the candidates
/// continue upward past `range`, so the call always terminates with four
/// options.
pub fn synthesize<R: Rng + ?Sized>(answer: i32, range: i32, rng: &mut R) -> ChoiceSet {
    let distractors = match usize::try_from(range) {
        Ok(len) if len >= CHOICE_COUNT => sample_range(answer, len, rng),
        _ => small_pool(answer),
    };

    let mut values = [answer; CHOICE_COUNT];
    for (slot, value) in values[1..].iter_mut().zip(distractors) {
        *slot = value;
    }
    values.shuffle(rng);
    ChoiceSet::from_distinct(values)
}

// Four distinct draws contain the answer at most once, leaving three or more.
fn sample_range<R: Rng + ?Sized>(answer: i32, len: usize, rng: &mut R) -> Vec<i32> {
    index::sample(rng, len, CHOICE_COUNT)
        .into_iter()
        .filter_map(|i| i32::try_from(i).ok())
        .filter(|v| *v != answer)
        .take(DISTRACTORS)
        .collect()
}

// Counts up from 0 through `0..range` and beyond.
fn small_pool(answer: i32) -> Vec<i32> {
    let mut pool = Vec::with_capacity(DISTRACTORS);
    let mut candidate = 0;
    while pool.len() < DISTRACTORS {
        if candidate != answer {
            pool.push(candidate);
        }
        candidate += 1;
    }
    pool
}
