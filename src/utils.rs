use rand::{seq::SliceRandom, Rng};

/// Unbiased shuffle (Durstenfeld's Fisher-Yates)
/// Walks from the last slot down to the second one, swapping each slot with a
/// uniformly chosen slot at or below it. The input is left untouched and a
/// new vector is returned.
pub fn fisher_yates<T: Clone>(items: &[T], rng: &mut impl Rng) -> Vec<T> {
    let mut shuffled = items.to_vec();
    // SliceRandom::shuffle runs the same last-to-first swap loop
    shuffled.shuffle(rng);
    shuffled
}
