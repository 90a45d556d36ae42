use crate::lookup::Lookup;
use crate::normalize::normalize;
use crate::types::GuessScore;

/// Score a guess against the round's lookup. Points equal the matched rank,
/// so the last entry of the list is worth the most.
pub fn score(lookup: &Lookup, guess: &str) -> GuessScore {
    let key = normalize(guess);
    if key.is_empty() {
        return GuessScore::MISS;
    }

    match lookup.rank(&key) {
        Some(rank) => GuessScore::hit(rank),
        None => GuessScore::MISS,
    }
}
