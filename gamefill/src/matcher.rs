//! Best-match selection among lookup candidates

use crate::models::Candidate;

/// Pick the candidate with the highest similarity
///
/// Ties go to the earliest candidate. Candidates whose similarity is NaN are
/// never selected.
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates.iter().filter(|c| !c.similarity.is_nan()) {
        match best {
            Some(current) if candidate.similarity <= current.similarity => {}
            _ => best = Some(candidate),
        }
    }
    best
}
