//! # Quality Ladder Module
//!
//! La scala fissa di livelli di qualità JPEG provati in ordine decrescente.
//! È una costante indipendente dalla configurazione: 95 → 15 incluso, passo 5.

/// The discrete sequence of encoder quality levels, highest first.
const LEVELS: [u8; 17] = [
    95, 90, 85, 80, 75, 70, 65, 60, 55, 50, 45, 40, 35, 30, 25, 20, 15,
];

/// Fixed descending ladder of JPEG quality levels.
///
/// The search in [`crate::targeter::SizeTargeter`] walks this ladder top to
/// bottom and stops at the first level whose output lands inside the bounds,
/// so success always reports the highest quality that fits.
pub struct QualityLadder;

impl QualityLadder {
    /// Quality levels in descending order.
    pub fn levels() -> impl Iterator<Item = u8> {
        LEVELS.iter().copied()
    }

    /// Number of levels on the ladder.
    pub fn len() -> usize {
        LEVELS.len()
    }

    /// Highest quality tried.
    pub fn top() -> u8 {
        LEVELS[0]
    }

    /// Lowest quality tried.
    pub fn bottom() -> u8 {
        LEVELS[LEVELS.len() - 1]
    }
}
