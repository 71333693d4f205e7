//! Mocked voice score.
//!
//! There is no audio analysis behind the score: it is drawn from an injected
//! random source and mapped onto a tier that carries the display copy.
//!
//! # Example
//! ```
//! use attempt_gate::{ScoreTier, VoiceScore};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let score = VoiceScore::generate(&mut rng);
//!
//! assert!((60..=99).contains(&score.score()));
//! assert_ne!(score.tier(), ScoreTier::Budding);
//! ```

use rand::Rng;

/// Lowest final score `generate` can produce.
pub const MIN_FINAL_SCORE: u8 = 60;

/// Highest final score `generate` can produce.
pub const MAX_FINAL_SCORE: u8 = 99;

/// Score band with its verdict and hint copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreTier {
    /// Below 40
    Budding,
    /// 40 to 69
    Charming,
    /// 70 to 89
    Smooth,
    /// 90 and above
    Irresistible,
}

impl ScoreTier {
    /// Map a score onto its tier.
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreTier::Irresistible,
            70..=89 => ScoreTier::Smooth,
            40..=69 => ScoreTier::Charming,
            _ => ScoreTier::Budding,
        }
    }

    /// Headline shown under the score.
    pub fn verdict(&self) -> &'static str {
        match self {
            ScoreTier::Irresistible => "This voice could cause butterflies!",
            ScoreTier::Smooth => "Smooth, confident, and definitely sexy!",
            ScoreTier::Charming => "You've got something going on!",
            ScoreTier::Budding => "Cute but keep working it!",
        }
    }

    /// Teaser line shown below the verdict.
    pub fn hint(&self) -> &'static str {
        match self {
            ScoreTier::Irresistible => "Warning: Voice may cause instant attraction!",
            ScoreTier::Smooth => "Your voice could break 7 hearts in one phone call!",
            ScoreTier::Charming => "There's charm in that voice!",
            ScoreTier::Budding => "Practice makes perfect, darling!",
        }
    }
}

/// A finished voice score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceScore {
    score: u8,
    tier: ScoreTier,
}

impl VoiceScore {
    /// Build a score from a known value. Values above 100 are clamped.
    pub fn from_score(score: u8) -> Self {
        let score = score.min(100);
        Self {
            score,
            tier: ScoreTier::from_score(score),
        }
    }

    /// Draw a final score in `MIN_FINAL_SCORE..=MAX_FINAL_SCORE`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_score(rng.gen_range(MIN_FINAL_SCORE..=MAX_FINAL_SCORE))
    }

    /// Intermediate values flashed before the final score is revealed.
    ///
    /// Each value is in `1..=100`.
    pub fn countdown<R: Rng + ?Sized>(rng: &mut R, steps: usize) -> Vec<u8> {
        (0..steps).map(|_| rng.gen_range(1..=100)).collect()
    }

    /// The numeric score.
    pub fn score(&self) -> u8 {
        self.score
    }

    /// The tier the score falls into.
    pub fn tier(&self) -> ScoreTier {
        self.tier
    }

    /// Shorthand for `tier().verdict()`.
    pub fn verdict(&self) -> &'static str {
        self.tier.verdict()
    }

    /// Shorthand for `tier().hint()`.
    pub fn hint(&self) -> &'static str {
        self.tier.hint()
    }
}
