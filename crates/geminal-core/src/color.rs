//! Color identities: cosmetic (primary, accent) pairs that tell windows apart.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// A (primary, accent) color pair, as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorIdentity {
    pub primary: &'static str,
    pub accent: &'static str,
}

const fn pair(primary: &'static str, accent: &'static str) -> ColorIdentity {
    ColorIdentity { primary, accent }
}

/// The fixed palette identities are drawn from.
pub const PALETTE: [ColorIdentity; 10] = [
    pair("#ff6b6b", "#ffd93d"),
    pair("#4ecdc4", "#c7f464"),
    pair("#a78bfa", "#f472b6"),
    pair("#60a5fa", "#34d399"),
    pair("#f97316", "#facc15"),
    pair("#22d3ee", "#818cf8"),
    pair("#f43f5e", "#fb923c"),
    pair("#84cc16", "#2dd4bf"),
    pair("#e879f9", "#38bdf8"),
    pair("#fbbf24", "#f87171"),
];

/// Default number of recent identities an assignment avoids.
pub const DEFAULT_HISTORY: usize = 5;

/// Assigns identities, steering away from the most recently assigned ones.
#[derive(Debug)]
pub struct ColorAssigner {
    palette: Vec<ColorIdentity>,
    recent: VecDeque<ColorIdentity>,
    history: usize,
    rng: StdRng,
}

impl ColorAssigner {
    pub fn new(history: usize) -> Self {
        Self::build(PALETTE.to_vec(), history, StdRng::from_entropy())
    }

    pub fn with_seed(history: usize, seed: u64) -> Self {
        Self::with_palette(PALETTE.to_vec(), history, seed)
    }

    pub fn with_palette(palette: Vec<ColorIdentity>, history: usize, seed: u64) -> Self {
        Self::build(palette, history, StdRng::seed_from_u64(seed))
    }

    fn build(palette: Vec<ColorIdentity>, history: usize, rng: StdRng) -> Self {
        Self {
            palette,
            recent: VecDeque::with_capacity(history),
            history,
            rng,
        }
    }

    /// Pick the next identity. Returns `None` only for an empty palette.
    pub fn assign(&mut self) -> Option<ColorIdentity> {
        let candidates: Vec<ColorIdentity> = self
            .palette
            .iter()
            .copied()
            .filter(|c| !self.recent.contains(c))
            .collect();

        let chosen = if candidates.is_empty() {
            // Palette no larger than the history: reuse the oldest.
            self.recent.front().copied().or_else(|| self.palette.first().copied())?
        } else {
            *candidates.choose(&mut self.rng)?
        };

        self.remember(chosen);
        Some(chosen)
    }

    /// Take back an assignment whose window was never created.
    pub fn forget(&mut self, color: ColorIdentity) {
        self.recent.retain(|c| *c != color);
    }

    /// Identities assigned most recently, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &ColorIdentity> {
        self.recent.iter()
    }

    fn remember(&mut self, color: ColorIdentity) {
        if self.history == 0 {
            return;
        }
        self.recent.retain(|c| *c != color);
        if self.recent.len() == self.history {
            self.recent.pop_front();
        }
        self.recent.push_back(color);
    }
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}
