//! Memory-match puzzle: pair each problem tile with the tile holding its answer.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::Question;

/// Problems dealt by [`MatchPuzzle::standard`].
pub const DEFAULT_PAIRS: [(&str, i32); 6] = [
    ("3 + 4", 7),
    ("2 × 3", 6),
    ("5 + 4", 9),
    ("6 × 2", 12),
    ("8 + 3", 11),
    ("7 × 2", 14),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PuzzleError {
    #[error("puzzle needs at least one pair")]
    Empty,

    #[error("unknown tile {0:?}")]
    UnknownTile(TileId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u32);

impl TileId {
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Problem,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    kind: TileKind,
    label: String,
    answer: i32,
}

impl Tile {
    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn answer(&self) -> i32 {
        self.answer
    }

    /// One problem and one answer tile with the same value.
    #[must_use]
    pub fn matches(&self, other: &Tile) -> bool {
        self.kind != other.kind && self.answer == other.answer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Tile was already face up, matched, or the puzzle is solved.
    Ignored,
    /// First tile of a pair is now face up.
    Revealed(TileId),
    Matched(TileId, TileId),
    /// Both tiles turn face down again.
    Mismatched(TileId, TileId),
}

pub struct MatchPuzzle {
    pairs: Vec<(String, i32)>,
    tiles: Vec<Tile>,
    revealed: Option<TileId>,
    matched: HashSet<TileId>,
    attempts: u32,
    rng: StdRng,
}

impl MatchPuzzle {
    /// Puzzle over [`DEFAULT_PAIRS`].
    #[must_use]
    pub fn standard() -> Self {
        let pairs = DEFAULT_PAIRS
            .iter()
            .map(|(problem, answer)| ((*problem).to_string(), *answer))
            .collect();
        Self::build(pairs, StdRng::from_rng(&mut rand::rng()))
    }

    /// Puzzle over the given problem/answer pairs, shuffled with `seed`.
    ///
    /// # Errors
    ///
    /// Returns `PuzzleError::Empty` if `pairs` is empty.
    pub fn with_pairs(pairs: Vec<(String, i32)>, seed: u64) -> Result<Self, PuzzleError> {
        if pairs.is_empty() {
            return Err(PuzzleError::Empty);
        }
        Ok(Self::build(pairs, StdRng::seed_from_u64(seed)))
    }

    /// Puzzle built from generated quiz questions.
    ///
    /// # Errors
    ///
    /// Returns `PuzzleError::Empty` if `questions` is empty.
    pub fn from_questions(questions: &[Question], seed: u64) -> Result<Self, PuzzleError> {
        let pairs = questions
            .iter()
            .map(|q| (q.prompt().to_string(), q.answer()))
            .collect();
        Self::with_pairs(pairs, seed)
    }

    fn build(pairs: Vec<(String, i32)>, rng: StdRng) -> Self {
        let mut puzzle = Self {
            pairs,
            tiles: Vec::new(),
            revealed: None,
            matched: HashSet::new(),
            attempts: 0,
            rng,
        };
        puzzle.reset();
        puzzle
    }

    /// Deal a fresh shuffled board and clear all progress.
    pub fn reset(&mut self) {
        let mut tiles = Vec::with_capacity(self.pairs.len() * 2);
        let mut next_id = 0_u32;
        for (problem, answer) in &self.pairs {
            tiles.push(Tile {
                id: TileId(next_id),
                kind: TileKind::Problem,
                label: problem.clone(),
                answer: *answer,
            });
            tiles.push(Tile {
                id: TileId(next_id + 1),
                kind: TileKind::Answer,
                label: answer.to_string(),
                answer: *answer,
            });
            next_id += 2;
        }
        tiles.shuffle(&mut self.rng);

        self.tiles = tiles;
        self.revealed = None;
        self.matched.clear();
        self.attempts = 0;
    }

    /// Turn a tile face up; the second flip of a pair counts one attempt.
    ///
    /// # Errors
    ///
    /// Returns `PuzzleError::UnknownTile` if `id` is not on the board.
    pub fn flip(&mut self, id: TileId) -> Result<FlipOutcome, PuzzleError> {
        if self.tile(id).is_none() {
            return Err(PuzzleError::UnknownTile(id));
        }
        if self.is_solved() || self.matched.contains(&id) || self.revealed == Some(id) {
            return Ok(FlipOutcome::Ignored);
        }

        let Some(first) = self.revealed.take() else {
            self.revealed = Some(id);
            return Ok(FlipOutcome::Revealed(id));
        };

        self.attempts += 1;
        let is_match = match (self.tile(first), self.tile(id)) {
            (Some(a), Some(b)) => a.matches(b),
            _ => false,
        };
        if is_match {
            self.matched.insert(first);
            self.matched.insert(id);
            Ok(FlipOutcome::Matched(first, id))
        } else {
            Ok(FlipOutcome::Mismatched(first, id))
        }
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn is_face_up(&self, id: TileId) -> bool {
        self.revealed == Some(id) || self.matched.contains(&id)
    }

    #[must_use]
    pub fn is_matched(&self, id: TileId) -> bool {
        self.matched.contains(&id)
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        !self.tiles.is_empty() && self.matched.len() == self.tiles.len()
    }
}
