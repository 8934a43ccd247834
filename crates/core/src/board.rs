//! Board module - fixed-length sequence of paired cards
//!
//! Positions `0..len` are stable for the whole session and are the only
//! addressing scheme used outside the core. Every kind appears exactly twice.

use thiserror::Error;

use crate::card::Card;
use crate::rng::GameRng;
use crate::types::CardKind;

/// Construction-time invariant violations.
///
/// These indicate a configuration error, never player behavior.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("card alphabet is empty")]
    EmptyAlphabet,
    #[error("board length {0} is not even")]
    OddLength(usize),
    #[error("board length {len} cannot hold two cards of each of {kinds} kinds")]
    LengthMismatch { len: usize, kinds: usize },
    #[error("card kind `{0}` appears more than once in the alphabet")]
    DuplicateKind(&'static str),
    #[error("card kind `{kind}` appears {count} times, expected exactly 2")]
    UnpairedKind { kind: &'static str, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Deal the built-in eight-kind alphabet onto a 16-card board.
    pub fn standard(rng: &mut GameRng) -> Self {
        Self::deal(&CardKind::ALL, rng)
    }

    /// Deal `alphabet` onto a board of `len` positions.
    ///
    /// Fails fast if the alphabet is empty, repeats a kind, or `len` is not
    /// exactly `2 * alphabet.len()`.
    pub fn shuffled(
        alphabet: &[CardKind],
        len: usize,
        rng: &mut GameRng,
    ) -> Result<Self, BoardError> {
        validate_alphabet(alphabet, len)?;
        Ok(Self::deal(alphabet, rng))
    }

    /// Build a board with a fixed layout (tests, replays).
    pub fn from_kinds(kinds: &[CardKind]) -> Result<Self, BoardError> {
        if kinds.is_empty() {
            return Err(BoardError::EmptyAlphabet);
        }
        if kinds.len() % 2 != 0 {
            return Err(BoardError::OddLength(kinds.len()));
        }
        for kind in kinds {
            let count = kinds.iter().filter(|k| *k == kind).count();
            if count != 2 {
                return Err(BoardError::UnpairedKind {
                    kind: kind.as_str(),
                    count,
                });
            }
        }

        Ok(Self {
            cards: kinds.iter().copied().map(Card::new).collect(),
        })
    }

    /// Random placement by drawing from a shrinking candidate list.
    ///
    /// Each kind takes two consecutive draws. Callers guarantee the alphabet
    /// is non-empty and duplicate-free.
    pub(crate) fn deal(alphabet: &[CardKind], rng: &mut GameRng) -> Self {
        let len = alphabet.len() * 2;
        let mut candidates: Vec<usize> = (0..len).collect();
        let mut cards = vec![Card::new(alphabet[0]); len];

        for &kind in alphabet {
            for _ in 0..2 {
                let pick = rng.gen_index(candidates.len());
                let pos = candidates.remove(pick);
                cards[pos] = Card::new(kind);
            }
        }

        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of distinct kinds (= pairs) on the board.
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn count_of(&self, kind: CardKind) -> usize {
        self.cards.iter().filter(|c| c.kind() == kind).count()
    }

    /// Distinct kinds in order of first appearance.
    pub fn kinds(&self) -> Vec<CardKind> {
        let mut out: Vec<CardKind> = Vec::with_capacity(self.pair_count());
        for card in &self.cards {
            if !out.contains(&card.kind()) {
                out.push(card.kind());
            }
        }
        out
    }
}

fn validate_alphabet(alphabet: &[CardKind], len: usize) -> Result<(), BoardError> {
    if alphabet.is_empty() {
        return Err(BoardError::EmptyAlphabet);
    }
    if len % 2 != 0 {
        return Err(BoardError::OddLength(len));
    }
    if len != alphabet.len() * 2 {
        return Err(BoardError::LengthMismatch {
            len,
            kinds: alphabet.len(),
        });
    }
    for (i, kind) in alphabet.iter().enumerate() {
        if alphabet[..i].contains(kind) {
            return Err(BoardError::DuplicateKind(kind.as_str()));
        }
    }
    Ok(())
}

impl Default for Board {
    fn default() -> Self {
        Self::standard(&mut GameRng::new(1))
    }
}
