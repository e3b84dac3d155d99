//! Sequence generation and derived target orderings.

use std::fmt;

use span_types::{InvalidConfigurationError, InvalidModeError, Mode, SymbolSet};

use crate::random::{BoxedRandom, RandomSource, ThreadRandom};

/// State of one active trial: the allowed symbols, the target length, and the
/// sequence currently shown to the player.
///
/// Invariant: `sequence.len() == length` and every element of `sequence` is in
/// `symbols` after every mutating call. `symbols` never changes after
/// construction.
pub struct SequenceEngine {
    symbols: SymbolSet,
    length: usize,
    floor: usize,
    sequence: Vec<char>,
    rng: BoxedRandom,
}

impl SequenceEngine {
    /// Build an engine that already holds `starting_length` fresh symbols.
    ///
    /// `starting_length` also becomes the floor for [`retreat`](Self::retreat).
    pub fn new(
        starting_length: usize,
        symbols: SymbolSet,
    ) -> Result<Self, InvalidConfigurationError> {
        Self::with_rng(starting_length, symbols, ThreadRandom)
    }

    /// Engine over the decimal digits.
    pub fn digits(starting_length: usize) -> Result<Self, InvalidConfigurationError> {
        Self::new(starting_length, SymbolSet::digits())
    }

    /// Engine over an arbitrary symbol list; rejects empty or repeated symbols.
    pub fn from_symbols(
        starting_length: usize,
        symbols: impl IntoIterator<Item = char>,
    ) -> Result<Self, InvalidConfigurationError> {
        Self::new(starting_length, SymbolSet::new(symbols)?)
    }

    pub fn with_rng(
        starting_length: usize,
        symbols: SymbolSet,
        rng: impl RandomSource + 'static,
    ) -> Result<Self, InvalidConfigurationError> {
        Self::with_boxed_rng(starting_length, symbols, Box::new(rng))
    }

    pub fn with_boxed_rng(
        starting_length: usize,
        symbols: SymbolSet,
        rng: BoxedRandom,
    ) -> Result<Self, InvalidConfigurationError> {
        if starting_length == 0 {
            return Err(InvalidConfigurationError::ZeroLength);
        }
        let mut engine = Self {
            symbols,
            length: starting_length,
            floor: starting_length,
            sequence: Vec::with_capacity(starting_length),
            rng,
        };
        engine.generate();
        Ok(engine)
    }

    /// Grow by one symbol and draw a completely new sequence.
    pub fn advance(&mut self) -> Vec<char> {
        self.length += 1;
        self.generate();
        self.current_sequence()
    }

    /// Shrink by one symbol (never below the starting length) and draw a new
    /// sequence. At the floor only the sequence changes.
    pub fn retreat(&mut self) -> Vec<char> {
        if self.length > self.floor {
            self.length -= 1;
        }
        self.generate();
        self.current_sequence()
    }

    /// Draw a new sequence at the current length.
    pub fn reshuffle(&mut self) -> Vec<char> {
        self.generate();
        self.current_sequence()
    }

    /// Snapshot of the shown sequence. Mutating the returned value has no
    /// effect on the engine.
    #[must_use]
    pub fn current_sequence(&self) -> Vec<char> {
        self.sequence.clone()
    }

    /// The input the player is expected to type for `mode`.
    #[must_use]
    pub fn target_sequence(&self, mode: Mode) -> Vec<char> {
        mode.apply(&self.sequence)
    }

    /// Like [`target_sequence`](Self::target_sequence) but takes a mode name,
    /// failing for anything that is not a recognised key.
    pub fn target_sequence_named(&self, mode: &str) -> Result<Vec<char>, InvalidModeError> {
        Ok(self.target_sequence(Mode::parse(mode)?))
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn floor(&self) -> usize {
        self.floor
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Length that [`retreat`](Self::retreat) would produce.
    #[must_use]
    pub fn retreat_length(&self) -> usize {
        if self.length > self.floor {
            self.length - 1
        } else {
            self.length
        }
    }

    fn generate(&mut self) {
        let bound = self.symbols.len();
        self.sequence.clear();
        for _ in 0..self.length {
            // Clamp so a misbehaving custom source cannot break the symbol invariant.
            let index = self.rng.next_index(bound).min(bound - 1);
            if let Some(symbol) = self.symbols.get(index) {
                self.sequence.push(symbol);
            }
        }
        debug_assert_eq!(self.sequence.len(), self.length);
    }
}

impl fmt::Debug for SequenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceEngine")
            .field("symbols", &self.symbols)
            .field("length", &self.length)
            .field("floor", &self.floor)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::scripted;

    fn always(index: usize) -> impl FnMut(usize) -> usize {
        move |_| index
    }

    #[test]
    fn fresh_engine_holds_starting_length_symbols() {
        for starting in [1, 3, 9, 25] {
            let engine = SequenceEngine::digits(starting).unwrap();
            let sequence = engine.current_sequence();
            assert_eq!(sequence.len(), starting);
            assert!(sequence.iter().all(|c| engine.symbols().contains(*c)));
            assert_eq!(engine.length(), starting);
            assert_eq!(engine.floor(), starting);
        }
    }

    #[test]
    fn construction_rejects_zero_length() {
        let err = SequenceEngine::digits(0).unwrap_err();
        assert_eq!(err, InvalidConfigurationError::ZeroLength);
    }

    #[test]
    fn construction_rejects_empty_symbols() {
        let err = SequenceEngine::from_symbols(3, Vec::new()).unwrap_err();
        assert_eq!(err, InvalidConfigurationError::EmptySymbols);
    }

    #[test]
    fn advance_grows_by_one_each_call() {
        let mut engine = SequenceEngine::digits(2).unwrap();
        for n in 1..=10 {
            let sequence = engine.advance();
            assert_eq!(sequence.len(), 2 + n);
            assert_eq!(engine.current_sequence().len(), 2 + n);
        }
    }

    #[test]
    fn retreat_respects_floor() {
        let mut engine = SequenceEngine::digits(4).unwrap();
        assert_eq!(engine.retreat().len(), 4);
        assert_eq!(engine.length(), 4);

        engine.advance();
        engine.advance();
        assert_eq!(engine.retreat_length(), 5);
        assert_eq!(engine.retreat().len(), 5);
        assert_eq!(engine.retreat().len(), 4);
        assert_eq!(engine.retreat().len(), 4);
    }

    #[test]
    fn retreat_never_goes_below_one() {
        let mut engine = SequenceEngine::digits(1).unwrap();
        for _ in 0..5 {
            engine.retreat();
        }
        assert_eq!(engine.length(), 1);
        assert_eq!(engine.current_sequence().len(), 1);
    }

    #[test]
    fn mocked_draws_repeat_first_symbol() {
        let mut engine = SequenceEngine::with_rng(3, SymbolSet::digits(), always(0)).unwrap();
        assert_eq!(engine.current_sequence(), vec!['0', '0', '0']);
        assert_eq!(engine.advance(), vec!['0', '0', '0', '0']);
        assert_eq!(engine.length(), 4);
    }

    #[test]
    fn out_of_range_draws_are_clamped() {
        let symbols = SymbolSet::try_from("ab").unwrap();
        let engine = SequenceEngine::with_rng(3, symbols, always(99)).unwrap();
        assert_eq!(engine.current_sequence(), vec!['b', 'b', 'b']);
    }

    #[test]
    fn target_sequences_follow_mode() {
        let engine =
            SequenceEngine::with_rng(3, SymbolSet::digits(), scripted(vec![3, 1, 2])).unwrap();
        assert_eq!(engine.current_sequence(), vec!['3', '1', '2']);
        assert_eq!(engine.target_sequence(Mode::Default), vec!['3', '1', '2']);
        assert_eq!(engine.target_sequence(Mode::Reversed), vec!['2', '1', '3']);
        assert_eq!(engine.target_sequence(Mode::Ordered), vec!['1', '2', '3']);
    }

    #[test]
    fn ordered_target_keeps_duplicates() {
        let draws = scripted(vec![7, 2, 7, 0]);
        let engine = SequenceEngine::with_rng(4, SymbolSet::digits(), draws).unwrap();
        assert_eq!(engine.target_sequence(Mode::Ordered), vec!['0', '2', '7', '7']);
    }

    #[test]
    fn unknown_mode_name_fails_without_mutation() {
        let engine = SequenceEngine::digits(5).unwrap();
        let before = engine.current_sequence();
        let err = engine.target_sequence_named("backwards").unwrap_err();
        assert_eq!(err.mode, "backwards");
        assert_eq!(engine.current_sequence(), before);
        assert_eq!(engine.length(), 5);
        assert_eq!(
            engine.target_sequence_named("reversed").unwrap(),
            engine.target_sequence(Mode::Reversed)
        );
    }

    #[test]
    fn snapshots_are_copies() {
        let engine = SequenceEngine::digits(4).unwrap();
        let mut snapshot = engine.current_sequence();
        snapshot.clear();
        assert_eq!(engine.current_sequence().len(), 4);
        assert_eq!(engine.current_sequence(), engine.current_sequence());
    }

    #[test]
    fn reshuffle_keeps_length() {
        let mut engine =
            SequenceEngine::with_rng(2, SymbolSet::digits(), scripted(vec![1, 2, 3, 4])).unwrap();
        assert_eq!(engine.current_sequence(), vec!['1', '2']);
        assert_eq!(engine.reshuffle(), vec!['3', '4']);
        assert_eq!(engine.length(), 2);
    }
}
