use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{Word, normalize_letter};

/// Valid transitions:
/// - InProgress -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    /// Guesses are being accepted
    InProgress,
    /// Every letter of the word has been guessed
    Won,
    /// The error limit has been reached
    Lost,
}

impl GameState {
    /// Indicates the game has ended and no guesses can be made anymore
    pub const fn is_final(self) -> bool {
        match self {
            Self::InProgress => false,
            Self::Won => true,
            Self::Lost => true,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Outcome of submitting one guess
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GuessOutcome {
    /// Precondition not met (repeat letter, non-alphabet input, or a finished
    /// game); the state did not change
    Ignored,
    /// The letter occurs in the word
    Correct,
    /// The letter does not occur in the word
    Wrong,
    /// Correct, and it completed the word
    Won,
    /// Wrong, and it exhausted the error limit
    Lost,
}

impl GuessOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }

    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Correct | Self::Won)
    }

    pub const fn is_decisive(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// How a finished game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Won,
    Lost,
}

/// Represents one play-through of a single word from start to finish.
///
/// Evaluation is pure: the same sequence of guesses against the same word
/// always produces the same states, regardless of timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    word: Word,
    hint: String,
    guessed: BTreeSet<char>,
    error_count: u8,
    turn_count: u32,
    state: GameState,
}

impl Game {
    /// Wrong guesses allowed before the game is lost.
    pub const MAX_ERRORS: u8 = 6;

    pub fn new(word: Word, hint: impl Into<String>) -> Self {
        Self {
            word,
            hint: hint.into(),
            guessed: BTreeSet::new(),
            error_count: 0,
            turn_count: 0,
            state: Default::default(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn ended(&self) -> bool {
        self.state.is_final()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.state {
            GameState::InProgress => None,
            GameState::Won => Some(GameOutcome::Won),
            GameState::Lost => Some(GameOutcome::Lost),
        }
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn guessed_letters(&self) -> &BTreeSet<char> {
        &self.guessed
    }

    pub fn has_guessed(&self, letter: char) -> bool {
        normalize_letter(letter).is_some_and(|letter| self.guessed.contains(&letter))
    }

    pub fn error_count(&self) -> u8 {
        self.error_count
    }

    /// How many wrong guesses are still allowed
    pub fn errors_left(&self) -> u8 {
        Self::MAX_ERRORS - self.error_count
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// The word with unguessed letters hidden
    pub fn masked_word(&self) -> String {
        self.word.masked(&self.guessed)
    }

    /// Evaluates one guess. Repeat letters, non-alphabet input and guesses
    /// against a finished game are absorbed as [`GuessOutcome::Ignored`]
    /// without touching any counter, which makes rapid duplicate input
    /// (held key, double click) harmless.
    pub fn submit_guess(&mut self, letter: char) -> GuessOutcome {
        use GuessOutcome::*;

        let Some(letter) = normalize_letter(letter) else {
            return Ignored;
        };
        if self.state.is_final() || !self.guessed.insert(letter) {
            return Ignored;
        }
        self.turn_count += 1;

        if self.word.contains(letter) {
            if self.word.is_solved_by(&self.guessed) {
                log::debug!("word {} solved in {} turns", self.word, self.turn_count);
                self.state = GameState::Won;
                Won
            } else {
                Correct
            }
        } else {
            self.error_count += 1;
            if self.error_count >= Self::MAX_ERRORS {
                log::debug!("error limit reached on {:?}", letter);
                self.state = GameState::Lost;
                Lost
            } else {
                Wrong
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(word: &str) -> Game {
        Game::new(Word::parse(word).unwrap(), "una pista")
    }

    #[test]
    fn winning_word_resolves_on_the_last_letter() {
        let mut game = game("GAT");

        assert_eq!(game.submit_guess('G'), GuessOutcome::Correct);
        assert_eq!(game.submit_guess('A'), GuessOutcome::Correct);
        assert_eq!(game.turn_count(), 2);
        assert_eq!(game.guessed_letters(), &BTreeSet::from(['A', 'G']));
        assert_eq!(game.state(), GameState::InProgress);

        assert_eq!(game.submit_guess('T'), GuessOutcome::Won);
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.outcome(), Some(GameOutcome::Won));
        assert_eq!(game.error_count(), 0);
    }

    #[test]
    fn sixth_wrong_guess_loses_not_before() {
        let mut game = game("GAT");

        for (i, letter) in ['B', 'C', 'D', 'E', 'F', 'H'].into_iter().enumerate() {
            assert_eq!(game.state(), GameState::InProgress, "lost after {i} errors");
            let outcome = game.submit_guess(letter);
            if i < 5 {
                assert_eq!(outcome, GuessOutcome::Wrong);
            } else {
                assert_eq!(outcome, GuessOutcome::Lost);
            }
        }

        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.error_count(), Game::MAX_ERRORS);
        assert_eq!(game.errors_left(), 0);
    }

    #[test]
    fn repeat_guess_is_idempotent() {
        let mut game = game("GAT");

        assert_eq!(game.submit_guess('X'), GuessOutcome::Wrong);
        let snapshot = game.clone();

        assert_eq!(game.submit_guess('X'), GuessOutcome::Ignored);
        assert_eq!(game.submit_guess('x'), GuessOutcome::Ignored);
        assert_eq!(game, snapshot);
    }

    #[test]
    fn non_alphabet_guess_changes_nothing() {
        let mut game = game("GAT");
        let snapshot = game.clone();

        assert_eq!(game.submit_guess('4'), GuessOutcome::Ignored);
        assert_eq!(game.submit_guess('!'), GuessOutcome::Ignored);
        assert_eq!(game, snapshot);
        assert_eq!(game.turn_count(), 0);
    }

    #[test]
    fn finished_game_absorbs_further_guesses() {
        let mut game = game("OS");
        game.submit_guess('O');
        assert_eq!(game.submit_guess('S'), GuessOutcome::Won);
        let snapshot = game.clone();

        assert_eq!(game.submit_guess('Q'), GuessOutcome::Ignored);
        assert_eq!(game, snapshot);
    }

    #[test]
    fn error_count_never_exceeds_the_limit() {
        let mut game = game("GAT");
        for letter in ['B', 'C', 'D', 'E', 'F', 'H', 'I', 'J', 'K'] {
            game.submit_guess(letter);
            assert!(game.error_count() <= Game::MAX_ERRORS);
        }
        assert_eq!(game.error_count(), Game::MAX_ERRORS);
        assert_eq!(game.turn_count(), 6);
    }

    #[test]
    fn cedilla_guess_matches_from_either_case() {
        let mut game = game("CALÇOT");
        assert_eq!(game.submit_guess('ç'), GuessOutcome::Correct);
        assert_eq!(game.masked_word(), "___Ç__");
    }
}
