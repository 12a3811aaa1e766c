use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::{GameError, Result, normalize_letter};

/// A secret word: non-empty, uppercase, restricted to the game alphabet.
///
/// Built once per session from provider content and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    letters: SmallVec<[char; 16]>,
}

impl Word {
    /// Parses provider output, folding case (including `ç`). Anything outside
    /// the alphabet is a contract violation, not something to silently strip.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut letters = SmallVec::new();
        for ch in raw.trim().chars() {
            let letter = normalize_letter(ch).ok_or(GameError::LetterOutsideAlphabet(ch))?;
            letters.push(letter);
        }
        if letters.is_empty() {
            return Err(GameError::EmptyWord);
        }
        Ok(Self { letters })
    }

    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }

    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.letters.iter().copied()
    }

    pub fn contains(&self, letter: char) -> bool {
        normalize_letter(letter).is_some_and(|letter| self.letters.contains(&letter))
    }

    pub fn distinct_letters(&self) -> BTreeSet<char> {
        self.letters.iter().copied().collect()
    }

    /// Whether every letter of the word appears in `guessed`.
    pub fn is_solved_by(&self, guessed: &BTreeSet<char>) -> bool {
        self.letters.iter().all(|letter| guessed.contains(letter))
    }

    /// The word with unguessed letters hidden behind `_`.
    pub fn masked(&self, guessed: &BTreeSet<char>) -> String {
        self.letters
            .iter()
            .map(|letter| if guessed.contains(letter) { *letter } else { '_' })
            .collect()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in &self.letters {
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_folds_case_and_cedilla() {
        let word = Word::parse("calçot").unwrap();
        assert_eq!(word.to_string(), "CALÇOT");
        assert!(word.contains('ç'));
        assert!(word.contains('C'));
    }

    #[test]
    fn parse_rejects_characters_outside_the_alphabet() {
        assert_eq!(Word::parse("GAT3"), Err(GameError::LetterOutsideAlphabet('3')));
        assert_eq!(Word::parse("DOS MOTS"), Err(GameError::LetterOutsideAlphabet(' ')));
        assert_eq!(Word::parse("CANÇÓ"), Err(GameError::LetterOutsideAlphabet('Ó')));
        assert_eq!(Word::parse("   "), Err(GameError::EmptyWord));
        assert_eq!(Word::parse(""), Err(GameError::EmptyWord));
    }

    #[test]
    fn solved_only_when_every_letter_is_guessed() {
        let word = Word::parse("GAT").unwrap();
        let mut guessed = BTreeSet::from(['G', 'A']);
        assert!(!word.is_solved_by(&guessed));
        assert_eq!(word.masked(&guessed), "GA_");
        guessed.insert('T');
        assert!(word.is_solved_by(&guessed));
        assert_eq!(word.masked(&guessed), "GAT");
    }

    #[test]
    fn repeated_letters_need_a_single_guess() {
        let word = Word::parse("ESTRELLA").unwrap();
        assert_eq!(word.distinct_letters(), BTreeSet::from(['A', 'E', 'L', 'R', 'S', 'T']));
        assert!(word.is_solved_by(&word.distinct_letters()));
    }
}
