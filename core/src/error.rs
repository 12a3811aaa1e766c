use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Word has no letters")]
    EmptyWord,
    #[error("Letter {0:?} is outside the game alphabet")]
    LetterOutsideAlphabet(char),
    #[error("Grid size {0} has no center cell, an odd size is required")]
    EvenGridSize(usize),
}

pub type Result<T> = core::result::Result<T, GameError>;
