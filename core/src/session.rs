use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::{
    ContentFailure, FALLBACK_IMAGE, Game, GameOutcome, GridSpec, GuessOutcome, ImageRef,
    NoisyRadialGenerator, RevealOrderGenerator, RevealPlan, Word, WordContent,
};

/// Session status. Valid transitions:
/// - Idle -> Loading
/// - Loading -> Playing
/// - Loading -> Error
/// - Playing -> Won
/// - Playing -> Lost
/// - Won/Lost/Error -> Loading (explicit new start only)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Loading,
    Playing,
    Won,
    Lost,
    Error,
}

impl SessionStatus {
    pub const fn accepts_guesses(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Error)
    }
}

/// Token tying async completions and timers to the session that spawned them.
/// Bumped on every start, so anything carrying an older token is stale.
pub type Generation = u64;

/// Side effects the driver must execute on behalf of the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Ask the content provider for a new word, hint and illustration.
    FetchContent {
        generation: Generation,
        seed: u64,
        exclude: Vec<String>,
    },
    /// Arm the timer that later resolves the decisive outcome, once the
    /// reaction animation has had its moment.
    ScheduleReaction {
        generation: Generation,
        delay: Duration,
    },
}

/// How turn progress maps to uncovered tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSettings {
    /// Tiles already uncovered when play begins.
    pub base_reveal: usize,
    /// Additional tiles per accepted guess, right or wrong.
    pub per_turn_reveal: usize,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            base_reveal: 2,
            per_turn_reveal: 2,
        }
    }
}

/// What one guess did, plus whatever the driver now has to do.
#[derive(Clone, Debug, PartialEq)]
pub struct GuessFeedback {
    pub outcome: GuessOutcome,
    pub effect: Option<Effect>,
}

/// Orchestrates one session at a time: content acquisition, the guessing
/// game, and the reveal pacing of the hidden illustration.
///
/// The controller is sans-io. Every external input arrives as a method call
/// from the driver, and anything the controller wants done comes back as an
/// [`Effect`]; nothing here blocks or spawns.
#[derive(Clone, Debug)]
pub struct Session {
    status: SessionStatus,
    grid: GridSpec,
    reveal: RevealSettings,
    game: Option<Game>,
    plan: Option<RevealPlan>,
    image: Option<ImageRef>,
    failure: Option<ContentFailure>,
    last_outcome: Option<GuessOutcome>,
    generation: Generation,
    pending_seed: u64,
    exclude: Vec<String>,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl Session {
    /// How long the win/lose reaction plays before the session resolves.
    pub const REACTION_DELAY: Duration = Duration::from_millis(1200);

    pub fn new(grid: GridSpec, reveal: RevealSettings) -> Self {
        Self {
            status: SessionStatus::Idle,
            grid,
            reveal,
            game: None,
            plan: None,
            image: None,
            failure: None,
            last_outcome: None,
            generation: 0,
            pending_seed: 0,
            exclude: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn plan(&self) -> Option<&RevealPlan> {
        self.plan.as_ref()
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn failure(&self) -> Option<&ContentFailure> {
        self.failure.as_ref()
    }

    /// Outcome of the most recent accepted guess, for reaction visuals/audio.
    pub fn last_outcome(&self) -> Option<GuessOutcome> {
        self.last_outcome
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Begins (or retries) a session. Clears all per-session state, bumps the
    /// generation so pending timers and in-flight fetches of the previous
    /// session land dead, and hands the driver the fetch to run.
    pub fn start(&mut self, seed: u64) -> Effect {
        self.generation += 1;
        self.status = SessionStatus::Loading;
        self.game = None;
        self.plan = None;
        self.image = None;
        self.failure = None;
        self.last_outcome = None;
        self.pending_seed = seed;
        self.started_at = None;
        self.ended_at = None;
        log::debug!("session {} loading, seed {}", self.generation, seed);
        Effect::FetchContent {
            generation: self.generation,
            seed,
            exclude: self.exclude.clone(),
        }
    }

    /// Content arrived. Stale generations are discarded; a word the provider
    /// got wrong is fatal for this start, an absent illustration is not.
    pub fn content_ready(
        &mut self,
        generation: Generation,
        content: WordContent,
        image: Option<ImageRef>,
    ) {
        if generation != self.generation || self.status != SessionStatus::Loading {
            log::debug!("discarding stale content from generation {generation}");
            return;
        }
        let word = match Word::parse(&content.word) {
            Ok(word) => word,
            Err(err) => {
                log::warn!("provider returned unusable word {:?}: {err}", content.word);
                self.failure = Some(ContentFailure::Connection(err.to_string()));
                self.status = SessionStatus::Error;
                return;
            }
        };
        self.image = Some(image.unwrap_or_else(|| {
            log::warn!("no illustration for {word}, substituting the placeholder");
            FALLBACK_IMAGE.to_string()
        }));
        self.plan = Some(NoisyRadialGenerator::new(self.pending_seed).generate(self.grid));
        self.game = Some(Game::new(word, content.hint));
        self.started_at = Some(Instant::now());
        self.status = SessionStatus::Playing;
        log::debug!("session {} playing", self.generation);
    }

    /// Word acquisition failed; the session parks in `Error` until the player
    /// explicitly retries.
    pub fn content_failed(&mut self, generation: Generation, raw: &str) {
        if generation != self.generation || self.status != SessionStatus::Loading {
            log::debug!("discarding stale failure from generation {generation}");
            return;
        }
        let failure = ContentFailure::classify(raw);
        log::warn!("content acquisition failed: {failure}");
        self.failure = Some(failure);
        self.status = SessionStatus::Error;
    }

    /// Forwards one guess to the engine. A decisive guess does not resolve
    /// the session yet; it schedules the reaction timer instead.
    pub fn guess(&mut self, letter: char) -> GuessFeedback {
        let outcome = match (self.status.accepts_guesses(), self.game.as_mut()) {
            (true, Some(game)) => game.submit_guess(letter),
            _ => GuessOutcome::Ignored,
        };
        if outcome.has_update() {
            self.last_outcome = Some(outcome);
        }
        let effect = outcome.is_decisive().then(|| Effect::ScheduleReaction {
            generation: self.generation,
            delay: Self::REACTION_DELAY,
        });
        GuessFeedback { outcome, effect }
    }

    /// The reaction timer fired. A timer from a superseded session is
    /// ignored, so it can never overwrite a freshly reset one.
    pub fn reaction_elapsed(&mut self, generation: Generation) -> Option<GameOutcome> {
        if generation != self.generation || self.status != SessionStatus::Playing {
            log::debug!("ignoring reaction timer from generation {generation}");
            return None;
        }
        let outcome = self.game.as_ref().and_then(Game::outcome)?;
        self.status = match outcome {
            GameOutcome::Won => SessionStatus::Won,
            GameOutcome::Lost => SessionStatus::Lost,
        };
        self.ended_at = Some(Instant::now());
        if let Some(game) = &self.game {
            self.exclude.push(game.word().to_string());
        }
        log::debug!("session {} resolved as {:?}", self.generation, outcome);
        Some(outcome)
    }

    /// How many tiles of the hidden illustration are currently uncovered.
    pub fn revealed_count(&self) -> usize {
        let total = self
            .plan
            .as_ref()
            .map_or(self.grid.total_tiles(), RevealPlan::total_tiles);
        match self.status {
            SessionStatus::Playing => {
                let turns = self.game.as_ref().map_or(0, Game::turn_count) as usize;
                (self.reveal.base_reveal + self.reveal.per_turn_reveal * turns).min(total)
            }
            SessionStatus::Won | SessionStatus::Lost => total,
            SessionStatus::Idle | SessionStatus::Loading | SessionStatus::Error => 0,
        }
    }

    /// Seconds between entering play and resolving, live while playing.
    pub fn elapsed_secs(&self) -> u32 {
        match self.started_at {
            Some(started) => {
                let end = self.ended_at.unwrap_or_else(Instant::now);
                end.duration_since(started).as_secs() as u32
            }
            None => 0,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GridSpec::default(), RevealSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(word: &str) -> WordContent {
        WordContent {
            word: word.into(),
            hint: "una pista".into(),
            image_description: "un dibuix".into(),
        }
    }

    fn playing_session(word: &str) -> Session {
        let mut session = Session::default();
        let generation = match session.start(1234) {
            Effect::FetchContent { generation, .. } => generation,
            effect => panic!("unexpected effect {effect:?}"),
        };
        session.content_ready(generation, content(word), Some("data:image/png;base64,xyz".into()));
        assert_eq!(session.status(), SessionStatus::Playing);
        session
    }

    #[test]
    fn start_requests_content_and_loads() {
        let mut session = Session::default();

        let effect = session.start(7);
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(
            effect,
            Effect::FetchContent {
                generation: 1,
                seed: 7,
                exclude: vec![],
            },
        );
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn fresh_play_uncovers_the_base_tiles() {
        let session = playing_session("GAT");

        assert_eq!(session.revealed_count(), 2);
        assert!(session.plan().is_some());
        assert_eq!(session.game().unwrap().hint(), "una pista");
        assert_eq!(session.image().unwrap(), "data:image/png;base64,xyz");
    }

    #[test]
    fn every_accepted_guess_uncovers_two_more_tiles() {
        let mut session = playing_session("GAT");

        session.guess('G');
        assert_eq!(session.revealed_count(), 4);
        session.guess('X');
        assert_eq!(session.revealed_count(), 6);
        // ignored input does not advance the reveal
        session.guess('X');
        session.guess('3');
        assert_eq!(session.revealed_count(), 6);
    }

    #[test]
    fn decisive_guess_defers_resolution_to_the_reaction_timer() {
        let mut session = playing_session("GAT");

        session.guess('G');
        session.guess('A');
        let feedback = session.guess('T');
        assert_eq!(feedback.outcome, GuessOutcome::Won);
        assert_eq!(
            feedback.effect,
            Some(Effect::ScheduleReaction {
                generation: 1,
                delay: Session::REACTION_DELAY,
            }),
        );
        // still playing until the timer fires
        assert_eq!(session.status(), SessionStatus::Playing);

        assert_eq!(session.reaction_elapsed(1), Some(GameOutcome::Won));
        assert_eq!(session.status(), SessionStatus::Won);
        assert_eq!(session.revealed_count(), 25);
    }

    #[test]
    fn losing_session_fully_uncovers_the_image() {
        let mut session = playing_session("GAT");

        for letter in ['B', 'C', 'D', 'E', 'F', 'H'] {
            session.guess(letter);
        }
        assert_eq!(session.reaction_elapsed(1), Some(GameOutcome::Lost));
        assert_eq!(session.status(), SessionStatus::Lost);
        assert_eq!(session.revealed_count(), 25);
        assert_eq!(session.last_outcome(), Some(GuessOutcome::Lost));
    }

    #[test]
    fn stale_reaction_timer_cannot_touch_a_new_session() {
        let mut session = playing_session("GAT");
        session.guess('G');
        session.guess('A');
        session.guess('T');

        // the player starts over before the timer fires
        let effect = session.start(99);
        assert_eq!(session.reaction_elapsed(1), None);
        assert_eq!(session.status(), SessionStatus::Loading);

        let Effect::FetchContent { generation, .. } = effect else {
            panic!("expected a fetch");
        };
        session.content_ready(generation, content("OS"), None);
        assert_eq!(session.status(), SessionStatus::Playing);
        assert_eq!(session.game().unwrap().turn_count(), 0);
    }

    #[test]
    fn stale_content_is_discarded() {
        let mut session = Session::default();
        session.start(1);
        session.start(2);

        session.content_ready(1, content("GAT"), None);
        assert_eq!(session.status(), SessionStatus::Loading);
        session.content_failed(1, "timeout");
        assert_eq!(session.status(), SessionStatus::Loading);

        session.content_ready(2, content("GAT"), None);
        assert_eq!(session.status(), SessionStatus::Playing);
    }

    #[test]
    fn rate_limited_fetch_parks_in_error_as_quota() {
        let mut session = Session::default();
        session.start(1);

        session.content_failed(1, "HTTP error 429: too many requests");
        assert_eq!(session.status(), SessionStatus::Error);
        assert_eq!(session.failure(), Some(&ContentFailure::Quota));
        // no other state was touched
        assert!(session.game().is_none());
        assert!(session.plan().is_none());
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn error_status_rejects_guesses_until_retried() {
        let mut session = Session::default();
        session.start(1);
        session.content_failed(1, "boom");

        let feedback = session.guess('A');
        assert_eq!(feedback.outcome, GuessOutcome::Ignored);
        assert_eq!(feedback.effect, None);

        let effect = session.start(5);
        assert!(matches!(effect, Effect::FetchContent { generation: 2, .. }));
    }

    #[test]
    fn missing_illustration_falls_back_to_the_placeholder() {
        let mut session = Session::default();
        session.start(1);
        session.content_ready(1, content("GAT"), None);

        assert_eq!(session.status(), SessionStatus::Playing);
        assert_eq!(session.image().map(String::as_str), Some(FALLBACK_IMAGE));
    }

    #[test]
    fn unusable_word_is_fatal_for_the_start() {
        let mut session = Session::default();
        session.start(1);
        session.content_ready(1, content("G4T"), None);

        assert_eq!(session.status(), SessionStatus::Error);
        assert!(session.failure().is_some());
        assert!(session.game().is_none());
    }

    #[test]
    fn completed_words_join_the_exclude_list() {
        let mut session = playing_session("GAT");
        session.guess('G');
        session.guess('A');
        session.guess('T');
        session.reaction_elapsed(1);

        let effect = session.start(2);
        assert_eq!(
            effect,
            Effect::FetchContent {
                generation: 2,
                seed: 2,
                exclude: vec!["GAT".to_string()],
            },
        );
    }

    #[test]
    fn reveal_count_is_clamped_to_the_grid() {
        let mut session = Session::new(
            GridSpec::new(3).unwrap(),
            RevealSettings {
                base_reveal: 2,
                per_turn_reveal: 4,
            },
        );
        session.start(1);
        session.content_ready(1, content("XINXETA"), None);

        session.guess('Q');
        session.guess('W');
        assert_eq!(session.revealed_count(), 9);
    }
}
