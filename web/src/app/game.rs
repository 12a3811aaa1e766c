use gloo::events::EventListener;
use gloo::timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::KeyboardEvent;
use yew::prelude::*;

use penjat_core::{
    ALPHABET, ContentSource, Effect, Game, GameOutcome, Generation, ImageRef, Session,
    SessionStatus, WordContent,
};

use crate::app::audio::{AudioCx, Cue};
use crate::app::provider::LocalContentSource;
use crate::app::settings::SettingsView;
use crate::app::utils::{Modal, js_random_seed};

#[derive(Debug)]
pub(crate) enum Msg {
    NewGame,
    Guess(char),
    ContentReady {
        generation: Generation,
        content: WordContent,
        image: Option<ImageRef>,
    },
    ContentFailed {
        generation: Generation,
        message: String,
    },
    ReactionElapsed {
        generation: Generation,
    },
    UpdateTime,
    ToggleSettings,
    ToggleMute,
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameProps {
    #[prop_or_default]
    pub forced_seed: Option<u64>,
}

fn format_for_counter(num: i32) -> String {
    match num {
        ..0 => "000".to_string(),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

const fn new_game_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Idle => "Comença",
        SessionStatus::Loading => "···",
        SessionStatus::Playing => "Torna a començar",
        SessionStatus::Won | SessionStatus::Lost => "Una altra!",
        SessionStatus::Error => "Torna-ho a provar",
    }
}

pub(crate) struct GameView {
    session: Session,
    provider: LocalContentSource,
    audio: AudioCx,
    postcard: Option<ImageRef>,
    settings_open: bool,
    prev_time: u32,
    _timer_interval: Interval,
    _kbd_listener: EventListener,
}

impl GameView {
    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(500, move || link.send_message(Msg::UpdateTime))
    }

    /// Physical keyboard input mirrors the on-screen one: single letters
    /// guess, Enter starts over.
    fn create_kbd_listener(ctx: &Context<Self>) -> EventListener {
        let link = ctx.link().clone();
        EventListener::new(&gloo::utils::document(), "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = event.key();
            log::trace!("keydown: {key}");
            if key == "Enter" {
                link.send_message(Msg::NewGame);
                return;
            }
            let mut chars = key.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                link.send_message(Msg::Guess(ch));
            }
        })
    }

    fn run_effect(&self, ctx: &Context<Self>, effect: Effect) {
        match effect {
            Effect::FetchContent {
                generation,
                seed,
                exclude,
            } => {
                log::debug!("fetching content for session {generation}, seed {seed}");
                let link = ctx.link().clone();
                let provider = self.provider.clone();
                spawn_local(async move {
                    match provider.generate_word(&exclude).await {
                        Ok(content) => {
                            let image = match provider
                                .generate_hidden_image(&content.word, &content.image_description)
                                .await
                            {
                                Ok(image) => Some(image),
                                Err(err) => {
                                    log::warn!("illustration failed, placeholder will be used: {err}");
                                    None
                                }
                            };
                            link.send_message(Msg::ContentReady {
                                generation,
                                content,
                                image,
                            });
                        }
                        Err(err) => link.send_message(Msg::ContentFailed {
                            generation,
                            message: err.to_string(),
                        }),
                    }
                });
            }
            Effect::ScheduleReaction { generation, delay } => {
                let link = ctx.link().clone();
                Timeout::new(delay.as_millis() as u32, move || {
                    link.send_message(Msg::ReactionElapsed { generation });
                })
                .forget();
            }
        }
    }

    fn view_stage(&self, ctx: &Context<Self>) -> Html {
        match self.session.status() {
            SessionStatus::Idle => html! {
                <section class="idle">
                    <p>{"Endevina la paraula abans que el dibuix es descobreixi del tot."}</p>
                    <button onclick={ctx.link().callback(|_| Msg::NewGame)}>{"Comença"}</button>
                </section>
            },
            SessionStatus::Loading => html! {
                <section class="loading">
                    <p>{"Preparant una paraula nova..."}</p>
                </section>
            },
            SessionStatus::Error => {
                let message = self
                    .session
                    .failure()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                html! {
                    <section class="error">
                        <p>{message}</p>
                        <button onclick={ctx.link().callback(|_| Msg::NewGame)}>
                            {"Torna-ho a provar"}
                        </button>
                    </section>
                }
            }
            SessionStatus::Playing | SessionStatus::Won | SessionStatus::Lost => html! {
                <>
                    { self.view_board() }
                    { self.view_word() }
                    { self.view_keyboard(ctx) }
                    { self.view_postcard() }
                </>
            },
        }
    }

    fn view_board(&self) -> Html {
        let Some(plan) = self.session.plan() else {
            return Html::default();
        };
        let revealed_count = self.session.revealed_count();
        let size = plan.grid().size();
        let image = self.session.image().cloned().unwrap_or_default();
        html! {
            <div class="board" style={format!("background-image: url(\"{image}\")")}>
                <table class="cover">
                    {
                        for (0..size).map(|row| html! {
                            <tr>
                                {
                                    for (0..size).map(|col| {
                                        let revealed = plan.is_revealed((row, col), revealed_count);
                                        html! {
                                            <td class={classes!("tile", revealed.then_some("revealed"))}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
            </div>
        }
    }

    fn view_word(&self) -> Html {
        let Some(game) = self.session.game() else {
            return Html::default();
        };
        let word = if self.session.status().is_terminal() {
            game.word().to_string()
        } else {
            game.masked_word()
        };
        html! {
            <>
                <p class="hint">{game.hint()}</p>
                <p class="word">{word}</p>
            </>
        }
    }

    fn view_keyboard(&self, ctx: &Context<Self>) -> Html {
        let game = self.session.game();
        let accepting = self.session.status().accepts_guesses();
        html! {
            <div class="keyboard">
                {
                    for ALPHABET.iter().map(|&letter| {
                        let guessed = game.is_some_and(|game| game.has_guessed(letter));
                        let correct =
                            guessed && game.is_some_and(|game| game.word().contains(letter));
                        let class = classes!(
                            "key",
                            guessed.then_some(if correct { "correct" } else { "wrong" }),
                        );
                        let onclick = ctx.link().callback(move |_| Msg::Guess(letter));
                        html! {
                            <button {class} disabled={guessed || !accepting} {onclick}>
                                {letter.to_string()}
                            </button>
                        }
                    })
                }
            </div>
        }
    }

    fn view_postcard(&self) -> Html {
        match &self.postcard {
            Some(postcard) => html! {
                <img class="postcard" src={postcard.clone()} alt="Postal del resultat"/>
            },
            None => Html::default(),
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            session: Session::default(),
            provider: LocalContentSource::new(js_random_seed()),
            audio: AudioCx::default(),
            postcard: None,
            settings_open: false,
            prev_time: 0,
            _timer_interval: Self::create_timer(ctx),
            _kbd_listener: Self::create_kbd_listener(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            NewGame => {
                let seed = ctx.props().forced_seed.unwrap_or_else(js_random_seed);
                self.postcard = None;
                let effect = self.session.start(seed);
                self.run_effect(ctx, effect);
                true
            }
            Guess(letter) => {
                let feedback = self.session.guess(letter);
                if feedback.outcome.has_update() {
                    self.audio.play(if feedback.outcome.is_correct() {
                        Cue::Correct
                    } else {
                        Cue::Wrong
                    });
                }
                if let Some(effect) = feedback.effect {
                    self.run_effect(ctx, effect);
                }
                feedback.outcome.has_update()
            }
            ContentReady {
                generation,
                content,
                image,
            } => {
                self.session.content_ready(generation, content, image);
                true
            }
            ContentFailed {
                generation,
                message,
            } => {
                self.session.content_failed(generation, &message);
                true
            }
            ReactionElapsed { generation } => match self.session.reaction_elapsed(generation) {
                Some(outcome) => {
                    self.audio.play(match outcome {
                        GameOutcome::Won => Cue::Win,
                        GameOutcome::Lost => Cue::Lose,
                    });
                    if let Some(game) = self.session.game() {
                        self.postcard =
                            Some(self.provider.result_artifact(outcome, &game.word().to_string()));
                    }
                    true
                }
                None => false,
            },
            UpdateTime => {
                let time = self.session.elapsed_secs();
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
            ToggleSettings => {
                self.settings_open = !self.settings_open;
                true
            }
            ToggleMute => {
                self.audio.toggle_mute();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let status = self.session.status();
        let status_class = classes!(
            "penjat",
            match status {
                SessionStatus::Idle => "idle",
                SessionStatus::Loading => "loading",
                SessionStatus::Playing => "playing",
                SessionStatus::Won => "won",
                SessionStatus::Lost => "lost",
                SessionStatus::Error => "error",
            }
        );
        let errors_left = self.session.game().map_or(Game::MAX_ERRORS, Game::errors_left);
        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });
        let cb_show_settings = ctx.link().callback(|_| ToggleSettings);

        html! {
            <div class={status_class}>
                <small onclick={cb_show_settings}>{"···"}</small>
                <nav>
                    <aside>{format_for_counter(errors_left as i32)}</aside>
                    <span>
                        <button class="new-game" onclick={cb_new_game}>
                            {new_game_label(status)}
                        </button>
                    </span>
                    <aside>{format_for_counter(self.session.elapsed_secs() as i32)}</aside>
                </nav>
                { self.view_stage(ctx) }
                <Modal>
                    <SettingsView
                        open={self.settings_open}
                        muted={self.audio.is_muted()}
                        on_toggle_mute={ctx.link().callback(|_| ToggleMute)}
                        on_close={ctx.link().callback(|_| ToggleSettings)}
                    />
                </Modal>
            </div>
        }
    }
}
