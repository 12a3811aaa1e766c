use rand::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use penjat_core::{ContentError, ContentSource, GameOutcome, ImageRef, WordContent};

/// word, hint, illustration description
const CATALOG: &[(&str, &str, &str)] = &[
    ("GAT", "Animal domèstic que ronca i caça ratolins", "un gat taronja adormit sobre un coixí"),
    ("MUNTANYA", "Pot tenir neu al cim", "una muntanya nevada sota un cel blau"),
    ("BARCA", "Sura i serveix per pescar", "una barca de fusta en un port tranquil"),
    ("FORMIGA", "Petita, treballadora i viu en colònies", "una formiga carregant una fulla verda"),
    ("LLIBRE", "Té pàgines i explica històries", "un llibre obert amb les pàgines al vent"),
    ("ESTRELLA", "Brilla al cel de nit", "un cel nocturn amb una estrella fugaç"),
    ("CARAGOL", "Porta la casa a sobre", "un caragol sobre una fulla després de la pluja"),
    ("PLATJA", "Sorra, onades i para-sols", "una platja assolellada amb un para-sol vermell"),
    ("TARONJA", "Fruita i color alhora", "una taronja partida sobre una taula de cuina"),
    ("DRAC", "Treu foc per la boca a les llegendes", "un drac verd volant entre núvols"),
    ("CASTELL", "Té torres, muralles i potser un fossat", "un castell medieval dalt d'un turó"),
    ("BICICLETA", "Dues rodes i pedals", "una bicicleta groga recolzada en un fanal"),
    ("CALÇOT", "Es menja a la brasa amb salsa romesco", "una calçotada fumejant sobre una teula"),
    ("BALANÇA", "Serveix per pesar", "una balança antiga de dos plats"),
    ("RELLOTGE", "Marca les hores", "un rellotge de paret amb números romans"),
    ("GRANOTA", "Salta i viu a la bassa", "una granota verda sobre un nenúfar"),
    ("FINESTRA", "S'obre per ventilar la casa", "una finestra oberta amb geranis al balcó"),
    ("SABATA", "Se'n porta una a cada peu", "una sabata vermella amb els cordons desfets"),
];

/// Built-in content source: a fixed catalog with seeded random selection.
///
/// This is the local stand-in for the generative provider; the
/// [`ContentSource`] trait is the seam where a remote client would plug in.
#[derive(Clone)]
pub(in crate::app) struct LocalContentSource {
    rng: Rc<RefCell<SmallRng>>,
}

impl LocalContentSource {
    pub(in crate::app) fn new(seed: u64) -> Self {
        Self {
            rng: Rc::new(RefCell::new(SmallRng::seed_from_u64(seed))),
        }
    }
}

impl ContentSource for LocalContentSource {
    async fn generate_word(&self, exclude: &[String]) -> Result<WordContent, ContentError> {
        let candidates: Vec<_> = CATALOG
            .iter()
            .filter(|(word, _, _)| !exclude.iter().any(|played| played == word))
            .collect();
        let pool = if candidates.is_empty() {
            log::warn!("word catalog exhausted, repeats are now possible");
            CATALOG.iter().collect()
        } else {
            candidates
        };
        let pick = self.rng.borrow_mut().random_range(0..pool.len());
        let (word, hint, image_description) = *pool[pick];
        Ok(WordContent {
            word: word.to_string(),
            hint: hint.to_string(),
            image_description: image_description.to_string(),
        })
    }

    async fn generate_hidden_image(
        &self,
        _word: &str,
        description: &str,
    ) -> Result<ImageRef, ContentError> {
        Ok(svg_data_uri(&format!(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 320 320'>\
             <rect width='320' height='320' fill='#ffe0b2'/>\
             <circle cx='160' cy='130' r='70' fill='#ff8a65'/>\
             <text x='160' y='260' font-size='16' fill='#4e342e' text-anchor='middle'>{description}</text>\
             </svg>"
        )))
    }

    fn result_artifact(&self, outcome: GameOutcome, word: &str) -> ImageRef {
        let (title, tint) = match outcome {
            GameOutcome::Won => ("Has guanyat!", "#2e7d32"),
            GameOutcome::Lost => ("Has perdut...", "#b71c1c"),
        };
        svg_data_uri(&format!(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 320 200'>\
             <rect width='320' height='200' rx='12' fill='{tint}'/>\
             <text x='160' y='90' font-size='28' fill='white' text-anchor='middle'>{title}</text>\
             <text x='160' y='140' font-size='22' fill='white' text-anchor='middle'>{word}</text>\
             </svg>"
        ))
    }
}

/// Percent-encodes just enough of the markup to survive inside a data URI.
fn svg_data_uri(svg: &str) -> ImageRef {
    let mut out = String::with_capacity(svg.len() + 32);
    out.push_str("data:image/svg+xml;charset=utf-8,");
    for ch in svg.chars() {
        match ch {
            '#' => out.push_str("%23"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(ch),
        }
    }
    out
}
