pub use content::*;
pub use engine::*;
pub use error::*;
pub use reveal::*;
pub use session::*;
pub use types::*;
pub use word::*;

mod content;
mod engine;
mod error;
mod reveal;
mod session;
mod types;
mod word;
