//! Core five-card draw logic. Keep this crate free of IO and platform concerns;
//! the deck service and the backing store come in through traits.

pub mod cards;
pub mod controller;
pub mod deck;
pub mod error;
pub mod hand;
pub mod persistence;
pub mod remote;
pub mod rng;
pub mod selection;
pub mod session;
pub mod time;
pub mod wire;

pub use cards::*;
pub use controller::*;
pub use deck::*;
pub use error::*;
pub use hand::*;
pub use persistence::*;
pub use remote::*;
pub use rng::*;
pub use selection::*;
pub use session::*;
pub use time::*;
