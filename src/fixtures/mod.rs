//! Test fixtures for the game token.
//!
//! Every fixture builds its own local network, so state never leaks between
//! tests.

pub mod game;
pub mod handle;

pub use game::{GameFixtures, User};
pub use handle::ContractHandle;
