//! Grid primitives shared by the engine and the evaluators.
//!
//! - [`Position`] and [`Action`] - cells and the moves between them
//! - [`PlayerId`] and [`Role`] - agent identifiers and the protagonist marker
//! - [`GameMap`] - immutable wall grid and its text format
//! - [`MapSource`] and [`MapCache`] - the accepted map inputs and an explicit parse cache

pub use self::{game_map::*, map_source::*, player::*, position::*};

pub(crate) mod game_map;
pub(crate) mod map_source;
pub(crate) mod player;
pub(crate) mod position;
