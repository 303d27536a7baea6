//! Chroma Drop front end: main menu with level select and high scores,
//! game-over results, and the terminal host that drives them.
//!
//! `domain` holds plain data and the collaborator traits, `scene` the
//! navigation controllers and their view trees, `sim` the host phase
//! machine and score persistence, `ui` the terminal edge.

pub mod config;
pub mod domain;
pub mod error;
pub mod scene;
pub mod sim;
pub mod ui;
