//! Client core for the power-plant strike game, a battleship variant where each player
//! places power plants instead of ships and then takes turns striking the grids of the
//! other players.
//!
//! The server owns the truth about every game. This crate provides the pieces a client
//! needs around that truth:
//!
//! * [`board`]: coordinates, the in-memory [`BoardModel`][board::BoardModel] and the
//!   placement validator.
//! * [`plants`]: the table of plant types, their footprints and capacities.
//! * [`render`]: the reconciliation engine that turns board models into minimal per-cell
//!   mutations for whatever surface displays them.
//! * [`game`]: the polling state machine, its scheduler seam and the strike controller.
//! * [`api`]: the HTTP surface of the server.
//! * [`view`]: the per-game-view context object that wires all of the above together.

pub mod api;
pub mod board;
pub mod game;
pub mod plants;
pub mod render;
pub mod view;
