//! # Adaptive Connect Four
//!
//! A Connect Four engine with an opponent that searches with alpha-beta
//! minimax and adapts to the move sequences that have beaten it. Supports
//! single-player, local two-player and matchmade online play.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: board, sides, state machine, local sessions
//! - [`ai`]: Evaluator, alpha-beta search, move selector, agents
//! - [`learning`]: Loss-pattern store driving penalties and counter-moves
//! - [`storage`]: Key-value persistence for stats, learning and profile data
//! - [`online`]: Matchmaking, authoritative moves and change subscriptions
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod learning;
pub mod online;
pub mod storage;
