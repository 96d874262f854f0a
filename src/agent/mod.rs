#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The knowledge-base inference engine behind the Minesweeper agent.
//!
//! Data flows one way: a board reports `(cell, clue)` observations to
//! [`ai::Agent::add_observation`], which turns them into [`sentence::Sentence`]s
//! inside a [`knowledge::KnowledgeBase`] and drives
//! [`inference::InferenceEngine`] to a fixed point. [`selection::MoveSelector`]
//! then reads the resolved sets to pick the next move.

pub mod ai;
pub mod cell;
pub mod config;
pub mod error;
pub mod inference;
pub mod knowledge;
pub mod selection;
pub mod sentence;
