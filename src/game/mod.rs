// src/game/mod.rs

pub mod attempts;
pub mod challenges;
pub mod chat;
pub mod evaluator;
