// src/models/mod.rs

pub mod attempt;
pub mod challenge;
pub mod chat;
pub mod class;
pub mod user;
