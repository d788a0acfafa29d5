//! Domain layer for the Chat domain

pub mod entities;
pub mod instructions;
pub mod protocol;
pub mod state;
