//! Squad Tactics - turn-based squad battle simulation core

pub mod battle;
pub mod core;
pub mod progression;
pub mod session;
