//! Greenshoe Sprint - IPO stabilization decision game

pub mod core;
pub mod market;
pub mod runtime;
pub mod session;
