//! tradesim: day-by-day stock trading simulator over historical price data.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], and the command-line driver in
//! [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
