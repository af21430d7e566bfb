//! tokenwatch: terminal wallet and ERC-721 watchlist for Ethereum JSON-RPC nodes

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod state;
pub mod store;
pub mod ui;
