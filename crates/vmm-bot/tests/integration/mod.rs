//! Integration tests for vmm-bot.
//!
//! These tests verify the interaction between components:
//! - Stream reconnection and resubscription against a mock websocket server
//! - REST bootstrap, strategy bootstrap, and a full tick against a mock data node
//! - Wallet JSON-RPC submission against a mock wallet service

pub mod common;
