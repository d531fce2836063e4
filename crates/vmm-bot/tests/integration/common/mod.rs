//! Shared mock servers. Each test binary uses a subset.
#![allow(dead_code)]

pub mod mock_datanode;
pub mod mock_wallet;
pub mod mock_ws;
