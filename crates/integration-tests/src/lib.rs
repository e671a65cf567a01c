//! # Integration Tests Crate
//!
//! Verifies that the subsystems work together: transactions admitted to
//! the pool, extracted in fee order, executed against the trie-backed
//! account state.
//!
//! ## Structure
//!
//! ```text
//! integration-tests/
//! ├── src/
//! │   ├── lib.rs      # This file
//! │   ├── harness.rs  # In-memory chain wiring (state + vm + pool)
//! │   └── flows.rs    # End-to-end scenarios
//! ```
//!
//! ## Flows covered
//!
//! 1. **Faucet → pool → engine**: mint, submit, extract, execute, with
//!    exact balance and nonce accounting
//! 2. **Fee ordering**: highest gas price wins across senders
//! 3. **Gap filling**: out-of-order nonces become executable once the gap
//!    closes
//! 4. **Rejection**: insufficient balance leaves the state root untouched

pub mod harness;

#[cfg(test)]
mod flows;
