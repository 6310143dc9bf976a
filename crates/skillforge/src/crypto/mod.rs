//! Cryptographic primitives for SkillForge.
//!
//! This module provides:
//! - Ed25519 key generation for the ledger's sealing key
//! - Signing and verification of event records

pub mod keys;
pub mod signing;
