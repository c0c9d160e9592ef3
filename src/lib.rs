//! Skytale packet obfuscation library
//!
//! Bit-scrambles tunnel packets before transmit and restores them on
//! receive, to defeat trivial byte-pattern fingerprinting of tunnel
//! traffic. This is a transposition cipher in the spirit of the Spartan
//! skytale, not encryption: there is no key and no resistance to anyone
//! who actually looks at the traffic.

pub mod config;
pub mod constants;
pub mod logging;
pub mod obfuscation;
pub mod packet;

pub use obfuscation::{Obfuscator, SkytaleScrambler};
