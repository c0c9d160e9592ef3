// Obfuscation module for tunnel traffic
//
// Provides packet bit-scrambling to defeat trivial byte-pattern
// fingerprinting of tunnel traffic. Not encryption: the traffic stays
// recognizable to anyone who looks closely.

pub mod skytale;

pub use skytale::SkytaleScrambler;

use crate::packet::PacketHeader;

/// Pluggable scramble/descramble strategy applied to packet payloads.
///
/// Implementations mutate the buffer in place and never change its length.
/// The packet header is threaded through as opaque per-packet context,
/// reserved for future per-packet parameterization (e.g. a derived
/// permutation key); current implementations ignore it.
pub trait Obfuscator: Send + Sync {
    /// Obfuscate a payload before transmit.
    fn scramble(&self, data: &mut [u8], header: &PacketHeader);

    /// Restore a payload after receive. Exact inverse of `scramble`.
    fn descramble(&self, data: &mut [u8], header: &PacketHeader);
}
