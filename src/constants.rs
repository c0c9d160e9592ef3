//! Global constants for the scrambler and tunnel packet layout

// ============================================================================
// SCRAMBLER
// ============================================================================

/// Scrambler block size: one block is an 8x8 bit matrix
pub const BLOCK_LEN: usize = 8;

// ============================================================================
// PACKET LAYOUT
// ============================================================================

/// Packet header size on the wire
pub const HEADER_SIZE: usize = 8;

/// Default tunnel MTU
pub const DEFAULT_MTU: usize = 1500;

// ============================================================================
// BUFFER SIZES
// ============================================================================

/// Default network buffer size (8KB)
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Maximum buffer size (64KB)
pub const MAX_BUFFER_SIZE: usize = 65536;
