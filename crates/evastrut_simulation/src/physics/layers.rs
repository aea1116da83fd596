//! Collision Layers Constants
//!
//! ## Layers (битовая маска):
//! - Layer 1 (0b1 = 1): Parts (vessel parts, default layer host'а)
//! - Layer 2 (0b10 = 2): EVA actors
//!
//! Ray probes strut используют только `LAYER_PARTS`.

/// Layer 1: vessel parts
pub const LAYER_PARTS: u32 = 0b1;

/// Layer 2: EVA actors
pub const LAYER_EVA: u32 = 0b10;

/// Mask: оба ray probe (cursor и strut-origin)
pub const MASK_STRUT_PROBE: u32 = LAYER_PARTS;
