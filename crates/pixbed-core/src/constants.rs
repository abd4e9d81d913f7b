//! Application-wide constants.

use uuid::Uuid;

/// Principal that owns unauthenticated (guest) uploads.
/// Deterministic UUID provisioned at compile time so no lazy account creation
/// (and no creation race) is ever needed. Stable across deployments.
/// Format: 7a1d0c4e-9f2b-5a38-8c6d-4e0f1a2b3c4d
pub const GUEST_PRINCIPAL_ID: Uuid = Uuid::from_u128(0x7a1d0c4e_9f2b_5a38_8c6d_4e0f1a2b3c4d);

/// Upper bound for requested transform width/height. Requests above this are
/// rejected before any decoding work happens.
pub const MAX_TRANSFORM_DIMENSION: u32 = 8192;

/// Default re-encode quality when the client does not supply one.
pub const DEFAULT_QUALITY: u8 = 85;
