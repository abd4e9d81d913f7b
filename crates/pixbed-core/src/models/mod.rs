pub mod asset;
pub mod principal;
pub mod profile;

pub use asset::{Asset, AssetResponse, AssetRow, CounterKind, DeliveryMode, NewAsset, StoreStats};
pub use principal::{Principal, Role};
pub use profile::UploadProfile;
