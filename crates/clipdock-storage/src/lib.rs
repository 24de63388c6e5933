pub mod keys;
pub mod memory;
pub mod placer;
pub mod s3;
pub mod traits;

pub use keys::generate_asset_key;
pub use memory::MemoryRemote;
pub use placer::{AssetPlacer, StoredAsset};
pub use s3::S3Remote;
pub use traits::{PlacementError, PlacementResult, RemoteStore};
