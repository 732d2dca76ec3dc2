/// Named account that deploys and owns the tunnels
pub const DEPLOYER: &str = "deployer";
/// Named account administering the land tokens
pub const LAND_ADMIN: &str = "landAdmin";
/// Named account administering the game token
pub const GAME_TOKEN_ADMIN: &str = "gameTokenAdmin";
/// Named account owning the mock assets
pub const ASSET_ADMIN: &str = "assetAdmin";

/// Companion tag of the root (L1) network
pub const L1: &str = "l1";
/// Companion tag of the child (L2) network
pub const L2: &str = "l2";
/// Network tag marking test deployments
pub const TESTNET_TAG: &str = "testnet";

pub const POLYGON_LAND_TUNNEL: &str = "PolygonLandTunnel";
pub const LAND_TUNNEL: &str = "LandTunnel";
pub const POLYGON_LAND: &str = "PolygonLand";
pub const LAND: &str = "Land";
pub const FXCHILD: &str = "FXCHILD";
pub const FXROOT: &str = "FXROOT";
pub const CHECKPOINT_MANAGER: &str = "CHECKPOINTMANAGER";
pub const TRUSTED_FORWARDER: &str = "TRUSTED_FORWARDER";
pub const CHILD_GAME_TOKEN: &str = "ChildGameToken";
pub const MOCK_ERC1155_ASSET: &str = "MockERC1155Asset";
pub const MOCK_ERC721_ASSET: &str = "MockERC721Asset";

/// Gas limit the child tunnel allows per message
pub const MAX_GAS_LIMIT: u64 = 500;
/// Maximum quads in one tunnel batch
pub const MAX_ALLOWED_QUADS: u64 = 144;
/// Gas limits per quad size (1x1, 3x3, 6x6, 12x12, 24x24)
pub const QUAD_LIMITS: [u64; 5] = [5, 10, 20, 90, 340];
