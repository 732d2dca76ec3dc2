//! Behaviour of the contract types the local chain can host.
//!
//! Only the surface the deploy steps and fixtures touch is modelled: constructor
//! parameters become stored fields, setters write one field behind an access
//! guard, and approval mappings are keyed by the caller.

use std::collections::BTreeMap;

/// Who may call a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Any sender
    Anyone,
    /// Only the address stored in the named field (`owner`, `admin`, ...)
    Field(&'static str),
}

/// State change performed by a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Store the first (address) argument in the field
    SetAddress(&'static str),
    /// `mapping(owner => mapping(operator => bool))` keyed by the caller:
    /// arguments are `(operator, approved)`
    SetApproval(&'static str),
}

/// A state-changing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: &'static str,
    pub guard: Guard,
    pub effect: Effect,
}

impl MethodSpec {
    const fn new(name: &'static str, guard: Guard, effect: Effect) -> Self {
        Self { name, guard, effect }
    }
}

/// Behaviour of one contract type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    /// Contract type name (artifact name)
    pub name: &'static str,
    /// Constructor parameter names, stored as fields in order
    pub constructor: &'static [&'static str],
    /// Field set to the deployer at creation (Ownable)
    pub owner_field: Option<&'static str>,
    /// Getter aliases: `(getter, field)`
    pub getters: &'static [(&'static str, &'static str)],
    /// State-changing methods
    pub methods: &'static [MethodSpec],
}

impl Blueprint {
    /// Look up a state-changing method.
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Resolve a getter alias to the field it returns.
    pub fn field_for<'a>(&self, getter: &'a str) -> &'a str {
        for (alias, field) in self.getters {
            if *alias == getter {
                return field;
            }
        }
        getter
    }

    /// Whether `field` is an address field this contract declares.
    pub fn declares(&self, field: &str) -> bool {
        self.constructor.iter().any(|p| *p == field)
            || self.owner_field == Some(field)
            || self
                .methods
                .iter()
                .any(|m| matches!(m.effect, Effect::SetAddress(f) if f == field))
    }

    /// Whether `field` is an approval mapping.
    pub fn is_mapping(&self, field: &str) -> bool {
        self.methods
            .iter()
            .any(|m| matches!(m.effect, Effect::SetApproval(mapping) if mapping == field))
    }
}

/// Storage key of an approval mapping entry.
pub fn approval_key(mapping: &str, owner: &str, operator: &str) -> String {
    format!("{mapping}:{}:{}", owner.to_lowercase(), operator.to_lowercase())
}

const OWNER: Guard = Guard::Field("owner");
const ADMIN: Guard = Guard::Field("admin");

const TRANSFER_OWNERSHIP: MethodSpec =
    MethodSpec::new("transferOwnership", OWNER, Effect::SetAddress("owner"));
const CHANGE_ADMIN: MethodSpec = MethodSpec::new("changeAdmin", ADMIN, Effect::SetAddress("admin"));
const SET_APPROVAL_FOR_ALL: MethodSpec = MethodSpec::new(
    "setApprovalForAll",
    Guard::Anyone,
    Effect::SetApproval("isApprovedForAll"),
);

/// L2 side of the land tunnel (FxBaseChildTunnel)
pub const POLYGON_LAND_TUNNEL: Blueprint = Blueprint {
    name: "PolygonLandTunnel",
    constructor: &[
        "fxChild",
        "childToken",
        "trustedForwarder",
        "maxGasLimit",
        "maxAllowedQuads",
        "limits",
    ],
    owner_field: Some("owner"),
    getters: &[],
    methods: &[
        MethodSpec::new("setFxRootTunnel", OWNER, Effect::SetAddress("fxRootTunnel")),
        TRANSFER_OWNERSHIP,
    ],
};

/// L1 side of the land tunnel (FxBaseRootTunnel)
pub const LAND_TUNNEL: Blueprint = Blueprint {
    name: "LandTunnel",
    constructor: &["checkpointManager", "fxRoot", "rootToken", "trustedForwarder"],
    owner_field: Some("owner"),
    getters: &[],
    methods: &[
        MethodSpec::new("setFxChildTunnel", OWNER, Effect::SetAddress("fxChildTunnel")),
        TRANSFER_OWNERSHIP,
    ],
};

/// L2 land token, trusts a single tunnel for minting
pub const POLYGON_LAND: Blueprint = Blueprint {
    name: "PolygonLandV2",
    constructor: &["trustedForwarder", "admin"],
    owner_field: None,
    getters: &[("getAdmin", "admin")],
    methods: &[
        MethodSpec::new("setPolygonLandTunnel", ADMIN, Effect::SetAddress("polygonLandTunnel")),
        CHANGE_ADMIN,
    ],
};

/// L1 land token
pub const LAND: Blueprint = Blueprint {
    name: "Land",
    constructor: &["metaTransactionContract", "admin"],
    owner_field: None,
    getters: &[("getAdmin", "admin")],
    methods: &[CHANGE_ADMIN],
};

/// L2 game token
pub const CHILD_GAME_TOKEN: Blueprint = Blueprint {
    name: "ChildGameToken",
    constructor: &["trustedForwarder", "admin", "asset1155", "asset721"],
    owner_field: None,
    getters: &[("getAdmin", "admin"), ("getMinter", "minter")],
    methods: &[
        MethodSpec::new("changeMinter", ADMIN, Effect::SetAddress("minter")),
        CHANGE_ADMIN,
    ],
};

pub const MOCK_ERC1155_ASSET: Blueprint = Blueprint {
    name: "MockERC1155Asset",
    constructor: &[],
    owner_field: Some("owner"),
    getters: &[],
    methods: &[SET_APPROVAL_FOR_ALL, TRANSFER_OWNERSHIP],
};

pub const MOCK_ERC721_ASSET: Blueprint = Blueprint {
    name: "MockERC721Asset",
    constructor: &[],
    owner_field: Some("owner"),
    getters: &[],
    methods: &[SET_APPROVAL_FOR_ALL, TRANSFER_OWNERSHIP],
};

pub const TEST_META_TX_FORWARDER: Blueprint = Blueprint {
    name: "TestMetaTxForwarder",
    constructor: &[],
    owner_field: None,
    getters: &[],
    methods: &[],
};

pub const FAKE_FX_CHILD: Blueprint = Blueprint {
    name: "FakeFxChild",
    constructor: &[],
    owner_field: None,
    getters: &[],
    methods: &[],
};

pub const FAKE_FX_ROOT: Blueprint = Blueprint {
    name: "FakeFxRoot",
    constructor: &[],
    owner_field: None,
    getters: &[],
    methods: &[],
};

pub const FAKE_CHECKPOINT_MANAGER: Blueprint = Blueprint {
    name: "FakeCheckpointManager",
    constructor: &[],
    owner_field: None,
    getters: &[],
    methods: &[],
};

/// Contract types known to a local chain, by name.
#[derive(Debug, Clone)]
pub struct ContractCatalog {
    blueprints: BTreeMap<&'static str, Blueprint>,
}

impl ContractCatalog {
    /// Empty catalog
    pub fn empty() -> Self {
        Self { blueprints: BTreeMap::new() }
    }

    /// Catalog with every contract type the deploy steps and fixtures use
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for blueprint in [
            POLYGON_LAND_TUNNEL,
            LAND_TUNNEL,
            POLYGON_LAND,
            LAND,
            CHILD_GAME_TOKEN,
            MOCK_ERC1155_ASSET,
            MOCK_ERC721_ASSET,
            TEST_META_TX_FORWARDER,
            FAKE_FX_CHILD,
            FAKE_FX_ROOT,
            FAKE_CHECKPOINT_MANAGER,
        ] {
            catalog.register(blueprint);
        }
        catalog
    }

    /// Add or replace a contract type
    pub fn register(&mut self, blueprint: Blueprint) {
        self.blueprints.insert(blueprint.name, blueprint);
    }

    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.get(name)
    }
}

impl Default for ContractCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_contains_tunnels() {
        let catalog = ContractCatalog::builtin();
        assert!(catalog.get("PolygonLandTunnel").is_some());
        assert!(catalog.get("LandTunnel").is_some());
        assert!(catalog.get("Unknown").is_none());
    }

    #[test]
    fn test_getter_alias_resolution() {
        assert_eq!(POLYGON_LAND.field_for("getAdmin"), "admin");
        assert_eq!(POLYGON_LAND.field_for("polygonLandTunnel"), "polygonLandTunnel");
    }

    #[test]
    fn test_declared_fields() {
        assert!(POLYGON_LAND_TUNNEL.declares("fxRootTunnel"));
        assert!(POLYGON_LAND_TUNNEL.declares("owner"));
        assert!(POLYGON_LAND_TUNNEL.declares("fxChild"));
        assert!(!POLYGON_LAND_TUNNEL.declares("fxChildTunnel"));
        assert!(MOCK_ERC721_ASSET.is_mapping("isApprovedForAll"));
        assert!(!MOCK_ERC721_ASSET.declares("isApprovedForAll"));
    }

    #[test]
    fn test_setter_guards() {
        let setter = LAND_TUNNEL.method("setFxChildTunnel").unwrap();
        assert_eq!(setter.guard, Guard::Field("owner"));
        let setter = POLYGON_LAND.method("setPolygonLandTunnel").unwrap();
        assert_eq!(setter.guard, Guard::Field("admin"));
    }

    #[test]
    fn test_approval_key_is_case_insensitive() {
        assert_eq!(
            approval_key("isApprovedForAll", "0xABC", "0xDef"),
            approval_key("isApprovedForAll", "0xabc", "0xdef")
        );
    }
}
