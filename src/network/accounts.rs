use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::DeployError;

/// Standard dev mnemonic accounts (derived from "test test test test test test test test test test test junk")
pub fn dev_accounts() -> Vec<Address> {
    vec![
        address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
        address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
        address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
        address!("90F79bf6EB2c4f870365E785982E1f101E93b906"),
        address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65"),
        address!("9965507D1a55bcC2695C58ba16FB37d819B0A4dc"),
        address!("976EA74026E726554dB657fA54763abd0C3a0aa9"),
        address!("14dC79964da2C08b23698B3D3cc7Ca32193d9955"),
        address!("23618e81E3f5cdF7f54C3d65f7FBc0aBf5B21E8f"),
        address!("a0Ee7A142d267C1f36714E4a8F75612F20a79720"),
        address!("Bcd4042DE499D14e55001CcbB24a551F3b954096"),
        address!("71bE63f3384f5fb98995898A86B02Fb2426c5788"),
        address!("FABB0ac9d68B0B445fB7357272Ff202C5651694a"),
        address!("1CBd3b2770909D4e10f157cABC84C7264073C9Ec"),
        address!("dF3e18d64BC6A983f673Ab319CCaE4f1a57C7097"),
        address!("cd3B766CCDd6AE721141F452C550Ca635964ce71"),
        address!("2546BcD3c84621e976D8185a91A922aE77ECEc30"),
        address!("bDA5747bFD65F08deb54cb465eB87D40e51B197E"),
        address!("dD2FD4581271e230360230F9337D5c0430Bf44C0"),
        address!("8626f6940E2eb28930eFb4CeF49B2d1F2C9C1199"),
    ]
}

/// How a named account is configured: an index into the network's account
/// list, or a literal address (e.g. a multisig the run cannot sign for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    Index(usize),
    Address(Address),
}

/// Named accounts of one network, plus the remaining unnamed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedAccounts {
    named: BTreeMap<String, Address>,
    unnamed: Vec<Address>,
}

impl NamedAccounts {
    /// Resolve named references against the account list.
    ///
    /// Unnamed accounts are the listed accounts no name refers to, in list order.
    pub fn resolve(
        refs: &BTreeMap<String, AccountRef>,
        accounts: &[Address],
    ) -> Result<Self, DeployError> {
        let mut named = BTreeMap::new();
        for (name, account) in refs {
            let address = match *account {
                AccountRef::Index(index) => *accounts.get(index).ok_or(
                    DeployError::NotEnoughAccounts { needed: index + 1, available: accounts.len() },
                )?,
                AccountRef::Address(address) => address,
            };
            named.insert(name.clone(), address);
        }

        let taken: BTreeSet<Address> = named.values().copied().collect();
        let unnamed = accounts.iter().copied().filter(|a| !taken.contains(a)).collect();

        Ok(Self { named, unnamed })
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.named.get(name).copied()
    }

    pub fn named(&self) -> &BTreeMap<String, Address> {
        &self.named
    }

    pub fn unnamed(&self) -> &[Address] {
        &self.unnamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(entries: &[(&str, AccountRef)]) -> BTreeMap<String, AccountRef> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_dev_accounts_are_unique() {
        let accounts = dev_accounts();
        let unique: BTreeSet<Address> = accounts.iter().copied().collect();
        assert_eq!(accounts.len(), 20);
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_index_and_literal_refs() {
        let multisig = Address::repeat_byte(0x5a);
        let accounts = dev_accounts();
        let resolved = NamedAccounts::resolve(
            &refs(&[("deployer", AccountRef::Index(0)), ("landAdmin", AccountRef::Address(multisig))]),
            &accounts,
        )
        .unwrap();

        assert_eq!(resolved.get("deployer"), Some(accounts[0]));
        assert_eq!(resolved.get("landAdmin"), Some(multisig));
        assert_eq!(resolved.get("nobody"), None);
    }

    #[test]
    fn test_unnamed_excludes_named_in_order() {
        let accounts = dev_accounts();
        let resolved = NamedAccounts::resolve(
            &refs(&[("deployer", AccountRef::Index(0)), ("assetAdmin", AccountRef::Index(2))]),
            &accounts,
        )
        .unwrap();

        let unnamed = resolved.unnamed();
        assert_eq!(unnamed.len(), 18);
        assert_eq!(unnamed[0], accounts[1]);
        assert_eq!(unnamed[1], accounts[3]);
    }

    #[test]
    fn test_index_out_of_range() {
        let err = NamedAccounts::resolve(&refs(&[("deployer", AccountRef::Index(5))]), &dev_accounts()[..2])
            .unwrap_err();
        assert!(matches!(err, DeployError::NotEnoughAccounts { needed: 6, available: 2 }));
    }

    #[test]
    fn test_account_ref_json_forms() {
        let index: AccountRef = serde_json::from_str("3").unwrap();
        assert_eq!(index, AccountRef::Index(3));
        let literal: AccountRef =
            serde_json::from_str("\"0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a\"").unwrap();
        assert_eq!(literal, AccountRef::Address(Address::repeat_byte(0x5a)));
    }
}
