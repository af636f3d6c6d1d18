//! Vaults.

use crate::error::{KeeperError, KeeperResult};
use crate::keeper::{Keeper, TypedIter};
use crate::keys;
use shared_types::{Coins, PubKey, Vault, VaultStatus};

impl Keeper {
    pub fn get_vault(&self, pub_key: &PubKey) -> KeeperResult<Option<Vault>> {
        self.get(&keys::key(keys::VAULT, pub_key.as_str()))
    }

    /// Like [`Keeper::get_vault`] but a missing vault is an error.
    pub fn require_vault(&self, pub_key: &PubKey) -> KeeperResult<Vault> {
        self.get_vault(pub_key)?
            .ok_or_else(|| KeeperError::not_found("vault", pub_key))
    }

    pub fn vault_exists(&self, pub_key: &PubKey) -> KeeperResult<bool> {
        self.has(&keys::key(keys::VAULT, pub_key.as_str()))
    }

    pub fn set_vault(&mut self, vault: &Vault) -> KeeperResult<()> {
        self.set(keys::key(keys::VAULT, vault.pub_key.as_str()), vault)
    }

    pub fn vaults(&self) -> KeeperResult<TypedIter<Vault>> {
        self.iter(keys::VAULT)
    }

    pub fn vaults_by_status(&self, status: VaultStatus) -> KeeperResult<Vec<Vault>> {
        let mut out = Vec::new();
        for vault in self.vaults()? {
            let vault = vault?;
            if vault.status == status {
                out.push(vault);
            }
        }
        Ok(out)
    }

    pub fn add_vault_funds(&mut self, pub_key: &PubKey, coins: &Coins) -> KeeperResult<Vault> {
        let mut vault = self.require_vault(pub_key)?;
        vault.add_funds(coins);
        self.set_vault(&vault)?;
        Ok(vault)
    }

    pub fn sub_vault_funds(&mut self, pub_key: &PubKey, coins: &Coins) -> KeeperResult<Vault> {
        let mut vault = self.require_vault(pub_key)?;
        vault.sub_funds(coins);
        self.set_vault(&vault)?;
        Ok(vault)
    }
}
