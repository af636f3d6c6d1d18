//! Node accounts, slash points and bond.

use crate::error::KeeperResult;
use crate::keeper::{Keeper, TypedIter};
use crate::keys;
use shared_types::{NodeAccount, NodeAddress, PubKey};
use tracing::debug;

impl Keeper {
    pub fn get_node_account(&self, addr: &NodeAddress) -> KeeperResult<Option<NodeAccount>> {
        self.get(&keys::key(keys::NODE_ACCOUNT, addr.as_str()))
    }

    pub fn set_node_account(&mut self, node: &NodeAccount) -> KeeperResult<()> {
        self.set(keys::key(keys::NODE_ACCOUNT, node.node_address.as_str()), node)
    }

    pub fn node_accounts(&self) -> KeeperResult<TypedIter<NodeAccount>> {
        self.iter(keys::NODE_ACCOUNT)
    }

    /// Active validators in address order.
    pub fn list_active_validators(&self) -> KeeperResult<Vec<NodeAccount>> {
        let mut active = Vec::new();
        for node in self.node_accounts()? {
            let node = node?;
            if node.is_active() {
                active.push(node);
            }
        }
        Ok(active)
    }

    pub fn node_account_by_pub_key(&self, pub_key: &PubKey) -> KeeperResult<Option<NodeAccount>> {
        for node in self.node_accounts()? {
            let node = node?;
            if &node.pub_key == pub_key {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    pub fn get_slash_points(&self, addr: &NodeAddress) -> KeeperResult<i64> {
        Ok(self
            .get_node_account(addr)?
            .map(|node| node.slash_points)
            .unwrap_or(0))
    }

    /// Adds `points` (may be negative). Unknown nodes are ignored.
    pub fn adjust_slash_points(&mut self, addr: &NodeAddress, points: i64) -> KeeperResult<()> {
        let Some(mut node) = self.get_node_account(addr)? else {
            debug!(node = %addr, points, "[qb-01] Slash points for unknown node ignored");
            return Ok(());
        };
        node.slash_points = node.slash_points.saturating_add(points);
        self.set_node_account(&node)
    }

    pub fn inc_slash_points(&mut self, addr: &NodeAddress, points: i64) -> KeeperResult<()> {
        self.adjust_slash_points(addr, points)
    }

    pub fn dec_slash_points(&mut self, addr: &NodeAddress, points: i64) -> KeeperResult<()> {
        self.adjust_slash_points(addr, points.saturating_neg())
    }

    /// Moves up to `amount` from the node's bond into the reserve and
    /// returns what was actually moved.
    pub fn send_bond_to_reserve(&mut self, addr: &NodeAddress, amount: u128) -> KeeperResult<u128> {
        let Some(mut node) = self.get_node_account(addr)? else {
            return Ok(0);
        };
        let moved = amount.min(node.bond);
        if moved == 0 {
            return Ok(0);
        }
        node.bond -= moved;
        self.set_node_account(&node)?;
        self.add_to_reserve(moved)?;
        Ok(moved)
    }
}
