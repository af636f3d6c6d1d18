//! Matching delivered outbounds against the queue.

use shared_types::{Coin, Coins, ObservedTx, TxId, TxOutItem};

/// Whether `tx`, observed leaving a vault and referencing `in_hash`, may pay
/// `item`. Amounts are not compared here; overspend is accounted for by
/// [`extra_funds`].
pub fn is_delivery_of(item: &TxOutItem, tx: &ObservedTx, in_hash: &TxId) -> bool {
    item.is_pending()
        && &item.in_hash == in_hash
        && item.vault_pub_key.as_ref() == Some(&tx.observed_pub_key)
        && item.chain == tx.tx.chain
        && item.to_address == tx.tx.to_address
        && item.memo.eq_ignore_ascii_case(&tx.tx.memo)
        && tx.tx.coins.has(&item.coin.asset)
}

/// Coins spent beyond what the matched items allowed, per asset.
pub fn extra_funds(spent: &Coins, allowed: &Coins) -> Coins {
    let mut extra = Coins::new();
    for coin in spent.iter() {
        let over = coin.amount.saturating_sub(allowed.get(&coin.asset));
        if over > 0 {
            extra.add(&Coin::new(coin.asset.clone(), over));
        }
    }
    extra
}
