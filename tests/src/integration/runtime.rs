//! # Runtime Integration
//!
//! The node runtime driven by real block sources: blocks in memory, and
//! JSON lines read through the same path the binary uses.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use node_runtime::{
        Block, BlockExecutor, BridgeMsg, JsonLinesBlockSource, NodeRuntime, RuntimeError,
        VecBlockSource,
    };
    use qb_01_keeper::MIMIR_UNSET;
    use shared_types::{Address, PubKey, TxId, VaultStatus, ONE};
    use std::io::Cursor;

    /// Runtime over the fixture network with one funded vault.
    fn runtime() -> NodeRuntime {
        let mut net = Network::new();
        net.add_vault("vault", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);
        let Network {
            keeper, managers, ..
        } = net;
        NodeRuntime::with_executor(BlockExecutor::new(keeper, managers), 2)
    }

    fn deposit_block(height: u64) -> Block {
        let tx = inbound("AA20", "vault", 2 * ONE, "SEND:bc1friend");
        let msgs = ["a", "b", "c"]
            .iter()
            .map(|s| BridgeMsg::ObservedTxIn {
                txs: vec![tx.clone()],
                signer: addr(s),
            })
            .collect();
        Block::new(height, msgs)
    }

    fn json_lines(blocks: &[Block]) -> Cursor<Vec<u8>> {
        let mut out = String::from("# generated blocks\n");
        for block in blocks {
            out.push_str(&serde_json::to_string(block).unwrap());
            out.push('\n');
        }
        Cursor::new(out.into_bytes())
    }

    #[tokio::test]
    async fn test_runtime_applies_blocks_in_order() {
        let runtime = runtime();
        let blocks = vec![
            Block::new(1, vec![BridgeMsg::mimir("K", 5, addr("a"))]),
            Block::new(2, vec![BridgeMsg::mimir("K", 5, addr("b"))]),
            Block::new(3, Vec::new()),
        ];

        let applied = runtime.run(VecBlockSource::new(blocks)).await.unwrap();
        assert_eq!(applied, 3);
        assert_eq!(runtime.executor().read().mimir("K").unwrap(), 5);
    }

    #[tokio::test]
    async fn test_runtime_reads_json_lines() {
        let runtime = runtime();
        let source = JsonLinesBlockSource::from_reader(json_lines(&[deposit_block(4)]));

        assert_eq!(runtime.run(source).await.unwrap(), 1);

        let executor = runtime.executor();
        let bucket = executor.read().outbound_bucket(4).unwrap();
        assert_eq!(bucket.tx_array.len(), 1);
        let item = &bucket.tx_array[0];
        assert_eq!(item.to_address, Address::new("bc1friend"));
        assert_eq!(item.in_hash, TxId::new("AA20"));
        assert_eq!(item.vault_pub_key, Some(PubKey::new("vault")));
    }

    #[tokio::test]
    async fn test_bad_line_stops_after_good_blocks() {
        let runtime = runtime();
        let mut input = json_lines(&[Block::new(
            1,
            vec![
                BridgeMsg::mimir("K", 9, addr("a")),
                BridgeMsg::mimir("K", 9, addr("b")),
            ],
        )])
        .into_inner();
        input.extend_from_slice(b"{\"height\":\n");
        let source = JsonLinesBlockSource::from_reader(Cursor::new(input));

        let err = runtime.run(source).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Source(_)), "{}", err);
        assert_eq!(runtime.executor().read().mimir("K").unwrap(), 9);
    }

    #[tokio::test]
    async fn test_out_of_order_block_is_fatal() {
        let runtime = runtime();
        let blocks = vec![
            Block::new(5, vec![BridgeMsg::mimir("K", 1, addr("a"))]),
            Block::new(4, vec![BridgeMsg::mimir("K", 1, addr("b"))]),
        ];

        let err = runtime.run(VecBlockSource::new(blocks)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::BlockOutOfOrder { last: 5, got: 4 }));
        assert_eq!(runtime.executor().read().mimir("K").unwrap(), MIMIR_UNSET);
    }

    #[tokio::test]
    async fn test_shutdown_before_run_applies_nothing() {
        let runtime = runtime();
        runtime.shutdown();

        let applied = runtime
            .run(VecBlockSource::new(vec![Block::new(1, Vec::new())]))
            .await
            .unwrap();
        assert_eq!(applied, 0);
    }
}
