//! Per-stream document construction. Each builder takes an event plus
//! its already-encoded (via the variant encoder) fields and
//! produces a [`Document`] ready for the store; none of these functions
//! perform I/O themselves — that's the orchestrator's job, so these stay
//! trivially unit-testable.

use serde_json::{json, Value};

use shared_types::{
    ActionTrace, BlockStateEvent, Document, DocumentKind, IrreversibleBlockEvent, TransactionMetadataEvent,
    TransactionTraceEvent,
};

/// `block_states` document for an accepted block.
pub fn build_block_states_document(event: &BlockStateEvent, block_header_state: Value, now: u64) -> Document {
    Document::with_id(
        DocumentKind::BlockStates,
        event.block_id.to_hex(),
        json!({
            "block_num": event.block_num,
            "block_id": event.block_id.to_hex(),
            "validated": event.validated,
            "in_current_chain": event.in_current_chain,
            "block_header_state": block_header_state,
        }),
    )
    .stamp_created_at(now)
}

/// `blocks` document for an accepted block. `irreversible` always starts
/// `false` — finality is a later, separate write.
pub fn build_blocks_document(event: &BlockStateEvent, block: Value, now: u64) -> Document {
    Document::with_id(
        DocumentKind::Blocks,
        event.block_id.to_hex(),
        json!({
            "block_num": event.block_num,
            "block_id": event.block_id.to_hex(),
            "irreversible": false,
            "block": block,
        }),
    )
    .stamp_created_at(now)
}

/// The re-indexed `block_states` document written when a block becomes
/// irreversible. Same shape as the accepted-block write; re-indexing under
/// the same id (the block id) is what makes this the "finalized update"
/// rather than a duplicate.
pub fn build_finalized_block_states_document(
    event: &IrreversibleBlockEvent,
    block_header_state: Value,
    now: u64,
) -> Document {
    build_block_states_document(event, block_header_state, now)
}

/// The query/script pair for `update_by_query` that flips `irreversible`
/// to `true` on the `blocks` document matching `block_id`.
pub fn irreversible_update_by_query(block_id_hex: &str) -> (Value, Value) {
    let query = json!({ "term": { "block_id": block_id_hex } });
    let script = json!({ "source": "ctx._source.irreversible = true", "lang": "painless" });
    (query, script)
}

/// `transactions` document for an accepted transaction.
pub fn build_transaction_document(event: &TransactionMetadataEvent, trx: Value, now: u64) -> Document {
    Document::with_id(
        DocumentKind::Transactions,
        event.trx_id.clone(),
        json!({
            "trx_id": event.trx_id,
            "trx": trx,
        }),
    )
    .stamp_created_at(now)
}

/// `transaction_traces` document for an applied transaction trace.
pub fn build_transaction_trace_document(
    event: &TransactionTraceEvent,
    action_traces: Value,
    receipts: Value,
    now: u64,
) -> Document {
    Document::with_id(
        DocumentKind::TransactionTraces,
        event.trx_id.clone(),
        json!({
            "trx_id": event.trx_id,
            "status": if event.success { "executed" } else { "failed" },
            "action_traces": action_traces,
            "receipts": receipts,
        }),
    )
    .stamp_created_at(now)
}

/// One `actions` document per action trace within a transaction trace.
pub fn build_action_document(trx_id: &str, index: usize, trace: &ActionTrace, data: Value, now: u64) -> Document {
    Document::new(
        DocumentKind::Actions,
        json!({
            "trx_id": trx_id,
            "action_ordinal": index,
            "account": trace.account.as_str(),
            "action_name": trace.action_name,
            "data": data,
        }),
    )
    .stamp_created_at(now)
}

/// The `accounts` document patched in when an action trace carries a new
/// ABI (`setabi`). Indexed with the account name as the explicit id so a
/// later `setabi` for the same account overwrites rather than duplicates.
pub fn build_account_abi_document(account: &str, abi: Value, now: u64) -> Document {
    Document::with_id(
        DocumentKind::Accounts,
        account.to_string(),
        json!({
            "name": account,
            "abi": abi,
        }),
    )
    .stamp_created_at(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{BlockId, BlockPayload, OpaquePayload};

    fn sample_event() -> BlockStateEvent {
        BlockStateEvent {
            block_num: 42,
            block_id: BlockId(vec![0xAB, 0xCD]),
            validated: true,
            in_current_chain: true,
            block_header_state: OpaquePayload(vec![1, 2, 3]),
            block: BlockPayload {
                raw: OpaquePayload(vec![4, 5]),
                transaction_ids: vec!["t1".to_string()],
            },
        }
    }

    #[test]
    fn block_states_document_carries_the_expected_fields() {
        let event = sample_event();
        let doc = build_block_states_document(&event, json!("deadbeef"), 1_000);
        assert_eq!(doc.id.as_deref(), Some("abcd"));
        assert_eq!(doc.body["block_num"], 42);
        assert_eq!(doc.body["validated"], true);
        assert_eq!(doc.body["createAt"], 1_000);
    }

    #[test]
    fn blocks_document_starts_non_irreversible() {
        let event = sample_event();
        let doc = build_blocks_document(&event, json!({"raw": "0405"}), 1_000);
        assert_eq!(doc.body["irreversible"], false);
    }

    #[test]
    fn irreversible_update_by_query_targets_the_block_id() {
        let (query, script) = irreversible_update_by_query("abcd");
        assert_eq!(query["term"]["block_id"], "abcd");
        assert!(script["source"].as_str().unwrap().contains("irreversible = true"));
    }

    #[test]
    fn account_abi_document_uses_the_account_name_as_id() {
        let doc = build_account_abi_document("eosio", json!({"version": "v1"}), 5);
        assert_eq!(doc.id.as_deref(), Some("eosio"));
        assert_eq!(doc.body["name"], "eosio");
    }
}
