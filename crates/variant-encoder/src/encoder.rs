//! The encoder itself: one opaque-bytes-to-hex fallback, one ABI-resolved
//! action-data decode, and one specialized rule for the system account's
//! `setabi.abi` field (expressed here as a registered rule rather than a
//! post-hoc mutation on an already-built document).

use std::time::{Duration, Instant};

use serde_json::Value;

use abi_cache::{decode_descriptor_bytes, encode_descriptor, AbiCache, AccountAbiLookup};
use shared_types::{AccountName, OpaquePayload};

use crate::binary_reader::BinaryReader;
use crate::field_codec::decode_struct;

/// Default deserializer time budget applied to one action-data decode,
/// configured at orchestrator initialization alongside the queue and
/// cache bounds. A malformed or adversarially deep ABI struct aborts the
/// decode and falls back to opaque bytes rather than stalling the single
/// consumer thread.
pub const DEFAULT_DESERIALIZER_TIME_BUDGET: Duration = Duration::from_millis(50);

pub struct VariantEncoder {
    system_account: AccountName,
    deserializer_time_budget: Duration,
}

impl VariantEncoder {
    pub fn new(system_account: impl Into<AccountName>) -> Self {
        Self::with_time_budget(system_account, DEFAULT_DESERIALIZER_TIME_BUDGET)
    }

    pub fn with_time_budget(system_account: impl Into<AccountName>, deserializer_time_budget: Duration) -> Self {
        Self {
            system_account: system_account.into(),
            deserializer_time_budget,
        }
    }

    /// The universal fallback: every opaque payload this encoder can't
    /// otherwise interpret is rendered as a lowercase hex string.
    pub fn encode_opaque(&self, payload: &OpaquePayload) -> Value {
        Value::from(hex::encode(&payload.0))
    }

    /// Resolves `account`'s ABI through the cache and decodes `data`
    /// field-by-field according to `action_name`'s registered struct.
    /// Any resolution or decode failure — including running past the
    /// deserializer time budget — falls back to the opaque hex form,
    /// never an error.
    pub fn encode_action_data(
        &self,
        cache: &mut AbiCache,
        now: u64,
        store: &impl AccountAbiLookup,
        account: &AccountName,
        action_name: &str,
        data: &OpaquePayload,
    ) -> Value {
        let Some(descriptor) = cache.resolve(account, now, store) else {
            return self.encode_opaque(data);
        };
        let Some(struct_def) = descriptor.find_action_struct(action_name) else {
            return self.encode_opaque(data);
        };
        let mut reader = BinaryReader::new(&data.0);
        let deadline = Instant::now() + self.deserializer_time_budget;
        match decode_struct(&descriptor, &struct_def.name, &mut reader, deadline) {
            Some(value) => value,
            None => self.encode_opaque(data),
        }
    }

    /// The one specialized unpack rule this encoder registers: the system
    /// account's own `setabi` carries its abi bytes in structured form in
    /// persisted documents rather than opaque bytes. Every other account's
    /// `setabi.abi` stays in opaque form here — the ABI cache decodes it
    /// separately, on demand, the next time that account's actions need
    /// resolving.
    pub fn encode_setabi_abi(&self, account: &AccountName, abi_bytes: &OpaquePayload) -> Value {
        if account != &self.system_account {
            return self.encode_opaque(abi_bytes);
        }
        match decode_descriptor_bytes(&abi_bytes.0) {
            Some(descriptor) => encode_descriptor(&descriptor),
            None => self.encode_opaque(abi_bytes),
        }
    }
}
