//! Test fixtures and constants.

use serde_json::{json, Value};

/// Token every fake Vault accepts unless told otherwise.
pub const ROOT_TOKEN: &str = "root-token";

/// Timestamp older than anything a test writes.
pub const OLD_TIME: &str = "2001-01-01T00:00:00.000000Z";

/// Timestamp of the source secrets in the reference scenario.
pub const SOURCE_TIME: &str = "2022-04-08T15:12:52.839568Z";

/// Timestamp newer than anything a test writes.
pub const FUTURE_TIME: &str = "2999-01-01T00:00:00.000000Z";

/// Store section for a Vault at `address` authenticated with the root token.
pub fn store(address: &str) -> Value {
    json!({
        "address": address,
        "login": { "token": ROOT_TOKEN }
    })
}

/// Job copying `source:kv/where#k1` into `target:kv/where2#tkey`.
pub fn reference_job(target: &str, source: &str) -> Value {
    json!({
        "target": store(target),
        "sources": { "s1": store(source) },
        "copies": [{
            "path": "where2",
            "values": {
                "tkey": { "source": "s1", "path": "where", "key": "k1" }
            }
        }]
    })
}

/// Job copying the whole secret `kv/where` from source `s1`.
pub fn whole_secret_job(target: &str, source: &str) -> Value {
    json!({
        "target": store(target),
        "sources": { "s1": store(source) },
        "copies": [{ "path": "where", "secret": { "source": "s1" } }]
    })
}
