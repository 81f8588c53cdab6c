use serde::{Deserialize, Serialize};

/// On-disk form of the session signing keypair, both halves hex encoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}
