pub mod hash;
pub mod keypair;
pub mod multisig;
pub mod scheme;
pub mod signature_utils;

pub use self::keypair::{
    Ed25519KeyPair, KeyMaterial, Secp256k1KeyPair, Secp256r1KeyPair, SuiPublicKey,
};
pub use self::multisig::{MultiSigPolicy, PublicKeyWeightPair};
pub use self::scheme::SignatureScheme;
pub use self::signature_utils::SerializedSignature;
