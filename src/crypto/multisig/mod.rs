//! Sui 加权多签
//!
//! ## 模块结构
//! - `policy` - 加权公钥集合、阈值与多签地址推导
//! - `signing` - 部分签名聚合与解码
//! - `wire` - 网络定义的 BCS 编码

pub mod policy;
pub mod signing;
pub mod wire;

pub use policy::{derive_address, MultiSigPolicy, PublicKeyWeightPair, SignerSet, MAX_SIGNERS};
pub use signing::{
    decode_multisig, decode_multisig_base64, decode_with_threshold, parse_partial_signature,
    DecodedSignature,
};
