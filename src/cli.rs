use crate::account::{generate_mnemonic, AccountManager, DerivePathParams};
use crate::blockchain::coin_selection::CoinSelector;
use crate::blockchain::types::SUI_COIN_TYPE;
use crate::core::address::SuiAddress;
use crate::core::config::KitConfig;
use crate::core::errors::{KitError, PolicyError};
use crate::crypto::keypair::SuiPublicKey;
use crate::crypto::multisig::{decode_with_threshold, MultiSigPolicy};
use crate::crypto::scheme::{SignatureScheme, ED25519_PUBLIC_KEY_LENGTH};
use crate::crypto::signature_utils::SerializedSignature;
use crate::network::endpoint_pool::EndpointPool;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Args, Parser, Subcommand};

/// Sui toolkit CLI (library-facing definitions)
#[derive(Debug, Parser)]
#[command(
    name = "sui-kit",
    about = "Sui multisig and account toolkit",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Derive an address from a mnemonic or secret key
    Address {
        #[arg(long)]
        mnemonic: Option<String>,
        /// Hex or base64 ed25519 secret key
        #[arg(long)]
        secret_key: Option<String>,
        #[arg(long, default_value_t = 0)]
        account: u32,
        #[arg(long)]
        external: bool,
        #[arg(long, default_value_t = 0)]
        index: u32,
    },
    /// Derive a multisig address
    MultisigAddress(PolicyArgs),
    /// Combine partial signatures into one multisig
    Combine {
        #[command(flatten)]
        policy: PolicyArgs,
        /// Base64 `flag || signature || public key`, repeatable
        #[arg(long = "sig", required = true)]
        sigs: Vec<String>,
    },
    /// Decode a base64 multisig
    Decode { combined: String },
    /// Select coins covering an amount (needs a fullnode)
    SelectCoins {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = SUI_COIN_TYPE)]
        coin_type: String,
    },
    GenerateMnemonic {
        #[arg(long, default_value_t = 24)]
        words: usize,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// Base64 public key: 32 raw ed25519 bytes or `flag || key`, repeatable
    #[arg(long = "pubkey", required = true)]
    pub pubkeys: Vec<String>,
    /// Weight of the public key at the same position, repeatable
    #[arg(long = "weight", required = true)]
    pub weights: Vec<u8>,
    #[arg(long)]
    pub threshold: u16,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> Result<MultiSigPolicy, KitError> {
        let keys = self
            .pubkeys
            .iter()
            .enumerate()
            .map(|(index, encoded)| parse_public_key(index, encoded))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiSigPolicy::from_public_keys(keys, &self.weights, self.threshold)?)
    }
}

fn parse_public_key(index: usize, encoded: &str) -> Result<SuiPublicKey, PolicyError> {
    let invalid = |reason: String| PolicyError::InvalidPublicKey { index, reason };
    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| invalid(e.to_string()))?;
    let key = if bytes.len() == ED25519_PUBLIC_KEY_LENGTH {
        SuiPublicKey::new(SignatureScheme::Ed25519, &bytes)
    } else {
        SuiPublicKey::from_sui_bytes(&bytes)
    };
    key.map_err(|e| invalid(e.to_string()))
}

/// Run one command and return what should be printed.
pub async fn run(command: Commands, config: &KitConfig) -> Result<String, KitError> {
    match command {
        Commands::Address { mnemonic, secret_key, account, external, index } => {
            if mnemonic.is_none() && secret_key.is_none() {
                return Err(KitError::InvalidInput("--mnemonic or --secret-key is required".into()));
            }
            let manager = AccountManager::new(mnemonic.as_deref(), secret_key.as_deref())?;
            let params = DerivePathParams {
                account_index: account,
                is_external: external,
                address_index: index,
            };
            Ok(manager.get_address(Some(&params))?.to_string())
        }
        Commands::MultisigAddress(policy) => Ok(policy.to_policy()?.address().to_string()),
        Commands::Combine { policy, sigs } => {
            let policy = policy.to_policy()?;
            Ok(policy.combine_base64(&sigs)?)
        }
        Commands::Decode { combined } => {
            let bytes = SerializedSignature::from_base64(&combined)?;
            let (signatures, threshold) = decode_with_threshold(bytes.as_bytes())?;
            let mut lines = vec![format!("threshold: {}", threshold)];
            for sig in signatures {
                lines.push(format!(
                    "[{}] {} weight={} pubkey={}",
                    sig.signer_index,
                    sig.scheme,
                    sig.weight,
                    sig.public_key.to_sui_public_key()
                ));
            }
            Ok(lines.join("\n"))
        }
        Commands::SelectCoins { owner, amount, coin_type } => {
            let owner: SuiAddress = owner.parse()?;
            let pool = EndpointPool::from_config(config)?;
            let selection = CoinSelector::select_coins(&pool, &owner, amount, &coin_type).await?;
            let mut lines: Vec<String> = selection
                .coins
                .iter()
                .map(|c| {
                    format!("{} balance={} version={}", c.coin_object_id, c.balance, c.version)
                })
                .collect();
            lines.push(format!("total: {}", selection.total_balance));
            Ok(lines.join("\n"))
        }
        Commands::GenerateMnemonic { words } => Ok(generate_mnemonic(words)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combine_args() {
        let cli = Cli::try_parse_from([
            "sui-kit",
            "combine",
            "--pubkey",
            "AAAA",
            "--weight",
            "1",
            "--threshold",
            "1",
            "--sig",
            "BBBB",
        ])
        .unwrap();
        match cli.command {
            Commands::Combine { policy, sigs } => {
                assert_eq!(policy.weights, vec![1]);
                assert_eq!(sigs, vec!["BBBB".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_public_key_forms() {
        let raw = STANDARD.encode([7u8; 32]);
        let mut flagged = vec![0u8];
        flagged.extend_from_slice(&[7u8; 32]);
        let a = parse_public_key(0, &raw).unwrap();
        let b = parse_public_key(1, &STANDARD.encode(&flagged)).unwrap();
        assert_eq!(a, b);
        assert!(matches!(
            parse_public_key(2, "not base64!"),
            Err(PolicyError::InvalidPublicKey { index: 2, .. })
        ));
    }
}
