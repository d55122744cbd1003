pub mod coin_selection;
pub mod model;
pub mod traits;
pub mod types;

pub use coin_selection::{CoinPageFetcher, CoinSelection, CoinSelector};
pub use model::{CallArg, MoveCall, MoveCallArg, SuiObject, SuiOwnedObject, SuiSharedObject};
pub use traits::{GasParams, SuiRpc, TransactionBuilder};
pub use types::{
    CoinBalance, CoinPage, CoinRecord, DryRunResult, ObjectDataOptions, ObjectRecord, ObjectRef,
    Owner, TransactionEffects, TransactionReceipt, SUI_COIN_TYPE,
};
