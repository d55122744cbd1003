pub mod kit;

// Re-export SuiKit to make it accessible via `crate::service::SuiKit`
pub use kit::SuiKit;
