// Application layer: balance mutations and read-side queries over the repository.
// Both the HTTP API and the CLI go through LedgerService.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
