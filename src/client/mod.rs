//! Document database clients

mod memory;
mod traits;

pub use memory::MemoryClient;
pub use traits::DocumentClient;

#[cfg(feature = "marklogic")]
mod marklogic;

#[cfg(feature = "marklogic")]
pub use marklogic::MarkLogicClient;
