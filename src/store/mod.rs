//! Session store implementations

mod document_store;
mod traits;

pub use document_store::DocumentStore;
pub use traits::SessionStore;
