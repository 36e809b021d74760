//! Wrappers concorrentes.
//!
//! - [`SyncMemo`] - chamável por `&self` de várias threads
//! - [`AsyncMemo`] - para funções assíncronas, com no máximo um cálculo em
//!   andamento por chave

mod future;
mod shared;

pub use future::AsyncMemo;
pub use shared::SyncMemo;
