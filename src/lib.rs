//! # memokit
//!
//! Cache de resultados para funções puras.
//!
//! Um wrapper deriva uma chave dos argumentos de cada chamada e devolve o
//! resultado guardado quando a mesma chave aparece de novo, executando a
//! função embrulhada no máximo uma vez por chave. Erros da função nunca
//! são guardados.
//!
//! ## Módulos
//!
//! - [`key`] - Derivação de chaves (JSON canônico, SHA-256 ou `Hash`)
//! - [`memo`] - Wrappers síncronos, inclusive recursivo
//! - [`sync`] - Wrappers para várias threads e para funções assíncronas
//! - [`observer`] - Eventos de hit, miss e falha
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Erros e configuração
//!
//! ## Limitações
//!
//! Não há política de descarte: o cache cresce enquanto o wrapper existir.

#[cfg(feature = "cli")]
pub mod cli;
pub mod key;
pub mod memo;
pub mod observer;
pub mod sync;
pub mod types;

pub use key::{CacheKey, HashKey, KeyDigest, KeyError, KeyStrategy, StructuralKey};
pub use memo::{memoize, memoize_fallible, memoize_recursive, MemoStats, Memoized, Recur, RecursiveMemo};
pub use sync::{AsyncMemo, SyncMemo};
pub use types::config::Config;
pub use types::errors::{MemoError, MemoResult};
