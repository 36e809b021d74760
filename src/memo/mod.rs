//! Wrappers de memoização.
//!
//! Este módulo embrulha funções puras em um cache de resultados indexado
//! pela chave derivada dos argumentos:
//!
//! 1. deriva a chave (erros abortam antes de consultar o cache)
//! 2. chave presente: devolve o valor guardado sem chamar a função
//! 3. chave ausente: chama a função, guarda o resultado e o devolve
//!
//! Erros da função nunca são guardados. Não há política de descarte: o
//! cache cresce enquanto o wrapper existir.

mod recursive;
mod store;
mod wrapper;

pub use recursive::{memoize_recursive, Recur, RecursiveMemo};
pub use store::{CacheStore, MemoStats};
pub use wrapper::{memoize, memoize_fallible, Memoized};

pub(crate) use store::Counters;
