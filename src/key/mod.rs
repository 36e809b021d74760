//! Derivação de chaves de cache.
//!
//! Toda chamada memoizada começa aqui: a lista de argumentos é convertida
//! em uma chave determinística antes de qualquer consulta ao cache.
//!
//! - [`StructuralKey`] - serializa os argumentos em JSON canônico (chaves de
//!   objetos ordenadas) e, opcionalmente, aplica SHA-256
//! - [`HashKey`] - usa os próprios argumentos como chave (`Eq + Hash`)

mod canonical;
mod encoder;
mod strategy;

pub use canonical::{canonical_json, canonicalize, CacheKey, KeyDigest, KeyError};
pub use strategy::{HashKey, KeyStrategy, StructuralKey};
