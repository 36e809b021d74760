//! Estratégias de derivação de chave.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

use super::canonical::{CacheKey, KeyDigest, KeyError};

/// Regra que transforma uma lista de argumentos em chave de cache.
///
/// A derivação acontece antes da consulta ao cache; um erro aqui aborta a
/// chamada sem consultar nem alterar o cache.
pub trait KeyStrategy<A: ?Sized> {
    /// Tipo da chave armazenada no mapa.
    type Key: Eq + Hash + Clone + Debug;

    /// Deriva a chave para `args`.
    fn derive(&self, args: &A) -> Result<Self::Key, KeyError>;
}

/// Chaves por valor estrutural, via JSON canônico.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralKey {
    digest: KeyDigest,
}

impl StructuralKey {
    pub fn new(digest: KeyDigest) -> Self {
        Self { digest }
    }

    /// Chaves em SHA-256.
    pub fn sha256() -> Self {
        Self::new(KeyDigest::Sha256)
    }

    pub fn digest(&self) -> KeyDigest {
        self.digest
    }
}

impl<A: Serialize + ?Sized> KeyStrategy<A> for StructuralKey {
    type Key = CacheKey;

    fn derive(&self, args: &A) -> Result<CacheKey, KeyError> {
        CacheKey::from_args(args, self.digest)
    }
}

/// Usa os próprios argumentos como chave.
///
/// Nunca falha; exige `Eq + Hash` em vez de serialização.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashKey;

impl<A: Eq + Hash + Clone + Debug> KeyStrategy<A> for HashKey {
    type Key = A;

    fn derive(&self, args: &A) -> Result<A, KeyError> {
        Ok(args.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Order<'a> {
        items: Vec<&'a str>,
        coupon: Option<&'a str>,
    }

    #[test]
    fn test_structural_equal_values_share_key() {
        let strategy = StructuralKey::default();
        let a = strategy
            .derive(&Order { items: vec!["apple", "pear"], coupon: None })
            .unwrap();
        let b = strategy
            .derive(&Order { items: vec!["apple", "pear"], coupon: None })
            .unwrap();
        let c = strategy
            .derive(&Order { items: vec!["pear", "apple"], coupon: None })
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_structural_digest() {
        assert_eq!(StructuralKey::default().digest(), KeyDigest::Canonical);
        assert_eq!(StructuralKey::sha256().digest(), KeyDigest::Sha256);
    }

    #[test]
    fn test_hash_key_is_the_arguments() {
        let key = HashKey.derive(&(3u8, "x".to_string())).unwrap();
        assert_eq!(key, (3u8, "x".to_string()));
    }
}
