//! Serialização canônica de argumentos.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::encoder::encode;

/// Erro ao derivar uma chave a partir dos argumentos.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("argument list cannot be serialized into a cache key: {0}")]
    Unsupported(String),
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unsupported(err.to_string())
    }
}

/// Forma final da chave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDigest {
    /// O próprio JSON canônico.
    #[default]
    Canonical,
    /// Hash SHA-256 (hex) do JSON canônico.
    Sha256,
}

impl fmt::Display for KeyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyDigest::Canonical => write!(f, "canonical"),
            KeyDigest::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Chave de cache derivada de uma lista de argumentos.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Deriva a chave de `args`.
    ///
    /// Argumentos estruturalmente iguais produzem a mesma chave; a posição
    /// de cada argumento faz parte da chave.
    pub fn from_args<A: Serialize + ?Sized>(args: &A, digest: KeyDigest) -> Result<Self, KeyError> {
        let canonical = canonical_json(args)?;

        let key = match digest {
            KeyDigest::Canonical => canonical,
            KeyDigest::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(canonical.as_bytes());
                hex::encode(hasher.finalize())
            }
        };

        Ok(Self(key))
    }

    /// Texto da chave.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Serializa `args` em JSON compacto com as chaves de objetos ordenadas.
///
/// Floats não finitos são rejeitados e `Some(x)` é codificado como
/// `{"Some": x}`, para que `None` e `Some(None)` não colidam.
pub fn canonical_json<A: Serialize + ?Sized>(args: &A) -> Result<String, KeyError> {
    let value = encode(args)?;
    let canonical = canonicalize(value);
    Ok(serde_json::to_string(&canonical)?)
}

/// Ordena recursivamente as chaves de todos os objetos.
///
/// Arrays mantêm a ordem: `(1, 2)` e `(2, 1)` continuam distintos.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
