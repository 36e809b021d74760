//! Tipos de erro do memokit.

use thiserror::Error;

use crate::key::KeyError;

/// Tipo de resultado padrão do memokit.
pub type MemoResult<T> = Result<T, MemoError>;

/// Erros da aplicação.
///
/// Os wrappers não usam este tipo para erros da função embrulhada: eles são
/// devolvidos exatamente como a função os produziu.
#[derive(Error, Debug)]
pub enum MemoError {
    #[error("Erro de chave: {0}")]
    Key(#[from] KeyError),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl MemoError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_converts() {
        let err: MemoError = KeyError::Unsupported("map key".into()).into();
        assert!(matches!(err, MemoError::Key(_)));
        assert!(err.to_string().contains("map key"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(MemoError::other("boom").to_string(), "boom");
        assert!(MemoError::config("bad").to_string().contains("bad"));
    }
}
