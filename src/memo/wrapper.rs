//! Wrapper de memoização para funções síncronas.

use std::fmt;
use std::marker::PhantomData;

use crate::key::{KeyError, KeyStrategy, StructuralKey};
use crate::observer::Observer;

use super::store::{CacheStore, MemoStats};

/// Função embrulhada com cache próprio.
///
/// Cada `Memoized` possui exatamente um mapa de resultados, criado junto
/// com ele e liberado quando ele é descartado. Chamadas recursivas dentro
/// de `func` não passam pelo cache; para isso use
/// [`RecursiveMemo`](super::RecursiveMemo).
pub struct Memoized<A: ?Sized, T, F, K: KeyStrategy<A> = StructuralKey> {
    func: F,
    strategy: K,
    store: CacheStore<K::Key, T>,
    _args: PhantomData<fn(&A)>,
}

/// Memoiza uma função infalível com chaves estruturais.
///
/// ```
/// use memokit::memoize;
///
/// let mut double = memoize(|x: &u64| x * 2);
/// assert_eq!(double.call(&21).unwrap(), 42);
/// assert_eq!(double.call(&21).unwrap(), 42);
/// assert_eq!(double.stats().hits, 1);
/// ```
pub fn memoize<A, T, F>(func: F) -> Memoized<A, T, F>
where
    A: serde::Serialize + ?Sized,
    F: FnMut(&A) -> T,
{
    Memoized::new(func)
}

/// Memoiza uma função que pode falhar. Erros nunca são armazenados.
pub fn memoize_fallible<A, T, E, F>(func: F) -> Memoized<A, T, F>
where
    A: serde::Serialize + ?Sized,
    F: FnMut(&A) -> Result<T, E>,
{
    Memoized::new(func)
}

impl<A: ?Sized, T, F> Memoized<A, T, F, StructuralKey>
where
    StructuralKey: KeyStrategy<A>,
{
    /// Cria um wrapper com chaves estruturais em JSON canônico.
    pub fn new(func: F) -> Self {
        Self::with_strategy(func, StructuralKey::default())
    }
}

impl<A: ?Sized, T, F, K: KeyStrategy<A>> Memoized<A, T, F, K> {
    /// Cria um wrapper com a estratégia de chave informada.
    pub fn with_strategy(func: F, strategy: K) -> Self {
        Self {
            func,
            strategy,
            store: CacheStore::new(),
            _args: PhantomData,
        }
    }

    /// Registra um observador de eventos.
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.store.register(observer);
        self
    }

    /// Verifica se já existe resultado para `args`.
    ///
    /// Não conta como consulta nas estatísticas.
    pub fn contains(&self, args: &A) -> bool {
        self.strategy
            .derive(args)
            .map(|key| self.store.contains(&key))
            .unwrap_or(false)
    }

    /// Remove o resultado de `args`, se houver.
    pub fn invalidate(&mut self, args: &A) -> bool {
        match self.strategy.derive(args) {
            Ok(key) => self.store.remove(&key).is_some(),
            Err(_) => false,
        }
    }

    /// Limpa todo o cache.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> MemoStats {
        self.store.stats()
    }

    pub fn strategy(&self) -> &K {
        &self.strategy
    }

    /// Descarta o cache e devolve a função original.
    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<A: ?Sized, T: Clone, F, K> Memoized<A, T, F, K>
where
    F: FnMut(&A) -> T,
    K: KeyStrategy<A>,
{
    /// Chama a função, servindo do cache quando possível.
    ///
    /// Falha apenas se a chave não puder ser derivada; nesse caso nem o
    /// cache nem a função são tocados.
    pub fn call(&mut self, args: &A) -> Result<T, KeyError> {
        let key = self.strategy.derive(args)?;

        if let Some(value) = self.store.lookup(&key) {
            return Ok(value.clone());
        }

        let value = (self.func)(args);
        self.store.fill(key, value.clone());
        Ok(value)
    }
}

impl<A: ?Sized, T: Clone, F, K: KeyStrategy<A>> Memoized<A, T, F, K> {
    /// Chama uma função falível, servindo do cache quando possível.
    ///
    /// O erro de `func` é devolvido sem alteração e não é armazenado: a
    /// próxima chamada com os mesmos argumentos executa `func` de novo.
    pub fn try_call<E>(&mut self, args: &A) -> Result<T, E>
    where
        F: FnMut(&A) -> Result<T, E>,
        E: From<KeyError>,
    {
        let key = self.strategy.derive(args)?;

        if let Some(value) = self.store.lookup(&key) {
            return Ok(value.clone());
        }

        match (self.func)(args) {
            Ok(value) => {
                self.store.fill(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                self.store.fail(&key);
                Err(err)
            }
        }
    }
}

impl<A: ?Sized, T, F, K: KeyStrategy<A> + fmt::Debug> fmt::Debug for Memoized<A, T, F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("strategy", &self.strategy)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{HashKey, KeyDigest};
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    enum MathError {
        Negative,
        Key(KeyError),
    }

    impl From<KeyError> for MathError {
        fn from(err: KeyError) -> Self {
            MathError::Key(err)
        }
    }

    #[test]
    fn test_call_computes_once() {
        let calls = Cell::new(0);
        let mut square = memoize(|x: &i64| {
            calls.set(calls.get() + 1);
            x * x
        });

        assert_eq!(square.call(&9).unwrap(), 81);
        assert_eq!(square.call(&9).unwrap(), 81);
        assert_eq!(calls.get(), 1);

        let stats = square.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_try_call_error_not_cached() {
        let calls = Cell::new(0);
        let mut checked = memoize_fallible(|x: &i32| {
            calls.set(calls.get() + 1);
            if *x < 0 {
                Err(MathError::Negative)
            } else {
                Ok(x * 2)
            }
        });

        assert_eq!(checked.try_call(&-1), Err(MathError::Negative));
        assert_eq!(checked.try_call(&-1), Err(MathError::Negative));
        assert_eq!(calls.get(), 2);
        assert!(checked.is_empty());
        assert_eq!(checked.stats().failures, 2);
    }

    #[test]
    fn test_key_error_fails_before_lookup() {
        use std::collections::BTreeMap;

        let calls = Cell::new(0);
        let mut sized = memoize_fallible(|m: &BTreeMap<(u8, u8), u8>| {
            calls.set(calls.get() + 1);
            Ok::<usize, MathError>(m.len())
        });

        let mut map = BTreeMap::new();
        map.insert((1, 1), 1);

        assert!(matches!(sized.try_call(&map), Err(MathError::Key(_))));
        assert_eq!(calls.get(), 0);
        assert_eq!(sized.stats().lookups(), 0);
    }

    #[test]
    fn test_invalidate_and_contains() {
        let mut inc = memoize(|x: &u8| x + 1);
        inc.call(&1).unwrap();

        assert!(inc.contains(&1));
        assert!(!inc.contains(&2));
        assert!(inc.invalidate(&1));
        assert!(!inc.invalidate(&1));
        assert!(!inc.contains(&1));
    }

    #[test]
    fn test_clear_recomputes() {
        let calls = Cell::new(0);
        let mut id = memoize(|s: &str| {
            calls.set(calls.get() + 1);
            s.to_uppercase()
        });

        assert_eq!(id.call("abc").unwrap(), "ABC");
        id.clear();
        assert_eq!(id.len(), 0);
        assert_eq!(id.call("abc").unwrap(), "ABC");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_hash_key_strategy() {
        let calls = Cell::new(0);
        let mut concat = Memoized::with_strategy(
            |pair: &(String, String)| {
                calls.set(calls.get() + 1);
                format!("{}{}", pair.0, pair.1)
            },
            HashKey,
        );

        let args = ("ab".to_string(), "cd".to_string());
        assert_eq!(concat.call(&args).unwrap(), "abcd");
        assert_eq!(concat.call(&args.clone()).unwrap(), "abcd");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_sha256_strategy() {
        let mut add = Memoized::with_strategy(|(a, b): &(i32, i32)| a + b, StructuralKey::sha256());
        assert_eq!(add.call(&(1, 2)).unwrap(), 3);
        assert_eq!(add.strategy().digest(), KeyDigest::Sha256);
    }

    #[test]
    fn test_into_inner_returns_function() {
        let memo = memoize(|x: &u32| x + 10);
        let mut f = memo.into_inner();
        assert_eq!(f(&5), 15);
    }

    #[test]
    fn test_debug_output() {
        let memo = memoize(|x: &u32| *x);
        let debug = format!("{:?}", memo);
        assert!(debug.contains("Memoized"));
        assert!(debug.contains("hits: 0"));
    }
}
