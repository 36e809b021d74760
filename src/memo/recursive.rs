//! Memoização com recursão passando pelo cache.
//!
//! `Memoized` só memoiza a chamada mais externa. Aqui a função recebe um
//! [`Recur`] e faz as chamadas internas através dele, então cada
//! subproblema é calculado uma única vez.

use std::fmt;
use std::marker::PhantomData;

use crate::key::{KeyError, KeyStrategy, StructuralKey};
use crate::observer::Observer;

use super::store::{CacheStore, MemoStats};

/// Handle de recursão entregue à função memoizada.
pub struct Recur<'a, A: ?Sized, T, E, K: KeyStrategy<A>> {
    body: &'a (dyn Fn(&mut Recur<'_, A, T, E, K>, &A) -> Result<T, E> + 'a),
    strategy: &'a K,
    store: &'a mut CacheStore<K::Key, T>,
}

impl<A: ?Sized, T: Clone, E: From<KeyError>, K: KeyStrategy<A>> Recur<'_, A, T, E, K> {
    /// Chamada recursiva, servida do cache quando possível.
    pub fn call(&mut self, args: &A) -> Result<T, E> {
        resolve(self.body, self.strategy, self.store, args)
    }
}

fn resolve<A, T, E, K>(
    body: &dyn Fn(&mut Recur<'_, A, T, E, K>, &A) -> Result<T, E>,
    strategy: &K,
    store: &mut CacheStore<K::Key, T>,
    args: &A,
) -> Result<T, E>
where
    A: ?Sized,
    T: Clone,
    E: From<KeyError>,
    K: KeyStrategy<A>,
{
    let key = strategy.derive(args)?;

    if let Some(value) = store.lookup(&key) {
        return Ok(value.clone());
    }

    let result = {
        let mut recur = Recur {
            body,
            strategy,
            store: &mut *store,
        };
        body(&mut recur, args)
    };

    match result {
        Ok(value) => {
            store.fill(key, value.clone());
            Ok(value)
        }
        Err(err) => {
            store.fail(&key);
            Err(err)
        }
    }
}

/// Função recursiva memoizada.
///
/// ```
/// use memokit::{memoize_recursive, KeyError, Recur, StructuralKey};
///
/// let mut fib = memoize_recursive(
///     |fib: &mut Recur<'_, u64, u64, KeyError, StructuralKey>, n: &u64| {
///         if *n <= 1 {
///             Ok(*n)
///         } else {
///             Ok(fib.call(&(n - 1))? + fib.call(&(n - 2))?)
///         }
///     },
/// );
///
/// assert_eq!(fib.call(&50).unwrap(), 12_586_269_025);
/// assert_eq!(fib.stats().misses, 51);
/// ```
pub struct RecursiveMemo<A: ?Sized, T, E, F, K: KeyStrategy<A> = StructuralKey> {
    body: F,
    strategy: K,
    store: CacheStore<K::Key, T>,
    _sig: PhantomData<fn(&A) -> Result<T, E>>,
}

/// Memoiza uma função recursiva com chaves estruturais.
pub fn memoize_recursive<A, T, E, F>(body: F) -> RecursiveMemo<A, T, E, F>
where
    A: serde::Serialize + ?Sized,
    F: Fn(&mut Recur<'_, A, T, E, StructuralKey>, &A) -> Result<T, E>,
{
    RecursiveMemo::with_strategy(body, StructuralKey::default())
}

impl<A: ?Sized, T, E, F, K: KeyStrategy<A>> RecursiveMemo<A, T, E, F, K> {
    pub fn with_strategy(body: F, strategy: K) -> Self
    where
        F: Fn(&mut Recur<'_, A, T, E, K>, &A) -> Result<T, E>,
    {
        Self {
            body,
            strategy,
            store: CacheStore::new(),
            _sig: PhantomData,
        }
    }

    /// Registra um observador de eventos.
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.store.register(observer);
        self
    }

    pub fn contains(&self, args: &A) -> bool {
        self.strategy
            .derive(args)
            .map(|key| self.store.contains(&key))
            .unwrap_or(false)
    }

    pub fn invalidate(&mut self, args: &A) -> bool {
        match self.strategy.derive(args) {
            Ok(key) => self.store.remove(&key).is_some(),
            Err(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.store.stats()
    }
}

impl<A, T, E, F, K> RecursiveMemo<A, T, E, F, K>
where
    A: ?Sized,
    T: Clone,
    E: From<KeyError>,
    F: Fn(&mut Recur<'_, A, T, E, K>, &A) -> Result<T, E>,
    K: KeyStrategy<A>,
{
    /// Chama a função; chamadas internas via [`Recur`] também usam o cache.
    pub fn call(&mut self, args: &A) -> Result<T, E> {
        resolve(&self.body, &self.strategy, &mut self.store, args)
    }
}

impl<A: ?Sized, T, E, F, K: KeyStrategy<A> + fmt::Debug> fmt::Debug for RecursiveMemo<A, T, E, F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveMemo")
            .field("strategy", &self.strategy)
            .field("stats", &self.stats())
            .finish()
    }
}
