//! Armazenamento das entradas memoizadas.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::observer::{MemoEvent, Observer, ObserverSet};

/// Estatísticas de um wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Número atual de entradas.
    pub entries: usize,

    /// Chamadas servidas do cache.
    pub hits: u64,

    /// Chamadas que executaram a função com sucesso.
    pub misses: u64,

    /// Chamadas em que a função falhou.
    pub failures: u64,
}

impl MemoStats {
    /// Total de consultas que chegaram ao cache.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses + self.failures
    }

    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Quantas vezes a função embrulhada foi executada.
    pub fn computations(&self) -> u64 {
        self.misses + self.failures
    }
}

/// Contadores de eventos, compartilháveis entre threads.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    pub(crate) fn record(&self, event: MemoEvent) {
        let counter = match event {
            MemoEvent::Hit => &self.hits,
            MemoEvent::Miss => &self.misses,
            MemoEvent::Failure => &self.failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> MemoStats {
        MemoStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Mapa chave -> resultado de um único wrapper.
///
/// Cresce a cada miss e nunca descarta entradas sozinho.
#[derive(Debug)]
pub struct CacheStore<K, T> {
    entries: HashMap<K, T>,
    counters: Counters,
    observers: ObserverSet,
}

impl<K: Eq + Hash + Debug, T> CacheStore<K, T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            counters: Counters::default(),
            observers: ObserverSet::new(),
        }
    }

    pub fn register(&mut self, observer: Box<dyn Observer>) {
        self.observers.register(observer);
    }

    /// Busca no cache, registrando um hit quando encontra.
    ///
    /// A ausência não é registrada aqui: só quem executa a função sabe se
    /// foi um miss ou uma falha.
    pub fn lookup(&self, key: &K) -> Option<&T> {
        let found = self.entries.get(key);
        if found.is_some() {
            self.record(MemoEvent::Hit, key);
        }
        found
    }

    /// Armazena o resultado de um miss.
    pub fn fill(&mut self, key: K, value: T) {
        self.record(MemoEvent::Miss, &key);
        self.entries.insert(key, value);
        tracing::trace!(entries = self.entries.len(), "Memo entry stored");
    }

    /// Registra uma falha da função; nada é armazenado.
    pub fn fail(&self, key: &K) {
        self.record(MemoEvent::Failure, key);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<T> {
        self.entries.remove(key)
    }

    /// Limpa todas as entradas. Os contadores são mantidos.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.counters.snapshot(self.entries.len())
    }

    fn record(&self, event: MemoEvent, key: &K) {
        self.counters.record(event);
        self.observers.notify(event, key);
    }
}

impl<K: Eq + Hash + Debug, T> Default for CacheStore<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
