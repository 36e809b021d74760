//! Memoização compartilhada entre threads.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::key::{KeyError, KeyStrategy, StructuralKey};
use crate::memo::{Counters, MemoStats};
use crate::observer::{MemoEvent, Observer, ObserverSet};

/// Estado de um slot.
enum SlotState<T> {
    /// Ainda sem valor; quem segurar o lock calcula.
    Empty,
    /// Valor calculado.
    Ready(T),
    /// Slot removido do mapa; quem o encontrar deve buscar outro.
    Detached,
}

type Slot<T> = Arc<Mutex<SlotState<T>>>;

/// Wrapper de memoização chamável por `&self` de várias threads.
///
/// O mapa de slots fica atrás de um `Mutex` e cada chave tem seu próprio
/// lock. A thread que encontra um slot vazio calcula o valor segurando o
/// lock do slot, então misses simultâneos para a mesma chave executam a
/// função uma única vez. Chaves diferentes calculam em paralelo.
pub struct SyncMemo<A: ?Sized, T, F, K: KeyStrategy<A> = StructuralKey> {
    func: F,
    strategy: K,
    slots: Mutex<HashMap<K::Key, Slot<T>>>,
    entries: AtomicUsize,
    counters: Counters,
    observers: ObserverSet,
    _args: PhantomData<fn(&A)>,
}

impl<A: ?Sized, T, F> SyncMemo<A, T, F, StructuralKey>
where
    StructuralKey: KeyStrategy<A>,
{
    pub fn new(func: F) -> Self {
        Self::with_strategy(func, StructuralKey::default())
    }
}

impl<A: ?Sized, T, F, K: KeyStrategy<A>> SyncMemo<A, T, F, K> {
    pub fn with_strategy(func: F, strategy: K) -> Self {
        Self {
            func,
            strategy,
            slots: Mutex::new(HashMap::new()),
            entries: AtomicUsize::new(0),
            counters: Counters::default(),
            observers: ObserverSet::new(),
            _args: PhantomData,
        }
    }

    /// Registra um observador de eventos.
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.register(observer);
        self
    }

    /// Remove o resultado de `args`, se houver.
    ///
    /// Espera um cálculo em andamento para a mesma chave terminar.
    pub fn invalidate(&self, args: &A) -> bool {
        let Ok(key) = self.strategy.derive(args) else {
            return false;
        };

        let removed = self.slots.lock().remove(&key);
        match removed {
            Some(slot) => self.detach(&slot),
            None => false,
        }
    }

    /// Limpa todo o cache.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.slots.lock());
        for slot in drained.values() {
            self.detach(slot);
        }
    }

    /// Número de valores calculados no cache.
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> MemoStats {
        self.counters.snapshot(self.len())
    }

    fn slot(&self, key: &K::Key) -> Slot<T> {
        let mut slots = self.slots.lock();
        slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(SlotState::Empty)))
            .clone()
    }

    /// Marca um slot já fora do mapa como descartado.
    fn detach(&self, slot: &Slot<T>) -> bool {
        let mut state = slot.lock();
        let was_ready = matches!(*state, SlotState::Ready(_));
        *state = SlotState::Detached;
        if was_ready {
            self.entries.fetch_sub(1, Ordering::AcqRel);
        }
        was_ready
    }

    /// Remove do mapa um slot que ficou vazio após uma falha.
    fn discard(&self, key: &K::Key, slot: &Slot<T>) {
        let mut slots = self.slots.lock();
        let same = slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot));
        if !same {
            return;
        }

        // Outra thread pode estar recalculando; nesse caso o slot fica
        if let Some(mut state) = slot.try_lock() {
            if matches!(*state, SlotState::Empty) {
                *state = SlotState::Detached;
                slots.remove(key);
            }
        }
    }

    fn record(&self, event: MemoEvent, key: &K::Key) {
        self.counters.record(event);
        self.observers.notify(event, key);
    }
}

impl<A: ?Sized, T: Clone, F, K: KeyStrategy<A>> SyncMemo<A, T, F, K> {
    /// Chama a função, servindo do cache quando possível.
    pub fn call(&self, args: &A) -> Result<T, KeyError>
    where
        F: Fn(&A) -> T,
    {
        self.resolve(|args| Ok::<T, KeyError>((self.func)(args)), args)
    }

    /// Chama uma função falível; erros são devolvidos e não são guardados.
    pub fn try_call<E>(&self, args: &A) -> Result<T, E>
    where
        F: Fn(&A) -> Result<T, E>,
        E: From<KeyError>,
    {
        self.resolve(&self.func, args)
    }

    fn resolve<E, G>(&self, compute: G, args: &A) -> Result<T, E>
    where
        G: Fn(&A) -> Result<T, E>,
        E: From<KeyError>,
    {
        let key = self.strategy.derive(args)?;

        loop {
            let slot = self.slot(&key);
            let mut state = slot.lock();

            match &*state {
                SlotState::Ready(value) => {
                    let value = value.clone();
                    drop(state);
                    self.record(MemoEvent::Hit, &key);
                    return Ok(value);
                }
                SlotState::Detached => continue,
                SlotState::Empty => {}
            }

            match compute(args) {
                Ok(value) => {
                    *state = SlotState::Ready(value.clone());
                    self.entries.fetch_add(1, Ordering::AcqRel);
                    drop(state);
                    self.record(MemoEvent::Miss, &key);
                    tracing::trace!(entries = self.len(), "Shared memo entry stored");
                    return Ok(value);
                }
                Err(err) => {
                    drop(state);
                    self.record(MemoEvent::Failure, &key);
                    self.discard(&key, &slot);
                    return Err(err);
                }
            }
        }
    }
}

impl<A: ?Sized, T, F, K: KeyStrategy<A> + fmt::Debug> fmt::Debug for SyncMemo<A, T, F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMemo")
            .field("strategy", &self.strategy)
            .field("stats", &self.stats())
            .finish()
    }
}
