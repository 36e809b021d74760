//! Memoização de funções assíncronas.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::key::{KeyError, KeyStrategy, StructuralKey};
use crate::memo::{Counters, MemoStats};
use crate::observer::{MemoEvent, Observer, ObserverSet};

/// Wrapper de memoização para funções que retornam futures.
///
/// Cada chave aponta para uma célula `OnceCell`. Chamadas concorrentes com
/// a mesma chave aguardam o mesmo cálculo em andamento em vez de iniciar
/// outro. Só valores resolvidos com sucesso ficam na célula. Se o cálculo
/// falha ou é cancelado, uma chamada em espera assume; sem ninguém
/// esperando, a célula vazia é removida e a próxima chamada tenta de novo.
pub struct AsyncMemo<A, T, F, K: KeyStrategy<A> = StructuralKey> {
    func: F,
    strategy: K,
    cells: Mutex<HashMap<K::Key, Arc<OnceCell<T>>>>,
    counters: Counters,
    observers: ObserverSet,
    _args: PhantomData<fn(A)>,
}

impl<A, T, F> AsyncMemo<A, T, F, StructuralKey>
where
    StructuralKey: KeyStrategy<A>,
{
    pub fn new(func: F) -> Self {
        Self::with_strategy(func, StructuralKey::default())
    }
}

impl<A, T, F, K: KeyStrategy<A>> AsyncMemo<A, T, F, K> {
    pub fn with_strategy(func: F, strategy: K) -> Self {
        Self {
            func,
            strategy,
            cells: Mutex::new(HashMap::new()),
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

    /// Chama a função, aguardando um cálculo em andamento para a mesma
    /// chave quando houver.
    ///
    /// O erro de `func` é devolvido sem alteração e não é armazenado.
    pub async fn call<E, Fut>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<KeyError>,
        T: Clone,
    {
        let key = self.strategy.derive(&args)?;
        let cell = self.cell(&key);

        if let Some(value) = cell.get() {
            self.record(MemoEvent::Hit, &key);
            return Ok(value.clone());
        }

        // Falha ou cancelamento: a célula vazia sai do mapa ao fim da chamada
        let _pending = Pending {
            memo: self,
            key: &key,
            cell: &cell,
        };

        let mut computed = false;
        let outcome = cell
            .get_or_try_init(|| {
                computed = true;
                (self.func)(args)
            })
            .await
            .cloned();

        match outcome {
            Ok(value) => {
                // Quem não calculou aguardou o cálculo de outra chamada
                let event = if computed { MemoEvent::Miss } else { MemoEvent::Hit };
                self.record(event, &key);
                Ok(value)
            }
            Err(err) => {
                self.record(MemoEvent::Failure, &key);
                Err(err)
            }
        }
    }

    /// Remove o resultado de `args`, se houver.
    ///
    /// Um cálculo em andamento termina normalmente, mas seu valor não
    /// fica no cache.
    pub fn invalidate(&self, args: &A) -> bool {
        let Ok(key) = self.strategy.derive(args) else {
            return false;
        };

        self.cells
            .lock()
            .remove(&key)
            .is_some_and(|cell| cell.initialized())
    }

    /// Limpa todo o cache.
    pub fn clear(&self) {
        self.cells.lock().clear();
    }

    /// Número de valores resolvidos no cache.
    pub fn len(&self) -> usize {
        self.cells.lock().values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chamadas ainda sem valor resolvido.
    pub fn in_flight(&self) -> usize {
        self.cells.lock().values().filter(|cell| !cell.initialized()).count()
    }

    pub fn stats(&self) -> MemoStats {
        self.counters.snapshot(self.len())
    }

    fn cell(&self, key: &K::Key) -> Arc<OnceCell<T>> {
        self.cells
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Remove a célula vazia de `key` se nenhuma outra chamada a usa.
    ///
    /// Uma chamada em espera herda a inicialização quando a anterior falha;
    /// enquanto ela segura a célula, a entrada continua no mapa e novas
    /// chamadas aguardam o mesmo cálculo.
    fn discard(&self, key: &K::Key, cell: &Arc<OnceCell<T>>) {
        let mut cells = self.cells.lock();
        let stale = cells.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, cell) && !current.initialized() && Arc::strong_count(current) == 2
        });
        if stale {
            cells.remove(key);
        }
    }

    fn record(&self, event: MemoEvent, key: &K::Key) {
        self.counters.record(event);
        self.observers.notify(event, key);
    }
}

struct Pending<'a, A, T, F, K: KeyStrategy<A>> {
    memo: &'a AsyncMemo<A, T, F, K>,
    key: &'a K::Key,
    cell: &'a Arc<OnceCell<T>>,
}

impl<A, T, F, K: KeyStrategy<A>> Drop for Pending<'_, A, T, F, K> {
    fn drop(&mut self) {
        self.memo.discard(self.key, self.cell);
    }
}

impl<A, T, F, K: KeyStrategy<A> + fmt::Debug> fmt::Debug for AsyncMemo<A, T, F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMemo")
            .field("strategy", &self.strategy)
            .field("stats", &self.stats())
            .finish()
    }
}
