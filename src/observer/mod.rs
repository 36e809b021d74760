//! Observadores de eventos do cache.
//!
//! Cada chamada memoizada termina em exatamente um evento:
//!
//! - `hit`: valor servido do cache, função não executada
//! - `miss`: função executada e resultado armazenado
//! - `failure`: função executada e retornou erro (nada armazenado)

mod builtin;

pub use builtin::{LoggingObserver, RecordingObserver};

use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Eventos
// ═══════════════════════════════════════════════════════════════════════════

/// Resultado de uma consulta ao cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoEvent {
    /// Chave presente.
    Hit,

    /// Chave ausente; valor calculado e armazenado.
    Miss,

    /// Chave ausente; a função falhou.
    Failure,
}

impl fmt::Display for MemoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoEvent::Hit => write!(f, "hit"),
            MemoEvent::Miss => write!(f, "miss"),
            MemoEvent::Failure => write!(f, "failure"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait Observer
// ═══════════════════════════════════════════════════════════════════════════

/// Trait para observadores de eventos do cache.
pub trait Observer: Send + Sync {
    /// Nome do observador.
    fn name(&self) -> &str;

    /// Recebe um evento. `key` é a chave formatada com `Debug`.
    fn observe(&self, event: MemoEvent, key: &str);
}

// ═══════════════════════════════════════════════════════════════════════════
// Conjunto de observadores
// ═══════════════════════════════════════════════════════════════════════════

/// Observadores registrados em um wrapper.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um observador.
    pub fn register(&mut self, observer: Box<dyn Observer>) {
        tracing::debug!(observer = observer.name(), "Registering observer");
        self.observers.push(observer);
    }

    /// Notifica todos os observadores.
    ///
    /// A chave só é formatada se houver alguém ouvindo.
    pub fn notify<K: fmt::Debug + ?Sized>(&self, event: MemoEvent, key: &K) {
        if self.observers.is_empty() {
            return;
        }

        let rendered = format!("{:?}", key);
        for observer in &self.observers {
            observer.observe(event, &rendered);
        }
    }

    pub fn count(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Observador de teste que conta notificações
    struct CountingObserver {
        count: Arc<AtomicUsize>,
    }

    impl Observer for CountingObserver {
        fn name(&self) -> &str {
            "counting"
        }

        fn observe(&self, _event: MemoEvent, _key: &str) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_observer_set_new() {
        let set = ObserverSet::new();
        assert_eq!(set.count(), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_notify_reaches_every_observer() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut set = ObserverSet::new();
        set.register(Box::new(CountingObserver { count: count.clone() }));
        set.register(Box::new(CountingObserver { count: count.clone() }));

        set.notify(MemoEvent::Hit, "k");
        set.notify(MemoEvent::Miss, &42);

        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(MemoEvent::Hit.to_string(), "hit");
        assert_eq!(MemoEvent::Miss.to_string(), "miss");
        assert_eq!(MemoEvent::Failure.to_string(), "failure");
    }

    #[test]
    fn test_debug_lists_names() {
        let mut set = ObserverSet::new();
        set.register(Box::new(LoggingObserver));
        assert_eq!(format!("{:?}", set), r#"["logging"]"#);
    }
}
