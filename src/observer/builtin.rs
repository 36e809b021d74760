//! Observadores padrão.
//!
//! - `LoggingObserver`: registra eventos no log
//! - `RecordingObserver`: guarda eventos em memória

use std::sync::Arc;

use parking_lot::Mutex;

use super::{MemoEvent, Observer};

// ═══════════════════════════════════════════════════════════════════════════
// LoggingObserver
// ═══════════════════════════════════════════════════════════════════════════

/// Observador que registra eventos usando `tracing`.
///
/// Hits e misses vão para `debug`; falhas para `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn observe(&self, event: MemoEvent, key: &str) {
        match event {
            MemoEvent::Hit | MemoEvent::Miss => {
                tracing::debug!(event = %event, key = %key, "Memo lookup");
            }
            MemoEvent::Failure => {
                tracing::warn!(key = %key, "Wrapped function failed, result not cached");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RecordingObserver
// ═══════════════════════════════════════════════════════════════════════════

/// Observador que guarda cada evento.
///
/// Clones compartilham o mesmo registro, então é possível registrar um
/// clone no wrapper e inspecionar o original depois.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<(MemoEvent, String)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cópia dos eventos registrados, em ordem.
    pub fn events(&self) -> Vec<(MemoEvent, String)> {
        self.events.lock().clone()
    }

    /// Quantos eventos do tipo `event` foram vistos.
    pub fn count(&self, event: MemoEvent) -> usize {
        self.events.lock().iter().filter(|(e, _)| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Observer for RecordingObserver {
    fn name(&self) -> &str {
        "recording"
    }

    fn observe(&self, event: MemoEvent, key: &str) {
        self.events.lock().push((event, key.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_observer_name() {
        assert_eq!(LoggingObserver::new().name(), "logging");
        // Não deve entrar em pânico sem subscriber
        LoggingObserver.observe(MemoEvent::Failure, "k");
    }

    #[test]
    fn test_recording_observer_shares_log() {
        let recorder = RecordingObserver::new();
        let clone = recorder.clone();

        clone.observe(MemoEvent::Miss, "a");
        clone.observe(MemoEvent::Hit, "a");
        clone.observe(MemoEvent::Hit, "a");

        assert_eq!(recorder.count(MemoEvent::Hit), 2);
        assert_eq!(recorder.count(MemoEvent::Miss), 1);
        assert_eq!(recorder.events()[0], (MemoEvent::Miss, "a".to_string()));

        recorder.clear();
        assert!(clone.events().is_empty());
    }
}
