//! Thread-safe append-only log of finished strokes.

use std::sync::{PoisonError, RwLock};

use crate::types::{Stroke, StrokeRecord};

use super::events::StrokeLogEvent;

type Listener = Box<dyn Fn(StrokeLogEvent) + Send + Sync>;

/// Append-only log of finished strokes.
///
/// This is the hand-off point between whatever captures input (possibly on
/// its own thread) and the save/compile side. Capture pushes sealed strokes
/// through `append`; `seal` takes an immutable [`StrokeRecord`] snapshot.
/// The RwLock is the single exclusion point for the ordered append.
pub struct StrokeLog {
    strokes: RwLock<Vec<Stroke>>,
    event_listeners: RwLock<Vec<Listener>>,
}

impl std::fmt::Debug for StrokeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeLog")
            .field("stroke_count", &self.len())
            .field(
                "listener_count",
                &self
                    .event_listeners
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len(),
            )
            .finish()
    }
}

impl Default for StrokeLog {
    fn default() -> Self {
        Self {
            strokes: RwLock::new(Vec::new()),
            event_listeners: RwLock::new(Vec::new()),
        }
    }
}

impl StrokeLog {
    /// Create a new empty stroke log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a log from a loaded record, e.g. to keep drawing on it.
    pub fn from_record(record: StrokeRecord) -> Self {
        Self {
            strokes: RwLock::new(record.strokes),
            event_listeners: RwLock::new(Vec::new()),
        }
    }

    /// Append a finished stroke and return its index.
    ///
    /// Emits a `StrokeCompleted` event to all registered listeners.
    pub fn append(&self, stroke: Stroke) -> usize {
        let index = {
            let mut strokes = self.strokes.write().unwrap_or_else(PoisonError::into_inner);
            strokes.push(stroke.clone());
            strokes.len() - 1
        };

        self.emit_event(StrokeLogEvent::StrokeCompleted { index, stroke });
        index
    }

    /// Number of strokes logged so far.
    pub fn len(&self) -> usize {
        self.strokes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Immutable snapshot of everything logged so far, in order.
    pub fn seal(&self) -> StrokeRecord {
        let strokes = self.strokes.read().unwrap_or_else(PoisonError::into_inner);
        StrokeRecord::from_strokes(strokes.clone())
    }

    /// Drop every stroke (canvas cleared).
    pub fn clear(&self) {
        self.strokes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.emit_event(StrokeLogEvent::Reset { stroke_count: 0 });
    }

    /// Replace the log contents with a loaded record.
    pub fn replace(&self, record: StrokeRecord) {
        let stroke_count = record.len();
        *self.strokes.write().unwrap_or_else(PoisonError::into_inner) = record.strokes;
        self.emit_event(StrokeLogEvent::Reset { stroke_count });
    }

    /// Register an event listener.
    ///
    /// The listener will receive cloned events for completed strokes and
    /// resets, plus any capture events forwarded through [`Self::notify`].
    pub fn add_event_listener<F>(&self, listener: F)
    where
        F: Fn(StrokeLogEvent) + Send + Sync + 'static,
    {
        self.event_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// Forward an event produced elsewhere (capture start/abort) to listeners.
    pub fn notify(&self, event: StrokeLogEvent) {
        self.emit_event(event);
    }

    fn emit_event(&self, event: StrokeLogEvent) {
        let listeners = self
            .event_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(event.clone());
        }
    }
}
