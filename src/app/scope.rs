use iced::Task;
use iced::task::Handle;
use crate::router::View;

/// Identifies the view a fetch was issued for. A response is applied only if
/// its scope is still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchScope {
    pub view: View,
    pub generation: u64,
}

/// Current fetch scope plus the abort handles of the loads issued in it.
pub struct ScopeTracker {
    current: FetchScope,
    handles: Vec<Handle>,
}

impl ScopeTracker {
    pub fn new(view: View) -> Self {
        Self {
            current: FetchScope { view, generation: 0 },
            handles: Vec::new(),
        }
    }

    pub fn current(&self) -> FetchScope {
        self.current
    }

    pub fn is_current(&self, scope: FetchScope) -> bool {
        self.current == scope
    }

    /// Starts a new scope for `view`. Loads still running in the previous
    /// scope are aborted when their handles drop here.
    pub fn enter(&mut self, view: View) -> FetchScope {
        let aborted = self.handles.len();
        self.handles.clear();
        self.current = FetchScope {
            view,
            generation: self.current.generation.wrapping_add(1),
        };
        tracing::debug!(view = view.name(), generation = self.current.generation, aborted, "entered fetch scope");
        self.current
    }

    /// Makes `task` abortable and ties it to the current scope.
    pub fn track<T: 'static>(&mut self, task: Task<T>) -> Task<T> {
        let (task, handle) = task.abortable();
        self.handles.push(handle.abort_on_drop());
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_invalidates_previous_scope() {
        let mut tracker = ScopeTracker::new(View::Home);
        let first = tracker.enter(View::Dashboard);
        assert!(tracker.is_current(first));

        let second = tracker.enter(View::Dashboard);
        assert_ne!(first, second);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn same_generation_other_view_is_stale() {
        let tracker = ScopeTracker::new(View::Students);
        let foreign = FetchScope {
            view: View::Users,
            generation: tracker.current().generation,
        };
        assert!(!tracker.is_current(foreign));
    }

    #[test]
    fn tracked_tasks_are_dropped_on_enter() {
        let mut tracker = ScopeTracker::new(View::Home);
        let _task = tracker.track(Task::<()>::none());
        let _task = tracker.track(Task::<()>::none());
        assert_eq!(tracker.handles.len(), 2);

        tracker.enter(View::Rankings);
        assert!(tracker.handles.is_empty());
    }
}
