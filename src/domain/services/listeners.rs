use serde::{Deserialize, Serialize};

/// Handle returned on registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(u64);

type Callback<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Synchronous observer list.
///
/// Callbacks run in registration order on the caller's thread and must not
/// block.
pub struct Listeners<E: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Callback<E>)>,
}

impl<E: ?Sized> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Returns false when the id was never registered or already removed
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&self, event: &E) {
        for (_, callback) in &self.entries {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: ?Sized> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners: Listeners<str> = Listeners::new();

        let first = seen.clone();
        listeners.add(move |event: &str| first.lock().unwrap().push(format!("a:{}", event)));
        let second = seen.clone();
        listeners.add(move |event: &str| second.lock().unwrap().push(format!("b:{}", event)));

        listeners.notify("sale");
        assert_eq!(*seen.lock().unwrap(), vec!["a:sale", "b:sale"]);
    }

    #[test]
    fn test_remove_stops_notifications() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut listeners: Listeners<u32> = Listeners::new();

        let counter = count.clone();
        let id = listeners.add(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify(&1);
        assert!(listeners.remove(id));
        listeners.notify(&2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!listeners.remove(id));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut listeners: Listeners<u32> = Listeners::new();
        let a = listeners.add(|_| {});
        let b = listeners.add(|_| {});
        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);
    }
}
