use core::fmt;

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A list of callbacks notified together.
///
/// Poolable types embed one list per lifecycle event, notify it from the
/// matching callback and clear it in [`Poolable::destroy`](crate::Poolable::destroy)
/// so that no subscriber is retained past the instance's lifetime.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerId, Box<dyn FnMut()>)>,
    next_id: u64,
}

impl Listeners {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `listener` to the end of the list.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Calls every listener in subscription order.
    pub fn notify(&mut self) {
        for (_, listener) in &mut self.entries {
            listener();
        }
    }

    /// Drops every listener.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if no listener is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}
