//! Session store.
//!
//! Holds the ordered collection of chat threads and which thread is active.
//! All state lives in memory for the lifetime of one session; each session
//! owns its own store, so no locking is involved.

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Returns the display label for this role.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn in a conversation. Append-only; insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// One independent conversation with its own message history.
#[derive(Debug, Clone)]
pub struct Thread {
    pub id: u64,
    pub name: String,
    pub messages: Vec<Message>,
}

impl Thread {
    fn with_id(id: u64) -> Self {
        Self {
            id,
            name: format!("Chat {}", id + 1),
            messages: Vec::new(),
        }
    }
}

/// Ordered thread collection plus the active thread pointer.
///
/// Invariants: the collection is never empty, and `active` always names an
/// existing thread. Both are re-established after every deletion.
#[derive(Debug, Clone)]
pub struct SessionStore {
    threads: Vec<Thread>,
    active: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a store holding one default thread, which is active.
    pub fn new() -> Self {
        Self {
            threads: vec![Thread::with_id(0)],
            active: 0,
        }
    }

    /// Allocates a new thread (id = max existing + 1) and makes it active.
    pub fn create_thread(&mut self) -> u64 {
        let id = self
            .threads
            .iter()
            .map(|t| t.id)
            .max()
            .map_or(0, |max| max + 1);
        self.threads.push(Thread::with_id(id));
        self.active = id;
        id
    }

    /// Removes the thread with `id`. Unknown ids are a no-op.
    ///
    /// If the collection becomes empty a default thread is reinserted, and
    /// the active pointer is re-pointed to the first remaining thread.
    pub fn delete_thread(&mut self, id: u64) {
        let before = self.threads.len();
        self.threads.retain(|t| t.id != id);
        if self.threads.len() == before {
            return;
        }
        if self.threads.is_empty() {
            self.threads.push(Thread::with_id(0));
        }
        self.active = self.threads[0].id;
    }

    /// Makes `id` the active thread if it exists; otherwise a no-op.
    pub fn select_thread(&mut self, id: u64) {
        if self.threads.iter().any(|t| t.id == id) {
            self.active = id;
        }
    }

    /// Appends a message to the named thread.
    ///
    /// A missing thread is tolerated silently: the UI may race a deletion,
    /// and a late reply must not crash the session.
    pub fn append_message(&mut self, thread_id: u64, role: Role, content: impl Into<String>) {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            tracing::debug!(thread_id, "append_message on missing thread, dropping");
            return;
        };
        thread.messages.push(Message {
            role,
            content: content.into(),
        });
    }

    /// Returns the active thread, or `None` if the collection is somehow
    /// empty (callers handle this defensively).
    pub fn active_thread(&self) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == self.active)
    }

    /// Returns the active thread id.
    pub fn active_id(&self) -> u64 {
        self.active
    }

    /// Returns all threads in insertion order.
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }
}
