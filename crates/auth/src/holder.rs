//! Binding of a [`SecurityContext`] to the current OS thread.
//!
//! Nothing here is inherited: a freshly spawned thread starts unbound and
//! gets its own empty context on first use. Sharing a context is always an
//! explicit act, either [`ContextHolder::set_context`] with a cloned `Arc` or
//! [`ContextHolder::spawn_with_context`].

use std::cell::RefCell;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::context::SecurityContext;

thread_local! {
    static BOUND: RefCell<Option<Arc<SecurityContext>>> = const { RefCell::new(None) };
}

/// Static accessors for the calling thread's context.
pub struct ContextHolder;

impl ContextHolder {
    /// The context bound to this thread, binding a new empty one if needed.
    pub fn context() -> Arc<SecurityContext> {
        BOUND.with(|slot| {
            slot.borrow_mut()
                .get_or_insert_with(|| Arc::new(SecurityContext::new()))
                .clone()
        })
    }

    /// Bind `ctx` to this thread, replacing any previous binding.
    pub fn set_context(ctx: Arc<SecurityContext>) {
        BOUND.with(|slot| *slot.borrow_mut() = Some(ctx));
    }

    /// Unbind this thread's context. The context itself is left untouched.
    pub fn clear_context() {
        BOUND.with(|slot| *slot.borrow_mut() = None);
    }

    pub fn is_bound() -> bool {
        BOUND.with(|slot| slot.borrow().is_some())
    }

    /// Spawn a thread bound to the caller's context (the same object, not a copy).
    pub fn spawn_with_context<F, T>(f: F) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let ctx = Self::context();
        thread::spawn(move || {
            Self::set_context(ctx);
            f()
        })
    }
}
