//! The mutable cell holding the identity visible to a logical thread.
//!
//! A context has a *base* identity (what plain `set`/`clear` manage when no
//! impersonation is active) and a stack of *frames*, one per active
//! `run_as*` invocation. The visible identity is the top frame's, or the base
//! when no frame is active. Leaving an invocation removes exactly its own
//! frame, wherever it sits in the stack.
//!
//! With one thread this is plain save/restore: the frame being removed is
//! always the top one. When threads share a context, frames can be removed out
//! of order; each removal takes away only its own layer, so once every
//! invocation has exited the base is visible again, untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::identity::Identity;

/// Handle to a frame pushed by [`SecurityContext::push_frame`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

#[derive(Debug)]
struct Frame {
    id: FrameId,
    identity: Option<Arc<Identity>>,
}

#[derive(Debug, Default)]
struct ContextState {
    base: Option<Arc<Identity>>,
    frames: Vec<Frame>,
}

impl ContextState {
    fn visible(&self) -> &Option<Arc<Identity>> {
        self.frames.last().map_or(&self.base, |f| &f.identity)
    }

    fn visible_mut(&mut self) -> &mut Option<Arc<Identity>> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.identity,
            None => &mut self.base,
        }
    }
}

/// Holds at most one visible [`Identity`].
///
/// Usually owned by a single thread, but may be shared through an `Arc` by
/// several threads at once. Every operation takes the internal lock exactly
/// once, so each read or write is atomic; nothing orders one thread's
/// operations relative to another's.
#[derive(Debug, Default)]
pub struct SecurityContext {
    state: Mutex<ContextState>,
    next_frame: AtomicU64,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: impl Into<Arc<Identity>>) -> Self {
        let ctx = Self::new();
        ctx.set(identity);
        ctx
    }

    // The state only ever holds complete values, so a poisoned lock is safe
    // to reuse.
    fn state(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The visible identity.
    pub fn get(&self) -> Option<Arc<Identity>> {
        self.state().visible().clone()
    }

    /// Replace the visible identity (the top frame's, or the base).
    pub fn set(&self, identity: impl Into<Arc<Identity>>) {
        *self.state().visible_mut() = Some(identity.into());
    }

    pub fn clear(&self) {
        *self.state().visible_mut() = None;
    }

    /// Replace the visible identity and return the previous one, under a
    /// single lock.
    pub fn replace(&self, next: Option<Arc<Identity>>) -> Option<Arc<Identity>> {
        std::mem::replace(self.state().visible_mut(), next)
    }

    /// Make `identity` visible until the returned frame is popped.
    pub fn push_frame(&self, identity: Option<Arc<Identity>>) -> FrameId {
        let id = FrameId(self.next_frame.fetch_add(1, Ordering::Relaxed));
        self.state().frames.push(Frame { id, identity });
        id
    }

    /// Remove a frame. Returns `false` if it was already gone.
    pub fn pop_frame(&self, id: FrameId) -> bool {
        let mut state = self.state();
        match state.frames.iter().rposition(|f| f.id == id) {
            Some(pos) => {
                state.frames.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.state().frames.len()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().visible().is_some()
    }

    pub fn principal(&self) -> Option<String> {
        self.state()
            .visible()
            .as_ref()
            .map(|i| i.principal().to_string())
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.state()
            .visible()
            .as_ref()
            .is_some_and(|i| i.has_authority(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::AuthoritySet;

    fn user(name: &str) -> Arc<Identity> {
        Arc::new(Identity::user(name, AuthoritySet::single("authenticated")))
    }

    #[test]
    fn starts_empty() {
        let ctx = SecurityContext::new();
        assert!(ctx.get().is_none());
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.principal(), None);
        assert!(!ctx.has_authority("authenticated"));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn set_get_clear() {
        let ctx = SecurityContext::new();
        let token = user("suzy");
        ctx.set(token.clone());

        assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
        assert_eq!(ctx.principal().as_deref(), Some("suzy"));
        assert!(ctx.has_authority("authenticated"));

        ctx.clear();
        assert!(ctx.get().is_none());
    }

    #[test]
    fn replace_returns_previous_value() {
        let token = user("suzy");
        let ctx = SecurityContext::with_identity(token.clone());

        let previous = ctx.replace(None);
        assert!(Arc::ptr_eq(&previous.unwrap(), &token));
        assert!(ctx.get().is_none());

        assert!(ctx.replace(Some(token.clone())).is_none());
        assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
    }

    #[test]
    fn frames_shadow_and_restore_the_base() {
        let token = user("suzy");
        let ctx = SecurityContext::with_identity(token.clone());

        let outer = ctx.push_frame(Some(user("admin")));
        let inner = ctx.push_frame(None);
        assert!(!ctx.is_authenticated());

        // Writes inside a frame stay inside it.
        ctx.set(user("joe"));
        assert_eq!(ctx.principal().as_deref(), Some("joe"));

        assert!(ctx.pop_frame(inner));
        assert_eq!(ctx.principal().as_deref(), Some("admin"));
        assert!(ctx.pop_frame(outer));
        assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
        assert!(!ctx.pop_frame(outer));
    }

    #[test]
    fn frames_can_leave_out_of_order() {
        let token = user("suzy");
        let ctx = SecurityContext::with_identity(token.clone());

        let first = ctx.push_frame(Some(user("admin")));
        let second = ctx.push_frame(Some(user("admin2")));

        assert!(ctx.pop_frame(first));
        assert_eq!(ctx.principal().as_deref(), Some("admin2"));
        assert!(ctx.pop_frame(second));
        assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let ctx = Arc::new(SecurityContext::with_identity(user("suzy")));
        let poisoner = ctx.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("poison the context lock");
        })
        .join();

        assert_eq!(ctx.principal().as_deref(), Some("suzy"));
        ctx.clear();
        assert!(!ctx.is_authenticated());
    }
}
