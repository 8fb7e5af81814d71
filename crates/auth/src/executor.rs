//! Run units of work as another principal.
//!
//! Every `run_as*` call follows the same sequence:
//!
//! 1. **Resolve** the identity to install. A failure here returns before the
//!    context is touched.
//! 2. **Swap**: push a frame holding the identity onto the context. The frame
//!    handle lives in a drop guard on the caller's stack.
//! 3. **Execute** the work.
//! 4. **Restore**: the guard pops its own frame when it is dropped, i.e. on
//!    return, on error, on panic, and when an async call is cancelled.
//!
//! Nested calls each own their frame, so an inner call uncovers the outer
//! call's identity, never the original one. When several threads share one
//! [`SecurityContext`], each thread removes only its own frame; once all of
//! them have exited the context shows what it held before any of them
//! started. No ordering between the threads is imposed.

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, Span, debug, debug_span, info, warn};
use uuid::Uuid;

use runas_core::{CoreResult, SystemSettings};

use crate::context::{FrameId, SecurityContext};
use crate::error::ResolutionError;
use crate::factory::AuthenticationFactory;
use crate::identity::Identity;
use crate::lookup::RoleLookup;
use crate::registry::NameLookup;

/// An installed frame, popped on drop.
struct ContextSwap<'a> {
    ctx: &'a SecurityContext,
    frame: FrameId,
}

impl<'a> ContextSwap<'a> {
    fn install(ctx: &'a SecurityContext, identity: Arc<Identity>) -> Self {
        let frame = ctx.push_frame(Some(identity));
        debug!(depth = ctx.depth(), "installed identity");
        Self { ctx, frame }
    }

    /// Pop this swap's frame. Returns `false` if it was already gone.
    fn restore(&self) -> bool {
        if !self.ctx.pop_frame(self.frame) {
            warn!(frame = ?self.frame, "frame already removed from security context");
            return false;
        }
        let restored = self.ctx.principal();
        debug!(
            restored = restored.as_deref(),
            depth = self.ctx.depth(),
            "restored identity"
        );
        true
    }
}

impl Drop for ContextSwap<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("work panicked; restoring security context");
        }
        self.restore();
    }
}

fn run_as_span(identity: &Identity) -> Span {
    debug_span!(
        "run_as",
        invocation = %Uuid::now_v7(),
        kind = %identity.kind(),
        principal = identity.principal(),
    )
}

fn log_resolution_failure(err: &ResolutionError) {
    warn!(error = %err, "identity resolution failed; context untouched");
}

/// Runs work as the system, the anonymous principal, or a named user.
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone)]
pub struct ImpersonationExecutor {
    factory: Arc<AuthenticationFactory>,
}

impl ImpersonationExecutor {
    pub fn new(factory: Arc<AuthenticationFactory>) -> Self {
        Self { factory }
    }

    pub fn from_settings(
        settings: &dyn SystemSettings,
        roles: Arc<dyn RoleLookup>,
        names: Arc<dyn NameLookup>,
    ) -> CoreResult<Self> {
        let factory = AuthenticationFactory::from_settings(settings, roles, names)?;
        Ok(Self::new(Arc::new(factory)))
    }

    pub fn factory(&self) -> &AuthenticationFactory {
        &self.factory
    }

    /// Run `work` with `identity` installed in `ctx`.
    pub fn run_as<T, E, F>(&self, ctx: &SecurityContext, identity: Identity, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let identity = Arc::new(identity);
        let span = run_as_span(&identity);
        let _entered = span.enter();
        let _swap = ContextSwap::install(ctx, identity);
        work()
    }

    pub fn run_as_system<T, E, F>(&self, ctx: &SecurityContext, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<ResolutionError>,
    {
        let identity = self
            .factory
            .system_identity()
            .inspect_err(log_resolution_failure)?;
        self.run_as(ctx, identity, work)
    }

    pub fn run_as_anonymous<T, E, F>(&self, ctx: &SecurityContext, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.run_as(ctx, self.factory.anonymous_identity(), work)
    }

    pub fn run_as_user<T, E, F>(&self, ctx: &SecurityContext, principal: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<ResolutionError>,
    {
        let identity = self
            .factory
            .create_authentication(principal)
            .inspect_err(log_resolution_failure)?;
        self.run_as(ctx, identity, work)
    }

    /// Async [`run_as`](Self::run_as). Dropping the returned future before it
    /// completes still restores the context.
    pub async fn run_as_async<T, E, Fut>(
        &self,
        ctx: &SecurityContext,
        identity: Identity,
        work: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let identity = Arc::new(identity);
        let span = run_as_span(&identity);
        let _swap = span.in_scope(|| ContextSwap::install(ctx, identity));
        work.instrument(span).await
    }

    pub async fn run_as_system_async<T, E, Fut>(&self, ctx: &SecurityContext, work: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<ResolutionError>,
    {
        let identity = self
            .factory
            .system_identity()
            .inspect_err(log_resolution_failure)?;
        self.run_as_async(ctx, identity, work).await
    }

    pub async fn run_as_anonymous_async<T, E, Fut>(&self, ctx: &SecurityContext, work: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_as_async(ctx, self.factory.anonymous_identity(), work)
            .await
    }

    pub async fn run_as_user_async<T, E, Fut>(
        &self,
        ctx: &SecurityContext,
        principal: &str,
        work: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<ResolutionError>,
    {
        let identity = self
            .factory
            .create_authentication(principal)
            .inspect_err(log_resolution_failure)?;
        self.run_as_async(ctx, identity, work).await
    }

    /// Install `principal` in `ctx` with no scoped restore.
    ///
    /// Returns the previous contents so the caller can put them back.
    pub fn become_user(
        &self,
        ctx: &SecurityContext,
        principal: &str,
    ) -> Result<Option<Arc<Identity>>, ResolutionError> {
        let identity = self
            .factory
            .create_authentication(principal)
            .inspect_err(log_resolution_failure)?;
        let previous = ctx.replace(Some(Arc::new(identity)));
        info!(principal, "became user");
        Ok(previous)
    }

    /// Whether the identity currently in `ctx` holds the administrator role.
    pub fn is_administrator(&self, ctx: &SecurityContext) -> bool {
        ctx.get()
            .is_some_and(|identity| self.factory.is_administrator(&identity))
    }
}
