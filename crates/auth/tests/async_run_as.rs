//! Async run-as: restore on completion, failure and cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use runas_auth::{IdentityKind, ResolutionError, SecurityContext};

use common::{executor, token};

#[tokio::test]
async fn async_run_as_user_restores_after_completion() {
    let exec = executor();
    let token = token();
    let ctx = SecurityContext::with_identity(token.clone());

    let principal = exec
        .run_as_user_async(&ctx, "admin", async {
            tokio::task::yield_now().await;
            Ok::<_, ResolutionError>(ctx.principal())
        })
        .await
        .unwrap();

    assert_eq!(principal.as_deref(), Some("admin"));
    assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
}

#[tokio::test]
async fn async_failure_restores_and_propagates() {
    let exec = executor();
    let token = token();
    let ctx = SecurityContext::with_identity(token.clone());

    let err = exec
        .run_as_system_async(&ctx, async { Err::<(), _>(anyhow::anyhow!("query failed")) })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "query failed");
    assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
}

#[tokio::test]
async fn cancelled_work_still_restores() {
    let exec = executor();
    let token = token();
    let ctx = SecurityContext::with_identity(token.clone());
    let (seen_tx, seen_rx) = oneshot::channel();

    let run = exec.run_as_anonymous_async(&ctx, async {
        let _ = seen_tx.send(ctx.get().map(|i| i.kind()));
        std::future::pending::<()>().await;
        Ok::<_, ResolutionError>(())
    });

    let timed_out = tokio::time::timeout(Duration::from_millis(20), run).await;

    assert!(timed_out.is_err());
    assert_eq!(seen_rx.await.unwrap(), Some(IdentityKind::Anonymous));
    assert!(Arc::ptr_eq(&ctx.get().unwrap(), &token));
    assert_eq!(ctx.depth(), 0);
}

#[tokio::test]
async fn nested_async_calls_restore_in_order() {
    let exec = executor();
    let ctx = SecurityContext::new();

    let outcome: anyhow::Result<()> = exec
        .run_as_system_async(&ctx, async {
            let inner: anyhow::Result<()> = exec
                .run_as_user_async(&ctx, "suzy", async {
                    assert_eq!(ctx.principal().as_deref(), Some("suzy"));
                    anyhow::bail!("inner failure")
                })
                .await;
            assert!(inner.is_err());
            assert_eq!(ctx.principal().as_deref(), Some("admin"));
            Ok(())
        })
        .await;

    assert!(outcome.is_ok());
    assert!(ctx.get().is_none());
}
