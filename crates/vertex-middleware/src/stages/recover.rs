//! Panic recovery.

use crate::middleware::{Middleware, Next};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// Converts a panic anywhere downstream into a general failure.
///
/// The panic message is logged at error level. The client only sees the
/// opaque incident message produced by the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoRecover;

impl Middleware for AutoRecover {
    fn name(&self) -> &'static str {
        "auto_recover"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            match AssertUnwindSafe(next.run(&mut *w, &mut *req))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        request_id = %req.request_id(),
                        path = %req.path(),
                        panic = %message,
                        "caught panic"
                    );
                    Err(ApiError::general(format!(
                        "PANIC handling {}: {}",
                        req.path(),
                        message
                    )))
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::middleware::middleware_fn;
    use bytes::Bytes;
    use vertex_core::{ErrorKind, Reply};

    async fn run(chain: &Chain) -> HandlerResult {
        let request = http::Request::builder()
            .uri("/boom")
            .body(Bytes::new())
            .unwrap();
        let mut req = RequestContext::from_request(request, None);
        let mut w = ResponseWriter::new();
        chain.handle(&mut w, &mut req).await
    }

    fn explode() -> HandlerResult {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_panic_becomes_general_failure() {
        let chain = Chain::builder()
            .with(AutoRecover)
            .terminal(middleware_fn("boom", |_w, _req, _next| {
                Box::pin(async { explode() })
            }))
            .build();

        let err = run(&chain).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GeneralFailure);
        assert_eq!(err.to_string(), "PANIC handling /boom: kaboom");
    }

    #[tokio::test]
    async fn test_passes_through_results() {
        let chain = Chain::builder()
            .with(AutoRecover)
            .terminal(middleware_fn("ok", |_w, _req, _next| {
                Box::pin(async { Ok(Reply::text("fine")) })
            }))
            .build();

        assert_eq!(run(&chain).await.unwrap(), Reply::text("fine"));
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
