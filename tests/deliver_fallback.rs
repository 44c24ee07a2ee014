use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jobmail::deliver::{self, DeliveryRequest, Transport, TransportError};

struct StubTransport {
    name: &'static str,
    succeed: bool,
    calls: AtomicUsize,
}

impl StubTransport {
    fn new(name: &'static str, succeed: bool) -> Self {
        Self {
            name,
            succeed,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, _request: &DeliveryRequest) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(TransportError::Provider("stub failure".to_string()))
        }
    }
}

fn request() -> DeliveryRequest {
    DeliveryRequest {
        recipient: "hr@acme.io".to_string(),
        cc: None,
        subject: "Application".to_string(),
        body_html: "Hello".to_string(),
        attachment_path: None,
    }
}

#[tokio::test]
async fn primary_success_skips_the_fallback() {
    let primary = StubTransport::new("primary", true);
    let fallback = StubTransport::new("fallback", false);

    let delivered = deliver::attempt_delivery(&[&primary, &fallback], &request()).await;

    assert!(delivered);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0, "fallback must not be reached");
}

#[tokio::test]
async fn fallback_rescues_a_failing_primary() {
    let primary = StubTransport::new("primary", false);
    let fallback = StubTransport::new("fallback", true);

    let delivered = deliver::attempt_delivery(&[&primary, &fallback], &request()).await;

    assert!(delivered);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn exhausting_both_transports_reports_failure() {
    let primary = StubTransport::new("primary", false);
    let fallback = StubTransport::new("fallback", false);

    let delivered = deliver::attempt_delivery(&[&primary, &fallback], &request()).await;

    assert!(!delivered);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn transports_are_tried_exactly_once_each() {
    let primary = StubTransport::new("primary", false);
    let fallback = StubTransport::new("fallback", false);

    deliver::attempt_delivery(&[&primary, &fallback], &request()).await;
    deliver::attempt_delivery(&[&primary, &fallback], &request()).await;

    // Two delivery calls, one attempt per transport per call.
    assert_eq!(primary.calls(), 2);
    assert_eq!(fallback.calls(), 2);
}
