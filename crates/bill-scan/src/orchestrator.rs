use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bill_protocol::{ChainNotification, Notification, ScanNotification};
use bill_types::{ExtractedFields, RequestId, ScanRequest};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ScanError, ScanResult};
use crate::lane::OrderingLane;
use crate::state::CycleState;
use crate::traits::{BillLookup, FieldExtractor, Transport};

/// What happened to one extraction event.
#[derive(Debug)]
pub enum ScanOutcome {
    /// Same fields and flag as the last accepted request; nothing was sent.
    Suppressed,
    /// Fields failed validation; nothing was sent.
    Rejected(String),
    /// A scan notification was enqueued. `lookup` is the in-flight ledger
    /// check when blockchain checking was on.
    Dispatched {
        request: ScanRequest,
        lookup: Option<JoinHandle<()>>,
    },
}

/// Sequences extraction events into ordered transport notifications.
///
/// Cheap to clone; clones share the same state and ordering lane.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    lookup: Arc<dyn BillLookup>,
    extractor: Option<Arc<dyn FieldExtractor>>,
    lane: OrderingLane,
    shared: Mutex<Shared>,
}

/// Guarded together so that "is this request current" and "enqueue its
/// message" happen as one step.
struct Shared {
    current: Option<RequestId>,
    last_key: Option<String>,
    blockchain_check: bool,
    cycle: CycleState,
}

impl ScanOrchestrator {
    /// Must be called within a Tokio runtime; spawns the ordering lane.
    pub fn new(lookup: Arc<dyn BillLookup>, transport: Arc<dyn Transport>) -> Self {
        Self::build(lookup, None, transport)
    }

    pub fn with_extractor(
        lookup: Arc<dyn BillLookup>,
        extractor: Arc<dyn FieldExtractor>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::build(lookup, Some(extractor), transport)
    }

    fn build(
        lookup: Arc<dyn BillLookup>,
        extractor: Option<Arc<dyn FieldExtractor>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                lookup,
                extractor,
                lane: OrderingLane::spawn(transport),
                shared: Mutex::new(Shared {
                    current: None,
                    last_key: None,
                    blockchain_check: true,
                    cycle: CycleState::Idle,
                }),
            }),
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> CycleState {
        self.shared().cycle
    }

    pub fn blockchain_check(&self) -> bool {
        self.shared().blockchain_check
    }

    pub fn set_blockchain_check(&self, enabled: bool) {
        self.shared().blockchain_check = enabled;
    }

    /// The request whose lookup result would currently be delivered.
    pub fn current_request(&self) -> Option<RequestId> {
        self.shared().current
    }

    /// Handle one extraction event.
    pub fn on_extraction(&self, fields: &ExtractedFields) -> ScanOutcome {
        let fields = match fields.validate() {
            Ok(fields) => fields,
            Err(e) => {
                debug!(error = %e, "extraction rejected");
                return ScanOutcome::Rejected(e.to_string());
            }
        };

        let request = {
            let mut shared = self.shared();
            let key = fields.dedupe_key(shared.blockchain_check);
            if shared.last_key.as_deref() == Some(key.as_str()) {
                debug!(key = %key, "duplicate extraction suppressed");
                return ScanOutcome::Suppressed;
            }

            let request = ScanRequest::new(fields, shared.blockchain_check);
            shared.last_key = Some(key);
            shared.current = Some(request.id());

            let scan = Notification::Scan(ScanNotification::from_request(&request));
            if let Err(e) = self.inner.lane.enqueue(scan) {
                warn!(error = %e, "scan notification dropped");
            }
            // Without a ledger check the scan is the cycle's last message.
            shared.cycle = if request.blockchain_check() {
                CycleState::LedgerChecking
            } else {
                CycleState::Idle
            };
            request
        };

        info!(
            request = %request.id().short_id(),
            serial = request.serial(),
            check = request.blockchain_check(),
            "scan accepted"
        );

        if !request.blockchain_check() {
            return ScanOutcome::Dispatched {
                request,
                lookup: None,
            };
        }

        let lookup = tokio::spawn(self.clone().resolve(request.id(), request.serial().to_string()));
        ScanOutcome::Dispatched {
            request,
            lookup: Some(lookup),
        }
    }

    async fn resolve(self, id: RequestId, serial: String) {
        let result = self.inner.lookup.lookup(&serial).await;

        let mut shared = self.shared();
        if shared.current != Some(id) {
            warn!(
                request = %id.short_id(),
                serial = %serial,
                "dropping lookup result for superseded request"
            );
            return;
        }

        shared.cycle = CycleState::Notifying;
        let chain = Notification::Chain(ChainNotification::from_lookup(serial, &result));
        if let Err(e) = self.inner.lane.enqueue(chain) {
            warn!(error = %e, "chain notification dropped");
        }
        shared.cycle = CycleState::Idle;
    }

    /// Run one capture cycle on an image and wait for its notifications to
    /// be handed to the transport.
    pub async fn capture(&self, image: &[u8]) -> ScanResult<ScanOutcome> {
        let extractor = self.inner.extractor.clone().ok_or(ScanError::NoExtractor)?;

        self.set_cycle(CycleState::Capturing);
        self.set_cycle(CycleState::Extracting);
        let fields = match extractor.extract(image).await {
            Ok(fields) => fields,
            Err(e) => {
                self.set_cycle(CycleState::Idle);
                return Err(e);
            }
        };

        let outcome = match self.on_extraction(&fields) {
            ScanOutcome::Dispatched {
                request,
                lookup: Some(handle),
            } => {
                if let Err(e) = handle.await {
                    warn!(error = %e, "lookup task failed");
                }
                ScanOutcome::Dispatched {
                    request,
                    lookup: None,
                }
            }
            other => other,
        };

        self.inner.lane.flush().await?;
        self.set_cycle(CycleState::Idle);
        Ok(outcome)
    }

    /// Push the fixed test scan through the lane. Does not touch dedupe
    /// state or the current request.
    pub fn send_test_scan(&self) -> ScanResult<()> {
        let shared = self.shared();
        self.inner
            .lane
            .enqueue(Notification::Scan(ScanNotification::test_scan(
                shared.blockchain_check,
            )))
    }

    /// Wait until every notification enqueued so far has been delivered.
    pub async fn flush(&self) -> ScanResult<()> {
        self.inner.lane.flush().await
    }

    fn set_cycle(&self, cycle: CycleState) {
        self.shared().cycle = cycle;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::transport::ChannelTransport;
    use async_trait::async_trait;
    use bill_types::LookupResult;
    use tokio::sync::{mpsc, Notify};

    /// Answers from a fixed table; serials listed in `gates` wait for their
    /// `Notify` first.
    #[derive(Default)]
    struct ScriptedLookup {
        answers: HashMap<String, LookupResult>,
        gates: HashMap<String, Arc<Notify>>,
    }

    impl ScriptedLookup {
        fn answer(mut self, serial: &str, result: LookupResult) -> Self {
            self.answers.insert(serial.into(), result);
            self
        }

        fn gate(mut self, serial: &str, gate: Arc<Notify>) -> Self {
            self.gates.insert(serial.into(), gate);
            self
        }
    }

    #[async_trait]
    impl BillLookup for ScriptedLookup {
        async fn lookup(&self, serial: &str) -> LookupResult {
            if let Some(gate) = self.gates.get(serial) {
                gate.notified().await;
            }
            self.answers
                .get(serial)
                .cloned()
                .unwrap_or(LookupResult::NotIssued)
        }
    }

    struct FixedExtractor(ScanResult<ExtractedFields>);

    #[async_trait]
    impl FieldExtractor for FixedExtractor {
        async fn extract(&self, _image: &[u8]) -> ScanResult<ExtractedFields> {
            match &self.0 {
                Ok(fields) => Ok(fields.clone()),
                Err(e) => Err(ScanError::Extraction(e.to_string())),
            }
        }
    }

    fn orchestrator(lookup: ScriptedLookup) -> (ScanOrchestrator, mpsc::UnboundedReceiver<Notification>) {
        let (transport, rx) = ChannelTransport::new();
        (ScanOrchestrator::new(Arc::new(lookup), Arc::new(transport)), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    async fn settle(outcome: ScanOutcome) -> ScanRequest {
        match outcome {
            ScanOutcome::Dispatched { request, lookup } => {
                if let Some(handle) = lookup {
                    handle.await.unwrap();
                }
                request
            }
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    fn chain(n: &Notification) -> &ChainNotification {
        match n {
            Notification::Chain(c) => c,
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn scan_precedes_chain() {
        let hash = format!("0x{}", "ab".repeat(32));
        let (orch, mut rx) = orchestrator(ScriptedLookup::default().answer(
            "S1",
            LookupResult::Issued {
                hash: hash.clone(),
                issued_at: 42,
            },
        ));

        settle(orch.on_extraction(&ExtractedFields::new("S1", "usd", 10))).await;
        orch.flush().await.unwrap();

        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Notification::Scan(s) if s.currency == "USD" && s.blockchain_check));
        let c = chain(&sent[1]);
        assert!(c.ok && c.issued);
        assert_eq!(c.hash.as_deref(), Some(format!("{}...", &hash[..18]).as_str()));
        assert_eq!(c.issued_at, Some(42));
    }

    #[tokio::test]
    async fn identical_events_are_suppressed() {
        let (orch, mut rx) = orchestrator(ScriptedLookup::default());
        let fields = ExtractedFields::new("S1", "USD", 10);

        settle(orch.on_extraction(&fields)).await;
        assert!(matches!(orch.on_extraction(&fields), ScanOutcome::Suppressed));
        orch.flush().await.unwrap();
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn flag_change_is_a_new_request() {
        let (orch, mut rx) = orchestrator(ScriptedLookup::default());
        let fields = ExtractedFields::new("S1", "USD", 10);

        settle(orch.on_extraction(&fields)).await;
        orch.set_blockchain_check(false);
        let second = settle(orch.on_extraction(&fields)).await;
        assert!(!second.blockchain_check());
        orch.flush().await.unwrap();

        // scan + chain, then a lone scan.
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 3);
        assert!(matches!(&sent[2], Notification::Scan(s) if !s.blockchain_check));
    }

    #[tokio::test]
    async fn disabled_check_sends_only_scan() {
        let (orch, mut rx) = orchestrator(ScriptedLookup::default());
        orch.set_blockchain_check(false);
        match orch.on_extraction(&ExtractedFields::new("S1", "USD", 5)) {
            ScanOutcome::Dispatched { lookup, .. } => assert!(lookup.is_none()),
            other => panic!("unexpected {other:?}"),
        }
        orch.flush().await.unwrap();
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn invalid_fields_send_nothing() {
        let (orch, mut rx) = orchestrator(ScriptedLookup::default());
        let blank = ExtractedFields {
            serial: Some("  ".into()),
            ..ExtractedFields::new("", "USD", 10)
        };
        assert!(matches!(orch.on_extraction(&blank), ScanOutcome::Rejected(_)));
        assert!(matches!(
            orch.on_extraction(&ExtractedFields::new("S1", "USD", 0)),
            ScanOutcome::Rejected(_)
        ));
        orch.flush().await.unwrap();
        assert!(drain(&mut rx).is_empty());
        assert_eq!(orch.current_request(), None);
    }

    #[tokio::test]
    async fn superseded_lookup_is_dropped() {
        let gate = Arc::new(Notify::new());
        let (orch, mut rx) = orchestrator(
            ScriptedLookup::default()
                .gate("A1", gate.clone())
                .answer("B1", LookupResult::NotIssued),
        );

        let a = orch.on_extraction(&ExtractedFields::new("A1", "USD", 10));
        let b = settle(orch.on_extraction(&ExtractedFields::new("B1", "USD", 20))).await;
        assert_eq!(orch.current_request(), Some(b.id()));

        gate.notify_one();
        settle(a).await;
        orch.flush().await.unwrap();

        let sent = drain(&mut rx);
        let serials: Vec<(&str, &str)> = sent
            .iter()
            .map(|n| match n {
                Notification::Scan(s) => ("scan", s.serial.as_str()),
                Notification::Chain(c) => ("chain", c.serial.as_str()),
            })
            .collect();
        assert_eq!(serials, vec![("scan", "A1"), ("scan", "B1"), ("chain", "B1")]);
    }

    #[tokio::test]
    async fn failed_lookup_still_notifies() {
        let message = "HTTP 502: ".to_string() + &"x".repeat(80);
        let (orch, mut rx) = orchestrator(
            ScriptedLookup::default().answer("S1", LookupResult::failed(message)),
        );
        settle(orch.on_extraction(&ExtractedFields::new("S1", "USD", 1))).await;
        orch.flush().await.unwrap();

        let sent = drain(&mut rx);
        let c = chain(&sent[1]);
        assert!(!c.ok && !c.issued);
        let error = c.error.as_deref().unwrap();
        assert_eq!(error.chars().count(), 63);
        assert!(error.starts_with("HTTP 502: "));
    }

    #[tokio::test]
    async fn test_scan_leaves_dedupe_state_alone() {
        let (orch, mut rx) = orchestrator(ScriptedLookup::default());
        orch.set_blockchain_check(false);
        let fields = ExtractedFields::new("S1", "USD", 10);
        settle(orch.on_extraction(&fields)).await;
        let current = orch.current_request();

        orch.send_test_scan().unwrap();
        assert_eq!(orch.current_request(), current);
        assert!(matches!(orch.on_extraction(&fields), ScanOutcome::Suppressed));

        orch.flush().await.unwrap();
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[1],
            Notification::Scan(ScanNotification::test_scan(false))
        );
    }

    #[tokio::test]
    async fn capture_cycle_returns_to_idle() {
        let (transport, mut rx) = ChannelTransport::new();
        let orch = ScanOrchestrator::with_extractor(
            Arc::new(ScriptedLookup::default()),
            Arc::new(FixedExtractor(Ok(ExtractedFields::new("S1", "USD", 10)))),
            Arc::new(transport),
        );
        assert_eq!(orch.state(), CycleState::Idle);

        let outcome = orch.capture(b"jpeg").await.unwrap();
        assert!(matches!(outcome, ScanOutcome::Dispatched { .. }));
        assert_eq!(orch.state(), CycleState::Idle);
        // Both notifications are delivered by the time capture returns.
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn capture_extraction_failure_returns_to_idle() {
        let (transport, mut rx) = ChannelTransport::new();
        let orch = ScanOrchestrator::with_extractor(
            Arc::new(ScriptedLookup::default()),
            Arc::new(FixedExtractor(Err(ScanError::NoJsonObject))),
            Arc::new(transport),
        );
        assert!(matches!(
            orch.capture(b"jpeg").await,
            Err(ScanError::Extraction(_))
        ));
        assert_eq!(orch.state(), CycleState::Idle);
        orch.flush().await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn direct_extraction_returns_to_idle() {
        let gate = Arc::new(Notify::new());
        let (orch, _rx) = orchestrator(ScriptedLookup::default().gate("S1", gate.clone()));

        let pending = orch.on_extraction(&ExtractedFields::new("S1", "USD", 10));
        assert_eq!(orch.state(), CycleState::LedgerChecking);
        gate.notify_one();
        settle(pending).await;
        orch.flush().await.unwrap();
        assert_eq!(orch.state(), CycleState::Idle);

        orch.set_blockchain_check(false);
        settle(orch.on_extraction(&ExtractedFields::new("S2", "USD", 10))).await;
        orch.flush().await.unwrap();
        assert_eq!(orch.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn superseded_lookup_leaves_current_cycle_state() {
        let (gate_a, gate_b) = (Arc::new(Notify::new()), Arc::new(Notify::new()));
        let (orch, _rx) = orchestrator(
            ScriptedLookup::default()
                .gate("A1", gate_a.clone())
                .gate("B1", gate_b.clone()),
        );

        let a = orch.on_extraction(&ExtractedFields::new("A1", "USD", 10));
        let b = orch.on_extraction(&ExtractedFields::new("B1", "USD", 20));
        // Stale A finishes first; B is still checking.
        gate_a.notify_one();
        settle(a).await;
        assert_eq!(orch.state(), CycleState::LedgerChecking);

        gate_b.notify_one();
        settle(b).await;
        orch.flush().await.unwrap();
        assert_eq!(orch.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn capture_without_extractor() {
        let (orch, _rx) = orchestrator(ScriptedLookup::default());
        assert!(matches!(orch.capture(b"").await, Err(ScanError::NoExtractor)));
    }
}
