//! Ticket lookup
//!
//! Finds the POS ticket an invoice is issued for. Matching is entirely the
//! ticket service's job; results keep the order it returns.

use shared::{Ticket, TicketDetalle, TicketFilter};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::TicketBackend;
use crate::{ClientConfig, ClientError, ClientResult};

/// Result of a ticket search
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    NotFound,
    Single(Ticket),
    /// Shown as a selection table
    Multiple(Vec<Ticket>),
}

impl LookupOutcome {
    pub fn from_tickets(mut tickets: Vec<Ticket>) -> Self {
        match tickets.len() {
            0 => Self::NotFound,
            1 => Self::Single(tickets.remove(0)),
            _ => Self::Multiple(tickets),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::NotFound => 0,
            Self::Single(_) => 1,
            Self::Multiple(tickets) => tickets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Ticket search and detail over a [`TicketBackend`]
#[derive(Clone)]
pub struct TicketLookup {
    backend: Arc<dyn TicketBackend>,
}

impl TicketLookup {
    pub fn new(backend: Arc<dyn TicketBackend>) -> Self {
        Self { backend }
    }

    pub async fn lookup(&self, filter: &TicketFilter) -> ClientResult<LookupOutcome> {
        let tickets = self.backend.buscar(filter).await?;
        tracing::debug!(matches = tickets.len(), ?filter, "Ticket search finished");
        Ok(LookupOutcome::from_tickets(tickets))
    }

    pub async fn detail(&self, ticket_id: &str) -> ClientResult<TicketDetalle> {
        let ticket_id = ticket_id.trim();
        if ticket_id.is_empty() {
            return Err(ClientError::Validation("ticket id is empty".into()));
        }
        self.backend.detalle(ticket_id).await
    }
}

/// Search-as-you-type lookup
///
/// Each call waits out the debounce delay first. A newer call cancels the
/// older one, which then resolves to `None` and never reports a result.
pub struct DebouncedLookup {
    lookup: TicketLookup,
    delay: Duration,
    current: Mutex<Option<CancellationToken>>,
}

impl DebouncedLookup {
    pub fn new(lookup: TicketLookup, delay: Duration) -> Self {
        Self {
            lookup,
            delay,
            current: Mutex::new(None),
        }
    }

    /// Debounce delay from `config.debounce`
    pub fn from_config(lookup: TicketLookup, config: &ClientConfig) -> Self {
        Self::new(lookup, config.debounce)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// `None` when superseded by a later call
    pub async fn search(&self, filter: TicketFilter) -> Option<ClientResult<LookupOutcome>> {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return None,
            _ = tokio::time::sleep(self.delay) => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(?filter, "Ticket search superseded");
                return None;
            }
            r = self.lookup.lookup(&filter) => r,
        };
        Some(result)
    }

    /// Drop any pending search
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().unwrap_or_else(|e| e.into_inner()).take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTickets {
        tickets: Vec<Ticket>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TicketBackend for FakeTickets {
        async fn buscar(&self, filter: &TicketFilter) -> ClientResult<Vec<Ticket>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .tickets
                .iter()
                .filter(|t| filter.folio.is_none() || t.folio == filter.folio)
                .cloned()
                .collect())
        }

        async fn detalle(&self, _ticket_id: &str) -> ClientResult<TicketDetalle> {
            Ok(TicketDetalle::default())
        }
    }

    fn ticket(folio: &str) -> Ticket {
        Ticket {
            tienda: Some("S1".into()),
            folio: Some(folio.into()),
            ..Default::default()
        }
    }

    fn backend() -> Arc<FakeTickets> {
        Arc::new(FakeTickets {
            tickets: vec![ticket("100"), ticket("101"), ticket("100")],
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_outcome_from_tickets() {
        assert_eq!(LookupOutcome::from_tickets(vec![]), LookupOutcome::NotFound);
        assert_eq!(
            LookupOutcome::from_tickets(vec![ticket("1")]),
            LookupOutcome::Single(ticket("1"))
        );
        let many = LookupOutcome::from_tickets(vec![ticket("1"), ticket("2")]);
        assert_eq!(many.len(), 2);
        assert!(!many.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_keeps_backend_order() {
        let lookup = TicketLookup::new(backend());
        let outcome = lookup
            .lookup(&TicketFilter::new().with_folio("100"))
            .await
            .unwrap();
        assert_eq!(outcome.len(), 2);

        let outcome = lookup.lookup(&TicketFilter::new()).await.unwrap();
        match outcome {
            LookupOutcome::Multiple(tickets) => {
                let folios: Vec<_> = tickets.iter().map(|t| t.folio.as_deref().unwrap()).collect();
                assert_eq!(folios, vec!["100", "101", "100"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_detail_requires_id() {
        let lookup = TicketLookup::new(backend());
        assert!(matches!(
            lookup.detail(" ").await,
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_discards_superseded_search() {
        let backend = backend();
        let debounced = DebouncedLookup::new(
            TicketLookup::new(backend.clone()),
            Duration::from_millis(400),
        );

        let first = debounced.search(TicketFilter::new().with_folio("10"));
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debounced.search(TicketFilter::new().with_folio("101")).await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_none());
        let outcome = second.unwrap().unwrap();
        assert_eq!(outcome, LookupOutcome::Single(ticket("101")));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_uses_debounce_setting() {
        let backend = backend();
        let config = ClientConfig::default().with_debounce(Duration::from_millis(250));
        let debounced = DebouncedLookup::from_config(TicketLookup::new(backend.clone()), &config);
        assert_eq!(debounced.delay(), Duration::from_millis(250));

        let started = tokio::time::Instant::now();
        let outcome = debounced
            .search(TicketFilter::new().with_folio("101"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, LookupOutcome::Single(ticket("101")));
        assert!(started.elapsed() >= Duration::from_millis(250));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_search() {
        let backend = backend();
        let debounced = DebouncedLookup::new(
            TicketLookup::new(backend.clone()),
            Duration::from_millis(400),
        );

        let search = debounced.search(TicketFilter::new().with_folio("100"));
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            debounced.cancel();
        };
        let (result, _) = tokio::join!(search, cancel);

        assert!(result.is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
