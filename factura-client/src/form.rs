//! 开票表单工作流
//!
//! [`InvoiceForm`] owns everything the invoice screen works with: the form
//! state, the ticket selection table and details panel, the stamping status
//! poller and the paged invoice list. Failures are reported through the
//! injected [`Prompt`] and returned to the caller.

use shared::{Factura, FormData, Ticket, TicketDetalle, TicketFilter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::actions::InvoiceActions;
use crate::api::{Document, FacturaService, InvoiceBackend, StampStatusSource, TicketBackend};
use crate::lookup::{DebouncedLookup, LookupOutcome, TicketLookup};
use crate::pager::InvoicePager;
use crate::poller::{PollOutcome, PollState, StatusPoller};
use crate::prompt::Prompt;
use crate::submission::InvoiceSubmitter;
use crate::{ClientConfig, ClientError, ClientResult, TenantInfo};

/// What a successful submission did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub uuid: String,
    pub email_sent: bool,
    /// Invoices in the refreshed list, `None` if the refresh failed
    pub listed: Option<usize>,
}

/// Invoice creation workflow
pub struct InvoiceForm {
    form: FormData,
    tenant: TenantInfo,
    invoices: Arc<dyn InvoiceBackend>,
    lookup: TicketLookup,
    submitter: InvoiceSubmitter,
    actions: InvoiceActions,
    poller: StatusPoller,
    pager: InvoicePager,
    prompt: Arc<dyn Prompt>,
    /// Selection table when a search matched several tickets
    matches: Vec<Ticket>,
    /// Details panel
    selected: Option<Ticket>,
    find_attempts: u32,
    retry_base_delay: Duration,
    debounce: Duration,
}

impl InvoiceForm {
    pub fn new(
        config: &ClientConfig,
        invoices: Arc<dyn InvoiceBackend>,
        tickets: Arc<dyn TicketBackend>,
        stamps: Arc<dyn StampStatusSource>,
        prompt: Arc<dyn Prompt>,
    ) -> Self {
        Self {
            form: FormData::default(),
            tenant: config.tenant.clone(),
            lookup: TicketLookup::new(tickets),
            submitter: InvoiceSubmitter::new(invoices.clone(), config.tenant.empresa_id.clone()),
            actions: InvoiceActions::new(invoices.clone()),
            poller: StatusPoller::from_config(stamps, config),
            pager: InvoicePager::new(config.page_size),
            invoices,
            prompt,
            matches: Vec::new(),
            selected: None,
            find_attempts: config.find_attempts.max(1),
            retry_base_delay: config.retry_base_delay,
            debounce: config.debounce,
        }
    }

    /// Wire every seam to one HTTP service
    pub fn with_service(config: &ClientConfig, service: FacturaService, prompt: Arc<dyn Prompt>) -> Self {
        let service = Arc::new(service);
        Self::new(config, service.clone(), service.clone(), service, prompt)
    }

    // ========================================================================
    // Form state
    // ========================================================================

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormData {
        &mut self.form
    }

    pub fn tenant(&self) -> &TenantInfo {
        &self.tenant
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> ClientResult<()> {
        Ok(self.form.set_field(field, value)?)
    }

    /// Reset the form and stop following the previous invoice
    pub fn cancel(&mut self) {
        self.form.reset();
        self.matches.clear();
        self.selected = None;
        self.poller.stop();
    }

    fn report<T>(&self, context: &str, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result {
            tracing::error!(error = %e, "{} failed", context);
            self.prompt.alert(&format!("{context}: {e}"));
        }
        result
    }

    // ========================================================================
    // Ticket lookup
    // ========================================================================

    /// Search tickets and prefill the form
    ///
    /// No match alerts and leaves the form alone; one match prefills the
    /// form and opens the details panel; several fill the selection table.
    pub async fn lookup_ticket(&mut self, filter: &TicketFilter) -> ClientResult<LookupOutcome> {
        let result = self.lookup.lookup(filter).await;
        let outcome = self.report("Búsqueda de ticket", result)?;

        self.matches.clear();
        match &outcome {
            LookupOutcome::NotFound => {
                self.prompt
                    .alert("No se encontró ningún ticket con los datos proporcionados");
            }
            LookupOutcome::Single(ticket) => {
                self.apply_ticket(ticket.clone());
            }
            LookupOutcome::Multiple(tickets) => {
                self.selected = None;
                self.matches = tickets.clone();
            }
        }
        Ok(outcome)
    }

    /// Search-as-you-type over the same ticket backend
    ///
    /// Results are not applied to the form; pass the final filter to
    /// [`lookup_ticket`](Self::lookup_ticket) once the user settles.
    pub fn debounced_lookup(&self) -> DebouncedLookup {
        DebouncedLookup::new(self.lookup.clone(), self.debounce)
    }

    pub fn ticket_matches(&self) -> &[Ticket] {
        &self.matches
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.selected.as_ref()
    }

    /// Pick a row from the selection table
    pub fn select_ticket(&mut self, index: usize) -> ClientResult<&Ticket> {
        let ticket = self.matches.get(index).cloned().ok_or_else(|| {
            ClientError::Validation(format!(
                "ticket {index} out of range ({} matches)",
                self.matches.len()
            ))
        })?;
        self.matches.clear();
        Ok(self.apply_ticket(ticket))
    }

    fn apply_ticket(&mut self, ticket: Ticket) -> &Ticket {
        self.form.apply_ticket(&ticket);
        tracing::debug!(tienda = ?ticket.tienda, folio = ?ticket.folio, "Form prefilled from ticket");
        self.selected.insert(ticket)
    }

    /// Line items of the ticket in the details panel
    pub async fn ticket_detail(&self) -> ClientResult<TicketDetalle> {
        let id = self
            .selected
            .as_ref()
            .and_then(|t| t.id.clone())
            .ok_or_else(|| ClientError::Validation("no ticket selected".into()));
        let result = match id {
            Ok(id) => self.lookup.detail(&id).await,
            Err(e) => Err(e),
        };
        self.report("Detalle de ticket", result)
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Generate the invoice, follow its stamping and refresh the list
    ///
    /// On success the UUID is stored in the form, the poller starts, the
    /// invoice is emailed if the user agrees, and the list is refetched.
    pub async fn submit(&mut self) -> ClientResult<SubmitReport> {
        let result = self.submitter.submit(&self.form).await;
        let uuid = self.report("Generación de factura", result)?;
        self.form.assign_uuid(&uuid)?;
        self.poller.start(uuid.clone());

        let mut email_sent = false;
        let correo = self.form.correo_electronico.trim().to_string();
        if !correo.is_empty()
            && self
                .prompt
                .confirm(&format!("¿Enviar la factura {uuid} por correo a {correo}?"))
        {
            // Email failure does not undo the invoice
            email_sent = self.send_email(Some(&uuid), Some(&correo)).await.is_ok();
        }

        let listed = self.refresh_invoices().await.ok();
        Ok(SubmitReport {
            uuid,
            email_sent,
            listed,
        })
    }

    // ========================================================================
    // Stamping status
    // ========================================================================

    pub fn status_display(&self) -> Option<String> {
        self.poller.display()
    }

    pub fn status_state(&self) -> PollState {
        self.poller.state()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PollState> {
        self.poller.subscribe()
    }

    /// Follow an existing invoice's stamping
    pub fn watch_status(&mut self, uuid: Option<&str>) -> ClientResult<()> {
        let uuid = crate::actions::require_uuid(uuid.or(self.form.uuid()))?.to_string();
        self.poller.start(uuid);
        Ok(())
    }

    /// Wait until the current poll ends
    pub async fn wait_status(&mut self) -> Option<PollOutcome> {
        self.poller.wait().await
    }

    pub fn stop_status(&mut self) {
        self.poller.stop();
    }

    // ========================================================================
    // Invoice list
    // ========================================================================

    /// Refetch the whole invoice list of the tenant
    pub async fn refresh_invoices(&mut self) -> ClientResult<usize> {
        let empresa_id = self.tenant.empresa_id.clone();
        let result = self.invoices.consultar_por_empresa(empresa_id.as_deref()).await;
        let facturas = self.report("Consulta de facturas", result)?;
        self.pager.load(facturas);
        tracing::debug!(total = self.pager.total(), "Invoice list refreshed");
        Ok(self.pager.total())
    }

    /// Look for a just-created invoice, refetching while the backend
    /// catches up (delay grows by `retry_base_delay` per attempt)
    pub async fn find_invoice(&mut self, uuid: &str) -> ClientResult<Option<Factura>> {
        for attempt in 1..=self.find_attempts {
            self.refresh_invoices().await?;
            if let Some(found) = self.pager.find(uuid) {
                return Ok(Some(found.clone()));
            }
            if attempt < self.find_attempts {
                tracing::debug!(uuid = %uuid, attempt, "Invoice not listed yet, retrying");
                tokio::time::sleep(self.retry_base_delay * attempt).await;
            }
        }
        tracing::warn!(uuid = %uuid, attempts = self.find_attempts, "Invoice not found in list");
        Ok(None)
    }

    pub fn pager(&self) -> &InvoicePager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut InvoicePager {
        &mut self.pager
    }

    // ========================================================================
    // Post-generation actions
    // ========================================================================

    /// `uuid` of a list row, or the form's own invoice when `None`
    pub async fn download_pdf(&self, uuid: Option<&str>) -> ClientResult<Document> {
        let result = self.actions.download_pdf(uuid.or(self.form.uuid())).await;
        self.report("Descarga de PDF", result)
    }

    pub async fn download_xml(&self, uuid: Option<&str>) -> ClientResult<Document> {
        let result = self.actions.download_xml(uuid.or(self.form.uuid())).await;
        self.report("Descarga de XML", result)
    }

    /// Email an invoice; the address defaults to the form's
    pub async fn send_email(&self, uuid: Option<&str>, to: Option<&str>) -> ClientResult<()> {
        let to = to.or(Some(self.form.correo_electronico.as_str()));
        let result = self.actions.send_email(uuid.or(self.form.uuid()), to).await;
        self.report("Envío de correo", result)
    }
}
