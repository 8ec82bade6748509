//! Subcommand handlers

use anyhow::{Context, Result, bail};
use factura_client::{
    ClientConfig, Document, FacturaService, InvoiceForm, LookupOutcome, PollOutcome,
    StampStatusSource, TicketFilter,
};
use serde_json::Value;
use shared::util::value_to_string;
use shared::{Factura, Ticket, TicketDetalle};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::prompt::StdinPrompt;

/// Ticket filter flags shared by `tickets` and `generate`
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TicketArgs {
    /// Store code
    #[arg(long)]
    pub tienda: Option<String>,
    /// Ticket date (YYYY-MM-DD)
    #[arg(long)]
    pub fecha: Option<String>,
    /// POS terminal
    #[arg(long)]
    pub terminal: Option<String>,
    /// Ticket number (boleta)
    #[arg(long)]
    pub folio: Option<String>,
}

impl TicketArgs {
    pub fn to_filter(&self) -> TicketFilter {
        let mut filter = TicketFilter::new();
        if let Some(v) = &self.tienda {
            filter = filter.with_tienda(v);
        }
        if let Some(v) = &self.fecha {
            filter = filter.with_fecha(v);
        }
        if let Some(v) = &self.terminal {
            filter = filter.with_terminal(v);
        }
        if let Some(v) = &self.folio {
            filter = filter.with_folio(v);
        }
        filter
    }
}

fn new_form(config: &ClientConfig, assume_yes: bool) -> Result<InvoiceForm> {
    let service = config
        .build_service()
        .context("invalid backend configuration")?;
    Ok(InvoiceForm::with_service(
        config,
        service,
        Arc::new(StdinPrompt::new(assume_yes)),
    ))
}

// ============================================================================
// tickets
// ============================================================================

pub async fn tickets(config: &ClientConfig, args: &TicketArgs, pick: Option<usize>, detail: bool) -> Result<()> {
    let mut form = new_form(config, false)?;
    match form.lookup_ticket(&args.to_filter()).await? {
        LookupOutcome::NotFound => return Ok(()),
        LookupOutcome::Single(ticket) => print_ticket(&ticket),
        LookupOutcome::Multiple(tickets) => {
            print_ticket_table(&tickets);
            match pick {
                Some(index) => {
                    let ticket = form.select_ticket(index)?;
                    println!();
                    print_ticket(ticket);
                }
                None => return Ok(()),
            }
        }
    }

    if detail {
        let detalle = form.ticket_detail().await?;
        print_detalle(&detalle);
    }
    Ok(())
}

// ============================================================================
// generate
// ============================================================================

pub struct GenerateArgs {
    pub form: Option<String>,
    pub ticket: TicketArgs,
    pub pick: Option<usize>,
    pub watch: bool,
    pub assume_yes: bool,
}

pub async fn generate(config: &ClientConfig, args: GenerateArgs) -> Result<()> {
    let mut form = new_form(config, args.assume_yes)?;

    let filter = args.ticket.to_filter();
    if !filter.is_empty() {
        match form.lookup_ticket(&filter).await? {
            LookupOutcome::NotFound => bail!("no ticket matches the given filters"),
            LookupOutcome::Single(ticket) => print_ticket(&ticket),
            LookupOutcome::Multiple(tickets) => {
                let Some(index) = args.pick else {
                    print_ticket_table(&tickets);
                    bail!("{} tickets match, choose one with --pick", tickets.len());
                };
                let ticket = form.select_ticket(index)?;
                print_ticket(ticket);
            }
        }
    }

    // Explicit fields override the ticket prefill
    if let Some(source) = &args.form {
        for (field, value) in read_form_fields(source)? {
            form.set_field(&field, &value)
                .with_context(|| format!("form field {field}"))?;
        }
    }

    let report = form.submit().await?;
    println!("UUID: {}", report.uuid);
    if report.email_sent {
        println!("Correo enviado a {}", form.form().correo_electronico);
    }
    if let Some(total) = report.listed {
        println!("Facturas registradas: {total}");
    }

    if args.watch {
        follow_status(&mut form).await;
    } else if let Some(display) = form.status_display() {
        println!("Estatus: {display}");
    }
    Ok(())
}

/// Form fields from a JSON object, read from a file or `-` for stdin
pub fn read_form_fields(source: &str) -> Result<Vec<(String, String)>> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading form from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading form file {source}"))?
    };
    parse_form_fields(&text)
}

fn parse_form_fields(text: &str) -> Result<Vec<(String, String)>> {
    let value: Value = serde_json::from_str(text).context("form is not valid JSON")?;
    let Value::Object(obj) = value else {
        bail!("form must be a JSON object");
    };
    Ok(obj
        .iter()
        .filter_map(|(k, v)| value_to_string(v).map(|s| (k.clone(), s)))
        .collect())
}

// ============================================================================
// status
// ============================================================================

pub async fn status(config: &ClientConfig, uuid: &str, watch: bool) -> Result<()> {
    if !watch {
        let service = FacturaService::new(config)?;
        let resp = service.stamp_status(uuid).await?;
        match resp.display() {
            Some(display) => println!("{display}"),
            None => println!("sin estatus"),
        }
        return Ok(());
    }

    let mut form = new_form(config, false)?;
    form.watch_status(Some(uuid))?;
    follow_status(&mut form).await;
    Ok(())
}

/// Print every status change until the poll ends
async fn follow_status(form: &mut InvoiceForm) {
    let mut rx = form.subscribe_status();
    let printer = tokio::spawn(async move {
        let mut last: Option<String> = None;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.finished {
                break;
            }
            if state.display.is_some() && state.display != last {
                if let Some(display) = &state.display {
                    println!("Estatus: {display}");
                }
                last = state.display;
            }
        }
    });

    let outcome = form.wait_status().await;
    printer.abort();

    match outcome {
        Some(PollOutcome::Terminal(_)) => {
            if let Some(display) = form.status_display() {
                println!("Estatus final: {display}");
            }
        }
        Some(PollOutcome::Exhausted { attempts }) => {
            println!("Sin estatus final tras {attempts} consultas");
        }
        Some(PollOutcome::Cancelled) | None => println!("Seguimiento cancelado"),
    }
}

// ============================================================================
// list
// ============================================================================

pub async fn list(config: &ClientConfig, page: usize) -> Result<()> {
    let mut form = new_form(config, false)?;
    form.refresh_invoices().await?;
    let pager = form.pager_mut();
    pager.go_to(page);

    print_invoice_table(pager.rows());
    let buttons: Vec<String> = pager
        .page_buttons()
        .into_iter()
        .map(|p| if p == pager.page() { format!("[{p}]") } else { p.to_string() })
        .collect();
    println!(
        "{} {} {}   ({} facturas, página {} de {})",
        if pager.has_prev() { "<" } else { " " },
        buttons.join(" "),
        if pager.has_next() { ">" } else { " " },
        pager.total(),
        pager.page(),
        pager.total_pages()
    );
    Ok(())
}

// ============================================================================
// pdf / xml / email
// ============================================================================

pub async fn pdf(config: &ClientConfig, uuid: &str, out: Option<&Path>) -> Result<()> {
    let form = new_form(config, false)?;
    let doc = form.download_pdf(Some(uuid)).await?;
    let path = save_document(&doc, out)?;
    println!("{}", path.display());
    Ok(())
}

pub async fn xml(config: &ClientConfig, uuid: &str, out: Option<&Path>) -> Result<()> {
    let form = new_form(config, false)?;
    let doc = form.download_xml(Some(uuid)).await?;
    let path = save_document(&doc, out)?;
    println!("{}", path.display());
    Ok(())
}

pub async fn email(config: &ClientConfig, uuid: &str, to: &str) -> Result<()> {
    let form = new_form(config, false)?;
    form.send_email(Some(uuid), Some(to)).await?;
    println!("Factura {uuid} enviada a {to}");
    Ok(())
}

/// `out` may be a directory (keeps the server file name) or a file path
pub fn save_document(doc: &Document, out: Option<&Path>) -> Result<PathBuf> {
    let path = match out {
        None => doc.save_in(Path::new("."))?,
        Some(dir) if dir.is_dir() => doc.save_in(dir)?,
        Some(file) => {
            std::fs::write(file, &doc.bytes)
                .with_context(|| format!("writing {}", file.display()))?;
            file.to_path_buf()
        }
    };
    Ok(path)
}

// ============================================================================
// Rendering
// ============================================================================

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_ticket(ticket: &Ticket) {
    println!("Ticket {}", opt(&ticket.id));
    println!("  Tienda:     {}", opt(&ticket.tienda));
    println!("  Fecha:      {}", opt(&ticket.fecha));
    println!("  Terminal:   {}", opt(&ticket.terminal));
    println!("  Boleta:     {}", opt(&ticket.folio));
    println!("  Forma pago: {}", opt(&ticket.forma_pago));
    if let Some(total) = ticket.total {
        println!("  Total:      {total}");
    }
    if ticket.is_invoiced() {
        println!("  Facturado:  {}", opt(&ticket.id_factura));
    }
}

fn print_ticket_table(tickets: &[Ticket]) {
    println!("{:>3}  {:<8} {:<12} {:<8} {:<10} {:>10}", "#", "TIENDA", "FECHA", "TERM", "BOLETA", "TOTAL");
    for (i, t) in tickets.iter().enumerate() {
        println!(
            "{:>3}  {:<8} {:<12} {:<8} {:<10} {:>10}",
            i,
            opt(&t.tienda),
            opt(&t.fecha),
            opt(&t.terminal),
            opt(&t.folio),
            t.total.map(|d| d.to_string()).unwrap_or_default()
        );
    }
}

fn print_detalle(detalle: &TicketDetalle) {
    println!("{:<10} {:<30} {:>8} {:>10} {:>10}", "CODIGO", "DESCRIPCION", "CANT", "PRECIO", "IMPORTE");
    for l in &detalle.conceptos {
        println!(
            "{:<10} {:<30} {:>8} {:>10} {:>10}",
            opt(&l.codigo),
            opt(&l.descripcion),
            l.cantidad.map(|d| d.to_string()).unwrap_or_default(),
            l.precio_unitario.map(|d| d.to_string()).unwrap_or_default(),
            l.importe.map(|d| d.to_string()).unwrap_or_default()
        );
    }
}

fn print_invoice_table(rows: &[Factura]) {
    if rows.is_empty() {
        println!("Sin facturas");
        return;
    }
    println!("{:<38} {:<20} {:<8} {:<15} {:>10}", "UUID", "FECHA", "TIENDA", "RFC", "TOTAL");
    for f in rows {
        println!(
            "{:<38} {:<20} {:<8} {:<15} {:>10}",
            f.uuid,
            f.best_date().map(|d| d.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
            opt(&f.tienda),
            opt(&f.receptor_rfc),
            f.total.map(|d| d.to_string()).unwrap_or_default()
        );
    }
}
