//! factura — command line front end for the CFDI invoicing backend
//!
//! Looks up POS tickets, generates invoices, follows PAC stamping and
//! handles the PDF/XML/email actions. Configuration comes from `FACTURA_*`
//! environment variables (a `.env` file is loaded first).

mod commands;
mod logger;
mod prompt;

use clap::{Parser, Subcommand};
use factura_client::ClientConfig;
use std::path::PathBuf;

use commands::{GenerateArgs, TicketArgs};

#[derive(Parser)]
#[command(name = "factura", version, about = "CFDI invoicing client")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "FACTURA_API_URL")]
    api_url: Option<String>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this directory, rolled daily
    #[arg(long, global = true, env = "FACTURA_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Search POS tickets
    Tickets {
        #[command(flatten)]
        filter: TicketArgs,
        /// Row to select when several tickets match
        #[arg(long)]
        pick: Option<usize>,
        /// Show the ticket line items
        #[arg(long)]
        detail: bool,
    },
    /// Generate an invoice
    Generate {
        /// JSON object with form fields (file path, or - for stdin)
        #[arg(long)]
        form: Option<String>,
        /// Prefill the form from this ticket
        #[command(flatten)]
        ticket: TicketArgs,
        /// Row to use when several tickets match
        #[arg(long)]
        pick: Option<usize>,
        /// Follow the stamping status until it is final
        #[arg(long)]
        watch: bool,
        /// Answer yes to confirmations (email the invoice)
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the PAC stamping status of an invoice
    Status {
        uuid: String,
        /// Keep polling until a final status
        #[arg(long)]
        watch: bool,
    },
    /// List the tenant's invoices
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Download the invoice PDF
    Pdf {
        uuid: String,
        /// Output file or directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Download the invoice XML
    Xml {
        uuid: String,
        /// Output file or directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Email the invoice
    Email {
        uuid: String,
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.log_dir.as_deref());

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    tracing::debug!(base_url = %config.base_url, pac_url = %config.pac_url(), "Configuration loaded");

    match cli.cmd {
        Cmd::Tickets { filter, pick, detail } => commands::tickets(&config, &filter, pick, detail).await,
        Cmd::Generate {
            form,
            ticket,
            pick,
            watch,
            yes,
        } => {
            commands::generate(
                &config,
                GenerateArgs {
                    form,
                    ticket,
                    pick,
                    watch,
                    assume_yes: yes,
                },
            )
            .await
        }
        Cmd::Status { uuid, watch } => commands::status(&config, &uuid, watch).await,
        Cmd::List { page } => commands::list(&config, page).await,
        Cmd::Pdf { uuid, out } => commands::pdf(&config, &uuid, out.as_deref()).await,
        Cmd::Xml { uuid, out } => commands::xml(&config, &uuid, out.as_deref()).await,
        Cmd::Email { uuid, to } => commands::email(&config, &uuid, &to).await,
    }
}
