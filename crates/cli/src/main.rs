//! `stockroom`: command-line front end for the inventory backend.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use stockroom_client::config::{
    parse_timeout, API_URL_ENV, AUTH_TOKEN_ENV, DEFAULT_API_URL, TIMEOUT_ENV,
};
use stockroom_client::ClientConfig;
use stockroom_core::{ItemId, SupplierId};
use stockroom_inventory::TransactionType;

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(version, about = "Inventory dashboard client")]
struct Cli {
    /// Backend API base URL
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = TIMEOUT_ENV, default_value = "30")]
    timeout: String,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = AUTH_TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Sign in as this user when no session exists
    #[arg(short, long, global = true, env = "STOCKROOM_USERNAME")]
    username: Option<String>,

    #[arg(short, long, global = true, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the signed-in user
    Whoami,
    /// Summary cards and recent transactions
    Dashboard,
    #[command(subcommand)]
    Items(ItemsCommand),
    #[command(subcommand)]
    Suppliers(SuppliersCommand),
    #[command(subcommand)]
    Transactions(TransactionsCommand),
}

#[derive(Args, Debug, Clone, Copy)]
struct PageArgs {
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long, default_value_t = stockroom_client::views::DEFAULT_ROWS_PER_PAGE)]
    page_size: usize,
}

#[derive(Subcommand, Debug)]
enum ItemsCommand {
    List {
        /// Filter by name or SKU
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        supplier: Option<SupplierId>,
        #[command(flatten)]
        paging: PageArgs,
    },
    Add(ItemFields),
    Update {
        id: ItemId,
        #[command(flatten)]
        fields: ItemUpdate,
    },
    Delete {
        id: ItemId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Download the CSV export
    Export {
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ItemFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    sku: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value_t = 0)]
    quantity: i64,
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    supplier: SupplierId,
    #[arg(long, default_value_t = stockroom_inventory::DEFAULT_THRESHOLD)]
    threshold: i64,
}

#[derive(Args, Debug)]
struct ItemUpdate {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    sku: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    supplier: Option<SupplierId>,
    #[arg(long)]
    threshold: Option<i64>,
}

#[derive(Subcommand, Debug)]
enum SuppliersCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    Add(SupplierFields),
    Update {
        id: SupplierId,
        #[command(flatten)]
        fields: SupplierUpdate,
    },
    Delete {
        id: SupplierId,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct SupplierFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    contact_person: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    address: String,
}

#[derive(Args, Debug)]
struct SupplierUpdate {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    contact_person: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Subcommand, Debug)]
enum TransactionsCommand {
    List {
        #[arg(long)]
        item: Option<ItemId>,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Record a stock movement
    Add {
        #[arg(long)]
        item: ItemId,
        #[arg(long)]
        quantity: i64,
        #[arg(long = "type", default_value = "IN")]
        transaction_type: TransactionType,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.api_url)
            .with_context(|| format!("invalid --api-url {}", self.api_url))?
            .with_timeout(parse_timeout(&self.timeout).context("invalid --timeout")?);
        if let Some(token) = &self.token {
            config = config.with_bearer_token(token.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    stockroom_observability::init();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    tracing::debug!(api_url = %config.api_base_url, "starting");

    commands::run(cli, &config).await
}
