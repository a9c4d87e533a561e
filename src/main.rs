//! Finance Advisor CLI
//!
//! Command-line front end for enrichment reconciliation and savings projections.
//! API settings come from FINANCE_API_URL, FINANCE_API_TIMEOUT_SECS and
//! FINANCE_API_LIST_LIMIT; --api-url, --timeout-secs and --list-limit
//! take precedence.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use finance_advisor::{
    client::{FinanceApi, HttpFinanceApi, TransactionQuery},
    config::ClientConfig,
    enrichment::{EnrichmentCoordinator, EnrichmentSnapshot},
    projection::{project, sweep_rates, write_series_csv, ProjectionParameters, ProjectionResult},
    transactions::{load_transactions, NewTransaction, TransactionRecord, DEFAULT_ACCOUNT_ID},
};
use std::collections::HashSet;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

/// Cents of slack allowed between the local and server projections
const AGREEMENT_TOLERANCE: f64 = 0.01;

#[derive(Parser)]
#[command(name = "finance-advisor")]
#[command(about = "Transaction enrichment and savings projections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

/// Backend settings; each overrides its environment variable
#[derive(Args)]
struct ConnectionArgs {
    /// Base URL of the finance API
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<f64>,
    /// Rows requested when listing transactions
    #[arg(long, global = true)]
    list_limit: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Project the value of investing a recurring spend instead.
    Project {
        /// Price of one occurrence
        #[arg(long)]
        price_each: String,
        /// Occurrences per week
        #[arg(long)]
        per_week: String,
        /// Horizon in whole years
        #[arg(long, default_value = "10")]
        years: String,
        /// Annual growth rate as a decimal
        #[arg(long, default_value = "0.07")]
        annual_rate: String,
        /// Write the yearly series to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Also project at each of these annual rates
        #[arg(long, value_delimiter = ',')]
        compare_rates: Vec<f64>,
        /// Cross-check against the server's /simulate/coffee
        #[arg(long)]
        remote: bool,
    },

    /// List transactions and reconcile their enrichment.
    Enrich {
        /// Free-text search
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Recompute enrichment for one listed transaction.
    Categorize {
        #[arg(long)]
        id: i64,
    },

    /// Create a transaction.
    Add {
        /// Booking date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        description: String,
        /// Signed amount: negative for spend
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        #[arg(long, default_value_t = DEFAULT_ACCOUNT_ID)]
        account_id: i64,
        #[arg(long)]
        merchant: Option<String>,
        /// Categorize right after creating
        #[arg(long)]
        enrich: bool,
    },

    /// Create every transaction in a CSV file.
    Import {
        #[arg(short, long)]
        file: PathBuf,
        /// Categorize each transaction after creating it
        #[arg(long)]
        enrich: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let connection = cli.connection;

    match cli.command {
        Command::Project {
            price_each,
            per_week,
            years,
            annual_rate,
            csv,
            compare_rates,
            remote,
        } => {
            let params = ProjectionParameters::parse(&price_each, &per_week, &years, &annual_rate)
                .context("invalid projection inputs")?;
            run_project(params, csv, &compare_rates, remote, &connection).await
        }
        Command::Enrich { query } => run_enrich(&connection, query).await,
        Command::Categorize { id } => run_categorize(&connection, id).await,
        Command::Add {
            date,
            description,
            amount,
            account_id,
            merchant,
            enrich,
        } => {
            let mut transaction = NewTransaction::new(date, description, amount).with_account(account_id);
            if let Some(merchant) = merchant {
                transaction = transaction.with_merchant(merchant);
            }
            run_add(&connection, transaction, enrich).await
        }
        Command::Import { file, enrich } => run_import(&connection, file, enrich).await,
    }
}

fn connect(args: &ConnectionArgs) -> Result<EnrichmentCoordinator<HttpFinanceApi>> {
    let config = ClientConfig::from_env()?.with_overrides(args.api_url.clone(), args.timeout_secs, args.list_limit)?;
    log::info!("using finance API at {}", config.base_url);
    let api = HttpFinanceApi::new(&config)?;
    Ok(EnrichmentCoordinator::new(Arc::new(api)))
}

async fn run_project(
    params: ProjectionParameters,
    csv: Option<PathBuf>,
    compare_rates: &[f64],
    remote: bool,
    connection: &ConnectionArgs,
) -> Result<()> {
    let result = project(&params).ok_or_else(|| anyhow!("projection rejected its inputs"))?;
    print_projection(&params, &result);

    if let Some(path) = csv {
        let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        write_series_csv(&result, file)?;
        println!("\nSeries written to {}", path.display());
    }

    if !compare_rates.is_empty() {
        println!("\n{:>8} {:>16} {:>16}", "Rate", "Future value", "Growth");
        println!("{}", "-".repeat(42));
        for scenario in sweep_rates(&params, compare_rates) {
            match scenario.result {
                Some(r) => println!(
                    "{:>7.2}% {:>16.2} {:>16.2}",
                    scenario.annual_rate * 100.0,
                    r.future_value,
                    r.future_value - r.total_contributed()
                ),
                None => println!("{:>7.2}% {:>16}", scenario.annual_rate * 100.0, "rejected"),
            }
        }
    }

    if remote {
        let coordinator = connect(connection)?;
        let server = coordinator.api().simulate(&params).await?;
        if result.agrees_with(&server, AGREEMENT_TOLERANCE) {
            println!("\nServer projection agrees (future value {:.2})", server.future_value);
        } else {
            bail!(
                "server projection differs: local {:.2}, server {:.2}",
                result.future_value,
                server.future_value
            );
        }
    }

    Ok(())
}

fn print_projection(params: &ProjectionParameters, result: &ProjectionResult) {
    println!("Savings projection");
    println!("==================\n");
    println!("  Spend:        {:.2} x {} per week", params.price_each, params.per_week);
    println!("  Horizon:      {} years at {:.2}%", params.years, params.annual_rate * 100.0);
    println!("  Monthly:      {:.2}", result.monthly_spend);
    println!("  Annual:       {:.2}", result.annual_spend);
    println!("  Contributed:  {:.2}", result.total_contributed());
    println!("  Future value: {:.2}", result.future_value);
    println!();

    println!("{:>5} {:>16}", "Year", "Value");
    println!("{}", "-".repeat(22));
    for sample in &result.series {
        println!("{:>5} {:>16.2}", sample.year, sample.value);
    }
}

async fn run_enrich(connection: &ConnectionArgs, query: Option<String>) -> Result<()> {
    let coordinator = connect(connection)?;
    let query = query.map(TransactionQuery::search).unwrap_or_default();

    let pass = coordinator.search(&query).await?;
    let total = pass.len();
    println!("Reconciling {} transactions\n", total);
    print_header();

    // Print each row once, as soon as its request settles
    let mut updates = coordinator.subscribe();
    let mut printed = HashSet::new();
    loop {
        let (settled, pending) = {
            let store = updates.borrow_and_update();
            (store.newly_settled(&printed), store.pending())
        };
        for (item, state) in &settled {
            printed.insert(item.id);
            print_row(item, state);
        }
        log::debug!("{}/{} settled", printed.len(), total);

        if pending == 0 || updates.changed().await.is_err() {
            break;
        }
    }
    pass.settled().await;

    println!();
    print_rows(&coordinator.rows());
    Ok(())
}

async fn run_categorize(connection: &ConnectionArgs, id: i64) -> Result<()> {
    let coordinator = connect(connection)?;
    coordinator.search(&TransactionQuery::default()).await?.settled().await;

    let item = coordinator
        .items()
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("transaction {} is not in the listing", id))?;

    let result = coordinator.enrich_one(&item).await?;
    println!("{} {}", item.id, result.label());
    if let Some(notes) = &result.notes {
        println!("  {}", notes);
    }
    Ok(())
}

async fn run_add(connection: &ConnectionArgs, transaction: NewTransaction, enrich: bool) -> Result<()> {
    let coordinator = connect(connection)?;
    let record = coordinator.create_transaction(&transaction, enrich).await?;
    print_rows(&[(record.clone(), coordinator.get_state(record.id))]);
    Ok(())
}

async fn run_import(connection: &ConnectionArgs, file: PathBuf, enrich: bool) -> Result<()> {
    let transactions = load_transactions(&file).map_err(|e| anyhow!("failed to read {}: {}", file.display(), e))?;
    println!("Importing {} transactions from {}", transactions.len(), file.display());

    let coordinator = connect(connection)?;
    let mut failed = 0;
    for transaction in &transactions {
        if let Err(e) = coordinator.create_transaction(transaction, enrich).await {
            log::warn!("could not create '{}': {}", transaction.description, e);
            failed += 1;
        }
    }

    print_rows(&coordinator.rows());
    if failed > 0 {
        bail!("{} of {} transactions were rejected", failed, transactions.len());
    }
    Ok(())
}

fn print_header() {
    println!("{:>6} {:>10} {:>10}  {:<32} {}", "Id", "Date", "Amount", "Description", "Enrichment");
    println!("{}", "-".repeat(100));
}

fn print_row(item: &TransactionRecord, state: &EnrichmentSnapshot) {
    let enrichment = match (&state.result, &state.error) {
        _ if state.loading => "loading...".to_string(),
        (_, Some(error)) => format!("error: {}", error),
        (Some(result), None) => result.label(),
        (None, None) => "not computed".to_string(),
    };
    println!(
        "{:>6} {:>10} {:>10.2}  {:<32} {}",
        item.id,
        item.date,
        item.amount,
        truncate(&item.description, 32),
        enrichment
    );
}

fn print_rows(rows: &[(TransactionRecord, EnrichmentSnapshot)]) {
    print_header();
    for (item, state) in rows {
        print_row(item, state);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width - 1).collect();
        format!("{}~", cut)
    }
}
