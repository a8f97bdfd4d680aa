use clap::{Parser, Subcommand};
use credit_engine::application::engine::{CreditEngine, OpenAccountRequest};
use credit_engine::domain::account::{AccountTerms, Amount, CreditAccount, CreditType};
use credit_engine::domain::ports::{AccountStoreBox, CustomerGatewayBox};
use credit_engine::infrastructure::customers::{
    HttpCustomerEndpoint, ResilientCustomerGateway, StaticCustomerDirectory,
};
use credit_engine::infrastructure::in_memory::InMemoryAccountStore;
use credit_engine::infrastructure::resilience::ResiliencePolicy;
use credit_engine::interfaces::csv::account_writer::AccountWriter;
use credit_engine::interfaces::csv::customer_reader::CustomerReader;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// CSV file with the known customers (columns: id, customerType).
    #[arg(long)]
    customers: Option<PathBuf>,

    /// Base URL of the remote customer service.
    #[arg(long)]
    customer_service_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a new credit account for a customer
    Create {
        /// Owning customer id
        #[arg(long)]
        customer: String,
        /// One of personal-loan, business-loan, credit-card
        #[arg(long)]
        credit_type: CreditType,
        /// Approved credit amount
        #[arg(long)]
        principal: Decimal,
        #[arg(long)]
        interest_rate: Option<Decimal>,
        #[arg(long)]
        minimum_payment: Option<Decimal>,
        #[arg(long)]
        payment_due_day: Option<u8>,
    },
    /// Charge a credit card account
    Charge {
        /// Account id
        account: String,
        amount: Decimal,
    },
    /// Pay down an account balance
    Pay {
        /// Account id
        account: String,
        amount: Decimal,
    },
    /// Overwrite the descriptive terms of an account
    UpdateTerms {
        /// Account id
        account: String,
        #[arg(long)]
        interest_rate: Option<Decimal>,
        #[arg(long)]
        minimum_payment: Option<Decimal>,
        #[arg(long)]
        payment_due_day: Option<u8>,
    },
    /// Delete an account
    Delete {
        /// Account id
        account: String,
    },
    /// Show one account by id
    Get {
        /// Account id
        account: String,
    },
    /// Show one account by its account number
    GetByNumber { number: String },
    /// List every account
    List,
    /// List the accounts owned by one customer
    ListCustomer { customer: String },
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: &Path) -> Result<AccountStoreBox> {
    use credit_engine::infrastructure::rocksdb::RocksDbAccountStore;
    Ok(Box::new(RocksDbAccountStore::open(path).into_diagnostic()?))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(_path: &Path) -> Result<AccountStoreBox> {
    eprintln!(
        "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(Box::new(InMemoryAccountStore::new()))
}

fn customer_gateway(cli: &Cli) -> Result<CustomerGatewayBox> {
    if let Some(url) = &cli.customer_service_url {
        let endpoint = HttpCustomerEndpoint::new(url.clone());
        return Ok(Box::new(ResilientCustomerGateway::new(
            endpoint,
            ResiliencePolicy::default(),
        )));
    }
    if let Some(path) = &cli.customers {
        let file = File::open(path).into_diagnostic()?;
        let customers = CustomerReader::new(file)
            .customers()
            .collect::<credit_engine::error::Result<Vec<_>>>()
            .into_diagnostic()?;
        return Ok(Box::new(
            customers.into_iter().collect::<StaticCustomerDirectory>(),
        ));
    }
    if matches!(cli.command, Command::Create { .. }) {
        miette::bail!("create needs a customer source: pass --customers or --customer-service-url");
    }
    Ok(Box::new(StaticCustomerDirectory::new()))
}

fn print_accounts(accounts: Vec<CreditAccount>) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let accounts: AccountStoreBox = match &cli.db_path {
        Some(path) => open_persistent(path)?,
        None => Box::new(InMemoryAccountStore::new()),
    };
    let customers = customer_gateway(&cli)?;
    let engine = CreditEngine::new(accounts, customers);

    match cli.command {
        Command::Create {
            customer,
            credit_type,
            principal,
            interest_rate,
            minimum_payment,
            payment_due_day,
        } => {
            let request = OpenAccountRequest {
                credit_type,
                customer_id: customer,
                principal: Amount::new(principal).into_diagnostic()?,
                terms: AccountTerms {
                    interest_rate,
                    minimum_payment,
                    payment_due_day,
                },
            };
            let account = engine.create(request).await.into_diagnostic()?;
            print_accounts(vec![account])?;
        }
        Command::Charge { account, amount } => {
            let amount = Amount::new(amount).into_diagnostic()?;
            let account = engine.charge(&account, amount).await.into_diagnostic()?;
            print_accounts(vec![account])?;
        }
        Command::Pay { account, amount } => {
            let amount = Amount::new(amount).into_diagnostic()?;
            let account = engine.pay(&account, amount).await.into_diagnostic()?;
            print_accounts(vec![account])?;
        }
        Command::UpdateTerms {
            account,
            interest_rate,
            minimum_payment,
            payment_due_day,
        } => {
            let terms = AccountTerms {
                interest_rate,
                minimum_payment,
                payment_due_day,
            };
            let account = engine
                .update_terms(&account, terms)
                .await
                .into_diagnostic()?;
            print_accounts(vec![account])?;
        }
        Command::Delete { account } => {
            engine.delete(&account).await.into_diagnostic()?;
        }
        Command::Get { account } => {
            let account = engine.find_by_id(&account).await.into_diagnostic()?;
            print_accounts(vec![account])?;
        }
        Command::GetByNumber { number } => {
            let account = engine.find_by_number(&number).await.into_diagnostic()?;
            print_accounts(vec![account])?;
        }
        Command::List => {
            let accounts = engine.find_all().await.into_diagnostic()?;
            print_accounts(accounts)?;
        }
        Command::ListCustomer { customer } => {
            let accounts = engine.find_by_customer(&customer).await.into_diagnostic()?;
            print_accounts(accounts)?;
        }
    }

    Ok(())
}
