//! finora - command-line client for household finances.
//!
//! Shows the dashboard and the monthly real-versus-expected report, and
//! records expected figures, transactions and accounts against the finora API.

mod cli;
mod print;

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::Parser;
use finora_core::api::{ApiClient, DashboardSource, ErrorKind};
use finora_core::auth::{CredentialStore, Session, SessionData};
use finora_core::budget::{BudgetStore, FileBudgetStore, MemoryBudgetStore};
use finora_core::config::Config;
use finora_core::dashboard::normalize::DEFAULT_CURRENCY;
use finora_core::dashboard::{DashboardService, MonthlyFinance};
use finora_core::models::{
    AccountRequest, DashboardSummary, LoginRequest, PeriodKey, TransactionCategory,
    TransactionFilter, TransactionRequest, TransactionType, UpdateHouseholdRequest,
};
use finora_core::DashboardCache;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{AccountsCommand, Cli, Command, HouseholdCommand, PeriodArgs};

/// Environment variable naming a file to mirror logs into
const LOG_FILE_ENV: &str = "FINORA_LOG_FILE";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_FILE_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            let path = PathBuf::from(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_owned())
                .unwrap_or_else(|| "finora.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Everything a command needs, loaded once per invocation.
struct Context {
    config: Config,
    session: Session,
    client: ApiClient,
    credentials: CredentialStore,
    data_dir: PathBuf,
    no_persist: bool,
}

impl Context {
    fn load(no_persist: bool) -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });
        let data_dir = config.data_dir()?;

        let mut session = Session::new(data_dir.clone());
        if let Err(e) = session.load() {
            warn!(error = %e, "Failed to load session");
        }

        let base_url = config.base_url();
        let credentials = CredentialStore::new(&base_url);
        let mut client = ApiClient::new(base_url)?;
        if let Some(token) = Self::stored_token(&session, &credentials) {
            client.set_token(token);
        }

        Ok(Self {
            config,
            session,
            client,
            credentials,
            data_dir,
            no_persist,
        })
    }

    fn stored_token(session: &Session, credentials: &CredentialStore) -> Option<String> {
        let data = session.data.as_ref()?;
        if let Some(ref token) = data.token {
            return Some(token.clone());
        }
        match credentials.get_token(&data.user.email) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "Keychain unavailable");
                None
            }
        }
    }

    /// Household id from the session, the config, or the API, in that order.
    async fn household_id(&mut self) -> Result<Option<String>> {
        if let Some(id) = self.session.household_id() {
            return Ok(Some(id.to_string()));
        }
        if let Some(ref id) = self.config.household_id {
            return Ok(Some(id.clone()));
        }

        match self.client.fetch_household().await {
            Ok(household) => {
                self.config.household_id = Some(household.id.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                Ok(Some(household.id))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to resolve household"),
        }
    }

    /// Budget store for expected figures: the budget file, or a throwaway
    /// in-memory map with `--no-persist`.
    fn budget_store(&self) -> Arc<dyn BudgetStore> {
        if self.no_persist {
            debug!("Expected figures kept in memory only");
            Arc::new(MemoryBudgetStore::new())
        } else {
            Arc::new(FileBudgetStore::in_dir(&self.data_dir))
        }
    }

    fn monthly(
        &self,
        household_id: Option<String>,
    ) -> MonthlyFinance<ApiClient, Arc<dyn BudgetStore>, impl Fn() -> Option<String> + Send + Sync>
    {
        MonthlyFinance::new(self.client.clone(), self.budget_store(), move || {
            household_id.clone()
        })
    }

    fn dashboard(&self) -> DashboardService<ApiClient> {
        DashboardService::new(self.client.clone(), Arc::new(DashboardCache::new()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let cli = Cli::parse();
    let mut ctx = Context::load(cli.no_persist)?;
    debug!(command = ?cli.command, base_url = ctx.client.base_url(), "Running command");

    match cli.command {
        Command::Login { email } => login(&mut ctx, email).await,
        Command::Logout => logout(&mut ctx),
        Command::Status => status(&ctx),
        Command::Dashboard {
            period,
            trend,
            force,
            json,
        } => dashboard(&ctx, period, trend, force, json).await,
        Command::Monthly {
            period,
            income,
            expenses,
            json,
        } => monthly(&mut ctx, period, income, expenses, json).await,
        Command::Overview { period } => overview(&mut ctx, period).await,
        Command::AddTransaction {
            account_id,
            kind,
            category,
            amount,
            date,
            description,
        } => {
            let request = transaction_request(account_id, kind, category, amount, date, description);
            add_transaction(&ctx, request).await
        }
        Command::Transactions { account, from, to } => {
            transactions(&ctx, transaction_filter(account, from, to)).await
        }
        Command::Accounts { action } => accounts(&ctx, action).await,
        Command::Household { action } => household(&ctx, action).await,
    }
}

async fn login(ctx: &mut Context, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| ctx.config.last_email.clone()) {
        Some(email) => email,
        None => anyhow::bail!("Usage: finora login <email>"),
    };
    let password = rpassword::prompt_password("Password: ")?;

    let auth = ctx
        .client
        .login(&LoginRequest {
            email: email.clone(),
            password,
        })
        .await
        .context("Login failed")?;

    let mut data = SessionData::from_auth(&auth);
    match ctx.credentials.store_token(&email, &auth.access_token) {
        Ok(()) => data.token = None,
        Err(e) => warn!(error = %e, "Keychain unavailable, keeping token in session file"),
    }

    ctx.config.last_email = Some(email);
    ctx.config.household_id = auth.user.household_id.clone();
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    ctx.session.update(data);
    ctx.session.save().context("Failed to save session")?;

    info!(user = %auth.user.email, "Login successful");
    println!(
        "Logged in as {} {} <{}>",
        auth.user.first_name, auth.user.last_name, auth.user.email
    );
    Ok(())
}

fn logout(ctx: &mut Context) -> Result<()> {
    if let Some(user) = ctx.session.user() {
        match ctx.credentials.delete(&user.email) {
            Ok(removed) => debug!(removed, "Keychain entry cleared"),
            Err(e) => warn!(error = %e, "Failed to clear keychain entry"),
        }
    }
    ctx.session.clear()?;
    ctx.client.clear_token();
    println!("Logged out");
    Ok(())
}

fn status(ctx: &Context) -> Result<()> {
    match ctx.session.data {
        Some(ref data) if !data.is_expired() => println!(
            "Logged in as {} ({} minutes left) against {}",
            data.user.email,
            data.minutes_until_expiry(),
            ctx.client.base_url()
        ),
        _ => println!("Not logged in"),
    }
    if ctx.no_persist {
        println!("Expected figures are not saved in this mode");
    }
    Ok(())
}

async fn dashboard(
    ctx: &Context,
    period: PeriodArgs,
    trend: Option<u32>,
    force: bool,
    json: bool,
) -> Result<()> {
    let mut service = ctx.dashboard();
    if let Some(trend) = trend {
        service = service.with_trend_months(trend);
    }
    service.set_period(period.year, period.month);

    let summary = service.fetch(force).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(summary.as_ref())?);
    } else if service.is_empty() {
        println!("{}: nothing recorded yet", service.period_label());
    } else {
        print::summary(&summary);
    }
    Ok(())
}

async fn monthly(
    ctx: &mut Context,
    period: PeriodArgs,
    income: Option<f64>,
    expenses: Option<f64>,
    json: bool,
) -> Result<()> {
    let household_id = ctx.household_id().await?;
    if household_id.is_none() && (income.is_some() || expenses.is_some()) {
        warn!("No household yet, expected figures will not be saved");
    }

    let finance = ctx.monthly(household_id);
    finance.set_period(PeriodKey::resolve(period.year, period.month));

    if let Some(income) = income {
        finance.set_expected_income(income)?;
    }
    if let Some(expenses) = expenses {
        finance.set_expected_expenses(expenses)?;
    }

    finance.fetch().await?;

    match finance.monthly_data() {
        Some(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
        Some(report) => print::monthly(&report),
        None => println!("No household yet. Create one to see monthly figures."),
    }
    Ok(())
}

async fn overview(ctx: &mut Context, period: PeriodArgs) -> Result<()> {
    let period = PeriodKey::resolve(period.year, period.month);
    let household_id = ctx.household_id().await?;

    let mut service = ctx.dashboard();
    service.set_period(Some(period.year), Some(period.month));
    let finance = ctx.monthly(household_id);
    finance.set_period(period);

    let (summary, monthly) = futures::future::join(service.fetch(false), finance.fetch()).await;
    let summary = summary?;
    print::summary(&summary);
    monthly?;
    if let Some(report) = finance.monthly_data() {
        println!();
        print::monthly(&report);
    }
    Ok(())
}

fn transaction_request(
    account_id: String,
    kind: TransactionType,
    category: TransactionCategory,
    amount: f64,
    date: NaiveDate,
    description: Option<String>,
) -> TransactionRequest {
    TransactionRequest {
        account_id,
        kind,
        category,
        amount,
        date: date.format("%Y-%m-%d").to_string(),
        description,
        splits: Vec::new(),
    }
}

/// Totals of the selected month around a change.
struct TotalsChange {
    before: Option<Arc<DashboardSummary>>,
    after: Option<Arc<DashboardSummary>>,
}

/// Run `change` between two dashboard loads so the effect on this month's
/// totals can be shown. The loads are best effort: a missing household or an
/// unreachable dashboard never stops `change` from running.
async fn around_totals<S, T, F>(service: &DashboardService<S>, change: F) -> Result<(T, TotalsChange)>
where
    S: DashboardSource,
    F: Future<Output = Result<T>>,
{
    let before = match service.fetch(false).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(error = %e, "Could not load totals before the change");
            None
        }
    };

    let value = change.await?;

    service.invalidate();
    let after = match service.fetch(false).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(error = %e, "Could not load totals after the change");
            None
        }
    };

    Ok((value, TotalsChange { before, after }))
}

async fn add_transaction(ctx: &Context, request: TransactionRequest) -> Result<()> {
    let service = ctx.dashboard();
    let (transaction, totals) = around_totals(&service, async {
        ctx.client
            .create_transaction(&request)
            .await
            .context("Failed to create transaction")
    })
    .await?;

    let currency = totals
        .after
        .as_ref()
        .or(totals.before.as_ref())
        .map_or(DEFAULT_CURRENCY, |s| s.currency.as_str());
    println!(
        "Created transaction {} ({} {})",
        transaction.id,
        transaction.category.label(),
        finora_core::utils::format_amount(transaction.amount, currency)
    );

    if let (Some(before), Some(after)) = (totals.before, totals.after) {
        print::totals_change(&before, &after);
    }
    Ok(())
}

fn transaction_filter(
    account: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> TransactionFilter {
    let day = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    TransactionFilter {
        account_id: account,
        from: from.map(day),
        to: to.map(day),
    }
}

async fn transactions(ctx: &Context, filter: TransactionFilter) -> Result<()> {
    let transactions = ctx.client.fetch_transactions(&filter).await?;
    print::transactions(&transactions);
    Ok(())
}

async fn accounts(ctx: &Context, action: Option<AccountsCommand>) -> Result<()> {
    match action {
        None => {
            let accounts = ctx.client.fetch_accounts().await?;
            print::accounts(&accounts);
        }
        Some(AccountsCommand::Show { id }) => {
            let account = ctx.client.fetch_account(&id).await?;
            print::accounts(std::slice::from_ref(&account));
        }
        Some(AccountsCommand::Add {
            name,
            kind,
            balance,
            currency,
        }) => {
            let account = ctx
                .client
                .create_account(&AccountRequest {
                    name,
                    kind,
                    balance,
                    currency,
                })
                .await
                .context("Failed to create account")?;
            println!("Created account {}", account.id);
        }
    }
    Ok(())
}

async fn household(ctx: &Context, action: Option<HouseholdCommand>) -> Result<()> {
    let household = match ctx.client.fetch_household().await {
        Ok(household) => household,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            println!("No household yet.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match action {
        None => {
            let members = ctx.client.fetch_household_members().await?;
            print::household(&household, &members);
        }
        Some(HouseholdCommand::Update { name, kind }) => {
            let request = UpdateHouseholdRequest {
                kind: kind.unwrap_or(household.kind),
                name: name.unwrap_or(household.name),
            };
            let updated = ctx
                .client
                .update_household(&household.id, &request)
                .await
                .context("Failed to update household")?;
            print::household(&updated, &[]);
        }
    }
    Ok(())
}
