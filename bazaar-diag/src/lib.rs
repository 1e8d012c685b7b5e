//! Bazaar Diagnostics - One-shot table inspection
//!
//! Both commands connect anonymously, print what the remote data service
//! returns for a handful of tables and exit. A failed table is reported
//! inline and the pass continues; the exit status says whether anything
//! failed.

use bazaar_core::{ConfigError, EntityType, ListingDetail, Role, StoreError};
use bazaar_storage::{ListingQuery, MarketplaceStore, RemoteConfig, RestClient, StoreFactory};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Clone, Parser)]
pub struct DiagArgs {
    /// Maximum number of rows to print per table
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum DiagError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("client setup: {0}")]
    Store(#[from] StoreError),
    #[error("output: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of one inspection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub queries: u32,
    pub failures: u32,
}

impl Report {
    fn record<T>(&mut self, result: &Result<T, StoreError>) {
        self.queries += 1;
        if result.is_err() {
            self.failures += 1;
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Plain-text logs on stderr; stdout carries the report.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}

/// Anonymous store built from `BAZAAR_REMOTE_URL` / `BAZAAR_REMOTE_ANON_KEY`.
pub fn connect_from_env() -> Result<Arc<dyn MarketplaceStore>, DiagError> {
    let config = RemoteConfig::from_env()?;
    let client = RestClient::new(&config)?;
    tracing::debug!(url = %config.url, "Connected anonymously");
    Ok(client.for_session(None))
}

fn print_count<W: Write>(
    out: &mut W,
    report: &mut Report,
    label: &str,
    result: Result<u64, StoreError>,
) -> io::Result<()> {
    report.record(&result);
    match result {
        Ok(n) => writeln!(out, "{label}: {n}"),
        Err(e) => writeln!(out, "{label}: ERROR {e}"),
    }
}

async fn print_table_count<W: Write>(
    store: &dyn MarketplaceStore,
    out: &mut W,
    report: &mut Report,
    entity: EntityType,
) -> io::Result<()> {
    let result = store.count(entity).await;
    print_count(out, report, entity.table_name(), result)
}

// ============================================================================
// INSPECT REQUESTS
// ============================================================================

/// Game requests with their requester, then profiles per role.
pub async fn run_requests<W: Write>(
    store: &dyn MarketplaceStore,
    limit: u32,
    out: &mut W,
) -> io::Result<Report> {
    let mut report = Report::default();

    print_table_count(store, out, &mut report, EntityType::GameRequest).await?;

    let rows = store.game_request_list(None, Some(limit)).await;
    report.record(&rows);
    match rows {
        Ok(rows) => {
            for r in rows {
                let requester = r
                    .requester
                    .as_ref()
                    .and_then(|p| p.email.clone().or_else(|| p.display_name.clone()))
                    .unwrap_or_else(|| format!("<unknown {}>", r.user_id));
                writeln!(
                    out,
                    "  - [{}] {} by {} at {}",
                    r.status.as_db_str(),
                    r.game_name,
                    requester,
                    r.created_at.to_rfc3339()
                )?;
            }
        }
        Err(e) => writeln!(out, "  game_requests rows: ERROR {e}")?,
    }

    for role in [Role::User, Role::Admin] {
        let result = store.profile_count_by_role(role).await;
        print_count(out, &mut report, &format!("profiles[{}]", role.as_db_str()), result)?;
    }

    Ok(report)
}

// ============================================================================
// INSPECT CATALOG
// ============================================================================

fn describe_listing(detail: &ListingDetail) -> String {
    let category = detail
        .category
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("-");
    format!(
        "  - {} [{}] category={} media={}",
        detail.listing.title,
        detail.listing.status.as_db_str(),
        category,
        detail.media.len()
    )
}

/// Catalog table counts, then each listing with category and media count.
pub async fn run_catalog<W: Write>(
    store: &dyn MarketplaceStore,
    limit: u32,
    out: &mut W,
) -> io::Result<Report> {
    let mut report = Report::default();

    for entity in [EntityType::Category, EntityType::Listing, EntityType::ListingMedia] {
        print_table_count(store, out, &mut report, entity).await?;
    }

    let query = ListingQuery {
        limit: limit.min(ListingQuery::MAX_LIMIT),
        ..ListingQuery::default()
    };
    let listings = store.listing_list(&query).await;
    report.record(&listings);
    match listings {
        Ok(listings) => {
            for detail in &listings {
                writeln!(out, "{}", describe_listing(detail))?;
            }
        }
        Err(e) => writeln!(out, "  listings rows: ERROR {e}")?,
    }

    Ok(report)
}
