//! Print the catalog tables of the remote data service once and exit.

use bazaar_diag::{connect_from_env, init_tracing, run_catalog, DiagArgs};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = DiagArgs::parse();

    let store = match connect_from_env() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("inspect-catalog: {e}");
            return ExitCode::from(2);
        }
    };

    let mut stdout = std::io::stdout().lock();
    match run_catalog(store.as_ref(), args.limit, &mut stdout).await {
        Ok(report) => {
            if !report.is_success() {
                eprintln!(
                    "inspect-catalog: {} of {} queries failed",
                    report.failures, report.queries
                );
            }
            report.exit_code()
        }
        Err(e) => {
            eprintln!("inspect-catalog: {e}");
            ExitCode::FAILURE
        }
    }
}
