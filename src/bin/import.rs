use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use bibliostat::config::Settings;
use bibliostat::import::{self, Domain};

/// Import pending export files into the CSV stores.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Domains to import, in the given order.
    #[arg(value_enum)]
    domains: Vec<Domain>,

    /// Import every domain.
    #[arg(long, conflicts_with = "domains")]
    all: bool,

    /// Settings file (TOML); the default folder layout is used without one.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let domains = if cli.all {
        Domain::ALL.to_vec()
    } else {
        cli.domains
    };
    if domains.is_empty() {
        bail!("name at least one domain or pass --all");
    }

    let settings = Settings::load_or_default(cli.config.as_deref())
        .with_context(|| format!("reading settings {:?}", cli.config))?;

    let mut failed = 0;
    for domain in domains {
        match import::run(domain, &settings).with_context(|| format!("importing {domain}")) {
            Ok(report) => println!(
                "{domain}: {} file(s), {} record(s) → {}",
                report.files.len(),
                report.records,
                report.store.display()
            ),
            Err(e) => {
                log::error!("{e:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} import(s) failed");
    }
    Ok(())
}
