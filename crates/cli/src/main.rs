use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use kira_analysis::input::{AccountInfo, AnalysisConfig, AnalysisInput, RawStatement};
use kira_analysis::{Analyzer, RelatedParty, RuleTables};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Analyze a set of bank statements and produce one consolidated
/// turnover and integrity report.
#[derive(Parser)]
#[command(name = "kira", version, about)]
struct Args {
    /// Run configuration: company details, related parties, and the
    /// statement file for each account.
    #[arg(short, long)]
    config: PathBuf,

    /// Replace the built-in rule tables with a custom TOML file.
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RunConfig {
    company_name: String,
    #[serde(default)]
    company_keywords: Vec<String>,
    #[serde(default)]
    related_parties: Vec<RelatedParty>,
    accounts: BTreeMap<String, AccountEntry>,
}

#[derive(Debug, Deserialize)]
struct AccountEntry {
    bank_name: String,
    account_number: String,
    /// Statement JSON, resolved relative to the config file's directory.
    statement: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let input = load_input(&args.config)?;

    let analyzer = match &args.tables {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading rule tables {}", path.display()))?;
            Analyzer::new(RuleTables::from_toml(&text)?)
        }
        None => Analyzer::with_default_tables(),
    };

    let report = analyzer.analyze(&input)?;
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_input(config_path: &Path) -> anyhow::Result<AnalysisInput> {
    let text = fs::read_to_string(config_path)
        .with_context(|| format!("reading config {}", config_path.display()))?;
    let run: RunConfig = toml::from_str(&text)
        .with_context(|| format!("parsing config {}", config_path.display()))?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut accounts = BTreeMap::new();
    let mut statements = BTreeMap::new();
    for (account_id, entry) in run.accounts {
        let path = base.join(&entry.statement);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading statement {}", path.display()))?;
        let statement: RawStatement = serde_json::from_str(&data)
            .with_context(|| format!("parsing statement {}", path.display()))?;
        statements.insert(account_id.clone(), statement);
        accounts.insert(
            account_id,
            AccountInfo {
                bank_name: entry.bank_name,
                account_number: entry.account_number,
            },
        );
    }

    Ok(AnalysisInput {
        config: AnalysisConfig {
            company_name: run.company_name,
            company_keywords: run.company_keywords,
            related_parties: run.related_parties,
        },
        accounts,
        statements,
    })
}
