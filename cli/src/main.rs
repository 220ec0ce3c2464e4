use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{
    consts::{
        DEFAULT_INDEXER_URL, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_PROPOSALS_URL,
        DEFAULT_SESSION,
    },
    export::{governors_csv, votes_csv, voters_csv},
    utils::*,
    IndexerClient, SessionConfig, SessionDump, VotingData,
};
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Builder;

#[derive(Clone, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, env = "XGOV_SESSION", default_value_t = DEFAULT_SESSION, value_parser = parse_session)]
    pub session: u32,

    #[arg(long, env, help = "JSON session config, overrides --session")]
    pub session_file: Option<PathBuf>,

    #[arg(long, env, default_value = DEFAULT_INDEXER_URL)]
    pub indexer_url: String,

    #[arg(long, env, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    #[arg(long, env, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    #[arg(long, env, default_value = DEFAULT_PROPOSALS_URL, help = "Folder holding proposal markdown files")]
    pub proposals_url: String,

    #[arg(long, env, default_value_t = 30, help = "HTTP timeout in seconds")]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig::resolve(
            self.session,
            self.session_file.as_deref(),
        )?)
    }

    fn client(&self) -> Result<IndexerClient> {
        Ok(IndexerClient::new(
            &self.indexer_url,
            self.page_size,
            self.max_pages,
            Duration::from_secs(self.timeout_secs),
        )?
        .with_proposals_url(&self.proposals_url))
    }

    /// Load the session from a dump if one is given, else from the network.
    async fn voting_data(&self, read_path: Option<&PathBuf>, is_compressed: bool) -> Result<VotingData> {
        let dump = match read_path {
            Some(path) => {
                let dump = SessionDump::read(path, is_compressed)?;
                info!(
                    "Using dump of session {} with {} transactions",
                    dump.session.session,
                    dump.transactions.len()
                );
                dump
            }
            None => {
                let session = self.session_config()?;
                self.client()?.fetch_session(&session).await?
            }
        };
        Ok(cli::compute(dump))
    }
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    Fetch {
        #[arg(long, env, default_value = "./session.json.gz", help = "Path to save the session dump")]
        save_path: PathBuf,

        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        is_compressed: bool,
    },
    Results {
        #[arg(long, env, help = "Path to read a session dump instead of fetching")]
        read_path: Option<PathBuf>,

        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        is_compressed: bool,

        #[arg(long, help = "Print the full results as JSON")]
        json: bool,
    },
    Export {
        #[arg(long, value_parser = parse_export_kind, help = "Records to export: votes | voters | governors")]
        kind: ExportKind,

        #[arg(long, help = "CSV file to write")]
        out: PathBuf,

        #[arg(long, env, help = "Path to read a session dump instead of fetching")]
        read_path: Option<PathBuf>,

        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        is_compressed: bool,
    },
    Proposal {
        #[arg(long, help = "Proposal id, e.g. 92")]
        id: String,

        #[arg(long, env, help = "Path to read a session dump instead of fetching")]
        read_path: Option<PathBuf>,

        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        is_compressed: bool,
    },
    Voter {
        #[arg(long, help = "Voter address")]
        address: String,

        #[arg(long, env, help = "Path to read a session dump instead of fetching")]
        read_path: Option<PathBuf>,

        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        is_compressed: bool,
    },
}

fn print_results(data: &VotingData) {
    info!("== Session {} ({}) ==", data.session.session, data.metadata.title);
    for r in &data.results {
        let progress = r
            .threshold_fraction()
            .map(|f| format!("{:.1}%", f * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        let status = match (r.control, r.passed_round) {
            (true, _) => "control".to_string(),
            (false, Some(round)) => format!("passed at round {}", round),
            (false, None) => "not passed".to_string(),
        };
        println!(
            "#{:<4} {:>16} / {:<16} {:>8} voters={:<5} {}",
            r.proposal_id,
            r.total_votes,
            r.threshold.map(|t| t.to_string()).unwrap_or_default(),
            progress,
            r.num_voters,
            status
        );
    }

    let p = &data.participation;
    println!(
        "Proposals passed: {}/{} (ask {})",
        p.proposals_passed, p.proposals_total, p.ask_passed
    );
    match (p.eligible_accounts, p.account_fraction) {
        (Some(eligible), Some(fraction)) => println!(
            "Accounts voted: {}/{} ({:.2}%)",
            p.voted_accounts,
            eligible,
            fraction * 100.0
        ),
        _ => println!("Accounts voted: {}", p.voted_accounts),
    }
    println!(
        "Weight voted: {}/{} ({:.2}%)",
        p.voted_weight,
        p.total_weight,
        p.weight_fraction * 100.0
    );
    info!(
        "Stats: {} transactions, {} votes, {} decode failures, {} inconsistent records",
        data.stats.transactions,
        data.stats.vote_transactions,
        data.stats.decode_failures,
        data.stats.inconsistent_records
    );
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(false)
        .try_init();

    let runtime = Builder::new_current_thread().enable_all().build()?;
    let cli = Cli::parse();

    match cli.command.clone() {
        Commands::Fetch {
            save_path,
            is_compressed,
        } => {
            let session = cli.session_config()?;
            info!("Fetching session {} (app {})...", session.session, session.app_id);
            let dump = runtime.block_on(cli.client()?.fetch_session(&session))?;
            dump.save(&save_path, is_compressed)?;
            info!(
                "Saved {} transactions to {}",
                dump.transactions.len(),
                save_path.display()
            );
        }
        Commands::Results {
            read_path,
            is_compressed,
            json,
        } => {
            let data = runtime.block_on(cli.voting_data(read_path.as_ref(), is_compressed))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_results(&data);
            }
        }
        Commands::Export {
            kind,
            out,
            read_path,
            is_compressed,
        } => {
            let data = runtime.block_on(cli.voting_data(read_path.as_ref(), is_compressed))?;
            let (csv, rows) = match kind {
                ExportKind::Votes => (votes_csv(&data.votes)?, data.votes.len()),
                ExportKind::Voters => (voters_csv(&data.voters)?, data.voters.len()),
                ExportKind::Governors => {
                    let governors = data
                        .governors
                        .as_ref()
                        .ok_or_else(|| anyhow!("session has no governor data"))?;
                    (governors_csv(&governors.snapshot)?, governors.snapshot.len())
                }
            };
            std::fs::write(&out, csv)?;
            info!("Wrote {} rows to {}", rows, out.display());
        }
        Commands::Proposal {
            id,
            read_path,
            is_compressed,
        } => {
            let data = runtime.block_on(cli.voting_data(read_path.as_ref(), is_compressed))?;
            let proposal = data
                .results
                .iter()
                .find(|r| r.proposal_id == id)
                .ok_or_else(|| anyhow!("session {} has no proposal {}", data.session.session, id))?;

            info!("== Proposal {} ({}) ==", proposal.proposal_id, proposal.title);
            match runtime.block_on(cli.client()?.proposal_text(proposal))? {
                Some(text) => println!("{}", text),
                None => info!("No published text for proposal {}", id),
            }
        }
        Commands::Voter {
            address,
            read_path,
            is_compressed,
        } => {
            let data = runtime.block_on(cli.voting_data(read_path.as_ref(), is_compressed))?;
            let voter = data
                .voter(&address)
                .ok_or_else(|| anyhow!("{} did not vote in session {}", address, data.session.session))?;

            info!("== Voter {} ==", voter.address);
            info!(
                "Weight: {} ({:.4}% of session), voted at round {}",
                voter.voter_weight,
                voter.relative_weight * 100.0,
                voter.round
            );
            for vote in data.votes_by(&address) {
                println!(
                    "#{:<4} {:>16} {}",
                    vote.proposal_id,
                    vote.votes,
                    vote.effect.map(|e| e.to_string()).unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
