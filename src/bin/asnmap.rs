mod cli_utils;
mod commands;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use asnmap::{ErrorPolicy, LoadOptions};
use commands::{cmd_bench, cmd_lookup, cmd_stats};

#[derive(Parser)]
#[command(name = "asnmap")]
#[command(
    about = "Resolve IP addresses to autonomous systems by longest-prefix match",
    long_about = "asnmap - Resolve IP addresses to autonomous systems by longest-prefix match\n\n\
    Loads an IP-range-to-ASN feed (ip2asn style, optionally gzip-compressed) into an\n\
    in-memory prefix trie and answers lookups against it.\n\n\
    Feed format, one range per line, whitespace separated:\n\
      <startIP> <endIP> <ASN> <country> <network> [ignored...]\n\n\
    Examples:\n\
      asnmap lookup ip2asn-v4.tsv.gz 1.1.1.1 8.8.8.8\n\
      asnmap stats ip2asn-combined.tsv --json\n\
      asnmap bench ip2asn-v4.tsv -n 1000000 -j 8"
)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Feed loading options shared by all subcommands
#[derive(Args)]
struct FeedArgs {
    /// Path to the ASN feed (.gz is decompressed, "-" reads stdin)
    #[arg(value_name = "FEED")]
    feed: PathBuf,

    /// Abort on the first malformed feed line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Abort once more than this many feed lines have been skipped
    #[arg(long, value_name = "N")]
    max_errors: Option<usize>,
}

impl FeedArgs {
    fn load_options(&self) -> LoadOptions {
        let policy = if self.strict {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Skip
        };
        LoadOptions {
            policy,
            max_errors: self.max_errors,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one or more IP addresses
    Lookup {
        #[command(flatten)]
        feed: FeedArgs,

        /// IP addresses to resolve
        #[arg(value_name = "IP", required = true)]
        queries: Vec<String>,

        /// Quiet mode - no output, only exit code (0 = all found, 1 = otherwise)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Load a feed and report index statistics
    Stats {
        #[command(flatten)]
        feed: FeedArgs,

        /// Output statistics as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Benchmark lookups with random IPv4 addresses
    Bench {
        #[command(flatten)]
        feed: FeedArgs,

        /// Number of random lookups
        #[arg(short = 'n', long, default_value = "50000")]
        count: usize,

        /// Worker threads (default: 1, 0 for all cores)
        #[arg(short = 'j', long, default_value = "1")]
        threads: usize,

        /// Seed for the address generator (random if not set)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli_utils::init_logging(cli.verbose);

    match cli.command {
        Commands::Lookup {
            feed,
            queries,
            quiet,
        } => cmd_lookup(feed.feed.clone(), feed.load_options(), queries, quiet),
        Commands::Stats { feed, json } => cmd_stats(feed.feed.clone(), feed.load_options(), json),
        Commands::Bench {
            feed,
            count,
            threads,
            seed,
        } => cmd_bench(feed.feed.clone(), feed.load_options(), count, threads, seed),
    }
}
