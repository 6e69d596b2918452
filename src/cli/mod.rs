pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::export::DEFAULT_OUTPUT;

#[derive(Parser)]
#[command(name = "gleaner")]
#[command(about = "Harvest business listings from online directories", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/gleaner/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of requests in flight
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the supported directories
    Sources,
    /// Show the accepted locations of a directory
    Locations {
        /// Source id or name, e.g. "canada"
        source: String,
    },
    /// Scrape listings and write them to a CSV file
    Scrape {
        /// Source id or name, e.g. "usa" or "South Africa"
        #[arg(short, long)]
        source: String,

        /// Comma-separated keywords, one per query
        #[arg(short, long)]
        keywords: String,

        /// Comma-separated locations, paired with the keywords in order
        #[arg(short, long)]
        locations: String,

        /// Output CSV file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Proxy list, one `ip:port:user:pass` per line
        #[arg(long)]
        proxies: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scrape() {
        let cli = Cli::try_parse_from([
            "gleaner",
            "-w",
            "4",
            "scrape",
            "-s",
            "usa",
            "-k",
            "cafe,bakery",
            "-l",
            "Paris,Berlin",
        ])
        .unwrap();

        assert_eq!(cli.workers, Some(4));
        match cli.command {
            Commands::Scrape {
                source,
                keywords,
                output,
                proxies,
                ..
            } => {
                assert_eq!(source, "usa");
                assert_eq!(keywords, "cafe,bakery");
                assert_eq!(output, PathBuf::from("datafile.csv"));
                assert!(proxies.is_none());
            }
            _ => panic!("expected scrape"),
        }
    }

    #[test]
    fn test_scrape_requires_locations() {
        assert!(Cli::try_parse_from(["gleaner", "scrape", "-s", "usa", "-k", "cafe"]).is_err());
    }
}
