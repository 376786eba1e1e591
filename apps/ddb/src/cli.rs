use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ddb", about = "Fetch DynamoDB items by key", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print output (default when stdout is a terminal)
    #[arg(long, global = true, overrides_with = "no_pretty")]
    pub pretty: bool,

    /// Print compact single-line output
    #[arg(long, global = true, overrides_with = "pretty")]
    pub no_pretty: bool,

    /// Colour output (default when stdout is a terminal)
    #[arg(long, global = true, overrides_with = "no_color")]
    pub color: bool,

    /// Disable coloured output (also respects NO_COLOR env var)
    #[arg(long, global = true, overrides_with = "color")]
    pub no_color: bool,

    /// Log pipeline steps to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// DynamoDB endpoint, e.g. http://localhost:8000
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Signing region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Config file (default is $HOME/.ddb.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch one item by primary key
    Get {
        /// Table name
        table: String,

        /// Partition key value
        partition: String,

        /// Sort key value, for tables with a composite key
        sort: Option<String>,

        /// Use a strongly consistent read
        #[arg(long)]
        consistent_read: bool,
    },
}

impl Cli {
    /// Resolve `--pretty`/`--no-pretty` against a default (the config file's
    /// value, else whether stdout is a terminal).
    pub fn pretty(&self, default: bool) -> bool {
        resolve_switch(self.pretty, self.no_pretty, default)
    }

    /// Resolve `--color`/`--no-color` against `NO_COLOR` and a default.
    pub fn color(&self, default: bool, no_color_env: bool) -> bool {
        resolve_switch(self.color, self.no_color, default && !no_color_env)
    }
}

fn resolve_switch(on: bool, off: bool, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ddb").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_should_parse_get_with_sort_value() {
        let cli = parse(&["get", "events", "d1", "100", "--consistent-read"]);
        let Commands::Get {
            table,
            partition,
            sort,
            consistent_read,
        } = cli.command;
        assert_eq!(table, "events");
        assert_eq!(partition, "d1");
        assert_eq!(sort.as_deref(), Some("100"));
        assert!(consistent_read);
    }

    #[test]
    fn test_should_default_output_flags_to_terminal() {
        let cli = parse(&["get", "t", "1"]);
        assert!(cli.pretty(true));
        assert!(!cli.pretty(false));
        assert!(cli.color(true, false));
        assert!(!cli.color(true, true));
    }

    #[test]
    fn test_should_let_last_output_flag_win() {
        let cli = parse(&["--pretty", "get", "t", "1", "--no-pretty", "--color"]);
        assert!(!cli.pretty(true));
        assert!(cli.color(false, true));
    }

    #[test]
    fn test_should_parse_config_path() {
        let cli = parse(&["get", "t", "1", "--config", "/etc/ddb.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ddb.yaml")));
        assert!(parse(&["get", "t", "1"]).config.is_none());
    }

    #[test]
    fn test_should_require_partition_value() {
        assert!(Cli::try_parse_from(["ddb", "get", "t"]).is_err());
    }
}
