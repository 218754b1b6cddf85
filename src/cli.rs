//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Browse manga sites through their source adapters.
///
/// Every command prints JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "sources")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ignore the rate limits sources declare
    #[arg(long, global = true)]
    pub no_rate_limit: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the bundled sources
    List,
    /// Show the search filters of a source
    Filters {
        /// Source id (see `list`)
        source: String,
    },
    /// Popular manga
    Popular(ListingArgs),
    /// Latest updates
    Latest(ListingArgs),
    /// Search a source
    Search {
        #[command(flatten)]
        listing: ListingArgs,
        /// Search text; a deep-link marker such as `slug:` or `id:` opens one manga
        query: String,
        /// Filter assignment, repeatable (e.g. `--filter status[]=end`)
        #[arg(short, long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Manga details for a site-relative manga URL
    Details(ItemArgs),
    /// Chapter list for a site-relative manga URL
    Chapters(ItemArgs),
    /// Page list for a site-relative chapter URL
    Pages(ItemArgs),
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ListingArgs {
    /// Source id (see `list`)
    pub source: String,
    /// 1-based listing page
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ItemArgs {
    /// Source id (see `list`)
    pub source: String,
    /// Site-relative URL, as returned by a listing
    pub url: String,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_list_command() {
        let args = Args::try_parse_from(["sources", "list"]).unwrap();
        assert_eq!(args.command, Command::List);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.no_rate_limit);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["sources", "-v", "list"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["sources", "list", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["sources", "--quiet", "list"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_popular_defaults_to_first_page() {
        let args = Args::try_parse_from(["sources", "popular", "mhscans"]).unwrap();
        assert_eq!(
            args.command,
            Command::Popular(ListingArgs {
                source: "mhscans".to_string(),
                page: 1,
            })
        );
    }

    #[test]
    fn test_cli_page_zero_is_rejected() {
        let result = Args::try_parse_from(["sources", "latest", "mhscans", "--page", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_search_with_filters() {
        let args = Args::try_parse_from([
            "sources",
            "search",
            "mangasnosekai",
            "solo leveling",
            "--filter",
            "status[]=end",
            "-f",
            "m_orderby = views",
            "--page",
            "2",
        ])
        .unwrap();
        let Command::Search {
            listing,
            query,
            filters,
        } = args.command
        else {
            panic!("expected search command");
        };
        assert_eq!(listing.page, 2);
        assert_eq!(query, "solo leveling");
        assert_eq!(
            filters,
            vec![
                ("status[]".to_string(), "end".to_string()),
                ("m_orderby".to_string(), "views".to_string()),
            ]
        );
    }

    #[test]
    fn test_cli_filter_without_equals_is_rejected() {
        let result = Args::try_parse_from(["sources", "search", "mhscans", "x", "-f", "status"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_chapters_takes_url() {
        let args = Args::try_parse_from(["sources", "chapters", "slimeread", "/book/123"]).unwrap();
        assert_eq!(
            args.command,
            Command::Chapters(ItemArgs {
                source: "slimeread".to_string(),
                url: "/book/123".to_string(),
            })
        );
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Args::try_parse_from(["sources"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["sources", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["sources", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["sources", "list", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
