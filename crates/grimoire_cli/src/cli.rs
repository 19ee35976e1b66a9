//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Parser, Debug)]
#[command(name = "grimoire", version, about = "Spells and houses catalog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the catalog HTTP server.
    Serve(ServeArgs),
    /// Browse and edit spells on a running server.
    Spells {
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(subcommand)]
        action: SpellAction,
    },
    /// Browse and edit houses on a running server.
    Houses {
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(subcommand)]
        action: HouseAction,
    },
    /// Print the core version.
    Version,
}

/// Flags override the matching `GRIMOIRE_*` environment variables.
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub bind: Option<IpAddr>,
    #[arg(long)]
    pub db: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Write rolling log files here instead of stderr.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Catalog server base URL.
    #[arg(long, env = "GRIMOIRE_API_URL", default_value = DEFAULT_API_URL)]
    pub api: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long = "sort-by")]
    pub sort_by: Option<String>,
    #[arg(long)]
    pub desc: bool,
    /// Print HTML cards instead of one line per record.
    #[arg(long)]
    pub html: bool,
}

#[derive(Subcommand, Debug)]
pub enum SpellAction {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    Add(SpellFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: SpellFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct SpellFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum HouseAction {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        head: Option<String>,
        #[arg(long = "trait")]
        trait_filter: Option<String>,
    },
    Add(HouseFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: HouseFields,
    },
    Delete {
        id: String,
    },
    /// Let the sorting hat pick a random house.
    Sort,
}

#[derive(Args, Debug)]
pub struct HouseFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub colors: Option<String>,
    #[arg(long)]
    pub symbol: Option<String>,
    #[arg(long)]
    pub head: Option<String>,
    /// Comma-separated list.
    #[arg(long)]
    pub traits: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, HouseAction, SpellAction};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["grimoire", "serve", "--port", "8080", "--db", "x.db"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("serve expected");
        };
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.db.unwrap().to_str(), Some("x.db"));
    }

    #[test]
    fn parses_spell_list_filters() {
        let cli = Cli::try_parse_from([
            "grimoire", "spells", "list", "--type", "charm", "--sort-by", "name", "--desc",
        ])
        .unwrap();
        let Command::Spells { action: SpellAction::List { list, kind }, .. } = cli.command else {
            panic!("spells list expected");
        };
        assert_eq!(kind.as_deref(), Some("charm"));
        assert_eq!(list.sort_by.as_deref(), Some("name"));
        assert!(list.desc);
    }

    #[test]
    fn parses_house_edit_with_traits() {
        let cli = Cli::try_parse_from([
            "grimoire",
            "houses",
            "--api",
            "http://127.0.0.1:4000",
            "edit",
            "6f1c1c5e-8d0b-4c7e-9a55-2b5f3c9d0e11",
            "--traits",
            "brave, bold",
        ])
        .unwrap();
        let Command::Houses { remote, action: HouseAction::Edit { id, fields } } = cli.command else {
            panic!("houses edit expected");
        };
        assert_eq!(remote.api, "http://127.0.0.1:4000");
        assert_eq!(id, "6f1c1c5e-8d0b-4c7e-9a55-2b5f3c9d0e11");
        assert_eq!(fields.traits.as_deref(), Some("brave, bold"));
    }
}
