//! Subcommand execution.

use crate::cli::{Command, HouseAction, HouseFields, ListArgs, ServeArgs, SpellAction, SpellFields};
use grimoire_client::{
    describe_filters, parse_base_url, render_cards, render_text, ClientError, HttpTransport,
    ListControls, LoadOutcome, SyncController, ViewEntity,
};
use grimoire_core::model::house::parse_traits;
use grimoire_core::query::SortOrder;
use grimoire_core::{
    core_version, init_logging, init_stderr_logging, parse_record_id, House, HouseDraft,
    LoggingError, RecordId, Spell, SpellDraft,
};
use grimoire_http::{Config, ConfigError, ServeError};
use thiserror::Error;

const CLIENT_LOG_LEVEL: &str = "warn";

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("could not start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("`{0}` is not a valid record id")]
    InvalidId(String),

    #[error("could not load list: {0}")]
    Load(String),
}

pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve(args) => serve(args),
        Command::Spells { remote, action } => {
            init_stderr_logging(CLIENT_LOG_LEVEL)?;
            let mut controller = connect::<Spell>(&remote.api)?;
            spells(&mut controller, action)
        }
        Command::Houses { remote, action } => {
            init_stderr_logging(CLIENT_LOG_LEVEL)?;
            let mut controller = connect::<House>(&remote.api)?;
            houses(&mut controller, action)
        }
        Command::Version => {
            println!("grimoire_core version={}", core_version());
            Ok(())
        }
    }
}

fn serve(args: ServeArgs) -> Result<(), CliError> {
    let mut config = Config::load()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(dir) = args.log_dir {
        config.log_dir = Some(dir);
    }

    match &config.log_dir {
        Some(dir) => init_logging(&config.log_level, &dir.to_string_lossy()),
        None => init_stderr_logging(&config.log_level),
    }?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(grimoire_http::serve(&config))?;
    Ok(())
}

type Controller<R> = SyncController<R, HttpTransport>;

fn connect<R: ViewEntity>(api: &str) -> Result<Controller<R>, CliError> {
    let base = parse_base_url(api)?;
    let transport = HttpTransport::new().map_err(ClientError::from)?;
    Ok(SyncController::new(transport, base))
}

fn spells(controller: &mut Controller<Spell>, action: SpellAction) -> Result<(), CliError> {
    match action {
        SpellAction::List { list, kind } => {
            let html = list.html;
            let mut controls = list_controls(list);
            controls.filter = kind.unwrap_or_default();
            show_list(controller, controls, html)
        }
        SpellAction::Add(fields) => {
            let spell = controller.create(&SpellDraft {
                name: fields.name,
                kind: fields.kind,
                description: fields.description,
            })?;
            println!("Spell created successfully: {}", spell.card_text());
            Ok(())
        }
        SpellAction::Edit { id, fields } => {
            let updates = [
                ("name", fields.name),
                ("type", fields.kind),
                ("description", fields.description),
            ];
            let spell = edit(controller, &id, updates)?;
            println!("Spell updated successfully: {}", spell.card_text());
            Ok(())
        }
        SpellAction::Delete { id } => {
            let spell = controller.delete(record_id(&id)?)?;
            println!("Spell deleted successfully: {}", spell.name);
            Ok(())
        }
    }
}

fn houses(controller: &mut Controller<House>, action: HouseAction) -> Result<(), CliError> {
    match action {
        HouseAction::List {
            list,
            head,
            trait_filter,
        } => {
            let html = list.html;
            let mut controls = list_controls(list);
            controls.filter = head.unwrap_or_default();
            controls.trait_filter = trait_filter.unwrap_or_default();
            show_list(controller, controls, html)
        }
        HouseAction::Add(fields) => {
            let house = controller.create(&house_draft(fields))?;
            println!("House created successfully: {}", house.card_text());
            Ok(())
        }
        HouseAction::Edit { id, fields } => {
            let updates = [
                ("name", fields.name),
                ("colors", fields.colors),
                ("symbol", fields.symbol),
                ("head", fields.head),
                ("traits", fields.traits),
                ("description", fields.description),
            ];
            let house = edit(controller, &id, updates)?;
            println!("House updated successfully: {}", house.card_text());
            Ok(())
        }
        HouseAction::Delete { id } => {
            let house = controller.delete(record_id(&id)?)?;
            println!("House deleted successfully: {}", house.name);
            Ok(())
        }
        HouseAction::Sort => {
            load(controller)?;
            match controller.pick_random() {
                Some(house) => println!("The sorting hat chose {}", house.card_text()),
                None => println!("No houses found"),
            }
            Ok(())
        }
    }
}

fn house_draft(fields: HouseFields) -> HouseDraft {
    HouseDraft {
        name: fields.name,
        colors: fields.colors,
        symbol: fields.symbol,
        head: fields.head,
        traits: fields.traits.as_deref().map(parse_traits),
        description: fields.description,
    }
}

fn list_controls(list: ListArgs) -> ListControls {
    ListControls {
        search: list.search.unwrap_or_default(),
        sort_by: list.sort_by.unwrap_or_default(),
        order: if list.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        },
        ..ListControls::default()
    }
}

fn show_list<R: ViewEntity>(
    controller: &mut Controller<R>,
    controls: ListControls,
    html: bool,
) -> Result<(), CliError> {
    controller.set_controls(controls);
    load(controller)?;
    let state = controller.state();
    if html {
        println!("{}", render_cards(state.records()));
    } else {
        if let Some(active) = state.applied_filters().and_then(describe_filters) {
            println!("filters: {active}");
        }
        println!("{}", render_text(state.records()));
    }
    Ok(())
}

fn load<R: ViewEntity>(controller: &mut Controller<R>) -> Result<(), CliError> {
    match controller.refresh() {
        LoadOutcome::Loaded(_) | LoadOutcome::Stale => Ok(()),
        LoadOutcome::Fallback(_) => {
            if let Some(notice) = controller.state().error() {
                eprintln!("warning: {notice}");
            }
            Ok(())
        }
        LoadOutcome::Failed(message) => Err(CliError::Load(message)),
    }
}

/// Loads the list, opens the record's edit form, applies `updates` and submits.
fn edit<R: ViewEntity, const N: usize>(
    controller: &mut Controller<R>,
    raw_id: &str,
    updates: [(&str, Option<String>); N],
) -> Result<R, CliError> {
    let id = record_id(raw_id)?;
    load(controller)?;
    let mut form = controller.open_edit(id)?;
    for (name, value) in updates {
        if let Some(value) = value {
            form.set(name, value)?;
        }
    }
    Ok(controller.submit_edit(&form)?)
}

fn record_id(raw: &str) -> Result<RecordId, CliError> {
    parse_record_id(raw).ok_or_else(|| CliError::InvalidId(raw.to_string()))
}
