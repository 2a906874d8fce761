//! Set Finder - resolve an MTG card list and see which sets it comes from.

use clap::{Args as ClapArgs, Parser, Subcommand};
use set_finder::formatters::{
    export_set_view_csv, format_color_view, format_custom_view, format_found_cards,
    format_set_view, format_unfound,
};
use set_finder::{
    fetch_valid_set_codes, format_card_list, group_by_color, group_by_custom, group_by_set,
    list_parser, AppError, AppResult, CachedSetCatalog, CardEntry, CardResolver, Collection,
    Config, RarityFilter, ResolveOptions, ResolveResult, ScryfallClient, SessionService,
    SetCache, SortColumn, SortDirection, SortState, SqliteStore, ViewFilter,
};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Resolve MTG card lists against Scryfall and group them by set, color or custom group
#[derive(Parser, Debug)]
#[command(name = "set_finder")]
#[command(version, about, long_about = None)]
struct Args {
    /// Act as this user for this run instead of the stored session
    #[arg(long, global = true)]
    user: Option<String>,

    /// Path to the SQLite database file
    #[arg(long, env = "SET_FINDER_DB", global = true)]
    database: Option<PathBuf>,

    /// Scryfall API base URL
    #[arg(long, env = "SET_FINDER_SCRYFALL_URL", global = true)]
    scryfall_url: Option<String>,

    /// Pause between Scryfall calls in milliseconds
    #[arg(long, global = true)]
    throttle_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a card list file ("-" for stdin) and print the found cards
    Search {
        input: String,
        #[command(flatten)]
        view: ViewArgs,
        /// Keep every printing instead of one per set
        #[arg(long)]
        all_printings: bool,
    },
    /// Show which cards of a list were printed in one set
    InSet { input: String, set: String },
    /// Group a card list by the sets its cards were printed in
    Sets {
        input: String,
        #[command(flatten)]
        view: ViewArgs,
        /// Hide repeated card names within a set
        #[arg(long)]
        hide_duplicates: bool,
        /// Arrange sets into the signed-in user's custom groups
        #[arg(long)]
        custom_groups: bool,
        /// Also write the set view as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Group a card list by color
    Colors {
        input: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Sign in and remember the user for later runs
    Login { user: String },
    /// Forget the stored session
    Logout,
    /// Saved card lists
    #[command(subcommand)]
    List(ListCommand),
    /// Custom set groups
    #[command(subcommand)]
    Group(GroupCommand),
}

#[derive(ClapArgs, Debug)]
struct ViewArgs {
    /// Comma separated rarities to show (default: all)
    #[arg(long)]
    rarity: Option<String>,
    /// Sort column: name, quantity, cn, rarity, type, colors, cost
    #[arg(long)]
    sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    desc: bool,
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    /// Save a card list file under a name, replacing a list of the same name
    Save { name: String, input: String },
    /// Print a saved list in editable form
    Show { list: String },
    /// Resolve a saved list and print the found cards
    Load { list: String },
    Delete { list: String },
    Ls,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create { name: String },
    Rename { group: String, name: String },
    Delete { group: String },
    AddSet { group: String, set: String },
    RemoveSet { group: String, set: String },
    Ls,
}

fn main() {
    // Set RUST_LOG to control the log level, e.g. RUST_LOG=set_finder=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build_config(args: &Args) -> Config {
    let mut config = Config::default();
    if let Some(url) = &args.scryfall_url {
        config.scryfall_base_url = url.clone();
    }
    if let Some(db) = &args.database {
        config.database_path = db.clone();
    }
    if let Some(ms) = args.throttle_ms {
        config.resolver.throttle = Duration::from_millis(ms);
    }
    config
}

fn session_for(args: &Args, config: &Config) -> AppResult<SessionService> {
    match &args.user {
        Some(user) => {
            let session = SessionService::in_memory();
            session.sign_in(user)?;
            Ok(session)
        }
        None => Ok(SessionService::with_file(&config.session_path)),
    }
}

fn run(args: Args) -> AppResult<()> {
    let config = build_config(&args);
    let session = session_for(&args, &config)?;

    match args.command {
        Command::Search {
            input,
            view,
            all_printings,
        } => {
            let entries = read_entries(&input)?;
            let options = ResolveOptions {
                unique_sets_per_card: !all_printings,
            };
            let result = resolve(&config, &entries, &options)?;
            let sort = sort_state(&view, SortColumn::Name)?;
            let cards = view_filter(&view, true).apply_to_cards(&result.found, &sort);
            print!("{}", format_found_cards(&cards));
            print!("{}", format_unfound(&result.unfound));
        }
        Command::InSet { input, set } => {
            let entries = read_entries(&input)?;
            let result = resolve(&config, &entries, &ResolveOptions::default())?;
            let cards: Vec<_> = result.cards_in_set(&set).into_iter().cloned().collect();
            println!("Cards printed in {}:", set.to_uppercase());
            print!("{}", format_found_cards(&cards));
        }
        Command::Sets {
            input,
            view,
            hide_duplicates,
            custom_groups,
            csv,
        } => {
            let entries = read_entries(&input)?;
            let client = client(&config)?;
            let options = ResolveOptions::all_printings();
            let result = resolve_with(&client, &config, &entries, &options);

            let mut cache = SetCache::load(&config.set_cache_path);
            let groups = {
                let mut catalog =
                    CachedSetCatalog::new(&client, &mut cache, config.resolver.throttle);
                group_by_set(&result.found, &mut catalog)
            };
            if let Err(e) = cache.save() {
                log::warn!("Failed to save set cache: {}", e);
            }

            let filter = view_filter(&view, !hide_duplicates);
            let sort = sort_state(&view, SortColumn::CollectorNumber)?;
            if let Some(path) = &csv {
                std::fs::write(path, export_set_view_csv(&groups, &filter, &sort)?)?;
                log::info!("Wrote set view to {}", path.display());
            }

            if custom_groups {
                let collection = open_collection(&config, &session)?;
                let grouping = group_by_custom(groups, &collection.groups()?, &filter.rarities);
                print!("{}", format_custom_view(&grouping, &filter, &sort));
            } else {
                print!("{}", format_set_view(&groups, &filter, &sort));
            }
            print!("{}", format_unfound(&result.unfound));
        }
        Command::Colors { input, view } => {
            let entries = read_entries(&input)?;
            let result = resolve(&config, &entries, &ResolveOptions::default())?;
            let sort = sort_state(&view, SortColumn::Name)?;
            let cards = view_filter(&view, true).apply_to_cards(&result.found, &sort);
            print!("{}", format_color_view(&group_by_color(&cards), &sort));
            print!("{}", format_unfound(&result.unfound));
        }
        Command::Login { user } => {
            let session = SessionService::with_file(&config.session_path);
            let signed_in = session.sign_in(&user)?;
            println!("Signed in as {}", signed_in.user_id);
        }
        Command::Logout => {
            SessionService::with_file(&config.session_path).sign_out()?;
            println!("Signed out");
        }
        Command::List(cmd) => run_list(cmd, &config, &session)?,
        Command::Group(cmd) => run_group(cmd, &config, &session)?,
    }
    Ok(())
}

fn run_list(cmd: ListCommand, config: &Config, session: &SessionService) -> AppResult<()> {
    let mut collection = open_collection(config, session)?;
    match cmd {
        ListCommand::Save { name, input } => {
            let entries = read_entries(&input)?;
            let list = match collection.find_list(&name) {
                Ok(existing) => collection.update_list(&existing.id, None, &entries)?,
                Err(AppError::NotFound { .. }) => collection.save_list(&name, &entries)?,
                Err(e) => return Err(e),
            };
            println!("Saved '{}' ({} cards, id {})", list.name, list.cards.len(), list.id);
        }
        ListCommand::Show { list } => {
            let list = collection.find_list(&list)?;
            println!("{}", format_card_list(&list.cards));
        }
        ListCommand::Load { list } => {
            let list = collection.find_list(&list)?;
            let result = resolve(config, &list.cards, &ResolveOptions::default())?;
            print!("{}", format_found_cards(&result.found));
            print!("{}", format_unfound(&result.unfound));
        }
        ListCommand::Delete { list } => {
            let list = collection.find_list(&list)?;
            collection.delete_list(&list.id)?;
            println!("Deleted '{}'", list.name);
        }
        ListCommand::Ls => {
            for list in collection.lists()? {
                println!(
                    "{}  {:<30} {:>4} cards  updated {}",
                    list.id,
                    list.name,
                    list.cards.len(),
                    list.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}

fn run_group(cmd: GroupCommand, config: &Config, session: &SessionService) -> AppResult<()> {
    let mut collection = open_collection(config, session)?;
    match cmd {
        GroupCommand::Create { name } => {
            let group = collection.create_group(&name)?;
            println!("Created group '{}' (id {})", group.name, group.id);
        }
        GroupCommand::Rename { group, name } => {
            let group = collection.rename_group(&group, &name)?;
            println!("Renamed group to '{}'", group.name);
        }
        GroupCommand::Delete { group } => {
            collection.delete_group(&group)?;
            println!("Deleted group '{}'", group);
        }
        GroupCommand::AddSet { group, set } => {
            let valid_codes = fetch_valid_set_codes(&client(config)?)?;
            let group = collection.add_set(&group, &set, &valid_codes)?;
            println!("{}: {}", group.name, group.sets.join(", "));
        }
        GroupCommand::RemoveSet { group, set } => {
            let group = collection.remove_set(&group, &set)?;
            println!("{}: {}", group.name, group.sets.join(", "));
        }
        GroupCommand::Ls => {
            for group in collection.groups()? {
                println!("{}  {}: {}", group.id, group.name, group.sets.join(", "));
            }
        }
    }
    Ok(())
}

fn read_entries(input: &str) -> AppResult<Vec<CardEntry>> {
    let entries = if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        list_parser::parse_card_list(&text)
    } else {
        list_parser::read_card_list(input)?
    };
    if entries.is_empty() {
        return Err(AppError::Validation("The card list is empty".to_string()));
    }
    Ok(entries)
}

fn client(config: &Config) -> AppResult<ScryfallClient> {
    Ok(ScryfallClient::with_base_url(
        &config.scryfall_base_url,
        &config.user_agent,
    )?)
}

fn resolve(config: &Config, entries: &[CardEntry], options: &ResolveOptions) -> AppResult<ResolveResult> {
    let client = client(config)?;
    Ok(resolve_with(&client, config, entries, options))
}

fn resolve_with(
    client: &ScryfallClient,
    config: &Config,
    entries: &[CardEntry],
    options: &ResolveOptions,
) -> ResolveResult {
    CardResolver::new(client, config.resolver.clone()).resolve_entries(entries, options)
}

fn open_collection<'s>(
    config: &Config,
    session: &'s SessionService,
) -> AppResult<Collection<'s, SqliteStore>> {
    let store = SqliteStore::open(&config.database_path)?;
    Ok(Collection::new(store, session))
}

fn view_filter(view: &ViewArgs, show_duplicates: bool) -> ViewFilter {
    ViewFilter {
        rarities: view
            .rarity
            .as_deref()
            .map(RarityFilter::parse_list)
            .unwrap_or_default(),
        show_duplicates,
    }
}

fn sort_state(view: &ViewArgs, default_column: SortColumn) -> AppResult<SortState> {
    let column = match &view.sort {
        Some(name) => SortColumn::parse(name)
            .ok_or_else(|| AppError::Validation(format!("Unknown sort column '{}'", name)))?,
        None => default_column,
    };
    let direction = if view.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Ok(SortState::new(column, direction))
}
