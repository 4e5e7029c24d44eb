//! Command-line front end for storekeep collections.
//!
//! # Responsibility
//! - Resolve connection settings the same way library callers do.
//! - Expose get/list/upsert/delete/seed over one entity collection.
//! - Print results as JSON on stdout, diagnostics on stderr.
//!
//! # Invariants
//! - Configuration failures exit with code 2 before touching the store.
//! - Connection strings are only ever printed masked.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use storekeep_core::service::{default_movies, seed_if_empty};
use storekeep_core::{
    init_logging, open_collection_store, Author, Book, ConfigError, ConnectionConfig,
    ConnectionResolver, DatabaseProvider, Entity, EntityService, JsonSettings, LogSettings,
    MissingConnectionPolicy, Movie, ProcessEnv, RepoError, ResolverDefaults, RetryPolicy,
    ServiceError, SettingsSource, SqliteEntityRepository, Student,
};

#[derive(Parser, Debug)]
#[command(
    name = "storekeep",
    version,
    about = "Inspect and edit storekeep entity collections"
)]
struct Cli {
    /// JSON settings file (e.g. appsettings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Settings prefix; env vars use its upper-cased form
    #[arg(long, global = true, default_value = "Storekeep")]
    provider: String,

    /// Connection string used when settings and env name none
    #[arg(long, global = true)]
    default_connection: Option<String>,

    /// Write rolling log files to this absolute directory
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one entity by id (`null` when absent)
    Get(IdArgs),
    /// List entities with optional name filter, sorting and paging
    List(ListArgs),
    /// Insert or replace an entity from a JSON document
    Upsert(UpsertArgs),
    /// Delete an entity by id (missing ids are not an error)
    Delete(IdArgs),
    /// Insert the built-in movie catalogue when the collection is empty
    Seed,
    /// Print core linkage and version
    Ping,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Kind {
    Student,
    Movie,
    Book,
    Author,
}

#[derive(Args, Debug)]
struct IdArgs {
    #[arg(value_enum)]
    kind: Kind,
    id: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(value_enum)]
    kind: Kind,
    /// Name substring filter
    #[arg(long)]
    filter: Option<String>,
    /// `<field>` or `<field> asc|desc`
    #[arg(long, default_value = "")]
    sort: String,
    #[arg(long, default_value_t = 0)]
    skip: usize,
    /// 0 uses the default page size
    #[arg(long, default_value_t = 0)]
    take: usize,
}

#[derive(Args, Debug)]
struct UpsertArgs {
    #[arg(value_enum)]
    kind: Kind,
    /// Entity JSON document
    document: String,
    /// Run find and write inside one write transaction
    #[arg(long)]
    atomic: bool,
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Service(ServiceError),
    Input(String),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Service(ServiceError::Repo(RepoError::Configuration(_))) => 2,
            Self::Service(_) | Self::Input(_) => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Input(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Service(ServiceError::Repo(value))
    }
}

/// Calls `$op::<Entity>` for the entity kind chosen on the command line.
macro_rules! dispatch {
    ($kind:expr, $op:ident, $($arg:expr),*) => {
        match $kind {
            Kind::Student => $op::<Student>($($arg),*),
            Kind::Movie => $op::<Movie>($($arg),*),
            Kind::Book => $op::<Book>($($arg),*),
            Kind::Author => $op::<Author>($($arg),*),
        }
    };
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("storekeep: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Ping = cli.command {
        println!("storekeep_core ping={}", storekeep_core::ping());
        println!("storekeep_core version={}", storekeep_core::core_version());
        return Ok(());
    }

    let settings: Box<dyn SettingsSource> = match &cli.settings {
        Some(path) => Box::new(JsonSettings::from_json_file(path)?),
        None => Box::new(HashMap::<String, String>::new()),
    };
    let env = ProcessEnv;
    start_logging(&cli, settings.as_ref(), &env);

    let ctx = Context {
        settings,
        env,
        resolver: resolver_for(&cli),
        default_connection: cli.default_connection.clone(),
        provider: DatabaseProvider::from_env(&ProcessEnv)?,
    };

    match cli.command {
        Command::Get(args) => dispatch!(args.kind, get, &ctx, &args.id),
        Command::List(args) => dispatch!(args.kind, list, &ctx, &args),
        Command::Upsert(args) => dispatch!(args.kind, upsert, &ctx, &args),
        Command::Delete(args) => dispatch!(args.kind, delete, &ctx, &args.id),
        Command::Seed => seed(&ctx),
        Command::Ping => Ok(()),
    }
}

struct Context {
    settings: Box<dyn SettingsSource>,
    env: ProcessEnv,
    resolver: ConnectionResolver,
    default_connection: Option<String>,
    provider: DatabaseProvider,
}

impl Context {
    fn config_for<T: Entity>(&self) -> Result<ConnectionConfig, CliError> {
        let mut defaults = ResolverDefaults::for_entity::<T>();
        if let Some(connection) = &self.default_connection {
            defaults = defaults.with_connection_string(connection.clone());
        }
        Ok(self
            .resolver
            .resolve(self.settings.as_ref(), &self.env, &defaults)?)
    }

    fn open<T: Entity>(&self) -> Result<(Connection, ConnectionConfig), CliError> {
        let config = self.config_for::<T>()?;
        let conn = open_collection_store(
            &config,
            self.provider.provisioning_strategy(),
            RetryPolicy::default(),
        )?;
        info!(
            "event=cli_open module=cli status=ok entity={} provider={} connection={}",
            T::KIND,
            self.provider,
            config.masked_connection_string()
        );
        Ok((conn, config))
    }
}

fn resolver_for(cli: &Cli) -> ConnectionResolver {
    let policy = if cli.default_connection.is_some() {
        MissingConnectionPolicy::UseDefault
    } else {
        MissingConnectionPolicy::Fail
    };
    ConnectionResolver::new(cli.provider.clone()).with_policy(policy)
}

fn start_logging(cli: &Cli, settings: &dyn SettingsSource, env: &dyn SettingsSource) {
    let resolved = LogSettings::resolve(settings, env);
    let level = cli.log_level.clone().unwrap_or(resolved.level);
    let Some(log_dir) = cli.log_dir.clone().or(resolved.log_dir) else {
        return;
    };
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("storekeep: logging disabled: {err}");
    }
}

fn parse_id<T: Entity>(raw: &str) -> Result<T::Id, CliError>
where
    T::Id: FromStr,
    <T::Id as FromStr>::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|err| CliError::Input(format!("{} id `{raw}`: {err}", T::KIND)))
}

fn render_json(value: &impl serde::Serialize) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::Input(format!("cannot render output: {err}")))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", render_json(value)?);
    Ok(())
}

fn get<T: Entity>(ctx: &Context, raw_id: &str) -> Result<(), CliError>
where
    T::Id: FromStr,
    <T::Id as FromStr>::Err: Display,
{
    let id = parse_id::<T>(raw_id)?;
    let (conn, config) = ctx.open::<T>()?;
    let service = EntityService::new(SqliteEntityRepository::<T>::try_new(&conn, &config)?);
    // Absent ids print `null`.
    print_json(&service.get(&id)?)
}

fn list<T: Entity>(ctx: &Context, args: &ListArgs) -> Result<(), CliError> {
    let (conn, config) = ctx.open::<T>()?;
    let service = EntityService::new(SqliteEntityRepository::<T>::try_new(&conn, &config)?);
    let page = service.get_list(args.skip, args.take, &args.sort, args.filter.as_deref())?;
    print_json(&page)
}

fn upsert<T: Entity>(ctx: &Context, args: &UpsertArgs) -> Result<(), CliError> {
    let entity: T = serde_json::from_str(&args.document)
        .map_err(|err| CliError::Input(format!("{} document: {err}", T::KIND)))?;
    let (conn, config) = ctx.open::<T>()?;
    let service = EntityService::new(SqliteEntityRepository::<T>::try_new(&conn, &config)?);
    let outcome = if args.atomic {
        service.save_atomic(&entity)?
    } else {
        service.save(&entity)?
    };
    print_json(&serde_json::json!({
        "id": entity.id().to_string(),
        "outcome": format!("{outcome:?}").to_ascii_lowercase(),
    }))
}

fn delete<T: Entity>(ctx: &Context, raw_id: &str) -> Result<(), CliError>
where
    T::Id: FromStr,
    <T::Id as FromStr>::Err: Display,
{
    let id = parse_id::<T>(raw_id)?;
    let (conn, config) = ctx.open::<T>()?;
    let service = EntityService::new(SqliteEntityRepository::<T>::try_new(&conn, &config)?);
    let outcome = service.delete(&id)?;
    print_json(&serde_json::json!({
        "id": id.to_string(),
        "removed": outcome.removed,
    }))
}

fn seed(ctx: &Context) -> Result<(), CliError> {
    let (conn, config) = ctx.open::<Movie>()?;
    let repo = SqliteEntityRepository::<Movie>::try_new(&conn, &config)?;
    let inserted = seed_if_empty(&repo, &default_movies())?;
    print_json(&serde_json::json!({ "inserted": inserted }))
}
