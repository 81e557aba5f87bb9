use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use notebook_config::{get_config_path, Config, ConfigError};
use notebook_output::*;
use notebook_store::{Repository, UserMapper, UserRepository};
use notebook_types::User;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod menu;
mod search;

use menu::Menu;
use search::{build_pattern, search_users};

const MAIN_HELP: &str = r#"A small contact notebook kept in a plain text file, one record per line.

Each record has a numeric id, a first name, a last name and a phone number.
Ids are assigned on `notebook create` and never change. `notebook update`
only touches the fields you pass, so `--phone` alone keeps the names as they
are.

Run `notebook menu` for an interactive prompt, or use the subcommands below
from scripts. The store lives at ~/.local/share/notebook/db.txt unless
`store.path` in the config file or `--db` says otherwise.

See `notebook COMMAND --help` for more documentation and command-specific options."#;

#[derive(Parser)]
#[command(name = "notebook")]
#[command(about = MAIN_HELP)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(long, global = true, help = "Store file to use instead of the configured one")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List all users.")]
    List,

    #[command(about = "Add a user and print its new id.")]
    Create {
        #[arg(help = "First name")]
        first_name: String,
        #[arg(help = "Last name")]
        last_name: String,
        #[arg(help = "Phone number")]
        phone: String,
    },

    #[command(about = "Show a single user.")]
    Show {
        #[arg(help = "User id")]
        id: u64,
    },

    #[command(about = "Change some fields of a user. Omitted fields are kept.")]
    Update {
        #[arg(help = "User id")]
        id: u64,
        #[arg(short = 'f', long, default_value = "", help = "New first name")]
        first_name: String,
        #[arg(short = 'l', long, default_value = "", help = "New last name")]
        last_name: String,
        #[arg(short = 'p', long, default_value = "", help = "New phone number")]
        phone: String,
    },

    #[command(about = "Delete a user.")]
    Delete {
        #[arg(help = "User id")]
        id: u64,
    },

    #[command(about = "Search users by regex over names and phone.")]
    Grep {
        #[arg(help = "Regex pattern")]
        pattern: String,
        #[arg(short = 'C', long, help = "Case-sensitive matching")]
        case_sensitive: bool,
    },

    #[command(about = "Write the raw store lines to a file or stdout.")]
    Export {
        #[arg(help = "Destination file (default: stdout)")]
        file: Option<PathBuf>,
    },

    #[command(about = "Replace the store with the lines of a file.")]
    Import {
        #[arg(help = "Source file, one record per line")]
        file: PathBuf,
        #[arg(long, help = "Skip checking that every line is a valid record")]
        no_verify: bool,
    },

    #[command(about = "Interactive prompt.")]
    Menu,

    #[command(about = "Print config file location and contents.")]
    Config,

    #[command(about = "Print help for all commands.")]
    HelpAll,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config => return handle_config(),
        Commands::HelpAll => return handle_help_all(),
        _ => {}
    }

    let config_path = get_config_path();
    let (config, config_error) = load_config(&config_path, cli.db.is_some())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(e) = config_error {
        warn!("Ignoring config {}: {}", config_path.display(), e);
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    debug!("Using store {}", db_path.display());
    let repo = UserRepository::open(&db_path)
        .with_context(|| format!("Failed to open store {}", db_path.display()))?;

    match cli.command {
        Commands::List => handle_list(&repo, cli.json),
        Commands::Create {
            first_name,
            last_name,
            phone,
        } => handle_create(&repo, cli.json, User::new(first_name, last_name, phone)),
        Commands::Show { id } => handle_show(&repo, cli.json, id),
        Commands::Update {
            id,
            first_name,
            last_name,
            phone,
        } => handle_update(&repo, cli.json, id, User::new(first_name, last_name, phone)),
        Commands::Delete { id } => handle_delete(&repo, cli.json, id),
        Commands::Grep {
            pattern,
            case_sensitive,
        } => handle_grep(&repo, cli.json, &pattern, case_sensitive),
        Commands::Export { file } => handle_export(&repo, file),
        Commands::Import { file, no_verify } => handle_import(&repo, file, no_verify),
        Commands::Menu => {
            let stdin = io::stdin();
            Menu::new(repo, stdin.lock(), io::stdout()).run()?;
            Ok(())
        }
        Commands::Config | Commands::HelpAll => unreachable!(),
    }
}

/// Loads the config file. With an explicit store path nothing else in it is
/// essential, so a broken file falls back to defaults and the error is handed
/// back for logging.
fn load_config(config_path: &Path, db_override: bool) -> Result<(Config, Option<ConfigError>)> {
    match Config::load_from(config_path) {
        Ok(config) => Ok((config, None)),
        Err(e) if db_override => Ok((Config::default(), Some(e))),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to load config {}", config_path.display()))
        }
    }
}

fn handle_help_all() -> Result<()> {
    use clap::CommandFactory;

    let mut cmd = Cli::command();

    cmd.write_long_help(&mut io::stdout())?;
    println!("\n");

    let subcommands: Vec<_> = cmd
        .get_subcommands()
        .map(|c| c.get_name().to_string())
        .collect();
    for name in subcommands {
        if name == "help-all" || name == "help" {
            continue;
        }
        let mut subcmd = Cli::command();
        if let Some(sub) = subcmd.find_subcommand_mut(&name) {
            println!("{}", "━".repeat(80));
            println!("notebook {}", name);
            println!("{}\n", "━".repeat(80));
            sub.write_long_help(&mut io::stdout())?;
            println!("\n");
        }
    }

    Ok(())
}

fn handle_config() -> Result<()> {
    let config_path = get_config_path();
    println!("Config file: {}", config_path.display());
    println!();

    if config_path.exists() {
        println!("{}", std::fs::read_to_string(&config_path)?);
        if let Err(e) = Config::load_from(&config_path) {
            println!("(invalid, using defaults: {})", e);
        }
    } else {
        println!("(file does not exist, using defaults)");
    }
    Ok(())
}

fn handle_list(repo: &impl Repository, json_output: bool) -> Result<()> {
    let users = repo.find_all()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else {
        println!("{}", format_users(&users));
    }
    Ok(())
}

fn require_fields(user: &User) -> Result<()> {
    let missing = user.missing_fields();
    if !missing.is_empty() {
        bail!("Required: {}", missing.join(", "));
    }
    Ok(())
}

fn handle_create(repo: &impl Repository, json_output: bool, user: User) -> Result<()> {
    require_fields(&user)?;
    let created = repo.create(user)?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("{}", format_created(&created));
    }
    Ok(())
}

fn handle_show(repo: &impl Repository, json_output: bool, id: u64) -> Result<()> {
    let user = repo
        .find_by_id(id)?
        .ok_or_else(|| anyhow!("No user with id {}", id))?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("{}", format_user(&user));
    }
    Ok(())
}

fn handle_update(repo: &impl Repository, json_output: bool, id: u64, patch: User) -> Result<()> {
    let updated = repo
        .update(id, patch)?
        .ok_or_else(|| anyhow!("No user with id {}", id))?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!("{}", format_updated(id, Some(&updated)));
    }
    Ok(())
}

fn handle_delete(repo: &impl Repository, json_output: bool, id: u64) -> Result<()> {
    let deleted = repo.delete(id)?;
    if json_output {
        println!("{}", serde_json::json!({ "id": id, "deleted": deleted }));
    } else {
        println!("{}", format_deleted(id, deleted));
    }
    Ok(())
}

fn handle_grep(
    repo: &impl Repository,
    json_output: bool,
    pattern: &str,
    case_sensitive: bool,
) -> Result<()> {
    let regex = build_pattern(pattern, case_sensitive)?;
    let found = search_users(repo.find_all()?, &regex);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        println!("{}", format_users(&found));
    }
    Ok(())
}

fn handle_export(repo: &impl Repository, file: Option<PathBuf>) -> Result<()> {
    let lines = repo.read_all()?;
    match file {
        Some(path) => {
            std::fs::write(&path, export_content(&lines))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported {} line(s) to {}", lines.len(), path.display());
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// One `\n`-terminated line per entry; nothing at all for an empty store.
fn export_content(lines: &[String]) -> String {
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    content
}

fn handle_import(repo: &impl Repository, file: PathBuf, no_verify: bool) -> Result<()> {
    let reader = io::BufReader::new(
        std::fs::File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;

    if !no_verify {
        if let Err((line, e)) = UserMapper::new().verify_lines(&lines) {
            bail!("{}:{}: {}", file.display(), line, e);
        }
    }

    repo.save_all(&lines)?;
    eprintln!("Imported {} line(s) from {}", lines.len(), file.display());
    Ok(())
}
