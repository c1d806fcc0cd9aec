use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use diff_tree::{extract_diff_from_html, FileChange, TreeNode, ViewMode, ViewSession};
use diff_tree_client::{
    loader, ApiCache, CacheMode, CachedChangesClient, ChangesClient, GitLabClient,
};
use diff_tree_config::AppConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

mod logger;
mod output;

#[derive(Parser)]
#[command(
    name = "difftree",
    version,
    about = "Browse the changed files of a commit or branch comparison as a folder tree"
)]
struct Cli {
    /// Listing style (overrides the config file)
    #[arg(long, global = true, value_enum)]
    view: Option<ViewArg>,

    /// Syntax highlighting theme (overrides the config file)
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Skip the response cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Fetch fresh responses but still store them
    #[arg(long, global = true)]
    refresh: bool,

    /// Write logs to the cache directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Tree,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Tree => ViewMode::Tree,
            ViewArg::List => ViewMode::List,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show a change-record JSON file as a folder tree
    Tree {
        changes: PathBuf,
    },
    /// Show a change-record JSON file as a flat, sorted list
    List {
        changes: PathBuf,
    },
    /// Render one file's diff from a change-record JSON file
    Show {
        changes: PathBuf,
        path: String,
        /// Print the HTML table instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Rebuild unified diff text from a saved HTML diff fragment
    Extract {
        fragment: PathBuf,
    },
    /// Changed files of a commit
    Commit {
        project: String,
        sha: String,
        /// Also render the diff of this file
        #[arg(long)]
        show: Option<String>,
    },
    /// Changed files between two refs
    Compare {
        project: String,
        from: String,
        to: String,
        /// Also render the diff of this file
        #[arg(long)]
        show: Option<String>,
    },
    /// Commit history of a ref
    Log {
        project: String,
        #[arg(default_value = "main")]
        ref_name: String,
    },
    /// Print a file's contents at a ref
    File {
        project: String,
        path: String,
        #[arg(default_value = "main")]
        git_ref: String,
    },
    /// Manage the on-disk response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop cached responses, optionally only those of one project
    Clear {
        #[arg(long)]
        project: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_file) = logger::init(cli.log_file)? {
        eprintln!("Logging to {}", log_file.display());
    }

    // A missing .env is fine
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let config = AppConfig::load();
    log::debug!("Using host {}", config.host);

    match &cli.command {
        Commands::Tree { changes } => {
            let session = session(&cli, &config, "local", None).with_view_mode(ViewMode::Tree);
            print_tree(&session, &load_local(changes)?);
        }
        Commands::List { changes } => {
            let session = session(&cli, &config, "local", None).with_view_mode(ViewMode::List);
            print_tree(&session, &load_local(changes)?);
        }
        Commands::Show {
            changes,
            path,
            html,
        } => {
            let session = session(&cli, &config, "local", None);
            let tree = session.build_tree(&load_local(changes)?);
            show_file(&session, &tree, path, *html)?;
        }
        Commands::Extract { fragment } => {
            let html = read_file(fragment)?;
            let diff = extract_diff_from_html(&html);
            if diff.is_empty() {
                log::warn!("No diff lines found in {}", fragment.display());
            } else {
                println!("{}", diff);
            }
        }
        Commands::Commit { project, sha, show } => {
            let client = client(&cli, &config)?;
            let files = loader::load_commit(&client, project, sha)
                .await
                .with_context(|| format!("Failed to load commit {} of {}", sha, project))?;

            let session = session(&cli, &config, project, Some(sha.as_str()));
            let tree = print_tree(&session, &files);
            if let Some(path) = show {
                println!();
                show_file(&session, &tree, path, false)?;
            }
            save_cache(&client);
        }
        Commands::Compare {
            project,
            from,
            to,
            show,
        } => {
            let client = client(&cli, &config)?;
            let files = loader::load_compare(&client, project, from, to)
                .await
                .with_context(|| format!("Failed to compare {}...{} in {}", from, to, project))?;

            let session = session(&cli, &config, project, Some(to.as_str()));
            let tree = print_tree(&session, &files);
            if let Some(path) = show {
                println!();
                show_file(&session, &tree, path, false)?;
            }
            save_cache(&client);
        }
        Commands::Log { project, ref_name } => {
            let client = client(&cli, &config)?;
            let commits = client
                .fetch_commits(project, ref_name)
                .await
                .with_context(|| format!("Failed to list commits of {} @ {}", project, ref_name))?;
            print!("{}", output::format_commits(&commits));
            save_cache(&client);
        }
        Commands::File {
            project,
            path,
            git_ref,
        } => {
            let client = client(&cli, &config)?;
            let content = client
                .fetch_file_raw(project, path, git_ref)
                .await
                .with_context(|| format!("Failed to fetch {} @ {} of {}", path, git_ref, project))?;
            print!("{}", content);
            save_cache(&client);
        }
        Commands::Cache {
            action: CacheAction::Clear { project },
        } => {
            let mut cache = open_cache()?;
            match project {
                Some(project) => cache.invalidate_project(project),
                None => cache.clear(),
            }
            cache.save()?;
            if let Some(file) = cache.file() {
                println!("{} entries left in {}", cache.stats().entries, file.display());
            }
        }
    }

    Ok(())
}

fn session(cli: &Cli, config: &AppConfig, project: &str, git_ref: Option<&str>) -> ViewSession {
    let theme = cli.theme.as_deref().unwrap_or(&config.theme);
    let view_mode = cli.view.map(ViewMode::from).unwrap_or(config.view_mode);

    let session = ViewSession::with_theme(project, theme).with_view_mode(view_mode);
    match git_ref {
        Some(git_ref) => session.with_ref(git_ref),
        None => session,
    }
}

fn client(cli: &Cli, config: &AppConfig) -> Result<CachedChangesClient<GitLabClient>> {
    let token = config.token();
    if token.is_none() {
        log::info!(
            "{} is not set; only public projects are reachable",
            config.token_env
        );
    }

    let mode = if cli.no_cache || !config.cache {
        CacheMode::None
    } else if cli.refresh {
        CacheMode::WriteOnly
    } else {
        CacheMode::ReadWrite
    };

    let cache = if mode == CacheMode::None {
        ApiCache::default()
    } else {
        open_cache().unwrap_or_else(|e| {
            log::warn!("Starting with an empty cache: {:#}", e);
            ApiCache::default()
        })
    };

    let direct = GitLabClient::new(&config.host, token)?;
    Ok(CachedChangesClient::new(
        direct,
        Arc::new(Mutex::new(cache)),
        mode,
    ))
}

fn open_cache() -> Result<ApiCache> {
    ApiCache::new(diff_tree_config::api_cache_path()?)
}

fn save_cache(client: &CachedChangesClient<GitLabClient>) {
    log::debug!("Cache: {:?}", client.cache_stats());
    if let Err(e) = client.save_cache() {
        log::warn!("Failed to save cache: {:#}", e);
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_local(path: &Path) -> Result<Vec<FileChange>> {
    let records = output::parse_changes(&read_file(path)?)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(FileChange::from_raw_list(&records, None))
}

fn print_tree(session: &ViewSession, files: &[FileChange]) -> TreeNode {
    let tree = session.build_tree(files);
    print!("{}", output::format_rows(&session.rows(&tree)));
    println!("{}", output::format_summary(&tree));
    tree
}

fn show_file(session: &ViewSession, tree: &TreeNode, path: &str, html: bool) -> Result<()> {
    let rendered = session
        .render_path(tree, path)
        .with_context(|| format!("{} is not part of this change set", path))?;

    if html {
        println!("{}", rendered.to_html());
    } else {
        print!("{}", output::format_plain_diff(&rendered));
    }
    Ok(())
}
