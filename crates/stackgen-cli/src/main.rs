//! Stackgen CLI - FastAPI and React project scaffolding

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use stackgen_core::archive::{self, ArchiveOptions};
use stackgen_core::clean::{self, CleanScope};
use stackgen_core::tui::NewArgs;
use stackgen_core::{
    Backend, CancelFlag, Defaults, Frontend, PackageManager, PlanFormat, ScriptLanguage, Settings,
    Styling,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "stackgen")]
#[command(about = "CLI for scaffolding FastAPI + React project skeletons")]
#[command(version)]
pub struct Args {
    /// Print debug diagnostics to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    New(NewCommand),
    /// Remove Python and Node build artifacts and caches
    Clean(CleanCommand),
    /// Zip a project directory, skipping caches
    Zip(ZipCommand),
    /// Print a directory tree
    Tree(TreeCommand),
}

#[derive(Parser, Debug, Default)]
pub struct NewCommand {
    /// Project name (also the directory name)
    pub name: Option<String>,

    /// Parent directory to create the project in
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Backend framework
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Frontend framework
    #[arg(long, value_enum)]
    pub frontend: Option<Frontend>,

    /// Styling solution for the frontend
    #[arg(long, value_enum)]
    pub styling: Option<Styling>,

    /// Package manager
    #[arg(short, long = "package-manager", value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Frontend language
    #[arg(short, long, value_enum)]
    pub language: Option<ScriptLanguage>,

    /// Add Dockerfiles and a docker-compose.yml
    #[arg(long)]
    pub docker: bool,

    /// Skip the extended frontend folder structure
    #[arg(long = "no-structure")]
    pub no_structure: bool,

    /// Install the common frontend packages
    #[arg(long = "common-packages")]
    pub common_packages: bool,

    /// Add the ML workspace to the backend (data, models, notebooks, scripts)
    #[arg(long)]
    pub ml: bool,

    /// Do not run package installs
    #[arg(long = "no-install")]
    pub no_install: bool,

    /// Generate into an existing non-empty directory
    #[arg(long)]
    pub overwrite: bool,

    /// Print the plan without executing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Dry-run output format
    #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
    pub format: PlanFormat,

    /// Skip checking that the required tools are installed
    #[arg(long = "skip-checks")]
    pub skip_checks: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Timeout for each external command, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Settings file (default: $STACKGEN_CONFIG, then ./stackgen.yaml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl NewCommand {
    /// Choices given on the command line; switches only count when set
    fn choices(&self) -> Defaults {
        Defaults {
            backend: self.backend,
            frontend: self.frontend,
            styling: self.styling,
            package_manager: self.package_manager,
            language: self.language,
            docker: self.docker.then_some(true),
            folder_structure: self.no_structure.then_some(false),
            common_packages: self.common_packages.then_some(true),
            ml_workspace: self.ml.then_some(true),
            install: self.no_install.then_some(false),
        }
    }

    fn into_new_args(self, settings: &Settings) -> NewArgs {
        let command_timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| settings.command_timeout());

        NewArgs {
            choices: self.choices(),
            defaults: settings.defaults.clone(),
            name: self.name,
            directory: self.dir,
            overwrite: self.overwrite,
            dry_run: self.dry_run,
            format: self.format,
            skip_checks: self.skip_checks,
            yes: self.yes,
            command_timeout,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CleanCommand {
    /// Directory to clean
    pub path: PathBuf,

    /// Only Python artifacts
    #[arg(long, conflicts_with = "node")]
    pub python: bool,

    /// Only Node artifacts
    #[arg(long)]
    pub node: bool,

    /// List what would be removed without removing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl CleanCommand {
    fn scope(&self) -> CleanScope {
        if self.python {
            CleanScope::Python
        } else if self.node {
            CleanScope::Node
        } else {
            CleanScope::All
        }
    }
}

#[derive(Parser, Debug)]
pub struct ZipCommand {
    /// Directory to archive
    pub path: PathBuf,

    /// Output file (default: <name>_<timestamp>.zip)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Remove caches and build artifacts before zipping
    #[arg(long)]
    pub clean: bool,

    /// Compression level, 0 (store) to 9
    #[arg(long, default_value_t = i64::from(archive::DEFAULT_LEVEL), allow_hyphen_values = true)]
    pub level: i64,

    /// Additional file or directory names to leave out (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct TreeCommand {
    /// Directory to print
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Additional names to leave out (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // First Ctrl+C stops before the next operation, a second one exits
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        if handler_flag.is_cancelled() {
            stackgen_core::exec::terminate_running();
            std::process::exit(130);
        }
        handler_flag.cancel();
    })
    .ok();

    let args = Args::parse();
    stackgen_core::logging::init(args.verbose);

    // Handle subcommands
    let result = match args.command {
        Some(Command::New(new_args)) => run_new(new_args, cancel).await,
        Some(Command::Clean(clean_args)) => run_clean(clean_args),
        Some(Command::Zip(zip_args)) => run_zip(zip_args),
        Some(Command::Tree(tree_args)) => run_tree(tree_args),
        // No subcommand provided, default to new (interactive mode)
        None => run_new(NewCommand::default(), cancel).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

async fn run_new(command: NewCommand, cancel: CancelFlag) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (settings, source) = Settings::load(command.config.as_deref(), &cwd)?;
    if let Some(path) = source {
        tracing::debug!(path = %path.display(), "loaded settings");
    }

    stackgen_core::run(command.into_new_args(&settings), cancel).await
}

fn run_clean(command: CleanCommand) -> Result<()> {
    let scope = command.scope();

    let verb = if command.dry_run { "Would remove" } else { "Removing" };
    println!(
        "{}",
        format!("{} build artifacts under {}", verb, command.path.display())
            .cyan()
            .bold()
    );
    println!();

    let report = clean::clean(&command.path, scope, command.dry_run)?;

    for entry in &report.removed {
        println!(
            "  {} {} ({})",
            "->".blue(),
            display_relative(&entry.path, &command.path),
            clean::format_size(entry.bytes)
        );
    }
    for (path, error) in &report.failed {
        eprintln!("{} {}: {}", "Warning:".yellow(), path.display(), error);
    }

    println!();
    let summary = if report.dry_run { "Would free" } else { "Freed" };
    println!(
        "{} {} in {} item(s)",
        summary.green().bold(),
        clean::format_size(report.bytes_freed()),
        report.removed.len()
    );

    Ok(())
}

fn run_zip(command: ZipCommand) -> Result<()> {
    let options = ArchiveOptions {
        output: command.output,
        clean_first: command.clean,
        exclude: command.exclude,
        ..Default::default()
    }
    .with_level(command.level);

    print!(
        "  {} {} (level {})...",
        "->".blue(),
        command.path.display(),
        options.level
    );

    match archive::archive(&command.path, &options) {
        Ok(report) => {
            println!(" {}", "done".green());
            if let Some(cleaned) = &report.cleaned {
                println!(
                    "  Cleaned {} item(s), freed {}",
                    cleaned.removed.len(),
                    clean::format_size(cleaned.bytes_freed())
                );
            }
            println!();
            println!(
                "{} {} file(s) into {} ({})",
                "Archived".green().bold(),
                report.files,
                report.output.display(),
                clean::format_size(report.archive_bytes)
            );
            Ok(())
        }
        Err(e) => {
            println!(" {}", "failed".red());
            Err(e)
        }
    }
}

fn run_tree(command: TreeCommand) -> Result<()> {
    print!(
        "{}",
        stackgen_core::tree::render_tree(&command.path, &command.exclude)?
    );
    Ok(())
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
