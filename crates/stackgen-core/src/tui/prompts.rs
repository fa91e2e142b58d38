//! Charm-style prompts for `stackgen new` using cliclack

use crate::config::{
    Backend, Defaults, Frontend, PackageManager, ProjectConfig, ScriptLanguage,
    DEFAULT_COMMAND_TIMEOUT,
};
use crate::exec::{CancelFlag, ExecutionEvent, Executor};
use crate::orchestrator::{next_steps, prepare};
use crate::plan::{Plan, PlanFormat};
use crate::runtime::check_plan;
use crate::validate::validate_name;
use anyhow::Result;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for the new command
#[derive(Debug, Clone)]
pub struct NewArgs {
    /// Project name
    pub name: Option<String>,

    /// Parent directory the project is created in
    pub directory: Option<PathBuf>,

    /// Choices given as flags; these are never prompted for
    pub choices: Defaults,

    /// Settings-file defaults, used as the initial prompt values
    pub defaults: Defaults,

    /// Generate into an existing non-empty directory
    pub overwrite: bool,

    /// Print the plan instead of executing it
    pub dry_run: bool,

    /// Dry-run output format
    pub format: PlanFormat,

    /// Skip detection of the tools the plan runs
    pub skip_checks: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,

    /// Upper bound for each external command
    pub command_timeout: Duration,
}

impl Default for NewArgs {
    fn default() -> Self {
        Self {
            name: None,
            directory: None,
            choices: Defaults::default(),
            defaults: Defaults::default(),
            overwrite: false,
            dry_run: false,
            format: PlanFormat::Text,
            skip_checks: false,
            yes: false,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Resolve a configuration (prompting for whatever is missing), then plan,
/// check and generate it
pub async fn run(args: NewArgs, cancel: CancelFlag) -> Result<()> {
    cliclack::intro("stackgen")?;

    // Step 1: Resolve the configuration
    let config = resolve_config(&args)?;

    // Step 2: Validate and plan; nothing has touched the disk yet
    let plan = prepare(&config)?;
    show_summary(&config, &plan)?;

    if args.dry_run {
        print!("{}", plan.format(args.format)?);
        cliclack::outro("Dry run: nothing was written")?;
        return Ok(());
    }

    if !args.yes {
        let proceed: bool = cliclack::confirm("Generate this project?")
            .initial_value(true)
            .interact()?;
        if !proceed {
            cliclack::outro_cancel("Setup cancelled.")?;
            return Ok(());
        }
    }

    // Step 3: Check the tools the plan will run
    if args.skip_checks {
        cliclack::log::info("Skipping tool checks")?;
    } else if !check_tools(&plan, config.frontend, args.yes)? {
        return Ok(());
    }

    // Step 4: Generate
    generate(&config, plan, &args, cancel).await?;

    // Step 5: Show next steps
    print_next_steps(&config)?;

    Ok(())
}

fn resolve_config(args: &NewArgs) -> Result<ProjectConfig> {
    let given = &args.choices;
    let initial = &args.defaults;
    let yes = args.yes;

    let (backend, frontend) = select_components(args)?;

    let styling = select_value(
        "Styling",
        frontend.allowed_styling(),
        given.styling,
        initial.styling,
        yes,
    )?;

    let package_managers: &[PackageManager] = match frontend {
        Frontend::None => &[PackageManager::Pip, PackageManager::Uv],
        Frontend::Cra => &[PackageManager::Npm, PackageManager::Yarn],
        _ => &[PackageManager::Npm, PackageManager::Yarn, PackageManager::Pnpm],
    };
    let package_manager = select_value(
        "Package manager",
        package_managers,
        given.package_manager,
        initial.package_manager,
        yes,
    )?;

    let language = if frontend.is_none() {
        given.language.or(initial.language)
    } else {
        Some(select_value(
            "Language",
            &[ScriptLanguage::TypeScript, ScriptLanguage::JavaScript],
            given.language,
            initial.language,
            yes,
        )?)
    };

    let docker = confirm_choice(
        "Add Dockerfiles and docker-compose?",
        given.docker,
        initial.docker.unwrap_or(false),
        yes,
    )?;

    let (folder_structure, common_packages) = if frontend.is_none() {
        (
            given.folder_structure.or(initial.folder_structure),
            given.common_packages.or(initial.common_packages),
        )
    } else {
        (
            Some(confirm_choice(
                "Create the extended folder structure?",
                given.folder_structure,
                initial.folder_structure.unwrap_or(true),
                yes,
            )?),
            Some(confirm_choice(
                "Install common packages (axios, react-router, ...)?",
                given.common_packages,
                initial.common_packages.unwrap_or(false),
                yes,
            )?),
        )
    };

    let ml_workspace = if backend.is_none() {
        given.ml_workspace.or(initial.ml_workspace)
    } else {
        Some(confirm_choice(
            "Add the ML workspace (data, models, notebooks, training scripts)?",
            given.ml_workspace,
            initial.ml_workspace.unwrap_or(false),
            yes,
        )?)
    };

    let install = confirm_choice(
        "Install dependencies now?",
        given.install,
        initial.install.unwrap_or(true),
        yes,
    )?;

    let name = select_name(args, !frontend.is_none())?;
    let (parent, overwrite) = select_directory(args, &name)?;

    let resolved = Defaults {
        backend: Some(backend),
        frontend: Some(frontend),
        styling: Some(styling),
        package_manager: Some(package_manager),
        language,
        docker: Some(docker),
        folder_structure,
        common_packages,
        ml_workspace,
        install: Some(install),
    };

    Ok(resolved.to_config(name, parent).with_overwrite(overwrite))
}

fn select_components(args: &NewArgs) -> Result<(Backend, Frontend)> {
    let (given, initial) = (&args.choices, &args.defaults);
    loop {
        let backend = select_value(
            "Backend",
            &[Backend::None, Backend::FastApi],
            given.backend,
            initial.backend,
            args.yes,
        )?;
        let frontend = select_value(
            "Frontend",
            &[Frontend::None, Frontend::Vite, Frontend::Cra, Frontend::NextJs],
            given.frontend,
            initial.frontend,
            args.yes,
        )?;

        // validation reports an empty selection that was not prompted for
        let prompted = given.backend.is_none() || given.frontend.is_none();
        if args.yes || !prompted || !backend.is_none() || !frontend.is_none() {
            return Ok((backend, frontend));
        }
        cliclack::log::warning("Choose a backend, a frontend, or both")?;
    }
}

/// Pick one of `options`. A `given` value is taken as is (validation
/// reports a bad pairing); non-interactive mode takes `initial` or the
/// first option; a single option is taken without asking.
fn select_value<T>(
    prompt: &str,
    options: &[T],
    given: Option<T>,
    initial: Option<T>,
    yes: bool,
) -> Result<T>
where
    T: Copy + Eq + Display + 'static,
{
    if let Some(value) = given {
        return Ok(value);
    }

    let first = options
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("No options for {}", prompt))?;

    if yes {
        return Ok(initial.unwrap_or(first));
    }
    if options.len() == 1 {
        return Ok(first);
    }

    let mut select = cliclack::select(prompt);
    for option in options {
        select = select.item(*option, option, "");
    }
    if let Some(initial) = initial.filter(|i| options.contains(i)) {
        select = select.initial_value(initial);
    }

    Ok(select.interact()?)
}

fn confirm_choice(prompt: &str, given: Option<bool>, initial: bool, yes: bool) -> Result<bool> {
    if let Some(value) = given {
        return Ok(value);
    }
    if yes {
        return Ok(initial);
    }
    Ok(cliclack::confirm(prompt).initial_value(initial).interact()?)
}

fn select_name(args: &NewArgs, npm_rules: bool) -> Result<String> {
    if let Some(name) = &args.name {
        validate_name(name, npm_rules)?;
        cliclack::log::info(format!("Project name: {}", name))?;
        return Ok(name.clone());
    }

    if args.yes {
        anyhow::bail!("A project name is required with --yes");
    }

    let name: String = cliclack::input("Project name")
        .placeholder("my-app")
        .validate(move |input: &String| validate_name(input, npm_rules).map_err(|e| e.to_string()))
        .interact()?;

    Ok(name)
}

/// Parent directory, and whether to generate into an existing non-empty
/// project directory
fn select_directory(args: &NewArgs, name: &str) -> Result<(PathBuf, bool)> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Use --dir if provided
    let parent = if let Some(dir) = &args.directory {
        let p = if dir.is_absolute() {
            dir.clone()
        } else {
            current_dir.join(dir)
        };
        cliclack::log::info(format!("Using directory: {}", p.display()))?;
        p
    } else if args.yes {
        current_dir
    } else {
        let input: String = cliclack::input("Parent directory")
            .placeholder(".")
            .default_input(".")
            .interact()?;

        if input.is_empty() || input == "." {
            current_dir
        } else {
            let p = PathBuf::from(&input);
            if p.is_absolute() {
                p
            } else {
                current_dir.join(p)
            }
        }
    };

    if !parent.is_dir() {
        anyhow::bail!("Parent directory does not exist: {}", parent.display());
    }

    let root = parent.join(name);
    let existing = existing_entries(&root);
    if existing == 0 || args.overwrite || args.yes {
        return Ok((parent, args.overwrite));
    }

    cliclack::log::warning(format!(
        "{} already has {} items; files the project writes will replace existing ones",
        root.display(),
        existing
    ))?;
    let confirm: bool = cliclack::confirm("Generate into it anyway?")
        .initial_value(false)
        .interact()?;
    if !confirm {
        anyhow::bail!("Setup cancelled.");
    }

    Ok((parent, true))
}

fn existing_entries(path: &Path) -> usize {
    std::fs::read_dir(path)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

fn show_summary(config: &ProjectConfig, plan: &Plan) -> Result<()> {
    let mut lines = vec![
        format!("Location:  {}", config.project_root().display()),
        format!("Type:      {}", config.kind()),
    ];
    if !config.backend.is_none() {
        let ml = if config.ml_workspace { " + ML workspace" } else { "" };
        lines.push(format!("Backend:   {}{}", config.backend, ml));
    }
    if !config.frontend.is_none() {
        lines.push(format!(
            "Frontend:  {} ({}, {})",
            config.frontend, config.language, config.styling
        ));
    }
    lines.push(format!("Packages:  {}", config.package_manager));
    if config.docker {
        lines.push("Docker:    yes".to_string());
    }

    let (dirs, files, commands) = plan.counts();
    lines.push(format!(
        "Plan:      {} directories, {} files, {} commands",
        dirs, files, commands
    ));

    cliclack::note(&config.name, lines.join("\n"))?;
    Ok(())
}

/// Returns whether to go on with generation
fn check_tools(plan: &Plan, frontend: Frontend, yes: bool) -> Result<bool> {
    let spinner = cliclack::spinner();
    spinner.start("Checking required tools...");

    let report = check_plan(plan, frontend);
    if report.is_ok() {
        if report.found.is_empty() {
            spinner.stop("No external tools needed");
        } else {
            let found: Vec<String> = report
                .found
                .iter()
                .map(|r| format!("{} ({})", r.name, r.version.as_deref().unwrap_or("unknown")))
                .collect();
            spinner.stop(format!("Detected tools: {}", found.join(", ")));
        }
        return Ok(true);
    }

    spinner.error("Missing required tools");
    for tool in &report.missing {
        cliclack::log::error(format!("{}: {}", tool.name, tool.reason))?;
    }

    if yes {
        anyhow::bail!("Install the missing tools and try again, or pass --skip-checks.");
    }

    let docs = report.missing.iter().find(|m| !m.docs_url.is_empty());

    let mut select = cliclack::select("What would you like to do?");
    if let Some(tool) = docs {
        select = select.item(
            "docs",
            format!("Open install instructions for {} ({})", tool.name, tool.docs_url),
            "",
        );
    }
    let action: &str = select
        .item("continue", "Continue anyway", "commands may fail")
        .item("abort", "Abort", "")
        .interact()?;

    match (action, docs) {
        ("docs", Some(tool)) => {
            if let Err(e) = open::that(tool.docs_url) {
                cliclack::log::warning(format!("Could not open a browser: {}", e))?;
            }
            cliclack::outro(format!(
                "After installing {}, run this command again.",
                tool.name
            ))?;
            Ok(false)
        }
        ("continue", _) => {
            cliclack::log::info("Continuing without the missing tools")?;
            Ok(true)
        }
        _ => {
            cliclack::outro_cancel("Setup cancelled.")?;
            Ok(false)
        }
    }
}

async fn generate(
    config: &ProjectConfig,
    plan: Plan,
    args: &NewArgs,
    cancel: CancelFlag,
) -> Result<()> {
    let executor = Executor::system()
        .with_timeout(args.command_timeout)
        .with_cancel_flag(cancel);
    let root = config.project_root();

    let spinner = cliclack::spinner();
    spinner.start("Generating project...");

    let result = executor
        .execute_with(plan, |event| {
            if let ExecutionEvent::Started {
                index,
                total,
                operation,
            } = event
            {
                spinner.set_message(format!("[{}/{}] {}", index + 1, total, operation));
            }
        })
        .await;

    match result.into_result() {
        Ok(applied) => {
            spinner.stop(format!(
                "Applied {} operations in {}",
                applied.len(),
                root.display()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.error("Generation stopped");
            cliclack::log::error(e.to_string())?;
            if e.left_partial_output() {
                cliclack::log::warning(format!(
                    "{} was left partially generated; nothing was rolled back",
                    root.display()
                ))?;
            }
            anyhow::bail!("Project generation failed.");
        }
    }
}

fn print_next_steps(config: &ProjectConfig) -> Result<()> {
    let steps = next_steps(config);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Styling;

    #[test]
    fn test_non_interactive_resolution_uses_choices() {
        let dir = tempfile::tempdir().unwrap();
        let args = NewArgs {
            name: Some("shop".to_string()),
            directory: Some(dir.path().to_path_buf()),
            choices: Defaults {
                backend: Some(Backend::FastApi),
                frontend: Some(Frontend::Vite),
                styling: Some(Styling::Tailwind),
                ..Default::default()
            },
            yes: true,
            ..Default::default()
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.project_root(), dir.path().join("shop"));
        assert_eq!(config.backend, Backend::FastApi);
        assert_eq!(config.frontend, Frontend::Vite);
        assert_eq!(config.styling, Styling::Tailwind);
        assert_eq!(config.package_manager, PackageManager::Npm);
        assert!(config.install);
        assert!(!config.overwrite);
    }

    #[test]
    fn test_non_interactive_keeps_bad_pairing_for_validation() {
        let dir = tempfile::tempdir().unwrap();
        let args = NewArgs {
            name: Some("site".to_string()),
            directory: Some(dir.path().to_path_buf()),
            choices: Defaults {
                frontend: Some(Frontend::Vite),
                styling: Some(Styling::CssModules),
                ..Default::default()
            },
            yes: true,
            ..Default::default()
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.styling, Styling::CssModules);
        assert!(prepare(&config).is_err());
    }

    #[test]
    fn test_settings_defaults_fill_unset_choices() {
        let dir = tempfile::tempdir().unwrap();
        let args = NewArgs {
            name: Some("web".to_string()),
            directory: Some(dir.path().to_path_buf()),
            choices: Defaults {
                package_manager: Some(PackageManager::Yarn),
                ..Default::default()
            },
            defaults: Defaults {
                frontend: Some(Frontend::NextJs),
                package_manager: Some(PackageManager::Pnpm),
                docker: Some(true),
                ..Default::default()
            },
            yes: true,
            ..Default::default()
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.frontend, Frontend::NextJs);
        assert_eq!(config.package_manager, PackageManager::Yarn);
        assert!(config.docker);
    }

    #[test]
    fn test_non_interactive_requires_a_name() {
        let args = NewArgs {
            choices: Defaults {
                frontend: Some(Frontend::Vite),
                ..Default::default()
            },
            yes: true,
            ..Default::default()
        };
        assert!(resolve_config(&args).is_err());
    }
}
