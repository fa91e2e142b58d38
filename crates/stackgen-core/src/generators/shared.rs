//! Top-level files shared by the whole project: README, .gitignore,
//! docker-compose, the frontend Dockerfile and API docs.

use super::{render, FrameworkGenerator, GenerationContext, Generate};
use crate::config::{Frontend, PackageManager, ProjectConfig};
use crate::plan::PlannedOperation;
use std::fmt::Write as _;

const README: &str = include_str!("../../templates/shared/README.md");
const GITIGNORE_PYTHON: &str = include_str!("../../templates/shared/gitignore-python");
const GITIGNORE_NODE: &str = include_str!("../../templates/shared/gitignore-node");
const GITIGNORE_COMMON: &str = include_str!("../../templates/shared/gitignore-common");
const GITIGNORE_ML: &str = include_str!("../../templates/shared/gitignore-ml");
const FRONTEND_DOCKERFILE: &str = include_str!("../../templates/shared/Dockerfile.frontend");
const API_DOCS: &str = include_str!("../../templates/shared/api.md");

const BACKEND_PORT: u16 = 8000;

pub fn generate(ctx: &GenerationContext<'_>, frontend: Option<&FrameworkGenerator>) -> Vec<PlannedOperation> {
    let config = ctx.config;
    let layout = ctx.layout;
    let has_backend = !config.backend.is_none();
    let mut ops = Vec::new();

    // a scaffolder that generated the root already wrote its own
    let root_owned = !config.is_full_stack() && frontend.is_some_and(|f| f.delegates());
    if !root_owned {
        ops.push(ctx.write(layout.root.join("README.md"), readme(config)));
        ops.push(ctx.write(layout.root.join(".gitignore"), gitignore(config)));
    }

    if config.docker {
        if !config.frontend.is_none() {
            ops.push(ctx.write(
                layout.frontend_dir.join("Dockerfile"),
                frontend_dockerfile(config.frontend, config.package_manager),
            ));
        }
        ops.push(ctx.write(layout.root.join("docker-compose.yml"), docker_compose(config)));
    }

    if has_backend {
        ops.push(ctx.write(
            layout.root.join("docs/api.md"),
            render(API_DOCS, &[("project_name", config.name.as_str())]),
        ));
    }

    ops
}

fn gitignore(config: &ProjectConfig) -> String {
    let mut sections = Vec::new();
    if !config.backend.is_none() {
        sections.push(GITIGNORE_PYTHON.to_string());
        if config.ml_workspace {
            let dir = if config.is_full_stack() { "backend/" } else { "" };
            sections.push(render(GITIGNORE_ML, &[("dir", dir)]));
        }
    }
    if !config.frontend.is_none() {
        sections.push(GITIGNORE_NODE.to_string());
    }
    sections.push(GITIGNORE_COMMON.to_string());
    sections.join("\n")
}

fn readme(config: &ProjectConfig) -> String {
    let description = match (config.backend.is_none(), config.frontend.is_none()) {
        (false, false) => format!(
            "Full-stack project: {} backend with a {} ({}) frontend.",
            config.backend, config.frontend, config.language
        ),
        (false, true) => format!("{} backend.", config.backend),
        _ => format!("{} ({}) frontend.", config.frontend, config.language),
    };

    let mut structure = format!("{}/\n", config.name);
    if config.is_full_stack() {
        structure.push_str("├── backend/     # FastAPI application\n");
        structure.push_str("├── frontend/    # ");
        structure.push_str(config.frontend.display_name());
        structure.push('\n');
        structure.push_str("└── docs/        # API documentation\n");
    } else if !config.backend.is_none() {
        structure.push_str("├── app/         # FastAPI application\n");
        if config.ml_workspace {
            structure.push_str("├── config/      # model and data settings\n");
            structure.push_str("├── data/        # raw, processed and external datasets\n");
            structure.push_str("├── models/      # trained models and checkpoints\n");
            structure.push_str("├── notebooks/   # exploration\n");
            structure.push_str("├── scripts/     # training and evaluation\n");
        }
        structure.push_str("├── tests/       # pytest suite\n");
        structure.push_str("└── docs/        # API documentation\n");
    } else {
        structure.push_str("├── public/      # static assets\n");
        structure.push_str("└── src/         # application source\n");
    }

    let (backend_dir, frontend_dir) = if config.is_full_stack() {
        ("backend", "frontend")
    } else {
        (".", ".")
    };

    let mut getting_started = String::new();
    if !config.backend.is_none() {
        let _ = writeln!(getting_started, "\n### Backend\n\n```bash");
        if backend_dir != "." {
            let _ = writeln!(getting_started, "cd {}", backend_dir);
        }
        let (uv_extra, pip_extra) = if config.ml_workspace {
            (" --extra ml", " -r requirements-ml.txt")
        } else {
            ("", "")
        };
        match config.package_manager {
            PackageManager::Uv => {
                let _ = writeln!(getting_started, "uv sync{}", uv_extra);
                let _ = writeln!(getting_started, "uv run uvicorn app.main:app --reload");
            }
            _ => {
                let _ = writeln!(getting_started, "python3 -m venv .venv");
                let _ = writeln!(getting_started, "source .venv/bin/activate");
                let _ = writeln!(getting_started, "pip install -r requirements-dev.txt{}", pip_extra);
                let _ = writeln!(getting_started, "uvicorn app.main:app --reload");
            }
        }
        let _ = writeln!(getting_started, "```\n");
        let _ = writeln!(
            getting_started,
            "The API listens on http://localhost:{}; interactive docs at `/docs`.",
            BACKEND_PORT
        );
    }
    if !config.frontend.is_none() {
        let pm = config.package_manager;
        let _ = writeln!(getting_started, "\n### Frontend\n\n```bash");
        if frontend_dir != "." {
            let _ = writeln!(getting_started, "cd {}", frontend_dir);
        }
        let _ = writeln!(getting_started, "{}", pm.install_all().join(" "));
        let _ = writeln!(getting_started, "{}", config.frontend.dev_command(pm));
        let _ = writeln!(getting_started, "```\n");
        let _ = writeln!(
            getting_started,
            "The dev server runs on http://localhost:{}.",
            config.frontend.dev_port()
        );
    }
    if config.docker {
        let _ = writeln!(getting_started, "\n### Docker\n\n```bash\ndocker compose up --build\n```");
    }

    render(
        README,
        &[
            ("project_name", config.name.as_str()),
            ("description", description.as_str()),
            ("structure", structure.as_str()),
            ("getting_started", getting_started.as_str()),
        ],
    )
}

fn frontend_dockerfile(frontend: Frontend, pm: PackageManager) -> String {
    let (manifests, install) = match pm {
        PackageManager::Yarn => ("package.json yarn.lock*", "yarn install"),
        PackageManager::Pnpm => ("package.json pnpm-lock.yaml*", "corepack enable && pnpm install"),
        _ => ("package*.json", "npm install"),
    };

    let mut argv = vec![pm.binary()];
    match frontend {
        Frontend::Vite | Frontend::NextJs => {
            argv.extend(["run", "dev"]);
            // only npm needs the separator to pass flags through to the script
            if pm == PackageManager::Npm {
                argv.push("--");
            }
            let host_flag = if frontend == Frontend::Vite { "--host" } else { "-H" };
            argv.extend([host_flag, "0.0.0.0"]);
        }
        _ => argv.push("start"),
    }
    let command = argv
        .iter()
        .map(|arg| format!("\"{}\"", arg))
        .collect::<Vec<_>>()
        .join(", ");

    let port = frontend.dev_port().to_string();
    render(
        FRONTEND_DOCKERFILE,
        &[
            ("manifests", manifests),
            ("install", install),
            ("port", port.as_str()),
            ("command", command.as_str()),
        ],
    )
}

fn api_url_variable(frontend: Frontend) -> &'static str {
    match frontend {
        Frontend::Vite => "VITE_API_URL",
        Frontend::NextJs => "NEXT_PUBLIC_API_URL",
        _ => "REACT_APP_API_URL",
    }
}

fn docker_compose(config: &ProjectConfig) -> String {
    let (backend_ctx, frontend_ctx) = if config.is_full_stack() {
        ("./backend", "./frontend")
    } else {
        (".", ".")
    };

    let mut out = String::from("services:\n");
    if !config.backend.is_none() {
        let _ = writeln!(out, "  backend:");
        let _ = writeln!(out, "    build: {}", backend_ctx);
        let _ = writeln!(out, "    ports:");
        let _ = writeln!(out, "      - \"{0}:{0}\"", BACKEND_PORT);
        let _ = writeln!(out, "    environment:");
        let _ = writeln!(out, "      - PROJECT_NAME={}", config.name);
        if config.ml_workspace {
            let _ = writeln!(out, "    volumes:");
            for dir in ["data", "models", "logs"] {
                let _ = writeln!(out, "      - {0}/{1}:/app/{1}", backend_ctx, dir);
            }
        }
    }
    if !config.frontend.is_none() {
        let port = config.frontend.dev_port();
        let _ = writeln!(out, "  frontend:");
        let _ = writeln!(out, "    build: {}", frontend_ctx);
        let _ = writeln!(out, "    ports:");
        let _ = writeln!(out, "      - \"{0}:{0}\"", port);
        if !config.backend.is_none() {
            let _ = writeln!(out, "    environment:");
            let _ = writeln!(
                out,
                "      - {}=http://localhost:{}",
                api_url_variable(config.frontend),
                BACKEND_PORT
            );
            let _ = writeln!(out, "    depends_on:");
            let _ = writeln!(out, "      - backend");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use crate::plan::Layout;
    use std::path::Path;

    fn generate_for(config: &ProjectConfig) -> Vec<PlannedOperation> {
        let layout = Layout::for_config(config);
        let frontend = FrameworkGenerator::for_frontend(config.frontend);
        generate(&GenerationContext::new(config, &layout), frontend.as_ref())
    }

    fn targets(ops: &[PlannedOperation]) -> Vec<&Path> {
        ops.iter().filter_map(PlannedOperation::target).collect()
    }

    #[test]
    fn test_full_stack_shared_files() {
        let config = ProjectConfig::new("genai", "/work")
            .with_backend(Backend::FastApi)
            .with_frontend(Frontend::Vite)
            .with_docker(true);
        let ops = generate_for(&config);
        let targets = targets(&ops);

        for expected in [
            "/work/genai/README.md",
            "/work/genai/.gitignore",
            "/work/genai/frontend/Dockerfile",
            "/work/genai/docker-compose.yml",
            "/work/genai/docs/api.md",
        ] {
            assert!(targets.contains(&Path::new(expected)), "missing {expected}");
        }

        let compose = ops
            .iter()
            .find_map(|op| match op {
                PlannedOperation::WriteFile { path, contents, .. }
                    if path.ends_with("docker-compose.yml") =>
                {
                    Some(contents.as_str())
                }
                _ => None,
            })
            .unwrap();
        assert!(compose.contains("build: ./backend"));
        assert!(compose.contains("VITE_API_URL=http://localhost:8000"));
    }

    #[test]
    fn test_delegated_frontend_owns_root_files() {
        let config = ProjectConfig::new("site", "/work").with_frontend(Frontend::NextJs);
        assert!(generate_for(&config).is_empty());
    }

    #[test]
    fn test_gitignore_sections_follow_components() {
        let backend = ProjectConfig::new("api", "")
            .with_backend(Backend::FastApi)
            .with_package_manager(PackageManager::Uv);
        let text = gitignore(&backend);
        assert!(text.contains("__pycache__/"));
        assert!(!text.contains("node_modules/"));

        let frontend = ProjectConfig::new("demo", "").with_frontend(Frontend::Vite);
        let text = gitignore(&frontend);
        assert!(text.contains("node_modules/"));
        assert!(!text.contains("__pycache__/"));
    }

    #[test]
    fn test_frontend_dockerfile_follows_package_manager() {
        let pnpm = frontend_dockerfile(Frontend::Vite, PackageManager::Pnpm);
        assert!(pnpm.contains("COPY package.json pnpm-lock.yaml* ./"));
        assert!(pnpm.contains("RUN corepack enable && pnpm install"));
        assert!(pnpm.contains(r#"CMD ["pnpm", "run", "dev", "--host", "0.0.0.0"]"#));
        assert!(!pnpm.contains("RUN npm"));

        let npm = frontend_dockerfile(Frontend::NextJs, PackageManager::Npm);
        assert!(npm.contains("COPY package*.json ./"));
        assert!(npm.contains(r#"CMD ["npm", "run", "dev", "--", "-H", "0.0.0.0"]"#));
        assert!(npm.contains("EXPOSE 3000"));

        let yarn = frontend_dockerfile(Frontend::Cra, PackageManager::Yarn);
        assert!(yarn.contains("RUN yarn install"));
        assert!(yarn.contains(r#"CMD ["yarn", "start"]"#));
        assert!(!yarn.contains("{{"));
    }

    #[test]
    fn test_ml_workspace_ignores_are_anchored_to_the_backend() {
        let full_stack = ProjectConfig::new("genai", "")
            .with_backend(Backend::FastApi)
            .with_frontend(Frontend::Vite)
            .with_ml_workspace(true);
        let text = gitignore(&full_stack);
        assert!(text.contains("backend/data/raw/*"));
        assert!(text.contains("!**/.gitkeep"));

        let backend = ProjectConfig::new("genai", "")
            .with_backend(Backend::FastApi)
            .with_package_manager(PackageManager::Uv)
            .with_ml_workspace(true)
            .with_docker(true);
        assert!(gitignore(&backend).contains("\ndata/raw/*"));
        assert!(readme(&backend).contains("uv sync --extra ml"));
        assert!(docker_compose(&backend).contains("- ./data:/app/data"));
    }

    #[test]
    fn test_readme_mentions_dev_command() {
        let config = ProjectConfig::new("demo", "")
            .with_frontend(Frontend::Vite)
            .with_package_manager(PackageManager::Pnpm);
        let text = readme(&config);
        assert!(text.starts_with("# demo"));
        assert!(text.contains("pnpm dev"));
        assert!(text.contains("http://localhost:5173"));
        assert!(!text.contains("{{"));
    }
}
