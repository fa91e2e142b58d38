//! Detection of the tools a plan will invoke

use super::version::check_minimum;
use crate::config::Frontend;
use crate::plan::Plan;
use anyhow::Result;
use semver::Version;
use std::collections::BTreeSet;
use std::process::Command;

/// Tool detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
    /// Where to get the tool
    pub docs_url: &'static str,
}

/// A prerequisite that is missing or too old
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub name: &'static str,
    pub reason: String,
    pub docs_url: &'static str,
}

/// Everything the checks found
#[derive(Debug, Clone, Default)]
pub struct RuntimeReport {
    pub found: Vec<RuntimeInfo>,
    pub missing: Vec<MissingTool>,
}

impl RuntimeReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }

    /// Fail with a list of everything missing
    pub fn into_result(self) -> Result<Vec<RuntimeInfo>> {
        if !self.missing.is_empty() {
            anyhow::bail!(
                "Missing required tools:\n{}",
                self.missing
                    .iter()
                    .map(|m| format!("  - {}: {} (see {})", m.name, m.reason, m.docs_url))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
        Ok(self.found)
    }
}

struct ToolSpec {
    program: &'static str,
    name: &'static str,
    docs_url: &'static str,
}

const NODE: ToolSpec = ToolSpec {
    program: "node",
    name: "Node.js",
    docs_url: "https://nodejs.org",
};

const KNOWN_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        program: "npm",
        name: "npm",
        docs_url: "https://docs.npmjs.com/downloading-and-installing-node-js-and-npm",
    },
    ToolSpec {
        program: "npx",
        name: "npx",
        docs_url: "https://docs.npmjs.com/downloading-and-installing-node-js-and-npm",
    },
    ToolSpec {
        program: "yarn",
        name: "Yarn",
        docs_url: "https://yarnpkg.com/getting-started/install",
    },
    ToolSpec {
        program: "pnpm",
        name: "pnpm",
        docs_url: "https://pnpm.io/installation",
    },
    ToolSpec {
        program: "python3",
        name: "Python 3",
        docs_url: "https://python.org",
    },
    ToolSpec {
        program: "uv",
        name: "uv",
        docs_url: "https://docs.astral.sh/uv/getting-started/installation/",
    },
];

const JS_PROGRAMS: &[&str] = &["npm", "npx", "yarn", "pnpm"];

/// Minimum Node.js each frontend's tooling supports
pub fn minimum_node(frontend: Frontend) -> Option<Version> {
    match frontend {
        Frontend::None => None,
        Frontend::Vite => Some(Version::new(18, 0, 0)),
        Frontend::Cra => Some(Version::new(14, 0, 0)),
        Frontend::NextJs => Some(Version::new(18, 18, 0)),
    }
}

/// Run `<program> --version`, reporting availability and version
pub fn check_program(program: &'static str, name: &'static str, docs_url: &'static str) -> RuntimeInfo {
    let resolved = which::which(program).ok();
    let version = resolved.as_ref().and_then(|path| {
        Command::new(path)
            .arg("--version")
            .output()
            .ok()
            .filter(|out| out.status.success())
            .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
            .filter(|v| !v.is_empty())
    });

    RuntimeInfo {
        name,
        version,
        available: resolved.is_some(),
        docs_url,
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    check_program(NODE.program, NODE.name, NODE.docs_url)
}

/// Programs a plan runs, in first-use order. Paths the plan creates
/// itself (a virtualenv's pip) are left out.
pub fn required_programs(plan: &Plan) -> Vec<String> {
    let mut seen = BTreeSet::new();
    plan.commands()
        .into_iter()
        .filter_map(|argv| argv.first())
        .filter(|program| !program.contains('/') && !program.contains('\\'))
        .filter(|program| seen.insert(program.to_string()))
        .cloned()
        .collect()
}

/// Check every program the plan needs, plus Node.js (with the frontend's
/// minimum version) when any JavaScript tooling is involved.
pub fn check_plan(plan: &Plan, frontend: Frontend) -> RuntimeReport {
    let programs = required_programs(plan);
    let mut report = RuntimeReport::default();

    if programs.iter().any(|p| JS_PROGRAMS.contains(&p.as_str())) {
        let node = check_node();
        if !node.available {
            report.missing.push(MissingTool {
                name: node.name,
                reason: "not installed".to_string(),
                docs_url: node.docs_url,
            });
        } else {
            let too_old = match (&node.version, minimum_node(frontend)) {
                (Some(installed), Some(minimum)) => check_minimum(node.name, installed, &minimum),
                _ => None,
            };
            if let Some(reason) = too_old {
                report.missing.push(MissingTool {
                    name: node.name,
                    reason,
                    docs_url: node.docs_url,
                });
            } else {
                report.found.push(node);
            }
        }
    }

    for program in &programs {
        let info = match KNOWN_TOOLS.iter().find(|t| t.program == program.as_str()) {
            Some(spec) => check_program(spec.program, spec.name, spec.docs_url),
            None => RuntimeInfo {
                name: "command",
                version: None,
                available: which::which(program).is_ok(),
                docs_url: "",
            },
        };
        if info.available {
            report.found.push(info);
        } else {
            report.missing.push(MissingTool {
                name: info.name,
                reason: format!("'{}' not found on PATH", program),
                docs_url: info.docs_url,
            });
        }
    }

    report
}
