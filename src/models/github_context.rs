//! GitHub Actions context snapshot for CI/CD metadata.

use serde::Serialize;

/// Prefix carried by branch refs.
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Prefix carried by pull-request merge refs.
const PULL_REF_PREFIX: &str = "refs/pull/";

/// GitHub Actions context captured once at run start and shared by every
/// record in the run. All fields are optional: absence of a CI attribute
/// must never fail the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GitHubContext {
    /// Branch name (GITHUB_HEAD_REF for PRs, otherwise extracted from GITHUB_REF)
    pub branch: Option<String>,
    /// Raw ref (from GITHUB_REF)
    pub git_ref: Option<String>,
    /// Workflow name (from GITHUB_WORKFLOW)
    pub workflow: Option<String>,
    /// Repository name without the owner (from GITHUB_REPOSITORY)
    pub project: Option<String>,
    /// Commit SHA (from GITHUB_SHA)
    pub commit_sha: Option<String>,
    /// Job identifier (override, or GITHUB_JOB)
    pub job: Option<String>,
    /// Event that triggered the workflow (from GITHUB_EVENT_NAME)
    pub event_name: Option<String>,
    /// Actor that triggered the workflow (from GITHUB_ACTOR)
    pub actor: Option<String>,
    /// Workflow run ID (from GITHUB_RUN_ID)
    pub run_id: Option<u64>,
    /// Workflow run number (from GITHUB_RUN_NUMBER)
    pub run_number: Option<u64>,
    /// Runner architecture (from RUNNER_ARCH)
    pub runner_arch: Option<String>,
    /// Runner operating system (from RUNNER_OS)
    pub runner_os: Option<String>,
    /// Runner name (from RUNNER_NAME)
    pub runner_name: Option<String>,
}

impl GitHubContext {
    /// Capture the current context from the process environment. Pure
    /// snapshot read at call time; no mutation, no caching beyond the run.
    pub fn capture(job_override: Option<&str>) -> Self {
        let git_ref = env_var("GITHUB_REF");
        let head_ref = env_var("GITHUB_HEAD_REF");

        GitHubContext {
            branch: resolve_branch(git_ref.as_deref(), head_ref.as_deref()),
            git_ref,
            workflow: env_var("GITHUB_WORKFLOW"),
            project: env_var("GITHUB_REPOSITORY").map(|r| repo_name(&r)),
            commit_sha: env_var("GITHUB_SHA"),
            job: job_override
                .map(String::from)
                .or_else(|| env_var("GITHUB_JOB")),
            event_name: env_var("GITHUB_EVENT_NAME"),
            actor: env_var("GITHUB_ACTOR"),
            run_id: env_var("GITHUB_RUN_ID").and_then(|v| v.parse().ok()),
            run_number: env_var("GITHUB_RUN_NUMBER").and_then(|v| v.parse().ok()),
            runner_arch: env_var("RUNNER_ARCH"),
            runner_os: env_var("RUNNER_OS"),
            runner_name: env_var("RUNNER_NAME"),
        }
    }

    /// Flatten the snapshot into the telemetry attribute map, skipping
    /// absent values.
    pub fn attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut attrs = serde_json::Map::new();

        let string_attrs = [
            ("github.branch", &self.branch),
            ("github.ref", &self.git_ref),
            ("github.workflow", &self.workflow),
            ("github.project", &self.project),
            ("github.sha", &self.commit_sha),
            ("github.job", &self.job),
            ("github.eventName", &self.event_name),
            ("github.actor", &self.actor),
            ("github.runner.arch", &self.runner_arch),
            ("github.runner.os", &self.runner_os),
            ("github.runner.name", &self.runner_name),
        ];
        for (key, value) in string_attrs {
            if let Some(v) = value {
                attrs.insert(key.to_string(), serde_json::Value::from(v.clone()));
            }
        }

        if let Some(run_id) = self.run_id {
            attrs.insert("github.runId".to_string(), run_id.into());
        }
        if let Some(run_number) = self.run_number {
            attrs.insert("github.runNumber".to_string(), run_number.into());
        }

        attrs
    }
}

/// Resolve the branch name from the raw ref.
///
/// Branch refs have their `refs/heads/` prefix stripped. Pull-request refs
/// are synthetic merge refs, so the PR's head branch is used instead when
/// available.
fn resolve_branch(git_ref: Option<&str>, head_ref: Option<&str>) -> Option<String> {
    let git_ref = git_ref?;

    if git_ref.starts_with(PULL_REF_PREFIX) {
        if let Some(head) = head_ref.filter(|h| !h.is_empty()) {
            return Some(head.to_string());
        }
    }

    Some(
        git_ref
            .strip_prefix(BRANCH_REF_PREFIX)
            .unwrap_or(git_ref)
            .to_string(),
    )
}

/// Repository name without the owner part.
fn repo_name(repository: &str) -> String {
    repository
        .rsplit_once('/')
        .map(|(_, repo)| repo.to_string())
        .unwrap_or_else(|| repository.to_string())
}

/// Non-empty environment variable lookup.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
