use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Version-control context for span tags, from CI environment variables
/// first and the local `.git` directory as a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitContext {
    pub branch: Option<String>,
    pub commit_sha: Option<String>,
}

impl GitContext {
    pub fn detect() -> Self {
        if is_git_disabled_by_env() {
            return Self::default();
        }

        let mut context = Self {
            branch: detect_ci_branch(),
            commit_sha: detect_ci_sha(),
        };

        if context.branch.is_none() || context.commit_sha.is_none() {
            if let Some(local) = detect_local_git_context(Path::new(".")) {
                if context.branch.is_none() {
                    context.branch = local.branch;
                }
                if context.commit_sha.is_none() {
                    context.commit_sha = local.commit_sha;
                }
            }
        }

        context
    }

    pub fn tags(&self) -> HashMap<String, String> {
        let mut tags = HashMap::new();
        if let Some(branch) = &self.branch {
            tags.insert("git.branch".to_string(), branch.clone());
        }
        if let Some(sha) = &self.commit_sha {
            tags.insert("git.commit.sha".to_string(), sha.clone());
        }
        tags
    }
}

pub fn is_git_disabled_by_env() -> bool {
    if env::var("REPORTSHIP_TEST_MODE")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        return true;
    }

    matches!(
        env::var("REPORTSHIP_NO_GIT")
            .ok()
            .map(|v| v.to_ascii_lowercase()),
        Some(value) if matches!(value.as_str(), "1" | "true" | "yes" | "on")
    )
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
}

fn detect_ci_branch() -> Option<String> {
    first_env(&[
        "GITHUB_HEAD_REF",
        "GITHUB_REF_NAME",
        "CI_COMMIT_REF_NAME",
        "CIRCLE_BRANCH",
        "BUILDKITE_BRANCH",
        "TRAVIS_BRANCH",
        "DRONE_BRANCH",
    ])
}

fn detect_ci_sha() -> Option<String> {
    first_env(&[
        "GITHUB_SHA",
        "CI_COMMIT_SHA",
        "CIRCLE_SHA1",
        "BUILDKITE_COMMIT",
        "TRAVIS_COMMIT",
        "DRONE_COMMIT_SHA",
    ])
}

fn detect_local_git_context(start: &Path) -> Option<GitContext> {
    let git_dir = start.join(".git");
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let head = head.trim();

    if let Some(ref_path) = head.strip_prefix("ref: ") {
        let branch = ref_path
            .strip_prefix("refs/heads/")
            .map(|name| name.to_string());
        let commit_sha = fs::read_to_string(git_dir.join(ref_path))
            .ok()
            .map(|sha| sha.trim().to_string())
            .filter(|sha| !sha.is_empty());
        return Some(GitContext { branch, commit_sha });
    }

    // Detached HEAD holds the sha directly.
    if head.len() >= 40 {
        return Some(GitContext {
            branch: None,
            commit_sha: Some(head.to_string()),
        });
    }

    None
}
