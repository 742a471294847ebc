use std::collections::HashMap;
use std::env;

/// CI provider context detected from well-known environment variables,
/// contributed to every payload's span tags.
#[derive(Debug, Clone, Default)]
pub struct CiContext {
    provider: Option<&'static str>,
    pipeline_id: Option<String>,
}

impl CiContext {
    pub fn detect() -> Self {
        const CI_INDICATORS: &[(&str, &str, &str)] = &[
            ("GITHUB_ACTIONS", "github-actions", "GITHUB_RUN_ID"),
            ("GITLAB_CI", "gitlab-ci", "CI_PIPELINE_ID"),
            ("CIRCLECI", "circleci", "CIRCLE_WORKFLOW_ID"),
            ("JENKINS_URL", "jenkins", "BUILD_TAG"),
            ("BUILDKITE", "buildkite", "BUILDKITE_BUILD_ID"),
            ("TRAVIS", "travis-ci", "TRAVIS_BUILD_ID"),
            ("APPVEYOR", "appveyor", "APPVEYOR_BUILD_ID"),
            ("TEAMCITY_VERSION", "teamcity", "BUILD_NUMBER"),
            ("CODEBUILD_BUILD_ID", "aws-codebuild", "CODEBUILD_BUILD_ID"),
            (
                "BITBUCKET_BUILD_NUMBER",
                "bitbucket-pipelines",
                "BITBUCKET_BUILD_NUMBER",
            ),
            ("DRONE", "drone", "DRONE_BUILD_NUMBER"),
        ];

        for (indicator, name, id_var) in CI_INDICATORS {
            if env::var(indicator).is_ok() {
                return Self {
                    provider: Some(name),
                    pipeline_id: env::var(id_var).ok().filter(|v| !v.is_empty()),
                };
            }
        }

        if env::var("CI").is_ok() {
            return Self {
                provider: Some("generic-ci"),
                pipeline_id: None,
            };
        }

        Self::default()
    }

    pub fn is_ci(&self) -> bool {
        self.provider.is_some()
    }

    pub fn tags(&self) -> HashMap<String, String> {
        let mut tags = HashMap::new();
        if let Some(provider) = self.provider {
            tags.insert("ci.provider".to_string(), provider.to_string());
        }
        if let Some(pipeline_id) = &self.pipeline_id {
            tags.insert("ci.pipeline.id".to_string(), pipeline_id.clone());
        }
        tags
    }
}
