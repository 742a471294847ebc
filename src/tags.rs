use std::collections::HashMap;

use crate::config;
use crate::ui::Reporter;

pub const ENV_TAG_KEY: &str = "env";
pub const TAGS_ENV_VAR: &str = "REPORTSHIP_TAGS";

/// Tag sources in precedence order, lowest first. Later sources overwrite
/// earlier ones on key collision; an explicit `env` override always wins.
#[derive(Debug, Clone, Default)]
pub struct TagSources {
    pub vcs: HashMap<String, String>,
    pub ci: HashMap<String, String>,
    pub cli: HashMap<String, String>,
    pub env_list: HashMap<String, String>,
    pub env_override: Option<String>,
}

pub fn merge_span_tags(sources: TagSources) -> HashMap<String, String> {
    let mut merged = sources.vcs;
    merged.extend(sources.ci);
    merged.extend(sources.cli);
    merged.extend(sources.env_list);
    if let Some(env) = sources.env_override {
        merged.insert(ENV_TAG_KEY.to_string(), env);
    }
    merged
}

/// Parses `key:value` pairs. Malformed entries are dropped with a warning
/// rather than failing the batch.
pub fn parse_tag_pairs(pairs: &[String], reporter: &dyn Reporter) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for pair in pairs {
        match pair.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                tags.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => reporter.warn(&format!("ignoring malformed tag '{pair}' (expected key:value)")),
        }
    }
    tags
}

/// Tags from the `REPORTSHIP_TAGS` environment variable, comma-separated
/// `key:value` entries.
pub fn env_tag_list(reporter: &dyn Reporter) -> HashMap<String, String> {
    match config::env_var(TAGS_ENV_VAR) {
        Some(raw) => {
            let pairs: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            parse_tag_pairs(&pairs, reporter)
        }
        None => HashMap::new(),
    }
}
