//! Rewrites `<@U…>` and `<!subteam^S…>` tokens into `@name`

use crate::metadata::cache::NameCache;
use crate::metadata::types::{EntityKind, NameSource};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static USER_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<@([A-Z0-9]+)>").expect("user mention pattern compiles")
});

static SUBTEAM_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!subteam\^([A-Z0-9]+)>").expect("subteam mention pattern compiles")
});

/// Replace every user and subteam mention with `@<display name>`.
///
/// Users are substituted first, then subteams. Text outside the tokens is
/// kept byte for byte and malformed tokens are left untouched.
pub async fn resolve_mentions(cache: &NameCache, source: &dyn NameSource, text: &str) -> String {
    let text = replace_tokens(cache, source, &USER_MENTION_RE, EntityKind::User, text).await;
    replace_tokens(cache, source, &SUBTEAM_MENTION_RE, EntityKind::Subteam, &text).await
}

fn unique_ids(pattern: &Regex, text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(text) {
        let id = &caps[1];
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

async fn replace_tokens(
    cache: &NameCache,
    source: &dyn NameSource,
    pattern: &Regex,
    kind: EntityKind,
    text: &str,
) -> String {
    let ids = unique_ids(pattern, text);
    if ids.is_empty() {
        return text.to_string();
    }

    // Resolve before substituting; the regex callback cannot await
    let mut names = HashMap::with_capacity(ids.len());
    for id in ids {
        let name = cache.resolve(source, kind, &id).await;
        names.insert(id, name);
    }

    pattern
        .replace_all(text, |caps: &Captures| {
            let id = &caps[1];
            let name = names.get(id).map(String::as_str).unwrap_or(id);
            format!("@{}", name)
        })
        .into_owned()
}
