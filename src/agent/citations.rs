//! Detection of file paths cited in an answer that were never retrieved.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

const REDACTED: &str = "[unverified path removed]";

const KNOWN_EXTENSIONS: &[&str] = &[
    "c", "cc", "cfg", "cpp", "cs", "css", "go", "gradle", "h", "hpp", "html", "ini", "java",
    "js", "json", "jsx", "kt", "lock", "md", "mod", "php", "proto", "py", "rb", "rs", "rst",
    "scss", "sh", "sql", "sum", "swift", "toml", "ts", "tsx", "txt", "xml", "yaml", "yml",
];

const KNOWN_NAMES: &[&str] = &["LICENSE", "README", "COPYING", "NOTICE", "Makefile", "Dockerfile"];

fn backtick_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`\s]+)`").expect("valid regex"))
}

fn bare_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:^|[\s(\["'])([A-Za-z0-9_./\-]+)"#).expect("valid regex"))
}

fn location_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?::\d+(?:-\d+)?|#L\d+(?:-L?\d+)?)$").expect("valid regex"))
}

fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    let valid = !stem.is_empty()
        && ext.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && ext.len() <= 10
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// Normalize a candidate and decide whether it looks like a file path.
fn as_path(raw: &str, repo: &str) -> Option<String> {
    if raw.contains("://") || raw.starts_with("www.") {
        return None;
    }
    let trimmed = raw.trim_end_matches(['.', ',', ';', ':', ')']);
    let trimmed = location_suffix().replace(trimmed, "");
    let path = trimmed.trim_start_matches("./").trim_start_matches('/');

    if path.is_empty()
        || path.eq_ignore_ascii_case(repo)
        || !path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'))
    {
        return None;
    }

    let looks_like_file = match extension_of(path) {
        Some(ext) => {
            let stem = &path[..path.len() - ext.len() - 1];
            path.contains('/')
                || KNOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                || KNOWN_NAMES.contains(&stem)
        }
        None => !path.contains('/') && KNOWN_NAMES.contains(&path),
    };
    looks_like_file.then(|| path.to_string())
}

/// Path-like references in `answer`, in order of first appearance.
pub fn cited_paths(answer: &str, repo: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();

    let spans = backtick_span().captures_iter(answer).map(|c| c[1].to_string());
    let bare = bare_token().captures_iter(answer).map(|c| c[1].to_string());

    for candidate in spans.chain(bare) {
        if let Some(path) = as_path(&candidate, repo) {
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }
    out
}

fn is_verified(path: &str, evidence: &BTreeSet<String>) -> bool {
    evidence.contains(path) || evidence.iter().any(|e| e.ends_with(&format!("/{}", path)))
}

/// Cited paths that no tool result contained.
pub fn unverified_paths(answer: &str, evidence: &BTreeSet<String>, repo: &str) -> Vec<String> {
    cited_paths(answer, repo)
        .into_iter()
        .filter(|p| !is_verified(p, evidence))
        .collect()
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/')
}

/// Replace each listed path with a marker. Only whole paths are replaced:
/// `src/a.rs` inside `lib/src/a.rs` or `src/a.rsx` is left alone.
pub fn redact(answer: &str, paths: &[String]) -> String {
    let mut sorted: Vec<&String> = paths.iter().filter(|p| !p.is_empty()).collect();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));

    let mut text = answer.to_string();
    for path in sorted {
        text = redact_one(&text, path);
    }
    text
}

fn redact_one(text: &str, path: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for (start, _) in text.match_indices(path) {
        let end = start + path.len();
        let start = if text[..start].ends_with("./") { start - 2 } else { start };
        if start < copied {
            continue;
        }

        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_path_char(c) && c != '.');
        let after_ok = text[end..].chars().next().map_or(true, |c| !is_path_char(c));
        if before_ok && after_ok {
            out.push_str(&text[copied..start]);
            out.push_str(REDACTED);
            copied = end;
        }
    }
    out.push_str(&text[copied..]);
    out
}
