//! Field extraction from raw block text
//!
//! These functions never fail. Anything they cannot recognise degrades to the
//! documented defaults (`"unknown"` category, `tcp`/`443`).

use super::{FilterMode, Protocol, DEFAULT_PORT, UNKNOWN_CATEGORY};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static HOSTLIST_RE: Lazy<Regex> = Lazy::new(|| flag_value_regex("hostlist"));
static IPSET_RE: Lazy<Regex> = Lazy::new(|| flag_value_regex("ipset"));
static FILTER_TCP_RE: Lazy<Regex> = Lazy::new(|| flag_value_regex("filter-tcp"));
static FILTER_UDP_RE: Lazy<Regex> = Lazy::new(|| flag_value_regex("filter-udp"));
static FILTER_L7_RE: Lazy<Regex> = Lazy::new(|| flag_value_regex("filter-l7"));
static SYNDATA_RE: Lazy<Regex> = Lazy::new(|| flag_value_regex("syndata"));

/// List-file stem suffixes that carry no category meaning
const LIST_SUFFIXES: &[&str] = &["-hosts", "-ips", "-ipset", "-hostlist", "_hosts", "_ips"];

/// Line prefixes that target traffic rather than describe behaviour
const FRAMING_PREFIXES: &[&str] = &[
    "--filter-",
    "--hostlist=",
    "--hostlist-domains=",
    "--hostlist-exclude=",
    "--ipset=",
    "--ipset-ip=",
    "--ipset-exclude=",
];

/// `--<flag>=<value>` where value is a double-quoted string or a run of non-space
fn flag_value_regex(flag: &str) -> Regex {
    let pattern = format!(r#"(?:^|\s)--{}=("[^"]*"|\S+)"#, regex::escape(flag));
    Regex::new(&pattern).expect("flag pattern is a valid regex")
}

fn capture_value<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_matches('"'))
}

/// Infer `(category, filter_mode, filter_file)` from a block
pub fn extract_category_from_args(text: &str) -> (String, FilterMode, String) {
    if let Some(path) = capture_value(&HOSTLIST_RE, text) {
        return (category_from_path(path), FilterMode::Hostlist, path.to_string());
    }
    if let Some(path) = capture_value(&IPSET_RE, text) {
        return (category_from_path(path), FilterMode::Ipset, path.to_string());
    }
    if text.contains("--hostlist-domains=") {
        return (UNKNOWN_CATEGORY.to_string(), FilterMode::Hostlist, String::new());
    }
    if text.contains("--ipset-ip=") {
        return (UNKNOWN_CATEGORY.to_string(), FilterMode::Ipset, String::new());
    }
    (UNKNOWN_CATEGORY.to_string(), FilterMode::None, String::new())
}

/// Category name for a list file path
///
/// `lists/ipset-cloudflare.txt` becomes `cloudflare`, `C:\z\YouTube-hosts.txt`
/// becomes `youtube`, and `Discord-IPS.txt` becomes `discord-ips`.
fn category_from_path(path: &str) -> String {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => file_name,
    };

    // Affixes match case-sensitively; only the result is lower-cased
    let stem = LIST_SUFFIXES
        .iter()
        .find_map(|suffix| stem.strip_suffix(*suffix))
        .unwrap_or(stem);
    let stem = stem.strip_prefix("ipset-").unwrap_or(stem);

    if stem.is_empty() {
        UNKNOWN_CATEGORY.to_string()
    } else {
        stem.to_lowercase()
    }
}

/// Infer `(protocol, port)` from a block's filter flag
pub fn extract_protocol_and_port(text: &str) -> (Protocol, String) {
    if let Some(ports) = capture_value(&FILTER_TCP_RE, text) {
        return (Protocol::Tcp, ports.to_string());
    }
    if let Some(ports) = capture_value(&FILTER_UDP_RE, text) {
        return (Protocol::Udp, ports.to_string());
    }
    if let Some(spec) = capture_value(&FILTER_L7_RE, text) {
        return (Protocol::Udp, spec.to_string());
    }
    (Protocol::Tcp, DEFAULT_PORT.to_string())
}

/// Block text with filter and targeting lines removed
pub fn extract_strategy_args(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !FRAMING_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parameters of a `--syndata=k:v,...` flag, if present
pub fn extract_syndata(text: &str) -> Option<BTreeMap<String, String>> {
    let spec = capture_value(&SYNDATA_RE, text)?;
    let params = spec
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (entry.to_string(), String::new()),
        })
        .collect();
    Some(params)
}
