//! Hostlist / ipset token passes

use super::TokenPass;

const HOSTLIST_PREFIXES: &[&str] = &["--hostlist=", "--hostlist-domains=", "--hostlist-exclude="];
const IPSET_PREFIXES: &[&str] = &["--ipset=", "--ipset-ip=", "--ipset-exclude="];

const OTHER_LIST: &str = "other.txt";
const ALLZONE_LIST: &str = "allzone.txt";

fn strip_prefixed(tokens: Vec<String>, prefixes: &[&str]) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|t| !prefixes.iter().any(|p| t.starts_with(p)))
        .collect()
}

/// Drops `--hostlist=`, `--hostlist-domains=` and `--hostlist-exclude=` tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveHostlists;

impl TokenPass for RemoveHostlists {
    fn name(&self) -> &'static str {
        "remove_hostlists"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn apply(&self, tokens: Vec<String>) -> Vec<String> {
        strip_prefixed(tokens, HOSTLIST_PREFIXES)
    }
}

/// Drops `--ipset=`, `--ipset-ip=` and `--ipset-exclude=` tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveIpsets;

impl TokenPass for RemoveIpsets {
    fn name(&self) -> &'static str {
        "remove_ipsets"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn apply(&self, tokens: Vec<String>) -> Vec<String> {
        strip_prefixed(tokens, IPSET_PREFIXES)
    }
}

/// Points `--hostlist=...other.txt` at `allzone.txt` instead
#[derive(Debug, Clone, Copy, Default)]
pub struct AllzoneReplacement;

impl TokenPass for AllzoneReplacement {
    fn name(&self) -> &'static str {
        "allzone"
    }

    fn priority(&self) -> u8 {
        30
    }

    fn apply(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|t| {
                if t.starts_with("--hostlist=") && t.contains(OTHER_LIST) {
                    t.replace(OTHER_LIST, ALLZONE_LIST)
                } else {
                    t
                }
            })
            .collect()
    }
}
