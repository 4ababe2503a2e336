//! `--wssize` injection for TCP blocks that cover port 443

use super::{is_block_boundary, PortSet, TokenPass};
use tracing::debug;

const FILTER_TCP: &str = "--filter-tcp=";
const HTTPS_PORT: u16 = 443;

/// Tokens appended after a matching block
const WSSIZE_TOKENS: [&str; 3] = ["--wssize", "1:6", "--wssize-forced-cutoff=0"];

fn is_wssize_token(token: &str) -> bool {
    token == "--wssize" || token.starts_with("--wssize=") || token.starts_with("--wssize-forced-cutoff")
}

/// Appends `--wssize 1:6 --wssize-forced-cutoff=0` to every `--filter-tcp`
/// block whose port set includes 443, unless the block already sets a
/// window size
#[derive(Debug, Clone, Copy, Default)]
pub struct WssizeInjection {
    wildcard_port_matches: bool,
}

impl WssizeInjection {
    /// Create the pass; `wildcard_port_matches` makes `--filter-tcp=*` count as 443
    pub fn new(wildcard_port_matches: bool) -> Self {
        Self {
            wildcard_port_matches,
        }
    }

    fn covers_https(&self, token: &str) -> bool {
        token.strip_prefix(FILTER_TCP).is_some_and(|ports| {
            PortSet::parse(ports).contains_with_wildcard(HTTPS_PORT, self.wildcard_port_matches)
        })
    }
}

impl TokenPass for WssizeInjection {
    fn name(&self) -> &'static str {
        "wssize"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn apply(&self, tokens: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len() + WSSIZE_TOKENS.len());
        let mut injected = 0usize;
        let mut i = 0;

        while i < tokens.len() {
            if !self.covers_https(&tokens[i]) {
                out.push(tokens[i].clone());
                i += 1;
                continue;
            }

            let end = tokens[i + 1..]
                .iter()
                .position(|t| is_block_boundary(t))
                .map_or(tokens.len(), |offset| i + 1 + offset);
            let block = &tokens[i..end];

            out.extend_from_slice(block);
            if !block.iter().any(|t| is_wssize_token(t)) {
                out.extend(WSSIZE_TOKENS.iter().map(|t| t.to_string()));
                injected += 1;
            }
            i = end;
        }

        if injected > 0 {
            debug!(blocks = injected, "Injected wssize into TCP/443 blocks");
        }
        out
    }
}
