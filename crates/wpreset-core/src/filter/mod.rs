//! Token filter pipeline
//!
//! Rewrite passes over a flat list of command-line tokens, applied right
//! before the list is handed to winws. Every pass is idempotent and can be
//! switched off through [`FilterToggles`]; the pipeline always runs enabled
//! passes in the same order:
//!
//! 1. strip hostlist references
//! 2. strip ipset references
//! 3. `other.txt` → `allzone.txt` substitution
//! 4. `--wssize` injection for TCP blocks covering port 443
//!
//! Removal runs first so that stripped flags can never satisfy the content
//! checks of later passes.

mod lists;
mod ports;
mod wssize;

pub use lists::{AllzoneReplacement, RemoveHostlists, RemoveIpsets};
pub use ports::{PortEntry, PortSet};
pub use wssize::WssizeInjection;

use tracing::{debug, instrument};

/// Settings provider for the filter passes
#[cfg_attr(test, mockall::automock)]
pub trait FilterToggles {
    /// Drop every `--hostlist*` targeting token
    fn remove_hostlists(&self) -> bool;

    /// Drop every `--ipset*` targeting token
    fn remove_ipsets(&self) -> bool;

    /// Substitute `allzone.txt` for `other.txt` in hostlist paths
    fn allzone(&self) -> bool;

    /// Inject `--wssize 1:6` into TCP blocks covering port 443
    fn wssize(&self) -> bool;

    /// Treat port spec `*` as covering port 443
    fn wildcard_port_matches(&self) -> bool {
        false
    }
}

/// One rewrite pass over a token list
pub trait TokenPass: Send + Sync {
    /// Pass name for logging
    fn name(&self) -> &'static str;

    /// Position in the pipeline (lower = runs first)
    fn priority(&self) -> u8 {
        100
    }

    /// Rewrite the token list
    fn apply(&self, tokens: Vec<String>) -> Vec<String>;
}

/// Ordered set of enabled token passes
pub struct FilterPipeline {
    passes: Vec<Box<dyn TokenPass>>,
}

impl FilterPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Build a pipeline holding only the passes enabled in `settings`
    pub fn from_settings<S: FilterToggles + ?Sized>(settings: &S) -> Self {
        let mut pipeline = Self::new();

        if settings.remove_hostlists() {
            pipeline.add_pass(RemoveHostlists);
        }
        if settings.remove_ipsets() {
            pipeline.add_pass(RemoveIpsets);
        }
        if settings.allzone() {
            pipeline.add_pass(AllzoneReplacement);
        }
        if settings.wssize() {
            pipeline.add_pass(WssizeInjection::new(settings.wildcard_port_matches()));
        }

        pipeline
    }

    /// Add a pass, keeping passes ordered by priority
    pub fn add_pass<P: TokenPass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
        self.passes.sort_by_key(|p| p.priority());
    }

    /// Number of passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Pass names in execution order
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass in order
    #[instrument(skip_all, fields(tokens = tokens.len(), passes = self.passes.len()))]
    pub fn run(&self, tokens: Vec<String>) -> Vec<String> {
        self.passes.iter().fold(tokens, |tokens, pass| {
            let before = tokens.len();
            let tokens = pass.apply(tokens);
            debug!(pass = pass.name(), before, after = tokens.len(), "Applied token pass");
            tokens
        })
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop hostlist targeting tokens if enabled
pub fn apply_remove_hostlists<S: FilterToggles + ?Sized>(tokens: Vec<String>, settings: &S) -> Vec<String> {
    if !settings.remove_hostlists() {
        return tokens;
    }
    RemoveHostlists.apply(tokens)
}

/// Drop ipset targeting tokens if enabled
pub fn apply_remove_ipsets<S: FilterToggles + ?Sized>(tokens: Vec<String>, settings: &S) -> Vec<String> {
    if !settings.remove_ipsets() {
        return tokens;
    }
    RemoveIpsets.apply(tokens)
}

/// Substitute `allzone.txt` for `other.txt` in hostlist paths if enabled
pub fn apply_allzone_replacement<S: FilterToggles + ?Sized>(tokens: Vec<String>, settings: &S) -> Vec<String> {
    if !settings.allzone() {
        return tokens;
    }
    AllzoneReplacement.apply(tokens)
}

/// Inject window-size directives after TCP/443 blocks if enabled
pub fn apply_wssize_parameter<S: FilterToggles + ?Sized>(tokens: Vec<String>, settings: &S) -> Vec<String> {
    if !settings.wssize() {
        return tokens;
    }
    WssizeInjection::new(settings.wildcard_port_matches()).apply(tokens)
}

/// Run all enabled passes in their fixed order
pub fn apply_all_filters<S: FilterToggles + ?Sized>(tokens: Vec<String>, settings: &S) -> Vec<String> {
    FilterPipeline::from_settings(settings).run(tokens)
}

/// Whether a token opens a new filter block (or separates blocks)
pub(crate) fn is_block_boundary(token: &str) -> bool {
    token.starts_with("--filter-") || token == "--new"
}
