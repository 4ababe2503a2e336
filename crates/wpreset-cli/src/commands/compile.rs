//! Compile command - final winws argument list

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;
use wpreset_core::{compile_preset, parse_preset_file, Config, FilterSettings};

use super::resolve_preset;

/// Compile command arguments
///
/// Filter flags switch passes on in addition to those enabled in `[filters]`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Preset file (default: the configured active preset)
    pub file: Option<PathBuf>,

    /// Drop all hostlist targeting
    #[arg(long)]
    pub remove_hostlists: bool,

    /// Drop all ipset targeting
    #[arg(long)]
    pub remove_ipsets: bool,

    /// Use allzone.txt in place of other.txt
    #[arg(long)]
    pub allzone: bool,

    /// Inject --wssize 1:6 into TCP blocks covering port 443
    #[arg(long)]
    pub wssize: bool,

    /// Print one argument per line instead of a single command line
    #[arg(long)]
    pub one_per_line: bool,
}

impl CompileArgs {
    /// Config toggles with command-line overrides applied
    pub fn settings(&self, base: &FilterSettings) -> FilterSettings {
        FilterSettings {
            remove_hostlists: base.remove_hostlists || self.remove_hostlists,
            remove_ipsets: base.remove_ipsets || self.remove_ipsets,
            allzone: base.allzone || self.allzone,
            wssize: base.wssize || self.wssize,
            wildcard_port_matches: base.wildcard_port_matches,
        }
    }
}

/// Execute compile command
pub fn execute(args: CompileArgs, config: &Config) -> Result<()> {
    let path = resolve_preset(args.file.as_deref(), config)?;
    let data = parse_preset_file(&path)
        .with_context(|| format!("Failed to load preset from {:?}", path))?;

    let settings = args.settings(&config.filters);
    debug!(?settings, "Effective filter settings");

    let tokens = compile_preset(&data, &settings);

    if args.one_per_line {
        for token in &tokens {
            println!("{}", token);
        }
    } else {
        let line: Vec<String> = tokens.iter().map(|t| quote_token(t)).collect();
        println!("{}", line.join(" "));
    }

    Ok(())
}

/// Quote a token for display on a single command line
fn quote_token(token: &str) -> String {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        format!("\"{}\"", token)
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_token() {
        assert_eq!(quote_token("--wssize"), "--wssize");
        assert_eq!(quote_token("--hostlist=C:\\My Lists\\a.txt"), "\"--hostlist=C:\\My Lists\\a.txt\"");
        assert_eq!(quote_token(""), "\"\"");
    }

    #[test]
    fn test_flags_extend_config() {
        let base = FilterSettings {
            allzone: true,
            wildcard_port_matches: true,
            ..FilterSettings::default()
        };
        let args = CompileArgs {
            file: None,
            remove_hostlists: false,
            remove_ipsets: true,
            allzone: false,
            wssize: true,
            one_per_line: false,
        };

        let settings = args.settings(&base);
        assert!(settings.allzone);
        assert!(settings.remove_ipsets);
        assert!(settings.wssize);
        assert!(!settings.remove_hostlists);
        assert!(settings.wildcard_port_matches);
    }
}
