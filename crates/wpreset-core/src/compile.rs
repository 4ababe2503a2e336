//! Turn a preset into the argument list handed to winws

use crate::filter::{apply_all_filters, FilterToggles};
use crate::preset::PresetData;
use tracing::debug;

/// Split argument text into tokens
///
/// Works line by line: blank and `#` comment lines are skipped, tokens are
/// separated by whitespace outside double quotes, and the quotes themselves
/// are dropped (`--hostlist="a b.txt"` → `--hostlist=a b.txt`).
pub fn tokenize_args(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut current = String::new();
        let mut in_quotes = false;
        let mut has_token = false;

        for ch in line.chars() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    has_token = true;
                }
                c if c.is_whitespace() && !in_quotes => {
                    if has_token {
                        tokens.push(std::mem::take(&mut current));
                        has_token = false;
                    }
                }
                c => {
                    current.push(c);
                    has_token = true;
                }
            }
        }

        if has_token {
            tokens.push(current);
        }
    }

    tokens
}

/// Flatten a preset into tokens: base arguments, then blocks joined by `--new`
pub fn build_command_line(data: &PresetData) -> Vec<String> {
    let mut tokens = tokenize_args(&data.base_args);

    for (idx, block) in data.categories.iter().enumerate() {
        if idx > 0 {
            tokens.push("--new".to_string());
        }
        tokens.extend(tokenize_args(&block.args));
    }

    tokens
}

/// Final argument list: the flattened preset after the enabled filter passes
pub fn compile_preset<S: FilterToggles + ?Sized>(data: &PresetData, settings: &S) -> Vec<String> {
    let tokens = build_command_line(data);
    debug!(preset = %data.name, tokens = tokens.len(), "Compiling preset");
    apply_all_filters(tokens, settings)
}
