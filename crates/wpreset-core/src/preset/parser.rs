//! Preset text parser

use super::writer::synthesized_header;
use super::{CategoryBlock, PresetData};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

static PRESET_DIRECTIVE: Lazy<Regex> = Lazy::new(|| directive_regex("Preset"));
static ACTIVE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| directive_regex("ActivePreset"));
static STRATEGY_DIRECTIVE: Lazy<Regex> = Lazy::new(|| directive_regex("Strategy"));

/// Lines starting with one of these open the first category block
const BLOCK_START_PREFIXES: &[&str] = &["--filter-tcp", "--filter-udp", "--filter-l7"];

/// Standalone separator between category blocks
pub(crate) const BLOCK_SEPARATOR: &str = "--new";

pub(crate) const COMMENT_MARKER: char = '#';

fn directive_regex(name: &str) -> Regex {
    let pattern = format!(r"(?i)^#\s*{}\s*:\s*(\S.*?)\s*$", regex::escape(name));
    Regex::new(&pattern).expect("directive pattern is a valid regex")
}

fn directive_value<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Leading comment region of a document
struct Header<'a> {
    name: Option<String>,
    active_preset: Option<String>,
    /// Header lines as written, trailing blank lines excluded
    lines: Vec<&'a str>,
    /// Index of the first body line
    body_start: usize,
}

fn parse_header<'a>(lines: &[&'a str]) -> Header<'a> {
    let mut header = Header {
        name: None,
        active_preset: None,
        lines: Vec::new(),
        body_start: lines.len(),
    };
    let mut saw_preset_directive = false;

    for (idx, &line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if !header.lines.is_empty() {
                header.lines.push(line);
            }
            continue;
        }

        if !trimmed.starts_with(COMMENT_MARKER) {
            header.body_start = idx;
            break;
        }

        header.lines.push(line);

        if let Some(name) = directive_value(&PRESET_DIRECTIVE, trimmed) {
            header.name = Some(name.to_string());
            saw_preset_directive = true;
        } else if let Some(active) = directive_value(&ACTIVE_DIRECTIVE, trimmed) {
            header.active_preset = Some(active.to_string());
        } else if let Some(name) = directive_value(&STRATEGY_DIRECTIVE, trimmed) {
            if !saw_preset_directive {
                header.name = Some(name.to_string());
            }
        }
    }

    while header.lines.last().is_some_and(|l| l.trim().is_empty()) {
        header.lines.pop();
    }

    header
}

fn is_block_start(line: &str) -> bool {
    BLOCK_START_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Split the block region into raw block texts
fn split_blocks(lines: &[&str]) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines.iter().map(|l| l.trim()) {
        if line == BLOCK_SEPARATOR {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

/// Parse a preset document
///
/// Never fails: unrecognised content falls back to defaults. Duplicate
/// category blocks are merged before returning.
pub fn parse_preset_content(content: &str) -> PresetData {
    let lines: Vec<&str> = content.lines().collect();
    let header = parse_header(&lines);

    let mut data = PresetData::default();
    if let Some(name) = header.name {
        data.name = name;
    }
    data.active_preset = header.active_preset;
    // A header identical to the synthesized one stays empty so that
    // parse(generate(parse(x))) is a fixed point for headerless documents
    let raw_header = header.lines.join("\n");
    if raw_header != synthesized_header(&data.name, data.active_preset.as_deref()).join("\n") {
        data.raw_header = raw_header;
    }

    let body = &lines[header.body_start..];
    let first_block = body.iter().position(|l| is_block_start(l.trim()));
    let (base, block_region) = match first_block {
        Some(idx) => body.split_at(idx),
        None => (body, &[][..]),
    };

    data.base_args = base
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    for raw in split_blocks(block_region) {
        let block = CategoryBlock::from_args(raw);
        debug!(
            category = %block.category,
            protocol = %block.protocol,
            port = %block.port,
            filter_mode = %block.filter_mode,
            "Parsed category block"
        );
        data.categories.push(block);
    }

    data.deduplicate_categories();
    data
}

/// Parse a preset file
///
/// Invalid UTF-8 is replaced rather than rejected. A missing file yields
/// [`Error::PresetNotFound`].
pub fn parse_preset_file<P: AsRef<Path>>(path: P) -> Result<PresetData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::PresetNotFound {
            path: path.display().to_string(),
        });
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let data = parse_preset_content(text);
    info!(
        path = %path.display(),
        name = %data.name,
        blocks = data.categories.len(),
        "Loaded preset"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{FilterMode, Protocol};

    const SAMPLE: &str = "# Preset: X\n--filter-tcp=443\n--hostlist=youtube-hosts.txt\n\
                          --dpi-desync=fake\n--new\n--filter-udp=50000-50010\n\
                          --ipset=ipset-cloudflare.txt\n--dpi-desync=fake";

    #[test]
    fn test_sample_document() {
        let data = parse_preset_content(SAMPLE);
        assert_eq!(data.name, "X");
        assert_eq!(data.categories.len(), 2);

        let first = &data.categories[0];
        assert_eq!(first.category, "youtube");
        assert_eq!(first.protocol, Protocol::Tcp);
        assert_eq!(first.filter_mode, FilterMode::Hostlist);
        assert_eq!(first.port, "443");

        let second = &data.categories[1];
        assert_eq!(second.category, "cloudflare");
        assert_eq!(second.protocol, Protocol::Udp);
        assert_eq!(second.filter_mode, FilterMode::Ipset);
        assert_eq!(second.port, "50000-50010");
    }

    #[test]
    fn test_header_directives() {
        let text = "# My custom preset\n# preset: Gaming\n#ActivePreset: Default\n\n--wf-tcp=80,443\n";
        let data = parse_preset_content(text);
        assert_eq!(data.name, "Gaming");
        assert_eq!(data.active_preset.as_deref(), Some("Default"));
        assert_eq!(
            data.raw_header,
            "# My custom preset\n# preset: Gaming\n#ActivePreset: Default"
        );
        assert_eq!(data.base_args, "--wf-tcp=80,443");
        assert!(data.categories.is_empty());
    }

    #[test]
    fn test_legacy_strategy_directive() {
        let data = parse_preset_content("# Strategy: Old\n--filter-tcp=80");
        assert_eq!(data.name, "Old");

        let data = parse_preset_content("# Preset: New\n# Strategy: Old\n--filter-tcp=80");
        assert_eq!(data.name, "New");

        let data = parse_preset_content("# Strategy: Old\n# Preset: New\n--filter-tcp=80");
        assert_eq!(data.name, "New");
    }

    #[test]
    fn test_directive_only_header_kept_verbatim() {
        let data = parse_preset_content("# Preset: X\n#ActivePreset:Y\n\n--filter-tcp=443");
        assert_eq!(data.raw_header, "# Preset: X\n#ActivePreset:Y");
        assert_eq!(data.name, "X");
        assert_eq!(data.active_preset.as_deref(), Some("Y"));

        let data = parse_preset_content("# Strategy: Old\n--filter-tcp=443");
        assert_eq!(data.raw_header, "# Strategy: Old");
    }

    #[test]
    fn test_synthesized_header_not_stored() {
        let data = parse_preset_content("# Preset: X\n# ActivePreset: Y\n\n--filter-tcp=443");
        assert!(data.raw_header.is_empty());
        assert_eq!(data.name, "X");

        let headerless = parse_preset_content("--filter-tcp=443\n--dpi-desync=fake");
        let text = crate::preset::generate_preset_content(&headerless, true);
        assert!(text.starts_with("# Preset: Unnamed\n\n"));
        assert_eq!(parse_preset_content(&text), headerless);
    }

    #[test]
    fn test_directive_spelling_survives_rewrite() {
        let data = parse_preset_content("#preset:X\n--filter-tcp=443\n--dpi-desync=fake");
        assert_eq!(data.raw_header, "#preset:X");
        assert_eq!(data.name, "X");

        let text = crate::preset::generate_preset_content(&data, true);
        assert!(text.starts_with("#preset:X\n\n--filter-tcp=443"));
        assert!(!text.contains("# Preset:"));
    }

    #[test]
    fn test_header_blank_lines_inside_kept() {
        let data = parse_preset_content("# one\n\n# Preset: Two\n\n\n--wf-tcp=443");
        assert_eq!(data.raw_header, "# one\n\n# Preset: Two");
        assert_eq!(data.base_args, "--wf-tcp=443");
    }

    #[test]
    fn test_comment_only_document() {
        let data = parse_preset_content("# just a note\n# Preset: Empty\n\n");
        assert_eq!(data.name, "Empty");
        assert!(data.base_args.is_empty());
        assert!(data.categories.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let data = parse_preset_content("");
        assert_eq!(data, PresetData::default());
    }

    #[test]
    fn test_base_args_split() {
        let text = "--wf-tcp=80,443\n\n  --wf-udp=443  \n--filter-tcp=80\n--dpi-desync=split";
        let data = parse_preset_content(text);
        assert_eq!(data.base_args, "--wf-tcp=80,443\n--wf-udp=443");
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.categories[0].port, "80");
    }

    #[test]
    fn test_empty_groups_skipped() {
        let text = "--filter-tcp=80\n--dpi-desync=a\n--new\n\n--new\n# dropped\n--new\n\
                    --filter-udp=443\n--dpi-desync=b\n--new";
        let data = parse_preset_content(text);
        assert_eq!(data.categories.len(), 2);
        assert_eq!(data.categories[1].args, "--filter-udp=443\n--dpi-desync=b");
    }

    #[test]
    fn test_duplicates_merged_on_parse() {
        let text = "--filter-tcp=443\n--hostlist=a.txt\n--dpi-desync=first\n--new\n\
                    --filter-tcp=80\n--hostlist=b.txt\n--new\n\
                    --filter-tcp=443\n--hostlist=a.txt\n--dpi-desync=second";
        let data = parse_preset_content(text);
        assert_eq!(data.categories.len(), 2);
        assert_eq!(data.categories[0].category, "a");
        assert!(data.categories[0].args.contains("second"));
        assert_eq!(data.categories[1].category, "b");
    }
}
