use crate::errors::MapperError;
use log::{debug, trace};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write;

/// The parameter table extracted from a plugin dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDump {
    pub plugin_name: String,
    pub params: BTreeMap<u32, String>,
}

/// Parse the text the surface's dump action puts on the clipboard.
///
/// The format is line-oriented and order-insensitive: `[Plugin Name]`
/// headers (the last one wins) and `; {id} = {name}` parameter lines (the
/// last occurrence of an id wins). Everything else is ignored. Fails only
/// when neither kind of line was seen at all.
pub fn parse_dump(text: &str) -> Result<ParamDump, MapperError> {
    let param_line = Regex::new(r"^;\s*(\d+)\s*=\s*(.*)$").expect("param line regex");

    let mut plugin_name = "Unknown".to_string();
    let mut params = BTreeMap::new();
    let mut header_seen = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            plugin_name = line[1..line.len() - 1].to_string();
            header_seen = true;
            continue;
        }

        if let Some(captures) = param_line.captures(line) {
            // The id regex only admits digits, but the number can still
            // overflow u32; skip the line rather than mis-assign it.
            if let Ok(id) = captures[1].parse::<u32>() {
                params.insert(id, captures[2].trim().to_string());
            } else {
                trace!("skipping parameter line with oversized id: '{}'", line);
            }
        }
    }

    if !header_seen && params.is_empty() {
        return Err(MapperError::InvalidDumpFormat);
    }

    debug!(
        "parsed dump for '{}' with {} parameters",
        plugin_name,
        params.len()
    );

    Ok(ParamDump {
        plugin_name,
        params,
    })
}

/// Render a parameter table back into dump text, matching what the
/// surface's dump action writes. Mostly useful for fixtures and for
/// inspecting a table without a running host.
pub fn format_dump(plugin_name: &str, params: &BTreeMap<u32, String>) -> String {
    let mut out = String::new();
    writeln!(out, "[{}]", plugin_name).expect("writing to a String");
    for (id, name) in params {
        writeln!(out, "; {} = {}", id, name).expect("writing to a String");
    }
    out
}
