//! Round-trips a [`Mapping`] through the persisted INI-style text format.
//!
//! The format stays hand-editable: values may carry ` ; comment` tails
//! (stripped on read), keys are matched case-insensitively, and unknown
//! keys or sections are ignored rather than rejected. Saving is total and
//! deterministic; loading is lenient about everything except a missing
//! `[Main]` section.

use crate::errors::MapperError;
use crate::mapping::{action_label, Assignment, Mapping, Page, KNOBS_PER_PAGE, MAPPABLE_BUTTONS};
use crate::sanitize::comment_safe;
use log::{info, warn};
use std::collections::HashMap;
use std::fmt::Write;

/// Serialize a mapping to the persisted text format.
///
/// Sections come out as `[Main]`, then one `[Page{N}]` per page in
/// traversal order, then `[Buttons]`. Unassigned knob slots and buttons
/// emit no key at all. Parameter names from the working table ride along
/// as ` ; name` comments when known; they are never read back.
pub fn serialize(mapping: &Mapping) -> String {
    let mut out = String::new();

    writeln!(out, "[Main]").expect("writing to a String");
    writeln!(out, "PluginName = {}", mapping.plugin_name).expect("writing to a String");
    writeln!(out).expect("writing to a String");

    for (index, page) in mapping.pages.iter().enumerate() {
        writeln!(out, "[Page{}]", index + 1).expect("writing to a String");
        writeln!(out, "Name = {}", page.name).expect("writing to a String");
        for (knob, knob_map) in page.knobs.iter().enumerate() {
            let n = knob + 1;
            if let Some(id) = knob_map.plain {
                writeln!(out, "K{} = {}", n, param_value(mapping, id)).expect("writing to a String");
            }
            if let Some(id) = knob_map.shift {
                writeln!(out, "K{}_Shift = {}", n, param_value(mapping, id))
                    .expect("writing to a String");
            }
            if let Some(id) = knob_map.touch {
                writeln!(out, "K{}_Touch = {}", n, param_value(mapping, id))
                    .expect("writing to a String");
            }
        }
        writeln!(out).expect("writing to a String");
    }

    // The Buttons header is always present, even with nothing assigned.
    writeln!(out, "[Buttons]").expect("writing to a String");
    for name in MAPPABLE_BUTTONS.iter() {
        match mapping.button(name) {
            Assignment::Unassigned => {}
            Assignment::Param(id) => {
                writeln!(out, "{} = {}", name, param_value(mapping, id))
                    .expect("writing to a String");
            }
            Assignment::Action(code) => match action_label(&code) {
                Some(label) => writeln!(out, "{} = {} ; {}", name, code, label)
                    .expect("writing to a String"),
                None => writeln!(out, "{} = {}", name, code).expect("writing to a String"),
            },
        }
    }

    out
}

// "{id} ; {name}" when a usable name exists in the working table, bare
// "{id}" otherwise.
fn param_value(mapping: &Mapping, id: u32) -> String {
    let name = mapping
        .params
        .get(&id)
        .map(|name| comment_safe(name))
        .unwrap_or_default();
    if name.is_empty() {
        id.to_string()
    } else {
        format!("{} ; {}", id, name)
    }
}

/// Parse the persisted text format back into a [`Mapping`].
///
/// The working parameter table is *not* reconstructed; only ids survive a
/// round trip, and the result's `params` is always empty.
pub fn deserialize(text: &str) -> Result<Mapping, MapperError> {
    let sections = read_sections(text);

    let main = sections
        .get("main")
        .ok_or(MapperError::MissingMainSection)?;

    let mut mapping = Mapping::new();
    mapping.plugin_name = main
        .get("pluginname")
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string());

    // Pages are probed sequentially; the first gap ends the scan.
    mapping.pages.clear();
    let mut index = 1;
    while let Some(section) = sections.get(&format!("page{}", index)) {
        let mut page = Page::new(
            section
                .get("name")
                .cloned()
                .unwrap_or_else(|| format!("Page {}", index)),
        );
        for knob in 0..KNOBS_PER_PAGE {
            let n = knob + 1;
            page.knobs[knob].plain = knob_id(section.get(&format!("k{}", n)));
            page.knobs[knob].shift = knob_id(section.get(&format!("k{}_shift", n)));
            page.knobs[knob].touch = knob_id(section.get(&format!("k{}_touch", n)));
        }
        mapping.pages.push(page);
        index += 1;
    }
    if mapping.pages.is_empty() {
        mapping.pages.push(Page::new("Page 1"));
    }

    if let Some(section) = sections.get("buttons") {
        for name in MAPPABLE_BUTTONS.iter() {
            if let Some(raw) = section.get(&name.to_lowercase()) {
                mapping
                    .buttons
                    .insert(name.to_string(), button_assignment(raw));
            }
        }
    }

    info!(
        "loaded mapping for '{}' with {} page(s)",
        mapping.plugin_name,
        mapping.pages.len()
    );

    Ok(mapping)
}

// Sections and keys are lowercased for case-insensitive lookup. Values
// keep their raw text; comment stripping happens per field because only
// value fields treat ';' as a comment.
fn read_sections(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_lowercase();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        if let (Some(section), Some(eq)) = (&current, line.find('=')) {
            let key = line[..eq].trim().to_lowercase();
            let value = line[eq + 1..].trim().to_string();
            sections
                .entry(section.clone())
                .or_default()
                .insert(key, value);
        }
    }

    sections
}

// A knob field holds a parameter id, possibly with a " ; name" tail.
// Absent, "-1", negative, or unparsable text all mean unassigned; corrupt
// numbers never abort a load.
fn knob_id(raw: Option<&String>) -> Option<u32> {
    let raw = raw?;
    let text = raw.split(';').next().unwrap_or("").trim();
    if text.is_empty() || text == "-1" {
        return None;
    }
    match text.parse::<i64>() {
        Ok(id) if (0..=i64::from(u32::MAX)).contains(&id) => Some(id as u32),
        Ok(_) => None,
        Err(_) => {
            warn!("ignoring unparsable knob value '{}'", raw);
            None
        }
    }
}

// Buttons additionally accept action codes: anything non-numeric is kept
// verbatim, which is how "@" tokens survive the round trip.
fn button_assignment(raw: &str) -> Assignment {
    let text = raw.split(';').next().unwrap_or("").trim();
    if text.is_empty() || text == "-1" {
        return Assignment::Unassigned;
    }
    match text.parse::<i64>() {
        Ok(id) if (0..=i64::from(u32::MAX)).contains(&id) => Assignment::Param(id as u32),
        Ok(_) => Assignment::Unassigned,
        Err(_) => Assignment::Action(text.to_string()),
    }
}
