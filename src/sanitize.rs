//! String scrubbing for filenames and inline comments.

/// Characters Windows refuses in filenames.
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip characters that would break the mapping file's value syntax, so a
/// parameter name can ride along as an inline comment.
pub fn comment_safe(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ';' && *c != '#')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Derive a suggested filename stem from a plugin's display name.
///
/// Host plugin names tend to look like `VST3: Pro-Q 3 (FabFilter)`. The
/// format tag up to the first `:` and the trailing vendor parenthetical
/// are dropped, then anything a filesystem would choke on becomes `_`.
/// The result is advisory only; nothing here touches the filesystem.
pub fn suggest_filename(plugin_name: &str) -> String {
    let mut name = plugin_name;

    if let Some(colon) = name.find(':') {
        name = name[colon + 1..].trim_start();
    }
    if name.ends_with(')') {
        if let Some(paren) = name.rfind('(') {
            name = name[..paren].trim_end();
        }
    }

    name.trim()
        .chars()
        .map(|c| {
            if ILLEGAL_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
