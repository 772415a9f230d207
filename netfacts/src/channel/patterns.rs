//! Prompt pattern helpers.

use regex::bytes::Regex;

/// Compile a prompt pattern, anchoring it to a line start and to the end of
/// the data.
///
/// Patterns that already end in `$` are left untouched. Anything else must
/// begin a line and may only be followed by spaces or tabs, so a match only
/// counts when the prompt is the last line the device sent.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!(r"(?m)^(?:{})[ \t]*\z", pattern)
    };

    Regex::new(&pattern)
}

/// Build an exact prompt regex from the prompt text detected after login.
///
/// The trailing terminator character (one of `terminators`, e.g. `>#`) is
/// replaced by a class of all terminators, so `Router1>` also matches
/// `Router1#` after privilege changes. Returns `None` if the detected text
/// does not end in a terminator.
pub fn exact_prompt_pattern(detected: &str, terminators: &str) -> Option<Regex> {
    let detected = detected.trim();
    let last = detected.chars().last()?;
    if !terminators.contains(last) {
        return None;
    }

    let base = &detected[..detected.len() - last.len_utf8()];
    if base.is_empty() {
        return None;
    }

    // Config submodes show up as `Router1(config-if)#`.
    let pattern = format!(
        r"(?m)^{}(?:\([^)\n]*\))?[{}][ \t]*\z",
        regex::escape(base),
        regex::escape(terminators)
    );
    Regex::new(&pattern).ok()
}
