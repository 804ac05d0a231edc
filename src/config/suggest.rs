//! Typo suggestions for configuration keys and environment values

use std::io::Write;

/// Largest edit distance still offered as a suggestion
const MAX_DISTANCE: usize = 2;

/// The candidate closest to `input`, if it is a plausible typo of it
pub fn closest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .iter()
        .map(|candidate| (*candidate, edit_distance(&input, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist > 0 && *dist <= MAX_DISTANCE)
        .map(|(candidate, _)| candidate)
}

/// Parse an enumerated environment value, warning on `writer` and falling
/// back to `default` when it is not one of `choices`
pub fn parse_env_choice<T, W: Write>(
    var: &str,
    value: &str,
    choices: &[&str],
    parse: impl Fn(&str) -> Option<T>,
    default: T,
    writer: &mut W,
) -> T {
    if let Some(parsed) = parse(value) {
        return parsed;
    }
    let hint = closest(value, choices)
        .map(|c| format!(". Did you mean '{}'?", c))
        .unwrap_or_default();
    let _ = writeln!(writer, "Warning: Invalid {} value '{}'{}", var, value, hint);
    let _ = writeln!(writer, "Valid values: {}", choices.join(", "));
    default
}

/// Levenshtein distance over bytes (keys and values are ASCII)
pub fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
