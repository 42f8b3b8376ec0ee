use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Attribute names as they appear in game data, and the names players know them by.
pub const ATTRIBUTE_RENAMES: [(&str, &str); 4] = [
    ("BoonDuration", "Concentration"),
    ("ConditionDuration", "Expertise"),
    ("ConditionDamage", "Condition Damage"),
    ("CritDamage", "Ferocity"),
];

static ATTRIBUTE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    let names: Vec<&str> = ATTRIBUTE_RENAMES.iter().map(|(from, _)| *from).collect();
    Regex::new(&names.join("|")).ok()
});
static COLOUR_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"</?c(=[^>]*)?>").ok());
static LINE_BREAK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").ok());

fn rename_attribute(caps: &Captures) -> String {
    let name = &caps[0];
    ATTRIBUTE_RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| *to)
        .to_string()
}

pub fn substitute_attributes(text: &str) -> String {
    match ATTRIBUTE_PATTERN.as_ref() {
        Some(pattern) => pattern.replace_all(text, rename_attribute).into_owned(),
        None => text.to_string(),
    }
}

/// Removes the inline markup used in game descriptions, such as
/// `<c=@reminder>...</c>` colour spans and `<br>` breaks.
pub fn strip_markup(text: &str) -> String {
    let mut cleaned = text.to_string();
    if let Some(colour) = COLOUR_TAG.as_ref() {
        cleaned = colour.replace_all(&cleaned, "").into_owned();
    }
    if let Some(line_break) = LINE_BREAK.as_ref() {
        cleaned = line_break.replace_all(&cleaned, "\n").into_owned();
    }
    cleaned
}

pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

// Rounds to two decimals, ties to even, and always keeps at least one decimal, so 2.0 reads "2.0".
pub fn format_coefficient(value: f64) -> String {
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}

pub fn wiki_url(base: &str, name: &str) -> String {
    format!("{}{}", base, name.replace(' ', "_"))
}
