//! Field tag parser: `"<column>[,<modifier>...]"`.

/// A parsed field tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTag {
    pub column: String,
    pub primary_key: bool,
    pub generated: bool,
    pub remainder: bool,
    pub embed: bool,
}

/// Parse one tag. The error is a human-readable reason; the caller adds
/// the record and field names.
pub fn parse_tag(tag: &str) -> Result<ParsedTag, String> {
    let mut parts = tag.split(',').map(str::trim);

    let column = parts.next().unwrap_or_default();
    if column.is_empty() {
        return Err(format!("tag {tag:?} has an empty column name"));
    }
    if column.contains(char::is_whitespace) {
        return Err(format!("column name {column:?} contains whitespace"));
    }

    let mut parsed = ParsedTag {
        column: column.to_string(),
        ..ParsedTag::default()
    };

    for modifier in parts {
        let flag = match modifier {
            "pk" | "primary_key" => &mut parsed.primary_key,
            "generated" => &mut parsed.generated,
            "remainder" => &mut parsed.remainder,
            "embed" => &mut parsed.embed,
            "" => return Err(format!("tag {tag:?} has an empty modifier")),
            other => return Err(format!("unknown modifier {other:?} in tag {tag:?}")),
        };
        if *flag {
            return Err(format!("modifier {modifier:?} repeated in tag {tag:?}"));
        }
        *flag = true;
    }

    if parsed.remainder && (parsed.primary_key || parsed.generated || parsed.embed) {
        return Err(format!("remainder field {column:?} cannot carry other modifiers"));
    }
    if parsed.embed && (parsed.primary_key || parsed.generated) {
        return Err(format!("embedded field {column:?} cannot be a key or generated"));
    }

    Ok(parsed)
}
