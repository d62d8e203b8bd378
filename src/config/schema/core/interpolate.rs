/// Replace `${NAME}` placeholders with values from `lookup`.
///
/// Unknown names are left verbatim so validation can point at them.
pub(super) fn interpolate_env<F>(contents: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(contents.len());
    let mut rest = contents;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match lookup(name).filter(|_| is_env_name(name)) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn is_env_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// First unresolved `${NAME}` placeholder in `value`, if any.
pub(super) fn unresolved_placeholder(value: &str) -> Option<&str> {
    let start = value.find("${")?;
    let after = &value[start + 2..];
    let end = after.find('}')?;
    Some(&value[start..start + 2 + end + 1])
}
