//! Shared validation helpers.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is empty or only whitespace.
pub(crate) fn validate_non_empty(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}

/// Push an error unless `value` starts with one of `schemes` and has a host.
pub(crate) fn validate_url(errors: &mut Vec<String>, name: &str, value: &str, schemes: &[&str]) {
    let rest = schemes.iter().find_map(|scheme| value.strip_prefix(scheme));
    match rest {
        Some(host) if !host.is_empty() => {}
        _ => errors.push(format!(
            "{name} = {value:?} must be a {} URL",
            schemes.join(" / ")
        )),
    }
}
