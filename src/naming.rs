//! Key derivation from service type names.
//!
//! The two transforms deliberately disagree: the config key strips the
//! `Service` suffix as a whole, while the provider name trims trailing
//! characters drawn from the set `{S, e, r, v, i, c}`. The latter can
//! over-trim when a name ends in repeated matching characters
//! (`"SharpApiService"` -> `"SharpAp"`, `"ServiceService"` -> `""`).

const SUFFIX: &str = "Service";

/// Config key for a service type name: strip one trailing `Service`,
/// then convert upper-camel-case to lower-snake-case.
pub fn config_key_for(type_name: &str) -> String {
    let trimmed = type_name.strip_suffix(SUFFIX).unwrap_or(type_name);
    let mut key = String::with_capacity(trimmed.len() + 4);
    for (i, ch) in trimmed.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                key.push('_');
            }
            key.push(ch.to_ascii_lowercase());
        } else {
            key.push(ch);
        }
    }
    key
}

/// Human-readable provider name: trailing-character trim of `Service`.
pub fn provider_name_for(type_name: &str) -> String {
    type_name.trim_end_matches(|c| SUFFIX.contains(c)).to_string()
}
