//! Path and URL building.

use std::collections::BTreeMap;

use commons_core::error::AppError;
use commons_core::result::AppResult;

/// Append a single component to a path with exactly one `/` between them.
///
/// An empty base becomes `/`.
pub fn append_component_to_path(base_path: &str, component: &str) -> String {
    let mut result = String::with_capacity(base_path.len() + component.len() + 1);
    result.push_str(base_path);

    if result.is_empty() {
        result.push('/');
    } else if !result.ends_with('/') {
        result.push('/');
    }

    result.push_str(component.strip_prefix('/').unwrap_or(component));
    result
}

/// Append every component in order.
pub fn append_components_to_path<S: AsRef<str>>(base_path: &str, components: &[S]) -> String {
    components
        .iter()
        .fold(base_path.to_string(), |acc, component| {
            append_component_to_path(&acc, component.as_ref())
        })
}

/// Append `?key=value&...` for every parameter with a non-empty value.
///
/// Parameters are emitted in key order.
pub fn append_query_parameters(url: &str, parameters: &BTreeMap<String, String>) -> String {
    let query: Vec<String> = parameters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect();

    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{}", query.join("&"))
    }
}

/// Build a URL from components and named parameters.
///
/// One leading and one trailing `/` is stripped from each component and
/// empty components are skipped. A component of the form `{name}` is
/// replaced by the value of `name`, which is then not repeated in the
/// query string. Every other parameter is appended as a query string.
pub fn url_from_components<S: AsRef<str>>(
    components: &[S],
    parameters: &BTreeMap<String, String>,
) -> AppResult<String> {
    let mut remaining = parameters.clone();
    let mut parts = Vec::with_capacity(components.len());

    for component in components {
        let component = component.as_ref();
        let component = component.strip_prefix('/').unwrap_or(component);
        let component = component.strip_suffix('/').unwrap_or(component);

        if component.is_empty() {
            continue;
        }

        match placeholder(component) {
            Some(name) => match remaining.remove(name) {
                Some(value) if !value.is_empty() => parts.push(value),
                _ => {
                    return Err(AppError::validation(format!("Parameter not found {name}")));
                }
            },
            None => parts.push(component.to_string()),
        }
    }

    Ok(append_query_parameters(&parts.join("/"), &remaining))
}

fn placeholder(component: &str) -> Option<&str> {
    component
        .strip_prefix('{')
        .and_then(|c| c.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}
