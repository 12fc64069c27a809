//! Rendering `{name}` placeholders in script templates.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Captures;
use regex::Regex;

/// The variables available to a template.
pub type Vars = HashMap<String, String>;

lazy_static! {
    /// A `{name}` placeholder, optionally preceded by the `$` of a shell
    /// expansion.
    static ref PLACEHOLDER: Regex = Regex::new(r"(\$?)\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// An error rendering a template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Placeholders were left without a value.
    #[error("unrealized variables: {}", .0.join(", "))]
    Unrealized(Vec<String>),
}

/// Substitutes every `{name}` placeholder of `template` with its value from
/// `vars`. Shell expansions such as `${name}` are left untouched. Any
/// placeholder without a value is an error naming each missing variable once.
///
/// ```
/// use recipes::pbs::template::{render, Vars};
///
/// let mut vars = Vars::new();
/// vars.insert("ppn".into(), "8".into());
///
/// let script = render("humann2 --threads {ppn} > ${HOME}/out", &vars).unwrap();
/// assert_eq!(script, "humann2 --threads 8 > ${HOME}/out");
/// ```
pub fn render(template: &str, vars: &Vars) -> Result<String, TemplateError> {
    let mut missing: Vec<String> = Vec::new();

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let whole = &caps[0];
        if !caps[1].is_empty() {
            return whole.to_string();
        }

        match vars.get(&caps[2]) {
            Some(value) => value.clone(),
            None => {
                if !missing.iter().any(|m| m == &caps[2]) {
                    missing.push(caps[2].to_string());
                }
                whole.to_string()
            }
        }
    });

    match missing.is_empty() {
        true => Ok(rendered.into_owned()),
        false => Err(TemplateError::Unrealized(missing)),
    }
}

/// Inserts a variable, converting its value to a string.
pub fn set<V>(vars: &mut Vars, name: &str, value: V)
where
    V: ToString,
{
    vars.insert(name.to_string(), value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrealized_variables() {
        let vars = Vars::new();
        let err = render("{a} {b} {a}", &vars).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unrealized(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_shell_array_untouched() {
        let vars = Vars::new();
        let line = "bash ${scripts[$PBS_ARRAYID]}";
        assert_eq!(render(line, &vars).unwrap(), line);
    }

    #[test]
    fn test_render_many_times() {
        let mut vars = Vars::new();
        for i in 0..100 {
            set(&mut vars, "i", i);
            assert_eq!(render("job {i}", &vars).unwrap(), format!("job {}", i));
        }
    }

    #[test]
    fn test_values_are_not_rendered_again() {
        let mut vars = Vars::new();
        set(&mut vars, "a", "{b}");
        assert_eq!(render("x{a}", &vars).unwrap(), "x{b}");
    }
}
