//! `{placeholder}` templates rendered through `minijinja`.
//!
//! News templates use single braces for variables (`{location}`), so the
//! environment is built with `{` / `}` as variable delimiters and strict
//! undefined handling. Rendering is a pure function of the template and the
//! bindings: random word picks happen in the caller before rendering. A
//! placeholder with no binding is an error, never passed through, so a raw
//! `{token}` can not reach a player.

use std::collections::{BTreeMap, BTreeSet};

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Template, UndefinedBehavior};

/// Placeholder names the caller supplies at render time instead of a
/// word-list in the subtype.
pub const STRUCTURAL_BINDINGS: [&str; 6] =
    ["location", "property", "amount", "number", "percent", "year"];

/// Values keyed by placeholder name.
pub type Bindings = BTreeMap<String, String>;

/// Errors produced while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A placeholder had no value in the bindings.
    #[error("no binding for placeholder {{{name}}}")]
    MissingBinding {
        /// The unbound placeholder name.
        name: String,
    },

    /// The template text could not be parsed.
    #[error("malformed template: {reason}")]
    Syntax {
        /// Parser message.
        reason: String,
    },

    /// The template parsed but failed while rendering.
    #[error("render failed: {reason}")]
    Render {
        /// Renderer message.
        reason: String,
    },
}

/// Whether `name` is supplied by the caller rather than a word-list.
pub fn is_structural(name: &str) -> bool {
    STRUCTURAL_BINDINGS.contains(&name)
}

/// A `minijinja` environment that reads `{name}` as a variable.
fn environment<'source>() -> Result<Environment<'source>, TemplateError> {
    let syntax = SyntaxConfig::builder()
        .variable_delimiters("{", "}")
        .build()
        .map_err(|e| TemplateError::Syntax {
            reason: format!("delimiter setup failed: {e}"),
        })?;
    let mut env = Environment::new();
    env.set_syntax(syntax);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    Ok(env)
}

fn parse<'env, 'source>(
    env: &'env Environment<'source>,
    template: &'source str,
) -> Result<Template<'env, 'source>, TemplateError> {
    env.template_from_str(template)
        .map_err(|e| TemplateError::Syntax {
            reason: e.to_string(),
        })
}

/// Distinct placeholder names, sorted.
pub fn placeholders(template: &str) -> Result<BTreeSet<String>, TemplateError> {
    let env = environment()?;
    let parsed = parse(&env, template)?;
    Ok(parsed.undeclared_variables(false).into_iter().collect())
}

/// Replace every `{name}` in `template` with `bindings[name]`.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let env = environment()?;
    let parsed = parse(&env, template)?;

    let missing = parsed
        .undeclared_variables(false)
        .into_iter()
        .filter(|name| !bindings.contains_key(name))
        .min();
    if let Some(name) = missing {
        return Err(TemplateError::MissingBinding { name });
    }

    parsed.render(bindings).map_err(|e| TemplateError::Render {
        reason: e.to_string(),
    })
}
