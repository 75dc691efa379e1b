//! `$name` / `${name}` placeholder substitution for bundled config templates

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template references unknown key '{0}'")]
    MissingKey(String),

    #[error("invalid placeholder at byte {0}")]
    InvalidPlaceholder(usize),
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Substitute every placeholder in `template` with its value from `values`.
///
/// `$$` renders a literal `$`. Unknown keys and malformed placeholders are
/// errors; nothing is left unsubstituted.
pub fn render(template: &str, values: &HashMap<&str, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let key = match chars.peek().copied() {
            Some((_, '$')) => {
                chars.next();
                out.push('$');
                continue;
            }
            Some((_, '{')) => {
                chars.next();
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) if is_ident_char(c) => key.push(c),
                        _ => return Err(TemplateError::InvalidPlaceholder(pos)),
                    }
                }
                if !key.starts_with(is_ident_start) {
                    return Err(TemplateError::InvalidPlaceholder(pos));
                }
                key
            }
            Some((_, c)) if is_ident_start(c) => {
                let mut key = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    key.push(c);
                    chars.next();
                }
                key
            }
            _ => return Err(TemplateError::InvalidPlaceholder(pos)),
        };

        let value = values
            .get(key.as_str())
            .ok_or_else(|| TemplateError::MissingKey(key.clone()))?;
        out.push_str(value);
    }

    Ok(out)
}
