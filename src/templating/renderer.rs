//! Template rendering engine with Tera.
//!
//! Fragments are rendered one at a time with a fresh [`Tera`] instance and
//! `render_str`, so no template state leaks from one fragment to the next.
//! Output is YAML, so nothing is HTML-escaped.

use regex::Regex;
use std::error::Error as _;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

use crate::core::similar_names;

/// A fragment failed to render.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    /// Cleaned-up message from the Tera error chain
    pub message: String,
    /// Line of the fragment the error points at, when Tera reports one
    pub line: Option<usize>,
}

/// Renders fragment text against a context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render `template_content` with `context`.
    ///
    /// Undefined variables are errors; the message lists the closest names
    /// the context does define.
    pub fn render(&self, template_content: &str, context: &TeraContext) -> Result<String, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.render_str(template_content, context).map_err(|error| {
            let mut message = Self::format_tera_error(&error);
            if let Some(variable) = Self::extract_variable_name(&message) {
                let available = Self::context_keys(context);
                let suggestions =
                    similar_names(&variable, available.iter().map(String::as_str));
                if !suggestions.is_empty() {
                    message.push_str(&format!(" (did you mean: {}?)", suggestions.join(", ")));
                }
            }
            RenderError {
                message,
                line: Self::extract_line_from_tera_error(&error),
            }
        })
    }

    /// Flatten the Tera error chain into one line, without the internal
    /// one-off template name.
    pub fn format_tera_error(error: &tera::Error) -> String {
        let mut all_messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(cause) = current {
            all_messages.push(cause.to_string());
            current = cause.source();
        }

        let messages: Vec<String> = all_messages
            .into_iter()
            .map(|msg| {
                msg.replace("while rendering '__tera_one_off'", "")
                    .replace("Failed to render '__tera_one_off'", "")
                    .replace("Failed to parse '__tera_one_off'", "")
                    .replace("'__tera_one_off'", "template")
                    .trim()
                    .to_string()
            })
            .filter(|msg| !msg.is_empty())
            .collect();

        if messages.is_empty() {
            "Template syntax error".to_string()
        } else {
            messages.join(": ")
        }
    }

    /// Extract the variable name from "Variable `foo` not found".
    fn extract_variable_name(error_msg: &str) -> Option<String> {
        let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
        re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
    }

    /// Extract the line number of a "line:column" position in the error.
    fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
        let error_msg = format!("{error:?}");
        let re = Regex::new(r"(\d+):(\d+)").ok()?;
        re.captures(&error_msg)
            .and_then(|caps| caps.get(1))
            .and_then(|line| line.as_str().parse::<usize>().ok())
    }

    fn context_keys(context: &TeraContext) -> Vec<String> {
        match context.clone().into_json() {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
