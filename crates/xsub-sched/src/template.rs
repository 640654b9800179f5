//! Submission script templates.
//!
//! Templates are plain text with `{{ name }}` placeholders. Rendering is pure
//! substitution: a placeholder without a value is an error, never an empty
//! string.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SchedError, SchedResult};
use crate::path;
use crate::schema::ParameterMap;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern")
});

/// Values available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Build the context for one submission.
    ///
    /// Besides the resolved parameters this provides `job_file`,
    /// `job_file_name`, `work_dir`, `work_dir_name` and `work_dir_parent`,
    /// which take precedence over parameters of the same name.
    pub fn for_job(params: &ParameterMap, work_dir: &Path, job_file: &Path) -> SchedResult<Self> {
        let work_dir = path::expand(work_dir)?;
        let job_file = path::expand(job_file)?;
        let work_dir_parent = work_dir.parent().unwrap_or(&work_dir).to_path_buf();

        let mut values = params.clone();
        values.insert("job_file".into(), job_file.display().to_string());
        values.insert("job_file_name".into(), path::basename(&job_file));
        values.insert("work_dir".into(), work_dir.display().to_string());
        values.insert("work_dir_name".into(), path::basename(&work_dir));
        values.insert(
            "work_dir_parent".into(),
            work_dir_parent.display().to_string(),
        );

        Ok(Self { values })
    }

    /// Add or replace a single value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Render `template` against `context`.
pub fn render(template: &str, context: &TemplateContext) -> SchedResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let literal = &template[last..whole.start()];
        check_literal(literal)?;
        out.push_str(literal);

        let name = &caps[1];
        let value = context
            .get(name)
            .ok_or_else(|| SchedError::Render(format!("no value for placeholder '{name}'")))?;
        out.push_str(value);
        last = whole.end();
    }

    let tail = &template[last..];
    check_literal(tail)?;
    out.push_str(tail);
    Ok(out)
}

/// Names referenced by `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn check_literal(text: &str) -> SchedResult<()> {
    match text.find("{{") {
        Some(pos) => {
            let snippet: String = text[pos..].chars().take(24).collect();
            Err(SchedError::Render(format!(
                "malformed placeholder near '{snippet}'"
            )))
        }
        None => Ok(()),
    }
}
