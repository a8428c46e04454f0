use crate::model::DocDependency;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const FENCE: &str = "---";

/// Header block of a generated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFrontmatter {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub generated: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DocDependency>,
}

/// Splits `content` into the YAML between the leading `---` lines and the
/// body after them. `Ok(None)` when the content does not open with a fence;
/// an opening fence without a closing one is an error.
pub fn split_frontmatter(content: &str) -> Result<Option<(&str, &str)>> {
    let Some(rest) = content.strip_prefix(FENCE) else {
        return Ok(None);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return Ok(None);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }
    bail!("unterminated frontmatter block")
}

pub fn parse_frontmatter(content: &str) -> Result<Option<DocFrontmatter>> {
    let Some((yaml, _body)) = split_frontmatter(content)? else {
        return Ok(None);
    };
    if yaml.trim().is_empty() {
        return Ok(Some(DocFrontmatter::default()));
    }
    let header = serde_yaml_ng::from_str(yaml).context("parse frontmatter")?;
    Ok(Some(header))
}

pub fn render_document(header: &DocFrontmatter, body: &str) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(header).context("serialize frontmatter")?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}
