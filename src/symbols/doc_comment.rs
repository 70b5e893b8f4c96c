//! Doc comments (`<* ... *>`) and their contracts.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A contract line such as `@param x "the value"` or `@require x > 0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocCommentContract {
    /// Contract name including the leading `@`.
    pub name: SmolStr,
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
    body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    contracts: Vec<DocCommentContract>,
}

impl DocComment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            contracts: Vec::new(),
        }
    }

    pub fn with_contract(mut self, name: impl Into<SmolStr>, body: impl Into<String>) -> Self {
        self.contracts.push(DocCommentContract {
            name: name.into(),
            body: body.into(),
        });
        self
    }

    /// Parse the raw text of a `<* ... *>` comment.
    ///
    /// Everything before the first line starting with `@` is the body;
    /// each `@` line opens a contract and following lines continue it.
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .trim()
            .trim_start_matches("<*")
            .trim_end_matches("*>");

        let mut body_lines: Vec<&str> = Vec::new();
        let mut doc = DocComment::default();

        for line in inner.lines() {
            let line = line.trim();
            let line = line.strip_prefix('*').map(str::trim_start).unwrap_or(line);

            if line.starts_with('@') {
                let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                doc.contracts.push(DocCommentContract {
                    name: SmolStr::new(name),
                    body: rest.trim().to_string(),
                });
            } else if let Some(contract) = doc.contracts.last_mut() {
                if !line.is_empty() {
                    if !contract.body.is_empty() {
                        contract.body.push(' ');
                    }
                    contract.body.push_str(line);
                }
            } else {
                body_lines.push(line);
            }
        }

        while body_lines.first().is_some_and(|l| l.is_empty()) {
            body_lines.remove(0);
        }
        while body_lines.last().is_some_and(|l| l.is_empty()) {
            body_lines.pop();
        }
        doc.body = body_lines.join("\n");
        doc
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn contracts(&self) -> &[DocCommentContract] {
        &self.contracts
    }

    pub fn has_contracts(&self) -> bool {
        !self.contracts.is_empty()
    }

    /// Markdown with the body followed by one `**@name** body` paragraph per
    /// contract.
    pub fn display_body_with_contracts(&self) -> String {
        let mut out = self.body.clone();
        for contract in &self.contracts {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str("**");
            out.push_str(&contract.name);
            out.push_str("**");
            if !contract.body.is_empty() {
                out.push(' ');
                out.push_str(&contract.body);
            }
        }
        out
    }
}
