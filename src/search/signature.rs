//! Signature help inside call parentheses.

use crate::base::Position;
use crate::project::Document;
use crate::symbols::{Function, FunctionKind, Typeable};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterInfo {
    pub label: String,
    pub documentation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureInfo {
    pub label: String,
    pub documentation: Option<String>,
    pub parameters: Vec<ParameterInfo>,
    pub active_parameter: Option<u32>,
}

/// An open call around the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// Position just before the `(`, where the callee name ends.
    pub callee: Position,
    /// Commas between the `(` and the cursor at the call's own depth.
    pub argument_index: u32,
    /// Whether the callee is reached through `.`, as in `p.reset(`.
    pub through_access: bool,
}

/// Rewind from `position` to the innermost unclosed `(`.
///
/// Statement and block boundaries end the search; string and character
/// literals are not special-cased.
pub fn call_site(document: &Document, position: Position) -> Option<CallSite> {
    let text = document.text().as_bytes();
    let mut i = document.offset(position).min(text.len());
    let mut depth = 0usize;
    let mut commas = 0u32;

    let open = loop {
        if i == 0 {
            return None;
        }
        i -= 1;
        match text[i] {
            b')' | b']' => depth += 1,
            b'[' => depth = depth.saturating_sub(1),
            b'(' if depth == 0 => break i,
            b'(' => depth -= 1,
            b',' if depth == 0 => commas += 1,
            b';' | b'{' | b'}' => return None,
            _ => {}
        }
    };

    let mut end = open;
    while end > 0 && text[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    if end == 0 || !(text[end - 1].is_ascii_alphanumeric() || text[end - 1] == b'_') {
        return None;
    }
    let mut start = end;
    while start > 0 && (text[start - 1].is_ascii_alphanumeric() || matches!(text[start - 1], b'_' | b'$')) {
        start -= 1;
    }

    Some(CallSite {
        callee: document.position(end),
        argument_index: commas,
        through_access: start > 0 && text[start - 1] == b'.',
    })
}

/// The signature of `function` with the argument at `site` active.
///
/// A method called through `.` receives `self` implicitly, so the active
/// parameter is shifted past it.
pub fn signature_of(function: &Function, site: &CallSite) -> SignatureInfo {
    let doc = function.base().doc_comment();
    let parameters: Vec<ParameterInfo> = function
        .arguments()
        .map(|arg| ParameterInfo {
            label: format!("{} {}", arg.get_type(), arg.name()),
            documentation: doc.and_then(|d| {
                d.contracts()
                    .iter()
                    .filter(|c| c.name == "@param")
                    .find_map(|c| {
                        let rest = c.body.strip_prefix(arg.name())?;
                        (rest.is_empty() || rest.starts_with(char::is_whitespace))
                            .then(|| rest.trim().trim_matches('"').to_string())
                    })
            }),
        })
        .collect();

    let skip_self = site.through_access
        && function.kind() != FunctionKind::Free
        && function.argument_ids().next() == Some("self");
    let mut active = site.argument_index + u32::from(skip_self);
    let vararg_last = function
        .arguments()
        .last()
        .and_then(|a| a.arg_info())
        .is_some_and(|info| info.vararg);
    if vararg_last && !parameters.is_empty() {
        active = active.min(parameters.len() as u32 - 1);
    }

    SignatureInfo {
        label: function.hover_info(),
        documentation: doc
            .map(|d| d.display_body_with_contracts())
            .filter(|d| !d.is_empty()),
        parameters,
        active_parameter: Some(active),
    }
}
