//! Hover text.

use crate::base::Range;
use crate::symbols::SymbolRef;

/// Hover content for a symbol, with the range it applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// Markdown.
    pub contents: String,
    pub range: Range,
}

/// Markdown describing `symbol`: its signature in a `c3` block, the module
/// it lives in and its doc comment.
pub fn hover_markdown(symbol: &SymbolRef<'_>) -> String {
    let mut out = format!("```c3\n{}\n```", symbol.hover_info());
    if !matches!(symbol, SymbolRef::Module(_)) {
        out.push_str(&format!("\n\nIn module **[{}]**", symbol.module()));
    }
    if let Some(doc) = symbol.doc_comment() {
        let body = doc.display_body_with_contracts();
        if !body.is_empty() {
            out.push_str("\n\n");
            out.push_str(&body);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::DocId;
    use crate::parser::parse_symbols;

    #[test]
    fn test_function_hover_with_contracts() {
        let (unit, _) = parse_symbols(
            &DocId::from("file:///io.c3"),
            "module std::io;\n<*\n Print a line.\n @param s \"the text\"\n*>\nfn void printn(String s) {}",
        );
        let printn = unit.get("std::io").unwrap().function("printn").unwrap();

        assert_eq!(
            hover_markdown(&SymbolRef::Function(printn)),
            "```c3\nvoid printn(String s)\n```\n\nIn module **[std::io]**\n\nPrint a line.\n\n**@param** s \"the text\""
        );
    }

    #[test]
    fn test_module_hover_has_no_footer() {
        let (unit, _) = parse_symbols(&DocId::from("file:///a.c3"), "module app;");
        let app = unit.get("app").unwrap();
        assert_eq!(hover_markdown(&SymbolRef::Module(app)), "```c3\napp\n```");
    }
}
