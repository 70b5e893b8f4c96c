//! Conversions between project types and `lsp_types`.

use tower_lsp::lsp_types::{
    self as lsp, CompletionItemKind, DiagnosticSeverity, Documentation, MarkupContent, MarkupKind, Url,
};

use crate::base::{ContentChange, DocId, Position, Range};
use crate::project::{CompilerDiagnostic, Severity};
use crate::search::{CompletionItem, HoverResult, SignatureInfo};
use crate::symbols::{SymbolKind, SymbolRef};

pub fn position(p: lsp::Position) -> Position {
    Position::new(p.line, p.character)
}

pub fn lsp_position(p: Position) -> lsp::Position {
    lsp::Position::new(p.line, p.character)
}

pub fn range(r: lsp::Range) -> Range {
    Range::from_positions(position(r.start), position(r.end))
}

pub fn lsp_range(r: Range) -> lsp::Range {
    lsp::Range::new(lsp_position(r.start), lsp_position(r.end))
}

pub fn doc_id(uri: &Url) -> DocId {
    DocId::new(uri.as_str())
}

/// The URI of a document. Synthetic documents have none.
pub fn url(doc_id: &DocId) -> Option<Url> {
    Url::parse(doc_id.as_str()).ok()
}

pub fn content_change(change: lsp::TextDocumentContentChangeEvent) -> ContentChange {
    match change.range {
        Some(r) => ContentChange::replace(range(r), change.text),
        None => ContentChange::replace_all(change.text),
    }
}

/// Where `symbol`'s name is declared.
pub fn location(symbol: &SymbolRef<'_>) -> Option<lsp::Location> {
    Some(lsp::Location::new(url(symbol.doc_id())?, lsp_range(symbol.id_range())))
}

fn markdown(value: String) -> MarkupContent {
    MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    }
}

pub fn hover(result: HoverResult) -> lsp::Hover {
    lsp::Hover {
        contents: lsp::HoverContents::Markup(markdown(result.contents)),
        range: Some(lsp_range(result.range)),
    }
}

pub fn completion_kind(kind: SymbolKind) -> CompletionItemKind {
    match kind {
        SymbolKind::Module => CompletionItemKind::MODULE,
        SymbolKind::Variable => CompletionItemKind::VARIABLE,
        SymbolKind::Function => CompletionItemKind::FUNCTION,
        SymbolKind::Struct | SymbolKind::Union | SymbolKind::Bitstruct => CompletionItemKind::STRUCT,
        SymbolKind::Enum => CompletionItemKind::ENUM,
        SymbolKind::Enumerator => CompletionItemKind::ENUM_MEMBER,
        SymbolKind::Fault => CompletionItemKind::ENUM,
        SymbolKind::FaultConstant => CompletionItemKind::CONSTANT,
        SymbolKind::Def | SymbolKind::Distinct => CompletionItemKind::TYPE_PARAMETER,
        SymbolKind::Interface => CompletionItemKind::INTERFACE,
        SymbolKind::StructMember => CompletionItemKind::FIELD,
    }
}

pub fn completion_item(item: CompletionItem) -> lsp::CompletionItem {
    lsp::CompletionItem {
        label: item.label,
        kind: Some(completion_kind(item.kind)),
        detail: Some(item.detail),
        documentation: item.documentation.map(|d| Documentation::MarkupContent(markdown(d))),
        ..Default::default()
    }
}

pub fn signature_help(info: SignatureInfo) -> lsp::SignatureHelp {
    let parameters = info
        .parameters
        .into_iter()
        .map(|p| lsp::ParameterInformation {
            label: lsp::ParameterLabel::Simple(p.label),
            documentation: p.documentation.map(Documentation::String),
        })
        .collect();
    lsp::SignatureHelp {
        signatures: vec![lsp::SignatureInformation {
            label: info.label,
            documentation: info.documentation.map(|d| Documentation::MarkupContent(markdown(d))),
            parameters: Some(parameters),
            active_parameter: info.active_parameter,
        }],
        active_signature: Some(0),
        active_parameter: info.active_parameter,
    }
}

pub fn diagnostic(diagnostic: &CompilerDiagnostic, line_text: Option<&str>) -> lsp::Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Note => DiagnosticSeverity::INFORMATION,
    };
    lsp::Diagnostic {
        range: lsp_range(diagnostic.range(line_text)),
        severity: Some(severity),
        source: Some("c3c".to_string()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_synthetic_documents_have_no_url() {
        assert!(url(&DocId::from("_stdlib_0.7.1")).is_none());
        assert!(url(&DocId::from("file:///ws/main.c3")).is_some());
    }

    #[test]
    fn test_full_and_incremental_changes() {
        let full = content_change(lsp::TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "module app;".into(),
        });
        assert_eq!(full, ContentChange::replace_all("module app;"));

        let edit = content_change(lsp::TextDocumentContentChangeEvent {
            range: Some(lsp::Range::new(lsp::Position::new(0, 7), lsp::Position::new(0, 10))),
            range_length: None,
            text: "main".into(),
        });
        assert_eq!(edit, ContentChange::replace(Range::new(0, 7, 0, 10), "main"));
    }

    #[test]
    fn test_whole_line_diagnostic() {
        let compiler = CompilerDiagnostic {
            file: PathBuf::from("/ws/main.c3"),
            line: 2,
            column: None,
            severity: Severity::Warning,
            message: "unused".into(),
        };
        let converted = diagnostic(&compiler, Some("int x = 1;"));
        assert_eq!(converted.range, lsp::Range::new(lsp::Position::new(2, 0), lsp::Position::new(2, 10)));
        assert_eq!(converted.severity, Some(DiagnosticSeverity::WARNING));
    }
}
