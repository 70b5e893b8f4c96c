//! Lexer for C3 source text.
//!
//! Trivia (whitespace and comments) is kept as tokens so the syntax tree
//! stays lossless. Anything the lexer cannot recognise becomes an
//! `ERROR_TOKEN` rather than stopping the scan.

use logos::Logos;

use super::SyntaxKind;

/// A lexed token: its kind and source slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'t> {
    pub kind: SyntaxKind,
    pub text: &'t str,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", |lex| close_comment(lex, "*/"))]
    BlockComment,
    #[token("<*", |lex| close_comment(lex, "*>"))]
    DocComment,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"\$\$?[a-zA-Z_][a-zA-Z0-9_]*")]
    CtIdent,
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    AtIdent,
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_]*")]
    HashIdent,
    #[regex(r"0[xX][0-9a-fA-F_]+([iu][0-9]*)?")]
    #[regex(r"0[bB][01_]+([iu][0-9]*)?")]
    #[regex(r"0[oO][0-7_]+([iu][0-9]*)?")]
    #[regex(r"[0-9][0-9_]*([iu][0-9]*)?")]
    IntNumber,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?(f[0-9]*)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+(f[0-9]*)?")]
    FloatNumber,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"`[^`]*`")]
    String,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("fn")]
    Fn,
    #[token("macro")]
    Macro,
    #[token("struct")]
    Struct,
    #[token("union")]
    Union,
    #[token("bitstruct")]
    Bitstruct,
    #[token("enum")]
    Enum,
    #[token("fault")]
    Fault,
    #[token("faultdef")]
    Faultdef,
    #[token("def")]
    Def,
    #[token("alias")]
    Alias,
    #[token("distinct")]
    Distinct,
    #[token("typedef")]
    Typedef,
    #[token("interface")]
    Interface,
    #[token("const")]
    Const,
    #[token("inline")]
    Inline,
    #[token("extern")]
    Extern,
    #[token("static")]
    Static,
    #[token("tlocal")]
    Tlocal,
    #[token("var")]
    Var,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("foreach_r")]
    ForeachR,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("(<")]
    LGeneric,
    #[token(">)")]
    RGeneric,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[regex(r"==|!=|<=|>=|&&|\|\||\+\+|--|<<=?|>>=?|->|=>|\?\?|!!|\?:|\+\+\+|[+\-*/%&|^]=|[+\-/%|^~@#$]")]
    Operator,
}

/// Extend a comment token through `terminator`, or to the end of input
/// when the comment is unterminated.
fn close_comment(lex: &mut logos::Lexer<'_, RawToken>, terminator: &str) -> bool {
    let rest = lex.remainder();
    let len = match rest.find(terminator) {
        Some(end) => end + terminator.len(),
        None => rest.len(),
    };
    lex.bump(len);
    true
}

impl RawToken {
    fn kind(self) -> SyntaxKind {
        use SyntaxKind::*;
        match self {
            RawToken::Whitespace => WHITESPACE,
            RawToken::LineComment => LINE_COMMENT,
            RawToken::BlockComment => BLOCK_COMMENT,
            RawToken::DocComment => DOC_COMMENT,
            RawToken::Ident => IDENT,
            RawToken::CtIdent => CT_IDENT,
            RawToken::AtIdent => AT_IDENT,
            RawToken::HashIdent => HASH_IDENT,
            RawToken::IntNumber => INT_NUMBER,
            RawToken::FloatNumber => FLOAT_NUMBER,
            RawToken::String => STRING,
            RawToken::Char => CHAR,
            RawToken::Module => MODULE_KW,
            RawToken::Import => IMPORT_KW,
            RawToken::Fn => FN_KW,
            RawToken::Macro => MACRO_KW,
            RawToken::Struct => STRUCT_KW,
            RawToken::Union => UNION_KW,
            RawToken::Bitstruct => BITSTRUCT_KW,
            RawToken::Enum => ENUM_KW,
            RawToken::Fault => FAULT_KW,
            RawToken::Faultdef => FAULTDEF_KW,
            RawToken::Def => DEF_KW,
            RawToken::Alias => ALIAS_KW,
            RawToken::Distinct => DISTINCT_KW,
            RawToken::Typedef => TYPEDEF_KW,
            RawToken::Interface => INTERFACE_KW,
            RawToken::Const => CONST_KW,
            RawToken::Inline => INLINE_KW,
            RawToken::Extern => EXTERN_KW,
            RawToken::Static => STATIC_KW,
            RawToken::Tlocal => TLOCAL_KW,
            RawToken::Var => VAR_KW,
            RawToken::Return => RETURN_KW,
            RawToken::If => IF_KW,
            RawToken::Else => ELSE_KW,
            RawToken::For => FOR_KW,
            RawToken::Foreach => FOREACH_KW,
            RawToken::ForeachR => FOREACH_R_KW,
            RawToken::While => WHILE_KW,
            RawToken::Do => DO_KW,
            RawToken::Switch => SWITCH_KW,
            RawToken::Case => CASE_KW,
            RawToken::Default => DEFAULT_KW,
            RawToken::Defer => DEFER_KW,
            RawToken::True => TRUE_KW,
            RawToken::False => FALSE_KW,
            RawToken::Null => NULL_KW,
            RawToken::LBrace => L_BRACE,
            RawToken::RBrace => R_BRACE,
            RawToken::LParen => L_PAREN,
            RawToken::RParen => R_PAREN,
            RawToken::LBrack => L_BRACK,
            RawToken::RBrack => R_BRACK,
            RawToken::LGeneric => L_GENERIC,
            RawToken::RGeneric => R_GENERIC,
            RawToken::Semicolon => SEMICOLON,
            RawToken::Comma => COMMA,
            RawToken::Dot => DOT,
            RawToken::DotDot => DOT_DOT,
            RawToken::Ellipsis => ELLIPSIS,
            RawToken::ColonColon => COLON_COLON,
            RawToken::Colon => COLON,
            RawToken::Eq => EQ,
            RawToken::Star => STAR,
            RawToken::Amp => AMP,
            RawToken::Question => QUESTION,
            RawToken::Bang => BANG,
            RawToken::Lt => LT,
            RawToken::Gt => GT,
            RawToken::Operator => OPERATOR,
        }
    }
}

/// Split `text` into tokens. The concatenated token texts equal `text`.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut lexer = RawToken::lexer(text);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(raw) => raw.kind(),
            Err(()) => SyntaxKind::ERROR_TOKEN,
        };
        tokens.push(Token {
            kind,
            text: lexer.slice(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyntaxKind::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_is_lossless() {
        let text = "module app;\n<* doc *>\nfn void main() { int x = 0x1F; /* c */ }\n";
        let joined: String = tokenize(text).iter().map(|t| t.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_keywords_win_over_identifiers() {
        assert_eq!(kinds("fn struct structure"), vec![FN_KW, STRUCT_KW, IDENT]);
    }

    #[test]
    fn test_generic_brackets() {
        assert_eq!(
            kinds("List(<int>) l;"),
            vec![IDENT, L_GENERIC, IDENT, R_GENERIC, IDENT, SEMICOLON]
        );
    }

    #[test]
    fn test_doc_comment_token() {
        let tokens = tokenize("<*\n @param x \"value\"\n*>fn");
        assert_eq!(tokens[0].kind, DOC_COMMENT);
        assert_eq!(tokens[1].kind, FN_KW);
    }

    #[test]
    fn test_comments_are_single_tokens() {
        assert_eq!(kinds("<* hello *>fn"), vec![FN_KW]);
        assert_eq!(tokenize("<* hello *>fn")[0].kind, DOC_COMMENT);
        assert_eq!(tokenize("/* block */fn")[0].kind, BLOCK_COMMENT);
        assert_eq!(tokenize("/* a * b */fn")[0].text, "/* a * b */");
        assert_eq!(kinds("a / b"), vec![IDENT, OPERATOR, IDENT]);
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let tokens = tokenize("fn /* open");
        assert_eq!(tokens.last().map(|t| (t.kind, t.text)), Some((BLOCK_COMMENT, "/* open")));
    }

    #[test]
    fn test_numbers_and_ranges() {
        assert_eq!(kinds("1..3"), vec![INT_NUMBER, DOT_DOT, INT_NUMBER]);
        assert_eq!(kinds("1.5 10u8"), vec![FLOAT_NUMBER, INT_NUMBER]);
    }

    #[test]
    fn test_compile_time_and_attribute_identifiers() {
        assert_eq!(kinds("$Type @inline #expr"), vec![CT_IDENT, AT_IDENT, HASH_IDENT]);
    }

    #[test]
    fn test_unknown_character_is_error_token() {
        assert_eq!(kinds("int \u{1}"), vec![IDENT, ERROR_TOKEN]);
    }
}
