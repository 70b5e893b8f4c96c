//! Token and node kinds of the C3 syntax tree.

/// Every token and node kind, as stored in the rowan tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum SyntaxKind {
    // Trivia
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,
    DOC_COMMENT,

    // Identifiers and literals
    IDENT,
    CT_IDENT,
    AT_IDENT,
    HASH_IDENT,
    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,
    CHAR,

    // Keywords
    MODULE_KW,
    IMPORT_KW,
    FN_KW,
    MACRO_KW,
    STRUCT_KW,
    UNION_KW,
    BITSTRUCT_KW,
    ENUM_KW,
    FAULT_KW,
    FAULTDEF_KW,
    DEF_KW,
    ALIAS_KW,
    DISTINCT_KW,
    TYPEDEF_KW,
    INTERFACE_KW,
    CONST_KW,
    INLINE_KW,
    EXTERN_KW,
    STATIC_KW,
    TLOCAL_KW,
    VAR_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    FOR_KW,
    FOREACH_KW,
    FOREACH_R_KW,
    WHILE_KW,
    DO_KW,
    SWITCH_KW,
    CASE_KW,
    DEFAULT_KW,
    DEFER_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    // Punctuation
    L_BRACE,
    R_BRACE,
    L_PAREN,
    R_PAREN,
    L_BRACK,
    R_BRACK,
    L_GENERIC,
    R_GENERIC,
    SEMICOLON,
    COMMA,
    DOT,
    DOT_DOT,
    ELLIPSIS,
    COLON_COLON,
    COLON,
    EQ,
    STAR,
    AMP,
    QUESTION,
    BANG,
    LT,
    GT,
    OPERATOR,

    ERROR_TOKEN,
    /// End of input. Only seen by the parser's lookahead, never stored.
    EOF,

    // Nodes
    SOURCE_FILE,
    MODULE_DECL,
    MODULE_PATH,
    GENERIC_PARAMS,
    ATTRIBUTE,
    IMPORT_DECL,
    FN_DEF,
    MACRO_DEF,
    METHOD_TYPE,
    NAME,
    PARAM_LIST,
    PARAM,
    DEFAULT_VALUE,
    BLOCK,
    LOCAL_VAR_DECL,
    INITIALIZER,
    STRUCT_DEF,
    STRUCT_BODY,
    MEMBER_DECL,
    BIT_RANGE,
    INTERFACE_IMPL,
    BITSTRUCT_DEF,
    ENUM_DEF,
    ENUM_PARAMS,
    ENUM_BODY,
    ENUMERATOR,
    ENUM_VALUE,
    FAULT_DEF,
    FAULT_BODY,
    FAULTDEF_DECL,
    DEF_DECL,
    ALIAS_TARGET,
    DISTINCT_DECL,
    INTERFACE_DEF,
    INTERFACE_BODY,
    CONST_DECL,
    GLOBAL_VAR_DECL,
    TYPE,
    GENERIC_ARGS,
    ARRAY_SUFFIX,
    FN_TYPE,
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE
                | SyntaxKind::LINE_COMMENT
                | SyntaxKind::BLOCK_COMMENT
                | SyntaxKind::DOC_COMMENT
        )
    }

    /// Tokens that can start a top-level declaration; used for recovery.
    pub fn starts_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::MODULE_KW
                | SyntaxKind::IMPORT_KW
                | SyntaxKind::FN_KW
                | SyntaxKind::MACRO_KW
                | SyntaxKind::STRUCT_KW
                | SyntaxKind::UNION_KW
                | SyntaxKind::BITSTRUCT_KW
                | SyntaxKind::ENUM_KW
                | SyntaxKind::FAULTDEF_KW
                | SyntaxKind::DEF_KW
                | SyntaxKind::ALIAS_KW
                | SyntaxKind::DISTINCT_KW
                | SyntaxKind::TYPEDEF_KW
                | SyntaxKind::INTERFACE_KW
        )
    }

    pub(crate) fn from_raw(raw: u16) -> Self {
        assert!(raw < SyntaxKind::__LAST as u16);
        // SAFETY: `SyntaxKind` is `repr(u16)`, its discriminants are
        // contiguous from zero and `raw` was checked against the last one.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}
