//! Error-tolerant recursive descent parser building a rowan green tree.
//!
//! Only the parts of the grammar that symbol construction reads get their
//! own nodes: declarations with their names and types, parameters, struct
//! members, enumerators, and local variable declarations inside bodies.
//! Statements and expressions stay flat token runs. No token is ever
//! dropped, so the tree text always equals the source text.
//!
//! Trivia is attached lazily: it is flushed into the current node right
//! before the next token or node starts. A doc comment therefore ends up
//! as the previous sibling of the declaration it documents.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::SyntaxKind::{self, *};
use super::keywords::{is_builtin_type, is_type_ident};
use super::lexer::{Token, tokenize};

/// A recoverable syntax error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {offset}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset of the token where the error was noticed.
    pub offset: usize,
}

pub(crate) fn parse_source(text: &str) -> (GreenNode, Vec<ParseError>) {
    let mut parser = Parser::new(text);
    parser.source_file();
    parser.finish()
}

#[inline]
fn is_opener(kind: SyntaxKind) -> bool {
    matches!(kind, L_PAREN | L_BRACK | L_BRACE | L_GENERIC)
}

#[inline]
fn is_closer(kind: SyntaxKind) -> bool {
    matches!(kind, R_PAREN | R_BRACK | R_BRACE | R_GENERIC)
}

#[inline]
fn is_var_name(kind: SyntaxKind) -> bool {
    matches!(kind, IDENT | CT_IDENT)
}

fn is_ct_directive(text: &str) -> bool {
    matches!(
        text,
        "$if"
            | "$elif"
            | "$else"
            | "$endif"
            | "$switch"
            | "$case"
            | "$default"
            | "$endswitch"
            | "$for"
            | "$endfor"
            | "$foreach"
            | "$endforeach"
            | "$assert"
            | "$include"
            | "$exec"
            | "$echo"
            | "$error"
    )
}

struct Parser<'t> {
    tokens: Vec<Token<'t>>,
    /// Indices into `tokens` of the non-trivia tokens.
    significant: Vec<usize>,
    /// Next token to push, trivia included.
    pos: usize,
    /// Number of non-trivia tokens pushed so far.
    cursor: usize,
    offset: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str) -> Self {
        let tokens = tokenize(text);
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            significant,
            pos: 0,
            cursor: 0,
            offset: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (GreenNode, Vec<ParseError>) {
        (self.builder.finish(), self.errors)
    }

    // ========================================================================
    // LOOKAHEAD
    // ========================================================================

    fn nth_token(&self, n: usize) -> Option<&Token<'t>> {
        self.significant
            .get(self.cursor + n)
            .map(|&index| &self.tokens[index])
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n).map_or(EOF, |t| t.kind)
    }

    fn nth_text(&self, n: usize) -> &'t str {
        self.nth_token(n).map_or("", |t| t.text)
    }

    #[inline]
    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    #[inline]
    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.at(EOF)
    }

    #[inline]
    fn progress(&self) -> usize {
        self.cursor
    }

    /// Index just past the bracket group opening at lookahead `n`.
    fn skip_group(&self, n: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = n;
        loop {
            let kind = self.nth(i);
            if kind == EOF {
                return None;
            }
            if is_opener(kind) {
                depth += 1;
            } else if is_closer(kind) {
                depth = depth.saturating_sub(1);
            }
            i += 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }

    /// How many tokens the type starting at lookahead `start` spans, if the
    /// tokens there look like a type at all.
    fn type_len(&self, start: usize) -> Option<usize> {
        let mut n = start;
        while self.nth(n) == IDENT && self.nth(n + 1) == COLON_COLON {
            n += 2;
        }
        let name = self.nth_token(n)?;
        let user_type = name.kind == IDENT && is_type_ident(name.text);
        match name.kind {
            IDENT if user_type || is_builtin_type(name.text) => n += 1,
            FAULT_KW => n += 1,
            CT_IDENT if is_type_ident(name.text.trim_start_matches('$')) => n += 1,
            _ => return None,
        }
        match self.nth(n) {
            L_GENERIC => n = self.skip_group(n)?,
            L_BRACE if user_type => n = self.skip_group(n)?,
            _ => {}
        }
        loop {
            match self.nth(n) {
                STAR | QUESTION | BANG => n += 1,
                L_BRACK => n = self.skip_group(n)?,
                _ => break,
            }
        }
        Some(n - start)
    }

    fn at_local_var_decl(&self) -> bool {
        let mut n = 0;
        while matches!(self.nth(n), CONST_KW | STATIC_KW | TLOCAL_KW) {
            n += 1;
        }
        if self.nth(n) == VAR_KW {
            return is_var_name(self.nth(n + 1));
        }
        if n > 0 && self.nth(n) == IDENT && self.nth(n + 1) == EQ {
            return true;
        }
        match self.type_len(n) {
            Some(len) => {
                is_var_name(self.nth(n + len))
                    && matches!(
                        self.nth(n + len + 1),
                        EQ | SEMICOLON | COMMA | AT_IDENT | COLON | R_PAREN
                    )
            }
            None => false,
        }
    }

    fn at_method_receiver(&self) -> bool {
        let mut n = 0;
        while self.nth(n) == IDENT && self.nth(n + 1) == COLON_COLON {
            n += 2;
        }
        self.nth(n) == IDENT && self.nth(n + 1) == DOT
    }

    // ========================================================================
    // TREE BUILDING
    // ========================================================================

    fn push_token(&mut self, token: Token<'t>) {
        self.builder.token(token.kind.into(), token.text);
        self.offset += token.text.len();
        self.pos += 1;
        if !token.kind.is_trivia() {
            self.cursor += 1;
        }
    }

    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos).copied() {
            if !token.kind.is_trivia() {
                break;
            }
            self.push_token(token);
        }
    }

    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos).copied() {
            self.push_token(token);
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {what}"));
        false
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        let trivia: usize = self.tokens[self.pos..]
            .iter()
            .take_while(|t| t.kind.is_trivia())
            .map(|t| t.text.len())
            .sum();
        self.errors.push(ParseError {
            message: message.into(),
            offset: self.offset + trivia,
        });
    }

    fn error_token(&mut self, message: &str) {
        self.error(message);
        self.start_node(ERROR);
        self.bump();
        self.finish_node();
    }

    /// Bump a whole bracket group starting at the current opener.
    fn bump_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            let kind = self.current();
            if kind == EOF {
                return;
            }
            if is_opener(kind) {
                depth += 1;
            } else if is_closer(kind) {
                depth = depth.saturating_sub(1);
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// Bump tokens until one of `stops` or an unmatched closer, keeping
    /// bracket groups whole.
    fn bump_until(&mut self, stops: &[SyntaxKind]) {
        loop {
            let kind = self.current();
            if kind == EOF || stops.contains(&kind) || is_closer(kind) {
                return;
            }
            if is_opener(kind) {
                self.bump_balanced();
            } else {
                self.bump();
            }
        }
    }

    // ========================================================================
    // TOP LEVEL
    // ========================================================================

    fn source_file(&mut self) {
        self.builder.start_node(SOURCE_FILE.into());
        while !self.at_eof() {
            self.top_level_item();
        }
        self.eat_trivia();
        self.builder.finish_node();
    }

    fn top_level_item(&mut self) {
        let cp = self.checkpoint();
        while matches!(self.current(), EXTERN_KW | STATIC_KW | TLOCAL_KW) {
            self.bump();
        }
        match self.current() {
            MODULE_KW => self.module_decl(cp),
            IMPORT_KW => self.import_decl(cp),
            FN_KW => self.fn_def(cp, FN_DEF),
            MACRO_KW => self.fn_def(cp, MACRO_DEF),
            STRUCT_KW | UNION_KW => self.struct_def(cp),
            BITSTRUCT_KW => self.bitstruct_def(cp),
            ENUM_KW => self.enum_def(cp),
            FAULT_KW if self.nth(1) == IDENT && is_type_ident(self.nth_text(1)) => self.fault_def(cp),
            FAULTDEF_KW => self.faultdef_decl(cp),
            DEF_KW | ALIAS_KW => self.def_decl(cp),
            DISTINCT_KW | TYPEDEF_KW => self.distinct_decl(cp),
            INTERFACE_KW => self.interface_def(cp),
            CONST_KW => self.const_decl(cp),
            CT_IDENT if is_ct_directive(self.nth_text(0)) => self.ct_directive(),
            _ if self.type_len(0).is_some_and(|len| is_var_name(self.nth(len))) => self.global_var_decl(cp),
            _ => self.recover_top_level(cp),
        }
    }

    fn recover_top_level(&mut self, cp: Checkpoint) {
        self.error("expected a declaration");
        self.start_node_at(cp, ERROR);
        let mut consumed = false;
        loop {
            let kind = self.current();
            if kind == EOF
                || (consumed && (kind.starts_declaration() || (kind == CT_IDENT && is_ct_directive(self.nth_text(0)))))
            {
                break;
            }
            consumed = true;
            match kind {
                SEMICOLON => {
                    self.bump();
                    break;
                }
                L_BRACE => {
                    self.bump_balanced();
                    break;
                }
                k if is_opener(k) => self.bump_balanced(),
                _ => self.bump(),
            }
        }
        self.finish_node();
    }

    /// `$if cond:`, `$endif`, `$assert x;` and friends. Declarations inside
    /// compile-time branches are parsed as if the branch were taken.
    fn ct_directive(&mut self) {
        let text = self.nth_text(0);
        self.bump();
        match text {
            "$if" | "$elif" | "$switch" | "$case" | "$for" | "$foreach" => {
                self.bump_until(&[COLON]);
                self.eat(COLON);
            }
            "$assert" | "$include" | "$exec" | "$echo" | "$error" => {
                self.bump_until(&[SEMICOLON]);
                self.eat(SEMICOLON);
            }
            _ => {
                self.eat(COLON);
            }
        }
    }

    fn attributes(&mut self) {
        while self.at(AT_IDENT) {
            self.start_node(ATTRIBUTE);
            self.bump();
            if self.at(L_PAREN) {
                self.bump_balanced();
            }
            self.finish_node();
        }
    }

    fn name(&mut self) -> bool {
        if matches!(self.current(), IDENT | CT_IDENT | AT_IDENT | HASH_IDENT) {
            self.start_node(NAME);
            self.bump();
            self.finish_node();
            true
        } else {
            self.error("expected a name");
            false
        }
    }

    fn module_path(&mut self) {
        self.start_node(MODULE_PATH);
        if self.at(IDENT) {
            self.bump();
            while self.at(COLON_COLON) && self.nth(1) == IDENT {
                self.bump();
                self.bump();
            }
        } else {
            self.error("expected a module path");
        }
        self.finish_node();
    }

    fn module_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, MODULE_DECL);
        self.bump();
        self.module_path();
        if matches!(self.current(), L_GENERIC | L_BRACE) {
            self.generic_params();
        }
        self.attributes();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    fn generic_params(&mut self) {
        self.start_node(GENERIC_PARAMS);
        let close = if self.at(L_GENERIC) { R_GENERIC } else { R_BRACE };
        self.bump();
        while !matches!(self.current(), EOF | SEMICOLON) && !self.at(close) {
            if is_var_name(self.current()) {
                self.name();
            } else {
                self.bump();
            }
        }
        self.expect(close, "end of generic parameters");
        self.finish_node();
    }

    fn import_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, IMPORT_DECL);
        self.bump();
        self.module_path();
        while self.eat(COMMA) {
            self.module_path();
        }
        self.attributes();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    // ========================================================================
    // FUNCTIONS
    // ========================================================================

    fn fn_def(&mut self, cp: Checkpoint, kind: SyntaxKind) {
        self.start_node_at(cp, kind);
        self.bump();
        self.fn_signature(kind == MACRO_DEF);
        self.attributes();
        match self.current() {
            L_BRACE => self.block(),
            OPERATOR if self.nth_text(0) == "=>" => {
                self.start_node(BLOCK);
                self.bump();
                self.bump_until(&[SEMICOLON]);
                self.finish_node();
                self.eat(SEMICOLON);
            }
            _ => {
                self.expect(SEMICOLON, "a function body");
            }
        }
        self.finish_node();
    }

    fn fn_signature(&mut self, is_macro: bool) {
        let omits_return_type = is_macro
            && (self.nth(1) == L_PAREN || (self.nth(1) == DOT && self.nth(3) == L_PAREN));
        if !omits_return_type {
            self.ty(true);
        }
        if self.at_method_receiver() {
            self.start_node(METHOD_TYPE);
            while self.nth(1) == COLON_COLON {
                self.bump();
                self.bump();
            }
            self.bump();
            self.finish_node();
            self.bump();
        }
        self.name();
        if self.at(L_PAREN) {
            self.param_list();
        } else {
            self.error("expected a parameter list");
        }
    }

    fn param_list(&mut self) {
        self.start_node(PARAM_LIST);
        self.bump();
        loop {
            match self.current() {
                R_PAREN | EOF => break,
                COMMA | SEMICOLON => self.bump(),
                _ => {
                    let before = self.progress();
                    self.param();
                    if self.progress() == before {
                        if is_closer(self.current()) {
                            break;
                        }
                        self.error_token("unexpected token in parameter list");
                    }
                }
            }
        }
        self.expect(R_PAREN, "`)`");
        self.finish_node();
    }

    fn param_is_untyped(&self) -> bool {
        match self.nth(1) {
            COMMA | R_PAREN | SEMICOLON | EQ | AT_IDENT => true,
            ELLIPSIS => !is_var_name(self.nth(2)),
            _ => false,
        }
    }

    fn param(&mut self) {
        self.start_node(PARAM);
        match self.current() {
            AMP => {
                self.bump();
                self.name();
            }
            ELLIPSIS => {
                self.bump();
                if is_var_name(self.current()) {
                    self.name();
                }
            }
            // Trailing body parameter of a macro: `; @body(int x)`.
            AT_IDENT if self.nth(1) == L_PAREN => {
                self.name();
                self.bump_balanced();
            }
            IDENT | CT_IDENT | HASH_IDENT | AT_IDENT if self.param_is_untyped() => {
                self.name();
                self.eat(ELLIPSIS);
            }
            _ => {
                self.ty(true);
                self.eat(ELLIPSIS);
                if matches!(self.current(), IDENT | CT_IDENT | HASH_IDENT | AT_IDENT) {
                    self.name();
                }
            }
        }
        self.attributes();
        if self.at(EQ) {
            self.start_node(DEFAULT_VALUE);
            self.bump();
            self.bump_until(&[COMMA, SEMICOLON]);
            self.finish_node();
        }
        self.finish_node();
    }

    fn fn_type(&mut self) {
        self.start_node(FN_TYPE);
        self.bump();
        self.ty(true);
        if self.at(L_PAREN) {
            self.param_list();
        }
        self.finish_node();
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    /// A type with optional module path, generic arguments and suffixes.
    /// `brace_generics` allows `Name{Arg}`; it is off where a `{` opens a
    /// body instead, as after an enum or bitstruct backing type.
    fn ty(&mut self, brace_generics: bool) {
        self.start_node(TYPE);
        while self.at(IDENT) && self.nth(1) == COLON_COLON {
            self.bump();
            self.bump();
        }
        let user_type = self.at(IDENT) && is_type_ident(self.nth_text(0));
        match self.current() {
            IDENT | FAULT_KW => self.bump(),
            CT_IDENT => {
                self.bump();
                if self.at(L_PAREN) {
                    self.bump_balanced();
                }
            }
            FN_KW => self.fn_type(),
            _ => self.error("expected a type"),
        }
        match self.current() {
            L_GENERIC => self.generic_args(R_GENERIC),
            L_BRACE if brace_generics && user_type => self.generic_args(R_BRACE),
            _ => {}
        }
        loop {
            match self.current() {
                STAR | QUESTION | BANG => self.bump(),
                L_BRACK => {
                    self.start_node(ARRAY_SUFFIX);
                    self.bump_balanced();
                    self.finish_node();
                }
                _ => break,
            }
        }
        self.finish_node();
    }

    fn generic_args(&mut self, close: SyntaxKind) {
        self.start_node(GENERIC_ARGS);
        self.bump();
        loop {
            let kind = self.current();
            if kind == EOF || kind == close {
                break;
            }
            let before = self.progress();
            if kind == COMMA {
                self.bump();
            } else if self
                .type_len(0)
                .is_some_and(|len| matches!(self.nth(len), COMMA) || self.nth(len) == close)
            {
                self.ty(true);
            } else {
                self.bump_until(&[COMMA, close]);
            }
            if self.progress() == before {
                break;
            }
        }
        self.expect(close, "end of generic arguments");
        self.finish_node();
    }

    fn interface_impl(&mut self) {
        self.start_node(INTERFACE_IMPL);
        self.bump();
        loop {
            match self.current() {
                R_PAREN | EOF => break,
                COMMA => self.bump(),
                _ => {
                    let before = self.progress();
                    // Interface names follow declaration naming, so any
                    // identifier is accepted here.
                    if self.at(IDENT) || self.type_len(0).is_some() {
                        self.ty(false);
                    }
                    if self.progress() == before {
                        if is_closer(self.current()) {
                            break;
                        }
                        self.bump();
                    }
                }
            }
        }
        self.expect(R_PAREN, "`)`");
        self.finish_node();
    }

    // ========================================================================
    // AGGREGATES
    // ========================================================================

    fn struct_def(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, STRUCT_DEF);
        self.bump();
        self.name();
        if self.at(L_PAREN) {
            self.interface_impl();
        }
        self.attributes();
        if self.at(L_BRACE) {
            self.struct_body();
        } else {
            self.expect(SEMICOLON, "a struct body");
        }
        self.finish_node();
    }

    fn struct_body(&mut self) {
        self.start_node(STRUCT_BODY);
        self.bump();
        while !self.at(R_BRACE) && !self.at_eof() {
            let before = self.progress();
            self.member_decl();
            if self.progress() == before {
                self.error_token("unexpected token in struct body");
            }
        }
        self.expect(R_BRACE, "`}`");
        self.finish_node();
    }

    fn member_decl(&mut self) {
        if self.at(SEMICOLON) {
            self.bump();
            return;
        }
        self.start_node(MEMBER_DECL);
        match self.current() {
            INLINE_KW => {
                self.bump();
                self.ty(true);
                if is_var_name(self.current()) {
                    self.name();
                }
            }
            STRUCT_KW | UNION_KW | BITSTRUCT_KW => {
                self.bump();
                if self.at(IDENT) {
                    self.name();
                }
                if self.eat(COLON) {
                    self.ty(false);
                }
                self.attributes();
                if self.at(L_BRACE) {
                    self.struct_body();
                }
                self.attributes();
                self.eat(SEMICOLON);
                self.finish_node();
                return;
            }
            _ => {
                if self.type_len(0).is_none() {
                    self.finish_node();
                    return;
                }
                self.ty(true);
                if is_var_name(self.current()) {
                    self.name();
                } else {
                    self.error("expected a member name");
                }
                if self.at(COLON) {
                    self.bit_range();
                }
                while self.at(COMMA) && is_var_name(self.nth(1)) {
                    self.bump();
                    self.name();
                }
            }
        }
        self.attributes();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    fn bit_range(&mut self) {
        self.start_node(BIT_RANGE);
        self.bump();
        if self.eat(INT_NUMBER) && self.eat(DOT_DOT) {
            self.eat(INT_NUMBER);
        }
        self.finish_node();
    }

    fn bitstruct_def(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, BITSTRUCT_DEF);
        self.bump();
        self.name();
        if self.at(L_PAREN) {
            self.interface_impl();
        }
        if self.eat(COLON) {
            self.ty(false);
        }
        self.attributes();
        if self.at(L_BRACE) {
            self.struct_body();
        } else {
            self.error("expected a bitstruct body");
        }
        self.finish_node();
    }

    fn enum_def(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, ENUM_DEF);
        self.bump();
        self.name();
        if self.at(L_PAREN) {
            self.interface_impl();
        }
        if self.eat(COLON) {
            self.eat(CONST_KW);
            if self.type_len(0).is_some() {
                self.ty(false);
            }
            if self.at(L_PAREN) {
                self.enum_params();
            }
        }
        self.attributes();
        if self.at(L_BRACE) {
            self.enum_body();
        } else {
            self.error("expected an enum body");
        }
        self.finish_node();
    }

    fn enum_params(&mut self) {
        self.start_node(ENUM_PARAMS);
        self.bump();
        loop {
            match self.current() {
                R_PAREN | EOF => break,
                COMMA => self.bump(),
                _ => {
                    let before = self.progress();
                    self.start_node(PARAM);
                    self.eat(INLINE_KW);
                    self.ty(true);
                    if is_var_name(self.current()) {
                        self.name();
                    }
                    self.finish_node();
                    if self.progress() == before {
                        if is_closer(self.current()) {
                            break;
                        }
                        self.error_token("unexpected token in enum parameters");
                    }
                }
            }
        }
        self.expect(R_PAREN, "`)`");
        self.finish_node();
    }

    fn enum_body(&mut self) {
        self.start_node(ENUM_BODY);
        self.bump();
        loop {
            match self.current() {
                R_BRACE | EOF => break,
                COMMA => self.bump(),
                IDENT => {
                    self.start_node(ENUMERATOR);
                    self.name();
                    match self.current() {
                        L_PAREN | L_BRACE => {
                            self.start_node(ENUM_VALUE);
                            self.bump_balanced();
                            self.finish_node();
                        }
                        EQ => {
                            self.start_node(ENUM_VALUE);
                            self.bump();
                            self.bump_until(&[COMMA]);
                            self.finish_node();
                        }
                        _ => {}
                    }
                    self.attributes();
                    self.finish_node();
                }
                _ => self.error_token("expected an enumerator"),
            }
        }
        self.expect(R_BRACE, "`}`");
        self.finish_node();
    }

    /// Legacy `fault Name { A, B }`.
    fn fault_def(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, FAULT_DEF);
        self.bump();
        self.name();
        if self.at(L_PAREN) {
            self.interface_impl();
        }
        self.attributes();
        if self.at(L_BRACE) {
            self.start_node(FAULT_BODY);
            self.bump();
            loop {
                match self.current() {
                    R_BRACE | EOF => break,
                    COMMA => self.bump(),
                    IDENT => {
                        self.name();
                        self.attributes();
                    }
                    _ => self.error_token("expected a fault constant"),
                }
            }
            self.expect(R_BRACE, "`}`");
            self.finish_node();
        } else {
            self.error("expected a fault body");
        }
        self.finish_node();
    }

    fn faultdef_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, FAULTDEF_DECL);
        self.bump();
        while self.at(IDENT) {
            self.name();
            self.attributes();
            if !self.eat(COMMA) {
                break;
            }
        }
        self.attributes();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    fn interface_def(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, INTERFACE_DEF);
        self.bump();
        self.name();
        if self.eat(COLON) {
            loop {
                if self.type_len(0).is_some() {
                    self.ty(false);
                }
                if !self.eat(COMMA) {
                    break;
                }
            }
        }
        self.attributes();
        if self.at(L_BRACE) {
            self.start_node(INTERFACE_BODY);
            self.bump();
            while !self.at(R_BRACE) && !self.at_eof() {
                if self.at(FN_KW) {
                    let cp = self.checkpoint();
                    self.fn_def(cp, FN_DEF);
                } else {
                    self.error_token("expected a method declaration");
                }
            }
            self.expect(R_BRACE, "`}`");
            self.finish_node();
        } else {
            self.error("expected an interface body");
        }
        self.finish_node();
    }

    // ========================================================================
    // ALIASES, CONSTANTS, GLOBALS
    // ========================================================================

    fn def_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, DEF_DECL);
        self.bump();
        self.name();
        self.attributes();
        if self.eat(EQ) {
            self.eat(INLINE_KW);
            if self.at(FN_KW) {
                self.fn_type();
            } else if self
                .type_len(0)
                .is_some_and(|len| matches!(self.nth(len), SEMICOLON | AT_IDENT))
            {
                self.ty(true);
            } else {
                self.alias_target();
            }
        } else {
            self.error("expected `=`");
        }
        self.attributes();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    /// The right side of an alias that is not a type: `io::printn`,
    /// `@foo`, `module std::io`, `list::new{int}`.
    fn alias_target(&mut self) {
        self.start_node(ALIAS_TARGET);
        let mut previous = EOF;
        loop {
            let kind = self.current();
            let ends = match kind {
                EOF | SEMICOLON => true,
                AT_IDENT => previous != EOF && previous != COLON_COLON && previous != MODULE_KW,
                k => is_closer(k),
            };
            if ends {
                break;
            }
            if is_opener(kind) {
                self.bump_balanced();
            } else {
                self.bump();
            }
            previous = kind;
        }
        self.finish_node();
    }

    fn distinct_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, DISTINCT_DECL);
        self.bump();
        self.name();
        if self.at(L_PAREN) {
            self.interface_impl();
        }
        self.attributes();
        if self.expect(EQ, "`=`") {
            self.eat(INLINE_KW);
            self.ty(true);
        }
        self.attributes();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    fn const_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, CONST_DECL);
        self.bump();
        let untyped = is_var_name(self.current()) && matches!(self.nth(1), EQ | SEMICOLON | AT_IDENT);
        if !untyped {
            self.ty(true);
        }
        self.name();
        self.attributes();
        self.initializer();
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    fn global_var_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, GLOBAL_VAR_DECL);
        self.ty(true);
        self.name();
        self.attributes();
        self.initializer();
        while self.at(COMMA) && is_var_name(self.nth(1)) {
            self.bump();
            self.name();
            self.initializer();
        }
        self.expect(SEMICOLON, "`;`");
        self.finish_node();
    }

    fn initializer(&mut self) {
        if self.at(EQ) {
            self.start_node(INITIALIZER);
            self.bump();
            self.bump_until(&[SEMICOLON, COMMA]);
            self.finish_node();
        }
    }

    // ========================================================================
    // BODIES
    // ========================================================================

    fn block(&mut self) {
        self.start_node(BLOCK);
        self.bump();
        while !self.at(R_BRACE) && !self.at_eof() {
            self.statement();
        }
        self.expect(R_BRACE, "`}`");
        self.finish_node();
    }

    fn statement(&mut self) {
        match self.current() {
            L_BRACE => self.block(),
            SEMICOLON | ELSE_KW | DO_KW | DEFER_KW => self.bump(),
            FOR_KW | FOREACH_KW | FOREACH_R_KW => self.loop_header(),
            IF_KW | WHILE_KW | SWITCH_KW => {
                self.bump();
                if self.at(L_PAREN) {
                    self.bump_balanced();
                }
            }
            CASE_KW | DEFAULT_KW => {
                self.bump();
                self.bump_until(&[COLON]);
                self.eat(COLON);
            }
            CT_IDENT if is_ct_directive(self.nth_text(0)) => self.ct_directive(),
            _ if self.at_local_var_decl() => self.local_var_decl(),
            _ => self.expression_statement(),
        }
    }

    fn expression_statement(&mut self) {
        loop {
            match self.current() {
                EOF | R_BRACE => break,
                SEMICOLON => {
                    self.bump();
                    break;
                }
                L_BRACE => self.block(),
                k if is_opener(k) => self.bump_balanced(),
                _ => self.bump(),
            }
        }
    }

    fn local_var_decl(&mut self) {
        self.start_node(LOCAL_VAR_DECL);
        while matches!(self.current(), CONST_KW | STATIC_KW | TLOCAL_KW) {
            self.bump();
        }
        let untyped = self.at(IDENT) && self.nth(1) == EQ;
        if !self.eat(VAR_KW) && !untyped {
            self.ty(true);
        }
        self.name();
        self.attributes();
        self.initializer();
        while self.at(COMMA) && is_var_name(self.nth(1)) {
            self.bump();
            self.name();
            self.initializer();
        }
        self.eat(SEMICOLON);
        self.finish_node();
    }

    /// `for (int i = 0; ...)` and `foreach (i, Foo* f : list)`. Declared
    /// variables become locals; the rest of the header is skipped.
    fn loop_header(&mut self) {
        let foreach = !self.at(FOR_KW);
        self.bump();
        if !self.at(L_PAREN) {
            return;
        }
        self.bump();
        if foreach {
            while !matches!(self.current(), COLON | R_PAREN | EOF) {
                let before = self.progress();
                if self.at(COMMA) {
                    self.bump();
                } else {
                    self.foreach_variable();
                }
                if self.progress() == before {
                    self.bump();
                }
            }
        } else if self.at_local_var_decl() {
            self.local_var_decl();
        }
        self.bump_until(&[R_PAREN]);
        self.eat(R_PAREN);
    }

    fn foreach_variable(&mut self) {
        self.start_node(LOCAL_VAR_DECL);
        self.eat(AMP);
        if !matches!(self.nth(1), COMMA | COLON | R_PAREN) {
            self.ty(true);
        }
        self.name();
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{SyntaxNode, parse};

    fn nodes(text: &str, kind: SyntaxKind) -> Vec<SyntaxNode> {
        parse(text)
            .syntax()
            .descendants()
            .filter(|n| n.kind() == kind)
            .collect()
    }

    fn texts(text: &str, kind: SyntaxKind) -> Vec<String> {
        nodes(text, kind)
            .iter()
            .map(|n| n.text().to_string().trim().to_string())
            .collect()
    }

    #[test]
    fn test_tree_is_lossless() {
        let text = "module app;\nimport std::io;\n\n<* doc *>\nfn void main() {\n  int x = 3; // hi\n  $$junk ]]\n}\n";
        assert_eq!(parse(text).syntax().text().to_string(), text);
    }

    #[test]
    fn test_module_and_imports() {
        let text = "module std::collections::list (<Type>) @private;\nimport std::io, libc;";
        assert_eq!(texts(text, MODULE_PATH), vec!["std::collections::list", "std::io", "libc"]);
        assert_eq!(nodes(text, GENERIC_PARAMS).len(), 1);
        assert_eq!(texts(text, ATTRIBUTE), vec!["@private"]);
    }

    #[test]
    fn test_brace_generic_module_parameters() {
        let text = "module std::collections::map {Key, Value};";
        let params = nodes(text, GENERIC_PARAMS);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].children().filter(|n| n.kind() == NAME).count(), 2);
    }

    #[test]
    fn test_method_declaration() {
        let text = "fn void Point.reset(&self, int to = 0) { self.x = to; }";
        assert_eq!(texts(text, METHOD_TYPE), vec!["Point"]);
        assert_eq!(nodes(text, PARAM).len(), 2);
        assert_eq!(texts(text, DEFAULT_VALUE), vec!["= 0"]);
    }

    #[test]
    fn test_macro_without_return_type() {
        let text = "macro @swap(#a, #b) { var $Type = $typeof(#a); }";
        let def = nodes(text, MACRO_DEF);
        assert_eq!(def.len(), 1);
        assert!(def[0].children().all(|n| n.kind() != TYPE));
        assert_eq!(texts(text, NAME)[0], "@swap");
    }

    #[test]
    fn test_doc_comment_precedes_declaration() {
        let text = "<* Adds. *>\nfn int add(int a, int b) => a + b;";
        let file = parse(text).syntax();
        let fn_def = file.children().find(|n| n.kind() == FN_DEF);
        let previous = fn_def
            .and_then(|n| n.prev_sibling_or_token())
            .and_then(|e| e.as_token().cloned())
            .and_then(|t| {
                if t.kind() == WHITESPACE {
                    t.prev_sibling_or_token().and_then(|e| e.into_token())
                } else {
                    Some(t)
                }
            });
        assert_eq!(previous.map(|t| t.kind()), Some(DOC_COMMENT));
    }

    #[test]
    fn test_local_variables() {
        let text = "fn void f(List{int} l) {\n  int a = 1, b;\n  Foo* p;\n  a = a * b;\n  for (int i = 0; i < 3; i++) {}\n  foreach (idx, &v : l) { io::File f; }\n  var x = 2;\n}";
        let locals = texts(text, LOCAL_VAR_DECL);
        assert_eq!(
            locals,
            vec!["int a = 1, b;", "Foo* p;", "int i = 0;", "idx", "&v", "io::File f;", "var x = 2;"]
        );
    }

    #[test]
    fn test_struct_members() {
        let text = "struct Foo (Printable) {\n  inline Bar;\n  int x, x2;\n  struct { int y; }\n  union inner { int z; float w; }\n}";
        assert_eq!(texts(text, INTERFACE_IMPL), vec!["(Printable)"]);
        let members = nodes(text, MEMBER_DECL);
        assert_eq!(members.len(), 7);
    }

    #[test]
    fn test_interface_impl_accepts_short_names() {
        let text = "struct Cat (I, io::W) { int lives; }";
        assert_eq!(texts(text, INTERFACE_IMPL), vec!["(I, io::W)"]);
        assert_eq!(texts(text, TYPE).iter().take(2).collect::<Vec<_>>(), vec!["I", "io::W"]);
    }

    #[test]
    fn test_bitstruct_ranges() {
        let text = "bitstruct Flags : uint { bool a : 0; int b : 1..3; }";
        assert_eq!(texts(text, BIT_RANGE), vec![": 0", ": 1..3"]);
        assert_eq!(texts(text, TYPE)[0], "uint");
    }

    #[test]
    fn test_enum_with_associated_values() {
        let text = "enum State : int (String desc, bool active) { START(\"s\", true), STOP(\"e\", false) }";
        assert_eq!(nodes(text, ENUM_PARAMS).len(), 1);
        assert_eq!(nodes(text, ENUMERATOR).len(), 2);
        assert_eq!(texts(text, ENUM_VALUE), vec!["(\"s\", true)", "(\"e\", false)"]);
    }

    #[test]
    fn test_aliases() {
        let text = "def Foo = inline Bar;\nalias print = io::printn;\nalias Cb = fn void(int);\ndistinct Meters = double;\nalias @p = @q;";
        assert_eq!(nodes(text, DEF_DECL).len(), 4);
        assert_eq!(texts(text, ALIAS_TARGET), vec!["io::printn", "@q"]);
        assert_eq!(nodes(text, FN_TYPE).len(), 1);
        assert_eq!(nodes(text, DISTINCT_DECL).len(), 1);
    }

    #[test]
    fn test_faults() {
        let text = "fault IoError { NOT_FOUND, DENIED }\nfaultdef NO_MEMORY, OVERFLOW;";
        assert_eq!(nodes(text, FAULT_DEF).len(), 1);
        assert_eq!(nodes(text, FAULTDEF_DECL)[0].children().filter(|n| n.kind() == NAME).count(), 2);
    }

    #[test]
    fn test_interface_methods() {
        let text = "interface Greeter { fn void greet(); fn String name() @optional; }";
        assert_eq!(nodes(text, FN_DEF).len(), 2);
    }

    #[test]
    fn test_compile_time_branches_keep_declarations() {
        let text = "$if env::WIN32:\nint a;\n$else\nint b;\n$endif";
        assert_eq!(nodes(text, GLOBAL_VAR_DECL).len(), 2);
    }

    #[test]
    fn test_recovers_after_garbage() {
        let parse = parse("int x = ;; ]] ?? fn void after() {}");
        let fns = parse.syntax().descendants().filter(|n| n.kind() == FN_DEF).count();
        assert_eq!(fns, 1);
        assert!(!parse.errors().is_empty());
    }
}
