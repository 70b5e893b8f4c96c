//! One builder per kind of declaration.

use smol_str::SmolStr;

use super::collector::{Collector, doc_comment};
use super::{PendingInlineStruct, child, children, compact_text, has_token, name_token, parse_int, token};
use crate::symbols::{
    ArgInfo, BitstructBuilder, DefBuilder, DefTarget, DistinctBuilder, EnumBuilder, FaultBuilder, Function,
    FunctionBuilder, InterfaceBuilder, StructBuilder, StructMember, StructMemberBuilder, Type, Variable,
    VariableBuilder, module_fault_constant,
};
use crate::syntax::{SyntaxKind, SyntaxNode, is_builtin_type, is_type_ident};

impl Collector<'_> {
    /// Build and attach one top-level declaration. Returns false for nodes
    /// that declare nothing.
    pub(super) fn declaration(&mut self, node: &SyntaxNode) -> bool {
        match node.kind() {
            SyntaxKind::FN_DEF | SyntaxKind::MACRO_DEF => {
                let function = self.function(node);
                self.with_module(|m| m.add_function(function));
            }
            SyntaxKind::STRUCT_DEF => self.struct_def(node),
            SyntaxKind::BITSTRUCT_DEF => self.bitstruct_def(node),
            SyntaxKind::ENUM_DEF => self.enum_def(node),
            SyntaxKind::FAULT_DEF => self.fault_def(node),
            SyntaxKind::FAULTDEF_DECL => self.faultdef_decl(node),
            SyntaxKind::DEF_DECL => self.def_decl(node),
            SyntaxKind::DISTINCT_DECL => self.distinct_decl(node),
            SyntaxKind::INTERFACE_DEF => self.interface_def(node),
            SyntaxKind::CONST_DECL | SyntaxKind::GLOBAL_VAR_DECL => {
                let doc = doc_comment(node);
                for variable in self.variables(node, doc) {
                    self.with_module(|m| m.add_variable(variable));
                }
            }
            _ => return false,
        }
        true
    }

    // ========================================================================
    // FUNCTIONS
    // ========================================================================

    pub(super) fn function(&mut self, node: &SyntaxNode) -> Function {
        let return_type = match child(node, SyntaxKind::TYPE) {
            Some(ty) => self.ty(&ty),
            None => Type::empty(),
        };
        let receiver = child(node, SyntaxKind::METHOD_TYPE)
            .and_then(|m| m.last_token())
            .map(|t| SmolStr::new(t.text()));
        let (name, id_range) = self.name(node);

        let mut builder = FunctionBuilder::new(name, return_type, self.scope.path.clone(), self.doc_id.clone());
        if node.kind() == SyntaxKind::MACRO_DEF {
            builder = builder.is_macro();
        }
        if let Some(receiver) = &receiver {
            builder = builder.method_of(receiver.clone());
        }
        builder = builder
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node));

        if let Some(list) = child(node, SyntaxKind::PARAM_LIST) {
            for (index, param) in children(&list, SyntaxKind::PARAM).enumerate() {
                builder = builder.argument(self.param(&param, index, receiver.as_deref()));
            }
        }

        if let Some(body) = child(node, SyntaxKind::BLOCK) {
            let decls: Vec<_> = body
                .descendants()
                .filter(|n| n.kind() == SyntaxKind::LOCAL_VAR_DECL)
                .collect();
            for decl in decls {
                for local in self.variables(&decl, None) {
                    builder = builder.local(local);
                }
            }
        }

        builder.build()
    }

    fn param(&mut self, node: &SyntaxNode, index: usize, receiver: Option<&str>) -> Variable {
        let (name, id_range) = match name_token(node) {
            Some(token) => (SmolStr::new(token.text()), self.token_range(&token)),
            None => (SmolStr::new(format!("$arg{index}")), self.node_range(node)),
        };
        let vararg = has_token(node, SyntaxKind::ELLIPSIS);
        let declared = child(node, SyntaxKind::TYPE);

        let mut ty = match &declared {
            Some(ty) => self.ty(ty),
            None => Type::empty(),
        };
        if declared.is_none() {
            if name == "self" {
                if let Some(receiver) = receiver {
                    ty = self.named_type(receiver, "");
                    if has_token(node, SyntaxKind::AMP) {
                        ty = ty.with_pointers(1);
                    }
                }
            } else if name.starts_with('@') {
                // `@body(int x)`: the trailing block of a macro.
                let params: String = node
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .filter(|t| !t.kind().is_trivia())
                    .map(|t| t.text().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .replace("( ", "(")
                    .replace(" )", ")")
                    .replace(" ,", ",");
                let params = if params.is_empty() { "()".to_string() } else { params };
                ty = Type::builtin(format!("fn void{params}"));
            }
        }
        if vararg {
            ty = if declared.is_none() {
                Type::builtin("any").with_pointers(1).with_collection(None)
            } else {
                ty.with_collection(None)
            };
        }

        let default = child(node, SyntaxKind::DEFAULT_VALUE).map(|value| {
            let text = compact_text(&value);
            SmolStr::new(text.trim_start_matches('=').trim())
        });

        VariableBuilder::new(name, ty, self.scope.path.clone(), self.doc_id.clone())
            .arg(ArgInfo { vararg, default })
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .build()
    }

    /// Every name declared by a global, constant or local declaration.
    fn variables(&mut self, node: &SyntaxNode, doc: Option<crate::symbols::DocComment>) -> Vec<Variable> {
        let ty = match child(node, SyntaxKind::TYPE) {
            Some(ty) => self.ty(&ty),
            None => Type::empty(),
        };
        let constant = has_token(node, SyntaxKind::CONST_KW);
        let doc_range = self.node_range(node);

        children(node, SyntaxKind::NAME)
            .filter_map(|name| name.first_token())
            .map(|token| {
                let mut builder =
                    VariableBuilder::new(token.text(), ty.clone(), self.scope.path.clone(), self.doc_id.clone())
                        .id_range(self.token_range(&token))
                        .doc_range(doc_range)
                        .doc_comment(doc.clone());
                if constant {
                    builder = builder.constant();
                }
                builder.build()
            })
            .collect()
    }

    // ========================================================================
    // AGGREGATES
    // ========================================================================

    fn implements(&self, node: &SyntaxNode) -> Vec<String> {
        child(node, SyntaxKind::INTERFACE_IMPL)
            .into_iter()
            .flat_map(|list| children(&list, SyntaxKind::TYPE).collect::<Vec<_>>())
            .map(|ty| compact_text(&ty))
            .collect()
    }

    fn struct_def(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let mut builder = StructBuilder::new(name.clone(), self.scope.path.clone(), self.doc_id.clone())
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node));
        if has_token(node, SyntaxKind::UNION_KW) {
            builder = builder.union();
        }
        for interface in self.implements(node) {
            builder = builder.implements(interface);
        }
        if let Some(body) = child(node, SyntaxKind::STRUCT_BODY) {
            for member in self.members(&body, Some(&name)) {
                builder = builder.member(member);
            }
        }
        let strukt = builder.build();
        self.with_module(|m| m.add_struct(strukt));
    }

    /// Members of a struct body. `host` names the top-level struct whose
    /// `inline` members get queued for expansion; nested bodies pass none.
    fn members(&mut self, body: &SyntaxNode, host: Option<&str>) -> Vec<StructMember> {
        let mut members = Vec::new();
        for decl in children(body, SyntaxKind::MEMBER_DECL) {
            let doc_range = self.node_range(&decl);

            if has_token(&decl, SyntaxKind::INLINE_KW) {
                let Some(ty_node) = child(&decl, SyntaxKind::TYPE) else {
                    continue;
                };
                let ty = self.ty(&ty_node);
                let (name, id_range) = match name_token(&decl) {
                    Some(token) => (SmolStr::new(token.text()), self.token_range(&token)),
                    None => (SmolStr::default(), self.node_range(&ty_node)),
                };
                if let Some(host) = host {
                    self.pending.add_subtyping(PendingInlineStruct {
                        doc_id: self.doc_id.clone(),
                        module: self.scope.name.clone(),
                        struct_name: SmolStr::new(host),
                        inlined_type: SmolStr::new(ty.name()),
                    });
                }
                members.push(
                    StructMemberBuilder::new(name, ty, self.scope.path.clone(), self.doc_id.clone())
                        .id_range(id_range)
                        .doc_range(doc_range)
                        .inline_pending()
                        .build(),
                );
                continue;
            }

            let nested_kw = [SyntaxKind::STRUCT_KW, SyntaxKind::UNION_KW, SyntaxKind::BITSTRUCT_KW]
                .into_iter()
                .find_map(|kind| token(&decl, kind));
            if let Some(keyword) = nested_kw {
                let nested = match child(&decl, SyntaxKind::STRUCT_BODY) {
                    Some(body) => self.members(&body, None),
                    None => Vec::new(),
                };
                let Some(name_token) = name_token(&decl) else {
                    // Anonymous: its members belong to the enclosing struct.
                    members.extend(nested);
                    continue;
                };
                let id_range = self.token_range(&name_token);
                let mut substruct = StructBuilder::new(name_token.text(), self.scope.path.clone(), self.doc_id.clone())
                    .id_range(id_range)
                    .doc_range(doc_range);
                if keyword.kind() == SyntaxKind::UNION_KW {
                    substruct = substruct.union();
                }
                for member in nested {
                    substruct = substruct.member(member);
                }
                let ty = match child(&decl, SyntaxKind::TYPE) {
                    Some(backing) => self.ty(&backing),
                    None => Type::builtin(keyword.text()),
                };
                members.push(
                    StructMemberBuilder::new(name_token.text(), ty, self.scope.path.clone(), self.doc_id.clone())
                        .id_range(id_range)
                        .doc_range(doc_range)
                        .substruct(substruct.build())
                        .build(),
                );
                continue;
            }

            // `int x, y;` declares one member per name.
            let Some(ty_node) = child(&decl, SyntaxKind::TYPE) else {
                continue;
            };
            let ty = self.ty(&ty_node);
            let bit_range = child(&decl, SyntaxKind::BIT_RANGE).and_then(|bits| {
                let bounds: Vec<u32> = bits
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .filter(|t| t.kind() == SyntaxKind::INT_NUMBER)
                    .filter_map(|t| parse_int(t.text()))
                    .collect();
                let low = *bounds.first()?;
                Some((low, bounds.get(1).copied().unwrap_or(low)))
            });
            for name in children(&decl, SyntaxKind::NAME).filter_map(|n| n.first_token()) {
                let mut member =
                    StructMemberBuilder::new(name.text(), ty.clone(), self.scope.path.clone(), self.doc_id.clone())
                        .id_range(self.token_range(&name))
                        .doc_range(doc_range);
                if let Some((low, high)) = bit_range {
                    member = member.bit_range(low, high);
                }
                members.push(member.build());
            }
        }
        members
    }

    fn bitstruct_def(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let backing = match child(node, SyntaxKind::TYPE) {
            Some(ty) => self.ty(&ty),
            None => Type::empty(),
        };
        let mut builder = BitstructBuilder::new(name, backing, self.scope.path.clone(), self.doc_id.clone())
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node));
        for interface in self.implements(node) {
            builder = builder.implements(interface);
        }
        if let Some(body) = child(node, SyntaxKind::STRUCT_BODY) {
            for member in self.members(&body, None) {
                builder = builder.member(member);
            }
        }
        let bitstruct = builder.build();
        self.with_module(|m| m.add_bitstruct(bitstruct));
    }

    fn enum_def(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let backing = child(node, SyntaxKind::TYPE)
            .map(|ty| compact_text(&ty))
            .unwrap_or_default();
        let mut builder = EnumBuilder::new(name, backing, self.scope.path.clone(), self.doc_id.clone())
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node));
        for interface in self.implements(node) {
            builder = builder.implements(interface);
        }

        if let Some(params) = child(node, SyntaxKind::ENUM_PARAMS) {
            for param in children(&params, SyntaxKind::PARAM) {
                let ty = match child(&param, SyntaxKind::TYPE) {
                    Some(ty) => self.ty(&ty),
                    None => Type::empty(),
                };
                let (name, id_range) = self.name(&param);
                builder = builder.associated_value(
                    VariableBuilder::new(name, ty, self.scope.path.clone(), self.doc_id.clone())
                        .id_range(id_range)
                        .doc_range(self.node_range(&param))
                        .build(),
                );
            }
        }

        if let Some(body) = child(node, SyntaxKind::ENUM_BODY) {
            for enumerator in children(&body, SyntaxKind::ENUMERATOR) {
                let (name, id_range) = self.name(&enumerator);
                let value = child(&enumerator, SyntaxKind::ENUM_VALUE)
                    .map(|v| {
                        let text = compact_text(&v);
                        match text.strip_prefix('=') {
                            Some(rest) => rest.trim().to_string(),
                            None => text,
                        }
                    })
                    .unwrap_or_default();
                builder = builder.enumerator(name, value, id_range);
            }
        }

        let enumeration = builder.build();
        self.with_module(|m| m.add_enum(enumeration));
    }

    fn fault_def(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let mut builder = FaultBuilder::new(name, "", self.scope.path.clone(), self.doc_id.clone())
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node));
        if let Some(body) = child(node, SyntaxKind::FAULT_BODY) {
            for constant in children(&body, SyntaxKind::NAME).filter_map(|n| n.first_token()) {
                builder = builder.constant(constant.text(), self.token_range(&constant));
            }
        }
        let fault = builder.build();
        self.with_module(|m| m.add_fault(fault));
    }

    fn faultdef_decl(&mut self, node: &SyntaxNode) {
        let doc = doc_comment(node);
        let constants: Vec<_> = children(node, SyntaxKind::NAME)
            .filter_map(|n| n.first_token())
            .map(|token| {
                module_fault_constant(
                    token.text(),
                    self.scope.path.clone(),
                    self.doc_id.clone(),
                    self.token_range(&token),
                    doc.clone(),
                )
            })
            .collect();
        self.with_module(|m| {
            for constant in constants {
                m.add_fault_constant(constant);
            }
        });
    }

    fn interface_def(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let mut builder = InterfaceBuilder::new(name, self.scope.path.clone(), self.doc_id.clone())
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node));
        if let Some(body) = child(node, SyntaxKind::INTERFACE_BODY) {
            for method in children(&body, SyntaxKind::FN_DEF) {
                builder = builder.method(self.function(&method));
            }
        }
        let interface = builder.build();
        self.with_module(|m| m.add_interface(interface));
    }

    // ========================================================================
    // ALIASES
    // ========================================================================

    fn def_decl(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let doc_range = self.node_range(node);
        let doc = doc_comment(node);
        let target_type = child(node, SyntaxKind::TYPE);

        // Legacy `def N = inline T` and `def N = T` with `T` a plain user
        // type are distinct types.
        let inline = has_token(node, SyntaxKind::INLINE_KW);
        let distinct_target = target_type
            .as_ref()
            .filter(|ty| has_token(node, SyntaxKind::DEF_KW) && (inline || self.is_plain_user_type(ty)));
        if let Some(ty_node) = distinct_target {
            let base = self.ty(ty_node);
            let distinct = DistinctBuilder::new(name, base, self.scope.path.clone(), self.doc_id.clone())
                .inline(inline)
                .id_range(id_range)
                .doc_range(doc_range)
                .doc_comment(doc)
                .build();
            self.with_module(|m| m.add_distinct(distinct));
            return;
        }

        let target = if let Some(ty_node) = &target_type {
            DefTarget::Type(self.ty(ty_node))
        } else if let Some(signature) = child(node, SyntaxKind::FN_TYPE) {
            DefTarget::Type(Type::builtin(compact_text(&signature)))
        } else {
            let ident = child(node, SyntaxKind::ALIAS_TARGET)
                .map(|t| compact_text(&t))
                .unwrap_or_default();
            DefTarget::Identifier(SmolStr::new(ident))
        };
        let def = DefBuilder::new(name, target, self.scope.path.clone(), self.doc_id.clone())
            .id_range(id_range)
            .doc_range(doc_range)
            .doc_comment(doc)
            .build();
        self.with_module(|m| m.add_def(def));
    }

    /// A single unqualified user type identifier, without generic arguments
    /// or suffixes.
    fn is_plain_user_type(&self, ty: &SyntaxNode) -> bool {
        let mut significant = ty
            .children_with_tokens()
            .filter(|e| !e.kind().is_trivia());
        match (significant.next(), significant.next()) {
            (Some(rowan::NodeOrToken::Token(token)), None) => {
                token.kind() == SyntaxKind::IDENT
                    && is_type_ident(token.text())
                    && !is_builtin_type(token.text())
                    && !self.scope.is_generic_parameter(token.text())
            }
            _ => false,
        }
    }

    fn distinct_decl(&mut self, node: &SyntaxNode) {
        let (name, id_range) = self.name(node);
        let base = match child(node, SyntaxKind::TYPE) {
            Some(ty) => self.ty(&ty),
            None => Type::empty(),
        };
        let distinct = DistinctBuilder::new(name, base, self.scope.path.clone(), self.doc_id.clone())
            .inline(has_token(node, SyntaxKind::INLINE_KW))
            .id_range(id_range)
            .doc_range(self.node_range(node))
            .doc_comment(doc_comment(node))
            .build();
        self.with_module(|m| m.add_distinct(distinct));
    }
}
