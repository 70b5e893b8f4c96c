use super::*;
use crate::base::{Position, Range};
use crate::symbols::{DefTarget, FunctionKind, Module, Typeable};

fn parse(text: &str) -> (UnitModules, PendingToResolve) {
    parse_symbols(&DocId::from("file:///work/app.c3"), text)
}

fn module<'a>(unit: &'a UnitModules, name: &str) -> &'a Module {
    match unit.get(name) {
        Some(module) => module,
        None => panic!("module {name} not found in {:?}", unit.module_names().collect::<Vec<_>>()),
    }
}

#[test]
fn test_file_without_module_gets_file_name() {
    let (unit, _) = parse("int value = 3;\nfn void main() {}\n");
    let m = module(&unit, "app");
    assert_eq!(m.base().doc_range().start, Position::new(0, 0));
    assert_eq!(m.base().doc_range().end, Position::new(2, 0));
    assert!(m.variable("value").is_some());
    assert!(m.function("main").is_some());
}

#[test]
fn test_module_regions() {
    let text = "module foo;\nint a;\n\nmodule bar;\nint b;\n";
    let (unit, _) = parse(text);

    let foo = module(&unit, "foo");
    assert_eq!(foo.base().doc_range(), Range::new(0, 0, 1, 6));
    assert_eq!(foo.base().id_range(), Range::new(0, 7, 0, 10));
    assert!(foo.variable("a").is_some());

    let bar = module(&unit, "bar");
    assert_eq!(bar.base().doc_range(), Range::new(3, 0, 5, 0));
    assert!(bar.variable("b").is_some());
    assert!(bar.variable("a").is_none());
}

#[test]
fn test_module_attributes_generics_and_imports() {
    let text = "<* Lists. *>\nmodule std::collections::list(<Type>) @private;\nimport std::io, libc;\nimport std::io;";
    let (unit, _) = parse(text);
    let m = module(&unit, "std::collections::list");

    assert!(m.is_private());
    assert_eq!(m.generic_parameters(), ["Type"]);
    assert_eq!(m.imports().len(), 2);
    assert_eq!(m.base().doc_comment().map(|d| d.body()), Some("Lists."));
}

#[test]
fn test_function_parameters() {
    let text = "module app;\nstruct Point { int x; }\nfn void Point.move(&self, int dx = 1, args...) {}\nfn int sum(int... nums) => 0;";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    let mv = m.function("Point.move").expect("method");
    assert_eq!(mv.kind(), FunctionKind::Method);
    assert_eq!(mv.type_identifier(), Some("Point"));
    assert_eq!(mv.argument_ids().collect::<Vec<_>>(), vec!["self", "dx", "args"]);
    assert_eq!(mv.argument("self").map(|a| a.get_type().to_string()), Some("Point*".to_string()));
    assert_eq!(
        mv.argument("dx").and_then(|a| a.arg_info()).and_then(|i| i.default.clone()),
        Some("1".into())
    );
    let args = mv.argument("args").expect("vararg");
    assert!(args.arg_info().is_some_and(|i| i.vararg));
    assert_eq!(args.get_type().to_string(), "any*[]");

    let sum = m.function("sum").expect("sum");
    assert_eq!(sum.argument("nums").map(|a| a.get_type().to_string()), Some("int[]".to_string()));
    assert_eq!(sum.hover_info(), "int sum(int[] nums)");
}

#[test]
fn test_unnamed_and_body_parameters() {
    let text = "extern fn void puts(char*);\nmacro @each(list; @body(it)) {}";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    assert_eq!(m.function("puts").map(|f| f.argument_ids().collect::<Vec<_>>()), Some(vec!["$arg0"]));

    let each = m.function("@each").expect("macro");
    assert_eq!(each.kind(), FunctionKind::Macro);
    assert!(each.return_type().is_empty());
    assert_eq!(each.argument("@body").map(|a| a.get_type().to_string()), Some("fn void(it)".to_string()));
}

#[test]
fn test_locals_keep_declaration_ranges() {
    let text = "fn void main() {\n  int a = 1;\n  if (a) { Foo f; }\n  for (int i = 0; i < 2; i++) {}\n}";
    let (unit, _) = parse(text);
    let main = module(&unit, "app").function("main").expect("main");

    let names: Vec<_> = main.locals().iter().map(|v| v.name()).collect();
    assert_eq!(names, vec!["a", "f", "i"]);
    assert_eq!(main.locals()[0].base().doc_range(), Range::new(1, 2, 1, 12));
    assert_eq!(main.locals()[0].base().id_range(), Range::new(1, 6, 1, 7));
    assert!(main.local_before("f", Position::new(2, 5)).is_none());
    assert!(main.local_before("f", Position::new(2, 16)).is_some());
}

#[test]
fn test_struct_members() {
    let text = "module app;\nstruct Shape (Drawable) {\n  inline Base;\n  int x, y;\n  struct { int w; int h; }\n  union data { int i; float f; }\n}";
    let (unit, pending) = parse(text);
    let shape = module(&unit, "app").structure("Shape").expect("struct");

    assert_eq!(shape.implements(), ["Drawable"]);
    let names: Vec<_> = shape.members().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["", "x", "y", "w", "h", "data"]);
    assert!(shape.members()[0].is_inline_pending());

    let data = shape.member("data").and_then(|m| m.substruct()).expect("substruct");
    assert!(data.is_union());
    assert_eq!(data.members().len(), 2);

    assert_eq!(pending.subtyping().len(), 1);
    assert_eq!(pending.subtyping()[0].struct_name, "Shape");
    assert_eq!(pending.subtyping()[0].inlined_type, "Base");
}

#[test]
fn test_bitstruct_members() {
    let text = "bitstruct Flags : uint { bool ready : 0; int level : 1..3; }";
    let (unit, _) = parse(text);
    let flags = module(&unit, "app").bitstruct("Flags").expect("bitstruct");

    assert_eq!(flags.backing_type().name(), "uint");
    assert_eq!(flags.member("ready").and_then(|m| m.bit_range()), Some([0, 0]));
    assert_eq!(flags.member("level").and_then(|m| m.bit_range()), Some([1, 3]));
}

#[test]
fn test_enum_with_associated_values() {
    let text = "enum State : int (String desc, bool active) { START(\"s\", true), STOP(\"e\", false) }\nenum Level { LOW = 1, HIGH }";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    let state = m.enumeration("State").expect("enum");
    assert_eq!(state.backing_type(), "int");
    assert_eq!(state.associated_values().len(), 2);
    assert_eq!(state.associated_value("desc").map(|v| v.get_type().name()), Some("String"));
    assert_eq!(state.enumerator("START").map(|e| e.value()), Some("(\"s\", true)"));
    assert_eq!(state.enumerator("STOP").map(|e| e.enum_name()), Some("State"));

    let level = m.enumeration("Level").expect("enum");
    assert_eq!(level.enumerator("LOW").map(|e| e.hover_info()), Some("LOW: 1".to_string()));
    assert_eq!(level.enumerator("HIGH").map(|e| e.value()), Some(""));
}

#[test]
fn test_faults() {
    let text = "fault IoError { NOT_FOUND, DENIED }\n<* Out of memory. *>\nfaultdef NO_MEMORY, OVERFLOW;";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    let io = m.fault("IoError").expect("fault");
    assert_eq!(io.constants().len(), 2);
    assert_eq!(io.constant("DENIED").and_then(|c| c.fault_name()), Some("IoError"));

    let no_memory = m.fault_constant("NO_MEMORY").expect("faultdef");
    assert_eq!(no_memory.fault_name(), None);
    assert_eq!(no_memory.base().doc_comment().map(|d| d.body()), Some("Out of memory."));
    assert!(m.fault_constant("OVERFLOW").is_some());
}

#[test]
fn test_alias_keywords() {
    let text = "module app(<Elem>);\nstruct Point { int x; }\ndef InlP = inline Point;\ndef NonP = Point;\ndef IntList = List(<int>);\ndef Same = Elem;\nalias print = io::printn;\nalias Callback = fn void(int);\ndistinct Meters = double;\ntypedef Id = inline int;";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    assert!(m.distinct("InlP").is_some_and(|d| d.is_inline()));
    assert!(m.distinct("NonP").is_some_and(|d| !d.is_inline()));
    assert!(m.def("IntList").is_some_and(|d| d.resolves_to_type()));
    assert!(m.def("Same").is_some());
    assert_eq!(
        m.def("print").map(|d| d.target().clone()),
        Some(DefTarget::Identifier("io::printn".into()))
    );
    assert_eq!(m.def("Callback").and_then(|d| d.resolved_type()).map(|t| t.to_string()), Some("fn void(int)".to_string()));
    assert!(m.distinct("Meters").is_some_and(|d| !d.is_inline()));
    assert_eq!(m.distinct("Id").map(|d| d.hover_info()), Some("distinct Id = inline int".to_string()));
}

#[test]
fn test_types_and_pending_contexts() {
    let text = "module app(<Elem>);\nimport std::io;\nio::File* handle;\nElem[4] items;\nint? maybe;\nList(<Point>) points;";
    let (unit, pending) = parse(text);
    let m = module(&unit, "app");

    let handle = m.variable("handle").expect("handle").get_type();
    assert_eq!(handle.module(), "io");
    assert_eq!(handle.pointer_count(), 1);

    let items = m.variable("items").expect("items").get_type();
    assert!(items.is_generic_argument());
    assert_eq!(items.collection_size(), Some(4));
    assert_eq!(items.module(), "app");

    let maybe = m.variable("maybe").expect("maybe").get_type();
    assert!(maybe.is_builtin() && maybe.is_optional());

    let points = m.variable("points").expect("points").get_type();
    assert_eq!(points.to_string(), "List{Point}");

    let mut names: Vec<_> = pending.types_in("app").map(|p| p.type_name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["File", "List", "Point"]);
    assert!(pending.types().any(|p| p.type_name == "File" && p.written_module == "io"));
}

#[test]
fn test_doc_comments_attach_to_next_declaration() {
    let text = "<*\n Adds two numbers.\n @param a \"first\"\n*>\nfn int add(int a, int b) => a + b;\n\nfn void plain() {}";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    let doc = m.function("add").and_then(|f| f.base().doc_comment()).expect("doc");
    assert_eq!(doc.body(), "Adds two numbers.");
    assert_eq!(doc.contracts()[0].name, "@param");
    assert!(m.function("plain").and_then(|f| f.base().doc_comment()).is_none());
}

#[test]
fn test_interface_methods() {
    let text = "interface Greeter { fn void greet(); fn String name(); }\nconst int LIMIT = 3;";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    let greeter = m.interface("Greeter").expect("interface");
    assert_eq!(greeter.methods().map(|f| f.name()).collect::<Vec<_>>(), vec!["greet", "name"]);
    assert!(m.variable("LIMIT").is_some_and(|v| v.is_constant()));
}

#[test]
fn test_implemented_interfaces_use_declared_names() {
    let text = "interface I { fn void greet(); }\nstruct Cat (I, io::Named) { int lives; }";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    assert!(m.interface("I").is_some());
    let cat = m.structure("Cat").expect("struct");
    assert_eq!(cat.implements(), ["I", "io::Named"]);
}

#[test]
fn test_malformed_input_keeps_what_was_found() {
    let text = "module app;\nstruct { int x; }\n)))\nfn void ok() {}";
    let (unit, _) = parse(text);
    let m = module(&unit, "app");

    assert!(m.function("ok").is_some());
    assert_eq!(m.structure("").map(|s| s.base().id_range().is_empty()), Some(true));
}
