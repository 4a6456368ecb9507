//! Unit tests for the type checker module.
//!
//! This module contains tests for:
//! - Interning and implicit conversions in the type cache
//! - Literal inference, casts and bindings
//! - Scopes, redeclaration and shadowing
//! - Operators, member access, calls, indexing and initializers
//! - Procedures and returns
//! - Error continuation and scope bookkeeping

use crate::{
    ast::{
        ast::Typed,
        statements::{Program, Stmt},
    },
    errors::errors::{Error, ErrorCategory},
    parser::parser::parse,
};

use super::{
    type_checker::{type_check, TypeChecker},
    types::{Field, PointerKind, TypeCache, TypeShape},
};

fn check_files(sources: &[&str]) -> (Program, TypeChecker, Vec<Error>) {
    let mut program = Program::new();

    for (index, source) in sources.iter().enumerate() {
        let file = parse(source.to_string(), format!("test{}.lang", index)).unwrap();
        program.files.push(file);
    }

    let (checker, errors) = type_check(&mut program);
    (program, checker, errors)
}

fn check(source: &str) -> (Program, TypeChecker, Vec<Error>) {
    check_files(&[source])
}

fn check_ok(source: &str) -> (Program, TypeChecker) {
    let (program, checker, errors) = check(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    (program, checker)
}

fn first_error(source: &str) -> Error {
    let (_, _, errors) = check(source);
    errors.into_iter().next().expect("expected a type error")
}

/// The described type of the top-level binding `name`.
fn binding_type(program: &Program, checker: &TypeChecker, name: &str) -> String {
    let ty = program
        .files
        .iter()
        .flat_map(|file| file.declarations.iter())
        .find(|stmt| stmt.name() == Some(name))
        .and_then(|stmt| match stmt {
            Stmt::Variable(variable) => variable.resolved.get(),
            Stmt::Declaration(declaration) => declaration.resolved.get(),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no resolved binding named {:?}", name));

    checker.describe(ty)
}

fn types_of(source: &str, names: &[&str]) -> Vec<String> {
    let (program, checker) = check_ok(source);
    names.iter().map(|name| binding_type(&program, &checker, name)).collect()
}

#[test]
fn test_interning_is_idempotent() {
    let mut cache = TypeCache::new();

    let int = cache.integer(true, Some(64));
    assert_eq!(cache.integer(true, Some(64)), int);
    assert_ne!(cache.integer(false, Some(64)), int);

    let array = cache.array(int, 2);
    assert_eq!(cache.intern(TypeShape::Array { element: int, dimensions: 2 }), array);

    let float = cache.float(Some(32));
    let first = cache.structure(vec![Field::new("a", int), Field::new("b", float)]);
    let before = cache.len();
    let second = cache.structure(vec![Field::new("a", int), Field::new("b", float)]);
    assert_eq!(first, second);
    assert_eq!(cache.len(), before);
}

#[test]
fn test_literal_conversions() {
    let mut cache = TypeCache::new();
    let literal = cache.integer(true, None);
    let float_literal = cache.float(None);
    let int32 = cache.integer(true, Some(32));
    let uint8 = cache.integer(false, Some(8));
    let float64 = cache.float(Some(64));

    assert!(cache.is_implicitly_convertible(literal, int32));
    assert!(cache.is_implicitly_convertible(literal, uint8));
    assert!(cache.is_implicitly_convertible(float_literal, float64));
    assert!(!cache.is_implicitly_convertible(literal, float64));
    assert!(!cache.is_implicitly_convertible(int32, literal));
    assert!(!cache.is_implicitly_convertible(int32, uint8));

    assert_eq!(cache.common_type(literal, int32), Some(int32));
    assert_eq!(cache.common_type(int32, literal), Some(int32));
    assert_eq!(cache.common_type(literal, literal), Some(literal));
    assert_eq!(cache.common_type(int32, float64), None);
}

#[test]
fn test_composites_convert_by_identity() {
    let mut cache = TypeCache::new();
    let literal = cache.integer(true, None);
    let int = cache.integer(true, Some(64));
    let literal_pointer = cache.pointer(PointerKind::Weak, literal);
    let int_pointer = cache.pointer(PointerKind::Weak, int);
    let unique_pointer = cache.pointer(PointerKind::Unique, int);

    assert!(cache.is_implicitly_convertible(int_pointer, int_pointer));
    assert!(!cache.is_implicitly_convertible(literal_pointer, int_pointer));
    assert!(!cache.is_implicitly_convertible(unique_pointer, int_pointer));
}

#[test]
fn test_default_size_and_fields() {
    let mut cache = TypeCache::new();
    let literal = cache.integer(true, None);
    let float_literal = cache.float(None);

    let sized = cache.default_size(literal);
    assert_eq!(cache.describe(sized), "Int64");
    let sized = cache.default_size(float_literal);
    assert_eq!(cache.describe(sized), "Float64");

    let string = cache.string();
    let fields = cache.fields(string).unwrap();
    let described: Vec<String> = fields
        .iter()
        .map(|field| format!("{}: {}", field.name, cache.describe(field.ty)))
        .collect();
    assert_eq!(described, vec!["data: &UInt8", "length: UInt64"]);

    let bool_type = cache.boolean();
    assert!(cache.fields(bool_type).is_none());
}

#[test]
fn test_literal_inference() {
    let source = "a :: 1\nb :: 1.0\nc : Int : 1\nd : UInt : 1\ne : Int8 = 1\nf := \"text\"\ng :: true";

    assert_eq!(
        types_of(source, &["a", "b", "c", "d", "e", "f", "g"]),
        vec!["Int64", "Float64", "Int64", "UInt64", "Int8", "String", "Bool"]
    );
}

#[test]
fn test_casts() {
    let source = "a :: 1 as Int\nb :: 1 as UInt\nc :: 1 as Float\nd :: 1.5 as Int32\ne : Float32 : 2.5\nf :: e as UInt8";

    assert_eq!(
        types_of(source, &["a", "b", "c", "d", "f"]),
        vec!["Int64", "UInt64", "Float64", "Int32", "UInt8"]
    );
}

#[test]
fn test_invalid_casts() {
    assert_eq!(first_error("s :: \"x\" as Int").get_error_name(), "InvalidCast");
    assert_eq!(first_error("s :: true as Float").get_error_name(), "InvalidCast");
    assert_eq!(first_error("s :: 1 as 2").get_error_name(), "ExpectedType");
}

#[test]
fn test_declared_type_must_be_a_type() {
    let error = first_error("a : 1 : 2");

    assert_eq!(error.get_error_name(), "ExpectedType");
    assert_eq!(error.category(), ErrorCategory::TypeMismatch);
}

#[test]
fn test_initializer_must_convert() {
    let error = first_error("a : Int : 1.5");

    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(error.get_position().column, 10);
}

#[test]
fn test_redeclaration_in_same_scope() {
    let error = first_error("a :: 1\na :: 2");

    assert_eq!(error.get_error_name(), "VariableAlreadyDeclared");
    assert_eq!(error.category(), ErrorCategory::Redeclaration);
    assert_eq!(error.get_position().line, 2);

    let error = first_error("main :: proc() { x := 1; x := 2 }");
    assert_eq!(error.category(), ErrorCategory::Redeclaration);
}

#[test]
fn test_shadowing_in_nested_scope() {
    let (program, checker) = check_ok("a :: 1\nmain :: proc() => Float { a :: 2.5; return a }");

    assert_eq!(binding_type(&program, &checker, "a"), "Int64");
    assert_eq!(binding_type(&program, &checker, "main"), "proc() => Float64");
}

#[test]
fn test_argument_shadows_global() {
    let (program, checker) = check_ok("x :: true\nid :: proc(x: Int) => Int { return x }");

    assert_eq!(binding_type(&program, &checker, "id"), "proc(Int64) => Int64");
}

#[test]
fn test_unresolved_symbol() {
    let error = first_error("a :: b");

    assert_eq!(error.get_error_name(), "VariableNotDeclared");
    assert_eq!(error.category(), ErrorCategory::UnresolvedSymbol);
}

#[test]
fn test_forward_references_are_unresolved() {
    let error = first_error("a :: b\nb :: 1");
    assert_eq!(error.category(), ErrorCategory::UnresolvedSymbol);

    let error = first_error("fact :: proc(n: Int) => Int { return n * fact(n - 1) }");
    assert_eq!(error.category(), ErrorCategory::UnresolvedSymbol);
}

const ADD: &str = "add :: proc(a: Int, b: Int) => Int { return a + b }\n";

#[test]
fn test_call() {
    let (program, checker) = check_ok(&format!("{}x :: add(1, 2)", ADD));

    assert_eq!(binding_type(&program, &checker, "x"), "Int64");
}

#[test]
fn test_call_with_too_many_arguments() {
    let error = first_error(&format!("{}x :: add(1, 2, 3)", ADD));

    assert_eq!(error.get_error_name(), "UnexpectedArguments");
    assert_eq!(error.get_position().line, 2);
    assert_eq!(error.get_position().column, 15);
}

#[test]
fn test_call_with_too_few_arguments() {
    let error = first_error(&format!("{}x :: add(1)", ADD));

    assert_eq!(error.get_error_name(), "MissingArguments");
    assert_eq!(error.get_position().column, 9);
}

#[test]
fn test_call_with_wrong_argument_type() {
    let error = first_error(&format!("{}x :: add(1, 2.5)", ADD));

    assert_eq!(error.get_error_name(), "ArgumentTypeMatchError");
    assert_eq!(error.category(), ErrorCategory::TypeMismatch);
    assert_eq!(error.get_position().line, 2);
    assert_eq!(error.get_position().column, 12);
}

#[test]
fn test_not_callable() {
    assert_eq!(first_error("a :: 1\nb :: a(1)").get_error_name(), "NotCallable");
}

#[test]
fn test_arithmetic() {
    let source = "a :: 1 + 2\nb : Int32 : 5\nc :: b * 2\nd :: 1.5 / 2.0\ne :: 7 % 3";

    assert_eq!(
        types_of(source, &["a", "c", "d", "e"]),
        vec!["Int64", "Int32", "Float64", "Int64"]
    );

    assert_eq!(first_error("a :: 1 + 2.5").get_error_name(), "InvalidOperands");
    assert_eq!(first_error("a :: true + 1").get_error_name(), "InvalidOperands");
    assert_eq!(first_error("a :: \"a\" + \"b\"").get_error_name(), "InvalidOperands");
    assert_eq!(first_error("a : Int8 : 1\nb : UInt8 : 1\nc :: a - b").get_error_name(), "InvalidOperands");
}

#[test]
fn test_comparisons_and_logic() {
    let source = "a :: 1 < 2\nb :: \"a\" == \"b\"\nc :: true && 1 >= 2\nd :: a != b || !c";

    assert_eq!(
        types_of(source, &["a", "b", "c", "d"]),
        vec!["Bool", "Bool", "Bool", "Bool"]
    );

    assert_eq!(first_error("a :: \"a\" < \"b\"").get_error_name(), "InvalidOperands");
    assert_eq!(first_error("a :: 1 == true").get_error_name(), "InvalidOperands");
    assert_eq!(first_error("a :: 1 && 2").get_error_name(), "InvalidOperands");
}

#[test]
fn test_unary_operators() {
    assert_eq!(types_of("a :: -1.5\nb :: !true\nc :: +3", &["a", "b", "c"]), vec!["Float64", "Bool", "Int64"]);

    assert_eq!(first_error("c :: !1").get_error_name(), "InvalidOperand");
    assert_eq!(first_error("d :: -true").get_error_name(), "InvalidOperand");
}

#[test]
fn test_pointers() {
    let source = "x :: 1\np :: &x\ny :: *p\nu :: ~x\nP :: &Int\nU :: ~Float";

    assert_eq!(
        types_of(source, &["p", "y", "u", "P", "U"]),
        vec!["&Int64", "Int64", "~Int64", "type &Int64", "type ~Float64"]
    );

    assert_eq!(first_error("x :: 1\nz :: *x").get_error_name(), "InvalidOperand");
}

#[test]
fn test_type_expressions() {
    let source = "Point :: struct { x: Float, y: Float }\nA :: [,]Float\nT :: (Int, Bool)\nCallback :: proc(a: Int) => Bool";

    assert_eq!(
        types_of(source, &["Point", "A", "T", "Callback"]),
        vec![
            "type struct { x: Float64, y: Float64 }",
            "type [,]Float64",
            "type (Int64, Bool)",
            "type proc(Int64) => Bool",
        ]
    );
}

#[test]
fn test_duplicate_struct_field() {
    let error = first_error("P :: struct { x: Int, x: Float }");

    assert_eq!(error.get_error_name(), "VariableAlreadyDeclared");
}

#[test]
fn test_tuple_values() {
    assert_eq!(types_of("t :: (1, 2.5)\ne :: ()", &["t", "e"]), vec!["(Int64, Float64)", "()"]);
}

#[test]
fn test_member_access() {
    let source = "Point :: struct { x: Float, y: Float }\np :: Point{1.0, 2.0}\nx :: p.x";

    assert_eq!(types_of(source, &["p", "x"]), vec!["struct { x: Float64, y: Float64 }", "Float64"]);

    let error = first_error("Point :: struct { x: Float }\np :: Point{1.0}\nz :: p.z");
    assert_eq!(error.get_error_name(), "UnknownField");
    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.get_position().column, 7);
}

#[test]
fn test_nested_member_access() {
    let source = "Inner :: struct { v: Int }\nOuter :: struct { inner: Inner }\no :: Outer{Inner{1}}\nv :: o.inner.v";

    assert_eq!(types_of(source, &["v"]), vec!["Int64"]);
}

#[test]
fn test_grouped_member_access() {
    let source = "Inner :: struct { v: Int }\nOuter :: struct { inner: Inner }\no :: Outer{Inner{1}}\nv :: (o.inner).v";

    assert_eq!(types_of(source, &["v"]), vec!["Int64"]);
}

#[test]
fn test_member_call() {
    let source = "S :: struct { f: proc(a: Int) => Int }\ng :: proc(a: Int) => Int { return a }\ns :: S{g}\nr :: s.f(1)";

    assert_eq!(types_of(source, &["r"]), vec!["Int64"]);
}

#[test]
fn test_string_and_array_fields() {
    let source = "s :: \"hello\"\nn :: s.length\nd :: s.data\na :: []Float{1.0}\nl :: a.length\nad :: a.data";

    assert_eq!(
        types_of(source, &["n", "d", "l", "ad"]),
        vec!["UInt64", "&UInt8", "UInt64", "&Float64"]
    );
}

#[test]
fn test_indexing() {
    let source = "a :: []Int{1, 2, 3}\nx :: a[0]\ns :: \"abc\"\nc :: s[1]\nm :: [,]Float{}\nf :: m[0, 1]";

    assert_eq!(types_of(source, &["a", "x", "c", "f"]), vec!["[]Int64", "Int64", "UInt8", "Float64"]);

    assert_eq!(first_error("a :: []Int{1}\nx :: a[0, 1]").get_error_name(), "SubscriptCountMismatch");
    assert_eq!(first_error("a :: []Int{1}\nx :: a[1.5]").get_error_name(), "InvalidSubscript");
    assert_eq!(first_error("n :: 1\nx :: n[0]").get_error_name(), "NotIndexable");
}

#[test]
fn test_initializers() {
    assert_eq!(first_error("a :: []Int{1, 2.5}").get_error_name(), "TypeMatchError");
    assert_eq!(first_error("P :: struct { x: Float }\np :: P{1}").get_error_name(), "FieldTypeMatchError");
    assert_eq!(first_error("P :: struct { x: Float, y: Float }\np :: P{1.0}").get_error_name(), "MissingArguments");
    assert_eq!(first_error("P :: struct { x: Float }\np :: P{1.0, 2.0}").get_error_name(), "UnexpectedArguments");
    assert_eq!(first_error("b :: Int{1}").get_error_name(), "NotInitializable");
    assert_eq!(first_error("a :: 1\nb :: a{1}").get_error_name(), "ExpectedType");
}

#[test]
fn test_assignment() {
    check_ok("main :: proc() { x := 1; x = 2; x += 3; y : Float; y = 1.5 }");
    check_ok("Point :: struct { x: Float }\nmain :: proc() { p := Point{1.0}; p.x = 2.0; a := []Int{1}; a[0] = 5 }");

    assert_eq!(first_error("main :: proc() { x :: 1; x = 2 }").get_error_name(), "AssignToConstant");
    assert_eq!(
        first_error("Point :: struct { x: Float }\np :: Point{1.0}\nmain :: proc() { p.x = 2.0 }").get_error_name(),
        "AssignToConstant"
    );
    assert_eq!(first_error("main :: proc() { 1 = 2 }").get_error_name(), "NotAssignable");
    assert_eq!(first_error("main :: proc() { x := 1; x = 2.5 }").get_error_name(), "TypeMatchError");
    assert_eq!(first_error("main :: proc() { s := \"a\"; s += \"b\" }").get_error_name(), "InvalidOperands");
}

#[test]
fn test_procedure_returns() {
    let source = "f :: proc() { return 1 }\ng :: proc() {}\ninc :: func(a: Int): a + 1\nh :: proc(a: Float) => Float { return a * 2.0 }";

    assert_eq!(
        types_of(source, &["f", "g", "inc", "h"]),
        vec!["proc() => Int64", "proc() => Void", "proc(Int64) => Int64", "proc(Float64) => Float64"]
    );

    assert_eq!(first_error("f :: proc() => Int { return 1.5 }").get_error_name(), "TypeMatchError");
    assert_eq!(first_error("f :: proc() { return 1; return true }").get_error_name(), "TypeMatchError");
    assert_eq!(first_error("f :: func() => Int: true").get_error_name(), "TypeMatchError");
}

#[test]
fn test_procedure_typed_binding() {
    let (program, checker) = check_ok("f : proc(a: Int) => Int : proc(a: Int) => Int { return a }");

    assert_eq!(binding_type(&program, &checker, "f"), "proc(Int64) => Int64");
}

#[test]
fn test_errors_continue_with_next_declaration() {
    let (program, checker, errors) = check("a :: b\nc :: d\ne :: 1");

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].get_position().line, 1);
    assert_eq!(errors[1].get_position().line, 2);
    assert_eq!(binding_type(&program, &checker, "e"), "Int64");
}

#[test]
fn test_files_share_program_scope() {
    let (program, checker, errors) = check_files(&["a :: 1", "b :: a + 1"]);

    assert!(errors.is_empty());
    assert_eq!(binding_type(&program, &checker, "b"), "Int64");

    let (_, _, errors) = check_files(&["a :: 1", "a :: 2"]);
    assert_eq!(errors[0].category(), ErrorCategory::Redeclaration);
}

#[test]
fn test_every_node_resolved_on_success() {
    let source = "Point :: struct { x: Float, y: Float }\n\
                  dot :: proc(a: Point, b: Point) => Float { return a.x * b.x + a.y * b.y }\n\
                  main :: proc() {\n\
                      p := Point{1.0, 2.0}\n\
                      values := []Int{1, 2, 3}\n\
                      total : Int = 0\n\
                      total += values[1] as Int\n\
                      d :: dot(p, Point{3.0, 4.0})\n\
                      r := &p\n\
                      return\n\
                  }";
    let (program, checker) = check_ok(source);

    assert_eq!(program.unresolved_nodes(), 0);
    assert_eq!(checker.scope_depth(), 0);
    assert_eq!(checker.return_depth(), 0);
}

#[test]
fn test_scope_depth_after_failure() {
    let (program, checker, errors) = check("main :: proc() { x := 1; y := proc() { z := missing } }\nother :: 1 + true");

    assert_eq!(errors.len(), 2);
    assert_eq!(checker.scope_depth(), 0);
    assert_eq!(checker.return_depth(), 0);
    assert!(program.unresolved_nodes() > 0);
}

#[test]
fn test_reset_clears_every_node() {
    let source = "S :: struct { f: proc(a: Int) => Int }\n\
                  g :: proc(a: Int) => Int { return a }\n\
                  s :: S{g}\n\
                  t :: (1, 2.5)\n\
                  main :: proc() { x := s.f(1); y := -x; return }";
    let (mut program, _) = check_ok(source);
    let nodes = parse(source.to_string(), "test0.lang".to_string()).unwrap().unresolved_nodes();

    program.reset();
    assert_eq!(program.unresolved_nodes(), nodes + 1);

    let (_, errors) = type_check(&mut program);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(program.unresolved_nodes(), 0);
}

#[test]
fn test_repeated_check_after_failure() {
    let (mut program, _, errors) = check("a :: 1\nb :: a + true\nc :: missing");
    assert_eq!(errors.len(), 2);

    let (checker, again) = type_check(&mut program);
    assert_eq!(again, errors);
    assert_eq!(checker.scope_depth(), 0);
}
