/// AST (Abstract Syntax Tree) module
/// Contains the syntax tree shared by the parser and the type checker
///
/// Submodules:
/// - ast: resolved-type slots and the `Typed` walker
/// - expressions: expression nodes and operator definitions
/// - statements: bindings, blocks, procedures, files and the program root
pub mod ast;
pub mod expressions;
pub mod statements;
