// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E2001))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("undefined variable '{name}'")]
    #[diagnostic(code(E2002))]
    UndefinedVariable {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("unknown type '{name}'")]
    #[diagnostic(code(E2003))]
    UnknownType {
        name: String,
        #[label("no class or interface with this name")]
        span: SourceSpan,
    },

    #[error("'{name}' is already declared")]
    #[diagnostic(code(E2004))]
    DuplicateType {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
        #[label("first declared here")]
        first: SourceSpan,
    },

    #[error("field '{name}' is already declared in '{class}'")]
    #[diagnostic(code(E2005))]
    DuplicateField {
        class: String,
        name: String,
        #[label("duplicate field")]
        span: SourceSpan,
    },

    #[error("method '{signature}' is already declared in '{owner}'")]
    #[diagnostic(code(E2006))]
    DuplicateMethod {
        owner: String,
        signature: String,
        #[label("duplicate method")]
        span: SourceSpan,
    },

    #[error("variable '{name}' is already declared in this method")]
    #[diagnostic(code(E2007))]
    DuplicateVariable {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
    },

    #[error("class '{class}' inherits from itself")]
    #[diagnostic(code(E2008), help("the superclass chain must end at a class without 'extends'"))]
    HierarchyCycle {
        class: String,
        #[label("cycle in class hierarchy")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a class")]
    #[diagnostic(code(E2009), help("a class can only extend another class"))]
    SuperclassNotClass {
        name: String,
        #[label("expected a class")]
        span: SourceSpan,
    },

    #[error("'{name}' is not an interface")]
    #[diagnostic(code(E2010), help("only interfaces can appear after 'implements'"))]
    NotAnInterface {
        name: String,
        #[label("expected an interface")]
        span: SourceSpan,
    },

    #[error("incompatible override of '{signature}' in '{class}': {reason}")]
    #[diagnostic(code(E2011))]
    IncompatibleOverride {
        class: String,
        signature: String,
        reason: String,
        #[label("incompatible with the inherited method")]
        span: SourceSpan,
    },

    #[error("class '{class}' does not implement '{interface}.{signature}'")]
    #[diagnostic(
        code(E2012),
        help("add an instance method with the same name, parameter types and return type")
    )]
    InterfaceMethodUnimplemented {
        class: String,
        interface: String,
        signature: String,
        #[label("missing interface method")]
        span: SourceSpan,
    },

    #[error("method '{method}({args})' not found on type '{receiver}'")]
    #[diagnostic(code(E2013))]
    MethodNotFound {
        receiver: String,
        method: String,
        args: String,
        #[label("no applicable method")]
        span: SourceSpan,
    },

    #[error("ambiguous call to '{method}' on type '{receiver}'")]
    #[diagnostic(code(E2014), help("candidates: {candidates}"))]
    AmbiguousCall {
        receiver: String,
        method: String,
        candidates: String,
        #[label("more than one method is most specific")]
        span: SourceSpan,
    },

    #[error("type '{ty}' has no field '{field}'")]
    #[diagnostic(code(E2015))]
    UndefinedField {
        ty: String,
        field: String,
        #[label("unknown field")]
        span: SourceSpan,
    },

    #[error("expected an object, found {found}")]
    #[diagnostic(code(E2016))]
    NotAnObject {
        found: String,
        #[label("not a class or interface type")]
        span: SourceSpan,
    },

    #[error("condition must be boolean, found {found}")]
    #[diagnostic(code(E2017))]
    ConditionNotBool {
        found: String,
        #[label("expected boolean")]
        span: SourceSpan,
    },

    #[error("return type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(E2018))]
    ReturnTypeMismatch {
        expected: String,
        found: String,
        #[label("wrong return type")]
        span: SourceSpan,
    },

    #[error("method '{method}' may finish without returning a value")]
    #[diagnostic(code(E2019), help("every path through a non-void method must return"))]
    MissingReturn {
        method: String,
        #[label("missing return")]
        span: SourceSpan,
    },

    #[error("'this' cannot be used in a static context")]
    #[diagnostic(code(E2020))]
    ThisInStaticContext {
        #[label("no instance here")]
        span: SourceSpan,
    },

    #[error("instance member '{name}' cannot be used in a static context")]
    #[diagnostic(code(E2021))]
    InstanceMemberInStaticContext {
        name: String,
        #[label("requires an instance")]
        span: SourceSpan,
    },

    #[error("instance field '{field}' cannot have an initializer")]
    #[diagnostic(code(E2022), help("assign the field in a constructor instead"))]
    InstanceFieldInitializer {
        field: String,
        #[label("initializer not allowed")]
        span: SourceSpan,
    },

    #[error("no constructor '{class}({args})' found")]
    #[diagnostic(code(E2023))]
    ConstructorNotFound {
        class: String,
        args: String,
        #[label("no applicable constructor")]
        span: SourceSpan,
    },

    #[error("ambiguous constructor call for '{class}'")]
    #[diagnostic(code(E2024), help("candidates: {candidates}"))]
    AmbiguousConstructor {
        class: String,
        candidates: String,
        #[label("more than one constructor is most specific")]
        span: SourceSpan,
    },

    #[error("superclass '{superclass}' of '{class}' has no zero-argument constructor")]
    #[diagnostic(code(E2025), help("constructors implicitly call the superclass constructor with no arguments"))]
    MissingSuperConstructor {
        class: String,
        superclass: String,
        #[label("cannot chain to the superclass")]
        span: SourceSpan,
    },

    #[error("cannot instantiate interface '{name}'")]
    #[diagnostic(code(E2026))]
    InstantiateInterface {
        name: String,
        #[label("interfaces have no constructors")]
        span: SourceSpan,
    },

    #[error("no entry point found")]
    #[diagnostic(code(E2027), help("declare 'static void main()' in one class"))]
    NoEntryPoint,

    #[error("more than one entry point: {classes}")]
    #[diagnostic(code(E2028), help("select one with '--main <CLASS>'"))]
    AmbiguousEntryPoint { classes: String },

    #[error("class '{class}' has no 'static void main()' method")]
    #[diagnostic(code(E2029))]
    InvalidEntryPoint { class: String },
}
