//! Function, class and file declarations.

use crate::hint::TypeHint;
use crate::names::NameTable;
use crate::node::{Expr, Stmt};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    /// `@param` type; wins over the native hint.
    pub doc_type: Option<TypeHint>,
    pub default: Option<Expr>,
    pub variadic: bool,
    pub by_ref: bool,
    /// Set for promoted constructor parameters.
    pub promoted: Option<Visibility>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            type_hint: None,
            doc_type: None,
            default: None,
            variadic: false,
            by_ref: false,
            promoted: None,
        }
    }

    /// The type the author declared, doc tag first.
    pub fn declared_type(&self) -> Option<&TypeHint> {
        self.doc_type.as_ref().or(self.type_hint.as_ref())
    }
}

/// `@template T of Bound = Default`
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateDecl {
    pub name: String,
    pub bound: Option<TypeHint>,
    pub default: Option<TypeHint>,
}

impl TemplateDecl {
    pub fn new(name: impl Into<String>) -> Self {
        TemplateDecl {
            name: name.into(),
            bound: None,
            default: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    pub doc_return: Option<TypeHint>,
    pub doc_throws: Vec<TypeHint>,
    pub templates: Vec<TemplateDecl>,
    pub body: Vec<Stmt>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub visibility: Visibility,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionDecl {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            doc_return: None,
            doc_throws: Vec::new(),
            templates: Vec::new(),
            body: Vec::new(),
            is_static: false,
            is_abstract: false,
            visibility: Visibility::Public,
        }
    }

    pub fn declared_return(&self) -> Option<&TypeHint> {
        self.doc_return.as_ref().or(self.return_type.as_ref())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
    Enum,
}

/// `use SomeTrait;` inside a class body, with `@use SomeTrait<Args>` arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct TraitUse {
    pub name: String,
    pub type_args: Vec<TypeHint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    /// `@var` type; wins over the native hint.
    pub doc_type: Option<TypeHint>,
    pub default: Option<Expr>,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>) -> Self {
        PropertyDecl {
            name: name.into(),
            type_hint: None,
            doc_type: None,
            default: None,
            is_static: false,
            visibility: Visibility::Public,
        }
    }

    pub fn declared_type(&self) -> Option<&TypeHint> {
        self.doc_type.as_ref().or(self.type_hint.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassConstDecl {
    pub name: String,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    /// Fully-qualified name.
    pub name: String,
    pub kind: ClassKind,
    /// Parent name as written; resolved through the file's name table.
    pub parent: Option<String>,
    /// `@extends Parent<Args>`.
    pub extends_args: Vec<TypeHint>,
    pub interfaces: Vec<String>,
    pub traits: Vec<TraitUse>,
    pub templates: Vec<TemplateDecl>,
    pub properties: Vec<PropertyDecl>,
    pub constants: Vec<ClassConstDecl>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub is_abstract: bool,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDecl {
            name: name.into(),
            kind: ClassKind::Class,
            parent: None,
            extends_args: Vec::new(),
            interfaces: Vec::new(),
            traits: Vec::new(),
            templates: Vec::new(),
            properties: Vec::new(),
            constants: Vec::new(),
            methods: Vec::new(),
            is_abstract: false,
        }
    }

    pub fn method(&self, name: &str) -> Option<&Rc<FunctionDecl>> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// One parsed file: its name table plus the declarations it contains.
#[derive(Clone, Debug, Default)]
pub struct SourceFile {
    pub names: Rc<NameTable>,
    pub classes: Vec<Rc<ClassDecl>>,
    pub functions: Vec<Rc<FunctionDecl>>,
}

impl SourceFile {
    pub fn new(names: NameTable) -> Self {
        SourceFile {
            names: Rc::new(names),
            classes: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(Rc::new(class));
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(Rc::new(function));
        self
    }
}
