//! Shallow signatures of classes and functions without source.
//!
//! Vendor code and PHP builtins are described by what reflection sees:
//! parameter and return hints plus whatever doc templates the provider
//! could read. Type names are fully qualified.

use pinfer_ast::{TemplateDecl, TypeHint};

#[derive(Clone, Debug, PartialEq)]
pub struct ReflectedParam {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub has_default: bool,
    pub variadic: bool,
}

impl ReflectedParam {
    pub fn new(name: impl Into<String>, type_hint: Option<TypeHint>) -> Self {
        ReflectedParam {
            name: name.into(),
            type_hint,
            has_default: false,
            variadic: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReflectedMethod {
    pub name: String,
    pub params: Vec<ReflectedParam>,
    /// May use `self`, `static` and `parent`.
    pub return_type: Option<TypeHint>,
    pub templates: Vec<TemplateDecl>,
    pub is_static: bool,
}

impl ReflectedMethod {
    pub fn new(name: impl Into<String>, return_type: Option<TypeHint>) -> Self {
        ReflectedMethod {
            name: name.into(),
            params: Vec::new(),
            return_type,
            templates: Vec::new(),
            is_static: false,
        }
    }

    pub fn with_param(mut self, param: ReflectedParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_template(mut self, template: TemplateDecl) -> Self {
        self.templates.push(template);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReflectedProperty {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReflectedClass {
    pub name: String,
    pub parent: Option<String>,
    pub extends_args: Vec<TypeHint>,
    pub interfaces: Vec<String>,
    pub templates: Vec<TemplateDecl>,
    pub properties: Vec<ReflectedProperty>,
    pub methods: Vec<ReflectedMethod>,
}

impl ReflectedClass {
    pub fn new(name: impl Into<String>) -> Self {
        ReflectedClass {
            name: name.into(),
            parent: None,
            extends_args: Vec::new(),
            interfaces: Vec::new(),
            templates: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_template(mut self, template: TemplateDecl) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, type_hint: Option<TypeHint>) -> Self {
        self.properties.push(ReflectedProperty {
            name: name.into(),
            type_hint,
            is_static: false,
        });
        self
    }

    pub fn with_method(mut self, method: ReflectedMethod) -> Self {
        self.methods.push(method);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReflectedFunction {
    pub name: String,
    pub params: Vec<ReflectedParam>,
    pub return_type: Option<TypeHint>,
    pub templates: Vec<TemplateDecl>,
}

impl ReflectedFunction {
    pub fn new(name: impl Into<String>, return_type: Option<TypeHint>) -> Self {
        ReflectedFunction {
            name: name.into(),
            params: Vec::new(),
            return_type,
            templates: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ReflectedParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_template(mut self, template: TemplateDecl) -> Self {
        self.templates.push(template);
        self
    }
}
