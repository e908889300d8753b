use crate::config::Options;
use crate::error::FlexError;
use crate::rules;
use crate::schema::{FieldOptions, TypeDesc};
use crate::value::Value;
use crate::visitor::{Direction, Visitor};

/// Conversion between one family of declared types.
///
/// Principle: the walker never knows about types. A rule claims the
/// `(source, target)` pairs it understands through [`applies`] and converts
/// values of those pairs; nested values go back through
/// [`Context::coerce`].
///
/// [`applies`]: CoercionRule::applies
pub trait CoercionRule: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn applies(&self, from: &TypeDesc, to: &TypeDesc) -> bool;

    fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError>;
}

/// Ordered set of coercion rules. The first rule that applies wins.
pub struct Registry {
    rules: Vec<Box<dyn CoercionRule>>,
}

impl Registry {
    /// A registry without any rule; every pair is a coercion error.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules.
    pub fn builtin() -> Self {
        Self {
            rules: rules::builtin(),
        }
    }

    /// Adds a rule ahead of every rule registered so far.
    pub fn register(&mut self, rule: impl CoercionRule + 'static) {
        self.rules.insert(0, Box::new(rule));
    }

    pub fn find(&self, from: &TypeDesc, to: &TypeDesc) -> Option<&dyn CoercionRule> {
        self.rules
            .iter()
            .find(|rule| rule.applies(from, to))
            .map(|rule| rule.as_ref())
    }

    pub fn coerce(
        &self,
        cx: &Context<'_>,
        value: Value,
        from: &TypeDesc,
        to: &TypeDesc,
    ) -> Result<Value, FlexError> {
        let rule = self
            .find(from, to)
            .ok_or_else(|| FlexError::coercion(from, to))?;
        tracing::trace!(rule = rule.name(), %from, %to, "coercing");
        rule.coerce(cx, value, from, to)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builtin()
    }
}

/// State of one transcode call, handed to every rule.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    registry: &'a Registry,
    options: &'a Options,
    visitor: &'a dyn Visitor,
    field: FieldOptions,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a Registry, options: &'a Options, visitor: &'a dyn Visitor) -> Self {
        Self {
            registry,
            options,
            visitor,
            field: FieldOptions::default(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.visitor.direction()
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    pub fn visitor(&self) -> &'a dyn Visitor {
        self.visitor
    }

    /// Options of the config-model field being converted.
    pub fn field(&self) -> FieldOptions {
        self.field
    }

    pub fn for_field(&self, field: FieldOptions) -> Self {
        Self { field, ..*self }
    }

    /// Converts a nested value through the registry.
    pub fn coerce(&self, value: Value, from: &TypeDesc, to: &TypeDesc) -> Result<Value, FlexError> {
        self.registry.coerce(self, value, from, to)
    }
}
