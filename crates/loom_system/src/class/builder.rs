use super::{Class, ClassData, ClassId, Initializer};
use crate::authority::TypeAuthority;
use crate::mixin::HookChain;
use crate::object::{Object, ObjectError};
use crate::value::{Attributes, Method, Value};
use hashbrown::HashSet;
use std::sync::Arc;

/// Declares a new class.
///
/// A class built with [`extends`](Self::extends) inherits its parent's
/// attributes through lookup, and copies its parent's composition record:
/// applied mixins, bound authority, hook chain and component capability.
///
/// # Example
///
/// ```
/// use loom_system::authority::TypeAuthority;
/// use loom_system::class::ClassBuilder;
/// use loom_system::value::Value;
///
/// let label = ClassBuilder::new("Label")
///     .attr("text", "")
///     .init(|_authority, object, args| {
///         if let Some(text) = args.first() {
///             object.set_attr("text", text.clone());
///         }
///         Ok(())
///     })
///     .build();
///
/// let authority = TypeAuthority::new();
/// let hello = authority.construct(&label, vec![Value::from("hello")]).unwrap();
/// assert_eq!(hello.get_attr("text"), Some(Value::from("hello")));
/// ```
#[must_use]
pub struct ClassBuilder {
    name: String,
    parent: Option<Class>,
    attributes: Attributes,
    initializer: Option<Initializer>,
    component: bool,
}

impl ClassBuilder {
    /// Starts a class with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Attributes::new(),
            initializer: None,
            component: false,
        }
    }

    /// Sets the parent class.
    pub fn extends(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declares a class-level attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Declares a class-level method.
    pub fn method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, ObjectError> + Send + Sync + 'static,
    {
        let name = name.into();
        let method = Method::new(name.as_str(), func);
        self.attributes.insert(name, Value::Method(method));
        self
    }

    /// Sets the class's own initializer.
    ///
    /// Initializers are not overridden. Construction runs the initializer of
    /// every class in the ancestry, most general first, so a subclass
    /// initializer runs after its parent's and can only add to or overwrite
    /// what the parent set.
    pub fn init<F>(mut self, func: F) -> Self
    where
        F: Fn(&TypeAuthority, &Object, &[Value]) -> Result<(), ObjectError> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(func));
        self
    }

    /// Marks the class as a component, making it a valid detection target.
    pub fn component(mut self) -> Self {
        self.component = true;
        self
    }

    /// Builds the class descriptor.
    pub fn build(self) -> Class {
        let (applied, mixin_names, authority, hooks, inherited_component) = match &self.parent {
            Some(parent) => (
                parent.applied_mixins().to_vec(),
                parent.mixin_names().clone(),
                parent.authority(),
                parent.hooks().clone(),
                parent.is_component(),
            ),
            None => (
                Vec::new(),
                HashSet::new(),
                None,
                HookChain::default(),
                false,
            ),
        };

        let class = Class::from_data(ClassData {
            id: ClassId::next(),
            name: self.name,
            parent: self.parent,
            attributes: self.attributes,
            initializer: self.initializer,
            applied,
            mixin_names,
            authority,
            hooks,
            component: self.component || inherited_component,
        });

        tracing::debug!(
            target: "loom::compose",
            class = %class.name(),
            parent = ?class.parent().map(Class::name),
            "declared class"
        );

        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::Authority;
    use crate::mixin::Mixin;

    #[test]
    fn subclass_inherits_composition_record() {
        let sized = Mixin::builder("Sized").attr("width", 4).build();
        let base = ClassBuilder::new("Panel").component().build();
        let composed = base.compose((sized.clone(), Authority::Multiton)).unwrap();

        let child = ClassBuilder::new("Sidebar").extends(&composed).build();

        assert!(child.has_mixin(&sized));
        assert_eq!(child.authority(), Some(Authority::Multiton));
        assert!(child.is_component());
        assert_eq!(child.get_attr("width"), Some(Value::Int(4)));
    }

    #[test]
    fn initializer_is_not_inherited_as_own() {
        let base = ClassBuilder::new("Base").init(|_, _, _| Ok(())).build();
        let child = ClassBuilder::new("Child").extends(&base).build();

        assert!(base.initializer().is_some());
        assert!(child.initializer().is_none());
    }

    #[test]
    fn subclass_initializer_runs_after_parent() {
        let base = ClassBuilder::new("Base")
            .init(|_, object, _| {
                object.set_attr("kind", "base");
                object.set_attr("ready", true);
                Ok(())
            })
            .build();
        let child = ClassBuilder::new("Child")
            .extends(&base)
            .init(|_, object, _| {
                object.set_attr("kind", "child");
                Ok(())
            })
            .build();

        let object = TypeAuthority::new().construct(&child, Vec::new()).unwrap();
        assert_eq!(object.get_attr("kind"), Some(Value::from("child")));
        assert_eq!(object.get_attr("ready"), Some(Value::from(true)));
    }

    #[test]
    fn method_attribute_is_named() {
        let class = ClassBuilder::new("Counter")
            .method("zero", |_, _| Ok(Value::Int(0)))
            .build();

        let method = class.get_attr("zero").unwrap();
        assert_eq!(method.as_method().map(Method::name), Some("zero"));
    }
}
