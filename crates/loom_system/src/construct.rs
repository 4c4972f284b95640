//! The default construction path.
//!
//! Every authority ends up here, so the hook chain runs exactly once for each
//! freshly built object, whatever policy the class is bound to.

use crate::authority::TypeAuthority;
use crate::class::Class;
use crate::object::{Object, ObjectError};
use crate::value::Value;

impl TypeAuthority {
    /// Builds a fresh instance of `class`, bypassing its authority.
    ///
    /// 1. Allocates the object and runs every initializer along the ancestry,
    ///    most general first.
    /// 2. Appends the arguments saved by the initializers to `args`.
    /// 3. Runs every pre hook, then every post hook, with those arguments.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error raised by an initializer or a
    /// hook. The partially built object is dropped.
    pub fn construct_default(&self, class: &Class, mut args: Vec<Value>) -> Result<Object, ObjectError> {
        let _span = tracing::debug_span!(target: "loom::construct", "construct", class = %class.name())
            .entered();

        let object = Object::allocate(class.clone());
        for ancestor in class.ancestry().iter().rev() {
            if let Some(init) = ancestor.initializer() {
                init(self, &object, &args)?;
            }
        }

        if let Some(saved) = object.saved_args() {
            args.extend(saved);
        }

        let hooks = class.hooks();
        for hook in hooks.pre() {
            hook(self, class, &object, &args)?;
        }
        for hook in hooks.post() {
            hook(self, &object, &args)?;
        }

        tracing::trace!(
            target: "loom::construct",
            class = %class.name(),
            object = object.id().get(),
            pre = hooks.pre().len(),
            post = hooks.post().len(),
            "constructed object"
        );

        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use crate::authority::TypeAuthority;
    use crate::class::ClassBuilder;
    use crate::mixin::Mixin;
    use crate::object::ObjectError;
    use crate::value::Value;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn initializers_run_general_first() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (root_order, leaf_order) = (Arc::clone(&order), Arc::clone(&order));

        let root = ClassBuilder::new("Root")
            .init(move |_, _, _| {
                root_order.lock().push("root");
                Ok(())
            })
            .build();
        let leaf = ClassBuilder::new("Leaf")
            .extends(&root)
            .init(move |_, _, _| {
                leaf_order.lock().push("leaf");
                Ok(())
            })
            .build();

        TypeAuthority::new().construct(&leaf, Vec::new()).unwrap();
        assert_eq!(*order.lock(), vec!["root", "leaf"]);
    }

    #[test]
    fn hooks_see_saved_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let echo = Mixin::builder("Echo")
            .post_construct(move |_, _, args| {
                sink.lock().extend_from_slice(args);
                Ok(())
            })
            .build();
        let app = ClassBuilder::new("App")
            .init(|_, object, _| {
                object.save_args(vec![Value::from("saved")]);
                Ok(())
            })
            .build();

        let authority = TypeAuthority::new();
        let app = authority.compose(&app, echo).unwrap();
        authority.construct(&app, vec![Value::from("given")]).unwrap();

        assert_eq!(
            *seen.lock(),
            vec![Value::from("given"), Value::from("saved")]
        );
    }

    #[test]
    fn pre_hooks_run_before_post_hooks() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (pre_order, post_order) = (Arc::clone(&order), Arc::clone(&order));

        // Post hook is applied first, yet still runs after the pre hook.
        let late = Mixin::builder("Late")
            .post_construct(move |_, _, _| {
                post_order.lock().push("post");
                Ok(())
            })
            .build();
        let early = Mixin::builder("Early")
            .pre_construct(move |_, _, _, _| {
                pre_order.lock().push("pre");
                Ok(())
            })
            .build();

        let base = ClassBuilder::new("Panel").build();
        let panel = base.compose((late, early)).unwrap();
        TypeAuthority::new().construct(&panel, Vec::new()).unwrap();

        assert_eq!(*order.lock(), vec!["pre", "post"]);
    }

    #[test]
    fn hooks_run_in_application_order_across_compositions() {
        let order = Arc::new(Mutex::new(Vec::<String>::new()));
        let traced = |name: &'static str| {
            let (pre_order, post_order) = (Arc::clone(&order), Arc::clone(&order));
            Mixin::builder(name)
                .pre_construct(move |_, _, _, _| {
                    pre_order.lock().push(format!("pre{name}"));
                    Ok(())
                })
                .post_construct(move |_, _, _| {
                    post_order.lock().push(format!("post{name}"));
                    Ok(())
                })
                .build()
        };
        let (a, b, c) = (traced("A"), traced("B"), traced("C"));

        // A is applied again in the second call and must not run twice.
        let base = ClassBuilder::new("Window").build();
        let ab = base.compose((&a, &b)).unwrap();
        let abc = ab.compose((&c, &a)).unwrap();
        TypeAuthority::new().construct(&abc, Vec::new()).unwrap();

        assert_eq!(
            *order.lock(),
            vec!["preA", "preB", "preC", "postA", "postB", "postC"]
        );
    }

    #[test]
    fn initializer_errors_propagate_unchanged() {
        let broken = ClassBuilder::new("Broken")
            .init(|_, _, _| Err(ObjectError::custom("no display")))
            .build();

        let error = TypeAuthority::new()
            .construct(&broken, Vec::new())
            .unwrap_err();
        assert_eq!(error.to_string(), "no display");
    }
}
