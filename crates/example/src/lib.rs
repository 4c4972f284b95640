//! An application window assembled from composed classes.
//!
//! - `Panel` is a component class. Each panel records the frame that owns it.
//! - `Document` is a `Panel` bound to the Multiton authority: every open
//!   document is its own indexed instance.
//! - `Frame` is a Singleton with a fixed size that auto-detects its panels.
//!   It declares a `sidebar` panel class and, in its initializer, opens a
//!   `Document` for every title it is given.

use loom_detect::AutoDetect;
use loom_system::prelude::*;

/// The classes of the demo application.
#[derive(Debug, Clone)]
pub struct Classes {
    /// Component base of everything the frame detects.
    pub panel: Class,
    /// Multiton panel, one instance per open document.
    pub document: Class,
    /// The application's main window.
    pub frame: Class,
}

/// Copies `size` into `size_min` and `size_max` after construction.
#[must_use]
pub fn fixed_size() -> Mixin {
    Mixin::builder("FixedSize")
        .post_construct(|_, object, _| {
            let size = object.attr("size")?;
            object.set_attr("size_min", size.clone());
            object.set_attr("size_max", size);
            Ok(())
        })
        .build()
}

/// Declares and composes the demo classes.
///
/// # Errors
///
/// Returns a [`CompositionError`] if a composition is rejected.
pub fn classes(authority: &TypeAuthority) -> Result<Classes, CompositionError> {
    let panel = ClassBuilder::new("Panel")
        .component()
        .init(|_, object, args| {
            object.set_attr("owner", args.first().cloned().unwrap_or_default());
            Ok(())
        })
        .build();

    let document = ClassBuilder::new("Document")
        .extends(&panel)
        .init(|_, object, args| {
            let title = args.get(1).cloned().unwrap_or_else(|| Value::from("untitled"));
            object.set_attr("title", title);
            Ok(())
        })
        .build();
    let document = authority.compose(&document, Authority::Multiton)?;

    let detected = authority.compose(
        &ClassBuilder::new("Window").attr("size", vec![Value::Int(800), Value::Int(600)]).build(),
        (AutoDetect::of([&panel])?, fixed_size(), Authority::Singleton),
    )?;

    let documents = document.clone();
    let frame = ClassBuilder::new("Frame")
        .extends(&detected)
        .attr("sidebar", &panel)
        .init(move |authority, object, args| {
            for (slot, title) in args.iter().enumerate() {
                let opened = authority.construct(&documents, vec![Value::from(object), title.clone()])?;
                object.set_attr(format!("document_{slot}"), opened);
            }
            Ok(())
        })
        .build();

    Ok(Classes {
        panel,
        document,
        frame,
    })
}
