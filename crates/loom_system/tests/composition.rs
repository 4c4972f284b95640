//! Composition tests for `loom_system`.

use loom_system::prelude::*;

fn panel() -> Class {
    ClassBuilder::new("Panel").attr("title", "panel").build()
}

#[test]
fn authority_binding_is_recorded_on_the_class() {
    let authority = TypeAuthority::new();
    let base = panel();

    let single = authority.compose(&base, Authority::Singleton).unwrap();

    assert_eq!(single.authority(), Some(Authority::Singleton));
    assert!(authority.has_traits(&single, Authority::Singleton));
    assert!(!authority.has_traits(&base, Authority::Singleton));
    assert!(single.ancestry().iter().all(|class| class.authority().is_none() || class == &single));
}

#[test]
fn recomposition_with_an_applied_mixin_changes_nothing() {
    let authority = TypeAuthority::new();
    let first = Mixin::builder("First")
        .attr("first", 1)
        .pre_construct(|_, _, _, _| Ok(()))
        .build();
    let second = Mixin::builder("Second")
        .attr("second", 2)
        .post_construct(|_, _, _| Ok(()))
        .build();

    let composed = authority.compose(&panel(), (&first, &second)).unwrap();
    let again = authority.compose(&composed, &first).unwrap();

    assert!(again.has_traits((&first, &second)));
    assert_eq!(again.applied_mixins(), composed.applied_mixins());
    assert_eq!(again.hooks().len(), composed.hooks().len());
    assert_eq!(
        authority.gather_ancestry_attributes(&again),
        authority.gather_ancestry_attributes(&composed)
    );
}

#[test]
fn two_authorities_in_one_request_produce_no_class() {
    let authority = TypeAuthority::new();
    let result = authority.compose(&panel(), [Authority::Singleton, Authority::Multiton]);

    assert!(matches!(
        result,
        Err(CompositionError::MultipleAuthorities { ref authorities, .. }) if authorities.len() == 2
    ));
}

#[test]
fn authority_survives_subclassing_and_cannot_be_swapped() {
    let authority = TypeAuthority::new();
    let single = authority.compose(&panel(), Authority::Singleton).unwrap();
    let child = ClassBuilder::new("Inspector").extends(&single).build();

    assert_eq!(child.authority(), Some(Authority::Singleton));
    let error = authority.compose(&child, Authority::Multiton).unwrap_err();
    assert_eq!(
        error.to_string(),
        "'Inspector' is already bound to Singleton, cannot rebind to Multiton"
    );
}

#[test]
fn gathered_attributes_follow_the_chain() {
    let sized = Mixin::builder("Sized").attr("width", 100).build();
    let base = panel();
    let composed = base.compose(sized).unwrap();
    let child = ClassBuilder::new("Sidebar")
        .extends(&composed)
        .attr("title", "sidebar")
        .build();

    let members = child.gather_ancestry_attributes();
    let names: Vec<_> = members.keys().map(String::as_str).collect();

    assert_eq!(names, vec!["title", "width"]);
    assert_eq!(members["title"], Value::from("sidebar"));
    assert_eq!(members["width"], Value::Int(100));
}

#[test]
fn mixin_methods_are_callable_on_instances() {
    let greeter = Mixin::builder("Greeter")
        .method("greet", |receiver, _| {
            let title = receiver.attr("title")?;
            Ok(Value::from(format!("hello {}", title.as_str().unwrap_or_default())))
        })
        .build();

    let authority = TypeAuthority::new();
    let class = authority.compose(&panel(), greeter).unwrap();
    let object = authority.construct(&class, Vec::new()).unwrap();

    assert_eq!(object.call("greet", &[]).unwrap(), Value::from("hello panel"));
}
