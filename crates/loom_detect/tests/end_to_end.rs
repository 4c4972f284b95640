//! End-to-end detection tests for `loom_detect`.

use loom_detect::{AutoDetect, DetectExt};
use loom_system::prelude::*;

fn widget() -> Class {
    ClassBuilder::new("Widget")
        .component()
        .init(|_, object, args| {
            object.set_attr("owner", args.first().cloned().unwrap_or_default());
            Ok(())
        })
        .build()
}

/// `Container` declares `child_a` at class level and sets `child_b` in its
/// initializer.
fn container(authority: &TypeAuthority, widget: &Class) -> Class {
    let base = ClassBuilder::new("Base").build();
    let detected = authority
        .compose(&base, AutoDetect::of([widget]).unwrap())
        .unwrap();

    let built = widget.clone();
    ClassBuilder::new("Container")
        .extends(&detected)
        .attr("child_a", widget)
        .init(move |authority, object, _| {
            let child = authority.construct(&built, Vec::new())?;
            object.set_attr("child_b", child);
            Ok(())
        })
        .build()
}

#[test]
fn container_detects_class_and_instance_children() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let container = container(&authority, &widget);

    let owner = authority.construct(&container, Vec::new()).unwrap();
    let children = owner.children();
    assert_eq!(children.len(), 2);

    let found = owner.search_children_by_type(&widget);
    assert_eq!(found.len(), 2);

    let first = children.resolve(found[0]).unwrap();
    let second = children.resolve(found[1]).unwrap();
    assert!(first.is_instance_of(&widget));
    assert!(second.is_instance_of(&widget));

    // child_a was built from the bare class with the owner as argument.
    assert_eq!(owner.get_attr("child_a").as_ref().and_then(Value::as_object), Some(first));
    assert_eq!(first.get_attr("owner"), Some(Value::from(&owner)));

    // child_b is the object the initializer assigned.
    assert_eq!(owner.get_attr("child_b").as_ref().and_then(Value::as_object), Some(second));
    assert_eq!(second.get_attr("owner"), Some(Value::None));
}

#[test]
fn index_attributes_follow_registration_order() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let container = container(&authority, &widget);

    let owner = authority.construct(&container, Vec::new()).unwrap();
    let found = owner.search_children_by_type(&widget);

    assert_eq!(owner.get_attr("child_0"), Some(Value::Index(found[0])));
    assert_eq!(owner.get_attr("child_1"), Some(Value::Index(found[1])));
    assert_eq!(found[0].value(), 0);
    assert_eq!(found[1].value(), 1);
}

#[test]
fn children_are_private_to_each_owner() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let container = container(&authority, &widget);

    let first = authority.construct(&container, Vec::new()).unwrap();
    let second = authority.construct(&container, Vec::new()).unwrap();

    let from_first = first.search_children_by_type(&widget);
    assert!(second.children().resolve(from_first[0]).is_none());
    assert_ne!(
        first.get_attr("child_a"),
        second.get_attr("child_a"),
        "each owner builds its own child_a"
    );
}

#[test]
fn bare_multiton_subclass_is_never_instantiated() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let pooled = authority.compose(&widget, Authority::Multiton).unwrap();

    let base = ClassBuilder::new("Base").build();
    let detected = authority
        .compose(&base, AutoDetect::of([&widget]).unwrap())
        .unwrap();
    let holder = ClassBuilder::new("Holder")
        .extends(&detected)
        .attr("pooled", &pooled)
        .build();

    let owner = authority.construct(&holder, Vec::new()).unwrap();

    assert!(owner.children().is_empty());
    assert_eq!(owner.get_attr("pooled"), Some(Value::from(&pooled)));
    assert!(authority.multiton_instances(&pooled).is_none());
}

#[test]
fn existing_multiton_instance_is_registered() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let pooled = authority.compose(&widget, Authority::Multiton).unwrap();
    let instance = authority.construct(&pooled, Vec::new()).unwrap();

    let base = ClassBuilder::new("Base").build();
    let detected = authority
        .compose(&base, AutoDetect::of([&widget]).unwrap())
        .unwrap();
    let holder = ClassBuilder::new("Holder")
        .extends(&detected)
        .attr("pooled", &instance)
        .build();

    let owner = authority.construct(&holder, Vec::new()).unwrap();
    let found = owner.search_children_by_type(&pooled);

    assert_eq!(found.len(), 1);
    assert_eq!(owner.children().resolve(found[0]), Some(&instance));
}

#[test]
fn owner_without_matches_has_an_empty_registry() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let base = ClassBuilder::new("Base").attr("title", "none").build();
    let detected = authority
        .compose(&base, AutoDetect::of([&widget]).unwrap())
        .unwrap();

    let owner = authority.construct(&detected, Vec::new()).unwrap();
    assert!(owner.children().is_empty());
    assert!(owner.search_children_by_type(&widget).is_empty());
    assert!(owner.get_attr("child_0").is_none());
}

#[test]
fn search_method_is_callable_through_the_attribute_table() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let container = container(&authority, &widget);
    let owner = authority.construct(&container, Vec::new()).unwrap();

    let result = owner
        .call("search_children_by_type", &[Value::from(&widget)])
        .unwrap();
    let indices: Vec<_> = result
        .as_list()
        .unwrap()
        .iter()
        .filter_map(Value::as_index)
        .collect();
    assert_eq!(indices, owner.search_children_by_type(&widget));

    assert!(owner.call("search_children_by_type", &[]).is_err());
}

#[test]
fn detect_target_is_readable_from_the_owner() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let container = container(&authority, &widget);

    let targets = container.get_attr("detect_target").unwrap();
    assert_eq!(targets, Value::from(vec![Value::from(&widget)]));
}

#[test]
fn custom_child_prefix_is_applied() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let detector = AutoDetect::builder()
        .target(&widget)
        .child_prefix("slot_")
        .build()
        .unwrap();

    let base = ClassBuilder::new("Base").attr("main", &widget).build();
    let detected = authority.compose(&base, detector).unwrap();
    let owner = authority.construct(&detected, Vec::new()).unwrap();

    assert!(owner.get_attr("slot_0").is_some());
    assert!(owner.get_attr("child_0").is_none());
}

#[test]
fn child_construction_errors_abort_the_owner() {
    let authority = TypeAuthority::new();
    let fragile = ClassBuilder::new("Fragile")
        .component()
        .init(|_, _, _| Err(ObjectError::custom("no parent window")))
        .build();

    let base = ClassBuilder::new("Base").attr("part", &fragile).build();
    let detected = authority
        .compose(&base, AutoDetect::of([&fragile]).unwrap())
        .unwrap();

    let error = authority.construct(&detected, Vec::new()).unwrap_err();
    assert_eq!(error.to_string(), "no parent window");
}

#[test]
fn subclass_targets_are_detected() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let button = ClassBuilder::new("Button").extends(&widget).build();

    let base = ClassBuilder::new("Base")
        .attr("ok", &button)
        .attr("label", &widget)
        .build();
    let detected = authority
        .compose(&base, AutoDetect::of([&widget]).unwrap())
        .unwrap();
    let owner = authority.construct(&detected, Vec::new()).unwrap();

    assert_eq!(owner.search_children_by_type(&widget).len(), 2);
    assert_eq!(owner.search_children_by_type(&button).len(), 1);
}

#[test]
fn singleton_owner_scans_once() {
    let authority = TypeAuthority::new();
    let widget = widget();
    let container = container(&authority, &widget);
    let single = authority.compose(&container, Authority::Singleton).unwrap();

    let first = authority.construct(&single, Vec::new()).unwrap();
    let again = authority.construct(&single, Vec::new()).unwrap();

    assert_eq!(first, again);
    assert_eq!(again.children().len(), 2);
}
