//! Concurrent access tests for `loom_system`.
//!
//! These tests verify that a `TypeAuthority` can be shared across threads.

use std::sync::{Arc, Barrier};
use std::thread;

use loom_system::prelude::*;

#[test]
fn concurrent_singleton_callers_agree_on_one_instance() {
    let authority = Arc::new(TypeAuthority::new());
    let base = ClassBuilder::new("Registry").build();
    let class = authority.compose(&base, Authority::Singleton).unwrap();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let authority = Arc::clone(&authority);
            let class = class.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                authority.construct(&class, Vec::new()).unwrap()
            })
        })
        .collect();

    let objects: Vec<Object> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .collect();

    // Racing first calls may each build, but every caller gets the cached one.
    let cached = authority.singleton(&class).unwrap();
    assert!(objects.iter().all(|object| *object == cached));
}

#[test]
fn concurrent_multiton_callers_get_unique_indices() {
    let authority = Arc::new(TypeAuthority::new());
    let base = ClassBuilder::new("Session").build();
    let class = authority.compose(&base, Authority::Multiton).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let authority = Arc::clone(&authority);
            let class = class.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    authority.construct(&class, Vec::new()).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let registry = authority.multiton_instances(&class).unwrap();
    assert_eq!(registry.len(), 80);
    assert_eq!(registry.next_value(), 80);
}

#[test]
fn objects_are_shared_across_threads() {
    let authority = TypeAuthority::new();
    let class = ClassBuilder::new("Counter").attr("count", 0).build();
    let object = authority.construct(&class, Vec::new()).unwrap();

    let handles: Vec<_> = (0..4_i64)
        .map(|i| {
            let object = object.clone();
            thread::spawn(move || {
                object.set_attr(format!("slot_{i}"), i);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(object.own_attributes().len(), 4);
    assert_eq!(object.get_attr("slot_3"), Some(Value::Int(3)));
}
