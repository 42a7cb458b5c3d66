//! Unit tests for runtime affinity and function handles

use core_types::{Affinity, BindingError, FunctionRef, Release, RuntimeState, Value};
use std::thread;

#[test]
fn test_affinity_starts_active() {
    let affinity = Affinity::new();
    assert_eq!(affinity.state(), RuntimeState::Active);
    assert_eq!(affinity.owner(), thread::current().id());
}

#[test]
fn test_thread_is_checked_before_liveness() {
    let affinity = Affinity::new();
    affinity.close();
    let remote = affinity.clone();
    let result = thread::spawn(move || remote.check()).join().unwrap();
    assert!(matches!(result, Err(BindingError::ThreadAffinity { .. })));
}

#[test]
fn test_function_refs_compare_by_slot() {
    let affinity = Affinity::new();
    let a = FunctionRef::new(affinity.clone(), 1);
    let b = FunctionRef::new(affinity.clone(), 1);
    let c = FunctionRef::new(affinity.clone(), 2);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(Value::from(a.clone()), Value::Function(a));
}

#[test]
fn test_release_from_other_thread_is_queued() {
    let affinity = Affinity::new();
    let func = FunctionRef::new(affinity.clone(), 3);
    thread::spawn(move || drop(func)).join().unwrap();
    assert_eq!(affinity.take_released(), vec![Release::Function(3)]);
}

#[test]
fn test_value_with_function_reports_it() {
    let affinity = Affinity::new();
    let func = FunctionRef::new(affinity, 9);
    let value: Value = [("cb", Value::Function(func))].into_iter().collect();
    assert!(value.contains_function());
    assert!(value.to_json().is_err());
}
