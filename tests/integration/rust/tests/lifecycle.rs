//! Runtime lifecycle across components
//!
//! After teardown every derived handle must fail with UseAfterFree rather
//! than touch freed engine state.

use engine_shim::{BindingError, FunctionExt, RuntimeState, ThreadedFunction, Value};
use integration_tests::runtime_with_context;
use js_cli::Session;
use std::thread;

fn freed<T: std::fmt::Debug>(result: Result<T, BindingError>) -> bool {
    matches!(result, Err(BindingError::UseAfterFree(_)))
}

#[test]
fn test_everything_derived_fails_after_close() {
    let (runtime, context) = runtime_with_context();
    let second = runtime.create_context().unwrap();
    context.execute("var keep = { f: function () { return 1; } };").unwrap();
    let keep = context.get("keep").unwrap();
    let f = keep.as_object().unwrap()["f"].clone();

    runtime.close().unwrap();
    assert_eq!(runtime.state(), RuntimeState::Closed);

    assert!(freed(context.eval("1")));
    assert!(freed(second.eval("1")));
    assert!(freed(f.as_function().unwrap().call(&[])));
    assert!(freed(runtime.create_context()));
    assert!(freed(runtime.memory()));

    // dropping handles after close is harmless
    drop(f);
    drop(keep);
    drop(context);
    drop(second);
}

#[test]
fn test_handles_outliving_runtime_drop() {
    let (runtime, context) = runtime_with_context();
    let f = context.eval("() => 1").unwrap();
    drop(runtime);

    assert!(freed(context.eval("1")));
    assert!(freed(f.as_function().unwrap().call(&[])));
}

#[test]
fn test_many_runtimes_create_and_close() {
    for i in 0..50 {
        let (runtime, context) = runtime_with_context();
        assert_eq!(context.eval(&format!("{} + 1", i)).unwrap(), Value::Int(i + 1));
        if i % 2 == 0 {
            runtime.close().unwrap();
        }
    }
}

#[test]
fn test_runtime_moved_to_foreign_thread_and_dropped() {
    let (runtime, context) = runtime_with_context();
    let id = runtime.id();
    thread::spawn(move || {
        assert_eq!(runtime.id(), id);
        assert!(matches!(
            runtime.gc(),
            Err(BindingError::ThreadAffinity { .. })
        ));
    })
    .join()
    .unwrap();

    assert!(freed(context.eval("1")));
}

#[test]
fn test_threaded_function_drop_joins_worker() {
    let f = ThreadedFunction::new("id", "function id(x) { return x; }").unwrap();
    assert_eq!(f.call(&[Value::from("v")]).unwrap(), Value::from("v"));
    drop(f);

    // a fresh worker still starts normally afterwards
    let g = ThreadedFunction::new("id", "function id(x) { return x; }").unwrap();
    assert_eq!(g.call(&[Value::Null]).unwrap(), Value::Null);
}

#[test]
fn test_session_owns_its_runtime() {
    let mut session = Session::new(Default::default()).unwrap();
    session.execute_string("var s = 'kept';").unwrap();
    let context_value = session.context().get("s").unwrap();
    assert_eq!(context_value, Value::from("kept"));

    session.runtime().close().unwrap();
    assert!(session.execute_string("s").is_err());
}
