//! Thread affinity across components
//!
//! Engine handles may be moved and shared between threads, but only the
//! creating thread can use them. ThreadedFunction is the way to reach an
//! engine from many threads.

use engine_shim::{BindingError, FunctionExt, Runtime, ThreadedFunction, Value};
use rand::Rng;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn test_affinity_is_deterministic_under_random_scheduling() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let context = Arc::new(runtime.create_context().unwrap());
    let f = context.eval("(x => x * 2)").unwrap();

    for round in 0..8 {
        let threads = rand::thread_rng().gen_range(2..6);
        let barrier = Arc::new(Barrier::new(threads + 1));
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let runtime = runtime.clone();
                let context = context.clone();
                let f = f.clone();
                let barrier = barrier.clone();
                let jitter = rand::thread_rng().gen_range(0..500);
                thread::spawn(move || {
                    barrier.wait();
                    thread::sleep(Duration::from_micros(jitter));
                    let results = [
                        runtime.gc().err(),
                        context.eval("1").err(),
                        f.as_function().unwrap().call(&[Value::Int(i as i32)]).err(),
                    ];
                    results.into_iter().all(|r| {
                        matches!(r, Some(BindingError::ThreadAffinity { .. }))
                    })
                })
            })
            .collect();

        barrier.wait();
        let local = f
            .as_function()
            .unwrap()
            .call(&[Value::Int(round)])
            .unwrap();
        assert_eq!(local, Value::Int(round * 2));

        for handle in handles {
            assert!(handle.join().unwrap(), "round {} saw a non-affinity result", round);
        }
    }
}

#[test]
fn test_each_thread_may_own_its_runtime() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let runtime = Runtime::new().unwrap();
                let context = runtime.create_context().unwrap();
                context.set("seed", &Value::Int(i)).unwrap();
                context.eval("seed * seed").unwrap()
            })
        })
        .collect();

    let results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![Value::Int(0), Value::Int(1), Value::Int(4), Value::Int(9)]
    );
}

#[test]
fn test_threaded_function_under_contention() {
    let counter = Arc::new(
        ThreadedFunction::new(
            "bump",
            "var calls = 0; function bump(n) { calls += 1; return calls + n * 0; }",
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|_| counter.call_with_gc(&[Value::Int(1)], false).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .map(|v| v.as_i64().unwrap())
        .collect();
    seen.sort_unstable();

    // every call was serialized: each count appears exactly once
    assert_eq!(seen, (1..=200).collect::<Vec<i64>>());
    assert_eq!(counter.eval("calls").unwrap(), Value::Int(200));
}

#[test]
fn test_threaded_function_callable_runs_on_worker() {
    let recorded = Arc::new(Mutex::new(None));
    let slot = recorded.clone();
    let f = ThreadedFunction::new("f", "function f() { return where(); }").unwrap();
    f.add_callable("where", move |_| {
        *slot.lock().unwrap() = Some(thread::current().id());
        Ok(Value::Null)
    })
    .unwrap();

    f.call(&[]).unwrap();
    let worker = recorded.lock().unwrap().expect("callable ran");
    assert_ne!(worker, thread::current().id());
}
