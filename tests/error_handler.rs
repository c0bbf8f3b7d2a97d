use std::sync::{Arc, Mutex};

use ogr_shape::config;
use ogr_shape::errors::CplErrType;

#[test]
fn test_error_handler() {
    // The global error handler is shared by every test in this binary, so
    // the scenarios run sequentially.

    use_error_handler();

    error_handler_interleaved();

    thread_local_handler_takes_precedence();
}

fn use_error_handler() {
    let errors: Arc<Mutex<Vec<(CplErrType, i32, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let errors_clone = errors.clone();

    config::set_error_handler(move |a, b, c| {
        errors_clone.lock().unwrap().push((a, b, c.to_string()));
    });

    config::cpl_error(CplErrType::Failure, 42, "foo");
    config::cpl_error(CplErrType::Warning, 1, "bar");

    config::remove_error_handler();

    config::cpl_error(CplErrType::Warning, 1, "not recorded");

    let result: Vec<(CplErrType, i32, String)> = errors.lock().unwrap().clone();
    assert_eq!(
        result,
        vec![
            (CplErrType::Failure, 42, "foo".to_string()),
            (CplErrType::Warning, 1, "bar".to_string())
        ]
    );
    assert_eq!(
        config::last_error(),
        Some((CplErrType::Warning, 1, "not recorded".to_string()))
    );
    assert!(config::last_cpl_err().is_some());
    assert!(config::last_error().is_none());
}

fn error_handler_interleaved() {
    use std::thread;
    // Two racing threads trying to set error handlers
    let setters: Vec<_> = (0..2)
        .map(|_| {
            thread::spawn(move || {
                for _ in 0..100 {
                    config::set_error_handler(move |_a, _b, _c| {});
                }
            })
        })
        .collect();

    // A thread that provokes potential race conditions
    let join_handle = thread::spawn(move || {
        for _ in 0..100 {
            config::cpl_error(CplErrType::Failure, 42, "foo");
            config::cpl_error(CplErrType::Warning, 1, "bar");
        }
    });

    join_handle.join().unwrap();
    for setter in setters {
        setter.join().unwrap();
    }
    config::remove_error_handler();
}

fn thread_local_handler_takes_precedence() {
    let global = Arc::new(Mutex::new(0));
    let global_clone = global.clone();
    config::set_error_handler(move |_, _, _| {
        *global_clone.lock().unwrap() += 1;
    });

    let local = Arc::new(Mutex::new(Vec::new()));
    let local_clone = local.clone();
    config::push_error_handler(move |_, _, msg| {
        local_clone.lock().unwrap().push(msg.to_string());
    });
    config::cpl_error(CplErrType::Warning, 1, "local");
    config::pop_error_handler();
    config::cpl_error(CplErrType::Warning, 1, "global");
    config::remove_error_handler();

    assert_eq!(*local.lock().unwrap(), vec!["local".to_string()]);
    assert_eq!(*global.lock().unwrap(), 1);
}
