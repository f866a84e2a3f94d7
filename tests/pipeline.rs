use std::sync::{Arc, Mutex};

use strand::middleware::{from_fn, Next, Recover, RequireHeader};
use strand::{handler_fn, Error, Method, Pipeline, Request, Response, StatusCode};

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Records entry and exit around its continuation.
fn recording(name: &'static str, log: &Log) -> impl strand::Middleware + use<> {
    let log = Arc::clone(log);
    from_fn(move |req: &Request, next: Next<'_>| {
        log.lock().unwrap().push(format!("{name}:in"));
        let res = next.run(req);
        log.lock().unwrap().push(format!("{name}:out"));
        res
    })
}

/// Returns `"handler"` and records that it ran, plus the path it saw.
fn recording_handler(log: &Log) -> impl strand::Handler + use<> {
    let log = Arc::clone(log);
    handler_fn(move |req: &Request| {
        log.lock().unwrap().push(format!("handler:{}", req.path()));
        Response::text("handler")
    })
}

fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

#[test]
fn zero_middleware_runs_handler_once_with_original_request() {
    let log = log();
    let app = Pipeline::new(recording_handler(&log));

    let res = app.dispatch(&get("/original")).unwrap();

    assert_eq!(res.body(), b"handler");
    assert_eq!(entries(&log), vec!["handler:/original"]);
}

#[test]
fn delegating_chain_runs_in_order_and_unwinds_in_reverse() {
    let log = log();
    let app = Pipeline::new(recording_handler(&log))
        .layer(recording("a", &log))
        .layer(recording("b", &log))
        .layer(recording("c", &log));

    app.dispatch(&get("/")).unwrap();

    assert_eq!(
        entries(&log),
        vec!["a:in", "b:in", "c:in", "handler:/", "c:out", "b:out", "a:out"],
    );
}

#[test]
fn short_circuit_stops_everything_downstream() {
    let log = log();
    let stop = from_fn(|_: &Request, _next: Next<'_>| Ok(Response::text("stopped")));
    let app = Pipeline::new(recording_handler(&log))
        .layer(recording("a", &log))
        .layer(stop)
        .layer(recording("c", &log));

    let res = app.dispatch(&get("/")).unwrap();

    assert_eq!(res.body(), b"stopped");
    assert_eq!(entries(&log), vec!["a:in", "a:out"]);
}

#[test]
fn header_gate_scenario() {
    let log = log();
    let logging = recording("log", &log);
    let gate = RequireHeader::new("x-api-key")
        .reject_with(Response::builder().status(StatusCode::FORBIDDEN).text("missing key"));
    let app = Pipeline::new(recording_handler(&log)).layer(logging).layer(gate);

    let res = app.dispatch(&get("/")).unwrap();
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(res.body(), b"missing key");
    assert!(!entries(&log).iter().any(|e| e.starts_with("handler")));

    log.lock().unwrap().clear();

    let res = app.dispatch(&get("/").with_header("X-Api-Key", "k")).unwrap();
    assert_eq!(res.body(), b"handler");
    assert_eq!(entries(&log), vec!["log:in", "handler:/", "log:out"]);
}

#[test]
fn swapping_delegating_middleware_changes_order_not_result() {
    let log_ab = log();
    let ab = Pipeline::new(handler_fn(|_: &Request| "same"))
        .layer(recording("a", &log_ab))
        .layer(recording("b", &log_ab));

    let log_ba = log();
    let ba = Pipeline::new(handler_fn(|_: &Request| "same"))
        .layer(recording("b", &log_ba))
        .layer(recording("a", &log_ba));

    let res_ab = ab.dispatch(&get("/")).unwrap();
    let res_ba = ba.dispatch(&get("/")).unwrap();

    assert_eq!(res_ab, res_ba);
    assert_eq!(entries(&log_ab)[..2], ["a:in", "b:in"]);
    assert_eq!(entries(&log_ba)[..2], ["b:in", "a:in"]);
}

#[test]
fn derived_request_reaches_downstream_and_original_is_unchanged() {
    let rewrite = from_fn(|req: &Request, next: Next<'_>| {
        next.run(&req.with_header("x-tenant", "acme").without_header("cookie"))
    });
    let app = Pipeline::new(handler_fn(|req: &Request| {
        format!("{}|{}", req.header("x-tenant").unwrap_or("-"), req.header("cookie").unwrap_or("-"))
    }))
    .layer(rewrite);

    let original = get("/").with_header("cookie", "session=1");
    let snapshot = original.clone();

    let res = app.dispatch(&original).unwrap();

    assert_eq!(res.body(), b"acme|-");
    assert_eq!(original, snapshot);
}

#[test]
fn errors_propagate_to_caller() {
    let log = log();
    let failing = handler_fn(|_: &Request| -> Result<Response, Error> { Err(Error::handler("boom")) });
    let app = Pipeline::new(failing).layer(recording("a", &log));

    let err = app.dispatch(&get("/")).unwrap_err();

    assert_eq!(err.to_string(), "handler: boom");
    assert_eq!(entries(&log), vec!["a:in", "a:out"]);
}

#[test]
fn middleware_error_skips_downstream() {
    let log = log();
    let fail = from_fn(|_: &Request, _next: Next<'_>| Err(Error::handler("rejected upstream")));
    let app = Pipeline::new(recording_handler(&log)).layer(fail);

    assert!(app.dispatch(&get("/")).is_err());
    assert!(entries(&log).is_empty());
}

#[test]
fn recover_converts_errors_into_500() {
    let failing = handler_fn(|_: &Request| -> Result<Response, Error> { Err(Error::handler("boom")) });
    let app = Pipeline::new(failing).layer(Recover::new());

    let res = app.dispatch(&get("/")).unwrap();
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn pipeline_is_reusable_across_threads() {
    let app = Arc::new(
        Pipeline::new(handler_fn(|req: &Request| req.path().to_owned()))
            .layer(from_fn(|req: &Request, next: Next<'_>| next.run(req))),
    );

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let app = Arc::clone(&app);
            std::thread::spawn(move || {
                let path = format!("/worker/{i}");
                let res = app.dispatch(&get(&path)).unwrap();
                assert_eq!(res.body(), path.as_bytes());
            })
        })
        .collect();

    for w in workers {
        w.join().unwrap();
    }
}
