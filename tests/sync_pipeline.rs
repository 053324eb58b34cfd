use std::{
    num::ParseIntError,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use middleware_pipeline::{Error, Monoid, PipelineLike, SyncMiddleware, SyncPipeline};

fn add(n: i32) -> SyncMiddleware {
    SyncMiddleware::from_fn(move |x: i32| x + n)
}

fn parse() -> SyncMiddleware {
    SyncMiddleware::try_new(|s: &mut String| s.parse::<i32>().map(Some))
}

fn counted(calls: &Arc<AtomicUsize>) -> SyncMiddleware {
    let calls = calls.clone();
    SyncMiddleware::from_fn(move |x: i32| {
        calls.fetch_add(1, Ordering::SeqCst);
        x
    })
}

#[derive(Debug, Clone, PartialEq)]
struct Testable {
    test: i32,
}

#[test]
fn test_consecutively_runs_middleware() {
    let pipeline: SyncPipeline<i32> = SyncPipeline::from([add(1), add(2), add(3)]);
    assert_eq!(pipeline.process(1).unwrap(), 7);

    let pipeline: SyncPipeline<i32> = SyncPipeline::from([add(4), add(1)]);
    assert_eq!(pipeline.process(1).unwrap(), 6);
}

#[test]
fn test_empty_pipeline_returns_context() {
    let pipeline: SyncPipeline<i32> = SyncPipeline::from([]);
    assert_eq!(pipeline.process(1).unwrap(), 1);

    let pipeline: SyncPipeline<Vec<i32>> = SyncPipeline::empty();
    assert_eq!(pipeline.process(vec![1, 2, 3]).unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_preserves_context_if_nothing_returned() {
    let pipeline: SyncPipeline<i32> =
        SyncPipeline::from([SyncMiddleware::new(|_: &mut i32| None::<i32>), add(1)]);
    assert_eq!(pipeline.process(1).unwrap(), 2);
}

#[test]
fn test_no_op_keeps_in_place_edits() {
    let pipeline: SyncPipeline<Vec<i32>> =
        SyncPipeline::of(SyncMiddleware::new(|v: &mut Vec<i32>| {
            v.push(4);
            None::<Vec<i32>>
        }));
    assert_eq!(pipeline.process(vec![1, 2, 3]).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_context_is_immutable_outside_pipeline() {
    let original = Testable { test: 1 };
    let pipeline: SyncPipeline<Testable> =
        SyncPipeline::of(SyncMiddleware::new(|ctx: &mut Testable| {
            ctx.test = 2;
            None::<Testable>
        }));

    let result = pipeline.process(original.clone()).unwrap();
    assert_eq!(original, Testable { test: 1 });
    assert_eq!(result, Testable { test: 2 });
}

#[test]
fn test_shared_nested_state_stays_shared() {
    #[derive(Clone)]
    struct Ctx {
        hits: Arc<AtomicUsize>,
    }

    let original = Ctx {
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let pipeline: SyncPipeline<Ctx> = SyncPipeline::of(SyncMiddleware::new(|ctx: &mut Ctx| {
        ctx.hits.fetch_add(1, Ordering::SeqCst);
        None::<Ctx>
    }));

    pipeline.process(original.clone()).unwrap();
    pipeline.process(original.clone()).unwrap();
    assert_eq!(original.hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_invalid_middleware_fails_when_reached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline: SyncPipeline<i32> = SyncPipeline::from([
        counted(&calls),
        SyncMiddleware::invalid(),
        counted(&calls),
    ]);

    // Building and composing never inspects the slots.
    let pipeline = pipeline.concat(&SyncPipeline::<i32, i32>::of(counted(&calls)));
    assert_eq!(pipeline.len(), 4);

    let err = pipeline.process(1).unwrap_err();
    assert!(matches!(err, Error::InvalidMiddleware { position: 1 }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invalid_middleware_is_default() {
    let pipeline: SyncPipeline<i32> = SyncPipeline::of(SyncMiddleware::default());
    assert!(!pipeline.middleware()[0].is_valid());
    assert!(matches!(
        pipeline.process(1),
        Err(Error::InvalidMiddleware { position: 0 })
    ));
}

#[test]
fn test_middleware_error_is_propagated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = SyncPipeline::<String, i32>::of(parse()).pipe::<i32>(counted(&calls));

    let err = pipeline.process("nope".into()).unwrap_err();
    assert_eq!(err.position(), 0);
    assert!(err.downcast_ref::<ParseIntError>().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(pipeline.process("41".into()).unwrap(), 41);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pipe_changes_result_type() {
    let pipeline = SyncPipeline::<String, String>::empty()
        .pipe::<i32>(parse())
        .pipe::<i32>(add(1))
        .pipe::<String>(SyncMiddleware::from_fn(|x: i32| format!("#{x}")));

    assert_eq!(pipeline.process("41".into()).unwrap(), "#42");
}

#[test]
fn test_unexpected_context_is_reported() {
    let pipeline: SyncPipeline<String, i32> = SyncPipeline::of(add(1));
    match pipeline.process("1".into()) {
        Err(Error::UnexpectedContext { position, source }) => {
            assert_eq!(position, 0);
            assert_eq!(source.to, "i32");
        }
        result => panic!("expected an unexpected context error, got {result:?}"),
    }

    // A no-op cannot change the type of the context.
    let pipeline: SyncPipeline<i32, String> =
        SyncPipeline::of(SyncMiddleware::new(|_: &mut i32| None::<String>));
    assert!(matches!(
        pipeline.process(1),
        Err(Error::UnexpectedContext { position: 1, .. })
    ));
}

#[test]
fn test_to_array_preserves_order() {
    let (f, g, h) = (add(1), add(2), add(3));

    let pipeline: SyncPipeline<i32> = SyncPipeline::from([f.clone(), g.clone(), h.clone()]);
    assert_eq!(pipeline.to_array(), &[f.clone(), g.clone(), h.clone()]);

    let piped = SyncPipeline::<i32, i32>::of(f.clone())
        .pipe::<i32>(g.clone())
        .pipe::<i32>(h.clone());
    assert_eq!(piped.to_array(), pipeline.to_array());
    assert_eq!(piped, pipeline);

    // Distinct middleware never compare equal, even if they behave the same.
    assert_ne!(add(1), add(1));
}

#[test]
fn test_of_accepts_several_middleware() {
    let (f, g, h) = (add(1), add(2), add(3));

    let pipeline = SyncPipeline::<i32, i32>::of([f.clone(), g.clone(), h.clone()]);
    assert_eq!(pipeline.to_array(), &[f.clone(), g.clone(), h.clone()]);
    assert_eq!(pipeline, SyncPipeline::from([f, g, h]));
    assert_eq!(pipeline.process(1).unwrap(), 7);
}

#[test]
fn test_is_empty() {
    assert!(SyncPipeline::<i32, i32>::empty().is_empty());
    assert!(!SyncPipeline::<i32, i32>::of(SyncMiddleware::new(|_: &mut i32| None::<i32>)).is_empty());
}

#[test]
fn test_semigroup_associativity() {
    let a = SyncPipeline::<i32, i32>::of(add(1));
    let b = SyncPipeline::<i32, i32>::from([add(2)]);
    let c = SyncPipeline::<i32, i32>::from([add(3)]);

    let left = a.concat(&b).concat(&c);
    let right = a.concat(&b.concat(&c));
    assert_eq!(left.process(1).unwrap(), right.process(1).unwrap());
    assert_eq!(left, right);
}

#[test]
fn test_monoid_identity() {
    let m = SyncPipeline::<String, i32>::from([parse()]);

    let right = m.concat(&SyncPipeline::<i32, i32>::empty());
    assert_eq!(right.process("3".into()).unwrap(), m.process("3".into()).unwrap());

    let left = SyncPipeline::<String, String>::empty().concat(&m);
    assert_eq!(left.process("3".into()).unwrap(), m.process("3".into()).unwrap());
}

#[test]
fn test_empty_is_the_same_for_instance_and_static() {
    assert_eq!(
        SyncPipeline::<i32, i32>::empty(),
        SyncPipeline::<i32, i32>::empty().empty_like()
    );

    fn identity_of<P: PipelineLike>(pipeline: &P) -> P::Empty {
        pipeline.empty_like()
    }
    let pipeline = SyncPipeline::<i32, i32>::of(add(1));
    assert!(identity_of(&pipeline).is_empty());
}

#[test]
fn test_concat_all() {
    let pipeline = SyncPipeline::<i32, i32>::concat_all([
        SyncPipeline::of(add(1)),
        SyncPipeline::empty(),
        SyncPipeline::from([add(2), add(3)]),
    ]);

    assert_eq!(pipeline.len(), 3);
    assert_eq!(pipeline.process(1).unwrap(), 7);
}
