/// Large transcript tests
///
/// These tests verify that long transcripts are parsed in bounded slices and that repeated
/// runs do not accumulate state
mod common;

use chat_export_explorer::scheduler::{
    CancellationToken, ParseOptions, ParseRun, ParseScheduler, RunOutcome, StepStatus,
};
use chat_export_explorer::{ChatLoader, LoadOptions, MediaTable};
use common::{BatchSizes, TranscriptBuilder};

#[test]
fn test_scale_hundred_thousand_records() {
    let text = TranscriptBuilder::new().bulk(100_000).build();
    let media = MediaTable::new();
    let options = ParseOptions { chunk_lines: 500, flush_every: 1000 };

    let mut run = ParseRun::new(&text, &media, options, CancellationToken::new()).unwrap();
    let mut batches = BatchSizes::default();
    let mut steps = 0;
    while run.step(&mut batches) == StepStatus::Pending {
        steps += 1;
        assert!(run.progress() <= 1.0);
    }

    // 200,000 non-empty lines at 500 per slice
    assert!(steps >= 399, "only {} slices", steps);
    assert_eq!(batches.0.len(), 100);
    assert!(batches.0.iter().all(|&size| size == 1000));

    match run.into_outcome() {
        RunOutcome::Completed { records, stats } => {
            assert_eq!(records.len(), 100_000);
            assert_eq!(stats.headers, 100_000);
            assert_eq!(stats.continuations, 100_000);
            assert_eq!(records[99_999].text, "message 99999\ncontinuation 99999");
        }
        RunOutcome::Cancelled { .. } => panic!("run was not cancelled"),
    }
}

#[test]
fn test_scale_cancel_midway_yields_nothing() {
    let text = TranscriptBuilder::new().bulk(10_000).build();
    let media = MediaTable::new();
    let mut scheduler = ParseScheduler::new();

    let mut run = scheduler.start(&text, &media, ParseOptions::default()).unwrap();
    for _ in 0..5 {
        assert_eq!(run.step(&mut ()), StepStatus::Pending);
    }

    // Selecting another transcript invalidates the first run
    let other = TranscriptBuilder::new().bulk(3).build();
    let next = scheduler.start(&other, &media, ParseOptions::default()).unwrap();

    assert_eq!(run.step(&mut ()), StepStatus::Cancelled);
    assert!(matches!(run.into_outcome(), RunOutcome::Cancelled { parsed } if parsed > 0));

    match next.run(&mut || {}, &mut ()) {
        RunOutcome::Completed { records, .. } => assert_eq!(records.len(), 3),
        RunOutcome::Cancelled { .. } => panic!("second run should complete"),
    }
    assert_eq!(scheduler.generation(), 2);
}

#[test]
fn test_scale_repeated_loads() {
    let text = TranscriptBuilder::new().bulk(200).build();

    for i in 0..200 {
        let mut loader =
            ChatLoader::new(LoadOptions { use_cache: false, ..LoadOptions::default() }, None);
        let chat = loader.load_text("_chat.txt", &text, &mut ()).unwrap();
        assert_eq!(chat.records.len(), 200, "iteration {}", i);
    }
}
