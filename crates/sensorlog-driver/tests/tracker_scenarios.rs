//! Tracker 场景测试（Mock 链路）
//!
//! 覆盖连接重试上限、disable 语义、记录解码与逐 tick 的失败隔离。

use sensorlog_driver::{
    ConnectionState, DecodeOutcome, FailureReason, FramingMode, LatestOrientation,
    OrientationSample, TickOutcome, Tracker, TrackerBuilder,
};
use sensorlog_link::mock::{MockLink, MockLinkHandle, PollScript, ReadScript};
use sensorlog_protocol::{Euler, Rad, encode_record};

const HEADER: &str = "loggingTime(txt),loggingSample(N),identifierForVendor(txt)\n";

fn tracker_with(framing: FramingMode) -> (Tracker<MockLink>, MockLinkHandle) {
    let (link, handle) = MockLink::new();
    let tracker = TrackerBuilder::new()
        .host("127.0.0.1")
        .framing(framing)
        .build_with_link(link)
        .unwrap();
    (tracker, handle)
}

/// 建立连接并丢弃表头，返回时已处于 Connected
fn connected(framing: FramingMode) -> (Tracker<MockLink>, MockLinkHandle, LatestOrientation) {
    let (mut tracker, handle) = tracker_with(framing);
    let mut target = LatestOrientation::new();
    handle.push_poll(PollScript::Established);
    handle.push_read_line(HEADER);

    tracker.enable();
    assert_eq!(tracker.tick(&mut target).outcome, TickOutcome::Connected);
    (tracker, handle, target)
}

#[test]
fn test_never_writable_gives_up_after_1000_polls() {
    let (mut tracker, handle) = tracker_with(FramingMode::SingleRead);
    let mut target = LatestOrientation::new();
    tracker.enable();

    for tick in 1..1000u32 {
        let report = tracker.tick(&mut target);
        assert_eq!(report.outcome, TickOutcome::Connecting { retries: tick });
        assert_eq!(report.snapshot.state, ConnectionState::Connecting);
        assert_eq!(handle.counters().polls, u64::from(tick));
    }

    let report = tracker.tick(&mut target);
    assert_eq!(
        report.outcome,
        TickOutcome::Failed(FailureReason::RetriesExhausted { attempts: 1000 })
    );
    assert!(report.snapshot.state.is_failed());
    assert_eq!(report.snapshot.retry_count, 1000);
    assert_eq!(handle.counters().polls, 1000);
    assert_eq!(handle.counters().reads, 0);
    assert!(!handle.is_open());

    // 放弃之后不再有任何 socket 操作
    let before = handle.counters().io_operations();
    for _ in 0..50 {
        assert_eq!(tracker.tick(&mut target).outcome, TickOutcome::Inactive);
    }
    assert_eq!(handle.counters().io_operations(), before);
    assert!(target.get().is_none());
}

#[test]
fn test_refusals_count_against_retry_budget() {
    let (link, handle) = MockLink::new();
    let mut tracker = TrackerBuilder::new()
        .host("127.0.0.1")
        .max_retries(5)
        .build_with_link(link)
        .unwrap();
    handle.set_default_poll(PollScript::Refused);

    tracker.enable();
    for _ in 0..4 {
        assert!(matches!(
            tracker.tick(&mut |_: OrientationSample| {}).outcome,
            TickOutcome::Connecting { .. }
        ));
    }
    assert!(matches!(
        tracker.tick(&mut |_: OrientationSample| {}).outcome,
        TickOutcome::Failed(FailureReason::RetriesExhausted { attempts: 5 })
    ));
    // 每次被拒绝后都会在下一次 tick 重新发起连接
    assert_eq!(handle.counters().begin_connects, 5);
    assert_eq!(handle.counters().polls, 5);
}

#[test]
fn test_disable_while_connecting() {
    let (mut tracker, handle) = tracker_with(FramingMode::SingleRead);
    let mut target = LatestOrientation::new();
    tracker.enable();
    tracker.tick(&mut target);
    tracker.tick(&mut target);
    assert!(handle.is_open());

    tracker.disable();
    assert!(!handle.is_open());
    assert_eq!(tracker.state(), &ConnectionState::Disabled);

    let before = handle.counters();
    for _ in 0..10 {
        assert_eq!(tracker.tick(&mut target).outcome, TickOutcome::Inactive);
    }
    assert_eq!(handle.counters().io_operations(), before.io_operations());
}

#[test]
fn test_reenable_after_giving_up() {
    let (link, handle) = MockLink::new();
    let mut tracker = TrackerBuilder::new()
        .host("127.0.0.1")
        .max_retries(2)
        .build_with_link(link)
        .unwrap();

    tracker.enable();
    tracker.tick(&mut |_: OrientationSample| {});
    tracker.tick(&mut |_: OrientationSample| {});
    assert!(tracker.state().is_failed());

    handle.push_poll(PollScript::Established);
    tracker.enable();
    assert_eq!(tracker.snapshot().retry_count, 0);
    assert_eq!(
        tracker.tick(&mut |_: OrientationSample| {}).outcome,
        TickOutcome::Connected
    );
}

#[test]
fn test_quarter_turn_record() {
    let (mut tracker, handle, mut target) = connected(FramingMode::SingleRead);
    let mut fields = vec!["0"; 24];
    fields[0] = "a";
    fields[1] = "b";
    fields[2] = "c";
    fields[3] = "1.5707963";
    handle.push_read_line(&format!("{}\n", fields.join(",")));

    let report = tracker.tick(&mut target);
    let sample = report.sample().unwrap();
    assert!((sample.x.0 - 90.0).abs() < 1e-4);
    assert_eq!(sample.y.0, 0.0);
    assert_eq!(sample.z.0, 0.0);
    assert_eq!(target.get(), Some(sample));
    assert_eq!(report.snapshot.fields_in_record(), 24);
}

#[test]
fn test_two_field_line_is_skipped() {
    let (mut tracker, handle, mut target) = connected(FramingMode::SingleRead);
    handle.push_read_line("x,y");

    let report = tracker.tick(&mut target);
    assert_eq!(
        report.outcome,
        TickOutcome::Decoded(DecodeOutcome::Skipped { fields: 2 })
    );
    assert_eq!(report.snapshot.fields_in_record(), 2);
    assert_eq!(report.snapshot.decoder.last_line, "x,y");
    assert!(target.get().is_none());
    assert!(report.snapshot.state.is_connected());
}

#[test]
fn test_parse_failure_keeps_previous_orientation() {
    let (mut tracker, handle, mut target) = connected(FramingMode::SingleRead);
    handle.push_read_line(&encode_record(Euler::new(Rad(0.1), Rad(0.2), Rad(0.3))));
    let mut bad = vec!["0"; 24];
    bad[5] = "NaN?";
    handle.push_read_line(&bad.join(","));

    let first = tracker.tick(&mut target).sample().unwrap();
    let report = tracker.tick(&mut target);
    assert_eq!(
        report.outcome,
        TickOutcome::Decoded(DecodeOutcome::ParseFailed)
    );
    assert_eq!(report.snapshot.decoder.parse_failures, 1);
    assert_eq!(target.get(), Some(first));
    assert_eq!(target.updates(), 1);
}

#[test]
fn test_read_failure_is_a_soft_skip() {
    let (mut tracker, handle, mut target) = connected(FramingMode::SingleRead);
    handle.push_read(ReadScript::Error);
    handle.push_read(ReadScript::Timeout);
    handle.push_read_line(&encode_record(Euler::new(Rad(0.0), Rad(0.5), Rad(0.0))));

    for _ in 0..2 {
        let report = tracker.tick(&mut target);
        assert_eq!(
            report.outcome,
            TickOutcome::Decoded(DecodeOutcome::ReadFailed)
        );
        assert!(report.snapshot.state.is_connected());
    }
    assert!(tracker.tick(&mut target).sample().is_some());
    assert_eq!(tracker.snapshot().decoder.read_failures, 2);
    assert_eq!(handle.counters().begin_connects, 1);
}

#[test]
fn test_at_most_one_read_per_tick() {
    let (mut tracker, handle, mut target) = connected(FramingMode::SingleRead);
    let reads_after_header = handle.counters().reads;
    for i in 0..10 {
        let orientation = Euler::new(Rad(f64::from(i) * 0.1), Rad(0.0), Rad(0.0));
        handle.push_read_line(&encode_record(orientation));
    }
    for n in 1..=10 {
        tracker.tick(&mut target);
        assert_eq!(handle.counters().reads, reads_after_header + n);
    }
    assert_eq!(target.updates(), 10);
    assert_eq!(handle.counters().polls, 1);
}

#[test]
fn test_line_buffered_partial_reads() {
    let (mut tracker, handle, mut target) = connected(FramingMode::LineBuffered);
    let line = encode_record(Euler::new(Rad(0.7), Rad(0.0), Rad(0.0)));
    let (head, tail) = line.split_at(line.len() / 2);
    handle.push_read_line(head);
    handle.push_read_line(tail);

    assert_eq!(
        tracker.tick(&mut target).outcome,
        TickOutcome::Decoded(DecodeOutcome::Incomplete)
    );
    let sample = tracker.tick(&mut target).sample().unwrap();
    assert!((sample.x.0 - 0.7_f64.to_degrees()).abs() < 1e-9);
    assert_eq!(tracker.snapshot().sample_yield(), 0.5);
}

#[test]
fn test_drop_releases_socket() {
    let (mut tracker, handle) = tracker_with(FramingMode::SingleRead);
    tracker.enable();
    assert!(handle.is_open());
    drop(tracker);
    assert!(!handle.is_open());
}
