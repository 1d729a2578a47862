//! Integration tests for the HostLink → BridgeService → ports pipeline.
//!
//! These run on the host (x86_64) and verify the full dispatch chain from a
//! raw byte stream down to hardware calls and protocol responses, without
//! any real hardware.

use crate::mock_hw::{HwCall, LogSink, MockHardware, MockHost};

use servobridge::app::events::BridgeEvent;
use servobridge::app::link::HostLink;
use servobridge::app::service::BridgeService;
use servobridge::config::BridgeConfig;

fn make_bridge() -> (BridgeService, MockHardware, LogSink) {
    (
        BridgeService::new(BridgeConfig::default()),
        MockHardware::new(),
        LogSink::new(),
    )
}

/// Feed the scripted chunks through the framer and dispatch every complete
/// line, exactly like the firmware poll loop does.
fn run_lines(
    service: &mut BridgeService,
    hw: &mut MockHardware,
    link: &mut HostLink<MockHost>,
    sink: &mut LogSink,
) {
    while let Some(line) = link.poll_line() {
        service.handle_line(&line, hw, link, sink);
    }
}

// ── reset ─────────────────────────────────────────────────────

#[test]
fn reset_resets_driver_once_and_confirms() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"reset\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(hw.calls, vec![HwCall::ResetDriver]);
    assert_eq!(link.transport().lines, vec!["pwm driver has been reset"]);
    assert_eq!(sink.events, vec![BridgeEvent::DriverReset]);
}

// ── SetPwm ────────────────────────────────────────────────────

#[test]
fn set_pwm_applies_in_range_values() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"3 250\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(hw.pwm_calls(), vec![(3, 250)]);
    assert_eq!(link.transport().lines, vec!["set PWM 3 pulseLength to 250"]);
}

#[test]
fn set_pwm_boundary_values() {
    let (mut service, mut hw, mut sink) = make_bridge();
    // min pulse inclusive, max-1 is the last accepted pulse, channel 16 is
    // the last accepted channel.
    let mut link = HostLink::new(MockHost::new(&[b"0 110\n16 479\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(hw.pwm_calls(), vec![(0, 110), (16, 479)]);
}

#[test]
fn set_pwm_rejects_out_of_range_channel_without_hw_call() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"20 250\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert!(hw.calls.is_empty(), "no hardware call on rejection");
    assert_eq!(
        link.transport().lines,
        vec!["20 250", "invalid parameters"]
    );
    assert_eq!(
        sink.events,
        vec![BridgeEvent::PwmRejected {
            channel: 20,
            pulse_length: 250
        }]
    );
}

#[test]
fn set_pwm_rejects_out_of_range_pulse_without_hw_call() {
    let (mut service, mut hw, mut sink) = make_bridge();
    // 50 is below the safe minimum, 480 is the exclusive maximum.
    let mut link = HostLink::new(MockHost::new(&[b"3 50\n3 480\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(
        link.transport().lines,
        vec!["3 50", "invalid parameters", "3 480", "invalid parameters"]
    );
}

#[test]
fn garbage_line_is_invalid_and_touches_no_hardware() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"garbage\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(link.transport().lines, vec!["garbage", "invalid parameters"]);
    assert_eq!(
        sink.events,
        vec![BridgeEvent::InvalidLine {
            line: "garbage".to_string()
        }]
    );
}

#[test]
fn invalid_echo_can_be_disabled() {
    let mut config = BridgeConfig::default();
    config.commands.echo_invalid_line = false;
    let mut service = BridgeService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut link = HostLink::new(MockHost::new(&[b"garbage\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(link.transport().lines, vec!["invalid parameters"]);
}

// ── serial:<N> relay ──────────────────────────────────────────

#[test]
fn relay_forwards_exact_payload_and_flushes() {
    let (mut service, mut hw, mut sink) = make_bridge();
    // Payload arrives fragmented: 2 bytes, then 3.
    let mut link = HostLink::new(MockHost::new(&[b"serial:5\n\x88\x0b", b"\x00\x00\x10"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(hw.written(), vec![0x88, 0x0b, 0x00, 0x00, 0x10]);
    assert_eq!(hw.flush_count(), 1);
    assert_eq!(link.transport().lines, vec!["sent"]);
    assert_eq!(sink.events, vec![BridgeEvent::BytesRelayed { count: 5 }]);
}

#[test]
fn relay_opens_peripheral_lazily() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"serial:1\n\x80"]));

    assert!(!service.peripheral_open());
    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert!(service.peripheral_open());
    assert_eq!(hw.calls[0], HwCall::Open { baud: 19_200 });
}

#[test]
fn relay_zero_bytes_still_acknowledges() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"serial:0\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(hw.written(), Vec::<u8>::new());
    assert_eq!(link.transport().lines, vec!["sent"]);
}

#[test]
fn relay_without_count_reads_nothing() {
    let (mut service, mut hw, mut sink) = make_bridge();
    // "serial" with no colon parses as count 0; the following line must
    // still be framed correctly.
    let mut link = HostLink::new(MockHost::new(&[b"serial\nreset\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(
        link.transport().lines,
        vec!["sent", "pwm driver has been reset"]
    );
}

#[test]
fn relay_stats_accumulate() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"serial:2\nab", b"serial:3\nxyz"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    let stats = service.stats();
    assert_eq!(stats.lines, 2);
    assert_eq!(stats.relayed_bytes, 5);
}

// ── roomba-start ──────────────────────────────────────────────

#[test]
fn roomba_start_runs_wake_handshake() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"roomba-start\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(
        hw.calls,
        vec![
            HwCall::Open { baud: 19_200 },
            HwCall::Write(vec![0x80]),
            HwCall::DelayMs(50),
            HwCall::Write(vec![0x82]),
            HwCall::DelayMs(50),
            HwCall::Write(vec![0x8D, 0x00]),
        ]
    );
    assert_eq!(link.transport().lines, vec!["roomba started"]);
    assert!(service.peripheral_open());
    assert_eq!(sink.events, vec![BridgeEvent::PeripheralStarted]);
}

#[test]
fn roomba_start_open_failure_reports_invalid() {
    let (mut service, mut hw, mut sink) = make_bridge();
    hw.fail_open = Some("driver install failed");
    let mut link = HostLink::new(MockHost::new(&[b"roomba-start\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(link.transport().lines, vec!["invalid parameters"]);
    assert!(!service.peripheral_open());
    // No handshake bytes after a failed open.
    assert_eq!(hw.written(), Vec::<u8>::new());
}

// ── background peripheral poll ────────────────────────────────

#[test]
fn poll_drains_buffered_bytes_with_count_header() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"roomba-start\n"]));
    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    hw.inject_rx(&[0x12, 0x34, 0x56]);
    let n = service.poll_peripheral(&mut hw, &mut link, &mut sink);

    assert_eq!(n, 3);
    assert_eq!(link.transport().lines, vec!["roomba started", "roomba:3"]);
    assert_eq!(link.transport().raw, vec![0x12, 0x34, 0x56]);
    assert_eq!(service.stats().drained_bytes, 3);
}

#[test]
fn poll_is_silent_with_nothing_buffered() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::new(&[b"roomba-start\n"]));
    run_lines(&mut service, &mut hw, &mut link, &mut sink);
    sink.events.clear();

    assert_eq!(service.poll_peripheral(&mut hw, &mut link, &mut sink), 0);
    assert_eq!(link.transport().lines, vec!["roomba started"]);
    assert!(sink.events.is_empty());
}

#[test]
fn poll_is_gated_until_peripheral_opened() {
    let (mut service, mut hw, mut sink) = make_bridge();
    let mut link = HostLink::new(MockHost::empty());

    hw.inject_rx(&[0xAA]);
    assert_eq!(service.poll_peripheral(&mut hw, &mut link, &mut sink), 0);
    assert!(link.transport().lines.is_empty());
    assert!(link.transport().raw.is_empty());
}

// ── command table variants ────────────────────────────────────

#[test]
fn disabled_reset_is_rejected() {
    let mut config = BridgeConfig::default();
    config.commands.reset = false;
    let mut service = BridgeService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut link = HostLink::new(MockHost::new(&[b"reset\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(link.transport().lines, vec!["reset", "invalid parameters"]);
}

#[test]
fn disabled_peripheral_gates_commands_and_poll() {
    let mut config = BridgeConfig::default();
    config.commands.peripheral = false;
    let mut service = BridgeService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut link = HostLink::new(MockHost::new(&[b"roomba-start\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);
    assert_eq!(
        link.transport().lines,
        vec!["roomba-start", "invalid parameters"]
    );

    hw.inject_rx(&[0x01]);
    assert_eq!(service.poll_peripheral(&mut hw, &mut link, &mut sink), 0);
}

// ── mixed traffic ─────────────────────────────────────────────

#[test]
fn interleaved_commands_keep_framing_in_sync() {
    let (mut service, mut hw, mut sink) = make_bridge();
    // One transport read carrying a PWM command, a relay with payload, and
    // another PWM command back to back.
    let mut link = HostLink::new(MockHost::new(&[b"3 250\nserial:2\n\x88\x05", b"4 300\n"]));

    run_lines(&mut service, &mut hw, &mut link, &mut sink);

    assert_eq!(hw.pwm_calls(), vec![(3, 250), (4, 300)]);
    assert_eq!(hw.written(), vec![0x88, 0x05]);
    assert_eq!(
        link.transport().lines,
        vec![
            "set PWM 3 pulseLength to 250",
            "sent",
            "set PWM 4 pulseLength to 300",
        ]
    );
    let stats = service.stats();
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.invalid, 0);
}
