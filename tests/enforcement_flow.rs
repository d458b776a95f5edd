//! Integration tests for enforcement on tagged accounts: frequency and
//! length limits, exemptions, and the grace window.

mod common;
use common::{Action, GROUP, Harness, config};
use nobot::enforcement::{EnforcementOutcome, IgnoreReason, NOTICE_TOO_LONG};
use nobot::event::{Role, Segment};
use nobot::{EventControl, Handled};
use std::time::Duration;

/// Harness with `u1` tagged and enforcement on, clock well past the tag time.
fn enforcing() -> Harness {
    let mut config = config();
    config.enforcement.default_enabled = true;
    config.enforcement.max_length = 20;
    let h = Harness::new(config);
    h.store.lock().tag(GROUP, "u1");
    h.clock.advance(100);
    h
}

#[tokio::test]
async fn frequency_window_mutes_then_forgives() {
    let h = enforcing();

    // t=0
    let first = h.message("u1", "hello");
    assert_eq!(
        h.moderator.process(&first).await,
        Handled::Enforced(EnforcementOutcome::Allowed)
    );

    // t=5
    h.clock.advance(5);
    let second = h.message("u1", "hello again");
    assert_eq!(h.moderator.handle_message(&second).await, EventControl::Stop);
    assert_eq!(
        h.platform.actions(),
        vec![
            Action::Delete(second.message_id.clone()),
            Action::Mute {
                account: "u1".into(),
                secs: 1800
            },
        ]
    );

    // t=35: 30s after the violation, which also reset the clock
    h.clock.advance(30);
    h.platform.clear();
    let third = h.message("u1", "still here");
    assert_eq!(h.moderator.handle_message(&third).await, EventControl::Continue);
    assert!(h.platform.actions().is_empty());
}

#[tokio::test]
async fn untagged_accounts_are_never_judged() {
    let h = enforcing();

    for _ in 0..3 {
        let msg = h.message("u9", &"x".repeat(500));
        assert_eq!(
            h.moderator.process(&msg).await,
            Handled::Enforced(EnforcementOutcome::Ignored(IgnoreReason::NotTagged))
        );
        h.clock.advance(1);
    }
    assert!(h.platform.actions().is_empty());
    assert!(!h.store.lock().is_tagged(GROUP, "u9"));
}

#[tokio::test]
async fn overlong_message_warns_and_mutes_but_continues() {
    let h = enforcing();

    let exact = h.message("u1", &"a".repeat(20));
    assert_eq!(
        h.moderator.process(&exact).await,
        Handled::Enforced(EnforcementOutcome::Allowed)
    );

    h.clock.advance(60);
    let long = h.message("u1", &"a".repeat(21));
    assert_eq!(h.moderator.handle_message(&long).await, EventControl::Continue);
    assert_eq!(
        h.platform.actions(),
        vec![
            Action::Emit(NOTICE_TOO_LONG.into()),
            Action::Delete(long.message_id.clone()),
            Action::Mute {
                account: "u1".into(),
                secs: 1800
            },
        ]
    );
}

#[tokio::test]
async fn disabled_group_and_admins_are_exempt() {
    let h = enforcing();
    h.store.lock().set_enforcement(GROUP, false);

    let msg = h.message("u1", &"a".repeat(50));
    assert_eq!(
        h.moderator.process(&msg).await,
        Handled::Enforced(EnforcementOutcome::Ignored(IgnoreReason::EnforcementDisabled))
    );

    h.store.lock().set_enforcement(GROUP, true);
    let admin = h.message("u1", &"a".repeat(50)).with_role(Role::Admin);
    assert_eq!(
        h.moderator.process(&admin).await,
        Handled::Enforced(EnforcementOutcome::Ignored(IgnoreReason::Elevated))
    );
    assert!(h.platform.actions().is_empty());
}

#[tokio::test]
async fn failed_mute_still_stops_event() {
    let h = enforcing();
    h.platform.fail_mutes(true);

    let first = h.message("u1", "one");
    h.moderator.process(&first).await;
    let second = h.message("u1", "two");
    assert_eq!(h.moderator.handle_message(&second).await, EventControl::Stop);
    assert_eq!(h.platform.actions(), vec![Action::Delete(second.message_id.clone())]);
}

#[tokio::test(start_paused = true)]
async fn message_addressed_to_moderator_waits_out_grace_period() {
    let h = enforcing();
    let msg = h
        .message("u1", "hi")
        .with_segments(vec![Segment::Mention("nobot".into()), Segment::Text("hi".into())]);

    let started = tokio::time::Instant::now();
    assert_eq!(
        h.moderator.process(&msg).await,
        Handled::Enforced(EnforcementOutcome::Allowed)
    );
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn own_messages_are_skipped() {
    let h = enforcing();
    h.store.lock().tag(GROUP, "nobot");

    let own = h.message("nobot", &"a".repeat(100));
    assert_eq!(h.moderator.process(&own).await, Handled::OwnMessage);
    assert!(h.platform.actions().is_empty());
}
