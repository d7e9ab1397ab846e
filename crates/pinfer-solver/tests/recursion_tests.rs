use super::*;

fn small(max_depth: u32, max_iterations: u32) -> RecursionGuard<u32> {
    RecursionGuard::with_profile(RecursionProfile::Custom {
        max_depth,
        max_iterations,
    })
}

#[test]
fn test_enter_and_leave() {
    let mut guard = small(10, 100);

    assert!(guard.enter(1).is_entered());
    assert!(guard.is_open(&1));
    assert_eq!(guard.depth(), 1);
    guard.leave(1);
    assert!(!guard.is_open(&1));
    assert_eq!(guard.depth(), 0);
}

#[test]
fn test_reentry_is_a_cycle() {
    let mut guard: RecursionGuard<(u32, u32)> =
        RecursionGuard::with_profile(RecursionProfile::Definitions);

    assert!(guard.enter((1, 2)).is_entered());
    assert!(guard.enter((2, 1)).is_entered());
    let again = guard.enter((1, 2));
    assert!(again.is_cycle());
    assert!(!again.is_limit());
    guard.leave((2, 1));
    guard.leave((1, 2));
}

#[test]
fn test_depth_limit() {
    let mut guard = small(2, 100);

    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    guard.leave(2);
    assert!(guard.enter(3).is_entered());
    guard.leave(3);
    guard.leave(1);
}

#[test]
fn test_entry_budget() {
    let mut guard = small(10, 2);

    for key in [1, 2] {
        assert!(guard.enter(key).is_entered());
        guard.leave(key);
    }
    assert_eq!(guard.enter(3), RecursionResult::IterationExceeded);
    assert_eq!(guard.entries(), 2);
}

#[test]
fn test_depth_counter() {
    let mut counter = DepthCounter::new(1);

    assert!(counter.enter());
    assert!(!counter.enter());
    counter.leave();
    assert_eq!(counter.depth(), 0);
}

#[test]
fn test_profiles() {
    assert_eq!(RecursionProfile::Definitions.max_depth(), 64);
    assert_eq!(RecursionProfile::Expressions.max_depth(), 256);
    assert_eq!(
        RecursionProfile::Definitions.with_depth(8),
        RecursionProfile::Custom {
            max_depth: 8,
            max_iterations: 200_000
        }
    );
}
