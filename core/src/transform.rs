//! In-place edits applied between decode and encode
//!
//! All operations are pure functions over a loaded [`Macro`]. Apart from
//! [`offset`] and the flips, running an operation twice gives the same result
//! as running it once.

use crate::types::{Macro, Player};
use std::cmp::Ordering;

/// A single edit step, as requested by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Add a signed delta to every position
    Offset(f64),
    /// Swap press and release
    FlipHold,
    /// Swap player 1 and player 2
    FlipPlayer,
    /// Drop every action not belonging to this player
    KeepPlayer(Player),
    /// Stable ascending sort by position
    SortByPosition,
    /// Collapse repeated same-state actions per player
    RemoveRedundant,
}

/// What a batch of transforms did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Actions dropped by [`Transform::RemoveRedundant`]
    pub redundant_removed: usize,
    /// Actions dropped by [`Transform::KeepPlayer`]
    pub filtered_out: usize,
}

/// Apply `transforms` in order
pub fn apply(m: &mut Macro, transforms: &[Transform]) -> TransformReport {
    let mut report = TransformReport::default();
    for transform in transforms {
        match *transform {
            Transform::Offset(delta) => offset(m, delta),
            Transform::FlipHold => flip_hold(m),
            Transform::FlipPlayer => flip_player(m),
            Transform::KeepPlayer(player) => {
                let before = m.actions.len();
                retain_player(m, player);
                report.filtered_out += before - m.actions.len();
            }
            Transform::SortByPosition => sort_by_position(m),
            Transform::RemoveRedundant => report.redundant_removed += remove_redundant(m),
        }
        tracing::trace!(?transform, actions = m.actions.len(), "applied transform");
    }
    report
}

/// Shift every position by `delta`. No clamping: negative positions are the
/// caller's problem.
pub fn offset(m: &mut Macro, delta: f64) {
    for action in &mut m.actions {
        action.position += delta;
    }
}

pub fn flip_hold(m: &mut Macro) {
    for action in &mut m.actions {
        action.hold = !action.hold;
    }
}

pub fn flip_player(m: &mut Macro) {
    for action in &mut m.actions {
        action.is_player2 = !action.is_player2;
    }
}

/// Keep only the actions of `player`
pub fn retain_player(m: &mut Macro, player: Player) {
    let keep_p2 = player.is_player2();
    m.actions.retain(|a| a.is_player2 == keep_p2);
}

/// Stable sort on the primary position only; ties keep their order.
///
/// NaN positions go last, after every ordinary position.
pub fn sort_by_position(m: &mut Macro) {
    m.actions.sort_by(|a, b| {
        match (a.position.is_nan(), b.position.is_nan()) {
            (false, false) => a
                .position
                .partial_cmp(&b.position)
                .unwrap_or(Ordering::Equal),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        }
    });
}

/// Drop actions that don't change their player's hold state.
///
/// Both players start released. Returns the number of actions removed.
pub fn remove_redundant(m: &mut Macro) -> usize {
    let mut held = [false, false];
    let before = m.actions.len();
    m.actions.retain(|a| {
        let slot = &mut held[usize::from(a.is_player2)];
        if *slot == a.hold {
            false
        } else {
            *slot = a.hold;
            true
        }
    });
    before - m.actions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    fn sample() -> Macro {
        let mut m = Macro::new(60.0, true);
        m.actions = vec![
            Action::new(10.0, true, false),
            Action::new(12.0, true, false),
            Action::new(12.0, true, true),
            Action::new(15.0, false, false),
            Action::new(16.0, false, false),
            Action::new(18.0, false, true),
        ];
        m
    }

    #[test]
    fn test_offset_allows_negative() {
        let mut m = sample();
        offset(&mut m, -11.0);
        assert_eq!(m.actions[0].position, -1.0);
        assert_eq!(m.actions[5].position, 7.0);
    }

    #[test]
    fn test_flips_are_involutions() {
        let original = sample();
        let mut m = original.clone();
        flip_hold(&mut m);
        assert!(!m.actions[0].hold);
        flip_hold(&mut m);
        flip_player(&mut m);
        assert!(m.actions[0].is_player2);
        flip_player(&mut m);
        assert_eq!(m, original);
    }

    #[test]
    fn test_retain_player() {
        let mut m = sample();
        retain_player(&mut m, Player::Two);
        assert_eq!(m.actions.len(), 2);
        assert!(m.actions.iter().all(|a| a.is_player2));
    }

    #[test]
    fn test_remove_redundant() {
        let mut m = sample();
        let removed = remove_redundant(&mut m);
        assert_eq!(removed, 2);
        let positions: Vec<f64> = m.actions.iter().map(|a| a.position).collect();
        assert_eq!(positions, vec![10.0, 12.0, 15.0, 18.0]);
    }

    #[test]
    fn test_remove_redundant_drops_leading_release() {
        let mut m = Macro::new(60.0, false);
        m.actions = vec![
            Action::new(1.0, false, false),
            Action::new(2.0, true, false),
        ];
        assert_eq!(remove_redundant(&mut m), 1);
        assert!(m.actions[0].hold);
    }

    #[test]
    fn test_remove_redundant_idempotent() {
        let mut once = sample();
        remove_redundant(&mut once);
        let mut twice = once.clone();
        assert_eq!(remove_redundant(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_moves_nan_last() {
        let mut m = Macro::new(60.0, false);
        m.actions = [4.0, f64::NAN, 2.0, 9.0, f64::NAN, 1.0, 3.0]
            .into_iter()
            .enumerate()
            .map(|(i, x)| Action::new(x, true, i % 2 == 1))
            .collect();
        sort_by_position(&mut m);

        let positions: Vec<f64> = m.actions.iter().map(|a| a.position).collect();
        assert_eq!(&positions[..5], &[1.0, 2.0, 3.0, 4.0, 9.0]);
        assert!(positions[5..].iter().all(|x| x.is_nan()));
        // NaNs keep their relative order too
        assert!(m.actions[5].is_player2);
        assert!(!m.actions[6].is_player2);
    }

    #[test]
    fn test_sort_is_stable_single_key() {
        let mut m = Macro::new(60.0, false);
        m.actions = vec![
            Action::new(5.0, true, true).with_secondary(1.0),
            Action::new(1.0, true, false),
            Action::new(5.0, false, false).with_secondary(0.0),
        ];
        sort_by_position(&mut m);
        assert_eq!(m.actions[0].position, 1.0);
        // Ties stay in input order even though the secondary key would reorder them
        assert!(m.actions[1].is_player2);
        assert!(!m.actions[2].is_player2);
    }

    #[test]
    fn test_sort_already_sorted_is_noop() {
        let mut m = sample();
        let before = m.clone();
        sort_by_position(&mut m);
        assert_eq!(m, before);
    }

    #[test]
    fn test_apply_reports_counts() {
        let mut m = sample();
        let report = apply(
            &mut m,
            &[
                Transform::KeepPlayer(Player::One),
                Transform::RemoveRedundant,
                Transform::Offset(1.0),
            ],
        );
        assert_eq!(report.filtered_out, 2);
        assert_eq!(report.redundant_removed, 2);
        assert_eq!(m.actions.len(), 2);
        assert_eq!(m.actions[0].position, 11.0);
    }
}
