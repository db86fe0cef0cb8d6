//! Shot Processor
//!
//! Commits agent-computed shot outcomes to the roster and detects the
//! winner. Shot reports are trusted: the coordinator stores the reported
//! health instead of recomputing damage.

use crate::game::roster::{Roster, RosterSource};
use crate::game::state::{Participant, ShootoutError, ShootoutState, ShotReport, Winner};

/// Effect of a committed shot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShotOutcome {
    /// Target record after the update.
    pub target: Participant,
    /// Participants alive after the update.
    pub alive: usize,
    /// Set when this shot left a single survivor.
    pub winner: Option<Winner>,
}

/// Single pass over the roster with the report substituted in.
struct Tally {
    index: Option<usize>,
    alive: usize,
    survivor: Option<usize>,
}

impl Tally {
    fn project(roster: &Roster, report: &ShotReport) -> Self {
        let mut tally = Tally { index: None, alive: 0, survivor: None };
        for (i, p) in roster.iter().enumerate() {
            let alive = if p.name == report.name {
                tally.index = Some(i);
                report.alive
            } else {
                p.alive
            };
            if alive {
                tally.alive += 1;
                tally.survivor = Some(i);
            }
        }
        tally
    }
}

impl ShootoutState {
    /// Apply a shot report, declaring a winner and reloading the roster
    /// from `source` when only one participant is left alive.
    ///
    /// Every check, including the reload, runs before the roster is
    /// touched: a rejected report leaves the state exactly as it was.
    pub fn commit_shot(
        &mut self,
        report: &ShotReport,
        source: &dyn RosterSource,
    ) -> Result<ShotOutcome, ShootoutError> {
        if !self.is_active() {
            return Err(ShootoutError::RoundNotActive);
        }
        if report.name.is_empty() {
            return Err(ShootoutError::MissingName);
        }
        if !report.is_consistent() {
            return Err(ShootoutError::InvalidReport {
                name: report.name.clone(),
                health: report.health,
                alive: report.alive,
            });
        }

        let tally = Tally::project(&self.roster, report);
        let index = tally.index
            .ok_or_else(|| ShootoutError::UnknownParticipant(report.name.clone()))?;

        let current = self.roster.at(index).health;
        if report.health > current {
            return Err(ShootoutError::StaleReport {
                name: report.name.clone(),
                current,
                reported: report.health,
            });
        }

        // Nobody left after this shot: the target was already the last one
        // standing and the shooter is dead. The target wins unharmed.
        if tally.alive == 0 {
            let survivor = self.roster.at(index).clone();
            if !survivor.alive {
                return Err(ShootoutError::NoSurvivors);
            }
            let next = Roster::load(source)?;
            let winner = self.conclude(survivor.clone(), next);
            return Ok(ShotOutcome { target: survivor, alive: 1, winner: Some(winner) });
        }

        let next_roster = match tally.alive {
            1 => Some(Roster::load(source)?),
            _ => None,
        };

        self.roster.apply_at(index, report.health, report.alive);
        let target = self.roster.at(index).clone();

        let winner = match (next_roster, tally.survivor) {
            (Some(next), Some(survivor)) => {
                let survivor = self.roster.at(survivor).clone();
                Some(self.conclude(survivor, next))
            }
            _ => None,
        };

        Ok(ShotOutcome { target, alive: tally.alive, winner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::roster::{RosterError, StaticRosterSource};
    use crate::game::state::RoundState;
    use proptest::prelude::*;

    struct BrokenSource;

    impl RosterSource for BrokenSource {
        fn load(&self) -> Result<Vec<Participant>, RosterError> {
            Err(RosterError::Empty)
        }
    }

    fn cowboys() -> Vec<Participant> {
        vec![
            Participant::new("A", 100, 10),
            Participant::new("B", 100, 15),
            Participant::new("C", 100, 20),
        ]
    }

    fn active(participants: Vec<Participant>) -> (ShootoutState, StaticRosterSource) {
        let source = StaticRosterSource::new(participants);
        let mut state = ShootoutState::new(Roster::load(&source).unwrap());
        while !state.is_active() {
            state.register().unwrap();
        }
        (state, source)
    }

    #[test]
    fn test_overwrites_reported_values() {
        let (mut state, source) = active(cowboys());
        let outcome = state.commit_shot(&ShotReport::new("B", 85), &source).unwrap();

        assert_eq!(outcome.target.health, 85);
        assert!(outcome.target.alive);
        assert_eq!(outcome.alive, 3);
        assert!(outcome.winner.is_none());
        assert_eq!(state.roster().get("B").unwrap().health, 85);
    }

    #[test]
    fn test_kill_without_winner() {
        let (mut state, source) = active(cowboys());
        let outcome = state.commit_shot(&ShotReport::new("C", 0), &source).unwrap();

        assert!(!outcome.target.alive);
        assert_eq!(outcome.alive, 2);
        assert!(outcome.winner.is_none());
        assert!(state.is_active());
    }

    #[test]
    fn test_last_kill_declares_winner_and_reloads() {
        let (mut state, source) = active(cowboys());
        state.commit_shot(&ShotReport::new("C", 0), &source).unwrap();
        state.commit_shot(&ShotReport::new("A", 40), &source).unwrap();
        let outcome = state.commit_shot(&ShotReport::new("B", 0), &source).unwrap();

        let winner = outcome.winner.unwrap();
        assert_eq!(winner.participant, Participant::new("A", 40, 10));
        assert_eq!(winner.round, 1);

        assert_eq!(state.round_state(), RoundState::Concluded);
        assert_eq!(state.round(), 2);
        assert_eq!(state.roster().count_alive(), 3);
        assert_eq!(state.roster().get("A").unwrap().health, 100);
        assert_eq!(state.current_winner(), Some(&winner));
    }

    #[test]
    fn test_dead_shooter_cannot_kill_last_survivor() {
        let (mut state, source) = active(vec![
            Participant::new("A", 10, 1),
            Participant::new("B", 0, 1),
        ]);

        let outcome = state.commit_shot(&ShotReport::new("A", 0), &source).unwrap();

        let winner = outcome.winner.unwrap();
        assert_eq!(winner.participant, Participant::new("A", 10, 1));
        assert_eq!(outcome.alive, 1);
        assert_eq!(state.round_state(), RoundState::Concluded);
        assert_eq!(state.current_winner(), Some(&winner));
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let (mut state, source) = active(cowboys());
        state.commit_shot(&ShotReport::new("B", 50), &source).unwrap();
        let before = state.roster().clone();

        let unknown = state.commit_shot(&ShotReport::new("Z", 0), &source);
        assert!(matches!(unknown, Err(ShootoutError::UnknownParticipant(_))));

        let mut zombie = ShotReport::new("A", 0);
        zombie.alive = true;
        assert!(matches!(state.commit_shot(&zombie, &source), Err(ShootoutError::InvalidReport { .. })));

        let stale = state.commit_shot(&ShotReport::new("B", 90), &source);
        assert!(matches!(stale, Err(ShootoutError::StaleReport { current: 50, reported: 90, .. })));

        assert_eq!(state.roster(), &before);
    }

    #[test]
    fn test_reload_failure_rejects_concluding_shot() {
        let (mut state, _) = active(vec![Participant::new("A", 10, 1), Participant::new("B", 10, 1)]);
        let before = state.roster().clone();

        let result = state.commit_shot(&ShotReport::new("B", 0), &BrokenSource);
        assert!(matches!(result, Err(ShootoutError::ConfigLoad(RosterError::Empty))));
        assert_eq!(state.roster(), &before);
        assert!(state.is_active());
        assert!(state.current_winner().is_none());
    }

    #[test]
    fn test_rejects_shots_outside_active_round() {
        let source = StaticRosterSource::new(cowboys());
        let mut state = ShootoutState::new(Roster::load(&source).unwrap());
        let result = state.commit_shot(&ShotReport::new("A", 5), &source);
        assert!(matches!(result, Err(ShootoutError::RoundNotActive)));
    }

    #[test]
    fn test_two_player_scenario() {
        let (mut state, source) = active(vec![
            Participant::new("A", 100, 10),
            Participant::new("B", 100, 15),
        ]);

        let mut a = 100u32;
        let mut b = 100u32;
        let winner = loop {
            b = b.saturating_sub(10);
            if let Some(w) = state.commit_shot(&ShotReport::new("B", b), &source).unwrap().winner {
                break w;
            }
            a = a.saturating_sub(15);
            if let Some(w) = state.commit_shot(&ShotReport::new("A", a), &source).unwrap().winner {
                break w;
            }
        };

        // A falls to B's seventh shot while B still has 30 left
        assert_eq!(winner.participant.name, "B");
        assert_eq!(winner.participant.health, 30);

        let fresh = state.register().unwrap();
        assert_eq!(fresh.participant, Participant::new("A", 100, 10));
    }

    proptest! {
        #[test]
        fn prop_alive_matches_health_and_single_winner(
            shots in proptest::collection::vec((0usize..4, 0u32..40), 1..60)
        ) {
            let participants: Vec<_> = (0..4)
                .map(|i| Participant::new(format!("P{i}"), 100, 10))
                .collect();
            let (mut state, source) = active(participants);
            let mut winners = 0;

            for (who, dmg) in shots {
                if !state.is_active() {
                    break;
                }
                let name = format!("P{who}");
                let health = state.roster().get(&name).unwrap().health.saturating_sub(dmg);
                let outcome = state.commit_shot(&ShotReport::new(name, health), &source).unwrap();
                if outcome.winner.is_some() {
                    winners += 1;
                }
                prop_assert!(state.roster().iter().all(Participant::is_consistent));
            }

            prop_assert!(winners <= 1);
            prop_assert_eq!(winners == 1, state.round_state() == RoundState::Concluded);
        }
    }
}
