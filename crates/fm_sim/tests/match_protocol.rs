//! End-to-end tests of the round protocol: liveness, report shape
//! and seed determinism across full multi-agent runs.

use fm_core::{grid, PitchConfig, TeamSide};
use fm_sim::MatchRunner;

fn small_match(rounds_per_half: u32) -> PitchConfig {
    PitchConfig { rounds_per_half, ..Default::default() }
}

#[test]
fn produces_one_report_per_round_without_deadlock() {
    let cfg = small_match(30);
    let summary = MatchRunner::new(cfg, 5).expect("valid config").run().expect("match runs");
    assert_eq!(summary.reports.len(), 60, "two halves of 30 rounds each");
    for (i, report) in summary.reports.iter().enumerate() {
        assert_eq!(report.round, i as u32, "reports arrive in round order");
    }
}

#[test]
fn reports_are_well_formed() {
    let cfg = small_match(25);
    let summary = MatchRunner::new(cfg.clone(), 11).expect("valid config").run().expect("match runs");
    for report in &summary.reports {
        assert_eq!(report.lines.len(), cfg.num_players(), "every roster slot reports");
        assert!(cfg.in_bounds(report.ball), "ball stays on the pitch: {:?}", report.ball);
        let home = report.lines.iter().filter(|l| l.team == TeamSide::Home).count();
        assert_eq!(home, cfg.players_per_team);
        for line in &report.lines {
            assert!(cfg.in_bounds(line.new_position), "players stay on the pitch");
            // A patch boundary never splits a player from its patch.
            let _ = grid::patch_of(line.new_position, &cfg);
        }
        let kickers = report.lines.iter().filter(|l| l.kicked).count();
        match report.winner {
            Some(_) => assert_eq!(kickers, 1, "exactly the winner kicks"),
            None => assert_eq!(kickers, 0, "nobody kicks without a winner"),
        }
    }
}

#[test]
fn score_is_monotone_and_tied_to_goals() {
    let cfg = small_match(40);
    let summary = MatchRunner::new(cfg, 23).expect("valid config").run().expect("match runs");
    let mut prev = [0u32, 0u32];
    for report in &summary.reports {
        match report.goal {
            Some(team) => {
                assert_eq!(report.score[team.index()], prev[team.index()] + 1);
                assert_eq!(report.score[team.opponent().index()], prev[team.opponent().index()]);
            }
            None => assert_eq!(report.score, prev, "score only moves on a goal"),
        }
        prev = report.score;
    }
    assert_eq!(summary.score, prev);
}

#[test]
fn same_seed_reproduces_the_match_byte_for_byte() {
    let cfg = small_match(20);
    let a = MatchRunner::new(cfg.clone(), 42).expect("valid config").run().expect("first run");
    let b = MatchRunner::new(cfg, 42).expect("valid config").run().expect("second run");
    let a_json = serde_json::to_string(&a.reports).expect("serialize");
    let b_json = serde_json::to_string(&b.reports).expect("serialize");
    assert_eq!(a_json, b_json, "fixed seed must reproduce every report exactly");
}

#[test]
fn different_seeds_diverge() {
    let cfg = small_match(10);
    let a = MatchRunner::new(cfg.clone(), 1).expect("valid config").run().expect("run");
    let b = MatchRunner::new(cfg, 2).expect("valid config").run().expect("run");
    assert_ne!(
        serde_json::to_string(&a.reports).expect("serialize"),
        serde_json::to_string(&b.reports).expect("serialize"),
        "22 random kickoff positions cannot coincide across seeds"
    );
}

#[test]
fn half_time_swaps_attack_direction_in_reports() {
    let cfg = small_match(15);
    let summary = MatchRunner::new(cfg, 8).expect("valid config").run().expect("match runs");
    assert!(summary.reports[..15].iter().all(|r| r.half == fm_core::Half::First));
    assert!(summary.reports[15..].iter().all(|r| r.half == fm_core::Half::Second));
}
