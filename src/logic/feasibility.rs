//! Draw feasibility: how many matches each team can play with the given rounds and courts.

use crate::models::{DrawConfiguration, DrawParameters, Feasibility};

/// Find the largest matches-per-team `m` in `1..=total_rounds` that yields a valid schedule.
///
/// A candidate `m` is accepted when:
/// 1. `team_count * m` is even, so `total_matches = team_count * m / 2` is whole.
/// 2. `total_matches / total_rounds` (unrounded) does not exceed `available_courts`.
/// 3. `team_count > m`, since a team cannot meet more opponents than exist.
///
/// Candidates are tried from `total_rounds` downward and the first hit wins, which favours
/// more matches per team over fewer courts in use. Zero teams or zero rounds is infeasible.
pub fn find_draw_configuration(params: DrawParameters) -> Feasibility {
    let DrawParameters {
        team_count,
        total_rounds,
        available_courts,
    } = params;

    if team_count == 0 || total_rounds == 0 {
        return Feasibility::Infeasible;
    }

    let teams = team_count as u64;
    for matches_per_team in (1..=total_rounds).rev() {
        let participations = teams * u64::from(matches_per_team);
        if participations % 2 != 0 {
            continue;
        }
        let total_matches = participations / 2;
        let matches_per_turn = total_matches as f64 / f64::from(total_rounds);
        if matches_per_turn <= f64::from(available_courts) && teams > u64::from(matches_per_team) {
            log::debug!(
                "{team_count} teams, {total_rounds} rounds, {available_courts} courts: \
                 {matches_per_team} matches per team"
            );
            return Feasibility::Feasible(DrawConfiguration {
                total_matches,
                matches_per_turn,
                matches_per_team,
            });
        }
    }

    log::debug!("{team_count} teams, {total_rounds} rounds, {available_courts} courts: infeasible");
    Feasibility::Infeasible
}

/// Convenience wrapper over [`find_draw_configuration`].
pub fn evaluate(team_count: usize, total_rounds: u32, available_courts: u32) -> Feasibility {
    find_draw_configuration(DrawParameters {
        team_count,
        total_rounds,
        available_courts,
    })
}
