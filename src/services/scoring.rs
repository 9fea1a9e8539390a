//! Pure scoring rules.
//!
//! Per completed round: every voter who guessed the suggester earns one
//! point; when nobody guessed right the suggester earns one consolation
//! point instead. Each round therefore awards `max(correct_voters, 1)`
//! points in total.

use indexmap::IndexMap;

use crate::state::rooms::{Game, PlayerId, Round, RoundStatus};

/// Points one player earned from a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDelta {
    /// The earning player.
    pub player_id: PlayerId,
    /// Points to add to the player's score.
    pub points: u32,
}

/// Score deltas of a single completed round. Rounds without a song (never
/// played) award nothing.
pub fn round_deltas(round: &Round) -> Vec<ScoreDelta> {
    let Some(song) = &round.song else {
        return Vec::new();
    };

    let correct: Vec<&PlayerId> = round
        .votes
        .iter()
        .filter_map(|(voter, guess)| {
            guess
                .as_ref()
                .filter(|target| **target == song.suggested_by)
                .map(|_| voter)
        })
        .collect();

    if correct.is_empty() {
        return vec![ScoreDelta {
            player_id: song.suggested_by.clone(),
            points: 1,
        }];
    }

    correct
        .into_iter()
        .map(|voter| ScoreDelta {
            player_id: voter.clone(),
            points: 1,
        })
        .collect()
}

/// Aggregate the deltas of every completed round of a game, in first-earned
/// order.
pub fn compute_scores(game: &Game) -> Vec<ScoreDelta> {
    let mut totals: IndexMap<PlayerId, u32> = IndexMap::new();
    for round in game.rounds.values() {
        if round.status != RoundStatus::Completed {
            continue;
        }
        for delta in round_deltas(round) {
            *totals.entry(delta.player_id).or_insert(0) += delta.points;
        }
    }
    totals
        .into_iter()
        .map(|(player_id, points)| ScoreDelta { player_id, points })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::rooms::RoundSong;

    fn completed_round(
        suggested_by: &str,
        votes: &[(&str, Option<&str>)],
    ) -> Round {
        let mut round = Round::new(1, votes.iter().map(|(voter, _)| (*voter).to_string()));
        round.song = Some(RoundSong {
            song_id: "s".into(),
            song_title: "Song".into(),
            suggested_by: suggested_by.into(),
        });
        for (voter, guess) in votes {
            round
                .votes
                .insert((*voter).into(), guess.map(str::to_string));
        }
        round.status = RoundStatus::Completed;
        round
    }

    #[test]
    fn correct_voter_earns_a_point() {
        let round = completed_round("p2", &[("p2", Some("p3")), ("p3", Some("p2"))]);
        let deltas = round_deltas(&round);
        assert_eq!(
            deltas,
            vec![ScoreDelta {
                player_id: "p3".into(),
                points: 1
            }]
        );
    }

    #[test]
    fn suggester_earns_consolation_when_nobody_guesses_right() {
        let round = completed_round("p2", &[("p2", Some("p3")), ("p3", Some("p1"))]);
        let deltas = round_deltas(&round);
        assert_eq!(
            deltas,
            vec![ScoreDelta {
                player_id: "p2".into(),
                points: 1
            }]
        );
    }

    #[test]
    fn every_round_awards_max_of_correct_voters_and_one() {
        for votes in [
            vec![("p2", Some("p4")), ("p3", Some("p4")), ("p4", Some("p2"))],
            vec![("p2", Some("p4")), ("p3", Some("p2")), ("p4", Some("p2"))],
            vec![("p2", Some("p3")), ("p3", Some("p2")), ("p4", Some("p2"))],
        ] {
            let round = completed_round("p4", &votes);
            let correct = votes
                .iter()
                .filter(|(_, guess)| *guess == Some("p4"))
                .count();
            let total: u32 = round_deltas(&round).iter().map(|d| d.points).sum();
            assert_eq!(total as usize, correct.max(1));
        }
    }

    #[test]
    fn open_rounds_are_ignored_by_aggregation() {
        let mut game = Game::new(
            1,
            "p1".into(),
            ["p2".to_string(), "p3".to_string()],
            ["p2".to_string(), "p3".to_string()],
        );
        let closed = completed_round("p2", &[("p2", Some("p3")), ("p3", Some("p2"))]);
        game.rounds.insert(closed.id.clone(), closed);
        // round1 stays open with no song.
        let deltas = compute_scores(&game);
        assert_eq!(
            deltas,
            vec![ScoreDelta {
                player_id: "p3".into(),
                points: 1
            }]
        );
    }

    #[test]
    fn aggregation_sums_across_rounds() {
        let mut game = Game::new(
            1,
            "p1".into(),
            ["p2".to_string(), "p3".to_string()],
            ["p2".to_string(), "p3".to_string()],
        );
        game.rounds.clear();
        let mut first = completed_round("p2", &[("p2", Some("p3")), ("p3", Some("p2"))]);
        first.id = "round1".into();
        let mut second = completed_round("p3", &[("p2", Some("p3")), ("p3", Some("p2"))]);
        second.id = "round2".into();
        game.rounds.insert(first.id.clone(), first);
        game.rounds.insert(second.id.clone(), second);

        let deltas = compute_scores(&game);
        assert!(deltas.contains(&ScoreDelta {
            player_id: "p3".into(),
            points: 1
        }));
        assert!(deltas.contains(&ScoreDelta {
            player_id: "p2".into(),
            points: 1
        }));
    }
}
