//! Role model, distribution table, and dealt assignments
//!
//! Roles are dealt by shuffling the roster with the session RNG and
//! consuming a fixed per-count table, so a seeded game deals identically
//! on every replay. Also holds the rule and briefing text sent to agents
//! with their role offers.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ArbiterError, ArbiterResult};
use crate::protocol::ActionKind;

/// Smallest supported roster
pub const MIN_PLAYERS: usize = 5;
/// Largest supported roster
pub const MAX_PLAYERS: usize = 8;

/// A player's secret role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Predator,
    Defender,
    Seer,
    Doctor,
}

impl Role {
    /// The team this role wins with
    pub fn team(&self) -> Team {
        match self {
            Self::Predator => Team::Predators,
            Self::Defender | Self::Seer | Self::Doctor => Team::Defenders,
        }
    }

    pub fn is_predator(&self) -> bool {
        matches!(self, Self::Predator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predator => write!(f, "predator"),
            Self::Defender => write!(f, "defender"),
            Self::Seer => write!(f, "seer"),
            Self::Doctor => write!(f, "doctor"),
        }
    }
}

/// One of the two sides of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Predators,
    Defenders,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predators => write!(f, "predators"),
            Self::Defenders => write!(f, "defenders"),
        }
    }
}

/// Outcome of a game: a winning team, or an aborted run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Predators,
    Defenders,
    Error,
}

impl Winner {
    /// The winning team, `None` for an aborted game
    pub fn team(&self) -> Option<Team> {
        match self {
            Self::Predators => Some(Team::Predators),
            Self::Defenders => Some(Team::Defenders),
            Self::Error => None,
        }
    }
}

impl From<Team> for Winner {
    fn from(team: Team) -> Self {
        match team {
            Team::Predators => Self::Predators,
            Team::Defenders => Self::Defenders,
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predators => write!(f, "predators"),
            Self::Defenders => write!(f, "defenders"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Role counts for a given roster size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDistribution {
    pub predators: usize,
    pub seers: usize,
    pub doctors: usize,
    pub defenders: usize,
}

impl RoleDistribution {
    /// The fixed table for 5-8 players; `None` outside that range
    pub fn for_player_count(count: usize) -> Option<Self> {
        let (predators, seers, doctors, defenders) = match count {
            5 => (1, 1, 1, 2),
            6 => (1, 1, 1, 3),
            7 => (2, 1, 1, 3),
            8 => (2, 1, 1, 4),
            _ => return None,
        };
        Some(Self {
            predators,
            seers,
            doctors,
            defenders,
        })
    }

    pub fn total(&self) -> usize {
        self.predators + self.seers + self.doctors + self.defenders
    }

    /// Summary line included in the rules text ("2 predators, 1 seer, ...")
    pub fn summary(&self) -> String {
        format!(
            "{} predators, {} seer, {} doctor, {} defenders",
            self.predators, self.seers, self.doctors, self.defenders
        )
    }
}

/// Dealt roles for one game, preserving roster order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignments {
    roster: Vec<String>,
    roles: HashMap<String, Role>,
}

impl RoleAssignments {
    pub fn role_of(&self, player: &str) -> Option<Role> {
        self.roles.get(player).copied()
    }

    pub fn team_of(&self, player: &str) -> Option<Team> {
        self.role_of(player).map(|r| r.team())
    }

    /// The full roster in its original order
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// All predators, in roster order
    pub fn predators(&self) -> Vec<String> {
        self.roster
            .iter()
            .filter(|p| self.role_of(p).map(|r| r.is_predator()).unwrap_or(false))
            .cloned()
            .collect()
    }

    /// Fellow predators for the role offer. `Some` (possibly empty) for a
    /// predator, `None` for everyone else.
    pub fn teammates_of(&self, player: &str) -> Option<Vec<String>> {
        if !self.role_of(player)?.is_predator() {
            return None;
        }
        Some(
            self.roster
                .iter()
                .filter(|p| {
                    p.as_str() != player
                        && self.role_of(p).map(|r| r.is_predator()).unwrap_or(false)
                })
                .cloned()
                .collect(),
        )
    }

    /// Iterate players with their roles, in roster order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Role)> {
        self.roster
            .iter()
            .filter_map(|p| self.roles.get(p).map(|r| (p.as_str(), *r)))
    }

    /// Role map keyed by player name (for logs and events)
    pub fn as_map(&self) -> &HashMap<String, Role> {
        &self.roles
    }

    fn verify(&self, distribution: RoleDistribution) -> ArbiterResult<()> {
        if self.roles.len() != self.roster.len() {
            return Err(ArbiterError::config("duplicate player name in roster"));
        }
        let count = |role: Role| self.roles.values().filter(|r| **r == role).count();
        let dealt = RoleDistribution {
            predators: count(Role::Predator),
            seers: count(Role::Seer),
            doctors: count(Role::Doctor),
            defenders: count(Role::Defender),
        };
        if dealt != distribution {
            return Err(ArbiterError::config(format!(
                "role deal violated the distribution table: expected {:?}, dealt {:?}",
                distribution, dealt
            )));
        }
        Ok(())
    }
}

/// Deal roles for the roster using the injected RNG.
///
/// Shuffles a copy of the roster, then consumes the distribution table in
/// fixed order: predators, seer, doctor, defenders. Unsupported counts and
/// table violations are configuration errors raised before any remote call.
pub fn assign_roles<R: Rng>(roster: &[String], rng: &mut R) -> ArbiterResult<RoleAssignments> {
    let distribution = RoleDistribution::for_player_count(roster.len()).ok_or_else(|| {
        ArbiterError::config(format!(
            "unsupported player count {} (supported: {}..={})",
            roster.len(),
            MIN_PLAYERS,
            MAX_PLAYERS
        ))
    })?;

    let mut shuffled: Vec<&String> = roster.iter().collect();
    shuffled.shuffle(rng);

    let mut dealt: Vec<Role> = Vec::with_capacity(distribution.total());
    dealt.extend(std::iter::repeat(Role::Predator).take(distribution.predators));
    dealt.extend(std::iter::repeat(Role::Seer).take(distribution.seers));
    dealt.extend(std::iter::repeat(Role::Doctor).take(distribution.doctors));
    dealt.extend(std::iter::repeat(Role::Defender).take(distribution.defenders));

    let roles: HashMap<String, Role> = shuffled
        .into_iter()
        .cloned()
        .zip(dealt.into_iter())
        .collect();

    let assignments = RoleAssignments {
        roster: roster.to_vec(),
        roles,
    };
    assignments.verify(distribution)?;
    Ok(assignments)
}

// ── Briefing text ────────────────────────────────────────────────────

/// The general rules text sent with every role offer
pub fn game_rules(player_count: usize, distribution: RoleDistribution, role: Role) -> String {
    format!(
        "You are playing a social deduction game.\n\
         \n\
         PLAYERS: {player_count}\n\
         ROLES IN PLAY: {counts}\n\
         \n\
         HOW A ROUND WORKS:\n\
         1. NIGHT:\n\
            - Predators secretly pick a player to eliminate\n\
            - The seer learns one player's true role\n\
            - The doctor shields one player from elimination\n\
         \n\
         2. DAY:\n\
            - Everyone debates in the open\n\
            - Everyone votes; a majority exiles a suspect\n\
         \n\
         HOW TO WIN:\n\
         - Defenders win by exiling every predator\n\
         - Predators win once they equal or outnumber the defenders\n\
         \n\
         YOUR ROLE: {role}\n\
         Your full instructions are in the role briefing.\n",
        player_count = player_count,
        counts = distribution.summary(),
        role = role,
    )
}

/// The role-specific briefing sent with the role offer
pub fn role_briefing(role: Role) -> &'static str {
    match role {
        Role::Predator => {
            "You are a PREDATOR.\n\
             - Hide what you are and blend into the group\n\
             - Coordinate with fellow predators when you have them\n\
             - At night, choose eliminations that weaken the defenders most\n\
             - By day, steer suspicion away from your team and onto others\n"
        }
        Role::Defender => {
            "You are a DEFENDER.\n\
             - Watch for behaviour that does not add up\n\
             - Compare claims across rounds and call out contradictions\n\
             - Build trust with players whose stories hold\n\
             - Vote out the players you genuinely suspect\n"
        }
        Role::Seer => {
            "You are the SEER.\n\
             - Each night you learn one player's true role\n\
             - Revealing what you know makes you a target; time it carefully\n\
             - Guide the vote without exposing yourself too early\n\
             - Your findings are the defenders' best weapon\n"
        }
        Role::Doctor => {
            "You are the DOCTOR.\n\
             - Each night you shield one player from elimination\n\
             - You may shield yourself\n\
             - Anticipate who the predators will strike\n\
             - Keeping the seer alive is usually worth the risk\n"
        }
    }
}

/// Per-action guidance attached to action requests.
///
/// `teammates` only applies to [`ActionKind::Eliminate`], where the lead
/// predator is reminded who else hunts with them.
pub fn action_context(kind: ActionKind, teammates: Option<&[String]>) -> String {
    match kind {
        ActionKind::Eliminate => {
            let fellow = match teammates {
                Some(names) if !names.is_empty() => names.join(", "),
                _ => "none, you are the only predator".to_string(),
            };
            format!(
                "NIGHT ACTION: Choose a player to eliminate.\n\
                 \n\
                 Think about:\n\
                 - Who is most dangerous to your team right now\n\
                 - Whether the seer or doctor can be identified and removed\n\
                 - Whether the doctor is likely to shield your target\n\
                 - Whether removing an accuser takes the heat off you\n\
                 \n\
                 Fellow predators: {fellow}\n\
                 One elimination per night. Choose carefully.",
            )
        }
        ActionKind::Protect => "NIGHT ACTION: Choose one player to shield from elimination.\n\
             \n\
             Think about:\n\
             - You may shield yourself if you expect to be struck\n\
             - Predict where the predators will strike tonight\n\
             - Valuable players (the seer, trusted voices) draw strikes\n\
             - Patterns in earlier strikes often repeat\n\
             \n\
             If the predators strike your choice tonight, nobody dies."
            .to_string(),
        ActionKind::Investigate => "NIGHT ACTION: Choose one player to investigate.\n\
             \n\
             Think about:\n\
             - Spend investigations where your doubt is greatest\n\
             - Skip players whose behaviour already cleared them\n\
             - Suspicious debate behaviour is a good lead\n\
             - What you learn should eventually steer the vote\n\
             \n\
             You will learn whether the player is a PREDATOR or NOT A PREDATOR."
            .to_string(),
        ActionKind::Debate => "DAY PHASE: Speak to the group.\n\
             \n\
             You should:\n\
             - Say what recent events tell you\n\
             - Accuse with reasoning, not just names\n\
             - Defend yourself calmly when accused\n\
             - Note who supports whom, and why\n\
             \n\
             Predators: blend in and redirect suspicion. Defenders: surface what you know."
            .to_string(),
        ActionKind::Vote => "VOTING PHASE: Vote to exile one player.\n\
             \n\
             Think about:\n\
             - What the debate revealed about each player\n\
             - Contradictions between statements and actions\n\
             - Who gains from each possible exile\n\
             - Your own read matters more than the crowd's\n\
             \n\
             Predators: vote to thin the defenders without exposing yourself.\n\
             Defenders: vote for whoever you most suspect."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("player{}", i)).collect()
    }

    #[test]
    fn test_distribution_table() {
        let d5 = RoleDistribution::for_player_count(5).unwrap();
        assert_eq!((d5.predators, d5.seers, d5.doctors, d5.defenders), (1, 1, 1, 2));

        let d6 = RoleDistribution::for_player_count(6).unwrap();
        assert_eq!((d6.predators, d6.seers, d6.doctors, d6.defenders), (1, 1, 1, 3));

        let d7 = RoleDistribution::for_player_count(7).unwrap();
        assert_eq!((d7.predators, d7.seers, d7.doctors, d7.defenders), (2, 1, 1, 3));

        let d8 = RoleDistribution::for_player_count(8).unwrap();
        assert_eq!((d8.predators, d8.seers, d8.doctors, d8.defenders), (2, 1, 1, 4));

        assert!(RoleDistribution::for_player_count(4).is_none());
        assert!(RoleDistribution::for_player_count(9).is_none());

        for n in MIN_PLAYERS..=MAX_PLAYERS {
            assert_eq!(RoleDistribution::for_player_count(n).unwrap().total(), n);
        }
    }

    #[test]
    fn test_assign_roles_counts() {
        for n in MIN_PLAYERS..=MAX_PLAYERS {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            let assignments = assign_roles(&roster(n), &mut rng).unwrap();
            let distribution = RoleDistribution::for_player_count(n).unwrap();

            let count =
                |role: Role| assignments.iter().filter(|(_, r)| *r == role).count();
            assert_eq!(count(Role::Predator), distribution.predators);
            assert_eq!(count(Role::Seer), distribution.seers);
            assert_eq!(count(Role::Doctor), distribution.doctors);
            assert_eq!(count(Role::Defender), distribution.defenders);

            // Every player holds exactly one role
            for player in roster(n) {
                assert!(assignments.role_of(&player).is_some());
            }
        }
    }

    #[test]
    fn test_assign_roles_unsupported_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let err = assign_roles(&roster(4), &mut rng).unwrap_err();
        assert!(err.to_string().contains("unsupported player count"));

        let err = assign_roles(&roster(9), &mut rng).unwrap_err();
        assert!(err.to_string().contains("unsupported player count"));
    }

    #[test]
    fn test_assign_roles_duplicate_name() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut names = roster(5);
        names[4] = "player1".to_string();
        let err = assign_roles(&names, &mut rng).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_assign_roles_deterministic() {
        let names = roster(8);
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let first = assign_roles(&names, &mut a).unwrap();
        let second = assign_roles(&names, &mut b).unwrap();
        for player in &names {
            assert_eq!(first.role_of(player), second.role_of(player));
        }
    }

    #[test]
    fn test_teammates() {
        // 7 players -> two predators who see each other
        let names = roster(7);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let assignments = assign_roles(&names, &mut rng).unwrap();

        let predators = assignments.predators();
        assert_eq!(predators.len(), 2);

        let mates = assignments.teammates_of(&predators[0]).unwrap();
        assert_eq!(mates, vec![predators[1].clone()]);

        // Non-predators get no teammates list
        for player in &names {
            if !assignments.role_of(player).unwrap().is_predator() {
                assert!(assignments.teammates_of(player).is_none());
            }
        }

        // 5 players -> lone predator gets an empty list, not None
        let names = roster(5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let assignments = assign_roles(&names, &mut rng).unwrap();
        let lone = &assignments.predators()[0];
        assert_eq!(assignments.teammates_of(lone), Some(vec![]));
    }

    #[test]
    fn test_role_team_and_display() {
        assert_eq!(Role::Predator.team(), Team::Predators);
        assert_eq!(Role::Defender.team(), Team::Defenders);
        assert_eq!(Role::Seer.team(), Team::Defenders);
        assert_eq!(Role::Doctor.team(), Team::Defenders);

        assert_eq!(Role::Predator.to_string(), "predator");
        assert_eq!(Role::Seer.to_string(), "seer");
        assert_eq!(Team::Predators.to_string(), "predators");
        assert_eq!(Team::Defenders.to_string(), "defenders");
    }

    #[test]
    fn test_winner() {
        assert_eq!(Winner::from(Team::Predators), Winner::Predators);
        assert_eq!(Winner::from(Team::Defenders).team(), Some(Team::Defenders));
        assert_eq!(Winner::Error.team(), None);
        assert_eq!(Winner::Error.to_string(), "error");
        assert_eq!(
            serde_json::to_value(Winner::Defenders).unwrap(),
            serde_json::json!("defenders")
        );
    }

    #[test]
    fn test_briefing_texts() {
        let distribution = RoleDistribution::for_player_count(5).unwrap();
        let rules = game_rules(5, distribution, Role::Seer);
        assert!(rules.contains("PLAYERS: 5"));
        assert!(rules.contains("1 predators"));
        assert!(rules.contains("YOUR ROLE: seer"));

        for role in [Role::Predator, Role::Defender, Role::Seer, Role::Doctor] {
            assert!(!role_briefing(role).is_empty());
        }
    }

    #[test]
    fn test_action_context_teammates() {
        let mates = vec!["wolfie".to_string()];
        let ctx = action_context(ActionKind::Eliminate, Some(&mates));
        assert!(ctx.contains("wolfie"));

        let solo = action_context(ActionKind::Eliminate, Some(&[]));
        assert!(solo.contains("only predator"));

        let vote = action_context(ActionKind::Vote, None);
        assert!(vote.contains("exile"));
    }
}
