//! Bottom-up majority aggregation over the path tree

use crate::agreement::error::{AgreementError, AgreementResult};
use crate::agreement::ledger::Ledger;
use crate::agreement::participant::Participant;
use crate::agreement::tree::PathTree;
use crate::agreement::types::{FaultPolicy, Message, ParticipantId, RelayPath};
use tracing::warn;

/// Majority over aggregated child values.
///
/// `total` is the number of children the tree defines for the path. Attack
/// wins only with strictly more than half of `total`; ties and childless
/// paths resolve to Retreat.
pub fn majority<I>(outputs: I, total: usize) -> Message
where
    I: IntoIterator<Item = Message>,
{
    let attacks = outputs
        .into_iter()
        .filter(|value| *value == Message::Attack)
        .count();
    if attacks * 2 > total {
        Message::Attack
    } else {
        Message::Retreat
    }
}

/// Compute `participant`'s decision from its own ledger.
///
/// Leaves (round `m`) take the value received as their output; every other
/// path takes the majority of its children's outputs, working from round
/// `m - 1` back to round 0. The decision is the output of the commander's
/// direct broadcast. The commander itself decides its original order.
pub fn decide(
    participant: &Participant,
    tree: &PathTree,
    policy: FaultPolicy,
) -> AgreementResult<Message> {
    if participant.is_commander() {
        return Ok(participant.order());
    }

    let id = participant.id();
    let mut ledger = participant.ledger_mut();
    let leaf_round = tree.tolerance();

    for path in tree.paths_in_round(leaf_round) {
        let input = match ledger.get(path) {
            Some(record) => record.input,
            None => {
                fault(policy, missing(id, path))?;
                continue;
            }
        };
        ledger.set_output(path, input);
    }

    for round in (0..leaf_round).rev() {
        for path in tree.paths_in_round(round) {
            let kids: &[RelayPath] = match tree.children(path) {
                Some(kids) => kids,
                None => {
                    fault(
                        policy,
                        AgreementError::MissingTreeEntry(format!("children of {}", path)),
                    )?;
                    &[]
                }
            };
            let outputs = child_outputs(&ledger, id, kids, policy)?;
            let value = majority(outputs, kids.len());
            if !ledger.set_output(path, value) {
                fault(policy, missing(id, path))?;
            }
        }
    }

    let root = tree.decision_path();
    match ledger.get(&root).and_then(|record| record.output) {
        Some(value) => Ok(value),
        None => {
            fault(policy, missing(id, &root))?;
            Ok(Message::Retreat)
        }
    }
}

fn child_outputs(
    ledger: &Ledger,
    id: ParticipantId,
    kids: &[RelayPath],
    policy: FaultPolicy,
) -> AgreementResult<Vec<Message>> {
    let mut outputs = Vec::with_capacity(kids.len());
    for kid in kids {
        match ledger.get(kid) {
            Some(record) => outputs.push(record.decided()),
            None => fault(policy, missing(id, kid))?,
        }
    }
    Ok(outputs)
}

fn missing(participant: ParticipantId, path: &RelayPath) -> AgreementError {
    AgreementError::MissingRecord {
        participant,
        path: path.clone(),
    }
}

/// Strict policy turns the fault into an error; lenient logs it and lets the
/// caller carry on without the record.
fn fault(policy: FaultPolicy, err: AgreementError) -> AgreementResult<()> {
    match policy {
        FaultPolicy::Strict => Err(err),
        FaultPolicy::Lenient => {
            warn!(error = %err, "Inconsistent ledger during aggregation, defaulting to retreat");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::relay::relay;
    use crate::agreement::strategies::ParityFlip;

    // Initialize logger for tests (only once)
    static INIT: std::sync::Once = std::sync::Once::new();

    fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
                )
                .with_test_writer()
                .try_init();
        });
    }

    fn run_rounds(n: usize, m: usize, traitors: &[usize]) -> (PathTree, Vec<Participant>) {
        let tree = PathTree::build(n, m);
        let all: Vec<Participant> = (0..n)
            .map(|id| Participant::new(id, traitors.contains(&id), Message::Attack))
            .collect();
        for round in 0..=m {
            for sender in &all {
                relay(round, sender, &all, &tree, &ParityFlip).unwrap();
            }
        }
        (tree, all)
    }

    #[test]
    fn test_majority_tie_break() {
        assert_eq!(majority(Vec::new(), 0), Message::Retreat);
        assert_eq!(
            majority(vec![Message::Attack, Message::Retreat], 2),
            Message::Retreat
        );
        assert_eq!(
            majority(
                vec![
                    Message::Attack,
                    Message::Attack,
                    Message::Retreat,
                    Message::Retreat
                ],
                4
            ),
            Message::Retreat
        );
        assert_eq!(
            majority(vec![Message::Attack, Message::Attack, Message::Retreat], 3),
            Message::Attack
        );
    }

    #[test]
    fn test_absent_children_still_count_toward_total() {
        assert_eq!(
            majority(vec![Message::Attack, Message::Attack], 4),
            Message::Retreat
        );
        assert_eq!(
            majority(vec![Message::Attack, Message::Attack], 3),
            Message::Attack
        );
    }

    #[test]
    fn test_commander_decides_original_order() {
        init();
        let tree = PathTree::build(4, 1);
        let commander = Participant::new(0, false, Message::Retreat);
        assert_eq!(
            decide(&commander, &tree, FaultPolicy::Strict).unwrap(),
            Message::Retreat
        );
    }

    #[test]
    fn test_loyal_lieutenants_outvote_single_traitor() {
        init();
        let (tree, all) = run_rounds(4, 1, &[3]);

        assert_eq!(
            decide(&all[1], &tree, FaultPolicy::Strict).unwrap(),
            Message::Attack
        );
        assert_eq!(
            decide(&all[2], &tree, FaultPolicy::Strict).unwrap(),
            Message::Attack
        );
        // Lieutenant 2 was lied to along 0->3
        let lied = all[2].record(&RelayPath::root().child(3)).unwrap();
        assert_eq!(lied.input, Message::Retreat);
        assert_eq!(lied.output, Some(Message::Retreat));
    }

    #[test]
    fn test_aggregation_fills_every_output() {
        init();
        let (tree, all) = run_rounds(5, 2, &[4]);
        decide(&all[1], &tree, FaultPolicy::Strict).unwrap();

        let ledger = all[1].ledger();
        assert_eq!(ledger.len(), tree.len());
        assert!(ledger.iter().all(|(_, record)| record.output.is_some()));
    }

    #[test]
    fn test_strict_policy_reports_missing_records() {
        init();
        let tree = PathTree::build(4, 1);
        let lieutenant = Participant::new(1, false, Message::Attack);

        let err = decide(&lieutenant, &tree, FaultPolicy::Strict).unwrap_err();
        assert!(matches!(err, AgreementError::MissingRecord { participant: 1, .. }));
    }

    #[test]
    fn test_lenient_policy_defaults_to_retreat() {
        init();
        let tree = PathTree::build(4, 1);
        let lieutenant = Participant::new(1, false, Message::Attack);

        assert_eq!(
            decide(&lieutenant, &tree, FaultPolicy::Lenient).unwrap(),
            Message::Retreat
        );
    }

    #[test]
    fn test_lenient_policy_ignores_partially_missing_children() {
        init();
        let tree = PathTree::build(4, 1);
        let lieutenant = Participant::new(1, false, Message::Attack);
        lieutenant.receive(RelayPath::root(), Message::Attack);
        lieutenant.receive(RelayPath::root().child(1), Message::Attack);
        lieutenant.receive(RelayPath::root().child(2), Message::Attack);

        // Two of three children vote attack, the absent one counts as no vote
        assert_eq!(
            decide(&lieutenant, &tree, FaultPolicy::Lenient).unwrap(),
            Message::Attack
        );
        assert!(decide(&lieutenant, &tree, FaultPolicy::Strict).is_err());
    }
}
