//! Long command sequences
//!
//! This tests:
//! - Move + update + delete chains with undo/redo
//! - Randomized sequences, including nested and illegal subtrees, keep the
//!   tree acyclic, rule-conformant and id-unique, and history stays bounded
//! - Undo is the inverse of every committed mutating command

use proptest::prelude::*;
use std::sync::Arc;
use stencil_common::check_document;
use stencil_editor::{Command, EditorError, ElementId, ElementNode, HistoryState, Placement, Reducer};
use stencil_parser::ast::{find_node, find_parent};
use stencil_parser::{tags, RuleTable};

fn ids(state: &HistoryState) -> Vec<ElementId> {
    state
        .present
        .iter()
        .flat_map(|root| root.descendant_ids())
        .collect()
}

#[test]
fn test_move_then_delete_sequence() -> anyhow::Result<()> {
    let reducer = Reducer::default();
    let mut state = HistoryState::default();

    let first = ElementNode::new(tags::SECTION).with_child(ElementNode::new(tags::COLUMN));
    let second = ElementNode::new(tags::SECTION).with_child(
        ElementNode::new(tags::COLUMN).with_child(ElementNode::new(tags::TEXT).with_content("Child 2")),
    );
    let first_column = first.children[0].id().clone();
    let text = second.children[0].children[0].id().clone();
    let second_id = second.id().clone();

    for node in [first, second] {
        state = reducer.reduce(
            &state,
            Command::Add {
                node,
                parent_id: None,
                index: None,
            },
        )?;
    }

    // Move the text into the first section's column
    state = reducer.reduce(
        &state,
        Command::Move {
            id: text.clone(),
            new_parent_id: first_column.clone(),
            new_index: 0,
        },
    )?;
    assert_eq!(find_parent(&state.present, &text).unwrap().0.id(), &first_column);

    // Delete the now empty second section
    state = reducer.reduce(&state, Command::Delete { id: second_id.clone() })?;
    assert!(find_node(&state.present, &second_id).is_none());
    assert!(find_node(&state.present, &text).is_some());

    // Undo both
    state = reducer.reduce(&state, Command::Undo)?;
    assert!(find_node(&state.present, &second_id).is_some());
    state = reducer.reduce(&state, Command::Undo)?;
    assert_eq!(
        find_parent(&state.present, &text).unwrap().0.id(),
        state.present[0].children[0].children[1].children[0].id()
    );

    // Redo both
    state = reducer.reduce(&state, Command::Redo)?;
    state = reducer.reduce(&state, Command::Redo)?;
    assert!(find_node(&state.present, &second_id).is_none());
    assert!(!state.can_redo());
    Ok(())
}

#[test]
fn test_multiple_updates_with_undo_redo() -> anyhow::Result<()> {
    let reducer = Reducer::default();
    let mut state = HistoryState::default();
    let text = ElementNode::new(tags::TEXT).with_content("v0");
    let text_id = text.id().clone();
    state = reducer.reduce(
        &state,
        Command::Add {
            node: text,
            parent_id: None,
            index: None,
        },
    )?;

    for i in 1..=5 {
        state = reducer.reduce(
            &state,
            Command::Update {
                id: text_id.clone(),
                attributes: None,
                content: Some(format!("v{}", i)),
            },
        )?;
    }

    let content = |state: &HistoryState| find_node(&state.present, &text_id).unwrap().content.clone();
    assert_eq!(content(&state).as_deref(), Some("v5"));

    for _ in 0..3 {
        state = reducer.reduce(&state, Command::Undo)?;
    }
    assert_eq!(content(&state).as_deref(), Some("v2"));

    state = reducer.reduce(&state, Command::Redo)?;
    assert_eq!(content(&state).as_deref(), Some("v3"));
    assert_eq!(state.future.len(), 2);
    Ok(())
}

#[test]
fn test_failed_command_in_sequence_is_noop() {
    let reducer = Reducer::default();
    let state = HistoryState::default();

    let err = reducer
        .reduce(
            &state,
            Command::Move {
                id: ElementId::from("ghost"),
                new_parent_id: state.body().unwrap().id().clone(),
                new_index: 0,
            },
        )
        .unwrap_err();
    assert!(matches!(err, EditorError::NodeNotFound(_)));
}

#[test]
fn test_nested_add_is_checked_as_a_whole() {
    let reducer = Reducer::default();
    let state = HistoryState::default();

    // Legal root, illegal grandchild
    let column = ElementNode::new(tags::COLUMN)
        .with_child(ElementNode::new(tags::BUTTON).with_child(ElementNode::new(tags::SECTION)));
    let err = reducer
        .reduce(
            &state,
            Command::Add {
                node: column,
                parent_id: None,
                index: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, EditorError::Integrity(_)));

    // The same subtree arriving through the clipboard path
    let section = ElementNode::new(tags::SECTION).with_child(ElementNode::new(tags::TEXT));
    let placement = Placement::append(state.body().unwrap().id().clone());
    let err = reducer.add_node(&state, Arc::new(section), placement).unwrap_err();
    assert!(matches!(err, EditorError::Integrity(_)));
    assert!(check_document(&state.present, RuleTable::standard()).is_ok());
}

const ADDABLE: &[&str] = &[
    tags::SECTION,
    tags::COLUMN,
    tags::TEXT,
    tags::BUTTON,
    tags::IMAGE,
    tags::DIVIDER,
    tags::WRAPPER,
    tags::GROUP,
    tags::HERO,
    tags::SOCIAL,
    tags::SOCIAL_ELEMENT,
    tags::RAW,
];

/// A tag with up to three children, each with at most one child of its own.
/// Most combinations break the rule table.
#[derive(Debug, Clone)]
struct Shape {
    tag: usize,
    children: Vec<(usize, Option<usize>)>,
}

impl Shape {
    fn build(&self) -> ElementNode {
        self.children.iter().fold(ElementNode::new(ADDABLE[self.tag]), |node, (child, grandchild)| {
            let mut child = ElementNode::new(ADDABLE[*child]);
            if let Some(grandchild) = grandchild {
                child = child.with_child(ElementNode::new(ADDABLE[*grandchild]));
            }
            node.with_child(child)
        })
    }
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (
        0..ADDABLE.len(),
        prop::collection::vec((0..ADDABLE.len(), prop::option::of(0..ADDABLE.len())), 0..3),
    )
        .prop_map(|(tag, children)| Shape { tag, children })
}

#[derive(Debug, Clone)]
enum Op {
    Add { shape: Shape, parent: usize, index: usize },
    Move { node: usize, parent: usize, index: usize },
    Update { node: usize, content: String },
    Delete { node: usize },
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (shape_strategy(), any::<usize>(), 0usize..4)
            .prop_map(|(shape, parent, index)| Op::Add { shape, parent, index }),
        3 => (any::<usize>(), any::<usize>(), 0usize..4)
            .prop_map(|(node, parent, index)| Op::Move { node, parent, index }),
        1 => (any::<usize>(), "[a-z]{1,8}")
            .prop_map(|(node, content)| Op::Update { node, content }),
        1 => any::<usize>().prop_map(|node| Op::Delete { node }),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

fn to_command(state: &HistoryState, op: Op) -> Command {
    let ids = ids(state);
    let pick = |n: usize| ids[n % ids.len()].clone();

    match op {
        Op::Add { shape, parent, index } => Command::Add {
            node: shape.build(),
            parent_id: Some(pick(parent)),
            index: Some(index),
        },
        Op::Move { node, parent, index } => Command::Move {
            id: pick(node),
            new_parent_id: pick(parent),
            new_index: index,
        },
        Op::Update { node, content } => Command::Update {
            id: pick(node),
            attributes: None,
            content: Some(content),
        },
        Op::Delete { node } => Command::Delete { id: pick(node) },
        Op::Undo => Command::Undo,
        Op::Redo => Command::Redo,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_sequences_keep_invariants(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let reducer = Reducer::default();
        let rules = RuleTable::standard();
        let mut state = reducer.initial_state(vec![Arc::new(ElementNode::default_document())]);

        for op in ops {
            let command = to_command(&state, op);
            match reducer.reduce(&state, command) {
                Ok(next) => state = next,
                Err(_) => continue,
            }

            prop_assert!(check_document(&state.present, rules).is_ok());
            prop_assert!(state.history.len() <= 50);
            prop_assert!(state.future.len() <= 50);
        }
    }

    #[test]
    fn undo_inverts_every_mutation(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let reducer = Reducer::default();
        let mut state = HistoryState::default();

        for op in ops {
            let command = to_command(&state, op);
            let mutating = command.is_mutating();
            let Ok(next) = reducer.reduce(&state, command) else {
                continue;
            };

            if mutating {
                let undone = reducer.reduce(&next, Command::Undo).unwrap();
                prop_assert_eq!(&undone.present, &state.present);

                let redone = reducer.reduce(&undone, Command::Redo).unwrap();
                prop_assert_eq!(&redone.present, &next.present);
            }
            state = next;
        }
    }

    #[test]
    fn moves_never_create_cycles(picks in prop::collection::vec((any::<usize>(), any::<usize>()), 1..60)) {
        let reducer = Reducer::default();
        let mut state = HistoryState::default();
        for _ in 0..3 {
            let section = ElementNode::new(tags::SECTION)
                .with_child(ElementNode::new(tags::COLUMN).with_child(ElementNode::new(tags::TEXT)));
            state = reducer
                .reduce(&state, Command::Add { node: section, parent_id: None, index: None })
                .unwrap();
        }
        let count = ids(&state).len();

        for (node, parent) in picks {
            let command = to_command(&state, Op::Move { node, parent, index: 0 });
            let Command::Move { id, new_parent_id, .. } = &command else {
                unreachable!()
            };
            let would_cycle = find_node(&state.present, id)
                .map(|n| n.contains(new_parent_id))
                .unwrap_or(false);

            match reducer.reduce(&state, command) {
                Ok(next) => {
                    prop_assert!(!would_cycle);
                    state = next;
                }
                Err(_) => {}
            }
            prop_assert_eq!(ids(&state).len(), count);
        }
    }
}
