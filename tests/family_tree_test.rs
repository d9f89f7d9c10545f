//! Tests for FamilyTree insertion policy, lookups, ancestry and traversals

use std::collections::HashSet;

use rstest::{fixture, rstest};

use famtree::domain::{DomainError, FamilyTree, Member, MemberId, NewMember, TraversalOrder};
use famtree::util::testing;

fn member(id: MemberId, name: &str, age: u8) -> NewMember {
    NewMember::new(id, name, age).unwrap()
}

fn names<'a>(iter: impl Iterator<Item = &'a Member>) -> Vec<String> {
    iter.map(|m| m.name().to_string()).collect()
}

fn ids<'a>(iter: impl Iterator<Item = &'a Member>) -> Vec<MemberId> {
    iter.map(Member::id).collect()
}

/// Ana(1) with children Beto(2) and Caro(3).
#[fixture]
fn ana_family() -> FamilyTree {
    testing::init_test_setup();
    let mut tree = FamilyTree::new();
    tree.create_root(member(1, "Ana", 60)).unwrap();
    tree.insert_child(1, member(2, "Beto", 40)).unwrap();
    tree.insert_child(1, member(3, "Caro", 35)).unwrap();
    tree
}

/// Root 10 with a chain of first children down to 14 and a second child 20 under 12.
#[fixture]
fn deep_family() -> FamilyTree {
    let mut tree = FamilyTree::new();
    tree.create_root(member(10, "Raiz", 100)).unwrap();
    tree.insert_child(10, member(11, "Uno", 80)).unwrap();
    tree.insert_child(11, member(12, "Dos", 60)).unwrap();
    tree.insert_child(12, member(13, "Tres", 40)).unwrap();
    tree.insert_child(13, member(14, "Cuatro", 20)).unwrap();
    tree.insert_child(12, member(20, "Veinte", 38)).unwrap();
    tree
}

// ============================================================
// Root creation
// ============================================================

#[test]
fn given_empty_tree_when_creating_root_then_root_has_no_parent() {
    let mut tree = FamilyTree::new();
    let root = tree.create_root(member(1, "Ana", 60)).unwrap();
    assert_eq!(root.id(), 1);
    assert!(root.is_root());
    assert_eq!(tree.len(), 1);
    assert!(tree.parent(tree.root().unwrap()).is_none());
}

#[rstest]
fn given_root_when_creating_second_root_then_fails_and_keeps_first_root(mut ana_family: FamilyTree) {
    let err = ana_family.create_root(member(9, "Otra", 50)).unwrap_err();
    assert_eq!(err, DomainError::RootAlreadyExists);
    assert_eq!(ana_family.root().unwrap().name(), "Ana");
    assert!(!ana_family.exists(9));
    assert_eq!(ana_family.len(), 3);
}

// ============================================================
// Insertion policy
// ============================================================

#[rstest]
fn given_ana_when_inserting_two_children_then_slots_fill_in_order(ana_family: FamilyTree) {
    let ana = ana_family.root().unwrap();
    assert_eq!(ana_family.first_child(ana).unwrap().name(), "Beto");
    assert_eq!(ana_family.second_child(ana).unwrap().name(), "Caro");
}

#[rstest]
fn given_full_parent_when_inserting_then_parent_full_and_tree_unchanged(
    mut ana_family: FamilyTree,
) {
    let before = ids(ana_family.iter_preorder());
    let err = ana_family
        .insert_child(1, member(4, "Dani", 30))
        .unwrap_err();
    assert_eq!(err, DomainError::ParentFull(1));
    assert_eq!(ids(ana_family.iter_preorder()), before);
    assert!(!ana_family.exists(4));
    assert_eq!(ana_family.len(), 3);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(99)]
fn given_used_id_when_inserting_anywhere_then_duplicate_id(
    mut ana_family: FamilyTree,
    #[case] parent_id: MemberId,
) {
    let err = ana_family
        .insert_child(parent_id, member(2, "Copia", 20))
        .unwrap_err();
    assert_eq!(err, DomainError::DuplicateId(2));
}

#[rstest]
fn given_unknown_parent_when_inserting_then_parent_not_found(mut ana_family: FamilyTree) {
    let err = ana_family
        .insert_child(42, member(5, "Eva", 10))
        .unwrap_err();
    assert_eq!(err, DomainError::ParentNotFound(42));
    assert!(!ana_family.exists(5));
}

#[rstest]
fn given_duplicate_id_and_full_parent_when_inserting_then_duplicate_wins(
    mut ana_family: FamilyTree,
) {
    // id 3 is taken and parent 1 is full: the id check runs first
    let err = ana_family
        .insert_child(1, member(3, "Caro", 35))
        .unwrap_err();
    assert_eq!(err, DomainError::DuplicateId(3));
}

#[rstest]
fn given_missing_parent_and_duplicate_id_when_inserting_then_duplicate_wins(
    mut ana_family: FamilyTree,
) {
    let err = ana_family
        .insert_child(77, member(1, "Ana", 60))
        .unwrap_err();
    assert_eq!(err, DomainError::DuplicateId(1));
}

#[test]
fn given_empty_tree_when_inserting_then_parent_not_found() {
    let mut tree = FamilyTree::new();
    let err = tree.insert_child(1, member(2, "Beto", 40)).unwrap_err();
    assert_eq!(err, DomainError::ParentNotFound(1));
    assert!(tree.is_empty());
}

#[rstest]
fn given_child_when_inserted_then_parent_back_reference_matches_slot(deep_family: FamilyTree) {
    for member in deep_family.iter_preorder() {
        for child in [
            deep_family.first_child(member),
            deep_family.second_child(member),
        ]
        .into_iter()
        .flatten()
        {
            assert_eq!(deep_family.parent(child).unwrap().id(), member.id());
        }
    }
}

#[test]
fn given_insertion_history_when_ids_are_not_sorted_then_shape_follows_history() {
    // value-ordered placement would put 5 left of 50; first-free-slot keeps 90 first
    let mut tree = FamilyTree::new();
    tree.create_root(member(50, "Medio", 70)).unwrap();
    tree.insert_child(50, member(90, "Alto", 40)).unwrap();
    tree.insert_child(50, member(5, "Bajo", 30)).unwrap();
    assert_eq!(ids(tree.iter_inorder()), vec![90, 50, 5]);
}

// ============================================================
// Lookup
// ============================================================

#[rstest]
fn given_members_when_looking_up_then_exists_only_for_inserted_ids(deep_family: FamilyTree) {
    let inserted: HashSet<MemberId> = [10, 11, 12, 13, 14, 20].into_iter().collect();
    for id in 1..=30 {
        assert_eq!(deep_family.exists(id), inserted.contains(&id), "id {}", id);
    }
    assert_eq!(deep_family.find_by_id(13).unwrap().name(), "Tres");
    assert!(deep_family.find_by_id(15).is_none());
}

#[test]
fn given_empty_tree_when_looking_up_then_absent() {
    let tree = FamilyTree::new();
    assert!(!tree.exists(1));
    assert!(tree.find_by_id(1).is_none());
    assert!(tree.root().is_none());
}

// ============================================================
// Ancestry
// ============================================================

#[rstest]
fn given_caro_when_getting_ancestry_then_caro_then_ana(ana_family: FamilyTree) {
    let caro = ana_family.find_by_id(3).unwrap();
    assert_eq!(names(ana_family.ancestry_chain(caro)), vec!["Caro", "Ana"]);
}

#[rstest]
fn given_deep_member_when_getting_ancestry_then_length_is_depth_plus_one(deep_family: FamilyTree) {
    let chain: Vec<_> = deep_family.ancestry_chain_by_id(14).unwrap().collect();
    assert_eq!(chain.len(), 5);
    assert_eq!(chain.first().unwrap().id(), 14);
    assert_eq!(chain.last().unwrap().id(), 10);
    for pair in chain.windows(2) {
        assert_eq!(deep_family.parent(pair[0]).unwrap().id(), pair[1].id());
    }
}

#[test]
fn given_root_only_when_getting_ancestry_then_single_element() {
    let mut tree = FamilyTree::new();
    tree.create_root(member(1, "Ana", 60)).unwrap();
    let chain = ids(tree.ancestry_chain_by_id(1).unwrap());
    assert_eq!(chain, vec![1]);
}

#[rstest]
fn given_unknown_member_when_getting_ancestry_then_member_not_found(ana_family: FamilyTree) {
    assert!(matches!(
        ana_family.ancestry_chain_by_id(8),
        Err(DomainError::MemberNotFound(8))
    ));
}

// ============================================================
// Traversals
// ============================================================

#[rstest]
fn given_ana_family_when_traversing_then_orders_match_scenario(ana_family: FamilyTree) {
    assert_eq!(names(ana_family.iter_preorder()), vec!["Ana", "Beto", "Caro"]);
    assert_eq!(names(ana_family.iter_inorder()), vec!["Beto", "Ana", "Caro"]);
    assert_eq!(names(ana_family.iter_postorder()), vec!["Beto", "Caro", "Ana"]);
}

#[rstest]
fn given_deep_family_when_traversing_then_every_order_is_a_permutation(deep_family: FamilyTree) {
    let expected: HashSet<MemberId> = [10, 11, 12, 13, 14, 20].into_iter().collect();
    for order in [
        TraversalOrder::InOrder,
        TraversalOrder::PreOrder,
        TraversalOrder::PostOrder,
    ] {
        let visited = ids(deep_family.traverse(order));
        assert_eq!(visited.len(), expected.len(), "{:?}", order);
        assert_eq!(visited.into_iter().collect::<HashSet<_>>(), expected);
    }
}

#[rstest]
fn given_deep_family_when_traversing_then_orders_follow_slots(deep_family: FamilyTree) {
    assert_eq!(ids(deep_family.iter_preorder()), vec![10, 11, 12, 13, 14, 20]);
    assert_eq!(ids(deep_family.iter_inorder()), vec![14, 13, 12, 20, 11, 10]);
    assert_eq!(ids(deep_family.iter_postorder()), vec![14, 13, 20, 12, 11, 10]);
}

#[test]
fn given_empty_tree_when_traversing_then_sequences_are_empty() {
    let tree = FamilyTree::new();
    assert_eq!(tree.iter_inorder().count(), 0);
    assert_eq!(tree.iter_preorder().count(), 0);
    assert_eq!(tree.iter_postorder().count(), 0);
}

// ============================================================
// Teardown
// ============================================================

#[rstest]
fn given_family_when_tearing_down_then_everything_is_released(mut deep_family: FamilyTree) {
    deep_family.teardown();
    assert!(deep_family.is_empty());
    assert_eq!(deep_family.len(), 0);
    for id in [10, 11, 12, 13, 14, 20] {
        assert!(!deep_family.exists(id));
    }
    deep_family.teardown();
    assert!(deep_family.is_empty());
}
