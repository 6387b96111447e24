use super::bitset::TerminalSet;

#[test]
fn insert_and_contains() {
    let mut set = TerminalSet::new(130);
    assert!(set.is_empty());
    assert!(set.insert(0));
    assert!(set.insert(129));
    assert!(!set.insert(129));

    assert!(set.contains(0));
    assert!(set.contains(129));
    assert!(!set.contains(64));
    assert!(!set.contains(500));
}

#[test]
fn union_reports_growth() {
    let mut a = TerminalSet::new(70);
    let mut b = TerminalSet::new(70);
    a.insert(3);
    b.insert(3);
    assert!(!a.union_with(&b));

    b.insert(66);
    assert!(a.union_with(&b));
    assert_eq!(a.iter().collect::<Vec<_>>(), [3, 66]);
}
