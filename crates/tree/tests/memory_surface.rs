use std::cell::RefCell;
use std::rc::Rc;

use open_editors_layout::{LayoutId, LayoutKind};
use open_editors_tree::{ElementId, MemorySurface, NodeAction, Surface, TreeNode, TreeNodeDraft};

fn window(surface: &Rc<MemorySurface>) -> TreeNode {
    let root = surface.create_root();
    window_in(surface, root)
}

fn window_in(surface: &Rc<MemorySurface>, root: ElementId) -> TreeNode {
    TreeNodeDraft::new("main", LayoutKind::Window, "Main window")
        .with_action(NodeAction::new("copy-x", "Close all", |_: &TreeNode| {}))
        .build(surface.clone() as Rc<dyn Surface>, root)
}

#[test]
fn nested_nodes_render_and_tear_down_cleanly() {
    let surface = Rc::new(MemorySurface::new());
    let root = surface.create_root();
    let mut main = window_in(&surface, root);
    let group = main.push_child(
        TreeNodeDraft::new("t1", LayoutKind::Split, "Group 1")
            .with_action(NodeAction::new("copy-x", "Close group", |_: &TreeNode| {})),
    );
    group.push_child(TreeNodeDraft::new("a", LayoutKind::Leaf, "a.md"));
    group.push_child(TreeNodeDraft::new("b", LayoutKind::Leaf, "b.md"));

    assert_eq!(
        surface.outline(root),
        "\
▾ Main window [Close all]
  ▾ Group 1 [Close group]
    • a.md
    • b.md
"
    );
    assert_eq!(surface.live_items().len(), 4);

    let items: Vec<_> = {
        let mut items = Vec::new();
        main.recursive_call(|node| items.push(node.elements().item));
        items
    };
    main.delete_tree();
    main.delete_tree();
    for item in items {
        assert_eq!(surface.release_count(item), 1);
    }
    assert!(surface.live_items().is_empty());
}

#[test]
fn removing_the_last_child_restores_a_plain_row() {
    let surface = Rc::new(MemorySurface::new());
    let mut main = window(&surface);
    main.push_child(TreeNodeDraft::new("a", LayoutKind::Leaf, "a.md"));
    assert!(main.is_collapsible());
    assert!(surface.is_collapsible(main.elements().row));

    assert!(main.remove_child(&LayoutId::from("a")));
    assert!(!main.remove_child(&LayoutId::from("a")));
    assert!(!main.is_collapsible());
    assert!(!surface.is_collapsible(main.elements().row));
}

#[test]
fn actions_receive_their_own_node() {
    let surface = Rc::new(MemorySurface::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);

    let mut main = window(&surface);
    main.push_child(
        TreeNodeDraft::new("a", LayoutKind::Leaf, "a.md").with_action(NodeAction::new(
            "x-square",
            "Close",
            move |node: &TreeNode| log.borrow_mut().push(node.identity().clone()),
        )),
    );

    let leaf = main.node_at(&[0]).expect("leaf");
    assert!(leaf.click_action(0));
    assert!(!leaf.click_action(1));
    assert_eq!(*seen.borrow(), vec![LayoutId::from("a")]);
}

#[test]
fn released_elements_keep_their_records_and_ids() {
    let surface = Rc::new(MemorySurface::new());
    let root = surface.create_root();
    let mut first = window_in(&surface, root);
    let old = first.elements().item;
    first.delete_tree();

    let second = window_in(&surface, root);
    let new = second.elements().item;
    assert_ne!(old, new);
    assert!(new.as_u64() > old.as_u64());
    assert_eq!(surface.release_count(old), 1);
    assert!(!surface.is_live(old));
    assert_eq!(surface.live_items(), vec![new]);
}
