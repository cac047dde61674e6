//! End-to-end docking scenarios driven through the public API.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use dockspan_core::{HeadlessWindowHost, Point, Rect, WindowHost, WindowState};
use dockspan_layout::{
    DockConfig, DockDirection, DockKind, DockZone, LayoutTree, NoTabPayload, NormalizedSize,
    PaneId, ResizeError, SplitAxis, TabId, ViewPane, ViewTab, Workspace, load_workspace,
    save_workspace,
};

fn pane(raw: u64, title: &str) -> ViewPane {
    ViewPane::with_tab(PaneId::new(raw).unwrap(), ViewTab::new(TabId(1), title))
}

fn pid(raw: u64) -> PaneId {
    PaneId::new(raw).unwrap()
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn right_then_bottom_then_remove() {
    let mut tree = LayoutTree::new();
    tree.set_rect(Rect::from_size(1200, 800));
    tree.dock_view_pane(tree.root(), pane(1, "A"), DockDirection::Left)
        .unwrap();
    let b = tree
        .dock_view_pane(tree.root(), pane(2, "B"), DockDirection::Right)
        .unwrap();

    let root = tree.cell(tree.root()).unwrap();
    assert_eq!(root.split_axis(), Some(SplitAxis::Horizontal));
    let a = tree.find_pane_cell(pid(1)).unwrap();
    assert!(approx(tree.cell(a).unwrap().normalized_size().x, 0.8));
    assert!(approx(tree.cell(b).unwrap().normalized_size().x, 0.2));

    tree.dock_view_pane(b, pane(3, "C"), DockDirection::Bottom)
        .unwrap();
    let root = tree.cell(tree.root()).unwrap();
    assert_eq!(root.children(), &[a, b]);
    let column = tree.cell(b).unwrap();
    assert_eq!(column.split_axis(), Some(SplitAxis::Vertical));
    let b_leaf = tree.find_pane_cell(pid(2)).unwrap();
    let c_leaf = tree.find_pane_cell(pid(3)).unwrap();
    assert!(approx(tree.cell(b_leaf).unwrap().normalized_size().y, 0.8));
    assert!(approx(tree.cell(c_leaf).unwrap().normalized_size().y, 0.2));

    tree.remove_view_pane_cell(pid(3)).unwrap();
    tree.remove_view_pane_cell(pid(2)).unwrap();
    let root = tree.cell(tree.root()).unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.view_pane().map(ViewPane::id), Some(pid(1)));
    assert_eq!(root.normalized_size(), NormalizedSize::FULL);
    tree.validate().unwrap();
}

#[test]
fn resizing_root_changes_nothing() {
    let mut tree = LayoutTree::new();
    tree.set_rect(Rect::from_size(100, 100));
    tree.dock_view_pane(tree.root(), pane(1, "A"), DockDirection::Left)
        .unwrap();
    let before = tree.clone();
    let root = tree.root();
    assert!(matches!(
        tree.set_new_size(root, 0.5),
        Err(ResizeError::RootCell { .. })
    ));
    assert_eq!(tree, before);
}

#[test]
fn grip_drag_moves_shared_border() {
    let mut tree = LayoutTree::new();
    tree.set_rect(Rect::from_size(1000, 600));
    tree.dock_view_pane(tree.root(), pane(1, "A"), DockDirection::Left)
        .unwrap();
    tree.dock_view_pane(tree.root(), pane(2, "B"), DockDirection::Right)
        .unwrap();

    let grip = tree
        .find_resize_cell(Point::new(801, 300), 4)
        .expect("pointer is on the border");
    assert_eq!(Some(grip), tree.find_pane_cell(pid(1)));
    tree.drag_resize(grip, Point::new(500, 300)).unwrap();
    assert_eq!(tree.pane(pid(1)).unwrap().rect(), Rect::new(0, 0, 500, 600));
    assert_eq!(tree.pane(pid(2)).unwrap().rect(), Rect::new(500, 0, 500, 600));
    assert_eq!(tree.find_resize_cell(Point::new(300, 300), 4), None);
}

#[test]
fn drag_gesture_across_windows() {
    let mut host = HeadlessWindowHost::new(Rect::from_size(1000, 600));
    let mut ws = Workspace::with_main_window(&host, DockConfig::default());
    let main = host.main_window();
    let root = ws.main_container().unwrap().root_cell();

    let scene = ws.new_pane(ViewTab::new(TabId(1), "Scene")).unwrap();
    let scene_id = scene.id();
    ws.dock(&mut host, main, root, scene, DockKind::Split(DockDirection::Left))
        .unwrap();
    let log = ws.new_pane(ViewTab::new(TabId(2), "Log")).unwrap();
    let log_id = log.id();
    let floating = ws
        .dock(
            &mut host,
            main,
            root,
            log,
            DockKind::Floating(Rect::new(1100, 100, 400, 300)),
        )
        .unwrap();
    assert_eq!(ws.containers().len(), 2);

    // Drop the floating log onto the middle of the scene: it joins as a tab.
    let preview = ws
        .container(main)
        .unwrap()
        .dock_preview(Point::new(500, 300))
        .unwrap();
    assert_eq!(preview.zone, DockZone::Center);
    let placed = ws
        .move_pane(&mut host, log_id, main, preview.cell, preview.zone.dock_kind())
        .unwrap();
    assert_eq!(placed.pane, scene_id);
    assert!(ws.container(floating.window).is_none());
    assert_eq!(
        host.window_state(floating.window),
        Some(WindowState::Hidden)
    );
    let scene = ws.pane(scene_id).unwrap();
    assert_eq!(scene.tab_count(), 2);
    assert_eq!(scene.selected_tab().map(|t| t.title.as_str()), Some("Log"));
    assert!(ws.find_pane(log_id).is_none());

    // Tear the log tab back out into its own pane on the right edge.
    let tab = ws
        .pane_mut(scene_id)
        .unwrap()
        .remove_tab(TabId(2))
        .unwrap();
    let torn = ws.new_pane(tab).unwrap();
    let preview = ws
        .container(main)
        .unwrap()
        .dock_preview(Point::new(990, 300))
        .unwrap();
    assert_eq!(preview.zone, DockZone::Right);
    let placed = ws
        .dock(&mut host, main, preview.cell, torn, preview.zone.dock_kind())
        .unwrap();
    let container = ws.container(main).unwrap();
    assert_eq!(
        container.tree().cell(placed.cell).unwrap().rect(),
        Rect::new(800, 0, 200, 600)
    );
    container.tree().validate().unwrap();
}

#[test]
fn workspace_survives_file_round_trip() {
    let mut host = HeadlessWindowHost::new(Rect::new(0, 0, 1280, 720));
    let mut ws = Workspace::with_main_window(&host, DockConfig::default());
    let main = host.main_window();
    let root = ws.main_container().unwrap().root_cell();
    for (i, direction) in [
        DockDirection::Left,
        DockDirection::RootRight,
        DockDirection::RootBottom,
    ]
    .into_iter()
    .enumerate()
    {
        let p = ws
            .new_pane(ViewTab::new(TabId(i as u32), format!("view {i}")).with_user_data(i as u64))
            .unwrap();
        ws.dock(&mut host, main, root, p, DockKind::Split(direction))
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.bin");
    {
        let mut out = BufWriter::new(File::create(&path).unwrap());
        save_workspace(&ws, &mut NoTabPayload, &host, &mut out).unwrap();
        out.flush().unwrap();
    }

    let mut fresh = HeadlessWindowHost::new(Rect::from_size(1, 1));
    let mut input = BufReader::new(File::open(&path).unwrap());
    let loaded = load_workspace(
        &mut input,
        &mut NoTabPayload,
        &mut fresh,
        &DockConfig::default(),
    )
    .unwrap();

    let original = ws.main_container().unwrap().tree();
    let restored = loaded.main_container().unwrap().tree();
    let titles = |tree: &LayoutTree| {
        tree.panes()
            .map(|p| (p.id(), p.tabs()[0].title.clone(), p.tabs()[0].user_data_id, p.rect()))
            .collect::<Vec<_>>()
    };
    assert_eq!(titles(original), titles(restored));
    restored.validate().unwrap();
    assert_eq!(fresh.window_rect(fresh.main_window()), Some(Rect::new(0, 0, 1280, 720)));
}
