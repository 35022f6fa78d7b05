use snapstrip_layout::{compose_result_view, LayoutCatalog, NodeKind, Stage, ViewNode};

fn fake_captures(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("data:image/png;base64,{}", "A".repeat(4 * (i + 1))))
        .collect()
}

fn photo_count(tree: &ViewNode) -> usize {
    let mut count = 0;
    tree.walk(&mut |node| {
        if node.id.0.starts_with("photo-") {
            count += 1;
        }
    });
    count
}

#[test]
fn test_renderers_are_deterministic() {
    let catalog = LayoutCatalog::builtin();
    for layout in catalog.iter() {
        let captures = fake_captures(layout.required);
        assert_eq!(layout.render(&captures), layout.render(&captures), "{}", layout.id);
    }
}

#[test]
fn test_partial_sequences_render_placeholders() {
    let catalog = LayoutCatalog::builtin();
    for layout in catalog.iter() {
        let slots = layout.renderer.slot_count();
        for n in 0..=slots + 2 {
            let tree = layout.render(&fake_captures(n));
            assert_eq!(photo_count(&tree), n.min(slots), "{} with {} captures", layout.id, n);
        }
    }
}

#[test]
fn test_captures_keep_their_order() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.resolve("Layout A").unwrap();
    let captures = fake_captures(6);
    let tree = layout.render(&captures);
    for (i, capture) in captures.iter().enumerate() {
        let photo = tree.find(&format!("photo-{}", i + 1)).unwrap();
        match &photo.kind {
            NodeKind::Image { source, .. } => {
                assert_eq!(*source, snapstrip_layout::ImageSource::DataUrl(capture.clone()))
            }
            other => panic!("expected image, got {:?}", other),
        }
    }
}

#[test]
fn test_every_layout_composes_a_result_view() {
    let catalog = LayoutCatalog::builtin();
    let mut stage = Stage::new();
    let handles: Vec<_> = catalog
        .iter()
        .map(|layout| compose_result_view(layout, &fake_captures(layout.required), &mut stage))
        .collect();
    assert_eq!(stage.len(), 3);
    for handle in handles {
        let root = stage.get(handle).unwrap();
        let controls = root.children.iter().filter(|c| c.is_control()).count();
        assert_eq!(controls, 1);
    }
}
