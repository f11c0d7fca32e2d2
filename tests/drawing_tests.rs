use approx::assert_relative_eq;
use chart_engine::core::{CanvasSize, CoordinateTransform, PixelPoint, WorldPoint};
use chart_engine::drawing::{
    ActiveTool, DEFAULT_HISTORY_LIMIT, DrawingConfig, DrawingEngine, DrawingObject, DrawingStyle,
    DrawingTool, hit_test,
};
use chart_engine::render::Color;
use proptest::prelude::*;

fn transform() -> CoordinateTransform {
    CoordinateTransform::new((0.0, 200.0), (50.0, 150.0), CanvasSize::new(1000, 500))
        .expect("transform")
}

fn draw(engine: &mut DrawingEngine, tool: DrawingTool, from: PixelPoint, to: PixelPoint) {
    let t = transform();
    engine.set_active_tool(ActiveTool::Draw(tool));
    engine.pointer_down(from, Some(&t));
    engine.pointer_move(to, Some(&t));
    engine.pointer_up(to, Some(&t));
}

fn committed(engine: &DrawingEngine) -> Vec<DrawingObject> {
    engine
        .snapshot()
        .iter()
        .map(|object| object.as_ref().clone())
        .collect()
}

fn tool_strategy() -> impl Strategy<Value = DrawingTool> {
    prop::sample::select(DrawingTool::ALL.to_vec())
}

fn point_strategy() -> impl Strategy<Value = PixelPoint> {
    (0.0f64..1000.0, 0.0f64..500.0).prop_map(|(x, y)| PixelPoint::new(x, y))
}

#[test]
fn history_is_capped_at_fifty_snapshots() {
    let mut engine = DrawingEngine::new(DrawingConfig::default()).expect("engine");
    for i in 0..60 {
        let y = 5.0 + i as f64 * 8.0;
        draw(
            &mut engine,
            DrawingTool::HorizontalLine,
            PixelPoint::new(10.0, y),
            PixelPoint::new(10.0, y),
        );
    }
    assert_eq!(engine.len(), 60);

    let mut undone = 0;
    while engine.undo() {
        undone += 1;
    }
    assert_eq!(undone, DEFAULT_HISTORY_LIMIT);
    assert_eq!(engine.len(), 10);
    assert!(!engine.undo());
}

#[test]
fn style_update_is_undoable_and_validated() {
    let mut engine = DrawingEngine::new(DrawingConfig::default()).expect("engine");
    draw(
        &mut engine,
        DrawingTool::TrendLine,
        PixelPoint::new(100.0, 100.0),
        PixelPoint::new(300.0, 200.0),
    );
    let id = engine.selected().cloned().expect("selection after commit");

    let red = DrawingStyle::default().with_color(Color::rgb(1.0, 0.0, 0.0)).with_line_width(3.0);
    assert!(engine.update_style(&id, red).expect("valid style"));
    assert!(!engine.update_style(&id, red).expect("same style"));
    assert!(
        engine
            .update_style(&id, DrawingStyle::default().with_line_width(-1.0))
            .is_err()
    );
    assert_relative_eq!(engine.object(&id).expect("object").style.line_width, 3.0);

    assert!(engine.undo());
    assert_relative_eq!(
        engine.object(&id).expect("object").style.line_width,
        DrawingStyle::default().line_width
    );
}

#[test]
fn committed_line_is_hit_near_its_pixels() {
    let mut engine = DrawingEngine::new(DrawingConfig::default()).expect("engine");
    draw(
        &mut engine,
        DrawingTool::TrendLine,
        PixelPoint::new(100.0, 400.0),
        PixelPoint::new(500.0, 400.0),
    );
    let object = engine.snapshot().remove(0);
    let t = transform();
    assert!(hit_test(&object, &t, PixelPoint::new(300.0, 403.0), 5.0));
    assert!(!hit_test(&object, &t, PixelPoint::new(300.0, 420.0), 5.0));
    assert!(!hit_test(&object, &t, PixelPoint::new(560.0, 400.0), 5.0));
}

#[test]
fn replace_all_keeps_previous_set_reachable() {
    let mut engine = DrawingEngine::new(DrawingConfig::default()).expect("engine");
    draw(
        &mut engine,
        DrawingTool::VerticalLine,
        PixelPoint::new(250.0, 10.0),
        PixelPoint::new(250.0, 10.0),
    );
    let before = committed(&engine);

    let imported = DrawingObject::new(
        chart_engine::drawing::DrawingId::new("d40"),
        DrawingTool::Text,
        [WorldPoint::new(12.0, 99.0)],
        DrawingStyle::default(),
        0,
    )
    .with_text("earnings");
    engine.replace_all(vec![imported]).expect("replace");
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.snapshot()[0].text.as_deref(), Some("earnings"));

    assert!(engine.undo());
    assert_eq!(committed(&engine), before);
}

proptest! {
    #[test]
    fn undo_then_redo_reproduces_object_list(
        strokes in prop::collection::vec((tool_strategy(), point_strategy(), point_strategy()), 1..30),
    ) {
        let mut engine = DrawingEngine::new(DrawingConfig::default()).expect("engine");
        for (tool, from, to) in &strokes {
            draw(&mut engine, *tool, *from, *to);
        }
        let finished = committed(&engine);
        prop_assert_eq!(finished.len(), strokes.len());

        for _ in 0..strokes.len() {
            prop_assert!(engine.undo());
        }
        prop_assert!(engine.is_empty());
        prop_assert!(!engine.undo());

        for _ in 0..strokes.len() {
            prop_assert!(engine.redo());
        }
        prop_assert!(!engine.redo());
        prop_assert_eq!(committed(&engine), finished);
    }
}
