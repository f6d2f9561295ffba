use super::*;
use crate::{foundation::error::PostreelError, text::fixed_measurer::FixedMeasurer};

fn post(title: &str, content: &str) -> Post {
    Post {
        title: title.to_string(),
        content: content.to_string(),
        post_id: "p1".to_string(),
        image: "img.png".to_string(),
    }
}

fn block(plan: &RenderPlan, role: BlockRole) -> &TextBlock {
    plan.block(role).unwrap()
}

#[test]
fn stacks_blocks_with_configured_gaps() {
    let cfg = LayoutConfig::default();
    let mut m = FixedMeasurer::default();
    let plan = layout_post(&post("Hello World", "Short body"), &cfg, &mut m).unwrap();

    assert_eq!(
        plan.image,
        ImagePlacement {
            x: 40,
            y: 30,
            width: 1000,
            height: 400
        }
    );

    let title = block(&plan, BlockRole::Title);
    assert_eq!(title.font.size_px, 50);
    assert_eq!(title.lines.len(), 1);
    assert_eq!(title.lines[0].origin, Point::new(402.0, 470.0));
    assert_eq!(title.bottom, 530.0);

    let body = block(&plan, BlockRole::Body);
    assert_eq!(body.top, 545.0);
    assert_eq!(body.font.size_px, 40);
    assert!((plan.body_budget - 1325.0).abs() < 1e-3);
    assert!((body.bottom - 593.0).abs() < 1e-3);
    assert!(plan.overflow.is_none());

    let id = block(&plan, BlockRole::Identifier);
    assert_eq!(id.lines.len(), 1);
    assert_eq!(id.lines[0].text, "Post ID: p1");
    assert_eq!(id.font.size_px, 35);
    assert!((id.top - 608.0).abs() < 1e-3);
}

#[test]
fn lines_are_centered_on_the_canvas() {
    let cfg = LayoutConfig::default();
    let mut m = FixedMeasurer::default();
    let content = "word ".repeat(300);
    let plan = layout_post(&post("A fairly long title that will wrap", &content), &cfg, &mut m)
        .unwrap();

    for b in &plan.blocks {
        for line in &b.lines {
            let expected = ((1080.0 - f64::from(line.width)) / 2.0).floor();
            assert_eq!(line.origin.x, expected, "{:?}", line.text);
            assert!(line.width <= cfg.max_content_width || !line.text.contains(' '));
        }
    }
}

#[test]
fn blocks_do_not_overlap_when_body_fits() {
    let cfg = LayoutConfig::default();
    let mut m = FixedMeasurer::default();
    let content = "lorem ipsum dolor sit amet ".repeat(40);
    let plan = layout_post(&post("Title here", &content), &cfg, &mut m).unwrap();
    assert!(plan.overflow.is_none());

    let title = block(&plan, BlockRole::Title);
    let body = block(&plan, BlockRole::Body);
    let id = block(&plan, BlockRole::Identifier);
    assert!(title.bottom + f64::from(cfg.gaps.title_content) <= body.top);
    assert!(body.bottom + f64::from(cfg.gaps.content_identifier) <= id.top);

    for pair in body.lines.windows(2) {
        assert!(pair[0].origin.y < pair[1].origin.y);
    }
}

#[test]
fn oversized_body_overflows_without_failing() {
    let cfg = LayoutConfig::default();
    let mut m = FixedMeasurer::default();
    let content = "overflowing words keep coming ".repeat(2000);
    let plan = layout_post(&post("T", &content), &cfg, &mut m).unwrap();

    let body = block(&plan, BlockRole::Body);
    assert_eq!(body.font.size_px, cfg.content_font_size.min);
    let overflow = plan.overflow.unwrap();
    assert_eq!(overflow.size_px, 20);
    assert!(overflow.required_height > overflow.budget);
    assert!(block(&plan, BlockRole::Identifier).top > f64::from(cfg.canvas.height));
}

#[test]
fn empty_body_collapses_to_the_gap() {
    let cfg = LayoutConfig::default();
    let mut m = FixedMeasurer::default();
    let plan = layout_post(&post("T", ""), &cfg, &mut m).unwrap();
    let body = block(&plan, BlockRole::Body);
    assert!(body.lines.is_empty());
    assert_eq!(body.top, body.bottom);
    assert_eq!(body.font.size_px, 40);
}

#[test]
fn unresolvable_font_size_is_a_configuration_error() {
    let cfg = LayoutConfig {
        identifier_font_size: 0,
        ..LayoutConfig::default()
    };
    let mut m = FixedMeasurer::default();
    let err = layout_post(&post("T", "C"), &cfg, &mut m).unwrap_err();
    assert!(matches!(err, PostreelError::Configuration(_)));
}

#[test]
fn layout_is_deterministic() {
    let cfg = LayoutConfig::default();
    let p = post("Same title", &"same content ".repeat(50));
    let a = layout_post(&p, &cfg, &mut FixedMeasurer::default()).unwrap();
    let b = layout_post(&p, &cfg, &mut FixedMeasurer::default()).unwrap();
    assert_eq!(a, b);
}
