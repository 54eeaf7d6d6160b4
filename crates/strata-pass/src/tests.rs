#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::*;
    use strata_core::{Color, FramebufferId, IRect, Monitor, Rect, Region, ShaderKind, Size, TextureId};
    use strata_renderer::{BatchConfig, BlurConfig, CommandLog, DeviceCommand, HeadlessDevice, RenderContext};

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    const GREY: Color = Color::new(0.5, 0.5, 0.5, 1.0);
    const GLASS: Color = Color::new(1.0, 1.0, 1.0, 0.5);

    fn monitor() -> Monitor {
        Monitor::new(Size::new(1920.0, 1080.0), 1.0)
    }

    fn context_with(monitor: Monitor) -> (CommandLog, RenderContext) {
        let device = HeadlessDevice::new();
        let log = device.log();
        let ctx = RenderContext::new(Box::new(device), monitor, BatchConfig::default(), BlurConfig::default())
            .unwrap();
        log.clear();
        (log, ctx)
    }

    fn context() -> (CommandLog, RenderContext) {
        context_with(monitor())
    }

    fn full_damage() -> Region {
        Region::from(monitor().bounds())
    }

    fn sampling_radius() -> f32 {
        BlurConfig::default().sampling_radius()
    }

    #[derive(Default)]
    struct Feedback {
        presented: Cell<u32>,
        discarded: Cell<u32>,
    }

    impl PresentationFeedback for Feedback {
        fn presented(&self) {
            self.presented.set(self.presented.get() + 1);
        }

        fn discarded(&self) {
            self.discarded.set(self.discarded.get() + 1);
        }
    }

    /// Claims live blur without a bounding box.
    struct BrokenBlur;

    impl PassElement for BrokenBlur {
        fn draw(&mut self, _ctx: &mut RenderContext, _damage: &Region) {}

        fn needs_live_blur(&self) -> bool {
            true
        }

        fn pass_name(&self) -> &'static str {
            "BrokenBlur"
        }

        fn element_kind(&self) -> ElementKind {
            ElementKind::Rect
        }
    }

    // ──────────────────────────────────────────
    // Bookkeeping
    // ──────────────────────────────────────────

    #[test]
    fn test_new_pass_is_empty() {
        let pass = RenderPass::new();
        assert!(pass.is_empty());
        assert_eq!(pass.len(), 0);
        assert!(!pass.is_single());
        assert!(!pass.needs_introspection());
    }

    #[test]
    fn test_is_single_and_clear() {
        let mut pass = RenderPass::new();
        pass.add_element(ClearElement::new(Color::BLACK));
        assert!(pass.is_single());
        pass.add_element(RectElement::new(SCREEN, GREY));
        assert_eq!(pass.len(), 2);
        pass.clear();
        assert!(pass.is_empty());
    }

    #[test]
    fn test_remove_all_of_kind() {
        let mut pass = RenderPass::new();
        pass.add_element(ClearElement::new(Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY));
        pass.add_element(ShadowElement::new(Rect::new(10.0, 10.0, 50.0, 50.0), Color::BLACK, 8.0));
        pass.add_element(RectElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GREY));
        pass.remove_all_of_kind(ElementKind::Rect);
        let kinds: Vec<ElementKind> = pass.entries().iter().map(|e| e.element().element_kind()).collect();
        assert_eq!(kinds, vec![ElementKind::Clear, ElementKind::Shadow]);
    }

    #[test]
    fn test_needs_introspection_with_blur() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, GREY));
        assert!(!pass.needs_introspection());
        pass.add_element(RectElement::new(Rect::new(0.0, 0.0, 100.0, 100.0), GLASS).blurred(true));
        assert!(pass.needs_introspection());
    }

    // ──────────────────────────────────────────
    // Occlusion
    // ──────────────────────────────────────────

    #[test]
    fn test_opaque_stack_discards_background() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY));
        pass.add_element(RectElement::new(SCREEN, Color::WHITE));

        let verdicts = pass.simplify(&full_damage(), &monitor(), sampling_radius());
        assert_eq!(verdicts.len(), 3);
        assert!(verdicts[0].discard);
        assert!(verdicts[0].damage.is_empty());
        assert!(verdicts[1].discard);
        assert!(!verdicts[2].discard);
        assert!(verdicts[2].damage.same_pixels(&full_damage()));
    }

    #[test]
    fn test_partial_cover_leaves_remaining_damage() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(Rect::new(0.0, 0.0, 960.0, 1080.0), GREY));

        let verdicts = pass.simplify(&full_damage(), &monitor(), sampling_radius());
        assert!(!verdicts[0].discard);
        assert_eq!(verdicts[0].damage.extents(), IRect::new(960, 0, 1920, 1080));
    }

    #[test]
    fn test_element_outside_damage_is_discarded() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(Rect::new(1000.0, 1000.0, 50.0, 50.0), GREY));
        let damage = Region::from(IRect::new(0, 0, 100, 100));

        let verdicts = pass.simplify(&damage, &monitor(), sampling_radius());
        assert!(verdicts[0].discard);
    }

    #[test]
    fn test_translucent_element_does_not_occlude() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GLASS));

        let verdicts = pass.simplify(&full_damage(), &monitor(), sampling_radius());
        assert!(!verdicts[0].discard);
        assert!(verdicts[0].damage.same_pixels(&full_damage()));
    }

    #[test]
    fn test_element_without_bbox_is_never_bbox_discarded() {
        let mut pass = RenderPass::new();
        pass.add_element(ClearElement::new(Color::BLACK));
        pass.add_element(RectElement::new(Rect::new(0.0, 0.0, 100.0, 100.0), GREY));
        let damage = Region::from(IRect::new(500, 500, 600, 600));

        let verdicts = pass.simplify(&damage, &monitor(), sampling_radius());
        assert!(verdicts[1].discard);
        assert!(!verdicts[0].discard);
        assert!(verdicts[0].damage.same_pixels(&damage));
    }

    #[test]
    fn test_damage_is_clipped_to_monitor() {
        let mut pass = RenderPass::new();
        pass.add_element(ClearElement::new(Color::BLACK));
        let damage = Region::from(IRect::new(-100, -100, 5000, 5000));

        let verdicts = pass.simplify(&damage, &monitor(), sampling_radius());
        assert_eq!(verdicts[0].damage.extents(), monitor().bounds());
    }

    #[test]
    fn test_rounded_corners_stay_damaged() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY).rounded(20.0, 2.0));

        let verdicts = pass.simplify(&full_damage(), &monitor(), sampling_radius());
        assert!(!verdicts[0].discard);
        assert!(verdicts[0].damage.contains_point(1, 1));
        assert!(!verdicts[0].damage.contains_point(960, 540));
    }

    #[test]
    fn test_opaque_region_scales_with_monitor() {
        let scaled = Monitor::new(Size::new(1920.0, 1080.0), 2.0);
        let mut pass = RenderPass::new();
        pass.add_element(ClearElement::new(Color::BLACK));
        pass.add_element(RectElement::new(Rect::new(0.0, 0.0, 960.0, 540.0), GREY));

        let verdicts = pass.simplify(&Region::from(scaled.bounds()), &scaled, sampling_radius());
        assert!(!verdicts[1].discard);
        assert!(verdicts[0].discard);
    }

    // ──────────────────────────────────────────
    // Live blur
    // ──────────────────────────────────────────

    #[test]
    fn test_live_blur_keeps_sampled_pixels_damaged() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY));
        pass.add_element(RectElement::new(Rect::new(100.0, 100.0, 200.0, 200.0), GLASS).blurred(false));

        let verdicts = pass.simplify(&full_damage(), &monitor(), 32.0);
        assert!(!verdicts[0].discard);
        assert_eq!(verdicts[0].damage.extents(), IRect::new(68, 68, 332, 332));
        assert!(verdicts[0].damage.contains_point(200, 200));
        assert!(!verdicts[0].damage.contains_point(10, 10));
    }

    #[test]
    fn test_blur_below_does_not_protect_opaque_above() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(Rect::new(100.0, 100.0, 200.0, 200.0), GLASS).blurred(false));
        pass.add_element(RectElement::new(SCREEN, GREY));

        let verdicts = pass.simplify(&full_damage(), &monitor(), 32.0);
        assert!(verdicts[0].discard);
        assert!(verdicts[1].discard);
    }

    #[test]
    fn test_xray_blur_does_not_protect_pixels() {
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY));
        pass.add_element(RectElement::new(Rect::new(100.0, 100.0, 200.0, 200.0), GLASS).blurred(true));

        let verdicts = pass.simplify(&full_damage(), &monitor(), 32.0);
        assert!(verdicts[0].discard);
    }

    #[test]
    #[should_panic(expected = "no bounding box")]
    fn test_live_blur_without_bbox_panics() {
        let mut pass = RenderPass::new();
        pass.add_element(BrokenBlur);
        pass.simplify(&full_damage(), &monitor(), 32.0);
    }

    #[test]
    fn test_render_expands_damage_around_blur() {
        let (_log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(Rect::new(100.0, 100.0, 200.0, 200.0), GLASS).blurred(false));

        let damage = Region::from(IRect::new(150, 150, 160, 160));
        let outcome = pass.render(&mut ctx, &damage);
        let radius = BlurConfig::default().one_blur_radius() as i32;
        assert_eq!(
            outcome.damage.extents(),
            IRect::new(150 - radius, 150 - radius, 160 + radius, 160 + radius)
        );
        assert!(!outcome.precompute_blur);
    }

    #[test]
    fn test_render_without_blur_keeps_damage() {
        let (_log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));

        let damage = Region::from(IRect::new(150, 150, 160, 160));
        let outcome = pass.render(&mut ctx, &damage);
        assert!(outcome.damage.same_pixels(&damage));
    }

    // ──────────────────────────────────────────
    // Rendering
    // ──────────────────────────────────────────

    #[test]
    fn test_empty_damage_draws_nothing() {
        let (log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, GREY));

        let outcome = pass.render(&mut ctx, &Region::new());
        assert!(outcome.damage.is_empty());
        assert!(!outcome.precompute_blur);
        assert!(log.is_empty());
    }

    #[test]
    fn test_render_draws_only_visible_elements() {
        let (log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY));

        pass.render(&mut ctx, &full_damage());
        assert!(pass.entries()[0].is_discarded());
        assert!(!pass.entries()[1].is_discarded());
        assert_eq!(log.draw_calls(), 1);
    }

    #[test]
    fn test_disable_simplification_gives_full_damage() {
        let (log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(RectElement::new(SCREEN, Color::BLACK));
        pass.add_element(RectElement::new(SCREEN, GREY));
        pass.add_element(FramebufferElement::capturing(FramebufferId(1)));

        let damage = full_damage();
        pass.render(&mut ctx, &damage);
        for entry in pass.entries() {
            assert!(!entry.is_discarded());
            assert!(entry.damage().same_pixels(&damage));
        }
        assert_eq!(log.draw_calls(), 2);
    }

    #[test]
    fn test_undiscardable_element_always_draws() {
        let (log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(FramebufferElement::new(FramebufferId(2)));
        pass.add_element(RectElement::new(SCREEN, GREY));

        pass.render(&mut ctx, &full_damage());
        assert!(!pass.entries()[0].is_discarded());
        assert_eq!(log.count(|c| *c == DeviceCommand::BindFramebuffer(FramebufferId(2))), 1);
    }

    #[test]
    fn test_precompute_blur_is_reported() {
        let (log, mut ctx) = context();
        let mut pass = RenderPass::new();
        pass.add_element(PreBlurElement::new());
        pass.add_element(RectElement::new(SCREEN, GREY));

        let outcome = pass.render(&mut ctx, &full_damage());
        assert!(outcome.precompute_blur);
        assert_eq!(log.count(|c| matches!(c, DeviceCommand::BlurBackground { .. })), 1);
    }

    #[test]
    fn test_discarded_surface_gets_feedback() {
        let (_log, mut ctx) = context();
        let hidden = Rc::new(Feedback::default());
        let shown = Rc::new(Feedback::default());
        let mut pass = RenderPass::new();
        pass.add_element(
            SurfaceElement::new(TextureId(1), Rect::new(100.0, 100.0, 300.0, 200.0)).with_feedback(hidden.clone()),
        );
        pass.add_element(RectElement::new(SCREEN, GREY));
        pass.add_element(
            SurfaceElement::new(TextureId(2), Rect::new(400.0, 100.0, 300.0, 200.0)).with_feedback(shown.clone()),
        );

        pass.render(&mut ctx, &full_damage());
        assert_eq!(hidden.discarded.get(), 1);
        assert_eq!(hidden.presented.get(), 0);
        assert_eq!(shown.presented.get(), 1);
        assert_eq!(shown.discarded.get(), 0);
    }

    #[test]
    fn test_opaque_surface_region_occludes() {
        let mut pass = RenderPass::new();
        pass.add_element(ClearElement::new(Color::BLACK));
        pass.add_element(
            SurfaceElement::new(TextureId(1), Rect::new(100.0, 100.0, 200.0, 200.0))
                .with_opaque_region(Region::from(IRect::new(0, 0, 200, 100))),
        );
        let damage = Region::from(IRect::new(100, 100, 300, 300));

        let verdicts = pass.simplify(&damage, &monitor(), sampling_radius());
        assert_eq!(verdicts[0].damage.extents(), IRect::new(100, 200, 300, 300));
    }

    #[test]
    fn test_debug_overlay_keeps_verdicts() {
        let build = || {
            let mut pass = RenderPass::new();
            pass.add_element(RectElement::new(SCREEN, Color::BLACK));
            pass.add_element(RectElement::new(Rect::new(0.0, 0.0, 960.0, 1080.0), GREY));
            pass
        };
        let (plain_log, mut plain_ctx) = context();
        let (debug_log, mut debug_ctx) = context();
        debug_ctx.set_debug_pass(true);

        let mut plain = build();
        let mut debug = build();
        let plain_outcome = plain.render(&mut plain_ctx, &full_damage());
        let debug_outcome = debug.render(&mut debug_ctx, &full_damage());

        assert!(plain_outcome.damage.same_pixels(&debug_outcome.damage));
        assert_eq!(plain_outcome.precompute_blur, debug_outcome.precompute_blur);
        for (a, b) in plain.entries().iter().zip(debug.entries()) {
            assert_eq!(a.is_discarded(), b.is_discarded());
            assert!(a.damage().same_pixels(b.damage()));
        }
        assert!(debug_log.draw_calls() > plain_log.draw_calls());
    }

    // ──────────────────────────────────────────
    // Batched pass element
    // ──────────────────────────────────────────

    #[test]
    fn test_batched_element_splits_children() {
        let mut batched = BatchedPassElement::new();
        batched.add_element(Box::new(RectElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GREY)));
        batched.add_element(Box::new(BorderElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GREY, 2.0)));
        batched.add_element(Box::new(RectElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GLASS).blurred(false)));
        batched.add_element(Box::new(ShadowElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK, 4.0)));
        assert_eq!(batched.batched_len(), 2);
        assert_eq!(batched.unbatched_len(), 2);
        assert!(batched.needs_live_blur());
    }

    #[test]
    fn test_batched_records_draw_before_unbatched() {
        let (log, mut ctx) = context();
        let mut batched = BatchedPassElement::new();
        batched.add_element(Box::new(BorderElement::new(Rect::new(10.0, 10.0, 100.0, 100.0), GREY, 2.0)));
        batched.add_element(Box::new(RectElement::new(Rect::new(10.0, 10.0, 100.0, 100.0), GREY)));

        batched.draw(&mut ctx, &full_damage());
        let shaders: Vec<ShaderKind> = log
            .commands()
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::Draw { shader, .. } => *shader,
                _ => None,
            })
            .collect();
        assert_eq!(shaders, vec![ShaderKind::Quad, ShaderKind::Border]);
    }

    #[test]
    fn test_batched_rects_share_one_draw() {
        let (log, mut ctx) = context();
        let mut batched = BatchedPassElement::new();
        for i in 0..20 {
            let x = i as f32 * 20.0;
            batched.add_element(Box::new(RectElement::new(Rect::new(x, 0.0, 10.0, 10.0), GREY)));
        }

        batched.draw(&mut ctx, &full_damage());
        assert_eq!(log.draw_calls(), 1);
        assert_eq!(ctx.batches().metrics().draw_calls, 1);
    }

    #[test]
    fn test_batched_replay_stays_inside_damage_rects() {
        let (log, mut ctx) = context();
        let mut batched = BatchedPassElement::new();
        for (x, y) in [(0.0, 0.0), (500.0, 500.0), (600.0, 500.0), (700.0, 500.0)] {
            batched.add_element(Box::new(RectElement::new(Rect::new(x, y, 20.0, 20.0), GLASS)));
        }
        let damage: Region = [IRect::new(0, 0, 10, 10), IRect::new(1000, 1000, 1010, 1010)]
            .into_iter()
            .collect();

        batched.draw(&mut ctx, &damage);
        let scissors: Vec<IRect> = log
            .commands()
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetScissor(Some(scissor)) => Some(*scissor),
                _ => None,
            })
            .collect();
        assert!(!scissors.is_empty());
        for scissor in &scissors {
            assert!(damage.rects().iter().any(|d| d.intersection(scissor) == Some(*scissor)));
        }
        assert_eq!(log.draw_calls(), 1);
    }

    #[test]
    fn test_batched_blur_with_unbounded_child_renders() {
        let (log, mut ctx) = context();
        let glass = Rect::new(100.0, 100.0, 200.0, 200.0);
        let mut batched = BatchedPassElement::new();
        batched.add_element(Box::new(ClearElement::new(Color::BLACK)));
        batched.add_element(Box::new(RectElement::new(glass, GLASS).blurred(false)));
        assert!(batched.needs_live_blur());
        assert_eq!(batched.bounding_box(), Some(glass));
        assert!(batched.undiscardable());

        let mut pass = RenderPass::new();
        pass.add_element(batched);
        let damage = Region::from(IRect::new(1500, 900, 1600, 1000));
        let outcome = pass.render(&mut ctx, &damage);
        assert!(!pass.entries()[0].is_discarded());
        assert!(outcome.damage.same_pixels(&damage));
        assert_eq!(log.count(|c| *c == DeviceCommand::Clear(Color::BLACK)), 1);
    }

    #[test]
    fn test_batched_bbox_is_union() {
        let mut batched = BatchedPassElement::new();
        assert_eq!(batched.bounding_box(), None);
        batched.add_element(Box::new(RectElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GREY)));
        batched.add_element(Box::new(RectElement::new(Rect::new(90.0, 90.0, 10.0, 10.0), GREY)));
        assert_eq!(batched.bounding_box(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));

        batched.add_element(Box::new(ClearElement::new(Color::BLACK)));
        assert_eq!(batched.bounding_box(), None);
    }

    #[test]
    fn test_batched_opaque_region_is_union() {
        let mut batched = BatchedPassElement::new();
        batched.add_element(Box::new(RectElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GREY)));
        batched.add_element(Box::new(RectElement::new(Rect::new(20.0, 0.0, 10.0, 10.0), GREY)));
        batched.add_element(Box::new(RectElement::new(Rect::new(40.0, 0.0, 10.0, 10.0), GLASS)));
        assert_eq!(batched.opaque_region().area(), 200);
    }

    #[test]
    fn test_batched_discard_reaches_children() {
        let feedback = Rc::new(Feedback::default());
        let mut batched = BatchedPassElement::new();
        batched.add_element(Box::new(
            SurfaceElement::new(TextureId(1), Rect::new(0.0, 0.0, 10.0, 10.0)).with_feedback(feedback.clone()),
        ));
        batched.discard();
        assert_eq!(feedback.discarded.get(), 1);
    }

    #[test]
    fn test_batched_element_inherits_undiscardable() {
        let mut batched = BatchedPassElement::new();
        batched.add_element(Box::new(RectElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), GREY)));
        assert!(!batched.undiscardable());
        batched.add_element(Box::new(FramebufferElement::capturing(FramebufferId(3))));
        assert!(batched.undiscardable());
        assert!(batched.disable_simplification());
    }
}
