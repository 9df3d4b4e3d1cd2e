use criterion::{Criterion, criterion_group, criterion_main};
use shape_garden::config::SceneConfig;
use shape_garden::picking::ray::Ray;
use shape_garden::picking::{ViewportRect, pick, pick_ray};
use shape_garden::render::Renderer;
use shape_garden::render::z_buffer::ZBufferPerformer;
use shape_garden::scene::context::{SceneContext, ShapeTextures};
use std::hint::black_box;
use std::time::Duration;

fn grid() -> SceneContext {
    let mut ctx = SceneContext::new(&SceneConfig::default(), &ShapeTextures::solid());
    ctx.animate(Duration::from_millis(1500));
    ctx
}

fn pick_benchmark(c: &mut Criterion) {
    let ctx = grid();
    let rect = ViewportRect::from_size(800.0, 800.0);
    let pickables = ctx.registry.snapshot();

    let mut group = c.benchmark_group("Picking");
    group.bench_function("center click", |b| {
        b.iter(|| {
            pick(
                black_box(rect.center()),
                &rect,
                &ctx.camera,
                &ctx.scene,
                pickables,
            )
        })
    });

    // shallow ray across the whole grid
    let ray = Ray::new(ctx.camera.pos, nalgebra::Vector3::new(0.0, -0.3, -1.0));
    if let Some(ray) = ray {
        group.bench_function("ray through grid", |b| {
            b.iter(|| pick_ray(black_box(&ray), &ctx.scene, pickables))
        });
    }
    group.finish();
}

fn render_benchmark(c: &mut Criterion) {
    let ctx = grid();
    let mut renderer = ZBufferPerformer::default();
    let mut group = c.benchmark_group("Rendering");
    group.sample_size(20);
    group.bench_function("grid 400x400", |b| {
        b.iter(|| renderer.create_frame(400, 400, black_box(&ctx)))
    });
    group.finish();
}

criterion_group!(benches, pick_benchmark, render_benchmark);
criterion_main!(benches);
