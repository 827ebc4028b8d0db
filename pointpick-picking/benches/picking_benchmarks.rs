use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pointpick_core::{PerspectiveCamera, Point3f, PointDataset};
use pointpick_io::planet_shell;
use pointpick_picking::{ObjectKind, PickingEngine, PixelPosition, Scene, SelectionStateMachine, Viewport};

const POINT_COUNTS: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];
const VIEWPORT: Viewport = Viewport { width: 1280.0, height: 720.0 };

fn planet_scene(count: usize) -> (Scene, pointpick_picking::ObjectId) {
    let dataset = PointDataset::load(planet_shell(count, 5.0, 0.1, 42)).unwrap();
    let mut scene = Scene::new();
    let cloud = scene.add("planet", ObjectKind::Points(dataset));
    (scene, cloud)
}

fn camera() -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(45.0, VIEWPORT.width / VIEWPORT.height, 0.1, 1000.0);
    camera.position = Point3f::new(0.0, 0.0, 20.0);
    camera
}

fn pick(c: &mut Criterion) {
    let engine = PickingEngine::new();
    let camera = camera();
    let pointer = PixelPosition::new(640.0, 360.0);

    let mut g = c.benchmark_group("pick");
    g.sample_size(20);

    for count in POINT_COUNTS {
        let (scene, cloud) = planet_scene(count);
        g.bench_with_input(BenchmarkId::from_parameter(count), &(&scene, cloud), |b, &(scene, cloud)| {
            b.iter(|| engine.pick(std::hint::black_box(pointer), VIEWPORT, &camera, scene, cloud));
        });
    }

    g.finish();
}

fn pick_and_highlight(c: &mut Criterion) {
    let engine = PickingEngine::new();
    let camera = camera();
    let pointer = PixelPosition::new(640.0, 360.0);

    let mut g = c.benchmark_group("pick and highlight");
    g.sample_size(20);

    for count in POINT_COUNTS {
        let (mut scene, cloud) = planet_scene(count);
        let mut selection = SelectionStateMachine::new();
        g.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| {
                let hit = engine.pick(pointer, VIEWPORT, &camera, &scene, cloud);
                if let Some(dataset) = scene.points_mut(cloud) {
                    selection.apply(dataset, hit.as_ref()).unwrap();
                }
            });
        });
    }

    g.finish();
}

criterion_group!(benches, pick, pick_and_highlight);
criterion_main!(benches);
