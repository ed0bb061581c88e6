//! # ignite_app — demo coordinator
//!
//! Wires the init scheduler into a fixed-timestep tick loop with a small
//! demo registration set: a deferred asset-catalog load, a renderer that
//! depends on it, and a bullet pool that stays dormant until the first
//! entity gains a `"bullet"` component.
//!
//! ## Startup sequence
//!
//! 1. Define resources and component kinds.
//! 2. Register init routines (order-independent).
//! 3. Request readiness for the resources the demo consumes.
//! 4. Enter the tick loop; init work advances at `simulation-begin`.

mod tick;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use futures::channel::oneshot;
use ignite_resource::{Resource, ResourceId};
use ignite_sched::{InitDescriptor, InitOutcome, Phase};
use tick::{TickConfig, TickLoop};

/// Loaded asset manifest.
struct AssetCatalog {
    manifest: Vec<String>,
}

impl Resource for AssetCatalog {
    type Params = Vec<String>;

    fn type_name() -> &'static str {
        "AssetCatalog"
    }

    fn build(manifest: Vec<String>) -> Self {
        Self { manifest }
    }
}

/// Render surface stand-in.
struct Renderer {
    width: u32,
    height: u32,
}

struct RendererParams {
    width: u32,
    height: u32,
}

impl Resource for Renderer {
    type Params = RendererParams;

    fn type_name() -> &'static str {
        "Renderer"
    }

    fn build(params: RendererParams) -> Self {
        Self {
            width: params.width,
            height: params.height,
        }
    }
}

/// Physics solver stand-in.
struct PhysicsWorld {
    gravity: f32,
}

impl Resource for PhysicsWorld {
    type Params = f32;

    fn type_name() -> &'static str {
        "PhysicsWorld"
    }

    fn build(gravity: f32) -> Self {
        Self { gravity }
    }
}

/// Pre-allocated projectile storage.
struct BulletPool {
    capacity: usize,
}

impl Resource for BulletPool {
    type Params = usize;

    fn type_name() -> &'static str {
        "BulletPool"
    }

    fn build(capacity: usize) -> Self {
        Self { capacity }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ignite_app=info".parse()?))
        .init();

    info!("ignite coordinator starting");

    let mut tick_loop = TickLoop::new(TickConfig {
        tick_rate: 60.0,
        max_ticks: 60,
        stall_warn_ticks: 30,
    });

    let scheduler = tick_loop.scheduler_mut();
    scheduler.resources_mut().define::<AssetCatalog>()?;
    scheduler.resources_mut().define::<Renderer>()?;
    scheduler.resources_mut().define::<PhysicsWorld>()?;
    scheduler.resources_mut().define::<BulletPool>()?;
    let bullet = scheduler.components_mut().define("bullet")?;
    scheduler.components_mut().define("sprite")?;

    // Asset catalog: a deferred load, settled by a background task a few
    // frames into the run.
    scheduler.register_lazy(
        InitDescriptor::new()
            .named("asset-catalog")
            .provides(ResourceId::of::<AssetCatalog>()),
        |_reg| {
            let (sender, receiver) = oneshot::channel();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                let manifest = vec!["sprites.atlas".to_string(), "level1.map".to_string()];
                let _ = sender.send(manifest);
            });
            InitOutcome::deferred(async move {
                let manifest = receiver.await.unwrap_or_default();
                let apply: ignite_sched::ApplyFn = Box::new(move |reg| {
                    reg.add::<AssetCatalog>(manifest)
                        .expect("asset catalog is constructed once");
                });
                apply
            })
        },
    )?;

    // Renderer: needs the catalog before it can build its upload queue.
    scheduler.register_lazy(
        InitDescriptor::new()
            .named("renderer")
            .requires(ResourceId::of::<AssetCatalog>())
            .provides(ResourceId::of::<Renderer>()),
        |reg| {
            let assets = reg
                .get::<AssetCatalog>()
                .expect("asset catalog is a declared requirement");
            info!(assets = assets.manifest.len(), "creating renderer");
            reg.add::<Renderer>(RendererParams {
                width: 1280,
                height: 720,
            })
            .expect("renderer is constructed once");
            InitOutcome::Immediate
        },
    )?;

    // Physics world: dormant until something needs it.
    scheduler.register_lazy(
        InitDescriptor::new()
            .named("physics-world")
            .provides(ResourceId::of::<PhysicsWorld>()),
        |reg| {
            reg.add::<PhysicsWorld>(-9.81)
                .expect("physics world is constructed once");
            InitOutcome::Immediate
        },
    )?;

    // Bullet pool: waits for the first bullet entity, then pulls the
    // physics world into existence.
    scheduler.register_eager(
        InitDescriptor::new()
            .named("bullet-pool")
            .triggered_by(bullet)
            .requires(ResourceId::of::<PhysicsWorld>())
            .provides(ResourceId::of::<BulletPool>()),
        |reg| {
            let gravity = reg
                .get::<PhysicsWorld>()
                .expect("physics world is a declared requirement")
                .gravity;
            info!(gravity, "allocating bullet pool");
            reg.add::<BulletPool>(256)
                .expect("bullet pool is constructed once");
            InitOutcome::Immediate
        },
    )?;

    // The demo consumes the renderer; demand wakes the asset/renderer chain.
    let renderer_ready = scheduler.when_ready(&[ResourceId::of::<Renderer>()]);

    // Stand-in for the component system: the first bullet entity appears a
    // few frames in.
    tick_loop
        .schedule_mut()
        .add_system(Phase::Gameplay, "spawn-demo-entities", move |scheduler| {
            if scheduler.current_tick() == 5 {
                info!("first bullet entity spawned");
                scheduler.mark_component_seen(bullet);
            }
        });

    tick_loop.run();

    renderer_ready.await;
    let renderer = tick_loop
        .scheduler()
        .resources()
        .get::<Renderer>()
        .expect("renderer readiness implies presence");
    info!(
        width = renderer.width,
        height = renderer.height,
        bullet_pool = tick_loop
            .scheduler()
            .resources()
            .get::<BulletPool>()
            .map(|pool| pool.capacity),
        "startup complete"
    );

    let report = tick_loop.scheduler().timing_report();
    info!(report = %serde_json::to_string_pretty(&report)?, "init timing report");
    ignite_sched::log_summary(tick_loop.scheduler());

    info!("ignite coordinator shut down");
    Ok(())
}
