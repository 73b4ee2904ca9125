use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use threadpool::ThreadPool;
use tracing::{event, Level};

use crate::content::aabb_decorator::{AabbDecorator, TileHeights};
use crate::content::download_client::Client;
use crate::content::layer_assembler::LayerAssembler;
use crate::content::load_service::{LayerKind, TileLoadService};
use crate::content::quad_assembler::QuadAssembler;
use crate::content::rate_limiter::RateLimiter;
use crate::content::scheduler::{Scheduler, HEIGHT_TILE_SIZE, ORTHO_TILE_SIZE};
use crate::content::slot_limiter::SlotLimiter;
use crate::content::tile_id::TileId;
use crate::content::types::{GpuTileQuad, TileLayer};
use crate::helpers::channel::{unbounded_channel, Receiver, RecvTimeoutError, Sender};
use crate::helpers::time::time_since_epoch;
use crate::helpers::AlpError;
use crate::world::Config;

const IDLE_TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub enum Command {
    UpdateCamera(crate::dynamics::Camera),
    SetEnabled(bool),
    SetNetworkReachability(bool),
    SetGpuQuadLimit(usize),
    SetRamQuadLimit(usize),
    SetSlotLimit(usize),
    SetRateLimit(usize, u64),
    SetUpdateTimeout(u64),
    SetPurgeTimeout(u64),
    SetRetirementAge(u64),
    SetPermissibleScreenSpaceError(f64),
    PersistTiles,
    Shutdown,
}

/// What the embedding application observes. `GpuQuadsUpdated` carries a
/// disjoint delta against the previous publish; `QuadReceived` is one per
/// delivered quad, for UI and statistics.
#[derive(Debug, Clone)]
pub enum Event {
    QuadReceived(TileId),
    GpuQuadsUpdated {
        added: Vec<GpuTileQuad>,
        removed: Vec<TileId>,
    },
}

/// Everything that wakes the pipeline thread travels on one channel, so the
/// loop has a single suspension point.
pub enum PipelineMessage {
    Command(Command),
    TileLoaded(LayerKind, TileLayer),
}

pub struct Pipeline {
    messages: Sender<PipelineMessage>,
    events: Receiver<Event>,
    aabb_decorator: std::sync::Arc<AabbDecorator>,
    join: Option<JoinHandle<()>>,
}

impl Pipeline {
    /// The decorator the scheduler culls with; the GPU consumer needs the
    /// same one so both sides agree on tile geometry.
    pub fn aabb_decorator(&self) -> std::sync::Arc<AabbDecorator> {
        self.aabb_decorator.clone()
    }

    /// Block until the next event arrives; `None` once the pipeline is gone.
    pub fn next_event(&self) -> Option<Event> {
        self.events.recv().ok()
    }

    pub fn try_next_event(&self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    pub fn next_event_timeout(&self, timeout: Duration) -> Option<Event> {
        self.events.recv_timeout(timeout).ok()
    }

    fn command(&self, command: Command) -> Result<(), AlpError> {
        self.messages
            .send(PipelineMessage::Command(command))
            .map_err(|_| AlpError::Internal("pipeline thread is gone".to_string()))
    }

    pub fn update_camera(&self, camera: crate::dynamics::Camera) -> Result<(), AlpError> {
        self.command(Command::UpdateCamera(camera))
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), AlpError> {
        self.command(Command::SetEnabled(enabled))
    }

    pub fn set_network_reachability(&self, reachable: bool) -> Result<(), AlpError> {
        self.command(Command::SetNetworkReachability(reachable))
    }

    pub fn set_gpu_quad_limit(&self, limit: usize) -> Result<(), AlpError> {
        self.command(Command::SetGpuQuadLimit(limit))
    }

    pub fn set_ram_quad_limit(&self, limit: usize) -> Result<(), AlpError> {
        self.command(Command::SetRamQuadLimit(limit))
    }

    pub fn set_slot_limit(&self, limit: usize) -> Result<(), AlpError> {
        self.command(Command::SetSlotLimit(limit))
    }

    pub fn set_rate_limit(&self, rate: usize, period_ms: u64) -> Result<(), AlpError> {
        self.command(Command::SetRateLimit(rate, period_ms))
    }

    pub fn set_update_timeout(&self, timeout_ms: u64) -> Result<(), AlpError> {
        self.command(Command::SetUpdateTimeout(timeout_ms))
    }

    pub fn set_purge_timeout(&self, timeout_ms: u64) -> Result<(), AlpError> {
        self.command(Command::SetPurgeTimeout(timeout_ms))
    }

    pub fn set_retirement_age(&self, age_ms: u64) -> Result<(), AlpError> {
        self.command(Command::SetRetirementAge(age_ms))
    }

    pub fn set_permissible_screen_space_error(&self, error_px: f64) -> Result<(), AlpError> {
        self.command(Command::SetPermissibleScreenSpaceError(error_px))
    }

    pub fn persist_tiles(&self) -> Result<(), AlpError> {
        self.command(Command::PersistTiles)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        let _ = self
            .messages
            .send(PipelineMessage::Command(Command::Shutdown));
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

struct Services {
    ortho: TileLoadService,
    height: TileLoadService,
    vector: Option<TileLoadService>,
}

impl Services {
    fn load(&self, id: TileId) {
        self.ortho.load(id);
        self.height.load(id);
        if let Some(vector) = &self.vector {
            vector.load(id);
        }
    }
}

/// Build all stages, wire them together and run them on a dedicated thread.
/// The scheduler starts disabled; call `set_enabled(true)` once the GPU
/// consumer is ready to receive quads.
pub fn start_pipeline(config: Config) -> Result<Pipeline, AlpError> {
    config.validate()?;

    let (message_tx, message_rx) = unbounded_channel::<PipelineMessage>();
    let (event_tx, event_rx) = unbounded_channel::<Event>();

    let client = Client::new(Duration::from_millis(config.transfer_timeout_ms))?;
    let pool = ThreadPool::with_name("tile-fetch".to_string(), num_cpus::get().clamp(2, 12));

    let new_service = |service: &crate::world::ServiceConfig, layer| {
        TileLoadService::new(
            &service.base_url,
            service.url_pattern,
            &service.file_ending,
            service.load_balancing_targets.clone(),
            layer,
            client.clone(),
            pool.clone(),
            message_tx.clone(),
        )
    };
    let services = Services {
        ortho: new_service(&config.ortho_service, LayerKind::Ortho),
        height: new_service(&config.terrain_service, LayerKind::Height),
        vector: config
            .vector_service
            .as_ref()
            .map(|service| new_service(service, LayerKind::Vector)),
    };

    let tile_heights = match &config.height_pyramid_path {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                AlpError::InvalidInput(format!(
                    "failed to read height pyramid {}: {e}",
                    path.display()
                ))
            })?;
            TileHeights::deserialise(&bytes)?
        }
        None => TileHeights::new(),
    };

    let aabb_decorator = AabbDecorator::make(tile_heights);
    let mut scheduler = Scheduler::new(
        Scheduler::white_jpeg_tile(ORTHO_TILE_SIZE)?,
        Scheduler::black_png_tile(HEIGHT_TILE_SIZE)?,
        config.resolved_cache_dir(),
    );
    scheduler.set_aabb_decorator(aabb_decorator.clone());
    scheduler.set_gpu_quad_limit(config.gpu_quad_limit);
    scheduler.set_ram_quad_limit(config.ram_quad_limit);
    scheduler.set_update_timeout(config.update_timeout_ms);
    scheduler.set_purge_timeout(config.purge_timeout_ms);
    scheduler.set_retirement_age(config.retirement_age_ms);
    scheduler.set_permissible_screen_space_error(config.permissible_screen_space_error);
    scheduler.read_disk_cache();

    let mut slot_limiter = SlotLimiter::new();
    slot_limiter.set_limit(config.slot_limit);
    let mut rate_limiter = RateLimiter::new();
    rate_limiter.set_limit(config.request_rate, config.request_period_ms);
    let layer_assembler = LayerAssembler::new(config.vector_service.is_some());

    let join = thread::Builder::new()
        .name("tile-pipeline".to_string())
        .spawn(move || {
            run_pipeline(
                scheduler,
                slot_limiter,
                rate_limiter,
                QuadAssembler::new(),
                layer_assembler,
                services,
                message_rx,
                event_tx,
            );
        })
        .map_err(|e| AlpError::Internal(format!("failed to spawn pipeline thread: {e}")))?;

    Ok(Pipeline {
        messages: message_tx,
        events: event_rx,
        aabb_decorator,
        join: Some(join),
    })
}

#[allow(clippy::too_many_arguments)]
fn run_pipeline(
    mut scheduler: Scheduler,
    mut slot_limiter: SlotLimiter,
    mut rate_limiter: RateLimiter,
    mut quad_assembler: QuadAssembler,
    mut layer_assembler: LayerAssembler,
    services: Services,
    messages: Receiver<PipelineMessage>,
    events: Sender<Event>,
) {
    event!(Level::INFO, "tile pipeline running");
    loop {
        let timeout = next_timeout(&scheduler, &rate_limiter);
        match messages.recv_timeout(timeout) {
            Ok(PipelineMessage::Command(Command::Shutdown)) => break,
            Ok(PipelineMessage::Command(command)) => {
                handle_command(command, &mut scheduler, &mut slot_limiter, &mut rate_limiter);
            }
            Ok(PipelineMessage::TileLoaded(layer, tile)) => {
                if let Some(layered) = layer_assembler.deliver(layer, tile) {
                    if let Some(quad) = quad_assembler.deliver_tile(layered) {
                        let (quad, admitted) = slot_limiter.deliver_quad(quad);
                        if let Some(next) = admitted {
                            dispatch_quad_request(
                                next,
                                &mut rate_limiter,
                                &mut quad_assembler,
                                &services,
                            );
                        }
                        let id = scheduler.receive_quad(quad);
                        let _ = events.send(Event::QuadReceived(id));
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        fire_timers(
            &mut scheduler,
            &mut slot_limiter,
            &mut rate_limiter,
            &mut quad_assembler,
            &services,
            &events,
        );
    }
    scheduler.persist_tiles();
    event!(Level::INFO, "tile pipeline stopped");
}

fn next_timeout(scheduler: &Scheduler, rate_limiter: &RateLimiter) -> Duration {
    let mut timeout = scheduler
        .next_deadline()
        .map(|deadline| deadline.saturating_duration_since(Instant::now()));
    if let Some(deadline_ms) = rate_limiter.next_deadline_ms() {
        let wait = Duration::from_millis(deadline_ms.saturating_sub(time_since_epoch()));
        timeout = Some(timeout.map_or(wait, |t| t.min(wait)));
    }
    timeout.unwrap_or(IDLE_TICK)
}

fn handle_command(
    command: Command,
    scheduler: &mut Scheduler,
    slot_limiter: &mut SlotLimiter,
    rate_limiter: &mut RateLimiter,
) {
    match command {
        Command::UpdateCamera(camera) => scheduler.update_camera(camera),
        Command::SetEnabled(enabled) => scheduler.set_enabled(enabled),
        Command::SetNetworkReachability(reachable) => {
            scheduler.set_network_reachability(reachable)
        }
        Command::SetGpuQuadLimit(limit) => scheduler.set_gpu_quad_limit(limit),
        Command::SetRamQuadLimit(limit) => scheduler.set_ram_quad_limit(limit),
        Command::SetSlotLimit(limit) => slot_limiter.set_limit(limit),
        Command::SetRateLimit(rate, period_ms) => rate_limiter.set_limit(rate, period_ms),
        Command::SetUpdateTimeout(timeout_ms) => scheduler.set_update_timeout(timeout_ms),
        Command::SetPurgeTimeout(timeout_ms) => scheduler.set_purge_timeout(timeout_ms),
        Command::SetRetirementAge(age_ms) => scheduler.set_retirement_age(age_ms),
        Command::SetPermissibleScreenSpaceError(error_px) => {
            scheduler.set_permissible_screen_space_error(error_px)
        }
        Command::PersistTiles => scheduler.persist_tiles(),
        // handled by the pipeline loop before dispatching here
        Command::Shutdown => {}
    }
}

fn fire_timers(
    scheduler: &mut Scheduler,
    slot_limiter: &mut SlotLimiter,
    rate_limiter: &mut RateLimiter,
    quad_assembler: &mut QuadAssembler,
    services: &Services,
    events: &Sender<Event>,
) {
    let now_ms = time_since_epoch();
    if rate_limiter.next_deadline_ms().is_some_and(|d| d <= now_ms) {
        for id in rate_limiter.process_queue(now_ms) {
            load_quad(id, quad_assembler, services);
        }
    }

    let (requests, delta) = scheduler.process_timers(Instant::now());
    if let Some(ids) = requests {
        let stats = scheduler.stats();
        event!(
            Level::DEBUG,
            "requesting {} quads ({} in ram, {} on gpu)",
            ids.len(),
            stats.n_ram_quads,
            stats.n_gpu_quads
        );
        for id in slot_limiter.request_quads(&ids) {
            dispatch_quad_request(id, rate_limiter, quad_assembler, services);
        }
    }
    if let Some(delta) = delta {
        let _ = events.send(Event::GpuQuadsUpdated {
            added: delta.added,
            removed: delta.removed,
        });
    }
}

fn dispatch_quad_request(
    id: TileId,
    rate_limiter: &mut RateLimiter,
    quad_assembler: &mut QuadAssembler,
    services: &Services,
) {
    if let Some(id) = rate_limiter.request_quad(id, time_since_epoch()) {
        load_quad(id, quad_assembler, services);
    }
}

fn load_quad(id: TileId, quad_assembler: &mut QuadAssembler, services: &Services) {
    for child in quad_assembler.load(id) {
        services.load(child);
    }
}
