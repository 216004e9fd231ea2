//! Platformer component types.
//!
//! Every component is a plain `Copy` value so that its store stays a flat
//! array. Entity references inside components are [`Entity`] handles and may
//! go stale; readers check them against the world before following them.

use ledge_ecs::entity::Entity;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// Minimal 2D vector used by component fields and event payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    /// Ground normal of flat floor in screen space (y grows downward).
    pub const UP: Vec2 = Vec2 { x: 0.0, y: -1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// World-space position in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Velocity in pixels per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColliderKind {
    #[default]
    Aabb,
    Capsule,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Collider {
    /// Half-extents of the bounding box.
    pub half_extents: Vec2,
    pub kind: ColliderKind,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MovementState {
    #[default]
    Ground,
    Airborne,
    Crouching,
    Cartwheeling,
    Gliding,
    Swimming,
}

/// Input-driven movement state; tuning lives in the movement systems.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerController {
    pub state: MovementState,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub can_glide: bool,
    pub in_cartwheel_air: bool,
    pub has_used_cartwheel_jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundState {
    pub is_grounded: bool,
    pub normal: Vec2,
    /// Degrees from horizontal.
    pub angle: f32,
    pub on_slope: bool,
    pub can_slide: bool,
}

impl Default for GroundState {
    fn default() -> Self {
        Self {
            is_grounded: false,
            normal: Vec2::UP,
            angle: 0.0,
            on_slope: false,
            can_slide: false,
        }
    }
}

/// Link between the two team-up partners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamUp {
    pub partner: Entity,
    pub is_carrying: bool,
    pub is_carried: bool,
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Depth-sorting group for the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderLayer {
    Background,
    #[default]
    Mid,
    Foreground,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub mesh_id: u32,
    pub z: f32,
    pub layer: RenderLayer,
    /// 0 = fixed to the camera, 1 = moves with the gameplay plane.
    pub parallax: f32,
}

impl Default for Renderable {
    fn default() -> Self {
        Self {
            mesh_id: 0,
            z: 0.0,
            layer: RenderLayer::Mid,
            parallax: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Animation {
    pub model_id: u32,
    pub state: AnimationState,
}

/// Playback cursor of an [`Animation`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub clip: u32,
    /// Seconds into the clip.
    pub time: f32,
    pub looping: bool,
}

// ---------------------------------------------------------------------------
// Level objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovingPlatform {
    pub start: Vec2,
    pub end: Vec2,
    pub speed: f32,
    /// Interpolation parameter between `start` and `end`.
    pub t: f32,
    pub ping_pong: bool,
    /// Conveyor belts move riders' feet, not the platform.
    pub conveyor: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlatformRider {
    pub platform: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterVolume {
    pub position: Vec2,
    pub size: Vec2,
    pub buoyancy: f32,
    pub drag: f32,
}

impl Default for WaterVolume {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            buoyancy: 1.0,
            drag: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Swimming {
    pub in_water: bool,
    pub water: Entity,
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnemyKind {
    #[default]
    Basic,
    Flying,
    Ground,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnemyState {
    #[default]
    Idle,
    Patrolling,
    Dead,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: i32,
    pub state: EnemyState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    /// Full health.
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub const fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Subtract `amount`, clamping at zero. Returns the damage actually taken.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let taken = amount.clamp(0, self.current.max(0));
        self.current -= taken;
        taken
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Invulnerability {
    /// Seconds left.
    pub remaining: f32,
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub current_xp: i32,
    /// Lifetime total.
    pub total_collected: i32,
    pub next_reward_threshold: i32,
    pub reward_interval: i32,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            current_xp: 0,
            total_collected: 0,
            next_reward_threshold: 100,
            reward_interval: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XpCollectible {
    pub value: i32,
    pub collected: bool,
}

/// XP dropped where the player took a hit; can be picked back up until it
/// expires.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XpDrop {
    pub value: i32,
    pub collected: bool,
    /// Seconds since the drop spawned.
    pub lifetime: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagKind {
    #[default]
    Start,
    Middle,
    End,
}

/// Checkpoint flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag {
    /// Unique within a stage.
    pub id: u32,
    pub kind: FlagKind,
    pub consumable: bool,
    pub consumed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowMode {
    #[default]
    Fast,
    Slow,
}

/// Stage-local flow meter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Flow {
    /// Normalized 0..=1.
    pub flow: f32,
    /// Seconds since the last gain.
    pub decay_timer: f32,
    pub last_progress_time: f32,
    pub combo: u16,
    pub mode: FlowMode,
}

impl Flow {
    /// Add `delta` and clamp to `0..=1`.
    pub fn apply(&mut self, delta: f32) {
        self.flow = (self.flow + delta).clamp(0.0, 1.0);
        if delta > 0.0 {
            self.decay_timer = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
