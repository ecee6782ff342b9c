use std::f32::consts::PI;

use approx::assert_relative_eq;
use rand::Rng;
use tennis_rig::{
    ball::{compute_magnus_force, FlightState},
    config::BallConstants,
    engine::{BodyDesc, BodyHandle, BodyShape, JointHandle, Material, RayHit},
    error::TennisError,
    math::{rpm_to_rad_per_sec, Quaternion, Ray, Vector3},
    player::{BodyRig, BodySlot, JointId, MotorCommand, RigBlueprint},
    sandbox::{SandboxConfig, SandboxWorld},
    InputFrame, MatchPhase, PhaseStore, PhysicsEngine, SwingIntent, TennisConfig, TennisCore,
};

const TICK: f32 = 1.0 / 60.0;

fn setup() -> (SandboxWorld, PhaseStore, TennisCore) {
    let mut world = SandboxWorld::new();
    let mut phases = PhaseStore::new();
    let core = TennisCore::init(&mut world, TennisConfig::default(), &mut phases).unwrap();
    (world, phases, core)
}

fn tick(world: &mut SandboxWorld, phases: &mut PhaseStore, core: &mut TennisCore, input: InputFrame) {
    core.physics_step(world, phases, input, TICK).unwrap();
    world.step(TICK);
    core.render_frame(&*world, TICK).unwrap();
}

fn serve_input() -> InputFrame {
    InputFrame::new(SwingIntent::empty(), SwingIntent::SERVE)
}

fn random_vector(rng: &mut impl Rng) -> Vector3 {
    Vector3::new(
        rng.gen_range(-50.0..50.0),
        rng.gen_range(-50.0..50.0),
        rng.gen_range(-50.0..50.0),
    )
}

#[test]
fn test_magnus_force_is_scaled_cross_product() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let spin = random_vector(&mut rng);
        let velocity = random_vector(&mut rng);
        let coefficient = rng.gen_range(0.0..1.0e-3);

        let force = compute_magnus_force(spin, velocity, coefficient);
        assert_relative_eq!(force, spin.cross(&velocity) * coefficient, max_relative = 1.0e-5);
        assert_relative_eq!(force, -compute_magnus_force(spin, -velocity, coefficient), epsilon = 1.0e-6);

        assert!(compute_magnus_force(Vector3::zero(), velocity, coefficient).is_zero());
        assert!(compute_magnus_force(spin, Vector3::zero(), coefficient).is_zero());
    }
}

#[test]
fn test_serve_applies_when_ball_is_close_to_the_ground() {
    let (mut world, mut phases, mut core) = setup();
    // Probe starts 0.03 below the centre, so this is a time of impact of 0.10.
    world.set_translation(core.ball(), Vector3::new(0.0, 0.13, -13.0)).unwrap();

    core.physics_step(&mut world, &mut phases, serve_input(), TICK).unwrap();
    assert!(!world.linear_velocity(core.ball()).unwrap().is_zero());
    assert!(!world.angular_velocity(core.ball()).unwrap().is_zero());
}

#[test]
fn test_serve_is_ignored_when_ball_is_airborne() {
    let (mut world, mut phases, mut core) = setup();
    // Time of impact of 0.20.
    world.set_translation(core.ball(), Vector3::new(0.0, 0.23, -13.0)).unwrap();

    core.physics_step(&mut world, &mut phases, serve_input(), TICK).unwrap();
    assert_eq!(world.linear_velocity(core.ball()).unwrap(), Vector3::zero());
    assert_eq!(world.angular_velocity(core.ball()).unwrap(), Vector3::zero());
}

#[test]
fn test_serve_velocity_matches_configured_speed() {
    let (mut world, mut phases, mut core) = setup();
    world.set_translation(core.ball(), Vector3::new(0.0, 0.1, -13.0)).unwrap();

    core.physics_step(&mut world, &mut phases, serve_input(), TICK).unwrap();

    let config = TennisConfig::default();
    let constants = BallConstants::from_config(&config);
    let impulse = BallConstants::serve_velocity_ms(&config) * (constants.mass * constants.contact_duration);
    let expected = impulse / constants.mass;
    assert_relative_eq!(world.linear_velocity(core.ball()).unwrap(), expected, max_relative = 1.0e-4);
    assert_relative_eq!(expected, Vector3::new(-0.89408, 8.04672, 22.352), max_relative = 1.0e-4);

    let spin = world.angular_velocity(core.ball()).unwrap();
    assert_relative_eq!(spin.length(), rpm_to_rad_per_sec(1800.0), max_relative = 1.0e-4);
    assert_relative_eq!(spin.y, 0.0);
}

#[test]
fn test_magnus_force_is_replaced_every_step() {
    let (mut world, mut phases, mut core) = setup();
    world.set_translation(core.ball(), Vector3::new(0.0, 0.1, -13.0)).unwrap();
    tick(&mut world, &mut phases, &mut core, serve_input());

    let coefficient = BallConstants::from_config(core.config()).magnus_coefficient;
    for _ in 0..5 {
        tick(&mut world, &mut phases, &mut core, InputFrame::default());
        // Forces are only integrated by the engine step, so the velocities
        // read back now are the ones the force was computed from.
        core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
        let expected = compute_magnus_force(
            world.angular_velocity(core.ball()).unwrap(),
            world.linear_velocity(core.ball()).unwrap(),
            coefficient,
        );
        assert!(!expected.is_zero());
        assert_eq!(world.accumulated_force(core.ball()).unwrap(), expected);
        world.step(TICK);
    }
}

#[test]
fn test_ready_rehomes_ball_exactly() {
    let (mut world, mut phases, mut core) = setup();
    for _ in 0..30 {
        tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::FORWARD));
    }
    assert_ne!(world.translation(core.ball()).unwrap(), Vector3::new(0.0, 2.0, -13.0));

    assert!(phases.restart());
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();

    let ball = core.ball();
    assert_eq!(world.translation(ball).unwrap(), Vector3::new(0.0, 2.0, -13.0));
    assert_eq!(world.linear_velocity(ball).unwrap(), Vector3::zero());
    assert_eq!(world.angular_velocity(ball).unwrap(), Vector3::zero());
    assert_eq!(world.accumulated_force(ball).unwrap(), Vector3::zero());

    let root = core.rig().root();
    assert_eq!(world.translation(root).unwrap(), Vector3::new(0.0, 1.0, 13.0));
    assert_eq!(world.linear_velocity(root).unwrap(), Vector3::zero());
}

#[test]
fn test_followers_track_root_every_tick() {
    let (mut world, mut phases, mut core) = setup();
    let inputs = [
        SwingIntent::FORWARD,
        SwingIntent::FORWARD | SwingIntent::RIGHT,
        SwingIntent::BACKWARD | SwingIntent::CHOP,
        SwingIntent::LEFT | SwingIntent::FOREHAND,
    ];

    for held in inputs.iter().cycle().take(40) {
        core.physics_step(&mut world, &mut phases, InputFrame::holding(*held), TICK).unwrap();

        let root = world.translation(core.rig().root()).unwrap();
        let hip = world.kinematic_target(core.rig().body(BodySlot::Hip)).unwrap();
        let head = world.kinematic_target(core.rig().body(BodySlot::Head)).unwrap();
        assert_eq!(hip, Some(root + Vector3::new(0.0, 0.6, 0.0)));
        assert_eq!(head, Some(root + Vector3::new(0.0, 1.3, 0.0)));

        world.step(TICK);
    }
}

#[test]
fn test_neutral_intent_recentres_every_motor() {
    let (mut world, mut phases, mut core) = setup();
    for _ in 0..10 {
        tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::FOREHAND));
    }
    let torso = core.rig().motor(JointId::Torso).unwrap();
    assert_relative_eq!(torso.target_magnitude(), PI / 4.0);

    let mut last = f32::INFINITY;
    for _ in 0..30 {
        tick(&mut world, &mut phases, &mut core, InputFrame::default());
        let largest = JointId::ALL
            .iter()
            .map(|id| core.rig().motor(*id).unwrap().target_magnitude())
            .fold(0.0f32, f32::max);
        assert_eq!(largest, 0.0);
        assert!(largest <= last);
        last = largest;
    }
}

#[test]
fn test_player_past_far_boundary_ends_rally() {
    let (mut world, mut phases, mut core) = setup();
    tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::FORWARD));
    assert_eq!(phases.phase(), MatchPhase::Playing);

    world.set_translation(core.rig().root(), Vector3::new(0.0, 1.0, -45.0)).unwrap();
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
    assert_eq!(phases.phase(), MatchPhase::Ended);

    // Input does not restart an ended rally.
    core.physics_step(&mut world, &mut phases, InputFrame::holding(SwingIntent::FORWARD), TICK).unwrap();
    assert_eq!(phases.phase(), MatchPhase::Ended);
}

#[test]
fn test_player_falling_through_restarts() {
    let (mut world, mut phases, mut core) = setup();
    tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::LEFT));

    world.set_translation(core.rig().root(), Vector3::new(3.0, -3.0, 10.0)).unwrap();
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
    assert_eq!(phases.phase(), MatchPhase::Ready);

    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
    assert_eq!(world.translation(core.rig().root()).unwrap(), Vector3::new(0.0, 1.0, 13.0));
}

#[test]
fn test_ball_out_of_bounds_restarts() {
    let (mut world, mut phases, mut core) = setup();
    tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::RIGHT));

    world.set_translation(core.ball(), Vector3::new(0.0, -2.0, 5.0)).unwrap();
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
    assert_eq!(phases.phase(), MatchPhase::Ready);
}

#[test]
fn test_camera_eases_towards_root() {
    let (mut world, mut phases, mut core) = setup();
    let start = core.camera().position;
    assert_eq!(start, Vector3::new(10.0, 10.0, 10.0));

    for _ in 0..240 {
        tick(&mut world, &mut phases, &mut core, InputFrame::default());
    }
    let root = world.translation(core.rig().root()).unwrap();
    let pose = core.camera();
    assert_relative_eq!(pose.position, root + Vector3::new(0.0, 1.75, 4.25), epsilon = 1.0e-2);
    assert_relative_eq!(pose.look_at, root + Vector3::new(0.0, 0.5, -13.0), epsilon = 1.0e-2);
}

#[test]
fn test_shutdown_releases_everything() {
    let (mut world, mut phases, mut core) = setup();
    assert_eq!(world.body_count(), 1 + BodySlot::COUNT);
    assert_eq!(world.joint_count(), JointId::COUNT);
    assert_eq!(phases.subscriber_count(), 2);

    tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::BACKHAND));
    core.shutdown(&mut world, &mut phases).unwrap();

    assert_eq!(world.body_count(), 0);
    assert_eq!(world.joint_count(), 0);
    assert_eq!(phases.subscriber_count(), 0);
}

#[test]
fn test_invalid_config_is_rejected_before_creating_bodies() {
    let mut world = SandboxWorld::new();
    let mut phases = PhaseStore::new();
    let mut config = TennisConfig::default();
    config.ball.diameter = -1.0;

    let result = TennisCore::init(&mut world, config, &mut phases);
    assert!(matches!(result, Err(TennisError::InvalidParameter(_))));
    assert_eq!(world.body_count(), 0);
    assert_eq!(phases.subscriber_count(), 0);
}

#[test]
fn test_malformed_rig_is_rejected_before_creating_bodies() {
    let mut world = SandboxWorld::new();
    let mut blueprint = RigBlueprint::humanoid(&TennisConfig::default());
    blueprint.joints[0].axis = Vector3::zero();

    let result = BodyRig::build(&mut world, &blueprint);
    assert!(matches!(result, Err(TennisError::ZeroJointAxis(JointId::Torso))));
    assert_eq!(world.body_count(), 0);
}

#[test]
fn test_motor_drives_joint_to_target() {
    let mut world = SandboxWorld::with_config(SandboxConfig::weightless()).unwrap();
    let base = world
        .create_rigid_body(&BodyDesc::kinematic(BodyShape::cuboid(0.5, 0.1, 0.5)))
        .unwrap();
    let wheel = world
        .create_rigid_body(&BodyDesc::dynamic(BodyShape::Ball { radius: 0.2 }).with_material(Material::limb(500.0)))
        .unwrap();
    let joint = world
        .attach_joint(base, wheel, Vector3::zero(), Vector3::zero(), Vector3::unit_y())
        .unwrap();
    world.configure_motor_position(joint, 0.5, 250.0, 10.0).unwrap();

    let mut error = 0.5f32;
    for _ in 0..120 {
        world.step(TICK);
        let next = (0.5 - world.joint_angle(joint).unwrap()).abs();
        assert!(next <= error + 1.0e-6);
        error = next;
    }
    assert!(error < 1.0e-2);

    // Spin stays on the hinge axis.
    let spin = world.angular_velocity(wheel).unwrap();
    assert_relative_eq!(spin.x, 0.0, epsilon = 1.0e-5);
    assert_relative_eq!(spin.z, 0.0, epsilon = 1.0e-5);
}

/// Engine calls the ordering test cares about
#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    Impulse(BodyHandle),
    TorqueImpulse(BodyHandle),
    KinematicTarget(BodyHandle),
}

/// Sandbox wrapper that records calls and can refuse joints or removals
#[derive(Default)]
struct RecordingEngine {
    inner: SandboxWorld,
    calls: Vec<Call>,
    refuse_joints: bool,
    /// Number of upcoming body removals to refuse
    refuse_removals: usize,
}

impl PhysicsEngine for RecordingEngine {
    fn create_rigid_body(&mut self, desc: &BodyDesc) -> tennis_rig::Result<BodyHandle> {
        self.inner.create_rigid_body(desc)
    }

    fn remove_rigid_body(&mut self, body: BodyHandle) -> tennis_rig::Result<()> {
        if self.refuse_removals > 0 {
            self.refuse_removals -= 1;
            return Err(TennisError::InvalidParameter(format!("removal of {:?} refused", body)));
        }
        self.inner.remove_rigid_body(body)
    }

    fn attach_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vector3,
        anchor_b: Vector3,
        axis: Vector3,
    ) -> tennis_rig::Result<JointHandle> {
        if self.refuse_joints {
            return Err(TennisError::InvalidParameter("joints disabled".to_string()));
        }
        self.inner.attach_joint(body_a, body_b, anchor_a, anchor_b, axis)
    }

    fn remove_joint(&mut self, joint: JointHandle) -> tennis_rig::Result<()> {
        self.inner.remove_joint(joint)
    }

    fn configure_motor_position(
        &mut self,
        joint: JointHandle,
        target: f32,
        stiffness: f32,
        damping: f32,
    ) -> tennis_rig::Result<()> {
        self.inner.configure_motor_position(joint, target, stiffness, damping)
    }

    fn configure_motor_velocity(&mut self, joint: JointHandle, target_velocity: f32, damping: f32) -> tennis_rig::Result<()> {
        self.inner.configure_motor_velocity(joint, target_velocity, damping)
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vector3) -> tennis_rig::Result<()> {
        self.calls.push(Call::Impulse(body));
        self.inner.apply_impulse(body, impulse)
    }

    fn apply_impulse_at_point(&mut self, body: BodyHandle, impulse: Vector3, point: Vector3) -> tennis_rig::Result<()> {
        self.calls.push(Call::Impulse(body));
        self.inner.apply_impulse_at_point(body, impulse, point)
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, torque_impulse: Vector3) -> tennis_rig::Result<()> {
        self.calls.push(Call::TorqueImpulse(body));
        self.inner.apply_torque_impulse(body, torque_impulse)
    }

    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.inner.cast_ray(ray, max_distance)
    }

    fn translation(&self, body: BodyHandle) -> tennis_rig::Result<Vector3> {
        self.inner.translation(body)
    }

    fn linear_velocity(&self, body: BodyHandle) -> tennis_rig::Result<Vector3> {
        self.inner.linear_velocity(body)
    }

    fn angular_velocity(&self, body: BodyHandle) -> tennis_rig::Result<Vector3> {
        self.inner.angular_velocity(body)
    }

    fn rotation(&self, body: BodyHandle) -> tennis_rig::Result<Quaternion> {
        self.inner.rotation(body)
    }

    fn set_translation(&mut self, body: BodyHandle, translation: Vector3) -> tennis_rig::Result<()> {
        self.inner.set_translation(body, translation)
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quaternion) -> tennis_rig::Result<()> {
        self.inner.set_rotation(body, rotation)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> tennis_rig::Result<()> {
        self.inner.set_linear_velocity(body, velocity)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vector3) -> tennis_rig::Result<()> {
        self.inner.set_angular_velocity(body, velocity)
    }

    fn set_next_kinematic_translation(&mut self, body: BodyHandle, translation: Vector3) -> tennis_rig::Result<()> {
        self.calls.push(Call::KinematicTarget(body));
        self.inner.set_next_kinematic_translation(body, translation)
    }

    fn reset_forces(&mut self, body: BodyHandle) -> tennis_rig::Result<()> {
        self.inner.reset_forces(body)
    }

    fn add_force(&mut self, body: BodyHandle, force: Vector3) -> tennis_rig::Result<()> {
        self.inner.add_force(body, force)
    }

    fn wake_up(&mut self, body: BodyHandle) -> tennis_rig::Result<()> {
        self.inner.wake_up(body)
    }
}

#[test]
fn test_followers_sync_after_root_impulses() {
    let mut engine = RecordingEngine::default();
    let mut phases = PhaseStore::new();
    let mut core = TennisCore::init(&mut engine, TennisConfig::default(), &mut phases).unwrap();
    let root = core.rig().root();

    engine.calls.clear();
    let held = SwingIntent::FORWARD | SwingIntent::RIGHT;
    core.physics_step(&mut engine, &mut phases, InputFrame::holding(held), TICK).unwrap();

    let last_root_impulse = engine
        .calls
        .iter()
        .rposition(|call| matches!(call, Call::Impulse(b) | Call::TorqueImpulse(b) if *b == root))
        .unwrap();
    let first_follower = engine
        .calls
        .iter()
        .position(|call| matches!(call, Call::KinematicTarget(_)))
        .unwrap();
    assert!(last_root_impulse < first_follower);
}

#[test]
fn test_failed_init_leaves_nothing_behind() {
    let mut engine = RecordingEngine {
        refuse_joints: true,
        ..RecordingEngine::default()
    };
    let mut phases = PhaseStore::new();

    let result = TennisCore::init(&mut engine, TennisConfig::default(), &mut phases);
    assert!(result.is_err());
    assert_eq!(engine.inner.body_count(), 0);
    assert_eq!(phases.subscriber_count(), 0);
}

#[test]
fn test_failed_rollback_still_removes_the_rest() {
    let mut engine = RecordingEngine {
        refuse_joints: true,
        refuse_removals: 1,
        ..RecordingEngine::default()
    };
    let mut phases = PhaseStore::new();

    let result = TennisCore::init(&mut engine, TennisConfig::default(), &mut phases);
    assert!(matches!(result, Err(TennisError::InvalidParameter(_))));
    // Only the refused body survives.
    assert_eq!(engine.inner.body_count(), 1);
    assert_eq!(engine.refuse_removals, 0);
}

#[test]
fn test_release_attempts_every_removal() {
    let mut engine = RecordingEngine::default();
    let mut phases = PhaseStore::new();
    let core = TennisCore::init(&mut engine, TennisConfig::default(), &mut phases).unwrap();
    assert_eq!(engine.inner.body_count(), 1 + BodySlot::COUNT);

    engine.refuse_removals = 1;
    let result = core.shutdown(&mut engine, &mut phases);
    assert!(result.is_err());
    assert_eq!(engine.inner.joint_count(), 0);
    assert_eq!(engine.inner.body_count(), 1);
    assert_eq!(phases.subscriber_count(), 0);
}

#[test]
fn test_restart_after_far_boundary_rehomes_whole_rig() {
    let (mut world, mut phases, mut core) = setup();
    for _ in 0..20 {
        tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::FORWARD | SwingIntent::FOREHAND));
    }
    world.set_translation(core.rig().root(), Vector3::new(0.0, 1.0, -45.0)).unwrap();
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
    assert_eq!(phases.phase(), MatchPhase::Ended);

    // Leave the upper body far from the legs, spinning and twisted.
    let twisted = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 1.2);
    for slot in [BodySlot::Torso, BodySlot::ShoulderRB, BodySlot::ArmR, BodySlot::ArmL] {
        let body = core.rig().body(slot);
        world.set_translation(body, Vector3::new(4.0, 3.0, -30.0)).unwrap();
        world.set_rotation(body, twisted).unwrap();
        world.set_linear_velocity(body, Vector3::new(20.0, -5.0, 40.0)).unwrap();
        world.set_angular_velocity(body, Vector3::new(0.0, 30.0, 10.0)).unwrap();
    }

    assert!(phases.restart());
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();

    let home = Vector3::new(0.0, 1.0, 13.0);
    for slot in BodySlot::ALL {
        let body = core.rig().body(slot);
        assert_eq!(world.translation(body).unwrap(), home + core.rig().placement(slot), "{}", slot);
        assert_eq!(world.rotation(body).unwrap(), Quaternion::identity(), "{}", slot);
    }

    world.step(TICK);
    for slot in BodySlot::ALL {
        let body = core.rig().body(slot);
        let expected = home + core.rig().placement(slot);
        assert!(world.translation(body).unwrap().distance(&expected) < 0.05, "{} drifted", slot);
        assert!(world.linear_velocity(body).unwrap().length() < 0.5, "{} still moving", slot);
        assert!(world.angular_velocity(body).unwrap().length() < 0.5, "{} still spinning", slot);
    }
}

#[test]
fn test_velocity_motor_spins_torso_against_hip() {
    let mut world = SandboxWorld::with_config(SandboxConfig::weightless()).unwrap();
    let mut rig = BodyRig::build(&mut world, &RigBlueprint::humanoid(&TennisConfig::default())).unwrap();

    rig.set_motor_velocity(&mut world, JointId::Torso, 2.0, 10.0).unwrap();
    assert_eq!(
        rig.motor(JointId::Torso),
        Some(MotorCommand::Velocity {
            target_velocity: 2.0,
            damping: 10.0,
        })
    );

    for _ in 0..30 {
        world.step(TICK);
    }
    let hinge = rig.joint(JointId::Torso);
    assert_relative_eq!(world.joint_velocity(hinge).unwrap(), 2.0, epsilon = 0.1);
    assert!(world.joint_angle(hinge).unwrap().abs() > 0.5);
}

#[test]
fn test_undamped_velocity_motor_is_unset() {
    let mut world = SandboxWorld::with_config(SandboxConfig::weightless()).unwrap();
    let mut rig = BodyRig::build(&mut world, &RigBlueprint::humanoid(&TennisConfig::default())).unwrap();

    rig.set_motor_velocity(&mut world, JointId::Torso, 2.0, 0.0).unwrap();
    assert_eq!(
        rig.motor(JointId::Torso),
        Some(MotorCommand::Velocity {
            target_velocity: 2.0,
            damping: 0.0,
        })
    );

    for _ in 0..30 {
        world.step(TICK);
    }
    let hinge = rig.joint(JointId::Torso);
    assert_relative_eq!(world.joint_velocity(hinge).unwrap(), 0.0, epsilon = 1.0e-4);
    assert_relative_eq!(world.joint_angle(hinge).unwrap(), 0.0, epsilon = 1.0e-4);
}

#[test]
fn test_non_finite_motor_command_is_rejected() {
    let mut world = SandboxWorld::new();
    let mut rig = BodyRig::build(&mut world, &RigBlueprint::humanoid(&TennisConfig::default())).unwrap();

    let result = rig.set_motor_velocity(&mut world, JointId::Torso, f32::NAN, 10.0);
    assert!(matches!(result, Err(TennisError::InvalidParameter(_))));
    assert_eq!(rig.motor(JointId::Torso), None);
}

#[test]
fn test_ball_stays_idle_until_first_input() {
    let (mut world, mut phases, mut core) = setup();
    let ball = core.ball();

    for _ in 0..5 {
        tick(&mut world, &mut phases, &mut core, InputFrame::default());
        assert_eq!(core.ball_state(), FlightState::Idle);
        assert_eq!(world.accumulated_force(ball).unwrap(), Vector3::zero());
    }
    assert_eq!(phases.phase(), MatchPhase::Ready);

    tick(&mut world, &mut phases, &mut core, InputFrame::holding(SwingIntent::LEFT));
    assert_eq!(phases.phase(), MatchPhase::Playing);
    assert_eq!(core.ball_state(), FlightState::InFlight);

    assert!(phases.restart());
    core.physics_step(&mut world, &mut phases, InputFrame::default(), TICK).unwrap();
    assert_eq!(core.ball_state(), FlightState::Idle);
    assert_eq!(world.accumulated_force(ball).unwrap(), Vector3::zero());
}
