use std::path::Path;
use std::time::Duration;

use nidhogg::types::{Joint, STIFFNESS_LIMP};
use nidhogg::{JointValues, SensorValues};

use sleipnir::generator::{BodyGenerator, Generator};
use sleipnir::prelude::*;
use sleipnir::ActionDispatcher;
use sleipnir::walk::WalkOption;

struct Robot {
    dispatcher: ActionDispatcher,
    odometry: Odometry,
    body_model: BodyModel,
    sensors: SensorValues,
    now: Duration,
}

impl Robot {
    fn new() -> Self {
        let base_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let robot = RobotInfo::new("test");
        let config = MotionConfig::load_for_robot(&base_dir.join("config"), base_dir, &robot)
            .expect("shipped config should load");

        Self {
            dispatcher: ActionDispatcher::new(&config, &robot).expect("pose files should load"),
            odometry: Odometry::default(),
            body_model: BodyModel::default(),
            sensors: SensorValues::default(),
            now: Duration::ZERO,
        }
    }

    fn tick_with_head(
        &mut self,
        body: BodyRequest,
        head: HeadRequest,
    ) -> (ActionRequest, JointValues) {
        let mut request = ActionRequest { body, head };
        let input = MotionInput {
            sensors: &self.sensors,
            ball: BallPosition::default(),
            now: self.now,
        };

        self.odometry.begin_cycle();
        let joints = self.dispatcher.make_joints(
            &mut request,
            &mut self.odometry,
            &mut self.body_model,
            &input,
        );

        self.sensors.joints = joints;
        self.now += CYCLE_TIME;
        (request, joints)
    }

    fn tick(&mut self, body: BodyRequest) -> (ActionRequest, JointValues) {
        self.tick_with_head(body, HeadRequest::default())
    }

    fn run(&mut self, body: &BodyRequest, ticks: usize) {
        for _ in 0..ticks {
            self.tick(body.clone());
        }
    }

    fn is_active(&self, action: ActionType) -> bool {
        self.dispatcher.generator(action).is_active()
    }

    fn walk_option(&self) -> WalkOption {
        match self.dispatcher.generator(ActionType::Walk) {
            BodyGenerator::Walk(walk) => walk.engine().option(),
            other => panic!("walk slot holds {}", other.name()),
        }
    }

    fn is_kicking(&self) -> bool {
        match self.dispatcher.generator(ActionType::Kick) {
            BodyGenerator::Walk(walk) => walk.engine().is_kicking(),
            other => panic!("kick slot holds {}", other.name()),
        }
    }
}

fn stand() -> BodyRequest {
    BodyRequest::new(ActionType::Stand)
}

#[test]
fn stand_is_played_from_the_start() {
    let mut robot = Robot::new();

    let (request, _) = robot.tick(stand());
    assert_eq!(request.body.action_type, ActionType::Stand);
    assert_eq!(robot.dispatcher.current(), ActionType::Stand);
    assert!(robot.is_active(ActionType::Stand));

    robot.run(&stand(), 100);
    assert!(!robot.is_active(ActionType::Stand));
    let (_, joints) = robot.tick(stand());
    assert!((joints.angles[Joint::LeftKneePitch] - 50f32.to_radians()).abs() < 1e-3);
}

#[test]
fn walk_stops_before_standing() {
    let mut robot = Robot::new();
    robot.run(&stand(), 100);
    robot.run(&BodyRequest::walk(100.0, 0.0, 0.0), 300);
    assert_eq!(robot.dispatcher.current(), ActionType::Walk);
    assert!(robot.odometry.translation().x > 0.1);

    robot.tick(stand());
    assert!(robot.dispatcher.is_stopping());
    assert_eq!(robot.dispatcher.current(), ActionType::Walk);

    let ticks = (0..500)
        .take_while(|_| {
            robot.tick(stand());
            robot.dispatcher.current() != ActionType::Stand
        })
        .count();
    assert!(ticks < 500, "walk engine never stopped");
    assert!(!robot.dispatcher.is_stopping());
}

#[test]
fn kick_finishes_before_standing() {
    let mut robot = Robot::new();
    robot.run(&stand(), 100);

    let kick = BodyRequest::kick(Foot::Right, 1.0);
    let (request, _) = robot.tick(kick.clone());
    assert_eq!(request.body.action_type, ActionType::Kick);
    assert_eq!(robot.dispatcher.current(), ActionType::Kick);

    let ticks = (0..100)
        .take_while(|_| {
            robot.tick(kick.clone());
            !robot.is_kicking()
        })
        .count();
    assert!(ticks < 100, "kick never started");

    let mut kick_finished = false;
    for _ in 0..600 {
        let (request, _) = robot.tick(stand());
        if !kick_finished && !robot.is_kicking() {
            kick_finished = true;
            assert_eq!(request.body.action_type, ActionType::Walk);
            assert_eq!(robot.dispatcher.current(), ActionType::Walk);
        }
        if !kick_finished {
            assert_eq!(request.body.action_type, ActionType::Kick);
            assert_eq!(robot.dispatcher.current(), ActionType::Kick);
        }
        if robot.dispatcher.current() == ActionType::Stand {
            break;
        }
    }

    assert!(kick_finished);
    assert_eq!(robot.dispatcher.current(), ActionType::Stand);
}

#[test]
fn kick_from_walking_finishes_before_standing() {
    let mut robot = Robot::new();
    robot.run(&stand(), 100);
    robot.run(&BodyRequest::walk(100.0, 0.0, 0.0), 300);
    assert_eq!(robot.dispatcher.current(), ActionType::Walk);

    let kick = BodyRequest::kick(Foot::Left, 1.0);
    let ticks = (0..500)
        .take_while(|_| {
            robot.tick(kick.clone());
            !robot.is_kicking()
        })
        .count();
    assert!(ticks < 500, "kick never started");

    let mut kick_finished = false;
    for _ in 0..600 {
        let (request, _) = robot.tick(stand());
        if !kick_finished && !robot.is_kicking() {
            kick_finished = true;
            assert_eq!(request.body.action_type, ActionType::Walk);
            assert_eq!(robot.dispatcher.current(), ActionType::Walk);
        }
        if robot.dispatcher.current() == ActionType::Stand {
            break;
        }
    }

    assert!(kick_finished);
    assert_eq!(robot.dispatcher.current(), ActionType::Stand);
}

#[test]
fn dropped_kick_does_not_block_standing() {
    for (walking, held) in [(false, 1), (false, 5), (true, 1), (true, 3)] {
        let mut robot = Robot::new();
        robot.run(&stand(), 100);
        if walking {
            robot.run(&BodyRequest::walk(100.0, 0.0, 0.0), 300);
        }
        robot.run(&BodyRequest::kick(Foot::Right, 1.0), held);

        let ticks = (0..1000)
            .take_while(|_| {
                robot.tick(stand());
                robot.dispatcher.current() != ActionType::Stand
            })
            .count();
        assert!(
            ticks < 1000,
            "stuck in {} after a {held} tick kick, walking: {walking}",
            robot.dispatcher.current()
        );
        assert!(!robot.is_active(ActionType::Walk));
        assert!(!robot.is_kicking());
    }
}

#[test]
fn maneuvers_share_the_walk_engine() {
    let mut robot = Robot::new();
    robot.run(&BodyRequest::walk(80.0, 0.0, 0.0), 200);
    assert!(matches!(robot.walk_option(), WalkOption::Walk | WalkOption::Step));

    let dribble = BodyRequest {
        forward: 80.0,
        ..BodyRequest::new(ActionType::Dribble)
    };
    robot.tick(dribble.clone());
    assert_eq!(robot.dispatcher.current(), ActionType::Walk);
    assert!(!robot.dispatcher.is_stopping());
    assert!(matches!(robot.walk_option(), WalkOption::Walk | WalkOption::Step));

    robot.run(&dribble, 50);
    assert!(!robot.dispatcher.is_stopping());
}

#[test]
fn getup_plays_every_frame_once() {
    let mut robot = Robot::new();
    robot.tick(BodyRequest::new(ActionType::Dead));

    let getup = BodyRequest::new(ActionType::GetupFront);
    let (request, _) = robot.tick(getup.clone());
    assert_eq!(request.body.action_type, ActionType::GetupFront);
    assert_eq!(robot.dispatcher.current(), ActionType::GetupFront);

    let mut ticks = 1;
    let mut joints = JointValues::default();
    while robot.is_active(ActionType::GetupFront) && ticks < 1000 {
        joints = robot.tick(getup.clone()).1;
        ticks += 1;
    }

    // 400 ms lead-in, then 2.4 s of motion
    assert!((280..=282).contains(&ticks), "getup took {ticks} ticks");
    assert!((joints.angles[Joint::LeftKneePitch] - 50f32.to_radians()).abs() < 1e-3);
}

#[test]
fn getup_is_not_interrupted_by_lower_priorities() {
    let mut robot = Robot::new();
    robot.tick(BodyRequest::new(ActionType::GetupBack));
    robot.run(&BodyRequest::new(ActionType::GetupBack), 10);

    let walk = BodyRequest::walk(100.0, 0.0, 0.0);
    robot.tick(walk.clone());
    assert_eq!(robot.dispatcher.current(), ActionType::GetupBack);
    assert!(robot.dispatcher.is_stopping());

    for _ in 0..100 {
        robot.tick(walk.clone());
        assert_eq!(robot.dispatcher.current(), ActionType::GetupBack);
    }

    robot.run(&walk, 300);
    assert_eq!(robot.dispatcher.current(), ActionType::Walk);
}

#[test]
fn higher_priority_preempts_at_once() {
    let mut robot = Robot::new();
    robot.run(&BodyRequest::walk(100.0, 0.0, 0.0), 200);

    let (request, _) = robot.tick(BodyRequest::new(ActionType::GoalieDiveLeft));
    assert_eq!(request.body.action_type, ActionType::GoalieDiveLeft);
    assert_eq!(robot.dispatcher.current(), ActionType::GoalieDiveLeft);
    assert_eq!(robot.dispatcher.requested_dive(), None);
    assert_eq!(robot.walk_option(), WalkOption::None);
}

#[test]
fn blocked_dive_is_remembered_until_it_starts() {
    let mut robot = Robot::new();
    robot.run(&BodyRequest::new(ActionType::GetupBack), 10);
    assert_eq!(robot.dispatcher.requested_dive(), None);

    let dive = BodyRequest::new(ActionType::GoalieDiveLeft);
    robot.tick(dive.clone());
    assert_eq!(robot.dispatcher.current(), ActionType::GetupBack);
    assert_eq!(
        robot.dispatcher.requested_dive(),
        Some(ActionType::GoalieDiveLeft)
    );

    // a second dive does not replace the first
    robot.tick(BodyRequest::new(ActionType::GoalieDiveRight));
    assert_eq!(
        robot.dispatcher.requested_dive(),
        Some(ActionType::GoalieDiveLeft)
    );

    let ticks = (0..500)
        .take_while(|_| {
            robot.tick(dive.clone());
            robot.dispatcher.current() != ActionType::GoalieDiveLeft
        })
        .count();
    assert!(ticks < 500, "dive never started");
    assert_eq!(robot.dispatcher.requested_dive(), None);

    robot.tick(BodyRequest::new(ActionType::DefenderCentre));
    assert_eq!(robot.dispatcher.current(), ActionType::GoalieDiveLeft);
    assert_eq!(robot.dispatcher.requested_dive(), None);
}

#[test]
fn getting_up_after_a_dive_turns_the_odometry() {
    let mut robot = Robot::new();
    robot.run(&BodyRequest::new(ActionType::GoalieDiveLeft), 100);
    assert!(robot.odometry.heading().abs() < 1e-6);

    robot.tick(BodyRequest::new(ActionType::GetupFront));
    assert!((robot.odometry.heading() - 80f32.to_radians()).abs() < 1e-4);

    robot.tick(BodyRequest::new(ActionType::GetupFront));
    assert!((robot.odometry.heading() - 80f32.to_radians()).abs() < 1e-4);

    let mut robot = Robot::new();
    robot.run(&BodyRequest::new(ActionType::GoalieDiveRight), 100);
    robot.tick(BodyRequest::new(ActionType::GetupBack));
    assert!((robot.odometry.heading() - 80f32.to_radians()).abs() < 1e-4);
}

#[test]
fn waking_up_goes_through_ref_pickup() {
    let mut robot = Robot::new();
    robot.run(&BodyRequest::new(ActionType::Dead), 10);

    let walk = BodyRequest::walk(100.0, 0.0, 0.0);
    let (request, joints) = robot.tick(walk.clone());
    assert_eq!(request.body.action_type, ActionType::RefPickup);
    assert_eq!(robot.dispatcher.current(), ActionType::RefPickup);
    assert_eq!(joints.stiffness[Joint::LeftShoulderPitch], 0.0);

    let ticks = (0..500)
        .take_while(|_| {
            robot.tick(walk.clone());
            robot.dispatcher.current() != ActionType::Walk
        })
        .count();
    assert!((95..=110).contains(&ticks), "ref pickup took {ticks} ticks");
}

#[test]
fn getup_may_follow_dead_directly() {
    let mut robot = Robot::new();
    robot.run(&BodyRequest::new(ActionType::Dead), 10);

    let (request, _) = robot.tick(BodyRequest::new(ActionType::GetupFront));
    assert_eq!(request.body.action_type, ActionType::GetupFront);
    assert_eq!(robot.dispatcher.current(), ActionType::GetupFront);
}

#[test]
fn head_is_spliced_unless_the_body_owns_it() {
    let mut robot = Robot::new();
    let look = HeadRequest {
        yaw: 0.5,
        is_relative: false,
        ..Default::default()
    };

    let mut joints = JointValues::default();
    for _ in 0..100 {
        joints = robot.tick_with_head(stand(), look.clone()).1;
    }
    assert!((joints.angles[Joint::HeadYaw] - 0.5).abs() < 1e-5);
    assert_eq!(joints.stiffness[Joint::HeadYaw], 0.7);

    let (_, joints) = robot.tick_with_head(BodyRequest::new(ActionType::Dead), look);
    assert_eq!(joints.stiffness[Joint::HeadYaw], STIFFNESS_LIMP);
}
