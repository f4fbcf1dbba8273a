//! Object graph walker
//!
//! Follows the pointer chains laid out by the session's [`OffsetTable`]:
//!
//! - camera: `UWorld -> GameInstance -> LocalPlayers[0] -> PlayerController
//!   -> PlayerCameraManager -> CameraCache.POV`
//! - actors: `UWorld -> GameState -> PlayerArray[i] -> PawnPrivate -> Mesh
//!   -> ComponentToWorld / bone array`
//!
//! Every link is a fail-soft read. A null link ends that chain quietly, so a
//! half-loaded level produces an empty frame rather than an error.
//!
//! [`OffsetTable`]: crate::config::OffsetTable

use super::{Camera, Transform};
use crate::math::{Vector2, Vector3};
use crate::memory::{field_address, is_zeroed, Session};
use crate::platform::Platform;
use crate::projection::{self, BoneProjection, Viewport};
use crate::transform::resolve_world_position;

/// The live `UWorld`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct World {
    /// Address of the `UWorld` object
    pub address: usize,
}

/// A player pawn with a skeletal mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    /// `APlayerState` the actor was found through
    pub player_state: usize,
    /// Possessed pawn
    pub pawn: usize,
    /// Skeletal mesh component of the pawn
    pub mesh: usize,
    /// The mesh's component-to-world frame, parent of every bone
    pub component_to_world: Transform,
    /// Whether this is the pawn the local player controls
    pub is_local: bool,
}

/// An actor placed on screen for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedActor {
    /// The actor being drawn
    pub actor: Actor,
    /// Mesh origin in world space
    pub world_position: Vector3,
    /// Projected mesh origin
    pub screen: Vector2,
    /// World units from the camera
    pub distance: f64,
}

/// Everything the render loop needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    /// Camera the frame was projected through
    pub camera: Camera,
    /// Sorted nearest first
    pub actors: Vec<ProjectedActor>,
}

impl World {
    /// Resolve the global `UWorld` pointer, `None` while no level is loaded
    pub fn locate<P: Platform>(session: &Session<P>) -> Option<Self> {
        if session.module_base() == 0 {
            return None;
        }

        let global = field_address(session.module_base(), session.offsets().uworld);
        let address = session.read_ptr(global);
        (address != 0).then_some(Self { address })
    }

    /// First local player's controller, 0 if absent
    pub fn player_controller<P: Platform>(&self, session: &Session<P>) -> usize {
        let offsets = session.offsets();

        let game_instance = session.read_ptr(field_address(self.address, offsets.game_instance));
        if game_instance == 0 {
            tracing::debug!("No game instance");
            return 0;
        }

        let local_player = session
            .open_remote_array::<u64>(field_address(game_instance, offsets.local_players))
            .try_get(session, 0)
            .unwrap_or(0) as usize;

        if local_player == 0 {
            tracing::debug!("No local player");
            return 0;
        }

        session.read_ptr(field_address(local_player, offsets.player_controller))
    }

    /// Current camera; all-zero when the chain is broken
    pub fn camera<P: Platform>(&self, session: &Session<P>) -> Camera {
        Self::camera_of(session, self.player_controller(session))
    }

    /// Pawn possessed by the local player, 0 if absent
    pub fn local_pawn<P: Platform>(&self, session: &Session<P>) -> usize {
        Self::local_pawn_of(session, self.player_controller(session))
    }

    fn camera_of<P: Platform>(session: &Session<P>, controller: usize) -> Camera {
        if controller == 0 {
            return Camera::default();
        }

        let offsets = session.offsets();
        let manager = session.read_ptr(field_address(controller, offsets.player_camera_manager));
        if manager == 0 {
            tracing::debug!("No camera manager");
            return Camera::default();
        }

        let cache = field_address(manager, offsets.camera_cache);
        session.read(field_address(cache, offsets.camera_pov))
    }

    fn local_pawn_of<P: Platform>(session: &Session<P>, controller: usize) -> usize {
        if controller == 0 {
            return 0;
        }

        session.read_ptr(field_address(controller, session.offsets().local_pawn))
    }

    /// Every player whose pawn has a mesh
    pub fn actors<P: Platform>(&self, session: &Session<P>) -> Vec<Actor> {
        let local_pawn = self.local_pawn(session);
        self.actors_with_local(session, local_pawn)
    }

    fn actors_with_local<P: Platform>(&self, session: &Session<P>, local_pawn: usize) -> Vec<Actor> {
        let offsets = session.offsets();

        let game_state = session.read_ptr(field_address(self.address, offsets.game_state));
        if game_state == 0 {
            tracing::debug!("No game state");
            return Vec::new();
        }

        let players =
            session.open_remote_array::<u64>(field_address(game_state, offsets.player_array));
        if !players.is_valid() {
            tracing::debug!("Player array failed sanity check: {:?}", players);
            return Vec::new();
        }

        players
            .iter(session)
            .filter_map(|player_state| {
                let player_state = player_state as usize;
                if player_state == 0 {
                    return None;
                }

                let pawn = session.read_ptr(field_address(player_state, offsets.pawn_private));
                if pawn == 0 {
                    return None;
                }

                let mesh = session.read_ptr(field_address(pawn, offsets.mesh));
                if mesh == 0 {
                    return None;
                }

                Some(Actor {
                    player_state,
                    pawn,
                    mesh,
                    component_to_world: session
                        .read(field_address(mesh, offsets.component_to_world)),
                    is_local: pawn == local_pawn,
                })
            })
            .collect()
    }

    /// Read the camera and all actors, projected onto `viewport`
    ///
    /// A broken camera chain yields an all-zero camera and no actors.
    pub fn snapshot<P: Platform>(&self, session: &Session<P>, viewport: Viewport) -> FrameSnapshot {
        let controller = self.player_controller(session);
        let camera = Self::camera_of(session, controller);

        // Without a camera there is nothing to project through
        if is_zeroed(&camera) || camera.field_of_view <= 0.0 {
            tracing::debug!("No camera; skipping projection");
            return FrameSnapshot::default();
        }

        let local_pawn = Self::local_pawn_of(session, controller);

        let mut actors: Vec<ProjectedActor> = self
            .actors_with_local(session, local_pawn)
            .into_iter()
            .map(|actor| {
                let world_position = actor.root_position();
                ProjectedActor {
                    actor,
                    world_position,
                    screen: projection::project(world_position, &camera, viewport),
                    distance: camera.location.distance(world_position),
                }
            })
            .collect();

        actors.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        FrameSnapshot { camera, actors }
    }
}

impl Actor {
    /// World position of the mesh origin
    pub fn root_position(&self) -> Vector3 {
        self.component_to_world.translation
    }

    /// Bone `index` in component space; `None` without a configured bone
    /// array or outside its bounds
    pub fn bone<P: Platform>(&self, session: &Session<P>, index: usize) -> Option<Transform> {
        let offset = session.offsets().bone_array?;

        session
            .open_remote_array::<Transform>(field_address(self.mesh, offset))
            .try_get(session, index)
    }

    /// Bone `index` resolved to world space
    pub fn bone_world_position<P: Platform>(
        &self,
        session: &Session<P>,
        index: usize,
    ) -> Option<Vector3> {
        self.bone(session, index)
            .map(|bone| resolve_world_position(&bone, &self.component_to_world))
    }

    /// Bone `index` projected onto `viewport`
    pub fn project_bone<P: Platform>(
        &self,
        session: &Session<P>,
        index: usize,
        camera: &Camera,
        viewport: Viewport,
        options: &BoneProjection,
    ) -> Option<Vector2> {
        self.bone(session, index).map(|bone| {
            projection::project_bone(&bone, &self.component_to_world, camera, viewport, options)
        })
    }
}
