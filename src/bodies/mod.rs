mod rigid_body;
mod material;
mod body_type;
mod body_def;

pub use self::rigid_body::RigidBody;
pub use self::material::Material;
pub use self::body_type::RigidBodyType;
pub use self::body_def::BodyDef;
pub use self::body_flags::BodyFlags;

/// Flags for controlling body behavior
pub mod body_flags {
    use bitflags::bitflags;

    bitflags! {
        /// Flags for controlling the behavior of rigid bodies
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct BodyFlags: u32 {
            /// Body is affected by world gravity
            const AFFECTED_BY_GRAVITY = 0x01;

            /// Body keeps its initial rotation; contacts cannot spin it
            const FIXED_ROTATION = 0x02;
        }
    }
}
