//! Error types

use uuid::Uuid;

/// Errors raised while loading a robot description (fatal for the session)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to parse URDF: {0}")]
    Urdf(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Empty URDF: no links defined")]
    EmptyRobot,

    #[error("Duplicate link name: {0}")]
    DuplicateLink(String),

    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    #[error("Joint '{joint}' references unknown parent link '{link}'")]
    UnknownParentLink { joint: String, link: String },

    #[error("Joint '{joint}' references unknown child link '{link}'")]
    UnknownChildLink { joint: String, link: String },

    #[error("Link '{0}' is the child of more than one joint")]
    MultipleParents(String),

    #[error("Kinematic cycle through link '{0}'")]
    Cycle(String),

    #[error("No root link: every link is the child of a joint")]
    NoRoot,

    #[error("Multiple root links: {0:?}")]
    MultipleRoots(Vec<String>),

    #[error("Joint '{joint}' has lower limit {lower} above upper limit {upper}")]
    InvalidLimits { joint: String, lower: f32, upper: f32 },

    #[error("Joint '{0}' has a zero-length axis")]
    ZeroAxis(String),

    #[error("Joint '{joint}' mimics unknown joint '{target}'")]
    UnknownMimicJoint { joint: String, target: String },

    #[error("Mimic chain through joint '{0}' never reaches an independent joint")]
    MimicCycle(String),
}

/// Rejected edit or selection operation. State is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Link not found: {0}")]
    UnknownLink(String),

    #[error("Sphere not found: {0}")]
    UnknownSphere(Uuid),

    #[error("Joint not found: {0}")]
    UnknownJoint(String),

    #[error("Joint '{0}' is fixed or follows another joint and takes no value")]
    JointNotActuated(String),

    #[error("Invalid radius {0}: radius must be positive")]
    InvalidRadius(f32),

    #[error("Invalid center {0:?}: coordinates must be finite")]
    InvalidCenter([f32; 3]),

    #[error("Sphere {sphere} does not belong to the active link")]
    SphereNotOwned { sphere: Uuid },

    #[error("No sphere is selected")]
    NoActiveSphere,

    #[error("No link is selected")]
    NoActiveLink,
}

/// Errors that can occur while exporting or importing sphere sets and URDFs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),

    #[error("URDF write error: {0}")]
    Urdf(String),

    #[error("Sphere set does not match the robot: {0}")]
    Import(#[from] EditError),
}

/// Configuration file errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
