//! Reward profiles and distance shaping.

pub mod profile;
pub mod shaping;

pub use profile::{RewardKey, RewardProfile, PROFILE_NAMES};
pub use shaping::{
    select_target, shaping_reward, Target, TargetKind, TargetSnapshot, SHAPING_CLAMP,
    TARGET_JUMP_TOLERANCE,
};
