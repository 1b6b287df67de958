mod model;

pub use model::{UserProfile, UserTier};
