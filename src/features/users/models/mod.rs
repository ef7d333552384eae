mod profile;

pub use profile::{Profile, ProfileSeed, Role, UpdateProfile};
