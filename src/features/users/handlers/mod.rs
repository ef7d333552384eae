pub mod profile_handler;

pub use profile_handler::{
    __path_create_profile, __path_delete_profile, __path_get_my_profile, __path_get_profile,
    __path_list_profiles, __path_update_profile, create_profile, delete_profile, get_my_profile,
    get_profile, list_profiles, update_profile,
};
